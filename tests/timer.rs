mod common;

#[cfg(test)]
mod tests {
    use super::common::{request_failure, FakeBackend};
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::time::sleep;
    use tracklet::api::{AckReply, BackendError, BundledStats, ElapsedReply, StartReply, StatsReply, StopReply};
    use tracklet::libs::config::TimerConfig;
    use tracklet::libs::input::InputKind;
    use tracklet::libs::stats::ActivityStats;
    use tracklet::libs::timer::{SyncOutcome, TimerController, TimerError, TimerPhase};

    fn controller() -> (Arc<FakeBackend>, TimerController<FakeBackend>) {
        let backend = Arc::new(FakeBackend::default());
        let timer = TimerController::new(Arc::clone(&backend), TimerConfig::default());
        (backend, timer)
    }

    #[tokio::test(start_paused = true)]
    async fn test_local_clock_ticks_every_second() {
        let (_, timer) = controller();
        timer.start("ProjectA", "note1").await.unwrap();

        let snapshot = timer.snapshot();
        assert_eq!(snapshot.phase, TimerPhase::Running);
        assert_eq!(snapshot.elapsed_seconds, 0);

        sleep(Duration::from_millis(5500)).await;
        assert_eq!(timer.snapshot().elapsed_seconds, 5);
        assert_eq!(timer.snapshot().display_time(), "00:00:05");
    }

    #[tokio::test(start_paused = true)]
    async fn test_start_records_project_and_note() {
        let (backend, timer) = controller();
        timer.start("ProjectA", "note1").await.unwrap();

        assert_eq!(
            *backend.last_start.lock(),
            Some(("ProjectA".to_string(), "note1".to_string()))
        );
        let snapshot = timer.snapshot();
        let session = snapshot.session.unwrap();
        assert_eq!(session.project_label, "ProjectA");
        assert_eq!(session.note, "note1");
        assert_eq!(snapshot.project.as_deref(), Some("ProjectA"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_refocus_overwrites_local_counter() {
        let (backend, timer) = controller();
        timer.start("ProjectA", "note1").await.unwrap();
        sleep(Duration::from_millis(5500)).await;
        assert_eq!(timer.snapshot().elapsed_seconds, 5);

        backend.elapsed.reply(ElapsedReply::ok(42));
        timer.on_window_focus().await;

        assert_eq!(timer.snapshot().display_time(), "00:00:42");
        assert_eq!(backend.elapsed.calls(), 1);

        sleep(Duration::from_millis(1000)).await;
        assert_eq!(timer.snapshot().elapsed_seconds, 43);
    }

    #[tokio::test(start_paused = true)]
    async fn test_refocus_accepts_smaller_value() {
        let (backend, timer) = controller();
        timer.start("ProjectA", "note1").await.unwrap();
        sleep(Duration::from_millis(10_500)).await;
        assert_eq!(timer.snapshot().elapsed_seconds, 10);

        backend.elapsed.reply(ElapsedReply::ok(3));
        timer.on_window_focus().await;
        assert_eq!(timer.snapshot().elapsed_seconds, 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_refocus_while_idle_sends_nothing() {
        let (backend, timer) = controller();
        timer.on_window_focus().await;
        assert_eq!(backend.elapsed.calls(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_refocus_failure_is_not_surfaced() {
        let (backend, timer) = controller();
        timer.start("ProjectA", "note1").await.unwrap();
        sleep(Duration::from_millis(2500)).await;

        backend.elapsed.fail(request_failure());
        timer.on_window_focus().await;
        backend.elapsed.reply(ElapsedReply {
            success: false,
            message: Some("busy".to_string()),
            elapsed_time: 99,
            active: None,
        });
        timer.on_window_focus().await;

        let snapshot = timer.snapshot();
        assert_eq!(snapshot.phase, TimerPhase::Running);
        assert_eq!(snapshot.elapsed_seconds, 2);
        assert!(snapshot.last_error.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_late_reconciliation_reply_is_discarded() {
        let (backend, timer) = controller();
        timer.start("ProjectA", "note1").await.unwrap();

        backend.elapsed.reply(ElapsedReply::ok(42));
        backend.elapsed.set_delay(Duration::from_secs(2));

        let (_, stopped) = tokio::join!(timer.on_window_focus(), async {
            sleep(Duration::from_millis(500)).await;
            timer.stop().await
        });
        stopped.unwrap();

        let snapshot = timer.snapshot();
        assert_eq!(snapshot.phase, TimerPhase::Idle);
        assert_eq!(snapshot.elapsed_seconds, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_remote_close_stops_locally() {
        let (backend, timer) = controller();
        timer.start("ProjectA", "note1").await.unwrap();
        sleep(Duration::from_millis(3500)).await;

        backend.elapsed.reply(ElapsedReply::closed());
        timer.on_window_focus().await;

        let snapshot = timer.snapshot();
        assert_eq!(snapshot.phase, TimerPhase::Idle);
        assert_eq!(snapshot.elapsed_seconds, 0);
        assert!(snapshot.session.is_none());
        assert_eq!(backend.daily.calls(), 1);
        assert_eq!(backend.weekly.calls(), 1);

        sleep(Duration::from_millis(3000)).await;
        assert_eq!(timer.snapshot().elapsed_seconds, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_duplicate_start_issues_single_request() {
        let (backend, timer) = controller();
        timer.start("ProjectA", "note1").await.unwrap();

        let result = timer.start("ProjectA", "note1").await;
        assert_eq!(result, Err(TimerError::AlreadyRunning));
        assert_eq!(backend.start.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_start_while_starting_is_refused() {
        let (backend, timer) = controller();
        backend.start.set_delay(Duration::from_secs(2));

        let (first, second, mid) = tokio::join!(timer.start("ProjectA", "note1"), timer.start("ProjectA", "note1"), async {
            sleep(Duration::from_millis(500)).await;
            timer.snapshot()
        });

        assert!(first.is_ok());
        assert_eq!(second, Err(TimerError::Busy));
        assert_eq!(mid.phase, TimerPhase::Starting);
        assert!(!mid.controls_enabled());
        assert_eq!(backend.start.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_resets_counter_only_after_success() {
        let (backend, timer) = controller();
        timer.start("ProjectA", "note1").await.unwrap();
        sleep(Duration::from_millis(3500)).await;

        backend.stop.set_delay(Duration::from_secs(2));
        let (stopped, mid) = tokio::join!(timer.stop(), async {
            sleep(Duration::from_millis(1000)).await;
            timer.snapshot()
        });
        stopped.unwrap();

        assert_eq!(mid.phase, TimerPhase::Stopping);
        assert_eq!(mid.elapsed_seconds, 3);

        let snapshot = timer.snapshot();
        assert_eq!(snapshot.phase, TimerPhase::Idle);
        assert_eq!(snapshot.elapsed_seconds, 0);
        assert!(snapshot.session.is_none());
        assert!(snapshot.controls_enabled());
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_when_idle_is_refused() {
        let (backend, timer) = controller();
        assert_eq!(timer.stop().await, Err(TimerError::NotRunning));
        assert_eq!(backend.stop.calls(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_failure_halts_clock_without_claiming_idle() {
        let (backend, timer) = controller();
        timer.start("ProjectA", "note1").await.unwrap();
        sleep(Duration::from_millis(4500)).await;

        backend.stop.reply(StopReply::failed("network error"));
        let result = timer.stop().await;
        assert_eq!(
            result,
            Err(TimerError::Backend(BackendError::Rejected("network error".to_string())))
        );

        let snapshot = timer.snapshot();
        assert_eq!(snapshot.phase, TimerPhase::Error("network error".to_string()));
        assert_eq!(snapshot.last_error.as_deref(), Some("network error"));
        assert_eq!(snapshot.elapsed_seconds, 4);
        assert!(snapshot.is_locked());

        sleep(Duration::from_millis(3000)).await;
        assert_eq!(timer.snapshot().elapsed_seconds, 4);
        assert_eq!(timer.start("ProjectA", "note1").await, Err(TimerError::AlreadyRunning));
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_can_be_retried_after_failure() {
        let (backend, timer) = controller();
        timer.start("ProjectA", "note1").await.unwrap();

        backend.stop.fail(request_failure());
        assert!(timer.stop().await.is_err());
        assert!(timer.snapshot().last_error.unwrap().contains("connection refused"));

        timer.stop().await.unwrap();
        let snapshot = timer.snapshot();
        assert_eq!(snapshot.phase, TimerPhase::Idle);
        assert!(snapshot.last_error.is_none());
        assert_eq!(backend.stop.calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_start_failure_returns_to_idle_and_allows_retry() {
        let (backend, timer) = controller();
        backend.start.reply(StartReply::failed("Invalid project"));

        let result = timer.start("ProjectA", "note1").await;
        assert!(result.is_err());
        let snapshot = timer.snapshot();
        assert_eq!(snapshot.phase, TimerPhase::Idle);
        assert_eq!(snapshot.last_error.as_deref(), Some("Invalid project"));

        timer.start("ProjectA", "note1").await.unwrap();
        let snapshot = timer.snapshot();
        assert_eq!(snapshot.phase, TimerPhase::Running);
        assert!(snapshot.last_error.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_start_failure_without_message_uses_fallback() {
        let (backend, timer) = controller();
        backend.start.reply(StartReply::default());

        assert!(timer.start("ProjectA", "note1").await.is_err());
        assert_eq!(timer.snapshot().last_error.as_deref(), Some("Failed to start timer"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_start_timeout_is_a_request_failure() {
        let backend = Arc::new(FakeBackend::default());
        let config = TimerConfig {
            request_timeout_secs: 5,
            ..Default::default()
        };
        let timer = TimerController::new(Arc::clone(&backend), config);
        backend.start.set_delay(Duration::from_secs(60));

        let result = timer.start("ProjectA", "note1").await;
        assert_eq!(
            result,
            Err(TimerError::Backend(BackendError::Timeout(Duration::from_secs(5))))
        );
        assert_eq!(timer.snapshot().phase, TimerPhase::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_applies_bundled_stats_without_fetching() {
        let (backend, timer) = controller();
        timer.start("ProjectA", "note1").await.unwrap();

        let daily = ActivityStats::new(3600, 2700, 75);
        let weekly = ActivityStats::new(18_000, 9000, 50);
        backend.stop.reply(StopReply::with_stats(daily, weekly));
        timer.stop().await.unwrap();

        let stats = timer.snapshot().stats;
        assert_eq!(stats.daily, daily);
        assert_eq!(stats.weekly, weekly);
        assert!(stats.last_synced_at.is_some());
        assert_eq!(backend.daily.calls(), 0);
        assert_eq!(backend.weekly.calls(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_skips_failed_half_of_bundle() {
        let (backend, timer) = controller();
        timer.start("ProjectA", "note1").await.unwrap();

        let weekly = ActivityStats::new(7200, 3600, 50);
        backend.stop.reply(StopReply {
            success: true,
            message: None,
            stats: Some(BundledStats {
                daily: Some(StatsReply::failed("stats unavailable")),
                weekly: Some(StatsReply::ok(weekly)),
            }),
        });
        timer.stop().await.unwrap();

        let stats = timer.snapshot().stats;
        assert_eq!(stats.daily, ActivityStats::default());
        assert_eq!(stats.weekly, weekly);
        assert_eq!(backend.daily.calls(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_without_bundle_fetches_stats_after_stop() {
        let (backend, timer) = controller();
        timer.start("ProjectA", "note1").await.unwrap();

        let daily = ActivityStats::new(1800, 900, 50);
        backend.daily.reply(StatsReply::ok(daily));
        backend.stop.set_delay(Duration::from_secs(1));

        let (stopped, calls_mid_stop) = tokio::join!(timer.stop(), async {
            sleep(Duration::from_millis(500)).await;
            backend.daily.calls()
        });
        stopped.unwrap();

        assert_eq!(calls_mid_stop, 0);
        assert_eq!(backend.daily.calls(), 1);
        assert_eq!(backend.weekly.calls(), 1);
        assert_eq!(timer.snapshot().stats.daily, daily);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stats_failure_after_stop_is_not_an_error() {
        let (backend, timer) = controller();
        timer.start("ProjectA", "note1").await.unwrap();
        backend.daily.fail(request_failure());

        assert!(timer.stop().await.is_ok());
        assert!(timer.snapshot().last_error.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_refresh_stats_returns_first_error_and_applies_the_rest() {
        let (backend, timer) = controller();
        let weekly = ActivityStats::new(36_000, 30_000, 120);
        backend.daily.fail(request_failure());
        backend.weekly.reply(StatsReply::ok(weekly));

        let result = timer.refresh_stats().await;
        assert_eq!(result, Err(request_failure()));

        let stats = timer.snapshot().stats;
        assert_eq!(stats.weekly.total_seconds, 36_000);
        assert_eq!(stats.weekly.active_percentage, 100);
        assert_eq!(backend.weekly.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_session_lock_refuses_project_change_and_logout() {
        let (backend, timer) = controller();
        timer.select_project("ProjectA").unwrap();
        timer.start("ProjectA", "note1").await.unwrap();

        assert_eq!(timer.select_project("ProjectB"), Err(TimerError::SessionLocked));
        assert_eq!(timer.logout().await, Err(TimerError::SessionLocked));
        assert_eq!(backend.logout.calls(), 0);
        assert_eq!(timer.snapshot().project.as_deref(), Some("ProjectA"));

        timer.stop().await.unwrap();
        timer.select_project("ProjectB").unwrap();
        timer.logout().await.unwrap();
        assert_eq!(backend.logout.calls(), 1);
        assert_eq!(timer.snapshot().project.as_deref(), Some("ProjectB"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_session_lock_holds_after_failed_stop() {
        let (backend, timer) = controller();
        timer.start("ProjectA", "note1").await.unwrap();
        backend.stop.fail(request_failure());
        let _ = timer.stop().await;

        assert_eq!(timer.select_project("ProjectB"), Err(TimerError::SessionLocked));
    }

    #[tokio::test(start_paused = true)]
    async fn test_logout_rejection_is_reported() {
        let (backend, timer) = controller();
        backend.logout.reply(AckReply::failed("Token expired"));

        let result = timer.logout().await;
        assert_eq!(
            result,
            Err(TimerError::Backend(BackendError::Rejected("Token expired".to_string())))
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_activity_pings_only_while_running() {
        let (backend, timer) = controller();
        timer.record_input(InputKind::Keyboard);
        sleep(Duration::from_millis(10)).await;
        assert_eq!(backend.keyboard.calls(), 0);

        timer.start("ProjectA", "note1").await.unwrap();
        sleep(Duration::from_millis(10)).await;
        assert_eq!(backend.mouse.calls(), 1);

        timer.record_input(InputKind::Keyboard);
        timer.record_input(InputKind::Mouse);
        sleep(Duration::from_millis(10)).await;
        assert_eq!(backend.keyboard.calls(), 1);
        assert_eq!(backend.mouse.calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_activity_ping_failure_does_not_affect_state() {
        let (backend, timer) = controller();
        backend.keyboard.set_default(Err(request_failure()));
        timer.start("ProjectA", "note1").await.unwrap();

        timer.record_input(InputKind::Keyboard);
        sleep(Duration::from_millis(1500)).await;

        let snapshot = timer.snapshot();
        assert_eq!(snapshot.phase, TimerPhase::Running);
        assert_eq!(snapshot.elapsed_seconds, 1);
        assert!(snapshot.last_error.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_sync_pushes_activity_with_note() {
        let (backend, timer) = controller();
        timer.start("ProjectA", "note1").await.unwrap();
        timer.set_note("reviewing PRs");

        assert_eq!(timer.sync().await.unwrap(), SyncOutcome::Synced);

        assert_eq!(backend.activity.calls(), 1);
        let update = backend.last_update.lock().clone().unwrap();
        assert_eq!(update.user_note, "reviewing PRs");
        assert!(!update.is_final_update);
        assert_eq!(backend.daily.calls(), 1);
        assert_eq!(backend.weekly.calls(), 1);
        assert_eq!(timer.snapshot().session.unwrap().note, "reviewing PRs");
    }

    #[tokio::test(start_paused = true)]
    async fn test_sync_push_failure_is_logged_only() {
        let (backend, timer) = controller();
        timer.start("ProjectA", "note1").await.unwrap();
        backend.update_session.reply(AckReply::failed("session not found"));

        assert_eq!(timer.sync().await.unwrap(), SyncOutcome::PushFailed);
        assert_eq!(backend.daily.calls(), 0);
        assert_eq!(timer.snapshot().phase, TimerPhase::Running);
        assert!(timer.snapshot().last_error.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_sync_activity_failure_skips_stats() {
        let (backend, timer) = controller();
        timer.start("ProjectA", "note1").await.unwrap();
        backend.activity.fail(request_failure());

        assert_eq!(timer.sync().await.unwrap(), SyncOutcome::PushFailed);
        assert_eq!(backend.update_session.calls(), 0);
        assert_eq!(backend.daily.calls(), 0);
        assert_eq!(backend.weekly.calls(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_sync_while_idle_only_refreshes_stats() {
        let (backend, timer) = controller();
        assert_eq!(timer.sync().await.unwrap(), SyncOutcome::Synced);

        assert_eq!(backend.activity.calls(), 0);
        assert_eq!(backend.update_session.calls(), 0);
        assert_eq!(backend.daily.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_dismiss_error_clears_message() {
        let (backend, timer) = controller();
        backend.start.fail(request_failure());
        let _ = timer.start("ProjectA", "note1").await;
        assert!(timer.snapshot().last_error.is_some());

        timer.dismiss_error();
        assert!(timer.snapshot().last_error.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_subscribers_observe_transitions() {
        let (_, timer) = controller();
        let mut snapshots = timer.subscribe();

        timer.start("ProjectA", "note1").await.unwrap();
        assert!(snapshots.has_changed().unwrap());
        assert!(snapshots.borrow_and_update().is_running());

        sleep(Duration::from_millis(1500)).await;
        assert!(snapshots.has_changed().unwrap());
        assert_eq!(snapshots.borrow_and_update().elapsed_seconds, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropping_controller_stops_the_clock() {
        let (_, timer) = controller();
        timer.start("ProjectA", "note1").await.unwrap();
        let mut snapshots = timer.subscribe();
        snapshots.borrow_and_update();

        drop(timer);
        sleep(Duration::from_secs(3)).await;

        assert!(snapshots.changed().await.is_err());
        assert_eq!(snapshots.borrow().elapsed_seconds, 0);
    }
}
