//! Raw keyboard and mouse capture.
//!
//! A dedicated OS thread runs the blocking `rdev` listener and restarts it
//! after a failure. Events are classified into [`InputKind`] and coalesced
//! per kind by [`PingThrottle`] before [`PingForwarder`] hands them to the
//! async side over a tokio channel, so a burst of mouse movement becomes one
//! ping.

use crate::libs::config::InputConfig;
use crate::libs::messages::Message;
use crate::msg_warning;
use parking_lot::Mutex;
use rdev::{listen, Event, EventType};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tracing::debug;

const LISTENER_RETRY_DELAY: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputKind {
    Keyboard,
    Mouse,
}

impl InputKind {
    /// Maps a raw event to the ping it should produce, if any.
    pub fn classify(event_type: &EventType) -> Option<Self> {
        match event_type {
            EventType::KeyPress(_) => Some(InputKind::Keyboard),
            EventType::ButtonPress(_) | EventType::MouseMove { .. } | EventType::Wheel { .. } => Some(InputKind::Mouse),
            EventType::KeyRelease(_) | EventType::ButtonRelease(_) => None,
        }
    }
}

/// Lets at most one event of each kind through per `min_interval`.
#[derive(Debug, Clone)]
pub struct PingThrottle {
    min_interval: Duration,
    last_sent: HashMap<InputKind, Instant>,
}

impl PingThrottle {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_sent: HashMap::new(),
        }
    }

    /// Returns `true` if an event of `kind` observed at `now` should be sent.
    pub fn admit(&mut self, kind: InputKind, now: Instant) -> bool {
        match self.last_sent.get(&kind) {
            Some(last) if now.saturating_duration_since(*last) < self.min_interval => false,
            _ => {
                self.last_sent.insert(kind, now);
                true
            }
        }
    }
}

/// Classifies raw events and sends the admitted ones as pings.
pub struct PingForwarder {
    sender: mpsc::UnboundedSender<InputKind>,
    throttle: Mutex<PingThrottle>,
}

impl PingForwarder {
    pub fn new(sender: mpsc::UnboundedSender<InputKind>, min_interval: Duration) -> Self {
        Self {
            sender,
            throttle: Mutex::new(PingThrottle::new(min_interval)),
        }
    }

    /// Returns `true` when a ping reached the receiver. Nothing is sent, and
    /// the throttle is left untouched, once the receiver is gone.
    pub fn forward(&self, event_type: &EventType, now: Instant) -> bool {
        if self.is_closed() {
            return false;
        }
        match InputKind::classify(event_type) {
            Some(kind) if self.throttle.lock().admit(kind, now) => self.sender.send(kind).is_ok(),
            _ => false,
        }
    }

    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }
}

pub struct InputListener;

impl InputListener {
    /// Starts the listener thread and returns the stream of coalesced pings.
    ///
    /// `rdev::listen` blocks for the life of the process, so the thread is
    /// never joined. Once the receiver is dropped, events are discarded and
    /// a failed listener is not restarted.
    pub fn spawn(config: &InputConfig) -> mpsc::UnboundedReceiver<InputKind> {
        let (sender, receiver) = mpsc::unbounded_channel();
        let forwarder = Arc::new(PingForwarder::new(sender, config.min_ping_interval()));

        std::thread::spawn(move || loop {
            if forwarder.is_closed() {
                break;
            }

            let callback_forwarder = Arc::clone(&forwarder);
            let result = listen(move |event: Event| {
                callback_forwarder.forward(&event.event_type, Instant::now());
            });

            match result {
                Err(error) => {
                    msg_warning!(Message::InputListenerFailed(format!("{:?}", error)));
                    std::thread::sleep(LISTENER_RETRY_DELAY);
                }
                Ok(()) => {
                    debug!("input listener returned");
                    break;
                }
            }
        });

        receiver
    }
}
