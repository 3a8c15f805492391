use super::formatter::{format_last_synced, format_stats_time};
use super::stats::{Period, StatsBoard};
use crate::libs::messages::Message;
use prettytable::{format, row, Table};

pub struct View {}

impl View {
    /// Builds the daily/weekly stats table.
    pub fn stats_table(stats: &StatsBoard) -> Table {
        let mut table = Table::new();
        table.set_format(*format::consts::FORMAT_NO_LINESEP_WITH_TITLE);
        table.set_titles(row!["PERIOD", "TOTAL", "ACTIVE", "ACTIVITY"]);

        for period in [Period::Daily, Period::Weekly] {
            let data = stats.get(period);
            table.add_row(row![
                period,
                format_stats_time(data.total_seconds),
                format_stats_time(data.active_seconds),
                r->format!("{}%", data.active_percentage)
            ]);
        }

        table
    }

    pub fn stats(stats: &StatsBoard) {
        println!("\n{}", Message::StatsHeader);
        Self::stats_table(stats).printstd();
        println!(
            "{}\n",
            Message::StatsLastSynced(format_last_synced(stats.last_synced_at.as_ref()))
        );
    }
}
