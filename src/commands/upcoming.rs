//! Print upcoming events to stdout
//!
//! Read-only: the watermark and the chat platform are never touched.

use prettytable::{row, Table};
use serde::Serialize;

use super::build_announcer;
use crate::config::Config;
use crate::error::{AnnouncerError, Result};
use crate::format::Formatter;
use crate::meetup::Event;

/// One printed event
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UpcomingRow {
    /// Event title
    pub name: String,
    /// Start time in epoch milliseconds
    pub time: i64,
    /// Local start time, e.g. `7:00pm`
    pub when: String,
    /// Venue on one line
    #[serde(rename = "where")]
    pub place: String,
    /// Event page
    pub link: String,
}

/// Project events into printable rows
pub fn rows(events: &[Event], formatter: &Formatter) -> Vec<UpcomingRow> {
    events
        .iter()
        .map(|e| UpcomingRow {
            name: e.name.clone(),
            time: e.time,
            when: formatter.when(e),
            place: e.venue.one_line(),
            link: e.link.clone(),
        })
        .collect()
}

/// Fetch and print upcoming events
///
/// # Errors
///
/// Returns error if the fetch fails or JSON serialization fails
pub async fn run_upcoming(config: Config, json: bool) -> Result<()> {
    let announcer = build_announcer(&config)?;
    let formatter = Formatter::from_config(&config)?;

    tracing::info!(group = %announcer.group(), "Fetching upcoming events");
    let events = announcer.upcoming().await?;
    let rows = rows(&events, &formatter);

    if json {
        let out = serde_json::to_string_pretty(&rows).map_err(AnnouncerError::Serialization)?;
        println!("{}", out);
        return Ok(());
    }

    if rows.is_empty() {
        println!("There are no upcoming events for {}.", announcer.group());
        return Ok(());
    }

    output_table(&rows, announcer.group());
    Ok(())
}

fn output_table(rows: &[UpcomingRow], group: &str) {
    let mut table = Table::new();
    table.add_row(row!["Name", "When", "Where", "Link"]);
    for r in rows {
        table.add_row(row![r.name, r.when, r.place, r.link]);
    }

    println!("\nUpcoming events for {}:\n", group);
    table.printstd();
}
