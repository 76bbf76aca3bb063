//! Event records as returned by the Meetup events endpoint

use serde::{Deserialize, Serialize};

/// Lifecycle status of an event.
///
/// Only `upcoming` matters to the announcer; every other value the API
/// may send (`past`, `cancelled`, `draft`, ...) collapses into `Other`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventStatus {
    /// Scheduled and not yet started
    Upcoming,
    /// Any other status
    #[serde(other)]
    Other,
}

/// Where an event takes place
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Venue {
    /// Venue name
    pub name: String,
    /// Street address
    #[serde(rename = "address_1")]
    pub address: String,
    /// City
    pub city: String,
}

impl Venue {
    /// One-line "name, address, city" rendering
    pub fn one_line(&self) -> String {
        [&self.name, &self.address, &self.city]
            .iter()
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// A single group event.
///
/// Every field is required; unknown fields in the payload are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    /// Event title
    pub name: String,
    /// Start time in epoch milliseconds
    pub time: i64,
    /// Event status
    pub status: EventStatus,
    /// Venue details
    pub venue: Venue,
    /// Public event page
    pub link: String,
}

impl Event {
    /// True if the event is still upcoming
    pub fn is_upcoming(&self) -> bool {
        self.status == EventStatus::Upcoming
    }
}

/// Keep upcoming events only, ordered by start time.
///
/// The sort is stable so events sharing a start time keep API order.
pub fn upcoming_sorted(events: Vec<Event>) -> Vec<Event> {
    let mut upcoming: Vec<Event> = events.into_iter().filter(Event::is_upcoming).collect();
    upcoming.sort_by_key(|e| e.time);
    upcoming
}
