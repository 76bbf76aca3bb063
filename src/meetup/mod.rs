//! Event source adapter
//!
//! Fetches a group's events from the Meetup API and normalizes them to
//! upcoming events sorted by start time.

pub mod client;
pub mod event;

pub use client::{EventSource, MeetupClient, MeetupClientConfig};
pub use event::{upcoming_sorted, Event, EventStatus, Venue};
