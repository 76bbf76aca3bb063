//! Shared fixtures and fakes for unit tests

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use crate::chat::{Destination, Message, Sender};
use crate::error::{FetchError, PublishError};
use crate::format::Formatter;
use crate::meetup::{Event, EventSource, EventStatus, Venue};

/// Upcoming event at `time` with a fixed venue
pub fn event(name: &str, time: i64) -> Event {
    Event {
        name: name.to_string(),
        time,
        status: EventStatus::Upcoming,
        venue: Venue {
            name: "City Centre Library".to_string(),
            address: "10350 University Dr".to_string(),
            city: "Surrey".to_string(),
        },
        link: format!(
            "https://www.meetup.com/Surrey-Code-Camp/events/{}/",
            name.to_lowercase().replace(' ', "-")
        ),
    }
}

/// Formatter in the default zone
pub fn formatter() -> Formatter {
    Formatter::new(chrono_tz::America::Vancouver, "https://example.com/logo.png")
}

/// Event source returning a fixed list, or always failing
pub struct StaticEventSource {
    events: Vec<Event>,
    fail: bool,
    calls: AtomicUsize,
}

impl StaticEventSource {
    pub fn new(events: Vec<Event>) -> Self {
        Self {
            events,
            fail: false,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing() -> Self {
        Self {
            events: Vec::new(),
            fail: true,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl EventSource for StaticEventSource {
    async fn fetch(&self) -> Result<Vec<Event>, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(FetchError::Status {
                status: 503,
                body: "unavailable".to_string(),
            });
        }
        Ok(crate::meetup::upcoming_sorted(self.events.clone()))
    }

    fn group(&self) -> &str {
        "Surrey-Code-Camp"
    }
}

/// Sender that records every message it is asked to deliver
#[derive(Default)]
pub struct RecordingSender {
    sent: Mutex<Vec<(Destination, Message)>>,
    fail_title: Option<String>,
}

impl RecordingSender {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rejects the announcement whose title is `title`
    pub fn failing_on(title: &str) -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            fail_title: Some(title.to_string()),
        }
    }

    pub fn titles(&self) -> Vec<String> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .flat_map(|(_, m)| m.attachments.iter().map(|a| a.title.clone()))
            .collect()
    }

    pub fn texts(&self) -> Vec<String> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .filter_map(|(_, m)| m.text.clone())
            .collect()
    }

    pub fn destinations(&self) -> Vec<Destination> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .map(|(d, _)| d.clone())
            .collect()
    }
}

#[async_trait]
impl Sender for RecordingSender {
    async fn send(
        &self,
        destination: &Destination,
        message: &Message,
    ) -> Result<(), PublishError> {
        if let Some(title) = &self.fail_title {
            if message.attachments.iter().any(|a| &a.title == title) {
                return Err(PublishError::Api {
                    error: "rate_limited".to_string(),
                });
            }
        }
        self.sent
            .lock()
            .unwrap()
            .push((destination.clone(), message.clone()));
        Ok(())
    }
}
