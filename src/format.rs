//! Turns events into chat messages

use chrono::DateTime;
use chrono_tz::Tz;

use crate::chat::{Attachment, Field, Message};
use crate::config::Config;
use crate::error::Result;
use crate::meetup::Event;

/// Renders events as announcement messages.
#[derive(Debug, Clone)]
pub struct Formatter {
    timezone: Tz,
    thumbnail_url: String,
}

impl Formatter {
    /// Formatter for the given zone and thumbnail
    pub fn new(timezone: Tz, thumbnail_url: impl Into<String>) -> Self {
        Self {
            timezone,
            thumbnail_url: thumbnail_url.into(),
        }
    }

    /// Formatter built from configuration
    ///
    /// # Errors
    ///
    /// Returns error if the configured timezone is unknown
    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self::new(
            config.timezone()?,
            config.announcer.thumbnail_url.clone(),
        ))
    }

    /// Start time of `event` as a time of day in the target zone, e.g. `7:00pm`
    pub fn when(&self, event: &Event) -> String {
        match DateTime::from_timestamp_millis(event.time) {
            Some(utc) => utc
                .with_timezone(&self.timezone)
                .format("%-I:%M%P")
                .to_string(),
            None => "TBA".to_string(),
        }
    }

    /// Build the announcement for one event
    pub fn format(&self, event: &Event) -> Message {
        let when = self.when(event);
        let place = event.venue.one_line();

        Message {
            text: None,
            attachments: vec![Attachment {
                fallback: format!("{} at {}, {}", event.name, when, place),
                title: event.name.clone(),
                title_link: Some(event.link.clone()),
                fields: vec![
                    Field {
                        title: "Where".to_string(),
                        value: place,
                        short: true,
                    },
                    Field {
                        title: "When".to_string(),
                        value: when,
                        short: true,
                    },
                ],
                thumb_url: Some(self.thumbnail_url.clone()),
                footer: Some(event.link.clone()),
            }],
        }
    }
}
