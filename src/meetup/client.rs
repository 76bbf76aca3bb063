//! HTTP client for the Meetup events endpoint.
//!
//! # Example
//!
//! ```rust,no_run
//! use meetup_announcer::meetup::{EventSource, MeetupClient, MeetupClientConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = MeetupClient::new(MeetupClientConfig {
//!         api_base: "https://api.meetup.com".to_string(),
//!         group: "Surrey-Code-Camp".to_string(),
//!         timeout_secs: None,
//!     })?;
//!
//!     for event in client.fetch().await? {
//!         println!("{} at {}", event.name, event.time);
//!     }
//!     Ok(())
//! }
//! ```

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, warn};

use super::event::{upcoming_sorted, Event};
use crate::config::Config;
use crate::error::FetchError;

/// Anything that can produce the current list of upcoming events.
///
/// Implementations return only `upcoming` events, ordered ascending by
/// start time.
#[async_trait]
pub trait EventSource: Send + Sync {
    /// Fetch upcoming events
    async fn fetch(&self) -> Result<Vec<Event>, FetchError>;

    /// Group the events belong to, used in user-facing replies
    fn group(&self) -> &str;
}

/// Meetup client configuration.
#[derive(Debug, Clone)]
pub struct MeetupClientConfig {
    /// Base URL of the Meetup API.
    pub api_base: String,
    /// Group URL name.
    pub group: String,
    /// Optional request timeout in seconds.
    pub timeout_secs: Option<u64>,
}

impl From<&Config> for MeetupClientConfig {
    fn from(config: &Config) -> Self {
        Self {
            api_base: config.meetup.api_base.clone(),
            group: config.announcer.group.clone(),
            timeout_secs: config.meetup.timeout_seconds,
        }
    }
}

/// Meetup API client
pub struct MeetupClient {
    client: Client,
    config: MeetupClientConfig,
}

impl MeetupClient {
    /// Creates a new client.
    ///
    /// # Errors
    ///
    /// Returns `FetchError::Http` if the HTTP client cannot be created.
    pub fn new(config: MeetupClientConfig) -> Result<Self, FetchError> {
        let mut builder = Client::builder().user_agent(concat!(
            env!("CARGO_PKG_NAME"),
            "/",
            env!("CARGO_PKG_VERSION")
        ));
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(std::time::Duration::from_secs(secs));
        }

        Ok(Self {
            client: builder.build()?,
            config,
        })
    }

    /// Full URL of the group's events endpoint
    pub fn events_url(&self) -> String {
        format!(
            "{}/{}/events",
            self.config.api_base.trim_end_matches('/'),
            self.config.group
        )
    }
}

#[async_trait]
impl EventSource for MeetupClient {
    async fn fetch(&self) -> Result<Vec<Event>, FetchError> {
        let url = self.events_url();
        debug!(url = %url, "Fetching events");

        let response = self.client.get(&url).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), "Event API returned an error");
            return Err(FetchError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body = response.text().await?;
        let events: Vec<Event> =
            serde_json::from_str(&body).map_err(|e| FetchError::Parse(e.to_string()))?;

        let total = events.len();
        let upcoming = upcoming_sorted(events);
        debug!(
            total = total,
            upcoming = upcoming.len(),
            group = %self.config.group,
            "Fetched events"
        );

        Ok(upcoming)
    }

    fn group(&self) -> &str {
        &self.config.group
    }
}
