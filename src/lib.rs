//! Meetup Announcer - posts a group's new Meetup events to a chat channel
//!
//! This library provides the pieces the `meetup-announcer` binary wires
//! together: an event source, a formatter, a watermark store, a chat
//! sender, and the scheduler and command handler that drive them.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//!
//! - `meetup`: Event records and the HTTP event source
//! - `format`: Event to chat message rendering
//! - `watermark`: Last-announced timestamp persistence (Redis or memory)
//! - `chat`: Outbound senders, command matching, inbound Slack endpoint
//! - `announcer`: Check-and-announce cycle and on-demand listing
//! - `scheduler`: Interval timer driving the announcer
//! - `config`: Configuration management and validation
//! - `error`: Error types and result aliases
//! - `cli`: Command-line interface definition
//!
//! # Example
//!
//! ```no_run
//! use meetup_announcer::{commands, Config};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load("config/config.yaml", &Default::default())?;
//!     config.validate()?;
//!
//!     let announcer = commands::build_announcer(&config)?;
//!     for event in announcer.upcoming().await? {
//!         println!("{}", event.name);
//!     }
//!     Ok(())
//! }
//! ```

pub mod announcer;
pub mod chat;
pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod format;
pub mod logging;
pub mod meetup;
pub mod scheduler;
pub mod watermark;

// Re-export commonly used types
pub use announcer::{select_unannounced, Announcer, CycleOutcome, ListingOutcome};
pub use config::Config;
pub use error::{AnnouncerError, FetchError, PublishError, Result, StoreError};
pub use format::Formatter;
pub use meetup::{Event, EventSource, MeetupClient};
pub use scheduler::Scheduler;
pub use watermark::{MemoryWatermarkStore, RedisWatermarkStore, Watermark, WatermarkStore};

#[cfg(test)]
pub mod test_utils;
