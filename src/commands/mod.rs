//! Command handlers for the CLI
//!
//! Each subcommand lives in its own module. The helpers here wire
//! configuration into the library components they share: the event
//! source, the chat sender and the watermark store.

use std::sync::Arc;
use tracing::{info, warn};

use crate::announcer::Announcer;
use crate::chat::{LogSender, Sender, SlackSender};
use crate::config::Config;
use crate::error::{AnnouncerError, Result};
use crate::format::Formatter;
use crate::meetup::{MeetupClient, MeetupClientConfig};
use crate::watermark::{MemoryWatermarkStore, RedisWatermarkStore, WatermarkStore};

pub mod check;
pub mod serve;
pub mod upcoming;

/// Build an announcer over the Meetup API
///
/// # Errors
///
/// Returns error if the HTTP client cannot be created or the timezone is
/// unknown
pub fn build_announcer(config: &Config) -> Result<Announcer> {
    let client = MeetupClient::new(MeetupClientConfig::from(config))?;
    let formatter = Formatter::from_config(config)?;
    Ok(Announcer::new(Arc::new(client), formatter))
}

/// Choose the outbound sender
///
/// Dry runs log instead of posting. Otherwise a Slack bot token is required.
///
/// # Errors
///
/// Returns `AnnouncerError::Config` if no bot token is configured
pub fn build_sender(config: &Config, dry_run: bool) -> Result<Arc<dyn Sender>> {
    if dry_run {
        info!("Dry run: messages will be logged, not posted");
        return Ok(Arc::new(LogSender));
    }

    match SlackSender::from_config(config)? {
        Some(sender) => Ok(Arc::new(sender)),
        None => Err(AnnouncerError::Config(
            "slack.bot_token (SLACK_BOT_TOKEN) is required unless --dry-run is given"
                .to_string(),
        )
        .into()),
    }
}

/// Connect to the watermark store, or `None` to run stateless
pub async fn connect_store(config: &Config) -> Option<Arc<dyn WatermarkStore>> {
    let Some(url) = config.redis.url.as_deref() else {
        info!("No Redis URL configured, running without a watermark store");
        return None;
    };

    match RedisWatermarkStore::connect(url).await {
        Ok(store) => Some(Arc::new(store)),
        Err(e) => {
            warn!(error = %e, "Watermark store unavailable, running without it");
            None
        }
    }
}

/// Store a cycle should write to
///
/// A dry run reads the current watermark from `store` and then works on a
/// process-local copy, so the persisted value never moves.
pub async fn cycle_store(
    store: Arc<dyn WatermarkStore>,
    dry_run: bool,
) -> Arc<dyn WatermarkStore> {
    if !dry_run {
        return store;
    }

    let seeded = match store.get().await {
        Ok(Some(value)) => MemoryWatermarkStore::with_value(value),
        Ok(None) => MemoryWatermarkStore::new(),
        Err(e) => {
            warn!(error = %e, "Failed to read watermark for dry run, starting from 0");
            MemoryWatermarkStore::new()
        }
    };
    info!("Dry run: watermark changes stay in memory");
    Arc::new(seeded)
}
