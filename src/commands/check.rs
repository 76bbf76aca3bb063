//! One-shot check-and-announce cycle

use std::sync::Arc;
use tracing::info;

use super::{build_announcer, build_sender, connect_store, cycle_store};
use crate::announcer::{Announcer, CycleOutcome};
use crate::chat::{Destination, Sender};
use crate::config::Config;
use crate::error::{AnnouncerError, Result};
use crate::watermark::{Watermark, WatermarkStore};

/// Run a single cycle against the configured channel and store
///
/// # Errors
///
/// Returns error if no channel is configured, the store is unavailable,
/// or the event fetch fails
pub async fn run_check(config: Config, dry_run: bool) -> Result<()> {
    let channel = config.announcer.channel.clone().ok_or_else(|| {
        AnnouncerError::Config(
            "announcer.channel (ANNOUNCER_CHANNEL) is required for check".to_string(),
        )
    })?;

    let announcer = build_announcer(&config)?;
    let sender = build_sender(&config, dry_run)?;
    let store = connect_store(&config).await.ok_or_else(|| {
        AnnouncerError::Config(
            "a reachable watermark store (REDIS_URL) is required for check".to_string(),
        )
    })?;

    let outcome = check_once(&announcer, sender, store, channel, dry_run).await?;
    match outcome {
        CycleOutcome::Idle => info!("No new events"),
        CycleOutcome::Announced { count, watermark } => {
            info!(count = count, watermark = watermark, "Announced new events")
        }
        CycleOutcome::Failed { count } => {
            anyhow::bail!("none of {} new events could be delivered", count);
        }
    }
    Ok(())
}

/// Load the watermark, run one cycle, and report the outcome
///
/// With `dry_run` the stored watermark is read but never written.
///
/// # Errors
///
/// Returns the fetch failure, if any
pub async fn check_once(
    announcer: &Announcer,
    sender: Arc<dyn Sender>,
    store: Arc<dyn WatermarkStore>,
    channel: String,
    dry_run: bool,
) -> Result<CycleOutcome> {
    let mut watermark = Watermark::load(cycle_store(store, dry_run).await).await;
    let destination = Destination::Channel(channel);
    let outcome = announcer
        .check_and_announce(&mut watermark, sender.as_ref(), &destination)
        .await?;
    Ok(outcome)
}
