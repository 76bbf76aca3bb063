//! Repeating check-and-announce timer
//!
//! The scheduler only exists when a notification channel is configured and
//! the watermark store is reachable; without persistence there is no way to
//! avoid duplicate announcements, so scheduled announcing is switched off
//! and only the on-demand command stays available.

use std::sync::Arc;
use std::time::Duration;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{error, info};

use crate::announcer::{Announcer, CycleOutcome};
use crate::chat::{Destination, Sender};
use crate::error::FetchError;
use crate::watermark::{Watermark, WatermarkStore};

/// Drives [`Announcer::check_and_announce`] on a fixed interval
pub struct Scheduler {
    announcer: Arc<Announcer>,
    sender: Arc<dyn Sender>,
    destination: Destination,
    watermark: Watermark,
    period: Duration,
}

impl Scheduler {
    /// Build a scheduler, or `None` when scheduling is disabled.
    ///
    /// Scheduling is disabled when `channel` is unset or `store` is `None`.
    /// The watermark is loaded from the store here, once.
    pub async fn build(
        announcer: Arc<Announcer>,
        sender: Arc<dyn Sender>,
        channel: Option<String>,
        store: Option<Arc<dyn WatermarkStore>>,
        period: Duration,
    ) -> Option<Self> {
        let Some(channel) = channel else {
            info!("No announcement channel configured, scheduled announcements disabled");
            return None;
        };

        let Some(store) = store else {
            info!(
                channel = %channel,
                "Watermark store unavailable, scheduled announcements disabled"
            );
            return None;
        };

        let watermark = Watermark::load(store).await;

        Some(Self {
            announcer,
            sender,
            destination: Destination::Channel(channel),
            watermark,
            period,
        })
    }

    /// Current watermark
    pub fn watermark(&self) -> i64 {
        self.watermark.value()
    }

    /// Run a single cycle now
    ///
    /// # Errors
    ///
    /// Returns the fetch failure, if any; the next cycle retries naturally.
    pub async fn run_cycle(&mut self) -> Result<CycleOutcome, FetchError> {
        self.announcer
            .check_and_announce(
                &mut self.watermark,
                self.sender.as_ref(),
                &self.destination,
            )
            .await
    }

    /// Run cycles forever, the first one a full period after start.
    pub async fn run(mut self) {
        info!(
            channel = %self.destination.target(),
            interval_secs = self.period.as_secs(),
            watermark = self.watermark.value(),
            "Starting scheduled announcements"
        );

        let mut ticker = interval_at(Instant::now() + self.period, self.period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            match self.run_cycle().await {
                Ok(CycleOutcome::Idle) => {}
                Ok(CycleOutcome::Announced { count, watermark }) => {
                    info!(count = count, watermark = watermark, "Announcement cycle complete");
                }
                Ok(CycleOutcome::Failed { count }) => {
                    error!(count = count, "Announcement cycle delivered nothing, retrying next tick");
                }
                Err(e) => {
                    error!(error = %e, "Announcement cycle failed, waiting for next tick");
                }
            }
        }
    }
}
