//! Announcement logic shared by the scheduler and the chat command
//!
//! The scheduled path announces only events newer than the watermark and
//! then advances it. The command path lists every upcoming event and never
//! reads or writes the watermark.

use std::sync::Arc;
use tracing::{debug, error, info, warn};

use crate::chat::{Destination, Message, Sender};
use crate::error::FetchError;
use crate::format::Formatter;
use crate::meetup::{Event, EventSource};
use crate::watermark::Watermark;

/// Events strictly newer than `watermark`, ascending by start time.
pub fn select_unannounced(events: &[Event], watermark: i64) -> Vec<Event> {
    let mut fresh: Vec<Event> = events
        .iter()
        .filter(|e| e.time > watermark)
        .cloned()
        .collect();
    fresh.sort_by_key(|e| e.time);
    fresh
}

/// Result of one scheduled check
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleOutcome {
    /// Nothing new since the watermark
    Idle,
    /// New events were published
    Announced {
        /// Number of events in the batch
        count: usize,
        /// Watermark after the batch
        watermark: i64,
    },
    /// New events were found but none could be delivered; the watermark
    /// is unchanged so the next cycle retries the batch
    Failed {
        /// Number of events in the batch
        count: usize,
    },
}

/// Result of an on-demand listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListingOutcome {
    /// Events were published
    Listed(usize),
    /// There were no upcoming events; the user was told so
    Empty,
    /// The fetch failed; the user got an apology
    FetchFailed,
}

/// Fetches, formats and publishes events
pub struct Announcer {
    source: Arc<dyn EventSource>,
    formatter: Formatter,
}

impl Announcer {
    /// Create an announcer over an event source
    pub fn new(source: Arc<dyn EventSource>, formatter: Formatter) -> Self {
        Self { source, formatter }
    }

    /// Group being announced
    pub fn group(&self) -> &str {
        self.source.group()
    }

    /// Fetch upcoming events, sorted by start time
    pub async fn upcoming(&self) -> Result<Vec<Event>, FetchError> {
        self.source.fetch().await
    }

    /// Publish `events` in order, one message each.
    ///
    /// A failed send is logged and does not stop the rest of the batch.
    /// Returns how many messages were delivered.
    pub async fn publish(
        &self,
        events: &[Event],
        sender: &dyn Sender,
        destination: &Destination,
    ) -> usize {
        let mut delivered = 0;
        for event in events {
            let message = self.formatter.format(event);
            match sender.send(destination, &message).await {
                Ok(()) => delivered += 1,
                Err(e) => warn!(
                    error = %e,
                    event = %event.name,
                    channel = %destination.target(),
                    "Failed to publish event"
                ),
            }
        }
        delivered
    }

    /// One scheduled check-and-announce cycle.
    ///
    /// # Errors
    ///
    /// Returns the `FetchError` if the event source fails; nothing is
    /// published and the watermark is untouched in that case.
    pub async fn check_and_announce(
        &self,
        watermark: &mut Watermark,
        sender: &dyn Sender,
        destination: &Destination,
    ) -> Result<CycleOutcome, FetchError> {
        let events = self.source.fetch().await?;
        let fresh = select_unannounced(&events, watermark.value());

        let Some(latest) = fresh.last().map(|e| e.time) else {
            debug!(
                watermark = watermark.value(),
                fetched = events.len(),
                "No new events to announce"
            );
            return Ok(CycleOutcome::Idle);
        };

        info!(
            count = fresh.len(),
            channel = %destination.target(),
            "Announcing new events"
        );

        let delivered = self.publish(&fresh, sender, destination).await;
        if delivered == 0 {
            error!(
                total = fresh.len(),
                channel = %destination.target(),
                "No announcements delivered; watermark left unchanged"
            );
            return Ok(CycleOutcome::Failed { count: fresh.len() });
        }
        if delivered < fresh.len() {
            warn!(
                delivered = delivered,
                total = fresh.len(),
                "Some announcements failed; advancing watermark anyway"
            );
        }

        watermark.advance(latest).await;

        Ok(CycleOutcome::Announced {
            count: fresh.len(),
            watermark: watermark.value(),
        })
    }

    /// Answer a "show upcoming events" request.
    ///
    /// Lists every upcoming event regardless of the watermark. Fetch
    /// failures and empty results are reported to the requester.
    pub async fn show_upcoming(
        &self,
        sender: &dyn Sender,
        destination: &Destination,
    ) -> ListingOutcome {
        let events = match self.source.fetch().await {
            Ok(events) => events,
            Err(e) => {
                warn!(error = %e, group = %self.group(), "Failed to fetch upcoming events");
                self.reply(
                    sender,
                    destination,
                    format!(
                        "Sorry, I couldn't fetch upcoming events for {} right now.",
                        self.group()
                    ),
                )
                .await;
                return ListingOutcome::FetchFailed;
            }
        };

        if events.is_empty() {
            self.reply(
                sender,
                destination,
                format!("There are no upcoming events for {}.", self.group()),
            )
            .await;
            return ListingOutcome::Empty;
        }

        ListingOutcome::Listed(self.publish(&events, sender, destination).await)
    }

    async fn reply(&self, sender: &dyn Sender, destination: &Destination, text: String) {
        if let Err(e) = sender.send(destination, &Message::text(text)).await {
            warn!(error = %e, channel = %destination.target(), "Failed to send reply");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{event, formatter, RecordingSender, StaticEventSource};
    use crate::watermark::MemoryWatermarkStore;

    fn channel() -> Destination {
        Destination::Channel("events".to_string())
    }

    #[test]
    fn test_select_unannounced_is_strictly_greater() {
        let events = vec![event("Old", 1_000), event("New", 1_001)];
        let fresh = select_unannounced(&events, 1_000);
        assert_eq!(fresh.len(), 1);
        assert_eq!(fresh[0].name, "New");
    }

    #[test]
    fn test_select_unannounced_sorts_ascending() {
        let events = vec![event("B", 2_000), event("A", 1_500), event("Old", 500)];
        let names: Vec<String> = select_unannounced(&events, 1_000)
            .into_iter()
            .map(|e| e.name)
            .collect();
        assert_eq!(names, vec!["A", "B"]);
    }

    #[tokio::test]
    async fn test_cycle_announces_new_events_and_advances_watermark() {
        let source = Arc::new(StaticEventSource::new(vec![
            event("Old", 500),
            event("A", 1_500),
            event("B", 2_000),
        ]));
        let announcer = Announcer::new(source, formatter());
        let store = Arc::new(MemoryWatermarkStore::with_value(1_000));
        let mut watermark = Watermark::load(store.clone()).await;
        let sender = RecordingSender::new();

        let outcome = announcer
            .check_and_announce(&mut watermark, &sender, &channel())
            .await
            .unwrap();

        assert_eq!(
            outcome,
            CycleOutcome::Announced {
                count: 2,
                watermark: 2_000
            }
        );
        assert_eq!(sender.titles(), vec!["A", "B"]);
        assert!(sender.destinations().iter().all(|d| *d == channel()));
        assert_eq!(watermark.value(), 2_000);
        assert_eq!(store.stored().await, Some(2_000));
    }

    #[tokio::test]
    async fn test_cycle_with_nothing_new_has_no_side_effects() {
        let source = Arc::new(StaticEventSource::new(vec![event("Old", 500)]));
        let announcer = Announcer::new(source, formatter());
        let store = Arc::new(MemoryWatermarkStore::with_value(1_000));
        let mut watermark = Watermark::load(store.clone()).await;
        let sender = RecordingSender::new();

        let outcome = announcer
            .check_and_announce(&mut watermark, &sender, &channel())
            .await
            .unwrap();

        assert_eq!(outcome, CycleOutcome::Idle);
        assert!(sender.titles().is_empty());
        assert_eq!(watermark.value(), 1_000);
        assert_eq!(store.stored().await, Some(1_000));
    }

    #[tokio::test]
    async fn test_second_cycle_does_not_repeat() {
        let source = Arc::new(StaticEventSource::new(vec![event("A", 1_500)]));
        let announcer = Announcer::new(source, formatter());
        let mut watermark = Watermark::load(Arc::new(MemoryWatermarkStore::new())).await;
        let sender = RecordingSender::new();

        announcer
            .check_and_announce(&mut watermark, &sender, &channel())
            .await
            .unwrap();
        let second = announcer
            .check_and_announce(&mut watermark, &sender, &channel())
            .await
            .unwrap();

        assert_eq!(second, CycleOutcome::Idle);
        assert_eq!(sender.titles(), vec!["A"]);
    }

    #[tokio::test]
    async fn test_cycle_fetch_error_leaves_watermark() {
        let announcer = Announcer::new(Arc::new(StaticEventSource::failing()), formatter());
        let store = Arc::new(MemoryWatermarkStore::with_value(1_000));
        let mut watermark = Watermark::load(store.clone()).await;
        let sender = RecordingSender::new();

        let result = announcer
            .check_and_announce(&mut watermark, &sender, &channel())
            .await;

        assert!(result.is_err());
        assert!(sender.titles().is_empty());
        assert_eq!(watermark.value(), 1_000);
    }

    #[tokio::test]
    async fn test_cycle_failed_save_does_not_reannounce_in_process() {
        let source = Arc::new(StaticEventSource::new(vec![event("A", 1_500)]));
        let announcer = Announcer::new(source, formatter());
        let store = Arc::new(MemoryWatermarkStore::failing_writes(1_000));
        let mut watermark = Watermark::load(store.clone()).await;
        let sender = RecordingSender::new();

        announcer
            .check_and_announce(&mut watermark, &sender, &channel())
            .await
            .unwrap();
        announcer
            .check_and_announce(&mut watermark, &sender, &channel())
            .await
            .unwrap();

        assert_eq!(sender.titles(), vec!["A"]);
        assert_eq!(watermark.value(), 1_500);
        assert_eq!(store.stored().await, Some(1_000));
    }

    #[tokio::test]
    async fn test_cycle_send_failure_still_advances() {
        let source = Arc::new(StaticEventSource::new(vec![
            event("A", 1_500),
            event("B", 2_000),
        ]));
        let announcer = Announcer::new(source, formatter());
        let mut watermark = Watermark::load(Arc::new(MemoryWatermarkStore::new())).await;
        let sender = RecordingSender::failing_on("A");

        let outcome = announcer
            .check_and_announce(&mut watermark, &sender, &channel())
            .await
            .unwrap();

        assert_eq!(
            outcome,
            CycleOutcome::Announced {
                count: 2,
                watermark: 2_000
            }
        );
        assert_eq!(sender.titles(), vec!["B"]);
    }

    #[tokio::test]
    async fn test_cycle_with_no_deliveries_keeps_watermark() {
        let source = Arc::new(StaticEventSource::new(vec![event("A", 1_500)]));
        let announcer = Announcer::new(source, formatter());
        let store = Arc::new(MemoryWatermarkStore::with_value(1_000));
        let mut watermark = Watermark::load(store.clone()).await;
        let sender = RecordingSender::failing_on("A");

        let outcome = announcer
            .check_and_announce(&mut watermark, &sender, &channel())
            .await
            .unwrap();

        assert_eq!(outcome, CycleOutcome::Failed { count: 1 });
        assert!(sender.titles().is_empty());
        assert_eq!(watermark.value(), 1_000);
        assert_eq!(store.stored().await, Some(1_000));
    }

    #[tokio::test]
    async fn test_show_upcoming_ignores_watermark() {
        let source = Arc::new(StaticEventSource::new(vec![
            event("A", 1_500),
            event("B", 2_000),
        ]));
        let announcer = Announcer::new(source, formatter());
        let store = Arc::new(MemoryWatermarkStore::with_value(5_000));
        let sender = RecordingSender::new();
        let reply = Destination::Reply {
            channel: "D123".to_string(),
        };

        let outcome = announcer.show_upcoming(&sender, &reply).await;

        assert_eq!(outcome, ListingOutcome::Listed(2));
        assert_eq!(sender.titles(), vec!["A", "B"]);
        assert!(sender.destinations().iter().all(|d| *d == reply));
        assert_eq!(store.stored().await, Some(5_000));
    }

    #[tokio::test]
    async fn test_show_upcoming_reports_fetch_failure() {
        let announcer = Announcer::new(Arc::new(StaticEventSource::failing()), formatter());
        let sender = RecordingSender::new();

        let outcome = announcer.show_upcoming(&sender, &channel()).await;

        assert_eq!(outcome, ListingOutcome::FetchFailed);
        let texts = sender.texts();
        assert_eq!(texts.len(), 1);
        assert!(texts[0].contains("couldn't fetch upcoming events for Surrey-Code-Camp"));
    }

    #[tokio::test]
    async fn test_show_upcoming_reports_empty() {
        let announcer = Announcer::new(Arc::new(StaticEventSource::new(vec![])), formatter());
        let sender = RecordingSender::new();

        let outcome = announcer.show_upcoming(&sender, &channel()).await;

        assert_eq!(outcome, ListingOutcome::Empty);
        assert_eq!(
            sender.texts(),
            vec!["There are no upcoming events for Surrey-Code-Camp."]
        );
    }
}
