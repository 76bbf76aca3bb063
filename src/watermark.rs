//! Watermark persistence
//!
//! The watermark is the start time (epoch ms) of the most recently
//! announced event. It lives under a single key in Redis so a restart does
//! not re-announce events. [`Watermark`] is the in-process view of it: it
//! reads the store once at startup and writes after every announced batch.

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::error::StoreError;

/// Key holding the watermark
pub const WATERMARK_KEY: &str = "events:last-announced";

/// Persistent storage for the watermark value
#[async_trait]
pub trait WatermarkStore: Send + Sync {
    /// Read the stored watermark; `None` when the key is absent
    async fn get(&self) -> Result<Option<i64>, StoreError>;

    /// Overwrite the stored watermark
    async fn set(&self, timestamp: i64) -> Result<(), StoreError>;
}

/// Redis-backed store
#[derive(Clone)]
pub struct RedisWatermarkStore {
    manager: ConnectionManager,
}

impl RedisWatermarkStore {
    /// Connect to Redis.
    ///
    /// The URL carries host, port, optional password and optional database
    /// index, e.g. `redis://:secret@localhost:6379/2`.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Connection` if the URL is invalid or the server
    /// cannot be reached.
    pub async fn connect(url: &str) -> Result<Self, StoreError> {
        let client =
            redis::Client::open(url).map_err(|e| StoreError::Connection(e.to_string()))?;

        debug!(
            db = client.get_connection_info().redis.db,
            "Connecting to watermark store"
        );

        let manager = ConnectionManager::new(client)
            .await
            .map_err(|e| StoreError::Connection(e.to_string()))?;

        Ok(Self { manager })
    }
}

#[async_trait]
impl WatermarkStore for RedisWatermarkStore {
    async fn get(&self) -> Result<Option<i64>, StoreError> {
        let mut conn = self.manager.clone();
        let raw: Option<String> = conn.get(WATERMARK_KEY).await?;
        raw.map(|value| {
            value
                .trim()
                .parse::<i64>()
                .map_err(|_| StoreError::InvalidValue(value))
        })
        .transpose()
    }

    async fn set(&self, timestamp: i64) -> Result<(), StoreError> {
        let mut conn = self.manager.clone();
        conn.set::<_, _, ()>(WATERMARK_KEY, timestamp).await?;
        Ok(())
    }
}

/// Process-local store, used in tests and as a stand-in when wiring
/// components by hand.
#[derive(Debug, Default)]
pub struct MemoryWatermarkStore {
    value: Mutex<Option<i64>>,
    fail_reads: bool,
    fail_writes: bool,
}

impl MemoryWatermarkStore {
    /// Empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-seeded with a watermark
    pub fn with_value(timestamp: i64) -> Self {
        Self {
            value: Mutex::new(Some(timestamp)),
            ..Self::default()
        }
    }

    /// Store whose reads fail with a command error
    pub fn failing_reads() -> Self {
        Self {
            fail_reads: true,
            ..Self::default()
        }
    }

    /// Store whose writes fail with a command error
    pub fn failing_writes(timestamp: i64) -> Self {
        Self {
            value: Mutex::new(Some(timestamp)),
            fail_writes: true,
            ..Self::default()
        }
    }

    /// Current stored value
    pub async fn stored(&self) -> Option<i64> {
        *self.value.lock().await
    }
}

#[async_trait]
impl WatermarkStore for MemoryWatermarkStore {
    async fn get(&self) -> Result<Option<i64>, StoreError> {
        if self.fail_reads {
            return Err(StoreError::Command("read refused".to_string()));
        }
        Ok(*self.value.lock().await)
    }

    async fn set(&self, timestamp: i64) -> Result<(), StoreError> {
        if self.fail_writes {
            return Err(StoreError::Command("write refused".to_string()));
        }
        *self.value.lock().await = Some(timestamp);
        Ok(())
    }
}

/// In-process watermark state.
///
/// Reads from the store only in [`Watermark::load`] and writes only in
/// [`Watermark::advance`]; between those it answers from memory.
pub struct Watermark {
    store: Arc<dyn WatermarkStore>,
    last_announced: i64,
}

impl Watermark {
    /// Load the watermark, defaulting to 0 when the key is absent or the
    /// store fails.
    pub async fn load(store: Arc<dyn WatermarkStore>) -> Self {
        let last_announced = match store.get().await {
            Ok(Some(value)) => value,
            Ok(None) => {
                info!("No watermark stored yet, starting from 0");
                0
            }
            Err(e) => {
                warn!(error = %e, "Failed to load watermark, starting from 0");
                0
            }
        };

        debug!(watermark = last_announced, "Watermark loaded");
        Self {
            store,
            last_announced,
        }
    }

    /// Current watermark
    pub fn value(&self) -> i64 {
        self.last_announced
    }

    /// Move the watermark forward to `timestamp` and persist it.
    ///
    /// Never moves backwards. The in-memory value advances even when the
    /// save fails, so this process will not repeat the batch; a restart
    /// after a failed save will.
    pub async fn advance(&mut self, timestamp: i64) {
        if timestamp <= self.last_announced {
            return;
        }

        self.last_announced = timestamp;

        match self.store.set(timestamp).await {
            Ok(()) => debug!(watermark = timestamp, "Watermark saved"),
            Err(e) => warn!(
                error = %e,
                watermark = timestamp,
                "Failed to save watermark; a restart may re-announce this batch"
            ),
        }
    }
}
