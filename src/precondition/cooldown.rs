//! Cooldown bookkeeping.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::time::Instant;
use tracing::debug;

use crate::model::{Message, Snowflake};

/// Which invocations share a cooldown.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BucketScope {
    /// One bucket per author.
    #[default]
    User,
    /// One bucket per channel.
    Channel,
    /// One bucket per guild; direct messages fall back to the channel.
    Guild,
    /// A single bucket for everyone.
    Global,
}

impl BucketScope {
    /// Bucket id of `message` under this scope.
    pub fn bucket(self, message: &Message) -> Snowflake {
        match self {
            Self::User => message.author.id,
            Self::Channel => message.channel.id,
            Self::Guild => message.guild_id().unwrap_or(message.channel.id),
            Self::Global => 0,
        }
    }
}

/// Cooldown declared by a command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CooldownOptions {
    /// Minimum time between permitted invocations, in milliseconds.
    #[serde(rename = "delay", alias = "delay_ms")]
    pub delay_ms: u64,
    /// How invocations are grouped.
    #[serde(default)]
    pub scope: BucketScope,
}

impl CooldownOptions {
    /// A cooldown of `delay` per `scope`.
    pub fn new(delay: Duration, scope: BucketScope) -> Self {
        Self {
            delay_ms: u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
            scope,
        }
    }

    /// The delay as a [`Duration`].
    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }
}

/// Identity of a cooldown bucket.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BucketKey {
    /// Command name.
    pub command: String,
    /// Bucket id derived from the scope.
    pub bucket: Snowflake,
    /// The configured delay, so commands sharing a name but not a delay never collide.
    pub delay_ms: u64,
}

/// Recorded invocations between two sweeps of the table.
pub(crate) const SWEEP_INTERVAL: usize = 256;

#[derive(Debug, Default)]
struct CooldownTable {
    entries: HashMap<BucketKey, Instant>,
    inserts: usize,
}

impl CooldownTable {
    fn sweep(&mut self, now: Instant) -> usize {
        let before = self.entries.len();
        self.entries
            .retain(|key, last| now.saturating_duration_since(*last) < Duration::from_millis(key.delay_ms));
        self.inserts = 0;
        before - self.entries.len()
    }
}

/// Last permitted invocation per bucket.
///
/// Checking and recording happen under one lock, so two invocations racing
/// for the same bucket cannot both be let through. Every
/// [`sweep_interval`](Self::with_sweep_interval) recorded invocations, buckets
/// whose delay has elapsed are dropped.
#[derive(Debug, Clone)]
pub struct CooldownManager {
    table: Arc<Mutex<CooldownTable>>,
    sweep_interval: usize,
}

impl Default for CooldownManager {
    fn default() -> Self {
        Self {
            table: Arc::new(Mutex::new(CooldownTable::default())),
            sweep_interval: SWEEP_INTERVAL,
        }
    }
}

impl CooldownManager {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sweep expired buckets every `interval` recorded invocations.
    pub fn with_sweep_interval(mut self, interval: usize) -> Self {
        self.sweep_interval = interval.max(1);
        self
    }

    fn lock(&self) -> MutexGuard<'_, CooldownTable> {
        self.table.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Record an invocation at `now` unless the bucket is still cooling down.
    ///
    /// Returns the remaining wait when denied.
    pub fn acquire(&self, key: BucketKey, now: Instant) -> Result<(), Duration> {
        let delay = Duration::from_millis(key.delay_ms);
        let mut table = self.lock();
        if let Some(last) = table.entries.get(&key) {
            let elapsed = now.saturating_duration_since(*last);
            if elapsed < delay {
                return Err(delay - elapsed);
            }
        }
        table.entries.insert(key, now);

        table.inserts += 1;
        if table.inserts >= self.sweep_interval {
            let removed = table.sweep(now);
            debug!(removed, remaining = table.entries.len(), "swept expired cooldowns");
        }
        Ok(())
    }

    /// Forget every bucket of `command`.
    pub fn reset(&self, command: &str) {
        self.lock().entries.retain(|key, _| key.command != command);
        debug!(command, "cooldowns reset");
    }

    /// Drop buckets whose delay has elapsed at `now`.
    pub fn sweep(&self, now: Instant) -> usize {
        self.lock().sweep(now)
    }

    /// Number of tracked buckets.
    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    /// Whether no bucket is tracked.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
