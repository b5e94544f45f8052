//! Session statistics for a detector run.
//!
//! Counters are atomics so the pipeline, the ticker and the CLI can share
//! one instance. Nothing here is persisted; a new run starts from zero.

use crate::core::{EventType, Step};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use uuid::Uuid;

/// Live counters for the current session.
#[derive(Debug)]
pub struct SessionStats {
    session_id: Uuid,
    session_start: DateTime<Utc>,
    samples_processed: AtomicU64,
    samples_skipped: AtomicU64,
    none_events: AtomicU64,
    reflex_blinks: AtomicU64,
    voluntary_blinks: AtomicU64,
    clenches: AtomicU64,
    double_clenches: AtomicU64,
    triggers_fired: AtomicU64,
    sink_failures: AtomicU64,
    cooldowns_expired: AtomicU64,
    stale_expiries: AtomicU64,
}

impl SessionStats {
    pub fn new() -> Self {
        Self {
            session_id: Uuid::new_v4(),
            session_start: Utc::now(),
            samples_processed: AtomicU64::new(0),
            samples_skipped: AtomicU64::new(0),
            none_events: AtomicU64::new(0),
            reflex_blinks: AtomicU64::new(0),
            voluntary_blinks: AtomicU64::new(0),
            clenches: AtomicU64::new(0),
            double_clenches: AtomicU64::new(0),
            triggers_fired: AtomicU64::new(0),
            sink_failures: AtomicU64::new(0),
            cooldowns_expired: AtomicU64::new(0),
            stale_expiries: AtomicU64::new(0),
        }
    }

    /// Record the outcome of one processed sample.
    pub fn record_step(&self, step: &Step) {
        self.samples_processed.fetch_add(1, Ordering::Relaxed);

        let counter = match step.event_type {
            EventType::None => &self.none_events,
            EventType::ReflexBlink => &self.reflex_blinks,
            EventType::VoluntaryBlink => &self.voluntary_blinks,
            EventType::Clench => &self.clenches,
        };
        counter.fetch_add(1, Ordering::Relaxed);

        if step.detected.is_some() {
            self.double_clenches.fetch_add(1, Ordering::Relaxed);
        }
        self.triggers_fired
            .fetch_add(u64::from(step.triggers), Ordering::Relaxed);
        self.sink_failures
            .fetch_add(u64::from(step.sink_failures), Ordering::Relaxed);
    }

    /// Record a tick that produced no sample.
    pub fn record_skipped(&self) {
        self.samples_skipped.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a cooldown expiry and whether it took effect.
    pub fn record_expiry(&self, cleared: bool) {
        if cleared {
            self.cooldowns_expired.fetch_add(1, Ordering::Relaxed);
        } else {
            self.stale_expiries.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Get the current statistics.
    pub fn stats(&self) -> StatsSnapshot {
        StatsSnapshot {
            session_id: self.session_id,
            session_start: self.session_start,
            session_duration_secs: (Utc::now() - self.session_start).num_seconds().max(0) as u64,
            samples_processed: self.samples_processed.load(Ordering::Relaxed),
            samples_skipped: self.samples_skipped.load(Ordering::Relaxed),
            none_events: self.none_events.load(Ordering::Relaxed),
            reflex_blinks: self.reflex_blinks.load(Ordering::Relaxed),
            voluntary_blinks: self.voluntary_blinks.load(Ordering::Relaxed),
            clenches: self.clenches.load(Ordering::Relaxed),
            double_clenches: self.double_clenches.load(Ordering::Relaxed),
            triggers_fired: self.triggers_fired.load(Ordering::Relaxed),
            sink_failures: self.sink_failures.load(Ordering::Relaxed),
            cooldowns_expired: self.cooldowns_expired.load(Ordering::Relaxed),
            stale_expiries: self.stale_expiries.load(Ordering::Relaxed),
        }
    }

    /// Get a summary string for display.
    pub fn summary(&self) -> String {
        let stats = self.stats();
        format!(
            "Session {}:\n\
             - Samples processed: {} ({} ticks skipped)\n\
             - Reflex blinks: {}\n\
             - Voluntary blinks: {}\n\
             - Clenches: {}\n\
             - Double clenches: {}\n\
             - Actions triggered: {} ({} sink failures)\n\
             - Cooldowns expired: {} ({} superseded)\n\
             - Session duration: {} seconds",
            stats.session_id,
            stats.samples_processed,
            stats.samples_skipped,
            stats.reflex_blinks,
            stats.voluntary_blinks,
            stats.clenches,
            stats.double_clenches,
            stats.triggers_fired,
            stats.sink_failures,
            stats.cooldowns_expired,
            stats.stale_expiries,
            stats.session_duration_secs
        )
    }

    /// Reset all counters.
    pub fn reset(&self) {
        for counter in [
            &self.samples_processed,
            &self.samples_skipped,
            &self.none_events,
            &self.reflex_blinks,
            &self.voluntary_blinks,
            &self.clenches,
            &self.double_clenches,
            &self.triggers_fired,
            &self.sink_failures,
            &self.cooldowns_expired,
            &self.stale_expiries,
        ] {
            counter.store(0, Ordering::Relaxed);
        }
    }
}

impl Default for SessionStats {
    fn default() -> Self {
        Self::new()
    }
}

/// Point-in-time copy of the session counters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatsSnapshot {
    pub session_id: Uuid,
    pub session_start: DateTime<Utc>,
    pub session_duration_secs: u64,
    pub samples_processed: u64,
    pub samples_skipped: u64,
    pub none_events: u64,
    pub reflex_blinks: u64,
    pub voluntary_blinks: u64,
    pub clenches: u64,
    pub double_clenches: u64,
    pub triggers_fired: u64,
    pub sink_failures: u64,
    pub cooldowns_expired: u64,
    pub stale_expiries: u64,
}

/// Thread-safe shared statistics.
pub type SharedStats = Arc<SessionStats>;

/// Create a new shared statistics instance.
pub fn create_shared_stats() -> SharedStats {
    Arc::new(SessionStats::new())
}
