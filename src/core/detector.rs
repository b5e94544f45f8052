//! Double-clench gesture detection with a generation-counted cooldown.
//!
//! After every push the history is scanned oldest to newest. A scan only
//! starts when the oldest slot is a clench; a clench elsewhere is picked up
//! later, once it has aged into the oldest slot. Walking forward, elapsed
//! time grows by one sample interval per slot, and a later clench whose
//! elapsed time is strictly between the minimum and maximum gap is a match.
//!
//! A match resets the history and arms the detector. While armed, every
//! plain clench bumps the trigger count and fires the matching action.
//! Each arming bumps a generation counter; a cooldown expiry carrying an
//! older generation is ignored.

use crate::config::{ConfigError, DetectorConfig};
use crate::core::classifier::{Event, EventType, SynthesizedEventType};
use crate::core::history::EventHistory;
use crate::sink::ActionSink;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Notification title for a detected double clench.
pub const DOUBLE_CLENCH_TITLE: &str = "Double Clench";
/// Notification body for a detected double clench.
pub const DOUBLE_CLENCH_BODY: &str = "Reset to workspace 1";
/// Notification title for a clench while suppressed; the body is the count.
pub const CLENCH_TITLE: &str = "Clench";

/// Coarse detector phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Idle,
    Suppressed,
}

/// Armed flag, trigger counter and arming generation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuppressionState {
    pub armed: bool,
    pub trigger_count: u32,
    /// Bumped on every arming; identifies the cooldown that may clear it
    pub generation: u64,
}

impl SuppressionState {
    pub fn phase(&self) -> Phase {
        if self.armed {
            Phase::Suppressed
        } else {
            Phase::Idle
        }
    }
}

/// Cooldown to schedule after an arming.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cooldown {
    pub generation: u64,
    pub duration: Duration,
}

/// Result of processing one event.
#[derive(Debug, Clone, PartialEq)]
pub struct Step {
    pub event_type: EventType,
    /// Synthesized event detected on this step, if any
    pub detected: Option<SynthesizedEventType>,
    /// Cooldown the caller must schedule, set whenever the detector armed
    pub cooldown: Option<Cooldown>,
    /// Number of `trigger` calls made
    pub triggers: u32,
    /// Number of sink calls that failed
    pub sink_failures: u32,
}

impl Step {
    fn new(event_type: EventType) -> Self {
        Self {
            event_type,
            detected: None,
            cooldown: None,
            triggers: 0,
            sink_failures: 0,
        }
    }
}

/// Serializable view of the detector for status output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectorSnapshot {
    pub phase: Phase,
    pub trigger_count: u32,
    pub generation: u64,
    pub history: String,
}

/// Scan a history for a double clench.
///
/// Returns the elapsed time between the oldest slot and the first later
/// clench inside `(min_gap, max_gap)`.
pub fn find_double_clench(
    history: &EventHistory,
    spacing: Duration,
    min_gap: Duration,
    max_gap: Duration,
) -> Option<Duration> {
    if !history.oldest().is(EventType::Clench) {
        return None;
    }

    let mut elapsed = Duration::ZERO;
    for event in history.scan() {
        if event.is(EventType::Clench) && elapsed > min_gap && elapsed < max_gap {
            return Some(elapsed);
        }
        elapsed = elapsed.saturating_add(spacing);
    }
    None
}

/// Owns the event history and the suppression state.
#[derive(Debug, Clone)]
pub struct GestureDetector {
    history: EventHistory,
    state: SuppressionState,
    sample_interval: Duration,
    min_gap: Duration,
    max_gap: Duration,
    cooldown: Duration,
}

impl GestureDetector {
    pub fn new(config: &DetectorConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            history: EventHistory::new(config.history_length)?,
            state: SuppressionState::default(),
            sample_interval: config.sample_interval,
            min_gap: config.double_clench_min_gap,
            max_gap: config.double_clench_max_gap,
            cooldown: config.cooldown,
        })
    }

    /// Feed one classified event through the detector.
    pub fn process(&mut self, event: Event, sink: &dyn ActionSink) -> Step {
        let mut step = Step::new(event.event_type);

        if event.is(EventType::Clench) && self.state.armed {
            self.state.trigger_count += 1;
            let count = self.state.trigger_count;
            tracing::info!(count, "clench while suppressed");

            self.notify(sink, CLENCH_TITLE, &count.to_string(), &mut step);
            self.trigger(sink, count, &mut step);
        }

        self.history.push(event);

        if let Some(gap) = find_double_clench(
            &self.history,
            self.sample_interval,
            self.min_gap,
            self.max_gap,
        ) {
            self.history.reset();

            let rearm = self.state.armed;
            self.state.armed = true;
            self.state.trigger_count = 1;
            self.state.generation += 1;
            tracing::info!(
                gap_ms = gap.as_millis() as u64,
                generation = self.state.generation,
                rearm,
                "{}",
                SynthesizedEventType::DoubleClench.label()
            );

            self.notify(sink, DOUBLE_CLENCH_TITLE, DOUBLE_CLENCH_BODY, &mut step);
            self.trigger(sink, 1, &mut step);

            step.detected = Some(SynthesizedEventType::DoubleClench);
            step.cooldown = Some(Cooldown {
                generation: self.state.generation,
                duration: self.cooldown,
            });
        }

        step
    }

    /// Handle a cooldown expiry. Returns `true` if it cleared the state.
    ///
    /// Expiries from superseded armings are no-ops.
    pub fn expire(&mut self, generation: u64) -> bool {
        if !self.state.armed || generation != self.state.generation {
            tracing::debug!(
                generation,
                current = self.state.generation,
                "ignoring stale cooldown expiry"
            );
            return false;
        }

        tracing::info!(
            generation,
            triggers = self.state.trigger_count,
            "cooldown expired"
        );
        self.state.armed = false;
        self.state.trigger_count = 0;
        true
    }

    pub fn state(&self) -> SuppressionState {
        self.state
    }

    pub fn history(&self) -> &EventHistory {
        &self.history
    }

    pub fn snapshot(&self) -> DetectorSnapshot {
        DetectorSnapshot {
            phase: self.state.phase(),
            trigger_count: self.state.trigger_count,
            generation: self.state.generation,
            history: self.history.render(),
        }
    }

    fn notify(&self, sink: &dyn ActionSink, title: &str, body: &str, step: &mut Step) {
        if let Err(e) = sink.notify(title, body) {
            tracing::warn!(title, "notification failed: {e}");
            step.sink_failures += 1;
        }
    }

    fn trigger(&self, sink: &dyn ActionSink, index: u32, step: &mut Step) {
        step.triggers += 1;
        if let Err(e) = sink.trigger(index) {
            tracing::warn!(index, "action failed: {e}");
            step.sink_failures += 1;
        }
    }
}
