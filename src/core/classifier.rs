//! Threshold-based classification of smoothed EMG amplitudes.
//!
//! Each sample is mapped to exactly one [`EventType`]. Bands are checked
//! in a fixed order and the first match wins:
//!
//! 1. outside the plausible signal range → `None`
//! 2. reflex blink band
//! 3. voluntary blink band
//! 4. clench band
//!
//! With the default thresholds the bands do not overlap, so the order does
//! not change any result. Retuned thresholds that reintroduce overlap make
//! the result order dependent; the order above is kept as is.

use crate::config::{Band, ConfigError, DetectorConfig};
use serde::{Deserialize, Serialize};

/// A single smoothed amplitude reading (unit-less).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RawSample {
    pub value: f64,
}

impl RawSample {
    pub fn new(value: f64) -> Self {
        Self { value }
    }
}

/// Discrete physiological event category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    #[default]
    None,
    ReflexBlink,
    VoluntaryBlink,
    Clench,
}

impl EventType {
    /// Short label used in logs.
    pub fn label(&self) -> &'static str {
        match self {
            EventType::None => "none",
            EventType::ReflexBlink => "rblink",
            EventType::VoluntaryBlink => "vblink",
            EventType::Clench => "clench",
        }
    }
}

impl std::fmt::Display for EventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Higher-order event derived from a pattern of [`Event`]s.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SynthesizedEventType {
    DoubleClench,
}

impl SynthesizedEventType {
    pub fn label(&self) -> &'static str {
        match self {
            SynthesizedEventType::DoubleClench => "dclench",
        }
    }
}

/// A sample together with its classification.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub sample: RawSample,
    pub event_type: EventType,
}

impl Event {
    pub fn new(sample: RawSample, event_type: EventType) -> Self {
        Self { sample, event_type }
    }

    /// Placeholder event used to seed and reset the history.
    pub fn none() -> Self {
        Self::new(RawSample::new(0.0), EventType::None)
    }

    pub fn is(&self, event_type: EventType) -> bool {
        self.event_type == event_type
    }
}

/// Maps raw amplitudes to event types.
#[derive(Debug, Clone)]
pub struct Classifier {
    signal_range: Band,
    reflex_blink: Band,
    voluntary_blink: Band,
    clench: Band,
}

impl Classifier {
    /// Build a classifier from validated thresholds.
    pub fn new(config: &DetectorConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            signal_range: config.signal_range,
            reflex_blink: config.reflex_blink,
            voluntary_blink: config.voluntary_blink,
            clench: config.clench,
        })
    }

    /// Classify a sample. Total over every `f64`.
    ///
    /// Values sitting exactly on a band edge, and NaN, match no band and
    /// fall through to `None`.
    pub fn classify(&self, sample: RawSample) -> EventType {
        let value = sample.value;

        if value > self.signal_range.max || value < self.signal_range.min {
            EventType::None
        } else if self.reflex_blink.contains(value) {
            EventType::ReflexBlink
        } else if self.voluntary_blink.contains(value) {
            EventType::VoluntaryBlink
        } else if self.clench.contains(value) {
            EventType::Clench
        } else {
            EventType::None
        }
    }

    /// Classify a sample and wrap it as an [`Event`].
    pub fn event(&self, sample: RawSample) -> Event {
        Event::new(sample, self.classify(sample))
    }

    /// Bands in the order they are checked, with their resulting type.
    pub fn bands(&self) -> [(EventType, Band); 3] {
        [
            (EventType::ReflexBlink, self.reflex_blink),
            (EventType::VoluntaryBlink, self.voluntary_blink),
            (EventType::Clench, self.clench),
        ]
    }

    pub fn signal_range(&self) -> Band {
        self.signal_range
    }
}

impl Default for Classifier {
    fn default() -> Self {
        let config = DetectorConfig::default();
        Self {
            signal_range: config.signal_range,
            reflex_blink: config.reflex_blink,
            voluntary_blink: config.voluntary_blink,
            clench: config.clench,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classify(value: f64) -> EventType {
        Classifier::default().classify(RawSample::new(value))
    }

    #[test]
    fn test_out_of_range_is_none() {
        for value in [10.5, 11.0, 500.0, f64::INFINITY, -200.5, -1_000.0, f64::NEG_INFINITY] {
            assert_eq!(classify(value), EventType::None, "value {value}");
        }
    }

    #[test]
    fn test_reflex_blink_band() {
        for value in [-9.99, -5.0, 0.0, 3.2, 9.99] {
            assert_eq!(classify(value), EventType::ReflexBlink, "value {value}");
        }
    }

    #[test]
    fn test_voluntary_blink_band() {
        for value in [-10.01, -35.0, -69.99] {
            assert_eq!(classify(value), EventType::VoluntaryBlink, "value {value}");
        }
    }

    #[test]
    fn test_clench_band() {
        for value in [-70.01, -120.0, -199.99] {
            assert_eq!(classify(value), EventType::Clench, "value {value}");
        }
    }

    #[test]
    fn test_band_edges_fall_through_to_none() {
        for value in [10.0, -10.0, -70.0, -200.0, f64::NAN] {
            assert_eq!(classify(value), EventType::None, "value {value}");
        }
    }

    #[test]
    fn test_check_order_with_overlapping_bands() {
        // Reflex band widened over the voluntary band: reflex is checked first.
        let config = DetectorConfig {
            reflex_blink: Band::new(-50.0, 10.0),
            ..Default::default()
        };
        let classifier = Classifier::new(&config).unwrap();
        assert_eq!(
            classifier.classify(RawSample::new(-30.0)),
            EventType::ReflexBlink
        );
        assert_eq!(
            classifier.classify(RawSample::new(-60.0)),
            EventType::VoluntaryBlink
        );
    }

    #[test]
    fn test_invalid_thresholds_fail_at_construction() {
        let config = DetectorConfig {
            voluntary_blink: Band::new(-10.0, -70.0),
            ..Default::default()
        };
        assert!(Classifier::new(&config).is_err());
    }

    #[test]
    fn test_event_keeps_sample() {
        let event = Classifier::default().event(RawSample::new(-100.0));
        assert_eq!(event.sample.value, -100.0);
        assert!(event.is(EventType::Clench));
    }

    #[test]
    fn test_labels() {
        assert_eq!(EventType::Clench.to_string(), "clench");
        assert_eq!(EventType::ReflexBlink.label(), "rblink");
        assert_eq!(SynthesizedEventType::DoubleClench.label(), "dclench");
    }
}
