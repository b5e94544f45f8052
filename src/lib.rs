//! EMG Gesture Agent - threshold classification and double-clench detection.
//!
//! This library turns a stream of smoothed EMG/EEG amplitude samples into
//! discrete events (reflex blink, voluntary blink, clench) and detects a
//! double-clench gesture from the spacing of clenches in a short sliding
//! history. A detected gesture opens a cooldown during which each further
//! clench fires the next numbered action.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                      EMG Gesture Agent                       │
//! ├──────────────────────────────────────────────────────────────┤
//! │  ┌────────────┐   ┌────────────┐   ┌────────────┐            │
//! │  │   Source   │──▶│ Classifier │──▶│  History   │            │
//! │  │ (EWMA/50ms)│   │ (bands)    │   │ (25 slots) │            │
//! │  └────────────┘   └────────────┘   └────────────┘            │
//! │                                          │                   │
//! │                                          ▼                   │
//! │  ┌────────────┐   cooldown expiry  ┌────────────┐            │
//! │  │   Timer    │───────────────────▶│  Detector  │──▶ Sink    │
//! │  └────────────┘   (same channel)   └────────────┘            │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```
//! use emg_gesture_agent::{core::EventType, DetectorConfig, Pipeline, RecordingSink};
//! use emg_gesture_agent::stats::create_shared_stats;
//!
//! let config = DetectorConfig::default();
//! let sink = RecordingSink::new();
//! let mut pipeline = Pipeline::new(&config, sink.clone(), create_shared_stats()).unwrap();
//!
//! let step = pipeline.process_sample(-120.0);
//! assert_eq!(step.event_type, EventType::Clench);
//! assert!(sink.calls().is_empty());
//! ```

pub mod config;
pub mod core;
pub mod pipeline;
pub mod sink;
pub mod source;
pub mod stats;

// Re-export key types at crate root for convenience
pub use config::{ActionConfig, Band, Config, ConfigError, DetectorConfig, SourceConfig};
pub use core::{
    Classifier, Event, EventHistory, EventType, GestureDetector, RawSample, SynthesizedEventType,
};
pub use pipeline::{Pipeline, PipelineMessage};
pub use sink::{ActionSink, CommandSink, LogSink, RecordingSink, SinkCall, SinkError};
pub use source::{MovingAverage, ReplaySource, SampleTicker, SourceError};
pub use stats::{create_shared_stats, SessionStats, SharedStats, StatsSnapshot};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_reexports() {
        let classifier = Classifier::default();
        assert_eq!(
            classifier.classify(RawSample::new(-40.0)),
            EventType::VoluntaryBlink
        );
        assert!(!VERSION.is_empty());
    }
}
