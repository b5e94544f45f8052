//! Core functionality for the EMG gesture agent.
//!
//! This module contains:
//! - Threshold classification of smoothed samples into event types
//! - The fixed-length sliding history of classified events
//! - The double-clench detector and its cooldown state machine

pub mod classifier;
pub mod detector;
pub mod history;

// Re-export commonly used types
pub use classifier::{Classifier, Event, EventType, RawSample, SynthesizedEventType};
pub use detector::{
    find_double_clench, Cooldown, DetectorSnapshot, GestureDetector, Phase, Step,
    SuppressionState, CLENCH_TITLE, DOUBLE_CLENCH_BODY, DOUBLE_CLENCH_TITLE,
};
pub use history::EventHistory;
