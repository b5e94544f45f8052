//! Side-effect sinks invoked by the gesture detector.
//!
//! The detector only ever calls [`ActionSink::notify`] and
//! [`ActionSink::trigger`]. Both are fire-and-forget: a failure is logged
//! and counted by the caller, never propagated into the pipeline.

pub mod command;
pub mod recording;

pub use command::CommandSink;
pub use recording::{RecordingSink, SinkCall};

/// Capability the detector uses for user-visible side effects.
pub trait ActionSink: Send {
    /// Show a user notification.
    fn notify(&self, title: &str, body: &str) -> Result<(), SinkError>;

    /// Run the external action with the given index.
    fn trigger(&self, index: u32) -> Result<(), SinkError>;
}

/// Errors raised by a sink. Callers log and drop them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SinkError {
    /// The external program could not be started
    Spawn(String),
    /// The requested action does not exist
    Unavailable(String),
}

impl std::fmt::Display for SinkError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SinkError::Spawn(e) => write!(f, "failed to spawn action: {e}"),
            SinkError::Unavailable(e) => write!(f, "action unavailable: {e}"),
        }
    }
}

impl std::error::Error for SinkError {}

/// Sink that only logs. Used for dry runs.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSink;

impl ActionSink for LogSink {
    fn notify(&self, title: &str, body: &str) -> Result<(), SinkError> {
        tracing::info!(title, body, "notify");
        Ok(())
    }

    fn trigger(&self, index: u32) -> Result<(), SinkError> {
        tracing::info!(index, "trigger");
        Ok(())
    }
}
