//! In-memory sink that records every call.

use super::{ActionSink, SinkError};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

/// A single recorded sink invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SinkCall {
    Notify { title: String, body: String },
    Trigger(u32),
}

/// Records calls in order. Clones share the same log.
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    calls: Arc<Mutex<Vec<SinkCall>>>,
    failing: Arc<AtomicBool>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent call fail (after recording it).
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// All calls recorded so far.
    pub fn calls(&self) -> Vec<SinkCall> {
        self.lock().clone()
    }

    /// Indices passed to `trigger`, in order.
    pub fn triggers(&self) -> Vec<u32> {
        self.lock()
            .iter()
            .filter_map(|c| match c {
                SinkCall::Trigger(i) => Some(*i),
                SinkCall::Notify { .. } => None,
            })
            .collect()
    }

    /// Drop everything recorded so far.
    pub fn clear(&self) {
        self.lock().clear();
    }

    fn lock(&self) -> MutexGuard<'_, Vec<SinkCall>> {
        self.calls.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn record(&self, call: SinkCall) -> Result<(), SinkError> {
        let description = format!("{call:?}");
        self.lock().push(call);
        if self.failing.load(Ordering::SeqCst) {
            return Err(SinkError::Spawn(description));
        }
        Ok(())
    }
}

impl ActionSink for RecordingSink {
    fn notify(&self, title: &str, body: &str) -> Result<(), SinkError> {
        self.record(SinkCall::Notify {
            title: title.to_string(),
            body: body.to_string(),
        })
    }

    fn trigger(&self, index: u32) -> Result<(), SinkError> {
        self.record(SinkCall::Trigger(index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_records_in_order() {
        let sink = RecordingSink::new();
        let shared = sink.clone();

        sink.trigger(1).unwrap();
        sink.notify("Clench", "2").unwrap();
        sink.trigger(2).unwrap();

        assert_eq!(shared.triggers(), vec![1, 2]);
        assert_eq!(
            shared.calls()[1],
            SinkCall::Notify {
                title: "Clench".to_string(),
                body: "2".to_string()
            }
        );

        shared.clear();
        assert!(sink.calls().is_empty());
    }

    #[test]
    fn test_failing_still_records() {
        let sink = RecordingSink::new();
        sink.set_failing(true);
        assert!(sink.trigger(4).is_err());
        assert_eq!(sink.triggers(), vec![4]);
    }
}
