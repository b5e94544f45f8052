//! Raw reading source backed by a text stream.
//!
//! Stands in for the headset connection: one reading per line, read on a
//! background thread and delivered over a bounded channel. Blank lines and
//! `#` comments are skipped; lines that do not parse are logged and
//! skipped.

use super::SourceError;
use crossbeam_channel::{bounded, Receiver, Sender};
use std::io::BufRead;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// Reads raw readings from a `BufRead` on its own thread.
pub struct ReplaySource {
    input: Option<Box<dyn BufRead + Send>>,
    sender: Option<Sender<f64>>,
    receiver: Receiver<f64>,
    running: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
    pace: Option<Duration>,
}

impl ReplaySource {
    /// Create a source over `input` with room for `capacity` buffered readings.
    pub fn new(input: Box<dyn BufRead + Send>, capacity: usize) -> Self {
        let (sender, receiver) = bounded(capacity.max(1));
        Self {
            input: Some(input),
            sender: Some(sender),
            receiver,
            running: Arc::new(AtomicBool::new(false)),
            handle: None,
            pace: None,
        }
    }

    /// Emit readings at `rate_hz` instead of as fast as they can be read,
    /// mimicking a live headset. A rate of 0 disables pacing.
    pub fn with_rate(mut self, rate_hz: u32) -> Self {
        self.pace = (rate_hz > 0).then(|| Duration::from_secs_f64(1.0 / f64::from(rate_hz)));
        self
    }

    /// Start the reader thread. A source can only be started once.
    pub fn start(&mut self) -> Result<(), SourceError> {
        let (input, sender) = match (self.input.take(), self.sender.take()) {
            (Some(input), Some(sender)) => (input, sender),
            _ => return Err(SourceError::AlreadyRunning),
        };

        self.running.store(true, Ordering::SeqCst);
        let running = Arc::clone(&self.running);
        let pace = self.pace;

        let handle = thread::Builder::new()
            .name("emg-replay".to_string())
            .spawn(move || {
                read_lines(input, &sender, &running, pace);
                running.store(false, Ordering::SeqCst);
            })
            .map_err(|e| SourceError::Io(e.to_string()))?;

        self.handle = Some(handle);
        Ok(())
    }

    /// Ask the reader thread to stop after its current line.
    pub fn stop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
    }

    /// Check if the reader thread is still producing.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Get the receiver for raw readings.
    pub fn receiver(&self) -> &Receiver<f64> {
        &self.receiver
    }

    /// Try to receive a reading without blocking.
    pub fn try_recv(&self) -> Option<f64> {
        self.receiver.try_recv().ok()
    }
}

impl Drop for ReplaySource {
    fn drop(&mut self) {
        self.stop();
        // The reader may be blocked on a full channel; detach rather than join.
        self.handle.take();
    }
}

/// Parse one input line. `None` for blank lines and comments.
pub fn parse_line(line: &str) -> Option<Result<f64, String>> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return None;
    }
    Some(line.parse::<f64>().map_err(|e| format!("{line:?}: {e}")))
}

fn read_lines(
    input: Box<dyn BufRead + Send>,
    sender: &Sender<f64>,
    running: &AtomicBool,
    pace: Option<Duration>,
) {
    for (number, line) in input.lines().enumerate() {
        if !running.load(Ordering::SeqCst) {
            break;
        }

        let line = match line {
            Ok(line) => line,
            Err(e) => {
                tracing::warn!("stopping replay after read error: {e}");
                break;
            }
        };

        match parse_line(&line) {
            None => continue,
            Some(Ok(reading)) => {
                if sender.send(reading).is_err() {
                    break;
                }
                if let Some(pace) = pace {
                    thread::sleep(pace);
                }
            }
            Some(Err(e)) => tracing::warn!(line = number + 1, "skipping unparseable reading {e}"),
        }
    }
    tracing::debug!("replay input exhausted");
}
