//! Sample delivery glue between a raw reading stream and the pipeline.
//!
//! Raw readings are smoothed by a [`MovingAverage`]; on every tick of the
//! sample interval the [`SampleTicker`] emits the current smoothed value as
//! one pipeline sample, skipping ticks where the average is exactly zero.

pub mod replay;
pub mod smoothing;

pub use replay::ReplaySource;
pub use smoothing::{MovingAverage, DEFAULT_AGE, WARMUP_SAMPLES};

use crate::config::{DetectorConfig, SourceConfig};
use crate::pipeline::PipelineMessage;
use crate::stats::SharedStats;
use crossbeam_channel::{Receiver, Sender, TryRecvError};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Errors that can occur while reading raw samples.
#[derive(Debug)]
pub enum SourceError {
    AlreadyRunning,
    Io(String),
}

impl std::fmt::Display for SourceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SourceError::AlreadyRunning => write!(f, "Source is already running"),
            SourceError::Io(e) => write!(f, "IO error: {e}"),
        }
    }
}

impl std::error::Error for SourceError {}

/// What a single tick produced.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Tick {
    /// A smoothed sample ready for classification
    Sample(f64),
    /// No sample this tick (average has nothing to report)
    Skipped,
    /// The reading stream is closed and fully drained
    Exhausted,
}

/// Turns a stream of raw readings into one smoothed sample per interval.
#[derive(Debug, Clone)]
pub struct SampleTicker {
    interval: Duration,
    skip_zero: bool,
    average: MovingAverage,
}

impl SampleTicker {
    pub fn new(detector: &DetectorConfig, source: &SourceConfig) -> Self {
        Self {
            interval: detector.sample_interval,
            skip_zero: source.skip_zero,
            average: MovingAverage::new(source.smoothing_age),
        }
    }

    /// Drain pending readings into the average and produce this tick's result.
    pub fn tick(&mut self, readings: &Receiver<f64>) -> Tick {
        let mut drained = 0usize;
        let mut disconnected = false;

        loop {
            match readings.try_recv() {
                Ok(reading) => {
                    self.average.add(reading);
                    drained += 1;
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    disconnected = true;
                    break;
                }
            }
        }

        if disconnected && drained == 0 {
            return Tick::Exhausted;
        }

        let value = self.average.value();
        if self.skip_zero && value == 0.0 {
            Tick::Skipped
        } else {
            Tick::Sample(value)
        }
    }

    /// Tick at the sample interval until the readings are exhausted or
    /// `running` is cleared, then send `Shutdown`.
    pub fn run(
        mut self,
        readings: Receiver<f64>,
        output: Sender<PipelineMessage>,
        running: Arc<AtomicBool>,
        stats: SharedStats,
    ) {
        let ticker = crossbeam_channel::tick(self.interval);

        while running.load(Ordering::SeqCst) {
            if ticker.recv().is_err() {
                break;
            }

            match self.tick(&readings) {
                Tick::Sample(value) => {
                    if output.send(PipelineMessage::Sample(value)).is_err() {
                        return;
                    }
                }
                Tick::Skipped => stats.record_skipped(),
                Tick::Exhausted => break,
            }
        }

        let _ = output.send(PipelineMessage::Shutdown);
    }
}
