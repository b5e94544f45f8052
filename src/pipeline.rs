//! Single-consumer processing loop.
//!
//! Samples and cooldown expiries share one channel and are handled one at a
//! time by [`Pipeline::run`], so a timer can never clear the suppression
//! state in the middle of a sample. Each arming spawns a sleeper thread that
//! posts `CooldownExpired` back into the same channel; the detector drops
//! expiries whose generation is no longer current.

use crate::config::{ConfigError, DetectorConfig};
use crate::core::{Classifier, Cooldown, DetectorSnapshot, GestureDetector, RawSample, Step};
use crate::sink::ActionSink;
use crate::stats::SharedStats;
use crossbeam_channel::{unbounded, Receiver, Sender};
use std::thread;

/// Messages consumed by the pipeline.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PipelineMessage {
    /// One smoothed sample
    Sample(f64),
    /// A cooldown timer fired for the given arming
    CooldownExpired { generation: u64 },
    /// Stop processing
    Shutdown,
}

/// Classifier, detector and sink wired to one input channel.
pub struct Pipeline<S: ActionSink> {
    classifier: Classifier,
    detector: GestureDetector,
    sink: S,
    stats: SharedStats,
    sender: Sender<PipelineMessage>,
    receiver: Receiver<PipelineMessage>,
}

impl<S: ActionSink> Pipeline<S> {
    pub fn new(config: &DetectorConfig, sink: S, stats: SharedStats) -> Result<Self, ConfigError> {
        let (sender, receiver) = unbounded();
        Ok(Self {
            classifier: Classifier::new(config)?,
            detector: GestureDetector::new(config)?,
            sink,
            stats,
            sender,
            receiver,
        })
    }

    /// A producer handle for samples (or an external shutdown).
    pub fn sender(&self) -> Sender<PipelineMessage> {
        self.sender.clone()
    }

    /// Classify one sample and run it through the detector.
    pub fn process_sample(&mut self, value: f64) -> Step {
        let event = self.classifier.event(RawSample::new(value));
        tracing::debug!(value, event = %event.event_type, "classified");

        let step = self.detector.process(event, &self.sink);
        self.stats.record_step(&step);

        if let Some(cooldown) = step.cooldown {
            self.schedule(cooldown);
        }
        step
    }

    /// Handle one message. Returns `false` once the pipeline should stop.
    pub fn handle(&mut self, message: PipelineMessage) -> bool {
        match message {
            PipelineMessage::Sample(value) => {
                self.process_sample(value);
                true
            }
            PipelineMessage::CooldownExpired { generation } => {
                let cleared = self.detector.expire(generation);
                self.stats.record_expiry(cleared);
                true
            }
            PipelineMessage::Shutdown => false,
        }
    }

    /// Process messages until `Shutdown` arrives.
    pub fn run(mut self) -> DetectorSnapshot {
        while let Ok(message) = self.receiver.recv() {
            if !self.handle(message) {
                break;
            }
        }
        tracing::debug!("pipeline stopped");
        self.detector.snapshot()
    }

    pub fn detector(&self) -> &GestureDetector {
        &self.detector
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    fn schedule(&self, cooldown: Cooldown) {
        let sender = self.sender.clone();
        let spawned = thread::Builder::new()
            .name(format!("cooldown-{}", cooldown.generation))
            .spawn(move || {
                thread::sleep(cooldown.duration);
                let _ = sender.send(PipelineMessage::CooldownExpired {
                    generation: cooldown.generation,
                });
            });

        if let Err(e) = spawned {
            tracing::warn!(
                generation = cooldown.generation,
                "could not start cooldown timer: {e}"
            );
        }
    }
}
