//! Exponentially weighted moving average over raw headset readings.
//!
//! Two flavours, picked by age like the usual metrics EWMA:
//!
//! - age [`DEFAULT_AGE`] (30): a simple average with a fixed decay. The
//!   first reading becomes the value, and an average sitting at exactly 0.0
//!   is treated as uninitialised and re-seeded by the next reading.
//! - any other age: decay `2 / (age + 1)` with a warm-up. The first
//!   [`WARMUP_SAMPLES`] readings are only summed and `value()` reports 0.0
//!   until the next reading seeds the average with their mean.
//!
//! In both cases 0.0 is what an average with nothing to report looks like,
//! which is why the ticker can skip zero-valued ticks.

/// Age that selects the simple (no warm-up) average.
pub const DEFAULT_AGE: u32 = 30;

/// Readings consumed before a warm-up average reports a value.
pub const WARMUP_SAMPLES: u32 = 10;

#[derive(Debug, Clone)]
enum Mode {
    Simple,
    WarmUp { count: u32 },
}

/// EWMA with decay `2 / (age + 1)`.
#[derive(Debug, Clone)]
pub struct MovingAverage {
    decay: f64,
    value: f64,
    mode: Mode,
}

impl MovingAverage {
    /// Create an average over roughly `age` readings. An age of 0 is
    /// treated as 1.
    pub fn new(age: u32) -> Self {
        let mode = if age == DEFAULT_AGE {
            Mode::Simple
        } else {
            Mode::WarmUp { count: 0 }
        };
        let age = f64::from(age.max(1));
        Self {
            decay: 2.0 / (age + 1.0),
            value: 0.0,
            mode,
        }
    }

    pub fn add(&mut self, reading: f64) {
        let blended = |value: f64, decay: f64| reading * decay + value * (1.0 - decay);

        match &mut self.mode {
            Mode::Simple => {
                self.value = if self.value == 0.0 {
                    reading
                } else {
                    blended(self.value, self.decay)
                };
            }
            Mode::WarmUp { count } if *count < WARMUP_SAMPLES => {
                *count += 1;
                self.value += reading;
            }
            Mode::WarmUp { count } if *count == WARMUP_SAMPLES => {
                *count += 1;
                let seed = self.value / f64::from(WARMUP_SAMPLES);
                self.value = blended(seed, self.decay);
            }
            Mode::WarmUp { .. } => {
                self.value = blended(self.value, self.decay);
            }
        }
    }

    /// Current smoothed value, 0.0 while nothing can be reported.
    pub fn value(&self) -> f64 {
        if self.is_warm() {
            self.value
        } else {
            0.0
        }
    }

    /// Whether the average has left its warm-up (always true for the
    /// simple flavour).
    pub fn is_warm(&self) -> bool {
        match self.mode {
            Mode::Simple => true,
            Mode::WarmUp { count } => count > WARMUP_SAMPLES,
        }
    }

    pub fn decay(&self) -> f64 {
        self.decay
    }
}
