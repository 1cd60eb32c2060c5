use serde::Serialize;

/// Average age, in samples, of the moving average.
const AVG_SAMPLE_AGE: f64 = 30.0;

/// Exponentially weighted moving average with a fixed decay.
///
/// The first sample seeds the average directly.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Ewma {
    value: f64,
    samples: u64,
}

impl Ewma {
    pub const DECAY: f64 = 2.0 / (AVG_SAMPLE_AGE + 1.0);

    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, sample: f64) {
        if self.samples == 0 {
            self.value = sample;
        } else {
            self.value = sample * Self::DECAY + self.value * (1.0 - Self::DECAY);
        }
        self.samples = self.samples.saturating_add(1);
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn samples(&self) -> u64 {
        self.samples
    }
}
