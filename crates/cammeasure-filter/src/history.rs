use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

/// One stabilized observation.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct Sample {
    pub value: f64,
    pub timestamp_ms: f64,
    pub confidence: f32,
}

/// Bounded ring of recent observations for one `(object, dimension)` key.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct HistoryRing {
    window: usize,
    samples: VecDeque<Sample>,
}

impl HistoryRing {
    pub fn new(window: usize) -> Self {
        Self {
            window: window.max(1),
            samples: VecDeque::with_capacity(window.max(1)),
        }
    }

    pub fn push(&mut self, sample: Sample) {
        if self.samples.len() == self.window {
            self.samples.pop_front();
        }
        self.samples.push_back(sample);
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Sample> {
        self.samples.iter()
    }

    pub fn mean(&self) -> Option<f64> {
        if self.samples.is_empty() {
            return None;
        }
        Some(self.samples.iter().map(|s| s.value).sum::<f64>() / self.samples.len() as f64)
    }

    /// Population standard deviation of the stored values.
    pub fn std_dev(&self) -> Option<f64> {
        let mean = self.mean()?;
        let var = self
            .samples
            .iter()
            .map(|s| (s.value - mean) * (s.value - mean))
            .sum::<f64>()
            / self.samples.len() as f64;
        Some(var.sqrt())
    }

    /// Confidence-weighted mean; falls back to the plain mean when every
    /// stored confidence is zero.
    pub fn weighted_mean(&self) -> Option<f64> {
        if self.samples.is_empty() {
            return None;
        }
        let weight_sum: f64 = self.samples.iter().map(|s| s.confidence as f64).sum();
        if weight_sum <= 0.0 {
            return self.mean();
        }
        let sum: f64 = self
            .samples
            .iter()
            .map(|s| s.value * s.confidence as f64)
            .sum();
        Some(sum / weight_sum)
    }

    /// Exponential-decay temporal blend of the history with the current
    /// sample.
    ///
    /// Each stored sample is weighted `exp(-age_ms/tau_ms) * confidence`;
    /// the current sample contributes with its own confidence. Weights are
    /// normalized, so a degenerate all-zero weight set returns the current
    /// value unchanged.
    pub fn smoothed(&self, current: Sample, tau_ms: f64) -> f64 {
        let tau = tau_ms.max(1e-9);
        let mut weight_sum = current.confidence as f64;
        let mut sum = current.value * current.confidence as f64;
        for s in &self.samples {
            let age = (current.timestamp_ms - s.timestamp_ms).max(0.0);
            let w = (-age / tau).exp() * s.confidence as f64;
            sum += s.value * w;
            weight_sum += w;
        }
        if weight_sum <= 0.0 {
            return current.value;
        }
        sum / weight_sum
    }

    /// Coefficient of variation of the stored values, clamped to [0, 1].
    /// `None` with fewer than 2 samples.
    pub fn normalized_variance(&self) -> Option<f64> {
        if self.samples.len() < 2 {
            return None;
        }
        let mean = self.mean()?;
        let sd = self.std_dev()?;
        if mean.abs() < 1e-9 {
            return Some(1.0);
        }
        Some((sd / mean.abs()).clamp(0.0, 1.0))
    }
}
