//! Per-dimension measurement stabilization.
//!
//! Each observed dimension runs through: outlier replacement against the
//! recent history, a scalar Kalman update, a history push, and (for width
//! and height) exponential-decay temporal smoothing. Area and perimeter
//! are recomputed from the smoothed width/height so the reported record
//! stays internally consistent.
//!
//! State machine per `(object, dimension)` key:
//! Uninitialized -> Warming (history < 3) -> Stable. There is no terminal
//! state; idle entries are removed by the caller's `FilterStore::sweep`.

use cammeasure_core::Measurement;
use serde::{Deserialize, Serialize};

use crate::history::Sample;
use crate::kalman::KalmanParams;
use crate::store::{Dimension, FilterStore};

/// Configuration for the precision filter.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct FilterParams {
    /// History ring window per dimension.
    pub window: usize,
    pub kalman: KalmanParams,
    /// Deviation (in standard deviations of the history) beyond which a
    /// sample is an outlier candidate.
    pub outlier_sigma: f64,
    /// Outlier replacement only fires when the incoming confidence is
    /// below this; a confident sample is allowed to move the estimate.
    pub outlier_confidence: f32,
    /// Minimum history length before outlier statistics apply.
    pub warmup_samples: usize,
    /// Time constant of the temporal smoothing weights, milliseconds.
    pub smoothing_tau_ms: f64,
    /// Idle timeout handed to `FilterStore::sweep` by callers.
    pub idle_timeout_ms: f64,
}

impl Default for FilterParams {
    fn default() -> Self {
        Self {
            window: 10,
            kalman: KalmanParams::default(),
            outlier_sigma: 2.0,
            outlier_confidence: 0.7,
            warmup_samples: 3,
            smoothing_tau_ms: 1000.0,
            idle_timeout_ms: 30_000.0,
        }
    }
}

/// Stabilize a measurement in place against the store's filter state.
///
/// Width, height and depth are filtered independently; area, perimeter,
/// volume and surface area are then recomputed from the stabilized
/// dimensions.
pub fn stabilize(
    measurement: &mut Measurement,
    object_id: &str,
    timestamp_ms: f64,
    store: &mut FilterStore,
    params: &FilterParams,
) {
    let confidence = measurement.confidence;

    measurement.width = filter_dimension(
        store,
        object_id,
        Dimension::Width,
        measurement.width,
        timestamp_ms,
        confidence,
        params,
        true,
    );
    measurement.height = filter_dimension(
        store,
        object_id,
        Dimension::Height,
        measurement.height,
        timestamp_ms,
        confidence,
        params,
        true,
    );
    measurement.depth = filter_dimension(
        store,
        object_id,
        Dimension::Depth,
        measurement.depth,
        timestamp_ms,
        confidence,
        params,
        false,
    );

    measurement.area = measurement.width * measurement.height;
    measurement.perimeter = 2.0 * (measurement.width + measurement.height);
    measurement.volume = measurement.area * measurement.depth;
    measurement.surface_area = 2.0
        * (measurement.width * measurement.height
            + measurement.width * measurement.depth
            + measurement.height * measurement.depth);
}

/// Run one observation through the filter chain for one dimension.
#[allow(clippy::too_many_arguments)]
fn filter_dimension(
    store: &mut FilterStore,
    object_id: &str,
    dimension: Dimension,
    value: f64,
    timestamp_ms: f64,
    confidence: f32,
    params: &FilterParams,
    smooth: bool,
) -> f64 {
    let is_new = store.get(object_id, dimension).is_none();
    let filter = store.entry(object_id, dimension, value, timestamp_ms, params);
    filter.last_update_ms = timestamp_ms;

    if is_new {
        // First observation: the raw value seeds the filter and history.
        filter.history.push(Sample {
            value,
            timestamp_ms,
            confidence,
        });
        return value;
    }

    let mut z = value;
    if filter.history.len() >= params.warmup_samples {
        if let (Some(mean), Some(sd)) = (filter.history.mean(), filter.history.std_dev()) {
            let deviation = (z - mean).abs();
            if deviation > params.outlier_sigma * sd && confidence < params.outlier_confidence {
                let replacement = filter.history.weighted_mean().unwrap_or(mean);
                log::debug!(
                    "{}/{} outlier {z:.2} (mean {mean:.2}, sd {sd:.2}) replaced with {replacement:.2}",
                    object_id,
                    dimension.as_str()
                );
                z = replacement;
            }
        }
    }

    let filtered = filter.kalman.update(z);

    let current = Sample {
        value: filtered,
        timestamp_ms,
        confidence,
    };
    let out = if smooth {
        filter.history.smoothed(current, params.smoothing_tau_ms)
    } else {
        filtered
    };
    filter.history.push(current);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use cammeasure_core::Unit;

    fn measurement(w: f64, h: f64, confidence: f32) -> Measurement {
        Measurement {
            width: w,
            height: h,
            area: w * h,
            perimeter: 2.0 * (w + h),
            depth: 50.0,
            volume: w * h * 50.0,
            surface_area: 2.0 * (w * h + 50.0 * (w + h)),
            circularity: 0.8,
            solidity: 1.0,
            compactness: 1.2,
            unit: Unit::Mm,
            confidence,
        }
    }

    #[test]
    fn first_observation_passes_through_raw() {
        let mut store = FilterStore::new();
        let params = FilterParams::default();
        let mut m = measurement(120.0, 90.0, 0.9);
        stabilize(&mut m, "primary", 0.0, &mut store, &params);
        assert_eq!(m.width, 120.0);
        assert_eq!(m.height, 90.0);
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn constant_input_converges_within_one_percent() {
        let mut store = FilterStore::new();
        let params = FilterParams::default();
        let mut m = measurement(200.0, 150.0, 0.9);
        for i in 0..12 {
            m = measurement(200.0, 150.0, 0.9);
            stabilize(&mut m, "primary", i as f64 * 200.0, &mut store, &params);
        }
        assert!((m.width - 200.0).abs() <= 2.0);
        assert!((m.height - 150.0).abs() <= 1.5);
    }

    #[test]
    fn low_confidence_outlier_is_suppressed() {
        let mut store = FilterStore::new();
        let params = FilterParams::default();
        for i in 0..3 {
            let mut m = measurement(100.0, 100.0, 0.9);
            stabilize(&mut m, "primary", i as f64 * 200.0, &mut store, &params);
        }
        let mut spike = measurement(500.0, 500.0, 0.2);
        stabilize(&mut spike, "primary", 600.0, &mut store, &params);
        assert!(
            spike.width < 150.0,
            "outlier not suppressed: {}",
            spike.width
        );
    }

    #[test]
    fn confident_jump_is_not_treated_as_outlier() {
        let mut store = FilterStore::new();
        let params = FilterParams::default();
        for i in 0..3 {
            let mut m = measurement(100.0, 100.0, 0.9);
            stabilize(&mut m, "primary", i as f64 * 200.0, &mut store, &params);
        }
        // High confidence: the jump must start moving the estimate.
        let mut jump = measurement(500.0, 500.0, 0.95);
        stabilize(&mut jump, "primary", 600.0, &mut store, &params);
        assert!(jump.width > 130.0, "confident jump ignored: {}", jump.width);
    }

    #[test]
    fn derived_fields_follow_smoothed_dimensions() {
        let mut store = FilterStore::new();
        let params = FilterParams::default();
        let mut m = measurement(120.0, 90.0, 0.9);
        stabilize(&mut m, "primary", 0.0, &mut store, &params);
        let mut m2 = measurement(124.0, 88.0, 0.9);
        stabilize(&mut m2, "primary", 200.0, &mut store, &params);
        assert!((m2.area - m2.width * m2.height).abs() < 1e-9);
        assert!((m2.perimeter - 2.0 * (m2.width + m2.height)).abs() < 1e-9);
        assert!((m2.volume - m2.area * m2.depth).abs() < 1e-9);
    }

    #[test]
    fn objects_are_filtered_independently() {
        let mut store = FilterStore::new();
        let params = FilterParams::default();
        let mut a = measurement(100.0, 100.0, 0.9);
        stabilize(&mut a, "a", 0.0, &mut store, &params);
        let mut b = measurement(300.0, 300.0, 0.9);
        stabilize(&mut b, "b", 0.0, &mut store, &params);
        assert_eq!(a.width, 100.0);
        assert_eq!(b.width, 300.0);
        assert_eq!(store.len(), 6);
    }
}
