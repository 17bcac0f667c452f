//! Aggregate uncertainty estimation.
//!
//! Independent error sources are combined by root-sum-of-squares into one
//! total, which discounts the measurement confidence together with a
//! stability term (history variance) and a geometry factor that rewards
//! near-square, comfortably large objects.

use cammeasure_core::{CalibrationProfile, DetectedObject, Measurement};
use serde::{Deserialize, Serialize};

use crate::history::HistoryRing;

/// Configuration for the uncertainty estimator.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct UncertaintyParams {
    /// Calibration source term with a valid profile.
    pub calibration_calibrated: f64,
    /// Calibration source term without one.
    pub calibration_uncalibrated: f64,
    /// Fixed algorithm source term.
    pub algorithm: f64,
    /// Depth source term when the depth confidence is at or above the
    /// floor.
    pub depth_confident: f64,
    /// Depth source term below the floor.
    pub depth_unconfident: f64,
    pub depth_confidence_floor: f32,
    /// px^2 at which the geometry size reward saturates.
    pub size_reference: f64,
    /// Final confidence clamp.
    pub min_confidence: f32,
    pub max_confidence: f32,
}

impl Default for UncertaintyParams {
    fn default() -> Self {
        Self {
            calibration_calibrated: 0.02,
            calibration_uncalibrated: 0.30,
            algorithm: 0.05,
            depth_confident: 0.10,
            depth_unconfident: 0.25,
            depth_confidence_floor: 0.5,
            size_reference: 20_000.0,
            min_confidence: 0.1,
            max_confidence: 0.99,
        }
    }
}

/// Per-source uncertainty decomposition for one measurement.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct UncertaintyBreakdown {
    pub measurement: f64,
    pub calibration: f64,
    pub algorithm: f64,
    pub depth: f64,
    /// Root-sum-of-squares of the four sources.
    pub total: f64,
    /// `1 - normalized variance` of the recent width history, in [0, 1].
    pub stability: f64,
    pub geometry_factor: f64,
}

impl UncertaintyBreakdown {
    /// Symmetric 95 % error bound for a value carrying this uncertainty.
    pub fn interval_95(&self, value: f64) -> f64 {
        1.96 * self.total * value.abs()
    }
}

/// Estimate the aggregate uncertainty and fold it into the measurement's
/// confidence in place.
pub fn assess(
    measurement: &mut Measurement,
    object: &DetectedObject,
    calib: &CalibrationProfile,
    depth_confidence: f32,
    width_history: Option<&HistoryRing>,
    params: &UncertaintyParams,
) -> UncertaintyBreakdown {
    let stability = width_history
        .and_then(|h| h.normalized_variance())
        .map(|v| 1.0 - v)
        .unwrap_or(1.0)
        .clamp(0.0, 1.0);

    let measurement_u = 1.0 - stability;
    let calibration_u = if calib.is_calibrated {
        params.calibration_calibrated
    } else {
        params.calibration_uncalibrated
    };
    let depth_u = if depth_confidence < params.depth_confidence_floor {
        params.depth_unconfident
    } else {
        params.depth_confident
    };

    let total = (measurement_u * measurement_u
        + calibration_u * calibration_u
        + params.algorithm * params.algorithm
        + depth_u * depth_u)
        .sqrt();

    let geometry = geometry_factor(object, params);

    let raw = measurement.confidence as f64;
    let final_confidence =
        (raw * (1.0 - total).max(0.0) * stability * geometry).clamp(
            params.min_confidence as f64,
            params.max_confidence as f64,
        );
    measurement.confidence = final_confidence as f32;

    UncertaintyBreakdown {
        measurement: measurement_u,
        calibration: calibration_u,
        algorithm: params.algorithm,
        depth: depth_u,
        total,
        stability,
        geometry_factor: geometry,
    }
}

/// `clamp(0.6 + 0.25*squareness + 0.15*size, 0, 1)` where squareness is
/// `min(w,h)/max(w,h)` and size saturates at the reference area.
fn geometry_factor(object: &DetectedObject, params: &UncertaintyParams) -> f64 {
    let bbox = &object.contour.bbox;
    let long = bbox.w.max(bbox.h) as f64;
    let short = bbox.w.min(bbox.h) as f64;
    let squareness = if long > 0.0 { short / long } else { 0.0 };
    let size = (object.contour.area / params.size_reference).min(1.0);
    (0.6 + 0.25 * squareness + 0.15 * size).clamp(0.0, 1.0)
}
