use cammeasure_core::{CalibrationProfile, DetectedObject, Measurement};
use serde::{Deserialize, Serialize};

/// Configuration for the monocular depth heuristic.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct DepthParams {
    /// Pixels-per-mm assumed when the profile is uncalibrated.
    pub assumed_pixels_per_mm: f64,
    /// Empirical gain mapping the pinhole ratio into the working depth
    /// range; configuration, not protocol.
    pub depth_gain: f64,
    /// Clamp bounds for the estimate, millimetres.
    pub min_depth_mm: f64,
    pub max_depth_mm: f64,
    /// Confidence reported for a calibrated profile. Deliberately low:
    /// this is a single-camera heuristic, not measured depth.
    pub base_confidence: f32,
    /// Confidence reported for an uncalibrated profile.
    pub uncalibrated_confidence: f32,
}

impl Default for DepthParams {
    fn default() -> Self {
        Self {
            assumed_pixels_per_mm: 8.0,
            depth_gain: 1.0e4,
            min_depth_mm: 10.0,
            max_depth_mm: 1000.0,
            base_confidence: 0.4,
            uncalibrated_confidence: 0.2,
        }
    }
}

/// Output of the depth heuristic, in the measurement's unit system.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct DepthEstimate {
    pub depth: f64,
    pub volume: f64,
    pub surface_area: f64,
    /// Always low; callers must treat depth-derived values accordingly
    /// until an external stereo/ToF collaborator supplies better data.
    pub confidence: f32,
}

/// Estimate object depth from apparent size and the optics data, then
/// derive volume and surface area under a rectangular-prism assumption.
///
/// `depth = clamp(focal*sensor*gain / (apparent_px*ppm), min, max)`. The
/// prism faces use the measurement's (possibly filtered) width/height so
/// the solid stays consistent with the reported 2-D dimensions.
pub fn estimate_depth(
    object: &DetectedObject,
    measurement: &Measurement,
    calib: &CalibrationProfile,
    params: &DepthParams,
) -> DepthEstimate {
    let apparent_px = object
        .contour
        .width_px()
        .max(object.contour.height_px())
        .max(1.0);
    let ppm = if calib.is_calibrated {
        calib.scale()
    } else {
        params.assumed_pixels_per_mm.max(1e-9)
    };

    let raw = calib.focal_length_mm * calib.sensor_width_mm * params.depth_gain / (apparent_px * ppm);
    let depth = if raw.is_finite() {
        raw.clamp(params.min_depth_mm, params.max_depth_mm)
    } else {
        params.min_depth_mm
    };

    let w = measurement.width;
    let h = measurement.height;
    let volume = w * h * depth;
    let surface_area = 2.0 * (w * h + w * depth + h * depth);

    let confidence = if calib.is_calibrated {
        params.base_confidence
    } else {
        params.uncalibrated_confidence
    };

    DepthEstimate {
        depth,
        volume,
        surface_area,
        confidence,
    }
}
