use serde::{Deserialize, Serialize};

/// Calibration data supplied by an external calibration layer.
///
/// Read-only to the pipeline. `pixels_per_mm` must be positive for a
/// calibrated profile; `scale()` guards against non-positive values so a
/// malformed profile degrades to pass-through pixel units instead of
/// producing NaN/Inf measurements.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CalibrationProfile {
    /// Pixels per millimetre at the measurement plane.
    pub pixels_per_mm: f64,
    pub is_calibrated: bool,
    /// Lens focal length, millimetres.
    pub focal_length_mm: f64,
    /// Physical sensor width, millimetres.
    pub sensor_width_mm: f64,
}

impl Default for CalibrationProfile {
    fn default() -> Self {
        Self {
            pixels_per_mm: 1.0,
            is_calibrated: false,
            focal_length_mm: 4.25,
            sensor_width_mm: 6.17,
        }
    }
}

impl CalibrationProfile {
    pub fn calibrated(pixels_per_mm: f64) -> Self {
        Self {
            pixels_per_mm,
            is_calibrated: true,
            ..Self::default()
        }
    }

    /// Effective pixels-per-mm scale: 1.0 unless calibrated with a valid
    /// positive factor.
    #[inline]
    pub fn scale(&self) -> f64 {
        if self.is_calibrated && self.pixels_per_mm > 0.0 {
            self.pixels_per_mm
        } else {
            1.0
        }
    }
}
