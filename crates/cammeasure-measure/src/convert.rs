use cammeasure_core::{CalibrationProfile, DetectedObject, Measurement, Unit};
use serde::{Deserialize, Serialize};

/// Guard against zero denominators in shape ratios.
const EPS: f64 = 1e-9;

/// Both directions of the "compactness" ratio are in common use. The
/// default follows `P^2 / (4*pi*A)` (1.0 for a perfect circle, growing
/// with elongation); the reciprocal is selectable.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompactnessConvention {
    #[default]
    PerimeterSquaredOverArea,
    AreaOverPerimeterSquared,
}

/// Configuration for the measurement converter.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct ConvertParams {
    pub compactness: CompactnessConvention,
    /// Confidence multiplier applied when the profile is uncalibrated.
    pub uncalibrated_confidence_scale: f32,
}

impl Default for ConvertParams {
    fn default() -> Self {
        Self {
            compactness: CompactnessConvention::default(),
            uncalibrated_confidence_scale: 0.5,
        }
    }
}

/// Convert a detected object into a calibrated [`Measurement`].
///
/// With a calibrated profile the linear fields are divided by
/// `pixels_per_mm` (areas by its square) and the unit is `mm`; otherwise
/// values pass through unscaled in `px` at discounted confidence.
///
/// Shape descriptors:
/// - `circularity = clamp(4*pi*area / contour_perimeter^2, 0, 1)`, using
///   the contour's point-count perimeter — the rectangular perimeter
///   cannot tell a round outline from a square one.
/// - `solidity = area / bbox_area` (1.0 whenever the area carries the
///   bounding-box proxy).
/// - `compactness` per [`CompactnessConvention`].
///
/// Depth, volume and surface area are left at zero for the depth
/// estimator to fill in.
pub fn measure_object(
    object: &DetectedObject,
    calib: &CalibrationProfile,
    params: &ConvertParams,
) -> Measurement {
    let contour = &object.contour;
    let scale = calib.scale();
    let unit = if calib.is_calibrated { Unit::Mm } else { Unit::Px };

    let width = contour.width_px() / scale;
    let height = contour.height_px() / scale;
    let area = contour.area / (scale * scale);
    let perimeter = 2.0 * (width + height);

    // Shape ratios are scale-invariant; compute them in pixel space.
    let contour_perimeter_px = contour.perimeter.max(EPS);
    let area_px = contour.area.max(EPS);
    let circularity = (4.0 * std::f64::consts::PI * area_px
        / (contour_perimeter_px * contour_perimeter_px))
        .clamp(0.0, 1.0);
    let bbox_area_px = contour.bbox.area().max(EPS);
    let solidity = (area_px / bbox_area_px).clamp(0.0, 1.0);
    let compactness = match params.compactness {
        CompactnessConvention::PerimeterSquaredOverArea => {
            contour_perimeter_px * contour_perimeter_px / (4.0 * std::f64::consts::PI * area_px)
        }
        CompactnessConvention::AreaOverPerimeterSquared => {
            4.0 * std::f64::consts::PI * area_px / (contour_perimeter_px * contour_perimeter_px)
        }
    };

    let mut confidence = contour.confidence;
    if !calib.is_calibrated {
        confidence *= params.uncalibrated_confidence_scale;
    }

    log::debug!(
        "measured {:.1}x{:.1} {} (confidence {:.2})",
        width,
        height,
        unit,
        confidence
    );

    Measurement {
        width,
        height,
        area,
        perimeter,
        depth: 0.0,
        volume: 0.0,
        surface_area: 0.0,
        circularity,
        solidity,
        compactness,
        unit,
        confidence: confidence.clamp(0.0, 1.0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use cammeasure_core::{BoundingBox, Contour};

    /// Contour with an explicit point-count perimeter, bbox and area proxy.
    fn contour(w: u32, h: u32, point_count: usize) -> Contour {
        let bbox = BoundingBox { x: 10, y: 10, w, h };
        Contour {
            points: Vec::new(),
            bbox,
            area: bbox.area(),
            perimeter: point_count as f64,
            mean_intensity: 180.0,
            curvature: 0.9,
            smoothness: 0.8,
            confidence: 0.8,
        }
    }

    fn object(w: u32, h: u32, point_count: usize) -> DetectedObject {
        DetectedObject {
            contour: contour(w, h, point_count),
            quality_score: 0.7,
            composite_score: 0.7,
        }
    }

    #[test]
    fn round_trip_calibration_is_exact() {
        let obj = object(120, 90, 420);
        for ppm in [0.5, 1.0, 3.0, 7.25, 12.0] {
            let calib = CalibrationProfile::calibrated(ppm);
            let m = measure_object(&obj, &calib, &ConvertParams::default());
            assert!((m.width - 120.0 / ppm).abs() < 1e-9);
            assert!((m.height - 90.0 / ppm).abs() < 1e-9);
            assert!((m.area - 120.0 * 90.0 / (ppm * ppm)).abs() < 1e-9);
            assert_eq!(m.unit, Unit::Mm);
        }
    }

    #[test]
    fn uncalibrated_passthrough_discounts_confidence() {
        let obj = object(120, 90, 420);
        let m = measure_object(
            &obj,
            &CalibrationProfile::default(),
            &ConvertParams::default(),
        );
        assert_eq!(m.unit, Unit::Px);
        assert_eq!(m.width, 120.0);
        assert_eq!(m.height, 90.0);
        assert_relative_eq!(m.confidence, 0.4, epsilon = 1e-6);
    }

    #[test]
    fn circular_outline_scores_high_circularity() {
        // 1-px circle outline of radius r: ~2*pi*r points, bbox (2r)^2.
        let r = 50.0f64;
        let n = (2.0 * std::f64::consts::PI * r).round() as usize;
        let obj = object(100, 100, n);
        let m = measure_object(
            &obj,
            &CalibrationProfile::calibrated(2.0),
            &ConvertParams::default(),
        );
        assert!(
            (0.85..=1.0).contains(&m.circularity),
            "circularity {}",
            m.circularity
        );
    }

    #[test]
    fn elongated_outline_scores_low_circularity() {
        // 200x10 rectangle outline: ~2*(w+h) points.
        let obj = object(200, 10, 420);
        let m = measure_object(
            &obj,
            &CalibrationProfile::calibrated(2.0),
            &ConvertParams::default(),
        );
        assert!(m.circularity < 0.3, "circularity {}", m.circularity);
    }

    #[test]
    fn perimeter_is_rectangular() {
        let obj = object(120, 90, 420);
        let m = measure_object(
            &obj,
            &CalibrationProfile::calibrated(3.0),
            &ConvertParams::default(),
        );
        assert_relative_eq!(m.perimeter, 2.0 * (40.0 + 30.0), epsilon = 1e-9);
    }

    #[test]
    fn compactness_conventions_are_reciprocal() {
        let obj = object(120, 90, 420);
        let calib = CalibrationProfile::calibrated(2.0);
        let a = measure_object(
            &obj,
            &calib,
            &ConvertParams {
                compactness: CompactnessConvention::PerimeterSquaredOverArea,
                ..ConvertParams::default()
            },
        );
        let b = measure_object(
            &obj,
            &calib,
            &ConvertParams {
                compactness: CompactnessConvention::AreaOverPerimeterSquared,
                ..ConvertParams::default()
            },
        );
        assert_relative_eq!(a.compactness * b.compactness, 1.0, epsilon = 1e-9);
    }

    #[test]
    fn degenerate_geometry_never_produces_nan() {
        let mut obj = object(0, 0, 0);
        obj.contour.area = 0.0;
        obj.contour.perimeter = 0.0;
        let m = measure_object(
            &obj,
            &CalibrationProfile::calibrated(4.0),
            &ConvertParams::default(),
        );
        assert!(m.circularity.is_finite());
        assert!(m.solidity.is_finite());
        assert!(m.compactness.is_finite());
    }
}
