//! Geometric plausibility filtering and quality scoring.
//!
//! A contour survives only if every rejection rule passes:
//! - area within the frame-relative band,
//! - aspect-ratio deviation from 1.0 within tolerance,
//! - perimeter efficiency against the theoretical rectangle perimeter,
//! - curvature/smoothness/confidence floors,
//! - composite quality score above the floor.
//!
//! Survivors keep their input order and carry the quality score used by
//! the object selector.

use cammeasure_core::Contour;
use serde::{Deserialize, Serialize};

use crate::trace::ContourReferences;

/// Configuration for contour validation.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct ValidateParams {
    /// Absolute floor for the minimum accepted area, px^2.
    pub min_area_floor: f64,
    /// Minimum accepted area as a fraction of the frame area.
    pub min_area_ratio: f64,
    /// Maximum accepted area as a fraction of the frame area.
    pub max_area_ratio: f64,
    /// Maximum `max(w,h)/min(w,h) - 1` deviation. Very permissive; only a
    /// near-square bias, not a shape gate.
    pub max_aspect_deviation: f32,
    /// Accepted band for `point_count / (2*(w+h))`.
    pub min_perimeter_efficiency: f32,
    pub max_perimeter_efficiency: f32,
    /// Accepted curvature band, radians.
    pub min_curvature: f32,
    pub max_curvature: f32,
    pub min_smoothness: f32,
    pub min_confidence: f32,
    /// Floor for the composite quality score.
    pub min_quality: f32,
    pub references: ContourReferences,
}

impl Default for ValidateParams {
    fn default() -> Self {
        Self {
            min_area_floor: 400.0,
            min_area_ratio: 0.03,
            max_area_ratio: 0.8,
            max_aspect_deviation: 5.0,
            min_perimeter_efficiency: 0.3,
            max_perimeter_efficiency: 3.0,
            min_curvature: 0.02,
            max_curvature: 3.0,
            min_smoothness: 0.15,
            min_confidence: 0.25,
            min_quality: 0.3,
            references: ContourReferences::default(),
        }
    }
}

/// Quality blend weights.
const W_AREA: f32 = 0.20;
const W_PERIMETER: f32 = 0.15;
const W_CURVATURE: f32 = 0.15;
const W_SMOOTHNESS: f32 = 0.20;
const W_CONFIDENCE: f32 = 0.20;
const W_INTENSITY: f32 = 0.10;

/// A contour that passed validation, with its quality score.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ScoredContour {
    pub contour: Contour,
    pub quality: f32,
}

/// Filter and score raw contours against the frame geometry.
pub fn validate_contours(
    contours: Vec<Contour>,
    frame_width: usize,
    frame_height: usize,
    params: &ValidateParams,
) -> Vec<ScoredContour> {
    let frame_area = frame_width as f64 * frame_height as f64;
    let min_area = params.min_area_floor.max(frame_area * params.min_area_ratio);
    let max_area = frame_area * params.max_area_ratio;

    let total = contours.len();
    let out: Vec<ScoredContour> = contours
        .into_iter()
        .filter_map(|contour| {
            if !passes_rules(&contour, min_area, max_area, params) {
                return None;
            }
            let quality = quality_score(&contour, &params.references);
            if quality < params.min_quality {
                return None;
            }
            Some(ScoredContour { contour, quality })
        })
        .collect();

    log::debug!("validated {}/{} contours", out.len(), total);
    out
}

fn passes_rules(contour: &Contour, min_area: f64, max_area: f64, params: &ValidateParams) -> bool {
    if contour.area < min_area || contour.area > max_area {
        return false;
    }

    let aspect_deviation = contour.bbox.aspect_ratio() - 1.0;
    if !aspect_deviation.is_finite() || aspect_deviation > params.max_aspect_deviation {
        return false;
    }

    let rect_perimeter = 2.0 * (contour.bbox.w as f64 + contour.bbox.h as f64);
    if rect_perimeter <= 0.0 {
        return false;
    }
    let efficiency = (contour.perimeter / rect_perimeter) as f32;
    if efficiency < params.min_perimeter_efficiency || efficiency > params.max_perimeter_efficiency
    {
        return false;
    }

    if contour.curvature < params.min_curvature || contour.curvature > params.max_curvature {
        return false;
    }
    if contour.smoothness < params.min_smoothness {
        return false;
    }
    if contour.confidence < params.min_confidence {
        return false;
    }

    true
}

/// Composite quality score in [0, 1], each component normalized against
/// the shared reference scales.
pub fn quality_score(contour: &Contour, refs: &ContourReferences) -> f32 {
    let area_s = ((contour.area as f32) / refs.area).min(1.0);
    let perimeter_s = ((contour.perimeter as f32) / refs.perimeter).min(1.0);
    let curvature_s = (contour.curvature / refs.curvature).min(1.0);
    let smoothness_s = (contour.smoothness / refs.smoothness).min(1.0);
    let confidence_s = contour.confidence.min(1.0);
    let intensity_s = (contour.mean_intensity / refs.intensity).min(1.0);

    (W_AREA * area_s
        + W_PERIMETER * perimeter_s
        + W_CURVATURE * curvature_s
        + W_SMOOTHNESS * smoothness_s
        + W_CONFIDENCE * confidence_s
        + W_INTENSITY * intensity_s)
        .clamp(0.0, 1.0)
}

#[cfg(test)]
pub(crate) fn synthetic_contour(x: i32, y: i32, w: u32, h: u32) -> Contour {
    use cammeasure_core::BoundingBox;

    let bbox = BoundingBox { x, y, w, h };
    Contour {
        points: Vec::new(),
        bbox,
        area: bbox.area(),
        perimeter: 2.0 * (w as f64 + h as f64),
        mean_intensity: 150.0,
        curvature: 0.8,
        smoothness: 0.7,
        confidence: 0.6,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FRAME_W: usize = 640;
    const FRAME_H: usize = 480;

    #[test]
    fn square_contour_passes() {
        let square = synthetic_contour(200, 150, 150, 150);
        let out = validate_contours(vec![square], FRAME_W, FRAME_H, &ValidateParams::default());
        assert_eq!(out.len(), 1);
        assert!(out[0].quality >= 0.3);
    }

    #[test]
    fn square_has_zero_aspect_deviation() {
        let square = synthetic_contour(0, 0, 150, 150);
        assert_eq!(square.bbox.aspect_ratio() - 1.0, 0.0);
    }

    #[test]
    fn extreme_aspect_sliver_is_rejected() {
        // Big enough to clear the area gate; rejected purely on aspect.
        let sliver = synthetic_contour(10, 10, 400, 25);
        assert!(sliver.area >= 9216.0);
        let out = validate_contours(vec![sliver], FRAME_W, FRAME_H, &ValidateParams::default());
        assert!(out.is_empty());
    }

    #[test]
    fn tiny_and_frame_filling_contours_are_rejected() {
        let tiny = synthetic_contour(0, 0, 20, 20);
        let huge = synthetic_contour(0, 0, 630, 470);
        let out = validate_contours(vec![tiny, huge], FRAME_W, FRAME_H, &ValidateParams::default());
        assert!(out.is_empty());
    }

    #[test]
    fn low_confidence_contour_is_rejected() {
        let mut c = synthetic_contour(200, 150, 150, 150);
        c.confidence = 0.1;
        let out = validate_contours(vec![c], FRAME_W, FRAME_H, &ValidateParams::default());
        assert!(out.is_empty());
    }

    #[test]
    fn flat_curvature_is_rejected() {
        let mut c = synthetic_contour(200, 150, 150, 150);
        c.curvature = 0.001;
        let out = validate_contours(vec![c], FRAME_W, FRAME_H, &ValidateParams::default());
        assert!(out.is_empty());
    }

    #[test]
    fn perimeter_efficiency_band_is_enforced() {
        let mut sparse = synthetic_contour(200, 150, 150, 150);
        sparse.perimeter = 100.0; // 100 / 600 < 0.3
        let mut dense = synthetic_contour(200, 150, 150, 150);
        dense.perimeter = 2000.0; // 2000 / 600 > 3.0
        let out = validate_contours(
            vec![sparse, dense],
            FRAME_W,
            FRAME_H,
            &ValidateParams::default(),
        );
        assert!(out.is_empty());
    }

    #[test]
    fn survivors_keep_input_order() {
        let a = synthetic_contour(100, 100, 120, 120);
        let b = synthetic_contour(300, 200, 160, 140);
        let out = validate_contours(
            vec![a.clone(), b.clone()],
            FRAME_W,
            FRAME_H,
            &ValidateParams::default(),
        );
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].contour.bbox, a.bbox);
        assert_eq!(out[1].contour.bbox, b.bbox);
    }
}
