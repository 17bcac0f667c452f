//! Predominant-object selection.
//!
//! Candidates are ranked by a composite of quality, size, contour
//! confidence and centrality. The default contract is "at most one object
//! per frame"; the multi-object mode applies bounding-box IoU non-max
//! suppression and a small hard cap.

use cammeasure_core::DetectedObject;
use serde::{Deserialize, Serialize};

use crate::validate::ScoredContour;

/// Configuration for object selection.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct SelectParams {
    /// px^2 at which the size factor saturates.
    pub size_reference: f64,
    /// Candidates overlapping a better one by at least this IoU are
    /// dropped in multi mode.
    pub iou_threshold: f32,
    /// Hard cap for multi mode.
    pub max_objects: usize,
    pub quality_weight: f32,
    pub size_weight: f32,
    pub confidence_weight: f32,
    pub centrality_weight: f32,
}

impl Default for SelectParams {
    fn default() -> Self {
        Self {
            size_reference: 20_000.0,
            iou_threshold: 0.3,
            max_objects: 3,
            quality_weight: 0.20,
            size_weight: 0.40,
            confidence_weight: 0.25,
            centrality_weight: 0.15,
        }
    }
}

/// Select the single predominant object, if any.
///
/// Argmax over the composite score; exact ties break toward the larger
/// area.
pub fn select_predominant(
    candidates: Vec<ScoredContour>,
    frame_width: usize,
    frame_height: usize,
    params: &SelectParams,
) -> Option<DetectedObject> {
    let mut best: Option<DetectedObject> = None;
    for candidate in candidates {
        let scored = to_object(candidate, frame_width, frame_height, params);
        best = match best {
            None => Some(scored),
            Some(current) => {
                if scored.composite_score > current.composite_score
                    || (scored.composite_score == current.composite_score
                        && scored.contour.area > current.contour.area)
                {
                    Some(scored)
                } else {
                    Some(current)
                }
            }
        };
    }
    best
}

/// Multi-object mode: rank all candidates, drop near-duplicates by
/// bounding-box IoU, cap the result.
pub fn select_objects(
    candidates: Vec<ScoredContour>,
    frame_width: usize,
    frame_height: usize,
    params: &SelectParams,
) -> Vec<DetectedObject> {
    let mut objects: Vec<DetectedObject> = candidates
        .into_iter()
        .map(|c| to_object(c, frame_width, frame_height, params))
        .collect();

    objects.sort_by(|a, b| {
        b.composite_score
            .partial_cmp(&a.composite_score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| {
                b.contour
                    .area
                    .partial_cmp(&a.contour.area)
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
    });

    let mut kept: Vec<DetectedObject> = Vec::new();
    for obj in objects {
        if kept.len() >= params.max_objects.max(1) {
            break;
        }
        let duplicate = kept
            .iter()
            .any(|k| k.contour.bbox.iou(&obj.contour.bbox) >= params.iou_threshold);
        if !duplicate {
            kept.push(obj);
        }
    }
    kept
}

fn to_object(
    candidate: ScoredContour,
    frame_width: usize,
    frame_height: usize,
    params: &SelectParams,
) -> DetectedObject {
    let size_factor = (candidate.contour.area / params.size_reference).min(1.0) as f32;
    let centrality = centrality_factor(&candidate, frame_width, frame_height);

    let composite = params.quality_weight * candidate.quality
        + params.size_weight * size_factor
        + params.confidence_weight * candidate.contour.confidence
        + params.centrality_weight * centrality;

    DetectedObject {
        quality_score: candidate.quality,
        composite_score: composite.clamp(0.0, 1.0),
        contour: candidate.contour,
    }
}

/// `1 - distance_to_frame_center / max_possible_distance`, in [0, 1].
fn centrality_factor(candidate: &ScoredContour, frame_width: usize, frame_height: usize) -> f32 {
    let cx = frame_width as f32 * 0.5;
    let cy = frame_height as f32 * 0.5;
    let max_dist = (cx * cx + cy * cy).sqrt();
    if max_dist <= 0.0 {
        return 0.0;
    }
    let center = candidate.contour.bbox.center();
    let dx = center.x - cx;
    let dy = center.y - cy;
    let dist = (dx * dx + dy * dy).sqrt();
    (1.0 - dist / max_dist).clamp(0.0, 1.0)
}
