//! Connected-component contour extraction over an edge map.
//!
//! A global adaptive threshold (derived from the mean nonzero magnitude)
//! selects edge pixels; an explicit-stack 8-connected flood fill groups
//! them into contours. Each pixel belongs to exactly one contour. An
//! all-zero edge map yields an empty list, not an error.

use cammeasure_core::{BoundingBox, Contour, EdgeMap};
use nalgebra::Point2;
use serde::{Deserialize, Serialize};

/// Reference scales used to normalize contour factors into [0, 1].
///
/// A factor is `min(1, value / reference)`; the defaults describe a
/// "comfortably large" object for a VGA-class frame.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct ContourReferences {
    /// px^2 at which the area factor saturates.
    pub area: f32,
    /// Point count at which the perimeter factor saturates.
    pub perimeter: f32,
    /// Edge magnitude at which the intensity factor saturates.
    pub intensity: f32,
    /// Radians at which the curvature factor saturates.
    pub curvature: f32,
    /// Smoothness is already in [0, 1]; reference kept for symmetry.
    pub smoothness: f32,
}

impl Default for ContourReferences {
    fn default() -> Self {
        Self {
            area: 5000.0,
            perimeter: 300.0,
            intensity: 100.0,
            curvature: 1.0,
            smoothness: 1.0,
        }
    }
}

/// Configuration for the contour tracer.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct TraceParams {
    /// Fraction of the mean nonzero edge magnitude used as the global
    /// threshold.
    pub threshold_factor: f32,
    /// Floor for the global threshold, in magnitude units.
    pub min_threshold: f32,
    /// Contours with fewer member points are dropped at trace time.
    pub min_points: usize,
    /// Scan stride for seed pixels; flood fill itself is always dense.
    pub stride: usize,
    pub references: ContourReferences,
}

impl Default for TraceParams {
    fn default() -> Self {
        Self {
            threshold_factor: 0.55,
            min_threshold: 35.0,
            min_points: 8,
            stride: 1,
            references: ContourReferences::default(),
        }
    }
}

/// Confidence blend weights; see [`Contour::confidence`].
const W_AREA: f32 = 0.25;
const W_PERIMETER: f32 = 0.20;
const W_INTENSITY: f32 = 0.25;
const W_CURVATURE: f32 = 0.15;
const W_SMOOTHNESS: f32 = 0.15;

/// Extract contours from an edge map.
pub fn trace_contours(edges: &EdgeMap, params: &TraceParams) -> Vec<Contour> {
    let Some(mean) = edges.mean_nonzero() else {
        return Vec::new();
    };
    let threshold = (mean * params.threshold_factor).max(params.min_threshold);

    let w = edges.width;
    let h = edges.height;
    let mut visited = vec![false; w * h];
    let mut contours = Vec::new();
    let stride = params.stride.max(1);

    let mut y = 0;
    while y < h {
        let mut x = 0;
        while x < w {
            let idx = y * w + x;
            if !visited[idx] && edges.data[idx] as f32 >= threshold {
                let contour = flood_fill(edges, &mut visited, x, y, threshold, params);
                if let Some(contour) = contour {
                    contours.push(contour);
                }
            }
            x += stride;
        }
        y += stride;
    }

    log::debug!(
        "traced {} contours (threshold {:.1})",
        contours.len(),
        threshold
    );
    contours
}

/// 8-connected flood fill from a seed pixel, explicit stack.
fn flood_fill(
    edges: &EdgeMap,
    visited: &mut [bool],
    seed_x: usize,
    seed_y: usize,
    threshold: f32,
    params: &TraceParams,
) -> Option<Contour> {
    let w = edges.width as i32;
    let h = edges.height as i32;

    let mut points: Vec<Point2<i32>> = Vec::new();
    let mut bbox = BoundingBox::seed(Point2::new(seed_x as i32, seed_y as i32));
    let mut intensity_sum = 0u64;

    let mut stack = vec![(seed_x as i32, seed_y as i32)];
    visited[seed_y * edges.width + seed_x] = true;

    while let Some((x, y)) = stack.pop() {
        let p = Point2::new(x, y);
        intensity_sum += edges.data[y as usize * edges.width + x as usize] as u64;
        bbox.include(p);
        points.push(p);

        for dy in -1..=1 {
            for dx in -1..=1 {
                if dx == 0 && dy == 0 {
                    continue;
                }
                let nx = x + dx;
                let ny = y + dy;
                if nx < 0 || ny < 0 || nx >= w || ny >= h {
                    continue;
                }
                let nidx = ny as usize * edges.width + nx as usize;
                if !visited[nidx] && edges.data[nidx] as f32 >= threshold {
                    visited[nidx] = true;
                    stack.push((nx, ny));
                }
            }
        }
    }

    if points.len() < params.min_points {
        return None;
    }

    Some(derive_metrics(points, bbox, intensity_sum, &params.references))
}

fn derive_metrics(
    points: Vec<Point2<i32>>,
    bbox: BoundingBox,
    intensity_sum: u64,
    refs: &ContourReferences,
) -> Contour {
    let n = points.len();
    let area = bbox.area();
    let perimeter = n as f64;
    let mean_intensity = intensity_sum as f32 / n as f32;
    let curvature = mean_turning_angle(&points);
    let smoothness = (1.0 - mean_step_distance(&points) / 10.0).clamp(0.0, 1.0);

    let area_f = ((area as f32) / refs.area).min(1.0);
    let perimeter_f = (perimeter as f32 / refs.perimeter).min(1.0);
    let intensity_f = (mean_intensity / refs.intensity).min(1.0);
    let curvature_f = (curvature / refs.curvature).min(1.0);
    let smoothness_f = (smoothness / refs.smoothness).min(1.0);

    let confidence = W_AREA * area_f
        + W_PERIMETER * perimeter_f
        + W_INTENSITY * intensity_f
        + W_CURVATURE * curvature_f
        + W_SMOOTHNESS * smoothness_f;

    Contour {
        points,
        bbox,
        area,
        perimeter,
        mean_intensity,
        curvature,
        smoothness,
        confidence: confidence.clamp(0.0, 1.0),
    }
}

/// Mean absolute turning angle over consecutive point triples, radians.
///
/// Heading deltas are normalized to (-pi, pi] before the absolute value.
fn mean_turning_angle(points: &[Point2<i32>]) -> f32 {
    if points.len() < 3 {
        return 0.0;
    }
    let mut sum = 0.0f32;
    let mut count = 0usize;
    for win in points.windows(3) {
        let (a, b, c) = (win[0], win[1], win[2]);
        if a == b || b == c {
            continue;
        }
        let a1 = ((b.y - a.y) as f32).atan2((b.x - a.x) as f32);
        let a2 = ((c.y - b.y) as f32).atan2((c.x - b.x) as f32);
        let mut delta = a2 - a1;
        while delta > std::f32::consts::PI {
            delta -= 2.0 * std::f32::consts::PI;
        }
        while delta <= -std::f32::consts::PI {
            delta += 2.0 * std::f32::consts::PI;
        }
        sum += delta.abs();
        count += 1;
    }
    if count == 0 {
        return 0.0;
    }
    sum / count as f32
}

/// Mean Euclidean distance between consecutive points.
fn mean_step_distance(points: &[Point2<i32>]) -> f32 {
    if points.len() < 2 {
        return 0.0;
    }
    let mut sum = 0.0f32;
    for win in points.windows(2) {
        let dx = (win[1].x - win[0].x) as f32;
        let dy = (win[1].y - win[0].y) as f32;
        sum += (dx * dx + dy * dy).sqrt();
    }
    sum / (points.len() - 1) as f32
}
