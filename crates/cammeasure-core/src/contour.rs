use nalgebra::Point2;
use serde::{Deserialize, Serialize};

/// Axis-aligned bounding box in integer pixel coordinates.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: i32,
    pub y: i32,
    pub w: u32,
    pub h: u32,
}

impl BoundingBox {
    /// Degenerate 1x1 box around a single pixel; grow it with `include`.
    pub fn seed(p: Point2<i32>) -> Self {
        Self {
            x: p.x,
            y: p.y,
            w: 1,
            h: 1,
        }
    }

    /// Expand the box so that it covers `p`.
    pub fn include(&mut self, p: Point2<i32>) {
        let x1 = (self.x + self.w as i32).max(p.x + 1);
        let y1 = (self.y + self.h as i32).max(p.y + 1);
        self.x = self.x.min(p.x);
        self.y = self.y.min(p.y);
        self.w = (x1 - self.x) as u32;
        self.h = (y1 - self.y) as u32;
    }

    #[inline]
    pub fn area(&self) -> f64 {
        self.w as f64 * self.h as f64
    }

    pub fn center(&self) -> Point2<f32> {
        Point2::new(
            self.x as f32 + 0.5 * self.w as f32,
            self.y as f32 + 0.5 * self.h as f32,
        )
    }

    /// `max(w,h) / min(w,h)`, >= 1. A zero side yields `f32::INFINITY`.
    pub fn aspect_ratio(&self) -> f32 {
        let long = self.w.max(self.h) as f32;
        let short = self.w.min(self.h) as f32;
        if short <= 0.0 {
            return f32::INFINITY;
        }
        long / short
    }

    /// Intersection-over-union with another box, in [0, 1].
    pub fn iou(&self, other: &BoundingBox) -> f32 {
        let x0 = self.x.max(other.x);
        let y0 = self.y.max(other.y);
        let x1 = (self.x + self.w as i32).min(other.x + other.w as i32);
        let y1 = (self.y + self.h as i32).min(other.y + other.h as i32);
        if x1 <= x0 || y1 <= y0 {
            return 0.0;
        }
        let inter = (x1 - x0) as f64 * (y1 - y0) as f64;
        let union = self.area() + other.area() - inter;
        if union <= 0.0 {
            return 0.0;
        }
        (inter / union) as f32
    }
}

/// A connected set of edge pixels believed to outline one object.
///
/// `area` is the bounding-box proxy `w*h` and `perimeter` the member point
/// count; both are deliberate proxies, not polygon-exact values, and every
/// downstream score is calibrated against them.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Contour {
    /// Member pixels in trace order.
    pub points: Vec<Point2<i32>>,
    pub bbox: BoundingBox,
    /// Bounding-box area proxy, px^2.
    pub area: f64,
    /// Point-count perimeter proxy.
    pub perimeter: f64,
    /// Mean edge magnitude over the member pixels, 0..255.
    pub mean_intensity: f32,
    /// Mean absolute turning angle over consecutive point triples, radians.
    pub curvature: f32,
    /// `clamp(1 - mean_step/10, 0, 1)`; 1 = perfectly tight point chain.
    pub smoothness: f32,
    /// Weighted composite of the factors above, in [0, 1].
    pub confidence: f32,
}

impl Contour {
    pub fn width_px(&self) -> f64 {
        self.bbox.w as f64
    }

    pub fn height_px(&self) -> f64 {
        self.bbox.h as f64
    }
}

/// The predominant object selected for one frame.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DetectedObject {
    pub contour: Contour,
    /// Geometric plausibility score from validation, in [0, 1].
    pub quality_score: f32,
    /// Size/confidence/centrality blend used for selection, in [0, 1].
    pub composite_score: f32,
}
