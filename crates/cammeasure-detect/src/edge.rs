use cammeasure_core::{EdgeMap, GrayImageView};
use serde::{Deserialize, Serialize};

/// Configuration for the Sobel edge detector.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct EdgeParams {
    /// Scale applied to the raw gradient magnitude before the 255 clamp.
    pub magnitude_scale: f32,
    /// Base of the per-pixel adaptive threshold.
    pub threshold_base: f32,
    /// Magnitude-proportional part of the adaptive threshold.
    pub threshold_slope: f32,
    /// Process every `stride`-th pixel and replicate the response to the
    /// skipped neighbors. 1 = full resolution. Values > 1 trade edge
    /// localization for throughput; this is an explicit opt-in, the
    /// detector never coarsens silently.
    pub stride: usize,
}

impl Default for EdgeParams {
    fn default() -> Self {
        Self {
            magnitude_scale: 0.4,
            threshold_base: 25.0,
            threshold_slope: 0.25,
            stride: 1,
        }
    }
}

/// Compute a Sobel gradient-magnitude map over the interior pixels.
///
/// Border pixels stay 0. Responses below the adaptive threshold
/// `base + magnitude*slope` are zeroed.
pub fn detect_edges(gray: &GrayImageView<'_>, params: &EdgeParams) -> EdgeMap {
    let w = gray.width;
    let h = gray.height;
    let mut edges = EdgeMap::zeroed(w, h);
    if w < 3 || h < 3 {
        return edges;
    }

    let stride = params.stride.max(1);
    let mut y = 1;
    while y < h - 1 {
        let mut x = 1;
        while x < w - 1 {
            let m = magnitude_at(gray, x as i32, y as i32, params);
            if m > 0 {
                // Replicate into the skipped stride block, interior only.
                let x_end = (x + stride).min(w - 1);
                let y_end = (y + stride).min(h - 1);
                for yy in y..y_end {
                    for xx in x..x_end {
                        edges.set(xx, yy, m);
                    }
                }
            }
            x += stride;
        }
        y += stride;
    }

    edges
}

#[inline]
fn magnitude_at(gray: &GrayImageView<'_>, x: i32, y: i32, params: &EdgeParams) -> u8 {
    let p00 = gray.get(x - 1, y - 1) as f32;
    let p10 = gray.get(x, y - 1) as f32;
    let p20 = gray.get(x + 1, y - 1) as f32;
    let p01 = gray.get(x - 1, y) as f32;
    let p21 = gray.get(x + 1, y) as f32;
    let p02 = gray.get(x - 1, y + 1) as f32;
    let p12 = gray.get(x, y + 1) as f32;
    let p22 = gray.get(x + 1, y + 1) as f32;

    let gx = (p20 + 2.0 * p21 + p22) - (p00 + 2.0 * p01 + p02);
    let gy = (p02 + 2.0 * p12 + p22) - (p00 + 2.0 * p10 + p20);

    let magnitude = (gx * gx + gy * gy).sqrt();
    let scaled = (magnitude * params.magnitude_scale).round().min(255.0);

    let threshold = params.threshold_base + scaled * params.threshold_slope;
    if scaled < threshold {
        return 0;
    }
    scaled as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use cammeasure_core::GrayImage;

    fn gray_of(width: usize, height: usize, fill: impl Fn(usize, usize) -> u8) -> GrayImage {
        let mut img = GrayImage::zeroed(width, height);
        for y in 0..height {
            for x in 0..width {
                img.data[y * width + x] = fill(x, y);
            }
        }
        img
    }

    #[test]
    fn uniform_image_has_no_edges() {
        let img = gray_of(16, 16, |_, _| 128);
        let edges = detect_edges(&img.as_view(), &EdgeParams::default());
        assert!(edges.data.iter().all(|&v| v == 0));
    }

    #[test]
    fn vertical_step_produces_a_response_column() {
        let img = gray_of(16, 16, |x, _| if x < 8 { 0 } else { 200 });
        let edges = detect_edges(&img.as_view(), &EdgeParams::default());
        // The step sits between columns 7 and 8.
        assert!(edges.get(7, 8) > 0 || edges.get(8, 8) > 0);
        // Far away from the step everything is flat.
        assert_eq!(edges.get(2, 8), 0);
        assert_eq!(edges.get(13, 8), 0);
    }

    #[test]
    fn border_pixels_stay_zero() {
        let img = gray_of(8, 8, |x, y| ((x * 40 + y * 25) % 256) as u8);
        let edges = detect_edges(&img.as_view(), &EdgeParams::default());
        for i in 0..8 {
            assert_eq!(edges.get(i, 0), 0);
            assert_eq!(edges.get(i, 7), 0);
            assert_eq!(edges.get(0, i), 0);
            assert_eq!(edges.get(7, i), 0);
        }
    }

    #[test]
    fn stride_two_replicates_responses() {
        let img = gray_of(20, 20, |x, _| if x < 10 { 0 } else { 220 });
        let full = detect_edges(&img.as_view(), &EdgeParams::default());
        let coarse = detect_edges(
            &img.as_view(),
            &EdgeParams {
                stride: 2,
                ..EdgeParams::default()
            },
        );
        // Coarse pass still finds the step...
        assert!(coarse.mean_nonzero().is_some());
        // ...and replicated rows match their stride anchor.
        let anchor = coarse.get(9, 9);
        if anchor > 0 {
            assert_eq!(coarse.get(9, 10), anchor);
        }
        assert!(full.mean_nonzero().is_some());
    }

    #[test]
    fn weak_gradients_are_zeroed_by_the_adaptive_threshold() {
        // A 2-level ramp with a tiny step produces magnitudes below base.
        let img = gray_of(16, 16, |x, _| if x < 8 { 100 } else { 110 });
        let edges = detect_edges(
            &img.as_view(),
            &EdgeParams {
                magnitude_scale: 0.4,
                ..EdgeParams::default()
            },
        );
        assert!(edges.data.iter().all(|&v| v == 0));
    }
}
