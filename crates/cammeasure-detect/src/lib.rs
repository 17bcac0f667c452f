//! Object detection stages for camera-based measurement.
//!
//! ## Quickstart
//!
//! ```
//! use cammeasure_core::FrameView;
//! use cammeasure_detect::{DetectorParams, ObjectDetector};
//!
//! let rgba = vec![0u8; 4 * 64 * 48];
//! let frame = FrameView::new(64, 48, &rgba);
//!
//! let detector = ObjectDetector::new(DetectorParams::default());
//! let object = detector.detect(&frame).unwrap();
//! println!("detected: {}", object.is_some());
//! ```
//!
//! Pipeline (left to right, leaves first):
//! 1. Luma reduction of the RGBA frame.
//! 2. Sobel gradient magnitudes with a per-pixel adaptive threshold.
//! 3. Adaptive-threshold connected-component contour tracing.
//! 4. Geometric plausibility filtering and quality scoring.
//! 5. Selection of the single predominant object (size/confidence/
//!    centrality), or a small NMS-deduplicated set in multi mode.
//!
//! Every numeric constant is carried by a params struct with a documented
//! default; nothing is protocol-fixed.

mod detector;
mod edge;
mod grayscale;
mod select;
mod trace;
mod validate;

pub use detector::{DetectorParams, ObjectDetector};
pub use edge::{detect_edges, EdgeParams};
pub use grayscale::rgba_to_gray;
pub use select::{select_objects, select_predominant, SelectParams};
pub use trace::{trace_contours, ContourReferences, TraceParams};
pub use validate::{validate_contours, ScoredContour, ValidateParams};

/// Errors produced by the detection stages.
#[derive(thiserror::Error, Debug)]
pub enum DetectError {
    #[error("invalid RGBA frame buffer length (expected {expected} bytes, got {got})")]
    InvalidFrameBuffer { expected: usize, got: usize },

    #[error("invalid frame dimensions (width={width}, height={height})")]
    InvalidFrameDimensions { width: usize, height: usize },
}
