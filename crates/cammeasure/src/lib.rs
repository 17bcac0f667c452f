//! High-level facade crate for the `cammeasure-*` workspace.
//!
//! This crate provides:
//! - stable, convenient re-exports of the underlying pipeline crates
//! - the end-to-end [`MeasurePipeline`]: raw RGBA frame in, detected
//!   object plus stabilized, uncertainty-qualified measurement out
//! - (feature-gated) helpers converting `image` crate buffers into the
//!   lightweight frame views.
//!
//! ## Quickstart
//!
//! ```no_run
//! use cammeasure::core::CalibrationProfile;
//! use cammeasure::filter::FilterStore;
//! use cammeasure::{frames, MeasurePipeline, PipelineParams};
//! use image::ImageReader;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let img = ImageReader::open("frame.png")?.decode()?.to_rgba8();
//! let calib = CalibrationProfile::calibrated(8.0);
//! let mut store = FilterStore::new();
//!
//! let pipeline = MeasurePipeline::new(PipelineParams::default());
//! let output = pipeline.process(&frames::rgba_view(&img), &calib, &mut store)?;
//! if let Some(m) = output.measurement {
//!     println!("{:.1} x {:.1} {}", m.width, m.height, m.unit);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Invocation model
//!
//! The pipeline is synchronous and single-threaded; the caller invokes it
//! once per frame on a bounded cadence and must keep at most one
//! invocation in flight, dropping frames that arrive while one is
//! processing. The only persistent state is the caller-owned
//! [`filter::FilterStore`], reusable across sequential invocations
//! without locking under that non-overlap rule; sweep it periodically to
//! evict idle filters.
//!
//! ## API map
//! - `cammeasure::core`: shared types (frames, contours, calibration,
//!   measurements).
//! - `cammeasure::detect`: stages 1-5 (grayscale, Sobel edges, contour
//!   tracing, validation, selection).
//! - `cammeasure::measure`: stages 6-7 (calibrated conversion, monocular
//!   depth heuristic).
//! - `cammeasure::filter`: stages 8-9 (Kalman stabilization, uncertainty).
//! - `cammeasure::frames` (feature `image` for the `image` helpers):
//!   frame-view construction.

pub use cammeasure_core as core;
pub use cammeasure_detect as detect;
pub use cammeasure_filter as filter;
pub use cammeasure_measure as measure;

pub use cammeasure_core::{
    CalibrationProfile, Contour, DetectedObject, FrameView, Measurement, Unit,
};

pub mod frames;
mod pipeline;

pub use pipeline::{MeasurePipeline, PipelineError, PipelineParams, ProcessOutput};
