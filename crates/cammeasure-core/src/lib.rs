//! Core types and utilities for camera-based object measurement.
//!
//! This crate is intentionally small and purely structural. It does *not*
//! contain any detection or filtering logic; it defines the buffers and
//! records the pipeline crates pass between each other.

mod calibration;
mod contour;
mod image;
mod logger;
mod measurement;

pub use calibration::CalibrationProfile;
pub use contour::{BoundingBox, Contour, DetectedObject};
pub use image::{EdgeMap, FrameView, GrayImage, GrayImageView};
pub use measurement::{Measurement, Unit};

#[cfg(feature = "tracing")]
pub use logger::init_tracing;

pub use logger::init_with_level;
