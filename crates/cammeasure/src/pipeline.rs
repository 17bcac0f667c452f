//! End-to-end measurement pipeline.

use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use cammeasure_core::{
    BoundingBox, CalibrationProfile, Contour, DetectedObject, FrameView, Measurement,
};
use cammeasure_detect::{DetectError, DetectorParams, ObjectDetector};
use cammeasure_filter::{
    assess, stabilize, Dimension, FilterParams, FilterStore, UncertaintyBreakdown,
    UncertaintyParams,
};
use cammeasure_measure::{estimate_depth, measure_object, ConvertParams, DepthParams};

/// Errors produced by the end-to-end pipeline.
#[derive(thiserror::Error, Debug)]
pub enum PipelineError {
    #[error(transparent)]
    Detect(#[from] DetectError),
}

/// Configuration for the full pipeline.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PipelineParams {
    pub detector: DetectorParams,
    pub convert: ConvertParams,
    pub depth: DepthParams,
    pub filter: FilterParams,
    pub uncertainty: UncertaintyParams,
    /// Filter-store key under which the predominant object is tracked.
    pub object_id: String,
    /// When set, a frame with no surviving contour yields a synthetic
    /// centered detection covering this fraction of the frame instead of
    /// an empty result ("never empty" contract). Off by default.
    pub fallback_region_frac: Option<f32>,
    /// Confidence assigned to fallback detections.
    pub fallback_confidence: f32,
}

impl Default for PipelineParams {
    fn default() -> Self {
        Self {
            detector: DetectorParams::default(),
            convert: ConvertParams::default(),
            depth: DepthParams::default(),
            filter: FilterParams::default(),
            uncertainty: UncertaintyParams::default(),
            object_id: "primary".to_owned(),
            fallback_region_frac: None,
            fallback_confidence: 0.3,
        }
    }
}

/// Result of one pipeline invocation.
///
/// "Nothing detected" is a valid empty output, not an error.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ProcessOutput {
    pub object: Option<DetectedObject>,
    pub measurement: Option<Measurement>,
    pub uncertainty: Option<UncertaintyBreakdown>,
}

/// The full detection-and-measurement pipeline.
///
/// Synchronous and single-threaded; see the crate docs for the
/// one-invocation-in-flight contract. All persistent state lives in the
/// caller's [`FilterStore`].
pub struct MeasurePipeline {
    detector: ObjectDetector,
    params: PipelineParams,
}

impl MeasurePipeline {
    pub fn new(params: PipelineParams) -> Self {
        let detector = ObjectDetector::new(params.detector.clone());
        Self { detector, params }
    }

    pub fn params(&self) -> &PipelineParams {
        &self.params
    }

    /// Process one frame using wall-clock time for the filter history.
    pub fn process(
        &self,
        frame: &FrameView<'_>,
        calib: &CalibrationProfile,
        store: &mut FilterStore,
    ) -> Result<ProcessOutput, PipelineError> {
        self.process_at(frame, calib, store, now_ms())
    }

    /// Process one frame at an explicit timestamp.
    ///
    /// The pipeline itself never reads a clock, so identical inputs with a
    /// fresh store produce identical outputs.
    pub fn process_at(
        &self,
        frame: &FrameView<'_>,
        calib: &CalibrationProfile,
        store: &mut FilterStore,
        timestamp_ms: f64,
    ) -> Result<ProcessOutput, PipelineError> {
        let object = match self.detector.detect(frame)? {
            Some(object) => object,
            None => match self.fallback_object(frame) {
                Some(object) => object,
                None => {
                    log::debug!("no object survived validation");
                    return Ok(ProcessOutput::default());
                }
            },
        };

        let mut measurement = measure_object(&object, calib, &self.params.convert);

        let depth_est = estimate_depth(&object, &measurement, calib, &self.params.depth);
        measurement.depth = depth_est.depth;
        measurement.volume = depth_est.volume;
        measurement.surface_area = depth_est.surface_area;

        stabilize(
            &mut measurement,
            &self.params.object_id,
            timestamp_ms,
            store,
            &self.params.filter,
        );

        let width_history = store
            .get(&self.params.object_id, Dimension::Width)
            .map(|f| &f.history);
        let breakdown = assess(
            &mut measurement,
            &object,
            calib,
            depth_est.confidence,
            width_history,
            &self.params.uncertainty,
        );

        log::debug!(
            "frame processed: {:.1}x{:.1} {} (confidence {:.2})",
            measurement.width,
            measurement.height,
            measurement.unit,
            measurement.confidence
        );

        Ok(ProcessOutput {
            object: Some(object),
            measurement: Some(measurement),
            uncertainty: Some(breakdown),
        })
    }

    /// Multi-object mode for overlay consumers: validated candidates after
    /// non-max suppression, capped. No measurement or stabilization; the
    /// measurement contract covers the predominant object only.
    pub fn detect_objects(
        &self,
        frame: &FrameView<'_>,
    ) -> Result<Vec<DetectedObject>, PipelineError> {
        Ok(self.detector.detect_multi(frame)?)
    }

    /// Synthetic centered detection used when `fallback_region_frac` is
    /// configured and nothing survived validation.
    fn fallback_object(&self, frame: &FrameView<'_>) -> Option<DetectedObject> {
        let frac = self.params.fallback_region_frac?;
        let frac = frac.clamp(0.05, 1.0);
        let w = ((frame.width as f32) * frac).round().max(1.0) as u32;
        let h = ((frame.height as f32) * frac).round().max(1.0) as u32;
        let bbox = BoundingBox {
            x: ((frame.width as i32) - w as i32) / 2,
            y: ((frame.height as i32) - h as i32) / 2,
            w,
            h,
        };
        let confidence = self.params.fallback_confidence;
        log::debug!("using fallback region {w}x{h} at reduced confidence");
        Some(DetectedObject {
            contour: Contour {
                points: Vec::new(),
                bbox,
                area: bbox.area(),
                perimeter: 2.0 * (w as f64 + h as f64),
                mean_intensity: 0.0,
                curvature: 0.0,
                smoothness: 0.0,
                confidence,
            },
            quality_score: confidence,
            composite_score: confidence,
        })
    }
}

fn now_ms() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs_f64() * 1000.0)
        .unwrap_or(0.0)
}
