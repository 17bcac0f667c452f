use cammeasure_core::{DetectedObject, FrameView};
use serde::{Deserialize, Serialize};

#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::edge::{detect_edges, EdgeParams};
use crate::grayscale::rgba_to_gray;
use crate::select::{select_objects, select_predominant, SelectParams};
use crate::trace::{trace_contours, TraceParams};
use crate::validate::{validate_contours, ScoredContour, ValidateParams};
use crate::DetectError;

/// Parameters for the full detection chain (stages 1-5).
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct DetectorParams {
    pub edge: EdgeParams,
    pub trace: TraceParams,
    pub validate: ValidateParams,
    pub select: SelectParams,
}

/// Runs luma reduction, edge detection, contour tracing, validation and
/// selection over one frame.
pub struct ObjectDetector {
    params: DetectorParams,
}

impl ObjectDetector {
    pub fn new(params: DetectorParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &DetectorParams {
        &self.params
    }

    /// Detect the single predominant object, if any.
    #[cfg_attr(
        feature = "tracing",
        instrument(level = "debug", skip(self, frame), fields(width = frame.width, height = frame.height))
    )]
    pub fn detect(&self, frame: &FrameView<'_>) -> Result<Option<DetectedObject>, DetectError> {
        let candidates = self.candidates(frame)?;
        Ok(select_predominant(
            candidates,
            frame.width,
            frame.height,
            &self.params.select,
        ))
    }

    /// Multi-object mode: NMS-deduplicated candidates, capped.
    pub fn detect_multi(&self, frame: &FrameView<'_>) -> Result<Vec<DetectedObject>, DetectError> {
        let candidates = self.candidates(frame)?;
        Ok(select_objects(
            candidates,
            frame.width,
            frame.height,
            &self.params.select,
        ))
    }

    /// Validated, scored contours without the selection stage. Useful for
    /// overlay consumers that want every plausible candidate.
    pub fn candidates(&self, frame: &FrameView<'_>) -> Result<Vec<ScoredContour>, DetectError> {
        let gray = rgba_to_gray(frame)?;
        let edges = detect_edges(&gray.as_view(), &self.params.edge);
        let contours = trace_contours(&edges, &self.params.trace);
        Ok(validate_contours(
            contours,
            frame.width,
            frame.height,
            &self.params.validate,
        ))
    }
}
