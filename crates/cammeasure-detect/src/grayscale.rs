use cammeasure_core::{FrameView, GrayImage};

use crate::DetectError;

/// BT.601 luma weights.
const LUMA_R: f32 = 0.299;
const LUMA_G: f32 = 0.587;
const LUMA_B: f32 = 0.114;

/// Reduce an RGBA frame to an owned grayscale buffer of equal dimensions.
///
/// Pure; the only failure mode is a malformed input buffer (length not
/// `4*w*h`, or zero dimensions).
pub fn rgba_to_gray(frame: &FrameView<'_>) -> Result<GrayImage, DetectError> {
    if frame.width == 0 || frame.height == 0 {
        return Err(DetectError::InvalidFrameDimensions {
            width: frame.width,
            height: frame.height,
        });
    }
    let expected = frame.expected_len();
    if frame.data.len() != expected {
        return Err(DetectError::InvalidFrameBuffer {
            expected,
            got: frame.data.len(),
        });
    }

    let mut gray = Vec::with_capacity(frame.width * frame.height);
    for px in frame.data.chunks_exact(4) {
        let luma = LUMA_R * px[0] as f32 + LUMA_G * px[1] as f32 + LUMA_B * px[2] as f32;
        gray.push(luma.round().clamp(0.0, 255.0) as u8);
    }

    Ok(GrayImage {
        width: frame.width,
        height: frame.height,
        data: gray,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converts_known_colors() {
        // white, black, pure red
        let rgba = [255, 255, 255, 255, 0, 0, 0, 255, 255, 0, 0, 255];
        let frame = FrameView::new(3, 1, &rgba);
        let gray = rgba_to_gray(&frame).unwrap();
        assert_eq!(gray.data, vec![255, 0, 76]);
    }

    #[test]
    fn alpha_is_ignored() {
        let rgba = [100, 100, 100, 0];
        let frame = FrameView::new(1, 1, &rgba);
        let gray = rgba_to_gray(&frame).unwrap();
        assert_eq!(gray.data, vec![100]);
    }

    #[test]
    fn rejects_truncated_buffer() {
        let rgba = [0u8; 10];
        let frame = FrameView::new(2, 2, &rgba);
        match rgba_to_gray(&frame) {
            Err(DetectError::InvalidFrameBuffer { expected, got }) => {
                assert_eq!(expected, 16);
                assert_eq!(got, 10);
            }
            other => panic!("expected InvalidFrameBuffer, got {other:?}"),
        }
    }

    #[test]
    fn rejects_zero_dimensions() {
        let frame = FrameView::new(0, 4, &[]);
        assert!(matches!(
            rgba_to_gray(&frame),
            Err(DetectError::InvalidFrameDimensions { .. })
        ));
    }
}
