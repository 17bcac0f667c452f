//! Frame-view construction helpers.

use cammeasure_core::FrameView;
use cammeasure_detect::DetectError;

/// Build a [`FrameView`] from a raw RGBA slice, checking the buffer shape.
pub fn frame_from_rgba(
    width: usize,
    height: usize,
    data: &[u8],
) -> Result<FrameView<'_>, DetectError> {
    if width == 0 || height == 0 {
        return Err(DetectError::InvalidFrameDimensions { width, height });
    }
    let expected = 4 * width * height;
    if data.len() != expected {
        return Err(DetectError::InvalidFrameBuffer {
            expected,
            got: data.len(),
        });
    }
    Ok(FrameView::new(width, height, data))
}

/// Convert an `image::RgbaImage` into the lightweight view type.
#[cfg(feature = "image")]
pub fn rgba_view(img: &::image::RgbaImage) -> FrameView<'_> {
    FrameView::new(img.width() as usize, img.height() as usize, img.as_raw())
}
