//! Owned RGB frame buffer.

use core::fmt;

use image::RgbImage;

/// One captured camera frame: width × height × 3 channels, 8-bit, RGB
/// order. Adapters that deliver BGR (common for V4L2 pipelines) convert
/// before constructing a `Frame`.
#[derive(Clone)]
pub struct Frame {
    image: RgbImage,
}

impl Frame {
    /// Wrap a decoded RGB image.
    pub fn from_rgb(image: RgbImage) -> Self {
        Self { image }
    }

    /// Build from a raw interleaved RGB buffer. Returns `None` when the
    /// buffer length does not match `width * height * 3`.
    pub fn from_raw(width: u32, height: u32, data: Vec<u8>) -> Option<Self> {
        RgbImage::from_raw(width, height, data).map(|image| Self { image })
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn as_image(&self) -> &RgbImage {
        &self.image
    }
}

impl fmt::Debug for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Frame({}x{})", self.width(), self.height())
    }
}
