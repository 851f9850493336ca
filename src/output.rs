use image::RgbImage;

use crate::color::Color;

/// External collaborator contract (§4.J): sized once via `set_rectangle`,
/// then written one pixel at a time. Concurrent `set_pixel` calls to distinct
/// coordinates must be safe (§5); `ImageOutputSink` satisfies this by never
/// mutating shared state until the render's parallel phase has finished (see
/// `view::render`, which collects pixels into a flat buffer before writing
/// them back here sequentially).
pub trait OutputSink: Send {
    fn set_rectangle(&mut self, width: u32, height: u32);
    fn set_pixel(&mut self, x: u32, y: u32, color: Color);
    fn get_output(&self) -> &RgbImage;
}

/// In-tree reference sink backing onto the `image` crate's `RgbImage`
/// (§4.J, §10.4), written out as PNG by the example harness.
pub struct ImageOutputSink {
    image: RgbImage,
}

impl ImageOutputSink {
    pub fn new() -> ImageOutputSink {
        ImageOutputSink { image: RgbImage::new(0, 0) }
    }
}

impl Default for ImageOutputSink {
    fn default() -> ImageOutputSink {
        ImageOutputSink::new()
    }
}

impl OutputSink for ImageOutputSink {
    fn set_rectangle(&mut self, width: u32, height: u32) {
        self.image = RgbImage::new(width, height);
    }

    fn set_pixel(&mut self, x: u32, y: u32, color: Color) {
        self.image.put_pixel(x, y, image::Rgb(color.to_rgb8()));
    }

    fn get_output(&self) -> &RgbImage {
        &self.image
    }
}
