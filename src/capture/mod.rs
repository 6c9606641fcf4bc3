mod image_sequence;
mod v4l_capture;

pub use image_sequence::ImageSequence;
pub use v4l_capture::WebcamCapture;

use anyhow::Result;
use image::RgbImage;

/// Trait for frame sources
pub trait FrameSource {
    /// Capture the next frame
    ///
    /// `Ok(None)` means the stream has ended; an error means the source
    /// could not deliver a frame. Neither is retried.
    fn capture_frame(&mut self) -> Result<Option<RgbImage>>;

    /// Resolution every delivered frame is expected to have
    fn resolution(&self) -> (u32, u32);
}

impl<T: FrameSource + ?Sized> FrameSource for Box<T> {
    fn capture_frame(&mut self) -> Result<Option<RgbImage>> {
        (**self).capture_frame()
    }

    fn resolution(&self) -> (u32, u32) {
        (**self).resolution()
    }
}
