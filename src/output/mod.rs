mod font;
mod headless;
mod overlay;
mod window;

pub use headless::HeadlessDisplay;
pub use overlay::{OverlayRenderer, PaletteEntry, DEFAULT_PALETTE, LEGEND_BAND_HEIGHT};
pub use window::WindowDisplay;

use crate::segmentation::Mask;
use anyhow::Result;
use image::RgbImage;
use std::time::Duration;

/// Trait for presenting pipeline output and collecting the quit signal
pub trait DisplaySurface {
    /// Show the annotated frame and the refined mask
    fn present(&mut self, annotated: &RgbImage, mask: &Mask) -> Result<()>;

    /// Wait at most `timeout` for a cancellation request
    ///
    /// Returns true once the user has asked to stop.
    fn poll_cancel(&mut self, timeout: Duration) -> Result<bool>;
}

impl<T: DisplaySurface + ?Sized> DisplaySurface for Box<T> {
    fn present(&mut self, annotated: &RgbImage, mask: &Mask) -> Result<()> {
        (**self).present(annotated, mask)
    }

    fn poll_cancel(&mut self, timeout: Duration) -> Result<bool> {
        (**self).poll_cancel(timeout)
    }
}
