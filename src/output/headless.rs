use super::DisplaySurface;
use crate::segmentation::Mask;
use anyhow::Result;
use image::RgbImage;
use std::time::Duration;

/// Display that presents nothing and never asks to stop
#[derive(Debug, Default)]
pub struct HeadlessDisplay {
    frames: u64,
}

impl HeadlessDisplay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn frames_presented(&self) -> u64 {
        self.frames
    }
}

impl Drop for HeadlessDisplay {
    fn drop(&mut self) {
        tracing::info!("Headless display closed after {} frames", self.frames_presented());
    }
}

impl DisplaySurface for HeadlessDisplay {
    fn present(&mut self, annotated: &RgbImage, mask: &Mask) -> Result<()> {
        self.frames += 1;
        let selected = mask.pixels().filter(|p| p[0] != 0).count();
        tracing::debug!(
            "Frame {}: {}x{}, {} mask pixels selected",
            self.frames,
            annotated.width(),
            annotated.height(),
            selected
        );
        Ok(())
    }

    fn poll_cancel(&mut self, _timeout: Duration) -> Result<bool> {
        Ok(false)
    }
}
