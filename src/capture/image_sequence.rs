use super::FrameSource;
use anyhow::{bail, Context, Result};
use image::{ImageFormat, RgbImage};
use std::collections::VecDeque;
use std::path::{Path, PathBuf};

/// Replays the images of a directory, in file name order, as frames
pub struct ImageSequence {
    pending: VecDeque<PathBuf>,
    width: u32,
    height: u32,
}

impl ImageSequence {
    pub fn new<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref();
        tracing::info!("Reading frames from {}", dir.display());

        let mut paths = Vec::new();
        for entry in std::fs::read_dir(dir)
            .with_context(|| format!("Failed to read frame directory {}", dir.display()))?
        {
            let path = entry?.path();
            if path.is_file() && ImageFormat::from_path(&path).is_ok() {
                paths.push(path);
            }
        }
        paths.sort();

        let Some(first) = paths.first() else {
            bail!("No images found in {}", dir.display());
        };
        let (width, height) = image::image_dimensions(first)
            .with_context(|| format!("Failed to read {}", first.display()))?;

        tracing::info!("Found {} frames at {}x{}", paths.len(), width, height);

        Ok(Self {
            pending: paths.into(),
            width,
            height,
        })
    }
}

impl FrameSource for ImageSequence {
    fn capture_frame(&mut self) -> Result<Option<RgbImage>> {
        let Some(path) = self.pending.pop_front() else {
            return Ok(None);
        };

        tracing::debug!("Decoding {} ({} left)", path.display(), self.pending.len());
        let frame = image::open(&path)
            .with_context(|| format!("Failed to decode {}", path.display()))?
            .to_rgb8();

        Ok(Some(frame))
    }

    fn resolution(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}
