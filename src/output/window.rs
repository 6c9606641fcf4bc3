use super::DisplaySurface;
use crate::segmentation::{Control, Mask, ParameterSource, ThresholdControls};
use anyhow::{anyhow, Result};
use image::RgbImage;
use minifb::{Key, KeyRepeat, Window, WindowOptions};
use std::sync::Arc;
use std::time::{Duration, Instant};

const POLL_INTERVAL: Duration = Duration::from_millis(2);
const FINE_STEP: i16 = 1;
const COARSE_STEP: i16 = 10;

/// Two desktop windows ("Frame" and "Mask") plus keyboard tuning of the
/// threshold controls
///
/// Keys: Tab / Shift+Tab select a control, Up / Down adjust it by 1,
/// PageUp / PageDown by 10, `q` or Escape quits.
pub struct WindowDisplay {
    frame_window: Window,
    mask_window: Window,
    controls: Arc<ThresholdControls>,
    selected: Control,
    frame_buffer: Vec<u32>,
    mask_buffer: Vec<u32>,
    cancelled: bool,
}

impl WindowDisplay {
    pub fn new(width: u32, height: u32, controls: Arc<ThresholdControls>) -> Result<Self> {
        tracing::info!("Opening display windows at {}x{}", width, height);

        let frame_window = Window::new("Frame", width as usize, height as usize, WindowOptions::default())
            .map_err(|e| anyhow!("Failed to open frame window: {e}"))?;
        let mask_window = Window::new("Mask", width as usize, height as usize, WindowOptions::default())
            .map_err(|e| anyhow!("Failed to open mask window: {e}"))?;

        let mut display = Self {
            frame_window,
            mask_window,
            controls,
            selected: Control::UpperHue,
            frame_buffer: Vec::new(),
            mask_buffer: Vec::new(),
            cancelled: false,
        };
        display.refresh_title();

        tracing::info!("Tab selects a control, Up/Down/PageUp/PageDown adjust it, q quits");

        Ok(display)
    }

    fn refresh_title(&mut self) {
        let bounds = self.controls.read();
        let title = format!(
            "Frame [{}: {}] {}",
            self.selected.label(),
            self.controls.get(self.selected),
            bounds
        );
        self.frame_window.set_title(&title);
    }

    /// Apply pending key presses; must run after every window update
    fn handle_input(&mut self) {
        if !self.frame_window.is_open() || !self.mask_window.is_open() {
            self.cancelled = true;
            return;
        }

        let shift = self.frame_window.is_key_down(Key::LeftShift)
            || self.frame_window.is_key_down(Key::RightShift);
        let mut changed = false;

        let mut keys = self.frame_window.get_keys_pressed(KeyRepeat::Yes);
        keys.extend(self.mask_window.get_keys_pressed(KeyRepeat::Yes));

        for key in keys {
            let delta = match key {
                Key::Q | Key::Escape => {
                    self.cancelled = true;
                    continue;
                }
                Key::Tab => {
                    self.selected = if shift {
                        self.selected.previous()
                    } else {
                        self.selected.next()
                    };
                    changed = true;
                    continue;
                }
                Key::Up => FINE_STEP,
                Key::Down => -FINE_STEP,
                Key::PageUp => COARSE_STEP,
                Key::PageDown => -COARSE_STEP,
                _ => continue,
            };
            let value = self.controls.adjust(self.selected, delta);
            tracing::debug!("{} = {}", self.selected.label(), value);
            changed = true;
        }

        if changed {
            self.refresh_title();
        }
    }
}

/// Pack an RGB frame into minifb's 0RGB words
fn rgb_to_0rgb(frame: &RgbImage, buffer: &mut Vec<u32>) {
    buffer.clear();
    buffer.extend(
        frame
            .pixels()
            .map(|p| (u32::from(p[0]) << 16) | (u32::from(p[1]) << 8) | u32::from(p[2])),
    );
}

/// Replicate mask values into grey 0RGB words
fn mask_to_0rgb(mask: &Mask, buffer: &mut Vec<u32>) {
    buffer.clear();
    buffer.extend(mask.pixels().map(|p| {
        let v = u32::from(p[0]);
        (v << 16) | (v << 8) | v
    }));
}

impl DisplaySurface for WindowDisplay {
    fn present(&mut self, annotated: &RgbImage, mask: &Mask) -> Result<()> {
        rgb_to_0rgb(annotated, &mut self.frame_buffer);
        mask_to_0rgb(mask, &mut self.mask_buffer);

        let (width, height) = annotated.dimensions();
        self.frame_window
            .update_with_buffer(&self.frame_buffer, width as usize, height as usize)
            .map_err(|e| anyhow!("Failed to update frame window: {e}"))?;

        let (width, height) = mask.dimensions();
        self.mask_window
            .update_with_buffer(&self.mask_buffer, width as usize, height as usize)
            .map_err(|e| anyhow!("Failed to update mask window: {e}"))?;

        self.handle_input();
        Ok(())
    }

    fn poll_cancel(&mut self, timeout: Duration) -> Result<bool> {
        let deadline = Instant::now() + timeout;
        loop {
            if self.cancelled {
                return Ok(true);
            }
            let now = Instant::now();
            if now >= deadline {
                return Ok(false);
            }
            std::thread::sleep(POLL_INTERVAL.min(deadline - now));

            self.frame_window.update();
            self.mask_window.update();
            self.handle_input();
        }
    }
}
