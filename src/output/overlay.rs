use super::font;
use crate::segmentation::Blob;
use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_filled_rect_mut, draw_line_segment_mut};
use imageproc::rect::Rect;

/// Rows at the top of the frame reserved for the legend
pub const LEGEND_BAND_HEIGHT: u32 = 67;

const LEGEND_BACKGROUND: Rgb<u8> = Rgb([255, 255, 255]);
const SLOT_LEFT: i32 = 40;
const SLOT_TOP: i32 = 1;
const SLOT_STRIDE: i32 = 115;
const SLOT_WIDTH: u32 = 101;
const SLOT_HEIGHT: u32 = 65;
const LABEL_COLOR: Rgb<u8> = Rgb([255, 255, 255]);
const LABEL_SCALE: u32 = 2;

/// A legend swatch: fill color and its label
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaletteEntry {
    pub color: Rgb<u8>,
    pub label: &'static str,
}

pub const DEFAULT_PALETTE: [PaletteEntry; 4] = [
    PaletteEntry { color: Rgb([0, 0, 255]), label: "Blue" },
    PaletteEntry { color: Rgb([0, 255, 0]), label: "Green" },
    PaletteEntry { color: Rgb([255, 0, 0]), label: "Red" },
    PaletteEntry { color: Rgb([255, 255, 0]), label: "Yellow" },
];

/// Draws blob outlines and the palette legend on a copy of the frame
#[derive(Debug, Clone, Copy)]
pub struct OverlayRenderer {
    highlight: Rgb<u8>,
    thickness: u32,
}

impl OverlayRenderer {
    pub fn new(highlight: Rgb<u8>, thickness: u32) -> Self {
        Self {
            highlight,
            thickness: thickness.max(1),
        }
    }

    /// Rectangle occupied by legend slot `index`
    pub fn slot_rect(index: usize) -> Rect {
        Rect::at(SLOT_LEFT + index as i32 * SLOT_STRIDE, SLOT_TOP).of_size(SLOT_WIDTH, SLOT_HEIGHT)
    }

    /// Annotated copy of `frame`
    ///
    /// Outlines go down first and the legend band is repainted over
    /// them, so the band depends only on the palette.
    pub fn render(&self, frame: &RgbImage, blobs: &[Blob], palette: &[PaletteEntry]) -> RgbImage {
        let _span = tracing::debug_span!("render").entered();

        let mut canvas = frame.clone();
        for blob in blobs {
            self.draw_outline(&mut canvas, blob);
        }
        Self::draw_legend(&mut canvas, palette);
        canvas
    }

    fn draw_outline(&self, canvas: &mut RgbImage, blob: &Blob) {
        let points = &blob.contour;
        let thickness = self.thickness as i32;
        for (i, start) in points.iter().enumerate() {
            let end = points[(i + 1) % points.len()];
            for dy in 0..thickness {
                for dx in 0..thickness {
                    draw_line_segment_mut(
                        canvas,
                        ((start.x + dx) as f32, (start.y + dy) as f32),
                        ((end.x + dx) as f32, (end.y + dy) as f32),
                        self.highlight,
                    );
                }
            }
        }
    }

    fn draw_legend(canvas: &mut RgbImage, palette: &[PaletteEntry]) {
        let band_height = LEGEND_BAND_HEIGHT.min(canvas.height());
        if band_height == 0 || canvas.width() == 0 {
            return;
        }
        draw_filled_rect_mut(
            canvas,
            Rect::at(0, 0).of_size(canvas.width(), band_height),
            LEGEND_BACKGROUND,
        );

        for (index, entry) in palette.iter().enumerate() {
            let slot = Self::slot_rect(index);
            draw_filled_rect_mut(canvas, slot, entry.color);

            let (text_width, text_height) = font::text_size(entry.label, LABEL_SCALE);
            let x = slot.left() + (slot.width() as i32 - text_width as i32) / 2;
            let y = slot.top() + (slot.height() as i32 - text_height as i32) / 2;
            font::draw_text(canvas, x, y, entry.label, LABEL_SCALE, LABEL_COLOR);
        }
    }
}

impl Default for OverlayRenderer {
    fn default() -> Self {
        Self::new(Rgb([255, 255, 0]), 2)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use imageproc::point::Point;

    fn textured_frame(width: u32, height: u32) -> RgbImage {
        RgbImage::from_fn(width, height, |x, y| Rgb([(x % 251) as u8, (y % 241) as u8, 17]))
    }

    fn square_blob(x0: i32, y0: i32, x1: i32, y1: i32) -> Blob {
        Blob::from_boundary(&[
            Point::new(x0, y0),
            Point::new(x1, y0),
            Point::new(x1, y1),
            Point::new(x0, y1),
        ])
    }

    #[test]
    fn caller_frame_is_not_modified() {
        let frame = textured_frame(640, 480);
        let copy = frame.clone();
        let blob = square_blob(100, 100, 300, 300);
        let _ = OverlayRenderer::default().render(&frame, &[blob], &DEFAULT_PALETTE);
        assert_eq!(frame, copy);
    }

    #[test]
    fn without_blobs_only_the_band_changes() {
        let frame = textured_frame(640, 480);
        let out = OverlayRenderer::default().render(&frame, &[], &DEFAULT_PALETTE);

        for (x, y, pixel) in out.enumerate_pixels() {
            if y >= LEGEND_BAND_HEIGHT {
                assert_eq!(pixel, frame.get_pixel(x, y), "pixel ({x}, {y})");
            }
        }
    }

    #[test]
    fn band_is_independent_of_frame_and_blobs() {
        let renderer = OverlayRenderer::default();
        let plain = renderer.render(&RgbImage::new(640, 480), &[], &DEFAULT_PALETTE);
        let busy = renderer.render(
            &textured_frame(640, 480),
            &[square_blob(20, 20, 400, 300), square_blob(500, 10, 600, 200)],
            &DEFAULT_PALETTE,
        );

        for x in 0..640 {
            for y in 0..LEGEND_BAND_HEIGHT {
                assert_eq!(plain.get_pixel(x, y), busy.get_pixel(x, y), "pixel ({x}, {y})");
            }
        }
    }

    #[test]
    fn slots_are_filled_with_palette_colors() {
        let out = OverlayRenderer::default().render(&RgbImage::new(640, 480), &[], &DEFAULT_PALETTE);
        for (index, entry) in DEFAULT_PALETTE.iter().enumerate() {
            let slot = OverlayRenderer::slot_rect(index);
            // corner pixel, clear of the centered label
            assert_eq!(out.get_pixel(slot.left() as u32 + 1, slot.top() as u32 + 1), &entry.color);
        }
        assert_eq!(out.get_pixel(0, 0), &LEGEND_BACKGROUND);
    }

    #[test]
    fn slots_do_not_overlap() {
        for index in 0..DEFAULT_PALETTE.len() - 1 {
            let a = OverlayRenderer::slot_rect(index);
            let b = OverlayRenderer::slot_rect(index + 1);
            assert!(a.right() < b.left());
            assert!(a.bottom() < LEGEND_BAND_HEIGHT as i32);
        }
    }

    #[test]
    fn outlines_are_drawn_without_fill() {
        let frame = textured_frame(640, 480);
        let out = OverlayRenderer::default().render(&frame, &[square_blob(100, 150, 300, 350)], &DEFAULT_PALETTE);

        let highlight = Rgb([255, 255, 0]);
        assert_eq!(out.get_pixel(100, 250), &highlight);
        assert_eq!(out.get_pixel(101, 250), &highlight);
        assert_eq!(out.get_pixel(200, 150), &highlight);
        assert_eq!(out.get_pixel(200, 250), frame.get_pixel(200, 250));
        assert_eq!(out.get_pixel(50, 400), frame.get_pixel(50, 400));
    }

    #[test]
    fn tiny_frames_are_clipped() {
        let out = OverlayRenderer::default().render(&RgbImage::new(30, 20), &[], &DEFAULT_PALETTE);
        assert_eq!(out.dimensions(), (30, 20));
    }
}
