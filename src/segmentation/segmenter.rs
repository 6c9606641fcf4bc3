use super::hsv::rgb_to_hsv;
use super::types::{Mask, ThresholdBounds, SELECTED};
use image::{Luma, Rgb, RgbImage};

/// Selects the pixels of a frame whose HSV value lies inside the bounds
#[derive(Debug, Clone, Copy, Default)]
pub struct ColorSegmenter;

impl ColorSegmenter {
    pub fn new() -> Self {
        Self
    }

    /// Produce a binary mask with the frame's dimensions
    ///
    /// Inverted bounds give an empty mask without touching the pixels.
    pub fn segment(&self, frame: &RgbImage, bounds: &ThresholdBounds) -> Mask {
        let _span = tracing::debug_span!("segment").entered();

        if bounds.is_inverted() {
            let (width, height) = frame.dimensions();
            return Mask::new(width, height);
        }

        imageproc::map::map_colors(frame, |pixel: Rgb<u8>| {
            if bounds.contains(rgb_to_hsv(pixel)) {
                Luma([SELECTED])
            } else {
                Luma([0])
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::segmentation::types::Hsv;

    fn selected_count(mask: &Mask) -> usize {
        mask.pixels().filter(|p| p[0] == SELECTED).count()
    }

    #[test]
    fn marks_exactly_the_pixels_inside_the_box() {
        // blue (h=120), red (h=0), dark blue (v=40)
        let mut frame = RgbImage::new(3, 1);
        frame.put_pixel(0, 0, Rgb([0, 0, 255]));
        frame.put_pixel(1, 0, Rgb([255, 0, 0]));
        frame.put_pixel(2, 0, Rgb([0, 0, 40]));

        let mask = ColorSegmenter::new().segment(&frame, &ThresholdBounds::default());
        assert_eq!(mask.dimensions(), (3, 1));
        assert_eq!(mask.get_pixel(0, 0)[0], SELECTED);
        assert_eq!(mask.get_pixel(1, 0)[0], 0);
        assert_eq!(mask.get_pixel(2, 0)[0], 0);
    }

    #[test]
    fn agrees_with_per_pixel_conversion() {
        let frame = RgbImage::from_fn(32, 32, |x, y| {
            Rgb([(x * 8) as u8, (y * 8) as u8, ((x + y) * 4) as u8])
        });
        let bounds = ThresholdBounds::new(Hsv::new(20, 30, 40), Hsv::new(120, 220, 230));
        let mask = ColorSegmenter::new().segment(&frame, &bounds);

        for (x, y, pixel) in frame.enumerate_pixels() {
            let expected = bounds.contains(rgb_to_hsv(*pixel));
            assert_eq!(mask.get_pixel(x, y)[0] == SELECTED, expected, "pixel ({x}, {y})");
        }
    }

    #[test]
    fn full_box_selects_everything() {
        let frame = RgbImage::from_fn(16, 16, |x, y| Rgb([(x * 16) as u8, (y * 16) as u8, 7]));
        let bounds = ThresholdBounds::new(Hsv::new(0, 0, 0), Hsv::new(180, 255, 255));
        let mask = ColorSegmenter::new().segment(&frame, &bounds);
        assert_eq!(selected_count(&mask), 256);
    }

    #[test]
    fn inverted_bounds_select_nothing() {
        let frame = RgbImage::from_pixel(10, 10, Rgb([0, 0, 255]));
        let inverted = [
            ThresholdBounds::new(Hsv::new(100, 0, 0), Hsv::new(50, 255, 255)),
            ThresholdBounds::new(Hsv::new(0, 200, 0), Hsv::new(180, 100, 255)),
            ThresholdBounds::new(Hsv::new(0, 0, 255), Hsv::new(180, 255, 0)),
        ];
        for bounds in inverted {
            let mask = ColorSegmenter::new().segment(&frame, &bounds);
            assert_eq!(mask.dimensions(), (10, 10));
            assert_eq!(selected_count(&mask), 0);
        }
    }
}
