use super::types::Mask;
use imageproc::distance_transform::Norm;
use imageproc::morphology::{dilate_mut, erode_mut, open_mut};

/// Radius of the square structuring element: 2 gives a full 5x5 square
pub const DEFAULT_RADIUS: u8 = 2;

/// Morphological cleanup of a threshold mask
///
/// Runs erode, open, dilate with the same square element. The first
/// erosion removes speckle and thin bridges; the opening removes what
/// survived; the final dilation grows the remaining regions back.
#[derive(Debug, Clone, Copy)]
pub struct MaskRefiner {
    radius: u8,
}

impl MaskRefiner {
    pub fn new(radius: u8) -> Self {
        Self { radius }
    }

    /// Refine the mask in place and hand it back
    pub fn refine(&self, mut mask: Mask) -> Mask {
        let _span = tracing::debug_span!("refine").entered();

        // LInf balls are squares
        erode_mut(&mut mask, Norm::LInf, self.radius);
        open_mut(&mut mask, Norm::LInf, self.radius);
        dilate_mut(&mut mask, Norm::LInf, self.radius);
        mask
    }
}

impl Default for MaskRefiner {
    fn default() -> Self {
        Self::new(DEFAULT_RADIUS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::segmentation::types::SELECTED;
    use image::Luma;
    use imageproc::drawing::draw_filled_rect_mut;
    use imageproc::rect::Rect;

    fn selected_count(mask: &Mask) -> usize {
        mask.pixels().filter(|p| p[0] == SELECTED).count()
    }

    fn square_mask(size: u32, side: u32) -> Mask {
        let mut mask = Mask::new(size, size);
        let offset = ((size - side) / 2) as i32;
        draw_filled_rect_mut(
            &mut mask,
            Rect::at(offset, offset).of_size(side, side),
            Luma([SELECTED]),
        );
        mask
    }

    #[test]
    fn bars_narrower_than_two_erosions_are_removed() {
        // erode + open erode twice with radius 2: 8 px bars vanish, 9 px bars survive
        let mut mask = Mask::new(80, 80);
        draw_filled_rect_mut(&mut mask, Rect::at(10, 10).of_size(8, 60), Luma([SELECTED]));
        draw_filled_rect_mut(&mut mask, Rect::at(40, 10).of_size(9, 60), Luma([SELECTED]));
        let refined = MaskRefiner::default().refine(mask);

        assert_eq!(refined.get_pixel(13, 40)[0], 0);
        assert_eq!(refined.get_pixel(40, 40)[0], SELECTED);
        assert_eq!(refined.get_pixel(48, 40)[0], SELECTED);
    }

    #[test]
    fn clean_square_keeps_its_area() {
        let mask = square_mask(100, 60);
        let before = selected_count(&mask);
        let refined = MaskRefiner::default().refine(mask);
        let after = selected_count(&refined);

        let tolerance = before / 20;
        assert!(before.abs_diff(after) <= tolerance, "{before} -> {after}");
    }

    #[test]
    fn isolated_specks_are_removed() {
        let mut mask = square_mask(100, 60);
        for (x, y) in [(2, 2), (97, 3), (5, 95), (90, 90)] {
            mask.put_pixel(x, y, Luma([SELECTED]));
        }
        let refined = MaskRefiner::default().refine(mask);

        for (x, y) in [(2, 2), (97, 3), (5, 95), (90, 90)] {
            assert_eq!(refined.get_pixel(x, y)[0], 0);
        }
        assert_eq!(refined.get_pixel(50, 50)[0], SELECTED);
    }

    #[test]
    fn thin_lines_do_not_survive() {
        let mut mask = Mask::new(60, 60);
        draw_filled_rect_mut(&mut mask, Rect::at(0, 30).of_size(60, 3), Luma([SELECTED]));
        let refined = MaskRefiner::default().refine(mask);
        assert_eq!(selected_count(&refined), 0);
    }

    #[test]
    fn dimensions_are_unchanged() {
        let refined = MaskRefiner::default().refine(Mask::new(33, 17));
        assert_eq!(refined.dimensions(), (33, 17));
    }
}
