use super::types::Mask;
use imageproc::contours::{find_contours, BorderType, Contour};
use imageproc::point::Point;

/// Default area a blob must exceed to be kept
pub const DEFAULT_MIN_AREA: f64 = 500.0;

/// A connected region of the mask, described by its outer boundary
#[derive(Debug, Clone, PartialEq)]
pub struct Blob {
    /// Boundary polygon with collinear intermediate points removed
    pub contour: Vec<Point<i32>>,
    /// Area enclosed by `contour`
    pub area: f64,
}

impl Blob {
    pub fn from_boundary(points: &[Point<i32>]) -> Self {
        let contour = simplify(points);
        let area = polygon_area(&contour);
        Self { contour, area }
    }
}

/// Finds external region boundaries and drops the small ones
#[derive(Debug, Clone, Copy)]
pub struct BlobExtractor {
    min_area: f64,
}

impl BlobExtractor {
    pub fn new(min_area: f64) -> Self {
        Self { min_area }
    }

    pub fn min_area(&self) -> f64 {
        self.min_area
    }

    /// Blobs with area strictly greater than the minimum, in tracing order
    ///
    /// Holes and regions nested inside holes are not reported.
    /// Regions touching the frame edge are traced as if the frame were
    /// surrounded by unselected pixels.
    pub fn extract(&self, mask: &Mask) -> impl Iterator<Item = Blob> {
        let min_area = self.min_area;
        find_contours::<i32>(&pad(mask))
            .into_iter()
            .filter(is_external)
            .map(|contour| {
                let points: Vec<Point<i32>> = contour
                    .points
                    .iter()
                    .map(|p| Point::new(p.x - 1, p.y - 1))
                    .collect();
                Blob::from_boundary(&points)
            })
            .filter(move |blob| blob.area > min_area)
    }
}

/// Copy of `mask` inside a one-pixel unselected border
fn pad(mask: &Mask) -> Mask {
    let (width, height) = mask.dimensions();
    let mut padded = Mask::new(width + 2, height + 2);
    image::imageops::replace(&mut padded, mask, 1, 1);
    padded
}

impl Default for BlobExtractor {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_AREA)
    }
}

fn is_external(contour: &Contour<i32>) -> bool {
    matches!(contour.border_type, BorderType::Outer) && contour.parent.is_none()
}

/// Drop points that lie on a straight run between their neighbours
///
/// Reversals (a boundary doubling back along a one-pixel-wide strand)
/// are kept so the polygon still reaches the strand's tip.
pub fn simplify(points: &[Point<i32>]) -> Vec<Point<i32>> {
    let n = points.len();
    if n < 3 {
        return points.to_vec();
    }

    points
        .iter()
        .enumerate()
        .filter(|&(i, current)| {
            let prev = points[(i + n - 1) % n];
            let next = points[(i + 1) % n];
            let (ax, ay) = (current.x - prev.x, current.y - prev.y);
            let (bx, by) = (next.x - current.x, next.y - current.y);
            let cross = ax * by - ay * bx;
            let dot = ax * bx + ay * by;
            cross != 0 || dot <= 0
        })
        .map(|(_, point)| *point)
        .collect()
}

/// Shoelace area of a closed polygon
pub fn polygon_area(points: &[Point<i32>]) -> f64 {
    let n = points.len();
    if n < 3 {
        return 0.0;
    }

    let twice: i64 = (0..n)
        .map(|i| {
            let a = points[i];
            let b = points[(i + 1) % n];
            i64::from(a.x) * i64::from(b.y) - i64::from(b.x) * i64::from(a.y)
        })
        .sum();
    twice.abs() as f64 / 2.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::segmentation::types::SELECTED;
    use image::Luma;
    use imageproc::drawing::draw_filled_rect_mut;
    use imageproc::rect::Rect;

    // A w x h block of pixels traces a boundary through pixel centres,
    // enclosing (w - 1) * (h - 1).
    fn fill(mask: &mut Mask, x: i32, y: i32, w: u32, h: u32) {
        draw_filled_rect_mut(mask, Rect::at(x, y).of_size(w, h), Luma([SELECTED]));
    }

    #[test]
    fn single_square_yields_one_blob_with_its_area() {
        let mut mask = Mask::new(100, 100);
        fill(&mut mask, 10, 10, 41, 41);

        let blobs: Vec<Blob> = BlobExtractor::default().extract(&mask).collect();
        assert_eq!(blobs.len(), 1);
        assert!((blobs[0].area - 1600.0).abs() < 1.0);
    }

    #[test]
    fn square_boundary_simplifies_to_corners() {
        let mut mask = Mask::new(50, 50);
        fill(&mut mask, 5, 5, 30, 30);

        let blob = BlobExtractor::new(0.0).extract(&mask).next().unwrap();
        assert_eq!(blob.contour.len(), 4);
        for corner in [Point::new(5, 5), Point::new(34, 5), Point::new(34, 34), Point::new(5, 34)] {
            assert!(blob.contour.contains(&corner), "missing {corner:?}");
        }
    }

    #[test]
    fn keeps_only_regions_above_min_area() {
        let mut mask = Mask::new(120, 60);
        fill(&mut mask, 5, 5, 21, 21); // 400
        fill(&mut mask, 50, 5, 21, 31); // 600

        let blobs: Vec<Blob> = BlobExtractor::new(500.0).extract(&mask).collect();
        assert_eq!(blobs.len(), 1);
        assert!((blobs[0].area - 600.0).abs() < 1.0);
    }

    #[test]
    fn area_equal_to_minimum_is_excluded() {
        let mut mask = Mask::new(60, 60);
        fill(&mut mask, 5, 5, 21, 26); // 500

        assert_eq!(BlobExtractor::new(500.0).extract(&mask).count(), 0);
        assert_eq!(BlobExtractor::new(499.0).extract(&mask).count(), 1);
    }

    #[test]
    fn holes_are_not_reported_separately() {
        let mut mask = Mask::new(100, 100);
        fill(&mut mask, 10, 10, 61, 61);
        draw_filled_rect_mut(&mut mask, Rect::at(30, 30).of_size(21, 21), Luma([0]));

        let blobs: Vec<Blob> = BlobExtractor::new(0.0).extract(&mask).collect();
        assert_eq!(blobs.len(), 1);
        assert!((blobs[0].area - 3600.0).abs() < 1.0);
    }

    #[test]
    fn regions_inside_holes_are_not_reported() {
        let mut mask = Mask::new(100, 100);
        fill(&mut mask, 10, 10, 61, 61);
        draw_filled_rect_mut(&mut mask, Rect::at(20, 20).of_size(41, 41), Luma([0]));
        fill(&mut mask, 30, 30, 21, 21);

        let blobs: Vec<Blob> = BlobExtractor::new(0.0).extract(&mask).collect();
        assert_eq!(blobs.len(), 1);
    }

    #[test]
    fn regions_touching_each_edge_are_found() {
        let cases = [(0, 30), (70, 30), (30, 0), (30, 70)];
        for (x, y) in cases {
            let mut mask = Mask::new(100, 100);
            fill(&mut mask, x, y, 30, 30);

            let blobs: Vec<Blob> = BlobExtractor::new(0.0).extract(&mask).collect();
            assert_eq!(blobs.len(), 1, "square at ({x}, {y})");
            assert!((blobs[0].area - 841.0).abs() < 1.0);
            for point in &blobs[0].contour {
                assert!((0..100).contains(&point.x) && (0..100).contains(&point.y));
            }
        }
    }

    #[test]
    fn corner_region_keeps_frame_coordinates() {
        let mut mask = Mask::new(100, 100);
        fill(&mut mask, 0, 0, 50, 50);

        let blob = BlobExtractor::new(0.0).extract(&mask).next().unwrap();
        assert_eq!(blob.contour.len(), 4);
        for corner in [Point::new(0, 0), Point::new(49, 0), Point::new(49, 49), Point::new(0, 49)] {
            assert!(blob.contour.contains(&corner), "missing {corner:?}");
        }
    }

    #[test]
    fn fully_selected_mask_is_one_blob() {
        let mask = Mask::from_pixel(320, 240, Luma([SELECTED]));

        let blobs: Vec<Blob> = BlobExtractor::default().extract(&mask).collect();
        assert_eq!(blobs.len(), 1);
        assert!((blobs[0].area - 319.0 * 239.0).abs() < 1.0);
    }

    #[test]
    fn empty_mask_has_no_blobs() {
        assert_eq!(BlobExtractor::default().extract(&Mask::new(40, 40)).count(), 0);
    }

    #[test]
    fn never_returns_blobs_at_or_below_minimum() {
        let mut mask = Mask::new(200, 200);
        let sizes = [(3, 3), (10, 10), (23, 23), (21, 26), (30, 30), (40, 12)];
        for (i, &(w, h)) in sizes.iter().enumerate() {
            let x = 5 + (i as i32 % 3) * 65;
            let y = 5 + (i as i32 / 3) * 65;
            fill(&mut mask, x, y, w, h);
        }

        for min_area in [0.0, 100.0, 440.0, 500.0, 841.0] {
            for blob in BlobExtractor::new(min_area).extract(&mask) {
                assert!(blob.area > min_area);
            }
        }
    }

    #[test]
    fn shoelace_handles_degenerate_polygons() {
        assert_eq!(polygon_area(&[]), 0.0);
        assert_eq!(polygon_area(&[Point::new(1, 1), Point::new(5, 1)]), 0.0);
        let triangle = [Point::new(0, 0), Point::new(4, 0), Point::new(0, 3)];
        assert_eq!(polygon_area(&triangle), 6.0);
    }
}
