use super::types::{Hsv, HUE_MAX};
use image::{Rgb, RgbImage};

/// Convert one 8-bit RGB sample to HSV
///
/// Saturation and value use the full [0, 255] range; hue is halved so a
/// full turn fits in a byte ([0, 180]).
pub fn rgb_to_hsv(pixel: Rgb<u8>) -> Hsv {
    let [r, g, b] = pixel.0;
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let delta = f32::from(max - min);

    let s = if max == 0 {
        0
    } else {
        (255.0 * delta / f32::from(max)).round() as u8
    };

    if delta == 0.0 {
        return Hsv::new(0, s, max);
    }

    let (r, g, b) = (f32::from(r), f32::from(g), f32::from(b));
    let degrees = if max == pixel.0[0] {
        60.0 * (g - b) / delta
    } else if max == pixel.0[1] {
        120.0 + 60.0 * (b - r) / delta
    } else {
        240.0 + 60.0 * (r - g) / delta
    };

    // round before wrapping so reds just below 0 land on 0, not 180
    let mut h = (degrees / 2.0).round();
    if h < 0.0 {
        h += f32::from(HUE_MAX);
    }
    let h = h.min(f32::from(HUE_MAX)) as u8;
    Hsv::new(h, s, max)
}

/// Convert a whole frame to HSV, packed as (h, s, v) in each pixel's channels
pub fn frame_to_hsv(frame: &RgbImage) -> RgbImage {
    imageproc::map::map_colors(frame, |pixel: Rgb<u8>| {
        let hsv = rgb_to_hsv(pixel);
        Rgb([hsv.h, hsv.s, hsv.v])
    })
}
