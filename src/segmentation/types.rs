use image::GrayImage;

/// Binary selection mask: 255 = selected, 0 = not selected
/// Dimensions match the frame it was derived from
pub type Mask = GrayImage;

/// Value written to selected mask pixels
pub const SELECTED: u8 = 255;

/// Largest hue value: hue is quantized to [0, 180] instead of [0, 360]
pub const HUE_MAX: u8 = 180;

/// A pixel in HSV color space
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hsv {
    pub h: u8,
    pub s: u8,
    pub v: u8,
}

impl Hsv {
    pub const fn new(h: u8, s: u8, v: u8) -> Self {
        Self { h, s, v }
    }
}

/// Lower and upper HSV bounds of the selection box
///
/// Components are not required to satisfy `lower <= upper`. An inverted
/// component can never be satisfied, so it selects nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThresholdBounds {
    pub lower: Hsv,
    pub upper: Hsv,
}

impl ThresholdBounds {
    pub const DEFAULT_UPPER: Hsv = Hsv::new(153, 255, 255);
    pub const DEFAULT_LOWER: Hsv = Hsv::new(64, 72, 49);

    pub const fn new(lower: Hsv, upper: Hsv) -> Self {
        Self { lower, upper }
    }

    /// True iff every component lies within its closed interval
    pub fn contains(&self, pixel: Hsv) -> bool {
        (self.lower.h..=self.upper.h).contains(&pixel.h)
            && (self.lower.s..=self.upper.s).contains(&pixel.s)
            && (self.lower.v..=self.upper.v).contains(&pixel.v)
    }

    /// True if some component has `lower > upper`
    pub fn is_inverted(&self) -> bool {
        self.lower.h > self.upper.h || self.lower.s > self.upper.s || self.lower.v > self.upper.v
    }
}

impl Default for ThresholdBounds {
    fn default() -> Self {
        Self::new(Self::DEFAULT_LOWER, Self::DEFAULT_UPPER)
    }
}

impl std::fmt::Display for ThresholdBounds {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "lower=({}, {}, {}) upper=({}, {}, {})",
            self.lower.h, self.lower.s, self.lower.v, self.upper.h, self.upper.s, self.upper.v
        )
    }
}
