mod blobs;
pub mod hsv;
mod refine;
mod segmenter;
mod threshold;
pub mod types;

pub use blobs::{polygon_area, simplify, Blob, BlobExtractor, DEFAULT_MIN_AREA};
pub use refine::MaskRefiner;
pub use segmenter::ColorSegmenter;
pub use threshold::{Control, FixedThresholds, ParameterSource, ThresholdControls, ThresholdState};
pub use types::{Hsv, Mask, ThresholdBounds};
