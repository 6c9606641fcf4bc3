//! Real-time color-range object detection over a live video stream.
//!
//! Each frame is converted to HSV, thresholded against six live bounds,
//! cleaned with morphology, split into blobs and annotated for display.

pub mod capture;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod segmentation;

pub use error::PipelineError;
pub use pipeline::{
    CycleOutput, DriverState, FrameProcessor, PipelineConfig, PipelineDriver, RunSummary,
    StopReason,
};
