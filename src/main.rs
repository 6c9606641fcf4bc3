use anyhow::{bail, Context, Result};
use clap::Parser;
use huetrack::capture::{FrameSource, ImageSequence, WebcamCapture};
use huetrack::output::{DisplaySurface, HeadlessDisplay, WindowDisplay};
use huetrack::segmentation::{Hsv, ThresholdBounds, ThresholdControls, ThresholdState};
use huetrack::{PipelineConfig, PipelineDriver, StopReason};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Input webcam device index
    #[arg(short, long, default_value_t = 0)]
    input_device: u32,

    /// Replay the images in this directory instead of using a webcam
    #[arg(long)]
    input_dir: Option<PathBuf>,

    /// Capture resolution width
    #[arg(long, default_value_t = 640)]
    capture_width: u32,

    /// Capture resolution height
    #[arg(long, default_value_t = 480)]
    capture_height: u32,

    /// Target frames per second
    #[arg(long, default_value_t = 30)]
    fps: u32,

    /// Blobs must enclose more than this area (pixels)
    #[arg(long, default_value_t = 500.0)]
    min_area: f64,

    /// Initial upper hue bound (0-180)
    #[arg(long, default_value_t = 153)]
    upper_hue: u8,

    /// Initial upper saturation bound
    #[arg(long, default_value_t = 255)]
    upper_saturation: u8,

    /// Initial upper value bound
    #[arg(long, default_value_t = 255)]
    upper_value: u8,

    /// Initial lower hue bound (0-180)
    #[arg(long, default_value_t = 64)]
    lower_hue: u8,

    /// Initial lower saturation bound
    #[arg(long, default_value_t = 72)]
    lower_saturation: u8,

    /// Initial lower value bound
    #[arg(long, default_value_t = 49)]
    lower_value: u8,

    /// Do not mirror frames horizontally
    #[arg(long)]
    no_mirror: bool,

    /// Run without display windows
    #[arg(long)]
    headless: bool,

    /// Stop after this many frames
    #[arg(long)]
    max_frames: Option<u64>,

    /// Enable debug logging
    #[arg(long)]
    debug: bool,
}

impl Args {
    fn initial_bounds(&self) -> ThresholdBounds {
        ThresholdBounds::new(
            Hsv::new(self.lower_hue, self.lower_saturation, self.lower_value),
            Hsv::new(self.upper_hue, self.upper_saturation, self.upper_value),
        )
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let log_level = if args.debug {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_target(false)
        .init();

    tracing::info!("huetrack starting");

    let controls = Arc::new(ThresholdControls::new(args.initial_bounds()));
    let thresholds = ThresholdState::new(controls.clone());
    tracing::info!("Initial bounds: {}", thresholds.current());

    // Initialize capture
    let source: Box<dyn FrameSource> = match &args.input_dir {
        Some(dir) => Box::new(
            ImageSequence::new(dir).context("Failed to open image sequence")?,
        ),
        None => Box::new(
            WebcamCapture::new(
                args.input_device,
                args.capture_width,
                args.capture_height,
                args.fps,
            )
            .context("Failed to initialize webcam capture")?,
        ),
    };
    let (width, height) = source.resolution();

    // Initialize display
    let display: Box<dyn DisplaySurface> = if args.headless {
        tracing::info!("Running headless");
        Box::new(HeadlessDisplay::new())
    } else {
        Box::new(
            WindowDisplay::new(width, height, controls)
                .context("Failed to initialize display")?,
        )
    };

    let config = PipelineConfig {
        min_area: args.min_area,
        mirror: !args.no_mirror,
        target_fps: args.fps,
        max_frames: args.max_frames,
    };

    // Main loop
    let summary = PipelineDriver::new(source, display, thresholds, config).run()?;

    tracing::info!(
        "Processed {} frames, stopped: {:?}",
        summary.frames,
        summary.stop_reason
    );

    if let StopReason::CaptureFailed(cause) = summary.stop_reason {
        bail!("Failed to capture frame: {cause}");
    }

    Ok(())
}
