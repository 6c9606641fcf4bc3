use crate::capture::FrameSource;
use crate::error::PipelineError;
use crate::output::{DisplaySurface, OverlayRenderer, PaletteEntry, DEFAULT_PALETTE};
use crate::segmentation::{
    Blob, BlobExtractor, ColorSegmenter, Mask, MaskRefiner, ThresholdBounds, ThresholdState,
    DEFAULT_MIN_AREA,
};
use image::RgbImage;
use std::time::{Duration, Instant};

/// Frames between two timing reports
const STATS_INTERVAL: u64 = 30;

/// Shortest cancellation poll, even when a cycle overran its budget
const MIN_POLL: Duration = Duration::from_millis(1);

#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Blobs must enclose strictly more than this area
    pub min_area: f64,
    /// Flip frames horizontally before processing
    pub mirror: bool,
    /// Cycle rate the cancellation poll paces to
    pub target_fps: u32,
    /// Stop after this many cycles
    pub max_frames: Option<u64>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            min_area: DEFAULT_MIN_AREA,
            mirror: true,
            target_fps: 30,
            max_frames: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverState {
    Idle,
    Running,
    Stopped,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StopReason {
    /// The display asked to quit
    Cancelled,
    /// The frame source has no more frames
    EndOfStream,
    /// The frame source failed to deliver a frame
    CaptureFailed(String),
    /// The configured frame limit was reached
    FrameLimit,
    /// A fatal error ended the run
    Fatal,
}

#[derive(Debug, Clone)]
pub struct RunSummary {
    pub frames: u64,
    pub stop_reason: StopReason,
    pub final_bounds: ThresholdBounds,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct StageTimings {
    pub segment: Duration,
    pub refine: Duration,
    pub extract: Duration,
    pub render: Duration,
}

/// Everything one frame produces
#[derive(Debug, Clone)]
pub struct CycleOutput {
    pub annotated: RgbImage,
    pub mask: Mask,
    pub blobs: Vec<Blob>,
    pub timings: StageTimings,
}

/// The per-frame stages, without any I/O
#[derive(Debug, Clone)]
pub struct FrameProcessor {
    segmenter: ColorSegmenter,
    refiner: MaskRefiner,
    extractor: BlobExtractor,
    renderer: OverlayRenderer,
    palette: Vec<PaletteEntry>,
}

impl FrameProcessor {
    pub fn new(min_area: f64) -> Self {
        Self {
            segmenter: ColorSegmenter::new(),
            refiner: MaskRefiner::default(),
            extractor: BlobExtractor::new(min_area),
            renderer: OverlayRenderer::default(),
            palette: DEFAULT_PALETTE.to_vec(),
        }
    }

    /// Segment, refine, extract and render one frame
    pub fn process(&self, frame: &RgbImage, bounds: &ThresholdBounds) -> CycleOutput {
        let mut timings = StageTimings::default();

        let start = Instant::now();
        let mask = self.segmenter.segment(frame, bounds);
        timings.segment = start.elapsed();

        let start = Instant::now();
        let mask = self.refiner.refine(mask);
        timings.refine = start.elapsed();

        let start = Instant::now();
        let blobs: Vec<Blob> = tracing::debug_span!("extract")
            .in_scope(|| self.extractor.extract(&mask).collect());
        timings.extract = start.elapsed();

        let start = Instant::now();
        let annotated = self.renderer.render(frame, &blobs, &self.palette);
        timings.render = start.elapsed();

        CycleOutput {
            annotated,
            mask,
            blobs,
            timings,
        }
    }
}

impl Default for FrameProcessor {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_AREA)
    }
}

#[derive(Debug, Default)]
struct RunStats {
    frames: u64,
    capture: Duration,
    stages: StageTimings,
    last_blob_count: usize,
}

impl RunStats {
    fn record(&mut self, capture: Duration, output: &CycleOutput) {
        self.frames += 1;
        self.capture += capture;
        self.stages.segment += output.timings.segment;
        self.stages.refine += output.timings.refine;
        self.stages.extract += output.timings.extract;
        self.stages.render += output.timings.render;
        self.last_blob_count = output.blobs.len();
    }

    fn report(&self) {
        let avg = |total: Duration| total.as_secs_f64() * 1000.0 / self.frames as f64;
        let capture_ms = avg(self.capture);
        let segment_ms = avg(self.stages.segment);
        let refine_ms = avg(self.stages.refine);
        let extract_ms = avg(self.stages.extract);
        let render_ms = avg(self.stages.render);
        let total_ms = capture_ms + segment_ms + refine_ms + extract_ms + render_ms;

        tracing::info!(
            "Frame {}: capture={:.1}ms, segment={:.1}ms, refine={:.1}ms, extract={:.1}ms, render={:.1}ms, total={:.1}ms, fps={:.1}, blobs={}",
            self.frames,
            capture_ms,
            segment_ms,
            refine_ms,
            extract_ms,
            render_ms,
            total_ms,
            1000.0 / total_ms,
            self.last_blob_count
        );
    }
}

/// Owns the frame source and display and runs the capture loop
///
/// Idle until `start`, then Running one `cycle` at a time until a stop
/// condition, then Stopped. Stopping drops the source and display.
pub struct PipelineDriver<S: FrameSource, D: DisplaySurface> {
    source: Option<S>,
    display: Option<D>,
    thresholds: ThresholdState,
    processor: FrameProcessor,
    config: PipelineConfig,
    state: DriverState,
    resolution: (u32, u32),
    stats: RunStats,
    stop_reason: Option<StopReason>,
}

impl<S: FrameSource, D: DisplaySurface> PipelineDriver<S, D> {
    pub fn new(source: S, display: D, thresholds: ThresholdState, config: PipelineConfig) -> Self {
        Self {
            source: Some(source),
            display: Some(display),
            thresholds,
            processor: FrameProcessor::new(config.min_area),
            config,
            state: DriverState::Idle,
            resolution: (0, 0),
            stats: RunStats::default(),
            stop_reason: None,
        }
    }

    pub fn state(&self) -> DriverState {
        self.state
    }

    pub fn frames(&self) -> u64 {
        self.stats.frames
    }

    pub fn stop_reason(&self) -> Option<&StopReason> {
        self.stop_reason.as_ref()
    }

    /// Whether the source and display have been released
    pub fn is_released(&self) -> bool {
        self.source.is_none() && self.display.is_none()
    }

    pub fn start(&mut self) -> Result<(), PipelineError> {
        if self.state != DriverState::Idle {
            return Err(PipelineError::AlreadyStarted);
        }
        let Some(source) = self.source.as_ref() else {
            return Err(PipelineError::NotRunning);
        };

        self.resolution = source.resolution();
        self.state = DriverState::Running;

        tracing::info!(
            "Pipeline running at {}x{}, min_area={}, mirror={}, bounds: {}",
            self.resolution.0,
            self.resolution.1,
            self.config.min_area,
            self.config.mirror,
            self.thresholds.current()
        );
        Ok(())
    }

    /// Run one capture-process-present-poll cycle
    ///
    /// Returns the stop reason once the run has ended.
    pub fn cycle(&mut self) -> Result<Option<StopReason>, PipelineError> {
        if self.state != DriverState::Running {
            return Err(PipelineError::NotRunning);
        }
        let cycle_start = Instant::now();

        let Some(source) = self.source.as_mut() else {
            return Err(PipelineError::NotRunning);
        };
        let frame = match source.capture_frame() {
            Ok(Some(frame)) => frame,
            Ok(None) => {
                tracing::info!("Frame source reached end of stream");
                return Ok(Some(self.stop(StopReason::EndOfStream)));
            }
            Err(e) => {
                tracing::error!("Failed to capture frame: {:#}", e);
                return Ok(Some(self.stop(StopReason::CaptureFailed(format!("{e:#}")))));
            }
        };
        let capture_time = cycle_start.elapsed();

        if frame.dimensions() != self.resolution {
            let error = PipelineError::ResolutionChanged {
                expected: self.resolution,
                actual: frame.dimensions(),
            };
            tracing::error!("{}", error);
            self.stop(StopReason::Fatal);
            return Err(error);
        }

        let frame = if self.config.mirror {
            image::imageops::flip_horizontal(&frame)
        } else {
            frame
        };

        let bounds = self.thresholds.current();
        let output = self.processor.process(&frame, &bounds);
        self.stats.record(capture_time, &output);

        let Some(display) = self.display.as_mut() else {
            return Err(PipelineError::NotRunning);
        };
        if let Err(e) = display.present(&output.annotated, &output.mask) {
            self.stop(StopReason::Fatal);
            return Err(PipelineError::Display(e));
        }

        if self.stats.frames % STATS_INTERVAL == 0 {
            self.stats.report();
        }

        if self
            .config
            .max_frames
            .is_some_and(|limit| self.stats.frames >= limit)
        {
            return Ok(Some(self.stop(StopReason::FrameLimit)));
        }

        let budget = Duration::from_secs_f32(1.0 / self.config.target_fps.max(1) as f32);
        let timeout = budget.saturating_sub(cycle_start.elapsed()).max(MIN_POLL);
        match display.poll_cancel(timeout) {
            Ok(true) => {
                tracing::info!("Cancellation requested");
                Ok(Some(self.stop(StopReason::Cancelled)))
            }
            Ok(false) => Ok(None),
            Err(e) => {
                self.stop(StopReason::Fatal);
                Err(PipelineError::Display(e))
            }
        }
    }

    /// Enter Stopped and release the source and display
    pub fn stop(&mut self, reason: StopReason) -> StopReason {
        if self.state != DriverState::Stopped {
            tracing::info!("Pipeline stopped after {} frames: {:?}", self.stats.frames, reason);
            self.state = DriverState::Stopped;
            self.stop_reason = Some(reason.clone());
        }
        self.source = None;
        self.display = None;
        reason
    }

    /// Start, cycle until a stop condition, and report how the run ended
    pub fn run(mut self) -> Result<RunSummary, PipelineError> {
        self.start()?;

        let stop_reason = loop {
            if let Some(reason) = self.cycle()? {
                break reason;
            }
        };

        let final_bounds = self.thresholds.current();
        tracing::info!("Final bounds: {}", final_bounds);

        Ok(RunSummary {
            frames: self.stats.frames,
            stop_reason,
            final_bounds,
        })
    }
}
