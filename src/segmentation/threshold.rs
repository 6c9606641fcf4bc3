use super::types::{Hsv, ThresholdBounds, HUE_MAX};
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;

/// One of the six live threshold controls
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    UpperHue,
    UpperSaturation,
    UpperValue,
    LowerHue,
    LowerSaturation,
    LowerValue,
}

impl Control {
    pub const ALL: [Control; 6] = [
        Control::UpperHue,
        Control::UpperSaturation,
        Control::UpperValue,
        Control::LowerHue,
        Control::LowerSaturation,
        Control::LowerValue,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Control::UpperHue => "Upper Hue",
            Control::UpperSaturation => "Upper Saturation",
            Control::UpperValue => "Upper Value",
            Control::LowerHue => "Lower Hue",
            Control::LowerSaturation => "Lower Saturation",
            Control::LowerValue => "Lower Value",
        }
    }

    /// Largest value this control accepts
    pub fn max(self) -> u8 {
        match self {
            Control::UpperHue | Control::LowerHue => HUE_MAX,
            _ => u8::MAX,
        }
    }

    fn index(self) -> usize {
        self as usize
    }

    /// The control after this one, wrapping around
    pub fn next(self) -> Control {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    /// The control before this one, wrapping around
    pub fn previous(self) -> Control {
        Self::ALL[(self.index() + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

/// Anything that can report the current six bound values
///
/// Reads return a momentary snapshot; values may change between calls.
pub trait ParameterSource: Send + Sync {
    fn read(&self) -> ThresholdBounds;
}

/// A source that always returns the same bounds
#[derive(Debug, Clone, Copy)]
pub struct FixedThresholds(pub ThresholdBounds);

impl ParameterSource for FixedThresholds {
    fn read(&self) -> ThresholdBounds {
        self.0
    }
}

/// Six independently settable bounded controls, shared between the
/// input side (keyboard, CLI) and the pipeline
#[derive(Debug)]
pub struct ThresholdControls {
    values: [AtomicU8; 6],
}

impl ThresholdControls {
    pub fn new(initial: ThresholdBounds) -> Self {
        let controls = Self {
            values: Default::default(),
        };
        controls.set(Control::UpperHue, initial.upper.h);
        controls.set(Control::UpperSaturation, initial.upper.s);
        controls.set(Control::UpperValue, initial.upper.v);
        controls.set(Control::LowerHue, initial.lower.h);
        controls.set(Control::LowerSaturation, initial.lower.s);
        controls.set(Control::LowerValue, initial.lower.v);
        controls
    }

    pub fn get(&self, control: Control) -> u8 {
        self.values[control.index()].load(Ordering::Relaxed)
    }

    /// Store a value, clamped to the control's range
    pub fn set(&self, control: Control, value: u8) {
        self.values[control.index()].store(value.min(control.max()), Ordering::Relaxed);
    }

    /// Move a control by `delta`, saturating at both ends of its range
    pub fn adjust(&self, control: Control, delta: i16) -> u8 {
        let value = (i16::from(self.get(control)) + delta).clamp(0, i16::from(control.max())) as u8;
        self.set(control, value);
        value
    }
}

impl Default for ThresholdControls {
    fn default() -> Self {
        Self::new(ThresholdBounds::default())
    }
}

impl ParameterSource for ThresholdControls {
    fn read(&self) -> ThresholdBounds {
        ThresholdBounds::new(
            Hsv::new(
                self.get(Control::LowerHue),
                self.get(Control::LowerSaturation),
                self.get(Control::LowerValue),
            ),
            Hsv::new(
                self.get(Control::UpperHue),
                self.get(Control::UpperSaturation),
                self.get(Control::UpperValue),
            ),
        )
    }
}

/// The pipeline's view of the live bounds, read once per cycle
///
/// Values are passed through unchanged: inverted or extreme bounds are
/// handled downstream as an empty or full selection.
#[derive(Clone)]
pub struct ThresholdState {
    source: Arc<dyn ParameterSource>,
}

impl ThresholdState {
    pub fn new(source: Arc<dyn ParameterSource>) -> Self {
        Self { source }
    }

    pub fn fixed(bounds: ThresholdBounds) -> Self {
        Self::new(Arc::new(FixedThresholds(bounds)))
    }

    pub fn current(&self) -> ThresholdBounds {
        self.source.read()
    }
}
