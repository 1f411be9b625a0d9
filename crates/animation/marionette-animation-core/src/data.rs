//! Immutable motion and expression data.
//!
//! Curves are stored as a start key followed by segments, each segment
//! carrying its own end key. Consecutive segments share keys, so a curve of
//! `n` segments has `n + 1` keys.

use serde::{Deserialize, Serialize};

use marionette_api_core::BlendMode;

use crate::error::DataError;

/// A (time, value) key.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CurvePoint {
    pub time: f32,
    pub value: f32,
}

impl CurvePoint {
    pub fn new(time: f32, value: f32) -> Self {
        Self { time, value }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Segment {
    Linear { end: CurvePoint },
    /// Cubic bezier through two control keys; x is time.
    Bezier {
        c0: CurvePoint,
        c1: CurvePoint,
        end: CurvePoint,
    },
    /// Holds the start value until the end key.
    Stepped { end: CurvePoint },
    /// Jumps to the end value right after the start key.
    InverseStepped { end: CurvePoint },
}

impl Segment {
    #[inline]
    pub fn end(&self) -> CurvePoint {
        match *self {
            Segment::Linear { end }
            | Segment::Bezier { end, .. }
            | Segment::Stepped { end }
            | Segment::InverseStepped { end } => end,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Curve {
    pub start: CurvePoint,
    #[serde(default)]
    pub segments: Vec<Segment>,
}

impl Curve {
    pub fn constant(value: f32) -> Self {
        Self {
            start: CurvePoint::new(0.0, value),
            segments: Vec::new(),
        }
    }

    /// Piecewise-linear curve through `keys`.
    pub fn linear(keys: &[(f32, f32)]) -> Self {
        let mut iter = keys.iter();
        let start = iter
            .next()
            .map(|&(t, v)| CurvePoint::new(t, v))
            .unwrap_or(CurvePoint::new(0.0, 0.0));
        Self {
            start,
            segments: iter
                .map(|&(t, v)| Segment::Linear {
                    end: CurvePoint::new(t, v),
                })
                .collect(),
        }
    }
}

/// What a motion curve drives.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CurveTarget {
    /// Model-level opacity.
    Model,
    Parameter,
    PartOpacity,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MotionCurve {
    pub target: CurveTarget,
    pub id: String,
    /// Curve-specific fade-in; negative means "use the motion's fade".
    #[serde(default = "unset_fade")]
    pub fade_in_time: f32,
    #[serde(default = "unset_fade")]
    pub fade_out_time: f32,
    pub curve: Curve,
}

impl MotionCurve {
    pub fn parameter(id: impl Into<String>, curve: Curve) -> Self {
        Self {
            target: CurveTarget::Parameter,
            id: id.into(),
            fade_in_time: -1.0,
            fade_out_time: -1.0,
            curve,
        }
    }

    #[inline]
    pub fn has_fade_override(&self) -> bool {
        self.fade_in_time >= 0.0 || self.fade_out_time >= 0.0
    }
}

/// A user-data marker fired when playback crosses `time`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MotionEventData {
    pub time: f32,
    pub value: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MotionData {
    #[serde(default)]
    pub name: Option<String>,
    pub duration: f32,
    #[serde(default, rename = "loop")]
    pub looping: bool,
    #[serde(default = "default_fps")]
    pub fps: f32,
    #[serde(default = "default_fade")]
    pub fade_in_time: f32,
    #[serde(default = "default_fade")]
    pub fade_out_time: f32,
    #[serde(default)]
    pub curves: Vec<MotionCurve>,
    #[serde(default)]
    pub events: Vec<MotionEventData>,
}

impl MotionData {
    pub fn new(duration: f32) -> Self {
        Self {
            name: None,
            duration,
            looping: false,
            fps: default_fps(),
            fade_in_time: default_fade(),
            fade_out_time: default_fade(),
            curves: Vec::new(),
            events: Vec::new(),
        }
    }

    /// Check times are non-negative and keys are ordered.
    pub fn validate(&self) -> Result<(), DataError> {
        non_negative("duration", self.duration)?;
        non_negative("fps", self.fps)?;
        non_negative("fade_in_time", self.fade_in_time)?;
        non_negative("fade_out_time", self.fade_out_time)?;
        for curve in &self.curves {
            let mut prev = curve.curve.start.time;
            for (i, seg) in curve.curve.segments.iter().enumerate() {
                let end = seg.end().time;
                if end.is_nan() || end < prev {
                    return Err(DataError::UnorderedKeys {
                        curve: curve.id.clone(),
                        segment: i,
                    });
                }
                prev = end;
            }
        }
        for event in &self.events {
            non_negative("event time", event.time)?;
        }
        Ok(())
    }
}

/// One parameter entry of an expression.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ExpressionParameter {
    pub id: String,
    pub value: f32,
    #[serde(default = "default_expression_blend")]
    pub blend: BlendMode,
}

impl ExpressionParameter {
    pub fn new(id: impl Into<String>, value: f32, blend: BlendMode) -> Self {
        Self {
            id: id.into(),
            value,
            blend,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ExpressionData {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default = "default_fade")]
    pub fade_in_time: f32,
    #[serde(default = "default_fade")]
    pub fade_out_time: f32,
    #[serde(default)]
    pub parameters: Vec<ExpressionParameter>,
}

impl ExpressionData {
    pub fn validate(&self) -> Result<(), DataError> {
        non_negative("fade_in_time", self.fade_in_time)?;
        non_negative("fade_out_time", self.fade_out_time)
    }
}

fn non_negative(field: &'static str, value: f32) -> Result<(), DataError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(DataError::NegativeTime { field, value })
    }
}

fn unset_fade() -> f32 {
    -1.0
}

fn default_fade() -> f32 {
    1.0
}

fn default_fps() -> f32 {
    30.0
}

fn default_expression_blend() -> BlendMode {
    BlendMode::Additive
}
