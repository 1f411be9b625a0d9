//! Parameter and part records plus their serde descriptors.

use serde::{Deserialize, Serialize};

use crate::error::ModelError;
use crate::ids::PartIndex;

/// Bounds and rest value of a parameter.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ParameterRange {
    pub min: f32,
    pub max: f32,
    pub default: f32,
}

impl ParameterRange {
    /// Validated constructor. `default` is clamped into the range.
    pub fn new(id: &str, min: f32, max: f32, default: f32) -> Result<Self, ModelError> {
        if min.is_nan() || max.is_nan() || min >= max {
            return Err(ModelError::DegenerateRange {
                id: id.to_string(),
                min,
                max,
            });
        }
        let default = if default.is_nan() { min } else { default.clamp(min, max) };
        Ok(Self { min, max, default })
    }

    #[inline]
    pub fn clamp(&self, value: f32) -> f32 {
        if value.is_nan() {
            return self.default;
        }
        value.clamp(self.min, self.max)
    }

    /// Position of `value` inside the range, 0 at `min` and 1 at `max`.
    #[inline]
    pub fn normalize(&self, value: f32) -> f32 {
        (value - self.min) / (self.max - self.min)
    }

    #[inline]
    pub fn span(&self) -> f32 {
        self.max - self.min
    }
}

/// A named scalar drive value.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    pub id: String,
    pub range: ParameterRange,
    pub value: f32,
}

/// A named visual sub-element with its own opacity.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Part {
    pub id: String,
    pub opacity: f32,
    pub parent: Option<PartIndex>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ParameterDesc {
    pub id: String,
    pub min: f32,
    pub max: f32,
    pub default: f32,
    /// Initial value; falls back to `default`.
    #[serde(default)]
    pub value: Option<f32>,
}

impl ParameterDesc {
    pub fn new(id: impl Into<String>, min: f32, max: f32, default: f32) -> Self {
        Self {
            id: id.into(),
            min,
            max,
            default,
            value: None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PartDesc {
    pub id: String,
    #[serde(default = "full_opacity")]
    pub opacity: f32,
    #[serde(default)]
    pub parent: Option<String>,
}

impl PartDesc {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            opacity: 1.0,
            parent: None,
        }
    }
}

/// Serializable description of a whole model, used by hosts and fixtures.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelDesc {
    #[serde(default)]
    pub parameters: Vec<ParameterDesc>,
    #[serde(default)]
    pub parts: Vec<PartDesc>,
}

fn full_opacity() -> f32 {
    1.0
}
