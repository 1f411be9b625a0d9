//! Piecewise-linear mapping from parameter space into the rig's normalized space.

use serde::{Deserialize, Serialize};

use marionette_api_core::ParameterRange;

/// Normalized bounds for one input channel of a rig.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NormalizationRange {
    pub minimum: f32,
    pub maximum: f32,
    pub default: f32,
}

impl Default for NormalizationRange {
    fn default() -> Self {
        Self {
            minimum: -10.0,
            maximum: 10.0,
            default: 0.0,
        }
    }
}

/// Map `value` from `param` onto `norm`.
///
/// The parameter default lines up with the normalized default; each side of
/// it gets its own slope, so `param.max -> norm.maximum` and
/// `param.min -> norm.minimum` exactly. The value is clamped into the
/// parameter range first. `reflect` flips the sign of the result.
pub fn normalize_parameter_value(
    value: f32,
    param: &ParameterRange,
    norm: &NormalizationRange,
    reflect: bool,
) -> f32 {
    let value = param.clamp(value);
    let kink = param.default;
    let result = if value > kink {
        let t = (value - kink) / (param.max - kink);
        norm.default * (1.0 - t) + norm.maximum * t
    } else if value < kink {
        let t = (value - kink) / (param.min - kink);
        norm.default * (1.0 - t) + norm.minimum * t
    } else {
        norm.default
    };
    if reflect {
        -result
    } else {
        result
    }
}
