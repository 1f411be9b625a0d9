//! Blend modes used when a stage writes a value onto a parameter.
//!
//! `apply` is the only arithmetic; clamping into the parameter range is the
//! model's job and happens after it.

use serde::{Deserialize, Serialize};

/// Arithmetic rule for combining a proposed value with the current one.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BlendMode {
    /// Crossfade toward the target: `cur*(1-w) + target*w`.
    #[default]
    Overwrite,
    /// `cur + target*w`.
    Additive,
    /// `cur * (1 + (target-1)*w)`; a weight of 0 leaves the value untouched.
    Multiplicative,
}

/// Linear interpolation for f32.
#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Combine `current` and `target` under `mode` with `weight`.
///
/// Overwrite with a weight of exactly 1 returns `target` bit-for-bit so that
/// full-strength writes are not subject to rounding of the lerp.
pub fn apply(mode: BlendMode, current: f32, target: f32, weight: f32) -> f32 {
    match mode {
        BlendMode::Overwrite => {
            if weight == 1.0 {
                target
            } else {
                current * (1.0 - weight) + target * weight
            }
        }
        BlendMode::Additive => current + target * weight,
        BlendMode::Multiplicative => current * (1.0 + (target - 1.0) * weight),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overwrite_full_weight_is_exact() {
        assert_eq!(apply(BlendMode::Overwrite, 0.3, 0.7, 1.0), 0.7);
        assert!((apply(BlendMode::Overwrite, 0.0, 1.0, 0.25) - 0.25).abs() < 1e-6);
    }

    #[test]
    fn additive_and_multiplicative() {
        assert!((apply(BlendMode::Additive, 1.0, 2.0, 0.5) - 2.0).abs() < 1e-6);
        assert!((apply(BlendMode::Multiplicative, 2.0, 0.0, 1.0)).abs() < 1e-6);
        assert!((apply(BlendMode::Multiplicative, 2.0, 0.0, 0.0) - 2.0).abs() < 1e-6);
        assert!((apply(BlendMode::Multiplicative, 2.0, 0.5, 0.5) - 1.5).abs() < 1e-6);
    }
}
