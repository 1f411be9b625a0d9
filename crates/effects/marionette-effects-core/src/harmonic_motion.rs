//! Idle sine sway on individual parameters.

use std::f32::consts::TAU;

use serde::{Deserialize, Serialize};

use marionette_api_core::{BlendMode, ParamIndex, ParameterAccess, ParameterRange};

/// Which side of the origin the oscillation may use.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum HarmonicDirection {
    #[default]
    Centric,
    Left,
    Right,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HarmonicParameter {
    pub id: String,
    pub enabled: bool,
    pub blend: BlendMode,
    pub time_scale: f32,
    pub direction: HarmonicDirection,
    /// Centre of the sway as a fraction of the parameter range.
    pub normalized_origin: f32,
    /// Amplitude as a fraction of the parameter range.
    pub normalized_range: f32,
    /// Period in seconds.
    pub duration: f32,
}

impl Default for HarmonicParameter {
    fn default() -> Self {
        Self {
            id: String::new(),
            enabled: true,
            blend: BlendMode::Additive,
            time_scale: 1.0,
            direction: HarmonicDirection::Centric,
            normalized_origin: 0.5,
            normalized_range: 0.5,
            duration: 3.0,
        }
    }
}

impl HarmonicParameter {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HarmonicMotionSettings {
    pub parameters: Vec<HarmonicParameter>,
}

/// Sway value at `time` for one parameter.
///
/// Left/Right halve the amplitude and shift the origin so the sway stays on
/// one side; every direction then shrinks the amplitude until the swing fits
/// inside `range`.
pub fn harmonic_value(p: &HarmonicParameter, time: f32, range: &ParameterRange) -> f32 {
    let width = range.max - range.min;
    let mut origin = range.min + p.normalized_origin * width;
    let mut amplitude = p.normalized_range * width;

    match p.direction {
        HarmonicDirection::Left => {
            if origin - amplitude >= range.min {
                amplitude *= 0.5;
                origin -= amplitude;
            } else {
                amplitude = 0.5 * (origin - range.min);
                origin = range.min + amplitude;
            }
        }
        HarmonicDirection::Right => {
            if origin + amplitude <= range.max {
                amplitude *= 0.5;
                origin += amplitude;
            } else {
                amplitude = 0.5 * (range.max - origin);
                origin = range.max - amplitude;
            }
        }
        HarmonicDirection::Centric => {}
    }

    if origin - amplitude < range.min {
        amplitude = origin - range.min;
    } else if origin + amplitude > range.max {
        amplitude = range.max - origin;
    }

    if p.duration > 0.0 {
        origin + amplitude * (time * TAU / p.duration).sin()
    } else {
        origin
    }
}

#[derive(Clone, Debug)]
struct Channel {
    param: Option<ParamIndex>,
    time: f32,
    value: f32,
}

#[derive(Clone, Debug)]
pub struct HarmonicMotion {
    settings: HarmonicMotionSettings,
    channels: Vec<Channel>,
}

impl HarmonicMotion {
    pub fn new(settings: HarmonicMotionSettings, model: &dyn ParameterAccess) -> Self {
        let channels = settings
            .parameters
            .iter()
            .map(|p| {
                let param = model.parameter_index(&p.id);
                if param.is_none() {
                    log::debug!("harmonic motion: parameter '{}' not in model; skipped", p.id);
                }
                Channel {
                    param,
                    time: 0.0,
                    value: 0.0,
                }
            })
            .collect();
        Self { settings, channels }
    }

    /// Latest sway value of parameter `id`.
    pub fn value(&self, id: &str) -> Option<f32> {
        self.settings
            .parameters
            .iter()
            .zip(&self.channels)
            .find(|(p, _)| p.id == id)
            .map(|(_, c)| c.value)
    }

    /// Advance every enabled channel by its own time scale and blend it in.
    pub fn tick(&mut self, dt: f32, model: &mut dyn ParameterAccess) {
        let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };
        for (p, channel) in self.settings.parameters.iter().zip(&mut self.channels) {
            if !p.enabled {
                continue;
            }
            let Some(param) = channel.param else {
                continue;
            };
            let Some(range) = model.range(param) else {
                continue;
            };
            channel.time += dt * p.time_scale;
            channel.value = harmonic_value(p, channel.time, &range);
            model.write(param, channel.value, p.blend, 1.0);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn range() -> ParameterRange {
        ParameterRange {
            min: -10.0,
            max: 10.0,
            default: 0.0,
        }
    }

    fn approx(a: f32, b: f32) {
        assert!((a - b).abs() < 1e-4, "left={a} right={b}");
    }

    #[test]
    fn centric_swings_full_range() {
        let p = HarmonicParameter::new("ParamBodyAngleX");
        // quarter period peaks at origin + range
        approx(harmonic_value(&p, 0.75, &range()), 10.0);
        approx(harmonic_value(&p, 2.25, &range()), -10.0);
        approx(harmonic_value(&p, 0.0, &range()), 0.0);
    }

    #[test]
    fn one_sided_sway_stays_on_its_side() {
        let mut p = HarmonicParameter::new("ParamBodyAngleX");
        p.direction = HarmonicDirection::Right;
        for i in 0..60 {
            let v = harmonic_value(&p, i as f32 * 0.05, &range());
            assert!(v >= -1e-4 && v <= 10.0 + 1e-4, "{v}");
        }
        p.direction = HarmonicDirection::Left;
        for i in 0..60 {
            let v = harmonic_value(&p, i as f32 * 0.05, &range());
            assert!(v <= 1e-4 && v >= -10.0 - 1e-4, "{v}");
        }
    }

    #[test]
    fn amplitude_shrinks_to_fit() {
        let mut p = HarmonicParameter::new("ParamBodyAngleX");
        p.normalized_origin = 0.9;
        for i in 0..60 {
            let v = harmonic_value(&p, i as f32 * 0.05, &range());
            assert!(v <= 10.0 + 1e-4 && v >= 6.0 - 1e-4, "{v}");
        }
    }
}
