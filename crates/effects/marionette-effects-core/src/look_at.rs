//! Gaze/head follow toward a host-supplied target.
//!
//! The tracked position chases the target with a critically damped spring.
//! The exponential decay uses the rational approximation
//! `1 / (1 + x + 0.48x^2 + 0.235x^3)`; when a step would carry the position
//! past the target, position snaps onto it and velocity is zeroed.

use serde::{Deserialize, Serialize};

use marionette_api_core::{BlendMode, ParamIndex, ParameterAccess};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum LookAtAxis {
    X,
    Y,
    Z,
}

impl LookAtAxis {
    fn index(self) -> usize {
        match self {
            LookAtAxis::X => 0,
            LookAtAxis::Y => 1,
            LookAtAxis::Z => 2,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LookAtParameter {
    pub id: String,
    pub axis: LookAtAxis,
    #[serde(default = "unit")]
    pub factor: f32,
    #[serde(default = "additive")]
    pub blend: BlendMode,
    #[serde(default = "enabled")]
    pub enabled: bool,
}

fn unit() -> f32 {
    1.0
}

fn additive() -> BlendMode {
    BlendMode::Additive
}

fn enabled() -> bool {
    true
}

impl LookAtParameter {
    pub fn new(id: impl Into<String>, axis: LookAtAxis, factor: f32) -> Self {
        Self {
            id: id.into(),
            axis,
            factor,
            blend: BlendMode::Additive,
            enabled: true,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LookAtSettings {
    pub parameters: Vec<LookAtParameter>,
    /// Approximate time (seconds) to reach the target.
    pub smoothing: f32,
}

impl Default for LookAtSettings {
    fn default() -> Self {
        Self {
            parameters: Vec::new(),
            smoothing: 0.15,
        }
    }
}

const MIN_SMOOTHING: f32 = 0.0001;

#[derive(Clone, Debug)]
pub struct LookAt {
    settings: LookAtSettings,
    bound: Vec<Option<ParamIndex>>,
    target: [f32; 3],
    position: [f32; 3],
    velocity: [f32; 3],
}

impl LookAt {
    pub fn new(settings: LookAtSettings, model: &dyn ParameterAccess) -> Self {
        let bound = settings
            .parameters
            .iter()
            .map(|p| {
                let index = model.parameter_index(&p.id);
                if index.is_none() {
                    log::debug!("look-at: parameter '{}' not in model; skipped", p.id);
                }
                index
            })
            .collect();
        Self {
            settings,
            bound,
            target: [0.0; 3],
            position: [0.0; 3],
            velocity: [0.0; 3],
        }
    }

    pub fn set_target(&mut self, target: [f32; 3]) {
        if target.iter().all(|v| v.is_finite()) {
            self.target = target;
        }
    }

    pub fn target(&self) -> [f32; 3] {
        self.target
    }

    pub fn position(&self) -> [f32; 3] {
        self.position
    }

    pub fn set_enabled(&mut self, id: &str, enabled: bool) {
        for p in self.settings.parameters.iter_mut().filter(|p| p.id == id) {
            p.enabled = enabled;
        }
    }

    pub fn update(&mut self, dt: f32) {
        if !(dt.is_finite() && dt > 0.0) {
            return;
        }
        let smoothing = self.settings.smoothing.clamp(MIN_SMOOTHING, 1.0);
        let omega = 2.0 / smoothing;
        let x = omega * dt;
        let invexp = 1.0 / (1.0 + x + 0.48 * x * x + 0.235 * x * x * x);

        let mut damp = [0.0f32; 3];
        let mut next = [0.0f32; 3];
        let mut velocity = [0.0f32; 3];
        for i in 0..3 {
            damp[i] = self.position[i] - self.target[i];
            let tmp = (self.velocity[i] + omega * damp[i]) * dt;
            velocity[i] = (self.velocity[i] - omega * tmp) * invexp;
            next[i] = (damp[i] + tmp) * invexp;
        }

        let dot: f32 = damp.iter().zip(&next).map(|(a, b)| a * b).sum();
        if dot < 0.0 {
            next = [0.0; 3];
            velocity = [0.0; 3];
        }
        for i in 0..3 {
            self.position[i] = next[i] + self.target[i];
        }
        self.velocity = velocity;
    }

    pub fn apply(&self, model: &mut dyn ParameterAccess) {
        for (p, bound) in self.settings.parameters.iter().zip(&self.bound) {
            let Some(param) = *bound else {
                continue;
            };
            if !p.enabled {
                continue;
            }
            let value = p.factor * self.position[p.axis.index()];
            model.write(param, value, p.blend, 1.0);
        }
    }

    pub fn tick(&mut self, dt: f32, model: &mut dyn ParameterAccess) {
        self.update(dt);
        self.apply(model);
    }
}
