//! Mouth opening from an audio envelope.
//!
//! Auto mode produces `|sin(time_scale * t)|`. Otherwise the value pursues
//! the host-supplied envelope with velocity and acceleration caps tuned
//! against a 30 fps authoring rate.

use serde::{Deserialize, Serialize};

use marionette_api_core::{BlendMode, ParamIndex, ParameterAccess};

use crate::bind::{bind_parameters, write_all};

const REFERENCE_FPS: f32 = 30.0;
/// Maximum speed in parameter units per second.
const FACE_PARAM_MAX_V: f32 = 40.0 / 10.0;
const TIME_TO_MAX_SPEED: f32 = 0.15;
const EPSILON: f32 = 0.01;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LipSyncSettings {
    pub ids: Vec<String>,
    pub blend: BlendMode,
    pub auto_enabled: bool,
    pub time_scale: f32,
    pub gain: f32,
}

impl Default for LipSyncSettings {
    fn default() -> Self {
        Self {
            ids: vec!["ParamMouthOpenY".into()],
            blend: BlendMode::Additive,
            auto_enabled: false,
            time_scale: 10.0,
            gain: 1.0,
        }
    }
}

#[derive(Clone, Debug)]
pub struct LipSync {
    settings: LipSyncSettings,
    params: Vec<ParamIndex>,
    time: f32,
    value: f32,
    target: f32,
    velocity: f32,
}

impl LipSync {
    pub fn new(settings: LipSyncSettings, model: &dyn ParameterAccess) -> Self {
        let params = bind_parameters("lip sync", &settings.ids, model);
        Self {
            settings,
            params,
            time: 0.0,
            value: 0.0,
            target: 0.0,
            velocity: 0.0,
        }
    }

    /// Feed one envelope sample; the target becomes `clamp(gain * e, 0, 1)`.
    pub fn set_envelope(&mut self, envelope: f32) {
        if envelope.is_finite() {
            self.target = (self.settings.gain * envelope).clamp(0.0, 1.0);
        }
    }

    pub fn set_auto_enabled(&mut self, enabled: bool) {
        self.settings.auto_enabled = enabled;
        self.time = 0.0;
    }

    pub fn value(&self) -> f32 {
        self.value
    }

    pub fn target(&self) -> f32 {
        self.target
    }

    pub fn update(&mut self, dt: f32) {
        let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };
        if self.settings.auto_enabled {
            self.time += dt;
            self.value = (self.settings.time_scale * self.time).sin().abs();
        } else {
            self.pursue(dt);
        }
    }

    fn pursue(&mut self, dt: f32) {
        let dx = self.target - self.value;
        if dx.abs() <= EPSILON || dt <= 0.0 {
            return;
        }
        let distance = dx.abs();
        let max_v = FACE_PARAM_MAX_V / REFERENCE_FPS;
        let max_a = dt * REFERENCE_FPS * max_v / (TIME_TO_MAX_SPEED * REFERENCE_FPS);

        let mut accel = max_v * dx / distance - self.velocity;
        if accel.abs() > max_a {
            accel *= max_a / accel.abs();
        }
        self.velocity += accel;

        // fastest speed that can still brake to a stop at the target
        let max_velocity = 0.5 * ((max_a * max_a + 8.0 * max_a * distance).sqrt() - max_a);
        if self.velocity.abs() > max_velocity {
            self.velocity *= max_velocity / self.velocity.abs();
        }
        self.value += self.velocity;
    }

    pub fn apply(&self, model: &mut dyn ParameterAccess) {
        write_all(&self.params, self.value, self.settings.blend, model);
    }

    pub fn tick(&mut self, dt: f32, model: &mut dyn ParameterAccess) {
        self.update(dt);
        self.apply(model);
    }
}
