//! Automatic eye blinking.
//!
//! Idle -> Closing -> Closed -> Opening -> Idle. The output is 1 while idle,
//! ramps 1 -> 0 while closing, stays 0 while closed and ramps back while
//! opening. Each idle interval is `mean +/- uniform(maximum_deviation)`.
//! Time left over at a phase boundary carries into the next phase, so the
//! closing ramp starts exactly at the scheduled blink instant.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use marionette_api_core::{BlendMode, ParamIndex, ParameterAccess};

use crate::bind::{bind_parameters, write_all};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum EyeBlinkPhase {
    Idle,
    Closing,
    Closed,
    Opening,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EyeBlinkSettings {
    pub ids: Vec<String>,
    pub blend: BlendMode,
    pub auto_enabled: bool,
    /// Mean idle interval in seconds.
    pub mean: f32,
    pub maximum_deviation: f32,
    /// Speed factor for the closing, closed and opening phases; a phase
    /// lasts `period / time_scale` seconds.
    pub time_scale: f32,
    pub closing_period: f32,
    pub closed_period: f32,
    pub opening_period: f32,
    /// Fixed RNG seed; `None` seeds from entropy.
    pub seed: Option<u64>,
}

impl Default for EyeBlinkSettings {
    fn default() -> Self {
        Self {
            ids: vec!["ParamEyeLOpen".into(), "ParamEyeROpen".into()],
            blend: BlendMode::Multiplicative,
            auto_enabled: true,
            mean: 2.5,
            maximum_deviation: 2.0,
            time_scale: 10.0,
            closing_period: 1.0,
            closed_period: 0.5,
            opening_period: 1.5,
            seed: None,
        }
    }
}

/// Bound on phase transitions per update; zero-length phases would spin otherwise.
const MAX_TRANSITIONS: usize = 8;

#[derive(Clone, Debug)]
pub struct EyeBlink {
    settings: EyeBlinkSettings,
    params: Vec<ParamIndex>,
    phase: EyeBlinkPhase,
    /// Seconds spent in the current phase (scaled outside Idle).
    phase_time: f32,
    idle_duration: f32,
    value: f32,
    rng: StdRng,
}

impl EyeBlink {
    pub fn new(settings: EyeBlinkSettings, model: &dyn ParameterAccess) -> Self {
        let params = bind_parameters("eye blink", &settings.ids, model);
        let rng = match settings.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let mut blink = Self {
            settings,
            params,
            phase: EyeBlinkPhase::Idle,
            phase_time: 0.0,
            idle_duration: 0.0,
            value: 1.0,
            rng,
        };
        blink.idle_duration = blink.next_idle_duration();
        blink
    }

    fn next_idle_duration(&mut self) -> f32 {
        let deviation = self.settings.maximum_deviation.abs();
        let jitter = if deviation > 0.0 {
            self.rng.gen_range(-deviation..=deviation)
        } else {
            0.0
        };
        (self.settings.mean + jitter).max(0.0)
    }

    pub fn settings(&self) -> &EyeBlinkSettings {
        &self.settings
    }

    pub fn phase(&self) -> EyeBlinkPhase {
        self.phase
    }

    pub fn value(&self) -> f32 {
        self.value
    }

    pub fn idle_duration(&self) -> f32 {
        self.idle_duration
    }

    pub fn is_auto_enabled(&self) -> bool {
        self.settings.auto_enabled
    }

    /// Switch automatic blinking; either way the cycle restarts from Idle.
    pub fn set_auto_enabled(&mut self, enabled: bool) {
        self.settings.auto_enabled = enabled;
        self.phase = EyeBlinkPhase::Idle;
        self.phase_time = 0.0;
        self.idle_duration = self.next_idle_duration();
        if enabled {
            self.value = 1.0;
        }
    }

    /// Host-driven value, used while automatic blinking is off.
    pub fn set_value(&mut self, value: f32) {
        if value.is_finite() {
            self.value = value.clamp(0.0, 1.0);
        }
    }

    pub fn update(&mut self, dt: f32) {
        if !self.settings.auto_enabled {
            return;
        }
        let mut remaining = if dt.is_finite() { dt.max(0.0) } else { 0.0 };
        let scale = self.settings.time_scale.max(0.0);

        for _ in 0..MAX_TRANSITIONS {
            let (period, rate) = match self.phase {
                EyeBlinkPhase::Idle => (self.idle_duration, 1.0),
                EyeBlinkPhase::Closing => (self.settings.closing_period, scale),
                EyeBlinkPhase::Closed => (self.settings.closed_period, scale),
                EyeBlinkPhase::Opening => (self.settings.opening_period, scale),
            };
            if rate <= 0.0 {
                break;
            }
            let left = (period - self.phase_time).max(0.0) / rate;
            if remaining < left {
                self.phase_time += remaining * rate;
                break;
            }
            remaining -= left;
            self.advance_phase();
        }
        self.value = self.phase_value();
    }

    fn advance_phase(&mut self) {
        self.phase = match self.phase {
            EyeBlinkPhase::Idle => EyeBlinkPhase::Closing,
            EyeBlinkPhase::Closing => EyeBlinkPhase::Closed,
            EyeBlinkPhase::Closed => EyeBlinkPhase::Opening,
            EyeBlinkPhase::Opening => {
                self.idle_duration = self.next_idle_duration();
                EyeBlinkPhase::Idle
            }
        };
        self.phase_time = 0.0;
        log::trace!("eye blink -> {:?}", self.phase);
    }

    fn phase_value(&self) -> f32 {
        let progress = |period: f32| {
            if period > 0.0 {
                (self.phase_time / period).clamp(0.0, 1.0)
            } else {
                1.0
            }
        };
        match self.phase {
            EyeBlinkPhase::Idle => 1.0,
            EyeBlinkPhase::Closing => 1.0 - progress(self.settings.closing_period),
            EyeBlinkPhase::Closed => 0.0,
            EyeBlinkPhase::Opening => progress(self.settings.opening_period),
        }
    }

    pub fn apply(&self, model: &mut dyn ParameterAccess) {
        write_all(&self.params, self.value, self.settings.blend, model);
    }

    pub fn tick(&mut self, dt: f32, model: &mut dyn ParameterAccess) {
        self.update(dt);
        self.apply(model);
    }
}
