//! Rig set evaluation with fixed-step sub-stepping.
//!
//! Inputs are read from a per-parameter cache that chases the live values,
//! outputs are written back into the same cache so later rigs see earlier
//! rigs' results within a step. After stepping, outputs are interpolated
//! between the last two steps and written to the live parameters.

use serde::{Deserialize, Serialize};

use marionette_api_core::{ParamIndex, ParameterAccess, ParameterRange};

use crate::data::{
    Normalization, PhysicsChannel, PhysicsOptions, PhysicsRigData, PhysicsSettingData,
    MAXIMUM_WEIGHT,
};
use crate::error::RigError;
use crate::normalize::normalize_parameter_value;
use crate::particle::{
    build_chain, update_particles, update_particles_for_stabilization, Particle,
    MOVEMENT_THRESHOLD,
};
use crate::vector::{direction_to_radian, Vec2};

/// Accumulated time beyond which the stepper drops the backlog.
pub const MAX_DELTA_TIME: f32 = 5.0;

#[derive(Clone, Debug)]
struct RigInput {
    param: ParamIndex,
    range: ParameterRange,
    weight: f32,
    kind: PhysicsChannel,
    reflect: bool,
}

#[derive(Clone, Debug)]
struct RigOutput {
    destination: String,
    param: ParamIndex,
    range: ParameterRange,
    particle_index: usize,
    scale: f32,
    weight: f32,
    kind: PhysicsChannel,
    reflect: bool,
    previous: f32,
    current: f32,
    below_minimum: Option<f32>,
    exceeded_maximum: Option<f32>,
}

#[derive(Clone, Debug)]
struct Rig {
    normalization: Normalization,
    inputs: Vec<RigInput>,
    outputs: Vec<RigOutput>,
    particles: Vec<Particle>,
}

/// Most extreme out-of-range raw value an output produced since the last reset.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OvershootReport {
    pub destination: String,
    pub below_minimum: Option<f32>,
    pub exceeded_maximum: Option<f32>,
}

#[derive(Clone, Debug)]
pub struct Physics {
    options: PhysicsOptions,
    fps: f32,
    rigs: Vec<Rig>,
    caches: Vec<f32>,
    input_caches: Vec<f32>,
    remaining_time: f32,
}

impl Physics {
    /// Build and bind every rig against `model`.
    ///
    /// Inputs and outputs naming unknown parameters, and outputs pointing
    /// outside their chain, are dropped with a warning.
    pub fn new(data: &PhysicsRigData, model: &dyn ParameterAccess) -> Result<Self, RigError> {
        if !(data.fps.is_finite() && data.fps >= 0.0) {
            return Err(RigError::InvalidFps(data.fps));
        }
        let rigs = data
            .settings
            .iter()
            .enumerate()
            .map(|(i, setting)| bind_rig(i, setting, model))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            options: data.options,
            fps: data.fps,
            rigs,
            caches: Vec::new(),
            input_caches: Vec::new(),
            remaining_time: 0.0,
        })
    }

    pub fn options(&self) -> PhysicsOptions {
        self.options
    }

    pub fn set_options(&mut self, options: PhysicsOptions) {
        self.options = options;
    }

    pub fn rig_count(&self) -> usize {
        self.rigs.len()
    }

    pub fn particles(&self, rig: usize) -> Option<&[Particle]> {
        self.rigs.get(rig).map(|r| r.particles.as_slice())
    }

    pub fn remaining_time(&self) -> f32 {
        self.remaining_time
    }

    /// Return every chain to its hanging pose and forget cached inputs.
    pub fn reset(&mut self) {
        for rig in &mut self.rigs {
            for p in &mut rig.particles {
                p.position = p.initial_position;
                p.last_position = p.initial_position;
                p.velocity = Vec2::ZERO;
                p.force = Vec2::ZERO;
                p.last_gravity = Vec2::new(0.0, 1.0);
            }
            for o in &mut rig.outputs {
                o.previous = 0.0;
                o.current = 0.0;
            }
        }
        self.caches.clear();
        self.input_caches.clear();
        self.remaining_time = 0.0;
    }

    /// Settle every rig at the current inputs without advancing time.
    pub fn stabilize(&mut self, model: &mut dyn ParameterAccess) {
        let count = model.parameter_count();
        self.caches.clear();
        self.caches
            .extend((0..count).map(|i| model.value(ParamIndex::from(i)).unwrap_or_default()));
        self.input_caches.clone_from(&self.caches);

        let options = self.options;
        for rig in &mut self.rigs {
            let (translation, angle) = rig.target(|param| model.value(param));
            let threshold = MOVEMENT_THRESHOLD * rig.normalization.position.maximum;
            update_particles_for_stabilization(
                &mut rig.particles,
                translation,
                angle,
                options.wind,
                threshold,
            );

            for output in &mut rig.outputs {
                let Some(raw) = output_value(output, &rig.particles, options.gravity) else {
                    continue;
                };
                output.previous = raw;
                output.current = raw;
                let Some(live) = model.value(output.param) else {
                    continue;
                };
                let value = blend_output(output, live, raw);
                if let Some(stored) = model.set_value(output.param, value, 1.0) {
                    if let Some(cache) = self.caches.get_mut(output.param.as_usize()) {
                        *cache = stored;
                    }
                }
            }
        }
    }

    /// Advance the simulation by `dt` and write interpolated outputs.
    pub fn evaluate(&mut self, dt: f32, model: &mut dyn ParameterAccess) {
        if !(dt.is_finite() && dt >= 0.0) {
            return;
        }
        let count = model.parameter_count();
        if self.caches.len() != count {
            self.caches.clear();
            self.caches
                .extend((0..count).map(|i| model.value(ParamIndex::from(i)).unwrap_or_default()));
            self.input_caches.clone_from(&self.caches);
        }

        self.remaining_time += dt;
        if self.remaining_time > MAX_DELTA_TIME {
            log::debug!(
                "physics backlog {:.3}s exceeds {MAX_DELTA_TIME}s; dropping it",
                self.remaining_time
            );
            self.remaining_time = 0.0;
        }

        let step = if self.fps > 0.0 { 1.0 / self.fps } else { dt };
        let options = self.options;

        // a zero-length tick only re-publishes the interpolated outputs
        while step > 0.0 && self.remaining_time >= step {
            for rig in &mut self.rigs {
                for output in &mut rig.outputs {
                    output.previous = output.current;
                }
            }

            let input_weight = step / self.remaining_time;
            for (i, (cache, input_cache)) in self
                .caches
                .iter_mut()
                .zip(self.input_caches.iter_mut())
                .enumerate()
            {
                let live = model.value(ParamIndex::from(i)).unwrap_or(*input_cache);
                *cache = *input_cache * (1.0 - input_weight) + live * input_weight;
                *input_cache = *cache;
            }

            let caches = &mut self.caches;
            for rig in &mut self.rigs {
                let (translation, angle) =
                    rig.target(|param| caches.get(param.as_usize()).copied());
                let threshold = MOVEMENT_THRESHOLD * rig.normalization.position.maximum;
                update_particles(
                    &mut rig.particles,
                    translation,
                    angle,
                    options.wind,
                    threshold,
                    step,
                );

                for output in &mut rig.outputs {
                    let Some(raw) = output_value(output, &rig.particles, options.gravity) else {
                        continue;
                    };
                    output.current = raw;
                    if let Some(cache) = caches.get_mut(output.param.as_usize()) {
                        *cache = blend_output(output, *cache, raw);
                    }
                }
            }

            self.remaining_time -= step;
        }

        let alpha = if step > 0.0 { self.remaining_time / step } else { 0.0 };
        for rig in &mut self.rigs {
            for output in &mut rig.outputs {
                if output_segment(output, &rig.particles).is_none() {
                    continue;
                }
                let raw = output.previous * (1.0 - alpha) + output.current * alpha;
                let Some(live) = model.value(output.param) else {
                    continue;
                };
                let value = blend_output(output, live, raw);
                model.set_value(output.param, value, 1.0);
            }
        }
    }

    /// Outputs that produced out-of-range values since the last reset.
    pub fn overshoot(&self) -> Vec<OvershootReport> {
        self.rigs
            .iter()
            .flat_map(|rig| rig.outputs.iter())
            .filter(|o| o.below_minimum.is_some() || o.exceeded_maximum.is_some())
            .map(|o| OvershootReport {
                destination: o.destination.clone(),
                below_minimum: o.below_minimum,
                exceeded_maximum: o.exceeded_maximum,
            })
            .collect()
    }

    pub fn reset_overshoot(&mut self) {
        for rig in &mut self.rigs {
            for o in &mut rig.outputs {
                o.below_minimum = None;
                o.exceeded_maximum = None;
            }
        }
    }
}

impl Rig {
    /// Sum the inputs into a translation and an angle (degrees), then move
    /// the translation into the rig's rotated frame.
    fn target(&self, value_of: impl Fn(ParamIndex) -> Option<f32>) -> (Vec2, f32) {
        let mut translation = Vec2::ZERO;
        let mut angle = 0.0f32;
        for input in &self.inputs {
            let Some(value) = value_of(input.param) else {
                continue;
            };
            match input.kind {
                PhysicsChannel::X => {
                    translation.x += normalize_parameter_value(
                        value,
                        &input.range,
                        &self.normalization.position,
                        input.reflect,
                    ) * input.weight;
                }
                PhysicsChannel::Y => {
                    translation.y += normalize_parameter_value(
                        value,
                        &input.range,
                        &self.normalization.position,
                        input.reflect,
                    ) * input.weight;
                }
                PhysicsChannel::Angle => {
                    angle += normalize_parameter_value(
                        value,
                        &input.range,
                        &self.normalization.angle,
                        input.reflect,
                    ) * input.weight;
                }
            }
        }
        let translation = translation.rotated(crate::vector::degrees_to_radian(-angle));
        (translation, angle)
    }
}

fn output_segment(output: &RigOutput, particles: &[Particle]) -> Option<Vec2> {
    let i = output.particle_index;
    if i < 1 || i >= particles.len() {
        return None;
    }
    Some(particles[i].position - particles[i - 1].position)
}

/// Unscaled output value of the segment ending at the output's particle.
fn output_value(output: &RigOutput, particles: &[Particle], gravity: Vec2) -> Option<f32> {
    let segment = output_segment(output, particles)?;
    let value = match output.kind {
        PhysicsChannel::X => segment.x,
        PhysicsChannel::Y => segment.y,
        PhysicsChannel::Angle => {
            let i = output.particle_index;
            let parent = if i >= 2 {
                particles[i - 1].position - particles[i - 2].position
            } else {
                -gravity
            };
            direction_to_radian(parent, segment)
        }
    };
    Some(if output.reflect { -value } else { value })
}

/// Scale `raw`, clamp it into the destination range while recording
/// overshoot, and blend it onto `current` by the output weight.
fn blend_output(output: &mut RigOutput, current: f32, raw: f32) -> f32 {
    let mut value = raw * output.scale;
    if value < output.range.min {
        if output.below_minimum.map_or(true, |v| value < v) {
            output.below_minimum = Some(value);
        }
        value = output.range.min;
    } else if value > output.range.max {
        if output.exceeded_maximum.map_or(true, |v| value > v) {
            output.exceeded_maximum = Some(value);
        }
        value = output.range.max;
    }
    if output.weight >= 1.0 {
        value
    } else {
        current * (1.0 - output.weight) + value * output.weight
    }
}

fn bind_rig(
    index: usize,
    setting: &PhysicsSettingData,
    model: &dyn ParameterAccess,
) -> Result<Rig, RigError> {
    if setting.particles.is_empty() {
        return Err(RigError::EmptyChain { rig: index });
    }
    for (i, p) in setting.particles.iter().enumerate() {
        let fields = [
            ("radius", p.radius),
            ("delay", p.delay),
            ("mobility", p.mobility),
        ];
        for (field, v) in fields {
            if !(v.is_finite() && v >= 0.0) {
                return Err(RigError::InvalidParticle {
                    rig: index,
                    particle: i,
                    field,
                });
            }
        }
        if !p.acceleration.is_finite() {
            return Err(RigError::InvalidParticle {
                rig: index,
                particle: i,
                field: "acceleration",
            });
        }
    }

    let inputs = setting
        .inputs
        .iter()
        .filter_map(|input| {
            let bound = model
                .parameter_index(&input.source)
                .and_then(|param| model.range(param).map(|range| (param, range)));
            match bound {
                Some((param, range)) => Some(RigInput {
                    param,
                    range,
                    weight: input.weight / MAXIMUM_WEIGHT,
                    kind: input.kind,
                    reflect: input.reflect,
                }),
                None => {
                    log::warn!(
                        "physics rig {index}: input parameter '{}' not in model; skipped",
                        input.source
                    );
                    None
                }
            }
        })
        .collect();

    let chain_len = setting.particles.len();
    let outputs = setting
        .outputs
        .iter()
        .filter_map(|output| {
            if output.particle_index < 1 || output.particle_index >= chain_len {
                log::warn!(
                    "physics rig {index}: output '{}' uses particle {} of a {chain_len}-particle chain; skipped",
                    output.destination,
                    output.particle_index
                );
                return None;
            }
            let bound = model
                .parameter_index(&output.destination)
                .and_then(|param| model.range(param).map(|range| (param, range)));
            let Some((param, range)) = bound else {
                log::warn!(
                    "physics rig {index}: output parameter '{}' not in model; skipped",
                    output.destination
                );
                return None;
            };
            Some(RigOutput {
                destination: output.destination.clone(),
                param,
                range,
                particle_index: output.particle_index,
                scale: output.scale,
                weight: output.weight / MAXIMUM_WEIGHT,
                kind: output.kind,
                reflect: output.reflect,
                previous: 0.0,
                current: 0.0,
                below_minimum: None,
                exceeded_maximum: None,
            })
        })
        .collect();

    Ok(Rig {
        normalization: setting.normalization,
        inputs,
        outputs,
        particles: build_chain(&setting.particles),
    })
}
