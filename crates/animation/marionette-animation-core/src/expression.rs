//! Expression queue.
//!
//! Expressions crossfade like motions but without priorities, and they do not
//! write curve values directly. Each parameter any expression touches owns an
//! accumulator with three channels (additive, multiply, overwrite). Queued
//! expressions are folded into the accumulators oldest to newest, then every
//! accumulator is written once as `(overwrite + additive) * multiply`.

use hashbrown::HashMap;

use marionette_api_core::{BlendMode, ParamIndex, ParameterAccess};

use crate::data::ExpressionData;
use crate::error::{DataError, PlayError};
use crate::fade::{fade_in_weight, fade_out_weight, sanitize_dt, schedule_fade_out};
use crate::ids::{IdAllocator, InstId};
use crate::interp::functions::lerp_f32;
use crate::outputs::{CoreEvent, Outputs};

#[derive(Clone, Debug)]
pub struct ExpressionInstance {
    pub id: InstId,
    pub expression: usize,
    pub start_time: f32,
    /// Fade-out deadline in queue time, or -1 while the expression holds.
    pub end_time: f32,
    /// Fade weight computed on the last tick.
    pub fade_weight: f32,
    started: bool,
}

/// Per-parameter blend channels.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ExpressionAccumulator {
    pub param: ParamIndex,
    pub additive: f32,
    pub multiply: f32,
    pub overwrite: f32,
}

impl ExpressionAccumulator {
    fn neutral(param: ParamIndex, live: f32) -> Self {
        Self {
            param,
            additive: 0.0,
            multiply: 1.0,
            overwrite: live,
        }
    }

    #[inline]
    pub fn resolved(&self) -> f32 {
        (self.overwrite + self.additive) * self.multiply
    }
}

type ExpressionBinding = HashMap<ParamIndex, (BlendMode, f32)>;

#[derive(Debug)]
pub struct ExpressionQueue {
    library: Vec<ExpressionData>,
    bindings: Vec<Option<ExpressionBinding>>,
    instances: Vec<ExpressionInstance>,
    accumulators: Vec<ExpressionAccumulator>,
    ids: IdAllocator,
    time: f32,
    busy: bool,
}

impl ExpressionQueue {
    pub fn new(library: Vec<ExpressionData>) -> Result<Self, DataError> {
        for expression in &library {
            expression.validate()?;
        }
        let bindings = vec![None; library.len()];
        Ok(Self {
            library,
            bindings,
            instances: Vec::new(),
            accumulators: Vec::new(),
            ids: IdAllocator::new(),
            time: 0.0,
            busy: false,
        })
    }

    /// Queue expression `index`; everything already queued starts fading out.
    pub fn play(&mut self, index: usize) -> Result<InstId, PlayError> {
        if index >= self.library.len() {
            let err = PlayError::InvalidIndex {
                index,
                len: self.library.len(),
            };
            log::warn!("expression play ignored: {err}");
            return Err(err);
        }
        self.fade_out_all();
        let id = self.ids.alloc_inst();
        self.instances.push(ExpressionInstance {
            id,
            expression: index,
            start_time: self.time,
            end_time: -1.0,
            fade_weight: 0.0,
            started: false,
        });
        self.busy = true;
        Ok(id)
    }

    pub fn stop_all(&mut self, force: bool) {
        if force {
            self.instances.clear();
        } else {
            self.fade_out_all();
        }
    }

    fn fade_out_all(&mut self) {
        let now = self.time;
        for inst in &mut self.instances {
            let fade_out = self.library[inst.expression].fade_out_time;
            inst.end_time = schedule_fade_out(inst.end_time, now, fade_out);
        }
    }

    pub fn update(&mut self, dt: f32, model: &mut dyn ParameterAccess, out: &mut Outputs) {
        self.time += sanitize_dt(dt);
        let now = self.time;
        if self.instances.is_empty() {
            self.finish_if_idle(out);
            return;
        }

        let Self {
            library,
            bindings,
            instances,
            accumulators,
            ..
        } = self;

        for inst in instances.iter() {
            let binding = bindings[inst.expression]
                .get_or_insert_with(|| bind_expression(&library[inst.expression], &*model));
            for &param in binding.keys() {
                if !accumulators.iter().any(|acc| acc.param == param) {
                    let live = model.value(param).unwrap_or_default();
                    accumulators.push(ExpressionAccumulator::neutral(param, live));
                }
            }
        }

        let mut total_weight = 0.0f32;
        for (position, inst) in instances.iter_mut().enumerate() {
            let data = &library[inst.expression];
            if !inst.started {
                inst.started = true;
                out.push_event(CoreEvent::ExpressionStarted {
                    inst: inst.id,
                    expression: inst.expression,
                });
            }
            let weight = fade_in_weight(now, inst.start_time, data.fade_in_time)
                * fade_out_weight(now, inst.end_time, data.fade_out_time);
            inst.fade_weight = weight;
            total_weight += weight;

            let empty = HashMap::new();
            let binding = bindings[inst.expression].as_ref().unwrap_or(&empty);
            for acc in accumulators.iter_mut() {
                let live = model.value(acc.param).unwrap_or(acc.overwrite);
                let target = match binding.get(&acc.param) {
                    Some(&(BlendMode::Additive, v)) => (v, 1.0, live),
                    Some(&(BlendMode::Multiplicative, v)) => (0.0, v, live),
                    Some(&(BlendMode::Overwrite, v)) => (0.0, 1.0, v),
                    None => (0.0, 1.0, live),
                };
                if position == 0 {
                    acc.additive = target.0;
                    acc.multiply = target.1;
                    acc.overwrite = target.2;
                } else {
                    acc.additive = lerp_f32(acc.additive, target.0, weight);
                    acc.multiply = lerp_f32(acc.multiply, target.1, weight);
                    acc.overwrite = lerp_f32(acc.overwrite, target.2, weight);
                }
            }
        }

        let weight = total_weight.min(1.0);
        for acc in accumulators.iter_mut() {
            model.set_value(acc.param, acc.resolved(), weight);
            acc.additive = 0.0;
            acc.multiply = 1.0;
        }

        // the newest expression fully covers everything queued before it
        if instances.len() > 1 && instances.last().is_some_and(|i| i.fade_weight >= 1.0) {
            let drop = instances.len() - 1;
            for inst in instances.drain(..drop) {
                log::debug!("expression {} ({:?}) pruned", inst.expression, inst.id);
                out.push_event(CoreEvent::ExpressionEnded {
                    inst: inst.id,
                    expression: inst.expression,
                });
            }
        }

        instances.retain(|inst| {
            let done = inst.end_time >= 0.0 && now >= inst.end_time;
            if done {
                out.push_event(CoreEvent::ExpressionEnded {
                    inst: inst.id,
                    expression: inst.expression,
                });
            }
            !done
        });

        self.finish_if_idle(out);
    }

    fn finish_if_idle(&mut self, out: &mut Outputs) {
        if self.instances.is_empty() && self.busy {
            self.busy = false;
            out.push_event(CoreEvent::ExpressionFinished);
        }
    }

    pub fn instances(&self) -> &[ExpressionInstance] {
        &self.instances
    }

    pub fn accumulators(&self) -> &[ExpressionAccumulator] {
        &self.accumulators
    }

    pub fn is_finished(&self) -> bool {
        self.instances.is_empty()
    }

    pub fn time(&self) -> f32 {
        self.time
    }

    pub fn library(&self) -> &[ExpressionData] {
        &self.library
    }
}

fn bind_expression(data: &ExpressionData, model: &dyn ParameterAccess) -> ExpressionBinding {
    let mut binding = HashMap::with_capacity(data.parameters.len());
    for p in &data.parameters {
        match model.parameter_index(&p.id) {
            Some(index) => {
                // first entry for a parameter wins
                binding.entry(index).or_insert((p.blend, p.value));
            }
            None => log::debug!("expression parameter '{}' not in model; skipped", p.id),
        }
    }
    binding
}
