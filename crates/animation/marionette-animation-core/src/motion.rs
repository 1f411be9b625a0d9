//! Priority-gated motion queue.
//!
//! Every `play` appends a new instance and asks the ones already queued to
//! fade out. All queued instances are evaluated each tick in queue order, so
//! an outgoing motion and the incoming one crossfade through the parameter
//! blend. Finished instances are removed only after the whole queue has been
//! evaluated for the tick.

use serde::{Deserialize, Serialize};

use marionette_api_core::{ParamIndex, ParameterAccess, PartIndex};

use crate::config::Config;
use crate::data::{CurveTarget, MotionData};
use crate::error::{DataError, PlayError};
use crate::fade::{fade_in_weight, fade_out_weight, sanitize_dt, schedule_fade_out};
use crate::ids::{IdAllocator, InstId};
use crate::outputs::{CoreEvent, Outputs};
use crate::sampling::sample_curve;

/// Playback priority. `Force` always wins and clears a matching reservation.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum MotionPriority {
    #[default]
    None = 0,
    Idle = 1,
    Normal = 2,
    Force = 3,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum MotionState {
    /// Queued, not yet evaluated.
    None,
    Playing,
    PlayingLooped,
    Ended,
}

/// One queued playback of a library motion.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MotionInstance {
    pub id: InstId,
    /// Index into the queue's motion library.
    pub motion: usize,
    pub state: MotionState,
    /// Queue time of the `play` call.
    pub requested_at: f32,
    pub offset: f32,
    pub start_time: f32,
    /// Fade-out deadline in queue time, or -1 when none is scheduled.
    pub end_time: f32,
    /// User weight, multiplied into the fade weight.
    pub weight: f32,
    /// Fade weight computed on the last tick.
    pub fade_weight: f32,
    last_raw_elapsed: f32,
}

#[derive(Copy, Clone, Debug, PartialEq)]
enum CurveBinding {
    Model,
    Parameter(ParamIndex),
    Part(PartIndex),
    Missing,
}

#[derive(Debug)]
pub struct MotionQueue {
    cfg: Config,
    library: Vec<MotionData>,
    bindings: Vec<Option<Vec<CurveBinding>>>,
    instances: Vec<MotionInstance>,
    ids: IdAllocator,
    time: f32,
    current_priority: MotionPriority,
    reserved_priority: MotionPriority,
    busy: bool,
}

impl MotionQueue {
    /// Build a queue over a validated motion library.
    pub fn new(cfg: Config, library: Vec<MotionData>) -> Result<Self, DataError> {
        for motion in &library {
            motion.validate()?;
        }
        let bindings = vec![None; library.len()];
        Ok(Self {
            cfg,
            library,
            bindings,
            instances: Vec::new(),
            ids: IdAllocator::new(),
            time: 0.0,
            current_priority: MotionPriority::None,
            reserved_priority: MotionPriority::None,
            busy: false,
        })
    }

    /// Reserve a priority slot ahead of a play. Fails when the slot is not
    /// above both the current and any existing reservation.
    pub fn reserve(&mut self, priority: MotionPriority) -> bool {
        if priority <= self.reserved_priority || priority <= self.current_priority {
            return false;
        }
        self.reserved_priority = priority;
        true
    }

    /// Queue motion `index`, fading out everything already queued.
    pub fn play(
        &mut self,
        index: usize,
        offset: f32,
        priority: MotionPriority,
    ) -> Result<InstId, PlayError> {
        if index >= self.library.len() {
            let err = PlayError::InvalidIndex {
                index,
                len: self.library.len(),
            };
            log::warn!("motion play ignored: {err}");
            return Err(err);
        }
        if !(offset.is_finite() && offset >= 0.0) {
            log::warn!("motion play ignored: negative offset {offset}");
            return Err(PlayError::NegativeOffset(offset));
        }
        let gated = priority < self.reserved_priority || priority <= self.current_priority;
        if priority != MotionPriority::Force && gated {
            let err = PlayError::PriorityRejected {
                requested: priority,
                current: self.current_priority,
                reserved: self.reserved_priority,
            };
            log::warn!("motion {index} not played: {err}");
            return Err(err);
        }
        if priority == self.reserved_priority || priority == MotionPriority::Force {
            self.reserved_priority = MotionPriority::None;
        }
        self.current_priority = priority;

        let now = self.time;
        for inst in &mut self.instances {
            let fade_out = self.library[inst.motion].fade_out_time;
            inst.end_time = schedule_fade_out(inst.end_time, now, fade_out);
        }

        let id = self.ids.alloc_inst();
        self.instances.push(MotionInstance {
            id,
            motion: index,
            state: MotionState::None,
            requested_at: now,
            offset,
            start_time: now + offset,
            end_time: -1.0,
            weight: 1.0,
            fade_weight: 0.0,
            last_raw_elapsed: -1.0,
        });
        self.busy = true;
        log::debug!("motion {index} queued as {id:?} at priority {priority:?}");
        Ok(id)
    }

    /// Force: drop every instance now. Otherwise every instance fades out.
    pub fn stop_all(&mut self, force: bool) {
        if force {
            self.instances.clear();
            self.current_priority = MotionPriority::None;
            return;
        }
        let now = self.time;
        for inst in &mut self.instances {
            let fade_out = self.library[inst.motion].fade_out_time;
            inst.end_time = schedule_fade_out(inst.end_time, now, fade_out);
        }
    }

    pub fn set_weight(&mut self, id: InstId, weight: f32) -> bool {
        match self.instances.iter_mut().find(|i| i.id == id) {
            Some(inst) => {
                inst.weight = weight.clamp(0.0, 1.0);
                true
            }
            None => false,
        }
    }

    /// Drop cached curve bindings, e.g. after parameters were added to the model.
    pub fn rebind(&mut self) {
        self.bindings.iter_mut().for_each(|b| *b = None);
    }

    /// Advance the motion clock by `speed * dt` and apply every queued motion.
    pub fn update(&mut self, dt: f32, model: &mut dyn ParameterAccess, out: &mut Outputs) {
        let Self {
            cfg,
            library,
            bindings,
            instances,
            time,
            ..
        } = self;
        *time += cfg.motion_speed * sanitize_dt(dt);
        let now = *time;
        let mut user_events = 0usize;

        for inst in instances.iter_mut() {
            let motion = &library[inst.motion];
            if now < inst.start_time {
                // stopped or superseded before its offset ran out
                if inst.end_time >= 0.0 && now > inst.end_time {
                    inst.state = MotionState::Ended;
                }
                continue;
            }
            if inst.state == MotionState::None {
                start_instance(inst, motion, out);
            }

            let binding =
                bindings[inst.motion].get_or_insert_with(|| bind_motion(motion, &*model));

            let raw_elapsed = now - inst.start_time;
            let elapsed = if motion.looping {
                if motion.duration > 0.0 {
                    raw_elapsed.rem_euclid(motion.duration)
                } else {
                    0.0
                }
            } else {
                raw_elapsed
            };

            let fade_in = fade_in_weight(now, inst.start_time, motion.fade_in_time);
            let fade_out = fade_out_weight(now, inst.end_time, motion.fade_out_time);
            let fade_weight = inst.weight * fade_in * fade_out;
            inst.fade_weight = fade_weight;

            for (curve, target) in motion.curves.iter().zip(binding.iter()) {
                let value = sample_curve(&curve.curve, elapsed);
                match *target {
                    CurveBinding::Model => model.set_model_opacity(value),
                    CurveBinding::Part(part) => model.set_part_opacity(part, value),
                    CurveBinding::Parameter(param) => {
                        let weight = if curve.has_fade_override() {
                            let fin = if curve.fade_in_time < 0.0 {
                                fade_in
                            } else {
                                fade_in_weight(now, inst.start_time, curve.fade_in_time)
                            };
                            let fout = if curve.fade_out_time < 0.0 {
                                fade_out
                            } else {
                                fade_out_weight(now, inst.end_time, curve.fade_out_time)
                            };
                            inst.weight * fin * fout
                        } else {
                            fade_weight
                        };
                        model.set_value(param, value, weight);
                    }
                    CurveBinding::Missing => {}
                }
            }

            fire_user_events(
                inst,
                motion,
                raw_elapsed,
                cfg.max_events_per_tick,
                &mut user_events,
                out,
            );
            inst.last_raw_elapsed = raw_elapsed;

            let past_duration = !motion.looping && raw_elapsed > motion.duration;
            let past_deadline = inst.end_time >= 0.0 && now > inst.end_time;
            if past_duration || past_deadline {
                inst.state = MotionState::Ended;
            }
        }

        instances.retain(|inst| {
            if inst.state == MotionState::Ended {
                log::debug!("motion {} ({:?}) ended", inst.motion, inst.id);
                out.push_event(CoreEvent::MotionEnded {
                    inst: inst.id,
                    motion: inst.motion,
                });
                false
            } else {
                true
            }
        });

        if self.instances.is_empty() {
            self.current_priority = MotionPriority::None;
            if self.busy {
                self.busy = false;
                out.push_event(CoreEvent::PlaybackFinished);
            }
        }
    }

    pub fn time(&self) -> f32 {
        self.time
    }

    pub fn current_priority(&self) -> MotionPriority {
        self.current_priority
    }

    pub fn reserved_priority(&self) -> MotionPriority {
        self.reserved_priority
    }

    pub fn instances(&self) -> &[MotionInstance] {
        &self.instances
    }

    pub fn instance(&self, id: InstId) -> Option<&MotionInstance> {
        self.instances.iter().find(|i| i.id == id)
    }

    pub fn library(&self) -> &[MotionData] {
        &self.library
    }

    pub fn is_finished(&self) -> bool {
        self.instances.is_empty()
    }

    pub fn set_speed(&mut self, speed: f32) {
        self.cfg.motion_speed = speed.max(0.0);
    }
}

fn start_instance(inst: &mut MotionInstance, motion: &MotionData, out: &mut Outputs) {
    inst.start_time = inst.requested_at + inst.offset;
    let natural_end = if motion.looping {
        -1.0
    } else {
        inst.start_time + motion.duration
    };
    // a fade-out requested before the first tick still wins if it is earlier
    if !(inst.end_time >= 0.0 && (natural_end < 0.0 || inst.end_time < natural_end)) {
        inst.end_time = natural_end;
    }
    inst.state = if motion.looping {
        MotionState::PlayingLooped
    } else {
        MotionState::Playing
    };
    out.push_event(CoreEvent::MotionStarted {
        inst: inst.id,
        motion: inst.motion,
    });
}

fn bind_motion(motion: &MotionData, model: &dyn ParameterAccess) -> Vec<CurveBinding> {
    motion
        .curves
        .iter()
        .map(|curve| {
            let bound = match curve.target {
                CurveTarget::Model => Some(CurveBinding::Model),
                CurveTarget::Parameter => {
                    model.parameter_index(&curve.id).map(CurveBinding::Parameter)
                }
                CurveTarget::PartOpacity => model.part_index(&curve.id).map(CurveBinding::Part),
            };
            bound.unwrap_or_else(|| {
                log::debug!(
                    "motion curve '{}' ({:?}) has no target in the model; skipped",
                    curve.id,
                    curve.target
                );
                CurveBinding::Missing
            })
        })
        .collect()
}

fn fire_user_events(
    inst: &MotionInstance,
    motion: &MotionData,
    raw_elapsed: f32,
    cap: usize,
    emitted: &mut usize,
    out: &mut Outputs,
) {
    let prev = inst.last_raw_elapsed;
    for event in &motion.events {
        if motion.looping && motion.duration > 0.0 {
            let first = ((prev - event.time) / motion.duration).floor() + 1.0;
            let mut k = first.max(0.0);
            while k * motion.duration + event.time <= raw_elapsed {
                if *emitted >= cap {
                    return;
                }
                emit_user_event(inst, event.time, &event.value, out);
                *emitted += 1;
                k += 1.0;
            }
        } else if prev < event.time && event.time <= raw_elapsed {
            if *emitted >= cap {
                return;
            }
            emit_user_event(inst, event.time, &event.value, out);
            *emitted += 1;
        }
    }
}

fn emit_user_event(inst: &MotionInstance, time: f32, value: &str, out: &mut Outputs) {
    out.push_event(CoreEvent::MotionUserEvent {
        inst: inst.id,
        motion: inst.motion,
        time,
        value: value.to_string(),
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{Curve, MotionCurve};

    fn library() -> Vec<MotionData> {
        let mut a = MotionData::new(2.0);
        a.fade_in_time = 0.2;
        a.fade_out_time = 0.3;
        a.curves
            .push(MotionCurve::parameter("p", Curve::constant(1.0)));
        vec![a.clone(), a]
    }

    #[test]
    fn priority_gate() {
        let mut q = MotionQueue::new(Config::default(), library()).unwrap();
        assert!(q.play(0, 0.0, MotionPriority::Normal).is_ok());
        assert!(matches!(
            q.play(1, 0.0, MotionPriority::Idle),
            Err(PlayError::PriorityRejected { .. })
        ));
        assert!(matches!(
            q.play(1, 0.0, MotionPriority::Normal),
            Err(PlayError::PriorityRejected { .. })
        ));
        assert!(q.play(1, 0.0, MotionPriority::Force).is_ok());
        assert_eq!(q.instances().len(), 2);
    }

    #[test]
    fn reservation_is_consumed_by_matching_play() {
        let mut q = MotionQueue::new(Config::default(), library()).unwrap();
        assert!(q.reserve(MotionPriority::Normal));
        assert!(!q.reserve(MotionPriority::Idle));
        assert!(q.play(0, 0.0, MotionPriority::Idle).is_err());
        assert!(q.play(0, 0.0, MotionPriority::Normal).is_ok());
        assert_eq!(q.reserved_priority(), MotionPriority::None);
    }

    #[test]
    fn invalid_index_leaves_queue_untouched() {
        let mut q = MotionQueue::new(Config::default(), library()).unwrap();
        assert_eq!(
            q.play(7, 0.0, MotionPriority::Force),
            Err(PlayError::InvalidIndex { index: 7, len: 2 })
        );
        assert!(q.is_finished());
        assert_eq!(q.current_priority(), MotionPriority::None);
    }

    #[test]
    fn rejects_negative_duration_library() {
        assert!(MotionQueue::new(Config::default(), vec![MotionData::new(-2.0)]).is_err());
    }
}
