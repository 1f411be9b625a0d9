use anyhow::Result;
use serde::{Deserialize, Serialize};

use marionette_api_core::{ParameterAccess, ParameterModel, WriteBatch, WriteOp, WriteTarget};

use crate::inputs::{Command, RejectedCommand};
use crate::{Inputs, Orchestrator, Published, PuppetFrame};

/// Pipeline stages in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Stage {
    Load,
    Commands,
    Motion,
    Save,
    Pose,
    EyeBlink,
    LookAt,
    HarmonicMotion,
    LipSync,
    Physics,
    Expression,
}

impl Stage {
    pub const ORDER: [Stage; 11] = [
        Stage::Load,
        Stage::Commands,
        Stage::Motion,
        Stage::Save,
        Stage::Pose,
        Stage::EyeBlink,
        Stage::LookAt,
        Stage::HarmonicMotion,
        Stage::LipSync,
        Stage::Physics,
        Stage::Expression,
    ];
}

/// Run one tick: every attached subsystem once, in [`Stage::ORDER`].
pub fn run_single_pass(orch: &mut Orchestrator, dt: f32, inputs: Inputs) -> Result<PuppetFrame> {
    let mut stages = Vec::with_capacity(Stage::ORDER.len());
    let mut mark = |stage: Stage, enabled: bool| {
        if enabled {
            log::trace!("stage {stage:?}");
        }
        stages.push(stage);
    };
    let trace = orch.diagnostics.enabled;
    orch.outputs.clear();

    orch.store.load(&mut orch.model);
    mark(Stage::Load, trace);

    let mut rejected = Vec::new();
    if !inputs.is_empty() {
        for command in inputs.commands {
            if let Err(reason) = apply_command(orch, &command) {
                log::warn!("command {command:?} rejected: {reason}");
                rejected.push(RejectedCommand { command, reason });
            }
        }
        mark(Stage::Commands, trace);
    }

    if let Some(queue) = orch.motions.as_mut() {
        queue.update(dt, &mut orch.model, &mut orch.outputs);
        mark(Stage::Motion, trace);
    }

    orch.store.save(&orch.model);
    mark(Stage::Save, trace);

    if let Some(pose) = orch.pose.as_ref() {
        pose.update(dt, &mut orch.model);
        mark(Stage::Pose, trace);
    }
    if let Some(blink) = orch.eye_blink.as_mut() {
        blink.tick(dt, &mut orch.model);
        mark(Stage::EyeBlink, trace);
    }
    if let Some(look_at) = orch.look_at.as_mut() {
        look_at.tick(dt, &mut orch.model);
        mark(Stage::LookAt, trace);
    }
    if let Some(harmonic) = orch.harmonic_motion.as_mut() {
        harmonic.tick(dt, &mut orch.model);
        mark(Stage::HarmonicMotion, trace);
    }
    if let Some(lip_sync) = orch.lip_sync.as_mut() {
        lip_sync.tick(dt, &mut orch.model);
        mark(Stage::LipSync, trace);
    }

    let mut overshoot = Vec::new();
    if let Some(physics) = orch.physics.as_mut() {
        physics.evaluate(dt, &mut orch.model);
        if orch.diagnostics.enabled {
            overshoot = physics.overshoot();
            physics.reset_overshoot();
        }
        mark(Stage::Physics, trace);
    }

    if let Some(queue) = orch.expressions.as_mut() {
        queue.update(dt, &mut orch.model, &mut orch.outputs);
        mark(Stage::Expression, trace);
    }

    let writes = collect_writes(&orch.model, &mut orch.published);

    Ok(PuppetFrame {
        epoch: orch.epoch,
        dt,
        writes,
        events: std::mem::take(&mut orch.outputs.events),
        stages,
        rejected,
        overshoot,
    })
}

fn apply_command(orch: &mut Orchestrator, command: &Command) -> Result<(), String> {
    const NO_MOTIONS: &str = "no motion queue attached";
    const NO_EXPRESSIONS: &str = "no expression queue attached";

    match command {
        Command::PlayMotion {
            index,
            offset,
            priority,
        } => {
            let queue = orch.motions.as_mut().ok_or(NO_MOTIONS)?;
            queue
                .play(*index, *offset, *priority)
                .map(|_| ())
                .map_err(|err| err.to_string())
        }
        Command::ReserveMotion { priority } => {
            let queue = orch.motions.as_mut().ok_or(NO_MOTIONS)?;
            if queue.reserve(*priority) {
                Ok(())
            } else {
                Err(format!("priority {priority:?} cannot be reserved"))
            }
        }
        Command::StopMotions { force } => {
            orch.motions.as_mut().ok_or(NO_MOTIONS)?.stop_all(*force);
            Ok(())
        }
        Command::SetMotionWeight { inst, weight } => {
            let queue = orch.motions.as_mut().ok_or(NO_MOTIONS)?;
            if queue.set_weight(*inst, *weight) {
                Ok(())
            } else {
                Err(format!("no motion instance {inst:?}"))
            }
        }
        Command::PlayExpression { index } => orch
            .expressions
            .as_mut()
            .ok_or(NO_EXPRESSIONS)?
            .play(*index)
            .map(|_| ())
            .map_err(|err| err.to_string()),
        Command::StopExpressions { force } => {
            orch.expressions
                .as_mut()
                .ok_or(NO_EXPRESSIONS)?
                .stop_all(*force);
            Ok(())
        }
        Command::SetParameter { id, value, weight } => orch
            .model
            .set_value_by_id(id, *value, *weight)
            .map(|_| ())
            .ok_or_else(|| format!("unknown parameter '{id}'")),
        Command::SetPartOpacity { id, opacity } => {
            let part = orch
                .model
                .part_index(id)
                .ok_or_else(|| format!("unknown part '{id}'"))?;
            orch.model.set_part_opacity(part, *opacity);
            Ok(())
        }
        Command::LookAtTarget { target } => {
            orch.look_at
                .as_mut()
                .ok_or("no look-at attached")?
                .set_target(*target);
            Ok(())
        }
        Command::LipSyncEnvelope { value } => {
            orch.lip_sync
                .as_mut()
                .ok_or("no lip sync attached")?
                .set_envelope(*value);
            Ok(())
        }
        Command::EyeBlinkAuto { enabled } => {
            orch.eye_blink
                .as_mut()
                .ok_or("no eye blink attached")?
                .set_auto_enabled(*enabled);
            Ok(())
        }
        Command::EyeBlinkValue { value } => {
            orch.eye_blink
                .as_mut()
                .ok_or("no eye blink attached")?
                .set_value(*value);
            Ok(())
        }
    }
}

/// Everything that differs from the last published frame.
fn collect_writes(model: &ParameterModel, published: &mut Option<Published>) -> WriteBatch {
    let previous = published.take();
    let mut batch = WriteBatch::new();
    let mut next = Published {
        parameters: Vec::with_capacity(model.parameter_count()),
        parts: Vec::with_capacity(model.part_count()),
        model_opacity: model.model_opacity(),
    };

    for (i, p) in model.parameters().enumerate() {
        let old = previous.as_ref().and_then(|prev| prev.parameters.get(i));
        if old != Some(&p.value) {
            batch.push(WriteOp::parameter(p.id.clone(), p.value));
        }
        next.parameters.push(p.value);
    }
    for (i, part) in model.parts().enumerate() {
        let old = previous.as_ref().and_then(|prev| prev.parts.get(i));
        if old != Some(&part.opacity) {
            batch.push(WriteOp::part(part.id.clone(), part.opacity));
        }
        next.parts.push(part.opacity);
    }
    let old = previous.as_ref().map(|prev| prev.model_opacity);
    if old != Some(next.model_opacity) {
        batch.push(WriteOp::new(WriteTarget::ModelOpacity, next.model_opacity));
    }

    *published = Some(next);
    batch
}
