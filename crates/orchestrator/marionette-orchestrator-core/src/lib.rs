//! marionette-orchestrator
//!
//! Owns one puppet's [`ParameterModel`] and every subsystem attached to it,
//! and runs them once per tick in a fixed order:
//!
//! load snapshot -> host commands -> Motion -> save snapshot -> Pose ->
//! EyeBlink -> LookAt -> HarmonicMotion -> LipSync -> Physics -> Expression
//!
//! Later stages see what earlier stages wrote in the same tick. The
//! resulting parameter, part and model opacity changes are reported in a
//! [`PuppetFrame`].

pub mod diagnostics;
pub mod inputs;
pub mod scheduler;
pub mod store;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use marionette_animation_core::{
    Config, CoreEvent, ExpressionData, ExpressionQueue, MotionData, MotionQueue, Outputs,
};
use marionette_api_core::{ParameterModel, WriteBatch};
use marionette_effects_core::{
    EyeBlink, EyeBlinkSettings, HarmonicMotion, HarmonicMotionSettings, LipSync, LipSyncSettings,
    LookAt, LookAtSettings, Pose, PoseData,
};
use marionette_physics_core::{OvershootReport, Physics, PhysicsRigData};

pub use crate::diagnostics::DiagnosticsCfg;
pub use crate::inputs::{Command, Inputs, RejectedCommand};
pub use crate::scheduler::Stage;
pub use crate::store::ParameterStore;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PuppetFrame {
    pub epoch: u64,
    pub dt: f32,
    /// Parameters, part opacities and model opacity that changed since the
    /// previous frame (everything, on the first frame).
    pub writes: WriteBatch,
    pub events: Vec<CoreEvent>,
    /// Stages that ran, in order.
    pub stages: Vec<Stage>,
    pub rejected: Vec<RejectedCommand>,
    /// Physics outputs that left their range this frame (diagnostics only).
    pub overshoot: Vec<OvershootReport>,
}

/// Values last published to the host, for change detection.
#[derive(Debug, Clone, Default)]
pub(crate) struct Published {
    pub(crate) parameters: Vec<f32>,
    pub(crate) parts: Vec<f32>,
    pub(crate) model_opacity: f32,
}

#[derive(Debug)]
pub struct Orchestrator {
    pub(crate) model: ParameterModel,
    pub(crate) store: ParameterStore,
    pub epoch: u64,
    pub diagnostics: DiagnosticsCfg,
    pub(crate) motions: Option<MotionQueue>,
    pub(crate) expressions: Option<ExpressionQueue>,
    pub(crate) pose: Option<Pose>,
    pub(crate) eye_blink: Option<EyeBlink>,
    pub(crate) look_at: Option<LookAt>,
    pub(crate) harmonic_motion: Option<HarmonicMotion>,
    pub(crate) lip_sync: Option<LipSync>,
    pub(crate) physics: Option<Physics>,
    pub(crate) outputs: Outputs,
    pub(crate) published: Option<Published>,
}

impl Orchestrator {
    /// Take ownership of `model`; its current values become the first snapshot.
    pub fn new(model: ParameterModel) -> Self {
        let mut store = ParameterStore::new();
        store.save(&model);
        Self {
            model,
            store,
            epoch: 0,
            diagnostics: DiagnosticsCfg::default(),
            motions: None,
            expressions: None,
            pose: None,
            eye_blink: None,
            look_at: None,
            harmonic_motion: None,
            lip_sync: None,
            physics: None,
            outputs: Outputs::default(),
            published: None,
        }
    }

    pub fn with_motions(mut self, cfg: Config, library: Vec<MotionData>) -> Result<Self> {
        let queue = MotionQueue::new(cfg, library).context("invalid motion library")?;
        self.motions = Some(queue);
        Ok(self)
    }

    pub fn with_expressions(mut self, library: Vec<ExpressionData>) -> Result<Self> {
        let queue = ExpressionQueue::new(library).context("invalid expression library")?;
        self.expressions = Some(queue);
        Ok(self)
    }

    /// Attach a pose and reset every group to its first part.
    pub fn with_pose(mut self, data: &PoseData) -> Result<Self> {
        let pose = Pose::new(data, &self.model).context("invalid pose")?;
        pose.reset(&mut self.model);
        self.store.save(&self.model);
        self.pose = Some(pose);
        Ok(self)
    }

    /// Attach a physics rig set and settle it at the current inputs.
    pub fn with_physics(mut self, data: &PhysicsRigData) -> Result<Self> {
        let mut physics = Physics::new(data, &self.model).context("invalid physics rig")?;
        physics.stabilize(&mut self.model);
        self.store.save(&self.model);
        self.physics = Some(physics);
        Ok(self)
    }

    pub fn with_eye_blink(mut self, settings: EyeBlinkSettings) -> Self {
        self.eye_blink = Some(EyeBlink::new(settings, &self.model));
        self
    }

    pub fn with_look_at(mut self, settings: LookAtSettings) -> Self {
        self.look_at = Some(LookAt::new(settings, &self.model));
        self
    }

    pub fn with_harmonic_motion(mut self, settings: HarmonicMotionSettings) -> Self {
        self.harmonic_motion = Some(HarmonicMotion::new(settings, &self.model));
        self
    }

    pub fn with_lip_sync(mut self, settings: LipSyncSettings) -> Self {
        self.lip_sync = Some(LipSync::new(settings, &self.model));
        self
    }

    pub fn with_diagnostics(mut self, cfg: DiagnosticsCfg) -> Self {
        self.diagnostics = cfg;
        self
    }

    /// Advance the puppet by `dt` seconds after applying `inputs`.
    pub fn step(&mut self, dt: f32, inputs: Inputs) -> Result<PuppetFrame> {
        if !(dt.is_finite() && dt >= 0.0) {
            bail!("dt must be finite and non-negative (got {dt})");
        }
        self.epoch = self.epoch.wrapping_add(1);
        crate::scheduler::run_single_pass(self, dt, inputs)
    }

    /// Re-settle physics at the current parameter values.
    pub fn stabilize(&mut self) {
        if let Some(physics) = self.physics.as_mut() {
            physics.stabilize(&mut self.model);
        }
    }

    pub fn model(&self) -> &ParameterModel {
        &self.model
    }

    /// Direct model access. Parameter edits made here are overwritten by the
    /// next tick's snapshot load; use [`Command::SetParameter`] to persist them.
    pub fn model_mut(&mut self) -> &mut ParameterModel {
        &mut self.model
    }

    pub fn motions(&self) -> Option<&MotionQueue> {
        self.motions.as_ref()
    }

    pub fn motions_mut(&mut self) -> Option<&mut MotionQueue> {
        self.motions.as_mut()
    }

    pub fn expressions(&self) -> Option<&ExpressionQueue> {
        self.expressions.as_ref()
    }

    pub fn physics(&self) -> Option<&Physics> {
        self.physics.as_ref()
    }

    pub fn pose(&self) -> Option<&Pose> {
        self.pose.as_ref()
    }

    pub fn eye_blink(&self) -> Option<&EyeBlink> {
        self.eye_blink.as_ref()
    }

    pub fn look_at(&self) -> Option<&LookAt> {
        self.look_at.as_ref()
    }

    pub fn harmonic_motion(&self) -> Option<&HarmonicMotion> {
        self.harmonic_motion.as_ref()
    }

    pub fn lip_sync(&self) -> Option<&LipSync> {
        self.lip_sync.as_ref()
    }

    pub fn store(&self) -> &ParameterStore {
        &self.store
    }
}
