//! Pose groups and secondary effects.
//!
//! Every effect here is a small state machine that is advanced with `dt`
//! and then blended onto its bound parameters (or part opacities, for the
//! pose) through [`marionette_api_core::ParameterAccess`].

mod bind;
pub mod error;
pub mod eye_blink;
pub mod harmonic_motion;
pub mod lip_sync;
pub mod look_at;
pub mod pose;

pub use error::PoseError;
pub use eye_blink::{EyeBlink, EyeBlinkPhase, EyeBlinkSettings};
pub use harmonic_motion::{
    harmonic_value, HarmonicDirection, HarmonicMotion, HarmonicMotionSettings, HarmonicParameter,
};
pub use lip_sync::{LipSync, LipSyncSettings};
pub use look_at::{LookAt, LookAtAxis, LookAtParameter, LookAtSettings};
pub use pose::{hidden_opacity_ceiling, Pose, PoseData, PosePartData};
