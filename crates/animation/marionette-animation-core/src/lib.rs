//! marionette-animation-core: motion and expression playback.
//!
//! Both queues are engine-agnostic: they read and write parameters through
//! [`marionette_api_core::ParameterAccess`] and report lifecycle events in
//! [`outputs::Outputs`]. Neither queue owns the parameter model.

pub mod config;
pub mod data;
pub mod error;
pub mod expression;
pub mod fade;
pub mod ids;
pub mod interp;
pub mod motion;
pub mod outputs;
pub mod sampling;

pub use config::Config;
pub use data::{
    Curve, CurvePoint, CurveTarget, ExpressionData, ExpressionParameter, MotionCurve,
    MotionData, MotionEventData, Segment,
};
pub use error::{DataError, PlayError};
pub use expression::{ExpressionAccumulator, ExpressionInstance, ExpressionQueue};
pub use ids::InstId;
pub use interp::functions::easing_sin;
pub use motion::{MotionInstance, MotionPriority, MotionQueue, MotionState};
pub use outputs::{CoreEvent, Outputs};
pub use sampling::sample_curve;
