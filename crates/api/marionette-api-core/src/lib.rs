//! marionette-api-core: the parameter table every animation subsystem reads and writes.
//!
//! The core pipeline never owns parameter storage. It talks to it through
//! [`ParameterAccess`], which [`ParameterModel`] implements for hosts that do
//! not bring their own store.

pub mod blend;
pub mod error;
pub mod ids;
pub mod model;
pub mod parameter;
pub mod target;
pub mod write_ops;

pub use blend::BlendMode;
pub use error::ModelError;
pub use ids::{ParamIndex, PartIndex};
pub use model::{ParameterAccess, ParameterModel};
pub use parameter::{ModelDesc, Parameter, ParameterDesc, ParameterRange, Part, PartDesc};
pub use target::WriteTarget;
pub use write_ops::{WriteBatch, WriteOp};
