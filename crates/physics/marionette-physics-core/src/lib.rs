//! Pendulum-chain physics for puppet parameters.
//!
//! Each rig reads a handful of input parameters, swings a chain of particles
//! with them and writes segment offsets or angles back to output parameters.

pub mod data;
pub mod error;
pub mod normalize;
pub mod particle;
pub mod physics;
pub mod vector;

pub use data::{
    Normalization, PhysicsChannel, PhysicsInputData, PhysicsOptions, PhysicsOutputData,
    PhysicsParticleData, PhysicsRigData, PhysicsSettingData, MAXIMUM_WEIGHT,
};
pub use error::RigError;
pub use normalize::{normalize_parameter_value, NormalizationRange};
pub use particle::{build_chain, update_particles, update_particles_for_stabilization, Particle};
pub use physics::{OvershootReport, Physics, MAX_DELTA_TIME};
pub use vector::{degrees_to_radian, direction_to_radian, radian_to_direction, Vec2};
