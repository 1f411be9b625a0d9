//! Rig descriptors handed over by the asset loader.
//!
//! Input and output weights use a 0..=100 scale, as authored.

use serde::{Deserialize, Serialize};

use crate::normalize::NormalizationRange;
use crate::vector::Vec2;

/// Scale of authored input/output weights.
pub const MAXIMUM_WEIGHT: f32 = 100.0;

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PhysicsOptions {
    /// Reference gravity; its negation is the parent direction of the first segment's angle output.
    pub gravity: Vec2,
    pub wind: Vec2,
}

impl Default for PhysicsOptions {
    fn default() -> Self {
        Self {
            gravity: Vec2::new(0.0, -1.0),
            wind: Vec2::ZERO,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PhysicsChannel {
    X,
    Y,
    Angle,
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Normalization {
    pub position: NormalizationRange,
    pub angle: NormalizationRange,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PhysicsInputData {
    pub source: String,
    pub weight: f32,
    #[serde(rename = "type")]
    pub kind: PhysicsChannel,
    #[serde(default)]
    pub reflect: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PhysicsOutputData {
    pub destination: String,
    /// Particle whose segment (particle - 1 -> particle) drives the output.
    pub particle_index: usize,
    pub scale: f32,
    pub weight: f32,
    #[serde(rename = "type")]
    pub kind: PhysicsChannel,
    #[serde(default)]
    pub reflect: bool,
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PhysicsParticleData {
    pub mobility: f32,
    pub delay: f32,
    pub acceleration: f32,
    pub radius: f32,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PhysicsSettingData {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub normalization: Normalization,
    #[serde(default)]
    pub inputs: Vec<PhysicsInputData>,
    #[serde(default)]
    pub outputs: Vec<PhysicsOutputData>,
    pub particles: Vec<PhysicsParticleData>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PhysicsRigData {
    #[serde(default)]
    pub options: PhysicsOptions,
    /// Fixed simulation rate; 0 steps once per tick with the tick's dt.
    #[serde(default)]
    pub fps: f32,
    pub settings: Vec<PhysicsSettingData>,
}
