//! Host commands applied at the start of a tick.
//!
//! This is the single path by which a host (UI, script, network) changes a
//! running puppet: every field edit is expressed as a [`Command`] and goes
//! through the same code the runtime uses.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use marionette_animation_core::{InstId, MotionPriority};

fn full_weight() -> f32 {
    1.0
}

fn normal_priority() -> MotionPriority {
    MotionPriority::Normal
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "cmd", rename_all = "snake_case")]
pub enum Command {
    PlayMotion {
        index: usize,
        #[serde(default)]
        offset: f32,
        #[serde(default = "normal_priority")]
        priority: MotionPriority,
    },
    ReserveMotion {
        priority: MotionPriority,
    },
    StopMotions {
        #[serde(default)]
        force: bool,
    },
    SetMotionWeight {
        inst: InstId,
        weight: f32,
    },
    PlayExpression {
        index: usize,
    },
    StopExpressions {
        #[serde(default)]
        force: bool,
    },
    SetParameter {
        id: String,
        value: f32,
        #[serde(default = "full_weight")]
        weight: f32,
    },
    SetPartOpacity {
        id: String,
        opacity: f32,
    },
    LookAtTarget {
        target: [f32; 3],
    },
    LipSyncEnvelope {
        value: f32,
    },
    EyeBlinkAuto {
        enabled: bool,
    },
    /// Host-driven eye openness while automatic blinking is off.
    EyeBlinkValue {
        value: f32,
    },
}

/// Commands for one tick, applied in order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Inputs {
    #[serde(default)]
    pub commands: Vec<Command>,
}

impl Inputs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, command: Command) -> Self {
        self.commands.push(command);
        self
    }

    pub fn push(&mut self, command: Command) {
        self.commands.push(command);
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Parse `{"commands": [{"cmd": "play_motion", "index": 0}, ...]}`.
    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text).context("failed to parse puppet inputs")
    }
}

/// A command that could not be applied, with the reason.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RejectedCommand {
    pub command: Command,
    pub reason: String,
}
