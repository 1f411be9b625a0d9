//! Configuration shared by the motion and expression queues.

use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Playback speed multiplier applied to the motion clock.
    pub motion_speed: f32,
    /// Upper bound on user-data events a queue emits per tick; extra events are dropped.
    pub max_events_per_tick: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            motion_speed: 1.0,
            max_events_per_tick: 1024,
        }
    }
}
