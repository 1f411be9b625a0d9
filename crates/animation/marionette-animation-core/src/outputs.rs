//! Semantic events emitted while the queues tick.
//!
//! Parameter changes are not reported here; they land in the
//! [`ParameterAccess`](marionette_api_core::ParameterAccess) store directly.

use serde::{Deserialize, Serialize};

use crate::ids::InstId;

/// Discrete signals emitted during stepping.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[non_exhaustive]
pub enum CoreEvent {
    MotionStarted {
        inst: InstId,
        motion: usize,
    },
    MotionEnded {
        inst: InstId,
        motion: usize,
    },
    /// A user-data marker of the motion was crossed.
    MotionUserEvent {
        inst: InstId,
        motion: usize,
        time: f32,
        value: String,
    },
    /// The motion queue went from busy to empty.
    PlaybackFinished,
    ExpressionStarted {
        inst: InstId,
        expression: usize,
    },
    ExpressionEnded {
        inst: InstId,
        expression: usize,
    },
    /// The expression queue went from busy to empty.
    ExpressionFinished,
}

/// Events produced by one tick of a queue.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Outputs {
    #[serde(default)]
    pub events: Vec<CoreEvent>,
}

impl Outputs {
    #[inline]
    pub fn clear(&mut self) {
        self.events.clear();
    }

    #[inline]
    pub fn push_event(&mut self, event: CoreEvent) {
        self.events.push(event);
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}
