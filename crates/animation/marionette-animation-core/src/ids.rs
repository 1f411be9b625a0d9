//! Identifiers and the allocator for queue instances.

use serde::{Deserialize, Serialize};

/// Stable handle of a motion or expression instance inside its queue.
/// Ids are never reused within one queue.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct InstId(pub u32);

/// Monotonic allocator for InstId.
#[derive(Default, Debug, Clone)]
pub struct IdAllocator {
    next_inst: u32,
}

impl IdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn alloc_inst(&mut self) -> InstId {
        let id = InstId(self.next_inst);
        self.next_inst = self.next_inst.wrapping_add(1);
        id
    }
}
