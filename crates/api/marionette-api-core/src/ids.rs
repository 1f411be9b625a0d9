//! Dense handles into the parameter and part tables.

use serde::{Deserialize, Serialize};

/// Position of a parameter in its [`ParameterModel`](crate::ParameterModel).
/// Stable for the lifetime of the model; parameters are never removed.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ParamIndex(pub u32);

/// Position of a part in its [`ParameterModel`](crate::ParameterModel).
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PartIndex(pub u32);

impl ParamIndex {
    #[inline]
    pub fn as_usize(self) -> usize {
        self.0 as usize
    }
}

impl PartIndex {
    #[inline]
    pub fn as_usize(self) -> usize {
        self.0 as usize
    }
}

impl From<usize> for ParamIndex {
    fn from(value: usize) -> Self {
        ParamIndex(value as u32)
    }
}

impl From<usize> for PartIndex {
    fn from(value: usize) -> Self {
        PartIndex(value as u32)
    }
}
