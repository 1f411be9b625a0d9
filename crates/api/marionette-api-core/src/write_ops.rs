//! Writes reported to the host once per tick.
//!
//! WriteOp serializes to JSON as:
//!   { "target": "parameter/ParamAngleX", "value": 12.5 }
//!
//! WriteBatch is a simple Vec<WriteOp> with helpers.

use crate::target::WriteTarget;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WriteOp {
    pub target: WriteTarget,
    pub value: f32,
}

impl WriteOp {
    pub fn new(target: WriteTarget, value: f32) -> Self {
        Self { target, value }
    }

    pub fn parameter(id: impl Into<String>, value: f32) -> Self {
        Self::new(WriteTarget::Parameter(id.into()), value)
    }

    pub fn part(id: impl Into<String>, opacity: f32) -> Self {
        Self::new(WriteTarget::Part(id.into()), opacity)
    }
}

/// A batch of write operations, in emission order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WriteBatch(pub Vec<WriteOp>);

impl WriteBatch {
    pub fn new() -> Self {
        WriteBatch(Vec::new())
    }

    pub fn push(&mut self, op: WriteOp) {
        self.0.push(op);
    }

    pub fn extend(&mut self, other: impl IntoIterator<Item = WriteOp>) {
        self.0.extend(other);
    }

    pub fn into_vec(self) -> Vec<WriteOp> {
        self.0
    }

    pub fn iter(&self) -> impl Iterator<Item = &WriteOp> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Last value written to `target` in this batch, if any.
    pub fn get(&self, target: &WriteTarget) -> Option<f32> {
        self.0
            .iter()
            .rev()
            .find(|op| &op.target == target)
            .map(|op| op.value)
    }

    pub fn append(&mut self, mut other: WriteBatch) {
        self.0.append(&mut other.0)
    }
}

impl fmt::Display for WriteOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{ target: {}, value: {} }}", self.target, self.value)
    }
}
