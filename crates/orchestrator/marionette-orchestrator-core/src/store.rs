//! Per-tick parameter snapshot.
//!
//! The pipeline restores the snapshot at the start of every tick and takes a
//! new one right after the motion stage. Everything later in the tick (pose,
//! effects, physics, expressions) therefore blends onto motion output and
//! never compounds across frames.

use marionette_api_core::{ParamIndex, ParameterAccess};

#[derive(Clone, Debug, Default)]
pub struct ParameterStore {
    values: Vec<f32>,
}

impl ParameterStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remember every parameter's current value.
    pub fn save(&mut self, model: &dyn ParameterAccess) {
        let count = model.parameter_count();
        self.values.clear();
        self.values
            .extend((0..count).map(|i| model.value(ParamIndex::from(i)).unwrap_or_default()));
    }

    /// Write the remembered values back. Parameters added after the last
    /// save keep their current value.
    pub fn load(&self, model: &mut dyn ParameterAccess) {
        let count = model.parameter_count().min(self.values.len());
        for (i, &value) in self.values.iter().take(count).enumerate() {
            model.store_value(ParamIndex::from(i), value);
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn values(&self) -> &[f32] {
        &self.values
    }
}
