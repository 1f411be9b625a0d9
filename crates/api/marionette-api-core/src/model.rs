//! The parameter/part table and the access trait the pipeline is written against.
//!
//! Every write goes through [`ParameterAccess::write`], which blends with
//! [`crate::blend::apply`] and re-clamps into the parameter range. Nothing in
//! the pipeline can leave a parameter outside `[min, max]`.

use indexmap::IndexMap;

use crate::blend::{self, BlendMode};
use crate::error::ModelError;
use crate::ids::{ParamIndex, PartIndex};
use crate::parameter::{ModelDesc, Parameter, ParameterDesc, ParameterRange, Part, PartDesc};

/// Read/write surface of a parameter store.
///
/// Lookups by id happen once at bind time; per-tick traffic uses the dense
/// handles. Unknown handles read as `None` and writes to them are ignored.
pub trait ParameterAccess {
    fn parameter_index(&self, id: &str) -> Option<ParamIndex>;
    fn parameter_count(&self) -> usize;
    fn range(&self, index: ParamIndex) -> Option<ParameterRange>;
    fn value(&self, index: ParamIndex) -> Option<f32>;
    /// Store `value` after clamping. Returns the stored value.
    fn store_value(&mut self, index: ParamIndex, value: f32) -> Option<f32>;

    fn part_index(&self, id: &str) -> Option<PartIndex>;
    fn part_count(&self) -> usize;
    fn part_opacity(&self, index: PartIndex) -> Option<f32>;
    fn set_part_opacity(&mut self, index: PartIndex, opacity: f32);

    fn model_opacity(&self) -> f32;
    fn set_model_opacity(&mut self, opacity: f32);

    /// Blend `target` onto the parameter and re-clamp. Returns the new value.
    fn write(&mut self, index: ParamIndex, target: f32, mode: BlendMode, weight: f32) -> Option<f32> {
        let range = self.range(index)?;
        let current = self.value(index)?;
        let target = match mode {
            BlendMode::Overwrite => range.clamp(target),
            _ => target,
        };
        self.store_value(index, blend::apply(mode, current, target, weight))
    }

    fn set_value(&mut self, index: ParamIndex, target: f32, weight: f32) -> Option<f32> {
        self.write(index, target, BlendMode::Overwrite, weight)
    }

    fn add_value(&mut self, index: ParamIndex, delta: f32, weight: f32) -> Option<f32> {
        self.write(index, delta, BlendMode::Additive, weight)
    }

    fn multiply_value(&mut self, index: ParamIndex, factor: f32, weight: f32) -> Option<f32> {
        self.write(index, factor, BlendMode::Multiplicative, weight)
    }

    /// `(value - min) / (max - min)`.
    fn normalized_value(&self, index: ParamIndex) -> Option<f32> {
        let range = self.range(index)?;
        Some(range.normalize(self.value(index)?))
    }

    fn value_by_id(&self, id: &str) -> Option<f32> {
        self.value(self.parameter_index(id)?)
    }

    fn set_value_by_id(&mut self, id: &str, target: f32, weight: f32) -> Option<f32> {
        let index = self.parameter_index(id)?;
        self.set_value(index, target, weight)
    }
}

/// Owning parameter/part table.
///
/// Insertion order defines the dense indices handed out as [`ParamIndex`] and
/// [`PartIndex`].
#[derive(Clone, Debug)]
pub struct ParameterModel {
    parameters: IndexMap<String, Parameter>,
    parts: IndexMap<String, Part>,
    opacity: f32,
}

impl Default for ParameterModel {
    fn default() -> Self {
        Self {
            parameters: IndexMap::new(),
            parts: IndexMap::new(),
            opacity: 1.0,
        }
    }
}

impl ParameterModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a model from its description, rejecting degenerate ranges.
    pub fn from_desc(desc: &ModelDesc) -> Result<Self, ModelError> {
        let mut model = Self::new();
        for p in &desc.parameters {
            model.add_parameter(p.clone())?;
        }
        for part in &desc.parts {
            model.add_part(part.clone())?;
        }
        Ok(model)
    }

    pub fn add_parameter(&mut self, desc: ParameterDesc) -> Result<ParamIndex, ModelError> {
        if self.parameters.contains_key(&desc.id) {
            return Err(ModelError::DuplicateParameter(desc.id));
        }
        let range = ParameterRange::new(&desc.id, desc.min, desc.max, desc.default)?;
        let value = range.clamp(desc.value.unwrap_or(range.default));
        let (index, _) = self.parameters.insert_full(
            desc.id.clone(),
            Parameter {
                id: desc.id,
                range,
                value,
            },
        );
        Ok(ParamIndex::from(index))
    }

    pub fn add_part(&mut self, desc: PartDesc) -> Result<PartIndex, ModelError> {
        if self.parts.contains_key(&desc.id) {
            return Err(ModelError::DuplicatePart(desc.id));
        }
        let parent = match desc.parent {
            Some(parent) => Some(self.part_index(&parent).ok_or_else(|| {
                ModelError::UnknownParent {
                    part: desc.id.clone(),
                    parent: parent.clone(),
                }
            })?),
            None => None,
        };
        let (index, _) = self.parts.insert_full(
            desc.id.clone(),
            Part {
                id: desc.id,
                opacity: desc.opacity.clamp(0.0, 1.0),
                parent,
            },
        );
        Ok(PartIndex::from(index))
    }

    pub fn parameter(&self, index: ParamIndex) -> Option<&Parameter> {
        self.parameters.get_index(index.as_usize()).map(|(_, p)| p)
    }

    pub fn part(&self, index: PartIndex) -> Option<&Part> {
        self.parts.get_index(index.as_usize()).map(|(_, p)| p)
    }

    pub fn parameters(&self) -> impl Iterator<Item = &Parameter> {
        self.parameters.values()
    }

    pub fn parts(&self) -> impl Iterator<Item = &Part> {
        self.parts.values()
    }

    /// Reset every parameter to its default.
    pub fn reset_to_defaults(&mut self) {
        for p in self.parameters.values_mut() {
            p.value = p.range.default;
        }
    }
}

impl ParameterAccess for ParameterModel {
    fn parameter_index(&self, id: &str) -> Option<ParamIndex> {
        self.parameters.get_index_of(id).map(ParamIndex::from)
    }

    fn parameter_count(&self) -> usize {
        self.parameters.len()
    }

    fn range(&self, index: ParamIndex) -> Option<ParameterRange> {
        self.parameter(index).map(|p| p.range)
    }

    fn value(&self, index: ParamIndex) -> Option<f32> {
        self.parameter(index).map(|p| p.value)
    }

    fn store_value(&mut self, index: ParamIndex, value: f32) -> Option<f32> {
        let (_, p) = self.parameters.get_index_mut(index.as_usize())?;
        p.value = p.range.clamp(value);
        Some(p.value)
    }

    fn part_index(&self, id: &str) -> Option<PartIndex> {
        self.parts.get_index_of(id).map(PartIndex::from)
    }

    fn part_count(&self) -> usize {
        self.parts.len()
    }

    fn part_opacity(&self, index: PartIndex) -> Option<f32> {
        self.part(index).map(|p| p.opacity)
    }

    fn set_part_opacity(&mut self, index: PartIndex, opacity: f32) {
        if let Some((_, part)) = self.parts.get_index_mut(index.as_usize()) {
            part.opacity = if opacity.is_nan() { part.opacity } else { opacity.clamp(0.0, 1.0) };
        }
    }

    fn model_opacity(&self) -> f32 {
        self.opacity
    }

    fn set_model_opacity(&mut self, opacity: f32) {
        if !opacity.is_nan() {
            self.opacity = opacity.clamp(0.0, 1.0);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn model() -> ParameterModel {
        let mut m = ParameterModel::new();
        m.add_parameter(ParameterDesc::new("ParamAngleX", -30.0, 30.0, 0.0))
            .unwrap();
        m.add_parameter(ParameterDesc::new("ParamEyeLOpen", 0.0, 1.0, 1.0))
            .unwrap();
        m
    }

    #[test]
    fn rejects_degenerate_ranges() {
        let mut m = ParameterModel::new();
        assert!(matches!(
            m.add_parameter(ParameterDesc::new("a", 1.0, 1.0, 1.0)),
            Err(ModelError::DegenerateRange { .. })
        ));
        assert!(matches!(
            m.add_parameter(ParameterDesc::new("b", f32::NAN, 1.0, 0.0)),
            Err(ModelError::DegenerateRange { .. })
        ));
        assert!(matches!(
            m.add_parameter(ParameterDesc::new("c", 2.0, -2.0, 0.0)),
            Err(ModelError::DegenerateRange { .. })
        ));
        assert_eq!(m.parameter_count(), 0);
    }

    #[test]
    fn rejects_duplicates_and_unknown_parents() {
        let mut m = model();
        assert_eq!(
            m.add_parameter(ParameterDesc::new("ParamAngleX", 0.0, 1.0, 0.0)),
            Err(ModelError::DuplicateParameter("ParamAngleX".into()))
        );
        let mut child = PartDesc::new("ArmL");
        child.parent = Some("Body".into());
        assert!(matches!(
            m.add_part(child.clone()),
            Err(ModelError::UnknownParent { .. })
        ));
        let body = m.add_part(PartDesc::new("Body")).unwrap();
        let arm = m.add_part(child).unwrap();
        assert_eq!(m.part(arm).unwrap().parent, Some(body));
    }

    #[test]
    fn writes_clamp_into_range() {
        let mut m = model();
        let x = m.parameter_index("ParamAngleX").unwrap();
        assert_eq!(m.set_value(x, 100.0, 1.0), Some(30.0));
        assert_eq!(m.add_value(x, -100.0, 1.0), Some(-30.0));
        m.set_value(x, 10.0, 1.0);
        assert_eq!(m.multiply_value(x, 5.0, 1.0), Some(30.0));
        assert!((m.normalized_value(x).unwrap() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn overwrite_clamps_target_before_blending() {
        let mut m = model();
        let eye = m.parameter_index("ParamEyeLOpen").unwrap();
        m.set_value(eye, 0.0, 1.0);
        // target 3.0 is clamped to 1.0 first, so half weight lands on 0.5
        assert_eq!(m.set_value(eye, 3.0, 0.5), Some(0.5));
    }

    #[test]
    fn unknown_handles_are_ignored() {
        let mut m = model();
        assert_eq!(m.value(ParamIndex(99)), None);
        assert_eq!(m.set_value(ParamIndex(99), 1.0, 1.0), None);
        m.set_part_opacity(PartIndex(3), 0.5);
        assert_eq!(m.part_opacity(PartIndex(3)), None);
    }
}
