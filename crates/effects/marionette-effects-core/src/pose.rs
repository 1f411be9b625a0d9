//! Mutually exclusive part groups with cross-dissolve.
//!
//! In each group the first part whose visibility parameter is set fades in;
//! every other part in the group is pushed down under a back-opacity ceiling
//! derived from the visible part's opacity. Hidden parts only ever lose
//! opacity while hidden. Linked parts copy their owner's opacity verbatim.

use serde::{Deserialize, Serialize};

use marionette_api_core::{ParamIndex, ParameterAccess, PartIndex};

use crate::error::PoseError;

pub const DEFAULT_FADE_IN_TIME: f32 = 0.5;

/// A part counts as flagged visible when its normalized parameter exceeds this.
pub const VISIBILITY_EPSILON: f32 = 0.001;

/// Crossover opacity of the ceiling curve.
pub const PHI: f32 = 0.5;

/// Upper bound on how much of the background may show through both parts.
pub const BACK_OPACITY_THRESHOLD: f32 = 0.15;

fn default_fade() -> f32 {
    DEFAULT_FADE_IN_TIME
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PosePartData {
    /// Part id; the visibility parameter shares it.
    pub id: String,
    #[serde(default)]
    pub links: Vec<String>,
}

impl PosePartData {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            links: Vec::new(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PoseData {
    #[serde(default = "default_fade")]
    pub fade_in_time: f32,
    pub groups: Vec<Vec<PosePartData>>,
}

#[derive(Clone, Debug)]
struct PoseEntry {
    part: Option<PartIndex>,
    param: Option<ParamIndex>,
    links: Vec<PartIndex>,
}

#[derive(Clone, Debug)]
pub struct Pose {
    fade_in_time: f32,
    groups: Vec<Vec<PoseEntry>>,
}

/// Highest opacity a hidden part may keep while the visible part sits at
/// `visible`.
///
/// Below [`PHI`] the curve runs through (0, 1) and (phi, phi), above it
/// through (phi, phi) and (1, 0). The result is then tightened so that
/// `(1 - ceiling) * (1 - visible)` never exceeds [`BACK_OPACITY_THRESHOLD`].
pub fn hidden_opacity_ceiling(visible: f32) -> f32 {
    let visible = visible.clamp(0.0, 1.0);
    let mut ceiling = if visible < PHI {
        visible * (PHI - 1.0) / PHI + 1.0
    } else {
        (1.0 - visible) * PHI / (1.0 - PHI)
    };
    let back = (1.0 - ceiling) * (1.0 - visible);
    if back > BACK_OPACITY_THRESHOLD {
        ceiling = 1.0 - BACK_OPACITY_THRESHOLD / (1.0 - visible);
    }
    ceiling.clamp(0.0, 1.0)
}

impl Pose {
    /// Bind every group against `model`. Missing parts, parameters and
    /// links are skipped; a group with no entries at all is rejected.
    pub fn new(data: &PoseData, model: &dyn ParameterAccess) -> Result<Self, PoseError> {
        let fade_in_time = if data.fade_in_time.is_finite() && data.fade_in_time >= 0.0 {
            data.fade_in_time
        } else {
            DEFAULT_FADE_IN_TIME
        };

        let mut groups = Vec::with_capacity(data.groups.len());
        for (group, parts) in data.groups.iter().enumerate() {
            if parts.is_empty() {
                return Err(PoseError::EmptyGroup { group });
            }
            let entries = parts
                .iter()
                .map(|p| {
                    let part = model.part_index(&p.id);
                    if part.is_none() {
                        log::debug!("pose: part '{}' not in model; skipped", p.id);
                    }
                    let links = p
                        .links
                        .iter()
                        .filter_map(|link| model.part_index(link))
                        .collect();
                    PoseEntry {
                        part,
                        param: model.parameter_index(&p.id),
                        links,
                    }
                })
                .collect();
            groups.push(entries);
        }
        Ok(Self {
            fade_in_time,
            groups,
        })
    }

    pub fn fade_in_time(&self) -> f32 {
        self.fade_in_time
    }

    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    /// Show the first part of every group and hide the rest, parameters
    /// included.
    pub fn reset(&self, model: &mut dyn ParameterAccess) {
        for group in &self.groups {
            for (i, entry) in group.iter().enumerate() {
                let value = if i == 0 { 1.0 } else { 0.0 };
                if let Some(param) = entry.param {
                    model.set_value(param, value, 1.0);
                }
                if let Some(part) = entry.part {
                    model.set_part_opacity(part, value);
                }
            }
        }
        self.copy_links(model);
    }

    pub fn update(&self, dt: f32, model: &mut dyn ParameterAccess) {
        let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };
        for group in &self.groups {
            self.fade_group(group, dt, model);
        }
        self.copy_links(model);
    }

    fn fade_group(&self, group: &[PoseEntry], dt: f32, model: &mut dyn ParameterAccess) {
        let flagged = group.iter().position(|entry| {
            let (Some(part), Some(param)) = (entry.part, entry.param) else {
                return false;
            };
            model.part_opacity(part).is_some()
                && model
                    .normalized_value(param)
                    .is_some_and(|v| v > VISIBILITY_EPSILON)
        });

        let (visible, mut opacity) = match flagged {
            Some(i) => (
                i,
                group[i]
                    .part
                    .and_then(|part| model.part_opacity(part))
                    .unwrap_or(0.0),
            ),
            None => (0, 1.0),
        };
        opacity = if self.fade_in_time > 0.0 {
            (opacity + dt / self.fade_in_time).min(1.0)
        } else {
            1.0
        };

        let ceiling = hidden_opacity_ceiling(opacity);
        for (i, entry) in group.iter().enumerate() {
            let Some(part) = entry.part else {
                continue;
            };
            if i == visible {
                model.set_part_opacity(part, opacity);
            } else if let Some(current) = model.part_opacity(part) {
                model.set_part_opacity(part, current.min(ceiling));
            }
        }
    }

    fn copy_links(&self, model: &mut dyn ParameterAccess) {
        for entry in self.groups.iter().flatten() {
            if entry.links.is_empty() {
                continue;
            }
            let Some(opacity) = entry.part.and_then(|p| model.part_opacity(p)) else {
                continue;
            };
            for &link in &entry.links {
                model.set_part_opacity(link, opacity);
            }
        }
    }
}
