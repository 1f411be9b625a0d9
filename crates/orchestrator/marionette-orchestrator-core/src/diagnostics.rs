use serde::{Deserialize, Serialize};

/// Opt-in per-frame diagnostics.
///
/// When enabled, each frame carries the physics overshoot seen during that
/// frame and stage progress is traced through `log`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DiagnosticsCfg {
    pub enabled: bool,
}
