use thiserror::Error;

/// Structural problems in rig data, raised when the rig set is built.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum RigError {
    #[error("rig {rig} has no particles")]
    EmptyChain { rig: usize },
    #[error("rig {rig} particle {particle} has a non-finite or negative {field}")]
    InvalidParticle {
        rig: usize,
        particle: usize,
        field: &'static str,
    },
    #[error("physics fps must be finite and non-negative (got {0})")]
    InvalidFps(f32),
}
