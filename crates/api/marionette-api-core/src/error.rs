use thiserror::Error;

/// Setup-time failures of the parameter model.
///
/// Every variant is raised while the model is being built; once built, reads
/// and writes cannot fail beyond returning `None` for unknown handles.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ModelError {
    #[error("parameter '{id}' has a degenerate range [{min}, {max}]")]
    DegenerateRange { id: String, min: f32, max: f32 },
    #[error("parameter '{0}' is declared more than once")]
    DuplicateParameter(String),
    #[error("part '{0}' is declared more than once")]
    DuplicatePart(String),
    #[error("part '{part}' names unknown parent '{parent}'")]
    UnknownParent { part: String, parent: String },
}
