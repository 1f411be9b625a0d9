use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum PoseError {
    #[error("pose group {group} has no parts")]
    EmptyGroup { group: usize },
}
