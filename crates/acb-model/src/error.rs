use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ModelError {
    #[error("invalid subject id: {0:?}")]
    InvalidSubjectId(String),
    #[error("unknown granularity: {0}")]
    UnknownGranularity(String),
    #[error("event has {actual} values but the table declares {expected} columns")]
    ValueCountMismatch { expected: usize, actual: usize },
}

pub type Result<T> = std::result::Result<T, ModelError>;
