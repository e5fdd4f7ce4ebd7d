use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum AnnotateError {
    #[error("invalid observation: {0}")]
    InvalidObservation(String),
}
