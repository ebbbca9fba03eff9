//! Errors raised while constructing model values from user input.

use thiserror::Error;

/// Errors for invalid model values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ModelError {
    #[error("invalid course id: {0:?}")]
    InvalidCourseId(String),
    #[error("invalid student id: {0:?}")]
    InvalidStudentId(String),
    #[error("unknown semester: {0:?}")]
    UnknownSemester(String),
}

pub type Result<T> = std::result::Result<T, ModelError>;
