//! Error types for catalog loading and enrollment submission.
//!
//! Every error here is caught at the controller boundary and turned into a
//! notification. [`EnrollError`] unifies them for callers that want a single
//! type (the CLI, mostly).

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Catalog fetch failed. The catalog degrades to empty.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Failed to load course catalog: {reason}")]
pub struct LoadError {
    /// Description of what went wrong.
    pub reason: String,
}

impl LoadError {
    pub fn new(err: impl fmt::Display) -> Self {
        Self {
            reason: err.to_string(),
        }
    }
}

/// The backend reported a failed insert. The message is shown verbatim.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct InsertError {
    /// Message reported by the backend.
    pub message: String,
}

impl InsertError {
    pub fn new(err: impl fmt::Display) -> Self {
        Self {
            message: err.to_string(),
        }
    }
}

/// The submission deadline elapsed before the backend responded.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Operation timed out")]
pub struct TimeoutError {
    /// Deadline that elapsed.
    pub after: Duration,
}

/// Best-effort backend call failed (popularity increment).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct BackendError {
    pub message: String,
}

impl BackendError {
    pub fn new(err: impl fmt::Display) -> Self {
        Self {
            message: err.to_string(),
        }
    }
}

/// A single problem with a draft field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldIssue {
    /// Display name of the field.
    pub field: &'static str,
    /// What is wrong with it.
    pub problem: String,
}

impl FieldIssue {
    pub fn required(field: &'static str) -> Self {
        Self {
            field,
            problem: "is required".to_string(),
        }
    }

    pub fn invalid(field: &'static str, problem: impl Into<String>) -> Self {
        Self {
            field,
            problem: problem.into(),
        }
    }
}

impl fmt::Display for FieldIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.field, self.problem)
    }
}

/// Local validation failed; no network call was made.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{}", join_issues(.issues))]
pub struct ValidationError {
    pub issues: Vec<FieldIssue>,
}

impl ValidationError {
    /// Whether a specific field was reported.
    pub fn has_issue_for(&self, field: &str) -> bool {
        self.issues.iter().any(|issue| issue.field == field)
    }
}

fn join_issues(issues: &[FieldIssue]) -> String {
    issues
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Reasons a submit request never reached the backend.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SubmitRejected {
    /// Another submission is still waiting on the backend.
    #[error("A submission is already in progress")]
    InFlight,
    /// The draft failed validation.
    #[error(transparent)]
    Invalid(#[from] ValidationError),
}

/// Settings could not be read or written.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum SettingsError {
    #[error("Failed to read settings from {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse settings from {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Failed to serialize settings: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Failed to write settings to {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("No student id configured")]
    MissingStudentId,
}

/// Unified error for enrollment operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum EnrollError {
    #[error(transparent)]
    Load(#[from] LoadError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Insert(#[from] InsertError),

    #[error(transparent)]
    Timeout(#[from] TimeoutError),

    #[error("A submission is already in progress")]
    InFlight,

    #[error("Course not found: {0}")]
    CourseNotFound(String),
}

impl From<SubmitRejected> for EnrollError {
    fn from(err: SubmitRejected) -> Self {
        match err {
            SubmitRejected::InFlight => Self::InFlight,
            SubmitRejected::Invalid(err) => Self::Validation(err),
        }
    }
}

impl EnrollError {
    /// Get the error category for display purposes.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Load(_) | Self::CourseNotFound(_) => ErrorCategory::Catalog,
            Self::Validation(_) => ErrorCategory::Validation,
            Self::Insert(_) | Self::Timeout(_) | Self::InFlight => ErrorCategory::Submission,
        }
    }

    /// Message shown in a notification, with the suggestion appended when
    /// there is one.
    pub fn user_message(&self) -> String {
        match self.suggestion() {
            Some(hint) => format!("{self}. {hint}"),
            None => self.to_string(),
        }
    }

    /// Get a user-friendly suggestion for resolving this error.
    pub fn suggestion(&self) -> Option<&'static str> {
        match self {
            Self::Load(_) => Some("Check your connection and reload the course list."),
            Self::Validation(_) => Some("Fill in the highlighted fields and submit again."),
            Self::Timeout(_) => Some("The server did not respond in time. Try again."),
            Self::InFlight => Some("Wait for the current submission to finish."),
            Self::CourseNotFound(_) => Some("Search the catalog and pick a listed course."),
            Self::Insert(_) => None,
        }
    }
}

/// Error category for grouping related errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Catalog,
    Validation,
    Submission,
}

impl ErrorCategory {
    /// Get a human-readable label for this category.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Catalog => "Catalog",
            Self::Validation => "Validation",
            Self::Submission => "Submission",
        }
    }
}
