//! Enrollment draft and insert payload types.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{ModelError, StudentId};

/// Term an enrollment covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Semester {
    Fall,
    Spring,
    Summer,
    FullYear,
}

impl Semester {
    /// Get display label.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Fall => "Fall",
            Self::Spring => "Spring",
            Self::Summer => "Summer",
            Self::FullYear => "Full Year",
        }
    }
}

impl fmt::Display for Semester {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Semester {
    type Err = ModelError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized: String = value
            .trim()
            .chars()
            .filter(|c| !matches!(c, ' ' | '-' | '_'))
            .collect::<String>()
            .to_lowercase();
        match normalized.as_str() {
            "fall" | "autumn" => Ok(Self::Fall),
            "spring" => Ok(Self::Spring),
            "summer" => Ok(Self::Summer),
            "fullyear" | "year" => Ok(Self::FullYear),
            _ => Err(ModelError::UnknownSemester(value.to_string())),
        }
    }
}

/// The enrollment form being composed.
///
/// Text fields hold raw user input; validation happens at submit time.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Draft {
    pub name: String,
    pub grade_level: Option<u8>,
    pub academic_year: String,
    pub semester: Option<Semester>,
    pub credit_hours: Option<f32>,
    pub grade: String,
}

/// A single-field edit of a [`Draft`].
#[derive(Debug, Clone, PartialEq)]
pub enum DraftField {
    Name(String),
    GradeLevel(Option<u8>),
    AcademicYear(String),
    Semester(Option<Semester>),
    CreditHours(Option<f32>),
    Grade(String),
}

impl Draft {
    /// Apply a single-field edit.
    pub fn apply(&mut self, field: DraftField) {
        match field {
            DraftField::Name(value) => self.name = value,
            DraftField::GradeLevel(value) => self.grade_level = value,
            DraftField::AcademicYear(value) => self.academic_year = value,
            DraftField::Semester(value) => self.semester = value,
            DraftField::CreditHours(value) => self.credit_hours = value,
            DraftField::Grade(value) => self.grade = value,
        }
    }

    /// True when no field has been filled in.
    pub fn is_blank(&self) -> bool {
        *self == Self::default()
    }
}

/// Insert payload sent to the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrollmentRecord {
    pub student_id: StudentId,
    pub name: String,
    pub grade_level: Option<u8>,
    pub academic_year: String,
    pub semester: Option<Semester>,
    pub credit_hours: Option<f32>,
    pub grade: Option<String>,
}

impl EnrollmentRecord {
    /// Build the payload from a draft. Text fields are trimmed and an empty
    /// grade is sent as `null`.
    pub fn from_draft(student_id: StudentId, draft: &Draft) -> Self {
        let grade = draft.grade.trim();
        Self {
            student_id,
            name: draft.name.trim().to_string(),
            grade_level: draft.grade_level,
            academic_year: draft.academic_year.trim().to_string(),
            semester: draft.semester,
            credit_hours: draft.credit_hours,
            grade: (!grade.is_empty()).then(|| grade.to_string()),
        }
    }
}

/// Result of a successful insert.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InsertReceipt {
    pub id: String,
}
