//! Local draft validation run before any network call.

use enroll_model::Draft;

use crate::error::{FieldIssue, ValidationError};

pub const FIELD_NAME: &str = "Course name";
pub const FIELD_ACADEMIC_YEAR: &str = "Academic year";
pub const FIELD_GRADE_LEVEL: &str = "Grade level";
pub const FIELD_CREDIT_HOURS: &str = "Credit hours";

/// Highest grade level accepted on a draft.
pub const MAX_GRADE_LEVEL: u8 = 12;

/// Check a draft for missing or malformed fields.
///
/// Name and academic year are required. Grade level and credit hours are
/// optional but must be in range when present.
pub fn validate_draft(draft: &Draft) -> Result<(), ValidationError> {
    let mut issues = Vec::new();

    if draft.name.trim().is_empty() {
        issues.push(FieldIssue::required(FIELD_NAME));
    }
    if draft.academic_year.trim().is_empty() {
        issues.push(FieldIssue::required(FIELD_ACADEMIC_YEAR));
    }
    if let Some(level) = draft.grade_level
        && !(1..=MAX_GRADE_LEVEL).contains(&level)
    {
        issues.push(FieldIssue::invalid(
            FIELD_GRADE_LEVEL,
            format!("must be between 1 and {MAX_GRADE_LEVEL}"),
        ));
    }
    if let Some(hours) = draft.credit_hours
        && !(hours.is_finite() && hours > 0.0)
    {
        issues.push(FieldIssue::invalid(
            FIELD_CREDIT_HOURS,
            "must be greater than zero",
        ));
    }

    if issues.is_empty() {
        Ok(())
    } else {
        Err(ValidationError { issues })
    }
}
