//! Command implementations. Printing lives in the binary.

use std::sync::{Arc, Mutex, PoisonError};

use anyhow::{Context, Result, bail};
use tracing::{Instrument, info, info_span, warn};

use enroll_core::{
    CatalogStore, EnrollError, EnrollmentSession, FilterState, Message, Notification,
    SessionConfig, SharedBackend, SubmissionState,
};
use enroll_model::{CatalogEntry, CourseId, DraftField, InsertReceipt, Semester};

use crate::logging::redact_value;

/// Category name and number of catalog entries in it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryCount {
    pub category: String,
    pub courses: usize,
}

/// Result of a catalog search.
#[derive(Debug, Clone)]
pub struct SearchResult {
    pub courses: Vec<CatalogEntry>,
    /// Search text was given and nothing matched.
    pub no_matches: bool,
    /// Category facet the search was limited to.
    pub category: Option<String>,
}

impl SearchResult {
    /// Why nothing was listed, or `None` when there are courses.
    pub fn empty_reason(&self) -> Option<String> {
        if !self.courses.is_empty() {
            return None;
        }
        Some(if self.no_matches {
            "No matching courses".to_string()
        } else if let Some(category) = &self.category {
            format!("No courses in category {category:?}")
        } else {
            "The catalog is empty".to_string()
        })
    }
}

/// Everything needed to enroll in one course.
#[derive(Debug, Clone, Default)]
pub struct EnrollRequest {
    pub course_id: String,
    pub academic_year: String,
    pub name: Option<String>,
    pub grade_level: Option<u8>,
    pub semester: Option<Semester>,
    pub credit_hours: Option<f32>,
    pub grade: Option<String>,
}

impl EnrollRequest {
    /// Field edits applied after the course pre-fills the draft.
    fn draft_edits(&self) -> Vec<DraftField> {
        let mut edits = vec![DraftField::AcademicYear(self.academic_year.clone())];
        if let Some(name) = &self.name {
            edits.push(DraftField::Name(name.clone()));
        }
        if self.grade_level.is_some() {
            edits.push(DraftField::GradeLevel(self.grade_level));
        }
        if self.semester.is_some() {
            edits.push(DraftField::Semester(self.semester));
        }
        if self.credit_hours.is_some() {
            edits.push(DraftField::CreditHours(self.credit_hours));
        }
        if let Some(grade) = &self.grade {
            edits.push(DraftField::Grade(grade.clone()));
        }
        edits
    }
}

/// Outcome of an enroll command.
#[derive(Debug, Clone)]
pub struct EnrollReport {
    pub course: CatalogEntry,
    pub state: SubmissionState,
    pub notification: Option<Notification>,
    pub receipt: Option<InsertReceipt>,
}

impl EnrollReport {
    pub fn is_success(&self) -> bool {
        self.state == SubmissionState::Succeeded
    }
}

async fn load_catalog(backend: &SharedBackend) -> Result<CatalogStore> {
    let mut catalog = CatalogStore::new();
    catalog
        .load(backend.as_ref())
        .await
        .map_err(EnrollError::from)
        .context("load course catalog")?;
    Ok(catalog)
}

pub async fn run_categories(backend: &SharedBackend) -> Result<Vec<CategoryCount>> {
    let catalog = load_catalog(backend).await?;
    Ok(catalog
        .category_counts()
        .into_iter()
        .map(|(category, courses)| CategoryCount {
            category: category.to_string(),
            courses,
        })
        .collect())
}

pub async fn run_search(
    backend: &SharedBackend,
    text: Option<&str>,
    category: Option<&str>,
) -> Result<SearchResult> {
    let catalog = load_catalog(backend).await?;
    let mut filter = FilterState::default();
    filter.set_search(text.unwrap_or_default());
    filter.set_category(category.map(str::to_string));
    let courses: Vec<CatalogEntry> = filter
        .apply(catalog.entries())
        .into_iter()
        .cloned()
        .collect();
    let no_matches = filter.has_search() && courses.is_empty();
    info!(results = courses.len(), "Searched catalog");
    Ok(SearchResult {
        courses,
        no_matches,
        category: filter.selected_category,
    })
}

/// Select a course, fill in the draft and submit it under the deadline.
///
/// Errors only when the catalog cannot be loaded or the course does not
/// exist. A failed or timed-out submission is reported in the returned
/// [`EnrollReport`].
pub async fn run_enroll(
    backend: SharedBackend,
    config: SessionConfig,
    request: &EnrollRequest,
) -> Result<EnrollReport> {
    let span = info_span!(
        "enroll",
        student = redact_value(config.student_id.as_str()),
        course = %request.course_id
    );
    enroll(backend, config, request).instrument(span).await
}

async fn enroll(
    backend: SharedBackend,
    config: SessionConfig,
    request: &EnrollRequest,
) -> Result<EnrollReport> {
    let receipt: Arc<Mutex<Option<InsertReceipt>>> = Arc::default();
    let (session, startup) = EnrollmentSession::new(backend, config);
    let sink = Arc::clone(&receipt);
    let mut session = session.with_completion(move |inserted| {
        *sink.lock().unwrap_or_else(PoisonError::into_inner) = Some(inserted.clone());
    });
    session.drive(startup).await;

    if let Some(err) = session.catalog().last_error() {
        return Err(EnrollError::from(err.clone())).context("load course catalog");
    }
    let course_id = CourseId::new(request.course_id.as_str())
        .with_context(|| format!("invalid course id {:?}", request.course_id))?;
    let Some(course) = session.catalog().get(&course_id).cloned() else {
        bail!(EnrollError::CourseNotFound(course_id.to_string()));
    };

    let select = session.update(Message::CourseSelected(course_id));
    session.drive(select).await;
    for edit in request.draft_edits() {
        let task = session.update(Message::DraftChanged(edit));
        session.drive(task).await;
    }
    let submit = session.update(Message::Submit);
    session.drive(submit).await;
    session.wait_for_background().await;

    let state = session.submission_state().clone();
    match &state {
        SubmissionState::Succeeded => info!("Enrollment recorded"),
        other => warn!(state = ?other, "Enrollment not recorded"),
    }
    let receipt = receipt
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .take();
    Ok(EnrollReport {
        course,
        state,
        notification: session.notification().cloned(),
        receipt,
    })
}
