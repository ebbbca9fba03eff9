//! Applying a chosen catalog entry onto the draft.

use std::sync::Arc;

use enroll_model::{CatalogEntry, CourseId, Draft, Semester};
use tokio::task::JoinHandle;

use crate::backend::SharedBackend;

/// Credit hours assumed for a semester-long course.
pub const SEMESTER_CREDIT_HOURS: f32 = 0.5;

/// Credit hours assumed for a full-year course.
pub const FULL_YEAR_CREDIT_HOURS: f32 = 1.0;

/// Tracks the selected catalog entry and pre-fills the draft from it.
pub struct SelectionController {
    backend: SharedBackend,
    selected: Option<CatalogEntry>,
    /// Popularity increments that may still be running. Dropping a handle
    /// detaches the task.
    increments: Vec<JoinHandle<()>>,
}

impl SelectionController {
    pub fn new(backend: SharedBackend) -> Self {
        Self {
            backend,
            selected: None,
            increments: Vec::new(),
        }
    }

    /// Select a catalog entry.
    ///
    /// Pre-fills `draft` from the entry, remembers it as the selected course
    /// and fires a popularity increment in the background. The increment's
    /// outcome is only logged.
    pub fn select(&mut self, entry: &CatalogEntry, draft: &mut Draft) {
        apply_entry(entry, draft);
        tracing::info!(course = %entry.id, name = %entry.name, "Selected course");
        self.selected = Some(entry.clone());
        self.spawn_popularity_increment(entry.id.clone());
    }

    pub fn selected_course(&self) -> Option<&CatalogEntry> {
        self.selected.as_ref()
    }

    pub fn clear(&mut self) {
        self.selected = None;
    }

    /// Wait for every popularity increment fired so far.
    pub async fn wait_for_increments(&mut self) {
        for handle in self.increments.drain(..) {
            if let Err(err) = handle.await {
                tracing::warn!(error = %err, "Popularity increment task did not finish");
            }
        }
    }

    fn spawn_popularity_increment(&mut self, id: CourseId) {
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            tracing::warn!(course = %id, "No async runtime, skipping popularity increment");
            return;
        };
        let backend = Arc::clone(&self.backend);
        self.increments.retain(|handle| !handle.is_finished());
        let handle = runtime.spawn(async move {
            match backend.increment_popularity(&id).await {
                Ok(()) => tracing::debug!(course = %id, "Incremented course popularity"),
                Err(err) => {
                    tracing::warn!(course = %id, error = %err, "Popularity increment failed");
                }
            }
        });
        self.increments.push(handle);
    }
}

/// Copy the fields a catalog entry determines onto a draft.
///
/// The name is always overwritten. Grade level, semester and credit hours are
/// derived from the entry only while the draft leaves them empty. Academic
/// year and grade are never touched.
pub fn apply_entry(entry: &CatalogEntry, draft: &mut Draft) {
    draft.name = entry.name.clone();
    if draft.grade_level.is_none() {
        draft.grade_level = entry.lowest_grade_level();
    }
    if draft.semester.is_none() {
        draft.semester = Some(if entry.is_semester {
            Semester::Fall
        } else {
            Semester::FullYear
        });
    }
    if draft.credit_hours.is_none() {
        draft.credit_hours = Some(if entry.is_semester {
            SEMESTER_CREDIT_HOURS
        } else {
            FULL_YEAR_CREDIT_HOURS
        });
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;
    use chrono::{DateTime, Utc};
    use enroll_model::{EnrollmentRecord, InsertReceipt};
    use tokio::sync::mpsc;

    use super::*;
    use crate::backend::EnrollmentBackend;
    use crate::error::{BackendError, InsertError, LoadError};

    struct PopularityProbe {
        tx: mpsc::UnboundedSender<CourseId>,
        fail: bool,
    }

    #[async_trait]
    impl EnrollmentBackend for PopularityProbe {
        async fn load_catalog(&self) -> Result<Vec<CatalogEntry>, LoadError> {
            Ok(Vec::new())
        }

        async fn insert_enrollment(
            &self,
            _record: EnrollmentRecord,
        ) -> Result<InsertReceipt, InsertError> {
            Err(InsertError::new("unused"))
        }

        async fn increment_popularity(&self, id: &CourseId) -> Result<(), BackendError> {
            let _ = self.tx.send(id.clone());
            if self.fail {
                Err(BackendError::new("rpc unavailable"))
            } else {
                Ok(())
            }
        }
    }

    fn entry(id: &str, name: &str, is_semester: bool, levels: &[u8]) -> CatalogEntry {
        CatalogEntry {
            id: CourseId::new(id).unwrap(),
            name: name.to_string(),
            category: "Mathematics".to_string(),
            is_semester,
            recommended_grade_levels: levels.iter().copied().collect(),
            popularity_score: 0,
            created_at: DateTime::<Utc>::UNIX_EPOCH,
        }
    }

    fn controller(fail: bool) -> (SelectionController, mpsc::UnboundedReceiver<CourseId>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let backend: SharedBackend = Arc::new(PopularityProbe { tx, fail });
        (SelectionController::new(backend), rx)
    }

    #[test]
    fn apply_fills_empty_fields_only() {
        let mut draft = Draft {
            academic_year: "2024-2025".to_string(),
            credit_hours: Some(2.0),
            grade: "A".to_string(),
            ..Draft::default()
        };
        apply_entry(&entry("c1", "Algebra I", true, &[10, 9]), &mut draft);
        assert_eq!(draft.name, "Algebra I");
        assert_eq!(draft.grade_level, Some(9));
        assert_eq!(draft.semester, Some(Semester::Fall));
        assert_eq!(draft.credit_hours, Some(2.0));
        assert_eq!(draft.academic_year, "2024-2025");
        assert_eq!(draft.grade, "A");
    }

    #[test]
    fn apply_overwrites_name_from_previous_selection() {
        let mut draft = Draft::default();
        apply_entry(&entry("c1", "Algebra I", false, &[]), &mut draft);
        apply_entry(&entry("c2", "Geometry", true, &[10]), &mut draft);
        assert_eq!(draft.name, "Geometry");
        // Defaults from the first selection are kept.
        assert_eq!(draft.semester, Some(Semester::FullYear));
        assert_eq!(draft.credit_hours, Some(FULL_YEAR_CREDIT_HOURS));
        assert_eq!(draft.grade_level, Some(10));
    }

    #[tokio::test]
    async fn select_replaces_selection_and_bumps_popularity() {
        let (mut selection, mut rx) = controller(false);
        let mut draft = Draft::default();

        selection.select(&entry("c1", "Algebra I", false, &[9]), &mut draft);
        selection.select(&entry("c2", "Geometry", false, &[10]), &mut draft);

        assert_eq!(selection.selected_course().unwrap().id.as_str(), "c2");
        assert_eq!(rx.recv().await.unwrap().as_str(), "c1");
        assert_eq!(rx.recv().await.unwrap().as_str(), "c2");
    }

    #[tokio::test]
    async fn failed_increment_does_not_affect_selection() {
        let (mut selection, mut rx) = controller(true);
        let mut draft = Draft::default();

        selection.select(&entry("c1", "Algebra I", false, &[]), &mut draft);

        assert_eq!(rx.recv().await.unwrap().as_str(), "c1");
        assert_eq!(draft.name, "Algebra I");
        assert!(selection.selected_course().is_some());
    }

    #[tokio::test]
    async fn wait_for_increments_lets_pending_work_finish() {
        let (mut selection, mut rx) = controller(false);
        let mut draft = Draft::default();

        selection.select(&entry("c1", "Algebra I", false, &[]), &mut draft);
        selection.select(&entry("c2", "Geometry", false, &[]), &mut draft);
        selection.wait_for_increments().await;

        assert_eq!(rx.try_recv().unwrap().as_str(), "c1");
        assert_eq!(rx.try_recv().unwrap().as_str(), "c2");
        assert!(selection.increments.is_empty());
    }

    #[test]
    fn select_without_runtime_still_applies() {
        let (mut selection, mut rx) = controller(false);
        let mut draft = Draft::default();

        selection.select(&entry("c1", "Algebra I", false, &[]), &mut draft);

        assert_eq!(draft.name, "Algebra I");
        assert!(rx.try_recv().is_err());
        selection.clear();
        assert!(selection.selected_course().is_none());
    }
}
