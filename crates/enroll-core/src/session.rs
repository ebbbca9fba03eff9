//! Enrollment session - the state container behind the enrollment form.
//!
//! [`EnrollmentSession`] owns every controller and handles [`Message`]s one at
//! a time. `update` never blocks: backend work comes back as a [`Task`] whose
//! message is fed into `update` again.

use std::sync::Arc;
use std::time::Duration;

use enroll_model::{CatalogEntry, CourseId, Draft, InsertReceipt, StudentId};

use crate::backend::SharedBackend;
use crate::catalog::CatalogStore;
use crate::error::{EnrollError, LoadError, SettingsError};
use crate::filter::FilterState;
use crate::message::Message;
use crate::notification::{Notification, NotificationRelay};
use crate::selection::SelectionController;
use crate::settings::Settings;
use crate::submission::{CompletionCallback, SubmissionController, SubmissionState};
use crate::task::Task;

/// Callback invoked after a successful insert.
pub type SubmittedHook = Arc<dyn Fn(&InsertReceipt) + Send + Sync>;

/// Runtime parameters for a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    pub student_id: StudentId,
    pub deadline: Duration,
    pub auto_dismiss: Option<Duration>,
}

impl SessionConfig {
    pub fn new(student_id: StudentId) -> Self {
        Self {
            student_id,
            deadline: crate::submission::DEFAULT_DEADLINE,
            auto_dismiss: None,
        }
    }

    /// Build a config from persisted settings. Fails if no student is set.
    pub fn from_settings(settings: &Settings) -> Result<Self, SettingsError> {
        Ok(Self {
            student_id: settings.student_id()?,
            deadline: settings.submission.deadline(),
            auto_dismiss: settings.notifications.auto_dismiss(),
        })
    }

    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = deadline;
        self
    }
}

/// Session state.
pub struct EnrollmentSession {
    catalog: CatalogStore,
    filter: FilterState,
    /// Indices into the catalog that pass the current filter.
    results: Vec<usize>,
    selection: SelectionController,
    submission: SubmissionController,
    notifications: NotificationRelay,
    on_submitted: Option<SubmittedHook>,
}

impl EnrollmentSession {
    /// Create a session and the task that loads the catalog.
    pub fn new(backend: SharedBackend, config: SessionConfig) -> (Self, Task) {
        let mut session = Self {
            catalog: CatalogStore::new(),
            filter: FilterState::default(),
            results: Vec::new(),
            selection: SelectionController::new(Arc::clone(&backend)),
            submission: SubmissionController::new(Arc::clone(&backend), config.student_id)
                .with_deadline(config.deadline),
            notifications: NotificationRelay::new().with_auto_dismiss(config.auto_dismiss),
            on_submitted: None,
        };
        session.catalog.begin_load();
        let startup = Task::perform(
            async move { backend.load_catalog().await },
            Message::CatalogLoaded,
        );
        (session, startup)
    }

    /// Register a callback for successful inserts.
    pub fn with_completion(
        mut self,
        hook: impl Fn(&InsertReceipt) + Send + Sync + 'static,
    ) -> Self {
        self.on_submitted = Some(Arc::new(hook));
        self
    }

    /// Handle a message and return follow-up work.
    pub fn update(&mut self, message: Message) -> Task {
        match message {
            Message::CatalogLoaded(result) => self.handle_catalog_loaded(result),

            Message::SearchChanged(text) => {
                self.filter.set_search(text);
                self.refresh_results();
                Task::none()
            }

            Message::CategorySelected(category) => {
                self.filter.set_category(category);
                self.refresh_results();
                Task::none()
            }

            Message::ClearFilters => {
                self.filter.clear();
                self.refresh_results();
                Task::none()
            }

            Message::CourseSelected(id) => {
                self.select_course(&id);
                Task::none()
            }

            Message::DraftChanged(field) => {
                self.submission.set_field(field);
                Task::none()
            }

            Message::ResetDraft => {
                self.submission.reset_draft();
                self.selection.clear();
                Task::none()
            }

            Message::Submit => self.handle_submit(),

            Message::SubmitResolved(resolution) => {
                self.submission.resolve(resolution, &mut self.notifications);
                Task::none()
            }

            Message::DismissNotification => {
                self.notifications.dismiss();
                Task::none()
            }

            Message::Tick(now) => {
                self.submission.reconcile(&mut self.notifications);
                self.notifications.expire_if_due(now);
                Task::none()
            }
        }
    }

    /// Run a task and every task it leads to until there is no more work.
    pub async fn drive(&mut self, mut task: Task) {
        while let Some(message) = task.run().await {
            task = self.update(message);
        }
    }

    /// Wait for background work started by course selection.
    pub async fn wait_for_background(&mut self) {
        self.selection.wait_for_increments().await;
    }

    fn handle_catalog_loaded(&mut self, result: Result<Vec<CatalogEntry>, LoadError>) -> Task {
        if let Err(err) = self.catalog.finish_load(result) {
            self.notifications.error(EnrollError::from(err).user_message());
        }
        self.refresh_results();
        Task::none()
    }

    fn select_course(&mut self, id: &CourseId) {
        let Some(entry) = self.catalog.get(id) else {
            tracing::warn!(course = %id, "Selected course is not in the catalog");
            return;
        };
        self.selection.select(entry, self.submission.draft_mut());
    }

    fn handle_submit(&mut self) -> Task {
        let on_success = self.on_submitted.clone().map(|hook| {
            let callback: CompletionCallback =
                Box::new(move |receipt: &InsertReceipt| hook(receipt));
            callback
        });
        match self.submission.begin(on_success, &mut self.notifications) {
            Ok(pending) => Task::perform(pending, Message::SubmitResolved),
            // Already logged and, for invalid drafts, notified.
            Err(_) => Task::none(),
        }
    }

    fn refresh_results(&mut self) {
        self.results = self.filter.matching_indices(self.catalog.entries());
        tracing::debug!(
            search = %self.filter.search_text,
            category = self.filter.category(),
            results = self.results.len(),
            "Recomputed filtered courses"
        );
    }

    // =========================================================================
    // Queries
    // =========================================================================

    pub fn catalog(&self) -> &CatalogStore {
        &self.catalog
    }

    pub fn is_loading(&self) -> bool {
        self.catalog.is_loading()
    }

    /// Categories in catalog order with their entry counts. Unaffected by
    /// the current filter.
    pub fn categories_with_counts(&self) -> Vec<(&str, usize)> {
        self.catalog.category_counts()
    }

    /// Entries that pass the current filter, in catalog order.
    pub fn filtered(&self) -> Vec<&CatalogEntry> {
        let entries = self.catalog.entries();
        self.results
            .iter()
            .filter_map(|&index| entries.get(index))
            .collect()
    }

    pub fn filter_state(&self) -> &FilterState {
        &self.filter
    }

    /// Search text is set and nothing matches.
    pub fn no_matches(&self) -> bool {
        self.filter.has_search() && self.results.is_empty()
    }

    pub fn selected_course(&self) -> Option<&CatalogEntry> {
        self.selection.selected_course()
    }

    pub fn draft(&self) -> &Draft {
        self.submission.draft()
    }

    pub fn is_submitting(&self) -> bool {
        self.submission.is_in_flight()
    }

    pub fn submission_state(&self) -> &SubmissionState {
        self.submission.state()
    }

    pub fn submission(&self) -> &SubmissionController {
        &self.submission
    }

    /// The current notification, visible or not.
    pub fn notification(&self) -> Option<&Notification> {
        self.notifications.current()
    }

    pub fn notifications(&self) -> &NotificationRelay {
        &self.notifications
    }
}
