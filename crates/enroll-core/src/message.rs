//! Message hierarchy for the enrollment session.
//!
//! All user interactions and background results flow through [`Message`].
//! The presentation layer sends these to
//! [`EnrollmentSession::update`](crate::session::EnrollmentSession::update).

use std::time::Instant;

use enroll_model::{CatalogEntry, CourseId, DraftField};

use crate::error::LoadError;
use crate::submission::Resolution;

/// Root message enum for the session.
#[derive(Debug, Clone)]
pub enum Message {
    // =========================================================================
    // Catalog
    // =========================================================================
    /// Catalog fetch completed
    CatalogLoaded(Result<Vec<CatalogEntry>, LoadError>),

    // =========================================================================
    // Filtering
    // =========================================================================
    /// User typed in the search box
    SearchChanged(String),

    /// User picked a category facet (`None` or empty for all categories)
    CategorySelected(Option<String>),

    /// User cleared search and category
    ClearFilters,

    // =========================================================================
    // Draft
    // =========================================================================
    /// User picked a course from the filtered results
    CourseSelected(CourseId),

    /// User edited a single draft field
    DraftChanged(DraftField),

    /// Form was closed or reset
    ResetDraft,

    // =========================================================================
    // Submission
    // =========================================================================
    /// Form submitted
    Submit,

    /// Insert-vs-deadline race finished
    SubmitResolved(Resolution),

    // =========================================================================
    // Notifications
    // =========================================================================
    /// User acknowledged the notification
    DismissNotification,

    /// Periodic tick: applies abandoned submissions and auto-dismisses
    /// notifications
    Tick(Instant),
}
