//! Course selection and enrollment submission.
//!
//! This crate holds the stateful core behind the enrollment form:
//!
//! - **Catalog** (`catalog`): the loaded reference course list and category counts
//! - **Filter** (`filter`): search text and category narrowing
//! - **Selection** (`selection`): pre-filling the draft from a catalog entry
//! - **Submission** (`submission`): validation and the deadline-bounded insert
//! - **Notifications** (`notification`): the single-slot result surface
//! - **Session** (`session`): Elm-style message handling tying them together
//!
//! The hosted backend is consumed through the [`EnrollmentBackend`] trait.
//!
//! # Example
//!
//! ```ignore
//! let (mut session, startup) = EnrollmentSession::new(backend, config);
//! session.drive(startup).await;
//!
//! let task = session.update(Message::SearchChanged("algebra".into()));
//! session.drive(task).await;
//! ```

pub mod backend;
pub mod catalog;
pub mod error;
pub mod filter;
pub mod message;
pub mod notification;
pub mod selection;
pub mod session;
pub mod settings;
pub mod submission;
pub mod task;

pub use backend::{EnrollmentBackend, SharedBackend};
pub use catalog::CatalogStore;
pub use error::{
    BackendError, EnrollError, ErrorCategory, FieldIssue, InsertError, LoadError, SettingsError,
    SubmitRejected, TimeoutError, ValidationError,
};
pub use filter::{FilterState, filter};
pub use message::Message;
pub use notification::{Notification, NotificationKind, NotificationRelay};
pub use selection::SelectionController;
pub use session::{EnrollmentSession, SessionConfig};
pub use settings::Settings;
pub use submission::{
    PendingSubmission, RaceOutcome, Resolution, SubmissionController, SubmissionState,
    SubmitOutcome,
};
pub use task::Task;

pub use enroll_model as model;
