//! Interface to the hosted data store.
//!
//! The backend is an external collaborator: this crate only consumes its
//! operations as opaque async calls and never depends on how they are carried
//! out.

use std::sync::Arc;

use async_trait::async_trait;
use enroll_model::{CatalogEntry, CourseId, EnrollmentRecord, InsertReceipt};

use crate::error::{BackendError, InsertError, LoadError};

/// Operations consumed from the hosted backend.
#[async_trait]
pub trait EnrollmentBackend: Send + Sync {
    /// Read the reference course catalog.
    async fn load_catalog(&self) -> Result<Vec<CatalogEntry>, LoadError>;

    /// Insert an enrollment record.
    ///
    /// This call is raced against the submission deadline and need not
    /// support cancellation.
    async fn insert_enrollment(&self, record: EnrollmentRecord)
    -> Result<InsertReceipt, InsertError>;

    /// Bump the popularity score of a catalog entry. Best effort.
    async fn increment_popularity(&self, id: &CourseId) -> Result<(), BackendError>;
}

/// Backend handle shared between controllers and detached tasks.
pub type SharedBackend = Arc<dyn EnrollmentBackend>;
