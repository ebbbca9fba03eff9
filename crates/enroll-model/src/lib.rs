//! Data model for course enrollment.
//!
//! - [`CatalogEntry`]: reference course records loaded from the backend
//! - [`Draft`]: the enrollment form being composed
//! - [`EnrollmentRecord`]: the insert payload built from a validated draft

pub mod catalog;
pub mod enrollment;
pub mod error;
pub mod ids;

pub use catalog::CatalogEntry;
pub use enrollment::{Draft, DraftField, EnrollmentRecord, InsertReceipt, Semester};
pub use error::{ModelError, Result};
pub use ids::{CourseId, StudentId};
