//! File-backed enrollment backend.
//!
//! A store is a directory holding two JSON documents:
//!
//! - `catalog.json`: the reference course list (array of catalog entries)
//! - `enrollments.json`: every recorded enrollment, created on first insert
//!
//! File I/O runs on the blocking thread pool. Writes go through a temp file
//! and a rename, and are serialized by a single lock per store.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use enroll_core::{BackendError, EnrollmentBackend, InsertError, LoadError};
use enroll_model::{CatalogEntry, CourseId, EnrollmentRecord, InsertReceipt};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::Mutex;

pub const CATALOG_FILE: &str = "catalog.json";
pub const ENROLLMENTS_FILE: &str = "enrollments.json";

/// Store operation error.
#[derive(Debug, Error)]
pub enum StoreError {
    /// File I/O error.
    #[error("Failed to {operation} file: {path}")]
    Io {
        operation: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A document did not parse or serialize.
    #[error("Invalid JSON in {path}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Temp file couldn't be renamed over the target.
    #[error("Failed to complete write to {target_path}")]
    AtomicWriteFailed {
        temp_path: PathBuf,
        target_path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Course not found: {0}")]
    CourseNotFound(String),

    /// The blocking task panicked or was cancelled.
    #[error("Store task failed: {0}")]
    Task(String),
}

/// An enrollment as persisted in `enrollments.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredEnrollment {
    pub id: String,
    #[serde(flatten)]
    pub record: EnrollmentRecord,
    pub created_at: DateTime<Utc>,
}

/// JSON directory implementing [`EnrollmentBackend`].
#[derive(Debug)]
pub struct JsonStore {
    dir: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn catalog_path(&self) -> PathBuf {
        self.dir.join(CATALOG_FILE)
    }

    pub fn enrollments_path(&self) -> PathBuf {
        self.dir.join(ENROLLMENTS_FILE)
    }

    /// Catalog entries ordered by popularity, most popular first. Ties are
    /// ordered by name.
    pub async fn catalog(&self) -> Result<Vec<CatalogEntry>, StoreError> {
        let path = self.catalog_path();
        let mut entries: Vec<CatalogEntry> = blocking(move || read_json(&path)).await?;
        entries.sort_by(|a, b| {
            b.popularity_score
                .cmp(&a.popularity_score)
                .then_with(|| a.name.cmp(&b.name))
        });
        Ok(entries)
    }

    /// All stored enrollments in insertion order.
    pub async fn enrollments(&self) -> Result<Vec<StoredEnrollment>, StoreError> {
        let path = self.enrollments_path();
        blocking(move || read_json_or_default(&path)).await
    }

    /// Append an enrollment and return its generated id.
    pub async fn append_enrollment(&self, record: EnrollmentRecord) -> Result<String, StoreError> {
        let _guard = self.write_lock.lock().await;
        let path = self.enrollments_path();
        blocking(move || {
            let mut enrollments: Vec<StoredEnrollment> = read_json_or_default(&path)?;
            let id = uuid::Uuid::new_v4().to_string();
            enrollments.push(StoredEnrollment {
                id: id.clone(),
                record,
                created_at: Utc::now(),
            });
            write_json(&path, &enrollments)?;
            Ok(id)
        })
        .await
    }

    /// Add one to a course's popularity score. Returns the new score.
    pub async fn bump_popularity(&self, id: &CourseId) -> Result<u64, StoreError> {
        let _guard = self.write_lock.lock().await;
        let path = self.catalog_path();
        let id = id.clone();
        blocking(move || {
            let mut entries: Vec<CatalogEntry> = read_json(&path)?;
            let entry = entries
                .iter_mut()
                .find(|entry| entry.id == id)
                .ok_or_else(|| StoreError::CourseNotFound(id.to_string()))?;
            entry.popularity_score = entry.popularity_score.saturating_add(1);
            let score = entry.popularity_score;
            write_json(&path, &entries)?;
            Ok(score)
        })
        .await
    }

    /// Write a catalog document, replacing any existing one.
    pub async fn write_catalog(&self, entries: Vec<CatalogEntry>) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock().await;
        let path = self.catalog_path();
        blocking(move || write_json(&path, &entries)).await
    }
}

#[async_trait]
impl EnrollmentBackend for JsonStore {
    async fn load_catalog(&self) -> Result<Vec<CatalogEntry>, LoadError> {
        self.catalog().await.map_err(|err| LoadError::new(error_chain(&err)))
    }

    async fn insert_enrollment(
        &self,
        record: EnrollmentRecord,
    ) -> Result<InsertReceipt, InsertError> {
        let id = self
            .append_enrollment(record)
            .await
            .map_err(|err| InsertError::new(error_chain(&err)))?;
        tracing::debug!(%id, "Stored enrollment");
        Ok(InsertReceipt { id })
    }

    async fn increment_popularity(&self, id: &CourseId) -> Result<(), BackendError> {
        let score = self
            .bump_popularity(id)
            .await
            .map_err(|err| BackendError::new(error_chain(&err)))?;
        tracing::debug!(course = %id, score, "Updated popularity score");
        Ok(())
    }
}

/// Render an error with its sources, e.g. "Failed to read file: x: No such file".
fn error_chain(err: &dyn std::error::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

async fn blocking<T, F>(work: F) -> Result<T, StoreError>
where
    F: FnOnce() -> Result<T, StoreError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| StoreError::Task(e.to_string()))?
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, StoreError> {
    let bytes = fs::read(path).map_err(|e| StoreError::Io {
        operation: "read",
        path: path.to_path_buf(),
        source: e,
    })?;
    serde_json::from_slice(&bytes).map_err(|e| StoreError::Json {
        path: path.to_path_buf(),
        source: e,
    })
}

fn read_json_or_default<T: DeserializeOwned + Default>(path: &Path) -> Result<T, StoreError> {
    if !path.exists() {
        return Ok(T::default());
    }
    read_json(path)
}

fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), StoreError> {
    let bytes = serde_json::to_vec_pretty(value).map_err(|e| StoreError::Json {
        path: path.to_path_buf(),
        source: e,
    })?;

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| StoreError::Io {
            operation: "create directory",
            path: parent.to_path_buf(),
            source: e,
        })?;
    }

    let temp_path = path.with_extension("json.tmp");
    let mut file = File::create(&temp_path).map_err(|e| StoreError::Io {
        operation: "create",
        path: temp_path.clone(),
        source: e,
    })?;
    file.write_all(&bytes).map_err(|e| StoreError::Io {
        operation: "write",
        path: temp_path.clone(),
        source: e,
    })?;
    file.sync_all().map_err(|e| StoreError::Io {
        operation: "sync",
        path: temp_path.clone(),
        source: e,
    })?;

    fs::rename(&temp_path, path).map_err(|e| StoreError::AtomicWriteFailed {
        temp_path: temp_path.clone(),
        target_path: path.to_path_buf(),
        source: e,
    })
}
