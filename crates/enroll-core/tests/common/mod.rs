//! Shared fixtures for session and submission tests.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use enroll_core::model::{
    CatalogEntry, CourseId, Draft, EnrollmentRecord, InsertReceipt, StudentId,
};
use enroll_core::{BackendError, EnrollmentBackend, InsertError, LoadError, SharedBackend};

/// How the fake backend answers inserts.
#[derive(Debug, Clone)]
pub enum InsertBehavior {
    Succeed,
    Fail(String),
    /// Never resolves.
    Hang,
    /// Succeeds after the given delay.
    SucceedAfter(Duration),
}

/// In-memory backend that records every call.
pub struct FakeBackend {
    catalog: Result<Vec<CatalogEntry>, LoadError>,
    behavior: Mutex<InsertBehavior>,
    insert_calls: AtomicUsize,
    inserts_finished: AtomicUsize,
    records: Mutex<Vec<EnrollmentRecord>>,
    popularity: Mutex<Vec<CourseId>>,
}

impl FakeBackend {
    pub fn new(catalog: Vec<CatalogEntry>, behavior: InsertBehavior) -> Arc<Self> {
        Arc::new(Self::build(Ok(catalog), behavior))
    }

    pub fn failing_catalog(reason: &str) -> Arc<Self> {
        Arc::new(Self::build(Err(LoadError::new(reason)), InsertBehavior::Succeed))
    }

    fn build(catalog: Result<Vec<CatalogEntry>, LoadError>, behavior: InsertBehavior) -> Self {
        Self {
            catalog,
            behavior: Mutex::new(behavior),
            insert_calls: AtomicUsize::new(0),
            inserts_finished: AtomicUsize::new(0),
            records: Mutex::new(Vec::new()),
            popularity: Mutex::new(Vec::new()),
        }
    }

    pub fn set_behavior(&self, behavior: InsertBehavior) {
        *self.behavior.lock().unwrap() = behavior;
    }

    pub fn insert_calls(&self) -> usize {
        self.insert_calls.load(Ordering::SeqCst)
    }

    /// Inserts that ran to completion, including ones that lost the race.
    pub fn inserts_finished(&self) -> usize {
        self.inserts_finished.load(Ordering::SeqCst)
    }

    pub fn records(&self) -> Vec<EnrollmentRecord> {
        self.records.lock().unwrap().clone()
    }

    pub fn popularity_increments(&self) -> Vec<CourseId> {
        self.popularity.lock().unwrap().clone()
    }
}

#[async_trait]
impl EnrollmentBackend for FakeBackend {
    async fn load_catalog(&self) -> Result<Vec<CatalogEntry>, LoadError> {
        self.catalog.clone()
    }

    async fn insert_enrollment(
        &self,
        record: EnrollmentRecord,
    ) -> Result<InsertReceipt, InsertError> {
        let call = self.insert_calls.fetch_add(1, Ordering::SeqCst) + 1;
        self.records.lock().unwrap().push(record);
        let behavior = self.behavior.lock().unwrap().clone();
        let result = match behavior {
            InsertBehavior::Succeed => Ok(receipt(call)),
            InsertBehavior::Fail(message) => Err(InsertError::new(message)),
            InsertBehavior::Hang => std::future::pending().await,
            InsertBehavior::SucceedAfter(delay) => {
                tokio::time::sleep(delay).await;
                Ok(receipt(call))
            }
        };
        self.inserts_finished.fetch_add(1, Ordering::SeqCst);
        result
    }

    async fn increment_popularity(&self, id: &CourseId) -> Result<(), BackendError> {
        self.popularity.lock().unwrap().push(id.clone());
        Ok(())
    }
}

fn receipt(call: usize) -> InsertReceipt {
    InsertReceipt {
        id: format!("enrollment-{call}"),
    }
}

pub fn shared(backend: &Arc<FakeBackend>) -> SharedBackend {
    Arc::clone(backend) as SharedBackend
}

pub fn entry(id: &str, name: &str, category: &str) -> CatalogEntry {
    CatalogEntry {
        id: CourseId::new(id).unwrap(),
        name: name.to_string(),
        category: category.to_string(),
        is_semester: false,
        recommended_grade_levels: Default::default(),
        popularity_score: 0,
        created_at: DateTime::<Utc>::UNIX_EPOCH,
    }
}

pub fn student() -> StudentId {
    StudentId::new("student-1").unwrap()
}

/// A draft that passes validation.
pub fn valid_draft() -> Draft {
    Draft {
        name: "Algebra I".to_string(),
        academic_year: "2024-2025".to_string(),
        ..Draft::default()
    }
}

/// Let detached tasks run.
pub async fn settle_background() {
    for _ in 0..10 {
        tokio::task::yield_now().await;
    }
}
