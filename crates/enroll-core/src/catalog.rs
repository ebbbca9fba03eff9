//! Catalog store.
//!
//! Holds the reference course list for the session plus the lookups derived
//! from it. Category counts always come from the full catalog, never from a
//! filtered subset.

use enroll_model::{CatalogEntry, CourseId};

use crate::backend::EnrollmentBackend;
use crate::error::LoadError;

/// Loaded reference catalog.
#[derive(Debug, Default)]
pub struct CatalogStore {
    entries: Vec<CatalogEntry>,
    loading: bool,
    last_error: Option<LoadError>,
}

impl CatalogStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from already-fetched entries.
    pub fn from_entries(entries: Vec<CatalogEntry>) -> Self {
        Self {
            entries,
            ..Self::default()
        }
    }

    /// Load the catalog from the backend.
    ///
    /// Returns the number of entries loaded. On failure the catalog is left
    /// empty and the error is kept in [`Self::last_error`]. There is no retry.
    pub async fn load(&mut self, backend: &dyn EnrollmentBackend) -> Result<usize, LoadError> {
        self.begin_load();
        let result = backend.load_catalog().await;
        self.finish_load(result)
    }

    /// Mark a load as started.
    pub fn begin_load(&mut self) {
        self.loading = true;
        self.last_error = None;
    }

    /// Apply the result of a catalog fetch.
    pub fn finish_load(
        &mut self,
        result: Result<Vec<CatalogEntry>, LoadError>,
    ) -> Result<usize, LoadError> {
        self.loading = false;
        match result {
            Ok(entries) => {
                self.entries = entries;
                tracing::info!(
                    entries = self.entries.len(),
                    categories = self.categories().len(),
                    "Loaded course catalog"
                );
                Ok(self.entries.len())
            }
            Err(err) => {
                tracing::warn!(error = %err, "Catalog load failed");
                self.entries.clear();
                self.last_error = Some(err.clone());
                Err(err)
            }
        }
    }

    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[inline]
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Error from the most recent load, if it failed.
    pub fn last_error(&self) -> Option<&LoadError> {
        self.last_error.as_ref()
    }

    /// Look up an entry by id.
    pub fn get(&self, id: &CourseId) -> Option<&CatalogEntry> {
        self.entries.iter().find(|entry| &entry.id == id)
    }

    /// Distinct categories in order of first appearance.
    pub fn categories(&self) -> Vec<&str> {
        let mut seen: Vec<&str> = Vec::new();
        for entry in &self.entries {
            if !seen.contains(&entry.category.as_str()) {
                seen.push(&entry.category);
            }
        }
        seen
    }

    /// Number of entries in a category.
    pub fn category_count(&self, category: &str) -> usize {
        self.entries
            .iter()
            .filter(|entry| entry.category == category)
            .count()
    }

    /// Categories paired with their entry counts, in order of first appearance.
    pub fn category_counts(&self) -> Vec<(&str, usize)> {
        self.categories()
            .into_iter()
            .map(|category| (category, self.category_count(category)))
            .collect()
    }
}
