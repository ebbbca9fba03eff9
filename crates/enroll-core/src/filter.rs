//! Catalog filtering by search text and category.

use enroll_model::CatalogEntry;

/// Filter a catalog by search text and category.
///
/// An entry is kept when it is in `category` (or `category` is empty) and its
/// name contains `search_text` case-insensitively (or the search is empty).
/// The search is used as typed, whitespace included. Catalog order is kept.
pub fn filter<'a>(
    catalog: &'a [CatalogEntry],
    search_text: &str,
    category: &str,
) -> Vec<&'a CatalogEntry> {
    let needle = search_text.to_lowercase();
    catalog
        .iter()
        .filter(|entry| matches(entry, &needle, category))
        .collect()
}

fn matches(entry: &CatalogEntry, needle: &str, category: &str) -> bool {
    matches_category(entry, category) && matches_search(entry, needle)
}

fn matches_category(entry: &CatalogEntry, category: &str) -> bool {
    category.is_empty() || entry.category == category
}

/// `needle` must already be lowercased.
fn matches_search(entry: &CatalogEntry, needle: &str) -> bool {
    needle.is_empty() || entry.name.to_lowercase().contains(needle)
}

/// Current search text and category facet.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterState {
    pub search_text: String,
    pub selected_category: Option<String>,
}

impl FilterState {
    pub fn set_search(&mut self, text: impl Into<String>) {
        self.search_text = text.into();
    }

    /// Set the category facet. An empty name clears it.
    pub fn set_category(&mut self, category: Option<String>) {
        self.selected_category = category.filter(|c| !c.is_empty());
    }

    /// Reset both predicates.
    pub fn clear(&mut self) {
        self.search_text.clear();
        self.selected_category = None;
    }

    pub fn has_search(&self) -> bool {
        !self.search_text.is_empty()
    }

    /// Whether any predicate narrows the catalog.
    pub fn is_active(&self) -> bool {
        self.has_search() || self.selected_category.is_some()
    }

    pub fn category(&self) -> &str {
        self.selected_category.as_deref().unwrap_or_default()
    }

    pub fn apply<'a>(&self, catalog: &'a [CatalogEntry]) -> Vec<&'a CatalogEntry> {
        filter(catalog, &self.search_text, self.category())
    }

    /// Positions of the matching entries within `catalog`.
    pub fn matching_indices(&self, catalog: &[CatalogEntry]) -> Vec<usize> {
        let needle = self.search_text.to_lowercase();
        let category = self.category();
        catalog
            .iter()
            .enumerate()
            .filter(|(_, entry)| matches(entry, &needle, category))
            .map(|(index, _)| index)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Utc};
    use enroll_model::CourseId;

    fn entry(id: &str, name: &str, category: &str) -> CatalogEntry {
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

    fn ids(entries: &[&CatalogEntry]) -> Vec<String> {
        entries.iter().map(|e| e.id.to_string()).collect()
    }

    fn catalog() -> Vec<CatalogEntry> {
        vec![
            entry("c1", "Algebra I", "Mathematics"),
            entry("c2", "Algebra II", "Mathematics"),
            entry("c3", "Linear Algebra", "Electives"),
            entry("c4", "Biology", "Science"),
        ]
    }

    #[test]
    fn empty_filter_returns_full_catalog() {
        let catalog = catalog();
        assert_eq!(ids(&filter(&catalog, "", "")), vec!["c1", "c2", "c3", "c4"]);
    }

    #[test]
    fn search_is_case_insensitive_substring() {
        let catalog = catalog();
        assert_eq!(ids(&filter(&catalog, "ALGEBRA", "")), vec!["c1", "c2", "c3"]);
        assert_eq!(ids(&filter(&catalog, "bra i", "")), vec!["c1", "c2"]);
    }

    #[test]
    fn category_and_search_combine() {
        let catalog = catalog();
        assert_eq!(
            ids(&filter(&catalog, "algebra", "Mathematics")),
            vec!["c1", "c2"]
        );
        assert!(filter(&catalog, "biology", "Mathematics").is_empty());
    }

    #[test]
    fn no_fuzzy_matching() {
        let catalog = catalog();
        assert!(filter(&catalog, "algbra", "").is_empty());
    }

    #[test]
    fn whitespace_in_search_is_significant() {
        let catalog = catalog();
        assert!(filter(&catalog, "algebra ", "").is_empty());
        assert_eq!(ids(&filter(&catalog, "linear ", "")), vec!["c3"]);

        let mut state = FilterState::default();
        state.set_search("   ");
        assert!(state.has_search());
        assert!(state.apply(&catalog).is_empty());
        assert!(state.matching_indices(&catalog).is_empty());
    }

    #[test]
    fn empty_category_clears_facet() {
        let mut state = FilterState::default();
        state.set_category(Some("Science".to_string()));
        assert!(state.is_active());
        state.set_category(Some(String::new()));
        assert_eq!(state.selected_category, None);
        assert!(!state.is_active());
    }
}
