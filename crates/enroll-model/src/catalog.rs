//! Reference course records.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::CourseId;

/// A reference course from the catalog.
///
/// Catalog entries are templates for a student's own enrollment record. They
/// are loaded once per session and never modified locally.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogEntry {
    pub id: CourseId,
    pub name: String,
    pub category: String,
    /// Semester-long course (as opposed to a full academic year).
    #[serde(default)]
    pub is_semester: bool,
    #[serde(default)]
    pub recommended_grade_levels: BTreeSet<u8>,
    #[serde(default)]
    pub popularity_score: u64,
    pub created_at: DateTime<Utc>,
}

impl CatalogEntry {
    /// Lowest recommended grade level, if any.
    pub fn lowest_grade_level(&self) -> Option<u8> {
        self.recommended_grade_levels.first().copied()
    }

    /// Display label for the recommended grade levels (e.g. "9-12" or "9, 11").
    pub fn grade_levels_label(&self) -> String {
        let levels: Vec<u8> = self.recommended_grade_levels.iter().copied().collect();
        match levels.as_slice() {
            [] => "-".to_string(),
            [single] => single.to_string(),
            [first, .., last]
                if levels.windows(2).all(|pair| pair[1] == pair[0] + 1) =>
            {
                format!("{first}-{last}")
            }
            _ => levels
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(", "),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(levels: &[u8]) -> CatalogEntry {
        CatalogEntry {
            id: CourseId::new("c1").unwrap(),
            name: "Algebra I".to_string(),
            category: "Mathematics".to_string(),
            is_semester: false,
            recommended_grade_levels: levels.iter().copied().collect(),
            popularity_score: 0,
            created_at: DateTime::<Utc>::UNIX_EPOCH,
        }
    }

    #[test]
    fn grade_levels_label_collapses_ranges() {
        assert_eq!(entry(&[]).grade_levels_label(), "-");
        assert_eq!(entry(&[10]).grade_levels_label(), "10");
        assert_eq!(entry(&[9, 10, 11, 12]).grade_levels_label(), "9-12");
        assert_eq!(entry(&[9, 11]).grade_levels_label(), "9, 11");
    }

    #[test]
    fn deserializes_camel_case_fields() {
        let json = r#"{
            "id": "c1",
            "name": "Algebra I",
            "category": "Mathematics",
            "isSemester": true,
            "recommendedGradeLevels": [10, 9],
            "popularityScore": 4,
            "createdAt": "2024-08-01T00:00:00Z"
        }"#;
        let parsed: CatalogEntry = serde_json::from_str(json).expect("parse entry");
        assert!(parsed.is_semester);
        assert_eq!(parsed.lowest_grade_level(), Some(9));
        assert_eq!(parsed.popularity_score, 4);
    }
}
