//! Application settings - persisted user preferences.
//!
//! Settings are stored as TOML in the user's config directory. Loading never
//! fails: a missing or unreadable file yields the defaults.

use std::path::{Path, PathBuf};
use std::time::Duration;

use enroll_model::StudentId;
use serde::{Deserialize, Serialize};

use crate::error::SettingsError;
use crate::submission::DEFAULT_DEADLINE;

// =============================================================================
// ROOT SETTINGS
// =============================================================================

/// Application settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Who enrollments are recorded for.
    pub student: StudentSettings,

    /// Submission behavior.
    pub submission: SubmissionSettings,

    /// Notification behavior.
    pub notifications: NotificationSettings,

    /// Local data store used by the command-line client.
    pub store: StoreSettings,
}

impl Settings {
    /// Load settings from a specific path, falling back to defaults.
    pub fn load_from(path: &Path) -> Self {
        match Self::try_load_from(path) {
            Ok(settings) => settings,
            Err(SettingsError::Read { source, .. })
                if source.kind() == std::io::ErrorKind::NotFound =>
            {
                Self::default()
            }
            Err(err) => {
                tracing::warn!(error = %err, "Using default settings");
                Self::default()
            }
        }
    }

    /// Load settings from a specific path.
    pub fn try_load_from(path: &Path) -> Result<Self, SettingsError> {
        let content = std::fs::read_to_string(path).map_err(|source| SettingsError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| SettingsError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Save settings to a specific path.
    pub fn save_to(&self, path: &Path) -> Result<(), SettingsError> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|source| SettingsError::Write {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        let content = self.to_toml()?;
        std::fs::write(path, content).map_err(|source| SettingsError::Write {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn to_toml(&self) -> Result<String, SettingsError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Get the default config file path.
    pub fn config_path() -> PathBuf {
        directories::ProjectDirs::from("com", "CourseEnrollmentStudio", "CES")
            .map(|dirs| dirs.config_dir().join("settings.toml"))
            .unwrap_or_else(|| PathBuf::from("settings.toml"))
    }

    /// Default directory for the local data store.
    pub fn default_data_dir() -> PathBuf {
        directories::ProjectDirs::from("com", "CourseEnrollmentStudio", "CES")
            .map(|dirs| dirs.data_dir().to_path_buf())
            .unwrap_or_else(|| PathBuf::from("data"))
    }

    /// The configured student, if any.
    pub fn student_id(&self) -> Result<StudentId, SettingsError> {
        StudentId::new(self.student.id.as_str()).map_err(|_| SettingsError::MissingStudentId)
    }

    /// Data directory, falling back to the platform default.
    pub fn data_dir(&self) -> PathBuf {
        self.store
            .data_dir
            .clone()
            .unwrap_or_else(Self::default_data_dir)
    }
}

// =============================================================================
// SECTIONS
// =============================================================================

/// Student identity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StudentSettings {
    pub id: String,
}

/// Submission settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SubmissionSettings {
    /// Seconds to wait for the backend before reporting a timeout.
    pub deadline_secs: u64,
}

impl Default for SubmissionSettings {
    fn default() -> Self {
        Self {
            deadline_secs: DEFAULT_DEADLINE.as_secs(),
        }
    }
}

impl SubmissionSettings {
    /// The deadline, never shorter than one second.
    pub fn deadline(&self) -> Duration {
        Duration::from_secs(self.deadline_secs.max(1))
    }
}

/// Notification settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotificationSettings {
    /// Hide notifications after this many seconds. Zero keeps them until
    /// dismissed.
    pub auto_dismiss_secs: u64,
}

impl NotificationSettings {
    pub fn auto_dismiss(&self) -> Option<Duration> {
        (self.auto_dismiss_secs > 0).then(|| Duration::from_secs(self.auto_dismiss_secs))
    }
}

/// Local store settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreSettings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,
}
