//! Live-stream metadata types

use crate::error::LiveError;
use serde::{Deserialize, Serialize};

/// Locales the live-stream metadata is maintained for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    Pt,
    Es,
}

impl Locale {
    /// Every known locale, in serving order
    pub const ALL: [Locale; 2] = [Locale::Pt, Locale::Es];

    pub fn as_str(&self) -> &'static str {
        match self {
            Locale::Pt => "pt",
            Locale::Es => "es",
        }
    }
}

impl std::fmt::Display for Locale {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Locale {
    type Err = LiveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pt" => Ok(Locale::Pt),
            "es" => Ok(Locale::Es),
            other => Err(LiveError::UnknownLocale(other.to_string())),
        }
    }
}

/// Live-stream metadata for one locale
///
/// The zero value (stream disabled, empty strings) is the canonical
/// "nothing configured" state; a missing record anywhere deserializes
/// to it rather than surfacing a missing-key error.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LiveRecord {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub title: String,
    // Wire name kept from the consuming front-end contract
    #[serde(rename = "videoID", default)]
    pub video_id: String,
    #[serde(default)]
    pub description: String,
}

/// Partial update for a [`LiveRecord`]; unset fields are left unchanged
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LivePatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(rename = "videoID", default, skip_serializing_if = "Option::is_none")]
    pub video_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl LivePatch {
    /// Merge the set fields into `record`
    pub fn apply(&self, record: &mut LiveRecord) {
        if let Some(enabled) = self.enabled {
            record.enabled = enabled;
        }
        if let Some(title) = &self.title {
            record.title = title.clone();
        }
        if let Some(video_id) = &self.video_id {
            record.video_id = video_id.clone();
        }
        if let Some(description) = &self.description {
            record.description = description.clone();
        }
    }

    pub fn is_empty(&self) -> bool {
        self.enabled.is_none()
            && self.title.is_none()
            && self.video_id.is_none()
            && self.description.is_none()
    }
}

/// The full locale -> record map, also the persisted single-blob layout
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LiveData {
    #[serde(default)]
    pub pt: LiveRecord,
    #[serde(default)]
    pub es: LiveRecord,
}

impl LiveData {
    pub fn get(&self, locale: Locale) -> &LiveRecord {
        match locale {
            Locale::Pt => &self.pt,
            Locale::Es => &self.es,
        }
    }

    pub fn get_mut(&mut self, locale: Locale) -> &mut LiveRecord {
        match locale {
            Locale::Pt => &mut self.pt,
            Locale::Es => &mut self.es,
        }
    }

    pub fn set(&mut self, locale: Locale, record: LiveRecord) {
        *self.get_mut(locale) = record;
    }
}

/// Deployment environment the service was started in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Production,
    Development,
}

impl Environment {
    /// Parse from the `APP_ENV` convention; anything but "production"
    /// is treated as development.
    pub fn from_env_value(value: &str) -> Self {
        if value.eq_ignore_ascii_case("production") {
            Environment::Production
        } else {
            Environment::Development
        }
    }
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Production => write!(f, "production"),
            Environment::Development => write!(f, "development"),
        }
    }
}

/// Which persistence backend is serving reads and writes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    Database,
    File,
    Memory,
}

impl std::fmt::Display for BackendKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BackendKind::Database => write!(f, "database"),
            BackendKind::File => write!(f, "file"),
            BackendKind::Memory => write!(f, "memory"),
        }
    }
}

/// Snapshot of the data-access layer's backend situation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StorageStatus {
    pub environment: Environment,
    pub backend: BackendKind,
    /// Whether the relational backend answered its liveness probe at startup
    pub database_available: bool,
    /// Set when a primary-backend write failed and the in-process
    /// fallback record absorbed it
    pub degraded: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn locale_round_trips_through_str() {
        for locale in Locale::ALL {
            assert_eq!(locale.as_str().parse::<Locale>().unwrap(), locale);
        }
        assert!("de".parse::<Locale>().is_err());
    }

    #[test]
    fn record_zero_value_is_disabled_and_empty() {
        let record = LiveRecord::default();
        assert!(!record.enabled);
        assert!(record.title.is_empty());
        assert!(record.video_id.is_empty());
        assert!(record.description.is_empty());
    }

    #[test]
    fn record_uses_video_id_wire_name() {
        let record = LiveRecord {
            enabled: true,
            title: "Culto".to_string(),
            video_id: "abc123".to_string(),
            description: String::new(),
        };
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["videoID"], "abc123");
        assert!(json.get("video_id").is_none());

        let back: LiveRecord = serde_json::from_value(json).unwrap();
        assert_eq!(back, record);
    }

    #[test]
    fn patch_merges_only_set_fields() {
        let mut record = LiveRecord {
            enabled: false,
            title: "old".to_string(),
            video_id: "keep".to_string(),
            description: "keep".to_string(),
        };
        let patch = LivePatch {
            enabled: Some(true),
            title: Some("new".to_string()),
            ..Default::default()
        };
        patch.apply(&mut record);

        assert!(record.enabled);
        assert_eq!(record.title, "new");
        assert_eq!(record.video_id, "keep");
        assert_eq!(record.description, "keep");
    }

    #[test]
    fn patch_apply_is_idempotent() {
        let mut once = LiveRecord::default();
        let patch = LivePatch {
            title: Some("Culto".to_string()),
            enabled: Some(true),
            ..Default::default()
        };
        patch.apply(&mut once);
        let mut twice = once.clone();
        patch.apply(&mut twice);
        assert_eq!(once, twice);
    }

    #[test]
    fn live_data_tolerates_missing_locales() {
        let data: LiveData = serde_json::from_str(r#"{"pt":{"enabled":true}}"#).unwrap();
        assert!(data.pt.enabled);
        assert_eq!(data.es, LiveRecord::default());
    }

    #[test]
    fn environment_parses_loosely() {
        assert_eq!(
            Environment::from_env_value("Production"),
            Environment::Production
        );
        assert_eq!(
            Environment::from_env_value("staging"),
            Environment::Development
        );
    }
}
