use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Edit-distance thresholds used by the fuzzy matchers.
///
/// Each call site has its own limit; they were tuned by hand and are kept
/// tunable rather than baked into the matchers.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct FuzzyPolicy {
    /// Max distance between a token and a canonical delete verb
    pub verb_distance: usize,
    /// Delete verbs this short or shorter use `short_verb_distance` instead
    pub short_verb_len: usize,
    pub short_verb_distance: usize,
    /// A fuzzy delete verb must share its first letter with the canonical one
    pub verb_same_initial: bool,
    /// Real words that sit close to a delete verb and never mean delete
    pub verb_lookalikes: Vec<String>,
    /// Max distance for "note"/"notes"
    pub notes_distance: usize,
    /// Max distance for a single token against "flashcard(s)"
    pub flashcards_distance: usize,
    /// Max distance for schedule words ("schedule", "calendar", ...)
    pub schedule_distance: usize,
    /// Max distance for "everything"
    pub everything_distance: usize,
    /// Max distance for each half of a split "flash"/"card" pair
    pub flash_pair_distance: usize,
    /// Max distance when matching a topic token against record tokens
    pub record_token_distance: usize,
    /// Tokens shorter than this are only matched literally
    pub min_fuzzy_len: usize,
    /// A fuzzy-only delete verb must appear within the first N tokens
    pub fuzzy_verb_window: usize,
}

impl Default for FuzzyPolicy {
    fn default() -> Self {
        Self {
            verb_distance: 2,
            short_verb_len: 4,
            short_verb_distance: 1,
            verb_same_initial: true,
            verb_lookalikes: [
                "from", "drip", "prop", "crop", "wide", "wife", "wire", "wise", "wine", "cheap",
                "cedar", "cellar", "track", "trace", "trust", "train", "remote", "delta",
            ]
            .iter()
            .map(|w| w.to_string())
            .collect(),
            notes_distance: 1,
            flashcards_distance: 2,
            schedule_distance: 2,
            everything_distance: 2,
            flash_pair_distance: 1,
            record_token_distance: 1,
            min_fuzzy_len: 4,
            fuzzy_verb_window: 3,
        }
    }
}

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    // Storage
    pub storage_backend: String,
    pub database_path: String,

    // AI
    pub ollama_enabled: bool,
    pub ollama_url: String,
    pub ollama_model: String,
    pub ai_retries: usize,
    pub ai_complexity_threshold: f32,

    // Pipeline
    pub confirm_threshold: f32,
    pub default_flashcard_count: u32,
    pub max_create_count: u32,
    pub convert_pairs_per_note: usize,
    pub fuzzy: FuzzyPolicy,

    // Data
    pub corrections: HashMap<String, String>,

    // Meta
    pub audit_enabled: bool,
    pub audit_path: String,
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        let data_dir = dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("studymate");

        Self {
            storage_backend: "sqlite".to_string(),
            database_path: data_dir
                .join("studymate.db")
                .to_string_lossy()
                .to_string(),
            ollama_enabled: false,
            ollama_url: "http://localhost:11434".to_string(),
            ollama_model: "llama3".to_string(),
            ai_retries: 2,
            ai_complexity_threshold: 3.0,
            confirm_threshold: 0.6,
            default_flashcard_count: 5,
            max_create_count: 100,
            convert_pairs_per_note: 3,
            fuzzy: FuzzyPolicy::default(),
            corrections: HashMap::new(),
            audit_enabled: true,
            audit_path: data_dir.join("audit.log").to_string_lossy().to_string(),
            log_level: "info".to_string(),
        }
    }
}

impl Config {
    /// Load config from the default location, or create default
    pub fn load() -> Result<Self> {
        Self::load_from(&config_path())
    }

    /// Load config from an explicit path
    pub fn load_from(config_path: &Path) -> Result<Self> {
        if !config_path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(config_path)?;
        match serde_json::from_str(&content) {
            Ok(config) => Ok(config),
            Err(e) => {
                // Graceful degradation: log warning and use defaults
                tracing::warn!("⚠️ Config file corrupted or invalid, using defaults: {}", e);
                // Backup corrupt file for debugging
                let backup_path = config_path.with_extension("json.corrupt");
                let _ = std::fs::rename(config_path, &backup_path);
                Ok(Self::default())
            }
        }
    }

    /// Save config to the default location
    pub fn save(&self) -> Result<()> {
        self.save_to(&config_path())
    }

    /// Save config to an explicit path
    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(config_path, content)?;
        Ok(())
    }
}

pub fn config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("studymate")
        .join("config.json")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.storage_backend, "sqlite");
        assert_eq!(config.default_flashcard_count, 5);
        assert_eq!(config.fuzzy.verb_distance, 2);
        assert_eq!(config.fuzzy.notes_distance, 1);
        assert_eq!(config.fuzzy.short_verb_distance, 1);
        assert!(config.fuzzy.verb_lookalikes.iter().any(|w| w == "from"));
        assert!(!config.ollama_enabled);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let json = r#"{ "ollama_enabled": true, "fuzzy": { "verb_distance": 1 } }"#;
        let config: Config = serde_json::from_str(json).expect("Failed to deserialize");
        assert!(config.ollama_enabled);
        assert_eq!(config.fuzzy.verb_distance, 1);
        assert_eq!(config.fuzzy.flashcards_distance, 2);
        assert_eq!(config.max_create_count, 100);
    }

    #[test]
    fn test_config_corrupt_json_is_backed_up() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{ not valid json").expect("Failed to write");

        let config = Config::load_from(&path).expect("load should degrade gracefully");
        assert_eq!(config.confirm_threshold, 0.6);
        assert!(path.with_extension("json.corrupt").exists());
    }

    #[test]
    fn test_config_save_and_reload() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let path = dir.path().join("nested").join("config.json");

        let mut config = Config::default();
        config
            .corrections
            .insert("flaschards".to_string(), "flashcards".to_string());
        config.save_to(&path).expect("Failed to save");

        let restored = Config::load_from(&path).expect("Failed to load");
        assert_eq!(
            restored.corrections.get("flaschards").map(String::as_str),
            Some("flashcards")
        );
    }
}
