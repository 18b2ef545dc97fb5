use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::api::types::CorrectnessEncoding;
use crate::study::StudyMode;

pub const API_BASE_URL_ENV: &str = "NARAT_API_BASE_URL";

pub const SUPPORTED_LOCALES: &[&str] = &["ko", "en"];

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    #[serde(default = "default_page_size")]
    pub page_size: u32,
    #[serde(default)]
    pub study_mode: StudyMode,
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,
    #[serde(default = "default_poll_max_attempts")]
    pub poll_max_attempts: u32,
    #[serde(default)]
    pub correctness_encoding: CorrectnessEncoding,
    #[serde(default = "default_history_limit")]
    pub history_limit: u32,
    #[serde(default = "default_theme")]
    pub theme: String,
    #[serde(default = "default_locale")]
    pub locale: String,
    #[serde(default = "default_log_filter")]
    pub log_filter: String,
}

fn default_api_base_url() -> String {
    "http://localhost:8000".to_string()
}
fn default_request_timeout_secs() -> u64 {
    10
}
fn default_page_size() -> u32 {
    10
}
fn default_poll_interval_secs() -> u64 {
    5
}
fn default_poll_max_attempts() -> u32 {
    10
}
fn default_history_limit() -> u32 {
    20
}
fn default_theme() -> String {
    "catppuccin-mocha".to_string()
}
fn default_locale() -> String {
    "ko".to_string()
}
fn default_log_filter() -> String {
    "narat=info".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            request_timeout_secs: default_request_timeout_secs(),
            page_size: default_page_size(),
            study_mode: StudyMode::default(),
            poll_interval_secs: default_poll_interval_secs(),
            poll_max_attempts: default_poll_max_attempts(),
            correctness_encoding: CorrectnessEncoding::default(),
            history_limit: default_history_limit(),
            theme: default_theme(),
            locale: default_locale(),
            log_filter: default_log_filter(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let path = Self::config_path();
        if path.exists() {
            let content = fs::read_to_string(&path)?;
            let mut config: Config = toml::from_str(&content)?;
            config.validate();
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        let path = Self::config_path();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        fs::write(&path, content)?;
        Ok(())
    }

    fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("narat")
            .join("config.toml")
    }

    /// Clamp numeric settings into usable ranges and reset unknown values.
    /// Call after deserialization; hand-edited files are not trusted.
    pub fn validate(&mut self) {
        self.page_size = self.page_size.clamp(1, 50);
        self.request_timeout_secs = self.request_timeout_secs.clamp(1, 120);
        self.poll_interval_secs = self.poll_interval_secs.clamp(1, 60);
        self.poll_max_attempts = self.poll_max_attempts.clamp(1, 30);
        self.history_limit = self.history_limit.clamp(1, 100);
        if !SUPPORTED_LOCALES.contains(&self.locale.as_str()) {
            self.locale = default_locale();
        }
        let trimmed = self.api_base_url.trim().trim_end_matches('/');
        self.api_base_url = if trimmed.is_empty() {
            default_api_base_url()
        } else {
            trimmed.to_string()
        };
    }

    /// Apply the base URL from the environment (or a CLI flag), if any.
    pub fn apply_base_url_override(&mut self, value: Option<String>) {
        if let Some(url) = value.filter(|v| !v.trim().is_empty()) {
            self.api_base_url = url;
            self.validate();
        }
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_serde_defaults_from_empty() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.api_base_url, "http://localhost:8000");
        assert_eq!(config.page_size, 10);
        assert_eq!(config.poll_interval_secs, 5);
        assert_eq!(config.poll_max_attempts, 10);
        assert_eq!(config.study_mode, StudyMode::Choice);
        assert_eq!(config.correctness_encoding, CorrectnessEncoding::Boolean);
        assert_eq!(config.locale, "ko");
    }

    #[test]
    fn test_config_partial_file_keeps_other_defaults() {
        let toml_str = r#"
api_base_url = "https://narat.example.com/"
study_mode = "typed"
correctness_encoding = "zero-is-correct"
"#;
        let mut config: Config = toml::from_str(toml_str).unwrap();
        config.validate();
        assert_eq!(config.api_base_url, "https://narat.example.com");
        assert_eq!(config.study_mode, StudyMode::Typed);
        assert_eq!(
            config.correctness_encoding,
            CorrectnessEncoding::ZeroIsCorrect
        );
        assert_eq!(config.page_size, 10);
    }

    #[test]
    fn test_config_serde_roundtrip() {
        let config = Config::default();
        let serialized = toml::to_string_pretty(&config).unwrap();
        let deserialized: Config = toml::from_str(&serialized).unwrap();
        assert_eq!(config.api_base_url, deserialized.api_base_url);
        assert_eq!(config.poll_max_attempts, deserialized.poll_max_attempts);
        assert_eq!(config.theme, deserialized.theme);
    }

    #[test]
    fn test_validate_clamps_values() {
        let mut config = Config::default();
        config.page_size = 0;
        config.poll_max_attempts = 500;
        config.locale = "fr".to_string();
        config.api_base_url = "   ".to_string();
        config.validate();
        assert_eq!(config.page_size, 1);
        assert_eq!(config.poll_max_attempts, 30);
        assert_eq!(config.locale, "ko");
        assert_eq!(config.api_base_url, "http://localhost:8000");
    }

    #[test]
    fn test_base_url_override() {
        let mut config = Config::default();
        config.apply_base_url_override(None);
        assert_eq!(config.api_base_url, "http://localhost:8000");
        config.apply_base_url_override(Some(String::new()));
        assert_eq!(config.api_base_url, "http://localhost:8000");
        config.apply_base_url_override(Some("http://10.0.0.2:9000/".to_string()));
        assert_eq!(config.api_base_url, "http://10.0.0.2:9000");
    }
}
