//! Configuration management for docsight.
//!
//! Settings come from built-in defaults, an optional TOML file, and
//! environment variables, in increasing priority. They are loaded once at
//! process start and never mutated afterwards.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use crate::llm::AiConfig;

/// Default upload limit (10 MiB).
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Errors loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid config file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

/// HTTP server settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Largest accepted upload, in bytes
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_max_upload_bytes() -> usize {
    DEFAULT_MAX_UPLOAD_BYTES
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            max_upload_bytes: default_max_upload_bytes(),
        }
    }
}

/// Text extraction settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractionConfig {
    /// Tesseract language code (e.g. "eng", "deu")
    #[serde(default = "default_ocr_language")]
    pub ocr_language: String,
    #[serde(default = "default_pdftotext_command")]
    pub pdftotext_command: String,
    #[serde(default = "default_tesseract_command")]
    pub tesseract_command: String,
    /// Bound on a single adapter invocation
    #[serde(default = "default_extraction_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_ocr_language() -> String {
    "eng".to_string()
}

fn default_pdftotext_command() -> String {
    "pdftotext".to_string()
}

fn default_tesseract_command() -> String {
    "tesseract".to_string()
}

fn default_extraction_timeout_secs() -> u64 {
    120
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            ocr_language: default_ocr_language(),
            pdftotext_command: default_pdftotext_command(),
            tesseract_command: default_tesseract_command(),
            timeout_secs: default_extraction_timeout_secs(),
        }
    }
}

impl ExtractionConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Process-wide settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub extraction: ExtractionConfig,
    #[serde(default)]
    pub ai: AiConfig,
}

impl Settings {
    /// Load settings from `path` (or the default location) plus the environment.
    ///
    /// An explicit path must exist; the default location is optional.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let settings = match path {
            Some(path) => Self::from_file(&expand_path(path))?,
            None => match default_config_path().filter(|p| p.exists()) {
                Some(path) => Self::from_file(&path)?,
                None => Self::default(),
            },
        };
        Ok(settings.with_env_overrides())
    }

    /// Parse a TOML config file. Missing sections fall back to defaults.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Apply environment variable overrides.
    ///
    /// Supported env vars (besides the `GEMINI_*` ones handled by [`AiConfig`]):
    /// - `DOCSIGHT_HOST`: Bind host
    /// - `DOCSIGHT_PORT` (or `PORT`): Bind port
    /// - `DOCSIGHT_MAX_UPLOAD_BYTES`: Upload limit
    /// - `DOCSIGHT_OCR_LANGUAGE`: Tesseract language
    /// - `DOCSIGHT_EXTRACTION_TIMEOUT_SECS`: Adapter timeout
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides_from(|name| std::env::var(name).ok())
    }

    /// Apply overrides from an arbitrary variable lookup.
    pub fn with_overrides_from(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(host) = lookup("DOCSIGHT_HOST") {
            self.server.host = host;
        }
        if let Some(port) = lookup("DOCSIGHT_PORT")
            .or_else(|| lookup("PORT"))
            .and_then(|v| v.parse().ok())
        {
            self.server.port = port;
        }
        if let Some(n) = lookup("DOCSIGHT_MAX_UPLOAD_BYTES").and_then(|v| v.parse().ok()) {
            self.server.max_upload_bytes = n;
        }
        if let Some(lang) = lookup("DOCSIGHT_OCR_LANGUAGE") {
            self.extraction.ocr_language = lang;
        }
        if let Some(n) = lookup("DOCSIGHT_EXTRACTION_TIMEOUT_SECS").and_then(|v| v.parse().ok()) {
            self.extraction.timeout_secs = n;
        }
        self.ai = self.ai.with_overrides_from(&lookup);
        self
    }
}

/// `$XDG_CONFIG_HOME/docsight/config.toml` (or the platform equivalent).
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("docsight").join("config.toml"))
}

fn expand_path(path: &Path) -> PathBuf {
    let raw = path.to_string_lossy();
    PathBuf::from(shellexpand::tilde(&raw).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.server.port, 3000);
        assert_eq!(settings.server.max_upload_bytes, DEFAULT_MAX_UPLOAD_BYTES);
        assert_eq!(settings.extraction.ocr_language, "eng");
        assert!(!settings.ai.is_configured());
    }

    #[test]
    fn test_partial_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[server]\nport = 8080\n\n[ai]\nfallback_model = \"gemini-pro\"\npreferred_models = [\"gemini-pro\"]"
        )
        .unwrap();

        let settings = Settings::from_file(file.path()).unwrap();
        assert_eq!(settings.server.port, 8080);
        assert_eq!(settings.server.host, "127.0.0.1");
        assert_eq!(settings.ai.fallback_model, "gemini-pro");
        assert_eq!(settings.ai.preferred_models, vec!["gemini-pro"]);
        assert_eq!(settings.ai.generation_timeout_secs, 60);
        assert_eq!(settings.extraction, ExtractionConfig::default());
    }

    #[test]
    fn test_invalid_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[server\nport = ").unwrap();
        assert!(matches!(
            Settings::from_file(file.path()),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn test_missing_explicit_file() {
        let result = Settings::load(Some(Path::new("/nonexistent/docsight.toml")));
        assert!(matches!(result, Err(ConfigError::Read { .. })));
    }

    #[test]
    fn test_env_overrides() {
        let settings = Settings::default().with_overrides_from(lookup(&[
            ("PORT", "9000"),
            ("DOCSIGHT_OCR_LANGUAGE", "deu"),
            ("GEMINI_API_KEY", "abc"),
        ]));
        assert_eq!(settings.server.port, 9000);
        assert_eq!(settings.extraction.ocr_language, "deu");
        assert_eq!(settings.ai.credential(), Some("abc"));

        let settings = Settings::default()
            .with_overrides_from(lookup(&[("PORT", "9000"), ("DOCSIGHT_PORT", "9100")]));
        assert_eq!(settings.server.port, 9100);
    }
}
