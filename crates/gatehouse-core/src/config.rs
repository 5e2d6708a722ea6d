//! Configuration management for gatehouse.
//!
//! Loads configuration from ${GATEHOUSE_HOME}/config.toml with sensible defaults.

use std::fs;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use url::Url;

/// Hosted backend settings as written in the config file.
///
/// The resolved, validated form is [`BackendConfig`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendSettings {
    /// Base URL of the hosted backend (e.g. `https://myproject.example.co`).
    pub url: Option<String>,
    /// Public (anon) API key issued by the backend.
    pub anon_key: Option<String>,
    /// Request timeout in seconds (0 disables).
    pub timeout_secs: u32,
}

/// Password-recovery settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ResetSettings {
    /// Target the emailed reset link should land on.
    pub redirect_to: Option<String>,
}

/// Main configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Hosted backend connection settings.
    pub backend: BackendSettings,

    /// Password-recovery settings.
    pub reset: ResetSettings,

    /// Default tracing filter when RUST_LOG is unset (e.g. "info").
    pub log_filter: Option<String>,
}

/// Resolved backend connection parameters used by the HTTP clients.
#[derive(Debug, Clone)]
pub struct BackendConfig {
    pub base_url: Url,
    pub anon_key: String,
    pub reset_redirect: Option<String>,
    pub timeout: Option<Duration>,
}

impl Config {
    const DEFAULT_TIMEOUT_SECS: u32 = 30;

    /// Loads configuration from the default config path.
    pub fn load() -> Result<Self> {
        Self::load_from(&paths::config_path())
    }

    /// Loads configuration from a specific path.
    /// Returns defaults if file doesn't exist.
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config from {}", path.display()))?;
            toml::from_str(&contents)
                .with_context(|| format!("Failed to parse config from {}", path.display()))
        } else {
            Ok(Config::default())
        }
    }

    /// Resolves the backend connection parameters.
    ///
    /// URL precedence: env (`GATEHOUSE_BACKEND_URL`) > config.
    /// Anon key precedence: config > env (`GATEHOUSE_ANON_KEY`).
    ///
    /// # Errors
    /// Returns an error if either value is missing or the URL is malformed.
    pub fn backend(&self) -> Result<BackendConfig> {
        let base_url = resolve_backend_url(self.backend.url.as_deref())?;
        let anon_key = resolve_anon_key(self.backend.anon_key.as_deref())?;

        let timeout_secs = if self.backend.timeout_secs == 0 {
            Self::DEFAULT_TIMEOUT_SECS
        } else {
            self.backend.timeout_secs
        };

        Ok(BackendConfig {
            base_url,
            anon_key,
            reset_redirect: self.reset.redirect_to.clone(),
            timeout: Some(Duration::from_secs(u64::from(timeout_secs))),
        })
    }

    /// Saves backend connection values to the config file.
    ///
    /// Creates the file with the default template if it doesn't exist.
    /// Preserves existing fields and comments using toml_edit.
    pub fn save_backend(path: &Path, url: Option<&str>, anon_key: Option<&str>) -> Result<()> {
        use toml_edit::{DocumentMut, value};

        let contents = if path.exists() {
            fs::read_to_string(path)
                .with_context(|| format!("Failed to read config from {}", path.display()))?
        } else {
            default_config_template().to_string()
        };

        let mut doc: DocumentMut = contents
            .parse()
            .with_context(|| format!("Failed to parse config from {}", path.display()))?;

        if let Some(url) = url {
            validate_url(url)?;
            doc["backend"]["url"] = value(url);
        }
        if let Some(anon_key) = anon_key {
            doc["backend"]["anon_key"] = value(anon_key);
        }

        Self::write_config(path, &doc.to_string())
    }

    /// Creates a default config file at the given path.
    /// Returns an error if the file already exists.
    pub fn init(path: &Path) -> Result<()> {
        if path.exists() {
            anyhow::bail!("Config file already exists at {}", path.display());
        }

        Self::write_config(path, default_config_template())
    }

    fn write_config(path: &Path, contents: &str) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }
        fs::write(path, contents)
            .with_context(|| format!("Failed to write config to {}", path.display()))
    }
}

/// Resolves the backend base URL with precedence: env > config.
fn resolve_backend_url(config_url: Option<&str>) -> Result<Url> {
    if let Ok(env_url) = std::env::var("GATEHOUSE_BACKEND_URL") {
        let trimmed = env_url.trim();
        if !trimmed.is_empty() {
            return validate_url(trimmed);
        }
    }

    if let Some(config_url) = config_url {
        let trimmed = config_url.trim();
        if !trimmed.is_empty() {
            return validate_url(trimmed);
        }
    }

    anyhow::bail!(
        "No backend URL configured. Set GATEHOUSE_BACKEND_URL or url in [backend] of {}.",
        paths::config_path().display()
    )
}

/// Resolves the anon key with precedence: config > env.
fn resolve_anon_key(config_key: Option<&str>) -> Result<String> {
    if let Some(key) = config_key {
        let trimmed = key.trim();
        if !trimmed.is_empty() {
            return Ok(trimmed.to_string());
        }
    }

    std::env::var("GATEHOUSE_ANON_KEY").context(
        "No backend API key available. Set GATEHOUSE_ANON_KEY or anon_key in [backend].",
    )
}

fn validate_url(url: &str) -> Result<Url> {
    Url::parse(url).with_context(|| format!("Invalid backend URL: {url}"))
}

/// Default configuration file content with explanatory comments.
///
/// This is embedded from default_config.toml at compile time.
/// To update, edit default_config.toml directly.
fn default_config_template() -> &'static str {
    include_str!("../default_config.toml")
}

pub mod paths {
    //! Path resolution for gatehouse configuration and data directories.
    //!
    //! GATEHOUSE_HOME resolution order:
    //! 1. GATEHOUSE_HOME environment variable (if set)
    //! 2. ~/.config/gatehouse (default)

    use std::path::PathBuf;

    /// Returns the gatehouse home directory.
    ///
    /// Checks GATEHOUSE_HOME env var first, falls back to ~/.config/gatehouse
    pub fn gatehouse_home() -> PathBuf {
        if let Ok(home) = std::env::var("GATEHOUSE_HOME") {
            return PathBuf::from(home);
        }

        dirs::home_dir()
            .map(|h| h.join(".config").join("gatehouse"))
            .expect("Could not determine home directory")
    }

    /// Returns the path to the config.toml file.
    pub fn config_path() -> PathBuf {
        gatehouse_home().join("config.toml")
    }

    /// Returns the log directory.
    pub fn logs_dir() -> PathBuf {
        gatehouse_home().join("logs")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_missing_file_returns_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("config.toml")).unwrap();
        assert!(config.backend.url.is_none());
        assert!(config.backend.anon_key.is_none());
        assert!(config.reset.redirect_to.is_none());
    }

    #[test]
    fn test_load_parses_backend_section() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
[backend]
url = "https://myproject.example.co"
anon_key = "public-anon-key"
timeout_secs = 10

[reset]
redirect_to = "https://app.example.com/reset-password"
"#,
        )
        .unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(
            config.backend.url.as_deref(),
            Some("https://myproject.example.co")
        );
        assert_eq!(config.backend.anon_key.as_deref(), Some("public-anon-key"));
        assert_eq!(config.backend.timeout_secs, 10);
        assert_eq!(
            config.reset.redirect_to.as_deref(),
            Some("https://app.example.com/reset-password")
        );
    }

    #[test]
    fn test_backend_requires_url() {
        let config = Config {
            backend: BackendSettings {
                url: None,
                anon_key: Some("key".to_string()),
                timeout_secs: 0,
            },
            ..Config::default()
        };
        // Only valid when the env override is absent, so scope it to this test.
        if std::env::var("GATEHOUSE_BACKEND_URL").is_err() {
            assert!(config.backend().is_err());
        }
    }

    #[test]
    fn test_backend_rejects_malformed_url() {
        let config = Config {
            backend: BackendSettings {
                url: Some("not a url".to_string()),
                anon_key: Some("key".to_string()),
                timeout_secs: 0,
            },
            ..Config::default()
        };
        if std::env::var("GATEHOUSE_BACKEND_URL").is_err() {
            assert!(config.backend().is_err());
        }
    }

    #[test]
    fn test_init_refuses_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "# existing").unwrap();
        let err = Config::init(&path).unwrap_err();
        assert!(err.to_string().contains("already exists"));
    }

    #[test]
    fn test_save_backend_preserves_comments() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        Config::save_backend(
            &path,
            Some("https://myproject.example.co"),
            Some("public-anon-key"),
        )
        .unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.contains(r#"url = "https://myproject.example.co""#));
        assert!(contents.contains(r#"anon_key = "public-anon-key""#));
        // Template comments survive the edit.
        assert!(contents.contains("row-level security"));

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.backend.anon_key.as_deref(), Some("public-anon-key"));
    }

    #[test]
    fn test_init_writes_template() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        Config::init(&path).unwrap();
        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.contains("[backend]"));
        assert!(contents.contains("anon_key"));
    }
}
