//! # Configuration management for the EYD checker
//!
//! Settings are loaded in the following order of priority:
//! 1. Command line arguments (highest priority, applied by the binary)
//! 2. Configuration file
//! 3. Default values (lowest priority)
//!
//! The file is TOML and lives at `<config dir>/eyd-checker/config.toml`.

use crate::compositor::PreviewOptions;
use crate::preview::THEMES;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main configuration structure.
///
/// # Example
///
/// ```rust
/// use eyd_core::Config;
///
/// let config = Config::default();
/// assert_eq!(config.service.base_url, "http://localhost:8000");
/// assert_eq!(config.export.default_filename, "corrected.txt");
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Checker service settings
    pub service: ServiceConfig,
    /// Export settings
    pub export: ExportConfig,
    /// Preview markup settings
    pub preview: PreviewConfig,
    /// Advanced settings
    pub advanced: AdvancedConfig,
}

/// Checker service connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Base URL of the checker service
    pub base_url: String,
    /// Path of the check endpoint
    pub check_path: String,
    /// Path of the feedback endpoint
    pub feedback_path: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Whether to report accept/reject decisions back to the service
    pub send_feedback: bool,
}

/// Export settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// File name used when the user does not pick one
    pub default_filename: String,
    /// Directory exported files are written to
    pub directory: PathBuf,
}

/// Preview markup settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PreviewConfig {
    /// CSS class wrapped around suggestions
    pub suggestion_class: String,
    /// Markup replacing line breaks
    pub line_break: String,
    /// Theme of exported preview pages
    pub theme: String,
}

/// Advanced settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AdvancedConfig {
    /// Log level (error, warn, info, debug, trace)
    pub log_level: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            check_path: "/check_eyd".to_string(),
            feedback_path: "/feedback".to_string(),
            timeout_secs: 30,
            send_feedback: false,
        }
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            default_filename: "corrected.txt".to_string(),
            directory: PathBuf::from("."),
        }
    }
}

impl Default for PreviewConfig {
    fn default() -> Self {
        let options = PreviewOptions::default();
        Self {
            suggestion_class: options.suggestion_class,
            line_break: options.line_break,
            theme: "light".to_string(),
        }
    }
}

impl Default for AdvancedConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

impl ServiceConfig {
    /// Request timeout as a [`Duration`].
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl PreviewConfig {
    /// Compositor options built from these settings.
    pub fn options(&self) -> PreviewOptions {
        PreviewOptions {
            suggestion_class: self.suggestion_class.clone(),
            line_break: self.line_break.clone(),
        }
    }
}

impl Config {
    /// Load configuration from the default location, or the defaults when no
    /// config file has been written yet.
    ///
    /// # Errors
    ///
    /// Returns an error if a config file exists but cannot be read, parsed or
    /// validated.
    pub fn load_or_default() -> Result<Self> {
        match Self::default_config_path() {
            Ok(config_path) => Self::load_or_default_from(config_path),
            Err(e) => {
                tracing::debug!("Using default configuration: {}", e);
                Ok(Self::default())
            }
        }
    }

    /// Load configuration from `path`, or the defaults if `path` does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read, parsed or
    /// validated.
    pub fn load_or_default_from<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            tracing::debug!(path = %path.display(), "No config file, using defaults");
            return Ok(Self::default());
        }
        Self::load_from_file(path)
    }

    /// Load configuration from the default config file.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file cannot be read, parsed or validated.
    pub fn load() -> Result<Self> {
        let config_path = Self::default_config_path()?;
        Self::load_from_file(&config_path)
    }

    /// Load configuration from a specific file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed or validated.
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// use eyd_core::Config;
    /// use std::path::Path;
    ///
    /// let config = Config::load_from_file(Path::new("eyd.toml"))?;
    /// # Ok::<(), eyd_core::Error>(())
    /// ```
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::config(format!("Failed to read config file: {}", e)))?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| Error::config(format!("Failed to parse config file: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    /// Save configuration to the default config file.
    pub fn save(&self) -> Result<()> {
        let config_path = Self::default_config_path()?;
        self.save_to_file(&config_path)
    }

    /// Save configuration to a specific file, creating parent directories.
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        self.validate()?;

        let content = toml::to_string_pretty(self)
            .map_err(|e| Error::config(format!("Failed to serialize config: {}", e)))?;

        if let Some(parent) = path.as_ref().parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| Error::config(format!("Failed to create config directory: {}", e)))?;
        }

        std::fs::write(path, content)
            .map_err(|e| Error::config(format!("Failed to write config file: {}", e)))?;

        Ok(())
    }

    /// Validate the configuration values.
    ///
    /// # Example
    ///
    /// ```rust
    /// use eyd_core::Config;
    ///
    /// let mut config = Config::default();
    /// assert!(config.validate().is_ok());
    ///
    /// config.service.timeout_secs = 0;
    /// assert!(config.validate().is_err());
    /// ```
    pub fn validate(&self) -> Result<()> {
        let service = &self.service;
        if !(service.base_url.starts_with("http://") || service.base_url.starts_with("https://"))
        {
            return Err(Error::validation(
                "service.base_url",
                "Base URL must start with http:// or https://",
            ));
        }

        for (field, path) in [
            ("service.check_path", &service.check_path),
            ("service.feedback_path", &service.feedback_path),
        ] {
            if !path.starts_with('/') {
                return Err(Error::validation(field, "Endpoint path must start with '/'"));
            }
        }

        if service.timeout_secs == 0 || service.timeout_secs > 300 {
            return Err(Error::validation(
                "service.timeout_secs",
                "Timeout must be between 1 and 300 seconds",
            ));
        }

        let filename = &self.export.default_filename;
        if filename.trim().is_empty() || filename.contains(['/', '\\']) {
            return Err(Error::validation(
                "export.default_filename",
                "File name must be non-empty and must not contain path separators",
            ));
        }

        if !is_css_identifier(&self.preview.suggestion_class) {
            return Err(Error::validation(
                "preview.suggestion_class",
                "Suggestion class must be a CSS identifier",
            ));
        }

        if !THEMES.contains(&self.preview.theme.as_str()) {
            return Err(Error::validation(
                "preview.theme",
                "Theme must be one of: light, dark",
            ));
        }

        if !["error", "warn", "info", "debug", "trace"].contains(&self.advanced.log_level.as_str())
        {
            return Err(Error::validation(
                "advanced.log_level",
                "Log level must be one of: error, warn, info, debug, trace",
            ));
        }

        Ok(())
    }

    /// Get the default configuration file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the config directory cannot be determined.
    pub fn default_config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Get the configuration directory.
    pub fn config_dir() -> Result<PathBuf> {
        dirs::config_dir()
            .map(|dir| dir.join("eyd-checker"))
            .ok_or_else(|| Error::config("Could not determine config directory"))
    }
}

fn is_css_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.service.check_path, "/check_eyd");
        assert_eq!(config.service.timeout(), Duration::from_secs(30));
        assert!(!config.service.send_feedback);
        assert_eq!(config.preview.options(), PreviewOptions::default());
        assert_eq!(config.advanced.log_level, "info");
    }

    #[test]
    fn test_config_validation_errors() {
        let mut config = Config::default();
        assert!(config.validate().is_ok());

        config.service.base_url = "localhost:8000".to_string();
        assert!(config.validate().is_err());

        config = Config::default();
        config.service.check_path = "check_eyd".to_string();
        assert!(config.validate().is_err());

        config = Config::default();
        config.export.default_filename = "../out.txt".to_string();
        assert!(config.validate().is_err());

        config = Config::default();
        config.preview.suggestion_class = "bad class".to_string();
        assert!(config.validate().is_err());

        config = Config::default();
        config.preview.theme = "sepia".to_string();
        assert!(config.validate().is_err());

        config = Config::default();
        config.advanced.log_level = "invalid".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let config: Config = toml::from_str(
            r#"
            [service]
            base_url = "https://eyd.example.org"
            send_feedback = true
            "#,
        )
        .unwrap();
        assert_eq!(config.service.base_url, "https://eyd.example.org");
        assert!(config.service.send_feedback);
        assert_eq!(config.service.check_path, "/check_eyd");
        assert_eq!(config.export.default_filename, "corrected.txt");
    }

    #[test]
    fn test_config_file_operations() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.service.timeout_secs = 5;

        config.save_to_file(&config_path).unwrap();
        assert!(config_path.exists());

        let loaded = Config::load_from_file(&config_path).unwrap();
        assert_eq!(loaded.service.timeout_secs, 5);
        assert_eq!(loaded.preview.theme, "light");
    }

    #[test]
    fn test_load_rejects_invalid_file() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("config.toml");
        std::fs::write(&config_path, "[service]\ntimeout_secs = 0\n").unwrap();

        let err = Config::load_from_file(&config_path).unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let temp_dir = tempdir().unwrap();
        let config = Config::load_or_default_from(temp_dir.path().join("config.toml")).unwrap();
        assert_eq!(config.service.base_url, "http://localhost:8000");
    }

    #[test]
    fn test_broken_file_is_reported() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("config.toml");

        std::fs::write(&config_path, "[service\nbase_url = ").unwrap();
        let err = Config::load_or_default_from(&config_path).unwrap_err();
        assert!(err.is_config());

        std::fs::write(&config_path, "[preview]\ntheme = \"sepia\"\n").unwrap();
        let err = Config::load_or_default_from(&config_path).unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn test_css_identifier() {
        assert!(is_css_identifier("suggestion"));
        assert!(is_css_identifier("eyd-fix_2"));
        assert!(!is_css_identifier(""));
        assert!(!is_css_identifier("2fix"));
        assert!(!is_css_identifier("a\"b"));
    }
}
