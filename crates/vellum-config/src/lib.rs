//! Editor configuration
//!
//! TOML-backed settings for embedders and the CLI: which built-in
//! extensions are enabled, input limits, and validation behavior. Every
//! field has a default, so a config file only needs the keys it changes.
//! This crate is pure data; turning settings into composed editors happens
//! in the consumer.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config file {path}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid config: {0}")]
    Invalid(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Top-level editor configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EditorConfig {
    pub extensions: ExtensionsConfig,
    pub limits: LimitsConfig,
    pub validation: ValidationConfig,
}

/// Which built-in extensions compose into the editor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExtensionsConfig {
    /// The multi-language snippet block grammar
    pub snippet: bool,
}

impl Default for ExtensionsConfig {
    fn default() -> Self {
        Self { snippet: true }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LimitsConfig {
    /// Maximum input size accepted for one parse call, in bytes
    pub max_input_bytes: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_input_bytes: 1024 * 1024,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ValidationConfig {
    /// Surface parse errors instead of degrading to a warning-banner tree
    pub strict: bool,
    /// URI schemes accepted for link and image destinations. Empty means
    /// every destination is accepted.
    pub allowed_link_schemes: Vec<String>,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            strict: false,
            allowed_link_schemes: Vec::new(),
        }
    }
}

impl EditorConfig {
    /// Parse a TOML document; missing keys fall back to defaults
    pub fn from_toml_str(text: &str) -> Result<Self, toml::de::Error> {
        let config: Self = toml::from_str(text)?;
        Ok(config)
    }

    /// Load from a file path
    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        tracing::debug!(?path, "loaded editor config");
        Ok(config)
    }

    /// Cross-field checks that serde cannot express
    pub fn validate(&self) -> ConfigResult<()> {
        if self.limits.max_input_bytes == 0 {
            return Err(ConfigError::Invalid(
                "limits.max_input_bytes must be greater than zero".into(),
            ));
        }
        for scheme in &self.validation.allowed_link_schemes {
            if scheme.is_empty() || !scheme.chars().all(|c| c.is_ascii_alphanumeric() || c == '+' || c == '-' || c == '.') {
                return Err(ConfigError::Invalid(format!(
                    "invalid URI scheme in validation.allowed_link_schemes: {scheme:?}"
                )));
            }
        }
        Ok(())
    }

    /// Whether a link destination passes the configured scheme allowlist
    pub fn link_allowed(&self, href: &str) -> bool {
        if self.validation.allowed_link_schemes.is_empty() {
            return true;
        }
        match href.split_once(':') {
            Some((scheme, _)) => self
                .validation
                .allowed_link_schemes
                .iter()
                .any(|s| s.eq_ignore_ascii_case(scheme)),
            // Relative destinations carry no scheme to reject
            None => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = EditorConfig::default();
        assert!(config.extensions.snippet);
        assert!(!config.validation.strict);
        assert_eq!(config.limits.max_input_bytes, 1024 * 1024);
        assert!(config.validation.allowed_link_schemes.is_empty());
    }

    #[test]
    fn test_partial_file_keeps_defaults_for_missing_keys() {
        let config = EditorConfig::from_toml_str(
            r#"
            [extensions]
            snippet = false
            "#,
        )
        .unwrap();
        assert!(!config.extensions.snippet);
        assert_eq!(config.limits.max_input_bytes, 1024 * 1024);
    }

    #[test]
    fn test_unknown_key_rejected() {
        let err = EditorConfig::from_toml_str("[extensions]\nspelling = true");
        assert!(err.is_err());
    }

    #[test]
    fn test_zero_input_limit_rejected() {
        let config = EditorConfig::from_toml_str("[limits]\nmax_input_bytes = 0").unwrap();
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            "[validation]\nstrict = true\nallowed_link_schemes = [\"https\", \"mailto\"]"
        )
        .unwrap();
        let config = EditorConfig::load(file.path()).unwrap();
        assert!(config.validation.strict);
        assert!(config.link_allowed("https://example.com"));
        assert!(config.link_allowed("relative/path"));
        assert!(!config.link_allowed("javascript:alert(1)"));
    }

    #[test]
    fn test_load_missing_file_is_io_error() {
        let err = EditorConfig::load("/nonexistent/vellum.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn test_scheme_matching_is_case_insensitive() {
        let config = EditorConfig::from_toml_str(
            "[validation]\nallowed_link_schemes = [\"https\"]",
        )
        .unwrap();
        assert!(config.link_allowed("HTTPS://example.com"));
    }
}
