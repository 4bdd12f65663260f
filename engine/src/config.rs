//! Configuration loading.
//!
//! A small TOML file at `~/.civil/config.toml`, entirely optional: every
//! field has a working default, and `CIVIL_ANALYZE_URL` overrides the
//! configured endpoint for one-off runs.

use std::path::{Path, PathBuf};
use std::{env, fs};

use serde::Deserialize;

use civil_classifier::DEFAULT_ANALYZE_URL;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config at {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse config at {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

#[derive(Debug, Default, Deserialize)]
pub struct CivilConfig {
    pub classifier: Option<ClassifierConfig>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ClassifierConfig {
    /// Full URL of the analyze endpoint.
    pub analyze_url: Option<String>,
}

impl CivilConfig {
    /// `~/.civil/config.toml`, or `None` when no home directory resolves.
    #[must_use]
    pub fn path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(".civil").join("config.toml"))
    }

    /// Load the config file if one exists. A missing file is `Ok(None)`;
    /// an unreadable or unparsable file is an error carrying its path.
    pub fn load() -> Result<Option<Self>, ConfigError> {
        let Some(path) = Self::path() else {
            return Ok(None);
        };
        Self::load_from(&path)
    }

    pub fn load_from(path: &Path) -> Result<Option<Self>, ConfigError> {
        if !path.exists() {
            return Ok(None);
        }
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = toml::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Some(config))
    }
}

/// Resolve the classifier endpoint: env override, then config, then the
/// built-in default.
#[must_use]
pub fn analyze_url(config: Option<&CivilConfig>) -> String {
    if let Ok(url) = env::var("CIVIL_ANALYZE_URL")
        && !url.trim().is_empty()
    {
        return url;
    }
    config
        .and_then(|c| c.classifier.as_ref())
        .and_then(|c| c.analyze_url.clone())
        .unwrap_or_else(|| DEFAULT_ANALYZE_URL.to_owned())
}

#[cfg(test)]
mod tests {
    use super::{CivilConfig, ConfigError, analyze_url};
    use civil_classifier::DEFAULT_ANALYZE_URL;

    #[test]
    fn default_endpoint_without_config() {
        assert_eq!(analyze_url(None), DEFAULT_ANALYZE_URL);
    }

    #[test]
    fn config_endpoint_wins_over_default() {
        let config: CivilConfig = toml::from_str(
            r#"
            [classifier]
            analyze_url = "http://10.0.0.5:9000/analyze"
            "#,
        )
        .unwrap();
        assert_eq!(analyze_url(Some(&config)), "http://10.0.0.5:9000/analyze");
    }

    #[test]
    fn empty_config_falls_back() {
        let config: CivilConfig = toml::from_str("").unwrap();
        assert_eq!(analyze_url(Some(&config)), DEFAULT_ANALYZE_URL);
    }

    #[test]
    fn missing_file_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        assert!(CivilConfig::load_from(&path).unwrap().is_none());
    }

    #[test]
    fn unparsable_file_reports_its_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "classifier = 3").unwrap();

        match CivilConfig::load_from(&path) {
            Err(ConfigError::Parse { path: p, .. }) => assert_eq!(p, path),
            other => panic!("expected Parse error, got {other:?}"),
        }
    }
}
