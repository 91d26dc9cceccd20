//! Client configuration.

use std::path::{Path, PathBuf};

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};

static DEFAULT_API_URL: &str = "http://localhost:5001/api";
static DEFAULT_NAMESPACE: &str = "daybook";

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

fn default_namespace() -> String {
    DEFAULT_NAMESPACE.to_string()
}

/// Configuration at ~/.config/daybook/config.toml
///
/// Every key can be overridden with a `DAYBOOK_`-prefixed environment
/// variable, e.g. `DAYBOOK_API_URL`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientConfig {
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Prefix of every local mirror key.
    #[serde(default = "default_namespace")]
    pub namespace: String,

    /// Where the local mirror lives. Defaults to the platform data dir.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        ClientConfig {
            api_url: default_api_url(),
            namespace: default_namespace(),
            data_dir: None,
        }
    }
}

impl ClientConfig {
    pub fn config_path() -> CoreResult<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| CoreError::Config("Could not determine config directory".into()))?
            .join("daybook");

        Ok(config_dir.join("config.toml"))
    }

    /// Load the config, creating a commented default file on first run.
    pub fn load() -> CoreResult<Self> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            Self::create_default_config(&config_path)?;
        }

        Self::load_from(&config_path)
    }

    pub fn load_from(path: &Path) -> CoreResult<Self> {
        let config: ClientConfig = Config::builder()
            .add_source(File::from(path).required(false))
            .add_source(Environment::with_prefix("DAYBOOK"))
            .build()
            .map_err(|e| CoreError::Config(e.to_string()))?
            .try_deserialize()
            .map_err(|e| CoreError::Config(e.to_string()))?;

        if config.namespace.trim().is_empty() {
            return Err(CoreError::Config("namespace must not be empty".into()));
        }
        Ok(config)
    }

    /// The local mirror directory, with `~` expanded.
    pub fn data_path(&self) -> CoreResult<PathBuf> {
        match &self.data_dir {
            Some(dir) => Ok(PathBuf::from(
                shellexpand::tilde(&dir.to_string_lossy()).into_owned(),
            )),
            None => dirs::data_dir()
                .map(|d| d.join("daybook"))
                .ok_or_else(|| CoreError::Config("Could not determine data directory".into())),
        }
    }

    pub fn to_toml(&self) -> CoreResult<String> {
        toml::to_string_pretty(self).map_err(|e| CoreError::Config(e.to_string()))
    }

    /// Create a default config file with all options commented out.
    pub fn create_default_config(path: &Path) -> CoreResult<()> {
        let contents = format!(
            "\
# daybook configuration

# Server to sync with once you are logged in:
# api_url = \"{DEFAULT_API_URL}\"

# Prefix for locally stored collections:
# namespace = \"{DEFAULT_NAMESPACE}\"

# Where calendars are kept while logged out:
# data_dir = \"~/.local/share/daybook\"
"
        );

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                CoreError::Config(format!("Could not create config directory: {e}"))
            })?;
        }

        std::fs::write(path, contents)
            .map_err(|e| CoreError::Config(format!("Could not write config file: {e}")))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_file_loads_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("daybook").join("config.toml");

        ClientConfig::create_default_config(&path).unwrap();
        let config = ClientConfig::load_from(&path).unwrap();

        assert_eq!(config.namespace, "daybook");
        assert_eq!(config.data_dir, None);
    }

    #[test]
    fn test_values_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "namespace = \"work\"\ndata_dir = \"~/daybook-data\"\n",
        )
        .unwrap();

        let config = ClientConfig::load_from(&path).unwrap();
        assert_eq!(config.namespace, "work");

        let data_path = config.data_path().unwrap();
        assert!(data_path.ends_with("daybook-data"));
        assert!(!data_path.starts_with("~"));
    }

    #[test]
    fn test_blank_namespace_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "namespace = \"  \"\n").unwrap();

        assert!(matches!(ClientConfig::load_from(&path), Err(CoreError::Config(_))));
    }

    #[test]
    fn test_to_toml_skips_unset_data_dir() {
        let toml = ClientConfig::default().to_toml().unwrap();
        assert!(toml.contains("namespace = \"daybook\""));
        assert!(!toml.contains("data_dir"));
    }
}
