use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

fn default_database_path() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("~/.local/share"))
        .join("dodo")
        .join("todo.db")
}

#[derive(Clone, Debug, Deserialize, PartialEq, Eq, Serialize)]
#[serde(default)]
pub struct DodoConfig {
    pub database_path: PathBuf,
    /// Firebase Identity Toolkit web API key.
    pub auth_api_key: String,
    pub chat_api_key: String,
    pub chat_base_url: String,
    pub chat_model: String,
}

impl Default for DodoConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            auth_api_key: String::new(),
            chat_api_key: String::new(),
            chat_base_url: crate::chat::DEFAULT_BASE_URL.to_string(),
            chat_model: crate::chat::DEFAULT_MODEL.to_string(),
        }
    }
}

impl DodoConfig {
    pub fn path() -> Result<PathBuf, ConfigError> {
        dirs::config_dir()
            .map(|dir| dir.join("dodo").join("config.json"))
            .ok_or(ConfigError::NoConfigDir)
    }

    /// Load the config file, falling back to defaults when it does not
    /// exist yet.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::path()?;
        if !path.exists() {
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(&path).map_err(|source| ConfigError::Io {
            path: path.clone(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| ConfigError::Parse { path, source })
    }

    pub fn save(&self) -> Result<(), ConfigError> {
        let path = Self::path()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|source| ConfigError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        let text = serde_json::to_string_pretty(self).map_err(|source| ConfigError::Parse {
            path: path.clone(),
            source,
        })?;
        std::fs::write(&path, text).map_err(|source| ConfigError::Io { path, source })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_round_trip_through_json() {
        let config = DodoConfig::default();
        let text = serde_json::to_string(&config).unwrap();
        let back: DodoConfig = serde_json::from_str(&text).unwrap();
        assert_eq!(config, back);
    }

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let config: DodoConfig = serde_json::from_str(r#"{"chat_api_key":"k"}"#).unwrap();
        assert_eq!(config.chat_api_key, "k");
        assert_eq!(config.chat_base_url, crate::chat::DEFAULT_BASE_URL);
        assert_eq!(config.chat_model, crate::chat::DEFAULT_MODEL);
    }
}
