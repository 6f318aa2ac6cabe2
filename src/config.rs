use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::env;
use std::fs;
use std::path::Path;
use tracing::info;

pub const API_KEY_ENV: &str = "NEXTDNS_API_KEY";
pub const DEFAULT_API_BASE: &str = "https://api.nextdns.io";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub profiles: BTreeMap<String, String>,
    #[serde(default = "default_api_base")]
    pub api_base: String,
}

fn default_api_base() -> String {
    DEFAULT_API_BASE.to_string()
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {:?}", path))?;
        let config: Config = serde_json::from_str(&content)
            .with_context(|| format!("Invalid config file {:?}", path))?;

        info!(action = "loaded", component = "config", file_path = ?path, profile_count = config.profiles.len(), "Configuration loaded");
        Ok(config)
    }

    /// API key from the environment if set, otherwise from the config file.
    pub fn api_key(&self) -> Result<String> {
        resolve_api_key(env::var(API_KEY_ENV).ok(), self.api_key.as_deref())
    }

    /// Maps a short profile name to the remote profile id.
    pub fn profile_id(&self, name: &str) -> Result<&str> {
        match self.profiles.get(name) {
            Some(id) => Ok(id.as_str()),
            None => {
                let known: Vec<&str> = self.profiles.keys().map(String::as_str).collect();
                anyhow::bail!(
                    "Unknown profile '{}' (known profiles: {})",
                    name,
                    if known.is_empty() {
                        "none".to_string()
                    } else {
                        known.join(", ")
                    }
                )
            }
        }
    }
}

fn resolve_api_key(from_env: Option<String>, from_file: Option<&str>) -> Result<String> {
    if let Some(key) = from_env.filter(|k| !k.is_empty()) {
        return Ok(key);
    }
    match from_file {
        Some(key) if !key.is_empty() => Ok(key.to_string()),
        _ => anyhow::bail!(
            "No API key configured; set 'api_key' in the config file or {}",
            API_KEY_ENV
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_minimal_config() {
        let config: Config =
            serde_json::from_str(r#"{"api_key": "k", "profiles": {"home": "abc123"}}"#).unwrap();
        assert_eq!(config.api_base, DEFAULT_API_BASE);
        assert_eq!(config.profile_id("home").unwrap(), "abc123");
    }

    #[test]
    fn unknown_profile_lists_known_names() {
        let config: Config =
            serde_json::from_str(r#"{"profiles": {"home": "a", "work": "b"}}"#).unwrap();
        let err = config.profile_id("lab").unwrap_err().to_string();
        assert!(err.contains("home, work"), "{err}");
    }

    #[test]
    fn env_key_overrides_file_key() {
        assert_eq!(
            resolve_api_key(Some("env".into()), Some("file")).unwrap(),
            "env"
        );
        assert_eq!(
            resolve_api_key(Some(String::new()), Some("file")).unwrap(),
            "file"
        );
        assert!(resolve_api_key(None, None).is_err());
    }
}
