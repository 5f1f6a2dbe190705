use anyhow::{Context, Result};
use serde_json::Value;
use std::collections::HashMap;
use std::path::Path;

use crate::github::client::DEFAULT_API_URL;

/// Configuration keys enum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConfigKey {
    Token,
    ApiUrl,
}

impl ConfigKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConfigKey::Token => "token",
            ConfigKey::ApiUrl => "api_url",
        }
    }

    /// Get all config keys
    pub fn all() -> &'static [ConfigKey] {
        &[ConfigKey::Token, ConfigKey::ApiUrl]
    }
}

/// Filename for the project-specific configuration within the .ghmm directory.
pub const PROJECT_CONFIG_FILENAME: &str = "config.json";
/// Directory name for project-specific configuration.
pub const PROJECT_CONFIG_DIR: &str = ".ghmm";

/// Parses a JSON configuration file content into a map of configuration values.
///
/// - Returns the recognised keys of a JSON object (e.g. `{"token": "...", "api_url": "..."}`).
/// - Returns an empty HashMap if the input `content` is empty or contains only whitespace.
/// - Returns an `Err` if the JSON is invalid or not an object.
pub fn parse_config(content: &[u8]) -> Result<HashMap<ConfigKey, Value>> {
    if content.iter().all(|b| b.is_ascii_whitespace()) {
        return Ok(HashMap::new());
    }

    let value: Value = serde_json::from_slice(content).context("Failed to parse config JSON")?;

    let Value::Object(map) = &value else {
        return Err(anyhow::anyhow!("Config must be a JSON object"));
    };

    Ok(ConfigKey::all()
        .iter()
        .filter_map(|key| map.get(key.as_str()).map(|val| (*key, val.clone())))
        .collect())
}

/// Reads `.ghmm/config.json` under `dir`. A missing file is an empty configuration.
pub fn load_project_config(dir: &Path) -> Result<HashMap<ConfigKey, Value>> {
    let path = dir.join(PROJECT_CONFIG_DIR).join(PROJECT_CONFIG_FILENAME);
    match std::fs::read(&path) {
        Ok(content) => {
            parse_config(&content).with_context(|| format!("Invalid config {}", path.display()))
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(HashMap::new()),
        Err(e) => Err(e).with_context(|| format!("Failed to read config {}", path.display())),
    }
}

/// Merges `updates` into `base_config` and returns a new configuration map.
///
/// If a key exists in both, the value from `updates` wins.
pub fn update_config(
    base_config: &HashMap<ConfigKey, Value>,
    updates: &HashMap<ConfigKey, Value>,
) -> HashMap<ConfigKey, Value> {
    let mut new_config = base_config.clone();
    for (key, value) in updates {
        new_config.insert(*key, value.clone());
    }
    new_config
}

/// Connection settings resolved from the merged configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub token: Option<String>,
    pub api_url: String,
}

impl Settings {
    pub fn from_config(config: &HashMap<ConfigKey, Value>) -> Result<Self> {
        let token = string_value(config, ConfigKey::Token)?.filter(|t| !t.is_empty());
        let api_url = string_value(config, ConfigKey::ApiUrl)?
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());
        Ok(Settings { token, api_url })
    }
}

fn string_value(config: &HashMap<ConfigKey, Value>, key: ConfigKey) -> Result<Option<String>> {
    match config.get(&key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(other) => Err(anyhow::anyhow!(
            "Config key '{}' must be a string, got {other}",
            key.as_str()
        )),
    }
}

/// Per-invocation switches shared by the planner and the dry-run gate. Set once, never mutated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunConfig {
    /// Apply planned changes instead of only reporting them.
    pub confirm: bool,
}
