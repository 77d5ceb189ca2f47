//! Optional TOML defaults and credential loading.
//!
//! Command-line flags always win over the config file, which wins over the
//! built-in defaults.

use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Contents of a `--config` file, e.g.
///
/// ```toml
/// source_language = "en"
/// chunk_size = 25
/// credentials = "secrets/translate-key.json"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub source_language: Option<String>,
    pub chunk_size: Option<usize>,
    pub endpoint: Option<String>,
    pub credentials: Option<PathBuf>,
}

impl Config {
    pub fn load(path: &Path) -> Result<Self, String> {
        let text = fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config '{}': {}", path.display(), e))?;
        let mut config: Config = toml::from_str(&text)
            .map_err(|e| format!("Invalid config '{}': {}", path.display(), e))?;

        // Relative credential paths are relative to the config file.
        if let Some(credentials) = &config.credentials
            && credentials.is_relative()
            && let Some(dir) = path.parent()
        {
            config.credentials = Some(dir.join(credentials));
        }
        Ok(config)
    }
}

/// Reads an API key from a credentials file.
pub fn load_api_key(path: &Path) -> Result<String, String> {
    let content = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read credentials '{}': {}", path.display(), e))?;
    parse_api_key(&content)
        .map_err(|e| format!("Invalid credentials '{}': {}", path.display(), e))
}

/// Accepts either a JSON object with an `api_key` (or `key`) field, or the
/// bare key as the whole file content.
pub fn parse_api_key(content: &str) -> Result<String, String> {
    let trimmed = content.trim();
    if trimmed.is_empty() {
        return Err("file is empty".to_string());
    }

    if trimmed.starts_with('{') {
        let value: serde_json::Value =
            serde_json::from_str(trimmed).map_err(|e| format!("not valid JSON: {}", e))?;
        if value.get("type").and_then(|t| t.as_str()) == Some("service_account") {
            return Err(
                "service account keys are not supported; create an API key for the \
                 Cloud Translation API and store it as {\"api_key\": \"...\"}"
                    .to_string(),
            );
        }
        return ["api_key", "key"]
            .iter()
            .find_map(|field| value.get(field).and_then(|v| v.as_str()))
            .filter(|key| !key.trim().is_empty())
            .map(|key| key.trim().to_string())
            .ok_or_else(|| "expected an \"api_key\" field".to_string());
    }

    if trimmed.chars().any(char::is_whitespace) {
        return Err("expected a single API key".to_string());
    }
    Ok(trimmed.to_string())
}
