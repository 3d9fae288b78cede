//! Engine configuration loading.

use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Engine configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct EngineConfig {
    /// Message prefixes that address the bot (default `"n+"`). A line
    /// carrying none of them is ignored by `dispatch_line`. Checked in
    /// order; the first match wins.
    #[serde(default = "default_prefixes")]
    pub prefixes: Vec<String>,
}

fn default_prefixes() -> Vec<String> {
    vec!["n+".to_string()]
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self { prefixes: default_prefixes() }
    }
}

impl EngineConfig {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: EngineConfig = toml::from_str(&content)?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.prefixes, ["n+"]);
    }

    #[test]
    fn test_parse_overrides() {
        let config: EngineConfig = toml::from_str(r#"prefixes = ["!", "?"]"#).unwrap();
        assert_eq!(config.prefixes, ["!", "?"]);
    }

    #[test]
    fn test_empty_file_uses_defaults() {
        let config: EngineConfig = toml::from_str("").unwrap();
        assert_eq!(config.prefixes, ["n+"]);
    }
}
