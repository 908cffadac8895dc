//! Consensus limits of the engine as loadable configuration

use crate::constants::{MAX_MULTI_SIG_KEYS, MAX_STACK_ITEM_SIZE, MAX_STACK_TOTAL_SIZE};
use crate::error::ConfigError;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Limits an [`Engine`](crate::engine::Engine) enforces.
///
/// Nothing here is process-wide: engines built from different
/// configurations can run side by side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Maximum total byte size of the stack
    pub max_stack_total_size: usize,
    /// Maximum byte size of one stack item
    pub max_stack_item_size: usize,
    /// Maximum number of keys in `CHECK_MULTI_SIG` / `VERIFY_MULTI_SIG`
    pub max_multi_sig_keys: u8,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_stack_total_size: MAX_STACK_TOTAL_SIZE,
            max_stack_item_size: MAX_STACK_ITEM_SIZE,
            max_multi_sig_keys: MAX_MULTI_SIG_KEYS,
        }
    }
}

impl EngineConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_stack_item_size == 0 {
            return Err(ConfigError::Invalid("max_stack_item_size must be non-zero".into()));
        }
        if self.max_stack_total_size < self.max_stack_item_size {
            return Err(ConfigError::Invalid(
                "max_stack_total_size must be at least max_stack_item_size".into(),
            ));
        }
        if self.max_multi_sig_keys == 0 {
            return Err(ConfigError::Invalid("max_multi_sig_keys must be non-zero".into()));
        }
        Ok(())
    }

    /// Parse and validate a JSON configuration; missing fields take defaults
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: EngineConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a JSON configuration file
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read engine config {}", path.display()))?;
        let config = Self::from_json(&json)
            .with_context(|| format!("failed to parse engine config {}", path.display()))?;
        tracing::debug!(?config, "loaded engine config");
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::{tempdir, NamedTempFile};

    #[test]
    fn test_default_is_valid() {
        assert!(EngineConfig::default().validate().is_ok());
    }

    #[test]
    fn test_from_json_partial() {
        let config = EngineConfig::from_json(r#"{ "max_stack_item_size": 64 }"#).unwrap();
        assert_eq!(config.max_stack_item_size, 64);
        assert_eq!(config.max_stack_total_size, MAX_STACK_TOTAL_SIZE);
        assert_eq!(config.max_multi_sig_keys, MAX_MULTI_SIG_KEYS);
    }

    #[test]
    fn test_from_json_rejects_bad_limits() {
        let json = r#"{ "max_stack_total_size": 10, "max_stack_item_size": 20 }"#;
        assert!(matches!(EngineConfig::from_json(json), Err(ConfigError::Invalid(_))));
        assert!(matches!(
            EngineConfig::from_json(r#"{ "max_stack_item_size": 0 }"#),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(EngineConfig::from_json("not json"), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_load_from_file() {
        let config = EngineConfig {
            max_stack_total_size: 1024,
            max_stack_item_size: 128,
            max_multi_sig_keys: 3,
        };
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{}", serde_json::to_string(&config).unwrap()).unwrap();
        assert_eq!(EngineConfig::load(file.path()).unwrap(), config);
    }

    #[test]
    fn test_load_missing_or_malformed_file() {
        let dir = tempdir().unwrap();
        assert!(EngineConfig::load(dir.path().join("missing.json")).is_err());

        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{{ not json").unwrap();
        let err = EngineConfig::load(file.path()).unwrap_err();
        assert!(err.to_string().contains("failed to parse engine config"));
    }
}
