//! Engine configuration for spex, loaded from TOML.
//!
//! ```toml
//! [descriptors]
//! max_depth = 8
//!
//! [evaluation]
//! coerce_text_arguments = true
//! message_value_limit = 64
//! ```

use serde::{Deserialize, Serialize};
use std::{fs, path::Path};
use thiserror::Error as ThisError;

///
/// CONSTANTS
///

/// Default bound on property-tree depth below an element root.
pub const DEFAULT_MAX_DEPTH: usize = 8;

/// Default number of characters of an actual value quoted in evaluation messages.
pub const DEFAULT_MESSAGE_VALUE_LIMIT: usize = 64;

///
/// ConfigError
///

#[derive(Debug, ThisError)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config value for '{key}': {message}")]
    Invalid { key: &'static str, message: String },
}

///
/// SpexConfig
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct SpexConfig {
    pub descriptors: DescriptorConfig,
    pub evaluation: EvaluationConfig,
}

impl SpexConfig {
    /// Parse and validate a TOML document. Missing sections take defaults.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;

        Ok(config)
    }

    /// Read, parse and validate a TOML config file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let source = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;

        Self::from_toml_str(&source)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.descriptors.max_depth == 0 {
            return Err(ConfigError::Invalid {
                key: "descriptors.max_depth",
                message: "must be at least 1".to_string(),
            });
        }
        if self.evaluation.message_value_limit == 0 {
            return Err(ConfigError::Invalid {
                key: "evaluation.message_value_limit",
                message: "must be at least 1".to_string(),
            });
        }

        Ok(())
    }
}

///
/// DescriptorConfig
///
/// Controls property-tree construction.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct DescriptorConfig {
    /// Maximum number of path segments expanded below an element root.
    pub max_depth: usize,
}

impl Default for DescriptorConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

///
/// EvaluationConfig
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct EvaluationConfig {
    /// Parse textual arguments into the property's group before comparing.
    pub coerce_text_arguments: bool,

    /// Truncation length for actual values quoted in evaluation messages.
    pub message_value_limit: usize,
}

impl Default for EvaluationConfig {
    fn default() -> Self {
        Self {
            coerce_text_arguments: true,
            message_value_limit: DEFAULT_MESSAGE_VALUE_LIMIT,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_yields_defaults() {
        let config = SpexConfig::from_toml_str("").unwrap();
        assert_eq!(config, SpexConfig::default());
        assert_eq!(config.descriptors.max_depth, DEFAULT_MAX_DEPTH);
        assert!(config.evaluation.coerce_text_arguments);
    }

    #[test]
    fn partial_sections_keep_remaining_defaults() {
        let config = SpexConfig::from_toml_str("[descriptors]\nmax_depth = 3\n").unwrap();
        assert_eq!(config.descriptors.max_depth, 3);
        assert_eq!(
            config.evaluation.message_value_limit,
            DEFAULT_MESSAGE_VALUE_LIMIT
        );
    }

    #[test]
    fn zero_depth_is_rejected() {
        let err = SpexConfig::from_toml_str("[descriptors]\nmax_depth = 0\n").unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                key: "descriptors.max_depth",
                ..
            }
        ));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let err = SpexConfig::from_toml_str("[descriptors]\nmax_dept = 3\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn missing_file_reports_path() {
        let err = SpexConfig::from_path("/definitely/not/here/spex.toml").unwrap_err();
        assert!(err.to_string().contains("/definitely/not/here/spex.toml"));
    }
}
