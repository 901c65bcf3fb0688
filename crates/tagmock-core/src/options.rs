use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::errors::ConfigError;
use crate::tags::TAG_VALUE_SEPARATOR;

pub const DEFAULT_TAG: &str = "mock";
pub const DEFAULT_SEPARATOR: &str = ",";

/// Construction options for a [`crate::Mocker`].
///
/// ```toml
/// tag = "mock"
/// separator = ","
/// seed = 42
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MockOptions {
    /// Field attribute marker the mocker reads.
    pub tag: String,
    /// Separator between `key=value` tokens.
    pub separator: String,
    /// Fixed seed; every call then starts from the same RNG state.
    pub seed: Option<u64>,
}

impl Default for MockOptions {
    fn default() -> Self {
        Self {
            tag: DEFAULT_TAG.to_string(),
            separator: DEFAULT_SEPARATOR.to_string(),
            seed: None,
        }
    }
}

impl MockOptions {
    pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
        let options: Self = toml::from_str(input)?;
        options.validate()?;
        Ok(options)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = tag.into();
        self
    }

    pub fn with_separator(mut self, separator: impl Into<String>) -> Self {
        self.separator = separator.into();
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tag.trim().is_empty() {
            return Err(ConfigError::Invalid("tag marker must not be empty".to_string()));
        }
        if self.separator.is_empty() {
            return Err(ConfigError::Invalid("separator must not be empty".to_string()));
        }
        if self.separator.contains(TAG_VALUE_SEPARATOR) {
            return Err(ConfigError::Invalid(format!(
                "separator '{}' must not contain '{TAG_VALUE_SEPARATOR}'",
                self.separator
            )));
        }
        Ok(())
    }
}
