//! Store configuration
//!
//! A `StoreConfig` can be built in code or read from a TOML file. Every
//! field has a default, so an empty file is a valid configuration. The
//! camelCase names used by older deployments (`idAttribute`, `saveEvery`,
//! `saveFrequency`) are accepted as aliases.

use cantrip_core::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default identifier key name
pub const DEFAULT_ID_ATTRIBUTE: &str = "_id";

/// Default flush cadence: write after every mutation
pub const DEFAULT_SAVE_EVERY: u64 = 1;

/// Store configuration
///
/// # Example
///
/// ```toml
/// # Key holding a member's identifier inside a collection
/// id_attribute = "_id"
///
/// # Write the document to disk after every Nth mutation (0 = never)
/// save_every = 1
///
/// # Backing file; omit for a purely in-memory store
/// file = "data.json"
///
/// # Replace nested objects/arrays with placeholders on every GET
/// shallow = false
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Key holding a member's identifier
    #[serde(default = "default_id_attribute", alias = "idAttribute")]
    pub id_attribute: String,
    /// Flush every Nth mutation; 0 disables writes
    #[serde(
        default = "default_save_every",
        alias = "saveEvery",
        alias = "saveFrequency",
        alias = "save_frequency"
    )]
    pub save_every: u64,
    /// Backing file; `None` keeps the document in memory only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,
    /// Default shallow projection for reads
    #[serde(default)]
    pub shallow: bool,
    /// Cache identifier → position per collection
    #[serde(default = "default_true", alias = "indexIdentifiers")]
    pub index_identifiers: bool,
    /// Case rule for `q` searches
    #[serde(default = "default_true", alias = "caseSensitiveSearch")]
    pub case_sensitive_search: bool,
}

fn default_id_attribute() -> String {
    DEFAULT_ID_ATTRIBUTE.to_string()
}

fn default_save_every() -> u64 {
    DEFAULT_SAVE_EVERY
}

fn default_true() -> bool {
    true
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            id_attribute: default_id_attribute(),
            save_every: DEFAULT_SAVE_EVERY,
            file: None,
            shallow: false,
            index_identifiers: true,
            case_sensitive_search: true,
        }
    }
}

impl StoreConfig {
    /// Set the backing file
    pub fn with_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.file = Some(path.into());
        self
    }

    /// Set the identifier key name
    pub fn with_id_attribute(mut self, id_attribute: impl Into<String>) -> Self {
        self.id_attribute = id_attribute.into();
        self
    }

    /// Set the flush cadence
    pub fn with_save_every(mut self, save_every: u64) -> Self {
        self.save_every = save_every;
        self
    }

    /// Set the default shallow projection
    pub fn with_shallow(mut self, shallow: bool) -> Self {
        self.shallow = shallow;
        self
    }

    /// Enable or disable the identifier index
    pub fn with_index_identifiers(mut self, enabled: bool) -> Self {
        self.index_identifiers = enabled;
        self
    }

    /// Set the case rule for searches
    pub fn with_case_sensitive_search(mut self, case_sensitive: bool) -> Self {
        self.case_sensitive_search = case_sensitive;
        self
    }

    /// Check the configuration for values the store cannot work with
    pub fn validate(&self) -> Result<()> {
        if self.id_attribute.is_empty() {
            return Err(Error::InvalidConfig {
                reason: "id_attribute must not be empty".to_string(),
            });
        }
        Ok(())
    }

    /// Parse a TOML string
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML does not parse or fails [`validate`](Self::validate).
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: StoreConfig = toml::from_str(content).map_err(|e| Error::InvalidConfig {
            reason: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse config from a file path
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| Error::InvalidConfig {
            reason: format!("Failed to read config file '{}': {}", path.display(), e),
        })?;
        Self::from_toml_str(&content).map_err(|e| Error::InvalidConfig {
            reason: format!("Failed to parse config file '{}': {}", path.display(), e),
        })
    }

    /// Serialize this config to TOML and write it to the given path
    pub fn write_to_file(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self).map_err(|e| Error::Serialization {
            reason: format!("Failed to serialize config: {}", e),
        })?;
        std::fs::write(path, content)?;
        Ok(())
    }
}
