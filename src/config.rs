//! Storage Layout Configuration
//!
//! Filters applied to block devices and the list of virtual mounts to
//! report from filesystem size records. Loaded from an optional YAML file,
//! then overridden per list from the command line or environment.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

/// Filesystem types excluded by default (network and pooled filesystems)
pub const DEFAULT_TYPE_FILTER: &[&str] = &[
    "cifs",
    "9p",
    "fuse.rclone",
    "fuse.mergerfs",
    "nfs4",
    "iso9660",
    "fuse.shfs",
    "autofs",
];

/// Configuration for storage layout mapping
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Block device names to exclude (e.g., sdb, loop0)
    pub device_filter: Vec<String>,
    /// Filesystem types whose block devices are excluded
    pub type_filter: Vec<String>,
    /// Filesystem sources reported as virtual entries
    pub virtual_mounts: Vec<String>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            device_filter: Vec::new(),
            type_filter: DEFAULT_TYPE_FILTER.iter().map(|s| s.to_string()).collect(),
            virtual_mounts: Vec::new(),
        }
    }
}

/// Per-list overrides, usually sourced from CLI flags or environment
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub device_filter: Option<Vec<String>>,
    pub type_filter: Option<Vec<String>>,
    pub virtual_mounts: Option<Vec<String>>,
}

impl StorageConfig {
    /// Load configuration from a YAML file
    pub fn from_yaml_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Configuration(format!("Failed to read {}: {}", path.display(), e))
        })?;
        let config = Self::from_yaml_str(&content)?;
        debug!("Loaded storage config from {}", path.display());
        Ok(config)
    }

    /// Parse configuration from YAML text; an empty document yields defaults
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: StorageConfig = serde_yaml::from_str(content)?;
        Ok(config.normalized())
    }

    /// Replace every list that has an override
    pub fn with_overrides(mut self, overrides: ConfigOverrides) -> Self {
        if let Some(list) = overrides.device_filter {
            self.device_filter = list;
        }
        if let Some(list) = overrides.type_filter {
            self.type_filter = list;
        }
        if let Some(list) = overrides.virtual_mounts {
            self.virtual_mounts = list;
        }
        self.normalized()
    }

    /// Trim entries and drop blank ones
    fn normalized(mut self) -> Self {
        for list in [
            &mut self.device_filter,
            &mut self.type_filter,
            &mut self.virtual_mounts,
        ] {
            *list = clean_list(std::mem::take(list));
        }
        self
    }

    pub fn is_device_filtered(&self, name: &str) -> bool {
        self.device_filter.iter().any(|d| d == name)
    }

    pub fn is_type_filtered(&self, fs_type: &str) -> bool {
        self.type_filter.iter().any(|t| t == fs_type)
    }
}

fn clean_list(list: Vec<String>) -> Vec<String> {
    list.into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}
