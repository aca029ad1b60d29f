//! Snapshot Inspector
//!
//! Replays a captured enumeration (`{ platform, disks, blocks, sizes }`)
//! from a JSON file, so layouts of remote or Windows hosts can be produced
//! anywhere.

use crate::domain::ports::{BlockDevice, DiskLayout, FsSize, HostPlatform, SystemInspector};
use crate::error::{Error, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

/// Captured host enumeration data
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct HostSnapshot {
    /// OS identifier of the captured host (linux, win32, windows, darwin)
    pub platform: Option<String>,
    pub disks: Vec<DiskLayout>,
    pub blocks: Vec<BlockDevice>,
    pub sizes: Vec<FsSize>,
}

/// Serves a fixed snapshot as if it were a live host
#[derive(Debug)]
pub struct SnapshotInspector {
    snapshot: HostSnapshot,
    platform: HostPlatform,
}

impl SnapshotInspector {
    pub fn new(snapshot: HostSnapshot) -> Self {
        let platform = snapshot
            .platform
            .as_deref()
            .map(HostPlatform::from_os)
            .unwrap_or_else(HostPlatform::current);
        Self { snapshot, platform }
    }

    /// Load a snapshot from a JSON file
    pub fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::SnapshotNotFound {
                path: path.display().to_string(),
            });
        }

        let content = std::fs::read_to_string(path)?;
        let snapshot: HostSnapshot = serde_json::from_str(&content).map_err(|e| Error::InvalidSnapshot {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;

        info!(
            "Loaded snapshot {} ({} disks, {} blocks, {} filesystems)",
            path.display(),
            snapshot.disks.len(),
            snapshot.blocks.len(),
            snapshot.sizes.len()
        );

        Ok(Self::new(snapshot))
    }
}

#[async_trait]
impl SystemInspector for SnapshotInspector {
    async fn disk_layout(&self) -> Result<Vec<DiskLayout>> {
        Ok(self.snapshot.disks.clone())
    }

    async fn block_devices(&self) -> Result<Vec<BlockDevice>> {
        Ok(self.snapshot.blocks.clone())
    }

    async fn fs_size(&self) -> Result<Vec<FsSize>> {
        Ok(self.snapshot.sizes.clone())
    }

    fn platform(&self) -> HostPlatform {
        self.platform
    }

    fn inspector_name(&self) -> &str {
        "snapshot"
    }
}
