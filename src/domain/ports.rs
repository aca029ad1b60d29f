//! Domain Ports - Core record types and the host inspection trait
//!
//! Input records mirror the schema produced by OS introspection tools
//! (camelCase JSON), so captures taken elsewhere deserialize unchanged.
//! Output records form the normalized storage layout report.

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

// =============================================================================
// Host Platform
// =============================================================================

/// Operating system family of the inspected host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HostPlatform {
    Linux,
    Windows,
    Macos,
    Other,
}

impl HostPlatform {
    /// Platform of the running process
    pub fn current() -> Self {
        Self::from_os(std::env::consts::OS)
    }

    /// Map an OS identifier (`linux`, `windows`, `win32`, `macos`, `darwin`)
    pub fn from_os(os: &str) -> Self {
        match os.to_lowercase().as_str() {
            "linux" => HostPlatform::Linux,
            "windows" | "win32" => HostPlatform::Windows,
            "macos" | "darwin" => HostPlatform::Macos,
            _ => HostPlatform::Other,
        }
    }

    pub fn is_windows(&self) -> bool {
        matches!(self, HostPlatform::Windows)
    }
}

impl std::fmt::Display for HostPlatform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HostPlatform::Linux => write!(f, "linux"),
            HostPlatform::Windows => write!(f, "windows"),
            HostPlatform::Macos => write!(f, "macos"),
            HostPlatform::Other => write!(f, "other"),
        }
    }
}

// =============================================================================
// Introspection Records
// =============================================================================

/// A block device (disk, partition, volume) as reported by the OS
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BlockDevice {
    /// Kernel name (e.g., sda, nvme0n1p1, md0)
    pub name: String,
    /// Device type (disk, part, loop, rom, raid1, ...)
    #[serde(rename = "type")]
    pub block_type: String,
    /// Filesystem type (ext4, linux_raid_member, ...)
    pub fs_type: String,
    /// Mount point, empty when unmounted
    pub mount: String,
    /// Size in bytes
    pub size: u64,
    /// Physical media kind (SSD, HDD, CD/DVD)
    pub physical: String,
    pub uuid: String,
    pub label: String,
    pub model: String,
    pub serial: String,
    pub removable: bool,
    pub protocol: String,
    /// Owning physical device (`\\.\PHYSICALDRIVE0` on Windows, `/dev/sda` on Linux)
    pub device: String,
}

/// A physical disk from the controller/media inventory
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DiskLayout {
    /// Device path (e.g., /dev/sda)
    pub device: String,
    /// Media type (SSD, HD, ...)
    #[serde(rename = "type")]
    pub disk_type: String,
    /// Model name
    pub name: String,
    pub vendor: String,
    /// Total capacity in bytes
    pub size: u64,
    /// Interface (NVMe, SATA, USB, ...)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interface_type: Option<String>,
    pub serial_num: String,
    pub firmware_revision: String,
    pub bytes_per_sector: Option<u32>,
    pub smart_status: String,
}

/// Capacity and usage of a mounted filesystem
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FsSize {
    /// Filesystem source (e.g., /dev/sda1, tank/data, server:/export)
    pub fs: String,
    #[serde(rename = "type")]
    pub fs_type: String,
    /// Size in bytes
    pub size: u64,
    pub used: u64,
    pub available: u64,
    /// Usage percentage
    #[serde(rename = "use")]
    pub use_percent: f64,
    pub mount: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rw: Option<bool>,
}

// =============================================================================
// Storage Layout Report
// =============================================================================

/// One entry of the normalized storage layout
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageLayout {
    pub device: String,
    pub brand: String,
    pub size: u64,
    #[serde(rename = "type")]
    pub layout_type: String,
    /// Software RAID array this disk belongs to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raid_group: Option<String>,
    /// Set only for configured virtual mounts
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub r#virtual: Option<bool>,
}

impl StorageLayout {
    pub fn is_virtual(&self) -> bool {
        self.r#virtual.unwrap_or(false)
    }
}

/// Storage layout report
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageInfo {
    pub layout: Vec<StorageLayout>,
}

// =============================================================================
// System Inspector Port
// =============================================================================

/// Port for host storage introspection
#[async_trait]
pub trait SystemInspector: Send + Sync {
    /// Physical disk inventory
    async fn disk_layout(&self) -> Result<Vec<DiskLayout>>;

    /// All block devices, including partitions and RAID members
    async fn block_devices(&self) -> Result<Vec<BlockDevice>>;

    /// Mounted filesystem sizes
    async fn fs_size(&self) -> Result<Vec<FsSize>>;

    /// Platform of the inspected host
    fn platform(&self) -> HostPlatform;

    /// Inspector name for logging
    fn inspector_name(&self) -> &str;
}

pub type SystemInspectorRef = Arc<dyn SystemInspector>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_host_platform_from_os() {
        assert_eq!(HostPlatform::from_os("linux"), HostPlatform::Linux);
        assert_eq!(HostPlatform::from_os("win32"), HostPlatform::Windows);
        assert_eq!(HostPlatform::from_os("Windows"), HostPlatform::Windows);
        assert_eq!(HostPlatform::from_os("darwin"), HostPlatform::Macos);
        assert_eq!(HostPlatform::from_os("freebsd"), HostPlatform::Other);
        assert!(HostPlatform::Windows.is_windows());
        assert!(!HostPlatform::Linux.is_windows());
    }

    #[test]
    fn test_block_device_deserializes_partial_record() {
        let block: BlockDevice = serde_json::from_str(
            r#"{"name":"sda","type":"disk","fsType":"","size":500107862016,"physical":"SSD"}"#,
        )
        .unwrap();

        assert_eq!(block.name, "sda");
        assert_eq!(block.block_type, "disk");
        assert_eq!(block.size, 500_107_862_016);
        assert!(block.device.is_empty());
        assert!(block.label.is_empty());
    }

    #[test]
    fn test_layout_serialization_omits_optional_fields() {
        let layout = StorageLayout {
            device: "sda".into(),
            brand: "Samsung".into(),
            size: 1000,
            layout_type: "SSD".into(),
            raid_group: None,
            r#virtual: None,
        };

        let json = serde_json::to_value(&layout).unwrap();
        assert_eq!(json["type"], "SSD");
        assert!(json.get("raidGroup").is_none());
        assert!(json.get("virtual").is_none());

        let raid = StorageLayout {
            raid_group: Some("data".into()),
            r#virtual: Some(true),
            ..layout
        };
        let json = serde_json::to_value(&raid).unwrap();
        assert_eq!(json["raidGroup"], "data");
        assert_eq!(json["virtual"], true);
    }
}
