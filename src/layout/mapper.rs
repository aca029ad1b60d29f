//! Storage Layout Mapper
//!
//! Turns the three introspection lists (disk inventory, block devices,
//! filesystem sizes) into the normalized storage layout. Physical disks
//! come first, in block device order, followed by configured virtual
//! mounts in configuration order.

use crate::config::StorageConfig;
use crate::domain::ports::{BlockDevice, DiskLayout, FsSize, StorageLayout};
use crate::layout::raid::{is_raid_member, raid_label};
use tracing::debug;

// =============================================================================
// Constants
// =============================================================================

const BLOCK_TYPE_DISK: &str = "disk";
const VIRTUAL_TYPE: &str = "VIRTUAL";

// =============================================================================
// Native Disk
// =============================================================================

/// Disk attributes used for a layout entry, from the inventory when the
/// block device can be matched, otherwise from the block device itself
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NativeDisk {
    pub vendor: String,
    pub size: u64,
    pub disk_type: String,
    pub interface_type: Option<String>,
}

impl From<&DiskLayout> for NativeDisk {
    fn from(disk: &DiskLayout) -> Self {
        Self {
            vendor: disk.vendor.clone(),
            size: disk.size,
            disk_type: disk.disk_type.clone(),
            interface_type: disk.interface_type.clone(),
        }
    }
}

impl From<&BlockDevice> for NativeDisk {
    fn from(block: &BlockDevice) -> Self {
        Self {
            vendor: block.name.clone(),
            size: block.size,
            disk_type: block.physical.clone(),
            interface_type: None,
        }
    }
}

// =============================================================================
// Mapping
// =============================================================================

/// Map raw host enumeration data to the storage layout
pub fn map_to_storage_layout(
    host_windows: bool,
    disks: &[DiskLayout],
    blocks: &[BlockDevice],
    sizes: &[FsSize],
    config: &StorageConfig,
) -> Vec<StorageLayout> {
    let raid_blocks: Vec<BlockDevice> = blocks.iter().filter(|b| is_raid_member(b)).cloned().collect();
    let mut disk_blocks = filter_disk_blocks(blocks, config);

    if host_windows {
        disk_blocks = dedup_by_physical_device(disk_blocks);
    }

    let mut layout: Vec<StorageLayout> = disk_blocks
        .into_iter()
        .map(|block| {
            let native = find_native_disk(disks, block);
            let raid_group = raid_label(&block.name, &raid_blocks);

            debug!(
                "Mapped block {} (vendor={}, raid={:?})",
                block.name, native.vendor, raid_group
            );

            StorageLayout {
                device: if host_windows {
                    block.device.clone()
                } else {
                    block.name.clone()
                },
                brand: native.vendor,
                size: native.size,
                layout_type: disk_type(&native.disk_type, native.interface_type.as_deref()),
                raid_group,
                r#virtual: None,
            }
        })
        .collect();

    layout.extend(virtual_mounts_layout(sizes, config));
    layout
}

/// Whole, non-empty disks that pass the configured device and type filters
pub fn filter_disk_blocks<'a>(blocks: &'a [BlockDevice], config: &StorageConfig) -> Vec<&'a BlockDevice> {
    blocks
        .iter()
        .filter(|b| {
            b.block_type == BLOCK_TYPE_DISK
                && b.size > 0
                && !config.is_device_filtered(&b.name)
                && !config.is_type_filtered(&b.fs_type)
        })
        .collect()
}

/// Keep the first block per physical device, dropping blocks without one
fn dedup_by_physical_device(blocks: Vec<&BlockDevice>) -> Vec<&BlockDevice> {
    let mut kept: Vec<&BlockDevice> = Vec::with_capacity(blocks.len());
    for block in blocks {
        if !block.device.is_empty() && !kept.iter().any(|k| k.device == block.device) {
            kept.push(block);
        }
    }
    kept
}

/// Find the inventory disk for a block device, matching by device path or model
pub fn find_native_disk(disks: &[DiskLayout], block: &BlockDevice) -> NativeDisk {
    disks
        .iter()
        .find(|d| d.device == block.device || (!block.model.is_empty() && d.name == block.model))
        .map(NativeDisk::from)
        .unwrap_or_else(|| NativeDisk::from(block))
}

/// Report NVMe SSDs as their own type
pub fn disk_type(disk_type: &str, interface_type: Option<&str>) -> String {
    if disk_type == "SSD" && interface_type == Some("NVMe") {
        "NVMe".to_string()
    } else {
        disk_type.to_string()
    }
}

/// Entries for configured virtual mounts that have a size record
pub fn virtual_mounts_layout(sizes: &[FsSize], config: &StorageConfig) -> Vec<StorageLayout> {
    config
        .virtual_mounts
        .iter()
        .filter_map(|mount| {
            let size = sizes.iter().find(|s| &s.fs == mount)?;
            Some(StorageLayout {
                device: size.fs.clone(),
                brand: size.fs.clone(),
                size: size.size,
                layout_type: VIRTUAL_TYPE.to_string(),
                raid_group: None,
                r#virtual: Some(true),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn disk_block(name: &str, size: u64) -> BlockDevice {
        BlockDevice {
            name: name.into(),
            block_type: "disk".into(),
            size,
            physical: "HDD".into(),
            device: format!("/dev/{}", name),
            ..Default::default()
        }
    }

    fn inventory(device: &str, vendor: &str, disk_type: &str, interface: Option<&str>) -> DiskLayout {
        DiskLayout {
            device: device.into(),
            disk_type: disk_type.into(),
            name: format!("{} model", vendor),
            vendor: vendor.into(),
            size: 2_000_398_934_016,
            interface_type: interface.map(str::to_string),
            ..Default::default()
        }
    }

    fn fs_size(fs: &str, size: u64) -> FsSize {
        FsSize {
            fs: fs.into(),
            size,
            mount: format!("/mnt/{}", fs),
            ..Default::default()
        }
    }

    fn no_filters() -> StorageConfig {
        StorageConfig {
            device_filter: Vec::new(),
            type_filter: Vec::new(),
            virtual_mounts: Vec::new(),
        }
    }

    #[test]
    fn test_disk_type() {
        assert_eq!(disk_type("SSD", Some("NVMe")), "NVMe");
        assert_eq!(disk_type("SSD", Some("SATA")), "SSD");
        assert_eq!(disk_type("SSD", None), "SSD");
        assert_eq!(disk_type("HD", Some("NVMe")), "HD");
    }

    #[test]
    fn test_filter_disk_blocks() {
        let mut part = disk_block("sda1", 100);
        part.block_type = "part".into();
        let mut nfs = disk_block("sdc", 100);
        nfs.fs_type = "nfs4".into();

        let blocks = vec![
            disk_block("sda", 100),
            part,
            disk_block("sdb", 0),
            nfs,
            disk_block("sdd", 100),
        ];
        let config = StorageConfig {
            device_filter: vec!["sdd".into()],
            ..StorageConfig::default()
        };

        let kept: Vec<&str> = filter_disk_blocks(&blocks, &config)
            .iter()
            .map(|b| b.name.as_str())
            .collect();
        assert_eq!(kept, vec!["sda"]);
    }

    #[test]
    fn test_find_native_disk_by_device() {
        let disks = vec![
            inventory("/dev/sdb", "WDC", "HD", Some("SATA")),
            inventory("/dev/sda", "Samsung", "SSD", Some("SATA")),
        ];
        let native = find_native_disk(&disks, &disk_block("sda", 100));

        assert_eq!(native.vendor, "Samsung");
        assert_eq!(native.size, 2_000_398_934_016);
        assert_eq!(native.disk_type, "SSD");
    }

    #[test]
    fn test_find_native_disk_by_model() {
        let disks = vec![inventory("/dev/other", "Crucial", "SSD", None)];
        let mut block = disk_block("sda", 100);
        block.model = "Crucial model".into();

        assert_eq!(find_native_disk(&disks, &block).vendor, "Crucial");
    }

    #[test]
    fn test_find_native_disk_empty_device_paths_match() {
        let mut disk = inventory("", "Apple", "SSD", None);
        disk.size = 999;
        let mut block = disk_block("disk0", 5);
        block.device = String::new();

        let native = find_native_disk(&[disk], &block);
        assert_eq!(native.vendor, "Apple");
        assert_eq!(native.size, 999);
    }

    #[test]
    fn test_find_native_disk_fallback() {
        let disks = vec![inventory("/dev/sdz", "Ghost", "SSD", None)];
        let mut block = disk_block("vda", 4096);
        block.physical = "SSD".into();

        let native = find_native_disk(&disks, &block);
        assert_eq!(
            native,
            NativeDisk {
                vendor: "vda".into(),
                size: 4096,
                disk_type: "SSD".into(),
                interface_type: None,
            }
        );
    }

    #[test]
    fn test_virtual_mounts_in_config_order() {
        let sizes = vec![fs_size("tank", 10), fs_size("pool", 20), fs_size("tank", 99)];
        let config = StorageConfig {
            virtual_mounts: vec!["pool".into(), "missing".into(), "tank".into()],
            ..no_filters()
        };

        let layout = virtual_mounts_layout(&sizes, &config);
        assert_eq!(layout.len(), 2);
        assert_eq!(layout[0].device, "pool");
        assert_eq!(layout[0].brand, "pool");
        assert_eq!(layout[0].size, 20);
        assert_eq!(layout[0].layout_type, "VIRTUAL");
        assert!(layout[0].is_virtual());
        assert_eq!(layout[1].device, "tank");
        assert_eq!(layout[1].size, 10);
    }

    #[test]
    fn test_map_linux_host() {
        let disks = vec![
            inventory("/dev/nvme0n1", "Samsung", "SSD", Some("NVMe")),
            inventory("/dev/sda", "WDC", "HD", Some("SATA")),
        ];
        let mut sda1 = disk_block("sda1", 100);
        sda1.block_type = "part".into();
        sda1.fs_type = "linux_raid_member".into();
        sda1.label = "nas:0".into();
        sda1.uuid = "u1".into();
        sda1.device = "/dev/sda".into();

        let blocks = vec![disk_block("nvme0n1", 500), disk_block("sda", 200), sda1];
        let sizes = vec![fs_size("tank", 1234)];
        let config = StorageConfig {
            virtual_mounts: vec!["tank".into()],
            ..StorageConfig::default()
        };

        let layout = map_to_storage_layout(false, &disks, &blocks, &sizes, &config);

        assert_eq!(layout.len(), 3);
        assert_eq!(layout[0].device, "nvme0n1");
        assert_eq!(layout[0].brand, "Samsung");
        assert_eq!(layout[0].layout_type, "NVMe");
        assert_eq!(layout[0].raid_group, None);

        assert_eq!(layout[1].device, "sda");
        assert_eq!(layout[1].brand, "WDC");
        assert_eq!(layout[1].layout_type, "HD");
        assert_eq!(layout[1].raid_group.as_deref(), Some("nas"));
        assert_eq!(layout[1].r#virtual, None);

        assert_eq!(layout[2].device, "tank");
        assert!(layout[2].is_virtual());
    }

    #[test]
    fn test_map_windows_host_dedups_by_device() {
        let drive0 = r"\\.\PHYSICALDRIVE0";
        let disks = vec![inventory(drive0, "Samsung", "SSD", Some("NVMe"))];

        let mut c = disk_block("C:", 500);
        c.device = drive0.into();
        let mut d = disk_block("D:", 300);
        d.device = drive0.into();
        let mut orphan = disk_block("E:", 100);
        orphan.device = String::new();

        let blocks = vec![c, d, orphan];
        let layout = map_to_storage_layout(true, &disks, &blocks, &[], &no_filters());

        assert_eq!(layout.len(), 1);
        assert_eq!(layout[0].device, drive0);
        assert_eq!(layout[0].brand, "Samsung");
        assert_eq!(layout[0].layout_type, "NVMe");
    }

    #[test]
    fn test_map_linux_host_keeps_duplicate_devices() {
        let mut a = disk_block("sda", 100);
        a.device = "/dev/md".into();
        let mut b = disk_block("sdb", 100);
        b.device = "/dev/md".into();

        let layout = map_to_storage_layout(false, &[], &[a, b], &[], &no_filters());
        let devices: Vec<&str> = layout.iter().map(|l| l.device.as_str()).collect();
        assert_eq!(devices, vec!["sda", "sdb"]);
    }

    #[test]
    fn test_map_empty_inputs() {
        let layout = map_to_storage_layout(false, &[], &[], &[], &StorageConfig::default());
        assert!(layout.is_empty());
    }
}
