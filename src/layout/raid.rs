//! RAID Group Labels
//!
//! Resolves the software RAID array a disk belongs to from the labels of
//! its member block devices. mdadm labels arrays as `host:array`; the host
//! prefix is dropped unless another array shares it.

use crate::domain::ports::BlockDevice;

/// Filesystem type suffix carried by RAID member devices
pub const RAID_MEMBER_SUFFIX: &str = "_member";

/// Check whether a block device is a software RAID member
pub fn is_raid_member(block: &BlockDevice) -> bool {
    block.fs_type.ends_with(RAID_MEMBER_SUFFIX)
}

/// Resolve the RAID group label for a disk
///
/// `raid_blocks` must already be restricted to RAID members. Members of the
/// disk are those whose name starts with `device_name` (the disk itself or
/// its partitions); the label of the first member wins.
pub fn raid_label(device_name: &str, raid_blocks: &[BlockDevice]) -> Option<String> {
    let members: Vec<&BlockDevice> = raid_blocks
        .iter()
        .filter(|b| b.name.starts_with(device_name))
        .collect();

    let first = members.first()?;

    let Some((prefix, _)) = first.label.split_once(':') else {
        return Some(first.label.clone());
    };

    let member_uuids: Vec<&str> = members.iter().map(|m| m.uuid.as_str()).collect();

    let prefix_is_shared = raid_blocks
        .iter()
        .filter(|b| !b.name.starts_with(device_name) && !member_uuids.contains(&b.uuid.as_str()))
        .any(|b| label_prefix(&b.label) == prefix && b.label != first.label);

    if prefix_is_shared {
        Some(first.label.clone())
    } else {
        Some(prefix.to_string())
    }
}

fn label_prefix(label: &str) -> &str {
    label.split(':').next().unwrap_or(label)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn member(name: &str, label: &str, uuid: &str) -> BlockDevice {
        BlockDevice {
            name: name.into(),
            block_type: "part".into(),
            fs_type: "linux_raid_member".into(),
            label: label.into(),
            uuid: uuid.into(),
            ..Default::default()
        }
    }

    #[test]
    fn test_is_raid_member() {
        assert!(is_raid_member(&member("sda1", "x", "u")));

        let zfs = BlockDevice {
            fs_type: "zfs_member".into(),
            ..Default::default()
        };
        assert!(is_raid_member(&zfs));

        let ext4 = BlockDevice {
            fs_type: "ext4".into(),
            ..Default::default()
        };
        assert!(!is_raid_member(&ext4));
    }

    #[test]
    fn test_no_members() {
        let blocks = vec![member("sdb1", "nas:0", "u1")];
        assert_eq!(raid_label("sda", &blocks), None);
        assert_eq!(raid_label("sda", &[]), None);
    }

    #[test]
    fn test_plain_label_returned_as_is() {
        let blocks = vec![member("sda1", "tank", "u1"), member("sdb1", "tank", "u1")];
        assert_eq!(raid_label("sda", &blocks), Some("tank".into()));
    }

    #[test]
    fn test_host_prefix_stripped_when_unique() {
        let blocks = vec![
            member("sda1", "nas:0", "u1"),
            member("sdb1", "nas:0", "u1"),
            member("sdc1", "backup:1", "u2"),
        ];
        assert_eq!(raid_label("sda", &blocks), Some("nas".into()));
        assert_eq!(raid_label("sdc", &blocks), Some("backup".into()));
    }

    #[test]
    fn test_shared_prefix_keeps_full_label() {
        let blocks = vec![
            member("sda1", "nas:0", "u1"),
            member("sdb1", "nas:0", "u1"),
            member("sdc1", "nas:1", "u2"),
            member("sdd1", "nas:1", "u2"),
        ];
        assert_eq!(raid_label("sda", &blocks), Some("nas:0".into()));
        assert_eq!(raid_label("sdc", &blocks), Some("nas:1".into()));
    }

    #[test]
    fn test_same_uuid_on_other_disk_ignored() {
        // A second partition of the same array with a stale label elsewhere
        let blocks = vec![member("sda1", "nas:0", "u1"), member("sdb1", "nas:9", "u1")];
        assert_eq!(raid_label("sda", &blocks), Some("nas".into()));
    }

    #[test]
    fn test_first_member_label_wins() {
        let blocks = vec![member("sda1", "nas:0", "u1"), member("sda2", "nas:1", "u2")];
        // sda2 is a member of sda itself, so it is not a competitor
        assert_eq!(raid_label("sda", &blocks), Some("nas".into()));
    }

    #[test]
    fn test_prefix_match_on_name() {
        // sda is a name prefix of sdaa; both count as members of sda
        let blocks = vec![member("sdaa1", "nas:0", "u1"), member("sdb1", "nas:1", "u2")];
        assert_eq!(raid_label("sda", &blocks), Some("nas:0".into()));
    }
}
