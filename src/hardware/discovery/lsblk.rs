//! lsblk Output Parsing
//!
//! Parses `lsblk -J` (JSON) output into block device and disk inventory
//! records. Older util-linux releases print sizes and flags as strings,
//! newer ones as numbers and booleans; both are accepted.

use crate::domain::ports::{BlockDevice, DiskLayout};
use crate::error::{Error, Result};
use serde::{Deserialize, Deserializer};

// =============================================================================
// Invocations
// =============================================================================

/// Columns requested for block device enumeration
pub const BLOCK_COLUMNS: &str = "NAME,TYPE,SIZE,FSTYPE,MOUNTPOINT,UUID,ROTA,RO,RM,TRAN,SERIAL,LABEL,MODEL,PKNAME";

/// Columns requested for the physical disk inventory
pub const DISK_COLUMNS: &str = "NAME,TYPE,SIZE,ROTA,TRAN,VENDOR,MODEL,SERIAL,REV,PHY-SEC";

/// Arguments for block devices: JSON, bytes, flat list
pub const BLOCK_ARGS: &[&str] = &["-J", "-b", "-l", "-o", BLOCK_COLUMNS];

/// Arguments for the disk inventory: JSON, bytes, no children
pub const DISK_ARGS: &[&str] = &["-J", "-b", "-d", "-o", DISK_COLUMNS];

// =============================================================================
// lsblk JSON Structures
// =============================================================================

/// Top-level `lsblk -J` document
#[derive(Debug, Deserialize)]
struct LsblkOutput {
    #[serde(default)]
    blockdevices: Vec<LsblkDevice>,
}

/// One lsblk row; absent columns and JSON nulls become defaults
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LsblkDevice {
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub device_type: Option<String>,
    #[serde(deserialize_with = "lenient_u64")]
    pub size: u64,
    pub fstype: Option<String>,
    pub mountpoint: Option<String>,
    pub uuid: Option<String>,
    #[serde(deserialize_with = "lenient_flag")]
    pub rota: bool,
    #[serde(deserialize_with = "lenient_flag")]
    pub rm: bool,
    pub tran: Option<String>,
    pub vendor: Option<String>,
    pub model: Option<String>,
    pub serial: Option<String>,
    pub label: Option<String>,
    pub rev: Option<String>,
    pub pkname: Option<String>,
    #[serde(rename = "phy-sec", deserialize_with = "lenient_opt_u32")]
    pub phy_sec: Option<u32>,
}

/// Scalar as printed by any util-linux version
#[derive(Deserialize)]
#[serde(untagged)]
enum Scalar {
    Flag(bool),
    Number(u64),
    Text(String),
}

fn lenient_u64<'de, D>(deserializer: D) -> std::result::Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Scalar>::deserialize(deserializer)? {
        Some(Scalar::Number(n)) => n,
        Some(Scalar::Text(s)) => s.trim().parse().unwrap_or(0),
        Some(Scalar::Flag(b)) => u64::from(b),
        None => 0,
    })
}

fn lenient_opt_u32<'de, D>(deserializer: D) -> std::result::Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Scalar>::deserialize(deserializer)? {
        Some(Scalar::Number(n)) => u32::try_from(n).ok(),
        Some(Scalar::Text(s)) => s.trim().parse().ok(),
        _ => None,
    })
}

fn lenient_flag<'de, D>(deserializer: D) -> std::result::Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Scalar>::deserialize(deserializer)? {
        Some(Scalar::Flag(b)) => b,
        Some(Scalar::Number(n)) => n != 0,
        Some(Scalar::Text(s)) => s.trim() == "1",
        None => false,
    })
}

fn text(value: &Option<String>) -> String {
    value.as_deref().map(str::trim).unwrap_or("").to_string()
}

// =============================================================================
// Parsing
// =============================================================================

/// Parse `lsblk -J` output
pub fn parse_lsblk_json(output: &str) -> Result<Vec<LsblkDevice>> {
    let parsed: LsblkOutput = serde_json::from_str(output).map_err(|e| Error::OutputParse {
        source_name: "lsblk".into(),
        reason: e.to_string(),
    })?;
    Ok(parsed.blockdevices)
}

// =============================================================================
// Record Mapping
// =============================================================================

/// Map lsblk rows to block devices
pub fn block_devices_from_rows(rows: &[LsblkDevice]) -> Vec<BlockDevice> {
    rows.iter()
        .filter(|row| !text(&row.name).is_empty())
        .map(|row| {
            let name = text(&row.name);
            let block_type = text(&row.device_type);
            let parent = text(&row.pkname);

            BlockDevice {
                physical: physical_kind(&block_type, row.rota).to_string(),
                device: if parent.is_empty() {
                    format!("/dev/{}", name)
                } else {
                    format!("/dev/{}", parent)
                },
                fs_type: text(&row.fstype),
                mount: text(&row.mountpoint),
                size: row.size,
                uuid: text(&row.uuid),
                label: text(&row.label),
                model: text(&row.model),
                serial: text(&row.serial),
                removable: row.rm,
                protocol: text(&row.tran),
                name,
                block_type,
            }
        })
        .collect()
}

/// Map lsblk rows to the physical disk inventory; non-disk rows are ignored
pub fn disk_layout_from_rows(rows: &[LsblkDevice]) -> Vec<DiskLayout> {
    rows.iter()
        .filter(|row| text(&row.device_type) == "disk" && !text(&row.name).is_empty())
        .map(|row| {
            let model = text(&row.model);
            let vendor = match text(&row.vendor) {
                v if v.is_empty() => model.split_whitespace().next().unwrap_or("").to_string(),
                v => v,
            };

            DiskLayout {
                device: format!("/dev/{}", text(&row.name)),
                disk_type: if row.rota { "HD" } else { "SSD" }.to_string(),
                name: model,
                vendor,
                size: row.size,
                interface_type: interface_type(&text(&row.tran)),
                serial_num: text(&row.serial),
                firmware_revision: text(&row.rev),
                bytes_per_sector: row.phy_sec,
                smart_status: "unknown".to_string(),
            }
        })
        .collect()
}

/// Media kind of a block device from its type and rotational flag
fn physical_kind(block_type: &str, rotational: bool) -> &'static str {
    match block_type {
        "disk" if !rotational => "SSD",
        "disk" => "HDD",
        "rom" => "CD/DVD",
        _ => "",
    }
}

/// Normalize an lsblk transport name (nvme -> NVMe, sata -> SATA)
fn interface_type(tran: &str) -> Option<String> {
    match tran {
        "" => None,
        t if t.eq_ignore_ascii_case("nvme") => Some("NVMe".to_string()),
        t => Some(t.to_uppercase()),
    }
}
