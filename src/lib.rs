//! Storage Layout - normalized host storage reporting
//!
//! Maps raw host disk enumeration (disk inventory, block devices,
//! filesystem sizes) into a storage layout report of device records with
//! brand, size, type and optional RAID group labels.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                      REST API (axum)                         │
//! │        /v1/storage/layout   /v1/storage/layout/refresh       │
//! ├──────────────────────────────────────────────────────────────┤
//! │                   Storage Service (cache)                    │
//! │   disk_layout ─┐                                             │
//! │   block_devices├─ concurrent fan-out ─► Layout Mapper        │
//! │   fs_size ─────┘                        (filters, RAID,      │
//! │                                          virtual mounts)     │
//! ├──────────────────────────────────────────────────────────────┤
//! │                    System Inspectors                         │
//! │   ┌────────────────────────┐  ┌───────────────────────────┐  │
//! │   │ Linux (lsblk, df)      │  │ Snapshot (captured JSON)  │  │
//! │   └────────────────────────┘  └───────────────────────────┘  │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Modules
//!
//! - [`api`]: REST API server and handlers
//! - [`config`]: Device filters and virtual mounts
//! - [`domain`]: Record types and the inspector port
//! - [`error`]: Error types and handling
//! - [`hardware`]: Host and snapshot inspectors
//! - [`layout`]: Mapping, RAID labels and the caching service

pub mod api;
pub mod config;
pub mod domain;
pub mod error;
pub mod hardware;
pub mod layout;

// Re-export commonly used types
pub use api::{ApiServer, ApiServerConfig, RestRouter};

pub use config::{ConfigOverrides, StorageConfig};

pub use domain::ports::{
    BlockDevice, DiskLayout, FsSize, HostPlatform, StorageInfo, StorageLayout,
    SystemInspector, SystemInspectorRef,
};

pub use error::{Error, Result};

pub use hardware::{HostSnapshot, InspectorConfig, LinuxInspector, SnapshotInspector};

pub use layout::{map_to_storage_layout, raid_label, StorageReport, StorageService};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
