//! Storage Layout Service
//!
//! Collects the three introspection lists concurrently, maps them to the
//! storage layout and keeps the last report in memory.

use crate::config::StorageConfig;
use crate::domain::ports::{StorageInfo, SystemInspectorRef};
use crate::error::Result;
use crate::layout::mapper::map_to_storage_layout;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

/// A storage layout report with its collection time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageReport {
    #[serde(flatten)]
    pub info: StorageInfo,
    pub collected_at: DateTime<Utc>,
}

/// Produces and caches storage layout reports
pub struct StorageService {
    inspector: SystemInspectorRef,
    config: StorageConfig,
    cached: RwLock<Option<StorageReport>>,
}

impl StorageService {
    /// Create a new storage service
    pub fn new(inspector: SystemInspectorRef, config: StorageConfig) -> Arc<Self> {
        Arc::new(Self {
            inspector,
            config,
            cached: RwLock::new(None),
        })
    }

    pub fn config(&self) -> &StorageConfig {
        &self.config
    }

    /// Query the host and map the results, without touching the cache
    pub async fn collect(&self) -> Result<StorageInfo> {
        let started = Instant::now();
        let platform = self.inspector.platform();

        debug!(
            "Collecting storage layout via {} inspector ({})",
            self.inspector.inspector_name(),
            platform
        );

        let (disks, blocks, sizes) = tokio::try_join!(
            self.inspector.disk_layout(),
            self.inspector.block_devices(),
            self.inspector.fs_size(),
        )?;

        let layout = map_to_storage_layout(platform.is_windows(), &disks, &blocks, &sizes, &self.config);

        info!(
            "Storage layout collected: {} entries from {} disks, {} blocks, {} filesystems in {:?}",
            layout.len(),
            disks.len(),
            blocks.len(),
            sizes.len(),
            started.elapsed()
        );

        Ok(StorageInfo { layout })
    }

    /// Collect a fresh report and replace the cached one
    pub async fn refresh(&self) -> Result<StorageReport> {
        let info = self.collect().await?;
        let report = StorageReport {
            info,
            collected_at: Utc::now(),
        };
        *self.cached.write() = Some(report.clone());
        Ok(report)
    }

    /// Cached report, collected on first use
    pub async fn current(&self) -> Result<StorageReport> {
        let cached = self.cached.read().clone();
        if let Some(report) = cached {
            return Ok(report);
        }
        self.refresh().await
    }

    /// Whether a report has been collected
    pub fn is_ready(&self) -> bool {
        self.cached.read().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::{
        BlockDevice, DiskLayout, FsSize, HostPlatform, SystemInspector,
    };
    use crate::error::Error;
    use assert_matches::assert_matches;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FakeInspector {
        platform: HostPlatform,
        fail_sizes: bool,
        calls: AtomicUsize,
    }

    impl FakeInspector {
        fn new(platform: HostPlatform) -> Self {
            Self {
                platform,
                fail_sizes: false,
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl SystemInspector for FakeInspector {
        async fn disk_layout(&self) -> Result<Vec<DiskLayout>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(vec![DiskLayout {
                device: "/dev/sda".into(),
                disk_type: "SSD".into(),
                vendor: "Samsung".into(),
                size: 1000,
                interface_type: Some("NVMe".into()),
                ..Default::default()
            }])
        }

        async fn block_devices(&self) -> Result<Vec<BlockDevice>> {
            Ok(vec![BlockDevice {
                name: "sda".into(),
                block_type: "disk".into(),
                size: 1000,
                device: "/dev/sda".into(),
                ..Default::default()
            }])
        }

        async fn fs_size(&self) -> Result<Vec<FsSize>> {
            if self.fail_sizes {
                return Err(Error::CommandFailed {
                    command: "df".into(),
                    reason: "exit status 1".into(),
                });
            }
            Ok(vec![FsSize {
                fs: "tank".into(),
                size: 42,
                ..Default::default()
            }])
        }

        fn platform(&self) -> HostPlatform {
            self.platform
        }

        fn inspector_name(&self) -> &str {
            "fake"
        }
    }

    fn config_with_tank() -> StorageConfig {
        StorageConfig {
            virtual_mounts: vec!["tank".into()],
            ..StorageConfig::default()
        }
    }

    #[tokio::test]
    async fn test_collect_maps_all_sources() {
        let service = StorageService::new(Arc::new(FakeInspector::new(HostPlatform::Linux)), config_with_tank());

        let info = service.collect().await.unwrap();
        assert_eq!(info.layout.len(), 2);
        assert_eq!(info.layout[0].device, "sda");
        assert_eq!(info.layout[0].layout_type, "NVMe");
        assert_eq!(info.layout[1].device, "tank");
        assert!(!service.is_ready());
    }

    #[tokio::test]
    async fn test_windows_platform_uses_physical_device() {
        let service = StorageService::new(Arc::new(FakeInspector::new(HostPlatform::Windows)), StorageConfig::default());

        let info = service.collect().await.unwrap();
        assert_eq!(info.layout[0].device, "/dev/sda");
    }

    #[tokio::test]
    async fn test_collect_fails_when_any_source_fails() {
        let mut inspector = FakeInspector::new(HostPlatform::Linux);
        inspector.fail_sizes = true;
        let service = StorageService::new(Arc::new(inspector), StorageConfig::default());

        assert_matches!(service.collect().await, Err(Error::CommandFailed { .. }));
        assert_matches!(service.current().await, Err(Error::CommandFailed { .. }));
        assert!(!service.is_ready());
    }

    #[tokio::test]
    async fn test_current_is_cached_until_refresh() {
        let inspector = Arc::new(FakeInspector::new(HostPlatform::Linux));
        let service = StorageService::new(inspector.clone(), config_with_tank());

        let first = service.current().await.unwrap();
        let second = service.current().await.unwrap();
        assert_eq!(first, second);
        assert_eq!(inspector.calls.load(Ordering::SeqCst), 1);
        assert!(service.is_ready());

        service.refresh().await.unwrap();
        assert_eq!(inspector.calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_report_serialization_is_flat() {
        let report = StorageReport {
            info: StorageInfo::default(),
            collected_at: Utc::now(),
        };
        let json = serde_json::to_value(&report).unwrap();
        assert!(json["layout"].is_array());
        assert!(json["collectedAt"].is_string());
    }
}
