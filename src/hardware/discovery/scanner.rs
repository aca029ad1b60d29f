//! Linux Host Inspector
//!
//! Enumerates disks, block devices and filesystem sizes on Linux by
//! running `lsblk` and `df` and reading `/proc/mounts`.

use crate::domain::ports::{BlockDevice, DiskLayout, FsSize, HostPlatform, SystemInspector};
use crate::error::{Error, Result};
use crate::hardware::discovery::df::{parse_df_output, parse_mount_modes, DF_ARGS};
use crate::hardware::discovery::lsblk::{
    block_devices_from_rows, disk_layout_from_rows, parse_lsblk_json, LsblkDevice, BLOCK_ARGS,
    DISK_ARGS,
};
use async_trait::async_trait;
use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::process::Command;
use tracing::{debug, warn};

// =============================================================================
// Inspector Configuration
// =============================================================================

/// Configuration for the Linux inspector
#[derive(Debug, Clone)]
pub struct InspectorConfig {
    /// Path to the mount table (for testing)
    pub proc_mounts_path: PathBuf,
    /// Upper bound on each external command
    pub command_timeout: Duration,
}

impl Default for InspectorConfig {
    fn default() -> Self {
        Self {
            proc_mounts_path: PathBuf::from("/proc/mounts"),
            command_timeout: Duration::from_secs(10),
        }
    }
}

// =============================================================================
// Command Runner
// =============================================================================

/// Runs external programs and returns their standard output
#[async_trait]
pub trait CommandRunner: Send + Sync {
    async fn run(&self, program: &str, args: &[&str]) -> Result<String>;
}

/// Runs commands on the local host
#[derive(Debug)]
pub struct SystemCommandRunner {
    timeout: Duration,
}

impl SystemCommandRunner {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

#[async_trait]
impl CommandRunner for SystemCommandRunner {
    async fn run(&self, program: &str, args: &[&str]) -> Result<String> {
        let command_line = format!("{} {}", program, args.join(" "));
        debug!("Running {}", command_line);

        let output = tokio::time::timeout(self.timeout, Command::new(program).args(args).output())
            .await
            .map_err(|_| Error::CommandFailed {
                command: command_line.clone(),
                reason: format!("timed out after {:?}", self.timeout),
            })?
            .map_err(|e| Error::CommandFailed {
                command: command_line.clone(),
                reason: e.to_string(),
            })?;

        // df exits non-zero when a single mount is unreadable but still prints the rest
        if !output.status.success() && output.stdout.is_empty() {
            return Err(Error::CommandFailed {
                command: command_line,
                reason: format!(
                    "{}: {}",
                    output.status,
                    String::from_utf8_lossy(&output.stderr).trim()
                ),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

// =============================================================================
// Linux Inspector
// =============================================================================

/// Inspects storage on the local Linux host
pub struct LinuxInspector {
    config: InspectorConfig,
    runner: Arc<dyn CommandRunner>,
}

impl fmt::Debug for LinuxInspector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LinuxInspector")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl LinuxInspector {
    /// Create an inspector with a custom command runner
    pub fn new(config: InspectorConfig, runner: Arc<dyn CommandRunner>) -> Self {
        Self { config, runner }
    }

    /// Create an inspector for the running host
    pub fn for_host(config: InspectorConfig) -> Result<Self> {
        let platform = HostPlatform::current();
        if platform != HostPlatform::Linux {
            return Err(Error::UnsupportedPlatform {
                platform: platform.to_string(),
            });
        }
        let runner = Arc::new(SystemCommandRunner::new(config.command_timeout));
        Ok(Self::new(config, runner))
    }

    async fn lsblk(&self, args: &[&str]) -> Result<Vec<LsblkDevice>> {
        let output = self.runner.run("lsblk", args).await?;
        parse_lsblk_json(&output)
    }

    async fn mount_modes(&self) -> HashMap<String, bool> {
        match tokio::fs::read_to_string(&self.config.proc_mounts_path).await {
            Ok(content) => parse_mount_modes(&content),
            Err(e) => {
                warn!(
                    "Failed to read {}: {}",
                    self.config.proc_mounts_path.display(),
                    e
                );
                HashMap::new()
            }
        }
    }
}

#[async_trait]
impl SystemInspector for LinuxInspector {
    async fn disk_layout(&self) -> Result<Vec<DiskLayout>> {
        let rows = self.lsblk(DISK_ARGS).await?;
        let disks = disk_layout_from_rows(&rows);
        debug!("Found {} physical disks", disks.len());
        Ok(disks)
    }

    async fn block_devices(&self) -> Result<Vec<BlockDevice>> {
        let rows = self.lsblk(BLOCK_ARGS).await?;
        let blocks = block_devices_from_rows(&rows);
        debug!("Found {} block devices", blocks.len());
        Ok(blocks)
    }

    async fn fs_size(&self) -> Result<Vec<FsSize>> {
        let output = self.runner.run("df", DF_ARGS).await?;
        let modes = self.mount_modes().await;
        let sizes = parse_df_output(&output, &modes)?;
        debug!("Found {} mounted filesystems", sizes.len());
        Ok(sizes)
    }

    fn platform(&self) -> HostPlatform {
        HostPlatform::Linux
    }

    fn inspector_name(&self) -> &str {
        "linux"
    }
}
