//! Storage Layout
//!
//! Reports the storage layout of the local host (or of a captured
//! snapshot) once on stdout, or serves it over a REST API.

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use storage_layout::{
    ApiServer, ApiServerConfig, ConfigOverrides, InspectorConfig, LinuxInspector,
    SnapshotInspector, StorageConfig, StorageService, SystemInspectorRef,
};

// =============================================================================
// CLI Arguments
// =============================================================================

/// Storage Layout - normalized disk, RAID and virtual mount reporting
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// REST API bind address
    #[arg(long, env = "API_ADDR", default_value = "0.0.0.0:3001")]
    api_addr: String,

    /// YAML file with device_filter, type_filter and virtual_mounts
    #[arg(long, env = "STORAGE_CONFIG")]
    config: Option<PathBuf>,

    /// Block device names to exclude (comma separated)
    #[arg(long, env = "STORAGE_FS_DEVICE_FILTER", value_delimiter = ',')]
    device_filter: Option<Vec<String>>,

    /// Filesystem types to exclude (comma separated)
    #[arg(long, env = "STORAGE_FS_TYPE_FILTER", value_delimiter = ',')]
    type_filter: Option<Vec<String>>,

    /// Filesystems to report as virtual entries (comma separated)
    #[arg(long, env = "STORAGE_FS_VIRTUAL_MOUNTS", value_delimiter = ',')]
    virtual_mounts: Option<Vec<String>>,

    /// Read enumeration data from a JSON snapshot instead of the host
    #[arg(long, env = "STORAGE_SNAPSHOT")]
    snapshot: Option<PathBuf>,

    /// Timeout for each host command in seconds
    #[arg(long, env = "COMMAND_TIMEOUT_SECS", default_value = "10")]
    command_timeout_secs: u64,

    /// Print the layout once and exit
    #[arg(long)]
    once: bool,

    /// Pretty-print JSON output (with --once)
    #[arg(long)]
    pretty: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    log_level: String,

    /// Output logs as JSON
    #[arg(long, env = "LOG_JSON")]
    log_json: bool,
}

// =============================================================================
// Main
// =============================================================================

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    init_logging(&args);

    info!("Starting {} v{}", storage_layout::NAME, storage_layout::VERSION);

    let config = load_config(&args)?;
    info!(
        "  Device filter: {:?}, type filter: {:?}, virtual mounts: {:?}",
        config.device_filter, config.type_filter, config.virtual_mounts
    );

    let inspector = build_inspector(&args)?;
    let service = StorageService::new(inspector, config);

    if args.once {
        let info = service.collect().await.context("Failed to collect storage layout")?;
        let json = if args.pretty {
            serde_json::to_string_pretty(&info)?
        } else {
            serde_json::to_string(&info)?
        };
        println!("{}", json);
        return Ok(());
    }

    let api_config = ApiServerConfig {
        rest_addr: args
            .api_addr
            .parse()
            .with_context(|| format!("Invalid REST API address: {}", args.api_addr))?,
        ..Default::default()
    };

    let server = ApiServer::new(api_config, service);

    let shutdown = server.shutdown_handle();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("Received Ctrl-C, shutting down");
                let _ = shutdown.send(());
            }
            Err(e) => error!("Failed to listen for Ctrl-C: {}", e),
        }
    });

    server.run().await?;

    info!("Shutdown complete");
    Ok(())
}

// =============================================================================
// Setup
// =============================================================================

fn load_config(args: &Args) -> anyhow::Result<StorageConfig> {
    let base = match &args.config {
        Some(path) => StorageConfig::from_yaml_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => StorageConfig::default(),
    };

    Ok(base.with_overrides(ConfigOverrides {
        device_filter: args.device_filter.clone(),
        type_filter: args.type_filter.clone(),
        virtual_mounts: args.virtual_mounts.clone(),
    }))
}

fn build_inspector(args: &Args) -> anyhow::Result<SystemInspectorRef> {
    if let Some(path) = &args.snapshot {
        info!("  Inspector: snapshot {}", path.display());
        return Ok(Arc::new(SnapshotInspector::from_file(path)?));
    }

    info!("  Inspector: local host");
    let inspector = LinuxInspector::for_host(InspectorConfig {
        command_timeout: std::time::Duration::from_secs(args.command_timeout_secs),
        ..Default::default()
    })?;
    Ok(Arc::new(inspector))
}

fn init_logging(args: &Args) {
    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let mut filter = EnvFilter::from_default_env().add_directive(level.into());
    for directive in ["hyper=warn", "tower_http=info"] {
        if let Ok(d) = directive.parse() {
            filter = filter.add_directive(d);
        }
    }

    // Logs go to stderr so --once output stays valid JSON
    if args.log_json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
            .init();
    }
}
