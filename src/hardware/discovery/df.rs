//! Filesystem Size Parsing
//!
//! Parses POSIX `df -kPT` output into filesystem size records, with the
//! read-write flag taken from `/proc/mounts` when available.

use crate::domain::ports::FsSize;
use crate::error::{Error, Result};
use std::collections::HashMap;
use tracing::warn;

/// Arguments for `df`: KiB units, POSIX format, with filesystem type
pub const DF_ARGS: &[&str] = &["-kPT"];

/// Parse `df -kPT` output
///
/// Lines look like `/dev/sda1 ext4 102687672 48829292 48598816 51% /`.
/// Mount points may contain spaces, so everything after the capacity
/// column is the mount point. Malformed lines are skipped; output with
/// data lines of which none parse is an error.
pub fn parse_df_output(output: &str, mount_modes: &HashMap<String, bool>) -> Result<Vec<FsSize>> {
    let lines: Vec<&str> = output
        .lines()
        .filter(|line| !line.trim().is_empty() && !line.starts_with("Filesystem"))
        .collect();

    let sizes: Vec<FsSize> = lines
        .iter()
        .filter_map(|line| {
            let parsed = parse_df_line(line, mount_modes);
            if parsed.is_none() {
                warn!("Skipping malformed df line: {}", line);
            }
            parsed
        })
        .collect();

    if sizes.is_empty() && !lines.is_empty() {
        return Err(Error::OutputParse {
            source_name: "df".into(),
            reason: format!("none of {} lines matched the POSIX format", lines.len()),
        });
    }
    Ok(sizes)
}

fn parse_df_line(line: &str, mount_modes: &HashMap<String, bool>) -> Option<FsSize> {
    let fields: Vec<&str> = line.split_whitespace().collect();
    if fields.len() < 7 {
        return None;
    }

    let kib = |s: &str| s.parse::<u64>().ok().and_then(|v| v.checked_mul(1024));
    let size = kib(fields[2])?;
    let used = kib(fields[3])?;
    let available = kib(fields[4])?;
    let use_percent = fields[5].trim_end_matches('%').parse::<f64>().unwrap_or(0.0);
    let mount = fields[6..].join(" ");

    Some(FsSize {
        fs: fields[0].to_string(),
        fs_type: fields[1].to_string(),
        size,
        used,
        available,
        use_percent,
        rw: mount_modes.get(&mount).copied(),
        mount,
    })
}

/// Map mount points to their read-write flag from `/proc/mounts` content
pub fn parse_mount_modes(proc_mounts: &str) -> HashMap<String, bool> {
    proc_mounts
        .lines()
        .filter_map(|line| {
            let mut parts = line.split_whitespace();
            let _source = parts.next()?;
            let mount = parts.next()?;
            let _fs_type = parts.next()?;
            let options = parts.next()?;
            let rw = options.split(',').any(|o| o == "rw");
            Some((unescape_octal(mount), rw))
        })
        .collect()
}

/// Decode the `\040`-style octal escapes used in `/proc/mounts`
fn unescape_octal(value: &str) -> String {
    if !value.contains('\\') {
        return value.to_string();
    }

    let bytes = value.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'\\' && i + 3 < bytes.len() {
            let decoded = std::str::from_utf8(&bytes[i + 1..i + 4])
                .ok()
                .and_then(|oct| u8::from_str_radix(oct, 8).ok());
            if let Some(b) = decoded {
                out.push(b);
                i += 4;
                continue;
            }
        }
        out.push(bytes[i]);
        i += 1;
    }
    String::from_utf8_lossy(&out).into_owned()
}
