//! Parsers for the text sources behind the built-in probes.
//!
//! These are pure functions over string input so they can be tested without
//! touching the host.

use ipnetwork::IpNetwork;

use crate::error::ParseError;
use crate::model::{FileSystem, FileSystems, Ip4Address, Ip6Address, OsRelease};

/// Fixed-point scale of the raw `sysinfo(2)` load samples (`1 << SI_LOAD_SHIFT`).
pub const LOADS_SCALE: f64 = 65536.0;

/// Converts a raw kernel load sample to a two-decimal string.
pub fn scale_load(raw: u64) -> String {
    format!("{:.2}", raw as f64 / LOADS_SCALE)
}

/// Parses `/etc/os-release` (see os-release(5)).
///
/// Each line is split on its first `=`; the value is trimmed and unquoted.
/// Keys other than NAME, ID, PRETTY_NAME, VERSION and VERSION_ID are ignored.
pub fn parse_os_release(content: &str) -> OsRelease {
    let mut release = OsRelease::default();

    for line in content.lines() {
        let Some((key, value)) = line.split_once('=') else {
            continue;
        };
        let value = unquote(value.trim()).to_string();

        match key.trim() {
            "NAME" => release.name = value,
            "ID" => release.id = value,
            "PRETTY_NAME" => release.pretty_name = value,
            "VERSION" => release.version = value,
            "VERSION_ID" => release.version_id = value,
            _ => {}
        }
    }

    release
}

/// Strips one matching pair of `"` or `'` quotes.
fn unquote(value: &str) -> &str {
    ['"', '\'']
        .into_iter()
        .find_map(|q| value.strip_prefix(q)?.strip_suffix(q))
        .unwrap_or(value)
}

/// Parses a mount table in fstab(5) format (`/etc/mtab`, `/proc/mounts`).
///
/// Comment and blank lines are skipped. A line with fewer than six fields or a
/// non-numeric dump/pass field fails the whole table.
pub fn parse_mount_table(content: &str) -> Result<FileSystems, ParseError> {
    let mut file_systems = FileSystems::new();

    for (lineno, line) in content.lines().enumerate() {
        let line = line.trim_start();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() < 6 {
            return Err(ParseError::new(format!(
                "mount table line {}: expected 6 fields, got {}",
                lineno + 1,
                fields.len()
            )));
        }

        let parse_num = |idx: usize, name: &str| -> Result<u64, ParseError> {
            fields[idx].parse().map_err(|_| {
                ParseError::new(format!(
                    "mount table line {}: invalid {} {:?}",
                    lineno + 1,
                    name,
                    fields[idx]
                ))
            })
        };

        let fs = FileSystem {
            device: unescape_mount_field(fields[0]),
            mount_point: unescape_mount_field(fields[1]),
            fs_type: unescape_mount_field(fields[2]),
            options: fields[3].split(',').map(str::to_string).collect(),
            dump_freq: parse_num(4, "dump frequency")?,
            pass_no: parse_num(5, "pass number")?,
        };
        file_systems.insert(fs.device.clone(), fs);
    }

    Ok(file_systems)
}

/// Decodes the three-digit octal escapes the kernel writes for whitespace and
/// backslashes in mount-table fields (`\040` is a space).
fn unescape_mount_field(field: &str) -> String {
    if !field.contains('\\') {
        return field.to_string();
    }

    let bytes = field.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'\\'
            && i + 3 < bytes.len()
            && bytes[i + 1..=i + 3].iter().all(|b| (b'0'..=b'7').contains(b))
        {
            let code = bytes[i + 1..=i + 3]
                .iter()
                .fold(0u32, |acc, b| acc * 8 + u32::from(b - b'0'));
            if let Ok(b) = u8::try_from(code) {
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

/// Splits CIDR address strings into IPv4 and IPv6 entries.
///
/// Strings that are not valid CIDR notation are left out of both lists.
pub fn classify_addresses(cidrs: &[String]) -> (Vec<Ip4Address>, Vec<Ip6Address>) {
    let mut v4 = Vec::new();
    let mut v6 = Vec::new();

    for cidr in cidrs {
        match cidr.parse::<IpNetwork>() {
            Ok(IpNetwork::V4(net)) => v4.push(Ip4Address {
                cidr: cidr.clone(),
                ip: net.ip().to_string(),
                netmask: net.mask().to_string(),
            }),
            Ok(IpNetwork::V6(net)) => v6.push(Ip6Address {
                cidr: cidr.clone(),
                ip: net.ip().to_string(),
                prefix: net.prefix(),
            }),
            Err(e) => {
                tracing::debug!(cidr = %cidr, error = %e, "skipping unparsable interface address");
            }
        }
    }

    (v4, v6)
}
