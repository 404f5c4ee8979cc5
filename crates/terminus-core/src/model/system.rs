//! Composite `System` record.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// All built-in probe outputs of one collection run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SystemFacts {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub architecture: Option<String>,
    #[serde(rename = "BootID", skip_serializing_if = "Option::is_none")]
    pub boot_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<Date>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub domainname: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hostname: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub network: Option<Network>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kernel: Option<Kernel>,
    #[serde(rename = "MachineID", skip_serializing_if = "Option::is_none")]
    pub machine_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub memory: Option<Memory>,
    #[serde(rename = "OSRelease", skip_serializing_if = "Option::is_none")]
    pub os_release: Option<OsRelease>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub swap: Option<Swap>,
    /// Seconds since boot.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uptime: Option<i64>,
    /// Hypervisor or container technology, `none` on bare metal.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub virtualization: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub load_average: Option<LoadAverage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_systems: Option<FileSystems>,
}

/// Load averages formatted with two decimals, e.g. `"0.42"`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct LoadAverage {
    pub one: String,
    pub five: String,
    // Third kernel sample: the 15-minute average.
    pub ten: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Date {
    #[serde(rename = "Unix")]
    pub unix: i64,
    #[serde(rename = "UTC")]
    pub utc: String,
}

/// Swap counters in bytes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Swap {
    pub total: u64,
    pub free: u64,
}

/// Fields recognized in `/etc/os-release`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct OsRelease {
    pub name: String,
    #[serde(rename = "ID")]
    pub id: String,
    pub pretty_name: String,
    pub version: String,
    #[serde(rename = "VersionID")]
    pub version_id: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Kernel {
    pub name: String,
    pub release: String,
    pub version: String,
}

/// Memory counters in bytes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Memory {
    pub total: u64,
    pub free: u64,
    pub shared: u64,
    pub buffered: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Network {
    pub interfaces: Interfaces,
}

/// Interface facts keyed by interface name.
pub type Interfaces = BTreeMap<String, Interface>;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Interface {
    pub name: String,
    pub index: u32,
    pub hardware_addr: String,
    /// Every bound address in CIDR notation, in enumeration order.
    pub ip_addresses: Vec<String>,
    pub ip4_addresses: Vec<Ip4Address>,
    pub ip6_addresses: Vec<Ip6Address>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Ip4Address {
    #[serde(rename = "CIDR")]
    pub cidr: String,
    pub ip: String,
    /// Dotted-quad netmask, e.g. `255.255.255.0`.
    pub netmask: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Ip6Address {
    #[serde(rename = "CIDR")]
    pub cidr: String,
    pub ip: String,
    pub prefix: u8,
}

/// Mount-table entries keyed by device. A device mounted twice keeps its last entry.
pub type FileSystems = BTreeMap<String, FileSystem>;

/// One mount-table line (see fstab(5)).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct FileSystem {
    pub device: String,
    pub mount_point: String,
    #[serde(rename = "Type")]
    pub fs_type: String,
    pub options: Vec<String>,
    pub dump_freq: u64,
    pub pass_no: u64,
}
