//! Abstractions over the OS data sources the built-in probes read.
//!
//! `FileSystem` covers the well-known text files, `HostOs` covers the system
//! calls. Both have real implementations for Linux and in-memory mocks so the
//! probes can be exercised anywhere.

use std::io;
use std::path::Path;

/// Abstraction for reading well-known files.
pub trait FileSystem: Send + Sync {
    /// Reads the entire contents of a file as a string.
    fn read_to_string(&self, path: &Path) -> io::Result<String>;
}

/// Real filesystem implementation that delegates to `std::fs`.
#[derive(Debug, Default, Clone, Copy)]
pub struct RealFs;

impl RealFs {
    pub fn new() -> Self {
        Self
    }
}

impl FileSystem for RealFs {
    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        std::fs::read_to_string(path)
    }
}

/// Identity strings returned by `uname(2)`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Uname {
    pub sysname: String,
    pub nodename: String,
    pub release: String,
    pub version: String,
    pub machine: String,
    pub domainname: String,
}

/// Raw counters returned by `sysinfo(2)`.
///
/// Load samples are fixed-point (scaled by 65536); memory and swap counters
/// are in units of `mem_unit` bytes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawSysInfo {
    pub loads: [u64; 3],
    pub total_ram: u64,
    pub free_ram: u64,
    pub shared_ram: u64,
    pub buffer_ram: u64,
    pub total_swap: u64,
    pub free_swap: u64,
    pub uptime: i64,
    pub mem_unit: u32,
}

/// One network interface as enumerated by the OS.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawInterface {
    pub name: String,
    pub index: u32,
    /// Colon-separated hex, empty when the interface has none.
    pub hardware_addr: String,
    /// Bound addresses in CIDR notation (`10.0.0.5/24`, `fe80::1/64`).
    pub addresses: Vec<String>,
}

/// Abstraction for the system calls and tools behind the identity,
/// system-info, interface and virtualization probes.
pub trait HostOs: Send + Sync {
    fn uname(&self) -> io::Result<Uname>;

    fn sysinfo(&self) -> io::Result<RawSysInfo>;

    fn interfaces(&self) -> io::Result<Vec<RawInterface>>;

    /// Detected virtualization technology (`kvm`, `docker`, ...) or `none`.
    fn virtualization(&self) -> io::Result<String>;
}
