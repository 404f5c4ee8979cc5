//! Mock implementation of [`HostOs`].

use std::io;

use crate::collector::traits::{HostOs, RawInterface, RawSysInfo, Uname};

/// Returns canned values; a `None` field makes the matching call fail.
#[derive(Debug, Clone, Default)]
pub struct MockHost {
    pub uname: Option<Uname>,
    pub sysinfo: Option<RawSysInfo>,
    pub interfaces: Option<Vec<RawInterface>>,
    pub virtualization: Option<String>,
}

impl MockHost {
    /// Creates a host on which every call fails.
    pub fn new() -> Self {
        Self::default()
    }
}

fn unavailable(call: &str) -> io::Error {
    io::Error::new(io::ErrorKind::Unsupported, format!("{} unavailable", call))
}

impl HostOs for MockHost {
    fn uname(&self) -> io::Result<Uname> {
        self.uname.clone().ok_or_else(|| unavailable("uname"))
    }

    fn sysinfo(&self) -> io::Result<RawSysInfo> {
        self.sysinfo.clone().ok_or_else(|| unavailable("sysinfo"))
    }

    fn interfaces(&self) -> io::Result<Vec<RawInterface>> {
        self.interfaces
            .clone()
            .ok_or_else(|| unavailable("getifaddrs"))
    }

    fn virtualization(&self) -> io::Result<String> {
        self.virtualization
            .clone()
            .ok_or_else(|| unavailable("systemd-detect-virt"))
    }
}
