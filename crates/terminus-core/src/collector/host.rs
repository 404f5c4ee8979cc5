//! `HostOs` backed by the running Linux kernel.

use std::collections::HashMap;
use std::io;
use std::net::{SocketAddrV4, SocketAddrV6};
use std::process::{Command, Stdio};

use libc::c_char;
use nix::ifaddrs::getifaddrs;
use nix::net::if_::if_nametoindex;
use nix::sys::socket::SockaddrStorage;

use crate::collector::traits::{HostOs, RawInterface, RawSysInfo, Uname};

/// Tool printing the detected hypervisor or container technology.
const DETECT_VIRT: &str = "systemd-detect-virt";

/// Reads identity, system info and interfaces from the kernel.
#[derive(Debug, Default, Clone, Copy)]
pub struct RealHost;

impl RealHost {
    pub fn new() -> Self {
        Self
    }
}

impl HostOs for RealHost {
    fn uname(&self) -> io::Result<Uname> {
        // SAFETY: utsname is a plain C struct of byte arrays, valid when zeroed,
        // and uname() only writes into the buffer we pass.
        let mut buf: libc::utsname = unsafe { std::mem::zeroed() };
        if unsafe { libc::uname(&mut buf) } != 0 {
            return Err(io::Error::last_os_error());
        }

        Ok(Uname {
            sysname: chars_to_string(&buf.sysname),
            nodename: chars_to_string(&buf.nodename),
            release: chars_to_string(&buf.release),
            version: chars_to_string(&buf.version),
            machine: chars_to_string(&buf.machine),
            domainname: chars_to_string(&buf.domainname),
        })
    }

    fn sysinfo(&self) -> io::Result<RawSysInfo> {
        // SAFETY: same as above, sysinfo() fills a caller-owned plain struct.
        let mut info: libc::sysinfo = unsafe { std::mem::zeroed() };
        if unsafe { libc::sysinfo(&mut info) } != 0 {
            return Err(io::Error::last_os_error());
        }

        Ok(RawSysInfo {
            loads: [
                u64::from(info.loads[0]),
                u64::from(info.loads[1]),
                u64::from(info.loads[2]),
            ],
            total_ram: u64::from(info.totalram),
            free_ram: u64::from(info.freeram),
            shared_ram: u64::from(info.sharedram),
            buffer_ram: u64::from(info.bufferram),
            total_swap: u64::from(info.totalswap),
            free_swap: u64::from(info.freeswap),
            uptime: i64::from(info.uptime),
            mem_unit: info.mem_unit,
        })
    }

    fn interfaces(&self) -> io::Result<Vec<RawInterface>> {
        let mut interfaces: Vec<RawInterface> = Vec::new();
        let mut positions: HashMap<String, usize> = HashMap::new();

        for ifaddr in getifaddrs()? {
            let pos = *positions
                .entry(ifaddr.interface_name.clone())
                .or_insert_with(|| {
                    interfaces.push(RawInterface {
                        index: if_nametoindex(ifaddr.interface_name.as_str()).unwrap_or(0),
                        name: ifaddr.interface_name.clone(),
                        ..Default::default()
                    });
                    interfaces.len() - 1
                });
            let iface = &mut interfaces[pos];

            let Some(address) = ifaddr.address else {
                continue;
            };

            if let Some(link) = address.as_link_addr() {
                if let Some(mac) = link.addr() {
                    iface.hardware_addr = format_hardware_addr(&mac);
                }
            } else if let Some(sin) = address.as_sockaddr_in() {
                let ip = *SocketAddrV4::from(*sin).ip();
                let prefix = ifaddr
                    .netmask
                    .as_ref()
                    .and_then(netmask_prefix)
                    .unwrap_or(32);
                iface.addresses.push(format!("{}/{}", ip, prefix));
            } else if let Some(sin6) = address.as_sockaddr_in6() {
                let ip = *SocketAddrV6::from(*sin6).ip();
                let prefix = ifaddr
                    .netmask
                    .as_ref()
                    .and_then(netmask_prefix)
                    .unwrap_or(128);
                iface.addresses.push(format!("{}/{}", ip, prefix));
            }
        }

        Ok(interfaces)
    }

    fn virtualization(&self) -> io::Result<String> {
        // Exits non-zero on bare metal after printing "none".
        let output = Command::new(DETECT_VIRT)
            .stdin(Stdio::null())
            .stderr(Stdio::null())
            .output()?;
        let detected = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if detected.is_empty() {
            return Err(io::Error::other(format!(
                "{} printed nothing ({})",
                DETECT_VIRT, output.status
            )));
        }
        Ok(detected)
    }
}

fn netmask_prefix(mask: &SockaddrStorage) -> Option<u8> {
    if let Some(sin) = mask.as_sockaddr_in() {
        return Some(u32::from(*SocketAddrV4::from(*sin).ip()).count_ones() as u8);
    }
    mask.as_sockaddr_in6()
        .map(|sin6| u128::from(*SocketAddrV6::from(*sin6).ip()).count_ones() as u8)
}

/// Formats a MAC address as `aa:bb:cc:dd:ee:ff`. All-zero addresses (loopback)
/// are reported as empty.
pub(crate) fn format_hardware_addr(mac: &[u8]) -> String {
    if mac.iter().all(|b| *b == 0) {
        return String::new();
    }
    mac.iter()
        .map(|b| format!("{:02x}", b))
        .collect::<Vec<_>>()
        .join(":")
}

/// Converts a NUL-terminated fixed-width `uname` field to a string.
pub(crate) fn chars_to_string(chars: &[c_char]) -> String {
    let bytes: Vec<u8> = chars
        .iter()
        .take_while(|c| **c != 0)
        .map(|c| *c as u8)
        .collect();
    String::from_utf8_lossy(&bytes).into_owned()
}
