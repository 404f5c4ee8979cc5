//! Pre-built mock scenarios.

use super::filesystem::MockFs;
use super::host::MockHost;
use super::metadata::MockMetadata;
use crate::collector::traits::{RawInterface, RawSysInfo, Uname};

impl MockFs {
    /// Well-known files of a typical Debian host.
    pub fn typical_system() -> Self {
        let mut fs = Self::new();

        fs.add_file(
            "/etc/os-release",
            "\
PRETTY_NAME=\"Debian GNU/Linux 12 (bookworm)\"
NAME=\"Debian GNU/Linux\"
VERSION_ID=\"12\"
VERSION=\"12 (bookworm)\"
VERSION_CODENAME=bookworm
ID=debian
HOME_URL=\"https://www.debian.org/\"
",
        );
        fs.add_file(
            "/proc/sys/kernel/random/boot_id",
            "6b1c2f0e-3d43-4a5e-9c1f-7d2b8e4a1f00\n",
        );
        fs.add_file("/etc/machine-id", "4c4c4544004d3510804bb4c04f4d3332\n");
        fs.add_file(
            "/etc/mtab",
            "\
# <file system> <mount point> <type> <options> <dump> <pass>
/dev/sda1 / ext4 rw,relatime 0 1
/dev/sda2 /home ext4 rw,relatime 0 2
proc /proc proc rw,nosuid,nodev,noexec,relatime 0 0
tmpfs /run tmpfs rw,nosuid,nodev,size=1632412k,mode=755 0 0
",
        );

        fs
    }
}

impl MockHost {
    /// A KVM guest (x86_64) with loopback and one Ethernet interface.
    pub fn typical_system() -> Self {
        Self {
            uname: Some(Uname {
                sysname: "Linux".to_string(),
                nodename: "host1".to_string(),
                release: "6.1.0-18-amd64".to_string(),
                version: "#1 SMP PREEMPT_DYNAMIC Debian 6.1.76-1 (2024-02-01)".to_string(),
                machine: "x86_64".to_string(),
                domainname: "(none)".to_string(),
            }),
            sysinfo: Some(RawSysInfo {
                loads: [65536, 32768, 16384],
                total_ram: 16 * 1024 * 1024 * 1024,
                free_ram: 8 * 1024 * 1024 * 1024,
                shared_ram: 256 * 1024 * 1024,
                buffer_ram: 512 * 1024 * 1024,
                total_swap: 2 * 1024 * 1024 * 1024,
                free_swap: 2 * 1024 * 1024 * 1024,
                uptime: 12345,
                mem_unit: 1,
            }),
            interfaces: Some(vec![
                RawInterface {
                    name: "lo".to_string(),
                    index: 1,
                    hardware_addr: String::new(),
                    addresses: vec!["127.0.0.1/8".to_string(), "::1/128".to_string()],
                },
                RawInterface {
                    name: "eth0".to_string(),
                    index: 2,
                    hardware_addr: "52:54:00:12:34:5a".to_string(),
                    addresses: vec![
                        "192.168.1.10/24".to_string(),
                        "fe80::5054:ff:fe12:345a/64".to_string(),
                    ],
                },
            ]),
            virtualization: Some("kvm".to_string()),
        }
    }
}

impl MockMetadata {
    /// A t3.micro instance in two security groups.
    pub fn typical_instance() -> Self {
        let mut md = Self::new();
        md.insert("ami-id", "ami-0123456789abcdef0");
        md.insert("ami-launch-index", "0");
        md.insert("ami-manifest-path", "(unknown)");
        md.insert("hostname", "ip-172-31-16-5.ec2.internal");
        md.insert("instance-action", "none");
        md.insert("instance-id", "i-0abcd1234efgh5678");
        md.insert("instance-type", "t3.micro");
        md.insert("local-hostname", "ip-172-31-16-5.ec2.internal");
        md.insert("local-ipv4", "172.31.16.5");
        md.insert("mac", "0e:1a:2b:3c:4d:5e");
        md.insert("profile", "default-hvm");
        md.insert("public-hostname", "ec2-54-1-2-3.compute-1.amazonaws.com");
        md.insert("public-ipv4", "54.1.2.3");
        md.insert("reservation-id", "r-0123456789abcdef0");
        md.insert("security-groups", "default\nweb");
        md
    }
}
