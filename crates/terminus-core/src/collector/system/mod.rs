//! Built-in probe set.
//!
//! Nine probes, plus the optional cloud-metadata probe, run concurrently
//! against their own data source. Each one writes only its own fields of the
//! shared [`SystemFacts`] under a single record-wide lock. A failing probe is
//! logged and leaves its fields unset; the others are unaffected.

pub mod parser;

use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::thread::{self, Scope};
use std::time::Instant;

use chrono::Utc;
use tracing::debug;

use crate::collector::cloud::{self, MetadataSource};
use crate::collector::fanout::spawn_isolated;
use crate::collector::traits::{FileSystem, HostOs};
use crate::error::ProbeError;
use crate::model::{
    Date, Ec2Facts, FileSystems, Interface, Interfaces, Kernel, LoadAverage, Memory, Network,
    OsRelease, Swap, SystemFacts,
};
use parser::{classify_addresses, parse_mount_table, parse_os_release, scale_load};

pub const OS_RELEASE_PATH: &str = "/etc/os-release";
pub const BOOT_ID_PATH: &str = "/proc/sys/kernel/random/boot_id";
pub const MACHINE_ID_PATH: &str = "/etc/machine-id";
pub const MOUNT_TABLE_PATH: &str = "/etc/mtab";

/// Everything the built-in probes produced in one run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BuiltinFacts {
    pub system: SystemFacts,
    /// Present only when the metadata endpoint answered.
    pub ec2: Option<Ec2Facts>,
}

/// Runs the built-in probes against a filesystem and a host.
pub struct SystemCollector<'a, F: FileSystem, H: HostOs> {
    fs: &'a F,
    host: &'a H,
    metadata: Option<&'a dyn MetadataSource>,
}

impl<'a, F: FileSystem, H: HostOs> SystemCollector<'a, F, H> {
    pub fn new(fs: &'a F, host: &'a H) -> Self {
        Self {
            fs,
            host,
            metadata: None,
        }
    }

    /// Adds the cloud-metadata probe to the set.
    pub fn with_metadata(mut self, source: &'a dyn MetadataSource) -> Self {
        self.metadata = Some(source);
        self
    }

    /// Launches every probe and waits for all of them.
    pub fn collect(&self) -> BuiltinFacts {
        let start = Instant::now();
        let facts = Mutex::new(SystemFacts::default());
        let ec2 = Mutex::new(None);

        thread::scope(|s| {
            let facts = &facts;

            spawn_probe(s, "identity", move || {
                let uname = self.host.uname().map_err(|source| ProbeError::Syscall {
                    call: "uname",
                    source,
                })?;
                let mut f = lock(facts);
                f.architecture = Some(uname.machine);
                f.hostname = Some(uname.nodename);
                f.domainname = Some(uname.domainname);
                f.kernel = Some(Kernel {
                    name: uname.sysname,
                    release: uname.release,
                    version: uname.version,
                });
                Ok(())
            });

            spawn_probe(s, "os_release", move || {
                let release = self.os_release()?;
                lock(facts).os_release = Some(release);
                Ok(())
            });

            spawn_probe(s, "boot_id", move || {
                let id = self.read_id(BOOT_ID_PATH)?;
                lock(facts).boot_id = Some(id);
                Ok(())
            });

            spawn_probe(s, "machine_id", move || {
                let id = self.read_id(MACHINE_ID_PATH)?;
                lock(facts).machine_id = Some(id);
                Ok(())
            });

            spawn_probe(s, "interfaces", move || {
                let interfaces = self.interfaces()?;
                lock(facts).network = Some(Network { interfaces });
                Ok(())
            });

            spawn_probe(s, "sysinfo", move || {
                let info = self.host.sysinfo().map_err(|source| ProbeError::Syscall {
                    call: "sysinfo",
                    source,
                })?;
                let unit = u64::from(info.mem_unit.max(1));
                let mut f = lock(facts);
                f.memory = Some(Memory {
                    total: info.total_ram * unit,
                    free: info.free_ram * unit,
                    shared: info.shared_ram * unit,
                    buffered: info.buffer_ram * unit,
                });
                f.swap = Some(Swap {
                    total: info.total_swap * unit,
                    free: info.free_swap * unit,
                });
                f.uptime = Some(info.uptime);
                f.load_average = Some(LoadAverage {
                    one: scale_load(info.loads[0]),
                    five: scale_load(info.loads[1]),
                    ten: scale_load(info.loads[2]),
                });
                Ok(())
            });

            spawn_probe(s, "virtualization", move || {
                let detected = self
                    .host
                    .virtualization()
                    .map_err(|source| ProbeError::Command {
                        command: "systemd-detect-virt",
                        source,
                    })?;
                lock(facts).virtualization = Some(detected);
                Ok(())
            });

            spawn_probe(s, "date", move || {
                lock(facts).date = Some(current_date());
                Ok(())
            });

            spawn_probe(s, "file_systems", move || {
                let file_systems = self.file_systems()?;
                lock(facts).file_systems = Some(file_systems);
                Ok(())
            });

            if let Some(source) = self.metadata {
                let ec2 = &ec2;
                spawn_probe(s, "ec2", move || {
                    *lock(ec2) = cloud::collect_ec2(source)?;
                    Ok(())
                });
            }
        });

        debug!(
            elapsed_ms = start.elapsed().as_millis() as u64,
            "built-in probes finished"
        );

        BuiltinFacts {
            system: facts.into_inner().unwrap_or_else(PoisonError::into_inner),
            ec2: ec2.into_inner().unwrap_or_else(PoisonError::into_inner),
        }
    }

    fn read(&self, path: &str) -> Result<String, ProbeError> {
        self.fs
            .read_to_string(Path::new(path))
            .map_err(|source| ProbeError::Read {
                path: PathBuf::from(path),
                source,
            })
    }

    /// Reads a single-line identifier file.
    fn read_id(&self, path: &str) -> Result<String, ProbeError> {
        Ok(self.read(path)?.trim().to_string())
    }

    fn os_release(&self) -> Result<OsRelease, ProbeError> {
        Ok(parse_os_release(&self.read(OS_RELEASE_PATH)?))
    }

    fn file_systems(&self) -> Result<FileSystems, ProbeError> {
        Ok(parse_mount_table(&self.read(MOUNT_TABLE_PATH)?)?)
    }

    fn interfaces(&self) -> Result<Interfaces, ProbeError> {
        let raw = self
            .host
            .interfaces()
            .map_err(|source| ProbeError::Syscall {
                call: "getifaddrs",
                source,
            })?;

        Ok(raw
            .into_iter()
            .map(|iface| {
                let (ip4_addresses, ip6_addresses) = classify_addresses(&iface.addresses);
                let interface = Interface {
                    name: iface.name.clone(),
                    index: iface.index,
                    hardware_addr: iface.hardware_addr,
                    ip_addresses: iface.addresses,
                    ip4_addresses,
                    ip6_addresses,
                };
                (iface.name, interface)
            })
            .collect())
    }
}

fn spawn_probe<'scope, 'env>(
    scope: &'scope Scope<'scope, 'env>,
    probe: &'static str,
    job: impl FnOnce() -> Result<(), ProbeError> + Send + 'scope,
) {
    spawn_isolated(scope, "probe", probe.to_string(), job);
}

fn current_date() -> Date {
    let now = Utc::now();
    Date {
        unix: now.timestamp(),
        utc: now.format("%Y-%m-%d %H:%M:%S%.9f UTC").to_string(),
    }
}

// Probes write disjoint fields, so a poisoned record is still consistent.
fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collector::mock::{MockFs, MockHost, MockMetadata};
    use crate::collector::traits::{RawInterface, RawSysInfo, Uname};
    use std::io;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    fn collect(fs: &MockFs, host: &MockHost) -> SystemFacts {
        SystemCollector::new(fs, host).collect().system
    }

    #[test]
    fn test_collect_typical_system() {
        let fs = MockFs::typical_system();
        let host = MockHost::typical_system();
        let facts = collect(&fs, &host);

        assert_eq!(facts.hostname.as_deref(), Some("host1"));
        assert_eq!(facts.architecture.as_deref(), Some("x86_64"));
        assert_eq!(facts.domainname.as_deref(), Some("(none)"));
        assert_eq!(facts.kernel.as_ref().unwrap().name, "Linux");
        assert_eq!(facts.os_release.as_ref().unwrap().id, "debian");
        assert_eq!(
            facts.boot_id.as_deref(),
            Some("6b1c2f0e-3d43-4a5e-9c1f-7d2b8e4a1f00")
        );
        assert_eq!(
            facts.machine_id.as_deref(),
            Some("4c4c4544004d3510804bb4c04f4d3332")
        );
        assert_eq!(facts.uptime, Some(12345));
        assert_eq!(facts.load_average.as_ref().unwrap().one, "1.00");
        assert_eq!(facts.load_average.as_ref().unwrap().five, "0.50");
        assert_eq!(
            facts.memory.as_ref().unwrap().total,
            16 * 1024 * 1024 * 1024
        );
        assert_eq!(facts.swap.as_ref().unwrap().free, 2 * 1024 * 1024 * 1024);
        assert!(facts.date.is_some());
        assert_eq!(facts.virtualization.as_deref(), Some("kvm"));

        let fs_map = facts.file_systems.as_ref().unwrap();
        assert_eq!(fs_map["/dev/sda1"].pass_no, 1);

        let interfaces = &facts.network.as_ref().unwrap().interfaces;
        let eth0 = &interfaces["eth0"];
        assert_eq!(eth0.index, 2);
        assert_eq!(eth0.hardware_addr, "52:54:00:12:34:5a");
        assert_eq!(eth0.ip_addresses.len(), 2);
        assert_eq!(eth0.ip4_addresses[0].netmask, "255.255.255.0");
        assert_eq!(eth0.ip6_addresses[0].prefix, 64);
        assert_eq!(interfaces["lo"].hardware_addr, "");
    }

    #[test]
    fn test_mem_unit_scaling() {
        let fs = MockFs::typical_system();
        let mut host = MockHost::typical_system();
        if let Some(info) = host.sysinfo.as_mut() {
            info.total_ram = 1000;
            info.mem_unit = 4096;
        }
        let facts = collect(&fs, &host);
        assert_eq!(facts.memory.unwrap().total, 4_096_000);
    }

    /// Clears the fields a given probe is responsible for.
    fn without_probe(mut facts: SystemFacts, probe: &str) -> SystemFacts {
        match probe {
            "os_release" => facts.os_release = None,
            "boot_id" => facts.boot_id = None,
            "machine_id" => facts.machine_id = None,
            "file_systems" => facts.file_systems = None,
            "identity" => {
                facts.architecture = None;
                facts.hostname = None;
                facts.domainname = None;
                facts.kernel = None;
            }
            "sysinfo" => {
                facts.memory = None;
                facts.swap = None;
                facts.uptime = None;
                facts.load_average = None;
            }
            "interfaces" => facts.network = None,
            "virtualization" => facts.virtualization = None,
            _ => unreachable!(),
        }
        facts.date = None;
        facts
    }

    #[test]
    fn test_probe_isolation() {
        let control = collect(&MockFs::typical_system(), &MockHost::typical_system());

        let file_probes = [
            (OS_RELEASE_PATH, "os_release"),
            (BOOT_ID_PATH, "boot_id"),
            (MACHINE_ID_PATH, "machine_id"),
            (MOUNT_TABLE_PATH, "file_systems"),
        ];
        for (path, probe) in file_probes {
            let mut fs = MockFs::typical_system();
            fs.remove_file(path);
            let mut facts = collect(&fs, &MockHost::typical_system());
            facts.date = None;
            assert_eq!(facts, without_probe(control.clone(), probe), "{}", probe);
        }

        let host_probes = ["identity", "sysinfo", "interfaces", "virtualization"];
        for probe in host_probes {
            let mut host = MockHost::typical_system();
            match probe {
                "identity" => host.uname = None,
                "sysinfo" => host.sysinfo = None,
                "interfaces" => host.interfaces = None,
                _ => host.virtualization = None,
            }
            let mut facts = collect(&MockFs::typical_system(), &host);
            facts.date = None;
            assert_eq!(facts, without_probe(control.clone(), probe), "{}", probe);
        }
    }

    #[test]
    fn test_mount_parse_failure_only_affects_mount_probe() {
        let mut fs = MockFs::typical_system();
        fs.add_file(MOUNT_TABLE_PATH, "/dev/sda1 / ext4 rw zero 1\n");
        let facts = collect(&fs, &MockHost::typical_system());

        assert!(facts.file_systems.is_none());
        assert!(facts.os_release.is_some());
        assert!(facts.hostname.is_some());
    }

    #[test]
    fn test_all_sources_missing_yields_only_date() {
        let facts = collect(&MockFs::new(), &MockHost::new());
        assert!(facts.date.is_some());
        assert_eq!(
            SystemFacts {
                date: None,
                ..facts
            },
            SystemFacts::default()
        );
    }

    #[test]
    fn test_ec2_probe_runs_with_builtin_set() {
        let fs = MockFs::typical_system();
        let host = MockHost::typical_system();
        let metadata = MockMetadata::typical_instance();

        let facts = SystemCollector::new(&fs, &host)
            .with_metadata(&metadata)
            .collect();

        assert!(facts.system.hostname.is_some());
        let ec2 = facts.ec2.unwrap();
        assert_eq!(ec2.instance_id.as_deref(), Some("i-0abcd1234efgh5678"));
    }

    /// Host whose calls succeed only if all of them are in flight at once.
    /// Run one after another, each call times out and its probe fails.
    struct RendezvousHost {
        inner: MockHost,
        arrived: AtomicUsize,
    }

    impl RendezvousHost {
        const CALLS: usize = 4;

        fn new() -> Self {
            Self {
                inner: MockHost::typical_system(),
                arrived: AtomicUsize::new(0),
            }
        }

        fn meet(&self) -> io::Result<()> {
            self.arrived.fetch_add(1, Ordering::SeqCst);
            let deadline = Instant::now() + Duration::from_secs(5);
            while self.arrived.load(Ordering::SeqCst) < Self::CALLS {
                if Instant::now() > deadline {
                    return Err(io::ErrorKind::TimedOut.into());
                }
                thread::sleep(Duration::from_millis(1));
            }
            Ok(())
        }
    }

    impl HostOs for RendezvousHost {
        fn uname(&self) -> io::Result<Uname> {
            self.meet()?;
            self.inner.uname()
        }

        fn sysinfo(&self) -> io::Result<RawSysInfo> {
            self.meet()?;
            self.inner.sysinfo()
        }

        fn interfaces(&self) -> io::Result<Vec<RawInterface>> {
            self.meet()?;
            self.inner.interfaces()
        }

        fn virtualization(&self) -> io::Result<String> {
            self.meet()?;
            self.inner.virtualization()
        }
    }

    #[test]
    fn test_host_probes_run_concurrently() {
        let fs = MockFs::typical_system();
        let host = RendezvousHost::new();

        let facts = SystemCollector::new(&fs, &host).collect().system;

        assert!(facts.hostname.is_some());
        assert!(facts.memory.is_some());
        assert!(facts.network.is_some());
        assert!(facts.virtualization.is_some());
    }

    #[test]
    fn test_current_date_format() {
        let date = current_date();
        assert!(date.unix > 1_600_000_000);
        assert!(date.utc.ends_with(" UTC"));
        assert_eq!(&date.utc[4..5], "-");
    }
}
