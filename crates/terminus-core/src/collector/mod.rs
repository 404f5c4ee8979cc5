//! Host fact collection engine.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                          Collector                           │
//! │                                                              │
//! │  phase 1: SystemCollector (one thread per probe)             │
//! │    identity  os_release  boot_id  machine_id  interfaces     │
//! │    sysinfo   virtualization  date  file_systems   [ec2]      │
//! │        │ FileSystem        │ HostOs             │ Metadata   │
//! │        └──────── join ─────┴────────────────────┘            │
//! │                    │                                         │
//! │            FactStore.add("System" / "EC2")                   │
//! │                    │                                         │
//! │  phase 2: external providers (one thread per entry)          │
//! │    *.json files  ·  executables      ── join ──►  FactStore  │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Usage
//!
//! ```
//! use terminus_core::collector::{Collector, MockFs, MockHost};
//! use terminus_core::config::Config;
//!
//! let config = Config::default()
//!     .with_external_facts_dir("/nonexistent")
//!     .with_cloud(false);
//! let collector = Collector::new(MockFs::typical_system(), MockHost::typical_system(), config);
//! let doc = collector.collect().into_document();
//! assert_eq!(doc["System"]["Hostname"], "host1");
//! ```

pub mod cloud;
#[allow(clippy::module_inception)]
mod collector;
pub mod external;
mod fanout;
#[cfg(target_os = "linux")]
mod host;
pub mod mock;
pub mod system;
pub mod traits;

pub use cloud::{HttpMetadata, MetadataSource};
pub use collector::{Collector, EC2_NAMESPACE, SYSTEM_NAMESPACE};
#[cfg(target_os = "linux")]
pub use host::RealHost;
pub use mock::{MockFs, MockHost, MockMetadata};
pub use traits::{FileSystem, HostOs, RealFs};
