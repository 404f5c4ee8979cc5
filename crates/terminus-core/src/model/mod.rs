//! Records produced by the built-in probes.
//!
//! Every field a probe may fail to fill is optional and omitted from the
//! serialized document when absent, so a missing key means "unavailable on
//! this host".

mod cloud;
mod system;

pub use cloud::Ec2Facts;
pub use system::{
    Date, FileSystem, FileSystems, Interface, Interfaces, Ip4Address, Ip6Address, Kernel,
    LoadAverage, Memory, Network, OsRelease, Swap, SystemFacts,
};
