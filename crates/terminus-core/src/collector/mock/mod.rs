//! In-memory stand-ins for the OS data sources.
//!
//! Used by tests, and by the binaries on platforms without `/proc` and
//! `sysinfo(2)`.

mod filesystem;
mod host;
mod metadata;
mod scenarios;

pub use filesystem::MockFs;
pub use host::MockHost;
pub use metadata::MockMetadata;
