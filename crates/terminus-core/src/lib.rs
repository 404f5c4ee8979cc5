//! terminus-core: host fact collection.
//!
//! Provides:
//! - `collector` - built-in probes, external providers and the aggregation driver
//! - `store` - the namespaced fact container filled by one collection run
//! - `model` - typed records for the `System` and `EC2` namespaces
//! - `config` - collection settings
//! - `query` - dotted-path lookup into a finished document
//! - `render` - JSON and template output

pub mod collector;
pub mod config;
pub mod error;
pub mod model;
pub mod query;
pub mod render;
pub mod store;

pub use collector::Collector;
pub use config::Config;
pub use store::FactStore;

/// Version string reported by the binaries and the web `Server` header.
pub const VERSION: &str = concat!(env!("CARGO_PKG_VERSION"), " (", env!("GIT_SHA"), ")");
