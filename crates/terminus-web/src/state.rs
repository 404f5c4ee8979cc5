//! Shared application state and the global allocator.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

use std::sync::Arc;

use serde_json::Value;

use terminus_core::Collector;
use terminus_core::collector::{FileSystem, HostOs};

/// Produces one finished fact document per call.
///
/// Blocking; handlers call it from `spawn_blocking`.
pub(crate) trait FactSource: Send + Sync {
    fn collect_document(&self) -> Value;
}

impl<F, H> FactSource for Collector<F, H>
where
    F: FileSystem + 'static,
    H: HostOs + 'static,
{
    fn collect_document(&self) -> Value {
        self.collect().into_document()
    }
}

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) source: Arc<dyn FactSource>,
}

impl AppState {
    pub(crate) fn new(source: impl FactSource + 'static) -> Self {
        Self {
            source: Arc::new(source),
        }
    }
}
