//! Aggregation driver.
//!
//! One call to [`Collector::collect`] is one collection run: built-in probes
//! first, merged as `System` (and `EC2`), then external providers.

use std::sync::Arc;
use std::time::Instant;

use serde::Serialize;
use tracing::{debug, warn};

use crate::collector::cloud::{HttpMetadata, MetadataSource};
use crate::collector::external::collect_external_facts;
use crate::collector::system::SystemCollector;
use crate::collector::traits::{FileSystem, HostOs};
use crate::config::Config;
use crate::store::FactStore;

/// Namespace of the composite built-in record.
pub const SYSTEM_NAMESPACE: &str = "System";
/// Namespace of the cloud instance record.
pub const EC2_NAMESPACE: &str = "EC2";

/// Collects host facts into a [`FactStore`].
pub struct Collector<F: FileSystem, H: HostOs> {
    fs: F,
    host: H,
    config: Config,
    metadata: Option<Arc<dyn MetadataSource>>,
}

impl<F: FileSystem, H: HostOs> Collector<F, H> {
    /// Creates a collector.
    ///
    /// # Arguments
    /// * `fs` - Source of the well-known files (real or mock)
    /// * `host` - Source of uname/sysinfo/interfaces (real or mock)
    /// * `config` - External facts directory and cloud probe settings
    pub fn new(fs: F, host: H, config: Config) -> Self {
        Self {
            fs,
            host,
            config,
            metadata: None,
        }
    }

    /// Replaces the HTTP metadata client with another source.
    ///
    /// Only consulted while the cloud probe is enabled.
    pub fn with_metadata(mut self, source: impl MetadataSource + 'static) -> Self {
        self.metadata = Some(Arc::new(source));
        self
    }

    /// Runs one full collection and returns the finished store.
    ///
    /// Blocks until every probe and provider has finished. Must be called
    /// from a thread that may block.
    pub fn collect(&self) -> FactStore {
        let start = Instant::now();
        let store = FactStore::new();

        let http;
        let metadata: Option<&dyn MetadataSource> = if !self.config.cloud.enabled {
            None
        } else if let Some(source) = &self.metadata {
            Some(source.as_ref())
        } else {
            match HttpMetadata::new(&self.config.cloud) {
                Ok(client) => {
                    http = client;
                    Some(&http as &dyn MetadataSource)
                }
                Err(e) => {
                    warn!(error = %e, "cannot build metadata client, skipping EC2 facts");
                    None
                }
            }
        };

        let mut probes = SystemCollector::new(&self.fs, &self.host);
        if let Some(source) = metadata {
            probes = probes.with_metadata(source);
        }
        let builtin = probes.collect();

        add_record(&store, SYSTEM_NAMESPACE, &builtin.system);
        if let Some(ec2) = &builtin.ec2 {
            add_record(&store, EC2_NAMESPACE, ec2);
        }

        collect_external_facts(&self.config.external_facts_dir, &store);

        debug!(
            namespaces = store.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "collection finished"
        );
        store
    }
}

fn add_record<T: Serialize>(store: &FactStore, namespace: &str, record: &T) {
    match serde_json::to_value(record) {
        Ok(value) => store.add(namespace, value),
        Err(e) => warn!(namespace, error = %e, "cannot encode built-in record"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collector::mock::{MockFs, MockHost, MockMetadata};
    use serde_json::json;
    use std::fs;
    use std::os::unix::fs::PermissionsExt;

    fn collector(dir: &std::path::Path) -> Collector<MockFs, MockHost> {
        Collector::new(
            MockFs::typical_system(),
            MockHost::typical_system(),
            Config::default()
                .with_external_facts_dir(dir)
                .with_cloud(false),
        )
    }

    #[test]
    fn test_collect_builtin_and_external() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("site.json"), r#"{"rack": "r12"}"#).unwrap();

        let doc = collector(dir.path()).collect().into_document();

        assert_eq!(doc["System"]["Hostname"], "host1");
        assert_eq!(doc["System"]["Network"]["Interfaces"]["eth0"]["Index"], 2);
        assert_eq!(doc["site"], json!({"rack": "r12"}));
        assert!(doc.get("EC2").is_none());
    }

    #[test]
    fn test_external_provider_overrides_builtin_namespace() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("System.json"), r#"{"overridden": true}"#).unwrap();

        let doc = collector(dir.path()).collect().into_document();
        assert_eq!(doc["System"], json!({"overridden": true}));
    }

    #[test]
    fn test_system_record_complete_with_executable_provider() {
        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("late");
        fs::write(&script, "#!/bin/sh\necho '{\"ran\": true}'\n").unwrap();
        fs::set_permissions(&script, fs::Permissions::from_mode(0o755)).unwrap();

        let store = collector(dir.path()).collect();
        let system = store.get("System").unwrap();
        for key in [
            "Architecture",
            "BootID",
            "Date",
            "FileSystems",
            "Hostname",
            "LoadAverage",
            "MachineID",
            "Memory",
            "Network",
            "OSRelease",
            "Swap",
            "Uptime",
            "Virtualization",
        ] {
            assert!(system.get(key).is_some(), "missing {}", key);
        }
        assert_eq!(store.get("late"), Some(json!({"ran": true})));
    }

    #[test]
    fn test_collect_with_ec2() {
        let dir = tempfile::tempdir().unwrap();
        let collector = Collector::new(
            MockFs::typical_system(),
            MockHost::typical_system(),
            Config::default().with_external_facts_dir(dir.path()),
        )
        .with_metadata(MockMetadata::typical_instance());

        let doc = collector.collect().into_document();
        assert_eq!(doc["EC2"]["InstanceType"], "t3.micro");
        assert_eq!(doc["EC2"]["SecurityGroups"], json!(["default", "web"]));
        assert_eq!(doc["EC2"]["AmiLaunchIndex"], 0);
    }

    #[test]
    fn test_cloud_disabled_ignores_metadata_source() {
        let dir = tempfile::tempdir().unwrap();
        let collector = collector(dir.path()).with_metadata(MockMetadata::typical_instance());

        let store = collector.collect();
        assert_eq!(store.get("EC2"), None);
    }

    #[test]
    fn test_missing_external_dir_keeps_builtin_facts() {
        let collector = Collector::new(
            MockFs::typical_system(),
            MockHost::typical_system(),
            Config::default()
                .with_external_facts_dir("/nonexistent/facts.d")
                .with_cloud(false),
        );

        let store = collector.collect();
        assert_eq!(store.namespaces(), vec!["System".to_string()]);
    }
}
