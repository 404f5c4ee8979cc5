//! Collection settings passed to the [`Collector`](crate::collector::Collector).

use std::path::PathBuf;
use std::time::Duration;

/// Default location of external fact providers.
pub const DEFAULT_EXTERNAL_FACTS_DIR: &str = "/etc/terminus/facts.d";

/// Link-local EC2 instance metadata endpoint.
pub const DEFAULT_METADATA_URL: &str = "http://169.254.169.254/latest/meta-data/";

/// Settings for one collection run.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Directory scanned for `*.json` files and executables.
    pub external_facts_dir: PathBuf,
    pub cloud: CloudConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            external_facts_dir: PathBuf::from(DEFAULT_EXTERNAL_FACTS_DIR),
            cloud: CloudConfig::default(),
        }
    }
}

impl Config {
    pub fn with_external_facts_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.external_facts_dir = dir.into();
        self
    }

    pub fn with_cloud(mut self, enabled: bool) -> Self {
        self.cloud.enabled = enabled;
        self
    }
}

/// Cloud metadata probe settings.
#[derive(Debug, Clone, PartialEq)]
pub struct CloudConfig {
    pub enabled: bool,
    /// Base URL; field names are appended to it.
    pub base_url: String,
    /// Budget for the existence check. Hosts outside EC2 pay this once per run.
    pub probe_timeout: Duration,
    /// Budget for each per-field request once the endpoint has answered.
    pub request_timeout: Duration,
}

impl Default for CloudConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            base_url: DEFAULT_METADATA_URL.to_string(),
            probe_timeout: Duration::from_millis(50),
            request_timeout: Duration::from_secs(2),
        }
    }
}
