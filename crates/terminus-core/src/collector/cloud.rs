//! EC2 instance-metadata probe.
//!
//! One short existence check decides whether the host is on EC2 at all. If it
//! is, every known field is requested concurrently; answers are gathered in a
//! lock-guarded map and only then copied into the typed [`Ec2Facts`].

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};
use std::thread;

use reqwest::blocking::Client;
use tracing::debug;

use crate::collector::fanout::spawn_isolated;
use crate::config::CloudConfig;
use crate::error::ProbeError;
use crate::model::Ec2Facts;

/// Metadata fields requested from the endpoint.
pub const EC2_FIELDS: &[&str] = &[
    "ami-id",
    "ami-launch-index",
    "ami-manifest-path",
    "hostname",
    "instance-action",
    "instance-id",
    "instance-type",
    "kernel-id",
    "local-hostname",
    "local-ipv4",
    "mac",
    "profile",
    "public-hostname",
    "public-ipv4",
    "reservation-id",
    "security-groups",
];

/// Source of instance metadata.
pub trait MetadataSource: Send + Sync {
    /// Returns `true` when the endpoint answers the existence check.
    fn is_available(&self) -> bool;

    /// Fetches one metadata field as text.
    fn fetch(&self, field: &str) -> Result<String, ProbeError>;
}

/// Metadata source talking HTTP to the link-local endpoint.
pub struct HttpMetadata {
    base_url: String,
    probe: Client,
    client: Client,
}

impl HttpMetadata {
    /// Builds the clients for one run.
    ///
    /// Must not be called from async code: the blocking client owns a runtime.
    pub fn new(config: &CloudConfig) -> Result<Self, reqwest::Error> {
        Ok(Self {
            base_url: config.base_url.clone(),
            probe: Client::builder().timeout(config.probe_timeout).build()?,
            client: Client::builder().timeout(config.request_timeout).build()?,
        })
    }
}

impl MetadataSource for HttpMetadata {
    fn is_available(&self) -> bool {
        self.probe
            .get(&self.base_url)
            .send()
            .is_ok_and(|resp| resp.status().is_success())
    }

    fn fetch(&self, field: &str) -> Result<String, ProbeError> {
        let to_err = |e: reqwest::Error| ProbeError::Metadata {
            field: field.to_string(),
            message: e.to_string(),
        };
        self.client
            .get(format!("{}{}", self.base_url, field))
            .send()
            .and_then(|resp| resp.error_for_status())
            .and_then(|resp| resp.text())
            .map_err(to_err)
    }
}

/// Runs the metadata probe. Returns `Ok(None)` when the endpoint is absent.
pub fn collect_ec2(source: &dyn MetadataSource) -> Result<Option<Ec2Facts>, ProbeError> {
    if !source.is_available() {
        debug!("metadata endpoint not reachable, skipping EC2 facts");
        return Ok(None);
    }

    let answers: Mutex<HashMap<String, String>> = Mutex::new(HashMap::new());

    thread::scope(|s| {
        for field in EC2_FIELDS {
            let answers = &answers;
            spawn_isolated(s, "metadata", field.to_string(), move || {
                let value = source.fetch(field)?;
                answers
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .insert(field.to_string(), value);
                Ok::<(), ProbeError>(())
            });
        }
    });

    let answers = answers.into_inner().unwrap_or_else(PoisonError::into_inner);
    Ok(Some(ec2_from_answers(answers)))
}

fn ec2_from_answers(answers: HashMap<String, String>) -> Ec2Facts {
    let mut facts = Ec2Facts::default();

    for (field, value) in answers {
        let value = value.trim().to_string();
        match field.as_str() {
            "ami-id" => facts.ami_id = Some(value),
            "ami-launch-index" => match value.parse() {
                Ok(index) => facts.ami_launch_index = Some(index),
                Err(e) => debug!(value = %value, error = %e, "invalid ami-launch-index"),
            },
            "ami-manifest-path" => facts.ami_manifest_path = Some(value),
            "hostname" => facts.hostname = Some(value),
            "instance-action" => facts.instance_action = Some(value),
            "instance-id" => facts.instance_id = Some(value),
            "instance-type" => facts.instance_type = Some(value),
            "kernel-id" => facts.kernel_id = Some(value),
            "local-hostname" => facts.local_hostname = Some(value),
            "local-ipv4" => facts.local_ipv4 = Some(value),
            "mac" => facts.mac = Some(value),
            "profile" => facts.profile = Some(value),
            "public-hostname" => facts.public_hostname = Some(value),
            "public-ipv4" => facts.public_ipv4 = Some(value),
            "reservation-id" => facts.reservation_id = Some(value),
            "security-groups" => {
                facts.security_groups = value
                    .split('\n')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
                    .collect();
            }
            _ => {}
        }
    }

    facts
}
