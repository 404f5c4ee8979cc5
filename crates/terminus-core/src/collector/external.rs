//! External fact providers.
//!
//! A facts directory holds static `*.json` files and executables that print a
//! JSON value on stdout. Each one becomes a [`FactStore`] namespace named after
//! its file (minus `.json` for static files). Providers run concurrently and
//! fail independently.

use std::fs;
use std::io;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::thread;
use std::time::Instant;

use serde_json::Value;
use tracing::{debug, warn};

use crate::collector::fanout::spawn_isolated;
use crate::error::ProviderError;
use crate::store::FactStore;

const STATIC_SUFFIX: &str = ".json";

/// How a directory entry contributes facts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    /// Run with no arguments; stdout is decoded.
    Executable,
    /// File content is decoded.
    Static,
}

/// One qualifying entry of the facts directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Provider {
    pub path: PathBuf,
    pub kind: ProviderKind,
}

impl Provider {
    /// Namespace this provider's value is stored under.
    pub fn namespace(&self) -> String {
        let name = self
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        match self.kind {
            ProviderKind::Static => name
                .strip_suffix(STATIC_SUFFIX)
                .map(str::to_string)
                .unwrap_or(name),
            ProviderKind::Executable => name,
        }
    }

    /// Reads or runs the provider and decodes its JSON value.
    pub fn load(&self) -> Result<Value, ProviderError> {
        let bytes = match self.kind {
            ProviderKind::Static => fs::read(&self.path).map_err(|source| ProviderError::Read {
                path: self.path.clone(),
                source,
            })?,
            ProviderKind::Executable => self.execute()?,
        };

        serde_json::from_slice(&bytes).map_err(|source| ProviderError::Decode {
            path: self.path.clone(),
            source,
        })
    }

    fn execute(&self) -> Result<Vec<u8>, ProviderError> {
        let output = Command::new(&self.path)
            .stdin(Stdio::null())
            .output()
            .map_err(|source| ProviderError::Spawn {
                path: self.path.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(ProviderError::Exit {
                path: self.path.clone(),
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(output.stdout)
    }
}

/// Classifies a directory entry.
///
/// Directories never qualify. Anything else with an execute bit is an
/// executable, even when named `*.json`; the rest qualify only by the `.json`
/// suffix.
pub fn classify(path: &Path, metadata: &fs::Metadata) -> Option<ProviderKind> {
    if metadata.is_dir() {
        return None;
    }
    if metadata.permissions().mode() & 0o111 != 0 {
        return Some(ProviderKind::Executable);
    }
    let is_static = path
        .file_name()
        .is_some_and(|n| n.to_string_lossy().ends_with(STATIC_SUFFIX));
    if is_static {
        return Some(ProviderKind::Static);
    }
    None
}

/// Lists the qualifying providers in `dir` (non-recursive).
///
/// Only a directory that cannot be opened is an error. Entries that cannot
/// be read or stat'ed are logged and skipped.
pub fn discover(dir: &Path) -> io::Result<Vec<Provider>> {
    let mut providers = Vec::new();

    for entry in fs::read_dir(dir)? {
        let path = match entry {
            Ok(entry) => entry.path(),
            Err(e) => {
                warn!(path = %dir.display(), error = %e, "cannot read facts directory entry");
                continue;
            }
        };
        let metadata = match fs::metadata(&path) {
            Ok(m) => m,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "cannot stat fact provider");
                continue;
            }
        };
        if let Some(kind) = classify(&path, &metadata) {
            providers.push(Provider { path, kind });
        }
    }

    Ok(providers)
}

/// Runs every provider in `dir` concurrently and merges the results into
/// `store`. Returns once all providers have finished.
///
/// A directory that cannot be listed contributes nothing.
pub fn collect_external_facts(dir: &Path, store: &FactStore) {
    let start = Instant::now();

    let providers = match discover(dir) {
        Ok(p) => p,
        Err(e) => {
            warn!(path = %dir.display(), error = %e, "cannot read external facts directory");
            return;
        }
    };

    thread::scope(|s| {
        for provider in &providers {
            let task = provider.path.display().to_string();
            spawn_isolated(s, "provider", task, move || {
                let value = provider.load()?;
                let namespace = provider.namespace();
                debug!(namespace = %namespace, path = %provider.path.display(), "loaded provider");
                store.add(namespace, value);
                Ok::<(), ProviderError>(())
            });
        }
    });

    debug!(
        providers = providers.len(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "external providers finished"
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn write_file(dir: &Path, name: &str, content: &str, mode: u32) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, content).unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(mode)).unwrap();
        path
    }

    #[test]
    fn test_static_and_malformed_files() {
        let dir = tempfile::tempdir().unwrap();
        write_file(dir.path(), "good.json", r#"{"role": "web"}"#, 0o644);
        write_file(dir.path(), "bad.json", r#"{"role": "#, 0o644);

        let store = FactStore::new();
        collect_external_facts(dir.path(), &store);

        assert_eq!(store.namespaces(), vec!["good".to_string()]);
        assert_eq!(store.get("good"), Some(json!({"role": "web"})));
    }

    #[test]
    fn test_executable_provider() {
        let dir = tempfile::tempdir().unwrap();
        write_file(
            dir.path(),
            "datacenter",
            "#!/bin/sh\necho '{\"name\": \"dc1\", \"racks\": [1, 2]}'\n",
            0o755,
        );

        let store = FactStore::new();
        collect_external_facts(dir.path(), &store);

        assert_eq!(
            store.get("datacenter"),
            Some(json!({"name": "dc1", "racks": [1, 2]}))
        );
    }

    #[test]
    fn test_executable_json_keeps_full_name() {
        let dir = tempfile::tempdir().unwrap();
        write_file(dir.path(), "gen.json", "#!/bin/sh\necho 42\n", 0o700);

        let store = FactStore::new();
        collect_external_facts(dir.path(), &store);

        assert_eq!(store.get("gen.json"), Some(json!(42)));
        assert_eq!(store.get("gen"), None);
    }

    #[test]
    fn test_failing_providers_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        write_file(dir.path(), "exits", "#!/bin/sh\necho '{}'\nexit 3\n", 0o755);
        write_file(dir.path(), "garbage", "#!/bin/sh\necho not json\n", 0o755);
        write_file(dir.path(), "ok", "#!/bin/sh\necho '\"fine\"'\n", 0o755);

        let store = FactStore::new();
        collect_external_facts(dir.path(), &store);

        assert_eq!(store.namespaces(), vec!["ok".to_string()]);
    }

    /// Script that drops its own marker, then waits (bounded) for `other`'s.
    fn rendezvous_script(markers: &Path, me: &str, other: &str) -> String {
        format!(
            "#!/bin/sh\n\
             touch '{dir}/{me}'\n\
             i=0\n\
             while [ ! -e '{dir}/{other}' ]; do\n\
             i=$((i + 1))\n\
             [ \"$i\" -gt 200 ] && exit 1\n\
             sleep 0.05\n\
             done\n\
             echo '{{\"met\": \"{other}\"}}'\n",
            dir = markers.display(),
        )
    }

    #[test]
    fn test_providers_run_concurrently() {
        let dir = tempfile::tempdir().unwrap();
        let markers = tempfile::tempdir().unwrap();
        let left = rendezvous_script(markers.path(), "left", "right");
        let right = rendezvous_script(markers.path(), "right", "left");
        write_file(dir.path(), "left", &left, 0o755);
        write_file(dir.path(), "right", &right, 0o755);

        let store = FactStore::new();
        collect_external_facts(dir.path(), &store);

        assert_eq!(store.get("left"), Some(json!({"met": "right"})));
        assert_eq!(store.get("right"), Some(json!({"met": "left"})));
    }

    #[test]
    fn test_unqualified_entries_ignored() {
        let dir = tempfile::tempdir().unwrap();
        write_file(dir.path(), "notes.txt", "{}", 0o644);
        fs::create_dir(dir.path().join("sub.json")).unwrap();

        let providers = discover(dir.path()).unwrap();
        assert!(providers.is_empty());
    }

    #[test]
    fn test_unreadable_entry_does_not_drop_directory() {
        let dir = tempfile::tempdir().unwrap();
        write_file(dir.path(), "site.json", r#"{"dc": 1}"#, 0o644);
        std::os::unix::fs::symlink(
            dir.path().join("missing-target"),
            dir.path().join("dangling.json"),
        )
        .unwrap();

        let providers = discover(dir.path()).unwrap();
        assert_eq!(providers.len(), 1);
        assert_eq!(providers[0].namespace(), "site");

        let store = FactStore::new();
        collect_external_facts(dir.path(), &store);
        assert_eq!(store.namespaces(), vec!["site".to_string()]);
    }

    #[test]
    fn test_classify() {
        let dir = tempfile::tempdir().unwrap();
        let exe = write_file(dir.path(), "a.json", "", 0o744);
        let data = write_file(dir.path(), "b.json", "", 0o644);
        let other = write_file(dir.path(), "c", "", 0o600);
        let group_exec = write_file(dir.path(), "d", "", 0o610);

        let kind = |p: &Path| classify(p, &fs::metadata(p).unwrap());
        assert_eq!(kind(&exe), Some(ProviderKind::Executable));
        assert_eq!(kind(&data), Some(ProviderKind::Static));
        assert_eq!(kind(&other), None);
        assert_eq!(kind(&group_exec), Some(ProviderKind::Executable));
    }

    #[test]
    fn test_static_reads_are_stable() {
        let dir = tempfile::tempdir().unwrap();
        write_file(
            dir.path(),
            "app.json",
            r#"{"version": "1.2.3", "ports": [80, 443], "tls": true}"#,
            0o644,
        );

        let first = FactStore::new();
        collect_external_facts(dir.path(), &first);
        let second = FactStore::new();
        collect_external_facts(dir.path(), &second);

        assert_eq!(first.into_document(), second.into_document());
    }

    #[test]
    fn test_missing_directory() {
        let store = FactStore::new();
        collect_external_facts(Path::new("/nonexistent/facts.d"), &store);
        assert!(store.is_empty());
    }

    #[test]
    fn test_namespace() {
        let provider = Provider {
            path: PathBuf::from("/etc/terminus/facts.d/site.json"),
            kind: ProviderKind::Static,
        };
        assert_eq!(provider.namespace(), "site");

        let provider = Provider {
            path: PathBuf::from("/etc/terminus/facts.d/site.json"),
            kind: ProviderKind::Executable,
        };
        assert_eq!(provider.namespace(), "site.json");
    }
}
