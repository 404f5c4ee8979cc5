//! Error types for collection and presentation.
//!
//! Probe and provider errors never leave the engine: they are logged at the
//! task boundary that produced them. Only [`RenderError`] reaches callers.

use std::io;
use std::path::PathBuf;
use std::process::ExitStatus;

/// Error produced by the pure text parsers.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("parse error: {message}")]
pub struct ParseError {
    pub message: String,
}

impl ParseError {
    pub fn new(msg: impl Into<String>) -> Self {
        Self {
            message: msg.into(),
        }
    }
}

/// Failure of a single built-in probe.
#[derive(Debug, thiserror::Error)]
pub enum ProbeError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{call}() failed: {source}")]
    Syscall {
        call: &'static str,
        #[source]
        source: io::Error,
    },

    #[error("failed to run {command}: {source}")]
    Command {
        command: &'static str,
        #[source]
        source: io::Error,
    },

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("metadata field {field}: {message}")]
    Metadata { field: String, message: String },
}

/// Failure of a single external fact provider.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to execute {path}: {source}")]
    Spawn {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{path} exited with {status}: {stderr}")]
    Exit {
        path: PathBuf,
        status: ExitStatus,
        stderr: String,
    },

    #[error("{path} did not produce valid JSON: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Failure while presenting the finished document. Always fatal.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("failed to encode facts: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("template error: {0}")]
    Template(#[from] minijinja::Error),

    #[error("failed to read template {path}: {source}")]
    TemplateFile {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}
