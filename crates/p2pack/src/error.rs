//! Error types for packaging operations.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while building a feature or an update site.
#[derive(Debug, Error)]
pub enum P2Error {
    /// Invalid or inconsistent command-line configuration.
    #[error("configuration error: {0}")]
    Config(String),

    /// A required input file does not exist or cannot be read.
    #[error("file not found: {}: {source}", path.display())]
    FileNotFound {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// I/O error during file operations.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// ZIP archive error.
    #[error("archive error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// XML serialization error.
    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// The publisher executable could not be started.
    #[error("failed to start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// The publisher ran and exited with a non-zero code.
    #[error("publisher exited with code {}", .0.exit_code)]
    PublisherFailed(Box<PublisherFailure>),
}

impl P2Error {
    /// Process exit code for this error.
    ///
    /// Publisher failures report the publisher's own code; everything else is 1.
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        match self {
            P2Error::PublisherFailed(failure) => failure.exit_code,
            _ => 1,
        }
    }

    pub(crate) fn file_not_found(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        P2Error::FileNotFound {
            path: path.into(),
            source,
        }
    }
}

/// Diagnostics collected from a failed publisher run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublisherFailure {
    /// Exit code of the publisher process.
    pub exit_code: i32,
    /// Everything the publisher wrote to standard output.
    pub stdout: Vec<u8>,
    /// `.log` files found in the configuration directory.
    pub logs: Vec<PublisherLog>,
    /// Configuration directory, kept on disk for inspection.
    pub configuration_dir: PathBuf,
}

/// A log file written by the publisher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublisherLog {
    /// File name of the log, without its directory.
    pub name: String,
    /// Full contents of the log.
    pub contents: String,
}
