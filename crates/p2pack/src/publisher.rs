//! p2 metadata generation.
//!
//! The p2 `FeaturesAndBundlesPublisher` scans a staged update site and writes
//! `artifacts.jar` and `content.jar` next to it. It is reached through the
//! [`Publisher`] trait so the pipeline can run without a JVM.
//!
//! See <https://wiki.eclipse.org/Equinox/p2/Publisher>.

use crate::error::{PublisherFailure, PublisherLog};
use crate::staging::{StagingDir, create_temp_dir};
use crate::{P2Error, P2Result, PUBLISHER_APPLICATION};
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus, Stdio};
use tracing::{debug, warn};
use walkdir::WalkDir;

/// Result of one publisher run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PublishOutput {
    /// Process exit code, 0 on success.
    pub exit_code: i32,
    /// Captured standard output.
    pub stdout: Vec<u8>,
}

/// Generates p2 repository metadata for a staged update site.
pub trait Publisher {
    /// Publish the features and bundles found in `repository`.
    ///
    /// `repository` is both the source and the metadata/artifact repository.
    /// `configuration` is a scratch directory owned by the caller; `.log`
    /// files left there are reported if the run fails.
    fn publish(&self, repository: &Path, configuration: &Path) -> P2Result<PublishOutput>;
}

/// Runs the publisher through an Eclipse launcher jar: `<java> -jar <launcher> ...`.
#[derive(Debug, Clone)]
pub struct EclipseLauncher {
    java: PathBuf,
    launcher: PathBuf,
}

impl EclipseLauncher {
    #[must_use]
    pub fn new(java: impl Into<PathBuf>, launcher: impl Into<PathBuf>) -> Self {
        Self {
            java: java.into(),
            launcher: launcher.into(),
        }
    }

    #[must_use]
    pub fn java(&self) -> &Path {
        &self.java
    }

    #[must_use]
    pub fn launcher(&self) -> &Path {
        &self.launcher
    }
}

impl Publisher for EclipseLauncher {
    fn publish(&self, repository: &Path, configuration: &Path) -> P2Result<PublishOutput> {
        let args = publisher_args(&self.launcher, repository, configuration);
        debug!(java = %self.java.display(), ?args, "Running p2 publisher");

        // stderr goes straight to ours; only stdout is captured.
        let output = Command::new(&self.java)
            .args(&args)
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .output()
            .map_err(|source| P2Error::Spawn {
                program: self.java.display().to_string(),
                source,
            })?;

        Ok(PublishOutput {
            exit_code: exit_code(output.status),
            stdout: output.stdout,
        })
    }
}

/// Arguments passed to `java` to run the features and bundles publisher.
#[must_use]
pub fn publisher_args(launcher: &Path, repository: &Path, configuration: &Path) -> Vec<OsString> {
    let repository_uri = format!("file:/{}", repository.display());

    vec![
        "-jar".into(),
        launcher.into(),
        "-application".into(),
        PUBLISHER_APPLICATION.into(),
        "-metadataRepository".into(),
        repository_uri.clone().into(),
        "-artifactRepository".into(),
        repository_uri.into(),
        "-configuration".into(),
        configuration.into(),
        "-source".into(),
        repository.into(),
        "-compress".into(),
        "-publishArtifacts".into(),
    ]
}

/// Run `publisher` over a staged site, writing metadata into it.
///
/// The publisher gets its own temporary configuration directory, removed
/// when the run succeeds. On a non-zero exit the directory is kept, its
/// `.log` files are collected and [`P2Error::PublisherFailed`] is returned.
pub fn generate_metadata(
    staging: &StagingDir,
    publisher: &dyn Publisher,
    temp_root: Option<&Path>,
) -> P2Result<()> {
    let configuration = create_temp_dir(temp_root, "p2config-")?;
    debug!(
        repository = %staging.path().display(),
        configuration = %configuration.path().display(),
        "Generating p2 metadata"
    );
    for file in staging.files()? {
        debug!(file = %file.display(), "Publisher input");
    }

    let output = publisher.publish(staging.path(), configuration.path())?;

    if output.exit_code != 0 {
        let logs = collect_logs(configuration.path());
        let configuration_dir = configuration.keep();
        warn!(
            exit_code = output.exit_code,
            logs = logs.len(),
            configuration = %configuration_dir.display(),
            "p2 publisher failed"
        );
        return Err(P2Error::PublisherFailed(Box::new(PublisherFailure {
            exit_code: output.exit_code,
            stdout: output.stdout,
            logs,
            configuration_dir,
        })));
    }

    debug!(
        stdout = %String::from_utf8_lossy(&output.stdout),
        "p2 publisher finished"
    );
    configuration.close()?;
    Ok(())
}

/// Every `.log` file below `dir`, in sorted path order.
fn collect_logs(dir: &Path) -> Vec<PublisherLog> {
    let mut logs = Vec::new();
    for entry in WalkDir::new(dir).sort_by_file_name() {
        let Ok(entry) = entry else { continue };
        if !entry.file_type().is_file() {
            continue;
        }

        let name = entry.file_name().to_string_lossy().into_owned();
        debug!(file = %name, "Publisher error file");
        if !name.ends_with(".log") {
            continue;
        }

        match fs::read(entry.path()) {
            Ok(bytes) => logs.push(PublisherLog {
                name,
                contents: String::from_utf8_lossy(&bytes).into_owned(),
            }),
            Err(e) => warn!(file = %entry.path().display(), error = %e, "Unreadable publisher log"),
        }
    }
    logs
}

/// Exit code of a finished process; signals map to `128 + signal` on Unix.
fn exit_code(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }

    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return 128 + signal;
        }
    }

    1
}
