//! `site-builder`: builds a zipped p2 update site.

use anyhow::{Context, Result};
use clap::Parser;
use p2pack::{EclipseLauncher, P2Error, PublisherFailure, SiteConfig, build_site};
use std::io::{self, Write};
use std::path::PathBuf;

/// Command-line arguments of `site-builder`.
#[derive(Debug, Parser)]
#[command(name = "site-builder")]
#[command(about = "Build a zipped Eclipse p2 update site from features and plugins", long_about = None)]
pub struct SiteArgs {
    /// Output path of the update site zip
    #[arg(long)]
    pub output: PathBuf,

    /// Site name (i.e. short description)
    #[arg(long)]
    pub name: String,

    /// URL of the site
    #[arg(long)]
    pub url: String,

    /// Description of the site
    #[arg(long)]
    pub description: String,

    /// Feature id to include, paired with --feature and --feature_version (repeatable)
    #[arg(long = "feature_id")]
    pub feature_ids: Vec<String>,

    /// Feature jar to include, paired with --feature_id and --feature_version (repeatable)
    #[arg(long = "feature")]
    pub features: Vec<PathBuf>,

    /// Feature version, paired with --feature and --feature_id (repeatable)
    #[arg(long = "feature_version")]
    pub feature_versions: Vec<String>,

    /// Bundle jar to include (repeatable)
    #[arg(long = "bundle")]
    pub bundles: Vec<PathBuf>,

    /// Path to java
    #[arg(long, default_value = "java")]
    pub java: PathBuf,

    /// Path to the Eclipse launcher jar
    #[arg(long = "eclipse_launcher")]
    pub eclipse_launcher: PathBuf,

    /// Log each step at debug level
    #[arg(short, long)]
    pub verbose: bool,
}

impl SiteArgs {
    /// Split parsed arguments into the builder's config and the publisher to run.
    #[must_use]
    pub fn into_parts(self) -> (SiteConfig, EclipseLauncher) {
        let launcher = EclipseLauncher::new(self.java, self.eclipse_launcher);
        let config = SiteConfig {
            output: self.output,
            name: self.name,
            url: self.url,
            description: self.description,
            feature_ids: self.feature_ids,
            features: self.features,
            feature_versions: self.feature_versions,
            bundles: self.bundles,
            temp_root: None,
        };
        (config, launcher)
    }
}

/// Run `site-builder`.
pub fn run(args: SiteArgs) -> Result<()> {
    let (config, launcher) = args.into_parts();
    let output = config.output.clone();

    build_site(config, &launcher)
        .with_context(|| format!("Failed to build update site: {}", output.display()))?;

    Ok(())
}

/// Report a failed run and return the process exit code.
///
/// Publisher failures print the publisher's stdout and logs and exit with its
/// code. Anything else prints the error chain and exits with 1.
pub fn report_error(err: &anyhow::Error) -> i32 {
    let stdout = io::stdout();
    let stderr = io::stderr();

    if let Some(P2Error::PublisherFailed(failure)) = err.downcast_ref::<P2Error>() {
        let _ = write_publisher_failure(failure, &mut stdout.lock(), &mut stderr.lock());
        return failure.exit_code;
    }

    let _ = writeln!(stderr.lock(), "Error: {err:?}");
    1
}

/// Write captured publisher stdout to `out` and each `.log` file to `err`.
pub fn write_publisher_failure(
    failure: &PublisherFailure,
    out: &mut impl Write,
    err: &mut impl Write,
) -> io::Result<()> {
    out.write_all(&failure.stdout)?;
    out.flush()?;

    for log in &failure.logs {
        writeln!(err, "Log {}: {}", log.name, log.contents)?;
    }
    writeln!(
        err,
        "Publisher exited with code {}; configuration kept at {}",
        failure.exit_code,
        failure.configuration_dir.display()
    )?;
    Ok(())
}
