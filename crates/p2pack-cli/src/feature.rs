//! `feature-builder`: writes an Eclipse `feature.xml`.

use anyhow::{Context, Result};
use clap::Parser;
use p2pack::{DiscoverySite, FeatureConfig, P2Error, build_feature};
use std::path::PathBuf;

/// Command-line arguments of `feature-builder`.
#[derive(Debug, Parser)]
#[command(name = "feature-builder")]
#[command(about = "Build an Eclipse feature.xml descriptor", long_about = None)]
pub struct FeatureArgs {
    /// Output path of the feature.xml file
    #[arg(long)]
    pub output: PathBuf,

    /// Feature id
    #[arg(long)]
    pub id: String,

    /// Human readable feature label
    #[arg(long)]
    pub label: String,

    /// Feature version
    #[arg(long)]
    pub version: String,

    /// Provider name
    #[arg(long)]
    pub provider: String,

    /// Feature description
    #[arg(long)]
    pub description: String,

    /// Optional URL for the description
    #[arg(long)]
    pub url: Option<String>,

    /// Copyright notice
    #[arg(long)]
    pub copyright: String,

    /// URL of the license
    #[arg(long = "license_url")]
    pub license_url: String,

    /// Text file containing the full license
    #[arg(long)]
    pub license: PathBuf,

    /// Discovery site as LABEL=URL (repeatable)
    #[arg(long = "site", value_parser = parse_site)]
    pub sites: Vec<DiscoverySite>,

    /// Plugin jar file name, <id>_<version>.jar (repeatable)
    #[arg(long = "plugin")]
    pub plugins: Vec<String>,

    /// Log each step at debug level
    #[arg(short, long)]
    pub verbose: bool,
}

impl FeatureArgs {
    /// Convert parsed arguments into the builder's config.
    #[must_use]
    pub fn into_config(self) -> FeatureConfig {
        FeatureConfig {
            output: self.output,
            id: self.id,
            label: self.label,
            version: self.version,
            provider: self.provider,
            description: self.description,
            description_url: self.url,
            copyright: self.copyright,
            license_url: self.license_url,
            license: self.license,
            sites: self.sites,
            plugins: self.plugins,
        }
    }
}

fn parse_site(value: &str) -> std::result::Result<DiscoverySite, String> {
    value.parse().map_err(|e: P2Error| e.to_string())
}

/// Run `feature-builder`.
pub fn run(args: FeatureArgs) -> Result<()> {
    let config = args.into_config();
    let output = config.output.clone();

    build_feature(config).with_context(|| {
        format!("Failed to build feature descriptor: {}", output.display())
    })?;

    Ok(())
}
