//! p2 update site assembly.
//!
//! [`build_site`] runs one update site build from start to finish:
//!
//! 1. validate the parallel feature lists
//! 2. stage `site.xml`, `features/` and `plugins/` in a fresh temp directory
//! 3. run the publisher to generate `artifacts.jar` / `content.jar`
//! 4. zip the staged tree with fixed timestamps and permissions
//! 5. remove the temp directory
//!
//! A publisher failure aborts the run with [`P2Error::PublisherFailed`] after
//! the staging directory has been removed.

use crate::archive::{ArchiveSummary, write_archive};
use crate::publisher::{Publisher, generate_metadata};
use crate::staging::StagingDir;
use crate::xml::Element;
use crate::{P2Error, P2Result};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Inputs for [`build_site`], usually taken straight from the command line.
///
/// `feature_ids`, `features` and `feature_versions` are parallel lists and
/// must have the same length.
#[derive(Debug, Clone, Default)]
pub struct SiteConfig {
    /// Path of the zip archive to write.
    pub output: PathBuf,
    /// Site name, the `name` attribute of `<description>`.
    pub name: String,
    pub url: String,
    pub description: String,
    pub feature_ids: Vec<String>,
    /// Feature jar files.
    pub features: Vec<PathBuf>,
    pub feature_versions: Vec<String>,
    /// Bundle jar files.
    pub bundles: Vec<PathBuf>,
    /// Directory to create temporary directories in. Defaults to the system temp dir.
    pub temp_root: Option<PathBuf>,
}

/// A feature entry of `site.xml`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteFeature {
    pub file: PathBuf,
    pub id: String,
    pub version: String,
}

impl SiteFeature {
    /// Site-relative url of the feature, `feature/<basename>`.
    #[must_use]
    pub fn url(&self) -> String {
        let file_name = self
            .file
            .file_name()
            .map(|name| name.to_string_lossy())
            .unwrap_or_default();
        format!("feature/{file_name}")
    }
}

/// In-memory form of a `site.xml` document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteManifest {
    pub name: String,
    pub url: String,
    pub description: String,
    pub features: Vec<SiteFeature>,
}

impl SiteManifest {
    /// Zip the parallel feature lists of a config into a manifest.
    ///
    /// Fails with [`P2Error::Config`] when the lists differ in length.
    pub fn from_config(config: &SiteConfig) -> P2Result<Self> {
        let count = config.features.len();
        if config.feature_ids.len() != count || config.feature_versions.len() != count {
            return Err(P2Error::Config(format!(
                "should provide the same number of times --feature, --feature_id and \
                 --feature_version (got {}, {} and {})",
                count,
                config.feature_ids.len(),
                config.feature_versions.len()
            )));
        }

        let features = config
            .features
            .iter()
            .zip(&config.feature_ids)
            .zip(&config.feature_versions)
            .map(|((file, id), version)| SiteFeature {
                file: file.clone(),
                id: id.clone(),
                version: version.clone(),
            })
            .collect();

        Ok(Self {
            name: config.name.clone(),
            url: config.url.clone(),
            description: config.description.clone(),
            features,
        })
    }

    /// Build the `<site>` element tree.
    #[must_use]
    pub fn to_element(&self) -> Element {
        let mut site = Element::new("site").child(
            Element::new("description")
                .attr("name", &self.name)
                .attr("url", &self.url)
                .with_text(&self.description),
        );

        for feature in &self.features {
            debug!(
                file = %feature.file.display(),
                id = %feature.id,
                version = %feature.version,
                "Adding feature to site manifest"
            );
            site.push_child(
                Element::new("feature")
                    .attr("url", feature.url())
                    .attr("id", &feature.id)
                    .attr("version", &feature.version),
            );
        }

        site
    }
}

/// Build a zipped p2 update site at `config.output`.
///
/// Configuration is validated before any temporary directory is created.
/// The staging directory is removed on success and on every error path.
pub fn build_site(config: SiteConfig, publisher: &dyn Publisher) -> P2Result<ArchiveSummary> {
    let manifest = SiteManifest::from_config(&config)?;
    let temp_root = config.temp_root.as_deref();

    info!(name = %manifest.name, output = %config.output.display(), "Building update site");

    let staging = StagingDir::create(temp_root)?;
    staging.write_site_xml(&manifest)?;
    staging.copy_artifacts(&config.features, &config.bundles)?;

    generate_metadata(&staging, publisher, temp_root)?;

    let summary = zip_staging(&staging, &config.output)?;
    staging.close()?;

    info!(
        output = %config.output.display(),
        entries = summary.entries.len(),
        sha256 = %summary.sha256,
        "Update site written"
    );
    Ok(summary)
}

fn zip_staging(staging: &StagingDir, output: &Path) -> P2Result<ArchiveSummary> {
    debug!(output = %output.display(), "Creating update site archive");
    write_archive(staging.path(), output)
}
