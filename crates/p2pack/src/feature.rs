//! Eclipse feature descriptor (`feature.xml`) generation.
//!
//! A feature bundles a set of plugin jars under shared metadata. The
//! descriptor written by [`build_feature`] has this shape:
//!
//! ```text
//! <feature id=... label=... version=... provider-name=...>
//!   <description url=...>TEXT</description>
//!   <copyright>TEXT</copyright>
//!   <license url=...>LICENSE FILE CONTENTS</license>
//!   <url>
//!     <discovery label=... url=.../>
//!   </url>
//!   <plugin id=... download-size="0" install-size="0" version=... unpack="true"/>
//! </feature>
//! ```

use crate::xml::Element;
use crate::{P2Error, P2Result};
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::{debug, info};

/// Inputs for [`build_feature`], usually taken straight from the command line.
#[derive(Debug, Clone, Default)]
pub struct FeatureConfig {
    /// Path of the `feature.xml` to write.
    pub output: PathBuf,
    pub id: String,
    pub label: String,
    pub version: String,
    pub provider: String,
    pub description: String,
    /// Optional `url` attribute of the description.
    pub description_url: Option<String>,
    pub copyright: String,
    pub license_url: String,
    /// Text file whose contents become the license body.
    pub license: PathBuf,
    /// Discovery sites listed under `<url>`.
    pub sites: Vec<DiscoverySite>,
    /// Plugin jar file names, `<id>_<version>.jar`.
    pub plugins: Vec<String>,
}

/// A `<discovery>` entry, parsed from `label=url`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoverySite {
    pub label: String,
    pub url: String,
}

impl FromStr for DiscoverySite {
    type Err = P2Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (label, url) = s.split_once('=').ok_or_else(|| {
            P2Error::Config(format!("invalid site '{s}', expected LABEL=URL"))
        })?;

        Ok(Self {
            label: label.to_string(),
            url: url.to_string(),
        })
    }
}

/// A plugin reference derived from a jar file name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PluginRef {
    pub id: String,
    pub version: String,
}

impl PluginRef {
    /// Parse `<id>_<version>.jar`, splitting on the first underscore.
    ///
    /// Only the file name is considered, so `out/foo_1.0.jar` is accepted.
    /// Returns `Ok(None)` for names that do not end in `.jar`; those are
    /// skipped rather than rejected.
    pub fn from_jar_name(jar: &str) -> P2Result<Option<Self>> {
        let file_name = Path::new(jar)
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();

        let Some(stem) = file_name.strip_suffix(".jar") else {
            return Ok(None);
        };

        let (id, version) = stem.split_once('_').ok_or_else(|| {
            P2Error::Config(format!(
                "invalid plugin jar name '{jar}', expected <id>_<version>.jar"
            ))
        })?;

        Ok(Some(Self {
            id: id.to_string(),
            version: version.to_string(),
        }))
    }

    fn to_element(&self) -> Element {
        Element::new("plugin")
            .attr("id", &self.id)
            .attr("download-size", "0")
            .attr("install-size", "0")
            .attr("version", &self.version)
            .attr("unpack", "true")
    }
}

/// In-memory form of a `feature.xml` document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureDescriptor {
    pub id: String,
    pub label: String,
    pub version: String,
    pub provider: String,
    pub description: String,
    pub description_url: Option<String>,
    pub copyright: String,
    pub license_url: String,
    pub license_text: String,
    pub sites: Vec<DiscoverySite>,
    pub plugins: Vec<PluginRef>,
}

impl FeatureDescriptor {
    /// Resolve a config into a descriptor.
    ///
    /// Plugin names are validated before the license file is read.
    pub fn from_config(config: &FeatureConfig) -> P2Result<Self> {
        let mut plugins = Vec::with_capacity(config.plugins.len());
        for jar in &config.plugins {
            match PluginRef::from_jar_name(jar)? {
                Some(plugin) => plugins.push(plugin),
                None => debug!(jar = %jar, "Skipping plugin that is not a jar"),
            }
        }

        let license_text = fs::read_to_string(&config.license)
            .map_err(|e| P2Error::file_not_found(&config.license, e))?;

        Ok(Self {
            id: config.id.clone(),
            label: config.label.clone(),
            version: config.version.clone(),
            provider: config.provider.clone(),
            description: config.description.clone(),
            description_url: config
                .description_url
                .clone()
                .filter(|url| !url.is_empty()),
            copyright: config.copyright.clone(),
            license_url: config.license_url.clone(),
            license_text,
            sites: config.sites.clone(),
            plugins,
        })
    }

    /// Build the `<feature>` element tree.
    #[must_use]
    pub fn to_element(&self) -> Element {
        let mut description = Element::new("description");
        if let Some(url) = &self.description_url {
            description = description.attr("url", url);
        }
        description = description.with_text(&self.description);

        let mut url = Element::new("url");
        for site in &self.sites {
            url.push_child(
                Element::new("discovery")
                    .attr("label", &site.label)
                    .attr("url", &site.url),
            );
        }

        let mut feature = Element::new("feature")
            .attr("id", &self.id)
            .attr("label", &self.label)
            .attr("version", &self.version)
            .attr("provider-name", &self.provider)
            .child(description)
            .child(Element::new("copyright").with_text(&self.copyright))
            .child(
                Element::new("license")
                    .attr("url", &self.license_url)
                    .with_text(&self.license_text),
            )
            .child(url);

        for plugin in &self.plugins {
            feature.push_child(plugin.to_element());
        }

        feature
    }
}

/// Build a feature descriptor and write it to `config.output`.
///
/// Any existing file at the output path is replaced.
pub fn build_feature(config: FeatureConfig) -> P2Result<FeatureDescriptor> {
    let descriptor = FeatureDescriptor::from_config(&config)?;

    descriptor.to_element().write_to_file(&config.output)?;

    info!(
        feature = %descriptor.id,
        version = %descriptor.version,
        plugins = descriptor.plugins.len(),
        output = %config.output.display(),
        "Feature descriptor written"
    );
    Ok(descriptor)
}
