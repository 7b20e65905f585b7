//! Eclipse feature and p2 update site packaging
//!
//! This crate provides the two build steps used to ship Eclipse plugins:
//! - [`build_feature`] writes a `feature.xml` descriptor for a set of plugin jars
//! - [`build_site`] stages features and bundles, runs the p2 publisher over them
//!   and zips the result into a reproducible update site archive
//!
//! # Update Site Layout
//!
//! ```text
//! update-site.zip
//! ├── site.xml
//! ├── artifacts.jar              # written by the publisher
//! ├── content.jar                # written by the publisher
//! ├── features/
//! │   └── com.example.feature_1.0.0.jar
//! └── plugins/
//!     └── com.example.plugin_1.0.0.jar
//! ```
//!
//! # Example
//!
//! ```no_run
//! use p2pack::{EclipseLauncher, SiteConfig, build_site};
//!
//! let config = SiteConfig {
//!     output: "site.zip".into(),
//!     name: "Example".to_string(),
//!     url: "https://example.com/site".to_string(),
//!     description: "Example update site".to_string(),
//!     feature_ids: vec!["com.example.feature".to_string()],
//!     features: vec!["com.example.feature_1.0.0.jar".into()],
//!     feature_versions: vec!["1.0.0".to_string()],
//!     bundles: vec!["com.example.plugin_1.0.0.jar".into()],
//!     temp_root: None,
//! };
//!
//! let launcher = EclipseLauncher::new("java", "org.eclipse.equinox.launcher.jar");
//! build_site(config, &launcher)?;
//! # Ok::<(), p2pack::P2Error>(())
//! ```

mod error;

pub mod archive;
pub mod feature;
pub mod publisher;
pub mod site;
pub mod staging;
pub mod xml;

pub use archive::{ArchiveSummary, write_archive};
pub use error::{P2Error, PublisherFailure, PublisherLog};
pub use feature::{DiscoverySite, FeatureConfig, FeatureDescriptor, PluginRef, build_feature};
pub use publisher::{EclipseLauncher, PublishOutput, Publisher, generate_metadata};
pub use site::{SiteConfig, SiteFeature, SiteManifest, build_site};
pub use staging::StagingDir;
pub use xml::Element;

/// Result type for packaging operations.
pub type P2Result<T> = Result<T, P2Error>;

/// Update site manifest file name within the staging directory.
pub const SITE_XML: &str = "site.xml";

/// Staging subdirectory holding feature jars.
pub const FEATURES_DIR: &str = "features";

/// Staging subdirectory holding bundle jars.
pub const PLUGINS_DIR: &str = "plugins";

/// Eclipse application that generates p2 metadata for features and bundles.
pub const PUBLISHER_APPLICATION: &str =
    "org.eclipse.equinox.p2.publisher.FeaturesAndBundlesPublisher";
