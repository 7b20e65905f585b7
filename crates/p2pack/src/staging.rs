//! Staging directory for update site assembly.
//!
//! The [`StagingDir`] owns a fresh temporary directory laid out the way the
//! p2 publisher expects:
//!
//! ```text
//! <tmp>/
//! ├── site.xml
//! ├── features/<feature jar basenames>
//! └── plugins/<bundle jar basenames>
//! ```
//!
//! The directory is removed when the value is dropped, so every error path
//! cleans up after itself.

use crate::site::SiteManifest;
use crate::{FEATURES_DIR, P2Error, P2Result, PLUGINS_DIR, SITE_XML};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tracing::debug;
use walkdir::WalkDir;

/// Temporary directory holding the update site before it is zipped.
#[derive(Debug)]
pub struct StagingDir {
    dir: TempDir,
}

impl StagingDir {
    /// Create an empty staging directory, under `temp_root` when given.
    pub fn create(temp_root: Option<&Path>) -> P2Result<Self> {
        let dir = create_temp_dir(temp_root, "p2site-")?;
        debug!(path = %dir.path().display(), "Created staging directory");
        Ok(Self { dir })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Write `site.xml` at the root of the staging directory.
    pub fn write_site_xml(&self, manifest: &SiteManifest) -> P2Result<PathBuf> {
        let path = self.path().join(SITE_XML);
        manifest.to_element().write_to_file(&path)?;
        debug!(
            path = %path.display(),
            name = %manifest.name,
            url = %manifest.url,
            "Wrote site manifest"
        );
        Ok(path)
    }

    /// Copy feature jars into `features/` and bundle jars into `plugins/`.
    ///
    /// Both subdirectories must not exist yet; finding one is an error.
    pub fn copy_artifacts(&self, features: &[PathBuf], bundles: &[PathBuf]) -> P2Result<()> {
        let feature_dir = self.path().join(FEATURES_DIR);
        let bundle_dir = self.path().join(PLUGINS_DIR);
        fs::create_dir(&feature_dir)?;
        fs::create_dir(&bundle_dir)?;

        for feature in features {
            debug!(file = %feature.display(), "Copying feature");
            copy_into(feature, &feature_dir)?;
        }
        for bundle in bundles {
            debug!(file = %bundle.display(), "Copying bundle");
            copy_into(bundle, &bundle_dir)?;
        }

        Ok(())
    }

    /// Every file currently staged, relative to the root, in sorted order.
    pub fn files(&self) -> P2Result<Vec<PathBuf>> {
        let mut files = Vec::new();
        for entry in WalkDir::new(self.path()).sort_by_file_name() {
            let entry = entry.map_err(std::io::Error::from)?;
            if !entry.file_type().is_file() {
                continue;
            }
            if let Ok(relative) = entry.path().strip_prefix(self.path()) {
                files.push(relative.to_path_buf());
            }
        }
        Ok(files)
    }

    /// Remove the staging directory, reporting any failure to do so.
    pub fn close(self) -> P2Result<()> {
        let path = self.path().to_path_buf();
        self.dir.close()?;
        debug!(path = %path.display(), "Removed staging directory");
        Ok(())
    }
}

/// Create a temporary directory under `temp_root`, or the system temp dir.
pub(crate) fn create_temp_dir(temp_root: Option<&Path>, prefix: &str) -> P2Result<TempDir> {
    let mut builder = tempfile::Builder::new();
    builder.prefix(prefix);
    let dir = match temp_root {
        Some(root) => builder.tempdir_in(root)?,
        None => builder.tempdir()?,
    };
    Ok(dir)
}

fn copy_into(source: &Path, dest_dir: &Path) -> P2Result<()> {
    let file_name = source.file_name().ok_or_else(|| {
        P2Error::Config(format!("invalid artifact path: {}", source.display()))
    })?;

    fs::copy(source, dest_dir.join(file_name)).map_err(|e| {
        if e.kind() == ErrorKind::NotFound {
            P2Error::file_not_found(source, e)
        } else {
            P2Error::Io(e)
        }
    })?;

    Ok(())
}
