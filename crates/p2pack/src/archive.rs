//! Reproducible zip archives.
//!
//! [`write_archive`] zips a directory tree so that identical inputs always
//! give byte-identical archives: entries are written in sorted path order,
//! every entry is stamped 1980-01-01 00:00:00 with permission bits `0644`,
//! and host mtimes and modes are ignored.

use crate::P2Result;
use sha2::{Digest, Sha256};
use std::fs::{self, File};
use std::io::Write;
use std::path::Path;
use tracing::debug;
use walkdir::WalkDir;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, DateTime, ZipWriter};

/// Permission bits stored for every archive entry.
pub const ENTRY_PERMISSIONS: u32 = 0o644;

/// What [`write_archive`] wrote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveSummary {
    /// Archive entry names, in the order written.
    pub entries: Vec<String>,
    /// SHA256 of the finished archive, hex encoded.
    pub sha256: String,
}

/// Zip every file below `source_dir` into `output_path`.
///
/// Entry names are paths relative to `source_dir` with `/` separators.
/// Directories get no entries of their own.
pub fn write_archive<P: AsRef<Path>, Q: AsRef<Path>>(
    source_dir: P,
    output_path: Q,
) -> P2Result<ArchiveSummary> {
    let source_dir = source_dir.as_ref();
    let output_path = output_path.as_ref();

    let file = File::create(output_path)?;
    let mut zip = ZipWriter::new(file);
    let options = entry_options();

    let mut entries = Vec::new();
    for entry in WalkDir::new(source_dir).min_depth(1).sort_by_file_name() {
        let entry = entry.map_err(std::io::Error::from)?;
        if !entry.file_type().is_file() {
            continue;
        }

        let name = entry_name(source_dir, entry.path());
        debug!(entry = %name, "Adding file to archive");

        let contents = fs::read(entry.path())?;
        zip.start_file(name.clone(), options)?;
        zip.write_all(&contents)?;
        entries.push(name);
    }

    zip.finish()?;

    let sha256 = compute_sha256(&fs::read(output_path)?);
    Ok(ArchiveSummary { entries, sha256 })
}

/// Options shared by every entry.
fn entry_options() -> SimpleFileOptions {
    // DateTime::default() is the DOS epoch, 1980-01-01 00:00:00.
    SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .last_modified_time(DateTime::default())
        .unix_permissions(ENTRY_PERMISSIONS)
}

fn entry_name(root: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path);
    relative
        .components()
        .map(|component| component.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

/// Compute SHA256 hash of data and return as hex string.
pub fn compute_sha256(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}
