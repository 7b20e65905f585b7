//! Integration tests for the update site and feature builders.
//!
//! A stub publisher stands in for the Eclipse launcher, so no JVM is needed.

#![allow(non_snake_case)]

use p2pack::{
    FeatureConfig, P2Error, P2Result, PublishOutput, Publisher, SiteConfig, build_feature,
    build_site,
};
use std::cell::Cell;
use std::fs::{self, File};
use std::io::Read;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};
use tempfile::TempDir;
use zip::ZipArchive;

/// Writes fixed metadata on success, or a log file and an exit code on failure.
struct StubPublisher {
    exit_code: i32,
    calls: Cell<usize>,
}

impl StubPublisher {
    fn succeeding() -> Self {
        Self {
            exit_code: 0,
            calls: Cell::new(0),
        }
    }

    fn failing(exit_code: i32) -> Self {
        Self {
            exit_code,
            calls: Cell::new(0),
        }
    }
}

impl Publisher for StubPublisher {
    fn publish(&self, repository: &Path, configuration: &Path) -> P2Result<PublishOutput> {
        self.calls.set(self.calls.get() + 1);

        if self.exit_code != 0 {
            fs::write(configuration.join("publisher.log"), "!MESSAGE no features found")?;
            return Ok(PublishOutput {
                exit_code: self.exit_code,
                stdout: b"Generating metadata".to_vec(),
            });
        }

        fs::write(repository.join("artifacts.jar"), b"artifacts metadata")?;
        fs::write(repository.join("content.jar"), b"content metadata")?;
        Ok(PublishOutput::default())
    }
}

/// Input jars plus a private temp root the pipeline must leave empty.
struct Fixture {
    inputs: TempDir,
    temp_root: TempDir,
    out: TempDir,
}

impl Fixture {
    fn new() -> Self {
        let inputs = TempDir::new().unwrap();
        fs::write(inputs.path().join("foo_1.2.3.jar"), b"feature jar").unwrap();
        fs::write(inputs.path().join("foo.core_1.2.3.jar"), b"bundle jar").unwrap();

        Self {
            inputs,
            temp_root: TempDir::new().unwrap(),
            out: TempDir::new().unwrap(),
        }
    }

    fn config(&self, output: &str) -> SiteConfig {
        SiteConfig {
            output: self.out.path().join(output),
            name: "Foo".to_string(),
            url: "http://example.com/foo".to_string(),
            description: "Foo update site".to_string(),
            feature_ids: vec!["foo".to_string()],
            features: vec![self.inputs.path().join("foo_1.2.3.jar")],
            feature_versions: vec!["1.2.3".to_string()],
            bundles: vec![self.inputs.path().join("foo.core_1.2.3.jar")],
            temp_root: Some(self.temp_root.path().to_path_buf()),
        }
    }

    fn temp_entries(&self) -> Vec<PathBuf> {
        fs::read_dir(self.temp_root.path())
            .unwrap()
            .map(|entry| entry.unwrap().path())
            .collect()
    }
}

fn read_entry(zip_path: &Path, name: &str) -> Vec<u8> {
    let mut archive = ZipArchive::new(File::open(zip_path).unwrap()).unwrap();
    let mut contents = Vec::new();
    archive
        .by_name(name)
        .unwrap()
        .read_to_end(&mut contents)
        .unwrap();
    contents
}

// =============================================================================
// Successful builds
// =============================================================================

mod success {
    use super::*;

    #[test]
    fn build_site___zips_staged_tree_and_metadata() {
        let fixture = Fixture::new();
        let config = fixture.config("site.zip");
        let output = config.output.clone();

        let summary = build_site(config, &StubPublisher::succeeding()).unwrap();

        assert_eq!(
            summary.entries,
            vec![
                "artifacts.jar",
                "content.jar",
                "features/foo_1.2.3.jar",
                "plugins/foo.core_1.2.3.jar",
                "site.xml",
            ]
        );
        assert_eq!(read_entry(&output, "features/foo_1.2.3.jar"), b"feature jar");
        assert_eq!(read_entry(&output, "plugins/foo.core_1.2.3.jar"), b"bundle jar");
        assert_eq!(read_entry(&output, "content.jar"), b"content metadata");

        let site_xml = String::from_utf8(read_entry(&output, "site.xml")).unwrap();
        assert!(site_xml.contains(
            "<feature url=\"feature/foo_1.2.3.jar\" id=\"foo\" version=\"1.2.3\"/>"
        ));
    }

    #[test]
    fn build_site___removes_all_temporary_directories() {
        let fixture = Fixture::new();
        let publisher = StubPublisher::succeeding();

        build_site(fixture.config("site.zip"), &publisher).unwrap();

        assert_eq!(publisher.calls.get(), 1);
        assert!(fixture.temp_entries().is_empty());
    }

    #[test]
    fn build_site___is_byte_for_byte_reproducible() {
        let fixture = Fixture::new();
        let feature = fixture.inputs.path().join("foo_1.2.3.jar");

        File::options()
            .write(true)
            .open(&feature)
            .unwrap()
            .set_modified(SystemTime::UNIX_EPOCH + Duration::from_secs(86_400))
            .unwrap();
        let first = build_site(fixture.config("a.zip"), &StubPublisher::succeeding()).unwrap();

        File::options()
            .write(true)
            .open(&feature)
            .unwrap()
            .set_modified(SystemTime::now())
            .unwrap();
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&feature, fs::Permissions::from_mode(0o700)).unwrap();
        }
        let second = build_site(fixture.config("b.zip"), &StubPublisher::succeeding()).unwrap();

        assert_eq!(first.sha256, second.sha256);
        assert_eq!(
            fs::read(fixture.out.path().join("a.zip")).unwrap(),
            fs::read(fixture.out.path().join("b.zip")).unwrap()
        );
    }

    #[test]
    fn build_feature___writes_plugin_element_for_jar() {
        let temp_dir = TempDir::new().unwrap();
        let license = temp_dir.path().join("LICENSE.txt");
        fs::write(&license, "Apache License\nVersion 2.0\n").unwrap();
        let output = temp_dir.path().join("feature.xml");

        build_feature(FeatureConfig {
            output: output.clone(),
            id: "foo".to_string(),
            label: "Foo".to_string(),
            version: "1.2.3".to_string(),
            provider: "Acme".to_string(),
            description: "d".to_string(),
            description_url: None,
            copyright: "c".to_string(),
            license_url: "http://l".to_string(),
            license,
            sites: vec!["docs=http://x".parse().unwrap()],
            plugins: vec!["foo_1.2.3.jar".to_string(), "notes.txt".to_string()],
        })
        .unwrap();

        let xml = fs::read_to_string(&output).unwrap();
        assert!(xml.contains(
            "<feature id=\"foo\" label=\"Foo\" version=\"1.2.3\" provider-name=\"Acme\">"
        ));
        assert!(xml.contains("<license url=\"http://l\">Apache License\nVersion 2.0\n</license>"));
        assert!(xml.contains("<discovery label=\"docs\" url=\"http://x\"/>"));
        assert_eq!(xml.matches("<plugin ").count(), 1);
        assert!(xml.contains(
            "<plugin id=\"foo\" download-size=\"0\" install-size=\"0\" version=\"1.2.3\" unpack=\"true\"/>"
        ));
    }
}

// =============================================================================
// Failure paths
// =============================================================================

mod failures {
    use super::*;

    #[test]
    fn build_site___mismatched_lists_fail_before_staging() {
        let fixture = Fixture::new();
        let mut config = fixture.config("site.zip");
        config.feature_versions.clear();
        let output = config.output.clone();
        let publisher = StubPublisher::succeeding();

        let result = build_site(config, &publisher);

        assert!(matches!(result, Err(P2Error::Config(_))));
        assert_eq!(publisher.calls.get(), 0);
        assert!(fixture.temp_entries().is_empty());
        assert!(!output.exists());
    }

    #[test]
    fn build_site___publisher_failure_carries_exit_code_and_logs() {
        let fixture = Fixture::new();
        let config = fixture.config("site.zip");
        let output = config.output.clone();

        let err = build_site(config, &StubPublisher::failing(13)).unwrap_err();

        assert_eq!(err.exit_code(), 13);
        let P2Error::PublisherFailed(failure) = err else {
            panic!("expected PublisherFailed");
        };
        assert_eq!(failure.stdout, b"Generating metadata");
        assert_eq!(failure.logs.len(), 1);
        assert_eq!(failure.logs[0].name, "publisher.log");
        assert_eq!(failure.logs[0].contents, "!MESSAGE no features found");
        assert!(!output.exists());
    }

    #[test]
    fn build_site___publisher_failure_removes_staging_directory() {
        let fixture = Fixture::new();

        let err = build_site(fixture.config("site.zip"), &StubPublisher::failing(7)).unwrap_err();

        let P2Error::PublisherFailed(failure) = err else {
            panic!("expected PublisherFailed");
        };
        // Only the publisher's configuration directory survives.
        assert_eq!(fixture.temp_entries(), vec![failure.configuration_dir.clone()]);
        assert!(!failure.configuration_dir.join("site.xml").exists());
    }

    #[test]
    fn build_site___missing_bundle_is_file_not_found_and_cleans_up() {
        let fixture = Fixture::new();
        let mut config = fixture.config("site.zip");
        config.bundles.push(fixture.inputs.path().join("missing_0.1.jar"));
        let publisher = StubPublisher::succeeding();

        let result = build_site(config, &publisher);

        assert!(matches!(result, Err(P2Error::FileNotFound { .. })));
        assert_eq!(publisher.calls.get(), 0);
        assert!(fixture.temp_entries().is_empty());
    }
}
