// tests/integration_merge.rs
//! End-to-end merge runs over surefire/testng-style directory trees.

use anyhow::Result;
use polarion_prep_core::config::{MergeConfig, MissingMarker};
use polarion_prep_core::error::PrepError;
use polarion_prep_core::merge::{self, Counter};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

// --- Fixtures ---

const CORE_SUITE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<testsuite hostname="localhost.localdomain" name="org.infinispan.persistence.StoreFunctionalTest" tests="8" failures="0" timestamp="25 Aug 2014 13:07:12 GMT" time="1.207" errors="0" skipped="0">
  <properties>
    <property name="java.version" value="1.8.0_45"/>
    <property name="os.name" value="Linux"/>
  </properties>
  <testcase name="testPreloadAndExpiry" classname="org.infinispan.persistence.StoreFunctionalTest" time="0.201"/>
  <testcase name="testPreloadStoredAsBinary" classname="org.infinispan.persistence.StoreFunctionalTest" time="0.102"/>
  <testcase name="testStoreByteArrays" classname="org.infinispan.persistence.StoreFunctionalTest" time="0.103"/>
  <testcase name="testTwoCachesSameCacheStore" classname="org.infinispan.persistence.StoreFunctionalTest" time="0.201"/>
  <testcase name="testPutGetRemove" classname="org.infinispan.persistence.StoreFunctionalTest" time="0.150"/>
  <testcase name="testPutClearPut" classname="org.infinispan.persistence.StoreFunctionalTest" time="0.150"/>
  <testcase name="testMultiplePutsOnSameKey" classname="org.infinispan.persistence.StoreFunctionalTest" time="0.150"/>
  <testcase name="testPutRemove" classname="org.infinispan.persistence.StoreFunctionalTest" time="0.150"/>
</testsuite>
"#;

const REMOTE_SUITE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<testsuite name="org.jcache.RemoteIT" tests="3" errors="1" failures="0" skipped="0" time="0.5" timestamp="2014-08-25T13:08:00">
  <properties>
    <property name="java.version" value="11"/>
  </properties>
  <testcase name="testGet" classname="org.jcache.RemoteIT" time="0.1"/>
  <testcase name="testPut" classname="org.jcache.RemoteIT" time="0.2">
    <error message="boom" type="java.lang.IllegalStateException">trace</error>
  </testcase>
  <testcase name="testRemove" classname="org.jcache.RemoteIT" time="0.2"/>
</testsuite>
"#;

fn write_result(root: &Path, rel: &str, content: &str) -> Result<PathBuf> {
    let path = root.join(rel);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(&path, content)?;
    Ok(path)
}

fn project_tree() -> Result<TempDir> {
    let dir = TempDir::new()?;
    write_result(
        dir.path(),
        "core/target/surefire-reports/TEST-org.infinispan.persistence.StoreFunctionalTest.xml",
        CORE_SUITE,
    )?;
    write_result(
        dir.path(),
        "jcache/remote/test-output/junitreports/TEST-org.jcache.RemoteIT.xml",
        REMOTE_SUITE,
    )?;
    Ok(dir)
}

fn merged(dir: &TempDir) -> Result<String> {
    Ok(fs::read_to_string(dir.path().join("ResultsForPolarion.xml"))?)
}

// --- Totals ---

#[test]
fn totals_are_summed_across_files() -> Result<()> {
    let dir = project_tree()?;
    let summary = merge::run(dir.path(), &MergeConfig::default(), |_, _, _| {})?;

    assert_eq!(summary.files, 2);
    assert_eq!(summary.totals.tests, Counter::Int(11));
    assert_eq!(summary.totals.errors, Counter::Int(1));
    assert_eq!(summary.totals.failures, Counter::Int(0));
    assert_eq!(summary.totals.skipped, Counter::Int(0));

    let text = merged(&dir)?;
    assert!(text.contains(
        r#"<testsuite name="ResultsForPolarion"  time="1.707" tests="11" errors="1" skipped="0" failures="0" >"#
    ));
    Ok(())
}

#[test]
fn document_is_wrapped_once() -> Result<()> {
    let dir = project_tree()?;
    merge::run(dir.path(), &MergeConfig::default(), |_, _, _| {})?;
    let text = merged(&dir)?;

    assert!(text.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<testsuites>\n"));
    assert!(text.ends_with("</testsuite>\n</testsuites>\n"));
    assert_eq!(text.matches("<?xml ").count(), 1);
    assert_eq!(text.matches("<testsuites>").count(), 1);
    Ok(())
}

// --- Properties ---

#[test]
fn properties_written_once_from_largest_file() -> Result<()> {
    let dir = project_tree()?;
    merge::run(dir.path(), &MergeConfig::default(), |_, _, _| {})?;
    let text = merged(&dir)?;

    assert_eq!(text.matches("<properties>").count(), 1);
    assert_eq!(text.matches("</properties>").count(), 1);
    assert!(text.contains(r#"value="1.8.0_45""#));
    assert!(!text.contains(r#"value="11""#));

    let suite_header = text.find("name=\"ResultsForPolarion\"").unwrap_or(usize::MAX);
    let props = text.find("<properties>").unwrap_or(0);
    let first_body = text.find("name=\"org.infinispan").unwrap_or(0);
    assert!(suite_header < props && props < first_body);
    Ok(())
}

// --- Rewriting ---

#[test]
fn classnames_prefixed_with_project_namespace() -> Result<()> {
    let dir = project_tree()?;
    merge::run(dir.path(), &MergeConfig::default(), |_, _, _| {})?;
    let text = merged(&dir)?;

    assert_eq!(
        text.matches(r#"classname="core_org.infinispan.persistence.StoreFunctionalTest""#).count(),
        8
    );
    assert_eq!(text.matches(r#"classname="jcache_remote_org.jcache.RemoteIT""#).count(), 3);
    assert!(!text.contains(r#"classname="org."#));
    assert!(text.contains(r#"<error message="boom" type="java.lang.IllegalStateException">trace</error>"#));
    Ok(())
}

#[test]
fn suite_lines_lose_timestamp_and_gain_separator() -> Result<()> {
    let dir = project_tree()?;
    merge::run(dir.path(), &MergeConfig::default(), |_, _, _| {})?;
    let text = merged(&dir)?;

    assert!(!text.contains("timestamp="));
    assert!(text.contains(
        "\n\n<testsuite name=\"org.jcache.RemoteIT\" tests=\"3\" errors=\"1\" failures=\"0\" skipped=\"0\" time=\"0.5\" >\n"
    ));
    Ok(())
}

#[test]
fn progress_reported_per_file_largest_first() -> Result<()> {
    let dir = project_tree()?;
    let mut seen = Vec::new();
    merge::run(dir.path(), &MergeConfig::default(), |i, total, path| {
        seen.push((i, total, path.file_name().map(|n| n.to_string_lossy().into_owned())));
    })?;

    assert_eq!(seen.len(), 2);
    assert_eq!(
        seen[0],
        (1, 2, Some("TEST-org.infinispan.persistence.StoreFunctionalTest.xml".to_string()))
    );
    assert_eq!(seen[1].0, 2);
    Ok(())
}

// --- Edge cases ---

#[test]
fn empty_tree_writes_zero_totals() -> Result<()> {
    let dir = TempDir::new()?;
    let summary = merge::run(dir.path(), &MergeConfig::default(), |_, _, _| {})?;
    assert_eq!(summary.files, 0);

    let text = merged(&dir)?;
    assert!(text.contains(r#"time="0" tests="0" errors="0" skipped="0" failures="0" >"#));
    Ok(())
}

#[test]
fn malformed_counter_aborts_without_output() -> Result<()> {
    let dir = TempDir::new()?;
    write_result(
        dir.path(),
        "core/target/TEST-bad.xml",
        "<testsuite name=\"bad\" tests=\"eight\" time=\"1\">\n</testsuite>\n",
    )?;

    let err = merge::run(dir.path(), &MergeConfig::default(), |_, _, _| {}).unwrap_err();
    assert!(matches!(err, PrepError::InvalidCounter { .. }));
    assert!(!dir.path().join("ResultsForPolarion.xml").exists());
    Ok(())
}

#[test]
fn missing_marker_is_an_error_by_default() -> Result<()> {
    let dir = TempDir::new()?;
    write_result(dir.path(), "reports/TEST-a.xml", REMOTE_SUITE)?;

    let err = merge::run(dir.path(), &MergeConfig::default(), |_, _, _| {}).unwrap_err();
    assert!(matches!(err, PrepError::MissingProjectMarker { .. }));
    Ok(())
}

#[test]
fn missing_marker_can_fall_back_to_empty_namespace() -> Result<()> {
    let dir = TempDir::new()?;
    write_result(dir.path(), "reports/TEST-a.xml", REMOTE_SUITE)?;
    let config = MergeConfig {
        missing_marker: MissingMarker::Empty,
        ..MergeConfig::default()
    };

    merge::run(dir.path(), &config, |_, _, _| {})?;
    let text = merged(&dir)?;
    assert!(text.contains(r#"classname="_org.jcache.RemoteIT""#));
    Ok(())
}

#[test]
fn scan_order_does_not_change_totals() -> Result<()> {
    let a = project_tree()?;
    let b = TempDir::new()?;
    // Same suites, sizes flipped so the other file is processed first.
    write_result(
        b.path(),
        "core/target/TEST-core.xml",
        &CORE_SUITE.replace("    <property name=\"os.name\" value=\"Linux\"/>\n", ""),
    )?;
    write_result(
        b.path(),
        "jcache/remote/test-output/TEST-remote.xml",
        &format!("{REMOTE_SUITE}{}", "\n".repeat(4096)),
    )?;

    let first = merge::run(a.path(), &MergeConfig::default(), |_, _, _| {})?;
    let second = merge::run(b.path(), &MergeConfig::default(), |_, _, _| {})?;
    assert_eq!(first.totals, second.totals);

    let text = merged(&b)?;
    assert!(text.contains(r#"value="11""#));
    assert!(!text.contains(r#"value="1.8.0_45""#));
    Ok(())
}

#[test]
fn scan_rooted_inside_build_output_uses_empty_namespace() -> Result<()> {
    let dir = TempDir::new()?;
    write_result(dir.path(), "core/target/surefire-reports/TEST-a.xml", REMOTE_SUITE)?;
    let root = dir.path().join("core/target");

    let summary = merge::run(&root, &MergeConfig::default(), |_, _, _| {})?;
    assert_eq!(summary.files, 1);
    let text = fs::read_to_string(root.join("ResultsForPolarion.xml"))?;
    assert!(text.contains(r#"classname="_org.jcache.RemoteIT""#));
    Ok(())
}

// --- Encoding ---

#[test]
fn non_utf8_bytes_are_copied_unchanged() -> Result<()> {
    let dir = TempDir::new()?;
    let path = dir.path().join("core/target/TEST-a.xml");
    fs::create_dir_all(path.parent().unwrap_or(dir.path()))?;
    let mut content = b"<?xml version=\"1.0\" encoding=\"ISO-8859-1\"?>\n\
<testsuite name=\"a\" tests=\"1\" time=\"0.1\">\n\
  <testcase name=\"t\" classname=\"A\" time=\"0.1\"/>\n\
  <system-out>caf"
        .to_vec();
    content.extend_from_slice(b"\xE9</system-out>\n</testsuite>\n");
    fs::write(&path, &content)?;

    let summary = merge::run(dir.path(), &MergeConfig::default(), |_, _, _| {})?;
    assert_eq!(summary.totals.tests, Counter::Int(1));

    let bytes = fs::read(dir.path().join("ResultsForPolarion.xml"))?;
    let needle = b"<system-out>caf\xE9</system-out>";
    assert!(bytes.windows(needle.len()).any(|w| w == needle));
    let text = String::from_utf8_lossy(&bytes);
    assert!(text.contains(r#"classname="core_A""#));
    Ok(())
}
