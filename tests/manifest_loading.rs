mod common;
use crate::common::builders::ManifestBuilder;
use crate::common::{init_tracing, with_timeout};

use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

use tempfile::NamedTempFile;
use tokio_util::sync::CancellationToken;

use dagbuild::build_with;
use dagbuild::config::{BuildManifest, load_and_validate, load_from_path};
use dagbuild::errors::BuildError;

fn manifest_file(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "{}", contents).unwrap();
    file
}

#[test]
fn loads_manifest_with_settings_and_tasks() {
    let file = manifest_file(
        r#"
[settings]
workers = 5
drain_timeout_ms = 250
time_unit_ms = 2

[task.A]
duration = 5
after = ["B", "C"]

[task.B]
duration = 10
after = ["D"]

[task.C]
duration = 8
after = ["D"]

[task.D]
duration = 5
"#,
    );

    let manifest = load_and_validate(file.path()).unwrap();

    assert_eq!(manifest.plan().worker_count(), 5);
    assert_eq!(manifest.plan().len(), 4);
    assert_eq!(manifest.options().drain_timeout, Duration::from_millis(250));
    let a = manifest.plan().task("A").unwrap();
    assert_eq!(a.duration, 5);
    assert!(a.dependencies.contains("B") && a.dependencies.contains("C"));
    assert!(manifest.plan().task("D").unwrap().dependencies.is_empty());
}

#[test]
fn settings_section_is_optional() {
    let file = manifest_file(
        r#"
[task.only]
duration = 3
"#,
    );

    let raw = load_from_path(file.path()).unwrap();
    assert_eq!(raw.settings.workers, 1);
    assert_eq!(raw.settings.drain_timeout_ms, 10_000);
    assert_eq!(raw.settings.time_unit_ms, 0);

    let manifest = BuildManifest::try_from(raw).unwrap();
    assert_eq!(manifest.options().drain_timeout, Duration::from_secs(10));
}

#[test]
fn manifest_cycle_returns_structured_error() {
    let file = manifest_file(
        r#"
[task.A]
duration = 1
after = ["B"]

[task.B]
duration = 1
after = ["A"]
"#,
    );

    match load_and_validate(file.path()) {
        Err(BuildError::CycleError { cycle }) => assert_eq!(cycle, vec!["A", "B"]),
        Err(e) => panic!("Expected CycleError, got: {:?}", e),
        Ok(_) => panic!("Expected error, got Ok"),
    }
}

#[test]
fn manifest_without_tasks_is_rejected() {
    let file = manifest_file(
        r#"
[settings]
workers = 2
"#,
    );

    match load_and_validate(file.path()) {
        Err(BuildError::ConfigError(msg)) => assert!(msg.contains("at least one")),
        Err(e) => panic!("Expected ConfigError, got: {:?}", e),
        Ok(_) => panic!("Expected error, got Ok"),
    }
}

#[test]
fn manifest_with_zero_workers_is_rejected() {
    let raw = ManifestBuilder::new()
        .with_task("A", 1, &[])
        .with_workers(0)
        .raw();

    assert!(matches!(
        BuildManifest::try_from(raw),
        Err(BuildError::ConfigError(_))
    ));
}

#[test]
fn task_without_duration_is_a_parse_error() {
    let file = manifest_file(
        r#"
[task.A]
after = []
"#,
    );

    assert!(matches!(load_from_path(file.path()), Err(BuildError::TomlError(_))));
}

#[test]
fn missing_file_is_an_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("Build.toml");

    assert!(matches!(load_and_validate(&path), Err(BuildError::IoError(_))));
}

#[tokio::test]
async fn manifest_drives_a_full_build() {
    init_tracing();

    let manifest = ManifestBuilder::new()
        .with_task("A", 5, &["B", "C"])
        .with_task("B", 10, &[])
        .with_task("C", 15, &[])
        .with_workers(1)
        .with_drain_timeout_ms(1_000)
        .build();

    let result = with_timeout(build_with(
        manifest.plan(),
        Arc::new(manifest.executor()),
        manifest.options(),
        CancellationToken::new(),
    ))
    .await
    .unwrap();

    assert_eq!(result.to_string(), "[B:10, C:15, A:5]");
}
