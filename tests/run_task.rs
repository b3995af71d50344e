//! End-to-end tests running the real rsync binary
//!
//! Each test skips itself when rsync is not installed.

mod common;

use common::{SOURCE_FILE_SIZE, create_sparse_file, has_rsync, scratch_with_source_file};
use rsync_task::{Error, Log, RsyncOptions, State, Task};

#[tokio::test]
async fn new_task_starts_empty() {
    if !has_rsync() {
        eprintln!("Skipping test: rsync binary not found in PATH");
        return;
    }

    let task = Task::new("a", "b", RsyncOptions::default()).expect("Failed to create task");

    assert_eq!(task.log(), Log::default());
    assert_eq!(task.state(), State::default());
}

#[tokio::test]
async fn run_copies_file_to_writable_destination() {
    if !has_rsync() {
        eprintln!("Skipping test: rsync binary not found in PATH");
        return;
    }

    let (temp_dir, source) = scratch_with_source_file();
    let destination = temp_dir.path().join("destDir");

    let task = Task::new(&source, &destination, RsyncOptions::default())
        .expect("Failed to create task");
    let result = task.run().await;

    assert!(result.is_ok(), "run failed: {:?}", result);
    let metadata = std::fs::metadata(&destination).expect("destination should exist");
    assert_eq!(metadata.len(), SOURCE_FILE_SIZE);
}

#[tokio::test]
async fn run_fails_for_destination_in_missing_directory() {
    if !has_rsync() {
        eprintln!("Skipping test: rsync binary not found in PATH");
        return;
    }

    let (temp_dir, source) = scratch_with_source_file();
    let destination = temp_dir.path().join("missing").join("nested").join("dest");

    let task = Task::new(&source, &destination, RsyncOptions::default())
        .expect("Failed to create task");
    let result = task.run().await;

    match result {
        Err(Error::ExitStatus { code, stderr }) => {
            assert!(code.is_some_and(|c| c != 0), "unexpected exit code {:?}", code);
            assert!(!stderr.is_empty(), "rsync should explain the failure on stderr");
            assert_eq!(stderr, task.log().stderr);
        }
        other => panic!("Expected ExitStatus error, got: {:?}", other),
    }
    assert!(!destination.exists());
}

#[tokio::test]
async fn progress_reaches_completion() {
    if !has_rsync() {
        eprintln!("Skipping test: rsync binary not found in PATH");
        return;
    }

    let (temp_dir, source) = scratch_with_source_file();
    let destination = temp_dir.path().join("copy");
    let options = RsyncOptions {
        progress: true,
        ..Default::default()
    };

    let task = Task::new(&source, &destination, options).expect("Failed to create task");
    task.run().await.expect("rsync should succeed");

    let state = task.state();
    assert_eq!(state.total, 1);
    assert_eq!(state.remain, 0);
    assert_eq!(state.progress, 100.0);
    assert!(task.log().stdout.contains("to-chk=0/1"));

    // No further output arrives once run() has returned
    assert_eq!(task.state(), state);
}

#[tokio::test]
async fn directory_transfer_counts_every_file() {
    if !has_rsync() {
        eprintln!("Skipping test: rsync binary not found in PATH");
        return;
    }

    let temp_dir = tempfile::TempDir::new().expect("Failed to create temp dir");
    let source = temp_dir.path().join("src");
    std::fs::create_dir(&source).expect("Failed to create source dir");
    for name in ["one.bin", "two.bin", "three.bin"] {
        create_sparse_file(&source.join(name), 64 * 1024);
    }
    let destination = temp_dir.path().join("dst");
    let options = RsyncOptions {
        progress: true,
        ..Default::default()
    };

    // Trailing slash: copy the directory contents
    let source_arg = format!("{}/", source.display());
    let task = Task::new(source_arg, &destination, options).expect("Failed to create task");
    let handle = task.spawn().expect("rsync should start");
    handle.wait().await.expect("rsync should succeed");

    let state = task.state();
    assert_eq!(state.remain, 0);
    assert!(state.total >= 3, "total should count all files, got {}", state.total);
    assert_eq!(state.progress, 100.0);
    for name in ["one.bin", "two.bin", "three.bin"] {
        assert!(destination.join(name).exists(), "{name} should be copied");
    }
}

#[tokio::test]
async fn state_serializes_for_reporting() {
    if !has_rsync() {
        eprintln!("Skipping test: rsync binary not found in PATH");
        return;
    }

    let (temp_dir, source) = scratch_with_source_file();
    let options = RsyncOptions {
        progress: true,
        ..Default::default()
    };
    let task = Task::new(&source, temp_dir.path().join("b"), options)
        .expect("Failed to create task");
    task.run().await.expect("rsync should succeed");

    let json = serde_json::to_value(task.state()).expect("State should serialize");
    assert_eq!(json["remain"], 0);
    assert_eq!(json["total"], 1);
    assert!(json["speed"].is_string());

    let log = serde_json::to_value(task.log()).expect("Log should serialize");
    assert!(log["stdout"].as_str().is_some_and(|s| s.contains("to-chk=")));
}
