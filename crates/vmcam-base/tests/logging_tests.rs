use log::Log;
use std::fs;
use vmcam_base::logging::{init_file_logger, init_stdout_logger, FileLogger, StdoutLogger};

fn test_dir(name: &str) -> std::path::PathBuf {
    std::env::temp_dir().join(format!("vmcam-log-test-{}-{}", std::process::id(), name))
}

#[test]
fn test_stdout_logger_implements_log_trait() {
    let logger = StdoutLogger;
    log::set_max_level(log::LevelFilter::Info);

    let metadata = log::MetadataBuilder::new()
        .level(log::Level::Warn)
        .target("test")
        .build();
    assert!(logger.enabled(&metadata));

    let record = log::RecordBuilder::new()
        .level(log::Level::Warn)
        .target("test")
        .file(Some("test.rs"))
        .line(Some(42))
        .args(format_args!("test message"))
        .build();
    logger.log(&record);
    logger.flush();
}

#[test]
fn test_file_logger_creates_directory() {
    let dir = test_dir("dir");
    let _ = fs::remove_dir_all(&dir);

    let _logger = FileLogger::new(&dir).expect("Failed to create FileLogger");
    assert!(dir.is_dir());

    fs::remove_dir_all(&dir).ok();
}

#[test]
fn test_file_logger_writes_to_file() {
    let dir = test_dir("write");
    let _ = fs::remove_dir_all(&dir);
    log::set_max_level(log::LevelFilter::Info);

    let logger = FileLogger::new(&dir).expect("Failed to create FileLogger");
    let record = log::RecordBuilder::new()
        .level(log::Level::Error)
        .target("vmcam_pipeline::pipeline")
        .file(Some("pipeline.rs"))
        .line(Some(100))
        .args(format_args!("inference call failed"))
        .build();
    logger.log(&record);
    logger.flush();

    let entries: Vec<_> = fs::read_dir(&dir)
        .expect("Failed to read test directory")
        .filter_map(|e| e.ok())
        .collect();
    assert_eq!(entries.len(), 1, "Should have exactly one log file");

    let content = fs::read_to_string(entries[0].path()).expect("Failed to read log file");
    assert!(content.contains("[ERROR]"));
    assert!(content.contains("thread:"));
    assert!(content.contains("vmcam_pipeline::pipeline"));
    assert!(content.contains("pipeline.rs:100"));
    assert!(content.contains("inference call failed"));

    fs::remove_dir_all(&dir).ok();
}

#[test]
fn test_init_stdout_logger_sets_global_logger() {
    init_stdout_logger();
    log::info!("message through the global logger");
}

#[test]
fn test_init_file_logger_invalid_dir_returns_error() {
    let result = init_file_logger("/proc/nonexistent/path");
    assert!(result.is_err());
}
