//! Integration tests for logging system

use core_runtime::logging::{init_logging, LogFormat, LoggingConfig};
use core_runtime::sink::{LogLevel, LoggerSink, MemorySink};
use core_runtime::Error;
use std::sync::Arc;

#[test]
fn test_config_chaining() {
    let config = LoggingConfig::default()
        .with_format(LogFormat::Compact)
        .with_level(LogLevel::Warn)
        .with_spans(false)
        .with_target(false)
        .with_thread_info(true);

    assert_eq!(config.format, LogFormat::Compact);
    assert_eq!(config.level, LogLevel::Warn);
    assert!(!config.enable_spans);
    assert!(!config.display_target);
    assert!(config.display_thread_info);
}

#[test]
fn test_format_selection() {
    let config = LoggingConfig::default();

    #[cfg(debug_assertions)]
    assert_eq!(config.format, LogFormat::Pretty);

    #[cfg(not(debug_assertions))]
    assert_eq!(config.format, LogFormat::Json);
}

// Only one global subscriber can exist per process, so init, double init
// and sink delivery are checked in a single test.
#[test]
fn test_init_logging_once_with_sink() {
    let sink = Arc::new(MemorySink::new(LogLevel::Info));
    let shared: Arc<dyn LoggerSink> = sink.clone();
    let config = LoggingConfig::default()
        .with_format(LogFormat::Compact)
        .with_level(LogLevel::Debug)
        .with_filter("logging_integration=debug")
        .with_logger_sink(shared);

    init_logging(config.clone()).unwrap();

    tracing::debug!("below sink level");
    tracing::info!(asset = "theme.ogg", "Asset decoded");

    let entries = sink.entries();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].message, "Asset decoded");
    assert_eq!(entries[0].fields.get("asset"), Some(&"theme.ogg".to_string()));

    assert!(matches!(init_logging(config), Err(Error::Config(_))));
}

#[test]
fn test_invalid_filter_rejected_before_install() {
    let config = LoggingConfig::default().with_filter("core_decode=notalevel");
    assert!(matches!(init_logging(config), Err(Error::Config(_))));
}
