use super::*;

#[test]
fn test_logger_config_from_app_config() {
    let config = AppConfig {
        log_level: 3,
        log_format: LogFormat::Yaml,
        log_output: LogOutput::Stdout,
        ..AppConfig::default()
    };

    let logger = config.to_logger_config(true);
    assert_eq!(logger.level, LogLevel::Debug);
    assert_eq!(logger.format, LogFormat::Yaml);
    assert_eq!(logger.output, LogOutput::Stdout);
    assert!(logger.ansi);

    let no_color = AppConfig {
        no_color: true,
        ..AppConfig::default()
    };
    assert!(!no_color.to_logger_config(true).ansi);
    assert!(!AppConfig::default().to_logger_config(false).ansi);
}

#[test]
fn test_networking_config_from_app_config() {
    let config = AppConfig {
        jobs: 12,
        net_timeout: 7,
        trace_requests: true,
        ..AppConfig::default()
    };

    let networking = config.to_networking_config();
    assert_eq!(networking.max_jobs, 12);
    assert_eq!(networking.timeout_seconds, 7);
    assert!(networking.trace_requests);
}

#[test]
fn test_validate_accepts_defaults() {
    assert!(AppConfig::default().validate().is_ok());
}

#[test]
fn test_merge_keeps_flags_set_on_either_side() {
    let base = AppConfig {
        no_color: true,
        ..AppConfig::default()
    };
    let merged = base.merge_with(AppConfig::default());
    assert!(merged.no_color);
    assert!(!merged.trace_requests);
}
