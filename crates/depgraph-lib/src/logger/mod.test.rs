use super::*;

#[test]
fn test_default_filter_scopes_our_crates() {
    let filter = default_filter(LogLevel::Debug);

    assert!(filter.starts_with("depgraph_lib=debug,depgraph=debug,"));
    assert!(filter.contains("reqwest=warn"));
    assert!(filter.contains("hyper_util=warn"));
    assert!(filter.ends_with(",debug"));
}

#[test]
fn test_default_filter_parses() {
    for level in [
        LogLevel::Error,
        LogLevel::Warning,
        LogLevel::Info,
        LogLevel::Debug,
        LogLevel::Trace,
    ] {
        assert!(
            EnvFilter::try_new(default_filter(level)).is_ok(),
            "filter for {level:?} must parse"
        );
    }
}

#[test]
fn test_init_once() {
    let config = LoggerConfig {
        level: LogLevel::Error,
        format: LogFormat::Text,
        output: LogOutput::Stderr,
        ansi: false,
    };

    // Other tests in this binary never install a subscriber
    let logger = Logger::init(config.clone()).unwrap();
    assert_eq!(logger.config().level, LogLevel::Error);
    assert!(Logger::is_initialized());
    assert!(Logger::global().is_some());

    assert!(matches!(
        Logger::init(config),
        Err(LoggerError::AlreadyInitialized)
    ));
}
