use super::*;
use crate::primitives::{LogFormat, LogOutput};
use crate::testing::TempDirFixture;

#[test]
fn test_config_loading_defaults() {
    let config = AppConfig::default();
    assert_eq!(config.log_level, 1);
    assert_eq!(config.net_timeout, 30);
    assert_eq!(config.jobs, 4);
    assert_eq!(config.log_format, LogFormat::Text);
    assert_eq!(config.log_output, LogOutput::Stderr);
}

#[test]
fn test_config_merging() {
    let base = AppConfig::default();
    let override_config = AppConfig {
        log_level: 4,
        jobs: 16,
        log_format: LogFormat::Json,
        ..AppConfig::default()
    };

    let merged = base.merge_with(override_config);
    assert_eq!(merged.log_level, 4);
    assert_eq!(merged.jobs, 16);
    assert_eq!(merged.log_format, LogFormat::Json);
    assert_eq!(merged.net_timeout, 30);
}

#[test]
fn test_resolve_rejects_zero_jobs() {
    let config = AppConfig {
        jobs: 0,
        ..AppConfig::default()
    };

    let err = AppConfig::resolve(config).unwrap_err();
    assert!(err.to_string().contains("--jobs"));
}

#[test]
fn test_resolve_rejects_zero_timeout() {
    let config = AppConfig {
        net_timeout: 0,
        ..AppConfig::default()
    };
    assert!(AppConfig::resolve(config).is_err());
}

#[test]
fn test_missing_env_file_is_ignored() {
    let fixture = TempDirFixture::new().unwrap();
    assert!(AppConfig::load_env_file(&fixture.path().join(".env")).is_ok());
}

#[test]
fn test_env_file_is_loaded() {
    let fixture = TempDirFixture::new().unwrap();
    let path = fixture
        .write_file(".env", b"DEPGRAPH_LOADER_TEST_MARKER=loaded\n")
        .unwrap();

    AppConfig::load_env_file(&path).unwrap();
    assert_eq!(
        std::env::var("DEPGRAPH_LOADER_TEST_MARKER").as_deref(),
        Ok("loaded")
    );
}

#[test]
fn test_malformed_env_file_is_reported() {
    let fixture = TempDirFixture::new().unwrap();
    let path = fixture.write_file(".env", b"NOT A VALID LINE\n").unwrap();

    let err = AppConfig::load_env_file(&path).unwrap_err();
    assert!(matches!(err, ConfigError::EnvFileError { .. }));
}
