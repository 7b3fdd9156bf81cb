use super::*;

// =============================================================================
// VALUE ENUM PARSING
// =============================================================================

macro_rules! test_enum_completeness {
    ($enum_type:ty, $test_name:ident) => {
        #[test]
        fn $test_name() {
            for variant in <$enum_type>::value_variants() {
                let possible_value = variant
                    .to_possible_value()
                    .expect("PossibleValue should exist for all variants");
                let primary_name = possible_value.get_name();
                let parsed: Result<$enum_type, _> = primary_name.parse();
                assert_eq!(
                    parsed.ok(),
                    Some(*variant),
                    "Primary name '{}' should round-trip",
                    primary_name
                );
            }
        }
    };
}

macro_rules! test_fromstr_aliases {
    ($enum_type:ty, $test_name:ident, $expected_mappings:expr) => {
        #[test]
        fn $test_name() {
            let mappings: &[(&str, $enum_type)] = &$expected_mappings;

            for (input, expected) in mappings {
                let parsed: Result<$enum_type, _> = input.parse();
                assert_eq!(
                    parsed.ok(),
                    Some(*expected),
                    "Wrong variant for input '{}'",
                    input
                );
            }
        }
    };
}

test_enum_completeness!(LogLevel, test_log_level_completeness);
test_enum_completeness!(LogFormat, test_log_format_completeness);
test_enum_completeness!(LogOutput, test_log_output_completeness);
test_enum_completeness!(ResolverMode, test_resolver_mode_completeness);

test_fromstr_aliases!(
    LogLevel,
    test_log_level_aliases,
    [
        ("error", LogLevel::Error),
        ("err", LogLevel::Error),
        ("warn", LogLevel::Warning),
        ("warning", LogLevel::Warning),
        ("info", LogLevel::Info),
        ("debug", LogLevel::Debug),
        ("trace", LogLevel::Trace),
        ("verbose", LogLevel::Trace),
    ]
);

test_fromstr_aliases!(
    LogFormat,
    test_log_format_aliases,
    [
        ("text", LogFormat::Text),
        ("plain", LogFormat::Text),
        ("json", LogFormat::Json),
        ("yml", LogFormat::Yaml),
        ("pretty", LogFormat::Yaml),
    ]
);

test_fromstr_aliases!(
    ResolverMode,
    test_resolver_mode_aliases,
    [
        ("registry", ResolverMode::Registry),
        ("remote", ResolverMode::Registry),
        ("REMOTE", ResolverMode::Registry),
        ("archive", ResolverMode::Archive),
        ("local", ResolverMode::Archive),
        ("fixture", ResolverMode::Fixture),
        ("test", ResolverMode::Fixture),
    ]
);

#[test]
fn test_unknown_mode_reports_value() {
    let err = "ftp".parse::<ResolverMode>().unwrap_err();
    assert!(matches!(err, ConfigError::ParseError { ref value, .. } if value == "ftp"));
    assert!(err.to_string().contains("invalid resolver mode"));
}

#[test]
fn test_resolver_mode_display_uses_primary_name() {
    assert_eq!(ResolverMode::Registry.to_string(), "registry");
    assert_eq!(ResolverMode::Archive.to_string(), "archive");
    assert_eq!(ResolverMode::Fixture.to_string(), "fixture");
}

// =============================================================================
// BEHAVIOR
// =============================================================================

#[test]
fn test_log_level_from_verbosity_boundary_conditions() {
    assert_eq!(LogLevel::from_verbosity(0), LogLevel::Error);
    assert_eq!(LogLevel::from_verbosity(1), LogLevel::Warning);
    assert_eq!(LogLevel::from_verbosity(2), LogLevel::Info);
    assert_eq!(LogLevel::from_verbosity(3), LogLevel::Debug);
    assert_eq!(LogLevel::from_verbosity(4), LogLevel::Trace);
    assert_eq!(LogLevel::from_verbosity(u8::MAX), LogLevel::Trace);
}

#[test]
fn test_filter_strings() {
    assert_eq!(LogLevel::Warning.as_filter_str(), "warn");
    assert_eq!(LogLevel::Trace.as_filter_str(), "trace");
}

#[test]
fn test_resolution_error_package_accessor() {
    let errors = [
        ResolutionError::NotFound {
            package: "A".to_string(),
        },
        ResolutionError::Unreachable {
            package: "A".to_string(),
            reason: "timeout".to_string(),
        },
        ResolutionError::Malformed {
            package: "A".to_string(),
            reason: "bad json".to_string(),
        },
    ];

    for error in &errors {
        assert_eq!(error.package(), "A");
    }
}

#[test]
fn test_error_display() {
    let error = ConfigError::InvalidMaxDepth { value: 0 };
    assert_eq!(error.to_string(), "Invalid max depth: 0 (must be >= 1)");

    let error = ConfigError::InvalidRepository {
        repo: "nowhere".to_string(),
        reason: "path does not exist".to_string(),
    };
    assert_eq!(
        error.to_string(),
        "Invalid repository 'nowhere': path does not exist"
    );

    let error = ResolutionError::NotFound {
        package: "Newtonsoft.Json".to_string(),
    };
    assert_eq!(error.to_string(), "Package not found: Newtonsoft.Json");
}
