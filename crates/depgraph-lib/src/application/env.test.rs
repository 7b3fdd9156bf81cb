use super::*;

fn env(pairs: &[(&str, &str)]) -> EnvironmentConfig {
    envy::from_iter(
        pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string())),
    )
    .unwrap()
}

#[test]
fn test_no_variables_keeps_detection() {
    let config = env(&[]);
    assert!(config.color_enabled(true));
    assert!(!config.color_enabled(false));
}

#[test]
fn test_no_color_disables() {
    assert!(!env(&[("NO_COLOR", "1")]).color_enabled(true));
    // Empty NO_COLOR is ignored
    assert!(env(&[("NO_COLOR", "")]).color_enabled(true));
}

#[test]
fn test_clicolor_zero_disables() {
    assert!(!env(&[("CLICOLOR", "0")]).color_enabled(true));
    assert!(env(&[("CLICOLOR", "1")]).color_enabled(true));
}

#[test]
fn test_ci_disables() {
    assert!(!env(&[("CI", "true")]).color_enabled(true));
}

#[test]
fn test_force_color_wins() {
    let config = env(&[("CI", "1"), ("CLICOLOR", "0"), ("NO_COLOR", "1"), ("FORCE_COLOR", "1")]);
    assert!(config.color_enabled(false));

    assert!(!env(&[("FORCE_COLOR", "0")]).color_enabled(true));
    assert!(env(&[("FORCE_COLOR", "bogus")]).color_enabled(true));
}
