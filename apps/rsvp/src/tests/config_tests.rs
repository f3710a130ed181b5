use super::*;

use std::collections::HashMap;

fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let vars: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |key| vars.get(key).cloned()
}

#[test]
fn defaults_leave_endpoint_unconfigured() {
    let settings = load_settings_from(None, env_from(&[]));
    assert_eq!(settings, Settings::default());
    assert!(!shared::config::is_configured(&settings.endpoint_url));
    assert_eq!(settings.poll_interval, Duration::from_secs(30));
}

#[test]
fn file_values_override_defaults() {
    let raw = r#"
endpoint_url = "https://script.google.com/macros/s/AKfy/exec"
state_database_url = "sqlite://./tmp/state.db"
poll_interval_secs = 5
"#;
    let settings = load_settings_from(Some(raw), env_from(&[]));
    assert_eq!(
        settings.endpoint_url,
        "https://script.google.com/macros/s/AKfy/exec"
    );
    assert_eq!(settings.state_database_url, "sqlite://./tmp/state.db");
    assert_eq!(settings.poll_interval, Duration::from_secs(5));
}

#[test]
fn env_overrides_file_and_prefixed_env_wins() {
    let raw = r#"endpoint_url = "https://from-file.example/exec""#;
    let settings = load_settings_from(
        Some(raw),
        env_from(&[
            ("RSVP_ENDPOINT_URL", "https://plain.example/exec"),
            ("APP__ENDPOINT_URL", "https://prefixed.example/exec"),
            ("APP__POLL_INTERVAL_SECS", "12"),
        ]),
    );
    assert_eq!(settings.endpoint_url, "https://prefixed.example/exec");
    assert_eq!(settings.poll_interval, Duration::from_secs(12));
}

#[test]
fn zero_or_garbage_interval_is_ignored() {
    let settings = load_settings_from(
        Some("poll_interval_secs = 0"),
        env_from(&[("APP__POLL_INTERVAL_SECS", "soon")]),
    );
    assert_eq!(settings.poll_interval, DEFAULT_POLL_INTERVAL);
}

#[test]
fn unreadable_file_is_ignored() {
    let settings = load_settings_from(Some("endpoint_url = ["), env_from(&[]));
    assert_eq!(settings, Settings::default());
}

#[test]
fn bare_state_path_is_normalized_and_blank_falls_back() {
    let settings = load_settings_from(
        Some(r#"state_database_url = "./data/x.db""#),
        env_from(&[]),
    );
    assert_eq!(settings.state_database_url, "sqlite://./data/x.db");

    let settings = load_settings_from(None, env_from(&[("RSVP_STATE_DATABASE_URL", "  ")]));
    assert_eq!(settings.state_database_url, Settings::default().state_database_url);
}
