use std::{fs, time::Duration};

use client_core::DEFAULT_POLL_INTERVAL;
use serde::Deserialize;
use shared::config::PLACEHOLDER_URL;
use tracing::warn;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub endpoint_url: String,
    pub state_database_url: String,
    pub poll_interval: Duration,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            endpoint_url: PLACEHOLDER_URL.into(),
            state_database_url: "sqlite://./data/rsvp_state.db".into(),
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct FileConfig {
    endpoint_url: Option<String>,
    state_database_url: Option<String>,
    poll_interval_secs: Option<u64>,
}

pub fn load_settings() -> Settings {
    let file = fs::read_to_string("rsvp.toml").ok();
    load_settings_from(file.as_deref(), |key| std::env::var(key).ok())
}

/// Defaults, then `rsvp.toml`, then environment; later sources win.
pub fn load_settings_from(file: Option<&str>, env: impl Fn(&str) -> Option<String>) -> Settings {
    let mut settings = Settings::default();

    if let Some(raw) = file {
        match toml::from_str::<FileConfig>(raw) {
            Ok(file_cfg) => {
                if let Some(v) = file_cfg.endpoint_url {
                    settings.endpoint_url = v;
                }
                if let Some(v) = file_cfg.state_database_url {
                    settings.state_database_url = v;
                }
                if let Some(secs) = file_cfg.poll_interval_secs.filter(|secs| *secs > 0) {
                    settings.poll_interval = Duration::from_secs(secs);
                }
            }
            Err(error) => warn!(%error, "ignoring unreadable rsvp.toml"),
        }
    }

    if let Some(v) = env("RSVP_ENDPOINT_URL") {
        settings.endpoint_url = v;
    }
    if let Some(v) = env("APP__ENDPOINT_URL") {
        settings.endpoint_url = v;
    }

    if let Some(v) = env("RSVP_STATE_DATABASE_URL") {
        settings.state_database_url = v;
    }
    if let Some(v) = env("APP__STATE_DATABASE_URL") {
        settings.state_database_url = v;
    }

    settings.state_database_url = if settings.state_database_url.trim().is_empty() {
        Settings::default().state_database_url
    } else {
        storage::normalize_database_url(&settings.state_database_url)
    };

    if let Some(v) = env("APP__POLL_INTERVAL_SECS") {
        if let Some(secs) = v.parse::<u64>().ok().filter(|secs| *secs > 0) {
            settings.poll_interval = Duration::from_secs(secs);
        }
    }

    settings
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
