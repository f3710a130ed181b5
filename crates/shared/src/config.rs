use serde::{Deserialize, Serialize};

use crate::error::RsvpError;

/// Marker left in the endpoint URL until the host pastes the real one.
pub const PLACEHOLDER_MARKER: &str = "YOUR_SCRIPT_ID_HERE";

/// The endpoint URL shipped before setup is finished.
pub const PLACEHOLDER_URL: &str = "https://script.google.com/macros/s/YOUR_SCRIPT_ID_HERE/exec";

/// True when `url` holds a real endpoint address: not blank and not the
/// setup placeholder.
pub fn is_configured(url: &str) -> bool {
    !url.trim().is_empty() && !url.contains(PLACEHOLDER_MARKER)
}

/// Returns the trimmed URL, or `NotConfigured` before any I/O happens.
pub fn require_configured(url: &str) -> Result<&str, RsvpError> {
    if is_configured(url) {
        Ok(url.trim())
    } else {
        Err(RsvpError::NotConfigured)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EndpointConfig {
    url: String,
}

impl EndpointConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn is_configured(&self) -> bool {
        is_configured(&self.url)
    }
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self::new(PLACEHOLDER_URL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_whitespace_and_placeholder_are_unconfigured() {
        for url in ["", "   ", "\t\n", PLACEHOLDER_URL, "YOUR_SCRIPT_ID_HERE"] {
            assert!(!is_configured(url), "{url:?} should be unconfigured");
            assert!(matches!(
                require_configured(url),
                Err(RsvpError::NotConfigured)
            ));
        }
    }

    #[test]
    fn real_url_is_configured_and_trimmed() {
        let url = "  https://script.google.com/macros/s/AKfy/exec ";
        assert!(is_configured(url));
        assert_eq!(
            require_configured(url).expect("configured"),
            "https://script.google.com/macros/s/AKfy/exec"
        );
    }

    #[test]
    fn default_config_is_the_placeholder() {
        assert!(!EndpointConfig::default().is_configured());
    }
}
