//! Client configuration, with environment overrides.

use std::env;
use std::time::Duration;

use quill_session::SessionConfig;

use crate::QuillError;

pub const DEFAULT_API_URL: &str = "http://localhost:5000/api";
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

pub const API_URL_VAR: &str = "QUILL_API_URL";
pub const SAFETY_MARGIN_VAR: &str = "QUILL_TOKEN_SAFETY_MARGIN_SECS";
pub const REQUEST_TIMEOUT_VAR: &str = "QUILL_REQUEST_TIMEOUT_SECS";

/// Everything needed to build a [`QuillClient`](crate::QuillClient).
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the API, e.g. `http://localhost:5000/api`.
    pub api_url: String,
    pub session: SessionConfig,
    /// Per-request timeout. `None` waits indefinitely.
    pub request_timeout: Option<Duration>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            session: SessionConfig::default(),
            request_timeout: Some(DEFAULT_REQUEST_TIMEOUT),
        }
    }
}

impl ClientConfig {
    /// Reads `QUILL_API_URL`, `QUILL_TOKEN_SAFETY_MARGIN_SECS` and
    /// `QUILL_REQUEST_TIMEOUT_SECS`, falling back to the defaults for
    /// unset variables.
    ///
    /// # Errors
    /// [`QuillError::Config`] if a numeric variable does not parse.
    pub fn from_env() -> Result<Self, QuillError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) with a custom variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, QuillError> {
        let mut config = Self::default();

        if let Some(url) = lookup(API_URL_VAR).filter(|v| !v.trim().is_empty()) {
            config.api_url = url.trim().to_string();
        }
        if let Some(secs) = lookup(SAFETY_MARGIN_VAR) {
            config.session.safety_margin = parse_secs(SAFETY_MARGIN_VAR, &secs)?;
        }
        if let Some(secs) = lookup(REQUEST_TIMEOUT_VAR) {
            // 0 disables the timeout.
            config.request_timeout = Some(parse_secs(REQUEST_TIMEOUT_VAR, &secs)?)
                .filter(|timeout| !timeout.is_zero());
        }

        Ok(config)
    }
}

fn parse_secs(name: &str, raw: &str) -> Result<Duration, QuillError> {
    raw.trim()
        .parse::<u64>()
        .map(Duration::from_secs)
        .map_err(|e| QuillError::Config(format!("{name}={raw:?}: {e}")))
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_from_lookup_nothing_set_uses_defaults() {
        let config = ClientConfig::from_lookup(lookup(&[])).unwrap();

        assert_eq!(config.api_url, DEFAULT_API_URL);
        assert_eq!(config.session.safety_margin, Duration::from_secs(60));
        assert_eq!(config.request_timeout, Some(DEFAULT_REQUEST_TIMEOUT));
    }

    #[test]
    fn test_from_lookup_reads_all_variables() {
        let config = ClientConfig::from_lookup(lookup(&[
            (API_URL_VAR, "https://blog.example.com/api"),
            (SAFETY_MARGIN_VAR, "30"),
            (REQUEST_TIMEOUT_VAR, " 5 "),
        ]))
        .unwrap();

        assert_eq!(config.api_url, "https://blog.example.com/api");
        assert_eq!(config.session.safety_margin, Duration::from_secs(30));
        assert_eq!(config.request_timeout, Some(Duration::from_secs(5)));
    }

    #[test]
    fn test_from_lookup_zero_timeout_disables_it() {
        let config = ClientConfig::from_lookup(lookup(&[(REQUEST_TIMEOUT_VAR, "0")])).unwrap();
        assert_eq!(config.request_timeout, None);
    }

    #[test]
    fn test_from_lookup_blank_url_keeps_default() {
        let config = ClientConfig::from_lookup(lookup(&[(API_URL_VAR, "  ")])).unwrap();
        assert_eq!(config.api_url, DEFAULT_API_URL);
    }

    #[test]
    fn test_from_lookup_bad_number_is_config_error() {
        let err = ClientConfig::from_lookup(lookup(&[(SAFETY_MARGIN_VAR, "a minute")]))
            .unwrap_err();

        assert!(matches!(err, QuillError::Config(ref m) if m.contains(SAFETY_MARGIN_VAR)));
    }
}
