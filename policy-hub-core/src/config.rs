//! Hub client configuration

use std::collections::HashMap;
use std::fmt;
use std::time::Duration;

use serde::Deserialize;

use crate::HubError;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Username/password pair passed through as HTTP basic auth
#[derive(Clone, PartialEq, Eq, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    fn from_parts(username: Option<String>, password: Option<String>) -> Option<Self> {
        match (username, password) {
            (None, None) => None,
            (username, password) => Some(Self::new(
                username.unwrap_or_default(),
                password.unwrap_or_default(),
            )),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Settings consumed by the catalog client, installer and policy store client
#[derive(Debug, Clone, PartialEq)]
pub struct HubConfig {
    /// Base URL of the hub; the index lives at `<hub_url>/index.json`
    pub hub_url: String,
    /// Base URL of the remote policy-management API
    pub api_url: Option<String>,
    /// Credentials for the policy-management API
    pub credentials: Option<Credentials>,
    /// Credentials for the index fetch
    pub hub_credentials: Option<Credentials>,
    /// Verify server certificates on every HTTP client built from this config
    pub verify_tls: bool,
    /// Per-request timeout
    pub timeout: Duration,
}

impl HubConfig {
    pub fn new(hub_url: impl Into<String>) -> Self {
        Self {
            hub_url: hub_url.into(),
            api_url: None,
            credentials: None,
            hub_credentials: None,
            verify_tls: true,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Builds a config from the `hub-url`/`url`/`user`/`pass`/`hub-user`/
    /// `hub-pass`/`ssl-verify`/`timeout` mapping
    pub fn from_map(map: &HashMap<String, String>) -> Result<Self, HubError> {
        let get = |key: &str| {
            map.get(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let hub_url = get("hub-url")
            .ok_or_else(|| HubError::Config("missing required key 'hub-url'".into()))?;
        validate_url("hub-url", &hub_url)?;

        let api_url = get("url");
        if let Some(url) = &api_url {
            validate_url("url", url)?;
        }

        let verify_tls = match get("ssl-verify") {
            Some(raw) => parse_bool("ssl-verify", &raw)?,
            None => true,
        };

        let timeout = match get("timeout") {
            Some(raw) => raw
                .parse::<u64>()
                .map(Duration::from_secs)
                .map_err(|_| HubError::Config(format!("'timeout' must be whole seconds, got '{}'", raw)))?,
            None => DEFAULT_TIMEOUT,
        };

        Ok(Self {
            hub_url,
            api_url,
            credentials: Credentials::from_parts(get("user"), get("pass")),
            hub_credentials: Credentials::from_parts(get("hub-user"), get("hub-pass")),
            verify_tls,
            timeout,
        })
    }

    /// Same keys as [`HubConfig::from_map`], read from the process environment
    pub fn from_env() -> Result<Self, HubError> {
        const VARS: [(&str, &str); 8] = [
            ("HUB_URL", "hub-url"),
            ("POLICY_API_URL", "url"),
            ("POLICY_API_USER", "user"),
            ("POLICY_API_PASS", "pass"),
            ("HUB_USER", "hub-user"),
            ("HUB_PASS", "hub-pass"),
            ("HUB_SSL_VERIFY", "ssl-verify"),
            ("HUB_TIMEOUT_SECS", "timeout"),
        ];

        let map: HashMap<String, String> = VARS
            .iter()
            .filter_map(|(var, key)| std::env::var(var).ok().map(|v| (key.to_string(), v)))
            .collect();
        Self::from_map(&map)
    }

    /// `<hub_url>/index.json`
    pub fn index_url(&self) -> String {
        format!("{}/index.json", self.hub_url.trim_end_matches('/'))
    }
}

fn validate_url(key: &str, url: &str) -> Result<(), HubError> {
    if url.starts_with("http://") || url.starts_with("https://") {
        Ok(())
    } else {
        Err(HubError::Config(format!(
            "'{}' must be an http(s) URL, got '{}'",
            key, url
        )))
    }
}

fn parse_bool(key: &str, raw: &str) -> Result<bool, HubError> {
    match raw.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        _ => Err(HubError::Config(format!(
            "'{}' must be a boolean, got '{}'",
            key, raw
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_minimal_map() {
        let config = HubConfig::from_map(&map(&[("hub-url", "https://hub.example.com/")])).unwrap();
        assert_eq!(config.index_url(), "https://hub.example.com/index.json");
        assert!(config.verify_tls);
        assert_eq!(config.timeout, DEFAULT_TIMEOUT);
        assert!(config.credentials.is_none());
        assert!(config.api_url.is_none());
    }

    #[test]
    fn test_full_map() {
        let config = HubConfig::from_map(&map(&[
            ("hub-url", "http://hub"),
            ("url", "http://engine:8228/v1"),
            ("user", "admin"),
            ("pass", "secret"),
            ("ssl-verify", "false"),
            ("timeout", "5"),
        ]))
        .unwrap();
        assert_eq!(config.api_url.as_deref(), Some("http://engine:8228/v1"));
        assert_eq!(config.credentials, Some(Credentials::new("admin", "secret")));
        assert!(config.hub_credentials.is_none());
        assert!(!config.verify_tls);
        assert_eq!(config.timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_rejects_bad_values() {
        assert!(matches!(HubConfig::from_map(&map(&[])), Err(HubError::Config(_))));
        assert!(HubConfig::from_map(&map(&[("hub-url", "ftp://hub")])).is_err());
        assert!(HubConfig::from_map(&map(&[("hub-url", "http://hub"), ("ssl-verify", "maybe")])).is_err());
        assert!(HubConfig::from_map(&map(&[("hub-url", "http://hub"), ("timeout", "soon")])).is_err());
    }

    #[test]
    fn test_credentials_debug_is_redacted() {
        let rendered = format!("{:?}", Credentials::new("admin", "hunter2"));
        assert!(rendered.contains("admin"));
        assert!(!rendered.contains("hunter2"));
    }
}
