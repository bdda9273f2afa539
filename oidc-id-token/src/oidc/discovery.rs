//! OIDC discovery: provider metadata and JWKS retrieval.
//!
//! This module handles:
//! - Mapping a supported provider to its well-known configuration URL
//! - Fetching the configuration document to find the JWKS URI
//! - Fetching and parsing the JWKS
//!
//! Fetching happens once, while a validator is built. Nothing is cached or
//! refreshed here.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::{Duration, Instant};
use thiserror::Error;

use crate::oidc::jwks::KeySet;

/// Default HTTP request timeout
pub const HTTP_TIMEOUT_SECS: u64 = 10;

const GOOGLE_OPENID_URL: &str = "https://accounts.google.com/.well-known/openid-configuration";

#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error("Failed to fetch OIDC discovery document: {0}")]
    DiscoveryFetchError(String),

    #[error("Failed to parse OIDC discovery document: {0}")]
    DiscoveryParseError(String),

    #[error("Failed to fetch JWKS: {0}")]
    JwksFetchError(String),

    #[error("Failed to parse JWKS: {0}")]
    JwksParseError(String),
}

/// Identity providers a validator can be built for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    Google,
}

impl Provider {
    /// Location of the provider's OpenID configuration document.
    pub fn configuration_url(&self) -> &'static str {
        match self {
            Provider::Google => GOOGLE_OPENID_URL,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::Google => "google",
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unsupported provider: {0}")]
pub struct UnknownProvider(pub String);

impl FromStr for Provider {
    type Err = UnknownProvider;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "google" => Ok(Provider::Google),
            other => Err(UnknownProvider(other.to_string())),
        }
    }
}

/// OIDC discovery document (partial)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpenIdConfiguration {
    #[serde(default)]
    pub issuer: String,

    /// Empty when the document does not advertise a key set
    #[serde(default)]
    pub jwks_uri: String,
}

/// Source of provider metadata and signing keys.
pub trait Discovery {
    fn fetch_configuration(&self, url: &str) -> Result<OpenIdConfiguration, DiscoveryError>;

    fn fetch_key_set(&self, jwks_uri: &str) -> Result<KeySet, DiscoveryError>;
}

/// Blocking HTTP discovery client.
#[derive(Debug, Clone)]
pub struct HttpDiscovery {
    timeout: Duration,
    deadline: Option<Instant>,
}

impl Default for HttpDiscovery {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpDiscovery {
    pub fn new() -> Self {
        Self::with_timeout(Duration::from_secs(HTTP_TIMEOUT_SECS))
    }

    /// Bound every request to `timeout`.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            timeout,
            deadline: None,
        }
    }

    /// Additionally stop issuing requests once `deadline` has passed.
    ///
    /// Each request gets whatever is left before the deadline, capped by the
    /// per-request timeout.
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Time allowed for the next request; `None` once the deadline is spent.
    fn request_timeout(&self) -> Option<Duration> {
        match self.deadline {
            None => Some(self.timeout),
            Some(deadline) => {
                let remaining = deadline.saturating_duration_since(Instant::now());
                if remaining.is_zero() {
                    None
                } else {
                    Some(remaining.min(self.timeout))
                }
            }
        }
    }

    fn get(&self, url: &str) -> Result<reqwest::blocking::Response, String> {
        let timeout = self
            .request_timeout()
            .ok_or_else(|| format!("deadline exceeded before requesting {}", url))?;

        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| e.to_string())?;

        let response = client.get(url).send().map_err(|e| e.to_string())?;

        if !response.status().is_success() {
            return Err(format!("HTTP {}: {}", response.status(), url));
        }
        Ok(response)
    }
}

impl Discovery for HttpDiscovery {
    fn fetch_configuration(&self, url: &str) -> Result<OpenIdConfiguration, DiscoveryError> {
        let configuration = self
            .get(url)
            .map_err(DiscoveryError::DiscoveryFetchError)?
            .json::<OpenIdConfiguration>()
            .map_err(|e| DiscoveryError::DiscoveryParseError(e.to_string()))?;

        tracing::info!(
            url = %url,
            issuer = %configuration.issuer,
            jwks_uri = %configuration.jwks_uri,
            "Fetched OIDC discovery document"
        );
        Ok(configuration)
    }

    fn fetch_key_set(&self, jwks_uri: &str) -> Result<KeySet, DiscoveryError> {
        let key_set = self
            .get(jwks_uri)
            .map_err(DiscoveryError::JwksFetchError)?
            .json::<KeySet>()
            .map_err(|e| DiscoveryError::JwksParseError(e.to_string()))?;

        tracing::info!(uri = %jwks_uri, keys = key_set.len(), "Fetched JWKS");
        Ok(key_set)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    fn json_server(path: &str, status: u16, body: &str) -> MockServer {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path(path);
            then.status(status)
                .header("content-type", "application/json")
                .body(body);
        });
        server
    }

    #[test]
    fn test_provider_from_str() {
        assert_eq!("google".parse::<Provider>().unwrap(), Provider::Google);
        assert_eq!(
            "okta".parse::<Provider>(),
            Err(UnknownProvider("okta".to_string()))
        );
        assert!("Google".parse::<Provider>().is_err());
    }

    #[test]
    fn test_provider_configuration_url() {
        assert_eq!(
            Provider::Google.configuration_url(),
            "https://accounts.google.com/.well-known/openid-configuration"
        );
        assert_eq!(Provider::Google.to_string(), "google");
    }

    #[test]
    fn test_configuration_without_jwks_uri() {
        let config: OpenIdConfiguration =
            serde_json::from_str(r#"{"issuer":"https://accounts.google.com"}"#).unwrap();
        assert_eq!(config.issuer, "https://accounts.google.com");
        assert!(config.jwks_uri.is_empty());
    }

    #[test]
    fn test_default_timeout() {
        assert_eq!(
            HttpDiscovery::default().timeout(),
            Duration::from_secs(HTTP_TIMEOUT_SECS)
        );
    }

    #[test]
    fn test_deadline_caps_request_timeout() {
        let discovery = HttpDiscovery::with_timeout(Duration::from_secs(10))
            .with_deadline(Instant::now() + Duration::from_secs(2));
        let timeout = discovery.request_timeout().unwrap();
        assert!(timeout <= Duration::from_secs(2));
        assert!(timeout > Duration::ZERO);

        assert_eq!(
            HttpDiscovery::with_timeout(Duration::from_secs(4)).request_timeout(),
            Some(Duration::from_secs(4))
        );
    }

    #[test]
    fn test_fetch_configuration() {
        let server = json_server(
            "/.well-known/openid-configuration",
            200,
            r#"{"issuer":"https://issuer","jwks_uri":"https://issuer/certs","extra":true}"#,
        );

        let config = HttpDiscovery::new()
            .fetch_configuration(&server.url("/.well-known/openid-configuration"))
            .unwrap();
        assert_eq!(config.issuer, "https://issuer");
        assert_eq!(config.jwks_uri, "https://issuer/certs");
    }

    #[test]
    fn test_fetch_configuration_non_success_status() {
        let server = json_server("/.well-known/openid-configuration", 404, "{}");

        let result = HttpDiscovery::new()
            .fetch_configuration(&server.url("/.well-known/openid-configuration"));
        assert!(matches!(
            result,
            Err(DiscoveryError::DiscoveryFetchError(ref m)) if m.contains("404")
        ));
    }

    #[test]
    fn test_fetch_key_set() {
        let server = json_server(
            "/certs",
            200,
            r#"{"keys":[{"kid":"a","kty":"RSA","n":"AQAB","e":"AQAB"}]}"#,
        );

        let key_set = HttpDiscovery::new()
            .fetch_key_set(&server.url("/certs"))
            .unwrap();
        assert_eq!(key_set.key_ids().collect::<Vec<_>>(), vec!["a"]);
    }

    #[test]
    fn test_fetch_key_set_bad_json() {
        let server = json_server("/certs", 200, "not json");

        let result = HttpDiscovery::new().fetch_key_set(&server.url("/certs"));
        assert!(matches!(result, Err(DiscoveryError::JwksParseError(_))));
    }

    #[test]
    fn test_expired_deadline_skips_request() {
        let server = MockServer::start();
        let certs = server.mock(|when, then| {
            when.method(GET).path("/certs");
            then.status(200).body(r#"{"keys":[]}"#);
        });

        let discovery = HttpDiscovery::new().with_deadline(Instant::now());
        let result = discovery.fetch_key_set(&server.url("/certs"));

        assert!(matches!(
            result,
            Err(DiscoveryError::JwksFetchError(ref m)) if m.contains("deadline")
        ));
        certs.assert_hits(0);
    }
}
