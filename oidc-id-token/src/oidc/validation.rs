//! ID token validation against a provider's signing keys.

use crate::oidc::claims::{check_audience, check_expiry};
use crate::oidc::discovery::{Discovery, DiscoveryError, HttpDiscovery, Provider};
use crate::oidc::jwks::KeySet;
use crate::oidc::signature::{verify_signature, RS256};
use crate::oidc::token::{parse_token, IdTokenClaims, TokenError};
use std::time::{Duration, Instant};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("invalid provider: {0}")]
    UnsupportedProvider(String),

    #[error("jwks_uri not found")]
    KeyEndpointNotFound,

    #[error("Malformed token: {0}")]
    MalformedToken(#[from] TokenError),

    #[error("audience not match: got {actual}")]
    AudienceMismatch { actual: String },

    #[error("token expired (exp={expires_at}, now={now})")]
    TokenExpired { expires_at: i64, now: i64 },

    #[error("algorithm not supported: {0}")]
    UnsupportedAlgorithm(String),

    #[error("kid not found: {0}")]
    KeyNotFound(String),

    #[error("unsupported key: {0}")]
    UnsupportedKey(String),

    #[error("invalid signature")]
    SignatureInvalid,

    #[error(transparent)]
    Discovery(#[from] DiscoveryError),
}

impl ValidationError {
    /// Stable, machine-readable name of the failure.
    pub fn kind(&self) -> &'static str {
        match self {
            ValidationError::UnsupportedProvider(_) => "unsupported_provider",
            ValidationError::KeyEndpointNotFound => "key_endpoint_not_found",
            ValidationError::MalformedToken(_) => "malformed_token",
            ValidationError::AudienceMismatch { .. } => "audience_mismatch",
            ValidationError::TokenExpired { .. } => "token_expired",
            ValidationError::UnsupportedAlgorithm(_) => "unsupported_algorithm",
            ValidationError::KeyNotFound(_) => "key_not_found",
            ValidationError::UnsupportedKey(_) => "unsupported_key",
            ValidationError::SignatureInvalid => "signature_invalid",
            ValidationError::Discovery(_) => "discovery",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidatorConfig {
    /// Accepted `aud` values. Empty disables the audience check.
    pub expected_audiences: Vec<String>,
}

impl ValidatorConfig {
    /// Expect exactly `client_id`, or nothing when it is empty.
    pub fn for_client_id(client_id: &str) -> Self {
        let mut expected_audiences = Vec::new();
        if !client_id.is_empty() {
            expected_audiences.push(client_id.to_string());
        }
        Self { expected_audiences }
    }
}

/// Validates ID tokens against a fixed key set.
///
/// Construction talks to the network; [`TokenValidator::validate`] never
/// does, so one instance can be shared freely across threads.
#[derive(Debug, Clone)]
pub struct TokenValidator {
    config: ValidatorConfig,
    key_set: KeySet,
    issuer: Option<String>,
}

impl TokenValidator {
    /// Build a validator for a named provider using HTTP discovery.
    pub fn build(provider: &str, client_id: &str) -> Result<Self, ValidationError> {
        Self::build_with(provider, client_id, &HttpDiscovery::new())
    }

    /// Like [`TokenValidator::build`], with all of discovery bounded by `timeout`.
    pub fn build_with_timeout(
        provider: &str,
        client_id: &str,
        timeout: Duration,
    ) -> Result<Self, ValidationError> {
        let mut discovery = HttpDiscovery::with_timeout(timeout);
        if let Some(deadline) = Instant::now().checked_add(timeout) {
            discovery = discovery.with_deadline(deadline);
        }
        Self::build_with(provider, client_id, &discovery)
    }

    /// Build a validator, fetching metadata through `discovery`.
    pub fn build_with(
        provider: &str,
        client_id: &str,
        discovery: &dyn Discovery,
    ) -> Result<Self, ValidationError> {
        let provider: Provider = provider
            .parse()
            .map_err(|_| ValidationError::UnsupportedProvider(provider.to_string()))?;

        let configuration = discovery.fetch_configuration(provider.configuration_url())?;
        if configuration.jwks_uri.is_empty() {
            return Err(ValidationError::KeyEndpointNotFound);
        }

        let key_set = discovery.fetch_key_set(&configuration.jwks_uri)?;

        tracing::info!(
            provider = %provider,
            issuer = %configuration.issuer,
            keys = key_set.len(),
            "Token validator ready"
        );

        let mut validator =
            Self::from_key_set(key_set, ValidatorConfig::for_client_id(client_id));
        validator.issuer = Some(configuration.issuer);
        Ok(validator)
    }

    /// Use keys that were loaded elsewhere.
    pub fn from_key_set(key_set: KeySet, config: ValidatorConfig) -> Self {
        Self {
            config,
            key_set,
            issuer: None,
        }
    }

    /// Validate a token against the current time.
    pub fn validate(&self, token: &str) -> Result<IdTokenClaims, ValidationError> {
        self.validate_at(token, chrono::Utc::now().timestamp())
    }

    /// Validate a token as of `now` (UTC seconds since the epoch).
    pub fn validate_at(&self, token: &str, now: i64) -> Result<IdTokenClaims, ValidationError> {
        let result = self.run_checks(token, now);

        match &result {
            Ok(claims) => tracing::debug!(
                subject = claims.sub.as_deref().unwrap_or(""),
                audience = %claims.aud,
                "ID token validated"
            ),
            Err(e) => tracing::warn!(kind = e.kind(), error = %e, "ID token rejected"),
        }

        result
    }

    fn run_checks(&self, token: &str, now: i64) -> Result<IdTokenClaims, ValidationError> {
        let parsed = parse_token(token)?;

        check_audience(&parsed.claims.aud, &self.config.expected_audiences)?;
        check_expiry(parsed.claims.exp, now)?;

        match parsed.header.alg.as_str() {
            RS256 => verify_signature(
                RS256,
                &parsed.header.kid,
                parsed.signed_content().as_bytes(),
                &parsed.signature,
                &self.key_set,
            )?,
            other => return Err(ValidationError::UnsupportedAlgorithm(other.to_string())),
        }

        Ok(parsed.into_claims())
    }

    pub fn config(&self) -> &ValidatorConfig {
        &self.config
    }

    pub fn key_set(&self) -> &KeySet {
        &self.key_set
    }

    /// Issuer advertised by the provider's discovery document.
    pub fn issuer(&self) -> Option<&str> {
        self.issuer.as_deref()
    }
}
