//! OpenID Connect ID token validation.
//!
//! A [`TokenValidator`] is built once per provider: it fetches the provider's
//! discovery document and JSON Web Key Set, then validates tokens offline:
//! 1. The token is split into header, payload and signature and each is decoded
//! 2. The audience is checked against the configured client ID (if any)
//! 3. The expiry is checked against the current UTC time
//! 4. The header algorithm must be `RS256`
//! 5. The signature is verified with the key named by the header's `kid`
//!
//! ## Environment Variables
//! - `OIDC_PROVIDER` (required): Identity provider name (`google`)
//! - `OIDC_CLIENT_ID` (optional): Expected audience; empty skips the audience check
//! - `OIDC_HTTP_TIMEOUT_SECS` (optional): Overall discovery timeout, defaults to 10

#![deny(unsafe_code)]

pub mod config;
pub mod oidc;

#[cfg(test)]
mod test_support;

pub use config::{Config, ConfigError};
pub use oidc::{
    IdTokenClaims, KeySet, Provider, SigningKey, TokenValidator, ValidationError,
    ValidatorConfig,
};
