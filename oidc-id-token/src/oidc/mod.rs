//! OIDC ID token handling and validation.

pub mod claims;
pub mod discovery;
pub mod jwks;
pub mod signature;
pub mod token;
pub mod validation;

pub use claims::{check_audience, check_expiry};
pub use discovery::{Discovery, DiscoveryError, HttpDiscovery, OpenIdConfiguration, Provider};
pub use jwks::{KeySet, SigningKey};
pub use signature::{verify_signature, RS256};
pub use token::{parse_token, IdTokenClaims, JwtHeader, ParsedToken, Segment, TokenError};
pub use validation::{TokenValidator, ValidationError, ValidatorConfig};
