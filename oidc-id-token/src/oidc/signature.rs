//! RS256 signature verification against a [`KeySet`].

use rsa::{BigUint, Pkcs1v15Sign, RsaPublicKey};
use sha2::{Digest, Sha256};

use crate::oidc::jwks::{KeySet, SigningKey};
use crate::oidc::validation::ValidationError;

/// The only algorithm identifier accepted in a token header.
pub const RS256: &str = "RS256";

/// Verify `signature` over `signed_content` with the key named `key_id`.
///
/// The algorithm is checked before the key set is consulted.
pub fn verify_signature(
    algorithm: &str,
    key_id: &str,
    signed_content: &[u8],
    signature: &[u8],
    key_set: &KeySet,
) -> Result<(), ValidationError> {
    if algorithm != RS256 {
        return Err(ValidationError::UnsupportedAlgorithm(algorithm.to_string()));
    }

    let key = key_set
        .find(key_id)
        .ok_or_else(|| ValidationError::KeyNotFound(key_id.to_string()))?;

    verify_rs256(key, signed_content, signature)
}

/// PKCS#1 v1.5 / SHA-256 verification with an already selected key.
pub fn verify_rs256(
    key: &SigningKey,
    signed_content: &[u8],
    signature: &[u8],
) -> Result<(), ValidationError> {
    let public_key = rsa_public_key(key)?;
    let hashed = Sha256::digest(signed_content);

    public_key
        .verify(Pkcs1v15Sign::new::<Sha256>(), &hashed, signature)
        .map_err(|_| ValidationError::SignatureInvalid)
}

fn rsa_public_key(key: &SigningKey) -> Result<RsaPublicKey, ValidationError> {
    let n = key.modulus()?;
    let e = BigUint::from(key.public_exponent()?);

    RsaPublicKey::new(n, e).map_err(|e| {
        ValidationError::UnsupportedKey(format!("key '{}': invalid RSA key: {}", key.kid, e))
    })
}
