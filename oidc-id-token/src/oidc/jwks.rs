//! Signing keys published by an identity provider.
//!
//! A [`KeySet`] is loaded once, when the validator is built, and never
//! changes afterwards. Keys keep the base64url `n`/`e` members exactly as the
//! provider published them; the big integers are decoded when a token
//! actually selects the key, so one malformed entry never poisons the set.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use rsa::BigUint;
use serde::{Deserialize, Serialize};

use crate::oidc::validation::ValidationError;

/// One entry of a JSON Web Key Set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SigningKey {
    /// Key identifier
    #[serde(default)]
    pub kid: String,

    /// Key type, `RSA` for every key this crate can use
    #[serde(default)]
    pub kty: String,

    /// Algorithm the key is meant for
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alg: Option<String>,

    /// Intended use, normally `sig`
    #[serde(default, rename = "use", skip_serializing_if = "Option::is_none")]
    pub key_use: Option<String>,

    /// RSA modulus, base64url big-endian
    #[serde(default)]
    pub n: String,

    /// RSA public exponent, base64url big-endian
    #[serde(default)]
    pub e: String,
}

impl SigningKey {
    pub fn new_rsa(kid: impl Into<String>, n: impl Into<String>, e: impl Into<String>) -> Self {
        Self {
            kid: kid.into(),
            kty: "RSA".to_string(),
            alg: Some("RS256".to_string()),
            key_use: Some("sig".to_string()),
            n: n.into(),
            e: e.into(),
        }
    }

    /// Decoded RSA modulus.
    pub fn modulus(&self) -> Result<BigUint, ValidationError> {
        let bytes = decode_component(&self.kid, "n", &self.n)?;
        Ok(BigUint::from_bytes_be(&bytes))
    }

    /// Decoded RSA public exponent.
    ///
    /// Exponents wider than 64 bits are rejected rather than truncated.
    pub fn public_exponent(&self) -> Result<u64, ValidationError> {
        let bytes = decode_component(&self.kid, "e", &self.e)?;
        let significant = match bytes.iter().position(|b| *b != 0) {
            Some(start) => &bytes[start..],
            None => &[][..],
        };

        if significant.len() > 8 {
            return Err(ValidationError::UnsupportedKey(format!(
                "key '{}': public exponent does not fit in 64 bits",
                self.kid
            )));
        }

        Ok(significant
            .iter()
            .fold(0u64, |acc, b| (acc << 8) | u64::from(*b)))
    }
}

fn decode_component(kid: &str, name: &str, value: &str) -> Result<Vec<u8>, ValidationError> {
    if value.is_empty() {
        return Err(ValidationError::UnsupportedKey(format!(
            "key '{}': missing RSA component '{}'",
            kid, name
        )));
    }
    URL_SAFE_NO_PAD.decode(value).map_err(|e| {
        ValidationError::UnsupportedKey(format!(
            "key '{}': invalid base64url in '{}': {}",
            kid, name, e
        ))
    })
}

/// Immutable, ordered set of signing keys.
///
/// Duplicate key ids are kept; lookups return the first one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeySet {
    keys: Vec<SigningKey>,
}

impl KeySet {
    pub fn new(keys: Vec<SigningKey>) -> Self {
        Self { keys }
    }

    /// Parse a JWKS document (`{"keys": [...]}`).
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// First key whose id equals `kid`.
    pub fn find(&self, kid: &str) -> Option<&SigningKey> {
        self.keys.iter().find(|k| k.kid == kid)
    }

    pub fn key_ids(&self) -> impl Iterator<Item = &str> {
        self.keys.iter().map(|k| k.kid.as_str())
    }

    pub fn keys(&self) -> &[SigningKey] {
        &self.keys
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Shape of a real provider document: RSA keys with extra members
    const JWKS: &str = r#"{
        "keys": [
            {"kid": "k1", "kty": "RSA", "alg": "RS256", "use": "sig", "n": "AQAB", "e": "AQAB"},
            {"kid": "k2", "kty": "RSA", "n": "wQ", "e": "Aw", "x5t": "ignored"},
            {"kid": "k1", "kty": "RSA", "n": "Ag", "e": "AQAB"}
        ]
    }"#;

    #[test]
    fn test_parse_jwks_document() {
        let set = KeySet::from_json(JWKS).unwrap();

        assert_eq!(set.len(), 3);
        assert_eq!(set.key_ids().collect::<Vec<_>>(), vec!["k1", "k2", "k1"]);

        let k1 = set.find("k1").unwrap();
        assert_eq!(k1.alg.as_deref(), Some("RS256"));
        assert_eq!(k1.key_use.as_deref(), Some("sig"));
        assert!(set.find("k2").unwrap().alg.is_none());
    }

    #[test]
    fn test_duplicate_kid_first_wins() {
        let set = KeySet::from_json(JWKS).unwrap();
        assert_eq!(set.find("k1").unwrap().n, "AQAB");
    }

    #[test]
    fn test_missing_kid_not_found() {
        let set = KeySet::from_json(JWKS).unwrap();
        assert!(set.find("k3").is_none());
        assert!(KeySet::default().find("k1").is_none());
    }

    #[test]
    fn test_decode_components() {
        let key = SigningKey::new_rsa("k", "AQAB", "AQAB");
        assert_eq!(key.public_exponent().unwrap(), 65537);
        assert_eq!(key.modulus().unwrap(), BigUint::from(65537u64));
    }

    #[test]
    fn test_exponent_leading_zeros_ignored() {
        let e = URL_SAFE_NO_PAD.encode([0u8, 0, 0, 0, 0, 0, 0, 0, 0, 1, 0, 1]);
        let key = SigningKey::new_rsa("k", "AQAB", e);
        assert_eq!(key.public_exponent().unwrap(), 65537);
    }

    #[test]
    fn test_exponent_wider_than_64_bits_rejected() {
        let e = URL_SAFE_NO_PAD.encode([1u8, 0, 0, 0, 0, 0, 0, 0, 1]);
        let key = SigningKey::new_rsa("k", "AQAB", e);
        assert!(matches!(
            key.public_exponent(),
            Err(ValidationError::UnsupportedKey(_))
        ));
    }

    #[test]
    fn test_missing_component_rejected() {
        let key: SigningKey =
            serde_json::from_str(r#"{"kid":"ec","kty":"EC","crv":"P-256","x":"AQ","y":"AQ"}"#)
                .unwrap();
        assert!(matches!(key.modulus(), Err(ValidationError::UnsupportedKey(_))));
    }

    #[test]
    fn test_invalid_base64_rejected() {
        let key = SigningKey::new_rsa("k", "not base64!", "AQAB");
        assert!(matches!(key.modulus(), Err(ValidationError::UnsupportedKey(_))));
    }
}
