//! Shared fixtures for unit tests: one RSA key pair and token builders.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use once_cell::sync::Lazy;
use rsa::traits::PublicKeyParts;
use rsa::{Pkcs1v15Sign, RsaPrivateKey};
use sha2::{Digest, Sha256};

use crate::oidc::jwks::{KeySet, SigningKey};

pub const TEST_KID: &str = "k1";

static TEST_KEY: Lazy<RsaPrivateKey> = Lazy::new(|| {
    RsaPrivateKey::new(&mut rand::thread_rng(), 1024).expect("failed to generate test RSA key")
});

pub fn test_signing_key() -> SigningKey {
    SigningKey::new_rsa(
        TEST_KID,
        URL_SAFE_NO_PAD.encode(TEST_KEY.n().to_bytes_be()),
        URL_SAFE_NO_PAD.encode(TEST_KEY.e().to_bytes_be()),
    )
}

pub fn test_key_set() -> KeySet {
    KeySet::new(vec![test_signing_key()])
}

/// RS256 signature over `content` with the test key.
pub fn sign(content: &[u8]) -> Vec<u8> {
    TEST_KEY
        .sign(Pkcs1v15Sign::new::<Sha256>(), &Sha256::digest(content))
        .expect("failed to sign")
}

/// Build a compact token signed with the test key.
pub fn signed_token(header: &serde_json::Value, payload: &serde_json::Value) -> String {
    let signing_input = format!(
        "{}.{}",
        URL_SAFE_NO_PAD.encode(header.to_string()),
        URL_SAFE_NO_PAD.encode(payload.to_string())
    );
    let signature = URL_SAFE_NO_PAD.encode(sign(signing_input.as_bytes()));
    format!("{}.{}", signing_input, signature)
}
