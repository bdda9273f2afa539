//! Fuzz target for the full validation pipeline
//!
//! Runs arbitrary input through a validator holding one malformed and one
//! well-formed RSA key. No input may panic.

#![no_main]

use libfuzzer_sys::fuzz_target;
use oidc_id_token::{KeySet, SigningKey, TokenValidator, ValidatorConfig};

fuzz_target!(|data: &[u8]| {
    if let Ok(token_str) = std::str::from_utf8(data) {
        let key_set = KeySet::new(vec![
            SigningKey::new_rsa("k0", "AQ", "AQAB"),
            SigningKey::new_rsa("k1", "wcHBwcHBwcHBwcHBwcHBwQ", "AQAB"),
        ]);
        let validator =
            TokenValidator::from_key_set(key_set, ValidatorConfig::for_client_id("fuzz"));
        let _ = validator.validate_at(token_str, 0);
    }
});
