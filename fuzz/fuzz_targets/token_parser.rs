//! Fuzz target for JWT token parsing
//!
//! This fuzzer tests the robustness of token parsing against malformed input.
//! It does NOT test cryptographic validation (that requires valid signatures).

#![no_main]

use libfuzzer_sys::fuzz_target;
use oidc_id_token::oidc::parse_token;

fuzz_target!(|data: &[u8]| {
    // Tokens are text
    if let Ok(token_str) = std::str::from_utf8(data) {
        if let Ok(parsed) = parse_token(token_str) {
            // A successful parse must reproduce the signing input verbatim
            let signed = parsed.signed_content();
            assert!(token_str.starts_with(&signed));
            assert_eq!(token_str.split('.').count(), 3);
        }
    }
});
