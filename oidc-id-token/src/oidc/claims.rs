//! Temporal and audience checks on decoded claims.

use crate::oidc::validation::ValidationError;

/// Fails when `now` is strictly after `expires_at`. Both are UTC seconds.
pub fn check_expiry(expires_at: i64, now: i64) -> Result<(), ValidationError> {
    if now > expires_at {
        return Err(ValidationError::TokenExpired { expires_at, now });
    }
    Ok(())
}

/// Passes when `audience` equals one of the non-empty `expected` entries.
///
/// An empty `expected` list disables the check.
pub fn check_audience<S: AsRef<str>>(
    audience: &str,
    expected: &[S],
) -> Result<(), ValidationError> {
    if expected.is_empty() {
        return Ok(());
    }

    let matched = expected.iter().any(|aud| {
        let aud = aud.as_ref();
        !aud.is_empty() && aud == audience
    });

    if !matched {
        return Err(ValidationError::AudienceMismatch {
            actual: audience.to_string(),
        });
    }
    Ok(())
}
