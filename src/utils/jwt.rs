use std::collections::HashSet;

use chrono::{DateTime, Duration, TimeZone, Utc};
use jsonwebtoken::{decode, errors::Error, errors::ErrorKind, DecodingKey, Validation};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct ExpiryClaims {
    exp: i64,
}

/// Reads the `exp` claim of a JWT without checking its signature.
///
/// The client never holds the signing key, so this is informational only: it
/// decides when to refresh, never whether a token is trustworthy.
pub fn decode_expiry(token: &str) -> Result<DateTime<Utc>, Error> {
    let mut validation = Validation::default();
    validation.insecure_disable_signature_validation();
    validation.validate_exp = false;
    validation.validate_nbf = false;
    validation.validate_aud = false;
    validation.required_spec_claims = HashSet::from(["exp".to_string()]);

    let data = decode::<ExpiryClaims>(token, &DecodingKey::from_secret(&[]), &validation)?;
    Utc.timestamp_opt(data.claims.exp, 0)
        .single()
        .ok_or_else(|| Error::from(ErrorKind::InvalidToken))
}

/// Remaining lifetime of `token` at `now`. Negative once expired.
pub fn time_to_live(token: &str, now: DateTime<Utc>) -> Result<Duration, Error> {
    Ok(decode_expiry(token)? - now)
}
