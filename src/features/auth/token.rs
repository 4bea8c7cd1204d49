//! Session token payload decoding and expiry queries.
//!
//! Tokens are three dot-separated segments; the middle one is base64 JSON.
//! Nothing here verifies the signature: the API is the authority, and the
//! client only reads claims to decide expiry and to display identity. Every
//! function fails closed: a token that cannot be decoded is treated as expired.

use crate::features::auth::roles::RoleFields;
use crate::features::wire;
use base64ct::{Base64UrlUnpadded, Encoding};
use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

pub use crate::api::config::DEFAULT_REFRESH_BUFFER_MINUTES;

/// Claims carried in the token payload. Unknown fields are ignored.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct TokenClaims {
    #[serde(
        default,
        deserialize_with = "wire::opt_id",
        skip_serializing_if = "Option::is_none"
    )]
    pub sub: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Expiry in seconds since the Unix epoch.
    #[serde(
        default,
        deserialize_with = "de_timestamp",
        skip_serializing_if = "Option::is_none"
    )]
    pub exp: Option<i64>,
    #[serde(flatten)]
    pub role_fields: RoleFields,
}

impl TokenClaims {
    #[must_use]
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        let millis = self.exp?.checked_mul(1000)?;
        DateTime::from_timestamp_millis(millis)
    }
}

/// Accepts integral or fractional second timestamps.
fn de_timestamp<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(|value| {
        value.as_i64().or_else(|| {
            #[allow(clippy::cast_possible_truncation)]
            value.as_f64().map(|secs| secs.floor() as i64)
        })
    }))
}

/// Decodes the payload segment, or `None` if the token is malformed.
#[must_use]
pub fn decode(token: &str) -> Option<TokenClaims> {
    let mut parts = token.trim().split('.');
    let _header = parts.next()?;
    let payload = parts.next()?;
    let _signature = parts.next()?;
    if parts.next().is_some() || payload.is_empty() {
        return None;
    }

    // Accept both alphabets, padded or not.
    let normalized: String = payload
        .trim_end_matches('=')
        .chars()
        .map(|c| match c {
            '+' => '-',
            '/' => '_',
            other => other,
        })
        .collect();

    let bytes = Base64UrlUnpadded::decode_vec(&normalized).ok()?;
    serde_json::from_slice(&bytes).ok()
}

#[must_use]
pub fn expiration_time(token: &str) -> Option<DateTime<Utc>> {
    decode(token)?.expires_at()
}

#[must_use]
pub fn is_expired(token: &str) -> bool {
    is_expired_at(token, Utc::now())
}

/// Expired when undecodable, when `exp` is missing, or when `exp` is at or before `now`.
#[must_use]
pub fn is_expired_at(token: &str, now: DateTime<Utc>) -> bool {
    expiration_time(token).map_or(true, |expires_at| expires_at <= now)
}

#[must_use]
pub fn time_until_expiry(token: &str) -> Option<TimeDelta> {
    time_until_expiry_at(token, Utc::now())
}

/// Remaining lifetime; negative once the token has expired.
#[must_use]
pub fn time_until_expiry_at(token: &str, now: DateTime<Utc>) -> Option<TimeDelta> {
    expiration_time(token).map(|expires_at| expires_at - now)
}

#[must_use]
pub fn should_refresh(token: &str, buffer_minutes: i64) -> bool {
    should_refresh_at(token, buffer_minutes, Utc::now())
}

/// True when the remaining lifetime is unknown or shorter than the buffer.
#[must_use]
pub fn should_refresh_at(token: &str, buffer_minutes: i64, now: DateTime<Utc>) -> bool {
    let Some(remaining) = time_until_expiry_at(token, now) else {
        return true;
    };

    TimeDelta::try_minutes(buffer_minutes).map_or(true, |buffer| remaining < buffer)
}

/// Builds an unsigned token around `claims`, for tests only.
#[cfg(test)]
pub(crate) fn unsigned_token(claims: &Value) -> String {
    let header = Base64UrlUnpadded::encode_string(br#"{"alg":"none","typ":"JWT"}"#);
    let payload = Base64UrlUnpadded::encode_string(claims.to_string().as_bytes());
    format!("{header}.{payload}.signature")
}
