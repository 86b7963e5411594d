use axum::http::HeaderMap;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;

use crate::error::{BridgeError, BridgeResult};

pub const INBOX_SIGNATURE_HEADER: &str = "x-missive-signature";
pub const CARRIER_SECRET_HEADER: &str = "sb-signing-secret";

/// Hex HMAC-SHA256 of the raw body, keyed by the inbox webhook secret.
/// A `sha256=` prefix on the header is tolerated. No secret disables the check.
pub fn verify_inbox_signature(
    secret: Option<&str>,
    headers: &HeaderMap,
    body: &[u8],
) -> BridgeResult<()> {
    let Some(secret) = secret.filter(|value| !value.trim().is_empty()) else {
        return Ok(());
    };
    let signature = headers
        .get(INBOX_SIGNATURE_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .ok_or(BridgeError::Authenticity("missing_signature"))?;
    let signature = signature.strip_prefix("sha256=").unwrap_or(signature);
    let provided = hex::decode(signature).map_err(|_| BridgeError::Authenticity("invalid_signature"))?;

    let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes())
        .map_err(|_| BridgeError::Authenticity("bad_secret"))?;
    mac.update(body);
    mac.verify_slice(&provided)
        .map_err(|_| BridgeError::Authenticity("invalid_signature"))
}

/// Shared-secret header check for carrier webhooks. No secret disables it.
pub fn verify_carrier_secret(secret: Option<&str>, headers: &HeaderMap) -> BridgeResult<()> {
    let Some(secret) = secret.filter(|value| !value.trim().is_empty()) else {
        return Ok(());
    };
    let provided = headers
        .get(CARRIER_SECRET_HEADER)
        .and_then(|value| value.to_str().ok())
        .ok_or(BridgeError::Authenticity("missing_secret"))?;
    if !bool::from(provided.as_bytes().ct_eq(secret.as_bytes())) {
        return Err(BridgeError::Authenticity("invalid_secret"));
    }
    Ok(())
}
