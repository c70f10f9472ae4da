//! Bearer-credential owner extraction.
//!
//! The credential is a three-part token whose middle segment is base64url
//! JSON. The signature is **not** verified; identity verification belongs to
//! the identity provider in front of this service. Only the `sub` claim is
//! read.

use axum::http::{HeaderMap, header};
use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD as B64;
use fittrack_api::ApiError;
use serde_json::Value;

/// Owner id for credentials whose subject cannot be read.
///
/// Every such caller shares this owner and sees the same records.
pub const FALLBACK_OWNER: &str = "default-user";

#[derive(Debug, Clone, Copy, Default)]
pub struct AuthConfig {
  /// Reject undecodable credentials instead of mapping them to
  /// [`FALLBACK_OWNER`].
  pub strict_claims: bool,
}

/// Resolve the owner id for a request.
///
/// A missing header, a non-bearer scheme, or an empty token is
/// `Unauthenticated`. A bearer token whose subject cannot be decoded maps to
/// [`FALLBACK_OWNER`] unless `strict_claims` is set.
pub fn extract_owner(headers: &HeaderMap, config: &AuthConfig) -> Result<String, ApiError> {
  let value = headers
    .get(header::AUTHORIZATION)
    .and_then(|v| v.to_str().ok())
    .ok_or(ApiError::Unauthenticated)?;

  let token = bearer_token(value).ok_or(ApiError::Unauthenticated)?;

  match subject_claim(token) {
    Some(sub) => Ok(sub),
    None if config.strict_claims => Err(ApiError::Unauthenticated),
    None => {
      tracing::debug!("credential subject unreadable, using fallback owner");
      Ok(FALLBACK_OWNER.to_owned())
    }
  }
}

fn bearer_token(value: &str) -> Option<&str> {
  let (scheme, token) = value.split_once(' ')?;
  let token = token.trim();
  (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

fn subject_claim(token: &str) -> Option<String> {
  let mut parts = token.split('.');
  let (Some(_), Some(payload), Some(_), None) =
    (parts.next(), parts.next(), parts.next(), parts.next())
  else {
    return None;
  };

  let bytes = B64.decode(payload.trim_end_matches('=')).ok()?;
  let claims: Value = serde_json::from_slice(&bytes).ok()?;
  claims
    .get("sub")?
    .as_str()
    .filter(|sub| !sub.is_empty())
    .map(str::to_owned)
}
