//! JWT issuance and verification — the credential and token authority.
//!
//! Tokens are HS256-signed, time-boxed, and carry the username in a custom
//! claim. Verification checks signature, issuer, the fixed subject marker,
//! and expiry; any failure is a [`TokenError`]. Issue and verify are pure
//! functions of the input, the configured secret, and the clock — no state.

use chrono::{Duration, Utc};
use jsonwebtoken::{
  Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Fixed `sub` value marking a token as a user-details credential.
const SUBJECT: &str = "user-details";

#[derive(Debug, Error)]
pub enum TokenError {
  #[error("invalid JWT: {0}")]
  Invalid(#[from] jsonwebtoken::errors::Error),
}

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
  sub:      String,
  /// The person's unique name.
  username: String,
  iat:      i64,
  exp:      i64,
  iss:      String,
}

/// Issues and verifies bearer tokens. Holds the symmetric key; the secret
/// comes from server configuration, never from source.
#[derive(Clone)]
pub struct TokenAuthority {
  encoding_key: EncodingKey,
  decoding_key: DecodingKey,
  issuer:       String,
  ttl:          Duration,
}

impl TokenAuthority {
  pub fn new(secret: &str, issuer: String, ttl_minutes: i64) -> Self {
    Self {
      encoding_key: EncodingKey::from_secret(secret.as_bytes()),
      decoding_key: DecodingKey::from_secret(secret.as_bytes()),
      issuer,
      ttl: Duration::minutes(ttl_minutes),
    }
  }

  /// Produce a signed, time-boxed token carrying `username`.
  pub fn issue(&self, username: &str) -> Result<String, TokenError> {
    let now = Utc::now();
    let claims = Claims {
      sub:      SUBJECT.to_owned(),
      username: username.to_owned(),
      iat:      now.timestamp(),
      exp:      (now + self.ttl).timestamp(),
      iss:      self.issuer.clone(),
    };
    Ok(encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)?)
  }

  /// Validate signature, issuer, subject marker, and expiry; return the
  /// username claim.
  pub fn verify(&self, token: &str) -> Result<String, TokenError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_issuer(&[&self.issuer]);
    validation.sub = Some(SUBJECT.to_owned());
    validation.set_required_spec_claims(&["exp", "iss", "sub"]);

    let data = decode::<Claims>(token, &self.decoding_key, &validation)?;
    Ok(data.claims.username)
  }
}
