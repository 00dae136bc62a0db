//! Argon2 hashing and verification of raw passwords.
//!
//! Hashes are PHC strings; verification failures of any kind (malformed
//! stored hash included) read as a non-match.

use argon2::{
  Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
  password_hash::SaltString,
};
use rand_core::OsRng;

/// Hash a raw password into an argon2 PHC string.
pub fn hash(raw: &str) -> parley_core::Result<String> {
  let salt = SaltString::generate(&mut OsRng);
  Argon2::default()
    .hash_password(raw.as_bytes(), &salt)
    .map(|hash| hash.to_string())
    .map_err(|e| parley_core::Error::Store(format!("argon2 error: {e}").into()))
}

/// Check a raw password against a stored PHC string.
pub fn verify(raw: &str, stored: &str) -> bool {
  PasswordHash::new(stored).is_ok_and(|parsed| {
    Argon2::default().verify_password(raw.as_bytes(), &parsed).is_ok()
  })
}
