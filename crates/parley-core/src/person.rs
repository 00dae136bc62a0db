//! Person — a registered account, plus its request/response mappings.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ─── Role ─────────────────────────────────────────────────────────────────────

/// Account role. The only specified transition is Base → Admin, via the
/// self-service upgrade operation; nothing downgrades a role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
  Base,
  Admin,
}

impl UserRole {
  /// The single authority string exposed on an authenticated principal.
  pub fn authority(self) -> &'static str {
    match self {
      Self::Base => "ROLE_BASE",
      Self::Admin => "ROLE_ADMIN",
    }
  }
}

// ─── Entity ───────────────────────────────────────────────────────────────────

/// A registered account as stored. `password_hash` is an argon2 PHC string;
/// the raw password never reaches this type.
#[derive(Debug, Clone)]
pub struct Person {
  pub id:                i64,
  pub name:              String,
  pub age:               i32,
  pub email:             String,
  pub password_hash:     String,
  pub role:              UserRole,
  /// Set once at creation; immutable thereafter.
  pub registration_date: NaiveDate,
}

/// Input to [`crate::store::PersonStore::add_person`].
/// The id is assigned by the store.
#[derive(Debug, Clone)]
pub struct NewPerson {
  pub name:              String,
  pub age:               i32,
  pub email:             String,
  pub password_hash:     String,
  pub role:              UserRole,
  pub registration_date: NaiveDate,
}

// ─── Request DTOs ─────────────────────────────────────────────────────────────

/// JSON body of `POST /public/registration`.
#[derive(Debug, Clone, Deserialize)]
pub struct RegistrationInput {
  pub name:     Option<String>,
  pub age:      Option<i32>,
  pub email:    Option<String>,
  pub password: Option<String>,
}

impl RegistrationInput {
  /// Validate every field and report all failures at once.
  pub fn validate(&self) -> Vec<String> {
    let mut errors = Vec::new();
    if self.name.as_deref().is_none_or(str_is_blank) {
      errors.push("name must not be blank".to_owned());
    }
    match self.age {
      None => errors.push("age must be filled".to_owned()),
      Some(age) if age <= 0 => errors.push("age must be positive".to_owned()),
      Some(_) => {}
    }
    match self.email.as_deref() {
      None => errors.push("email must not be blank".to_owned()),
      Some(email) if str_is_blank(email) => {
        errors.push("email must not be blank".to_owned());
      }
      Some(email) if !looks_like_email(email) => {
        errors.push("email must be valid".to_owned());
      }
      Some(_) => {}
    }
    match self.password.as_deref() {
      None => errors.push("password must not be blank".to_owned()),
      Some(pw) if str_is_blank(pw) => {
        errors.push("password must not be blank".to_owned());
      }
      Some(pw) if pw.len() < 6 => {
        errors.push("password must be at least 6 characters long".to_owned());
      }
      Some(_) => {}
    }
    errors
  }
}

/// Partial-update body for the person update operations. Only fields that
/// are present and non-blank overwrite the stored entity; a new password is
/// re-hashed by the service before storage.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PersonPatch {
  pub name:     Option<String>,
  pub age:      Option<i32>,
  pub email:    Option<String>,
  pub password: Option<String>,
}

impl PersonPatch {
  /// Apply the non-password fields, skipping absent and blank values
  /// field by field. The registration date is never touched.
  pub fn apply_to(&self, person: &mut Person) {
    if let Some(name) = &self.name
      && !str_is_blank(name)
    {
      person.name = name.clone();
    }
    if let Some(age) = self.age {
      person.age = age;
    }
    if let Some(email) = &self.email
      && !str_is_blank(email)
    {
      person.email = email.clone();
    }
  }

  /// The new raw password, if one was supplied and is non-blank.
  pub fn new_password(&self) -> Option<&str> {
    self.password.as_deref().filter(|pw| !str_is_blank(pw))
  }
}

// ─── Response view ────────────────────────────────────────────────────────────

/// Serialized response shape. `password` carries the stored hash (parity
/// with the original API) — never the raw value.
#[derive(Debug, Clone, Serialize)]
pub struct PersonView {
  pub id:                i64,
  pub name:              String,
  pub age:               i32,
  pub email:             String,
  pub password:          String,
  pub role:              UserRole,
  pub registration_date: NaiveDate,
}

impl From<Person> for PersonView {
  fn from(person: Person) -> Self {
    Self {
      id:                person.id,
      name:              person.name,
      age:               person.age,
      email:             person.email,
      password:          person.password_hash,
      role:              person.role,
      registration_date: person.registration_date,
    }
  }
}

// ─── Helpers ──────────────────────────────────────────────────────────────────

pub(crate) fn str_is_blank(s: &str) -> bool { s.trim().is_empty() }

fn looks_like_email(s: &str) -> bool {
  match s.split_once('@') {
    Some((local, domain)) => {
      !local.is_empty() && domain.contains('.') && !domain.starts_with('.')
    }
    None => false,
  }
}
