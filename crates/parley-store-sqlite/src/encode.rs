//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as RFC 3339 strings, dates as ISO 8601 (`%Y-%m-%d`),
//! and roles as lowercase strings.

use chrono::{DateTime, NaiveDate, Utc};
use parley_core::{message::Message, person::{Person, UserRole}};

use crate::{Error, Result};

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── NaiveDate ───────────────────────────────────────────────────────────────

pub fn encode_date(d: NaiveDate) -> String { d.format("%Y-%m-%d").to_string() }

pub fn decode_date(s: &str) -> Result<NaiveDate> {
  NaiveDate::parse_from_str(s, "%Y-%m-%d")
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── UserRole ────────────────────────────────────────────────────────────────

pub fn encode_role(role: UserRole) -> &'static str {
  match role {
    UserRole::Base => "base",
    UserRole::Admin => "admin",
  }
}

pub fn decode_role(s: &str) -> Result<UserRole> {
  match s {
    "base" => Ok(UserRole::Base),
    "admin" => Ok(UserRole::Admin),
    other => Err(Error::UnknownRole(other.to_owned())),
  }
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw strings read directly from a `people` row.
pub struct RawPerson {
  pub id:                i64,
  pub name:              String,
  pub age:               i32,
  pub email:             String,
  pub password_hash:     String,
  pub role:              String,
  pub registration_date: String,
}

impl RawPerson {
  pub fn into_person(self) -> Result<Person> {
    Ok(Person {
      id:                self.id,
      name:              self.name,
      age:               self.age,
      email:             self.email,
      password_hash:     self.password_hash,
      role:              decode_role(&self.role)?,
      registration_date: decode_date(&self.registration_date)?,
    })
  }
}

/// Raw strings read directly from a `messages` row.
pub struct RawMessage {
  pub id:          i64,
  pub content:     String,
  pub sent_at:     String,
  pub sender_id:   i64,
  pub receiver_id: i64,
}

impl RawMessage {
  pub fn into_message(self) -> Result<Message> {
    Ok(Message {
      id:          self.id,
      content:     self.content,
      sent_at:     decode_dt(&self.sent_at)?,
      sender_id:   self.sender_id,
      receiver_id: self.receiver_id,
    })
  }
}
