//! Error types for `parley-core`.
//!
//! Services raise these typed errors; the HTTP layer owns the single mapping
//! from variant to status code. Empty list results are an error by
//! convention — every list and search operation fails with the matching
//! not-found variant instead of returning an empty page.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("no person with id {0} was found")]
  PersonNotFoundById(i64),

  #[error("no person with name '{0}' was found")]
  PersonNotFoundByName(String),

  #[error("no person was found")]
  NoPeopleFound,

  #[error("no message with id {0} was found")]
  MessageNotFoundById(i64),

  #[error("no messages were found")]
  NoMessagesFound,

  /// Role-upgrade password check failed. The role is left untouched.
  #[error("wrong password")]
  WrongPassword,

  /// Login failure — deliberately the same message for an unknown name and
  /// a wrong password.
  #[error("incorrect credentials")]
  IncorrectCredentials,

  /// A caller tried to act on another sender's message.
  #[error(
    "another sender's messages are not available for {action} \
     (caller id {caller_id}, sender id {sender_id})"
  )]
  NotMessageSender {
    action:    &'static str,
    caller_id: i64,
    sender_id: i64,
  },

  /// Aggregated request-field validation failures.
  #[error("invalid request: {}", .0.join("; "))]
  Validation(Vec<String>),

  /// Unique-constraint violation (duplicate name or email).
  #[error("{0}")]
  Duplicate(String),

  /// Opaque persistence failure.
  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
