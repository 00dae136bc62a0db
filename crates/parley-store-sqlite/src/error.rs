//! Error type for `parley-store-sqlite`.
//!
//! Every backend failure crosses the store-trait boundary as
//! [`parley_core::Error`]: unique-constraint violations on the people table
//! become [`parley_core::Error::Duplicate`] (a client error upstream), and
//! everything else is wrapped opaquely in [`parley_core::Error::Store`].

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  #[error("unknown role: {0:?}")]
  UnknownRole(String),

  /// A UNIQUE constraint on `people.name` or `people.email` fired.
  #[error("{0}")]
  UniqueViolation(String),
}

impl From<Error> for parley_core::Error {
  fn from(e: Error) -> Self {
    match e {
      Error::UniqueViolation(message) => parley_core::Error::Duplicate(message),
      other => parley_core::Error::Store(Box::new(other)),
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
