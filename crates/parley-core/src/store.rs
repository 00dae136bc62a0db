//! The `PersonStore` and `MessageStore` traits and supporting query types.
//!
//! The traits are implemented by storage backends (e.g. `parley-store-sqlite`).
//! The HTTP layer depends on this abstraction, not on any concrete backend.
//!
//! Both traits return the domain [`Error`](crate::Error) directly: backends
//! translate their driver failures into [`crate::Error::Store`], except for
//! unique-constraint violations on person name/email which surface as
//! [`crate::Error::Duplicate`] so the service layer can report them as a
//! client error.

use std::future::Future;

use crate::{
  Result,
  message::{Message, NewMessage},
  person::{NewPerson, Person},
};

// ─── Pagination ──────────────────────────────────────────────────────────────

/// Conventional offset-based page request. `number` is zero-based.
#[derive(Debug, Clone, Copy)]
pub struct Page {
  pub number: u32,
  pub size:   u32,
}

impl Default for Page {
  fn default() -> Self { Self { number: 0, size: 20 } }
}

impl Page {
  /// Row offset of this page, computed in `u64` so client-supplied page
  /// numbers cannot overflow, and saturated to fit a SQLite integer.
  pub fn offset(self) -> i64 {
    let offset = u64::from(self.number) * u64::from(self.size);
    i64::try_from(offset).unwrap_or(i64::MAX)
  }
}

// ─── In-transaction edits ────────────────────────────────────────────────────

/// A fallible transformation applied to a freshly read person row inside the
/// same transaction that writes it back.
pub type PersonEdit = Box<dyn FnOnce(Person) -> Result<Person> + Send>;

/// A fallible transformation applied to a freshly read message row inside the
/// same transaction that writes it back.
pub type MessageEdit = Box<dyn FnOnce(Message) -> Result<Message> + Send>;

/// A precondition checked against a message row before it is deleted in the
/// same transaction.
pub type MessageCheck = Box<dyn FnOnce(&Message) -> Result<()> + Send>;

// ─── Person persistence ──────────────────────────────────────────────────────

/// Abstraction over person persistence.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait PersonStore: Send + Sync {
  /// Persist a new person and return it with its server-assigned id.
  ///
  /// A duplicate name or email fails with [`crate::Error::Duplicate`].
  fn add_person(
    &self,
    input: NewPerson,
  ) -> impl Future<Output = Result<Person>> + Send + '_;

  /// Retrieve a person by id. Returns `None` if not found.
  fn person_by_id(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<Option<Person>>> + Send + '_;

  /// Retrieve a person by unique name. Returns `None` if not found.
  fn person_by_name(
    &self,
    name: String,
  ) -> impl Future<Output = Result<Option<Person>>> + Send + '_;

  /// One page of all people, in id order.
  fn list_people(
    &self,
    page: Page,
  ) -> impl Future<Output = Result<Vec<Person>>> + Send + '_;

  /// One page of people whose name contains `pattern`, case-insensitively,
  /// sorted ascending by name.
  fn search_people(
    &self,
    pattern: String,
    page: Page,
  ) -> impl Future<Output = Result<Vec<Person>>> + Send + '_;

  /// Read the person with `id`, transform it with `apply`, and write the
  /// result back, all inside one transaction; statements from concurrent
  /// callers cannot interleave between the read and the write. Returns
  /// `None` when the id does not exist; an error from `apply` aborts without
  /// writing. The registration date column is never written.
  ///
  /// A duplicate name or email fails with [`crate::Error::Duplicate`].
  fn modify_person(
    &self,
    id: i64,
    apply: PersonEdit,
  ) -> impl Future<Output = Result<Option<Person>>> + Send + '_;

  /// Remove a person row. Callers check existence first; deleting an absent
  /// id is a no-op.
  fn delete_person(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<()>> + Send + '_;
}

// ─── Message persistence ─────────────────────────────────────────────────────

/// Abstraction over message persistence.
pub trait MessageStore: Send + Sync {
  /// Persist a new message and return it with its server-assigned id.
  fn add_message(
    &self,
    input: NewMessage,
  ) -> impl Future<Output = Result<Message>> + Send + '_;

  /// Retrieve a message by id. Returns `None` if not found.
  fn message_by_id(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<Option<Message>>> + Send + '_;

  /// One page of the two-directional conversation between `a` and `b`:
  /// messages where (sender=a AND receiver=b) OR (sender=b AND receiver=a),
  /// newest first. An optional case-insensitive content substring filter.
  fn conversation(
    &self,
    a: i64,
    b: i64,
    content: Option<String>,
    page: Page,
  ) -> impl Future<Output = Result<Vec<Message>>> + Send + '_;

  /// One page of the one-directional flow from `sender` to `receiver`,
  /// newest first, with the same optional content filter.
  fn from_sender(
    &self,
    receiver: i64,
    sender: i64,
    content: Option<String>,
    page: Page,
  ) -> impl Future<Output = Result<Vec<Message>>> + Send + '_;

  /// Read the message with `id`, transform it with `apply`, and write its
  /// content back, all inside one transaction. Returns `None` when the id
  /// does not exist; an error from `apply` aborts without writing. The
  /// `sent_at` column is never written.
  fn modify_message(
    &self,
    id: i64,
    apply: MessageEdit,
  ) -> impl Future<Output = Result<Option<Message>>> + Send + '_;

  /// Delete the message with `id` if `check` accepts it, reading and
  /// deleting inside one transaction. Returns the deleted message, or `None`
  /// when the id does not exist; an error from `check` aborts the delete.
  fn delete_message_if(
    &self,
    id: i64,
    check: MessageCheck,
  ) -> impl Future<Output = Result<Option<Message>>> + Send + '_;
}
