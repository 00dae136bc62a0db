//! Message — a directed communication between two persons.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// A message as stored. `sent_at` is assigned by the server at creation and
/// never changes, including on content edits.
#[derive(Debug, Clone)]
pub struct Message {
  pub id:          i64,
  pub content:     String,
  pub sent_at:     DateTime<Utc>,
  pub sender_id:   i64,
  pub receiver_id: i64,
}

impl Message {
  /// Whether `person_id` is one of the two participants. Read visibility is
  /// limited to participants; mutation is limited to the sender.
  pub fn involves(&self, person_id: i64) -> bool {
    self.sender_id == person_id || self.receiver_id == person_id
  }
}

/// Input to [`crate::store::MessageStore::add_message`].
/// The id is assigned by the store.
#[derive(Debug, Clone)]
pub struct NewMessage {
  pub content:     String,
  pub sent_at:     DateTime<Utc>,
  pub sender_id:   i64,
  pub receiver_id: i64,
}

/// Serialized response shape for a message.
#[derive(Debug, Clone, Serialize)]
pub struct MessageView {
  pub id:          i64,
  pub content:     String,
  pub sent_at:     DateTime<Utc>,
  pub sender_id:   i64,
  pub receiver_id: i64,
}

impl From<Message> for MessageView {
  fn from(message: Message) -> Self {
    Self {
      id:          message.id,
      content:     message.content,
      sent_at:     message.sent_at,
      sender_id:   message.sender_id,
      receiver_id: message.receiver_id,
    }
  }
}
