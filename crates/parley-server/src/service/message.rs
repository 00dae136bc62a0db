//! [`MessageService`] — send, read, search, and sender-ownership rules.
//!
//! Ownership is enforced here, not in the handlers: only the sender may edit
//! or delete a message, and only the two participants may view one. Empty
//! list results fail with [`Error::NoMessagesFound`], matching the person
//! side of the API.

use std::sync::Arc;

use chrono::Utc;

use parley_core::{
  Error, Result,
  message::{Message, MessageView, NewMessage},
  store::{MessageStore, Page, PersonStore},
};

pub struct MessageService<S> {
  store: Arc<S>,
}

impl<S> Clone for MessageService<S> {
  fn clone(&self) -> Self { Self { store: Arc::clone(&self.store) } }
}

impl<S: MessageStore + PersonStore> MessageService<S> {
  pub fn new(store: Arc<S>) -> Self { Self { store } }

  /// Persist a new message with a server-assigned timestamp. The receiver
  /// must exist; blank content is rejected.
  pub async fn send(
    &self,
    content: &str,
    sender_id: i64,
    receiver_id: i64,
  ) -> Result<MessageView> {
    if content.trim().is_empty() {
      return Err(Error::Validation(vec!["content must not be blank".to_owned()]));
    }
    if self.store.person_by_id(receiver_id).await?.is_none() {
      return Err(Error::PersonNotFoundById(receiver_id));
    }

    let message = self
      .store
      .add_message(NewMessage {
        content: content.to_owned(),
        sent_at: Utc::now(),
        sender_id,
        receiver_id,
      })
      .await?;

    tracing::info!(
      id = message.id,
      sender_id,
      receiver_id,
      "sent message"
    );
    Ok(message.into())
  }

  /// A single message, visible only to its two participants.
  pub async fn get_by_id(&self, id: i64, caller_id: i64) -> Result<MessageView> {
    let message = self.message_by_id(id).await?;
    if !message.involves(caller_id) {
      return Err(Error::NotMessageSender {
        action:    "viewing",
        caller_id,
        sender_id: message.sender_id,
      });
    }
    Ok(message.into())
  }

  /// The two-directional conversation between the caller and `other_id`,
  /// fetched newest-first and reversed so the page reads chronologically.
  /// `content` applies a case-insensitive substring filter.
  pub async fn conversation_with(
    &self,
    self_id: i64,
    other_id: i64,
    content: Option<String>,
    page: Page,
  ) -> Result<Vec<MessageView>> {
    let mut messages =
      self.store.conversation(self_id, other_id, content, page).await?;
    Self::check_not_empty(&messages)?;
    messages.reverse();
    Ok(messages.into_iter().map(MessageView::from).collect())
  }

  /// One-directional inbox: messages sent by `other_id` to the caller,
  /// newest first.
  pub async fn from_sender(
    &self,
    self_id: i64,
    other_id: i64,
    content: Option<String>,
    page: Page,
  ) -> Result<Vec<MessageView>> {
    let messages =
      self.store.from_sender(self_id, other_id, content, page).await?;
    Self::check_not_empty(&messages)?;
    Ok(messages.into_iter().map(MessageView::from).collect())
  }

  /// Edit the content of an own message. The timestamp is never touched;
  /// the ownership check runs against the row read inside the same
  /// transaction that writes the new content.
  pub async fn update_by_id(
    &self,
    content: &str,
    caller_id: i64,
    id: i64,
  ) -> Result<MessageView> {
    if content.trim().is_empty() {
      return Err(Error::Validation(vec!["content must not be blank".to_owned()]));
    }
    let content = content.to_owned();
    let message = self
      .store
      .modify_message(
        id,
        Box::new(move |mut message| {
          check_sender(&message, caller_id, "editing")?;
          message.content = content;
          Ok(message)
        }),
      )
      .await?
      .ok_or(Error::MessageNotFoundById(id))?;
    Ok(message.into())
  }

  /// Delete an own message; returns the deleted view. The ownership check
  /// and the delete run inside one transaction.
  pub async fn delete_by_id(&self, id: i64, caller_id: i64) -> Result<MessageView> {
    let message = self
      .store
      .delete_message_if(
        id,
        Box::new(move |message| check_sender(message, caller_id, "deleting")),
      )
      .await?
      .ok_or(Error::MessageNotFoundById(id))?;
    tracing::info!(id = message.id, "deleted message");
    Ok(message.into())
  }

  async fn message_by_id(&self, id: i64) -> Result<Message> {
    self
      .store
      .message_by_id(id)
      .await?
      .ok_or(Error::MessageNotFoundById(id))
  }

  fn check_not_empty(messages: &[Message]) -> Result<()> {
    if messages.is_empty() {
      return Err(Error::NoMessagesFound);
    }
    Ok(())
  }
}

fn check_sender(
  message: &Message,
  caller_id: i64,
  action: &'static str,
) -> Result<()> {
  if message.sender_id != caller_id {
    return Err(Error::NotMessageSender {
      action,
      caller_id,
      sender_id: message.sender_id,
    });
  }
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;
  use parley_core::person::{NewPerson, UserRole};
  use parley_store_sqlite::SqliteStore;

  async fn setup() -> (MessageService<SqliteStore>, i64, i64) {
    let store = Arc::new(SqliteStore::open_in_memory().await.unwrap());
    let mut ids = Vec::new();
    for (name, email) in [("alice", "a@x.com"), ("bob", "b@x.com")] {
      let person = store
        .add_person(NewPerson {
          name:              name.to_owned(),
          age:               30,
          email:             email.to_owned(),
          password_hash:     "$argon2id$stub".to_owned(),
          role:              UserRole::Base,
          registration_date: Utc::now().date_naive(),
        })
        .await
        .unwrap();
      ids.push(person.id);
    }
    (MessageService::new(store), ids[0], ids[1])
  }

  #[tokio::test]
  async fn send_assigns_sender_and_timestamp() {
    let (messages, alice, bob) = setup().await;
    let view = messages.send("hi bob", alice, bob).await.unwrap();
    assert_eq!(view.sender_id, alice);
    assert_eq!(view.receiver_id, bob);
  }

  #[tokio::test]
  async fn send_to_missing_receiver_fails() {
    let (messages, alice, _) = setup().await;
    let err = messages.send("hi", alice, 999).await.unwrap_err();
    assert!(matches!(err, Error::PersonNotFoundById(999)));
  }

  #[tokio::test]
  async fn send_blank_content_fails() {
    let (messages, alice, bob) = setup().await;
    let err = messages.send("   ", alice, bob).await.unwrap_err();
    assert!(matches!(err, Error::Validation(_)));
  }

  #[tokio::test]
  async fn only_the_sender_may_edit_or_delete() {
    let (messages, alice, bob) = setup().await;
    let sent = messages.send("hi bob", alice, bob).await.unwrap();

    let edit = messages.update_by_id("edited", bob, sent.id).await.unwrap_err();
    assert!(matches!(edit, Error::NotMessageSender { action: "editing", .. }));

    let delete = messages.delete_by_id(sent.id, bob).await.unwrap_err();
    assert!(matches!(
      delete,
      Error::NotMessageSender { action: "deleting", .. }
    ));

    let edited = messages.update_by_id("edited", alice, sent.id).await.unwrap();
    assert_eq!(edited.content, "edited");
    assert_eq!(edited.sent_at, sent.sent_at);

    messages.delete_by_id(sent.id, alice).await.unwrap();
    let err = messages.get_by_id(sent.id, alice).await.unwrap_err();
    assert!(matches!(err, Error::MessageNotFoundById(_)));
  }

  #[tokio::test]
  async fn conversation_reads_chronologically_and_symmetrically() {
    let (messages, alice, bob) = setup().await;
    messages.send("first", alice, bob).await.unwrap();
    messages.send("second", bob, alice).await.unwrap();

    let ab = messages
      .conversation_with(alice, bob, None, Page::default())
      .await
      .unwrap();
    let ba = messages
      .conversation_with(bob, alice, None, Page::default())
      .await
      .unwrap();

    let ids_ab: Vec<_> = ab.iter().map(|m| m.id).collect();
    let ids_ba: Vec<_> = ba.iter().map(|m| m.id).collect();
    assert_eq!(ids_ab, ids_ba);
    assert!(ab[0].id < ab[1].id, "chronological order");
  }

  #[tokio::test]
  async fn empty_results_are_an_error() {
    let (messages, alice, bob) = setup().await;
    let err = messages
      .conversation_with(alice, bob, None, Page::default())
      .await
      .unwrap_err();
    assert!(matches!(err, Error::NoMessagesFound));

    messages.send("hi", alice, bob).await.unwrap();
    let err = messages
      .from_sender(alice, bob, Some("no-such-text".to_owned()), Page::default())
      .await
      .unwrap_err();
    assert!(matches!(err, Error::NoMessagesFound));
  }

  #[tokio::test]
  async fn non_participants_cannot_view_a_message() {
    let (messages, alice, bob) = setup().await;
    let sent = messages.send("hi bob", alice, bob).await.unwrap();

    assert!(messages.get_by_id(sent.id, bob).await.is_ok());
    let err = messages.get_by_id(sent.id, 999).await.unwrap_err();
    assert!(matches!(err, Error::NotMessageSender { .. }));
  }
}
