//! Integration tests for `SqliteStore` against an in-memory database.

use chrono::{Duration, NaiveDate, Utc};
use parley_core::{
  message::NewMessage,
  person::{NewPerson, UserRole},
  store::{MessageStore, Page, PersonStore},
};

use crate::SqliteStore;

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

fn new_person(name: &str, email: &str) -> NewPerson {
  NewPerson {
    name:              name.to_owned(),
    age:               30,
    email:             email.to_owned(),
    password_hash:     "$argon2id$stub".to_owned(),
    role:              UserRole::Base,
    registration_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
  }
}

// ─── People ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn add_and_get_person() {
  let s = store().await;

  let alice = s.add_person(new_person("alice", "a@x.com")).await.unwrap();
  assert!(alice.id > 0);

  let by_id = s.person_by_id(alice.id).await.unwrap().unwrap();
  assert_eq!(by_id.name, "alice");
  assert_eq!(by_id.email, "a@x.com");
  assert_eq!(by_id.role, UserRole::Base);
  assert_eq!(by_id.registration_date, alice.registration_date);

  let by_name = s.person_by_name("alice".to_owned()).await.unwrap().unwrap();
  assert_eq!(by_name.id, alice.id);
}

#[tokio::test]
async fn get_person_missing_returns_none() {
  let s = store().await;
  assert!(s.person_by_id(42).await.unwrap().is_none());
  assert!(s.person_by_name("ghost".to_owned()).await.unwrap().is_none());
}

#[tokio::test]
async fn duplicate_name_is_a_duplicate_error() {
  let s = store().await;
  s.add_person(new_person("alice", "a@x.com")).await.unwrap();

  let err = s
    .add_person(new_person("alice", "other@x.com"))
    .await
    .unwrap_err();
  match err {
    parley_core::Error::Duplicate(msg) => assert!(msg.contains("name"), "{msg}"),
    other => panic!("expected Duplicate, got {other:?}"),
  }
}

#[tokio::test]
async fn duplicate_email_is_a_duplicate_error() {
  let s = store().await;
  s.add_person(new_person("alice", "a@x.com")).await.unwrap();

  let err = s
    .add_person(new_person("bob", "a@x.com"))
    .await
    .unwrap_err();
  match err {
    parley_core::Error::Duplicate(msg) => {
      assert!(msg.contains("email"), "{msg}")
    }
    other => panic!("expected Duplicate, got {other:?}"),
  }
}

#[tokio::test]
async fn search_is_case_insensitive_and_name_sorted() {
  let s = store().await;
  s.add_person(new_person("Carol", "c@x.com")).await.unwrap();
  s.add_person(new_person("alice", "a@x.com")).await.unwrap();
  s.add_person(new_person("Alina", "al@x.com")).await.unwrap();
  s.add_person(new_person("bob", "b@x.com")).await.unwrap();

  let found = s
    .search_people("AL".to_owned(), Page::default())
    .await
    .unwrap();
  let names: Vec<_> = found.iter().map(|p| p.name.as_str()).collect();
  assert_eq!(names, ["Alina", "alice"]);
}

#[tokio::test]
async fn list_people_is_paginated() {
  let s = store().await;
  for i in 0..5 {
    s.add_person(new_person(&format!("user{i}"), &format!("u{i}@x.com")))
      .await
      .unwrap();
  }

  let first = s.list_people(Page { number: 0, size: 2 }).await.unwrap();
  let second = s.list_people(Page { number: 1, size: 2 }).await.unwrap();
  assert_eq!(first.len(), 2);
  assert_eq!(second.len(), 2);
  assert_ne!(first[0].id, second[0].id);
}

#[tokio::test]
async fn huge_page_numbers_yield_an_empty_page() {
  let s = store().await;
  s.add_person(new_person("alice", "a@x.com")).await.unwrap();

  let page = Page { number: u32::MAX, size: 20 };
  assert!(s.list_people(page).await.unwrap().is_empty());
}

#[tokio::test]
async fn modify_person_does_not_touch_registration_date() {
  let s = store().await;
  let alice = s.add_person(new_person("alice", "a@x.com")).await.unwrap();
  let registered = alice.registration_date;

  s.modify_person(
    alice.id,
    Box::new(|mut person| {
      person.email = "new@x.com".to_owned();
      person.role = UserRole::Admin;
      Ok(person)
    }),
  )
  .await
  .unwrap()
  .unwrap();

  let fetched = s.person_by_id(alice.id).await.unwrap().unwrap();
  assert_eq!(fetched.email, "new@x.com");
  assert_eq!(fetched.role, UserRole::Admin);
  assert_eq!(fetched.registration_date, registered);
}

#[tokio::test]
async fn modify_person_missing_returns_none() {
  let s = store().await;
  let out = s.modify_person(42, Box::new(|person| Ok(person))).await.unwrap();
  assert!(out.is_none());
}

#[tokio::test]
async fn modify_person_rolls_back_when_the_edit_rejects() {
  let s = store().await;
  let alice = s.add_person(new_person("alice", "a@x.com")).await.unwrap();

  let err = s
    .modify_person(
      alice.id,
      Box::new(|mut person| {
        person.email = "never@x.com".to_owned();
        Err(parley_core::Error::WrongPassword)
      }),
    )
    .await
    .unwrap_err();
  assert!(matches!(err, parley_core::Error::WrongPassword));

  let fetched = s.person_by_id(alice.id).await.unwrap().unwrap();
  assert_eq!(fetched.email, "a@x.com");
}

#[tokio::test]
async fn modify_person_to_a_taken_name_is_a_duplicate_error() {
  let s = store().await;
  s.add_person(new_person("alice", "a@x.com")).await.unwrap();
  let bob = s.add_person(new_person("bob", "b@x.com")).await.unwrap();

  let err = s
    .modify_person(
      bob.id,
      Box::new(|mut person| {
        person.name = "alice".to_owned();
        Ok(person)
      }),
    )
    .await
    .unwrap_err();
  assert!(matches!(err, parley_core::Error::Duplicate(_)));

  let fetched = s.person_by_id(bob.id).await.unwrap().unwrap();
  assert_eq!(fetched.name, "bob");
}

#[tokio::test]
async fn delete_person_removes_the_row() {
  let s = store().await;
  let alice = s.add_person(new_person("alice", "a@x.com")).await.unwrap();
  s.delete_person(alice.id).await.unwrap();
  assert!(s.person_by_id(alice.id).await.unwrap().is_none());
}

#[tokio::test]
async fn delete_person_cascades_to_their_messages() {
  let s = store().await;
  let (alice, bob) = two_people(&s).await;
  send(&s, alice, bob, "hi bob", 0).await;
  send(&s, bob, alice, "hi alice", 1).await;

  s.delete_person(alice).await.unwrap();

  let left = s.conversation(alice, bob, None, Page::default()).await.unwrap();
  assert!(left.is_empty());
}

// ─── Messages ────────────────────────────────────────────────────────────────

async fn two_people(s: &SqliteStore) -> (i64, i64) {
  let a = s.add_person(new_person("alice", "a@x.com")).await.unwrap();
  let b = s.add_person(new_person("bob", "b@x.com")).await.unwrap();
  (a.id, b.id)
}

async fn send(s: &SqliteStore, from: i64, to: i64, content: &str, minute: i64) {
  s.add_message(NewMessage {
    content:     content.to_owned(),
    sent_at:     Utc::now() + Duration::minutes(minute),
    sender_id:   from,
    receiver_id: to,
  })
  .await
  .unwrap();
}

#[tokio::test]
async fn conversation_covers_both_directions_newest_first() {
  let s = store().await;
  let (alice, bob) = two_people(&s).await;
  send(&s, alice, bob, "hi bob", 0).await;
  send(&s, bob, alice, "hi alice", 1).await;
  send(&s, alice, bob, "how are you", 2).await;

  let messages = s
    .conversation(alice, bob, None, Page::default())
    .await
    .unwrap();
  let contents: Vec<_> = messages.iter().map(|m| m.content.as_str()).collect();
  assert_eq!(contents, ["how are you", "hi alice", "hi bob"]);
}

#[tokio::test]
async fn conversation_is_symmetric() {
  let s = store().await;
  let (alice, bob) = two_people(&s).await;
  send(&s, alice, bob, "one", 0).await;
  send(&s, bob, alice, "two", 1).await;

  let ab = s
    .conversation(alice, bob, None, Page::default())
    .await
    .unwrap();
  let ba = s
    .conversation(bob, alice, None, Page::default())
    .await
    .unwrap();

  let ids_ab: Vec<_> = ab.iter().map(|m| m.id).collect();
  let ids_ba: Vec<_> = ba.iter().map(|m| m.id).collect();
  assert_eq!(ids_ab, ids_ba);
}

#[tokio::test]
async fn from_sender_is_one_directional() {
  let s = store().await;
  let (alice, bob) = two_people(&s).await;
  send(&s, alice, bob, "from alice", 0).await;
  send(&s, bob, alice, "from bob", 1).await;

  let inbox = s
    .from_sender(alice, bob, None, Page::default())
    .await
    .unwrap();
  assert_eq!(inbox.len(), 1);
  assert_eq!(inbox[0].content, "from bob");
}

#[tokio::test]
async fn content_filter_is_case_insensitive() {
  let s = store().await;
  let (alice, bob) = two_people(&s).await;
  send(&s, alice, bob, "Lunch tomorrow?", 0).await;
  send(&s, bob, alice, "lunch sounds good", 1).await;
  send(&s, alice, bob, "unrelated", 2).await;

  let found = s
    .conversation(alice, bob, Some("LUNCH".to_owned()), Page::default())
    .await
    .unwrap();
  assert_eq!(found.len(), 2);
}

#[tokio::test]
async fn modify_message_preserves_sent_at() {
  let s = store().await;
  let (alice, bob) = two_people(&s).await;

  let message = s
    .add_message(NewMessage {
      content:     "orginal".to_owned(),
      sent_at:     Utc::now(),
      sender_id:   alice,
      receiver_id: bob,
    })
    .await
    .unwrap();
  let sent_at = message.sent_at;

  s.modify_message(
    message.id,
    Box::new(|mut message| {
      message.content = "original".to_owned();
      Ok(message)
    }),
  )
  .await
  .unwrap()
  .unwrap();

  let fetched = s.message_by_id(message.id).await.unwrap().unwrap();
  assert_eq!(fetched.content, "original");
  assert_eq!(fetched.sent_at, sent_at);
}

#[tokio::test]
async fn modify_message_rolls_back_when_the_edit_rejects() {
  let s = store().await;
  let (alice, bob) = two_people(&s).await;
  send(&s, alice, bob, "keep me", 0).await;
  let messages =
    s.conversation(alice, bob, None, Page::default()).await.unwrap();
  let message = &messages[0];

  let err = s
    .modify_message(
      message.id,
      Box::new(|_| Err(parley_core::Error::NoMessagesFound)),
    )
    .await
    .unwrap_err();
  assert!(matches!(err, parley_core::Error::NoMessagesFound));

  let fetched = s.message_by_id(message.id).await.unwrap().unwrap();
  assert_eq!(fetched.content, "keep me");
}

#[tokio::test]
async fn delete_message_if_removes_the_row_when_the_check_accepts() {
  let s = store().await;
  let (alice, bob) = two_people(&s).await;
  send(&s, alice, bob, "bye", 0).await;

  let messages = s
    .conversation(alice, bob, None, Page::default())
    .await
    .unwrap();
  let deleted = s
    .delete_message_if(messages[0].id, Box::new(|_| Ok(())))
    .await
    .unwrap()
    .unwrap();
  assert_eq!(deleted.content, "bye");
  assert!(s.message_by_id(messages[0].id).await.unwrap().is_none());
}

#[tokio::test]
async fn delete_message_if_keeps_the_row_when_the_check_rejects() {
  let s = store().await;
  let (alice, bob) = two_people(&s).await;
  send(&s, alice, bob, "still here", 0).await;
  let messages =
    s.conversation(alice, bob, None, Page::default()).await.unwrap();
  let message = &messages[0];

  let err = s
    .delete_message_if(
      message.id,
      Box::new(|_| Err(parley_core::Error::NoMessagesFound)),
    )
    .await
    .unwrap_err();
  assert!(matches!(err, parley_core::Error::NoMessagesFound));
  assert!(s.message_by_id(message.id).await.unwrap().is_some());
}
