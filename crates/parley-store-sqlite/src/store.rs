//! [`SqliteStore`] — the SQLite implementation of [`PersonStore`] and
//! [`MessageStore`].

use std::path::Path;

use rusqlite::OptionalExtension as _;

use parley_core::{
  message::{Message, NewMessage},
  person::{NewPerson, Person},
  store::{MessageCheck, MessageEdit, MessageStore, Page, PersonEdit, PersonStore},
};

use crate::{
  Error, Result,
  encode::{
    RawMessage, RawPerson, encode_date, encode_dt, encode_role,
  },
  schema::SCHEMA,
};

const PERSON_COLUMNS: &str =
  "id, name, age, email, password_hash, role, registration_date";
const MESSAGE_COLUMNS: &str = "id, content, sent_at, sender_id, receiver_id";

// ─── Store ───────────────────────────────────────────────────────────────────

/// A parley store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

// ─── Row mapping helpers ─────────────────────────────────────────────────────

fn person_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawPerson> {
  Ok(RawPerson {
    id:                row.get(0)?,
    name:              row.get(1)?,
    age:               row.get(2)?,
    email:             row.get(3)?,
    password_hash:     row.get(4)?,
    role:              row.get(5)?,
    registration_date: row.get(6)?,
  })
}

fn message_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawMessage> {
  Ok(RawMessage {
    id:          row.get(0)?,
    content:     row.get(1)?,
    sent_at:     row.get(2)?,
    sender_id:   row.get(3)?,
    receiver_id: row.get(4)?,
  })
}

/// Translate a UNIQUE-constraint failure on the people table into
/// [`Error::UniqueViolation`]; pass everything else through.
fn map_person_write_err(e: tokio_rusqlite::Error) -> Error {
  if let tokio_rusqlite::Error::Rusqlite(rusqlite::Error::SqliteFailure(
    failure,
    Some(msg),
  )) = &e
    && failure.code == rusqlite::ErrorCode::ConstraintViolation
  {
    let field = if msg.contains("people.name") {
      "name"
    } else if msg.contains("people.email") {
      "email"
    } else {
      return Error::Database(e);
    };
    return Error::UniqueViolation(format!(
      "a person with this {field} already exists"
    ));
  }
  Error::Database(e)
}

// ─── Inherent queries ────────────────────────────────────────────────────────

impl SqliteStore {
  async fn insert_person(&self, input: NewPerson) -> Result<Person> {
    let role_str = encode_role(input.role).to_owned();
    let date_str = encode_date(input.registration_date);
    let NewPerson { name, age, email, password_hash, role, registration_date } =
      input;

    let stored = Person {
      id: 0,
      name: name.clone(),
      age,
      email: email.clone(),
      password_hash: password_hash.clone(),
      role,
      registration_date,
    };

    let id: i64 = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO people (
             name, age, email, password_hash, role, registration_date
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
          rusqlite::params![name, age, email, password_hash, role_str, date_str],
        )?;
        Ok(conn.last_insert_rowid())
      })
      .await
      .map_err(map_person_write_err)?;

    Ok(Person { id, ..stored })
  }

  async fn select_person_by_id(&self, id: i64) -> Result<Option<Person>> {
    let raw: Option<RawPerson> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {PERSON_COLUMNS} FROM people WHERE id = ?1"),
              rusqlite::params![id],
              person_from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawPerson::into_person).transpose()
  }

  async fn select_person_by_name(&self, name: String) -> Result<Option<Person>> {
    let raw: Option<RawPerson> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {PERSON_COLUMNS} FROM people WHERE name = ?1"),
              rusqlite::params![name],
              person_from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawPerson::into_person).transpose()
  }

  async fn select_people(
    &self,
    pattern: Option<String>,
    page: Page,
  ) -> Result<Vec<Person>> {
    let limit = page.size;
    let offset = page.offset();

    let raws: Vec<RawPerson> = self
      .conn
      .call(move |conn| {
        let rows = if let Some(pattern) = pattern {
          let mut stmt = conn.prepare(&format!(
            "SELECT {PERSON_COLUMNS} FROM people
             WHERE instr(lower(name), lower(?1)) > 0
             ORDER BY name ASC LIMIT ?2 OFFSET ?3"
          ))?;
          stmt
            .query_map(rusqlite::params![pattern, limit, offset], person_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?
        } else {
          let mut stmt = conn.prepare(&format!(
            "SELECT {PERSON_COLUMNS} FROM people
             ORDER BY id ASC LIMIT ?1 OFFSET ?2"
          ))?;
          stmt
            .query_map(rusqlite::params![limit, offset], person_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?
        };
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawPerson::into_person).collect()
  }

  /// Read-transform-write on one person row inside a single transaction, so
  /// no other statement can slip in between the read and the write. An error
  /// from `apply` drops the transaction, rolling back.
  async fn edit_person(
    &self,
    id: i64,
    apply: PersonEdit,
  ) -> parley_core::Result<Option<Person>> {
    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let raw = tx
          .query_row(
            &format!("SELECT {PERSON_COLUMNS} FROM people WHERE id = ?1"),
            rusqlite::params![id],
            person_from_row,
          )
          .optional()?;
        let Some(raw) = raw else { return Ok(Ok(None)) };
        let person = match raw.into_person() {
          Ok(person) => person,
          Err(e) => return Ok(Err(e.into())),
        };
        let person = match apply(person) {
          Ok(person) => person,
          Err(e) => return Ok(Err(e)),
        };
        let role_str = encode_role(person.role);
        tx.execute(
          "UPDATE people
           SET name = ?1, age = ?2, email = ?3, password_hash = ?4, role = ?5
           WHERE id = ?6",
          rusqlite::params![
            person.name,
            person.age,
            person.email,
            person.password_hash,
            role_str,
            id
          ],
        )?;
        tx.commit()?;
        Ok(Ok(Some(person)))
      })
      .await
      .map_err(map_person_write_err)
      .map_err(parley_core::Error::from)?
  }

  async fn remove_person(&self, id: i64) -> Result<()> {
    self
      .conn
      .call(move |conn| {
        conn.execute("DELETE FROM people WHERE id = ?1", rusqlite::params![id])?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn insert_message(&self, input: NewMessage) -> Result<Message> {
    let sent_at_str = encode_dt(input.sent_at);
    let NewMessage { content, sent_at, sender_id, receiver_id } = input;
    let stored = Message {
      id: 0,
      content: content.clone(),
      sent_at,
      sender_id,
      receiver_id,
    };

    let id: i64 = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO messages (content, sent_at, sender_id, receiver_id)
           VALUES (?1, ?2, ?3, ?4)",
          rusqlite::params![content, sent_at_str, sender_id, receiver_id],
        )?;
        Ok(conn.last_insert_rowid())
      })
      .await?;

    Ok(Message { id, ..stored })
  }

  async fn select_message_by_id(&self, id: i64) -> Result<Option<Message>> {
    let raw: Option<RawMessage> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {MESSAGE_COLUMNS} FROM messages WHERE id = ?1"),
              rusqlite::params![id],
              message_from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawMessage::into_message).transpose()
  }

  async fn select_conversation(
    &self,
    a: i64,
    b: i64,
    content: Option<String>,
    page: Page,
  ) -> Result<Vec<Message>> {
    let limit = page.size;
    let offset = page.offset();

    let raws: Vec<RawMessage> = self
      .conn
      .call(move |conn| {
        let rows = if let Some(content) = content {
          let mut stmt = conn.prepare(&format!(
            "SELECT {MESSAGE_COLUMNS} FROM messages
             WHERE ((sender_id = ?1 AND receiver_id = ?2)
                 OR (sender_id = ?2 AND receiver_id = ?1))
               AND instr(lower(content), lower(?3)) > 0
             ORDER BY sent_at DESC, id DESC LIMIT ?4 OFFSET ?5"
          ))?;
          stmt
            .query_map(
              rusqlite::params![a, b, content, limit, offset],
              message_from_row,
            )?
            .collect::<rusqlite::Result<Vec<_>>>()?
        } else {
          let mut stmt = conn.prepare(&format!(
            "SELECT {MESSAGE_COLUMNS} FROM messages
             WHERE (sender_id = ?1 AND receiver_id = ?2)
                OR (sender_id = ?2 AND receiver_id = ?1)
             ORDER BY sent_at DESC, id DESC LIMIT ?3 OFFSET ?4"
          ))?;
          stmt
            .query_map(rusqlite::params![a, b, limit, offset], message_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?
        };
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawMessage::into_message).collect()
  }

  async fn select_from_sender(
    &self,
    receiver: i64,
    sender: i64,
    content: Option<String>,
    page: Page,
  ) -> Result<Vec<Message>> {
    let limit = page.size;
    let offset = page.offset();

    let raws: Vec<RawMessage> = self
      .conn
      .call(move |conn| {
        let rows = if let Some(content) = content {
          let mut stmt = conn.prepare(&format!(
            "SELECT {MESSAGE_COLUMNS} FROM messages
             WHERE receiver_id = ?1 AND sender_id = ?2
               AND instr(lower(content), lower(?3)) > 0
             ORDER BY sent_at DESC, id DESC LIMIT ?4 OFFSET ?5"
          ))?;
          stmt
            .query_map(
              rusqlite::params![receiver, sender, content, limit, offset],
              message_from_row,
            )?
            .collect::<rusqlite::Result<Vec<_>>>()?
        } else {
          let mut stmt = conn.prepare(&format!(
            "SELECT {MESSAGE_COLUMNS} FROM messages
             WHERE receiver_id = ?1 AND sender_id = ?2
             ORDER BY sent_at DESC, id DESC LIMIT ?3 OFFSET ?4"
          ))?;
          stmt
            .query_map(
              rusqlite::params![receiver, sender, limit, offset],
              message_from_row,
            )?
            .collect::<rusqlite::Result<Vec<_>>>()?
        };
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawMessage::into_message).collect()
  }

  /// Read-transform-write on one message row, transactionally. Only the
  /// content column is ever written.
  async fn edit_message(
    &self,
    id: i64,
    apply: MessageEdit,
  ) -> parley_core::Result<Option<Message>> {
    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let raw = tx
          .query_row(
            &format!("SELECT {MESSAGE_COLUMNS} FROM messages WHERE id = ?1"),
            rusqlite::params![id],
            message_from_row,
          )
          .optional()?;
        let Some(raw) = raw else { return Ok(Ok(None)) };
        let message = match raw.into_message() {
          Ok(message) => message,
          Err(e) => return Ok(Err(e.into())),
        };
        let message = match apply(message) {
          Ok(message) => message,
          Err(e) => return Ok(Err(e)),
        };
        tx.execute(
          "UPDATE messages SET content = ?1 WHERE id = ?2",
          rusqlite::params![message.content, id],
        )?;
        tx.commit()?;
        Ok(Ok(Some(message)))
      })
      .await
      .map_err(Error::Database)
      .map_err(parley_core::Error::from)?
  }

  /// Read, check, and delete one message row transactionally; a rejected
  /// check leaves the row in place.
  async fn remove_message_if(
    &self,
    id: i64,
    check: MessageCheck,
  ) -> parley_core::Result<Option<Message>> {
    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let raw = tx
          .query_row(
            &format!("SELECT {MESSAGE_COLUMNS} FROM messages WHERE id = ?1"),
            rusqlite::params![id],
            message_from_row,
          )
          .optional()?;
        let Some(raw) = raw else { return Ok(Ok(None)) };
        let message = match raw.into_message() {
          Ok(message) => message,
          Err(e) => return Ok(Err(e.into())),
        };
        if let Err(e) = check(&message) {
          return Ok(Err(e));
        }
        tx.execute("DELETE FROM messages WHERE id = ?1", rusqlite::params![id])?;
        tx.commit()?;
        Ok(Ok(Some(message)))
      })
      .await
      .map_err(Error::Database)
      .map_err(parley_core::Error::from)?
  }
}

// ─── PersonStore impl ────────────────────────────────────────────────────────

impl PersonStore for SqliteStore {
  async fn add_person(&self, input: NewPerson) -> parley_core::Result<Person> {
    Ok(self.insert_person(input).await?)
  }

  async fn person_by_id(&self, id: i64) -> parley_core::Result<Option<Person>> {
    Ok(self.select_person_by_id(id).await?)
  }

  async fn person_by_name(
    &self,
    name: String,
  ) -> parley_core::Result<Option<Person>> {
    Ok(self.select_person_by_name(name).await?)
  }

  async fn list_people(&self, page: Page) -> parley_core::Result<Vec<Person>> {
    Ok(self.select_people(None, page).await?)
  }

  async fn search_people(
    &self,
    pattern: String,
    page: Page,
  ) -> parley_core::Result<Vec<Person>> {
    Ok(self.select_people(Some(pattern), page).await?)
  }

  async fn modify_person(
    &self,
    id: i64,
    apply: PersonEdit,
  ) -> parley_core::Result<Option<Person>> {
    self.edit_person(id, apply).await
  }

  async fn delete_person(&self, id: i64) -> parley_core::Result<()> {
    Ok(self.remove_person(id).await?)
  }
}

// ─── MessageStore impl ───────────────────────────────────────────────────────

impl MessageStore for SqliteStore {
  async fn add_message(
    &self,
    input: NewMessage,
  ) -> parley_core::Result<Message> {
    Ok(self.insert_message(input).await?)
  }

  async fn message_by_id(
    &self,
    id: i64,
  ) -> parley_core::Result<Option<Message>> {
    Ok(self.select_message_by_id(id).await?)
  }

  async fn conversation(
    &self,
    a: i64,
    b: i64,
    content: Option<String>,
    page: Page,
  ) -> parley_core::Result<Vec<Message>> {
    Ok(self.select_conversation(a, b, content, page).await?)
  }

  async fn from_sender(
    &self,
    receiver: i64,
    sender: i64,
    content: Option<String>,
    page: Page,
  ) -> parley_core::Result<Vec<Message>> {
    Ok(self.select_from_sender(receiver, sender, content, page).await?)
  }

  async fn modify_message(
    &self,
    id: i64,
    apply: MessageEdit,
  ) -> parley_core::Result<Option<Message>> {
    self.edit_message(id, apply).await
  }

  async fn delete_message_if(
    &self,
    id: i64,
    check: MessageCheck,
  ) -> parley_core::Result<Option<Message>> {
    self.remove_message_if(id, check).await
  }
}
