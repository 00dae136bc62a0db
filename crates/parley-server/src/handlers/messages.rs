//! Handlers for the `{base}/messages` endpoints.
//!
//! The caller's side of every operation comes from the authenticated
//! principal, never from the request body. Message bodies are raw text.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `{base}/messages/{receiver_id}` | 201 + created view |
//! | `GET`  | `{base}/messages/{id}` | participants only |
//! | `GET`  | `{base}/messages/with/{id}` | conversation, chronological |
//! | `GET`  | `{base}/messages/from/{id}` | inbox from one sender, newest first |
//! | `GET`  | `{base}/messages/search-with/{id}?content=` | conversation search |
//! | `GET`  | `{base}/messages/search-from/{id}?content=` | inbox search |
//! | `PUT`  | `{base}/messages/{id}` | sender only |
//! | `DELETE` | `{base}/messages/{id}` | sender only, returns deleted view |

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use parley_core::{
  message::MessageView,
  store::{MessageStore, PersonStore},
};
use serde::Deserialize;

use crate::{AppState, auth::Principal, error::ApiError, handlers::PageParams};

/// `POST {base}/messages/{receiver_id}` — body is the raw content string.
pub async fn send<S>(
  State(state): State<AppState<S>>,
  principal: Principal,
  Path(receiver_id): Path<i64>,
  content: String,
) -> Result<impl IntoResponse, ApiError>
where
  S: PersonStore + MessageStore + Clone + Send + Sync + 'static,
{
  let view =
    state.messages.send(&content, principal.id, receiver_id).await?;
  Ok((StatusCode::CREATED, Json(view)))
}

/// `GET {base}/messages/{id}`
pub async fn get_by_id<S>(
  State(state): State<AppState<S>>,
  principal: Principal,
  Path(id): Path<i64>,
) -> Result<Json<MessageView>, ApiError>
where
  S: PersonStore + MessageStore + Clone + Send + Sync + 'static,
{
  Ok(Json(state.messages.get_by_id(id, principal.id).await?))
}

/// `GET {base}/messages/with/{id}` — full conversation, oldest first.
pub async fn conversation<S>(
  State(state): State<AppState<S>>,
  principal: Principal,
  Path(other_id): Path<i64>,
  Query(page): Query<PageParams>,
) -> Result<Json<Vec<MessageView>>, ApiError>
where
  S: PersonStore + MessageStore + Clone + Send + Sync + 'static,
{
  let messages = state
    .messages
    .conversation_with(principal.id, other_id, None, (&page).into())
    .await?;
  Ok(Json(messages))
}

/// `GET {base}/messages/from/{id}` — inbox from one sender, newest first.
pub async fn from_sender<S>(
  State(state): State<AppState<S>>,
  principal: Principal,
  Path(other_id): Path<i64>,
  Query(page): Query<PageParams>,
) -> Result<Json<Vec<MessageView>>, ApiError>
where
  S: PersonStore + MessageStore + Clone + Send + Sync + 'static,
{
  let messages = state
    .messages
    .from_sender(principal.id, other_id, None, (&page).into())
    .await?;
  Ok(Json(messages))
}

#[derive(Debug, Deserialize)]
pub struct ContentSearchParams {
  pub content: String,
  #[serde(default)]
  pub page:    u32,
  #[serde(default = "crate::handlers::default_size")]
  pub size:    u32,
}

impl ContentSearchParams {
  fn page(&self) -> parley_core::store::Page {
    parley_core::store::Page { number: self.page, size: self.size }
  }
}

/// `GET {base}/messages/search-with/{id}?content=`
pub async fn search_conversation<S>(
  State(state): State<AppState<S>>,
  principal: Principal,
  Path(other_id): Path<i64>,
  Query(params): Query<ContentSearchParams>,
) -> Result<Json<Vec<MessageView>>, ApiError>
where
  S: PersonStore + MessageStore + Clone + Send + Sync + 'static,
{
  let page = params.page();
  let messages = state
    .messages
    .conversation_with(principal.id, other_id, Some(params.content), page)
    .await?;
  Ok(Json(messages))
}

/// `GET {base}/messages/search-from/{id}?content=`
pub async fn search_from_sender<S>(
  State(state): State<AppState<S>>,
  principal: Principal,
  Path(other_id): Path<i64>,
  Query(params): Query<ContentSearchParams>,
) -> Result<Json<Vec<MessageView>>, ApiError>
where
  S: PersonStore + MessageStore + Clone + Send + Sync + 'static,
{
  let page = params.page();
  let messages = state
    .messages
    .from_sender(principal.id, other_id, Some(params.content), page)
    .await?;
  Ok(Json(messages))
}

/// `PUT {base}/messages/{id}` — edit own message; body is the new content.
pub async fn update_by_id<S>(
  State(state): State<AppState<S>>,
  principal: Principal,
  Path(id): Path<i64>,
  content: String,
) -> Result<Json<MessageView>, ApiError>
where
  S: PersonStore + MessageStore + Clone + Send + Sync + 'static,
{
  Ok(Json(state.messages.update_by_id(&content, principal.id, id).await?))
}

/// `DELETE {base}/messages/{id}` — delete own message, returns deleted view.
pub async fn delete_by_id<S>(
  State(state): State<AppState<S>>,
  principal: Principal,
  Path(id): Path<i64>,
) -> Result<Json<MessageView>, ApiError>
where
  S: PersonStore + MessageStore + Clone + Send + Sync + 'static,
{
  Ok(Json(state.messages.delete_by_id(id, principal.id).await?))
}
