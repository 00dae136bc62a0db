//! Handlers for the anonymous `/public` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `{base}/public/registration` | 201 + created view |
//! | `POST` | `{base}/public/login` | body `{name, password}`, returns `{"jwt": …}` |
//! | `GET`  | `{base}/public/hello` | principal echo, or a greeting when anonymous |

use axum::{
  Json,
  extract::State,
  http::StatusCode,
  response::IntoResponse,
};
use parley_core::{
  person::{PersonView, RegistrationInput},
  store::{MessageStore, PersonStore},
};
use serde::Deserialize;
use serde_json::json;

use crate::{AppState, auth::Principal, error::ApiError};

/// `POST {base}/public/registration`
pub async fn register<S>(
  State(state): State<AppState<S>>,
  Json(input): Json<RegistrationInput>,
) -> Result<impl IntoResponse, ApiError>
where
  S: PersonStore + MessageStore + Clone + Send + Sync + 'static,
{
  let view: PersonView = state.people.register(input).await?;
  Ok((StatusCode::CREATED, Json(view)))
}

#[derive(Debug, Deserialize)]
pub struct LoginBody {
  pub name:     String,
  pub password: String,
}

/// `POST {base}/public/login` — verify credentials and issue a bearer token.
pub async fn login<S>(
  State(state): State<AppState<S>>,
  Json(body): Json<LoginBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: PersonStore + MessageStore + Clone + Send + Sync + 'static,
{
  let person = state.people.login(&body.name, &body.password).await?;
  let jwt = state
    .tokens
    .issue(&person.name)
    .map_err(|e| ApiError::Internal(e.to_string()))?;
  Ok(Json(json!({ "jwt": jwt })))
}

/// `GET {base}/public/hello` — echo the principal when one is attached.
pub async fn hello(principal: Option<Principal>) -> impl IntoResponse {
  match principal {
    Some(principal) => Json(json!({
      "name":      principal.username,
      "role":      principal.authority(),
      "password":  principal.password_hash,
    })),
    None => Json(json!({ "hello": "user" })),
  }
}
