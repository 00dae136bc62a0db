//! Bearer-token authentication: the per-request middleware and the
//! [`Principal`] extractor.
//!
//! Authentication is stateless — every request is re-authenticated from its
//! `Authorization: Bearer <token>` header. The middleware runs before the
//! authorization policy and populates request extensions with the resolved
//! principal; handlers read it back through the extractor.

use std::convert::Infallible;

use axum::{
  extract::{FromRequestParts, OptionalFromRequestParts, Request, State},
  http::{header, request::Parts},
  middleware::Next,
  response::{IntoResponse, Response},
};

use parley_core::{
  person::{Person, UserRole},
  store::{MessageStore, PersonStore},
};

use crate::{AppState, error::ApiError};

const BEARER_PREFIX: &str = "Bearer ";

// ─── Principal ───────────────────────────────────────────────────────────────

/// The authenticated identity attached to a request. A transient projection
/// of a [`Person`] — never persisted, rebuilt from the token's username claim
/// on every request.
#[derive(Debug, Clone)]
pub struct Principal {
  pub id:            i64,
  pub username:      String,
  /// Exposed as the principal's credentials; always the argon2 PHC string.
  pub password_hash: String,
  pub role:          UserRole,
}

impl Principal {
  /// The single authority string derived from the role, e.g. `"ROLE_ADMIN"`.
  pub fn authority(&self) -> &'static str { self.role.authority() }

  pub fn is_admin(&self) -> bool { self.role == UserRole::Admin }
}

impl From<Person> for Principal {
  fn from(person: Person) -> Self {
    Self {
      id:            person.id,
      username:      person.name,
      password_hash: person.password_hash,
      role:          person.role,
    }
  }
}

// ─── Middleware ──────────────────────────────────────────────────────────────

/// Authenticate one inbound request.
///
/// 1. No `Authorization` header, or one without the `Bearer ` prefix —
///    continue the pipeline anonymous.
/// 2. `Bearer ` with a blank token — stop with a structured 400.
/// 3. Token verification failure — stop with a structured 400.
/// 4. Valid token for a person that no longer exists — 404 through the
///    central error mapping.
/// 5. Otherwise insert the [`Principal`] into request extensions, unless one
///    is already present.
pub async fn authenticate<S>(
  State(state): State<AppState<S>>,
  mut request: Request,
  next: Next,
) -> Response
where
  S: PersonStore + MessageStore + Clone + Send + Sync + 'static,
{
  let header_value = request
    .headers()
    .get(header::AUTHORIZATION)
    .and_then(|v| v.to_str().ok());

  let Some(token) =
    header_value.and_then(|v| v.strip_prefix(BEARER_PREFIX))
  else {
    return next.run(request).await;
  };

  if token.trim().is_empty() {
    return ApiError::BadRequest("empty or invalid JWT".to_owned())
      .into_response();
  }

  let username = match state.tokens.verify(token) {
    Ok(username) => username,
    Err(e) => return ApiError::BadRequest(e.to_string()).into_response(),
  };

  // A valid token whose person has since been deleted.
  let person = match state.people.entity_by_name(&username).await {
    Ok(person) => person,
    Err(e) => return ApiError::from(e).into_response(),
  };

  if request.extensions().get::<Principal>().is_none() {
    request.extensions_mut().insert(Principal::from(person));
  }

  next.run(request).await
}

// ─── Extractors ──────────────────────────────────────────────────────────────

impl<S: Send + Sync> FromRequestParts<S> for Principal {
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    _state: &S,
  ) -> Result<Self, Self::Rejection> {
    parts.extensions.get::<Principal>().cloned().ok_or_else(|| {
      ApiError::Unauthorized("authentication is required".to_owned())
    })
  }
}

impl<S: Send + Sync> OptionalFromRequestParts<S> for Principal {
  type Rejection = Infallible;

  async fn from_request_parts(
    parts: &mut Parts,
    _state: &S,
  ) -> Result<Option<Self>, Self::Rejection> {
    Ok(parts.extensions.get::<Principal>().cloned())
  }
}
