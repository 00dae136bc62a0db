//! HTTP layer for the parley messaging backend.
//!
//! Exposes an axum [`Router`] over any backend implementing the core store
//! traits. Requests flow through tracing, then bearer-token authentication
//! ([`auth`]), then the central authorization policy ([`policy`]), and only
//! then reach a handler; handlers stay thin and delegate business rules to
//! the services.

pub mod auth;
pub mod error;
pub mod handlers;
pub mod policy;
pub mod service;
pub mod token;

pub use error::ApiError;

use std::{path::PathBuf, sync::Arc};

use axum::{
  Router, middleware,
  routing::{get, post, put},
};
use parley_core::store::{MessageStore, PersonStore};
use serde::Deserialize;
use tower_http::trace::TraceLayer;

use policy::Policy;
use service::{MessageService, PersonService};
use token::TokenAuthority;

// ─── Configuration ────────────────────────────────────────────────────────────

fn default_host() -> String { "127.0.0.1".to_owned() }
fn default_port() -> u16 { 8080 }
fn default_base_path() -> String { "/api/v1".to_owned() }
fn default_jwt_issuer() -> String { "parley".to_owned() }
fn default_jwt_ttl_minutes() -> i64 { 60 }

/// Runtime server configuration, deserialised from `config.toml` merged with
/// `PARLEY_*` environment variables.
#[derive(Deserialize, Clone)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:            String,
  #[serde(default = "default_port")]
  pub port:            u16,
  /// URL prefix for every route, e.g. `/api/v1`.
  #[serde(default = "default_base_path")]
  pub base_path:       String,
  pub store_path:      PathBuf,
  /// Symmetric signing key for bearer tokens. Configuration-only — never
  /// checked into source control.
  pub jwt_secret:      String,
  #[serde(default = "default_jwt_issuer")]
  pub jwt_issuer:      String,
  #[serde(default = "default_jwt_ttl_minutes")]
  pub jwt_ttl_minutes: i64,
}

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state threaded through all axum handlers and middleware.
pub struct AppState<S> {
  pub people:   PersonService<S>,
  pub messages: MessageService<S>,
  pub tokens:   TokenAuthority,
  pub policy:   Arc<Policy>,
  pub config:   Arc<ServerConfig>,
}

impl<S> Clone for AppState<S> {
  fn clone(&self) -> Self {
    Self {
      people:   self.people.clone(),
      messages: self.messages.clone(),
      tokens:   self.tokens.clone(),
      policy:   Arc::clone(&self.policy),
      config:   Arc::clone(&self.config),
    }
  }
}

impl<S> AppState<S>
where
  S: PersonStore + MessageStore + Clone + Send + Sync + 'static,
{
  pub fn new(store: Arc<S>, config: ServerConfig) -> Self {
    let tokens = TokenAuthority::new(
      &config.jwt_secret,
      config.jwt_issuer.clone(),
      config.jwt_ttl_minutes,
    );
    let policy = Arc::new(Policy::standard(&config.base_path));
    Self {
      people: PersonService::new(Arc::clone(&store)),
      messages: MessageService::new(store),
      tokens,
      policy,
      config: Arc::new(config),
    }
  }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the axum [`Router`] for the parley server.
pub fn router<S>(state: AppState<S>) -> Router
where
  S: PersonStore + MessageStore + Clone + Send + Sync + 'static,
{
  use handlers::{admin, messages, people, public};

  let base = state.config.base_path.trim_end_matches('/').to_owned();
  let root = if base.is_empty() { "/".to_owned() } else { base.clone() };

  Router::new()
    .route(&format!("{base}/public/registration"), post(public::register::<S>))
    .route(&format!("{base}/public/login"),        post(public::login::<S>))
    .route(&format!("{base}/public/hello"),        get(public::hello))
    .route(&root,                                  get(people::list::<S>))
    .route(&format!("{base}/search"),              get(people::get_by_name::<S>))
    .route(&format!("{base}/{{id}}"),              get(people::get_by_id::<S>))
    .route(
      &format!("{base}/admin/upgrade-role"),
      put(admin::upgrade_role::<S>),
    )
    .route(
      &format!("{base}/admin"),
      put(admin::update_by_name::<S>).delete(admin::delete_by_name::<S>),
    )
    .route(
      &format!("{base}/admin/{{id}}"),
      put(admin::update_by_id::<S>).delete(admin::delete_by_id::<S>),
    )
    .route(
      &format!("{base}/messages/{{id}}"),
      post(messages::send::<S>)
        .get(messages::get_by_id::<S>)
        .put(messages::update_by_id::<S>)
        .delete(messages::delete_by_id::<S>),
    )
    .route(
      &format!("{base}/messages/with/{{id}}"),
      get(messages::conversation::<S>),
    )
    .route(
      &format!("{base}/messages/from/{{id}}"),
      get(messages::from_sender::<S>),
    )
    .route(
      &format!("{base}/messages/search-with/{{id}}"),
      get(messages::search_conversation::<S>),
    )
    .route(
      &format!("{base}/messages/search-from/{{id}}"),
      get(messages::search_from_sender::<S>),
    )
    .layer(middleware::from_fn_with_state(state.clone(), policy::enforce::<S>))
    .layer(middleware::from_fn_with_state(
      state.clone(),
      auth::authenticate::<S>,
    ))
    .layer(TraceLayer::new_for_http())
    .with_state(state)
}

// ─── Integration tests ────────────────────────────────────────────────────────
