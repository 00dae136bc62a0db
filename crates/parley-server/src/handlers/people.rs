//! Handlers for the authenticated person-lookup endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET` | `{base}` | `?name=&page=&size=` paginated list/search |
//! | `GET` | `{base}/{id}` | 404 if not found |
//! | `GET` | `{base}/search?name=` | lookup by exact name |

use axum::{
  Json,
  extract::{Path, Query, State},
};
use parley_core::{
  person::PersonView,
  store::{MessageStore, PersonStore},
};
use serde::Deserialize;

use crate::{AppState, error::ApiError, handlers::default_size};

#[derive(Debug, Deserialize)]
pub struct ListParams {
  pub name: Option<String>,
  #[serde(default)]
  pub page: u32,
  #[serde(default = "default_size")]
  pub size: u32,
}

/// `GET {base}[?name=&page=&size=]`
pub async fn list<S>(
  State(state): State<AppState<S>>,
  Query(params): Query<ListParams>,
) -> Result<Json<Vec<PersonView>>, ApiError>
where
  S: PersonStore + MessageStore + Clone + Send + Sync + 'static,
{
  let page = parley_core::store::Page { number: params.page, size: params.size };
  let people = state.people.list(params.name, page).await?;
  Ok(Json(people))
}

/// `GET {base}/{id}`
pub async fn get_by_id<S>(
  State(state): State<AppState<S>>,
  Path(id): Path<i64>,
) -> Result<Json<PersonView>, ApiError>
where
  S: PersonStore + MessageStore + Clone + Send + Sync + 'static,
{
  Ok(Json(state.people.get_by_id(id).await?))
}

#[derive(Debug, Deserialize)]
pub struct NameParam {
  pub name: String,
}

/// `GET {base}/search?name=` — exact-name lookup.
pub async fn get_by_name<S>(
  State(state): State<AppState<S>>,
  Query(params): Query<NameParam>,
) -> Result<Json<PersonView>, ApiError>
where
  S: PersonStore + MessageStore + Clone + Send + Sync + 'static,
{
  Ok(Json(state.people.get_by_name(&params.name).await?))
}
