//! Handlers for the `{base}/admin` surface.
//!
//! The policy layer restricts everything here to the ADMIN role, except the
//! role upgrade, which is self-service: any authenticated caller may promote
//! an account by proving knowledge of its password.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `PUT` | `{base}/admin/upgrade-role?raw_password=&id=` | promote to ADMIN |
//! | `PUT` | `{base}/admin/{id}` | patch by id |
//! | `PUT` | `{base}/admin?name=` | patch by name |
//! | `DELETE` | `{base}/admin/{id}` | delete by id, returns deleted view |
//! | `DELETE` | `{base}/admin?name=` | delete by name |

use axum::{
  Json,
  extract::{Path, Query, State},
};
use parley_core::{
  person::{PersonPatch, PersonView},
  store::{MessageStore, PersonStore},
};
use serde::Deserialize;

use crate::{AppState, error::ApiError};

#[derive(Debug, Deserialize)]
pub struct UpgradeParams {
  pub raw_password: String,
  pub id:           i64,
}

/// `PUT {base}/admin/upgrade-role?raw_password=&id=`
pub async fn upgrade_role<S>(
  State(state): State<AppState<S>>,
  Query(params): Query<UpgradeParams>,
) -> Result<Json<PersonView>, ApiError>
where
  S: PersonStore + MessageStore + Clone + Send + Sync + 'static,
{
  Ok(Json(state.people.upgrade_role(&params.raw_password, params.id).await?))
}

/// `PUT {base}/admin/{id}` — partial update.
pub async fn update_by_id<S>(
  State(state): State<AppState<S>>,
  Path(id): Path<i64>,
  Json(patch): Json<PersonPatch>,
) -> Result<Json<PersonView>, ApiError>
where
  S: PersonStore + MessageStore + Clone + Send + Sync + 'static,
{
  Ok(Json(state.people.update_by_id(patch, id).await?))
}

#[derive(Debug, Deserialize)]
pub struct NameParam {
  pub name: String,
}

/// `PUT {base}/admin?name=` — partial update by name.
pub async fn update_by_name<S>(
  State(state): State<AppState<S>>,
  Query(params): Query<NameParam>,
  Json(patch): Json<PersonPatch>,
) -> Result<Json<PersonView>, ApiError>
where
  S: PersonStore + MessageStore + Clone + Send + Sync + 'static,
{
  Ok(Json(state.people.update_by_name(patch, &params.name).await?))
}

/// `DELETE {base}/admin/{id}` — returns the deleted view.
pub async fn delete_by_id<S>(
  State(state): State<AppState<S>>,
  Path(id): Path<i64>,
) -> Result<Json<PersonView>, ApiError>
where
  S: PersonStore + MessageStore + Clone + Send + Sync + 'static,
{
  Ok(Json(state.people.delete_by_id(id).await?))
}

/// `DELETE {base}/admin?name=` — returns the deleted view.
pub async fn delete_by_name<S>(
  State(state): State<AppState<S>>,
  Query(params): Query<NameParam>,
) -> Result<Json<PersonView>, ApiError>
where
  S: PersonStore + MessageStore + Clone + Send + Sync + 'static,
{
  Ok(Json(state.people.delete_by_name(&params.name).await?))
}
