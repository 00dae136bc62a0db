//! HTTP handlers, one module per resource.

pub mod admin;
pub mod messages;
pub mod people;
pub mod public;

use parley_core::store::Page;
use serde::Deserialize;

pub(crate) fn default_size() -> u32 { 20 }

/// Conventional offset-based pagination parameters; `page` is zero-based.
///
/// Kept flat (no `serde(flatten)`) because query-string deserialisation
/// cannot flatten numeric fields.
#[derive(Debug, Deserialize)]
pub struct PageParams {
  #[serde(default)]
  pub page: u32,
  #[serde(default = "default_size")]
  pub size: u32,
}

impl From<&PageParams> for Page {
  fn from(params: &PageParams) -> Self {
    Page { number: params.page, size: params.size }
  }
}
