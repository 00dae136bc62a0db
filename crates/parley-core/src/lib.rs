//! Core types and trait definitions for the parley messaging backend.
//!
//! This crate is deliberately free of HTTP and database dependencies.
//! All other crates depend on it; it depends on nothing proprietary.

pub mod error;
pub mod message;
pub mod person;
pub mod store;

pub use error::{Error, Result};
