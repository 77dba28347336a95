//! Core domain models for Policy Hub
//!
//! This crate contains the shared data structures used across
//! the hub client: the catalog Index, Bundle documents, installed
//! policy records, the ApiResult envelope and the hub configuration.

pub mod config;
pub mod error;
pub mod models;

pub use config::{Credentials, HubConfig};
pub use error::{FetchError, HubError};
pub use models::*;
