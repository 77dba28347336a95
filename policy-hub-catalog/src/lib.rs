//! Policy Hub Catalog Client
//!
//! Fetches the hub index and bundle documents over HTTP(S).

mod client;

pub use client::{CatalogClient, MAX_ERROR_BODY_CHARS};
