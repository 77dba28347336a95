//! Policy store clients for Policy Hub
//!
//! The installer lists and adds policies through the [`PolicyStore`] trait.
//! Two backends are provided: an in-memory store (for development and for
//! the local API) and an HTTP client for a remote policy-management API.

pub mod error;
pub mod http;
pub mod memory;
pub mod traits;

pub use error::StorageError;
pub use http::HttpPolicyStore;
pub use memory::InMemoryPolicyStore;
pub use traits::PolicyStore;
