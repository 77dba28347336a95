//! Error types for the core crate

use thiserror::Error;

/// Why a single HTTP fetch of a JSON document failed
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    #[error("request to {url} failed: {reason}")]
    Transport { url: String, reason: String },

    #[error("server responded with {status} for {url}: {body}")]
    HttpStatus {
        url: String,
        status: u16,
        /// Trimmed response body, cut to a bounded prefix
        body: String,
    },

    #[error("response from {url} is not valid JSON: {reason}")]
    Parse { url: String, reason: String },
}

impl FetchError {
    pub fn url(&self) -> &str {
        match self {
            FetchError::Transport { url, .. }
            | FetchError::HttpStatus { url, .. }
            | FetchError::Parse { url, .. } => url,
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HubError {
    #[error("Could not fetch index - {0}")]
    IndexFetch(FetchError),

    #[error("Could not fetch bundle - {0}")]
    BundleFetch(FetchError),

    #[error("Malformed hub index: {0}")]
    MalformedIndex(String),

    #[error("Invalid bundle document: {0}")]
    InvalidBundle(String),

    #[error("Bundle name {0} not found in index")]
    BundleNotFound(String),

    #[error("Policy with ID ({0}) already installed - use force to override or specify target unique ID")]
    DuplicateIdentifier(String),

    /// Carries a failure message from an upstream client unchanged
    #[error("{0}")]
    Upstream(String),

    #[error("Invalid configuration: {0}")]
    Config(String),
}
