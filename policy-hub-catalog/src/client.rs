use policy_hub_core::{ApiResult, Bundle, Credentials, FetchError, HubConfig, HubError};
use reqwest::Client;
use serde_json::Value;

/// Longest response body kept on an HTTP status error
pub const MAX_ERROR_BODY_CHARS: usize = 512;

/// Client for a hub's `index.json` and the bundle documents it lists.
///
/// Each fetch is a single attempt; there is no retry and no caching.
#[derive(Clone)]
pub struct CatalogClient {
    client: Client,
}

impl CatalogClient {
    /// Builds the HTTP client with the config's timeout and certificate policy
    pub fn new(config: &HubConfig) -> Result<Self, HubError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .danger_accept_invalid_certs(!config.verify_tls)
            .build()
            .map_err(|e| HubError::Config(format!("failed to build HTTP client: {}", e)))?;
        Ok(Self { client })
    }

    /// Fetch and decode `<base_url>/index.json`
    pub async fn fetch_index(
        &self,
        base_url: &str,
        credentials: Option<&Credentials>,
    ) -> Result<Value, HubError> {
        let url = format!("{}/index.json", base_url.trim_end_matches('/'));
        tracing::debug!("Fetching hub index from {}", url);
        self.get_json(&url, credentials)
            .await
            .map_err(HubError::IndexFetch)
    }

    /// Enveloped [`CatalogClient::fetch_index`] for the configured hub.
    ///
    /// On failure the httpcode stays at its unset default.
    pub async fn get_policies(&self, config: &HubConfig) -> ApiResult {
        match self
            .fetch_index(&config.hub_url, config.hub_credentials.as_ref())
            .await
        {
            Ok(index) => ApiResult::success(index, 200),
            Err(e) => {
                tracing::warn!("{}", e);
                ApiResult::failure(e.to_string())
            }
        }
    }

    /// Download the bundle document at `location`
    pub async fn fetch_bundle(
        &self,
        location: &str,
        credentials: Option<&Credentials>,
    ) -> Result<Bundle, HubError> {
        tracing::debug!("Fetching bundle from {}", location);
        let document = self
            .get_json(location, credentials)
            .await
            .map_err(HubError::BundleFetch)?;
        Bundle::from_value(document)
    }

    async fn get_json(
        &self,
        url: &str,
        credentials: Option<&Credentials>,
    ) -> Result<Value, FetchError> {
        let mut request = self.client.get(url);
        if let Some(creds) = credentials {
            request = request.basic_auth(&creds.username, Some(&creds.password));
        }

        let response = request.send().await.map_err(|e| FetchError::Transport {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

        let status = response.status();
        let body = response.bytes().await.map_err(|e| FetchError::Transport {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

        if !status.is_success() {
            return Err(FetchError::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
                body: error_body(&body),
            });
        }

        serde_json::from_slice(&body).map_err(|e| FetchError::Parse {
            url: url.to_string(),
            reason: e.to_string(),
        })
    }
}

fn error_body(body: &[u8]) -> String {
    let text = String::from_utf8_lossy(body);
    let text = text.trim();
    match text.char_indices().nth(MAX_ERROR_BODY_CHARS) {
        Some((cut, _)) => format!("{}…", &text[..cut]),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_body_is_bounded() {
        assert_eq!(error_body(b"  not found \n"), "not found");

        let long = "é".repeat(MAX_ERROR_BODY_CHARS + 100);
        let kept = error_body(long.as_bytes());
        assert_eq!(kept.chars().count(), MAX_ERROR_BODY_CHARS + 1);
        assert!(kept.ends_with('…'));
    }
}
