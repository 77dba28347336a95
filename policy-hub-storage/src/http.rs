//! HTTP client for a remote policy-management API

use async_trait::async_trait;
use policy_hub_core::{ApiResult, Bundle, Credentials, HubConfig};
use reqwest::{Client, RequestBuilder, Response};
use serde_json::Value;

use crate::{PolicyStore, StorageError};

/// Policy store backed by `GET/POST {api_url}/policies`
pub struct HttpPolicyStore {
    client: Client,
    base_url: String,
    credentials: Option<Credentials>,
}

impl HttpPolicyStore {
    pub fn new(config: &HubConfig) -> Result<Self, StorageError> {
        let base_url = config
            .api_url
            .as_deref()
            .ok_or_else(|| StorageError::Config("policy API url is not configured".into()))?
            .trim_end_matches('/')
            .to_string();

        let client = Client::builder()
            .timeout(config.timeout)
            .danger_accept_invalid_certs(!config.verify_tls)
            .build()
            .map_err(|e| StorageError::Config(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url,
            credentials: config.credentials.clone(),
        })
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.credentials {
            Some(creds) => request.basic_auth(&creds.username, Some(&creds.password)),
            None => request,
        }
    }

    async fn send(&self, request: RequestBuilder, url: &str) -> ApiResult {
        match self.authorize(request).send().await {
            Ok(response) => envelope_from_response(response).await,
            Err(e) => {
                tracing::warn!("Policy API request to {} failed: {}", url, e);
                ApiResult::failure(format!("request to {} failed: {}", url, e))
            }
        }
    }
}

/// Maps a policy API response onto the envelope: 2xx is success with the
/// decoded body as payload, anything else is a failure carrying the body text
async fn envelope_from_response(response: Response) -> ApiResult {
    let status = response.status();
    let text = match response.text().await {
        Ok(text) => text,
        Err(e) => return ApiResult::failure(format!("failed to read response body: {}", e)),
    };

    if status.is_success() {
        let payload = if text.trim().is_empty() {
            Value::Object(Default::default())
        } else {
            serde_json::from_str(&text).unwrap_or(Value::String(text))
        };
        ApiResult::success(payload, status.as_u16())
    } else {
        ApiResult::failure_with_code(text, status.as_u16())
    }
}

#[async_trait]
impl PolicyStore for HttpPolicyStore {
    async fn get_policies(&self) -> ApiResult {
        let url = format!("{}/policies", self.base_url);
        self.send(self.client.get(&url), &url).await
    }

    async fn get_policy(&self, policy_id: &str) -> ApiResult {
        let url = format!("{}/policies/{}", self.base_url, policy_id);
        self.send(self.client.get(&url), &url).await
    }

    async fn add_policy(&self, bundle: Bundle, detail: bool) -> ApiResult {
        let url = format!("{}/policies", self.base_url);
        let request = self
            .client
            .post(&url)
            .query(&[("detail", detail)])
            .json(&bundle);
        self.send(request, &url).await
    }
}
