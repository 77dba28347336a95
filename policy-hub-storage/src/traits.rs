//! Storage traits defining the interface to the policy store

use async_trait::async_trait;
use policy_hub_core::{ApiResult, Bundle};

/// Operations the installer needs from the local policy-management service.
///
/// Every call reports through an [`ApiResult`] envelope; implementations
/// never panic or return transport errors directly.
#[async_trait]
pub trait PolicyStore: Send + Sync {
    /// List installed policies; on success the payload is an array of
    /// records each carrying at least `policyId`
    async fn get_policies(&self) -> ApiResult;

    /// Get one installed policy by its `policyId`
    async fn get_policy(&self, policy_id: &str) -> ApiResult;

    /// Add a policy bundle; `detail` asks for the full bundle in the reply
    async fn add_policy(&self, bundle: Bundle, detail: bool) -> ApiResult;
}
