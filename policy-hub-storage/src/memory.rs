//! In-memory policy store for development and testing

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use policy_hub_core::{ApiResult, Bundle};
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use tokio::sync::RwLock;

use crate::{PolicyStore, StorageError};

/// A stored policy as reported by the store
#[derive(Debug, Clone, Serialize)]
struct PolicyRecord {
    #[serde(rename = "policyId")]
    policy_id: String,
    name: String,
    active: bool,
    created_at: DateTime<Utc>,
    last_updated: DateTime<Utc>,
    #[serde(skip)]
    bundle: Bundle,
}

impl PolicyRecord {
    fn to_value(&self, detail: bool) -> Result<Value, StorageError> {
        let mut value = serde_json::to_value(self)?;
        if detail {
            if let Value::Object(map) = &mut value {
                map.insert("policybundle".to_string(), self.bundle.clone().into_value());
            }
        }
        Ok(value)
    }
}

/// In-memory policy store keyed by `policyId`
pub struct InMemoryPolicyStore {
    policies: RwLock<BTreeMap<String, PolicyRecord>>,
}

impl InMemoryPolicyStore {
    pub fn new() -> Self {
        Self {
            policies: RwLock::new(BTreeMap::new()),
        }
    }

    /// Number of stored policies
    pub async fn len(&self) -> usize {
        self.policies.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.policies.read().await.is_empty()
    }

    async fn insert(&self, bundle: Bundle) -> Result<PolicyRecord, StorageError> {
        let policy_id = bundle
            .id()
            .filter(|id| !id.is_empty())
            .ok_or_else(|| StorageError::InvalidPolicy("bundle has no 'id'".into()))?
            .to_string();

        let now = Utc::now();
        let mut policies = self.policies.write().await;
        let created_at = policies
            .get(&policy_id)
            .map(|existing| existing.created_at)
            .unwrap_or(now);

        let record = PolicyRecord {
            policy_id: policy_id.clone(),
            name: bundle.name().to_string(),
            active: false,
            created_at,
            last_updated: now,
            bundle,
        };
        policies.insert(policy_id, record.clone());
        Ok(record)
    }

    async fn list(&self) -> Result<Value, StorageError> {
        let policies = self.policies.read().await;
        let records = policies
            .values()
            .map(|record| record.to_value(false))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Value::Array(records))
    }

    async fn get(&self, policy_id: &str) -> Result<Value, StorageError> {
        let policies = self.policies.read().await;
        let record = policies
            .get(policy_id)
            .ok_or_else(|| StorageError::NotFound(format!("Policy {} not found", policy_id)))?;
        record.to_value(true)
    }
}

impl Default for InMemoryPolicyStore {
    fn default() -> Self {
        Self::new()
    }
}

fn into_envelope(result: Result<Value, StorageError>, httpcode: u16) -> ApiResult {
    match result {
        Ok(payload) => ApiResult::success(payload, httpcode),
        Err(err) => {
            let code = err.httpcode();
            ApiResult::failure_with_code(err.to_string(), code)
        }
    }
}

#[async_trait]
impl PolicyStore for InMemoryPolicyStore {
    async fn get_policies(&self) -> ApiResult {
        into_envelope(self.list().await, 200)
    }

    async fn get_policy(&self, policy_id: &str) -> ApiResult {
        into_envelope(self.get(policy_id).await, 200)
    }

    async fn add_policy(&self, bundle: Bundle, detail: bool) -> ApiResult {
        let result = match self.insert(bundle).await {
            Ok(record) => {
                tracing::debug!("Stored policy '{}'", record.policy_id);
                record.to_value(detail)
            }
            Err(e) => Err(e),
        };
        into_envelope(result, 200)
    }
}
