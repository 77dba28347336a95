//! Core domain models

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::HubError;

/// Catalog entry type tag for installable policy bundles
pub const BUNDLE_ENTRY_TYPE: &str = "bundle";

/// Status code left on envelopes that never reached a server
pub const UNSET_HTTP_CODE: u16 = 500;

/// Uniform result returned by every public hub and policy store operation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiResult {
    pub success: bool,
    #[serde(default = "empty_payload")]
    pub payload: Value,
    #[serde(default = "unset_http_code")]
    pub httpcode: u16,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

fn empty_payload() -> Value {
    Value::Object(Map::new())
}

fn unset_http_code() -> u16 {
    UNSET_HTTP_CODE
}

impl ApiResult {
    pub fn success(payload: Value, httpcode: u16) -> Self {
        Self {
            success: true,
            payload,
            httpcode,
            error: None,
        }
    }

    /// Failure with the default (unset) status code
    pub fn failure(error: impl Into<String>) -> Self {
        Self::failure_with_code(error, UNSET_HTTP_CODE)
    }

    pub fn failure_with_code(error: impl Into<String>, httpcode: u16) -> Self {
        Self {
            success: false,
            payload: empty_payload(),
            httpcode,
            error: Some(error.into()),
        }
    }

    /// Error message of a failed envelope, empty when none was recorded
    pub fn error_message(&self) -> &str {
        self.error.as_deref().unwrap_or("")
    }
}

impl From<HubError> for ApiResult {
    fn from(err: HubError) -> Self {
        ApiResult::failure(err.to_string())
    }
}

/// Typed view of one published artifact listed in the hub index
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogEntry {
    #[serde(rename = "type")]
    pub entry_type: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    /// Fields this client does not interpret
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl CatalogEntry {
    /// Typed view of a raw index entry, `None` when it lacks a string `type` or `name`
    pub fn from_value(value: &Value) -> Option<Self> {
        serde_json::from_value(value.clone()).ok()
    }

    pub fn is_bundle(&self) -> bool {
        self.entry_type == BUNDLE_ENTRY_TYPE
    }
}

fn is_bundle_named(entry: &Value, name: &str) -> bool {
    entry.get("type").and_then(Value::as_str) == Some(BUNDLE_ENTRY_TYPE)
        && entry.get("name").and_then(Value::as_str) == Some(name)
}

/// The hub's top-level listing document (`index.json`)
///
/// Entries stay raw JSON: only bundle entries are interpreted, so entries
/// of other types may carry any shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HubIndex {
    pub content: Vec<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl HubIndex {
    pub fn from_value(value: Value) -> Result<Self, HubError> {
        serde_json::from_value(value).map_err(|e| HubError::MalformedIndex(e.to_string()))
    }

    /// First bundle entry named `name`, in document order
    pub fn find_bundle(&self, name: &str) -> Option<&Value> {
        self.content.iter().find(|entry| is_bundle_named(entry, name))
    }

    pub fn bundles(&self) -> impl Iterator<Item = CatalogEntry> + '_ {
        self.content
            .iter()
            .filter_map(CatalogEntry::from_value)
            .filter(CatalogEntry::is_bundle)
    }

    /// Download location of the bundle named `name`
    pub fn resolve_location(&self, name: &str) -> Result<&str, HubError> {
        let entry = self
            .find_bundle(name)
            .ok_or_else(|| HubError::BundleNotFound(name.to_string()))?;
        entry.get("location").and_then(Value::as_str).ok_or_else(|| {
            HubError::MalformedIndex(format!("bundle entry '{}' has no location", name))
        })
    }
}

/// A policy bundle document downloaded from the hub
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Bundle {
    document: Map<String, Value>,
}

impl Bundle {
    /// Accepts any JSON object carrying a string `name`
    pub fn from_value(value: Value) -> Result<Self, HubError> {
        let document = match value {
            Value::Object(map) => map,
            other => {
                return Err(HubError::InvalidBundle(format!(
                    "expected a JSON object, got {}",
                    json_kind(&other)
                )))
            }
        };
        match document.get("name") {
            Some(Value::String(_)) => Ok(Self { document }),
            Some(_) => Err(HubError::InvalidBundle("'name' is not a string".into())),
            None => Err(HubError::InvalidBundle("missing 'name' field".into())),
        }
    }

    pub fn name(&self) -> &str {
        self.document
            .get("name")
            .and_then(Value::as_str)
            .unwrap_or_default()
    }

    pub fn id(&self) -> Option<&str> {
        self.document.get("id").and_then(Value::as_str)
    }

    /// Same document with `id` set, replacing any previous value
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.document.insert("id".to_string(), Value::String(id.into()));
        self
    }

    pub fn document(&self) -> &Map<String, Value> {
        &self.document
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.document)
    }
}

/// Identifier a bundle is installed under: the caller's target, else the bundle name
pub fn install_identifier<'a>(bundle: &'a Bundle, target_id: Option<&'a str>) -> &'a str {
    match target_id {
        Some(id) if !id.is_empty() => id,
        _ => bundle.name(),
    }
}

/// A policy already present in the policy store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstalledPolicy {
    #[serde(rename = "policyId")]
    pub policy_id: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl InstalledPolicy {
    /// Decodes a policy store listing payload
    pub fn list_from_value(value: Value) -> Result<Vec<Self>, HubError> {
        serde_json::from_value(value)
            .map_err(|e| HubError::Upstream(format!("malformed policy listing: {}", e)))
    }
}

/// Request to install a single bundle from the hub
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InstallRequest {
    pub bundle_name: String,
    #[serde(default)]
    pub target_id: Option<String>,
    #[serde(default)]
    pub force: bool,
    /// Basic auth sent when downloading the bundle; accepted but never echoed
    #[serde(default, skip_serializing)]
    pub credentials: Option<crate::Credentials>,
}

impl InstallRequest {
    pub fn new(bundle_name: impl Into<String>) -> Self {
        Self {
            bundle_name: bundle_name.into(),
            ..Default::default()
        }
    }

    pub fn target_id(mut self, target_id: impl Into<String>) -> Self {
        self.target_id = Some(target_id.into());
        self
    }

    pub fn force(mut self, force: bool) -> Self {
        self.force = force;
        self
    }

    pub fn credentials(mut self, credentials: crate::Credentials) -> Self {
        self.credentials = Some(credentials);
        self
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn index() -> HubIndex {
        HubIndex::from_value(json!({
            "content": [
                { "type": "gate", "name": "foo", "location": "http://hub/gate.json" },
                { "type": "bundle", "name": "foo", "location": "http://hub/foo-1.json" },
                { "type": "bundle", "name": "foo", "location": "http://hub/foo-2.json" },
                { "type": "bundle", "name": "baz", "location": "http://hub/baz.json", "version": "2" }
            ]
        }))
        .unwrap()
    }

    #[test]
    fn test_find_bundle_first_match_wins() {
        let index = index();
        for _ in 0..3 {
            assert_eq!(index.resolve_location("foo").unwrap(), "http://hub/foo-1.json");
        }
    }

    #[test]
    fn test_non_bundle_entries_are_preserved_but_ignored() {
        let index = index();
        assert_eq!(index.content.len(), 4);
        assert_eq!(index.bundles().count(), 3);
        assert_eq!(index.content[3]["version"], "2");
    }

    #[test]
    fn test_entries_of_other_types_need_no_name() {
        let index = HubIndex::from_value(json!({
            "content": [
                { "type": "gate", "id": "g1", "location": "http://hub/gate.json" },
                { "type": "trigger", "name": 7 },
                "legacy",
                { "type": "bundle", "name": "foo", "location": "http://hub/foo.json" }
            ]
        }))
        .unwrap();
        assert_eq!(index.resolve_location("foo").unwrap(), "http://hub/foo.json");
        assert_eq!(index.content.len(), 4);
        assert_eq!(index.bundles().count(), 1);
    }

    #[test]
    fn test_missing_bundle_is_not_found() {
        let err = index().resolve_location("bar").unwrap_err();
        assert_eq!(err, HubError::BundleNotFound("bar".into()));
        assert!(err.to_string().contains("bar"));
    }

    #[test]
    fn test_index_without_content_is_malformed() {
        let err = HubIndex::from_value(json!({ "items": [] })).unwrap_err();
        assert!(matches!(err, HubError::MalformedIndex(_)));
    }

    #[test]
    fn test_bundle_entry_without_location_is_malformed() {
        let index = HubIndex::from_value(json!({
            "content": [{ "type": "bundle", "name": "foo" }]
        }))
        .unwrap();
        assert!(matches!(
            index.resolve_location("foo"),
            Err(HubError::MalformedIndex(_))
        ));
    }

    #[test]
    fn test_bundle_requires_name() {
        assert!(Bundle::from_value(json!({ "name": "mypolicy" })).is_ok());
        assert!(matches!(
            Bundle::from_value(json!({ "id": "x" })),
            Err(HubError::InvalidBundle(_))
        ));
        assert!(matches!(
            Bundle::from_value(json!(["name"])),
            Err(HubError::InvalidBundle(_))
        ));
    }

    #[test]
    fn test_install_identifier_defaults_to_name() {
        let bundle = Bundle::from_value(json!({ "name": "mypolicy" })).unwrap();
        assert_eq!(install_identifier(&bundle, None), "mypolicy");
        assert_eq!(install_identifier(&bundle, Some("")), "mypolicy");
        assert_eq!(install_identifier(&bundle, Some("custom-1")), "custom-1");
    }

    #[test]
    fn test_with_id_overwrites_existing_id() {
        let bundle = Bundle::from_value(json!({ "name": "mypolicy", "id": "old" })).unwrap();
        let stamped = bundle.with_id("new");
        assert_eq!(stamped.id(), Some("new"));
        assert_eq!(stamped.into_value(), json!({ "name": "mypolicy", "id": "new" }));
    }

    #[test]
    fn test_failure_envelope_defaults() {
        let result = ApiResult::failure("boom");
        assert!(!result.success);
        assert_eq!(result.httpcode, UNSET_HTTP_CODE);
        assert_eq!(result.payload, json!({}));
        assert_eq!(result.error_message(), "boom");

        let serialized = serde_json::to_value(ApiResult::success(json!([1]), 200)).unwrap();
        assert_eq!(serialized, json!({ "success": true, "payload": [1], "httpcode": 200 }));
    }

    #[test]
    fn test_installed_policy_listing() {
        let policies = InstalledPolicy::list_from_value(json!([
            { "policyId": "a", "name": "first" },
            { "policyId": "b" }
        ]))
        .unwrap();
        assert_eq!(policies[0].policy_id, "a");
        assert_eq!(policies[0].extra["name"], "first");

        assert!(InstalledPolicy::list_from_value(json!({ "policyId": "a" })).is_err());
    }

    #[test]
    fn test_install_request_accepts_credentials_without_echoing_them() {
        let request: InstallRequest = serde_json::from_value(json!({
            "bundle_name": "private",
            "credentials": { "username": "reader", "password": "s3cret" }
        }))
        .unwrap();
        assert_eq!(
            request.credentials,
            Some(crate::Credentials::new("reader", "s3cret"))
        );
        assert!(!request.force);

        let echoed = serde_json::to_value(&request).unwrap();
        assert!(echoed.get("credentials").is_none());
        assert!(!format!("{:?}", request).contains("s3cret"));
    }
}
