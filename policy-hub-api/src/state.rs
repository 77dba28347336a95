//! Application state shared across handlers

use policy_hub_core::{HubConfig, HubError};
use policy_hub_installer::Installer;
use policy_hub_storage::{InMemoryPolicyStore, PolicyStore};
use std::sync::Arc;

/// Shared application state
pub struct AppState {
    pub policy_store: Arc<dyn PolicyStore>,
    pub installer: Installer,
}

impl AppState {
    /// Hub client backed by a fresh in-memory policy store
    pub fn new(config: HubConfig) -> Result<Self, HubError> {
        Self::with_store(config, Arc::new(InMemoryPolicyStore::new()))
    }

    /// Create with a custom policy store backend
    pub fn with_store(config: HubConfig, store: Arc<dyn PolicyStore>) -> Result<Self, HubError> {
        let installer = Installer::new(config, store.clone())?;
        Ok(Self {
            policy_store: store,
            installer,
        })
    }

    pub fn config(&self) -> &HubConfig {
        self.installer.config()
    }
}
