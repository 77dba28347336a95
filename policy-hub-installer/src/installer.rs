use futures::stream::{self, StreamExt};
use policy_hub_catalog::CatalogClient;
use policy_hub_core::{
    install_identifier, ApiResult, Bundle, HubConfig, HubError, HubIndex, InstallRequest,
    InstalledPolicy,
};
use policy_hub_storage::PolicyStore;
use std::sync::Arc;

/// Default number of in-flight installs for [`Installer::install_many`]
pub const DEFAULT_CONCURRENCY: usize = 4;

/// Why an install stopped before submission
enum Abort {
    Error(HubError),
    /// Failure envelope from the policy store, returned unchanged
    Store(ApiResult),
}

impl From<HubError> for Abort {
    fn from(err: HubError) -> Self {
        Abort::Error(err)
    }
}

/// Installs hub bundles into a policy store.
///
/// The duplicate check and the final submission are two separate store
/// calls, so concurrent installs targeting the same identifier can both
/// pass the check. Callers that need exclusivity must serialize by
/// identifier themselves.
pub struct Installer {
    config: HubConfig,
    catalog: CatalogClient,
    store: Arc<dyn PolicyStore>,
}

impl Installer {
    pub fn new(config: HubConfig, store: Arc<dyn PolicyStore>) -> Result<Self, HubError> {
        let catalog = CatalogClient::new(&config)?;
        Ok(Self::with_catalog(config, catalog, store))
    }

    pub fn with_catalog(
        config: HubConfig,
        catalog: CatalogClient,
        store: Arc<dyn PolicyStore>,
    ) -> Self {
        Self {
            config,
            catalog,
            store,
        }
    }

    pub fn config(&self) -> &HubConfig {
        &self.config
    }

    pub fn catalog(&self) -> &CatalogClient {
        &self.catalog
    }

    /// Install one bundle. Never fails outright: every outcome is an envelope,
    /// and a submission result from the store is returned as-is.
    pub async fn install(&self, request: &InstallRequest) -> ApiResult {
        tracing::info!("Installing bundle '{}' from {}", request.bundle_name, self.config.hub_url);

        match self.run(request).await {
            Ok(result) => {
                if result.success {
                    tracing::info!("Installed bundle '{}'", request.bundle_name);
                } else {
                    tracing::warn!(
                        "Policy store rejected bundle '{}': {}",
                        request.bundle_name,
                        result.error_message()
                    );
                }
                result
            }
            Err(Abort::Error(err)) => {
                tracing::warn!("Install of '{}' failed: {}", request.bundle_name, err);
                ApiResult::from(err)
            }
            Err(Abort::Store(result)) => {
                tracing::warn!(
                    "Listing installed policies failed: {}",
                    result.error_message()
                );
                result
            }
        }
    }

    /// Install several bundles with at most `concurrency` in flight.
    ///
    /// Results are returned in request order. Each bundle still goes through
    /// its steps in order; nothing is shared between installs.
    pub async fn install_many(
        &self,
        requests: &[InstallRequest],
        concurrency: usize,
    ) -> Vec<ApiResult> {
        let installs: Vec<_> = requests.iter().map(|request| self.install(request)).collect();
        stream::iter(installs)
            .buffered(concurrency.max(1))
            .collect()
            .await
    }

    async fn run(&self, request: &InstallRequest) -> Result<ApiResult, Abort> {
        let listing = self.catalog.get_policies(&self.config).await;
        if !listing.success {
            return Err(HubError::Upstream(listing.error.unwrap_or_default()).into());
        }
        let index = HubIndex::from_value(listing.payload)?;

        let location = index.resolve_location(&request.bundle_name)?;
        tracing::debug!("Resolved bundle '{}' to {}", request.bundle_name, location);

        let fetched = self
            .catalog
            .fetch_bundle(location, request.credentials.as_ref())
            .await?;

        let bundle_id = install_identifier(&fetched, request.target_id.as_deref()).to_string();
        let bundle = fetched.with_id(bundle_id.clone());

        if request.force {
            tracing::debug!("Skipping duplicate check for '{}' (force)", bundle_id);
        } else {
            self.check_not_installed(&bundle_id).await?;
        }

        Ok(self.submit(bundle).await)
    }

    async fn check_not_installed(&self, bundle_id: &str) -> Result<(), Abort> {
        let installed = self.store.get_policies().await;
        if !installed.success {
            return Err(Abort::Store(installed));
        }

        let policies = InstalledPolicy::list_from_value(installed.payload)?;
        if policies.iter().any(|p| p.policy_id == bundle_id) {
            return Err(HubError::DuplicateIdentifier(bundle_id.to_string()).into());
        }
        Ok(())
    }

    async fn submit(&self, bundle: Bundle) -> ApiResult {
        tracing::debug!("Submitting policy '{}'", bundle.id().unwrap_or_default());
        self.store.add_policy(bundle, true).await
    }
}
