//! Provider data handed to every resource and data source

use std::any::Any;
use std::sync::Arc;
use tokio::sync::OnceCell;

use crate::api::Client;
use crate::util::ProviderError;

pub struct ProviderMeta {
    pub client: Client,
    consistency_checks: bool,
    home_division: OnceCell<String>,
}

impl ProviderMeta {
    pub fn new(client: Client, consistency_checks: bool) -> Self {
        Self {
            client,
            consistency_checks,
            home_division: OnceCell::new(),
        }
    }

    pub fn consistency_checks(&self) -> bool {
        self.consistency_checks
    }

    /// Home division of the organization, fetched once per provider
    ///
    /// A failed lookup is not cached; the next caller tries again.
    pub async fn home_division_id(&self) -> Result<String, ProviderError> {
        self.home_division
            .get_or_try_init(|| async {
                let (division, _) = self
                    .client
                    .authorization()
                    .home_division()
                    .await
                    .map_err(|e| {
                        ProviderError::from_api_error(
                            "genesyscloud_provider",
                            "Failed to get home division",
                            &e,
                        )
                    })?;
                tracing::debug!("Home division is {} ({})", division.name, division.id);
                Ok(division.id)
            })
            .await
            .cloned()
    }

    /// Downcasts the opaque provider data a resource receives in `configure`
    pub fn from_provider_data(
        provider_data: Option<Arc<dyn Any + Send + Sync>>,
    ) -> Option<Arc<ProviderMeta>> {
        provider_data.and_then(|data| data.downcast::<ProviderMeta>().ok())
    }
}
