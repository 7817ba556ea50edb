use async_trait::async_trait;

use super::RESOURCE_TYPE;
use crate::api::external_contacts::ExternalSource;
use crate::api::{ApiError, ApiResponse, Client};
use crate::resource_cache::{CacheInterface, ResourceCache};
use crate::util::{ProviderError, RetryOutcome};

#[async_trait]
pub trait ExternalSourceProxy: Send + Sync {
    /// Active and inactive sources, optionally filtered by name
    async fn get_all_external_sources(
        &self,
        name: Option<&str>,
    ) -> Result<(Vec<ExternalSource>, Option<ApiResponse>), ApiError>;

    /// Retryable while the name may still appear
    async fn get_external_source_id_by_name(&self, name: &str) -> RetryOutcome<String>;

    async fn get_external_source_by_id(
        &self,
        id: &str,
    ) -> Result<(ExternalSource, ApiResponse), ApiError>;

    async fn create_external_source(
        &self,
        source: &ExternalSource,
    ) -> Result<(ExternalSource, ApiResponse), ApiError>;

    async fn update_external_source(
        &self,
        id: &str,
        source: &ExternalSource,
    ) -> Result<(ExternalSource, ApiResponse), ApiError>;

    async fn delete_external_source(&self, id: &str) -> Result<ApiResponse, ApiError>;
}

pub struct RestExternalSourceProxy {
    client: Client,
    cache: ResourceCache<ExternalSource>,
}

impl RestExternalSourceProxy {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            cache: ResourceCache::new(),
        }
    }
}

#[async_trait]
impl ExternalSourceProxy for RestExternalSourceProxy {
    async fn get_all_external_sources(
        &self,
        name: Option<&str>,
    ) -> Result<(Vec<ExternalSource>, Option<ApiResponse>), ApiError> {
        let (sources, response) = self
            .client
            .external_contacts()
            .list_all_external_sources(name)
            .await?;
        for source in &sources {
            if let Some(id) = source.id.as_deref() {
                self.cache.set(id, source.clone());
            }
        }
        Ok((sources, response))
    }

    async fn get_external_source_id_by_name(&self, name: &str) -> RetryOutcome<String> {
        let (sources, response) = match self.get_all_external_sources(Some(name)).await {
            Ok(listing) => listing,
            Err(e) => {
                return RetryOutcome::NonRetryable(ProviderError::from_api_error(
                    RESOURCE_TYPE,
                    "Failed to get external sources",
                    &e,
                ))
            }
        };

        if sources.is_empty() {
            return RetryOutcome::Retryable(ProviderError::api(
                RESOURCE_TYPE,
                format!("No external sources found with name {}", name),
                response,
            ));
        }

        // Filtered listings may still hold other names
        match sources
            .into_iter()
            .find(|s| s.name.as_deref() == Some(name))
            .and_then(|s| s.id)
        {
            Some(id) => {
                tracing::debug!("Retrieved the external source id {} by name {}", id, name);
                RetryOutcome::Success(id)
            }
            None => RetryOutcome::Retryable(ProviderError::api(
                RESOURCE_TYPE,
                format!("Unable to find external sources with name {}", name),
                response,
            )),
        }
    }

    async fn get_external_source_by_id(
        &self,
        id: &str,
    ) -> Result<(ExternalSource, ApiResponse), ApiError> {
        if let Some(source) = self.cache.get(id) {
            let path = format!("/api/v2/externalcontacts/externalsources/{}", id);
            return Ok((source, ApiResponse::new(200, "GET", &path)));
        }
        self.client.external_contacts().get_external_source(id).await
    }

    async fn create_external_source(
        &self,
        source: &ExternalSource,
    ) -> Result<(ExternalSource, ApiResponse), ApiError> {
        self.client
            .external_contacts()
            .create_external_source(source)
            .await
    }

    async fn update_external_source(
        &self,
        id: &str,
        source: &ExternalSource,
    ) -> Result<(ExternalSource, ApiResponse), ApiError> {
        self.cache.delete(id);
        self.client
            .external_contacts()
            .update_external_source(id, source)
            .await
    }

    /// Evicts first: a 404 on delete still counts as deleted
    async fn delete_external_source(&self, id: &str) -> Result<ApiResponse, ApiError> {
        self.cache.delete(id);
        self.client
            .external_contacts()
            .delete_external_source(id)
            .await
    }
}
