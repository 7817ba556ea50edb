use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tfcore::resource::{
    ConfigureResourceRequest, ConfigureResourceResponse, CreateResourceRequest,
    CreateResourceResponse, DeleteResourceRequest, DeleteResourceResponse, ReadResourceRequest,
    ReadResourceResponse, ResourceWithConfigure, UpdateResourceRequest, UpdateResourceResponse,
};
use tfcore::{Diagnostics, Resource, ResourceData, Schema};

use super::model::{flatten_external_source, ExternalSourceModel};
use super::proxy::{ExternalSourceProxy, RestExternalSourceProxy};
use super::schema::external_source_schema;
use super::RESOURCE_TYPE;
use crate::api::external_contacts::ExternalSource;
use crate::consistency_checker::{ConsistencyCheck, ConsistencyChecker};
use crate::provider_meta::ProviderMeta;
use crate::resource_exporter::{ResourceExporter, ResourceIdMetaMap, ResourceMeta};
use crate::resources::{configure_provider_meta, decode_model, not_configured};
use crate::util::{
    error_kind, is_version_mismatch, retry_when, with_retries, with_retries_for_read, ErrorKind,
    ProviderError, RetryOutcome, DEFAULT_READ_TIMEOUT,
};

const DELETE_TIMEOUT: Duration = Duration::from_secs(30);

pub struct ExternalSourceResource {
    proxy: Option<Arc<dyn ExternalSourceProxy>>,
    consistency_checks: bool,
}

impl Default for ExternalSourceResource {
    fn default() -> Self {
        Self::new()
    }
}

impl ExternalSourceResource {
    pub fn new() -> Self {
        Self {
            proxy: None,
            consistency_checks: true,
        }
    }

    pub fn with_proxy(proxy: Arc<dyn ExternalSourceProxy>, consistency_checks: bool) -> Self {
        Self {
            proxy: Some(proxy),
            consistency_checks,
        }
    }

    pub fn from_meta(meta: Arc<ProviderMeta>) -> Self {
        Self::with_proxy(
            Arc::new(RestExternalSourceProxy::new(meta.client.clone())),
            meta.consistency_checks(),
        )
    }

    fn proxy(&self) -> Result<&dyn ExternalSourceProxy, Diagnostics> {
        self.proxy.as_deref().ok_or_else(not_configured)
    }

    async fn create_external_source(&self, data: &mut ResourceData) -> Result<(), Diagnostics> {
        let proxy = self.proxy()?;
        let model: ExternalSourceModel = decode_model(data, RESOURCE_TYPE)?;
        let input = model.to_external_source();

        tracing::info!("Creating external source {}", model.name);
        let (source, _) = proxy.create_external_source(&input).await.map_err(|e| {
            ProviderError::from_api_error(
                RESOURCE_TYPE,
                format!("Failed to create external source {}", model.name),
                &e,
            )
        })?;

        let id = source.id.filter(|id| !id.is_empty()).ok_or_else(|| {
            ProviderError::api(
                RESOURCE_TYPE,
                format!("Created external source {} has no id", model.name),
                None,
            )
        })?;
        data.set_id(id.clone());
        tracing::info!("Created external source {} {}", model.name, id);

        self.read_external_source(proxy, data, true).await
    }

    async fn read_external_source(
        &self,
        proxy: &dyn ExternalSourceProxy,
        data: &mut ResourceData,
        check: bool,
    ) -> Result<(), Diagnostics> {
        let checker = ConsistencyCheck::new(
            data,
            &external_source_schema(),
            self.consistency_checks && check,
            RESOURCE_TYPE,
        );
        let checker = &checker;

        tracing::info!("Reading external source {}", data.id());

        with_retries_for_read(data, DEFAULT_READ_TIMEOUT, move |mut fresh| async move {
            let id = fresh.id();
            let source = match proxy.get_external_source_by_id(&id).await {
                Ok((source, _)) => source,
                Err(e) => {
                    let err = ProviderError::from_api_error(
                        RESOURCE_TYPE,
                        format!("Failed to read external source {}", id),
                        &e,
                    );
                    return if err.is_not_found() {
                        RetryOutcome::Retryable(err)
                    } else {
                        RetryOutcome::NonRetryable(err)
                    };
                }
            };

            flatten_external_source(&source, &mut fresh);
            tracing::debug!(
                "Read external source {} {}",
                id,
                source.name.as_deref().unwrap_or_default()
            );
            checker.check_state(&fresh).map(|_| fresh)
        })
        .await?;

        Ok(())
    }

    async fn update_external_source(&self, data: &mut ResourceData) -> Result<(), Diagnostics> {
        let proxy = self.proxy()?;
        let model: ExternalSourceModel = decode_model(data, RESOURCE_TYPE)?;
        let input = model.to_external_source();

        tracing::info!("Updating external source {}", model.name);

        let id = data.id();
        let id = id.as_str();
        let name = model.name.as_str();
        let input = &input;
        retry_when(is_version_mismatch, &[], move || async move {
            let (current, _) = proxy.get_external_source_by_id(id).await.map_err(|e| {
                ProviderError::from_api_error(
                    RESOURCE_TYPE,
                    format!("Failed to read external source {}", id),
                    &e,
                )
            })?;
            let body = ExternalSource {
                version: current.version,
                ..input.clone()
            };
            proxy.update_external_source(id, &body).await.map_err(|e| {
                ProviderError::from_api_error(
                    RESOURCE_TYPE,
                    format!("Failed to update external source {}", name),
                    &e,
                )
            })
        })
        .await?;

        tracing::info!("Updated external source {}", name);
        self.read_external_source(proxy, data, true).await
    }

    async fn delete_external_source(&self, data: &ResourceData) -> Result<(), Diagnostics> {
        let proxy = self.proxy()?;
        let id = data.id();
        let id = id.as_str();

        tracing::info!("Deleting external source {}", id);
        match proxy.delete_external_source(id).await {
            Ok(_) => {}
            Err(e) if error_kind(&e) == ErrorKind::NotFound => {
                tracing::info!("External source {} already deleted", id);
                return Ok(());
            }
            Err(e) => {
                return Err(ProviderError::from_api_error(
                    RESOURCE_TYPE,
                    format!("Failed to delete external source {}", id),
                    &e,
                )
                .into())
            }
        }

        with_retries(DELETE_TIMEOUT, move || async move {
            match proxy.get_external_source_by_id(id).await {
                Err(e) if error_kind(&e) == ErrorKind::NotFound => {
                    tracing::info!("Deleted external source {}", id);
                    RetryOutcome::Success(())
                }
                Err(e) => RetryOutcome::NonRetryable(ProviderError::from_api_error(
                    RESOURCE_TYPE,
                    format!("Error deleting external source {}", id),
                    &e,
                )),
                Ok((_, response)) => RetryOutcome::Retryable(ProviderError::api(
                    RESOURCE_TYPE,
                    format!("External source {} still exists", id),
                    Some(response),
                )),
            }
        })
        .await?;

        Ok(())
    }
}

#[async_trait]
impl Resource for ExternalSourceResource {
    fn type_name(&self) -> &str {
        RESOURCE_TYPE
    }

    fn schema(&self) -> Schema {
        external_source_schema()
    }

    async fn create(&self, request: CreateResourceRequest) -> CreateResourceResponse {
        let mut data = ResourceData::new_resource(request.planned_state);
        let diagnostics = self
            .create_external_source(&mut data)
            .await
            .err()
            .unwrap_or_default();

        CreateResourceResponse {
            new_state: data.state().clone(),
            diagnostics,
        }
    }

    async fn read(&self, request: ReadResourceRequest) -> ReadResourceResponse {
        let mut data = ResourceData::new(request.current_state);
        let result = match self.proxy() {
            Ok(proxy) => self.read_external_source(proxy, &mut data, false).await,
            Err(diagnostics) => Err(diagnostics),
        };

        ReadResourceResponse {
            new_state: data.into_state(),
            diagnostics: result.err().unwrap_or_default(),
        }
    }

    async fn update(&self, request: UpdateResourceRequest) -> UpdateResourceResponse {
        let mut data = ResourceData::new(request.planned_state);
        if !data.exists() {
            data.set_id(ResourceData::new(request.prior_state).id());
        }
        let diagnostics = self
            .update_external_source(&mut data)
            .await
            .err()
            .unwrap_or_default();

        UpdateResourceResponse {
            new_state: data.state().clone(),
            diagnostics,
        }
    }

    async fn delete(&self, request: DeleteResourceRequest) -> DeleteResourceResponse {
        let data = ResourceData::new(request.prior_state);
        DeleteResourceResponse {
            diagnostics: self
                .delete_external_source(&data)
                .await
                .err()
                .unwrap_or_default(),
        }
    }
}

#[async_trait]
impl ResourceWithConfigure for ExternalSourceResource {
    async fn configure(&mut self, request: ConfigureResourceRequest) -> ConfigureResourceResponse {
        let (meta, response) = configure_provider_meta(request);
        if let Some(meta) = meta {
            *self = Self::from_meta(meta);
        }
        response
    }
}

#[async_trait]
impl ResourceExporter for ExternalSourceResource {
    async fn get_resources(&self) -> Result<ResourceIdMetaMap, Diagnostics> {
        let proxy = self.proxy()?;
        let (sources, _) = proxy.get_all_external_sources(None).await.map_err(|e| {
            ProviderError::from_api_error(
                RESOURCE_TYPE,
                "Failed to get page of external sources",
                &e,
            )
        })?;

        Ok(sources
            .into_iter()
            .filter_map(|source| {
                let id = source.id?;
                let name = source.name.unwrap_or_else(|| id.clone());
                Some((id, ResourceMeta::new(name)))
            })
            .collect())
    }
}
