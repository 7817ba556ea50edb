use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tfcore::resource::{
    ConfigureResourceRequest, ConfigureResourceResponse, CreateResourceRequest,
    CreateResourceResponse, DeleteResourceRequest, DeleteResourceResponse, ReadResourceRequest,
    ReadResourceResponse, ResourceWithConfigure, UpdateResourceRequest, UpdateResourceResponse,
    ValidateResourceConfigRequest, ValidateResourceConfigResponse,
};
use tfcore::{Diagnostics, Resource, ResourceData, Schema};

use super::model::{check_ttl_and_delay, flatten_trigger, parse_match_criteria, TriggerModel};
use super::proxy::{RestTriggerProxy, TriggerProxy};
use super::schema::trigger_schema;
use super::RESOURCE_TYPE;
use crate::api::process_automation::Trigger;
use crate::consistency_checker::{ConsistencyCheck, ConsistencyChecker};
use crate::provider_meta::ProviderMeta;
use crate::resource_exporter::{RefAttrSettings, ResourceExporter, ResourceIdMetaMap, ResourceMeta};
use crate::resources::{configure_provider_meta, decode_model, not_configured};
use crate::util::{
    error_kind, is_status_400, is_version_mismatch, retry_when, with_retries,
    with_retries_for_read, ErrorKind, ProviderError, RetryOutcome, DEFAULT_READ_TIMEOUT,
};

const DELETE_TIMEOUT: Duration = Duration::from_secs(30);

pub struct TriggerResource {
    proxy: Option<Arc<dyn TriggerProxy>>,
    consistency_checks: bool,
}

impl Default for TriggerResource {
    fn default() -> Self {
        Self::new()
    }
}

impl TriggerResource {
    pub fn new() -> Self {
        Self {
            proxy: None,
            consistency_checks: true,
        }
    }

    pub fn with_proxy(proxy: Arc<dyn TriggerProxy>, consistency_checks: bool) -> Self {
        Self {
            proxy: Some(proxy),
            consistency_checks,
        }
    }

    pub fn from_meta(meta: Arc<ProviderMeta>) -> Self {
        Self::with_proxy(
            Arc::new(RestTriggerProxy::new(meta.client.clone())),
            meta.consistency_checks(),
        )
    }

    fn proxy(&self) -> Result<&dyn TriggerProxy, Diagnostics> {
        self.proxy.as_deref().ok_or_else(not_configured)
    }

    async fn create_trigger(&self, data: &mut ResourceData) -> Result<(), Diagnostics> {
        let proxy = self.proxy()?;
        let model: TriggerModel = decode_model(data, RESOURCE_TYPE)?;
        model.check_ttl_and_delay()?;
        let input = model.to_trigger()?;

        tracing::info!("Creating process automation trigger {}", model.name);

        let input = &input;
        let name = model.name.as_str();
        let trigger = retry_when(is_status_400, &[], move || async move {
            proxy
                .create_trigger(input)
                .await
                .map(|(trigger, _)| trigger)
                .map_err(|e| {
                    ProviderError::from_api_error(
                        RESOURCE_TYPE,
                        format!("Failed to create process automation trigger {}", name),
                        &e,
                    )
                })
        })
        .await?;

        let id = trigger.id.filter(|id| !id.is_empty()).ok_or_else(|| {
            ProviderError::api(
                RESOURCE_TYPE,
                format!("Created process automation trigger {} has no id", name),
                None,
            )
        })?;
        data.set_id(id.clone());
        tracing::info!("Created process automation trigger {} {}", name, id);

        self.read_trigger(proxy, data, true).await
    }

    /// Refreshes `data`; `check` re-reads until the platform reflects `data`
    async fn read_trigger(
        &self,
        proxy: &dyn TriggerProxy,
        data: &mut ResourceData,
        check: bool,
    ) -> Result<(), Diagnostics> {
        let checker = ConsistencyCheck::new(
            data,
            &trigger_schema(),
            self.consistency_checks && check,
            RESOURCE_TYPE,
        );
        let checker = &checker;

        tracing::info!("Reading process automation trigger {}", data.id());

        with_retries_for_read(data, DEFAULT_READ_TIMEOUT, move |mut fresh| async move {
            let id = fresh.id();
            let trigger = match proxy.get_trigger_by_id(&id).await {
                Ok((trigger, _)) => trigger,
                Err(e) => {
                    let err = ProviderError::from_api_error(
                        RESOURCE_TYPE,
                        format!("Failed to read process automation trigger {}", id),
                        &e,
                    );
                    return if err.is_not_found() {
                        RetryOutcome::Retryable(err)
                    } else {
                        RetryOutcome::NonRetryable(err)
                    };
                }
            };

            flatten_trigger(&trigger, &mut fresh);
            tracing::debug!(
                "Read process automation trigger {} {}",
                id,
                trigger.name.as_deref().unwrap_or_default()
            );
            checker.check_state(&fresh).map(|_| fresh)
        })
        .await?;

        Ok(())
    }

    async fn update_trigger(&self, data: &mut ResourceData) -> Result<(), Diagnostics> {
        let proxy = self.proxy()?;
        let model: TriggerModel = decode_model(data, RESOURCE_TYPE)?;
        model.check_ttl_and_delay()?;
        let input = model.to_trigger()?;

        tracing::info!("Updating process automation trigger {}", model.name);

        let id = data.id();
        let id = id.as_str();
        let name = model.name.as_str();
        let input = &input;
        retry_when(is_version_mismatch, &[], move || async move {
            // PUT must carry the current version
            let (current, _) = proxy.get_trigger_by_id(id).await.map_err(|e| {
                ProviderError::from_api_error(
                    RESOURCE_TYPE,
                    format!("Failed to read process automation trigger {}", id),
                    &e,
                )
            })?;
            let body = Trigger {
                version: current.version,
                ..input.clone()
            };
            proxy.update_trigger(id, &body).await.map_err(|e| {
                ProviderError::from_api_error(
                    RESOURCE_TYPE,
                    format!("Failed to update process automation trigger {}", name),
                    &e,
                )
            })
        })
        .await?;

        tracing::info!("Updated process automation trigger {}", name);
        self.read_trigger(proxy, data, true).await
    }

    async fn delete_trigger(&self, data: &ResourceData) -> Result<(), Diagnostics> {
        let proxy = self.proxy()?;
        let id = data.id();
        let id = id.as_str();

        tracing::info!(
            "Deleting process automation trigger {}",
            data.get_string("name").unwrap_or_default()
        );

        with_retries(DELETE_TIMEOUT, move || async move {
            match proxy.delete_trigger(id).await {
                Ok(_) => RetryOutcome::Success(()),
                Err(e) if error_kind(&e) == ErrorKind::NotFound => {
                    tracing::info!("Process automation trigger already deleted {}", id);
                    RetryOutcome::Success(())
                }
                Err(e) => RetryOutcome::Retryable(ProviderError::from_api_error(
                    RESOURCE_TYPE,
                    format!("process automation trigger {} still exists", id),
                    &e,
                )),
            }
        })
        .await?;

        Ok(())
    }
}

#[async_trait]
impl Resource for TriggerResource {
    fn type_name(&self) -> &str {
        RESOURCE_TYPE
    }

    fn schema(&self) -> Schema {
        trigger_schema()
    }

    async fn validate(
        &self,
        request: ValidateResourceConfigRequest,
    ) -> ValidateResourceConfigResponse {
        let mut diagnostics = self.schema().validate(&request.config);

        let config = ResourceData::new(request.config);
        if let Err(err) = check_ttl_and_delay(
            config.get_int("event_ttl_seconds"),
            config.get_int("delay_by_seconds"),
        ) {
            diagnostics.extend(err.into());
        }
        if let Err(err) = parse_match_criteria(config.get_string("match_criteria").as_deref()) {
            diagnostics.extend(err.into());
        }

        ValidateResourceConfigResponse { diagnostics }
    }

    async fn create(&self, request: CreateResourceRequest) -> CreateResourceResponse {
        let mut data = ResourceData::new_resource(request.planned_state);
        let diagnostics = self.create_trigger(&mut data).await.err().unwrap_or_default();

        CreateResourceResponse {
            new_state: data.state().clone(),
            diagnostics,
        }
    }

    async fn read(&self, request: ReadResourceRequest) -> ReadResourceResponse {
        let mut data = ResourceData::new(request.current_state);
        let result = match self.proxy() {
            Ok(proxy) => self.read_trigger(proxy, &mut data, false).await,
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
        let diagnostics = self.update_trigger(&mut data).await.err().unwrap_or_default();

        UpdateResourceResponse {
            new_state: data.state().clone(),
            diagnostics,
        }
    }

    async fn delete(&self, request: DeleteResourceRequest) -> DeleteResourceResponse {
        let data = ResourceData::new(request.prior_state);
        DeleteResourceResponse {
            diagnostics: self.delete_trigger(&data).await.err().unwrap_or_default(),
        }
    }
}

#[async_trait]
impl ResourceWithConfigure for TriggerResource {
    async fn configure(&mut self, request: ConfigureResourceRequest) -> ConfigureResourceResponse {
        let (meta, response) = configure_provider_meta(request);
        if let Some(meta) = meta {
            *self = Self::from_meta(meta);
        }
        response
    }
}

#[async_trait]
impl ResourceExporter for TriggerResource {
    async fn get_resources(&self) -> Result<ResourceIdMetaMap, Diagnostics> {
        let proxy = self.proxy()?;
        let (triggers, _) = proxy.get_all_triggers().await.map_err(|e| {
            ProviderError::from_api_error(
                RESOURCE_TYPE,
                "Failed to get page of process automation triggers",
                &e,
            )
        })?;

        Ok(triggers
            .into_iter()
            .filter_map(|trigger| {
                let id = trigger.id?;
                let name = trigger.name.unwrap_or_else(|| id.clone());
                Some((id, ResourceMeta::new(name)))
            })
            .collect())
    }

    fn ref_attrs(&self) -> HashMap<String, RefAttrSettings> {
        HashMap::from([(
            "target.id".to_string(),
            RefAttrSettings::new("genesyscloud_flow"),
        )])
    }
}
