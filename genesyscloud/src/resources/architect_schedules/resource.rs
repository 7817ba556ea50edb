use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tfcore::resource::{
    ConfigureResourceRequest, ConfigureResourceResponse, CreateResourceRequest,
    CreateResourceResponse, DeleteResourceRequest, DeleteResourceResponse, ReadResourceRequest,
    ReadResourceResponse, ResourceWithConfigure, UpdateResourceRequest, UpdateResourceResponse,
};
use tfcore::{Diagnostics, Resource, ResourceData, Schema};

use super::model::{flatten_schedule, ScheduleModel};
use super::proxy::{RestScheduleProxy, ScheduleProxy};
use super::schema::schedule_schema;
use super::RESOURCE_TYPE;
use crate::api::architect::{Schedule, STATE_DELETED};
use crate::api::ApiError;
use crate::consistency_checker::{ConsistencyCheck, ConsistencyChecker};
use crate::provider_meta::ProviderMeta;
use crate::resource_exporter::{ResourceExporter, ResourceIdMetaMap, ResourceMeta};
use crate::resources::{configure_provider_meta, decode_model, not_configured};
use crate::util::{
    error_kind, is_status_409, is_version_mismatch, retry_when, with_retries,
    with_retries_for_read, ErrorKind, ProviderError, RetryOutcome, DEFAULT_READ_TIMEOUT,
};

const DELETE_TIMEOUT: Duration = Duration::from_secs(30);

const DIVISION_PERMISSION: &str = "routing:schedule:add";
const DIVISION_PERMISSION_HINT: &str =
    "\nYou must have all divisions and future divisions selected in your OAuth client role";

/// Create and update failures caused by division scoped permissions get a hint
fn write_error(summary: String, err: &ApiError) -> ProviderError {
    let message = err.to_string();
    let hint = if message.contains(DIVISION_PERMISSION) {
        DIVISION_PERMISSION_HINT
    } else {
        ""
    };
    ProviderError::api(
        RESOURCE_TYPE,
        format!("{} | error: {}{}", summary, message, hint),
        err.response().cloned(),
    )
}

pub struct ScheduleResource {
    proxy: Option<Arc<dyn ScheduleProxy>>,
    consistency_checks: bool,
}

impl Default for ScheduleResource {
    fn default() -> Self {
        Self::new()
    }
}

impl ScheduleResource {
    pub fn new() -> Self {
        Self {
            proxy: None,
            consistency_checks: true,
        }
    }

    pub fn with_proxy(proxy: Arc<dyn ScheduleProxy>, consistency_checks: bool) -> Self {
        Self {
            proxy: Some(proxy),
            consistency_checks,
        }
    }

    pub fn from_meta(meta: Arc<ProviderMeta>) -> Self {
        let consistency_checks = meta.consistency_checks();
        Self::with_proxy(Arc::new(RestScheduleProxy::new(meta)), consistency_checks)
    }

    fn proxy(&self) -> Result<&dyn ScheduleProxy, Diagnostics> {
        self.proxy.as_deref().ok_or_else(not_configured)
    }

    async fn division_id(
        proxy: &dyn ScheduleProxy,
        model: &ScheduleModel,
    ) -> Result<String, ProviderError> {
        match model.division_id() {
            Some(id) => Ok(id.to_string()),
            None => proxy.home_division_id().await,
        }
    }

    async fn create_schedule(&self, data: &mut ResourceData) -> Result<(), Diagnostics> {
        let proxy = self.proxy()?;
        let model: ScheduleModel = decode_model(data, RESOURCE_TYPE)?;
        let division_id = Self::division_id(proxy, &model).await?;
        let input = model.to_schedule(&division_id)?;

        tracing::info!("Creating schedule {}", model.name);
        let (schedule, _) = proxy.create_schedule(&input).await.map_err(|e| {
            write_error(format!("Failed to create schedule {}", model.name), &e)
        })?;

        let id = schedule.id.filter(|id| !id.is_empty()).ok_or_else(|| {
            ProviderError::api(
                RESOURCE_TYPE,
                format!("Created schedule {} has no id", model.name),
                None,
            )
        })?;
        data.set_id(id.clone());
        tracing::info!("Created schedule {} {}", model.name, id);

        self.read_schedule(proxy, data, true).await
    }

    async fn read_schedule(
        &self,
        proxy: &dyn ScheduleProxy,
        data: &mut ResourceData,
        check: bool,
    ) -> Result<(), Diagnostics> {
        let checker = ConsistencyCheck::new(
            data,
            &schedule_schema(),
            self.consistency_checks && check,
            RESOURCE_TYPE,
        );
        let checker = &checker;

        tracing::info!("Reading schedule {}", data.id());

        with_retries_for_read(data, DEFAULT_READ_TIMEOUT, move |mut fresh| async move {
            let id = fresh.id();
            // Any failure may be transient right after a write
            let schedule = match proxy.get_schedule_by_id(&id).await {
                Ok((schedule, _)) => schedule,
                Err(e) => {
                    return RetryOutcome::Retryable(ProviderError::from_api_error(
                        RESOURCE_TYPE,
                        format!("Failed to read schedule {}", id),
                        &e,
                    ))
                }
            };

            flatten_schedule(&schedule, &mut fresh);
            tracing::debug!(
                "Read schedule {} {}",
                id,
                schedule.name.as_deref().unwrap_or_default()
            );
            checker.check_state(&fresh).map(|_| fresh)
        })
        .await?;

        Ok(())
    }

    async fn update_schedule(&self, data: &mut ResourceData) -> Result<(), Diagnostics> {
        let proxy = self.proxy()?;
        let model: ScheduleModel = decode_model(data, RESOURCE_TYPE)?;
        let division_id = Self::division_id(proxy, &model).await?;
        let input = model.to_schedule(&division_id)?;

        tracing::info!("Updating schedule {}", model.name);

        let id = data.id();
        let id = id.as_str();
        let name = model.name.as_str();
        let input = &input;
        retry_when(is_version_mismatch, &[], move || async move {
            let (current, _) = proxy.get_schedule_by_id(id).await.map_err(|e| {
                ProviderError::from_api_error(
                    RESOURCE_TYPE,
                    format!("Failed to read schedule {}", id),
                    &e,
                )
            })?;
            let body = Schedule {
                version: current.version,
                description: Some(input.description.clone().unwrap_or_default()),
                ..input.clone()
            };
            proxy
                .update_schedule(id, &body)
                .await
                .map_err(|e| write_error(format!("Failed to update schedule {}", name), &e))
        })
        .await?;

        tracing::info!("Finished updating schedule {}", name);
        self.read_schedule(proxy, data, true).await
    }

    async fn delete_schedule(&self, data: &ResourceData) -> Result<(), Diagnostics> {
        let proxy = self.proxy()?;
        let id = data.id();
        let id = id.as_str();

        // A schedule still referenced by a schedule group answers 409 until the group is gone
        tracing::info!("Deleting schedule {}", id);
        retry_when(is_status_409, &[], move || async move {
            proxy.delete_schedule(id).await.map_err(|e| {
                ProviderError::from_api_error(
                    RESOURCE_TYPE,
                    format!("Failed to delete schedule {}", id),
                    &e,
                )
            })
        })
        .await?;

        with_retries(DELETE_TIMEOUT, move || async move {
            match proxy.get_schedule_by_id(id).await {
                Err(e) if error_kind(&e) == ErrorKind::NotFound => {
                    tracing::info!("Deleted schedule {}", id);
                    RetryOutcome::Success(())
                }
                Err(e) => RetryOutcome::NonRetryable(ProviderError::from_api_error(
                    RESOURCE_TYPE,
                    format!("Error deleting schedule {}", id),
                    &e,
                )),
                Ok((schedule, _)) if schedule.state.as_deref() == Some(STATE_DELETED) => {
                    tracing::info!("Deleted schedule {}", id);
                    RetryOutcome::Success(())
                }
                Ok((_, response)) => RetryOutcome::Retryable(ProviderError::api(
                    RESOURCE_TYPE,
                    format!("Schedule {} still exists", id),
                    Some(response),
                )),
            }
        })
        .await?;

        Ok(())
    }
}

#[async_trait]
impl Resource for ScheduleResource {
    fn type_name(&self) -> &str {
        RESOURCE_TYPE
    }

    fn schema(&self) -> Schema {
        schedule_schema()
    }

    async fn create(&self, request: CreateResourceRequest) -> CreateResourceResponse {
        let mut data = ResourceData::new_resource(request.planned_state);
        let diagnostics = self.create_schedule(&mut data).await.err().unwrap_or_default();

        CreateResourceResponse {
            new_state: data.state().clone(),
            diagnostics,
        }
    }

    async fn read(&self, request: ReadResourceRequest) -> ReadResourceResponse {
        let mut data = ResourceData::new(request.current_state);
        let result = match self.proxy() {
            Ok(proxy) => self.read_schedule(proxy, &mut data, false).await,
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
        let diagnostics = self.update_schedule(&mut data).await.err().unwrap_or_default();

        UpdateResourceResponse {
            new_state: data.state().clone(),
            diagnostics,
        }
    }

    async fn delete(&self, request: DeleteResourceRequest) -> DeleteResourceResponse {
        let data = ResourceData::new(request.prior_state);
        DeleteResourceResponse {
            diagnostics: self.delete_schedule(&data).await.err().unwrap_or_default(),
        }
    }
}

#[async_trait]
impl ResourceWithConfigure for ScheduleResource {
    async fn configure(&mut self, request: ConfigureResourceRequest) -> ConfigureResourceResponse {
        let (meta, response) = configure_provider_meta(request);
        if let Some(meta) = meta {
            *self = Self::from_meta(meta);
        }
        response
    }
}

#[async_trait]
impl ResourceExporter for ScheduleResource {
    async fn get_resources(&self) -> Result<ResourceIdMetaMap, Diagnostics> {
        let proxy = self.proxy()?;
        let (schedules, _) = proxy.get_all_schedules().await.map_err(|e| {
            ProviderError::from_api_error(RESOURCE_TYPE, "Failed to get page of schedule", &e)
        })?;

        Ok(schedules
            .into_iter()
            .filter_map(|schedule| {
                let id = schedule.id?;
                let name = schedule.name.unwrap_or_else(|| id.clone());
                Some((id, ResourceMeta::new(name)))
            })
            .collect())
    }
}
