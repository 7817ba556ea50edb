use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tfcore::data_source::{
    ConfigureDataSourceRequest, ConfigureDataSourceResponse, ReadDataSourceRequest,
    ReadDataSourceResponse,
};
use tfcore::{DataSource, DataSourceWithConfigure, Diagnostics, ResourceData, Schema};

use super::proxy::{RestScheduleProxy, ScheduleProxy};
use super::schema::schedule_data_source_schema;
use super::RESOURCE_TYPE;
use crate::resources::{configure_provider_meta, not_configured};
use crate::util::{with_retries, ProviderError};

const LOOKUP_TIMEOUT: Duration = Duration::from_secs(15);

/// Looks up a schedule id by name
#[derive(Default)]
pub struct ScheduleDataSource {
    proxy: Option<Arc<dyn ScheduleProxy>>,
}

impl ScheduleDataSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_proxy(proxy: Arc<dyn ScheduleProxy>) -> Self {
        Self { proxy: Some(proxy) }
    }

    async fn lookup(&self, data: &mut ResourceData) -> Result<(), Diagnostics> {
        let proxy = self.proxy.as_deref().ok_or_else(not_configured)?;
        let name = data.get_string("name").ok_or_else(|| {
            ProviderError::invalid(RESOURCE_TYPE, "Missing schedule name", "name must be set")
        })?;
        let name = name.as_str();

        let id = with_retries(LOOKUP_TIMEOUT, move || async move {
            proxy.get_schedule_id_by_name(name).await
        })
        .await?;

        data.set_id(id);
        Ok(())
    }
}

#[async_trait]
impl DataSource for ScheduleDataSource {
    fn type_name(&self) -> &str {
        RESOURCE_TYPE
    }

    fn schema(&self) -> Schema {
        schedule_data_source_schema()
    }

    async fn read(&self, request: ReadDataSourceRequest) -> ReadDataSourceResponse {
        let mut data = ResourceData::new(request.config);
        let diagnostics = self.lookup(&mut data).await.err().unwrap_or_default();

        ReadDataSourceResponse {
            state: data.state().clone(),
            diagnostics,
        }
    }
}

#[async_trait]
impl DataSourceWithConfigure for ScheduleDataSource {
    async fn configure(
        &mut self,
        request: ConfigureDataSourceRequest,
    ) -> ConfigureDataSourceResponse {
        let (meta, response) = configure_provider_meta(request);
        if let Some(meta) = meta {
            self.proxy = Some(Arc::new(RestScheduleProxy::new(meta)));
        }
        response
    }
}
