use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tfcore::data_source::{
    ConfigureDataSourceRequest, ConfigureDataSourceResponse, ReadDataSourceRequest,
    ReadDataSourceResponse,
};
use tfcore::{DataSource, DataSourceWithConfigure, Diagnostics, ResourceData, Schema};

use super::proxy::{ExternalSourceProxy, RestExternalSourceProxy};
use super::schema::external_source_data_source_schema;
use super::RESOURCE_TYPE;
use crate::resources::{configure_provider_meta, not_configured};
use crate::util::{retry_until, ProviderError, RetryPolicy};

const LOOKUP_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Default)]
pub struct ExternalSourceDataSource {
    proxy: Option<Arc<dyn ExternalSourceProxy>>,
}

impl ExternalSourceDataSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_proxy(proxy: Arc<dyn ExternalSourceProxy>) -> Self {
        Self { proxy: Some(proxy) }
    }

    async fn lookup(&self, data: &mut ResourceData) -> Result<(), Diagnostics> {
        let proxy = self.proxy.as_deref().ok_or_else(not_configured)?;
        let name = data.get_string("name").ok_or_else(|| {
            ProviderError::invalid(
                RESOURCE_TYPE,
                "Missing external source name",
                "name must be set",
            )
        })?;
        let name = name.as_str();

        // Newly created sources take a while to show up in filtered listings
        let id = retry_until(RetryPolicy::linear(LOOKUP_TIMEOUT), move || async move {
            proxy.get_external_source_id_by_name(name).await
        })
        .await?;

        data.set_id(id);
        Ok(())
    }
}

#[async_trait]
impl DataSource for ExternalSourceDataSource {
    fn type_name(&self) -> &str {
        RESOURCE_TYPE
    }

    fn schema(&self) -> Schema {
        external_source_data_source_schema()
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
impl DataSourceWithConfigure for ExternalSourceDataSource {
    async fn configure(
        &mut self,
        request: ConfigureDataSourceRequest,
    ) -> ConfigureDataSourceResponse {
        let (meta, response) = configure_provider_meta(request);
        if let Some(meta) = meta {
            self.proxy = Some(Arc::new(RestExternalSourceProxy::new(meta.client.clone())));
        }
        response
    }
}
