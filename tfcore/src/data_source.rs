//! Data source trait and related types

use crate::diagnostics::Diagnostics;
use crate::resource::{ConfigureResourceRequest, ConfigureResourceResponse};
use crate::schema::Schema;
use crate::types::DynamicValue;
use async_trait::async_trait;

/// Read-only lookup; type name must match the key in `Provider::data_sources`
#[async_trait]
pub trait DataSource: Send + Sync {
    fn type_name(&self) -> &str;

    fn schema(&self) -> Schema;

    async fn read(&self, request: ReadDataSourceRequest) -> ReadDataSourceResponse;
}

#[async_trait]
pub trait DataSourceWithConfigure: DataSource {
    async fn configure(&mut self, request: ConfigureDataSourceRequest)
        -> ConfigureDataSourceResponse;
}

pub type DataSourceFactory = fn() -> Box<dyn DataSourceWithConfigure>;

/// Data sources receive the same provider data as resources
pub type ConfigureDataSourceRequest = ConfigureResourceRequest;
pub type ConfigureDataSourceResponse = ConfigureResourceResponse;

pub struct ReadDataSourceRequest {
    pub type_name: String,
    pub config: DynamicValue,
}

pub struct ReadDataSourceResponse {
    pub state: DynamicValue,
    pub diagnostics: Diagnostics,
}
