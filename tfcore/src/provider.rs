//! Provider trait

use crate::data_source::{DataSourceFactory, DataSourceWithConfigure};
use crate::diagnostics::Diagnostics;
use crate::error::{Result, TfcoreError};
use crate::resource::{ConfigureResourceRequest, ResourceFactory, ResourceWithConfigure};
use crate::schema::Schema;
use crate::types::DynamicValue;
use async_trait::async_trait;
use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;

#[async_trait]
pub trait Provider: Send + Sync {
    fn type_name(&self) -> &str;

    fn schema(&self) -> Schema;

    /// Builds the provider data handed to every resource and data source
    async fn configure(&mut self, request: ConfigureProviderRequest) -> ConfigureProviderResponse;

    fn resources(&self) -> HashMap<String, ResourceFactory>;

    fn data_sources(&self) -> HashMap<String, DataSourceFactory>;
}

pub struct ConfigureProviderRequest {
    pub terraform_version: String,
    pub config: DynamicValue,
}

pub struct ConfigureProviderResponse {
    pub diagnostics: Diagnostics,
    pub provider_data: Option<Arc<dyn Any + Send + Sync>>,
}

/// Builds a resource by type name and passes it the provider data
pub async fn configured_resource(
    provider: &dyn Provider,
    type_name: &str,
    provider_data: Option<Arc<dyn Any + Send + Sync>>,
) -> Result<Box<dyn ResourceWithConfigure>> {
    let factory = provider
        .resources()
        .get(type_name)
        .copied()
        .ok_or_else(|| TfcoreError::UnknownResourceType(type_name.to_string()))?;

    let mut resource = factory();
    let response = resource
        .configure(ConfigureResourceRequest { provider_data })
        .await;
    if let Some(err) = response.diagnostics.errors.first() {
        return Err(TfcoreError::Custom(err.summary.clone()));
    }
    Ok(resource)
}

/// Data source counterpart of `configured_resource`
pub async fn configured_data_source(
    provider: &dyn Provider,
    type_name: &str,
    provider_data: Option<Arc<dyn Any + Send + Sync>>,
) -> Result<Box<dyn DataSourceWithConfigure>> {
    let factory = provider
        .data_sources()
        .get(type_name)
        .copied()
        .ok_or_else(|| TfcoreError::UnknownDataSourceType(type_name.to_string()))?;

    let mut data_source = factory();
    let response = data_source
        .configure(ConfigureResourceRequest { provider_data })
        .await;
    if let Some(err) = response.diagnostics.errors.first() {
        return Err(TfcoreError::Custom(err.summary.clone()));
    }
    Ok(data_source)
}
