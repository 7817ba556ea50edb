//! Factory, configure and default-method behaviour of the provider traits

#![allow(clippy::disallowed_methods)] // Allow unwrap() in tests for clarity

use async_trait::async_trait;
use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;
use tfcore::data_source::{
    ConfigureDataSourceRequest, ConfigureDataSourceResponse, DataSourceFactory,
    ReadDataSourceRequest, ReadDataSourceResponse,
};
use tfcore::provider::{configured_data_source, configured_resource};
use tfcore::resource::{
    ConfigureResourceRequest, ConfigureResourceResponse, CreateResourceRequest,
    CreateResourceResponse, DeleteResourceRequest, DeleteResourceResponse,
    ImportResourceStateRequest, ReadResourceRequest, ReadResourceResponse, ResourceFactory,
    UpdateResourceRequest, UpdateResourceResponse, ValidateResourceConfigRequest,
};
use tfcore::{
    AttributeBuilder, AttributePath, AttributeType, ConfigureProviderRequest,
    ConfigureProviderResponse, DataSource, DataSourceWithConfigure, Diagnostics, DynamicValue,
    Provider, Resource, ResourceData, ResourceWithConfigure, Schema, SchemaBuilder, TfcoreError,
};

#[derive(Clone)]
struct Greeting(String);

struct GreetingProvider;

#[async_trait]
impl Provider for GreetingProvider {
    fn type_name(&self) -> &str {
        "greeting"
    }

    fn schema(&self) -> Schema {
        SchemaBuilder::new()
            .attribute(
                AttributeBuilder::new("prefix", AttributeType::String)
                    .optional()
                    .build(),
            )
            .build()
    }

    async fn configure(&mut self, request: ConfigureProviderRequest) -> ConfigureProviderResponse {
        let prefix = request
            .config
            .get_string(&AttributePath::new("prefix"))
            .unwrap_or_else(|_| "hello".to_string());
        ConfigureProviderResponse {
            diagnostics: Diagnostics::new(),
            provider_data: Some(Arc::new(Greeting(prefix))),
        }
    }

    fn resources(&self) -> HashMap<String, ResourceFactory> {
        let mut resources: HashMap<String, ResourceFactory> = HashMap::new();
        resources.insert("greeting_message".to_string(), || -> Box<dyn ResourceWithConfigure> {
            Box::new(MessageResource::default())
        });
        resources
    }

    fn data_sources(&self) -> HashMap<String, DataSourceFactory> {
        let mut data_sources: HashMap<String, DataSourceFactory> = HashMap::new();
        data_sources.insert("greeting_prefix".to_string(), || -> Box<dyn DataSourceWithConfigure> {
            Box::new(PrefixDataSource::default())
        });
        data_sources
    }
}

fn downcast(provider_data: Option<Arc<dyn Any + Send + Sync>>) -> Option<Greeting> {
    provider_data.and_then(|d| d.downcast_ref::<Greeting>().cloned())
}

#[derive(Default)]
struct MessageResource {
    greeting: Option<Greeting>,
}

#[async_trait]
impl Resource for MessageResource {
    fn type_name(&self) -> &str {
        "greeting_message"
    }

    fn schema(&self) -> Schema {
        SchemaBuilder::new()
            .attribute(
                AttributeBuilder::new("id", AttributeType::String)
                    .computed()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("name", AttributeType::String)
                    .required()
                    .build(),
            )
            .build()
    }

    async fn create(&self, request: CreateResourceRequest) -> CreateResourceResponse {
        let mut data = ResourceData::new_resource(request.planned_state);
        let name = data.get_string("name").unwrap_or_default();
        let prefix = self.greeting.as_ref().map(|g| g.0.clone()).unwrap_or_default();
        data.set_id(format!("{} {}", prefix, name));
        CreateResourceResponse {
            new_state: data.state().clone(),
            diagnostics: Diagnostics::new(),
        }
    }

    async fn read(&self, request: ReadResourceRequest) -> ReadResourceResponse {
        ReadResourceResponse {
            new_state: ResourceData::new(request.current_state).into_state(),
            diagnostics: Diagnostics::new(),
        }
    }

    async fn update(&self, request: UpdateResourceRequest) -> UpdateResourceResponse {
        UpdateResourceResponse {
            new_state: request.planned_state,
            diagnostics: Diagnostics::new(),
        }
    }

    async fn delete(&self, _request: DeleteResourceRequest) -> DeleteResourceResponse {
        DeleteResourceResponse {
            diagnostics: Diagnostics::new(),
        }
    }
}

#[async_trait]
impl ResourceWithConfigure for MessageResource {
    async fn configure(&mut self, request: ConfigureResourceRequest) -> ConfigureResourceResponse {
        let mut diagnostics = Diagnostics::new();
        self.greeting = downcast(request.provider_data);
        if self.greeting.is_none() {
            diagnostics.add_error("Provider not configured", None::<String>);
        }
        ConfigureResourceResponse { diagnostics }
    }
}

#[derive(Default)]
struct PrefixDataSource {
    greeting: Option<Greeting>,
}

#[async_trait]
impl DataSource for PrefixDataSource {
    fn type_name(&self) -> &str {
        "greeting_prefix"
    }

    fn schema(&self) -> Schema {
        SchemaBuilder::new().build()
    }

    async fn read(&self, _request: ReadDataSourceRequest) -> ReadDataSourceResponse {
        let mut state = DynamicValue::object();
        let prefix = self.greeting.as_ref().map(|g| g.0.clone()).unwrap_or_default();
        state.set_string(&AttributePath::new("prefix"), prefix).unwrap();
        ReadDataSourceResponse {
            state,
            diagnostics: Diagnostics::new(),
        }
    }
}

#[async_trait]
impl DataSourceWithConfigure for PrefixDataSource {
    async fn configure(
        &mut self,
        request: ConfigureDataSourceRequest,
    ) -> ConfigureDataSourceResponse {
        self.greeting = downcast(request.provider_data);
        ConfigureDataSourceResponse {
            diagnostics: Diagnostics::new(),
        }
    }
}

async fn configured_provider() -> (GreetingProvider, Option<Arc<dyn Any + Send + Sync>>) {
    let mut provider = GreetingProvider;
    let mut config = DynamicValue::object();
    config
        .set_string(&AttributePath::new("prefix"), "hi")
        .unwrap();
    let response = provider
        .configure(ConfigureProviderRequest {
            terraform_version: "1.9.0".to_string(),
            config,
        })
        .await;
    assert!(!response.diagnostics.has_errors());
    (provider, response.provider_data)
}

#[tokio::test]
async fn factory_resources_receive_provider_data() {
    let (provider, provider_data) = configured_provider().await;
    let resource = configured_resource(&provider, "greeting_message", provider_data)
        .await
        .unwrap();

    let mut planned = DynamicValue::object();
    planned
        .set_string(&AttributePath::new("name"), "world")
        .unwrap();

    let response = resource
        .create(CreateResourceRequest {
            type_name: "greeting_message".to_string(),
            planned_state: planned.clone(),
            config: planned,
        })
        .await;

    assert_eq!(
        response
            .new_state
            .get_string(&AttributePath::new("id"))
            .unwrap(),
        "hi world"
    );
}

#[tokio::test]
async fn unknown_resource_type_is_an_error() {
    let (provider, provider_data) = configured_provider().await;
    let result = configured_resource(&provider, "greeting_unknown", provider_data).await;

    assert!(matches!(result, Err(TfcoreError::UnknownResourceType(_))));
}

#[tokio::test]
async fn resource_without_provider_data_fails_configure() {
    let provider = GreetingProvider;
    let result = configured_resource(&provider, "greeting_message", None).await;

    assert!(result.is_err());
}

#[tokio::test]
async fn default_validate_uses_schema() {
    let resource = MessageResource::default();
    let response = resource
        .validate(ValidateResourceConfigRequest {
            type_name: "greeting_message".to_string(),
            config: DynamicValue::object(),
        })
        .await;

    assert_eq!(response.diagnostics.errors[0].summary, "name is required");
}

#[tokio::test]
async fn default_import_passes_id_through() {
    let resource = MessageResource::default();
    let response = resource
        .import_state(ImportResourceStateRequest {
            type_name: "greeting_message".to_string(),
            id: "abc".to_string(),
        })
        .await;

    assert_eq!(response.imported_resources.len(), 1);
    assert_eq!(
        response.imported_resources[0]
            .state
            .get_string(&AttributePath::new("id"))
            .unwrap(),
        "abc"
    );
}

#[tokio::test]
async fn data_sources_are_configured_through_factories() {
    let (provider, provider_data) = configured_provider().await;
    let data_source = configured_data_source(&provider, "greeting_prefix", provider_data)
        .await
        .unwrap();

    let response = data_source
        .read(ReadDataSourceRequest {
            type_name: "greeting_prefix".to_string(),
            config: DynamicValue::null(),
        })
        .await;

    assert_eq!(
        response
            .state
            .get_string(&AttributePath::new("prefix"))
            .unwrap(),
        "hi"
    );
}
