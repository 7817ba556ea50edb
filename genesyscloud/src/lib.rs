pub mod api;
pub mod config;
pub mod consistency_checker;
pub mod provider_meta;
pub mod resource_cache;
pub mod resource_exporter;
pub mod resources;
pub mod util;

use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tfcore::data_source::DataSourceFactory;
use tfcore::provider::{ConfigureProviderRequest, ConfigureProviderResponse};
use tfcore::resource::ResourceFactory;
use tfcore::validator::StringInSliceValidator;
use tfcore::{
    AttributeBuilder, AttributeType, DataSourceWithConfigure, Diagnostic, Diagnostics,
    NestedBlockBuilder, NestingMode, Provider, ResourceWithConfigure, Schema, SchemaBuilder,
};

use config::ProviderConfig;
use provider_meta::ProviderMeta;
use resource_exporter::{export_resources, ExportedResource, ResourceExporter};
use resources::{
    architect_schedules, external_contacts_external_source, process_automation_trigger,
    ExternalSourceDataSource, ExternalSourceResource, ScheduleDataSource, ScheduleResource,
    TriggerResource,
};

pub const PROVIDER_TYPE: &str = "genesyscloud";

/// Builds the exporter for one resource type from configured provider data
pub type ExporterFactory = fn(Arc<ProviderMeta>) -> Box<dyn ResourceExporter>;

fn trigger_resource() -> Box<dyn ResourceWithConfigure> {
    Box::new(TriggerResource::new())
}

fn schedule_resource() -> Box<dyn ResourceWithConfigure> {
    Box::new(ScheduleResource::new())
}

fn external_source_resource() -> Box<dyn ResourceWithConfigure> {
    Box::new(ExternalSourceResource::new())
}

fn schedule_data_source() -> Box<dyn DataSourceWithConfigure> {
    Box::new(ScheduleDataSource::new())
}

fn external_source_data_source() -> Box<dyn DataSourceWithConfigure> {
    Box::new(ExternalSourceDataSource::new())
}

fn trigger_exporter(meta: Arc<ProviderMeta>) -> Box<dyn ResourceExporter> {
    Box::new(TriggerResource::from_meta(meta))
}

fn schedule_exporter(meta: Arc<ProviderMeta>) -> Box<dyn ResourceExporter> {
    Box::new(ScheduleResource::from_meta(meta))
}

fn external_source_exporter(meta: Arc<ProviderMeta>) -> Box<dyn ResourceExporter> {
    Box::new(ExternalSourceResource::from_meta(meta))
}

/// Every exportable resource type, in export order
pub fn exporters() -> BTreeMap<&'static str, ExporterFactory> {
    BTreeMap::from([
        (
            process_automation_trigger::RESOURCE_TYPE,
            trigger_exporter as ExporterFactory,
        ),
        (
            architect_schedules::RESOURCE_TYPE,
            schedule_exporter as ExporterFactory,
        ),
        (
            external_contacts_external_source::RESOURCE_TYPE,
            external_source_exporter as ExporterFactory,
        ),
    ])
}

fn provider_schema() -> Schema {
    let gateway = NestedBlockBuilder::new("gateway", NestingMode::Set)
        .description("Route API and login traffic through a gateway instead of the regional hosts.")
        .max_items(1)
        .attribute(
            AttributeBuilder::new("protocol", AttributeType::String)
                .description("Protocol of the gateway. Can be set with the `GENESYSCLOUD_GATEWAY_PROTOCOL` environment variable.")
                .optional()
                .build(),
        )
        .attribute(
            AttributeBuilder::new("host", AttributeType::String)
                .description("Host of the gateway. Can be set with the `GENESYSCLOUD_GATEWAY_HOST` environment variable.")
                .optional()
                .build(),
        )
        .attribute(
            AttributeBuilder::new("port", AttributeType::String)
                .description("Port of the gateway. Can be set with the `GENESYSCLOUD_GATEWAY_PORT` environment variable.")
                .optional()
                .build(),
        )
        .build();

    SchemaBuilder::new()
        .description("Genesys Cloud provider")
        .attribute(
            AttributeBuilder::new("access_token", AttributeType::String)
                .description("A string that the OAuth client uses to make requests. Can be set with the `GENESYSCLOUD_ACCESS_TOKEN` environment variable.")
                .optional()
                .sensitive()
                .build(),
        )
        .attribute(
            AttributeBuilder::new("oauthclient_id", AttributeType::String)
                .description("OAuthClient ID found on the OAuth page of Admin UI. Can be set with the `GENESYSCLOUD_OAUTHCLIENT_ID` environment variable.")
                .optional()
                .build(),
        )
        .attribute(
            AttributeBuilder::new("oauthclient_secret", AttributeType::String)
                .description("OAuthClient secret found on the OAuth page of Admin UI. Can be set with the `GENESYSCLOUD_OAUTHCLIENT_SECRET` environment variable.")
                .optional()
                .sensitive()
                .build(),
        )
        .attribute(
            AttributeBuilder::new("aws_region", AttributeType::String)
                .description("AWS region where org exists. e.g. us-east-1. Can be set with the `GENESYSCLOUD_REGION` environment variable.")
                .optional()
                .validator(StringInSliceValidator::new(&config::allowed_regions()))
                .build(),
        )
        .attribute(
            AttributeBuilder::new("consistency_checks", AttributeType::Bool)
                .description("Re-read resources after create and update until the platform reflects the change. Disabled when `BYPASS_CONSISTENCY_CHECKER` is true.")
                .optional()
                .build(),
        )
        .block(gateway)
        .build()
}

#[derive(Default)]
pub struct GenesysCloudProvider {
    meta: Option<Arc<ProviderMeta>>,
}

impl GenesysCloudProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Provider data from the last successful `configure`
    pub fn meta(&self) -> Option<Arc<ProviderMeta>> {
        self.meta.clone()
    }

    /// Exports the given resource types, or every exportable type when empty
    pub async fn export(
        &self,
        resource_types: &[String],
    ) -> Result<Vec<ExportedResource>, Diagnostics> {
        let meta = self.meta.clone().ok_or_else(resources::not_configured)?;
        let exporters = exporters();

        let selected: Vec<&str> = if resource_types.is_empty() {
            exporters.keys().copied().collect()
        } else {
            resource_types.iter().map(String::as_str).collect()
        };

        let mut exported = Vec::new();
        for resource_type in selected {
            let Some(factory) = exporters.get(resource_type) else {
                return Err(Diagnostic::error(
                    format!("Unknown resource type {}", resource_type),
                    format!(
                        "exportable types are {}",
                        exporters.keys().copied().collect::<Vec<_>>().join(", ")
                    ),
                )
                .into());
            };
            let exporter = factory(meta.clone());
            exported.extend(export_resources(exporter.as_ref()).await?);
        }
        Ok(exported)
    }
}

#[async_trait]
impl Provider for GenesysCloudProvider {
    fn type_name(&self) -> &str {
        PROVIDER_TYPE
    }

    fn schema(&self) -> Schema {
        static SCHEMA: std::sync::OnceLock<Schema> = std::sync::OnceLock::new();
        SCHEMA.get_or_init(provider_schema).clone()
    }

    async fn configure(&mut self, request: ConfigureProviderRequest) -> ConfigureProviderResponse {
        let mut diagnostics = Diagnostics::new();

        let client = ProviderConfig::from_config(&request.config)
            .and_then(|config| Ok((config.build_client()?, config.consistency_checks)));

        let provider_data = match client {
            Ok((client, consistency_checks)) => {
                tracing::info!(
                    "Configured Genesys Cloud provider for Terraform {}",
                    request.terraform_version
                );
                let meta = Arc::new(ProviderMeta::new(client, consistency_checks));
                self.meta = Some(meta.clone());
                Some(meta as Arc<dyn std::any::Any + Send + Sync>)
            }
            Err(e) => {
                diagnostics.add_error(e.to_string(), None::<String>);
                None
            }
        };

        ConfigureProviderResponse {
            diagnostics,
            provider_data,
        }
    }

    fn resources(&self) -> HashMap<String, ResourceFactory> {
        HashMap::from([
            (
                process_automation_trigger::RESOURCE_TYPE.to_string(),
                trigger_resource as ResourceFactory,
            ),
            (
                architect_schedules::RESOURCE_TYPE.to_string(),
                schedule_resource as ResourceFactory,
            ),
            (
                external_contacts_external_source::RESOURCE_TYPE.to_string(),
                external_source_resource as ResourceFactory,
            ),
        ])
    }

    fn data_sources(&self) -> HashMap<String, DataSourceFactory> {
        HashMap::from([
            (
                architect_schedules::RESOURCE_TYPE.to_string(),
                schedule_data_source as DataSourceFactory,
            ),
            (
                external_contacts_external_source::RESOURCE_TYPE.to_string(),
                external_source_data_source as DataSourceFactory,
            ),
        ])
    }
}
