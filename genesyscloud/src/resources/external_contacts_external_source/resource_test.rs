#![allow(clippy::disallowed_methods)] // Allow unwrap() in tests for clarity

use async_trait::async_trait;
use std::collections::{BTreeMap, VecDeque};
use std::sync::{Arc, Mutex};
use tfcore::data_source::ReadDataSourceRequest;
use tfcore::resource::{
    CreateResourceRequest, DeleteResourceRequest, ReadResourceRequest, UpdateResourceRequest,
};
use tfcore::{DataSource, Dynamic, DynamicValue, Resource, ResourceData};

use super::proxy::ExternalSourceProxy;
use super::{ExternalSourceDataSource, ExternalSourceResource, RESOURCE_TYPE};
use crate::api::external_contacts::{ExternalSource, LinkConfiguration};
use crate::api::{ApiError, ApiResponse};
use crate::resource_exporter::ResourceExporter;
use crate::util::{ProviderError, RetryOutcome};

#[derive(Default)]
struct FakeExternalSourceProxy {
    sources: Mutex<BTreeMap<String, ExternalSource>>,
    update_failures: Mutex<VecDeque<u16>>,
    /// Reads after delete that still see the source
    lingering_reads: Mutex<u32>,
    /// Lookups by name that come back empty before the source shows up
    hidden_lookups: Mutex<u32>,
    deleted: Mutex<Vec<String>>,
    calls: Mutex<Vec<String>>,
    updates: Mutex<Vec<ExternalSource>>,
}

impl FakeExternalSourceProxy {
    fn with_source(id: &str, name: &str, active: bool) -> Self {
        let proxy = Self::default();
        proxy.sources.lock().unwrap().insert(
            id.to_string(),
            ExternalSource {
                id: Some(id.to_string()),
                name: Some(name.to_string()),
                active: Some(active),
                link_configuration: None,
                version: Some(1),
            },
        );
        proxy
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }

    fn calls(&self, prefix: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.starts_with(prefix))
            .count()
    }

    fn error(status: u16, method: &str, path: &str) -> ApiError {
        ApiError::from_response(
            ApiResponse::new(status, method, path)
                .with_body(format!(r#"{{"message":"status {}"}}"#, status)),
        )
    }
}

#[async_trait]
impl ExternalSourceProxy for FakeExternalSourceProxy {
    async fn get_all_external_sources(
        &self,
        name: Option<&str>,
    ) -> Result<(Vec<ExternalSource>, Option<ApiResponse>), ApiError> {
        self.record(format!("list {}", name.unwrap_or_default()));
        let sources = self
            .sources
            .lock()
            .unwrap()
            .values()
            .filter(|s| name.map_or(true, |n| s.name.as_deref() == Some(n)))
            .cloned()
            .collect();
        Ok((sources, Some(ApiResponse::with_status(200))))
    }

    async fn get_external_source_id_by_name(&self, name: &str) -> RetryOutcome<String> {
        self.record(format!("lookup {}", name));
        {
            let mut hidden = self.hidden_lookups.lock().unwrap();
            if *hidden > 0 {
                *hidden -= 1;
                return RetryOutcome::Retryable(ProviderError::api(
                    RESOURCE_TYPE,
                    format!("No external sources found with name {}", name),
                    None,
                ));
            }
        }
        let found = self
            .sources
            .lock()
            .unwrap()
            .values()
            .find(|s| s.name.as_deref() == Some(name))
            .and_then(|s| s.id.clone());
        match found {
            Some(id) => RetryOutcome::Success(id),
            None => RetryOutcome::Retryable(ProviderError::api(
                RESOURCE_TYPE,
                format!("Unable to find external sources with name {}", name),
                None,
            )),
        }
    }

    async fn get_external_source_by_id(
        &self,
        id: &str,
    ) -> Result<(ExternalSource, ApiResponse), ApiError> {
        self.record(format!("get {}", id));
        let path = format!("/api/v2/externalcontacts/externalsources/{}", id);

        if self.deleted.lock().unwrap().iter().any(|d| d == id) {
            let mut lingering = self.lingering_reads.lock().unwrap();
            if *lingering > 0 {
                *lingering -= 1;
            } else {
                self.sources.lock().unwrap().remove(id);
            }
        }

        self.sources
            .lock()
            .unwrap()
            .get(id)
            .cloned()
            .map(|source| (source, ApiResponse::new(200, "GET", &path)))
            .ok_or_else(|| Self::error(404, "GET", &path))
    }

    async fn create_external_source(
        &self,
        source: &ExternalSource,
    ) -> Result<(ExternalSource, ApiResponse), ApiError> {
        self.record("create".to_string());
        let created = ExternalSource {
            id: Some("es-1".to_string()),
            version: Some(1),
            ..source.clone()
        };
        self.sources
            .lock()
            .unwrap()
            .insert("es-1".to_string(), created.clone());
        Ok((created, ApiResponse::with_status(200)))
    }

    async fn update_external_source(
        &self,
        id: &str,
        source: &ExternalSource,
    ) -> Result<(ExternalSource, ApiResponse), ApiError> {
        self.record(format!("update {}", id));
        let path = format!("/api/v2/externalcontacts/externalsources/{}", id);
        self.updates.lock().unwrap().push(source.clone());
        if let Some(status) = self.update_failures.lock().unwrap().pop_front() {
            if let Some(current) = self.sources.lock().unwrap().get_mut(id) {
                current.version = current.version.map(|v| v + 1);
            }
            return Err(Self::error(status, "PUT", &path));
        }
        let updated = ExternalSource {
            id: Some(id.to_string()),
            version: source.version.map(|v| v + 1),
            ..source.clone()
        };
        self.sources
            .lock()
            .unwrap()
            .insert(id.to_string(), updated.clone());
        Ok((updated, ApiResponse::new(200, "PUT", &path)))
    }

    async fn delete_external_source(&self, id: &str) -> Result<ApiResponse, ApiError> {
        self.record(format!("delete {}", id));
        let path = format!("/api/v2/externalcontacts/externalsources/{}", id);
        if !self.sources.lock().unwrap().contains_key(id) {
            return Err(Self::error(404, "DELETE", &path));
        }
        self.deleted.lock().unwrap().push(id.to_string());
        Ok(ApiResponse::new(204, "DELETE", &path))
    }
}

fn planned(name: &str, active: bool, uri_template: Option<&str>) -> DynamicValue {
    let mut data = ResourceData::new(DynamicValue::object());
    data.set("id", Dynamic::Unknown);
    data.set("name", Dynamic::String(name.to_string()));
    data.set("active", Dynamic::Bool(active));
    let link_configuration = match uri_template {
        Some(uri) => Dynamic::List(vec![Dynamic::Map(
            [(
                "uri_template".to_string(),
                Dynamic::String(uri.to_string()),
            )]
            .into_iter()
            .collect(),
        )]),
        None => Dynamic::List(Vec::new()),
    };
    data.set("link_configuration", link_configuration);
    data.state().clone()
}

fn state_of(id: &str) -> DynamicValue {
    let mut data = ResourceData::new(DynamicValue::object());
    data.set_id(id);
    data.state().clone()
}

fn delete_request(id: &str) -> DeleteResourceRequest {
    DeleteResourceRequest {
        type_name: RESOURCE_TYPE.to_string(),
        prior_state: state_of(id),
    }
}

#[tokio::test]
async fn create_sends_link_configuration() {
    let proxy = Arc::new(FakeExternalSourceProxy::default());
    let resource = ExternalSourceResource::with_proxy(proxy.clone(), true);

    let response = resource
        .create(CreateResourceRequest {
            type_name: RESOURCE_TYPE.to_string(),
            planned_state: planned("crm", true, Some("https://crm.example.com/{{externalId}}")),
            config: DynamicValue::object(),
        })
        .await;

    assert!(response.diagnostics.is_empty(), "{:?}", response.diagnostics);
    let state = ResourceData::new(response.new_state);
    assert_eq!(state.id(), "es-1");
    assert_eq!(state.get_bool("active"), Some(true));

    let stored = proxy.sources.lock().unwrap()["es-1"].clone();
    assert_eq!(
        stored.link_configuration,
        Some(LinkConfiguration {
            uri_template: Some("https://crm.example.com/{{externalId}}".to_string()),
        })
    );
}

#[tokio::test]
async fn read_drops_missing_source() {
    let proxy = Arc::new(FakeExternalSourceProxy::default());

    let response = ExternalSourceResource::with_proxy(proxy.clone(), true)
        .read(ReadResourceRequest {
            type_name: RESOURCE_TYPE.to_string(),
            current_state: state_of("es-404"),
        })
        .await;

    assert!(response.new_state.is_none());
    assert!(response.diagnostics.is_empty());
    assert_eq!(proxy.calls("get es-404"), 1);
}

#[tokio::test(start_paused = true)]
async fn update_retries_version_conflict_with_fresh_version() {
    let proxy = Arc::new(FakeExternalSourceProxy::with_source("es-1", "crm", true));
    proxy.update_failures.lock().unwrap().push_back(409);
    let mut planned = ResourceData::new(planned("crm", false, None));
    planned.set_id("es-1");

    let response = ExternalSourceResource::with_proxy(proxy.clone(), true)
        .update(UpdateResourceRequest {
            type_name: RESOURCE_TYPE.to_string(),
            prior_state: state_of("es-1"),
            planned_state: planned.state().clone(),
            config: DynamicValue::object(),
        })
        .await;

    assert!(response.diagnostics.is_empty(), "{:?}", response.diagnostics);
    let versions: Vec<_> = proxy
        .updates
        .lock()
        .unwrap()
        .iter()
        .map(|u| u.version)
        .collect();
    assert_eq!(versions, vec![Some(1), Some(2)]);
    assert_eq!(
        ResourceData::new(response.new_state).get_bool("active"),
        Some(false)
    );
}

#[tokio::test(start_paused = true)]
async fn delete_waits_until_source_is_gone() {
    let proxy = Arc::new(FakeExternalSourceProxy::with_source("es-1", "crm", true));
    *proxy.lingering_reads.lock().unwrap() = 2;

    let response = ExternalSourceResource::with_proxy(proxy.clone(), true)
        .delete(delete_request("es-1"))
        .await;

    assert!(response.diagnostics.is_empty(), "{:?}", response.diagnostics);
    assert_eq!(proxy.calls("delete es-1"), 1);
    assert_eq!(proxy.calls("get es-1"), 3);
}

#[tokio::test]
async fn delete_of_missing_source_succeeds() {
    let proxy = Arc::new(FakeExternalSourceProxy::default());

    let response = ExternalSourceResource::with_proxy(proxy.clone(), true)
        .delete(delete_request("es-9"))
        .await;

    assert!(response.diagnostics.is_empty());
    assert_eq!(proxy.calls("get es-9"), 0);
}

#[tokio::test(start_paused = true)]
async fn data_source_waits_for_new_source() {
    let proxy = Arc::new(FakeExternalSourceProxy::with_source("es-1", "crm", true));
    *proxy.hidden_lookups.lock().unwrap() = 2;
    let mut config = ResourceData::new(DynamicValue::object());
    config.set("name", Dynamic::String("crm".to_string()));

    let response = ExternalSourceDataSource::with_proxy(proxy.clone())
        .read(ReadDataSourceRequest {
            type_name: RESOURCE_TYPE.to_string(),
            config: config.state().clone(),
        })
        .await;

    assert!(response.diagnostics.is_empty(), "{:?}", response.diagnostics);
    assert_eq!(ResourceData::new(response.state).id(), "es-1");
    assert_eq!(proxy.calls("lookup crm"), 3);
}

#[tokio::test]
async fn export_lists_active_and_inactive_sources() {
    let proxy = Arc::new(FakeExternalSourceProxy::with_source("es-1", "crm", true));
    proxy.sources.lock().unwrap().insert(
        "es-2".to_string(),
        ExternalSource {
            id: Some("es-2".to_string()),
            name: Some("legacy crm".to_string()),
            active: Some(false),
            ..ExternalSource::default()
        },
    );

    let resource = ExternalSourceResource::with_proxy(proxy.clone(), true);
    let resources = resource.get_resources().await.unwrap();

    assert_eq!(resources.len(), 2);
    assert_eq!(resources["es-2"].name, "legacy crm");
    assert_eq!(proxy.calls("list "), 1);
}
