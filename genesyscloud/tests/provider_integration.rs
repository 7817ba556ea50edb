#![allow(clippy::disallowed_methods)] // Allow unwrap() in tests for clarity

use genesyscloud::GenesysCloudProvider;
use mockito::{Matcher, Server};
use serial_test::serial;
use std::any::Any;
use std::sync::Arc;
use tfcore::provider::{configured_resource, ConfigureProviderRequest};
use tfcore::resource::{CreateResourceRequest, DeleteResourceRequest};
use tfcore::{Dynamic, DynamicValue, Provider, Resource, ResourceData};

const ENV_VARS: &[&str] = &[
    "GENESYSCLOUD_ACCESS_TOKEN",
    "GENESYSCLOUD_OAUTHCLIENT_ID",
    "GENESYSCLOUD_OAUTHCLIENT_SECRET",
    "GENESYSCLOUD_REGION",
    "GENESYSCLOUD_GATEWAY_PROTOCOL",
    "GENESYSCLOUD_GATEWAY_HOST",
    "GENESYSCLOUD_GATEWAY_PORT",
    "BYPASS_CONSISTENCY_CHECKER",
];

fn string(value: &str) -> Dynamic {
    Dynamic::String(value.to_string())
}

fn block(fields: &[(&str, Dynamic)]) -> Dynamic {
    Dynamic::List(vec![Dynamic::Map(
        fields
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect(),
    )])
}

/// Provider block routing every call, login included, to the mock server
fn gateway_config(server: &Server) -> DynamicValue {
    let host_with_port = server.host_with_port();
    let (host, port) = host_with_port.split_once(':').unwrap();

    let mut config = ResourceData::new(DynamicValue::object());
    config.set("oauthclient_id", string("id"));
    config.set("oauthclient_secret", string("secret"));
    config.set(
        "gateway",
        block(&[
            ("protocol", string("http")),
            ("host", string(host)),
            ("port", string(port)),
        ]),
    );
    config.state().clone()
}

async fn configured_provider(server: &Server) -> GenesysCloudProvider {
    for var in ENV_VARS {
        std::env::remove_var(var);
    }

    let mut provider = GenesysCloudProvider::new();
    let response = provider
        .configure(ConfigureProviderRequest {
            terraform_version: "1.9.0".to_string(),
            config: gateway_config(server),
        })
        .await;
    assert!(response.diagnostics.errors.is_empty(), "{:?}", response.diagnostics);
    provider
}

async fn token_mock(server: &mut Server) -> mockito::Mock {
    server
        .mock("POST", "/oauth/token")
        .match_header("authorization", "Basic aWQ6c2VjcmV0")
        .with_body(r#"{"access_token":"abc","token_type":"bearer","expires_in":86400}"#)
        .expect(1)
        .create_async()
        .await
}

#[tokio::test]
#[serial]
async fn trigger_lifecycle_through_gateway() {
    let mut server = Server::new_async().await;
    let token = token_mock(&mut server).await;

    let trigger = r#"{
        "id": "t-1",
        "name": "On disconnect",
        "topicName": "v2.detail.events.conversation.{id}.customer.end",
        "enabled": true,
        "target": {"type": "Workflow", "id": "flow-1"},
        "matchCriteria": [{"jsonPath": "mediaType", "operator": "Equal", "value": "VOICE"}],
        "description": "",
        "version": 1
    }"#;
    let create = server
        .mock("POST", "/api/v2/processAutomation/triggers")
        .match_header("authorization", "Bearer abc")
        .match_body(Matcher::PartialJsonString(
            r#"{"name":"On disconnect","target":{"type":"Workflow","id":"flow-1"}}"#.to_string(),
        ))
        .with_body(trigger)
        .expect(1)
        .create_async()
        .await;
    let _get = server
        .mock("GET", "/api/v2/processAutomation/triggers/t-1")
        .with_body(trigger)
        .create_async()
        .await;
    let delete = server
        .mock("DELETE", "/api/v2/processAutomation/triggers/t-1")
        .with_status(204)
        .expect(1)
        .create_async()
        .await;

    let provider = configured_provider(&server).await;
    let resource = configured_resource(
        &provider,
        "genesyscloud_processautomation_trigger",
        provider
            .meta()
            .map(|meta| meta as Arc<dyn Any + Send + Sync>),
    )
    .await
    .unwrap();

    let mut planned = ResourceData::new(DynamicValue::object());
    planned.set("id", Dynamic::Unknown);
    planned.set("name", string("On disconnect"));
    planned.set(
        "topic_name",
        string("v2.detail.events.conversation.{id}.customer.end"),
    );
    planned.set("enabled", Dynamic::Bool(true));
    planned.set(
        "target",
        block(&[
            ("type", string("Workflow")),
            ("id", string("flow-1")),
            ("workflow_target_settings", Dynamic::List(Vec::new())),
        ]),
    );
    planned.set(
        "match_criteria",
        string(r#"[{"jsonPath":"mediaType","operator":"Equal","value":"VOICE"}]"#),
    );

    let created = resource
        .create(CreateResourceRequest {
            type_name: "genesyscloud_processautomation_trigger".to_string(),
            planned_state: planned.state().clone(),
            config: planned.state().clone(),
        })
        .await;
    assert!(created.diagnostics.errors.is_empty(), "{:?}", created.diagnostics);
    let state = ResourceData::new(created.new_state.clone());
    assert_eq!(state.id(), "t-1");

    let deleted = resource
        .delete(DeleteResourceRequest {
            type_name: "genesyscloud_processautomation_trigger".to_string(),
            prior_state: created.new_state,
        })
        .await;
    assert!(deleted.diagnostics.errors.is_empty(), "{:?}", deleted.diagnostics);

    token.assert_async().await;
    create.assert_async().await;
    delete.assert_async().await;
}

#[tokio::test]
#[serial]
async fn export_reads_schedules_from_listing() {
    let mut server = Server::new_async().await;
    let _token = token_mock(&mut server).await;
    let _list = server
        .mock("GET", "/api/v2/architect/schedules")
        .match_query(Matcher::Any)
        .with_body(
            r#"{"entities":[{"id":"s-1","name":"Office Hours","division":{"id":"div-1"},
                "start":"2024-01-02T08:00:00.000","end":"2024-01-02T17:00:00.000",
                "rrule":"FREQ=DAILY","version":3,"state":"active"}],"pageCount":1}"#,
        )
        .create_async()
        .await;
    let get = server
        .mock("GET", "/api/v2/architect/schedules/s-1")
        .expect(0)
        .create_async()
        .await;

    let provider = configured_provider(&server).await;
    let exported = provider
        .export(&["genesyscloud_architect_schedules".to_string()])
        .await
        .unwrap();

    assert_eq!(exported.len(), 1);
    assert_eq!(exported[0].name, "Office_Hours_153464464");
    assert_eq!(exported[0].id, "s-1");
    let state = exported[0].state.as_map().unwrap();
    assert_eq!(state["start"], string("2024-01-02T08:00:00.000000"));
    assert_eq!(state["division_id"], string("div-1"));
    get.assert_async().await;
}

#[tokio::test]
#[serial]
async fn export_of_unknown_type_fails() {
    let server = Server::new_async().await;
    let provider = configured_provider(&server).await;

    let err = provider
        .export(&["genesyscloud_user".to_string()])
        .await
        .unwrap_err();
    assert_eq!(err.errors[0].summary, "Unknown resource type genesyscloud_user");
}

#[tokio::test]
#[serial]
async fn provider_schema_marks_secrets_sensitive() {
    let schema = GenesysCloudProvider::new().schema();
    for name in ["access_token", "oauthclient_secret"] {
        assert!(schema.block.attribute(name).unwrap().sensitive, "{}", name);
    }
    assert!(!schema.block.attribute("oauthclient_id").unwrap().sensitive);
}
