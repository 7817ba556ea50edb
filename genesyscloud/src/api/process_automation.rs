//! Process automation trigger API
//!
//! The platform SDK cannot model `matchCriteria` (values are arbitrary JSON),
//! so triggers are called through the raw client with `serde_json::Value`.

use serde::de::IgnoredAny;
use serde::{Deserialize, Serialize};

use super::common::{ApiQueryParams, ApiResponse, EntityListing};
use super::error::ApiError;
use super::Client;

const TRIGGERS_PATH: &str = "/api/v2/processAutomation/triggers";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Trigger {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub topic_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<Target>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub match_criteria: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(rename = "eventTTLSeconds", skip_serializing_if = "Option::is_none")]
    pub event_ttl_seconds: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delay_by_seconds: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Target {
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub target_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workflow_target_settings: Option<WorkflowTargetSettings>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowTargetSettings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_format: Option<String>,
}

pub struct ProcessAutomationApi<'a> {
    client: &'a Client,
}

impl<'a> ProcessAutomationApi<'a> {
    pub fn new(client: &'a Client) -> Self {
        Self { client }
    }

    /// GET /api/v2/processAutomation/triggers, following `nextUri`
    pub async fn list_triggers(&self) -> Result<(Vec<Trigger>, ApiResponse), ApiError> {
        let mut triggers = Vec::new();
        let query = ApiQueryParams::new().add("pageSize", 100);
        let mut path = format!("{}{}", TRIGGERS_PATH, query.to_query_string());

        loop {
            let (page, response): (EntityListing<Trigger>, ApiResponse) =
                self.client.get(&path).await?;

            if page.entities.is_empty() {
                return Ok((triggers, response));
            }
            triggers.extend(page.entities);

            match page.next_uri.filter(|uri| !uri.is_empty()) {
                Some(next) => path = next,
                None => return Ok((triggers, response)),
            }
        }
    }

    /// GET /api/v2/processAutomation/triggers/{id}
    pub async fn get_trigger(&self, id: &str) -> Result<(Trigger, ApiResponse), ApiError> {
        self.client
            .get(&format!("{}/{}", TRIGGERS_PATH, id))
            .await
    }

    /// POST /api/v2/processAutomation/triggers
    pub async fn create_trigger(
        &self,
        trigger: &Trigger,
    ) -> Result<(Trigger, ApiResponse), ApiError> {
        self.client.post(TRIGGERS_PATH, trigger).await
    }

    /// PUT /api/v2/processAutomation/triggers/{id}
    pub async fn update_trigger(
        &self,
        id: &str,
        trigger: &Trigger,
    ) -> Result<(Trigger, ApiResponse), ApiError> {
        self.client
            .put(&format!("{}/{}", TRIGGERS_PATH, id), trigger)
            .await
    }

    /// DELETE /api/v2/processAutomation/triggers/{id}
    pub async fn delete_trigger(&self, id: &str) -> Result<ApiResponse, ApiError> {
        self.client
            .delete::<IgnoredAny>(&format!("{}/{}", TRIGGERS_PATH, id))
            .await
            .map(|(_, response)| response)
    }
}

#[cfg(test)]
#[allow(clippy::disallowed_methods)]
mod tests {
    use super::*;
    use crate::api::{Credentials, RetryConfig};
    use mockito::Server;

    fn client_for(server: &Server) -> Client {
        Client::with_config(
            &server.url(),
            &server.url(),
            Credentials::AccessToken("token".to_string()),
            RetryConfig {
                max_retries: 0,
                ..RetryConfig::default()
            },
        )
        .unwrap()
    }

    #[test]
    fn trigger_uses_platform_field_names() {
        let trigger = Trigger {
            name: Some("on-disconnect".to_string()),
            event_ttl_seconds: Some(60),
            target: Some(Target {
                target_type: Some("Workflow".to_string()),
                id: Some("flow-1".to_string()),
                workflow_target_settings: Some(WorkflowTargetSettings {
                    data_format: Some("Json".to_string()),
                }),
            }),
            ..Trigger::default()
        };

        let json = serde_json::to_value(&trigger).unwrap();
        assert_eq!(json["eventTTLSeconds"], 60);
        assert_eq!(json["target"]["type"], "Workflow");
        assert_eq!(json["target"]["workflowTargetSettings"]["dataFormat"], "Json");
        assert!(json.get("delayBySeconds").is_none());
        assert!(json.get("id").is_none());
    }

    #[tokio::test]
    async fn list_follows_next_uri() {
        let mut server = Server::new_async().await;
        let first = server
            .mock("GET", "/api/v2/processAutomation/triggers?pageSize=100")
            .with_body(
                r#"{"entities":[{"id":"t1","name":"first"}],
                    "nextUri":"/api/v2/processAutomation/triggers?cursor=abc"}"#,
            )
            .create_async()
            .await;
        let second = server
            .mock("GET", "/api/v2/processAutomation/triggers?cursor=abc")
            .with_body(r#"{"entities":[{"id":"t2","name":"second"}]}"#)
            .create_async()
            .await;

        let client = client_for(&server);
        let (triggers, _) = client.process_automation().list_triggers().await.unwrap();

        let ids: Vec<_> = triggers.iter().filter_map(|t| t.id.as_deref()).collect();
        assert_eq!(ids, vec!["t1", "t2"]);
        first.assert_async().await;
        second.assert_async().await;
    }

    #[tokio::test]
    async fn match_criteria_round_trips_as_raw_json() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/api/v2/processAutomation/triggers/t1")
            .with_body(
                r#"{"id":"t1","matchCriteria":[{"jsonPath":"mediaType","operator":"Equal","value":"CALL"}],"version":4}"#,
            )
            .create_async()
            .await;

        let client = client_for(&server);
        let (trigger, response) = client
            .process_automation()
            .get_trigger("t1")
            .await
            .unwrap();

        assert_eq!(trigger.version, Some(4));
        assert_eq!(
            trigger.match_criteria.unwrap()[0]["operator"],
            serde_json::json!("Equal")
        );
        assert_eq!(response.path, "/api/v2/processAutomation/triggers/t1");
    }
}
