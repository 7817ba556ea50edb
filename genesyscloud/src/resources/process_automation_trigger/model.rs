use serde::Deserialize;
use tfcore::{Dynamic, ResourceData};

use super::RESOURCE_TYPE;
use crate::api::process_automation::{Target, Trigger, WorkflowTargetSettings};
use crate::resources::{optional_string, single_block};
use crate::util::ProviderError;

#[derive(Debug, Clone, Deserialize)]
pub struct TriggerModel {
    pub name: String,
    pub topic_name: String,
    pub enabled: bool,
    pub target: Option<Vec<TargetModel>>,
    pub match_criteria: Option<String>,
    pub event_ttl_seconds: Option<i64>,
    pub delay_by_seconds: Option<i64>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TargetModel {
    #[serde(rename = "type")]
    pub target_type: String,
    pub id: String,
    pub workflow_target_settings: Option<Vec<WorkflowTargetSettingsModel>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WorkflowTargetSettingsModel {
    pub data_format: Option<String>,
}

fn positive(value: Option<i64>) -> Option<i64> {
    value.filter(|v| *v > 0)
}

/// A trigger either expires stale events or delays fresh ones, never both
pub fn check_ttl_and_delay(
    event_ttl_seconds: Option<i64>,
    delay_by_seconds: Option<i64>,
) -> Result<(), ProviderError> {
    match (positive(event_ttl_seconds), positive(delay_by_seconds)) {
        (Some(_), Some(_)) => Err(ProviderError::invalid(
            RESOURCE_TYPE,
            "Only one of event_ttl_seconds or delay_by_seconds can be set.",
            "event_ttl_seconds and delay_by_seconds are both set",
        )),
        _ => Ok(()),
    }
}

pub fn parse_match_criteria(raw: Option<&str>) -> Result<Option<serde_json::Value>, ProviderError> {
    match raw {
        Some(raw) if !raw.trim().is_empty() => serde_json::from_str(raw).map(Some).map_err(|e| {
            ProviderError::invalid(RESOURCE_TYPE, "Failed to parse match_criteria", e.to_string())
        }),
        _ => Ok(None),
    }
}

impl TriggerModel {
    pub fn check_ttl_and_delay(&self) -> Result<(), ProviderError> {
        check_ttl_and_delay(self.event_ttl_seconds, self.delay_by_seconds)
    }

    /// Request body for create and update; `version` is left to the caller
    pub fn to_trigger(&self) -> Result<Trigger, ProviderError> {
        let match_criteria = parse_match_criteria(self.match_criteria.as_deref())?;

        Ok(Trigger {
            topic_name: Some(self.topic_name.clone()),
            name: Some(self.name.clone()),
            target: Some(self.build_target()),
            match_criteria,
            enabled: Some(self.enabled),
            event_ttl_seconds: positive(self.event_ttl_seconds),
            delay_by_seconds: positive(self.delay_by_seconds),
            description: Some(self.description.clone().unwrap_or_default()),
            ..Trigger::default()
        })
    }

    fn build_target(&self) -> Target {
        let Some(target) = self.target.as_ref().and_then(|t| t.first()) else {
            return Target::default();
        };

        let data_format = target
            .workflow_target_settings
            .as_ref()
            .and_then(|s| s.first())
            .and_then(|s| s.data_format.clone())
            .filter(|f| !f.is_empty());

        Target {
            target_type: Some(target.target_type.clone()),
            id: Some(target.id.clone()),
            workflow_target_settings: data_format.map(|data_format| WorkflowTargetSettings {
                data_format: Some(data_format),
            }),
        }
    }
}

fn flatten_target(target: &Target) -> Dynamic {
    let settings = match &target.workflow_target_settings {
        Some(settings) => single_block(vec![(
            "data_format",
            optional_string(settings.data_format.as_deref()),
        )]),
        None => Dynamic::List(Vec::new()),
    };

    single_block(vec![
        ("type", optional_string(target.target_type.as_deref())),
        ("id", optional_string(target.id.as_deref())),
        ("workflow_target_settings", settings),
    ])
}

/// The JSON string already in state wins when it means the same thing
fn flatten_match_criteria(current: Option<String>, remote: Option<&serde_json::Value>) -> Dynamic {
    let Some(remote) = remote else {
        return Dynamic::Null;
    };

    let unchanged = current
        .as_deref()
        .and_then(|raw| serde_json::from_str::<serde_json::Value>(raw).ok())
        .map(|parsed| &parsed == remote)
        .unwrap_or(false);

    match current {
        Some(raw) if unchanged => Dynamic::String(raw),
        _ => Dynamic::String(remote.to_string()),
    }
}

/// Copies a trigger read from the API into state
pub fn flatten_trigger(trigger: &Trigger, data: &mut ResourceData) {
    data.set_optional_string("name", trigger.name.clone());
    data.set_optional_string("topic_name", trigger.topic_name.clone());
    let match_criteria =
        flatten_match_criteria(data.get_string("match_criteria"), trigger.match_criteria.as_ref());
    data.set("match_criteria", match_criteria);
    data.set(
        "target",
        trigger
            .target
            .as_ref()
            .map(flatten_target)
            .unwrap_or(Dynamic::Null),
    );
    data.set_optional_bool("enabled", trigger.enabled);
    data.set_optional_int("event_ttl_seconds", trigger.event_ttl_seconds);
    data.set_optional_int("delay_by_seconds", trigger.delay_by_seconds);
    data.set_optional_string("description", trigger.description.clone());
}
