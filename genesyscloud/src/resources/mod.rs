//! Resource implementations
//!
//! One package per resource type: a proxy trait over the API calls, a typed
//! model decoded from state, the schema and the CRUD surface.

pub mod architect_schedules;
pub mod external_contacts_external_source;
pub mod process_automation_trigger;

pub use architect_schedules::{ScheduleDataSource, ScheduleResource};
pub use external_contacts_external_source::{ExternalSourceDataSource, ExternalSourceResource};
pub use process_automation_trigger::TriggerResource;

use serde::de::DeserializeOwned;
use std::sync::Arc;
use tfcore::resource::{ConfigureResourceRequest, ConfigureResourceResponse};
use tfcore::{Diagnostic, Diagnostics, Dynamic, DynamicValue, ResourceData};

use crate::provider_meta::ProviderMeta;
use crate::util::ProviderError;

/// Downcasts the provider data; the error diagnostics go straight back to Terraform
pub(crate) fn configure_provider_meta(
    request: ConfigureResourceRequest,
) -> (Option<Arc<ProviderMeta>>, ConfigureResourceResponse) {
    let mut diagnostics = Diagnostics::new();

    let meta = match request.provider_data {
        Some(data) => {
            let meta = ProviderMeta::from_provider_data(Some(data));
            if meta.is_none() {
                diagnostics.push(Diagnostic::error(
                    "Invalid provider data",
                    "Failed to extract ProviderMeta from provider data",
                ));
            }
            meta
        }
        None => {
            diagnostics.push(Diagnostic::error(
                "No provider data",
                "No provider data was provided to the resource",
            ));
            None
        }
    };

    (meta, ConfigureResourceResponse { diagnostics })
}

pub(crate) fn not_configured() -> Diagnostics {
    Diagnostic::error(
        "Provider not configured",
        "Provider data was not properly configured",
    )
    .into()
}

fn strip_unknown(value: &Dynamic) -> Dynamic {
    match value {
        Dynamic::Unknown => Dynamic::Null,
        Dynamic::List(items) => Dynamic::List(items.iter().map(strip_unknown).collect()),
        Dynamic::Map(fields) => Dynamic::Map(
            fields
                .iter()
                .map(|(k, v)| (k.clone(), strip_unknown(v)))
                .collect(),
        ),
        other => other.clone(),
    }
}

/// Decodes the typed model of a resource from its planned or current state
///
/// Values still unknown at apply time (computed attributes) decode as absent.
pub(crate) fn decode_model<T: DeserializeOwned>(
    data: &ResourceData,
    resource_type: &str,
) -> Result<T, ProviderError> {
    DynamicValue::new(strip_unknown(&data.state().value))
        .to_typed()
        .map_err(|e| {
            ProviderError::invalid(
                resource_type,
                format!("Failed to decode {} configuration", resource_type),
                e.to_string(),
            )
        })
}

/// Single element list, the state shape of a one-item nested block
pub(crate) fn single_block(fields: Vec<(&str, Dynamic)>) -> Dynamic {
    Dynamic::List(vec![Dynamic::Map(
        fields
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect(),
    )])
}

pub(crate) fn optional_string(value: Option<&str>) -> Dynamic {
    value
        .map(|v| Dynamic::String(v.to_string()))
        .unwrap_or(Dynamic::Null)
}

#[cfg(test)]
#[allow(clippy::disallowed_methods)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    struct Model {
        name: String,
        division_id: Option<String>,
    }

    #[test]
    fn unknown_values_decode_as_absent() {
        let mut data = ResourceData::new_resource(DynamicValue::object());
        data.set("id", Dynamic::Unknown);
        data.set("name", Dynamic::String("Weekdays".to_string()));
        data.set("division_id", Dynamic::Unknown);

        let model: Model = decode_model(&data, "genesyscloud_test").unwrap();
        assert_eq!(model.name, "Weekdays");
        assert!(model.division_id.is_none());
    }

    #[test]
    fn decode_failure_names_the_resource() {
        let data = ResourceData::new(DynamicValue::object());
        let err = decode_model::<Model>(&data, "genesyscloud_test").unwrap_err();
        assert!(err
            .to_string()
            .starts_with("Failed to decode genesyscloud_test configuration"));
    }

    #[test]
    fn configure_without_provider_data_reports_error() {
        let (meta, response) = configure_provider_meta(ConfigureResourceRequest {
            provider_data: None,
        });
        assert!(meta.is_none());
        assert_eq!(response.diagnostics.errors[0].summary, "No provider data");
    }
}
