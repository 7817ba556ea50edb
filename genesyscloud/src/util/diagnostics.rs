//! Turning provider failures into Terraform diagnostics
//!
//! API failures carry a JSON detail so users can hand the correlation id to
//! support without reproducing the call.

use serde::Serialize;
use tfcore::{Diagnostic, Diagnostics};

use super::retries::RetryError;
use super::ProviderError;
use crate::api::ApiResponse;

#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
struct DetailedDiagnosticInfo<'a> {
    #[serde(skip_serializing_if = "str::is_empty")]
    resource_name: &'a str,
    #[serde(skip_serializing_if = "str::is_empty")]
    method: &'a str,
    #[serde(skip_serializing_if = "str::is_empty")]
    path: &'a str,
    #[serde(skip_serializing_if = "is_zero")]
    status_code: u16,
    #[serde(skip_serializing_if = "str::is_empty")]
    error_message: &'a str,
    #[serde(skip_serializing_if = "str::is_empty")]
    correlation_id: &'a str,
}

fn is_zero(status: &u16) -> bool {
    *status == 0
}

fn to_json(info: &DetailedDiagnosticInfo<'_>) -> String {
    serde_json::to_string(info).unwrap_or_else(|_| format!("{:?}", info))
}

/// Error diagnostic describing a failed API call
pub fn api_diagnostic(
    resource_type: &str,
    summary: &str,
    response: Option<&ApiResponse>,
) -> Diagnostic {
    let info = match response {
        Some(response) => DetailedDiagnosticInfo {
            resource_name: resource_type,
            method: &response.method,
            path: &response.path,
            status_code: response.status_code,
            error_message: &response.error_message,
            correlation_id: &response.correlation_id,
        },
        None => DetailedDiagnosticInfo {
            resource_name: resource_type,
            ..DetailedDiagnosticInfo::default()
        },
    };
    Diagnostic::error(summary, to_json(&info))
}

/// Error diagnostic for a failure that never reached the API
pub fn error_diagnostic(resource_type: &str, summary: &str, detail: &str) -> Diagnostic {
    let info = DetailedDiagnosticInfo {
        resource_name: resource_type,
        error_message: detail,
        ..DetailedDiagnosticInfo::default()
    };
    Diagnostic::error(summary, to_json(&info))
}

impl ProviderError {
    pub fn to_diagnostic(&self) -> Diagnostic {
        match self {
            ProviderError::Api {
                resource_type,
                summary,
                response,
            } => api_diagnostic(resource_type, summary, response.as_ref()),
            ProviderError::Invalid {
                resource_type,
                summary,
                detail,
            } => error_diagnostic(resource_type, summary, detail),
            ProviderError::Consistency(err) => {
                error_diagnostic(&err.resource_type, &err.to_string(), "")
            }
        }
    }
}

impl From<ProviderError> for Diagnostics {
    fn from(err: ProviderError) -> Self {
        err.to_diagnostic().into()
    }
}

impl From<RetryError> for Diagnostics {
    fn from(err: RetryError) -> Self {
        match err {
            RetryError::Failed(last) | RetryError::Timeout { last, .. } => last.into(),
            RetryError::Exhausted { attempts, last } => {
                let mut diagnostic = last.to_diagnostic();
                diagnostic.summary = format!(
                    "{} (gave up after {} attempts)",
                    diagnostic.summary, attempts
                );
                diagnostic.into()
            }
            wait @ RetryError::WaitTimeout { .. } => {
                Diagnostic::error(wait.to_string(), "the operation did not complete in time")
                    .into()
            }
        }
    }
}
