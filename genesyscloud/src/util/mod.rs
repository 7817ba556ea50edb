//! Retry, status and diagnostic helpers shared by every resource package

pub mod diagnostics;
pub mod retries;
pub mod status;

use thiserror::Error;

use crate::api::{ApiError, ApiResponse};
use crate::consistency_checker::ConsistencyError;

pub use retries::{
    retry_until, retry_when, with_retries, with_retries_for_read, Backoff, RetryError,
    RetryOutcome, RetryPolicy, DEFAULT_READ_TIMEOUT,
};
pub use status::{
    classify, error_kind, is_status_400, is_status_404, is_status_409, is_status_412,
    is_version_mismatch, ErrorKind,
};

/// Failure reason carried through retry loops and turned into diagnostics
#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    /// A call against the platform failed
    #[error("{summary}")]
    Api {
        resource_type: String,
        summary: String,
        response: Option<ApiResponse>,
    },

    /// Local validation or decoding failed before anything was sent
    #[error("{summary}: {detail}")]
    Invalid {
        resource_type: String,
        summary: String,
        detail: String,
    },

    #[error(transparent)]
    Consistency(#[from] ConsistencyError),
}

impl ProviderError {
    pub fn api(
        resource_type: &str,
        summary: impl Into<String>,
        response: Option<ApiResponse>,
    ) -> Self {
        ProviderError::Api {
            resource_type: resource_type.to_string(),
            summary: summary.into(),
            response,
        }
    }

    /// Wraps a client error, keeping the HTTP exchange when there was one
    pub fn from_api_error(resource_type: &str, summary: impl Into<String>, err: &ApiError) -> Self {
        ProviderError::Api {
            resource_type: resource_type.to_string(),
            summary: format!("{} | error: {}", summary.into(), err),
            response: err.response().cloned(),
        }
    }

    pub fn invalid(
        resource_type: &str,
        summary: impl Into<String>,
        detail: impl Into<String>,
    ) -> Self {
        ProviderError::Invalid {
            resource_type: resource_type.to_string(),
            summary: summary.into(),
            detail: detail.into(),
        }
    }

    pub fn response(&self) -> Option<&ApiResponse> {
        match self {
            ProviderError::Api { response, .. } => response.as_ref(),
            _ => None,
        }
    }

    pub fn resource_type(&self) -> &str {
        match self {
            ProviderError::Api { resource_type, .. }
            | ProviderError::Invalid { resource_type, .. } => resource_type,
            ProviderError::Consistency(err) => &err.resource_type,
        }
    }

    /// 404, 408 or 410 from the platform
    pub fn is_not_found(&self) -> bool {
        self.response().map(classify) == Some(ErrorKind::NotFound)
    }
}
