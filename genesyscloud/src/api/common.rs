//! Common types and utilities for the Genesys Cloud API

use serde::{Deserialize, Serialize};

/// Header carrying the request correlation id
pub const CORRELATION_ID_HEADER: &str = "inin-correlation-id";

/// What came back from a single HTTP exchange
///
/// Returned next to every decoded body and embedded in every API error so
/// status classifiers and diagnostics can inspect it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ApiResponse {
    pub status_code: u16,
    pub method: String,
    pub path: String,
    pub correlation_id: String,
    pub body: String,
    /// `message` from the error body, or the raw body when it isn't JSON
    pub error_message: String,
}

impl ApiResponse {
    pub fn new(status_code: u16, method: &str, path: &str) -> Self {
        Self {
            status_code,
            method: method.to_string(),
            path: path.to_string(),
            ..Default::default()
        }
    }

    pub fn with_status(status_code: u16) -> Self {
        Self {
            status_code,
            ..Default::default()
        }
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = body.into();
        self.error_message = match serde_json::from_str::<ApiErrorBody>(&self.body) {
            Ok(parsed) if !parsed.message.is_empty() => parsed.message,
            _ => self.body.clone(),
        };
        self
    }

    pub fn with_correlation_id(mut self, correlation_id: impl Into<String>) -> Self {
        self.correlation_id = correlation_id.into();
        self
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status_code)
    }
}

/// Error envelope returned by the platform
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiErrorBody {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub status: u16,
    #[serde(default)]
    pub context_id: String,
}

/// Page-number listing (`pageNumber` / `pageCount`)
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityListing<T> {
    #[serde(default = "Vec::new")]
    pub entities: Vec<T>,
    pub page_size: Option<u32>,
    pub page_number: Option<u32>,
    pub page_count: Option<u32>,
    pub total: Option<u64>,
    /// Relative URI of the next page, when the endpoint links pages
    pub next_uri: Option<String>,
}

/// Cursor listing (`cursors.after`)
#[derive(Debug, Clone, Deserialize)]
pub struct CursorListing<T> {
    #[serde(default = "Vec::new")]
    pub entities: Vec<T>,
    pub cursors: Option<Cursors>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Cursors {
    pub before: Option<String>,
    pub after: Option<String>,
}

/// Reference to another entity by id
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DomainEntityRef {
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct ApiQueryParams {
    params: Vec<(String, String)>,
}

impl ApiQueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add<K: Into<String>, V: ToString>(mut self, key: K, value: V) -> Self {
        self.params.push((key.into(), value.to_string()));
        self
    }

    pub fn add_optional<K: Into<String>, V: ToString>(mut self, key: K, value: Option<V>) -> Self {
        if let Some(v) = value {
            self.params.push((key.into(), v.to_string()));
        }
        self
    }

    pub fn to_query_string(&self) -> String {
        if self.params.is_empty() {
            String::new()
        } else {
            format!(
                "?{}",
                self.params
                    .iter()
                    .map(|(k, v)| format!("{}={}", k, urlencoding::encode(v)))
                    .collect::<Vec<_>>()
                    .join("&")
            )
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct PaginationParams {
    pub page_number: u32,
    pub page_size: u32,
}

impl Default for PaginationParams {
    fn default() -> Self {
        Self {
            page_number: 1,
            page_size: 100,
        }
    }
}

impl PaginationParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(mut self, page_number: u32) -> Self {
        self.page_number = page_number;
        self
    }

    pub fn to_query_params(&self) -> ApiQueryParams {
        ApiQueryParams::new()
            .add("pageNumber", self.page_number)
            .add("pageSize", self.page_size)
    }
}
