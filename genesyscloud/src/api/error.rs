use thiserror::Error;

use super::common::ApiResponse;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("API Error: {status} - {message}")]
    ApiError {
        status: u16,
        message: String,
        response: Box<ApiResponse>,
    },

    #[error("Failed to parse response: {0}")]
    ParseError(String),

    #[error("Authentication failed: {0}")]
    AuthError(String),

    #[error("Request timeout after {0} seconds")]
    Timeout(u64),

    #[error("Too many requests, rate limited")]
    RateLimited(Box<ApiResponse>),

    #[error("Service unavailable, retry later")]
    ServiceUnavailable(Option<Box<ApiResponse>>),
}

impl ApiError {
    pub fn from_response(response: ApiResponse) -> Self {
        ApiError::ApiError {
            status: response.status_code,
            message: response.error_message.clone(),
            response: Box::new(response),
        }
    }

    /// The HTTP exchange behind the error, if one completed
    pub fn response(&self) -> Option<&ApiResponse> {
        match self {
            ApiError::ApiError { response, .. } | ApiError::RateLimited(response) => {
                Some(response.as_ref())
            }
            ApiError::ServiceUnavailable(response) => response.as_deref(),
            _ => None,
        }
    }

    pub fn status(&self) -> Option<u16> {
        self.response().map(|r| r.status_code)
    }
}
