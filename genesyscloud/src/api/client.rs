use reqwest::header::{AUTHORIZATION, RETRY_AFTER};
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::OnceCell;

use super::auth::{fetch_token, Credentials};
use super::common::{ApiQueryParams, ApiResponse, CORRELATION_ID_HEADER};
use super::error::ApiError;

/// Genesys Cloud REST client
///
/// Cheap to clone; all clones share one connection pool and one token.
#[derive(Clone)]
pub struct Client {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    http_client: reqwest::Client,
    base_url: String,
    login_url: String,
    credentials: Credentials,
    token: OnceCell<String>,
    retry_config: RetryConfig,
}

/// Transport-level retry for throttling and server errors
#[derive(Clone, Debug)]
pub struct RetryConfig {
    pub max_retries: u32,
    pub initial_backoff_ms: u64,
    pub max_backoff_ms: u64,
    pub timeout_seconds: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_backoff_ms: 100,
            max_backoff_ms: 10000,
            timeout_seconds: 30,
        }
    }
}

/// Doubles from `initial_backoff_ms`; saturates instead of overflowing
fn exponential_backoff(config: &RetryConfig, attempt: u32) -> Duration {
    let factor = 2_u64.checked_pow(attempt.saturating_sub(1)).unwrap_or(u64::MAX);
    Duration::from_millis(config.initial_backoff_ms.saturating_mul(factor))
}

impl Client {
    /// Create a new API client with default configuration
    pub fn new(
        base_url: &str,
        login_url: &str,
        credentials: Credentials,
    ) -> Result<Self, ApiError> {
        Self::with_config(base_url, login_url, credentials, RetryConfig::default())
    }

    /// Create a new API client with custom retry configuration
    pub fn with_config(
        base_url: &str,
        login_url: &str,
        credentials: Credentials,
        retry_config: RetryConfig,
    ) -> Result<Self, ApiError> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(retry_config.timeout_seconds))
            .user_agent(concat!(
                "terraform-provider-genesyscloud/",
                env!("CARGO_PKG_VERSION")
            ))
            .build()?;

        Ok(Self {
            inner: Arc::new(ClientInner {
                http_client,
                base_url: base_url.trim_end_matches('/').to_string(),
                login_url: login_url.trim_end_matches('/').to_string(),
                credentials,
                token: OnceCell::new(),
                retry_config,
            }),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.inner.base_url
    }

    /// Execute a GET request with retry logic
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<(T, ApiResponse), ApiError> {
        self.execute_with_retry::<T, ()>(Method::GET, path, None)
            .await
    }

    /// Execute a GET request with query parameters
    pub async fn get_with_params<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &ApiQueryParams,
    ) -> Result<(T, ApiResponse), ApiError> {
        let full_path = format!("{}{}", path, params.to_query_string());
        self.get(&full_path).await
    }

    /// Execute a POST request with retry logic
    pub async fn post<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<(T, ApiResponse), ApiError> {
        self.execute_with_retry(Method::POST, path, Some(body)).await
    }

    /// Execute a PUT request with retry logic
    pub async fn put<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<(T, ApiResponse), ApiError> {
        self.execute_with_retry(Method::PUT, path, Some(body)).await
    }

    /// Execute a DELETE request with retry logic
    pub async fn delete<T: DeserializeOwned>(
        &self,
        path: &str,
    ) -> Result<(T, ApiResponse), ApiError> {
        self.execute_with_retry::<T, ()>(Method::DELETE, path, None)
            .await
    }

    /// Processing automation API operations
    pub fn process_automation(&self) -> crate::api::process_automation::ProcessAutomationApi<'_> {
        crate::api::process_automation::ProcessAutomationApi::new(self)
    }

    /// Architect API operations
    pub fn architect(&self) -> crate::api::architect::ArchitectApi<'_> {
        crate::api::architect::ArchitectApi::new(self)
    }

    /// External contacts API operations
    pub fn external_contacts(&self) -> crate::api::external_contacts::ExternalContactsApi<'_> {
        crate::api::external_contacts::ExternalContactsApi::new(self)
    }

    /// Authorization API operations
    pub fn authorization(&self) -> crate::api::authorization::AuthorizationApi<'_> {
        crate::api::authorization::AuthorizationApi::new(self)
    }

    async fn auth_header(&self) -> Result<String, ApiError> {
        let token = match &self.inner.credentials {
            Credentials::AccessToken(token) => token.clone(),
            Credentials::ClientCredentials {
                client_id,
                client_secret,
            } => self
                .inner
                .token
                .get_or_try_init(|| {
                    fetch_token(
                        &self.inner.http_client,
                        &self.inner.login_url,
                        client_id,
                        client_secret,
                    )
                })
                .await?
                .clone(),
        };
        Ok(format!("Bearer {}", token))
    }

    /// Execute request with retry logic
    async fn execute_with_retry<T, B>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<(T, ApiResponse), ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let auth_header = self.auth_header().await?;
        let url = format!("{}{}", self.inner.base_url, path);
        let config = &self.inner.retry_config;

        let mut attempt = 0;
        let mut last_error = None;
        let mut retry_after: Option<Duration> = None;

        while attempt <= config.max_retries {
            if attempt > 0 {
                let backoff = retry_after
                    .take()
                    .unwrap_or_else(|| exponential_backoff(config, attempt));
                let backoff = backoff.min(Duration::from_millis(config.max_backoff_ms));
                tracing::debug!(
                    "Retrying {} {} after {:?} (attempt {})",
                    method,
                    path,
                    backoff,
                    attempt
                );
                tokio::time::sleep(backoff).await;
            }

            tracing::debug!("{} request to: {}", method, url);

            let mut request = self
                .inner
                .http_client
                .request(method.clone(), &url)
                .header(AUTHORIZATION, &auth_header);
            if let Some(body) = body {
                request = request.json(body);
            }

            match request.send().await {
                Ok(response) => {
                    retry_after = response
                        .headers()
                        .get(RETRY_AFTER)
                        .and_then(|v| v.to_str().ok())
                        .and_then(|v| v.parse::<u64>().ok())
                        .map(Duration::from_secs);

                    let api_response = Self::read_response(method.as_str(), path, response).await?;

                    if api_response.is_success() {
                        return Self::parse_success_response(api_response);
                    }

                    match api_response.status_code {
                        401 => return Err(ApiError::AuthError(api_response.error_message)),
                        429 => last_error = Some(ApiError::RateLimited(Box::new(api_response))),
                        status if status >= 500 => {
                            last_error =
                                Some(ApiError::ServiceUnavailable(Some(Box::new(api_response))))
                        }
                        _ => return Err(ApiError::from_response(api_response)),
                    }
                }
                Err(e) => {
                    if e.is_timeout() {
                        last_error = Some(ApiError::Timeout(config.timeout_seconds));
                    } else if e.is_connect() {
                        last_error = Some(ApiError::ServiceUnavailable(None));
                    } else {
                        return Err(ApiError::RequestError(e));
                    }
                }
            }

            attempt += 1;
        }

        Err(last_error.unwrap_or(ApiError::ServiceUnavailable(None)))
    }

    async fn read_response(
        method: &str,
        path: &str,
        response: reqwest::Response,
    ) -> Result<ApiResponse, ApiError> {
        let status = response.status().as_u16();
        let correlation_id = response
            .headers()
            .get(CORRELATION_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        let text = response.text().await?;

        Ok(ApiResponse::new(status, method, path)
            .with_correlation_id(correlation_id)
            .with_body(text))
    }

    /// Empty bodies decode as JSON null so `()` and `Option<T>` work for 204s
    fn parse_success_response<T: DeserializeOwned>(
        response: ApiResponse,
    ) -> Result<(T, ApiResponse), ApiError> {
        tracing::debug!("API response body: {}", response.body);

        let text = if response.body.trim().is_empty() {
            "null"
        } else {
            response.body.as_str()
        };

        match serde_json::from_str::<T>(text) {
            Ok(data) => Ok((data, response)),
            Err(e) => {
                tracing::error!(
                    "Failed to deserialize response: {}, body: {}",
                    e,
                    response.body
                );
                Err(ApiError::ParseError(format!(
                    "Failed to parse response: {}",
                    e
                )))
            }
        }
    }
}
