//! OAuth client-credentials login

use reqwest::header::CONTENT_TYPE;
use serde::Deserialize;

use super::common::ApiResponse;
use super::error::ApiError;

/// How the client authenticates
#[derive(Clone)]
pub enum Credentials {
    /// Pre-issued bearer token
    AccessToken(String),
    /// OAuth client exchanged for a token on first use
    ClientCredentials {
        client_id: String,
        client_secret: String,
    },
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Credentials::AccessToken(_) => f.write_str("AccessToken(***)"),
            Credentials::ClientCredentials { client_id, .. } => f
                .debug_struct("ClientCredentials")
                .field("client_id", client_id)
                .field("client_secret", &"***")
                .finish(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    token_type: Option<String>,
    #[serde(default)]
    expires_in: Option<u64>,
}

/// POST {login_url}/oauth/token with basic auth
pub(crate) async fn fetch_token(
    http_client: &reqwest::Client,
    login_url: &str,
    client_id: &str,
    client_secret: &str,
) -> Result<String, ApiError> {
    let url = format!("{}/oauth/token", login_url);
    tracing::debug!("Requesting access token from {}", url);

    let response = http_client
        .post(&url)
        .basic_auth(client_id, Some(client_secret))
        .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body("grant_type=client_credentials")
        .send()
        .await?;

    let status = response.status().as_u16();
    let text = response.text().await?;

    if !(200..300).contains(&status) {
        let failed = ApiResponse::new(status, "POST", "/oauth/token").with_body(text);
        return Err(ApiError::AuthError(format!(
            "token request returned {}: {}",
            status, failed.error_message
        )));
    }

    let token: TokenResponse = serde_json::from_str(&text)
        .map_err(|e| ApiError::ParseError(format!("Failed to parse token response: {}", e)))?;

    tracing::info!(
        "Authenticated OAuth client {} ({} token, expires in {}s)",
        client_id,
        token.token_type.as_deref().unwrap_or("bearer"),
        token.expires_in.unwrap_or_default()
    );

    Ok(token.access_token)
}
