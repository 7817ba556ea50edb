use serde::Deserialize;

use super::common::ApiResponse;
use super::error::ApiError;
use super::Client;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Division {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub home_division: bool,
}

pub struct AuthorizationApi<'a> {
    client: &'a Client,
}

impl<'a> AuthorizationApi<'a> {
    pub fn new(client: &'a Client) -> Self {
        Self { client }
    }

    /// GET /api/v2/authorization/divisions/home
    pub async fn home_division(&self) -> Result<(Division, ApiResponse), ApiError> {
        self.client.get("/api/v2/authorization/divisions/home").await
    }
}
