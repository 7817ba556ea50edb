//! External contacts external source API

use serde::de::IgnoredAny;
use serde::{Deserialize, Serialize};

use super::common::{ApiQueryParams, ApiResponse, CursorListing};
use super::error::ApiError;
use super::Client;

const EXTERNAL_SOURCES_PATH: &str = "/api/v2/externalcontacts/externalsources";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExternalSource {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link_configuration: Option<LinkConfiguration>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkConfiguration {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uri_template: Option<String>,
}

pub struct ExternalContactsApi<'a> {
    client: &'a Client,
}

impl<'a> ExternalContactsApi<'a> {
    pub fn new(client: &'a Client) -> Self {
        Self { client }
    }

    /// One cursor page of sources with the given `active` flag
    pub async fn list_external_sources(
        &self,
        cursor: Option<&str>,
        name: Option<&str>,
        active: bool,
    ) -> Result<(CursorListing<ExternalSource>, ApiResponse), ApiError> {
        let params = ApiQueryParams::new()
            .add_optional("cursor", cursor.filter(|c| !c.is_empty()))
            .add("limit", 100)
            .add_optional("name", name.filter(|n| !n.is_empty()))
            .add("active", active);
        self.client
            .get_with_params(EXTERNAL_SOURCES_PATH, &params)
            .await
    }

    /// Active sources first, then inactive ones, each walked by cursor
    pub async fn list_all_external_sources(
        &self,
        name: Option<&str>,
    ) -> Result<(Vec<ExternalSource>, Option<ApiResponse>), ApiError> {
        let mut sources = Vec::new();
        let mut last_response = None;

        for active in [true, false] {
            let mut cursor: Option<String> = None;
            loop {
                let (page, response) = self
                    .list_external_sources(cursor.as_deref(), name, active)
                    .await?;
                last_response = Some(response);

                if page.entities.is_empty() {
                    break;
                }
                sources.extend(page.entities);

                match page.cursors.and_then(|c| c.after) {
                    Some(after) => cursor = Some(after),
                    None => break,
                }
            }
        }

        Ok((sources, last_response))
    }

    /// GET /api/v2/externalcontacts/externalsources/{id}
    pub async fn get_external_source(
        &self,
        id: &str,
    ) -> Result<(ExternalSource, ApiResponse), ApiError> {
        self.client
            .get(&format!("{}/{}", EXTERNAL_SOURCES_PATH, id))
            .await
    }

    /// POST /api/v2/externalcontacts/externalsources
    pub async fn create_external_source(
        &self,
        source: &ExternalSource,
    ) -> Result<(ExternalSource, ApiResponse), ApiError> {
        self.client.post(EXTERNAL_SOURCES_PATH, source).await
    }

    /// PUT /api/v2/externalcontacts/externalsources/{id}
    pub async fn update_external_source(
        &self,
        id: &str,
        source: &ExternalSource,
    ) -> Result<(ExternalSource, ApiResponse), ApiError> {
        self.client
            .put(&format!("{}/{}", EXTERNAL_SOURCES_PATH, id), source)
            .await
    }

    /// DELETE /api/v2/externalcontacts/externalsources/{id}
    pub async fn delete_external_source(&self, id: &str) -> Result<ApiResponse, ApiError> {
        self.client
            .delete::<IgnoredAny>(&format!("{}/{}", EXTERNAL_SOURCES_PATH, id))
            .await
            .map(|(_, response)| response)
    }
}
