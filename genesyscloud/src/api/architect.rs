//! Architect schedule API

use chrono::NaiveDateTime;
use serde::de::IgnoredAny;
use serde::{Deserialize, Serialize};

use super::common::{ApiResponse, DomainEntityRef, EntityListing, PaginationParams};
use super::error::ApiError;
use super::Client;

const SCHEDULES_PATH: &str = "/api/v2/architect/schedules";

/// Schedule state once deletion has been accepted
pub const STATE_DELETED: &str = "deleted";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Schedule {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub division: Option<DomainEntityRef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, with = "local_date_time", skip_serializing_if = "Option::is_none")]
    pub start: Option<NaiveDateTime>,
    #[serde(default, with = "local_date_time", skip_serializing_if = "Option::is_none")]
    pub end: Option<NaiveDateTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rrule: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
}

/// Architect schedules use zone-less ISO-8601 with millisecond precision
mod local_date_time {
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer};

    const WRITE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3f";
    const READ_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

    pub fn serialize<S>(value: &Option<NaiveDateTime>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(dt) => serializer.serialize_str(&dt.format(WRITE_FORMAT).to_string()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<NaiveDateTime>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Option::<String>::deserialize(deserializer)?;
        raw.map(|s| {
            NaiveDateTime::parse_from_str(s.trim_end_matches('Z'), READ_FORMAT)
                .map_err(serde::de::Error::custom)
        })
        .transpose()
    }
}

pub struct ArchitectApi<'a> {
    client: &'a Client,
}

impl<'a> ArchitectApi<'a> {
    pub fn new(client: &'a Client) -> Self {
        Self { client }
    }

    /// GET /api/v2/architect/schedules for one page
    pub async fn list_schedules(
        &self,
        page: PaginationParams,
    ) -> Result<(EntityListing<Schedule>, ApiResponse), ApiError> {
        self.client
            .get_with_params(SCHEDULES_PATH, &page.to_query_params())
            .await
    }

    /// Every page up to `pageCount`
    pub async fn list_all_schedules(&self) -> Result<(Vec<Schedule>, ApiResponse), ApiError> {
        let (first, mut response) = self.list_schedules(PaginationParams::new()).await?;
        let page_count = first.page_count.unwrap_or(1);
        let mut schedules = first.entities;

        if schedules.is_empty() {
            return Ok((schedules, response));
        }

        for page_number in 2..=page_count {
            let (page, page_response) = self
                .list_schedules(PaginationParams::new().page(page_number))
                .await?;
            response = page_response;
            if page.entities.is_empty() {
                break;
            }
            schedules.extend(page.entities);
        }

        Ok((schedules, response))
    }

    /// GET /api/v2/architect/schedules/{id}
    pub async fn get_schedule(&self, id: &str) -> Result<(Schedule, ApiResponse), ApiError> {
        self.client
            .get(&format!("{}/{}", SCHEDULES_PATH, id))
            .await
    }

    /// POST /api/v2/architect/schedules
    pub async fn create_schedule(
        &self,
        schedule: &Schedule,
    ) -> Result<(Schedule, ApiResponse), ApiError> {
        self.client.post(SCHEDULES_PATH, schedule).await
    }

    /// PUT /api/v2/architect/schedules/{id}
    pub async fn update_schedule(
        &self,
        id: &str,
        schedule: &Schedule,
    ) -> Result<(Schedule, ApiResponse), ApiError> {
        self.client
            .put(&format!("{}/{}", SCHEDULES_PATH, id), schedule)
            .await
    }

    /// DELETE /api/v2/architect/schedules/{id}
    pub async fn delete_schedule(&self, id: &str) -> Result<ApiResponse, ApiError> {
        self.client
            .delete::<IgnoredAny>(&format!("{}/{}", SCHEDULES_PATH, id))
            .await
            .map(|(_, response)| response)
    }
}
