use async_trait::async_trait;
use std::sync::Arc;

use super::RESOURCE_TYPE;
use crate::api::architect::Schedule;
use crate::api::{ApiError, ApiResponse};
use crate::provider_meta::ProviderMeta;
use crate::resource_cache::{CacheInterface, ResourceCache};
use crate::util::{ProviderError, RetryOutcome};

#[async_trait]
pub trait ScheduleProxy: Send + Sync {
    async fn get_all_schedules(&self) -> Result<(Vec<Schedule>, ApiResponse), ApiError>;

    /// Retryable while the name may still appear
    async fn get_schedule_id_by_name(&self, name: &str) -> RetryOutcome<String>;

    async fn get_schedule_by_id(&self, id: &str) -> Result<(Schedule, ApiResponse), ApiError>;

    async fn create_schedule(&self, schedule: &Schedule)
        -> Result<(Schedule, ApiResponse), ApiError>;

    async fn update_schedule(
        &self,
        id: &str,
        schedule: &Schedule,
    ) -> Result<(Schedule, ApiResponse), ApiError>;

    async fn delete_schedule(&self, id: &str) -> Result<ApiResponse, ApiError>;

    async fn home_division_id(&self) -> Result<String, ProviderError>;
}

pub struct RestScheduleProxy {
    meta: Arc<ProviderMeta>,
    cache: ResourceCache<Schedule>,
}

impl RestScheduleProxy {
    pub fn new(meta: Arc<ProviderMeta>) -> Self {
        Self {
            meta,
            cache: ResourceCache::new(),
        }
    }
}

#[async_trait]
impl ScheduleProxy for RestScheduleProxy {
    async fn get_all_schedules(&self) -> Result<(Vec<Schedule>, ApiResponse), ApiError> {
        let (schedules, response) = self.meta.client.architect().list_all_schedules().await?;
        for schedule in &schedules {
            if let Some(id) = schedule.id.as_deref() {
                self.cache.set(id, schedule.clone());
            }
        }
        Ok((schedules, response))
    }

    async fn get_schedule_id_by_name(&self, name: &str) -> RetryOutcome<String> {
        let (schedules, response) = match self.get_all_schedules().await {
            Ok(listing) => listing,
            Err(e) => {
                return RetryOutcome::NonRetryable(ProviderError::from_api_error(
                    RESOURCE_TYPE,
                    "Failed to get architect schedules",
                    &e,
                ))
            }
        };

        if schedules.is_empty() {
            return RetryOutcome::Retryable(ProviderError::api(
                RESOURCE_TYPE,
                format!("No architect schedules found with name {}", name),
                Some(response),
            ));
        }

        match schedules
            .into_iter()
            .find(|s| s.name.as_deref() == Some(name))
            .and_then(|s| s.id)
        {
            Some(id) => {
                tracing::debug!("Retrieved the architect schedules id {} by name {}", id, name);
                RetryOutcome::Success(id)
            }
            None => RetryOutcome::Retryable(ProviderError::api(
                RESOURCE_TYPE,
                format!("Unable to find architect schedules with name {}", name),
                Some(response),
            )),
        }
    }

    async fn get_schedule_by_id(&self, id: &str) -> Result<(Schedule, ApiResponse), ApiError> {
        if let Some(schedule) = self.cache.get(id) {
            let path = format!("/api/v2/architect/schedules/{}", id);
            return Ok((schedule, ApiResponse::new(200, "GET", &path)));
        }
        self.meta.client.architect().get_schedule(id).await
    }

    async fn create_schedule(
        &self,
        schedule: &Schedule,
    ) -> Result<(Schedule, ApiResponse), ApiError> {
        self.meta.client.architect().create_schedule(schedule).await
    }

    async fn update_schedule(
        &self,
        id: &str,
        schedule: &Schedule,
    ) -> Result<(Schedule, ApiResponse), ApiError> {
        self.cache.delete(id);
        self.meta
            .client
            .architect()
            .update_schedule(id, schedule)
            .await
    }

    async fn delete_schedule(&self, id: &str) -> Result<ApiResponse, ApiError> {
        self.cache.delete(id);
        self.meta.client.architect().delete_schedule(id).await
    }

    async fn home_division_id(&self) -> Result<String, ProviderError> {
        self.meta.home_division_id().await
    }
}

#[cfg(test)]
#[allow(clippy::disallowed_methods)]
mod tests {
    use super::*;
    use crate::api::{Client, Credentials};
    use mockito::Matcher;

    async fn proxy_for(server: &mockito::Server) -> RestScheduleProxy {
        let client = Client::new(
            &server.url(),
            &server.url(),
            Credentials::AccessToken("token".to_string()),
        )
        .unwrap();
        RestScheduleProxy::new(Arc::new(ProviderMeta::new(client, true)))
    }

    #[tokio::test]
    async fn id_by_name_searches_every_page() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("GET", "/api/v2/architect/schedules")
            .match_query(Matcher::UrlEncoded("pageNumber".into(), "1".into()))
            .with_body(r#"{"entities":[{"id":"s1","name":"Weekdays"}],"pageCount":2}"#)
            .create_async()
            .await;
        let _m = server
            .mock("GET", "/api/v2/architect/schedules")
            .match_query(Matcher::UrlEncoded("pageNumber".into(), "2".into()))
            .with_body(r#"{"entities":[{"id":"s2","name":"Weekends"}],"pageCount":2}"#)
            .create_async()
            .await;

        let proxy = proxy_for(&server).await;
        match proxy.get_schedule_id_by_name("Weekends").await {
            RetryOutcome::Success(id) => assert_eq!(id, "s2"),
            other => panic!("unexpected outcome: {:?}", other),
        }
        match proxy.get_schedule_id_by_name("Holidays").await {
            RetryOutcome::Retryable(err) => assert!(err
                .to_string()
                .starts_with("Unable to find architect schedules with name Holidays")),
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[tokio::test]
    async fn empty_listing_is_retryable() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("GET", "/api/v2/architect/schedules")
            .match_query(Matcher::Any)
            .with_body(r#"{"entities":[],"pageCount":0}"#)
            .create_async()
            .await;

        let proxy = proxy_for(&server).await;
        match proxy.get_schedule_id_by_name("Weekdays").await {
            RetryOutcome::Retryable(err) => {
                assert!(err.to_string().starts_with("No architect schedules found"))
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[tokio::test]
    async fn update_bypasses_stale_cache() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("GET", "/api/v2/architect/schedules")
            .match_query(Matcher::Any)
            .with_body(r#"{"entities":[{"id":"s1","name":"Weekdays","version":1}],"pageCount":1}"#)
            .create_async()
            .await;
        let _m = server
            .mock("PUT", "/api/v2/architect/schedules/s1")
            .with_body(r#"{"id":"s1","name":"Workdays","version":2}"#)
            .create_async()
            .await;
        let get = server
            .mock("GET", "/api/v2/architect/schedules/s1")
            .with_body(r#"{"id":"s1","name":"Workdays","version":2}"#)
            .expect(1)
            .create_async()
            .await;

        let proxy = proxy_for(&server).await;
        proxy.get_all_schedules().await.unwrap();
        proxy
            .update_schedule("s1", &Schedule::default())
            .await
            .unwrap();
        let (schedule, _) = proxy.get_schedule_by_id("s1").await.unwrap();

        assert_eq!(schedule.version, Some(2));
        get.assert_async().await;
    }
}
