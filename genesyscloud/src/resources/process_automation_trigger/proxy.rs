use async_trait::async_trait;

use crate::api::process_automation::Trigger;
use crate::api::{ApiError, ApiResponse, Client};
use crate::resource_cache::{CacheInterface, ResourceCache};

#[async_trait]
pub trait TriggerProxy: Send + Sync {
    async fn get_all_triggers(&self) -> Result<(Vec<Trigger>, ApiResponse), ApiError>;

    async fn get_trigger_by_id(&self, id: &str) -> Result<(Trigger, ApiResponse), ApiError>;

    async fn create_trigger(&self, trigger: &Trigger) -> Result<(Trigger, ApiResponse), ApiError>;

    async fn update_trigger(
        &self,
        id: &str,
        trigger: &Trigger,
    ) -> Result<(Trigger, ApiResponse), ApiError>;

    async fn delete_trigger(&self, id: &str) -> Result<ApiResponse, ApiError>;
}

/// Proxy over the REST client; listing fills the cache used by later gets
pub struct RestTriggerProxy {
    client: Client,
    cache: ResourceCache<Trigger>,
}

impl RestTriggerProxy {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            cache: ResourceCache::new(),
        }
    }
}

#[async_trait]
impl TriggerProxy for RestTriggerProxy {
    async fn get_all_triggers(&self) -> Result<(Vec<Trigger>, ApiResponse), ApiError> {
        let (triggers, response) = self.client.process_automation().list_triggers().await?;
        for trigger in &triggers {
            if let Some(id) = trigger.id.as_deref() {
                self.cache.set(id, trigger.clone());
            }
        }
        Ok((triggers, response))
    }

    async fn get_trigger_by_id(&self, id: &str) -> Result<(Trigger, ApiResponse), ApiError> {
        if let Some(trigger) = self.cache.get(id) {
            let path = format!("/api/v2/processAutomation/triggers/{}", id);
            return Ok((trigger, ApiResponse::new(200, "GET", &path)));
        }
        self.client.process_automation().get_trigger(id).await
    }

    async fn create_trigger(&self, trigger: &Trigger) -> Result<(Trigger, ApiResponse), ApiError> {
        self.client.process_automation().create_trigger(trigger).await
    }

    async fn update_trigger(
        &self,
        id: &str,
        trigger: &Trigger,
    ) -> Result<(Trigger, ApiResponse), ApiError> {
        self.cache.delete(id);
        self.client
            .process_automation()
            .update_trigger(id, trigger)
            .await
    }

    async fn delete_trigger(&self, id: &str) -> Result<ApiResponse, ApiError> {
        self.cache.delete(id);
        self.client.process_automation().delete_trigger(id).await
    }
}
