//! `genesyscloud_processautomation_trigger`

mod model;
mod proxy;
mod resource;
mod schema;


pub use proxy::{RestTriggerProxy, TriggerProxy};
pub use resource::TriggerResource;
pub use schema::trigger_schema;

pub const RESOURCE_TYPE: &str = "genesyscloud_processautomation_trigger";
