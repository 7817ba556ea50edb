//! `genesyscloud_architect_schedules` resource and data source

mod data_source;
mod model;
mod proxy;
mod resource;
mod schema;


pub use data_source::ScheduleDataSource;
pub use proxy::{RestScheduleProxy, ScheduleProxy};
pub use resource::ScheduleResource;
pub use schema::{schedule_data_source_schema, schedule_schema};

pub const RESOURCE_TYPE: &str = "genesyscloud_architect_schedules";
