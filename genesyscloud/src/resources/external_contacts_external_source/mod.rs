//! `genesyscloud_externalcontacts_external_source` resource and data source

mod data_source;
mod model;
mod proxy;
mod resource;
mod schema;

#[cfg(test)]
mod resource_test;

pub use data_source::ExternalSourceDataSource;
pub use proxy::{ExternalSourceProxy, RestExternalSourceProxy};
pub use resource::ExternalSourceResource;
pub use schema::{external_source_data_source_schema, external_source_schema};

pub const RESOURCE_TYPE: &str = "genesyscloud_externalcontacts_external_source";
