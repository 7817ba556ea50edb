//! tfcore - Terraform resource abstractions
//!
//! Values, schemas, diagnostics and the provider/resource/data source
//! traits the Genesys Cloud provider is written against.

// Core modules
pub mod diagnostics;
pub mod error;
pub mod resource_data;
pub mod schema;
pub mod types;
pub mod validator;

// Provider API modules
pub mod data_source;
pub mod provider;
pub mod resource;

// Helper modules
pub mod import;

// Re-exports for convenience
pub use data_source::{DataSource, DataSourceWithConfigure};
pub use diagnostics::{Diagnostic, DiagnosticSeverity, Diagnostics};
pub use error::{Result, TfcoreError};
pub use import::import_state_passthrough_id;
pub use provider::{ConfigureProviderRequest, ConfigureProviderResponse, Provider};
pub use resource::{Resource, ResourceWithConfigure};
pub use resource_data::ResourceData;
pub use schema::{
    AttributeBuilder, AttributeType, NestedBlockBuilder, NestingMode, Schema, SchemaBuilder,
};
pub use types::{AttributePath, Dynamic, DynamicValue};
