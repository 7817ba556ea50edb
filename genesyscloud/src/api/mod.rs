pub mod architect;
pub mod auth;
pub mod authorization;
pub mod client;
pub mod common;
pub mod error;
pub mod external_contacts;
pub mod process_automation;

pub use auth::Credentials;
pub use client::{Client, RetryConfig};
pub use common::{ApiQueryParams, ApiResponse, DomainEntityRef, PaginationParams};
pub use error::ApiError;
