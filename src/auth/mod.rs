//! Authorization-service contract: wire types and the HTTP client.

mod client;
mod types;

pub use client::{AuthorizationService, HttpAuthorizationService};
pub use types::{RequestContext, ValidationRequest, ValidationResult};
