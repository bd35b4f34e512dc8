//! BookHub library backend.
//!
//! Hexagonal layout: [`domain`] holds entities, use cases and ports;
//! [`outbound`] provides PostgreSQL and in-memory adapters; [`inbound`]
//! exposes the HTTP API.

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;
pub mod settings;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
pub use middleware::Trace;
