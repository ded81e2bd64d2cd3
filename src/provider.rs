//! Provider-facing endpoint configuration (data) and error strategies (behavior).
//!
//! `endpoints` exposes validated URLs (`ProviderEndpoints`) for the Fitbit API host, token
//! endpoint, and authorize page, defaulting to production and overridable for mock servers.
//! `strategy` defines [`ProviderStrategy`], an HTTP-client-agnostic hook used by the client
//! to map token endpoint failures into the crate error taxonomy.

pub mod endpoints;
pub mod strategy;

pub use endpoints::*;
pub use strategy::*;
