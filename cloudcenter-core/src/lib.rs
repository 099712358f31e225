//! CloudCenter Core
//!
//! Resource model, attribute schemas and the provider trait shared by the
//! CloudCenter provider and its hosts.

pub mod provider;
pub mod resource;
pub mod schema;
