//! Resource adapters
//!
//! One adapter per CloudCenter entity. Each adapter owns the attribute
//! schema of its resource type and four handlers that marshal between the
//! attribute store and the typed API records.
//!
//! ## Identity
//!
//! The remote system assigns each entity an ID, stored in the
//! `<entity>_id` attribute. The state identifier is local: the email address
//! for users, `"<tenant_id>:<name>"` for everything else.

pub mod activation_profile;
pub mod bundle;
pub mod contract;
pub mod group;
pub mod image;
pub mod plan;
pub mod role;
pub mod user;

use std::fmt::Display;

use async_trait::async_trait;
use cloudcenter_core::provider::{ProviderError, ProviderResult, ResourceType};
use cloudcenter_core::resource::{Resource, ResourceId, State};
use cloudcenter_core::schema::{AttributeSchema, AttributeType, ResourceSchema};

use crate::attrs::{Attributes, parse_numeric};
use crate::client::{ClientError, CloudCenterApi};

pub use activation_profile::ActivationProfileResource;
pub use bundle::BundleResource;
pub use contract::ContractResource;
pub use group::GroupResource;
pub use image::ImageResource;
pub use plan::PlanResource;
pub use role::RoleResource;
pub use user::UserResource;

/// CRUD handlers for one resource type
#[async_trait]
pub trait ResourceAdapter: ResourceType {
    async fn create(&self, client: &dyn CloudCenterApi, resource: &Resource)
    -> ProviderResult<State>;

    async fn read(&self, client: &dyn CloudCenterApi, current: &State) -> ProviderResult<State>;

    async fn update(
        &self,
        client: &dyn CloudCenterApi,
        from: &State,
        to: &Resource,
    ) -> ProviderResult<State>;

    async fn delete(&self, client: &dyn CloudCenterApi, current: &State)
    -> ProviderResult<State>;
}

macro_rules! register_resources {
    ($($adapter:expr),+ $(,)?) => {
        /// Returns every resource adapter, in registration order
        pub fn adapters() -> Vec<Box<dyn ResourceAdapter>> {
            vec![$(Box::new($adapter)),+]
        }

        /// Returns all resource types supported by this provider
        pub fn resource_types() -> Vec<Box<dyn ResourceType>> {
            vec![$(Box::new($adapter)),+]
        }
    };
}

register_resources!(
    UserResource,
    BundleResource,
    PlanResource,
    ContractResource,
    ActivationProfileResource,
    ImageResource,
    GroupResource,
    RoleResource,
);

/// Find the adapter registered under a resource type name
pub fn adapter_for(resource_type: &str) -> Option<Box<dyn ResourceAdapter>> {
    adapters().into_iter().find(|a| a.name() == resource_type)
}

// =============================================================================
// Shared schema pieces
// =============================================================================

/// List of `{ <field> = "..." }` blocks referencing other entities by ID
pub(crate) fn id_blocks(field: &str) -> AttributeType {
    AttributeType::List(Box::new(AttributeType::Struct(vec![
        AttributeSchema::new(field, AttributeType::String).required(),
    ])))
}

pub(crate) fn string_list() -> AttributeType {
    AttributeType::List(Box::new(AttributeType::String))
}

// =============================================================================
// Shared handler plumbing
// =============================================================================

/// Reject configurations the schema does not accept
pub(crate) fn validate(schema: &ResourceSchema, resource: &Resource) -> ProviderResult<()> {
    schema.validate(&resource.attributes).map_err(|errors| {
        let messages: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
        ProviderError::new(messages.join("; ")).for_resource(resource.id.clone())
    })
}

pub(crate) fn local_identifier(tenant_id: impl Display, name: &str) -> String {
    format!("{}:{}", tenant_id, name)
}

/// Surface a remote failure with the client's message unchanged
pub(crate) fn remote_error(id: &ResourceId, err: ClientError) -> ProviderError {
    ProviderError::new(err.to_string())
        .for_resource(id.clone())
        .with_cause(err)
}

/// Remote lookup failed during a refresh
pub(crate) fn retrieval_failed(id: &ResourceId, entity: &str, err: ClientError) -> ProviderError {
    ProviderError::new(format!("UNABLE TO RETRIEVE DETAILS FOR {}", entity))
        .for_resource(id.clone())
        .with_cause(err)
}

/// An identifier attribute could not be parsed as an integer
pub(crate) fn incorrect_id(id: &ResourceId, entity: &str, problem: &str) -> ProviderError {
    ProviderError::new(format!(
        "UNABLE TO RETRIEVE DETAILS FOR {} - {}",
        entity, problem
    ))
    .for_resource(id.clone())
}

/// Numeric value of an identifier attribute of `state`
pub(crate) fn numeric_id(state: &State, key: &str, entity: &str, problem: &str) -> ProviderResult<i64> {
    parse_numeric(&state.attributes, key).ok_or_else(|| incorrect_id(&state.id, entity, problem))
}

/// `(tenant_id, <entity>_id)` of a recorded state, parsed tenant first
pub(crate) fn tenant_and_id(state: &State, entity: &str, id_key: &str) -> ProviderResult<(i64, i64)> {
    tenant_and_id_reporting(state, entity, id_key, &format!("{} ID INCORRECT", entity))
}

/// Like `tenant_and_id`, with a custom message for a malformed entity ID
pub(crate) fn tenant_and_id_reporting(
    state: &State,
    entity: &str,
    id_key: &str,
    id_problem: &str,
) -> ProviderResult<(i64, i64)> {
    let tenant = numeric_id(state, "tenant_id", entity, "TENANT ID INCORRECT")?;
    let id = numeric_id(state, id_key, entity, id_problem)?;
    Ok((tenant, id))
}

/// Attributes to send on update: configuration from `to`, computed values from `from`
pub(crate) fn update_attributes(schema: &ResourceSchema, from: &State, to: &Resource) -> Attributes {
    schema.merge_for_update(&from.attributes, &to.attributes)
}

/// State after a successful read or update; the local identifier never changes
pub(crate) fn refreshed(previous: &State, attributes: Attributes) -> State {
    State {
        id: previous.id.clone(),
        identifier: previous.identifier.clone(),
        attributes,
        exists: true,
    }
}

/// State after a successful delete
pub(crate) fn deleted(previous: &State) -> State {
    State::not_found(previous.id.clone())
}
