//! CloudCenter API client
//!
//! `CloudCenterApi` is the collaborator contract the resource adapters
//! program against: Add/Get/Update/Delete per entity, keyed by tenant ID plus
//! entity ID (users are looked up by email). `HttpClient` implements it over
//! the REST API.

pub mod http;
pub mod types;

use async_trait::async_trait;
use thiserror::Error;

pub use http::HttpClient;
pub use types::{
    ActivateRegion, ActivationProfile, Bundle, Contract, Group, Image, ObjectPerm, Plan, Role,
    User,
};

/// Errors returned by the CloudCenter API client
#[derive(Debug, Error)]
pub enum ClientError {
    /// Transport failure (connection refused, TLS, timeout)
    #[error("Request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The API answered with a non-success status
    #[error("CloudCenter API returned {status}: {body}")]
    Status { status: u16, body: String },

    /// A request record could not be serialized
    #[error("Failed to encode request to {url}: {message}")]
    Encode { url: String, message: String },

    /// The response body did not match the expected record
    #[error("Failed to decode response from {url}: {message}")]
    Decode { url: String, message: String },

    /// The requested entity does not exist
    #[error("{0} not found")]
    NotFound(String),

    /// A record passed to an update lacks the field its URL is built from
    #[error("Record is missing {0}")]
    MissingField(&'static str),

    /// The client could not be constructed
    #[error("Failed to build HTTP client: {0}")]
    Build(String),
}

/// Result type for client operations
pub type ClientResult<T> = Result<T, ClientError>;

/// Operations the CloudCenter REST API exposes per entity type
#[async_trait]
pub trait CloudCenterApi: Send + Sync {
    async fn add_user(&self, user: &User) -> ClientResult<User>;
    async fn get_user_by_email(&self, email: &str) -> ClientResult<User>;
    async fn update_user(&self, user: &User) -> ClientResult<User>;
    async fn delete_user_by_email(&self, email: &str) -> ClientResult<()>;

    async fn add_group(&self, group: &Group) -> ClientResult<Group>;
    async fn get_group(&self, tenant_id: i64, group_id: i64) -> ClientResult<Group>;
    async fn update_group(&self, group: &Group) -> ClientResult<Group>;
    async fn delete_group(&self, tenant_id: i64, group_id: i64) -> ClientResult<()>;

    async fn add_role(&self, role: &Role) -> ClientResult<Role>;
    async fn get_role(&self, tenant_id: i64, role_id: i64) -> ClientResult<Role>;
    async fn update_role(&self, role: &Role) -> ClientResult<Role>;
    async fn delete_role(&self, tenant_id: i64, role_id: i64) -> ClientResult<()>;

    async fn add_plan(&self, plan: &Plan) -> ClientResult<Plan>;
    async fn get_plan(&self, tenant_id: i64, plan_id: i64) -> ClientResult<Plan>;
    async fn update_plan(&self, plan: &Plan) -> ClientResult<Plan>;
    async fn delete_plan(&self, tenant_id: i64, plan_id: i64) -> ClientResult<()>;

    async fn add_bundle(&self, bundle: &Bundle) -> ClientResult<Bundle>;
    async fn get_bundle(&self, tenant_id: i64, bundle_id: i64) -> ClientResult<Bundle>;
    async fn update_bundle(&self, bundle: &Bundle) -> ClientResult<Bundle>;
    async fn delete_bundle(&self, tenant_id: i64, bundle_id: i64) -> ClientResult<()>;

    async fn add_contract(&self, contract: &Contract) -> ClientResult<Contract>;
    async fn get_contract(&self, tenant_id: i64, contract_id: i64) -> ClientResult<Contract>;
    async fn update_contract(&self, contract: &Contract) -> ClientResult<Contract>;
    async fn delete_contract(&self, tenant_id: i64, contract_id: i64) -> ClientResult<()>;

    async fn add_activation_profile(
        &self,
        profile: &ActivationProfile,
    ) -> ClientResult<ActivationProfile>;
    async fn get_activation_profile(
        &self,
        tenant_id: i64,
        profile_id: i64,
    ) -> ClientResult<ActivationProfile>;
    async fn update_activation_profile(
        &self,
        profile: &ActivationProfile,
    ) -> ClientResult<ActivationProfile>;
    async fn delete_activation_profile(&self, tenant_id: i64, profile_id: i64)
    -> ClientResult<()>;

    async fn add_image(&self, image: &Image) -> ClientResult<Image>;
    async fn get_image(&self, tenant_id: i64, image_id: i64) -> ClientResult<Image>;
    async fn update_image(&self, image: &Image) -> ClientResult<Image>;
    async fn delete_image(&self, tenant_id: i64, image_id: i64) -> ClientResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_error_display() {
        let err = ClientError::Status {
            status: 409,
            body: "Group name already exists".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "CloudCenter API returned 409: Group name already exists"
        );
    }

    #[test]
    fn not_found_display() {
        let err = ClientError::NotFound("User ana@example.com".to_string());
        assert_eq!(err.to_string(), "User ana@example.com not found");
    }
}
