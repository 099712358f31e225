//! Provider - Trait abstracting resource operations
//!
//! A Provider defines operations for a specific remote system.
//! It is responsible for converting declared attributes into actual API calls.

use std::future::Future;
use std::pin::Pin;

use crate::resource::{Resource, ResourceId, State};
use crate::schema::ResourceSchema;

/// Error type for Provider operations
#[derive(Debug)]
pub struct ProviderError {
    pub message: String,
    pub resource_id: Option<ResourceId>,
    pub cause: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl std::fmt::Display for ProviderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(ref id) = self.resource_id {
            write!(f, "[{}.{}] {}", id.resource_type, id.name, self.message)
        } else {
            write!(f, "{}", self.message)
        }
    }
}

impl std::error::Error for ProviderError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.cause
            .as_ref()
            .map(|e| e.as_ref() as &dyn std::error::Error)
    }
}

impl ProviderError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            resource_id: None,
            cause: None,
        }
    }

    pub fn for_resource(mut self, id: ResourceId) -> Self {
        self.resource_id = Some(id);
        self
    }

    pub fn with_cause(mut self, cause: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.cause = Some(Box::new(cause));
        self
    }
}

pub type ProviderResult<T> = Result<T, ProviderError>;

/// Return type for async operations
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Definition of resource types that a Provider can handle
pub trait ResourceType: Send + Sync {
    /// Resource type name (e.g., "cloudcenter_user")
    fn name(&self) -> &'static str;

    /// Attribute schema for this resource type
    fn schema(&self) -> ResourceSchema;
}

/// Main Provider trait
///
/// All operations are async and involve side effects. The host owns state
/// persistence and planning; a provider only translates between attribute
/// stores and remote calls.
pub trait Provider: Send + Sync {
    /// Name of this Provider (e.g., "cloudcenter")
    fn name(&self) -> &'static str;

    /// List of resource types this Provider can handle
    fn resource_types(&self) -> Vec<Box<dyn ResourceType>>;

    /// Refresh a previously recorded state from the remote system
    fn read(&self, current: &State) -> BoxFuture<'_, ProviderResult<State>>;

    /// Create a resource
    ///
    /// Returns State with the local identifier set and the remote fields echoed back
    fn create(&self, resource: &Resource) -> BoxFuture<'_, ProviderResult<State>>;

    /// Update a resource in place
    fn update(&self, from: &State, to: &Resource) -> BoxFuture<'_, ProviderResult<State>>;

    /// Delete a resource
    ///
    /// Returns the state after deletion, which never carries an identifier
    fn delete(&self, current: &State) -> BoxFuture<'_, ProviderResult<State>>;
}

/// Provider implementation for Box<dyn Provider>
/// This enables dynamic dispatch for Providers
impl Provider for Box<dyn Provider> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn resource_types(&self) -> Vec<Box<dyn ResourceType>> {
        (**self).resource_types()
    }

    fn read(&self, current: &State) -> BoxFuture<'_, ProviderResult<State>> {
        (**self).read(current)
    }

    fn create(&self, resource: &Resource) -> BoxFuture<'_, ProviderResult<State>> {
        (**self).create(resource)
    }

    fn update(&self, from: &State, to: &Resource) -> BoxFuture<'_, ProviderResult<State>> {
        (**self).update(from, to)
    }

    fn delete(&self, current: &State) -> BoxFuture<'_, ProviderResult<State>> {
        (**self).delete(current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Mock Provider for testing
    struct MockProvider;

    impl Provider for MockProvider {
        fn name(&self) -> &'static str {
            "mock"
        }

        fn resource_types(&self) -> Vec<Box<dyn ResourceType>> {
            vec![]
        }

        fn read(&self, current: &State) -> BoxFuture<'_, ProviderResult<State>> {
            let state = current.clone();
            Box::pin(async move { Ok(state) })
        }

        fn create(&self, resource: &Resource) -> BoxFuture<'_, ProviderResult<State>> {
            let id = resource.id.clone();
            let attrs = resource.attributes.clone();
            Box::pin(async move { Ok(State::existing(id, attrs).with_identifier("mock-id-123")) })
        }

        fn update(&self, from: &State, to: &Resource) -> BoxFuture<'_, ProviderResult<State>> {
            let mut state = from.clone();
            state.attributes = to.attributes.clone();
            Box::pin(async move { Ok(state) })
        }

        fn delete(&self, current: &State) -> BoxFuture<'_, ProviderResult<State>> {
            let id = current.id.clone();
            Box::pin(async move { Ok(State::not_found(id)) })
        }
    }

    #[tokio::test]
    async fn mock_provider_create_returns_existing() {
        let provider = MockProvider;
        let resource = Resource::new("test", "example");
        let state = provider.create(&resource).await.unwrap();
        assert!(state.exists);
        assert_eq!(state.identifier, Some("mock-id-123".to_string()));
    }

    #[tokio::test]
    async fn boxed_provider_delegates() {
        let provider: Box<dyn Provider> = Box::new(MockProvider);
        let created = provider
            .create(&Resource::new("test", "example"))
            .await
            .unwrap();
        let deleted = provider.delete(&created).await.unwrap();
        assert_eq!(provider.name(), "mock");
        assert!(!deleted.exists);
        assert!(deleted.identifier.is_none());
    }

    #[test]
    fn error_display_includes_resource() {
        let err = ProviderError::new("boom").for_resource(ResourceId::new("cloudcenter_role", "ops"));
        assert_eq!(err.to_string(), "[cloudcenter_role.ops] boom");
        assert_eq!(err.message, "boom");
    }
}
