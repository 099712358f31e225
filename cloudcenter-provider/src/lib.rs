//! CloudCenter Provider
//!
//! Exposes CloudCenter users, groups, roles, bundles, plans, contracts,
//! activation profiles and images as declarative resources.
//!
//! ## Module Structure
//!
//! - `config` - Provider connection parameters and client factory
//! - `client` - CloudCenter REST client and wire records
//! - `resources` - One adapter per resource type
//! - `provider` - CloudCenterProvider dispatch
//! - `attrs` - Typed access to attribute stores

pub mod attrs;
pub mod client;
pub mod config;
pub mod provider;
pub mod resources;

#[cfg(test)]
pub(crate) mod testing;

// Re-export main types
pub use config::{ProviderConfig, provider_schema};
pub use provider::CloudCenterProvider;

use cloudcenter_core::provider::{BoxFuture, Provider, ProviderResult};
use cloudcenter_core::resource::{Resource, State};

use resources::resource_types;

// =============================================================================
// Provider Trait Implementation
// =============================================================================

impl Provider for CloudCenterProvider {
    fn name(&self) -> &'static str {
        "cloudcenter"
    }

    fn resource_types(&self) -> Vec<Box<dyn cloudcenter_core::provider::ResourceType>> {
        resource_types()
    }

    fn read(&self, current: &State) -> BoxFuture<'_, ProviderResult<State>> {
        let current = current.clone();
        Box::pin(async move { self.read_resource(&current).await })
    }

    fn create(&self, resource: &Resource) -> BoxFuture<'_, ProviderResult<State>> {
        let resource = resource.clone();
        Box::pin(async move { self.create_resource(&resource).await })
    }

    fn update(&self, from: &State, to: &Resource) -> BoxFuture<'_, ProviderResult<State>> {
        let from = from.clone();
        let to = to.clone();
        Box::pin(async move { self.update_resource(&from, &to).await })
    }

    fn delete(&self, current: &State) -> BoxFuture<'_, ProviderResult<State>> {
        let current = current.clone();
        Box::pin(async move { self.delete_resource(&current).await })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::InMemoryClient;
    use cloudcenter_core::resource::Value;
    use std::collections::HashMap;
    use std::sync::Arc;

    #[tokio::test]
    async fn provider_trait_round_trip() {
        let provider: Box<dyn Provider> = Box::new(CloudCenterProvider::with_client(Arc::new(
            InMemoryClient::new(),
        )));
        assert_eq!(provider.name(), "cloudcenter");
        assert_eq!(provider.resource_types().len(), 8);

        let region = Value::Map(HashMap::from([(
            "region_id".to_string(),
            Value::from("1"),
        )]));
        let resource = Resource::new("cloudcenter_activationprofile", "default")
            .with_attribute("tenant_id", 1i64)
            .with_attribute("activation_profile_name", "default")
            .with_attribute("activate_regions", Value::List(vec![region]));

        let created = provider.create(&resource).await.unwrap();
        let read = provider.read(&created).await.unwrap();
        assert_eq!(read, created);

        let deleted = provider.delete(&read).await.unwrap();
        assert!(!deleted.exists);
    }
}
