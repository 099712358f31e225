//! CloudCenterProvider - dispatches handler calls to resource adapters

use std::sync::Arc;

use cloudcenter_core::provider::{ProviderError, ProviderResult};
use cloudcenter_core::resource::{Resource, ResourceId, State};
use log::{debug, info};

use crate::client::CloudCenterApi;
use crate::config::ProviderConfig;
use crate::resources::{ResourceAdapter, adapter_for};

/// CloudCenter provider holding one shared client handle
pub struct CloudCenterProvider {
    client: Arc<dyn CloudCenterApi>,
}

impl CloudCenterProvider {
    /// Create a provider talking to the manager described by `config`
    pub fn new(config: &ProviderConfig) -> ProviderResult<Self> {
        let client = config.client()?;
        info!(
            "Configured CloudCenter provider for {} as {}",
            client.base_url(),
            config.username
        );
        Ok(Self::with_client(Arc::new(client)))
    }

    /// Create a provider around an existing client
    pub fn with_client(client: Arc<dyn CloudCenterApi>) -> Self {
        Self { client }
    }

    fn adapter(&self, id: &ResourceId) -> ProviderResult<Box<dyn ResourceAdapter>> {
        adapter_for(&id.resource_type).ok_or_else(|| {
            ProviderError::new(format!("Unknown resource type: {}", id.resource_type))
                .for_resource(id.clone())
        })
    }

    pub async fn read_resource(&self, current: &State) -> ProviderResult<State> {
        let adapter = self.adapter(&current.id)?;
        if current.identifier.is_none() {
            return Ok(State::not_found(current.id.clone()));
        }
        debug!("Reading {}", current.id);
        adapter.read(self.client.as_ref(), current).await
    }

    pub async fn create_resource(&self, resource: &Resource) -> ProviderResult<State> {
        let adapter = self.adapter(&resource.id)?;
        debug!("Creating {}", resource.id);
        adapter.create(self.client.as_ref(), resource).await
    }

    pub async fn update_resource(&self, from: &State, to: &Resource) -> ProviderResult<State> {
        let adapter = self.adapter(&to.id)?;
        debug!("Updating {}", to.id);
        adapter.update(self.client.as_ref(), from, to).await
    }

    pub async fn delete_resource(&self, current: &State) -> ProviderResult<State> {
        let adapter = self.adapter(&current.id)?;
        debug!("Deleting {}", current.id);
        adapter.delete(self.client.as_ref(), current).await
    }
}
