//! cloudcenter_activationprofile
//!
//! Activation profiles bundle a plan, bundle, contract and set of regions
//! that get applied to newly activated users. Unlike most entities the
//! tenant ID is an integer in both the API and the schema.

use async_trait::async_trait;
use cloudcenter_core::provider::{ProviderResult, ResourceType};
use cloudcenter_core::resource::{Resource, State};
use cloudcenter_core::schema::{AttributeSchema, AttributeType, ResourceSchema};
use log::info;

use super::{
    ResourceAdapter, deleted, id_blocks, local_identifier, refreshed, remote_error,
    retrieval_failed, tenant_and_id_reporting, update_attributes, validate,
};
use crate::attrs::{
    Attributes, get_block_field, get_bool, get_int, get_string, set_bool, set_int, set_string,
};
use crate::client::{ActivateRegion, ActivationProfile, CloudCenterApi};

const ENTITY: &str = "ACTIVATION PROFILE";
const ID_PROBLEM: &str = "ACTIVATION PROFILE ID INCORRECT OR NOT FOUND";

pub struct ActivationProfileResource;

fn to_record(attrs: &Attributes) -> ActivationProfile {
    ActivationProfile {
        id: get_string(attrs, "activation_profile_id"),
        name: get_string(attrs, "activation_profile_name"),
        description: get_string(attrs, "description"),
        tenant_id: get_int(attrs, "tenant_id"),
        plan_id: get_string(attrs, "plan_id"),
        bundle_id: get_string(attrs, "bundle_id"),
        contract_id: get_string(attrs, "contract_id"),
        dep_env_id: get_string(attrs, "deployment_environment_id"),
        activate_regions: get_block_field(attrs, "activate_regions", "region_id")
            .into_iter()
            .map(|region_id| ActivateRegion { region_id })
            .collect(),
        agree_to_contract: get_bool(attrs, "agree_to_contract"),
        send_activation_email: get_bool(attrs, "send_activation_email"),
    }
}

// `activate_regions` is echoed from configuration.
fn to_attributes(profile: &ActivationProfile, base: &Attributes) -> Attributes {
    let mut attrs = base.clone();
    set_string(&mut attrs, "activation_profile_id", profile.id.as_ref());
    set_string(&mut attrs, "activation_profile_name", profile.name.as_ref());
    set_string(&mut attrs, "description", profile.description.as_ref());
    set_int(&mut attrs, "tenant_id", profile.tenant_id);
    set_string(&mut attrs, "plan_id", profile.plan_id.as_ref());
    set_string(&mut attrs, "bundle_id", profile.bundle_id.as_ref());
    set_string(&mut attrs, "contract_id", profile.contract_id.as_ref());
    set_string(
        &mut attrs,
        "deployment_environment_id",
        profile.dep_env_id.as_ref(),
    );
    set_bool(&mut attrs, "agree_to_contract", profile.agree_to_contract);
    set_bool(
        &mut attrs,
        "send_activation_email",
        profile.send_activation_email,
    );
    attrs
}

impl ResourceType for ActivationProfileResource {
    fn name(&self) -> &'static str {
        "cloudcenter_activationprofile"
    }

    fn schema(&self) -> ResourceSchema {
        use AttributeType::{Bool, Int, String};

        ResourceSchema::new("cloudcenter_activationprofile")
            .with_description("Defaults applied when activating users")
            .attribute(AttributeSchema::new("activation_profile_id", String).computed())
            .attribute(AttributeSchema::new("activation_profile_name", String).required())
            .attribute(AttributeSchema::new("tenant_id", Int).required())
            .attribute(AttributeSchema::new("description", String))
            .attribute(AttributeSchema::new("plan_id", String))
            .attribute(AttributeSchema::new("bundle_id", String))
            .attribute(AttributeSchema::new("contract_id", String))
            .attribute(AttributeSchema::new("deployment_environment_id", String))
            .attribute(
                AttributeSchema::new("activate_regions", id_blocks("region_id"))
                    .required()
                    .with_description("Regions activated for new users"),
            )
            .attribute(AttributeSchema::new("agree_to_contract", Bool))
            .attribute(AttributeSchema::new("send_activation_email", Bool))
    }
}

#[async_trait]
impl ResourceAdapter for ActivationProfileResource {
    async fn create(
        &self,
        client: &dyn CloudCenterApi,
        resource: &Resource,
    ) -> ProviderResult<State> {
        validate(&self.schema(), resource)?;
        let attrs = &resource.attributes;
        let identifier = local_identifier(
            get_int(attrs, "tenant_id").unwrap_or_default(),
            &get_string(attrs, "activation_profile_name").unwrap_or_default(),
        );

        let profile = client
            .add_activation_profile(&to_record(attrs))
            .await
            .map_err(|e| remote_error(&resource.id, e))?;

        info!("Created {} ({})", resource.id, identifier);
        Ok(
            State::existing(resource.id.clone(), to_attributes(&profile, attrs))
                .with_identifier(identifier),
        )
    }

    async fn read(&self, client: &dyn CloudCenterApi, current: &State) -> ProviderResult<State> {
        let (tenant_id, profile_id) =
            tenant_and_id_reporting(current, ENTITY, "activation_profile_id", ID_PROBLEM)?;
        let profile = client
            .get_activation_profile(tenant_id, profile_id)
            .await
            .map_err(|e| retrieval_failed(&current.id, ENTITY, e))?;
        Ok(refreshed(current, to_attributes(&profile, &current.attributes)))
    }

    async fn update(
        &self,
        client: &dyn CloudCenterApi,
        from: &State,
        to: &Resource,
    ) -> ProviderResult<State> {
        let schema = self.schema();
        validate(&schema, to)?;
        let attrs = update_attributes(&schema, from, to);

        let profile = client
            .update_activation_profile(&to_record(&attrs))
            .await
            .map_err(|e| remote_error(&to.id, e))?;

        info!("Updated {}", to.id);
        Ok(refreshed(from, to_attributes(&profile, &attrs)))
    }

    async fn delete(&self, client: &dyn CloudCenterApi, current: &State) -> ProviderResult<State> {
        let (tenant_id, profile_id) =
            tenant_and_id_reporting(current, ENTITY, "activation_profile_id", ID_PROBLEM)?;
        client
            .delete_activation_profile(tenant_id, profile_id)
            .await
            .map_err(|e| remote_error(&current.id, e))?;

        info!("Deleted {}", current.id);
        Ok(deleted(current))
    }
}
