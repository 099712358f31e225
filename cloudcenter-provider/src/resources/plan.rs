//! cloudcenter_plan: billing plans offered to sub-tenants

use async_trait::async_trait;
use cloudcenter_core::provider::{ProviderResult, ResourceType};
use cloudcenter_core::resource::{Resource, State};
use cloudcenter_core::schema::{AttributeSchema, AttributeType, ResourceSchema};
use log::info;

use super::{
    ResourceAdapter, deleted, local_identifier, refreshed, remote_error, retrieval_failed,
    tenant_and_id, update_attributes, validate,
};
use crate::attrs::{
    Attributes, get_bool, get_float, get_int, get_string, set_bool, set_float, set_int, set_string,
};
use crate::client::{CloudCenterApi, Plan};

const ENTITY: &str = "PLAN";

pub struct PlanResource;

fn to_record(attrs: &Attributes) -> Plan {
    Plan {
        id: get_string(attrs, "plan_id"),
        resource: get_string(attrs, "resource"),
        tenant_id: get_string(attrs, "tenant_id"),
        name: get_string(attrs, "plan_name"),
        description: get_string(attrs, "description"),
        plan_type: get_string(attrs, "type"),
        monthly_limit: get_int(attrs, "monthly_limit"),
        node_hour_increment: get_float(attrs, "node_hour_increment"),
        included_bundle_id: get_string(attrs, "included_bundle_id"),
        price: get_float(attrs, "price"),
        onetime_fee: get_float(attrs, "one_time_fee"),
        annual_fee: get_float(attrs, "annual_fee"),
        storage_rate: get_float(attrs, "storage_rate"),
        hourly_rate: get_float(attrs, "hourly_rate"),
        overage_rate: get_float(attrs, "overage_rate"),
        overage_limit: get_float(attrs, "overage_limit"),
        restricted_to_app_store_only: get_bool(attrs, "restricted_to_app_store_only"),
        bill_to_vendor: get_bool(attrs, "bill_to_vendor"),
        enable_rollover: get_bool(attrs, "enable_rollover"),
        disabled: get_bool(attrs, "disabled"),
        show_only_to_admin: get_bool(attrs, "show_only_to_admin"),
        number_of_users: get_int(attrs, "number_of_users"),
        number_of_projects: get_int(attrs, "number_of_projects"),
    }
}

fn to_attributes(plan: &Plan, base: &Attributes) -> Attributes {
    let mut attrs = base.clone();
    set_string(&mut attrs, "plan_id", plan.id.as_ref());
    set_string(&mut attrs, "resource", plan.resource.as_ref());
    set_string(&mut attrs, "tenant_id", plan.tenant_id.as_ref());
    set_string(&mut attrs, "plan_name", plan.name.as_ref());
    set_string(&mut attrs, "description", plan.description.as_ref());
    set_string(&mut attrs, "type", plan.plan_type.as_ref());
    set_int(&mut attrs, "monthly_limit", plan.monthly_limit);
    set_float(&mut attrs, "node_hour_increment", plan.node_hour_increment);
    set_string(
        &mut attrs,
        "included_bundle_id",
        plan.included_bundle_id.as_ref(),
    );
    set_float(&mut attrs, "price", plan.price);
    set_float(&mut attrs, "one_time_fee", plan.onetime_fee);
    set_float(&mut attrs, "annual_fee", plan.annual_fee);
    set_float(&mut attrs, "storage_rate", plan.storage_rate);
    set_float(&mut attrs, "hourly_rate", plan.hourly_rate);
    set_float(&mut attrs, "overage_rate", plan.overage_rate);
    set_float(&mut attrs, "overage_limit", plan.overage_limit);
    set_bool(
        &mut attrs,
        "restricted_to_app_store_only",
        plan.restricted_to_app_store_only,
    );
    set_bool(&mut attrs, "bill_to_vendor", plan.bill_to_vendor);
    set_bool(&mut attrs, "enable_rollover", plan.enable_rollover);
    set_bool(&mut attrs, "disabled", plan.disabled);
    set_bool(&mut attrs, "show_only_to_admin", plan.show_only_to_admin);
    set_int(&mut attrs, "number_of_users", plan.number_of_users);
    set_int(&mut attrs, "number_of_projects", plan.number_of_projects);
    attrs
}

impl ResourceType for PlanResource {
    fn name(&self) -> &'static str {
        "cloudcenter_plan"
    }

    fn schema(&self) -> ResourceSchema {
        use AttributeType::{Bool, Float, Int, String};

        ResourceSchema::new("cloudcenter_plan")
            .with_description("A billing plan")
            .attribute(AttributeSchema::new("plan_id", String).computed())
            .attribute(AttributeSchema::new("resource", String).computed())
            .attribute(AttributeSchema::new("plan_name", String).required())
            .attribute(AttributeSchema::new("description", String))
            .attribute(AttributeSchema::new("tenant_id", String).required())
            .attribute(
                AttributeSchema::new("type", String)
                    .required()
                    .with_description("Plan type, e.g. UNLIMITED_PLAN or BUDGET_PLAN"),
            )
            .attribute(AttributeSchema::new("monthly_limit", Int))
            .attribute(AttributeSchema::new("node_hour_increment", Float))
            .attribute(AttributeSchema::new("included_bundle_id", String))
            .attribute(AttributeSchema::new("price", Float).required())
            .attribute(AttributeSchema::new("one_time_fee", Float))
            .attribute(AttributeSchema::new("annual_fee", Float))
            .attribute(AttributeSchema::new("storage_rate", Float))
            .attribute(AttributeSchema::new("hourly_rate", Float))
            .attribute(AttributeSchema::new("overage_rate", Float))
            .attribute(AttributeSchema::new("overage_limit", Float))
            .attribute(AttributeSchema::new("restricted_to_app_store_only", Bool))
            .attribute(AttributeSchema::new("bill_to_vendor", Bool))
            .attribute(AttributeSchema::new("enable_rollover", Bool))
            .attribute(AttributeSchema::new("disabled", Bool))
            .attribute(AttributeSchema::new("show_only_to_admin", Bool))
            .attribute(AttributeSchema::new("number_of_users", Int).computed())
            .attribute(AttributeSchema::new("number_of_projects", Int).computed())
    }
}

#[async_trait]
impl ResourceAdapter for PlanResource {
    async fn create(
        &self,
        client: &dyn CloudCenterApi,
        resource: &Resource,
    ) -> ProviderResult<State> {
        validate(&self.schema(), resource)?;
        let attrs = &resource.attributes;
        let identifier = local_identifier(
            get_string(attrs, "tenant_id").unwrap_or_default(),
            &get_string(attrs, "plan_name").unwrap_or_default(),
        );

        let plan = client
            .add_plan(&to_record(attrs))
            .await
            .map_err(|e| remote_error(&resource.id, e))?;

        info!("Created {} ({})", resource.id, identifier);
        Ok(State::existing(resource.id.clone(), to_attributes(&plan, attrs))
            .with_identifier(identifier))
    }

    async fn read(&self, client: &dyn CloudCenterApi, current: &State) -> ProviderResult<State> {
        let (tenant_id, plan_id) = tenant_and_id(current, ENTITY, "plan_id")?;
        let plan = client
            .get_plan(tenant_id, plan_id)
            .await
            .map_err(|e| retrieval_failed(&current.id, ENTITY, e))?;
        Ok(refreshed(current, to_attributes(&plan, &current.attributes)))
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

        let plan = client
            .update_plan(&to_record(&attrs))
            .await
            .map_err(|e| remote_error(&to.id, e))?;

        info!("Updated {}", to.id);
        Ok(refreshed(from, to_attributes(&plan, &attrs)))
    }

    async fn delete(&self, client: &dyn CloudCenterApi, current: &State) -> ProviderResult<State> {
        let (tenant_id, plan_id) = tenant_and_id(current, ENTITY, "plan_id")?;
        client
            .delete_plan(tenant_id, plan_id)
            .await
            .map_err(|e| remote_error(&current.id, e))?;

        info!("Deleted {}", current.id);
        Ok(deleted(current))
    }
}
