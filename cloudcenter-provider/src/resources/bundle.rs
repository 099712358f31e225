//! cloudcenter_bundle

use async_trait::async_trait;
use cloudcenter_core::provider::{ProviderResult, ResourceType};
use cloudcenter_core::resource::{Resource, State};
use cloudcenter_core::schema::{AttributeSchema, AttributeType, ResourceSchema};
use log::info;

use super::{
    ResourceAdapter, deleted, local_identifier, refreshed, remote_error, retrieval_failed,
    tenant_and_id, update_attributes, validate,
};
use crate::attrs::{Attributes, get_bool, get_float, get_string, set_bool, set_float, set_string};
use crate::client::{Bundle, CloudCenterApi};

const ENTITY: &str = "BUNDLE";

pub struct BundleResource;

fn to_record(attrs: &Attributes) -> Bundle {
    Bundle {
        id: get_string(attrs, "bundle_id"),
        resource: get_string(attrs, "resource"),
        tenant_id: get_string(attrs, "tenant_id"),
        name: get_string(attrs, "bundle_name"),
        bundle_type: get_string(attrs, "type"),
        limit: get_float(attrs, "limit"),
        price: get_float(attrs, "price"),
        expiration_date: get_float(attrs, "expiration_date"),
        expiration_months: get_float(attrs, "expiration_months"),
        disabled: get_bool(attrs, "disabled"),
        show_only_to_admin: get_bool(attrs, "show_only_to_admin"),
        number_of_users: get_float(attrs, "number_of_users"),
    }
}

fn to_attributes(bundle: &Bundle, base: &Attributes) -> Attributes {
    let mut attrs = base.clone();
    set_string(&mut attrs, "bundle_id", bundle.id.as_ref());
    set_string(&mut attrs, "resource", bundle.resource.as_ref());
    set_string(&mut attrs, "tenant_id", bundle.tenant_id.as_ref());
    set_string(&mut attrs, "bundle_name", bundle.name.as_ref());
    set_string(&mut attrs, "type", bundle.bundle_type.as_ref());
    set_float(&mut attrs, "limit", bundle.limit);
    set_float(&mut attrs, "price", bundle.price);
    set_float(&mut attrs, "expiration_date", bundle.expiration_date);
    set_float(&mut attrs, "expiration_months", bundle.expiration_months);
    set_bool(&mut attrs, "disabled", bundle.disabled);
    set_bool(&mut attrs, "show_only_to_admin", bundle.show_only_to_admin);
    set_float(&mut attrs, "number_of_users", bundle.number_of_users);
    attrs
}

impl ResourceType for BundleResource {
    fn name(&self) -> &'static str {
        "cloudcenter_bundle"
    }

    fn schema(&self) -> ResourceSchema {
        use AttributeType::{Bool, Float, String};

        ResourceSchema::new("cloudcenter_bundle")
            .with_description("A prepaid usage bundle attached to plans")
            .attribute(AttributeSchema::new("bundle_id", String).computed())
            .attribute(AttributeSchema::new("bundle_name", String).required())
            .attribute(AttributeSchema::new("resource", String).computed())
            .attribute(
                AttributeSchema::new("type", String)
                    .required()
                    .with_description("Bundle type, e.g. BUDGET_BUNDLE"),
            )
            .attribute(AttributeSchema::new("limit", Float).required())
            .attribute(AttributeSchema::new("price", Float).required())
            .attribute(
                AttributeSchema::new("expiration_date", Float)
                    .required()
                    .with_description("Expiry as epoch milliseconds"),
            )
            .attribute(AttributeSchema::new("expiration_months", Float))
            .attribute(AttributeSchema::new("disabled", Bool).computed())
            .attribute(AttributeSchema::new("show_only_to_admin", Bool).computed())
            .attribute(AttributeSchema::new("number_of_users", Float).computed())
            .attribute(AttributeSchema::new("tenant_id", String).required())
    }
}

#[async_trait]
impl ResourceAdapter for BundleResource {
    async fn create(
        &self,
        client: &dyn CloudCenterApi,
        resource: &Resource,
    ) -> ProviderResult<State> {
        validate(&self.schema(), resource)?;
        let attrs = &resource.attributes;
        let identifier = local_identifier(
            get_string(attrs, "tenant_id").unwrap_or_default(),
            &get_string(attrs, "bundle_name").unwrap_or_default(),
        );

        let bundle = client
            .add_bundle(&to_record(attrs))
            .await
            .map_err(|e| remote_error(&resource.id, e))?;

        info!("Created {} ({})", resource.id, identifier);
        Ok(State::existing(resource.id.clone(), to_attributes(&bundle, attrs))
            .with_identifier(identifier))
    }

    async fn read(&self, client: &dyn CloudCenterApi, current: &State) -> ProviderResult<State> {
        let (tenant_id, bundle_id) = tenant_and_id(current, ENTITY, "bundle_id")?;
        let bundle = client
            .get_bundle(tenant_id, bundle_id)
            .await
            .map_err(|e| retrieval_failed(&current.id, ENTITY, e))?;
        Ok(refreshed(current, to_attributes(&bundle, &current.attributes)))
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

        let bundle = client
            .update_bundle(&to_record(&attrs))
            .await
            .map_err(|e| remote_error(&to.id, e))?;

        info!("Updated {}", to.id);
        Ok(refreshed(from, to_attributes(&bundle, &attrs)))
    }

    async fn delete(&self, client: &dyn CloudCenterApi, current: &State) -> ProviderResult<State> {
        let (tenant_id, bundle_id) = tenant_and_id(current, ENTITY, "bundle_id")?;
        client
            .delete_bundle(tenant_id, bundle_id)
            .await
            .map_err(|e| remote_error(&current.id, e))?;

        info!("Deleted {}", current.id);
        Ok(deleted(current))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::InMemoryClient;
    use cloudcenter_core::resource::Value;

    fn desired() -> Resource {
        Resource::new("cloudcenter_bundle", "starter")
            .with_attribute("tenant_id", "3")
            .with_attribute("bundle_name", "starter")
            .with_attribute("type", "BUDGET_BUNDLE")
            .with_attribute("limit", 500.0)
            .with_attribute("price", 49.99)
            .with_attribute("expiration_date", 1_893_456_000_000i64)
    }

    #[tokio::test]
    async fn create_then_read_is_stable() {
        let client = InMemoryClient::new();
        let created = BundleResource.create(&client, &desired()).await.unwrap();
        let read = BundleResource.read(&client, &created).await.unwrap();

        assert_eq!(read, created);
        assert_eq!(created.identifier.as_deref(), Some("3:starter"));
        assert_eq!(created.attribute("disabled"), Some(&Value::Bool(false)));
        assert_eq!(
            created.attribute("expiration_date"),
            Some(&Value::Float(1_893_456_000_000.0))
        );
    }

    #[tokio::test]
    async fn update_carries_computed_fields() {
        let client = InMemoryClient::new();
        let created = BundleResource.create(&client, &desired()).await.unwrap();

        let to = desired().with_attribute("limit", 750.0);
        let updated = BundleResource.update(&client, &created, &to).await.unwrap();

        let sent = client.last_sent().unwrap();
        assert_eq!(sent["id"], "1");
        assert_eq!(sent["resource"], "/v1/tenants/3/bundles/1");
        assert_eq!(sent["limit"], 750.0);
        assert_eq!(updated.identifier, created.identifier);
        assert_eq!(updated.attribute("bundle_id"), created.attribute("bundle_id"));
    }

    #[tokio::test]
    async fn delete_clears_identifier() {
        let client = InMemoryClient::new();
        let created = BundleResource.create(&client, &desired()).await.unwrap();
        let state = BundleResource.delete(&client, &created).await.unwrap();
        assert!(!state.exists);
        assert!(state.identifier.is_none());
    }

    #[tokio::test]
    async fn delete_failure_surfaces_remote_message() {
        let client = InMemoryClient::new();
        let created = BundleResource.create(&client, &desired()).await.unwrap();
        client.fail_with("Bundle is in use by plan gold");

        let err = BundleResource.delete(&client, &created).await.unwrap_err();
        assert_eq!(
            err.message,
            "CloudCenter API returned 500: Bundle is in use by plan gold"
        );
    }

    #[tokio::test]
    async fn malformed_bundle_id() {
        let client = InMemoryClient::new();
        let mut state = BundleResource.create(&client, &desired()).await.unwrap();
        state.attributes.insert("bundle_id".to_string(), Value::from("1.5"));

        let err = BundleResource.read(&client, &state).await.unwrap_err();
        assert_eq!(
            err.message,
            "UNABLE TO RETRIEVE DETAILS FOR BUNDLE - BUNDLE ID INCORRECT"
        );
    }
}
