//! cloudcenter_contract

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
use crate::client::{CloudCenterApi, Contract};

const ENTITY: &str = "CONTRACT";

pub struct ContractResource;

fn to_record(attrs: &Attributes) -> Contract {
    Contract {
        id: get_string(attrs, "contract_id"),
        resource: get_string(attrs, "resource"),
        tenant_id: get_string(attrs, "tenant_id"),
        name: get_string(attrs, "contract_name"),
        description: get_string(attrs, "description"),
        length: get_int(attrs, "length"),
        terms: get_string(attrs, "terms"),
        discount_rate: get_float(attrs, "discount_rate"),
        disabled: get_bool(attrs, "disabled"),
        show_only_to_admin: get_bool(attrs, "show_only_to_admin"),
        number_of_users: get_int(attrs, "number_of_users"),
    }
}

fn to_attributes(contract: &Contract, base: &Attributes) -> Attributes {
    let mut attrs = base.clone();
    set_string(&mut attrs, "contract_id", contract.id.as_ref());
    set_string(&mut attrs, "resource", contract.resource.as_ref());
    set_string(&mut attrs, "tenant_id", contract.tenant_id.as_ref());
    set_string(&mut attrs, "contract_name", contract.name.as_ref());
    set_string(&mut attrs, "description", contract.description.as_ref());
    set_int(&mut attrs, "length", contract.length);
    set_string(&mut attrs, "terms", contract.terms.as_ref());
    set_float(&mut attrs, "discount_rate", contract.discount_rate);
    set_bool(&mut attrs, "disabled", contract.disabled);
    set_bool(&mut attrs, "show_only_to_admin", contract.show_only_to_admin);
    set_int(&mut attrs, "number_of_users", contract.number_of_users);
    attrs
}

impl ResourceType for ContractResource {
    fn name(&self) -> &'static str {
        "cloudcenter_contract"
    }

    fn schema(&self) -> ResourceSchema {
        ResourceSchema::new("cloudcenter_contract")
            .attribute(AttributeSchema::new("contract_id", AttributeType::String).computed())
            .attribute(AttributeSchema::new("resource", AttributeType::String).computed())
            .attribute(AttributeSchema::new("contract_name", AttributeType::String).required())
            .attribute(AttributeSchema::new("description", AttributeType::String))
            .attribute(AttributeSchema::new("tenant_id", AttributeType::String).required())
            .attribute(
                AttributeSchema::new("length", AttributeType::Int)
                    .required()
                    .with_description("Contract length in months"),
            )
            .attribute(AttributeSchema::new("terms", AttributeType::String).required())
            .attribute(AttributeSchema::new("discount_rate", AttributeType::Float).required())
            .attribute(AttributeSchema::new("disabled", AttributeType::Bool))
            .attribute(AttributeSchema::new("show_only_to_admin", AttributeType::Bool))
            .attribute(AttributeSchema::new("number_of_users", AttributeType::Int).computed())
    }
}

#[async_trait]
impl ResourceAdapter for ContractResource {
    async fn create(
        &self,
        client: &dyn CloudCenterApi,
        resource: &Resource,
    ) -> ProviderResult<State> {
        validate(&self.schema(), resource)?;
        let attrs = &resource.attributes;
        let identifier = local_identifier(
            get_string(attrs, "tenant_id").unwrap_or_default(),
            &get_string(attrs, "contract_name").unwrap_or_default(),
        );

        let contract = client
            .add_contract(&to_record(attrs))
            .await
            .map_err(|e| remote_error(&resource.id, e))?;

        info!("Created {} ({})", resource.id, identifier);
        Ok(State::existing(resource.id.clone(), to_attributes(&contract, attrs))
            .with_identifier(identifier))
    }

    async fn read(&self, client: &dyn CloudCenterApi, current: &State) -> ProviderResult<State> {
        let (tenant_id, contract_id) = tenant_and_id(current, ENTITY, "contract_id")?;
        let contract = client
            .get_contract(tenant_id, contract_id)
            .await
            .map_err(|e| retrieval_failed(&current.id, ENTITY, e))?;
        Ok(refreshed(current, to_attributes(&contract, &current.attributes)))
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

        let contract = client
            .update_contract(&to_record(&attrs))
            .await
            .map_err(|e| remote_error(&to.id, e))?;

        info!("Updated {}", to.id);
        Ok(refreshed(from, to_attributes(&contract, &attrs)))
    }

    async fn delete(&self, client: &dyn CloudCenterApi, current: &State) -> ProviderResult<State> {
        let (tenant_id, contract_id) = tenant_and_id(current, ENTITY, "contract_id")?;
        client
            .delete_contract(tenant_id, contract_id)
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
        Resource::new("cloudcenter_contract", "annual")
            .with_attribute("tenant_id", "1")
            .with_attribute("contract_name", "annual")
            .with_attribute("length", 12i64)
            .with_attribute("terms", "Net 30")
            .with_attribute("discount_rate", 5.0)
            .with_attribute("disabled", false)
    }

    #[tokio::test]
    async fn create_then_read_is_stable() {
        let client = InMemoryClient::new();
        let created = ContractResource.create(&client, &desired()).await.unwrap();
        let read = ContractResource.read(&client, &created).await.unwrap();

        assert_eq!(read, created);
        assert_eq!(created.identifier.as_deref(), Some("1:annual"));
        assert_eq!(created.attribute("contract_id"), Some(&Value::from("1")));
    }

    #[tokio::test]
    async fn update_preserves_identity() {
        let client = InMemoryClient::new();
        let created = ContractResource.create(&client, &desired()).await.unwrap();

        let to = desired().with_attribute("terms", "Net 60");
        let updated = ContractResource.update(&client, &created, &to).await.unwrap();

        assert_eq!(updated.identifier, created.identifier);
        assert_eq!(updated.attribute("contract_id"), created.attribute("contract_id"));
        assert_eq!(updated.attribute("terms"), Some(&Value::from("Net 60")));
    }

    #[tokio::test]
    async fn delete_clears_identifier() {
        let client = InMemoryClient::new();
        let created = ContractResource.create(&client, &desired()).await.unwrap();
        let state = ContractResource.delete(&client, &created).await.unwrap();
        assert!(state.identifier.is_none());
    }

    #[tokio::test]
    async fn read_of_vanished_contract() {
        let client = InMemoryClient::new();
        let created = ContractResource.create(&client, &desired()).await.unwrap();
        ContractResource.delete(&client, &created).await.unwrap();

        let err = ContractResource.read(&client, &created).await.unwrap_err();
        assert_eq!(err.message, "UNABLE TO RETRIEVE DETAILS FOR CONTRACT");
        assert_eq!(err.resource_id, Some(created.id.clone()));
    }

    #[tokio::test]
    async fn malformed_contract_id() {
        let client = InMemoryClient::new();
        let mut state = ContractResource.create(&client, &desired()).await.unwrap();
        state
            .attributes
            .insert("contract_id".to_string(), Value::from("1x"));

        let err = ContractResource.read(&client, &state).await.unwrap_err();
        assert_eq!(
            err.message,
            "UNABLE TO RETRIEVE DETAILS FOR CONTRACT - CONTRACT ID INCORRECT"
        );

        state
            .attributes
            .insert("tenant_id".to_string(), Value::from(""));
        let err = ContractResource.delete(&client, &state).await.unwrap_err();
        assert_eq!(
            err.message,
            "UNABLE TO RETRIEVE DETAILS FOR CONTRACT - TENANT ID INCORRECT"
        );
    }

    #[tokio::test]
    async fn length_must_be_an_integer() {
        let client = InMemoryClient::new();
        let resource = desired().with_attribute("length", "twelve");

        let err = ContractResource.create(&client, &resource).await.unwrap_err();
        assert!(err.message.starts_with("Field 'length'"), "{}", err.message);
    }
}
