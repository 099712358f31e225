//! cloudcenter_group

use async_trait::async_trait;
use cloudcenter_core::provider::{ProviderResult, ResourceType};
use cloudcenter_core::resource::{Resource, State};
use cloudcenter_core::schema::{AttributeSchema, AttributeType, ResourceSchema};
use log::info;

use super::{
    ResourceAdapter, deleted, id_blocks, local_identifier, refreshed, remote_error,
    retrieval_failed, tenant_and_id, update_attributes, validate,
};
use crate::attrs::{
    Attributes, get_block_field, get_bool, get_int, get_string, set_bool, set_int, set_string,
};
use crate::client::{CloudCenterApi, Group, Role, User};

const ENTITY: &str = "GROUP";

pub struct GroupResource;

fn to_record(attrs: &Attributes) -> Group {
    Group {
        id: get_string(attrs, "group_id"),
        resource: get_string(attrs, "resource"),
        tenant_id: get_string(attrs, "tenant_id"),
        name: get_string(attrs, "group_name"),
        description: get_string(attrs, "description"),
        users: get_block_field(attrs, "users", "user_id")
            .into_iter()
            .map(User::reference)
            .collect(),
        roles: get_block_field(attrs, "roles", "role_id")
            .into_iter()
            .map(Role::reference)
            .collect(),
        created: get_int(attrs, "created"),
        last_updated: get_int(attrs, "last_updated"),
        created_by_sso: get_bool(attrs, "created_by_sso"),
    }
}

// `users` and `roles` stay as configured; the API answers with expanded objects.
fn to_attributes(group: &Group, base: &Attributes) -> Attributes {
    let mut attrs = base.clone();
    set_string(&mut attrs, "group_id", group.id.as_ref());
    set_string(&mut attrs, "resource", group.resource.as_ref());
    set_string(&mut attrs, "tenant_id", group.tenant_id.as_ref());
    set_string(&mut attrs, "group_name", group.name.as_ref());
    set_string(&mut attrs, "description", group.description.as_ref());
    set_int(&mut attrs, "created", group.created);
    set_int(&mut attrs, "last_updated", group.last_updated);
    set_bool(&mut attrs, "created_by_sso", group.created_by_sso);
    attrs
}

impl ResourceType for GroupResource {
    fn name(&self) -> &'static str {
        "cloudcenter_group"
    }

    fn schema(&self) -> ResourceSchema {
        ResourceSchema::new("cloudcenter_group")
            .with_description("A group of users sharing a set of roles")
            .attribute(AttributeSchema::new("group_id", AttributeType::String).computed())
            .attribute(AttributeSchema::new("group_name", AttributeType::String).required())
            .attribute(AttributeSchema::new("resource", AttributeType::String).computed())
            .attribute(AttributeSchema::new("description", AttributeType::String))
            .attribute(AttributeSchema::new("created", AttributeType::Int).computed())
            .attribute(AttributeSchema::new("last_updated", AttributeType::Int).computed())
            .attribute(AttributeSchema::new("created_by_sso", AttributeType::Bool).computed())
            .attribute(
                AttributeSchema::new("users", id_blocks("user_id"))
                    .required()
                    .with_description("Member users, by user ID"),
            )
            .attribute(
                AttributeSchema::new("roles", id_blocks("role_id"))
                    .required()
                    .with_description("Roles granted to members, by role ID"),
            )
            .attribute(AttributeSchema::new("tenant_id", AttributeType::String).required())
    }
}

#[async_trait]
impl ResourceAdapter for GroupResource {
    async fn create(
        &self,
        client: &dyn CloudCenterApi,
        resource: &Resource,
    ) -> ProviderResult<State> {
        validate(&self.schema(), resource)?;
        let attrs = &resource.attributes;
        let identifier = local_identifier(
            get_string(attrs, "tenant_id").unwrap_or_default(),
            &get_string(attrs, "group_name").unwrap_or_default(),
        );

        let group = client
            .add_group(&to_record(attrs))
            .await
            .map_err(|e| remote_error(&resource.id, e))?;

        info!("Created {} ({})", resource.id, identifier);
        Ok(State::existing(resource.id.clone(), to_attributes(&group, attrs))
            .with_identifier(identifier))
    }

    async fn read(&self, client: &dyn CloudCenterApi, current: &State) -> ProviderResult<State> {
        let (tenant_id, group_id) = tenant_and_id(current, ENTITY, "group_id")?;
        let group = client
            .get_group(tenant_id, group_id)
            .await
            .map_err(|e| retrieval_failed(&current.id, ENTITY, e))?;
        Ok(refreshed(current, to_attributes(&group, &current.attributes)))
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

        let group = client
            .update_group(&to_record(&attrs))
            .await
            .map_err(|e| remote_error(&to.id, e))?;

        info!("Updated {}", to.id);
        Ok(refreshed(from, to_attributes(&group, &attrs)))
    }

    async fn delete(&self, client: &dyn CloudCenterApi, current: &State) -> ProviderResult<State> {
        let (tenant_id, group_id) = tenant_and_id(current, ENTITY, "group_id")?;
        client
            .delete_group(tenant_id, group_id)
            .await
            .map_err(|e| remote_error(&current.id, e))?;

        info!("Deleted {}", current.id);
        Ok(deleted(current))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{InMemoryClient, SERVER_TIME};
    use cloudcenter_core::resource::Value;
    use serde_json::json;
    use std::collections::HashMap;

    fn member(field: &str, id: &str) -> Value {
        Value::Map(HashMap::from([(field.to_string(), Value::from(id))]))
    }

    fn desired() -> Resource {
        Resource::new("cloudcenter_group", "ops")
            .with_attribute("tenant_id", "1")
            .with_attribute("group_name", "ops")
            .with_attribute("description", "Operations")
            .with_attribute(
                "users",
                Value::List(vec![member("user_id", "5"), member("user_id", "6")]),
            )
            .with_attribute("roles", Value::List(vec![member("role_id", "9")]))
    }

    #[tokio::test]
    async fn create_records_remote_id_and_identifier() {
        let client = InMemoryClient::new();
        let state = GroupResource.create(&client, &desired()).await.unwrap();

        assert_eq!(state.identifier.as_deref(), Some("1:ops"));
        assert_eq!(state.attribute("group_id"), Some(&Value::from("1")));
        assert_eq!(state.attribute("created"), Some(&Value::Int(SERVER_TIME)));
        assert_eq!(
            state.attribute("resource"),
            Some(&Value::from("/v1/tenants/1/groups/1"))
        );
    }

    #[tokio::test]
    async fn members_are_sent_as_references() {
        let client = InMemoryClient::new();
        GroupResource.create(&client, &desired()).await.unwrap();

        let sent = client.last_sent().unwrap();
        assert_eq!(sent["users"], json!([{"id": "5"}, {"id": "6"}]));
        assert_eq!(sent["roles"], json!([{"id": "9"}]));
    }

    #[tokio::test]
    async fn create_then_read_is_stable() {
        let client = InMemoryClient::new();
        let created = GroupResource.create(&client, &desired()).await.unwrap();
        let read = GroupResource.read(&client, &created).await.unwrap();
        assert_eq!(read, created);
    }

    #[tokio::test]
    async fn update_preserves_identity() {
        let client = InMemoryClient::new();
        let created = GroupResource.create(&client, &desired()).await.unwrap();

        let to = desired().with_attribute("description", "Platform operations");
        let updated = GroupResource.update(&client, &created, &to).await.unwrap();

        assert_eq!(updated.identifier.as_deref(), Some("1:ops"));
        assert_eq!(updated.attribute("group_id"), Some(&Value::from("1")));
        assert_eq!(
            updated.attribute("description"),
            Some(&Value::from("Platform operations"))
        );
        assert_eq!(client.last_sent().unwrap()["id"], "1");
    }

    #[tokio::test]
    async fn delete_clears_identifier() {
        let client = InMemoryClient::new();
        let created = GroupResource.create(&client, &desired()).await.unwrap();

        let state = GroupResource.delete(&client, &created).await.unwrap();
        assert!(!state.exists);
        assert!(state.identifier.is_none());
        assert_eq!(client.group_count(), 0);
    }

    #[tokio::test]
    async fn malformed_ids_are_reported_before_any_call() {
        let client = InMemoryClient::new();
        let mut state = GroupResource.create(&client, &desired()).await.unwrap();
        state
            .attributes
            .insert("tenant_id".to_string(), Value::from("one"));

        let err = GroupResource.read(&client, &state).await.unwrap_err();
        assert_eq!(
            err.message,
            "UNABLE TO RETRIEVE DETAILS FOR GROUP - TENANT ID INCORRECT"
        );

        state.attributes.insert("tenant_id".to_string(), Value::from("1"));
        state.attributes.insert("group_id".to_string(), Value::from("g1"));
        let err = GroupResource.delete(&client, &state).await.unwrap_err();
        assert_eq!(
            err.message,
            "UNABLE TO RETRIEVE DETAILS FOR GROUP - GROUP ID INCORRECT"
        );
        assert_eq!(client.group_count(), 1);
    }

    #[tokio::test]
    async fn remote_lookup_failure() {
        let client = InMemoryClient::new();
        let created = GroupResource.create(&client, &desired()).await.unwrap();
        client.fail_with("unavailable");

        let err = GroupResource.read(&client, &created).await.unwrap_err();
        assert_eq!(err.message, "UNABLE TO RETRIEVE DETAILS FOR GROUP");
    }

    #[tokio::test]
    async fn members_are_required() {
        let client = InMemoryClient::new();
        let mut resource = desired();
        resource.attributes.remove("roles");

        let err = GroupResource.create(&client, &resource).await.unwrap_err();
        assert_eq!(err.message, "Required attribute 'roles' is missing");
    }
}
