//! cloudcenter_role

use async_trait::async_trait;
use cloudcenter_core::provider::{ProviderResult, ResourceType};
use cloudcenter_core::resource::{Resource, State};
use cloudcenter_core::schema::{AttributeSchema, AttributeType, ResourceSchema};
use log::info;

use super::{
    ResourceAdapter, deleted, id_blocks, local_identifier, refreshed, remote_error,
    retrieval_failed, string_list, tenant_and_id, update_attributes, validate,
};
use crate::attrs::{
    Attributes, get_block_field, get_blocks, get_bool, get_int, get_string, get_string_list,
    set_bool, set_int, set_string, set_string_list,
};
use crate::client::{CloudCenterApi, Group, ObjectPerm, Role, User};

const ENTITY: &str = "ROLE";

pub struct RoleResource;

fn object_permissions(attrs: &Attributes) -> Vec<ObjectPerm> {
    get_blocks(attrs, "object_permissions")
        .into_iter()
        .map(|block| ObjectPerm {
            object_type: get_string(block, "object_type").unwrap_or_default(),
            perms: get_string_list(block, "permissions"),
        })
        .collect()
}

fn to_record(attrs: &Attributes) -> Role {
    Role {
        id: get_string(attrs, "role_id"),
        resource: get_string(attrs, "resource"),
        tenant_id: get_string(attrs, "tenant_id"),
        name: get_string(attrs, "role_name"),
        description: get_string(attrs, "description"),
        perms: get_string_list(attrs, "perms"),
        object_perms: object_permissions(attrs),
        users: get_block_field(attrs, "users", "user_id")
            .into_iter()
            .map(User::reference)
            .collect(),
        groups: get_block_field(attrs, "groups", "group_id")
            .into_iter()
            .map(Group::reference)
            .collect(),
        created: get_int(attrs, "created"),
        last_updated: get_int(attrs, "last_updated"),
        oob_role: get_bool(attrs, "oob_role"),
    }
}

// Object permissions, users and groups are echoed from configuration.
fn to_attributes(role: &Role, base: &Attributes) -> Attributes {
    let mut attrs = base.clone();
    set_string(&mut attrs, "role_id", role.id.as_ref());
    set_string(&mut attrs, "resource", role.resource.as_ref());
    set_string(&mut attrs, "tenant_id", role.tenant_id.as_ref());
    set_string(&mut attrs, "role_name", role.name.as_ref());
    set_string(&mut attrs, "description", role.description.as_ref());
    if role.perms.is_empty() {
        attrs.remove("perms");
    } else {
        set_string_list(&mut attrs, "perms", &role.perms);
    }
    set_int(&mut attrs, "created", role.created);
    set_int(&mut attrs, "last_updated", role.last_updated);
    set_bool(&mut attrs, "oob_role", role.oob_role);
    attrs
}

impl ResourceType for RoleResource {
    fn name(&self) -> &'static str {
        "cloudcenter_role"
    }

    fn schema(&self) -> ResourceSchema {
        let object_permission = AttributeType::Struct(vec![
            AttributeSchema::new("object_type", AttributeType::String).required(),
            AttributeSchema::new("permissions", string_list()).required(),
        ]);

        ResourceSchema::new("cloudcenter_role")
            .with_description("A named set of permissions")
            .attribute(AttributeSchema::new("role_id", AttributeType::String).computed())
            .attribute(AttributeSchema::new("role_name", AttributeType::String).required())
            .attribute(AttributeSchema::new("resource", AttributeType::String).computed())
            .attribute(AttributeSchema::new("perms", string_list()))
            .attribute(AttributeSchema::new("description", AttributeType::String))
            .attribute(AttributeSchema::new("created", AttributeType::Int).computed())
            .attribute(AttributeSchema::new("last_updated", AttributeType::Int).computed())
            .attribute(AttributeSchema::new("oob_role", AttributeType::Bool).computed())
            .attribute(
                AttributeSchema::new(
                    "object_permissions",
                    AttributeType::List(Box::new(object_permission)),
                )
                .with_description("Permissions granted per object type"),
            )
            .attribute(AttributeSchema::new("users", id_blocks("user_id")))
            .attribute(AttributeSchema::new("groups", id_blocks("group_id")))
            .attribute(AttributeSchema::new("tenant_id", AttributeType::String).required())
    }
}

#[async_trait]
impl ResourceAdapter for RoleResource {
    async fn create(
        &self,
        client: &dyn CloudCenterApi,
        resource: &Resource,
    ) -> ProviderResult<State> {
        validate(&self.schema(), resource)?;
        let attrs = &resource.attributes;
        let identifier = local_identifier(
            get_string(attrs, "tenant_id").unwrap_or_default(),
            &get_string(attrs, "role_name").unwrap_or_default(),
        );

        let role = client
            .add_role(&to_record(attrs))
            .await
            .map_err(|e| remote_error(&resource.id, e))?;

        info!("Created {} ({})", resource.id, identifier);
        Ok(State::existing(resource.id.clone(), to_attributes(&role, attrs))
            .with_identifier(identifier))
    }

    async fn read(&self, client: &dyn CloudCenterApi, current: &State) -> ProviderResult<State> {
        let (tenant_id, role_id) = tenant_and_id(current, ENTITY, "role_id")?;
        let role = client
            .get_role(tenant_id, role_id)
            .await
            .map_err(|e| retrieval_failed(&current.id, ENTITY, e))?;
        Ok(refreshed(current, to_attributes(&role, &current.attributes)))
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

        let role = client
            .update_role(&to_record(&attrs))
            .await
            .map_err(|e| remote_error(&to.id, e))?;

        info!("Updated {}", to.id);
        Ok(refreshed(from, to_attributes(&role, &attrs)))
    }

    async fn delete(&self, client: &dyn CloudCenterApi, current: &State) -> ProviderResult<State> {
        let (tenant_id, role_id) = tenant_and_id(current, ENTITY, "role_id")?;
        client
            .delete_role(tenant_id, role_id)
            .await
            .map_err(|e| remote_error(&current.id, e))?;

        info!("Deleted {}", current.id);
        Ok(deleted(current))
    }
}
