//! cloudcenter_user
//!
//! Users are global rather than tenant-scoped collections, so they are
//! addressed by email address and the email doubles as the local identifier.

use async_trait::async_trait;
use cloudcenter_core::provider::{ProviderError, ProviderResult, ResourceType};
use cloudcenter_core::resource::{Resource, State};
use cloudcenter_core::schema::{AttributeSchema, AttributeType, ResourceSchema};
use log::info;

use super::{ResourceAdapter, deleted, refreshed, remote_error, update_attributes, validate};
use crate::attrs::{Attributes, get_bool, get_int, get_string, set_bool, set_int, set_string};
use crate::client::{CloudCenterApi, User};

pub struct UserResource;

fn to_record(attrs: &Attributes) -> User {
    User {
        id: get_string(attrs, "user_id"),
        resource: get_string(attrs, "resource"),
        username: get_string(attrs, "username"),
        password: get_string(attrs, "password"),
        email_addr: get_string(attrs, "email_address"),
        tenant_id: get_string(attrs, "tenant_id"),
        enabled: get_bool(attrs, "enabled"),
        user_type: get_string(attrs, "type"),
        first_name: get_string(attrs, "first_name"),
        last_name: get_string(attrs, "last_name"),
        company_name: get_string(attrs, "company_name"),
        email_verified: get_bool(attrs, "email_verified"),
        phone_number: get_string(attrs, "phone_number"),
        external_id: get_string(attrs, "external_id"),
        access_keys: get_string(attrs, "access_keys"),
        disable_reason: get_string(attrs, "disable_reason"),
        account_source: get_string(attrs, "account_source"),
        status: get_string(attrs, "status"),
        detail: get_string(attrs, "detail"),
        activation_data: get_string(attrs, "activation_data"),
        created: get_int(attrs, "created"),
        last_updated: get_int(attrs, "last_updated"),
        co_admin: get_bool(attrs, "co_admin"),
        tenant_admin: get_bool(attrs, "tenant_admin"),
        activation_profile_id: get_string(attrs, "activation_profile_id"),
        has_subscription_plan: get_bool(attrs, "has_subscription_plan"),
    }
}

/// Overlay a response onto `base`. The password is never returned and stays
/// as configured. The email is the user's identity and is kept when the
/// response omits it.
fn to_attributes(user: &User, base: &Attributes) -> Attributes {
    let mut attrs = base.clone();
    set_string(&mut attrs, "user_id", user.id.as_ref());
    set_string(&mut attrs, "resource", user.resource.as_ref());
    set_string(&mut attrs, "username", user.username.as_ref());
    if user.email_addr.is_some() {
        set_string(&mut attrs, "email_address", user.email_addr.as_ref());
    }
    set_string(&mut attrs, "tenant_id", user.tenant_id.as_ref());
    set_bool(&mut attrs, "enabled", user.enabled);
    set_string(&mut attrs, "type", user.user_type.as_ref());
    set_string(&mut attrs, "first_name", user.first_name.as_ref());
    set_string(&mut attrs, "last_name", user.last_name.as_ref());
    set_string(&mut attrs, "company_name", user.company_name.as_ref());
    set_bool(&mut attrs, "email_verified", user.email_verified);
    set_string(&mut attrs, "phone_number", user.phone_number.as_ref());
    set_string(&mut attrs, "external_id", user.external_id.as_ref());
    set_string(&mut attrs, "access_keys", user.access_keys.as_ref());
    set_string(&mut attrs, "disable_reason", user.disable_reason.as_ref());
    set_string(&mut attrs, "account_source", user.account_source.as_ref());
    set_string(&mut attrs, "status", user.status.as_ref());
    set_string(&mut attrs, "detail", user.detail.as_ref());
    set_string(&mut attrs, "activation_data", user.activation_data.as_ref());
    set_int(&mut attrs, "created", user.created);
    set_int(&mut attrs, "last_updated", user.last_updated);
    set_bool(&mut attrs, "co_admin", user.co_admin);
    set_bool(&mut attrs, "tenant_admin", user.tenant_admin);
    set_string(
        &mut attrs,
        "activation_profile_id",
        user.activation_profile_id.as_ref(),
    );
    set_bool(
        &mut attrs,
        "has_subscription_plan",
        user.has_subscription_plan,
    );
    attrs
}

fn email_of(state: &State) -> ProviderResult<String> {
    get_string(&state.attributes, "email_address").ok_or_else(|| {
        ProviderError::new("email_address is not recorded in state").for_resource(state.id.clone())
    })
}

impl ResourceType for UserResource {
    fn name(&self) -> &'static str {
        "cloudcenter_user"
    }

    fn schema(&self) -> ResourceSchema {
        use AttributeType::{Bool, Int, String};

        ResourceSchema::new("cloudcenter_user")
            .with_description("A CloudCenter user account")
            .attribute(AttributeSchema::new("user_id", String).computed())
            .attribute(AttributeSchema::new("resource", String).computed())
            .attribute(
                AttributeSchema::new("username", String)
                    .computed()
                    .with_description("Login name assigned by CloudCenter"),
            )
            .attribute(AttributeSchema::new("password", String).required().sensitive())
            .attribute(
                AttributeSchema::new("email_address", String)
                    .required()
                    .with_description("Email address; also the local identifier"),
            )
            .attribute(AttributeSchema::new("tenant_id", String).required())
            .attribute(AttributeSchema::new("enabled", Bool))
            .attribute(AttributeSchema::new("type", String).computed())
            .attribute(AttributeSchema::new("first_name", String))
            .attribute(AttributeSchema::new("last_name", String))
            .attribute(AttributeSchema::new("company_name", String))
            .attribute(AttributeSchema::new("email_verified", Bool))
            .attribute(AttributeSchema::new("phone_number", String))
            .attribute(AttributeSchema::new("external_id", String))
            .attribute(AttributeSchema::new("access_keys", String))
            .attribute(AttributeSchema::new("disable_reason", String))
            .attribute(AttributeSchema::new("account_source", String).computed())
            .attribute(AttributeSchema::new("status", String))
            .attribute(AttributeSchema::new("detail", String))
            .attribute(AttributeSchema::new("activation_data", String))
            .attribute(AttributeSchema::new("created", Int).computed())
            .attribute(AttributeSchema::new("last_updated", Int).computed())
            .attribute(AttributeSchema::new("co_admin", Bool))
            .attribute(AttributeSchema::new("tenant_admin", Bool).computed())
            .attribute(AttributeSchema::new("activation_profile_id", String).computed())
            .attribute(AttributeSchema::new("has_subscription_plan", Bool).computed())
    }
}

#[async_trait]
impl ResourceAdapter for UserResource {
    async fn create(
        &self,
        client: &dyn CloudCenterApi,
        resource: &Resource,
    ) -> ProviderResult<State> {
        validate(&self.schema(), resource)?;
        let attrs = &resource.attributes;
        let email = get_string(attrs, "email_address").unwrap_or_default();

        let created = client
            .add_user(&to_record(attrs))
            .await
            .map_err(|e| remote_error(&resource.id, e))?;

        info!("Created {} ({})", resource.id, email);
        Ok(
            State::existing(resource.id.clone(), to_attributes(&created, attrs))
                .with_identifier(email),
        )
    }

    async fn read(&self, client: &dyn CloudCenterApi, current: &State) -> ProviderResult<State> {
        let email = email_of(current)?;
        let user = client.get_user_by_email(&email).await.map_err(|e| {
            let username = get_string(&current.attributes, "username").unwrap_or_default();
            ProviderError::new(format!("UNABLE TO RETRIEVE DETAILS FOR USER: {}", username))
                .for_resource(current.id.clone())
                .with_cause(e)
        })?;
        Ok(refreshed(current, to_attributes(&user, &current.attributes)))
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

        let updated = client
            .update_user(&to_record(&attrs))
            .await
            .map_err(|e| remote_error(&to.id, e))?;

        info!("Updated {}", to.id);
        Ok(refreshed(from, to_attributes(&updated, &attrs)))
    }

    async fn delete(&self, client: &dyn CloudCenterApi, current: &State) -> ProviderResult<State> {
        let email = email_of(current)?;
        client
            .delete_user_by_email(&email)
            .await
            .map_err(|e| remote_error(&current.id, e))?;

        info!("Deleted {} ({})", current.id, email);
        Ok(deleted(current))
    }
}
