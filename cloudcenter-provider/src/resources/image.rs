//! cloudcenter_image: logical images mapped to cloud-specific images

use async_trait::async_trait;
use cloudcenter_core::provider::{ProviderResult, ResourceType};
use cloudcenter_core::resource::{Resource, State};
use cloudcenter_core::schema::{AttributeSchema, AttributeType, ResourceSchema};
use log::info;

use super::{
    ResourceAdapter, deleted, local_identifier, refreshed, remote_error, retrieval_failed,
    tenant_and_id, update_attributes, validate,
};
use crate::attrs::{Attributes, get_bool, get_int, get_string, set_bool, set_int, set_string};
use crate::client::{CloudCenterApi, Image};

const ENTITY: &str = "IMAGE";

pub struct ImageResource;

fn to_record(attrs: &Attributes) -> Image {
    Image {
        id: get_string(attrs, "image_id"),
        resource: get_string(attrs, "resource"),
        tenant_id: get_int(attrs, "tenant_id"),
        name: get_string(attrs, "image_name"),
        internal_image_name: get_string(attrs, "internal_image_name"),
        description: get_string(attrs, "description"),
        visibility: get_string(attrs, "visibility"),
        image_type: get_string(attrs, "image_type"),
        os_name: get_string(attrs, "os_name"),
        enabled: get_bool(attrs, "enabled"),
        system_image: get_bool(attrs, "system_image"),
        num_of_nics: get_int(attrs, "num_of_nics"),
        attach_count: get_int(attrs, "attach_count"),
    }
}

fn to_attributes(image: &Image, base: &Attributes) -> Attributes {
    let mut attrs = base.clone();
    set_string(&mut attrs, "image_id", image.id.as_ref());
    set_string(&mut attrs, "resource", image.resource.as_ref());
    set_int(&mut attrs, "tenant_id", image.tenant_id);
    set_string(&mut attrs, "image_name", image.name.as_ref());
    set_string(
        &mut attrs,
        "internal_image_name",
        image.internal_image_name.as_ref(),
    );
    set_string(&mut attrs, "description", image.description.as_ref());
    set_string(&mut attrs, "visibility", image.visibility.as_ref());
    set_string(&mut attrs, "image_type", image.image_type.as_ref());
    set_string(&mut attrs, "os_name", image.os_name.as_ref());
    set_bool(&mut attrs, "enabled", image.enabled);
    set_bool(&mut attrs, "system_image", image.system_image);
    set_int(&mut attrs, "num_of_nics", image.num_of_nics);
    set_int(&mut attrs, "attach_count", image.attach_count);
    attrs
}

impl ResourceType for ImageResource {
    fn name(&self) -> &'static str {
        "cloudcenter_image"
    }

    fn schema(&self) -> ResourceSchema {
        use AttributeType::{Bool, Int, String};

        ResourceSchema::new("cloudcenter_image")
            .with_description("A logical image")
            .attribute(AttributeSchema::new("image_id", String).computed())
            .attribute(AttributeSchema::new("image_name", String).required())
            .attribute(AttributeSchema::new("resource", String).computed())
            .attribute(AttributeSchema::new("tenant_id", Int).required())
            .attribute(AttributeSchema::new("internal_image_name", String).computed())
            .attribute(AttributeSchema::new("description", String))
            .attribute(
                AttributeSchema::new("visibility", String)
                    .with_description("PUBLIC or PRIVATE"),
            )
            .attribute(AttributeSchema::new("image_type", String))
            .attribute(AttributeSchema::new("os_name", String))
            .attribute(AttributeSchema::new("enabled", Bool))
            .attribute(AttributeSchema::new("system_image", Bool))
            .attribute(AttributeSchema::new("num_of_nics", Int))
            .attribute(AttributeSchema::new("attach_count", Int))
    }
}

#[async_trait]
impl ResourceAdapter for ImageResource {
    async fn create(
        &self,
        client: &dyn CloudCenterApi,
        resource: &Resource,
    ) -> ProviderResult<State> {
        validate(&self.schema(), resource)?;
        let attrs = &resource.attributes;
        let identifier = local_identifier(
            get_int(attrs, "tenant_id").unwrap_or_default(),
            &get_string(attrs, "image_name").unwrap_or_default(),
        );

        let image = client
            .add_image(&to_record(attrs))
            .await
            .map_err(|e| remote_error(&resource.id, e))?;

        info!("Created {} ({})", resource.id, identifier);
        Ok(State::existing(resource.id.clone(), to_attributes(&image, attrs))
            .with_identifier(identifier))
    }

    async fn read(&self, client: &dyn CloudCenterApi, current: &State) -> ProviderResult<State> {
        let (tenant_id, image_id) = tenant_and_id(current, ENTITY, "image_id")?;
        let image = client
            .get_image(tenant_id, image_id)
            .await
            .map_err(|e| retrieval_failed(&current.id, ENTITY, e))?;
        Ok(refreshed(current, to_attributes(&image, &current.attributes)))
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

        let image = client
            .update_image(&to_record(&attrs))
            .await
            .map_err(|e| remote_error(&to.id, e))?;

        info!("Updated {}", to.id);
        Ok(refreshed(from, to_attributes(&image, &attrs)))
    }

    async fn delete(&self, client: &dyn CloudCenterApi, current: &State) -> ProviderResult<State> {
        let (tenant_id, image_id) = tenant_and_id(current, ENTITY, "image_id")?;
        client
            .delete_image(tenant_id, image_id)
            .await
            .map_err(|e| remote_error(&current.id, e))?;

        info!("Deleted {}", current.id);
        Ok(deleted(current))
    }
}
