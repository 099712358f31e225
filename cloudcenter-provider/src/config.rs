//! Provider configuration
//!
//! The three connection parameters are declared as a schema so hosts can
//! validate and document them the same way as resource attributes. Unset
//! parameters fall back to `CLOUDCENTER_USERNAME`, `CLOUDCENTER_PASSWORD`
//! and `CLOUDCENTER_URL`.

use std::collections::HashMap;
use std::fmt;

use cloudcenter_core::provider::{ProviderError, ProviderResult};
use cloudcenter_core::resource::Value;
use cloudcenter_core::schema::{AttributeSchema, AttributeType, ResourceSchema};

use crate::client::HttpClient;

pub const USERNAME_ENV: &str = "CLOUDCENTER_USERNAME";
pub const PASSWORD_ENV: &str = "CLOUDCENTER_PASSWORD";
pub const URL_ENV: &str = "CLOUDCENTER_URL";

/// Schema of the provider block
pub fn provider_schema() -> ResourceSchema {
    ResourceSchema::new("cloudcenter")
        .with_description("Connection to a CloudCenter manager")
        .attribute(
            AttributeSchema::new("username", AttributeType::String)
                .required()
                .with_env_default(USERNAME_ENV)
                .with_description("Username for API access"),
        )
        .attribute(
            AttributeSchema::new("password", AttributeType::String)
                .required()
                .sensitive()
                .with_env_default(PASSWORD_ENV)
                .with_description("Password or API key for API access"),
        )
        .attribute(
            AttributeSchema::new("base_url", AttributeType::String)
                .required()
                .with_env_default(URL_ENV)
                .with_description("Base URL of the CloudCenter manager, e.g. https://ccm.example.com"),
        )
}

#[derive(Clone)]
pub struct ProviderConfig {
    pub username: String,
    pub password: String,
    pub base_url: String,
}

impl fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("username", &self.username)
            .field("password", &"(sensitive)")
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl ProviderConfig {
    /// Resolve configuration from explicit attributes and the process environment
    pub fn from_attributes(attrs: &HashMap<String, Value>) -> ProviderResult<Self> {
        Self::from_attributes_with(attrs, |var| std::env::var(var).ok())
    }

    /// Like `from_attributes`, with a custom environment lookup
    pub fn from_attributes_with<F>(attrs: &HashMap<String, Value>, lookup: F) -> ProviderResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let schema = provider_schema();
        let mut resolved = attrs.clone();
        schema.resolve_defaults(&mut resolved, lookup);

        if let Err(errors) = schema.validate(&resolved) {
            let messages: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
            return Err(ProviderError::new(format!(
                "Invalid provider configuration: {}",
                messages.join("; ")
            )));
        }

        let get = |key: &str| {
            resolved
                .get(key)
                .and_then(Value::as_str)
                .map(str::to_string)
                .unwrap_or_default()
        };

        Ok(Self {
            username: get("username"),
            password: get("password"),
            base_url: get("base_url"),
        })
    }

    /// Build the authenticated client handle
    pub fn client(&self) -> ProviderResult<HttpClient> {
        HttpClient::new(&self.base_url, &self.username, &self.password).map_err(|e| {
            ProviderError::new(format!("Failed to create CloudCenter client: {}", e)).with_cause(e)
        })
    }
}
