//! REST implementation of `CloudCenterApi`

use std::fmt::Display;
use std::time::Duration;

use async_trait::async_trait;
use log::debug;
use reqwest::{Client, Method, RequestBuilder};
use serde::Serialize;
use serde::de::DeserializeOwned;

use super::types::{
    ActivationProfile, Bundle, Contract, Group, Image, Plan, Role, User, UserList,
};
use super::{ClientError, ClientResult, CloudCenterApi};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// HTTP client for the CloudCenter Manager REST API
///
/// Every request carries the configured credentials as basic auth.
pub struct HttpClient {
    http: Client,
    base_url: String,
    username: String,
    password: String,
}

impl HttpClient {
    pub fn new(
        base_url: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> ClientResult<Self> {
        let http = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| ClientError::Build(e.to_string()))?;

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            username: username.into(),
            password: password.into(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn request(&self, method: Method, url: &str) -> RequestBuilder {
        self.http
            .request(method, url)
            .basic_auth(&self.username, Some(&self.password))
            .header("Accept", "application/json")
    }

    /// Send a request and return the body of a successful response
    async fn execute(&self, request: RequestBuilder, url: &str) -> ClientResult<String> {
        let response = request.send().await.map_err(|source| ClientError::Request {
            url: url.to_string(),
            source,
        })?;

        let status = response.status();
        let text = response.text().await.map_err(|source| ClientError::Request {
            url: url.to_string(),
            source,
        })?;

        if !status.is_success() {
            debug!("{} answered {}", url, status);
            return Err(ClientError::Status {
                status: status.as_u16(),
                body: text,
            });
        }

        Ok(text)
    }

    async fn send_json<B, T>(&self, method: Method, path: &str, body: &B) -> ClientResult<T>
    where
        B: Serialize + Sync,
        T: DeserializeOwned,
    {
        let url = self.url(path);
        let payload = serde_json::to_value(body).map_err(|e| ClientError::Encode {
            url: url.clone(),
            message: e.to_string(),
        })?;
        debug!("{} {}", method, url);

        let text = self
            .execute(self.request(method, &url).json(&payload), &url)
            .await?;
        self.decode(path, &text)
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> ClientResult<T> {
        let url = self.url(path);
        debug!("GET {}", url);
        let text = self.execute(self.request(Method::GET, &url), &url).await?;
        self.decode(path, &text)
    }

    async fn delete(&self, path: &str) -> ClientResult<()> {
        let url = self.url(path);
        debug!("DELETE {}", url);
        self.execute(self.request(Method::DELETE, &url), &url)
            .await
            .map(|_| ())
    }

    fn decode<T: DeserializeOwned>(&self, path: &str, text: &str) -> ClientResult<T> {
        serde_json::from_str(text).map_err(|e| ClientError::Decode {
            url: self.url(path),
            message: e.to_string(),
        })
    }

    async fn find_user_by_email(&self, email: &str) -> ClientResult<User> {
        let list: UserList = self.get("/v1/users").await?;
        list.users
            .into_iter()
            .find(|u| u.email_addr.as_deref() == Some(email))
            .ok_or_else(|| ClientError::NotFound(format!("User {}", email)))
    }
}

/// Collection path for an entity scoped to a tenant
fn tenant_path(tenant_id: impl Display, collection: &str) -> String {
    format!("/v1/tenants/{}/{}", tenant_id, collection)
}

fn item_path(tenant_id: impl Display, collection: &str, id: impl Display) -> String {
    format!("{}/{}", tenant_path(tenant_id, collection), id)
}

fn field<'a, T>(value: &'a Option<T>, name: &'static str) -> ClientResult<&'a T> {
    value.as_ref().ok_or(ClientError::MissingField(name))
}

#[async_trait]
impl CloudCenterApi for HttpClient {
    async fn add_user(&self, user: &User) -> ClientResult<User> {
        self.send_json(Method::POST, "/v1/users", user).await
    }

    async fn get_user_by_email(&self, email: &str) -> ClientResult<User> {
        self.find_user_by_email(email).await
    }

    async fn update_user(&self, user: &User) -> ClientResult<User> {
        let id = field(&user.id, "id")?;
        self.send_json(Method::PUT, &format!("/v1/users/{}", id), user)
            .await
    }

    async fn delete_user_by_email(&self, email: &str) -> ClientResult<()> {
        let user = self.find_user_by_email(email).await?;
        let id = field(&user.id, "id")?;
        self.delete(&format!("/v1/users/{}", id)).await
    }

    async fn add_group(&self, group: &Group) -> ClientResult<Group> {
        let tenant = field(&group.tenant_id, "tenantId")?;
        self.send_json(Method::POST, &tenant_path(tenant, "groups"), group)
            .await
    }

    async fn get_group(&self, tenant_id: i64, group_id: i64) -> ClientResult<Group> {
        self.get(&item_path(tenant_id, "groups", group_id)).await
    }

    async fn update_group(&self, group: &Group) -> ClientResult<Group> {
        let tenant = field(&group.tenant_id, "tenantId")?;
        let id = field(&group.id, "id")?;
        self.send_json(Method::PUT, &item_path(tenant, "groups", id), group)
            .await
    }

    async fn delete_group(&self, tenant_id: i64, group_id: i64) -> ClientResult<()> {
        self.delete(&item_path(tenant_id, "groups", group_id)).await
    }

    async fn add_role(&self, role: &Role) -> ClientResult<Role> {
        let tenant = field(&role.tenant_id, "tenantId")?;
        self.send_json(Method::POST, &tenant_path(tenant, "roles"), role)
            .await
    }

    async fn get_role(&self, tenant_id: i64, role_id: i64) -> ClientResult<Role> {
        self.get(&item_path(tenant_id, "roles", role_id)).await
    }

    async fn update_role(&self, role: &Role) -> ClientResult<Role> {
        let tenant = field(&role.tenant_id, "tenantId")?;
        let id = field(&role.id, "id")?;
        self.send_json(Method::PUT, &item_path(tenant, "roles", id), role)
            .await
    }

    async fn delete_role(&self, tenant_id: i64, role_id: i64) -> ClientResult<()> {
        self.delete(&item_path(tenant_id, "roles", role_id)).await
    }

    async fn add_plan(&self, plan: &Plan) -> ClientResult<Plan> {
        let tenant = field(&plan.tenant_id, "tenantId")?;
        self.send_json(Method::POST, &tenant_path(tenant, "plans"), plan)
            .await
    }

    async fn get_plan(&self, tenant_id: i64, plan_id: i64) -> ClientResult<Plan> {
        self.get(&item_path(tenant_id, "plans", plan_id)).await
    }

    async fn update_plan(&self, plan: &Plan) -> ClientResult<Plan> {
        let tenant = field(&plan.tenant_id, "tenantId")?;
        let id = field(&plan.id, "id")?;
        self.send_json(Method::PUT, &item_path(tenant, "plans", id), plan)
            .await
    }

    async fn delete_plan(&self, tenant_id: i64, plan_id: i64) -> ClientResult<()> {
        self.delete(&item_path(tenant_id, "plans", plan_id)).await
    }

    async fn add_bundle(&self, bundle: &Bundle) -> ClientResult<Bundle> {
        let tenant = field(&bundle.tenant_id, "tenantId")?;
        self.send_json(Method::POST, &tenant_path(tenant, "bundles"), bundle)
            .await
    }

    async fn get_bundle(&self, tenant_id: i64, bundle_id: i64) -> ClientResult<Bundle> {
        self.get(&item_path(tenant_id, "bundles", bundle_id)).await
    }

    async fn update_bundle(&self, bundle: &Bundle) -> ClientResult<Bundle> {
        let tenant = field(&bundle.tenant_id, "tenantId")?;
        let id = field(&bundle.id, "id")?;
        self.send_json(Method::PUT, &item_path(tenant, "bundles", id), bundle)
            .await
    }

    async fn delete_bundle(&self, tenant_id: i64, bundle_id: i64) -> ClientResult<()> {
        self.delete(&item_path(tenant_id, "bundles", bundle_id)).await
    }

    async fn add_contract(&self, contract: &Contract) -> ClientResult<Contract> {
        let tenant = field(&contract.tenant_id, "tenantId")?;
        self.send_json(Method::POST, &tenant_path(tenant, "contracts"), contract)
            .await
    }

    async fn get_contract(&self, tenant_id: i64, contract_id: i64) -> ClientResult<Contract> {
        self.get(&item_path(tenant_id, "contracts", contract_id))
            .await
    }

    async fn update_contract(&self, contract: &Contract) -> ClientResult<Contract> {
        let tenant = field(&contract.tenant_id, "tenantId")?;
        let id = field(&contract.id, "id")?;
        self.send_json(Method::PUT, &item_path(tenant, "contracts", id), contract)
            .await
    }

    async fn delete_contract(&self, tenant_id: i64, contract_id: i64) -> ClientResult<()> {
        self.delete(&item_path(tenant_id, "contracts", contract_id))
            .await
    }

    async fn add_activation_profile(
        &self,
        profile: &ActivationProfile,
    ) -> ClientResult<ActivationProfile> {
        let tenant = field(&profile.tenant_id, "tenantId")?;
        self.send_json(
            Method::POST,
            &tenant_path(tenant, "activationProfiles"),
            profile,
        )
        .await
    }

    async fn get_activation_profile(
        &self,
        tenant_id: i64,
        profile_id: i64,
    ) -> ClientResult<ActivationProfile> {
        self.get(&item_path(tenant_id, "activationProfiles", profile_id))
            .await
    }

    async fn update_activation_profile(
        &self,
        profile: &ActivationProfile,
    ) -> ClientResult<ActivationProfile> {
        let tenant = field(&profile.tenant_id, "tenantId")?;
        let id = field(&profile.id, "id")?;
        self.send_json(
            Method::PUT,
            &item_path(tenant, "activationProfiles", id),
            profile,
        )
        .await
    }

    async fn delete_activation_profile(
        &self,
        tenant_id: i64,
        profile_id: i64,
    ) -> ClientResult<()> {
        self.delete(&item_path(tenant_id, "activationProfiles", profile_id))
            .await
    }

    async fn add_image(&self, image: &Image) -> ClientResult<Image> {
        let tenant = field(&image.tenant_id, "tenantId")?;
        self.send_json(Method::POST, &tenant_path(tenant, "images"), image)
            .await
    }

    async fn get_image(&self, tenant_id: i64, image_id: i64) -> ClientResult<Image> {
        self.get(&item_path(tenant_id, "images", image_id)).await
    }

    async fn update_image(&self, image: &Image) -> ClientResult<Image> {
        let tenant = field(&image.tenant_id, "tenantId")?;
        let id = field(&image.id, "id")?;
        self.send_json(Method::PUT, &item_path(tenant, "images", id), image)
            .await
    }

    async fn delete_image(&self, tenant_id: i64, image_id: i64) -> ClientResult<()> {
        self.delete(&item_path(tenant_id, "images", image_id)).await
    }
}
