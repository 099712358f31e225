//! In-memory CloudCenter API used by the adapter tests

use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};

use async_trait::async_trait;
use serde::Serialize;

use crate::client::{
    ActivationProfile, Bundle, ClientError, ClientResult, CloudCenterApi, Contract, Group, Image,
    Plan, Role, User,
};

/// Fixed server timestamp stamped on every stored record
pub const SERVER_TIME: i64 = 1_546_300_800_000;

trait Record: Clone + Serialize + Send {
    const KIND: &'static str;
    const COLLECTION: &'static str;

    fn id(&self) -> Option<&str>;
    fn tenant(&self) -> Option<i64>;
    /// Apply the fields the server owns
    fn assign(&mut self, id: String);
}

fn parse_tenant(tenant_id: &Option<String>) -> Option<i64> {
    tenant_id.as_deref().and_then(|t| t.parse().ok())
}

fn resource_path<R: Record>(record: &R, id: &str) -> String {
    format!(
        "/v1/tenants/{}/{}/{}",
        record.tenant().unwrap_or_default(),
        R::COLLECTION,
        id
    )
}

impl Record for User {
    const KIND: &'static str = "User";
    const COLLECTION: &'static str = "users";

    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }
    fn tenant(&self) -> Option<i64> {
        parse_tenant(&self.tenant_id)
    }
    fn assign(&mut self, id: String) {
        self.resource = Some(format!("/v1/users/{}", id));
        self.username = self.email_addr.clone();
        self.user_type = Some("TENANT".to_string());
        self.account_source = Some("AdminCreated".to_string());
        self.tenant_admin = Some(false);
        self.has_subscription_plan = Some(false);
        self.created = Some(SERVER_TIME);
        self.last_updated = Some(SERVER_TIME);
        self.id = Some(id);
    }
}

impl Record for Group {
    const KIND: &'static str = "Group";
    const COLLECTION: &'static str = "groups";

    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }
    fn tenant(&self) -> Option<i64> {
        parse_tenant(&self.tenant_id)
    }
    fn assign(&mut self, id: String) {
        self.resource = Some(resource_path(self, &id));
        self.created = Some(SERVER_TIME);
        self.last_updated = Some(SERVER_TIME);
        self.created_by_sso = Some(false);
        self.id = Some(id);
    }
}

impl Record for Role {
    const KIND: &'static str = "Role";
    const COLLECTION: &'static str = "roles";

    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }
    fn tenant(&self) -> Option<i64> {
        parse_tenant(&self.tenant_id)
    }
    fn assign(&mut self, id: String) {
        self.resource = Some(resource_path(self, &id));
        self.created = Some(SERVER_TIME);
        self.last_updated = Some(SERVER_TIME);
        self.oob_role = Some(false);
        self.id = Some(id);
    }
}

impl Record for Plan {
    const KIND: &'static str = "Plan";
    const COLLECTION: &'static str = "plans";

    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }
    fn tenant(&self) -> Option<i64> {
        parse_tenant(&self.tenant_id)
    }
    fn assign(&mut self, id: String) {
        self.resource = Some(resource_path(self, &id));
        self.number_of_users = Some(0);
        self.number_of_projects = Some(0);
        self.id = Some(id);
    }
}

impl Record for Bundle {
    const KIND: &'static str = "Bundle";
    const COLLECTION: &'static str = "bundles";

    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }
    fn tenant(&self) -> Option<i64> {
        parse_tenant(&self.tenant_id)
    }
    fn assign(&mut self, id: String) {
        self.resource = Some(resource_path(self, &id));
        self.disabled = Some(false);
        self.show_only_to_admin = Some(false);
        self.number_of_users = Some(0.0);
        self.id = Some(id);
    }
}

impl Record for Contract {
    const KIND: &'static str = "Contract";
    const COLLECTION: &'static str = "contracts";

    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }
    fn tenant(&self) -> Option<i64> {
        parse_tenant(&self.tenant_id)
    }
    fn assign(&mut self, id: String) {
        self.resource = Some(resource_path(self, &id));
        self.number_of_users = Some(0);
        self.id = Some(id);
    }
}

impl Record for ActivationProfile {
    const KIND: &'static str = "Activation profile";
    const COLLECTION: &'static str = "activationProfiles";

    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }
    fn tenant(&self) -> Option<i64> {
        self.tenant_id
    }
    fn assign(&mut self, id: String) {
        self.id = Some(id);
    }
}

impl Record for Image {
    const KIND: &'static str = "Image";
    const COLLECTION: &'static str = "images";

    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }
    fn tenant(&self) -> Option<i64> {
        self.tenant_id
    }
    fn assign(&mut self, id: String) {
        self.resource = Some(resource_path(self, &id));
        if self.internal_image_name.is_none() {
            self.internal_image_name = self.name.as_ref().map(|n| format!("{}-internal", n));
        }
        self.id = Some(id);
    }
}

struct Table<R>(Mutex<Vec<R>>);

impl<R> Default for Table<R> {
    fn default() -> Self {
        Self(Mutex::new(Vec::new()))
    }
}

/// CloudCenterApi backed by in-process tables.
///
/// IDs are issued sequentially from 1. Every add/update payload is recorded
/// as JSON so tests can assert what would have gone over the wire.
#[derive(Default)]
pub struct InMemoryClient {
    users: Table<User>,
    groups: Table<Group>,
    roles: Table<Role>,
    plans: Table<Plan>,
    bundles: Table<Bundle>,
    contracts: Table<Contract>,
    profiles: Table<ActivationProfile>,
    images: Table<Image>,
    next_id: AtomicI64,
    omit_user_email: AtomicBool,
    failure: Mutex<Option<String>>,
    sent: Mutex<Vec<serde_json::Value>>,
}

impl InMemoryClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent call fail with a 500 carrying `body`
    pub fn fail_with(&self, body: &str) {
        *self.failure.lock().unwrap() = Some(body.to_string());
    }

    /// Leave `emailAddr` out of user records returned by add and get
    pub fn omit_user_email(&self) {
        self.omit_user_email.store(true, Ordering::SeqCst);
    }

    fn user_response(&self, mut user: User) -> User {
        if self.omit_user_email.load(Ordering::SeqCst) {
            user.email_addr = None;
        }
        user
    }

    /// Payloads sent by add/update calls, oldest first
    pub fn sent(&self) -> Vec<serde_json::Value> {
        self.sent.lock().unwrap().clone()
    }

    pub fn last_sent(&self) -> Option<serde_json::Value> {
        self.sent.lock().unwrap().last().cloned()
    }

    fn check(&self) -> ClientResult<()> {
        match self.failure.lock().unwrap().as_ref() {
            Some(body) => Err(ClientError::Status {
                status: 500,
                body: body.clone(),
            }),
            None => Ok(()),
        }
    }

    fn record_sent<R: Serialize>(&self, record: &R) {
        if let Ok(value) = serde_json::to_value(record) {
            self.sent.lock().unwrap().push(value);
        }
    }

    fn add<R: Record>(&self, table: &Table<R>, record: &R) -> ClientResult<R> {
        self.check()?;
        self.record_sent(record);
        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        let mut stored = record.clone();
        stored.assign(id.to_string());
        table.0.lock().unwrap().push(stored.clone());
        Ok(stored)
    }

    fn get<R: Record>(&self, table: &Table<R>, tenant_id: i64, id: i64) -> ClientResult<R> {
        self.check()?;
        let id = id.to_string();
        table
            .0
            .lock()
            .unwrap()
            .iter()
            .find(|r| r.id() == Some(id.as_str()) && r.tenant() == Some(tenant_id))
            .cloned()
            .ok_or_else(|| ClientError::NotFound(format!("{} {}", R::KIND, id)))
    }

    fn update<R: Record>(&self, table: &Table<R>, record: &R) -> ClientResult<R> {
        self.check()?;
        self.record_sent(record);
        let id = record.id().ok_or(ClientError::MissingField("id"))?.to_string();
        let mut rows = table.0.lock().unwrap();
        let slot = rows
            .iter_mut()
            .find(|r| r.id() == Some(id.as_str()))
            .ok_or_else(|| ClientError::NotFound(format!("{} {}", R::KIND, id)))?;
        let mut stored = record.clone();
        stored.assign(id);
        *slot = stored.clone();
        Ok(stored)
    }

    fn delete<R: Record>(&self, table: &Table<R>, tenant_id: i64, id: i64) -> ClientResult<()> {
        self.check()?;
        let id = id.to_string();
        let mut rows = table.0.lock().unwrap();
        let before = rows.len();
        rows.retain(|r| !(r.id() == Some(id.as_str()) && r.tenant() == Some(tenant_id)));
        if rows.len() == before {
            return Err(ClientError::NotFound(format!("{} {}", R::KIND, id)));
        }
        Ok(())
    }

    fn user_by_email(&self, email: &str) -> ClientResult<User> {
        self.check()?;
        self.users
            .0
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.email_addr.as_deref() == Some(email))
            .cloned()
            .ok_or_else(|| ClientError::NotFound(format!("User {}", email)))
    }

    pub fn group_count(&self) -> usize {
        self.groups.0.lock().unwrap().len()
    }

    pub fn user_count(&self) -> usize {
        self.users.0.lock().unwrap().len()
    }
}

#[async_trait]
impl CloudCenterApi for InMemoryClient {
    async fn add_user(&self, user: &User) -> ClientResult<User> {
        self.add(&self.users, user).map(|u| self.user_response(u))
    }
    async fn get_user_by_email(&self, email: &str) -> ClientResult<User> {
        self.user_by_email(email).map(|u| self.user_response(u))
    }
    async fn update_user(&self, user: &User) -> ClientResult<User> {
        self.update(&self.users, user)
    }
    async fn delete_user_by_email(&self, email: &str) -> ClientResult<()> {
        let user = self.user_by_email(email)?;
        let mut rows = self.users.0.lock().unwrap();
        rows.retain(|u| u.id != user.id);
        Ok(())
    }

    async fn add_group(&self, group: &Group) -> ClientResult<Group> {
        self.add(&self.groups, group)
    }
    async fn get_group(&self, tenant_id: i64, group_id: i64) -> ClientResult<Group> {
        self.get(&self.groups, tenant_id, group_id)
    }
    async fn update_group(&self, group: &Group) -> ClientResult<Group> {
        self.update(&self.groups, group)
    }
    async fn delete_group(&self, tenant_id: i64, group_id: i64) -> ClientResult<()> {
        self.delete(&self.groups, tenant_id, group_id)
    }

    async fn add_role(&self, role: &Role) -> ClientResult<Role> {
        self.add(&self.roles, role)
    }
    async fn get_role(&self, tenant_id: i64, role_id: i64) -> ClientResult<Role> {
        self.get(&self.roles, tenant_id, role_id)
    }
    async fn update_role(&self, role: &Role) -> ClientResult<Role> {
        self.update(&self.roles, role)
    }
    async fn delete_role(&self, tenant_id: i64, role_id: i64) -> ClientResult<()> {
        self.delete(&self.roles, tenant_id, role_id)
    }

    async fn add_plan(&self, plan: &Plan) -> ClientResult<Plan> {
        self.add(&self.plans, plan)
    }
    async fn get_plan(&self, tenant_id: i64, plan_id: i64) -> ClientResult<Plan> {
        self.get(&self.plans, tenant_id, plan_id)
    }
    async fn update_plan(&self, plan: &Plan) -> ClientResult<Plan> {
        self.update(&self.plans, plan)
    }
    async fn delete_plan(&self, tenant_id: i64, plan_id: i64) -> ClientResult<()> {
        self.delete(&self.plans, tenant_id, plan_id)
    }

    async fn add_bundle(&self, bundle: &Bundle) -> ClientResult<Bundle> {
        self.add(&self.bundles, bundle)
    }
    async fn get_bundle(&self, tenant_id: i64, bundle_id: i64) -> ClientResult<Bundle> {
        self.get(&self.bundles, tenant_id, bundle_id)
    }
    async fn update_bundle(&self, bundle: &Bundle) -> ClientResult<Bundle> {
        self.update(&self.bundles, bundle)
    }
    async fn delete_bundle(&self, tenant_id: i64, bundle_id: i64) -> ClientResult<()> {
        self.delete(&self.bundles, tenant_id, bundle_id)
    }

    async fn add_contract(&self, contract: &Contract) -> ClientResult<Contract> {
        self.add(&self.contracts, contract)
    }
    async fn get_contract(&self, tenant_id: i64, contract_id: i64) -> ClientResult<Contract> {
        self.get(&self.contracts, tenant_id, contract_id)
    }
    async fn update_contract(&self, contract: &Contract) -> ClientResult<Contract> {
        self.update(&self.contracts, contract)
    }
    async fn delete_contract(&self, tenant_id: i64, contract_id: i64) -> ClientResult<()> {
        self.delete(&self.contracts, tenant_id, contract_id)
    }

    async fn add_activation_profile(
        &self,
        profile: &ActivationProfile,
    ) -> ClientResult<ActivationProfile> {
        self.add(&self.profiles, profile)
    }
    async fn get_activation_profile(
        &self,
        tenant_id: i64,
        profile_id: i64,
    ) -> ClientResult<ActivationProfile> {
        self.get(&self.profiles, tenant_id, profile_id)
    }
    async fn update_activation_profile(
        &self,
        profile: &ActivationProfile,
    ) -> ClientResult<ActivationProfile> {
        self.update(&self.profiles, profile)
    }
    async fn delete_activation_profile(
        &self,
        tenant_id: i64,
        profile_id: i64,
    ) -> ClientResult<()> {
        self.delete(&self.profiles, tenant_id, profile_id)
    }

    async fn add_image(&self, image: &Image) -> ClientResult<Image> {
        self.add(&self.images, image)
    }
    async fn get_image(&self, tenant_id: i64, image_id: i64) -> ClientResult<Image> {
        self.get(&self.images, tenant_id, image_id)
    }
    async fn update_image(&self, image: &Image) -> ClientResult<Image> {
        self.update(&self.images, image)
    }
    async fn delete_image(&self, tenant_id: i64, image_id: i64) -> ClientResult<()> {
        self.delete(&self.images, tenant_id, image_id)
    }
}
