//! Wire records for the CloudCenter REST API
//!
//! Field names follow the API's camelCase JSON. Every field is optional so
//! partial records (e.g. a group member carrying only its id) serialize
//! without nulls.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email_addr: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tenant_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub user_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email_verified: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub external_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_keys: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disable_reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account_source: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub activation_data: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub co_admin: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tenant_admin: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub activation_profile_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub has_subscription_plan: Option<bool>,
}

impl User {
    /// A user reference carrying only its id
    pub fn reference(id: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            ..Default::default()
        }
    }
}

/// Page of users returned by the user collection endpoint
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserList {
    #[serde(default)]
    pub users: Vec<User>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Group {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tenant_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub users: Vec<User>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub roles: Vec<Role>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_by_sso: Option<bool>,
}

impl Group {
    /// A group reference carrying only its id
    pub fn reference(id: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectPerm {
    pub object_type: String,
    #[serde(default)]
    pub perms: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Role {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tenant_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub perms: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub object_perms: Vec<ObjectPerm>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub users: Vec<User>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub groups: Vec<Group>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub oob_role: Option<bool>,
}

impl Role {
    /// A role reference carrying only its id
    pub fn reference(id: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Plan {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tenant_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub plan_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub monthly_limit: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub node_hour_increment: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub included_bundle_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub onetime_fee: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub annual_fee: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub storage_rate: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hourly_rate: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub overage_rate: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub overage_limit: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub restricted_to_app_store_only: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bill_to_vendor: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enable_rollover: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub show_only_to_admin: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub number_of_users: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub number_of_projects: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bundle {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tenant_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub bundle_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiration_date: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiration_months: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub show_only_to_admin: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub number_of_users: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contract {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tenant_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub length: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub terms: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discount_rate: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub show_only_to_admin: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub number_of_users: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivateRegion {
    pub region_id: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivationProfile {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tenant_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plan_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bundle_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contract_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dep_env_id: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub activate_regions: Vec<ActivateRegion>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub agree_to_contract: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub send_activation_email: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Image {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tenant_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub internal_image_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visibility: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub os_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_image: Option<bool>,
    #[serde(rename = "numOfNICs", skip_serializing_if = "Option::is_none")]
    pub num_of_nics: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attach_count: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn group_members_serialize_as_id_only() {
        let group = Group {
            tenant_id: Some("1".to_string()),
            name: Some("ops".to_string()),
            users: vec![User::reference("5")],
            roles: vec![Role::reference("9")],
            ..Default::default()
        };

        let value = serde_json::to_value(&group).unwrap();
        assert_eq!(
            value,
            json!({
                "tenantId": "1",
                "name": "ops",
                "users": [{"id": "5"}],
                "roles": [{"id": "9"}]
            })
        );
    }

    #[test]
    fn user_decodes_camel_case_and_type() {
        let user: User = serde_json::from_value(json!({
            "id": "42",
            "emailAddr": "ana@example.com",
            "type": "TENANT",
            "tenantAdmin": false,
            "created": 1546300800000i64,
            "unknownField": {"ignored": true}
        }))
        .unwrap();

        assert_eq!(user.id.as_deref(), Some("42"));
        assert_eq!(user.email_addr.as_deref(), Some("ana@example.com"));
        assert_eq!(user.user_type.as_deref(), Some("TENANT"));
        assert_eq!(user.tenant_admin, Some(false));
        assert_eq!(user.created, Some(1546300800000));
    }

    #[test]
    fn image_nic_count_uses_api_spelling() {
        let image = Image {
            num_of_nics: Some(2),
            ..Default::default()
        };
        assert_eq!(serde_json::to_value(&image).unwrap(), json!({"numOfNICs": 2}));
    }

    #[test]
    fn missing_list_fields_default_to_empty() {
        let role: Role = serde_json::from_value(json!({"id": "3", "perms": ["a", "b"]})).unwrap();
        assert_eq!(role.perms, vec!["a".to_string(), "b".to_string()]);
        assert!(role.object_perms.is_empty());
    }
}
