use chrono::NaiveDateTime;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::AuthServiceError;

/// User entity — the account record backing every authentication flow.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    /// Lowercased at the controller boundary before any lookup or insert.
    #[sea_orm(unique)]
    pub email: String,

    pub name: String,

    pub phone: Option<String>,

    /// Argon2 hash. `None` for accounts created via Google sign-in only.
    #[serde(skip_serializing)]
    #[schema(read_only)]
    pub password_hash: Option<String>,

    /// One of `customer`, `seller`, `admin`.
    pub role: String,

    /// Google federation subject id. Set once on first Google sign-in,
    /// immutable thereafter; a mismatch on a later sign-in is an identity
    /// collision.
    pub google_id: Option<String>,

    /// The single live refresh token for this user. Overwritten on every
    /// login/refresh, cleared on logout. Never serialized to clients.
    #[serde(skip_serializing)]
    #[schema(read_only)]
    pub refresh_token: Option<String>,

    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

/// Capability tier for a user account.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Customer,
    Seller,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Customer => "customer",
            Role::Seller => "seller",
            Role::Admin => "admin",
        }
    }

    /// Parse a stored role string. Unknown values are a data-integrity
    /// problem, not a client error.
    pub fn from_str(s: &str) -> Result<Self, AuthServiceError> {
        match s {
            "customer" => Ok(Role::Customer),
            "seller" => Ok(Role::Seller),
            "admin" => Ok(Role::Admin),
            other => Err(AuthServiceError::Internal(format!(
                "unknown role in user record: {other}"
            ))),
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Public user data (safe to return in API responses).
///
/// The password hash and the stored refresh token are never part of this
/// projection.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UserResponse {
    pub id: i32,
    pub name: String,
    pub email: String,
    pub role: String,
    pub phone: Option<String>,
}

impl From<Model> for UserResponse {
    fn from(user: Model) -> Self {
        UserResponse {
            id: user.id,
            name: user.name,
            email: user.email,
            role: user.role,
            phone: user.phone,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_round_trips_through_storage_repr() {
        for role in [Role::Customer, Role::Seller, Role::Admin] {
            assert_eq!(Role::from_str(role.as_str()).unwrap(), role);
        }
        assert!(Role::from_str("superuser").is_err());
    }

    #[test]
    fn user_response_omits_secrets() {
        let user = Model {
            id: 7,
            email: "a@x.com".into(),
            name: "Alice".into(),
            phone: None,
            password_hash: Some("$argon2id$...".into()),
            role: "customer".into(),
            google_id: None,
            refresh_token: Some("some.refresh.jwt".into()),
            created_at: chrono::Utc::now().naive_utc(),
            updated_at: chrono::Utc::now().naive_utc(),
        };

        let body = serde_json::to_value(UserResponse::from(user)).unwrap();
        assert_eq!(body["id"], 7);
        assert_eq!(body["role"], "customer");
        assert!(body.get("password_hash").is_none());
        assert!(body.get("refresh_token").is_none());
    }
}
