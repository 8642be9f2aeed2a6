//! Users: login identities

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use super::personnel::PERSONNEL_COLUMNS;
use super::validate::{Validate, ValidationError, Violations};
use super::Entity;

pub(crate) const USER_COLUMNS: &[&str] = &[
    "id",
    "user_name",
    "role",
    "organization_id",
    "created_at",
    "updated_at",
    "deleted_at",
];

/// Role granted to a user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserRole {
    /// Administrator
    Admin,
    /// Regular user
    User,
}

impl UserRole {
    /// Wire and column value
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "ADMIN",
            Self::User => "USER",
        }
    }

    /// Every accepted value
    pub const ALL: &'static [&'static str] = &["ADMIN", "USER"];
}

/// A row of `users`
#[derive(Debug, Clone, Default, PartialEq, Serialize, FromRow, ToSchema)]
#[sqlx(default)]
pub struct User {
    pub id: Uuid,
    #[schema(example = "+919984778491")]
    pub user_name: String,
    /// Argon2id hash, never serialized
    #[serde(skip_serializing)]
    #[schema(ignore)]
    pub password: String,
    #[schema(example = "ADMIN")]
    pub role: String,
    pub organization_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Entity for User {
    const NAME: &'static str = "User";
    const TABLE: &'static str = "users";
    const COLUMNS: &'static [&'static str] = USER_COLUMNS;
    const TEXT_COLUMNS: &'static [&'static str] = &["user_name", "role"];
    const TENANT_COLUMN: Option<&'static str> = Some("organization_id");
    const ASSOCIATIONS: &'static [(&'static str, &'static [&'static str])] =
        &[("personnel", PERSONNEL_COLUMNS)];

    fn id(&self) -> Uuid {
        self.id
    }
}

/// Row values for a new user
#[derive(Debug, Clone)]
pub struct NewUser {
    pub user_name: String,
    pub password_hash: String,
    pub role: String,
    pub organization_id: Option<Uuid>,
}

/// Changes to a user; `None` keeps the stored value
#[derive(Debug, Clone, Default)]
pub struct UserChanges {
    pub user_name: Option<String>,
    pub password_hash: Option<String>,
    pub role: Option<String>,
}

/// Body of `POST /users`
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct RegisterUserInput {
    #[schema(example = "Mohammad")]
    pub first_name: String,
    #[serde(default)]
    #[schema(example = "Rizwan")]
    pub last_name: String,
    /// Phone number in E.164 form
    #[schema(example = "+919984778491")]
    pub user_name: String,
    #[serde(default = "default_role")]
    #[schema(example = "ADMIN")]
    pub role: String,
    #[schema(example = "password123")]
    pub password: String,
}

fn default_role() -> String {
    UserRole::User.as_str().to_string()
}

impl Validate for RegisterUserInput {
    fn validate(&self) -> Result<(), ValidationError> {
        Violations::new()
            .required("first_name", &self.first_name)
            .required("user_name", &self.user_name)
            .mobile("user_name", &self.user_name)
            .one_of("role", &self.role, UserRole::ALL)
            .required("password", &self.password)
            .max_len("first_name", &self.first_name, 100)
            .max_len("last_name", &self.last_name, 100)
            .finish()
    }
}

/// Body of `PUT /users/{id}`; empty fields are left unchanged
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(default)]
pub struct UpdateUserInput {
    pub first_name: String,
    pub last_name: String,
    pub user_name: String,
    pub role: String,
    pub password: String,
}

impl Validate for UpdateUserInput {
    fn validate(&self) -> Result<(), ValidationError> {
        Violations::new()
            .mobile("user_name", &self.user_name)
            .one_of("role", &self.role, UserRole::ALL)
            .max_len("first_name", &self.first_name, 100)
            .max_len("last_name", &self.last_name, 100)
            .finish()
    }
}

/// Body of `POST /users/login`
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct LoginInput {
    #[schema(example = "+919984778491")]
    pub user_name: String,
    pub password: String,
}

impl Validate for LoginInput {
    fn validate(&self) -> Result<(), ValidationError> {
        Violations::new()
            .required("user_name", &self.user_name)
            .required("password", &self.password)
            .finish()
    }
}

/// Issued bearer token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct LoginOutput {
    pub token: String,
    /// Token lifetime in seconds
    pub expires_in: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_never_serialized() {
        let user = User {
            user_name: "+919984778491".to_string(),
            password: "$argon2id$secret".to_string(),
            role: "ADMIN".to_string(),
            ..Default::default()
        };
        let json = serde_json::to_value(&user).unwrap();
        assert!(json.get("password").is_none());
        assert!(json.get("deleted_at").is_none());
        assert_eq!(json["role"], "ADMIN");
    }

    #[test]
    fn test_allow_list_excludes_password() {
        assert!(!User::COLUMNS.contains(&"password"));
        assert!(User::allow_list().columns.contains(&"user_name"));
    }

    #[test]
    fn test_register_validation() {
        let input: RegisterUserInput = serde_json::from_value(serde_json::json!({
            "first_name": "",
            "user_name": "abc",
            "role": "ROOT",
            "password": "pw"
        }))
        .unwrap();
        let err = input.validate().unwrap_err();
        assert_eq!(
            err.fields,
            vec![
                "first_name is required",
                "user_name is an invalid mobile number",
                "role must be one of ADMIN USER",
            ]
        );
    }

    #[test]
    fn test_register_defaults_role() {
        let input: RegisterUserInput = serde_json::from_value(serde_json::json!({
            "first_name": "Ada",
            "user_name": "+919984778491",
            "password": "correct horse"
        }))
        .unwrap();
        assert_eq!(input.role, "USER");
        assert!(input.validate().is_ok());
    }
}
