//! Personnel: the profile attached to a user

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use super::user::{UserRole, USER_COLUMNS};
use super::validate::{Validate, ValidationError, Violations};
use super::Entity;

pub(crate) const PERSONNEL_COLUMNS: &[&str] = &[
    "id",
    "first_name",
    "last_name",
    "gender",
    "email",
    "mobile",
    "address",
    "role",
    "avatar",
    "user_id",
    "activation_status",
    "organization_id",
    "created_at",
    "updated_at",
    "deleted_at",
];

/// Gender of a person
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Gender {
    Male,
    Female,
    Other,
}

impl Gender {
    /// Every accepted value
    pub const ALL: &'static [&'static str] = &["MALE", "FEMALE", "OTHER"];
}

/// Whether a personnel record is active
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActivationStatus {
    Active,
    Disabled,
}

impl ActivationStatus {
    /// Wire and column value
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "ACTIVE",
            Self::Disabled => "DISABLED",
        }
    }

    /// Every accepted value
    pub const ALL: &'static [&'static str] = &["ACTIVE", "DISABLED"];
}

/// Postal address, stored as jsonb
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct Address {
    pub street: String,
    pub city: String,
    pub state: String,
    pub country: String,
    pub pincode: String,
}

impl Address {
    /// Overwrite every field that is non-empty in `changes`
    pub fn merge(&mut self, changes: Address) {
        let Address {
            street,
            city,
            state,
            country,
            pincode,
        } = changes;
        for (slot, value) in [
            (&mut self.street, street),
            (&mut self.city, city),
            (&mut self.state, state),
            (&mut self.country, country),
            (&mut self.pincode, pincode),
        ] {
            if !value.is_empty() {
                *slot = value;
            }
        }
    }
}

/// A row of `personnel`
#[derive(Debug, Clone, Default, PartialEq, Serialize, FromRow, ToSchema)]
#[sqlx(default)]
pub struct Personnel {
    pub id: Uuid,
    #[schema(example = "Mohammad")]
    pub first_name: String,
    #[schema(example = "Rizwan")]
    pub last_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(example = "MALE")]
    pub gender: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[schema(example = "+919984778492")]
    pub mobile: String,
    #[sqlx(json)]
    pub address: Address,
    #[schema(example = "ADMIN")]
    pub role: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    pub user_id: Uuid,
    #[schema(example = "ACTIVE")]
    pub activation_status: String,
    pub organization_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Entity for Personnel {
    const NAME: &'static str = "Personnel";
    const TABLE: &'static str = "personnel";
    const COLUMNS: &'static [&'static str] = PERSONNEL_COLUMNS;
    const TEXT_COLUMNS: &'static [&'static str] = &[
        "first_name",
        "last_name",
        "gender",
        "email",
        "mobile",
        "role",
        "avatar",
        "activation_status",
    ];
    const TENANT_COLUMN: Option<&'static str> = Some("organization_id");
    const ASSOCIATIONS: &'static [(&'static str, &'static [&'static str])] =
        &[("user", USER_COLUMNS)];

    fn id(&self) -> Uuid {
        self.id
    }
}

/// Body of `POST /personnel`
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(default)]
pub struct CreatePersonnelInput {
    #[schema(example = "Mohammad")]
    pub first_name: String,
    pub last_name: String,
    #[schema(example = "MALE")]
    pub gender: String,
    #[schema(example = "expertkhan@gmail.com")]
    pub email: String,
    #[schema(example = "+919984778492")]
    pub mobile: String,
    pub address: Address,
    #[schema(example = "ADMIN")]
    pub role: String,
    pub avatar: String,
    pub user_id: Uuid,
    #[schema(example = "ACTIVE")]
    pub activation_status: String,
}

impl Validate for CreatePersonnelInput {
    fn validate(&self) -> Result<(), ValidationError> {
        Violations::new()
            .required("first_name", &self.first_name)
            .one_of("gender", &self.gender, Gender::ALL)
            .email("email", &self.email)
            .mobile("mobile", &self.mobile)
            .one_of("role", &self.role, UserRole::ALL)
            .required_id("user_id", self.user_id)
            .one_of(
                "activation_status",
                &self.activation_status,
                ActivationStatus::ALL,
            )
            .max_len("first_name", &self.first_name, 100)
            .max_len("last_name", &self.last_name, 100)
            .finish()
    }
}

/// Body of `PUT /personnel/{id}`; empty fields are left unchanged
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(default)]
pub struct UpdatePersonnelInput {
    pub first_name: String,
    pub last_name: String,
    pub gender: String,
    pub address: Address,
    pub email: String,
    pub role: String,
    pub avatar: String,
    pub activation_status: String,
}

impl Validate for UpdatePersonnelInput {
    fn validate(&self) -> Result<(), ValidationError> {
        Violations::new()
            .one_of("gender", &self.gender, Gender::ALL)
            .email("email", &self.email)
            .one_of("role", &self.role, UserRole::ALL)
            .one_of(
                "activation_status",
                &self.activation_status,
                ActivationStatus::ALL,
            )
            .max_len("first_name", &self.first_name, 100)
            .max_len("last_name", &self.last_name, 100)
            .finish()
    }
}

fn non_empty(value: String) -> Option<String> {
    (!value.is_empty()).then_some(value)
}

impl Personnel {
    /// Build a new record from a create request; status defaults to ACTIVE
    pub fn from_input(input: CreatePersonnelInput, organization_id: Option<Uuid>) -> Self {
        let activation_status = non_empty(input.activation_status)
            .unwrap_or_else(|| ActivationStatus::Active.as_str().to_string());
        Self {
            first_name: input.first_name,
            last_name: input.last_name,
            gender: non_empty(input.gender),
            email: non_empty(input.email),
            mobile: input.mobile,
            address: input.address,
            role: non_empty(input.role).unwrap_or_else(|| UserRole::User.as_str().to_string()),
            avatar: non_empty(input.avatar),
            user_id: input.user_id,
            activation_status,
            organization_id,
            ..Default::default()
        }
    }

    /// Apply every non-empty field of `changes`
    pub fn apply(&mut self, changes: UpdatePersonnelInput) {
        if let Some(v) = non_empty(changes.first_name) {
            self.first_name = v;
        }
        if let Some(v) = non_empty(changes.last_name) {
            self.last_name = v;
        }
        if let Some(v) = non_empty(changes.gender) {
            self.gender = Some(v);
        }
        if let Some(v) = non_empty(changes.email) {
            self.email = Some(v);
        }
        if let Some(v) = non_empty(changes.role) {
            self.role = v;
        }
        if let Some(v) = non_empty(changes.avatar) {
            self.avatar = Some(v);
        }
        if let Some(v) = non_empty(changes.activation_status) {
            self.activation_status = v;
        }
        self.address.merge(changes.address);
    }
}
