pub mod manager;
pub mod proxy;

use sea_orm::entity::prelude::*;
use sea_orm::Iterable;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;

use crate::password::{self, PasswordError};
use manager::UserManager;

/// The role a user plays at an event.
/// Each role has a matching view in [`proxy`] over the same table.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    EnumIter,
    DeriveActiveEnum,
    Serialize,
    Deserialize,
    ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(40))")]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[sea_orm(string_value = "organizer")]
    Organizer,
    #[sea_orm(string_value = "guide")]
    Guide,
    #[default]
    #[sea_orm(string_value = "attendee")]
    Attendee,
}

impl Role {
    /// The value stored in the `role` column.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Organizer => "organizer",
            Role::Guide => "guide",
            Role::Attendee => "attendee",
        }
    }

    /// Human readable label.
    pub fn label(&self) -> &'static str {
        match self {
            Role::Organizer => "Organizer",
            Role::Guide => "Guide",
            Role::Attendee => "Attendee",
        }
    }

    /// `(role, label)` pairs in declaration order.
    pub fn choices() -> Vec<(Role, &'static str)> {
        Role::iter().map(|role| (role, role.label())).collect()
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownRole(pub String);

impl fmt::Display for UnknownRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown role '{}'", self.0)
    }
}

impl std::error::Error for UnknownRole {}

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::iter()
            .find(|role| role.as_str() == s)
            .ok_or_else(|| UnknownRole(s.to_string()))
    }
}

/// Represents an account of the system.
/// Users authenticate with their email; the username is a unique display handle.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    /// Email address, stored with a lowercased domain part.
    #[sea_orm(unique)]
    pub email: String,
    #[sea_orm(unique, column_type = "String(StringLen::N(60))")]
    pub username: String,
    #[sea_orm(column_type = "String(StringLen::N(100))", nullable)]
    pub name: Option<String>,
    /// Encoded password, see [`crate::password`].
    pub password: String,
    pub last_login: Option<DateTimeUtc>,
    #[sea_orm(default_value = "false")]
    pub is_staff: bool,
    #[sea_orm(default_value = "false")]
    pub is_active: bool,
    #[sea_orm(default_value = "false")]
    pub is_superuser: bool,
    pub date_joined: DateTimeUtc,
    pub role: Role,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Field used as the natural key for authentication.
    pub const USERNAME_FIELD: &'static str = "email";
    pub const EMAIL_FIELD: &'static str = "email";
    /// Fields asked for on superuser creation besides the natural key and password.
    pub const REQUIRED_FIELDS: &'static [&'static str] = &["username"];

    /// Value of the natural key.
    pub fn get_username(&self) -> &str {
        &self.email
    }

    pub fn check_password(&self, raw_password: &str) -> Result<bool, PasswordError> {
        password::check_password(raw_password, &self.password)
    }

    pub fn has_usable_password(&self) -> bool {
        password::is_password_usable(&self.password)
    }

    pub fn is_organizer(&self) -> bool {
        self.role == Role::Organizer
    }

    pub fn is_guide(&self) -> bool {
        self.role == Role::Guide
    }

    pub fn is_attendee(&self) -> bool {
        self.role == Role::Attendee
    }
}

impl fmt::Display for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.username)
    }
}

impl Entity {
    /// The unscoped manager over every row of the table.
    pub fn objects() -> UserManager {
        UserManager::new()
    }

    pub fn find_by_email(email: &str) -> Select<Entity> {
        Self::find().filter(Column::Email.eq(email))
    }
}
