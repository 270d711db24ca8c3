use chrono::Utc;
use sea_orm::entity::prelude::*;
use sea_orm::{ActiveModelTrait, ConnectionTrait, PaginatorTrait, QueryOrder, Set, SqlErr};
use tracing::{debug, info, instrument, trace, warn};

use super::{ActiveModel, Column, Entity, Model, Role};
use crate::error::{Result, UserError};
use crate::password::make_password;

/// Optional fields accepted by the factory methods.
/// Anything left as `None` takes the column default.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserFields {
    pub name: Option<String>,
    pub is_staff: Option<bool>,
    pub is_active: Option<bool>,
    pub is_superuser: Option<bool>,
    pub role: Option<Role>,
    pub date_joined: Option<DateTimeUtc>,
}

/// Builds queries over the users table and creates users.
///
/// The unscoped manager (`user::Entity::objects()`) sees every row. A manager scoped
/// to a role (see [`super::proxy`]) filters every query on that role and stores every
/// user it creates with that role, whatever role the caller asked for.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UserManager {
    base_role: Option<Role>,
}

impl UserManager {
    pub const fn new() -> Self {
        Self { base_role: None }
    }

    pub const fn scoped(role: Role) -> Self {
        Self {
            base_role: Some(role),
        }
    }

    pub fn base_role(&self) -> Option<Role> {
        self.base_role
    }

    /// Lowercases the domain part of an email address.
    ///
    /// The local part is kept as given since mail servers may treat it case
    /// sensitively. The split happens on the last `@`; input without one is
    /// returned trimmed but otherwise unchanged.
    pub fn normalize_email(email: &str) -> String {
        let email = email.trim();
        match email.rsplit_once('@') {
            Some((local, domain)) => format!("{}@{}", local, domain.to_lowercase()),
            None => email.to_string(),
        }
    }

    /// Base query of this manager.
    pub fn find(&self) -> Select<Entity> {
        match self.base_role {
            Some(role) => Entity::find().filter(Column::Role.eq(role)),
            None => Entity::find(),
        }
    }

    pub async fn get<C: ConnectionTrait>(&self, db: &C, id: i32) -> Result<Option<Model>> {
        Ok(self.find().filter(Column::Id.eq(id)).one(db).await?)
    }

    /// Looks a user up by the natural key (email).
    pub async fn get_by_natural_key<C: ConnectionTrait>(
        &self,
        db: &C,
        email: &str,
    ) -> Result<Option<Model>> {
        let email = Self::normalize_email(email);
        Ok(self
            .find()
            .filter(Column::Email.eq(email.as_str()))
            .one(db)
            .await?)
    }

    pub async fn all<C: ConnectionTrait>(&self, db: &C) -> Result<Vec<Model>> {
        Ok(self.find().order_by_asc(Column::Id).all(db).await?)
    }

    pub async fn count<C: ConnectionTrait>(&self, db: &C) -> Result<u64> {
        Ok(self.find().count(db).await?)
    }

    /// Constructs an unsaved user.
    ///
    /// The email is normalised and the password encoded; a missing password yields
    /// an unusable one.
    #[instrument(skip(self, password, fields))]
    pub fn build_user(
        &self,
        email: &str,
        username: &str,
        password: Option<&str>,
        fields: UserFields,
    ) -> Result<ActiveModel> {
        if email.trim().is_empty() {
            return Err(UserError::MissingEmail);
        }

        let email = Self::normalize_email(email);
        let role = match self.base_role {
            Some(base_role) => {
                if let Some(requested) = fields.role.filter(|r| *r != base_role) {
                    debug!(
                        "Overriding requested role '{}' with base role '{}'",
                        requested, base_role
                    );
                }
                base_role
            }
            None => fields.role.unwrap_or_default(),
        };

        trace!("Encoding password for user '{}'", username);
        let password = make_password(password)?;

        Ok(ActiveModel {
            email: Set(email),
            username: Set(username.to_string()),
            name: Set(fields.name),
            password: Set(password),
            last_login: Set(None),
            is_staff: Set(fields.is_staff.unwrap_or(false)),
            is_active: Set(fields.is_active.unwrap_or(false)),
            is_superuser: Set(fields.is_superuser.unwrap_or(false)),
            date_joined: Set(fields.date_joined.unwrap_or_else(Utc::now)),
            role: Set(role),
            ..Default::default()
        })
    }

    /// Creates and stores a user.
    #[instrument(skip(self, db, password, fields))]
    pub async fn create_user<C: ConnectionTrait>(
        &self,
        db: &C,
        email: &str,
        username: &str,
        password: Option<&str>,
        fields: UserFields,
    ) -> Result<Model> {
        let new_user = self.build_user(email, username, password, fields)?;
        let email = Self::normalize_email(email);

        // Uniqueness is table wide, not per role.
        if Entity::find_by_email(&email).one(db).await?.is_some() {
            warn!("Email '{}' is already taken", email);
            return Err(UserError::AlreadyExists {
                field: "email",
                value: email,
            });
        }
        if Entity::find()
            .filter(Column::Username.eq(username))
            .one(db)
            .await?
            .is_some()
        {
            warn!("Username '{}' is already taken", username);
            return Err(UserError::AlreadyExists {
                field: "username",
                value: username.to_string(),
            });
        }

        match new_user.insert(db).await {
            Ok(user) => {
                info!(
                    "User created with ID: {}, username: {}, role: {}",
                    user.id, user.username, user.role
                );
                Ok(user)
            }
            Err(db_error) => match db_error.sql_err() {
                // Lost a race against a concurrent insert.
                Some(SqlErr::UniqueConstraintViolation(message)) => {
                    warn!("Unique constraint violated on insert: {}", message);
                    if message.contains("username") {
                        Err(UserError::AlreadyExists {
                            field: "username",
                            value: username.to_string(),
                        })
                    } else {
                        Err(UserError::AlreadyExists {
                            field: "email",
                            value: email,
                        })
                    }
                }
                _ => Err(db_error.into()),
            },
        }
    }

    /// Creates and stores a superuser.
    ///
    /// `is_staff`, `is_superuser` and `is_active` default to true; passing false
    /// for either of the first two is an error.
    #[instrument(skip(self, db, password, fields))]
    pub async fn create_superuser<C: ConnectionTrait>(
        &self,
        db: &C,
        email: &str,
        username: &str,
        password: &str,
        fields: UserFields,
    ) -> Result<Model> {
        let mut fields = fields;
        let is_staff = *fields.is_staff.get_or_insert(true);
        let is_superuser = *fields.is_superuser.get_or_insert(true);
        fields.is_active.get_or_insert(true);

        if !is_staff {
            return Err(UserError::SuperuserNotStaff);
        }
        if !is_superuser {
            return Err(UserError::SuperuserNotSuperuser);
        }

        self.create_user(db, email, username, Some(password), fields)
            .await
    }
}
