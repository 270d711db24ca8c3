use sea_orm::DbErr;
use thiserror::Error;

use crate::password::PasswordError;

/// Error types for user creation and lookup
#[derive(Error, Debug)]
pub enum UserError {
    /// An empty email was given to one of the factory methods
    #[error("You must provide an email address")]
    MissingEmail,

    /// `create_superuser` was called with `is_staff` explicitly false
    #[error("Superuser must be assigned to is_staff=True")]
    SuperuserNotStaff,

    /// `create_superuser` was called with `is_superuser` explicitly false
    #[error("Superuser must be assigned to is_superuser=True")]
    SuperuserNotSuperuser,

    /// Email or username collides with an existing row
    #[error("A user with {field} '{value}' already exists")]
    AlreadyExists { field: &'static str, value: String },

    /// Error from password hashing
    #[error("Password error: {0}")]
    Password(#[from] PasswordError),

    /// Error from the database operations
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// Type alias for Result with UserError
pub type Result<T> = std::result::Result<T, UserError>;
