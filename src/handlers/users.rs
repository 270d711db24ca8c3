use crate::schemas::{ApiResponse, AppState, ErrorResponse};
use crate::extract::{ApiPath, ApiQuery, ValidJson};
use axum::{extract::State, http::StatusCode, response::Json};
use chrono::{DateTime, Utc};
use model::entities::user;
use model::password::make_password;
use model::{Role, UserError, UserFields, proxy_for};
use sea_orm::{ActiveModelTrait, EntityTrait, Set, SqlErr};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, instrument, trace, warn};
use utoipa::{IntoParams, ToSchema};
use validator::{Validate, ValidateEmail, ValidationError};

/// Request body for creating a new user
#[derive(Debug, Deserialize, Serialize, ToSchema, Validate)]
pub struct CreateUserRequest {
    /// Email address, used to log in (must be unique)
    #[validate(custom(function = "validate_email_if_present"))]
    pub email: String,
    /// Username (must be unique)
    #[validate(length(min = 1, max = 60))]
    pub username: String,
    /// Raw password; omitted means the account cannot log in with a password
    pub password: Option<String>,
    /// Display name
    #[validate(length(max = 100))]
    pub name: Option<String>,
    /// Role, defaults to attendee
    pub role: Option<Role>,
    /// Defaults to false
    pub is_active: Option<bool>,
    /// Defaults to false
    pub is_staff: Option<bool>,
}

/// Request body for creating a new superuser
#[derive(Debug, Deserialize, Serialize, ToSchema, Validate)]
pub struct CreateSuperuserRequest {
    /// Email address, used to log in (must be unique)
    #[validate(custom(function = "validate_email_if_present"))]
    pub email: String,
    /// Username (must be unique)
    #[validate(length(min = 1, max = 60))]
    pub username: String,
    /// Raw password
    pub password: String,
    /// Display name
    #[validate(length(max = 100))]
    pub name: Option<String>,
    /// Role, defaults to attendee
    pub role: Option<Role>,
    /// Must not be false
    pub is_staff: Option<bool>,
    /// Must not be false
    pub is_superuser: Option<bool>,
    /// Defaults to true
    pub is_active: Option<bool>,
}

/// Request body for updating a user
#[derive(Debug, Deserialize, Serialize, ToSchema, Validate)]
pub struct UpdateUserRequest {
    #[validate(custom(function = "validate_email_if_present"))]
    pub email: Option<String>,
    #[validate(length(min = 1, max = 60))]
    pub username: Option<String>,
    /// Absent keeps the name; `null` clears it
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "::serde_with::rust::double_option"
    )]
    #[schema(value_type = Option<String>, nullable)]
    #[validate(length(max = 100))]
    pub name: Option<Option<String>>,
    /// New raw password
    pub password: Option<String>,
    pub role: Option<Role>,
    pub is_active: Option<bool>,
    pub is_staff: Option<bool>,
}

/// Query parameters for listing users
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct UserListQuery {
    /// Only list users with this role
    pub role: Option<Role>,
}

/// User response model
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UserResponse {
    pub id: i32,
    pub email: String,
    pub username: String,
    pub name: Option<String>,
    pub role: Role,
    pub is_staff: bool,
    pub is_active: bool,
    pub is_superuser: bool,
    /// False when the account was created without a password
    pub has_usable_password: bool,
    pub date_joined: DateTime<Utc>,
    pub last_login: Option<DateTime<Utc>>,
}

impl From<user::Model> for UserResponse {
    fn from(model: user::Model) -> Self {
        let has_usable_password = model.has_usable_password();
        Self {
            id: model.id,
            email: model.email,
            username: model.username,
            name: model.name,
            role: model.role,
            is_staff: model.is_staff,
            is_active: model.is_active,
            is_superuser: model.is_superuser,
            has_usable_password,
            date_joined: model.date_joined,
            last_login: model.last_login,
        }
    }
}

/// Empty emails pass here so the manager can report them as missing.
fn validate_email_if_present(email: &str) -> Result<(), ValidationError> {
    if email.trim().is_empty() || email.trim().validate_email() {
        Ok(())
    } else {
        Err(ValidationError::new("email"))
    }
}

/// Maps a manager error onto an HTTP error response.
pub(crate) fn user_error_response(err: UserError) -> (StatusCode, Json<ErrorResponse>) {
    let (status, code) = match &err {
        UserError::MissingEmail => (StatusCode::BAD_REQUEST, "MISSING_EMAIL"),
        UserError::SuperuserNotStaff => (StatusCode::BAD_REQUEST, "SUPERUSER_NOT_STAFF"),
        UserError::SuperuserNotSuperuser => (StatusCode::BAD_REQUEST, "SUPERUSER_NOT_SUPERUSER"),
        UserError::AlreadyExists { .. } => (StatusCode::CONFLICT, "USER_ALREADY_EXISTS"),
        UserError::Password(_) => (StatusCode::INTERNAL_SERVER_ERROR, "PASSWORD_ERROR"),
        UserError::Database(_) => (StatusCode::INTERNAL_SERVER_ERROR, "DATABASE_ERROR"),
    };

    let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
        error!("Internal error while handling user request: {}", err);
        "Internal server error while handling user".to_string()
    } else {
        warn!("Rejected user request: {}", err);
        err.to_string()
    };

    (status, Json(ErrorResponse::new(message, code)))
}

pub(crate) fn user_not_found(user_id: i32) -> (StatusCode, Json<ErrorResponse>) {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorResponse::new(
            format!("User with id {} does not exist", user_id),
            "USER_NOT_FOUND",
        )),
    )
}

/// Create a new user
#[utoipa::path(
    post,
    path = "/api/v1/users",
    tag = "users",
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "User created successfully", body = ApiResponse<UserResponse>),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 409, description = "Email or username already taken", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state, request))]
pub async fn create_user(
    State(state): State<AppState>,
    ValidJson(request): ValidJson<CreateUserRequest>,
) -> Result<(StatusCode, Json<ApiResponse<UserResponse>>), (StatusCode, Json<ErrorResponse>)> {
    trace!("Entering create_user function");
    debug!("Creating user with username: {}", request.username);

    let fields = UserFields {
        name: request.name,
        is_staff: request.is_staff,
        is_active: request.is_active,
        role: request.role,
        ..Default::default()
    };

    match user::Entity::objects()
        .create_user(
            &state.db,
            &request.email,
            &request.username,
            request.password.as_deref(),
            fields,
        )
        .await
    {
        Ok(user_model) => {
            info!("User created successfully with ID: {}, username: {}",
                  user_model.id, user_model.username);
            let response = ApiResponse {
                data: UserResponse::from(user_model),
                message: "User created successfully".to_string(),
                success: true,
            };
            Ok((StatusCode::CREATED, Json(response)))
        }
        Err(err) => Err(user_error_response(err)),
    }
}

/// Create a new superuser
#[utoipa::path(
    post,
    path = "/api/v1/superusers",
    tag = "users",
    request_body = CreateSuperuserRequest,
    responses(
        (status = 201, description = "Superuser created successfully", body = ApiResponse<UserResponse>),
        (status = 400, description = "Invalid request or superuser flags set to false", body = ErrorResponse),
        (status = 409, description = "Email or username already taken", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state, request))]
pub async fn create_superuser(
    State(state): State<AppState>,
    ValidJson(request): ValidJson<CreateSuperuserRequest>,
) -> Result<(StatusCode, Json<ApiResponse<UserResponse>>), (StatusCode, Json<ErrorResponse>)> {
    trace!("Entering create_superuser function");

    let fields = UserFields {
        name: request.name,
        is_staff: request.is_staff,
        is_active: request.is_active,
        is_superuser: request.is_superuser,
        role: request.role,
        ..Default::default()
    };

    match user::Entity::objects()
        .create_superuser(
            &state.db,
            &request.email,
            &request.username,
            &request.password,
            fields,
        )
        .await
    {
        Ok(user_model) => {
            info!("Superuser created successfully with ID: {}, username: {}",
                  user_model.id, user_model.username);
            let response = ApiResponse {
                data: UserResponse::from(user_model),
                message: "Superuser created successfully".to_string(),
                success: true,
            };
            Ok((StatusCode::CREATED, Json(response)))
        }
        Err(err) => Err(user_error_response(err)),
    }
}

/// Get all users
#[utoipa::path(
    get,
    path = "/api/v1/users",
    tag = "users",
    params(UserListQuery),
    responses(
        (status = 200, description = "Users retrieved successfully", body = ApiResponse<Vec<UserResponse>>),
        (status = 400, description = "Unknown role", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_users(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<UserListQuery>,
) -> Result<Json<ApiResponse<Vec<UserResponse>>>, (StatusCode, Json<ErrorResponse>)> {
    trace!("Entering get_users function");

    let manager = match query.role {
        Some(role) => {
            debug!("Fetching users with role: {}", role);
            proxy_for(role)
        }
        None => {
            debug!("Fetching all users from database");
            user::Entity::objects()
        }
    };

    match manager.all(&state.db).await {
        Ok(users) => {
            let user_count = users.len();
            info!("Successfully retrieved {} users", user_count);

            let response = ApiResponse {
                data: users.into_iter().map(UserResponse::from).collect(),
                message: "Users retrieved successfully".to_string(),
                success: true,
            };
            Ok(Json(response))
        }
        Err(err) => Err(user_error_response(err)),
    }
}

/// Get a specific user by ID
#[utoipa::path(
    get,
    path = "/api/v1/users/{user_id}",
    tag = "users",
    params(
        ("user_id" = i32, Path, description = "User ID"),
    ),
    responses(
        (status = 200, description = "User retrieved successfully", body = ApiResponse<UserResponse>),
        (status = 404, description = "User not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_user(
    ApiPath(user_id): ApiPath<i32>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<UserResponse>>, (StatusCode, Json<ErrorResponse>)> {
    trace!("Entering get_user function for user_id: {}", user_id);

    match user::Entity::objects().get(&state.db, user_id).await {
        Ok(Some(user_model)) => {
            info!("Successfully retrieved user with ID: {}, username: {}",
                  user_model.id, user_model.username);
            let response = ApiResponse {
                data: UserResponse::from(user_model),
                message: "User retrieved successfully".to_string(),
                success: true,
            };
            Ok(Json(response))
        }
        Ok(None) => {
            warn!("User with ID {} not found", user_id);
            Err(user_not_found(user_id))
        }
        Err(err) => Err(user_error_response(err)),
    }
}

/// Update a user
#[utoipa::path(
    put,
    path = "/api/v1/users/{user_id}",
    tag = "users",
    params(
        ("user_id" = i32, Path, description = "User ID"),
    ),
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "User updated successfully", body = ApiResponse<UserResponse>),
        (status = 404, description = "User not found", body = ErrorResponse),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 409, description = "Email or username already taken", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state, request))]
pub async fn update_user(
    ApiPath(user_id): ApiPath<i32>,
    State(state): State<AppState>,
    ValidJson(request): ValidJson<UpdateUserRequest>,
) -> Result<Json<ApiResponse<UserResponse>>, (StatusCode, Json<ErrorResponse>)> {
    trace!("Entering update_user function for user_id: {}", user_id);

    // First, find the existing user
    let existing_user = match user::Entity::objects().get(&state.db, user_id).await {
        Ok(Some(user)) => {
            debug!("Found existing user: {}", user.username);
            user
        }
        Ok(None) => {
            warn!("User with ID {} not found for update", user_id);
            return Err(user_not_found(user_id));
        }
        Err(err) => return Err(user_error_response(err)),
    };

    let mut user_active: user::ActiveModel = existing_user.into();
    let mut updated_fields = Vec::new();

    // Update only provided fields
    if let Some(email) = request.email {
        if email.trim().is_empty() {
            return Err(user_error_response(UserError::MissingEmail));
        }
        let email = model::UserManager::normalize_email(&email);
        updated_fields.push(format!("email: {}", email));
        user_active.email = Set(email);
    }
    if let Some(username) = request.username {
        updated_fields.push(format!("username: {}", username));
        user_active.username = Set(username);
    }
    if let Some(name) = request.name {
        updated_fields.push(format!("name: {:?}", name));
        user_active.name = Set(name);
    }
    if let Some(role) = request.role {
        updated_fields.push(format!("role: {}", role));
        user_active.role = Set(role);
    }
    if let Some(is_active) = request.is_active {
        updated_fields.push(format!("is_active: {}", is_active));
        user_active.is_active = Set(is_active);
    }
    if let Some(is_staff) = request.is_staff {
        updated_fields.push(format!("is_staff: {}", is_staff));
        user_active.is_staff = Set(is_staff);
    }
    if let Some(password) = request.password {
        let encoded = make_password(Some(&password))
            .map_err(|e| user_error_response(UserError::Password(e)))?;
        updated_fields.push("password".to_string());
        user_active.password = Set(encoded);
    }

    if updated_fields.is_empty() {
        debug!("No fields to update for user ID: {}", user_id);
    } else {
        debug!("Updating fields: {}", updated_fields.join(", "));
    }

    match user_active.update(&state.db).await {
        Ok(updated_user) => {
            info!("User with ID {} updated successfully", user_id);
            let response = ApiResponse {
                data: UserResponse::from(updated_user),
                message: "User updated successfully".to_string(),
                success: true,
            };
            Ok(Json(response))
        }
        Err(db_error) => match db_error.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(message)) => {
                let field = if message.contains("username") { "username" } else { "email" };
                warn!("Update of user {} collides on {}", user_id, field);
                Err((
                    StatusCode::CONFLICT,
                    Json(ErrorResponse::new(
                        format!("A user with this {} already exists", field),
                        "USER_ALREADY_EXISTS",
                    )),
                ))
            }
            _ => Err(user_error_response(db_error.into())),
        },
    }
}

/// Delete a user
#[utoipa::path(
    delete,
    path = "/api/v1/users/{user_id}",
    tag = "users",
    params(
        ("user_id" = i32, Path, description = "User ID"),
    ),
    responses(
        (status = 200, description = "User deleted successfully", body = ApiResponse<String>),
        (status = 404, description = "User not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn delete_user(
    ApiPath(user_id): ApiPath<i32>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<String>>, (StatusCode, Json<ErrorResponse>)> {
    trace!("Entering delete_user function for user_id: {}", user_id);

    match user::Entity::delete_by_id(user_id).exec(&state.db).await {
        Ok(delete_result) => {
            debug!("Delete operation completed. Rows affected: {}", delete_result.rows_affected);
            if delete_result.rows_affected > 0 {
                info!("User with ID {} deleted successfully", user_id);
                let response = ApiResponse {
                    data: format!("User {} deleted", user_id),
                    message: "User deleted successfully".to_string(),
                    success: true,
                };
                Ok(Json(response))
            } else {
                warn!("User with ID {} not found for deletion (no rows affected)", user_id);
                Err(user_not_found(user_id))
            }
        }
        Err(db_error) => Err(user_error_response(db_error.into())),
    }
}
