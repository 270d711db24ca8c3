//! Organizer, guide and attendee views.
//!
//! Every handler here goes through the manager of the role in the path, so users
//! of other roles are invisible and created users always get that role.

use crate::extract::{ApiPath, ValidJson};
use crate::handlers::users::{CreateUserRequest, UserResponse, user_error_response};
use crate::schemas::{ApiResponse, AppState, ErrorResponse};
use axum::{extract::State, http::StatusCode, response::Json};
use model::{Role, UserFields, proxy_for};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};
use utoipa::ToSchema;

/// A selectable role
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RoleChoice {
    /// Stored value
    pub value: Role,
    /// Human readable label
    pub label: String,
}

/// List the available roles
#[utoipa::path(
    get,
    path = "/api/v1/roles",
    tag = "roles",
    responses(
        (status = 200, description = "Roles retrieved successfully", body = ApiResponse<Vec<RoleChoice>>)
    )
)]
pub async fn get_roles() -> Json<ApiResponse<Vec<RoleChoice>>> {
    let choices = Role::choices()
        .into_iter()
        .map(|(value, label)| RoleChoice {
            value,
            label: label.to_string(),
        })
        .collect();

    Json(ApiResponse {
        data: choices,
        message: "Roles retrieved successfully".to_string(),
        success: true,
    })
}

/// List the users of one role
#[utoipa::path(
    get,
    path = "/api/v1/roles/{role}/users",
    tag = "roles",
    params(
        ("role" = Role, Path, description = "Role of the view"),
    ),
    responses(
        (status = 200, description = "Users retrieved successfully", body = ApiResponse<Vec<UserResponse>>),
        (status = 400, description = "Unknown role", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_role_users(
    ApiPath(role): ApiPath<Role>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<UserResponse>>>, (StatusCode, Json<ErrorResponse>)> {
    debug!("Fetching {} users", role);

    match proxy_for(role).all(&state.db).await {
        Ok(users) => {
            info!("Successfully retrieved {} {} users", users.len(), role);
            Ok(Json(ApiResponse {
                data: users.into_iter().map(UserResponse::from).collect(),
                message: format!("{} users retrieved successfully", role.label()),
                success: true,
            }))
        }
        Err(err) => Err(user_error_response(err)),
    }
}

/// Get a user through a role view
#[utoipa::path(
    get,
    path = "/api/v1/roles/{role}/users/{user_id}",
    tag = "roles",
    params(
        ("role" = Role, Path, description = "Role of the view"),
        ("user_id" = i32, Path, description = "User ID"),
    ),
    responses(
        (status = 200, description = "User retrieved successfully", body = ApiResponse<UserResponse>),
        (status = 404, description = "No user with this ID and role", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_role_user(
    ApiPath((role, user_id)): ApiPath<(Role, i32)>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<UserResponse>>, (StatusCode, Json<ErrorResponse>)> {
    match proxy_for(role).get(&state.db, user_id).await {
        Ok(Some(user_model)) => Ok(Json(ApiResponse {
            data: UserResponse::from(user_model),
            message: "User retrieved successfully".to_string(),
            success: true,
        })),
        Ok(None) => {
            warn!("No {} with ID {}", role, user_id);
            Err((
                StatusCode::NOT_FOUND,
                Json(ErrorResponse::new(
                    format!("{} with id {} does not exist", role.label(), user_id),
                    "USER_NOT_FOUND",
                )),
            ))
        }
        Err(err) => Err(user_error_response(err)),
    }
}

/// Create a user through a role view
///
/// The role in the path wins over any role in the body.
#[utoipa::path(
    post,
    path = "/api/v1/roles/{role}/users",
    tag = "roles",
    params(
        ("role" = Role, Path, description = "Role of the view"),
    ),
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "User created successfully", body = ApiResponse<UserResponse>),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 409, description = "Email or username already taken", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state, request))]
pub async fn create_role_user(
    ApiPath(role): ApiPath<Role>,
    State(state): State<AppState>,
    ValidJson(request): ValidJson<CreateUserRequest>,
) -> Result<(StatusCode, Json<ApiResponse<UserResponse>>), (StatusCode, Json<ErrorResponse>)> {
    let fields = UserFields {
        name: request.name,
        is_staff: request.is_staff,
        is_active: request.is_active,
        role: request.role,
        ..Default::default()
    };

    match proxy_for(role)
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
            info!("{} created with ID: {}", role.label(), user_model.id);
            Ok((
                StatusCode::CREATED,
                Json(ApiResponse {
                    data: UserResponse::from(user_model),
                    message: format!("{} created successfully", role.label()),
                    success: true,
                }),
            ))
        }
        Err(err) => Err(user_error_response(err)),
    }
}
