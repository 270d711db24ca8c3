use crate::handlers::{
    health::health_check,
    roles::{create_role_user, get_role_user, get_role_users, get_roles},
    users::{create_superuser, create_user, delete_user, get_user, get_users, update_user},
};
use crate::middleware::validate_host;
use crate::schemas::{ApiDoc, AppState};
use axum::{
    middleware::from_fn_with_state,
    routing::{get, post},
    Router,
};
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::{
    compression::CompressionLayer, cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// Create application router with all routes and middleware
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(health_check))
        // User CRUD routes
        .route("/api/v1/users", post(create_user).get(get_users))
        .route(
            "/api/v1/users/:user_id",
            get(get_user).put(update_user).delete(delete_user),
        )
        .route("/api/v1/superusers", post(create_superuser))
        // Role views
        .route("/api/v1/roles", get(get_roles))
        .route(
            "/api/v1/roles/:role/users",
            get(get_role_users).post(create_role_user),
        )
        .route("/api/v1/roles/:role/users/:user_id", get(get_role_user))
        // Swagger UI
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        // Add middleware
        .layer(from_fn_with_state(state.clone(), validate_host))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CompressionLayer::new())
                .layer(TimeoutLayer::new(Duration::from_secs(30)))
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}
