use axum::{
    extract::{Request, State},
    http::{StatusCode, header},
    middleware::Next,
    response::{IntoResponse, Json, Response},
};
use tracing::warn;

use crate::schemas::{AppState, ErrorResponse};

/// Rejects requests whose `Host` is not in `ALLOWED_HOSTS`.
pub async fn validate_host(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let host = request
        .headers()
        .get(header::HOST)
        .and_then(|value| value.to_str().ok())
        .or_else(|| request.uri().authority().map(|authority| authority.as_str()))
        .unwrap_or_default()
        .to_string();

    if state.settings.is_allowed_host(&host) {
        return next.run(request).await;
    }

    warn!("Rejected request for disallowed host '{}'", host);
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse::new(
            format!("Invalid HTTP_HOST header: '{}'", host),
            "DISALLOWED_HOST",
        )),
    )
        .into_response()
}
