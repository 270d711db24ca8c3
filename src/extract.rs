//! Extractors whose rejections use the `ErrorResponse` envelope.

use axum::{
    async_trait,
    extract::{
        FromRequest, FromRequestParts, Request,
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use axum_valid::{Valid, ValidationRejection};
use serde::de::DeserializeOwned;
use tracing::debug;
use validator::{Validate, ValidationErrors};

use crate::schemas::ErrorResponse;

/// A request that failed before reaching the handler.
#[derive(Debug)]
pub struct ApiRejection {
    status: StatusCode,
    code: &'static str,
    message: String,
}

impl ApiRejection {
    fn new(status: StatusCode, code: &'static str, message: String) -> Self {
        debug!("Rejected request ({}): {}", code, message);
        Self { status, code, message }
    }
}

impl IntoResponse for ApiRejection {
    fn into_response(self) -> Response {
        (self.status, Json(ErrorResponse::new(self.message, self.code))).into_response()
    }
}

impl From<PathRejection> for ApiRejection {
    fn from(rejection: PathRejection) -> Self {
        Self::new(rejection.status(), "INVALID_PATH", rejection.body_text())
    }
}

impl From<QueryRejection> for ApiRejection {
    fn from(rejection: QueryRejection) -> Self {
        Self::new(rejection.status(), "INVALID_QUERY", rejection.body_text())
    }
}

impl From<JsonRejection> for ApiRejection {
    fn from(rejection: JsonRejection) -> Self {
        Self::new(rejection.status(), "INVALID_BODY", rejection.body_text())
    }
}

impl From<ValidationRejection<ValidationErrors, JsonRejection>> for ApiRejection {
    fn from(rejection: ValidationRejection<ValidationErrors, JsonRejection>) -> Self {
        match rejection {
            ValidationRejection::Valid(errors) => {
                Self::new(StatusCode::BAD_REQUEST, "VALIDATION_ERROR", errors.to_string())
            }
            ValidationRejection::Inner(rejection) => rejection.into(),
        }
    }
}

#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(ApiRejection))]
pub struct ApiPath<T>(pub T);

#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(ApiRejection))]
pub struct ApiQuery<T>(pub T);

/// JSON body checked with `validator` through `axum_valid::Valid`.
pub struct ValidJson<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for ValidJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate,
{
    type Rejection = ApiRejection;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Valid(Json(value)) = Valid::<Json<T>>::from_request(req, state).await?;
        Ok(Self(value))
    }
}
