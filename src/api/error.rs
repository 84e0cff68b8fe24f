use aws_lambda_events::apigw::ApiGatewayProxyResponse;
use http::header::ALLOW;
use http::StatusCode;
use lambda_runtime::tracing;

use super::response;
use crate::users::InvalidUser;
use crate::Error;

/// Every way a request can fail, each mapped to one status code.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Not found")]
    RouteNotFound,

    #[error("Method not allowed")]
    MethodNotAllowed { allow: &'static str },

    #[error("User not found")]
    UserNotFound,

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Conflict(String),

    #[error(transparent)]
    Internal(Error),
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        if err.is_unique_violation() {
            return ApiError::Conflict("A user with this email already exists".to_string());
        }
        ApiError::Internal(err)
    }
}

impl From<InvalidUser> for ApiError {
    fn from(err: InvalidUser) -> Self {
        ApiError::BadRequest(err.to_string())
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::RouteNotFound | ApiError::UserNotFound => StatusCode::NOT_FOUND,
            ApiError::MethodNotAllowed { .. } => StatusCode::METHOD_NOT_ALLOWED,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Internal failures are logged in full; the caller only gets the
    /// request id to quote back.
    pub fn into_response(self, request_id: &str) -> ApiGatewayProxyResponse {
        let status = self.status();
        match self {
            ApiError::Internal(err) => {
                tracing::error!(request_id, "Error processing request: {}", err);
                response::raw(
                    status,
                    serde_json::json!({
                        "message": "Internal server error",
                        "requestId": request_id,
                    })
                    .to_string(),
                )
            }
            ApiError::MethodNotAllowed { allow } => {
                response::with_header(response::message(status, "Method not allowed"), ALLOW, allow)
            }
            other => {
                tracing::info!(status = status.as_u16(), "Request rejected: {}", other);
                response::message(status, &other.to_string())
            }
        }
    }
}
