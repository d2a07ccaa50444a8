//! HTTP error response mapping.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use ordercron_domain::error::{OrderCronError, ValidationError};

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

/// Maps [`OrderCronError`] to an HTTP response with an appropriate status.
#[derive(Debug)]
pub struct ApiError(OrderCronError);

impl From<OrderCronError> for ApiError {
    fn from(err: OrderCronError) -> Self {
        Self(err)
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        Self(err.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self.0 {
            OrderCronError::Validation(err) => (StatusCode::BAD_REQUEST, err.to_string()),
            OrderCronError::NotFound(err) => (StatusCode::NOT_FOUND, err.to_string()),
            OrderCronError::Collaborator(err) => {
                tracing::warn!(error = %err, "collaborator error");
                (StatusCode::BAD_GATEWAY, err.to_string())
            }
            OrderCronError::Storage(err) => {
                tracing::error!(error = %err, "storage error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_string(),
                )
            }
        };

        (status, Json(ErrorBody { error: message })).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ordercron_domain::error::{CollaboratorError, NotFoundError};

    fn status_of(err: OrderCronError) -> StatusCode {
        ApiError::from(err).into_response().status()
    }

    #[test]
    fn should_map_each_error_kind_to_status() {
        assert_eq!(
            status_of(ValidationError::MissingField("schedule").into()),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(
                NotFoundError {
                    entity: "Automation",
                    id: "1".to_string()
                }
                .into()
            ),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_of(CollaboratorError::Selection("timeout".to_string()).into()),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            status_of(OrderCronError::Storage("disk full".into())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
