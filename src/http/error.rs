use crate::service::payment_recorder::RecordPaymentError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct ErrorEnvelope {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorPayload>,
}

#[derive(Debug, Serialize)]
pub struct ErrorPayload {
    pub code: String,
}

/// A status plus the JSON body sent back for it. Internal causes are
/// logged here and never serialized.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub body: ErrorEnvelope,
}

impl ApiError {
    fn plain(status: StatusCode, message: &str) -> Self {
        Self {
            status,
            body: ErrorEnvelope {
                message: message.to_string(),
                error: None,
            },
        }
    }

    pub fn bad_request(message: &str) -> Self {
        Self::plain(StatusCode::BAD_REQUEST, message)
    }

    pub fn not_found(message: &str) -> Self {
        Self::plain(StatusCode::NOT_FOUND, message)
    }

    pub fn conflict(message: &str) -> Self {
        Self::plain(StatusCode::CONFLICT, message)
    }

    pub fn internal(message: &str, cause: &anyhow::Error) -> Self {
        tracing::error!(error = %cause, "{}", message);
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            body: ErrorEnvelope {
                message: message.to_string(),
                error: Some(ErrorPayload {
                    code: "INTERNAL_ERROR".to_string(),
                }),
            },
        }
    }

    pub fn upstream(message: &str, cause: &anyhow::Error) -> Self {
        tracing::error!(error = %cause, "{}", message);
        Self {
            status: StatusCode::BAD_GATEWAY,
            body: ErrorEnvelope {
                message: message.to_string(),
                error: Some(ErrorPayload {
                    code: "UPSTREAM_ERROR".to_string(),
                }),
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

impl From<RecordPaymentError> for ApiError {
    fn from(e: RecordPaymentError) -> Self {
        match e {
            RecordPaymentError::MissingFields | RecordPaymentError::InvalidAmount => {
                ApiError::bad_request(&e.to_string())
            }
            RecordPaymentError::TransactionConflict => ApiError::conflict(&e.to_string()),
            RecordPaymentError::Storage(cause) => ApiError::internal("Failed to record payment", &cause),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn storage_errors_do_not_leak_cause() {
        let err: ApiError = RecordPaymentError::Storage(anyhow::anyhow!("password authentication failed")).into();
        let body = serde_json::to_string(&err.body).unwrap();

        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!body.contains("password"));
        assert!(body.contains("INTERNAL_ERROR"));
    }

    #[test]
    fn missing_fields_is_a_client_error_without_code() {
        let err: ApiError = RecordPaymentError::MissingFields.into();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(
            serde_json::to_value(&err.body).unwrap(),
            serde_json::json!({"message": "Missing required fields"})
        );
    }
}
