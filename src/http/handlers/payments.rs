use crate::domain::payment::RecordPaymentRequest;
use crate::http::error::ApiError;
use crate::AppState;
use axum::body::Bytes;
use axum::extract::{Query, State};
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct PaymentsQuery {
    pub email: Option<String>,
}

pub async fn record_payment(State(state): State<AppState>, body: Bytes) -> impl IntoResponse {
    let req = match parse_payment_body(&body) {
        Ok(req) => req,
        Err(e) => {
            tracing::debug!("rejected payment body: {}", e);
            return ApiError::bad_request("Invalid request body").into_response();
        }
    };

    match state.payment_recorder.record(req).await {
        Ok(resp) => (axum::http::StatusCode::OK, Json(resp)).into_response(),
        Err(e) => ApiError::from(e).into_response(),
    }
}

pub async fn list_payments(
    State(state): State<AppState>,
    Query(query): Query<PaymentsQuery>,
) -> impl IntoResponse {
    match state.payment_recorder.history(query.email).await {
        Ok(items) => (axum::http::StatusCode::OK, Json(items)).into_response(),
        Err(e) => ApiError::internal("Failed to fetch payments", &e).into_response(),
    }
}

/// An empty body reads as an empty object so it reports missing fields.
/// The content type is not checked.
fn parse_payment_body(body: &[u8]) -> Result<RecordPaymentRequest, serde_json::Error> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(RecordPaymentRequest::default());
    }
    serde_json::from_slice(body)
}
