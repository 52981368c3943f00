use crate::http::error::ApiError;
use crate::intents::{CreateIntentRequest, CreateIntentResponse};
use crate::AppState;
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;

pub async fn create_payment_intent(
    State(state): State<AppState>,
    payload: Result<Json<CreateIntentRequest>, JsonRejection>,
) -> impl IntoResponse {
    let amount = match payload {
        Ok(Json(CreateIntentRequest {
            amount_in_cents: Some(amount),
        })) if amount > 0 => amount,
        _ => return ApiError::bad_request("Invalid amount").into_response(),
    };

    match state.intents.create_intent(amount).await {
        Ok(intent) => {
            tracing::info!(provider = state.intents.name(), intent_id = %intent.id, amount, "payment intent created");
            (
                axum::http::StatusCode::OK,
                Json(CreateIntentResponse {
                    client_secret: intent.client_secret,
                }),
            )
                .into_response()
        }
        Err(e) => ApiError::upstream("Failed to create payment intent", &e).into_response(),
    }
}
