use crate::domain::parcel::NewParcel;
use crate::http::error::ApiError;
use crate::AppState;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use uuid::Uuid;

const NOT_FOUND: &str = "Parcel not found";

#[derive(Debug, Deserialize)]
pub struct ParcelsQuery {
    pub email: Option<String>,
}

pub async fn list_parcels(
    State(state): State<AppState>,
    Query(query): Query<ParcelsQuery>,
) -> impl IntoResponse {
    let created_by = query.email.filter(|e| !e.trim().is_empty());
    match state.parcels.list(created_by).await {
        Ok(items) => (axum::http::StatusCode::OK, Json(items)).into_response(),
        Err(e) => ApiError::internal("Failed to fetch parcels", &e).into_response(),
    }
}

pub async fn get_parcel(State(state): State<AppState>, Path(id): Path<String>) -> impl IntoResponse {
    let Some(id) = parse_id(&id) else {
        return ApiError::bad_request("Invalid parcel id").into_response();
    };

    match state.parcels.get(id).await {
        Ok(Some(parcel)) => (axum::http::StatusCode::OK, Json(parcel)).into_response(),
        Ok(None) => ApiError::not_found(NOT_FOUND).into_response(),
        Err(e) => ApiError::internal("Failed to fetch parcel", &e).into_response(),
    }
}

pub async fn create_parcel(
    State(state): State<AppState>,
    payload: Result<Json<serde_json::Value>, JsonRejection>,
) -> impl IntoResponse {
    let parcel = match payload
        .map_err(|e| e.body_text())
        .and_then(|Json(v)| NewParcel::from_payload(v).map_err(|e| e.to_string()))
    {
        Ok(p) => p,
        Err(reason) => {
            tracing::debug!("rejected parcel body: {}", reason);
            return ApiError::bad_request("Invalid parcel payload").into_response();
        }
    };

    match state.parcels.insert(parcel).await {
        Ok(created) => {
            tracing::info!(parcel_id = %created.id, "parcel created");
            (
                axum::http::StatusCode::CREATED,
                Json(serde_json::json!({"acknowledged": true, "insertedId": created.id})),
            )
                .into_response()
        }
        Err(e) => ApiError::internal("Failed to add parcel", &e).into_response(),
    }
}

pub async fn delete_parcel(State(state): State<AppState>, Path(id): Path<String>) -> impl IntoResponse {
    let Some(id) = parse_id(&id) else {
        return ApiError::bad_request("Invalid parcel id").into_response();
    };

    match state.parcels.delete(id).await {
        Ok(0) => ApiError::not_found(NOT_FOUND).into_response(),
        Ok(deleted) => {
            tracing::info!(parcel_id = %id, "parcel deleted");
            (
                axum::http::StatusCode::OK,
                Json(serde_json::json!({"acknowledged": true, "deletedCount": deleted})),
            )
                .into_response()
        }
        Err(e) => ApiError::internal("Failed to delete parcel", &e).into_response(),
    }
}

fn parse_id(raw: &str) -> Option<Uuid> {
    Uuid::parse_str(raw.trim()).ok()
}
