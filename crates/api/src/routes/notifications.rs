//! Notification registration, listing and dispatch routes.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;

use pulse_common::error::AppError;
use pulse_common::types::{NewNotification, Notification};

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/set_notification", post(set_notification))
        .route("/list_notifications", get(list_notifications))
        .route("/notifications/{id}", get(get_notification))
        .route("/send_notifications", post(send_notifications))
}

/// Body of `POST /set_notification`.
#[derive(Debug, Deserialize)]
pub struct CreateNotificationRequest {
    pub payload: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
}

/// Body of `POST /send_notifications`.
#[derive(Debug, Deserialize)]
pub struct DispatchRequest {
    pub notification_id: String,
    pub email_address_list: Vec<String>,
}

/// Unwrap a JSON body, reporting malformed input as a validation error.
fn json_body<T>(body: Result<Json<T>, JsonRejection>) -> Result<T, AppError> {
    body.map(|Json(value)| value)
        .map_err(|rejection| AppError::Validation(rejection.body_text()))
}

/// POST /set_notification — Register a notification and return its id.
async fn set_notification(
    State(state): State<AppState>,
    body: Result<Json<CreateNotificationRequest>, JsonRejection>,
) -> Result<Json<serde_json::Value>, AppError> {
    let request = json_body(body)?;

    let payload = request
        .payload
        .filter(|payload| !payload.is_empty())
        .ok_or_else(|| AppError::Validation("payload is required".to_string()))?;

    let notification_id = state
        .store
        .create(NewNotification {
            payload,
            name: request.name,
            description: request.description,
        })
        .await?;

    Ok(Json(json!({
        "status": "success",
        "message": "notification added successfully",
        "data": { "notification_id": notification_id }
    })))
}

/// GET /list_notifications — Every registered notification.
async fn list_notifications(State(state): State<AppState>) -> Json<Vec<Notification>> {
    Json(state.store.list().await)
}

/// GET /notifications/{id} — One notification.
async fn get_notification(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Notification>, AppError> {
    state
        .store
        .get(&id)
        .await
        .map(Json)
        .ok_or_else(|| AppError::NotFound("unknown notification id".to_string()))
}

/// POST /send_notifications — Deliver a notification to a list of email addresses.
async fn send_notifications(
    State(state): State<AppState>,
    body: Result<Json<DispatchRequest>, JsonRejection>,
) -> Result<Json<serde_json::Value>, AppError> {
    let request = json_body(body)?;

    let report = state
        .dispatcher
        .dispatch(
            &state.store,
            &request.notification_id,
            &request.email_address_list,
        )
        .await?;

    Ok(Json(json!({
        "status": "success",
        "message": report.summary(),
        "email_status": report.email_status
    })))
}
