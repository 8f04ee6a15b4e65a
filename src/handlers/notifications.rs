// src/handlers/notifications.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use serde_json::json;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::{auth::AuthenticatedUser, rbac::{RequireRole, RoleAdmin}},
    models::notifications::{Notification, NotificationPriority},
};

#[utoipa::path(
    get,
    path = "/api/notifications",
    responses((status = 200, body = [Notification])),
    security(("api_jwt" = [])),
    tag = "Notifications"
)]
pub async fn list_notifications(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<impl IntoResponse, AppError> {
    let notifications = app_state
        .notification_service
        .list_for_user(user.0.id)
        .await?;
    Ok((StatusCode::OK, Json(notifications)))
}

#[utoipa::path(
    get,
    path = "/api/notifications/unread-count",
    responses((status = 200)),
    security(("api_jwt" = [])),
    tag = "Notifications"
)]
pub async fn unread_count(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<impl IntoResponse, AppError> {
    let count = app_state.notification_service.unread_count(user.0.id).await?;
    Ok((StatusCode::OK, Json(json!({ "unread": count }))))
}

#[utoipa::path(
    post,
    path = "/api/notifications/{id}/read",
    params(("id" = Uuid, Path, description = "ID da notificação")),
    responses((status = 200, body = Notification)),
    security(("api_jwt" = [])),
    tag = "Notifications"
)]
pub async fn mark_read(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    Path(notification_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let notification = app_state
        .notification_service
        .mark_read(notification_id, user.0.id)
        .await?;
    Ok((StatusCode::OK, Json(notification)))
}

// ---
// Mensagens administrativas
// ---

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BroadcastPayload {
    #[validate(length(min = 1, message = "O título é obrigatório."))]
    pub title: String,
    #[validate(length(min = 1, message = "A mensagem é obrigatória."))]
    pub message: String,
    pub priority: Option<NotificationPriority>,
}

#[utoipa::path(
    post,
    path = "/api/admin/notifications/broadcast",
    request_body = BroadcastPayload,
    responses((status = 201, body = Notification)),
    security(("api_jwt" = [])),
    tag = "Admin"
)]
pub async fn broadcast(
    State(app_state): State<AppState>,
    _guard: RequireRole<RoleAdmin>,
    Json(payload): Json<BroadcastPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let notification = app_state
        .notification_service
        .broadcast(
            &payload.title,
            &payload.message,
            payload.priority.unwrap_or(NotificationPriority::Normal),
        )
        .await?;
    Ok((StatusCode::CREATED, Json(notification)))
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct IndividualMessagePayload {
    pub user_id: Uuid,
    #[validate(length(min = 1, message = "O título é obrigatório."))]
    pub title: String,
    #[validate(length(min = 1, message = "A mensagem é obrigatória."))]
    pub message: String,
    pub priority: Option<NotificationPriority>,
}

#[utoipa::path(
    post,
    path = "/api/admin/notifications/individual",
    request_body = IndividualMessagePayload,
    responses((status = 201, body = Notification)),
    security(("api_jwt" = [])),
    tag = "Admin"
)]
pub async fn send_individual(
    State(app_state): State<AppState>,
    _guard: RequireRole<RoleAdmin>,
    Json(payload): Json<IndividualMessagePayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let notification = app_state
        .notification_service
        .send_individual(
            payload.user_id,
            &payload.title,
            &payload.message,
            payload.priority.unwrap_or(NotificationPriority::Normal),
        )
        .await?;
    Ok((StatusCode::CREATED, Json(notification)))
}
