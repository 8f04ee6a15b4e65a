// src/handlers/settings.rs

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::rbac::{RequireRole, RoleAdmin},
    models::settings::{BusinessSettings, UpdateSettingsPayload},
};

#[utoipa::path(
    get,
    path = "/api/admin/settings",
    responses((status = 200, body = BusinessSettings)),
    security(("api_jwt" = [])),
    tag = "Settings"
)]
pub async fn get_settings(
    State(app_state): State<AppState>,
    _guard: RequireRole<RoleAdmin>,
) -> Result<impl IntoResponse, AppError> {
    let settings = app_state.settings_repo.get().await?;
    Ok((StatusCode::OK, Json(settings)))
}

#[utoipa::path(
    put,
    path = "/api/admin/settings",
    request_body = UpdateSettingsPayload,
    responses((status = 200, body = BusinessSettings)),
    security(("api_jwt" = [])),
    tag = "Settings"
)]
pub async fn update_settings(
    State(app_state): State<AppState>,
    _guard: RequireRole<RoleAdmin>,
    Json(payload): Json<UpdateSettingsPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let settings = app_state
        .settings_repo
        .update(&app_state.db_pool, &payload)
        .await?;

    tracing::info!("⚙️ Configurações do negócio atualizadas.");
    Ok((StatusCode::OK, Json(settings)))
}
