// src/handlers/reports.rs

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::rbac::{RequireRole, RoleAdmin},
    models::reports::{ReportSummary, TopServiceEntry, VolumeChartEntry},
};

#[utoipa::path(
    get,
    path = "/api/admin/reports/summary",
    responses((status = 200, body = ReportSummary)),
    security(("api_jwt" = [])),
    tag = "Reports"
)]
pub async fn get_summary(
    State(app_state): State<AppState>,
    _guard: RequireRole<RoleAdmin>,
) -> Result<impl IntoResponse, AppError> {
    let summary = app_state.reports_service.get_summary().await?;
    Ok((StatusCode::OK, Json(summary)))
}

#[utoipa::path(
    get,
    path = "/api/admin/reports/volume",
    responses((status = 200, body = [VolumeChartEntry])),
    security(("api_jwt" = [])),
    tag = "Reports"
)]
pub async fn get_volume_chart(
    State(app_state): State<AppState>,
    _guard: RequireRole<RoleAdmin>,
) -> Result<impl IntoResponse, AppError> {
    let entries = app_state.reports_service.get_volume_chart().await?;
    Ok((StatusCode::OK, Json(entries)))
}

#[utoipa::path(
    get,
    path = "/api/admin/reports/top-services",
    responses((status = 200, body = [TopServiceEntry])),
    security(("api_jwt" = [])),
    tag = "Reports"
)]
pub async fn get_top_services(
    State(app_state): State<AppState>,
    _guard: RequireRole<RoleAdmin>,
) -> Result<impl IntoResponse, AppError> {
    let entries = app_state.reports_service.get_top_services().await?;
    Ok((StatusCode::OK, Json(entries)))
}
