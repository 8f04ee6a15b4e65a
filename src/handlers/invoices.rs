// src/handlers/invoices.rs

use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::{auth::AuthenticatedUser, i18n::Locale},
    models::billing::Invoice,
};

// Estrutura da fatura em JSON (a mesma consumida pelo renderizador).
#[utoipa::path(
    get,
    path = "/api/orders/{id}/invoice",
    params(("id" = Uuid, Path, description = "ID do pedido")),
    responses((status = 200, body = Invoice)),
    security(("api_jwt" = [])),
    tag = "Invoices"
)]
pub async fn get_invoice(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Path(order_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let invoice = app_state
        .invoice_service
        .get_invoice(order_id, &user.0, &locale.0)
        .await?;
    Ok((StatusCode::OK, Json(invoice)))
}

// Versão imprimível (PDF).
#[utoipa::path(
    get,
    path = "/api/orders/{id}/invoice.pdf",
    params(("id" = Uuid, Path, description = "ID do pedido")),
    responses((status = 200, description = "PDF da fatura")),
    security(("api_jwt" = [])),
    tag = "Invoices"
)]
pub async fn get_invoice_pdf(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Path(order_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let pdf_bytes = app_state
        .invoice_service
        .generate_pdf(order_id, &user.0, &locale.0)
        .await?;

    let headers = [
        (header::CONTENT_TYPE, "application/pdf".to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"fatura-{}.pdf\"", order_id),
        ),
    ];

    Ok((StatusCode::OK, headers, pdf_bytes))
}
