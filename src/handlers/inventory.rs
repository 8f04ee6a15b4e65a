// src/handlers/inventory.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::{
        auth::AuthenticatedUser,
        rbac::{RequireRole, RoleAdmin},
    },
    models::inventory::{InventoryItemView, StockMovement, StockMovementReason},
};

// ---
// Validação customizada
// ---
fn validate_not_negative(val: &Decimal) -> Result<(), ValidationError> {
    if val.is_sign_negative() {
        let mut err = ValidationError::new("range");
        err.message = Some("O valor não pode ser negativo.".into());
        return Err(err);
    }
    Ok(())
}

fn validate_positive(val: &Decimal) -> Result<(), ValidationError> {
    if *val <= Decimal::ZERO {
        let mut err = ValidationError::new("range");
        err.message = Some("A quantidade deve ser maior que zero.".into());
        return Err(err);
    }
    Ok(())
}

// ---
// Payload: CreateItem
// ---
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateItemPayload {
    #[validate(length(min = 1, message = "O nome é obrigatório."))]
    pub name: String,

    #[validate(length(min = 1, message = "A categoria é obrigatória."))]
    pub category: String,

    #[validate(custom(function = "validate_not_negative"))]
    #[serde(default)]
    pub initial_stock: Decimal,

    #[validate(custom(function = "validate_not_negative"))]
    #[serde(default)]
    pub low_stock_threshold: Decimal,

    #[validate(length(min = 1, message = "A unidade é obrigatória."))]
    #[schema(example = "L")]
    pub unit: String,

    // Quanto custou o estoque inicial (para o custo médio).
    #[validate(custom(function = "validate_not_negative"))]
    #[serde(default)]
    pub initial_cost: Decimal,
}

#[utoipa::path(
    post,
    path = "/api/admin/inventory/items",
    request_body = CreateItemPayload,
    responses((status = 201, body = InventoryItemView)),
    security(("api_jwt" = [])),
    tag = "Inventory"
)]
pub async fn create_item(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    _guard: RequireRole<RoleAdmin>,
    Json(payload): Json<CreateItemPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let item = app_state
        .inventory_service
        .create_item(
            user.0.id,
            &payload.name,
            &payload.category,
            payload.initial_stock,
            payload.low_stock_threshold,
            &payload.unit,
            payload.initial_cost,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(item)))
}

#[utoipa::path(
    get,
    path = "/api/admin/inventory/items",
    responses((status = 200, body = [InventoryItemView])),
    security(("api_jwt" = [])),
    tag = "Inventory"
)]
pub async fn get_all_items(
    State(app_state): State<AppState>,
    _guard: RequireRole<RoleAdmin>,
) -> Result<impl IntoResponse, AppError> {
    let items = app_state.inventory_service.list_items().await?;
    Ok((StatusCode::OK, Json(items)))
}

#[utoipa::path(
    get,
    path = "/api/admin/inventory/low-stock",
    responses((status = 200, body = [InventoryItemView])),
    security(("api_jwt" = [])),
    tag = "Inventory"
)]
pub async fn get_low_stock(
    State(app_state): State<AppState>,
    _guard: RequireRole<RoleAdmin>,
) -> Result<impl IntoResponse, AppError> {
    let items = app_state.inventory_service.list_low_stock().await?;
    Ok((StatusCode::OK, Json(items)))
}

// ---
// Payload: Entrada de estoque
// ---
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AddStockPayload {
    pub item_id: Uuid,

    #[validate(custom(function = "validate_positive"))]
    pub quantity: Decimal,

    // Quanto pagou por unidade (para o custo médio)
    #[validate(custom(function = "validate_not_negative"))]
    pub unit_cost: Decimal,

    pub notes: Option<String>,
}

#[utoipa::path(
    post,
    path = "/api/admin/inventory/stock-entry",
    request_body = AddStockPayload,
    responses((status = 200, body = InventoryItemView)),
    security(("api_jwt" = [])),
    tag = "Inventory"
)]
pub async fn add_stock(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    _guard: RequireRole<RoleAdmin>,
    Json(payload): Json<AddStockPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let item = app_state
        .inventory_service
        .add_stock(
            user.0.id,
            payload.item_id,
            payload.quantity,
            payload.unit_cost,
            payload.notes.as_deref(),
        )
        .await?;

    Ok((StatusCode::OK, Json(item)))
}

// ---
// Payload: Saída de estoque (consumo, perda, correção)
// ---
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConsumeStockPayload {
    pub item_id: Uuid,

    #[validate(custom(function = "validate_positive"))]
    pub quantity: Decimal,

    #[schema(example = "CONSUMPTION")]
    pub reason: StockMovementReason,

    pub notes: Option<String>,
}

#[utoipa::path(
    post,
    path = "/api/admin/inventory/stock-exit",
    request_body = ConsumeStockPayload,
    responses((status = 200, body = InventoryItemView)),
    security(("api_jwt" = [])),
    tag = "Inventory"
)]
pub async fn consume_stock(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    _guard: RequireRole<RoleAdmin>,
    Json(payload): Json<ConsumeStockPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let item = app_state
        .inventory_service
        .consume_stock(
            user.0.id,
            payload.item_id,
            payload.quantity,
            payload.reason,
            payload.notes.as_deref(),
        )
        .await?;

    Ok((StatusCode::OK, Json(item)))
}

#[utoipa::path(
    get,
    path = "/api/admin/inventory/items/{id}/movements",
    params(("id" = Uuid, Path, description = "ID do item")),
    responses((status = 200, body = [StockMovement])),
    security(("api_jwt" = [])),
    tag = "Inventory"
)]
pub async fn get_movements(
    State(app_state): State<AppState>,
    _guard: RequireRole<RoleAdmin>,
    Path(item_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let movements = app_state.inventory_service.list_movements(item_id).await?;
    Ok((StatusCode::OK, Json(movements)))
}
