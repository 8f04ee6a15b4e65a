// src/handlers/orders.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::{
        auth::AuthenticatedUser,
        i18n::Locale,
        rbac::{RequireRole, RoleAdmin, RoleCustomer, RoleStaff},
    },
    models::orders::{Order, OrderDetail, OrderSource, OrderStatus, QuoteBreakdown},
    services::{geo::Coordinates, order_service::CreateOrderInput},
};

// ---
// Validações customizadas
// ---
fn validate_positive_weight(val: &Decimal) -> Result<(), ValidationError> {
    if *val <= Decimal::ZERO {
        let mut err = ValidationError::new("range");
        err.message = Some("O peso deve ser maior que zero.".into());
        return Err(err);
    }
    Ok(())
}

// ---
// Payload: seleção de adicional
// ---
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AddOnSelectionPayload {
    pub add_on_id: Uuid,
    #[schema(example = 1)]
    pub quantity: i32,
}

// ---
// Payload: Quote (prévia de preço do checkout)
// ---
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct QuotePayload {
    pub service_id: Uuid,

    #[validate(custom(function = "validate_positive_weight"))]
    pub estimated_weight_kg: Option<Decimal>,

    #[serde(default)]
    pub add_ons: Vec<AddOnSelectionPayload>,

    // Sem GPS (endereço digitado) não tem frete: cotação zero.
    pub pickup: Option<Coordinates>,

    pub currency: Option<String>,
}

#[utoipa::path(
    post,
    path = "/api/orders/quote",
    request_body = QuotePayload,
    responses((status = 200, body = QuoteBreakdown)),
    tag = "Orders"
)]
pub async fn quote(
    State(app_state): State<AppState>,
    Json(payload): Json<QuotePayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let add_ons: Vec<(Uuid, i32)> = payload
        .add_ons
        .iter()
        .map(|a| (a.add_on_id, a.quantity.max(1)))
        .collect();

    let breakdown = app_state
        .order_service
        .quote(
            payload.service_id,
            payload.estimated_weight_kg,
            &add_ons,
            payload.pickup,
            payload.currency,
        )
        .await?;

    Ok((StatusCode::OK, Json(breakdown)))
}

// ---
// Payload: CreateOrder (checkout do cliente)
// ---
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderPayload {
    pub service_id: Uuid,

    #[validate(custom(function = "validate_positive_weight"))]
    pub estimated_weight_kg: Option<Decimal>,

    #[validate(range(min = 1, message = "O número de peças deve ser positivo."))]
    pub pieces: Option<i32>,

    pub instructions: Option<String>,

    #[serde(default)]
    pub photo_urls: Vec<String>,

    #[validate(length(min = 5, message = "O endereço de coleta é obrigatório."))]
    pub pickup_address: String,

    pub pickup: Option<Coordinates>,

    pub pickup_date: NaiveDate,

    #[validate(length(min = 1, message = "A janela de coleta é obrigatória."))]
    #[schema(example = "08:00-10:00")]
    pub pickup_window: String,

    pub delivery_address: Option<String>,
    pub delivery_date: Option<NaiveDate>,
    pub delivery_window: Option<String>,

    #[serde(default)]
    pub add_ons: Vec<AddOnSelectionPayload>,

    pub currency: Option<String>,
}

impl CreateOrderPayload {
    fn into_input(self, source: OrderSource) -> CreateOrderInput {
        CreateOrderInput {
            service_id: self.service_id,
            estimated_weight_kg: self.estimated_weight_kg,
            pieces: self.pieces,
            instructions: self.instructions,
            photo_urls: self.photo_urls,
            pickup_address: self.pickup_address,
            pickup_coords: self.pickup,
            pickup_date: self.pickup_date,
            pickup_window: self.pickup_window,
            delivery_address: self.delivery_address,
            delivery_date: self.delivery_date,
            delivery_window: self.delivery_window,
            add_ons: self
                .add_ons
                .iter()
                .map(|a| (a.add_on_id, a.quantity.max(1)))
                .collect(),
            currency: self.currency,
            source,
        }
    }
}

#[utoipa::path(
    post,
    path = "/api/orders",
    request_body = CreateOrderPayload,
    responses((status = 201, body = Order)),
    security(("api_jwt" = [])),
    tag = "Orders"
)]
pub async fn create_order(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    _guard: RequireRole<RoleCustomer>,
    Json(payload): Json<CreateOrderPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let order = app_state
        .order_service
        .create_order(user.0.id, &user.0, payload.into_input(OrderSource::App))
        .await?;

    Ok((StatusCode::CREATED, Json(order)))
}

#[utoipa::path(
    get,
    path = "/api/orders",
    responses((status = 200, body = [Order])),
    security(("api_jwt" = [])),
    tag = "Orders"
)]
pub async fn list_my_orders(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    _guard: RequireRole<RoleCustomer>,
) -> Result<impl IntoResponse, AppError> {
    let orders = app_state.order_service.list_for_customer(user.0.id).await?;
    Ok((StatusCode::OK, Json(orders)))
}

#[utoipa::path(
    get,
    path = "/api/orders/{id}",
    params(("id" = Uuid, Path, description = "ID do pedido")),
    responses((status = 200, body = OrderDetail)),
    security(("api_jwt" = [])),
    tag = "Orders"
)]
pub async fn get_order(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Path(order_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let detail = app_state
        .order_service
        .get_detail(order_id, &user.0, &locale.0)
        .await?;
    Ok((StatusCode::OK, Json(detail)))
}

// ---
// Rotas da equipe
// ---

#[utoipa::path(
    get,
    path = "/api/staff/orders",
    responses((status = 200, body = [Order])),
    security(("api_jwt" = [])),
    tag = "Staff"
)]
pub async fn list_queue(
    State(app_state): State<AppState>,
    _guard: RequireRole<RoleStaff>,
) -> Result<impl IntoResponse, AppError> {
    let orders = app_state.order_service.list_active().await?;
    Ok((StatusCode::OK, Json(orders)))
}

// A equipe abriu o pedido: cancela o ciclo de lembretes.
#[utoipa::path(
    post,
    path = "/api/staff/orders/{id}/ack",
    params(("id" = Uuid, Path, description = "ID do pedido")),
    responses((status = 200, body = Order)),
    security(("api_jwt" = [])),
    tag = "Staff"
)]
pub async fn acknowledge_order(
    State(app_state): State<AppState>,
    _guard: RequireRole<RoleStaff>,
    Path(order_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let order = app_state.order_service.acknowledge(order_id).await?;
    Ok((StatusCode::OK, Json(order)))
}

// ---
// Payload: avanço de status (fluxo guiado da esteira)
// ---
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateStatusPayload {
    pub new_status: OrderStatus,
    // Versão que a tela estava vendo; proteção contra edição simultânea.
    pub expected_version: i32,
}

#[utoipa::path(
    post,
    path = "/api/staff/orders/{id}/status",
    params(("id" = Uuid, Path, description = "ID do pedido")),
    request_body = UpdateStatusPayload,
    responses(
        (status = 200, body = Order),
        (status = 409, description = "Versão desatualizada"),
        (status = 422, description = "Transição fora da esteira")
    ),
    security(("api_jwt" = [])),
    tag = "Staff"
)]
pub async fn update_status(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    _guard: RequireRole<RoleStaff>,
    Path(order_id): Path<Uuid>,
    Json(payload): Json<UpdateStatusPayload>,
) -> Result<impl IntoResponse, AppError> {
    let order = app_state
        .order_service
        .transition(order_id, payload.new_status, &user.0, payload.expected_version)
        .await?;
    Ok((StatusCode::OK, Json(order)))
}

// ---
// Payload: confirmação do peso real (na coleta)
// ---
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmWeightPayload {
    #[validate(custom(function = "validate_positive_weight"))]
    pub actual_weight_kg: Decimal,
    pub expected_version: i32,
}

#[utoipa::path(
    post,
    path = "/api/staff/orders/{id}/weight",
    params(("id" = Uuid, Path, description = "ID do pedido")),
    request_body = ConfirmWeightPayload,
    responses((status = 200, body = Order)),
    security(("api_jwt" = [])),
    tag = "Staff"
)]
pub async fn confirm_weight(
    State(app_state): State<AppState>,
    _guard: RequireRole<RoleStaff>,
    Path(order_id): Path<Uuid>,
    Json(payload): Json<ConfirmWeightPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let order = app_state
        .order_service
        .confirm_weight(order_id, payload.actual_weight_kg, payload.expected_version)
        .await?;
    Ok((StatusCode::OK, Json(order)))
}

#[utoipa::path(
    post,
    path = "/api/staff/orders/{id}/paid",
    params(("id" = Uuid, Path, description = "ID do pedido")),
    responses((status = 200, body = Order)),
    security(("api_jwt" = [])),
    tag = "Staff"
)]
pub async fn mark_paid(
    State(app_state): State<AppState>,
    _guard: RequireRole<RoleStaff>,
    Path(order_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let order = app_state.order_service.mark_paid(order_id).await?;
    Ok((StatusCode::OK, Json(order)))
}

// ---
// Cadastro de balcão: cliente + pedido em uma passada
// ---
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WalkInPayload {
    #[validate(length(min = 2, message = "O nome é obrigatório."))]
    pub customer_name: String,
    #[validate(email(message = "O e-mail fornecido é inválido."))]
    pub customer_email: String,
    pub customer_phone: Option<String>,

    #[validate(nested)]
    pub order: CreateOrderPayload,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WalkInResponse {
    pub order: Order,
    pub customer_id: Uuid,
    // Vai impresso no recibo; o cliente usa para ativar a conta no app.
    pub invitation_code: String,
}

#[utoipa::path(
    post,
    path = "/api/staff/walk-in",
    request_body = WalkInPayload,
    responses((status = 201, body = WalkInResponse)),
    security(("api_jwt" = [])),
    tag = "Staff"
)]
pub async fn register_walk_in(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    _guard: RequireRole<RoleStaff>,
    Json(payload): Json<WalkInPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let (customer, invitation_code) = app_state
        .auth_service
        .register_walk_in_customer(
            &payload.customer_name,
            &payload.customer_email,
            payload.customer_phone.as_deref(),
        )
        .await?;

    let order = app_state
        .order_service
        .create_order(
            customer.id,
            &user.0,
            payload.order.into_input(OrderSource::WalkIn),
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(WalkInResponse {
            order,
            customer_id: customer.id,
            invitation_code,
        }),
    ))
}

// ---
// Rotas administrativas
// ---

// Correção fora da esteira: auditada, com justificativa obrigatória.
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ForceStatusPayload {
    pub new_status: OrderStatus,
    #[validate(length(min = 5, message = "A justificativa é obrigatória."))]
    pub reason: String,
    pub expected_version: i32,
}

#[utoipa::path(
    post,
    path = "/api/admin/orders/{id}/force-status",
    params(("id" = Uuid, Path, description = "ID do pedido")),
    request_body = ForceStatusPayload,
    responses((status = 200, body = Order)),
    security(("api_jwt" = [])),
    tag = "Admin"
)]
pub async fn force_status(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    _guard: RequireRole<RoleAdmin>,
    Path(order_id): Path<Uuid>,
    Json(payload): Json<ForceStatusPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let order = app_state
        .order_service
        .force_status(
            order_id,
            payload.new_status,
            &user.0,
            &payload.reason,
            payload.expected_version,
        )
        .await?;
    Ok((StatusCode::OK, Json(order)))
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CancelOrderPayload {
    pub reason: Option<String>,
    pub expected_version: i32,
}

#[utoipa::path(
    post,
    path = "/api/admin/orders/{id}/cancel",
    params(("id" = Uuid, Path, description = "ID do pedido")),
    request_body = CancelOrderPayload,
    responses((status = 200, body = Order)),
    security(("api_jwt" = [])),
    tag = "Admin"
)]
pub async fn cancel_order(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    _guard: RequireRole<RoleAdmin>,
    Path(order_id): Path<Uuid>,
    Json(payload): Json<CancelOrderPayload>,
) -> Result<impl IntoResponse, AppError> {
    let order = app_state
        .order_service
        .cancel(
            order_id,
            &user.0,
            payload.reason.as_deref(),
            payload.expected_version,
        )
        .await?;
    Ok((StatusCode::OK, Json(order)))
}
