// src/handlers/catalog.rs

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::rbac::{RequireRole, RoleAdmin},
    models::catalog::{AddOn, AddOnPricingMode, PriceBookEntry, PricedAddOn, PricedService, WashService},
};

fn validate_not_negative(val: &Decimal) -> Result<(), ValidationError> {
    if val.is_sign_negative() {
        let mut err = ValidationError::new("range");
        err.message = Some("O valor não pode ser negativo.".into());
        return Err(err);
    }
    Ok(())
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct CurrencyQuery {
    // Sem o parâmetro, usa a moeda padrão do negócio.
    pub currency: Option<String>,
}

// ---
// Catálogo público (telas de seleção de serviço do app)
// ---

#[utoipa::path(
    get,
    path = "/api/catalog/services",
    params(CurrencyQuery),
    responses((status = 200, body = [PricedService])),
    tag = "Catalog"
)]
pub async fn list_services(
    State(app_state): State<AppState>,
    Query(query): Query<CurrencyQuery>,
) -> Result<impl IntoResponse, AppError> {
    let currency = query
        .currency
        .unwrap_or_else(|| app_state.default_currency.clone());

    let services = app_state
        .catalog_repo
        .list_services(&app_state.db_pool, true)
        .await?;

    let mut priced = Vec::with_capacity(services.len());
    for service in services {
        let price_per_kg = app_state
            .catalog_repo
            .service_price(&app_state.db_pool, service.id, &currency)
            .await?;
        priced.push(PricedService {
            service,
            price_per_kg,
            currency: currency.clone(),
        });
    }

    Ok((StatusCode::OK, Json(priced)))
}

#[utoipa::path(
    get,
    path = "/api/catalog/add-ons",
    params(CurrencyQuery),
    responses((status = 200, body = [PricedAddOn])),
    tag = "Catalog"
)]
pub async fn list_add_ons(
    State(app_state): State<AppState>,
    Query(query): Query<CurrencyQuery>,
) -> Result<impl IntoResponse, AppError> {
    let currency = query
        .currency
        .unwrap_or_else(|| app_state.default_currency.clone());

    let add_ons = app_state
        .catalog_repo
        .list_add_ons(&app_state.db_pool, true)
        .await?;

    let mut priced = Vec::with_capacity(add_ons.len());
    for add_on in add_ons {
        let unit_price = app_state
            .catalog_repo
            .add_on_price(&app_state.db_pool, add_on.id, &currency)
            .await?;
        priced.push(PricedAddOn {
            add_on,
            unit_price,
            currency: currency.clone(),
        });
    }

    Ok((StatusCode::OK, Json(priced)))
}

// ---
// Gestão do catálogo (admin)
// ---

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateServicePayload {
    #[validate(length(min = 1, message = "O nome é obrigatório."))]
    pub name: String,
    pub description: Option<String>,
    #[serde(default)]
    pub position: i32,
}

#[utoipa::path(
    post,
    path = "/api/admin/catalog/services",
    request_body = CreateServicePayload,
    responses((status = 201, body = WashService)),
    security(("api_jwt" = [])),
    tag = "Admin"
)]
pub async fn create_service(
    State(app_state): State<AppState>,
    _guard: RequireRole<RoleAdmin>,
    Json(payload): Json<CreateServicePayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let service = app_state
        .catalog_repo
        .create_service(
            &app_state.db_pool,
            &payload.name,
            payload.description.as_deref(),
            payload.position,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(service)))
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateAddOnPayload {
    #[validate(length(min = 1, message = "O nome é obrigatório."))]
    pub name: String,
    pub description: Option<String>,
    pub pricing_mode: AddOnPricingMode,
}

#[utoipa::path(
    post,
    path = "/api/admin/catalog/add-ons",
    request_body = CreateAddOnPayload,
    responses((status = 201, body = AddOn)),
    security(("api_jwt" = [])),
    tag = "Admin"
)]
pub async fn create_add_on(
    State(app_state): State<AppState>,
    _guard: RequireRole<RoleAdmin>,
    Json(payload): Json<CreateAddOnPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let add_on = app_state
        .catalog_repo
        .create_add_on(
            &app_state.db_pool,
            &payload.name,
            payload.description.as_deref(),
            payload.pricing_mode,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(add_on)))
}

// ---
// Payload: preço na tabela unificada
// ---
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpsertPricePayload {
    pub service_id: Option<Uuid>,
    pub add_on_id: Option<Uuid>,

    #[validate(length(equal = 3, message = "A moeda deve ser um código de 3 letras."))]
    #[schema(example = "BRL")]
    pub currency: String,

    #[validate(custom(function = "validate_not_negative"))]
    pub amount: Decimal,
}

impl UpsertPricePayload {
    // Exatamente uma das duas referências.
    fn validate_consistency(&self) -> Result<(), ValidationError> {
        if self.service_id.is_some() == self.add_on_id.is_some() {
            return Err(ValidationError::new("ExactlyOneTarget"));
        }
        Ok(())
    }
}

#[utoipa::path(
    put,
    path = "/api/admin/catalog/prices",
    request_body = UpsertPricePayload,
    responses((status = 200, body = PriceBookEntry)),
    security(("api_jwt" = [])),
    tag = "Admin"
)]
pub async fn upsert_price(
    State(app_state): State<AppState>,
    _guard: RequireRole<RoleAdmin>,
    Json(payload): Json<UpsertPricePayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    payload.validate_consistency().map_err(|e| {
        let mut errors = validator::ValidationErrors::new();
        errors.add("serviceId", e);
        AppError::ValidationError(errors)
    })?;

    let entry = app_state
        .catalog_repo
        .upsert_price(
            &app_state.db_pool,
            payload.service_id,
            payload.add_on_id,
            &payload.currency,
            payload.amount,
        )
        .await?;

    Ok((StatusCode::OK, Json(entry)))
}
