// src/models/catalog.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

// --- Serviços principais (preço por kg) ---
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WashService {
    pub id: Uuid,
    #[schema(example = "Lavagem padrão")]
    pub name: String,
    pub description: Option<String>,
    pub is_active: bool,
    pub position: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// Como o adicional é precificado: por kg ou valor fixo por unidade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "add_on_pricing_mode", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "snake_case")]
pub enum AddOnPricingMode {
    PerKg,
    Flat,
}

// --- Adicionais (edredom, terno, tênis...) ---
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AddOn {
    pub id: Uuid,
    #[schema(example = "Lavagem de terno")]
    pub name: String,
    pub description: Option<String>,
    pub pricing_mode: AddOnPricingMode,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// --- Tabela de preços unificada ---
// Uma entrada por (serviço|adicional, moeda). Consolidada aqui para não
// haver tabelas de preço duplicadas espalhadas pelos componentes.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PriceBookEntry {
    pub id: Uuid,
    pub service_id: Option<Uuid>,
    pub add_on_id: Option<Uuid>,
    #[schema(example = "BRL")]
    pub currency: String,
    pub amount: Decimal,
    pub updated_at: DateTime<Utc>,
}

// Visão de catálogo para o app: serviço + preço na moeda pedida.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PricedService {
    #[serde(flatten)]
    pub service: WashService,
    pub price_per_kg: Option<Decimal>,
    pub currency: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PricedAddOn {
    #[serde(flatten)]
    pub add_on: AddOn,
    pub unit_price: Option<Decimal>,
    pub currency: String,
}
