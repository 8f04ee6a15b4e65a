// src/models/settings.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

// Configurações do negócio (linha única no banco): identidade que sai na
// fatura, origem geográfica do cálculo de frete e chave PIX opcional.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BusinessSettings {
    #[serde(skip_serializing)]
    pub id: bool,
    pub business_name: String,
    pub document_number: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub origin_lat: f64,
    pub origin_lng: f64,
    pub delivery_rate_per_km: Decimal,
    pub pix_key: Option<String>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSettingsPayload {
    #[validate(length(min = 1, message = "O nome do negócio é obrigatório."))]
    pub business_name: Option<String>,
    pub document_number: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    #[validate(email(message = "O e-mail fornecido é inválido."))]
    pub email: Option<String>,
    #[validate(range(min = -90.0, max = 90.0, message = "Latitude fora do intervalo."))]
    pub origin_lat: Option<f64>,
    #[validate(range(min = -180.0, max = 180.0, message = "Longitude fora do intervalo."))]
    pub origin_lng: Option<f64>,
    pub delivery_rate_per_km: Option<Decimal>,
    pub pix_key: Option<String>,
}
