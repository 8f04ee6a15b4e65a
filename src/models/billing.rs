// src/models/billing.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use utoipa::ToSchema;

use crate::models::orders::PaymentStatus;

// Estrutura "achatada" da fatura, pronta para renderização (PDF ou tela).
// Montada pelo InvoiceService sem nenhum efeito colateral.

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BusinessIdentity {
    pub name: String,
    pub document_number: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BillTo {
    pub name: String,
    pub phone: Option<String>,
    pub email: String,
    pub address: String,
}

// Uma linha por serviço e uma por adicional.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceLine {
    #[schema(example = "Lavagem padrão (3.000 kg)")]
    pub description: String,
    pub quantity: Decimal,
    pub unit_rate: Decimal,
    pub total: Decimal,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Invoice {
    pub business: BusinessIdentity,
    pub bill_to: BillTo,

    #[schema(example = 1024)]
    pub order_display_id: i32,
    pub issued_at: DateTime<Utc>,

    pub lines: Vec<InvoiceLine>,
    pub subtotal: Decimal,

    // IVA fixo de 18%, aplicado uniformemente (regra de negócio do app).
    pub vat_rate: Decimal,
    pub vat_amount: Decimal,

    // Só aparece quando a distância cobrada é maior que zero.
    pub delivery_fee: Option<Decimal>,

    pub grand_total: Decimal,
    pub currency: String,

    #[schema(example = "cash_on_delivery")]
    pub payment_method: &'static str,
    pub payment_status: PaymentStatus,

    pub status_label: String,
    pub last_updated_at: DateTime<Utc>,

    pub pix_key: Option<String>,
}
