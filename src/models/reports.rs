// src/models/reports.rs

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::FromRow;
use utoipa::ToSchema;

// Indicadores do painel administrativo.

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReportSummary {
    pub orders_total: i64,
    pub orders_pending: i64,
    pub orders_in_progress: i64,
    pub orders_delivered: i64,
    pub orders_cancelled: i64,
    // Receita: soma do total final dos pedidos entregues.
    pub revenue: Decimal,
    pub low_stock_items: i64,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VolumeChartEntry {
    pub day: NaiveDate,
    pub orders: i64,
    pub total: Decimal,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TopServiceEntry {
    pub name: String,
    pub orders: i64,
    pub total: Decimal,
}
