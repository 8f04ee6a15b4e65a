// src/models/inventory.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

// Situação do estoque, derivada de quantidade + limite mínimo.
// Nunca é gravada no banco — só calculada na hora de responder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "kebab-case")]
pub enum StockStatus {
    OutOfStock,
    LowStock,
    InStock,
}

// --- Insumos (sabão, embalagens, cabides...) ---
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InventoryItem {
    pub id: Uuid,
    #[schema(example = "Sabão líquido 5L")]
    pub name: String,
    pub category: String,
    pub quantity: Decimal,
    pub low_stock_threshold: Decimal,
    #[schema(example = "L")]
    pub unit: String,
    // Custo médio ponderado, recalculado a cada entrada.
    pub unit_cost: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl InventoryItem {
    pub fn stock_status(&self) -> StockStatus {
        if self.quantity <= Decimal::ZERO {
            StockStatus::OutOfStock
        } else if self.quantity <= self.low_stock_threshold {
            StockStatus::LowStock
        } else {
            StockStatus::InStock
        }
    }
}

// Visão com o status derivado embutido, para as telas de estoque.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InventoryItemView {
    #[serde(flatten)]
    pub item: InventoryItem,
    pub stock_status: StockStatus,
}

impl From<InventoryItem> for InventoryItemView {
    fn from(item: InventoryItem) -> Self {
        let stock_status = item.stock_status();
        Self { item, stock_status }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "stock_movement_reason", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StockMovementReason {
    InitialStock,
    Purchase,
    Consumption,
    Spoilage,
    Correction,
}

// --- Histórico de movimentações ---
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StockMovement {
    pub id: Uuid,
    pub item_id: Uuid,
    pub quantity_changed: Decimal,
    pub reason: StockMovementReason,
    pub unit_cost: Option<Decimal>,
    pub notes: Option<String>,
    pub actor_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(quantity: &str, threshold: &str) -> InventoryItem {
        InventoryItem {
            id: Uuid::nil(),
            name: "Sabão".into(),
            category: "Limpeza".into(),
            quantity: quantity.parse().unwrap(),
            low_stock_threshold: threshold.parse().unwrap(),
            unit: "L".into(),
            unit_cost: Decimal::ZERO,
            created_at: chrono::Utc::now(),
            updated_at: chrono::Utc::now(),
        }
    }

    #[test]
    fn stock_status_is_derived_from_quantity_and_threshold() {
        assert_eq!(item("0", "5").stock_status(), StockStatus::OutOfStock);
        assert_eq!(item("3", "5").stock_status(), StockStatus::LowStock);
        assert_eq!(item("5", "5").stock_status(), StockStatus::LowStock);
        assert_eq!(item("5.001", "5").stock_status(), StockStatus::InStock);
    }
}
