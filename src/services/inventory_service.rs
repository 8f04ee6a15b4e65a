// src/services/inventory_service.rs

use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::InventoryRepository,
    models::inventory::{InventoryItemView, StockMovement, StockMovementReason},
};

#[derive(Clone)]
pub struct InventoryService {
    inventory_repo: InventoryRepository,
    pool: PgPool,
}

impl InventoryService {
    pub fn new(inventory_repo: InventoryRepository, pool: PgPool) -> Self {
        Self {
            inventory_repo,
            pool,
        }
    }

    // Custo médio ponderado: recalculado a cada entrada de estoque.
    fn calculate_new_average_cost(
        &self,
        current_qty: Decimal,
        current_avg: Decimal,
        incoming_qty: Decimal,
        incoming_cost: Decimal,
    ) -> Decimal {
        let total_current_value = current_qty * current_avg;
        let total_incoming_value = incoming_qty * incoming_cost;
        let new_total_qty = current_qty + incoming_qty;

        if new_total_qty <= Decimal::ZERO {
            return Decimal::ZERO;
        }
        ((total_current_value + total_incoming_value) / new_total_qty).round_dp(2)
    }

    // --- CREATE ITEM ---
    pub async fn create_item(
        &self,
        actor_id: Uuid,
        name: &str,
        category: &str,
        initial_stock: Decimal,
        low_stock_threshold: Decimal,
        unit: &str,
        initial_cost: Decimal,
    ) -> Result<InventoryItemView, AppError> {
        let mut tx = self.pool.begin().await?;

        let item = self
            .inventory_repo
            .create_item(
                &mut *tx,
                name,
                category,
                initial_stock,
                low_stock_threshold,
                unit,
                initial_cost,
            )
            .await?;

        if initial_stock > Decimal::ZERO {
            self.inventory_repo
                .record_movement(
                    &mut *tx,
                    item.id,
                    initial_stock,
                    StockMovementReason::InitialStock,
                    Some(initial_cost),
                    Some("Criação de item"),
                    Some(actor_id),
                )
                .await?;
        }

        tx.commit().await?;
        Ok(item.into())
    }

    // --- ENTRADA DE ESTOQUE ---
    pub async fn add_stock(
        &self,
        actor_id: Uuid,
        item_id: Uuid,
        quantity: Decimal,
        unit_cost: Decimal,
        notes: Option<&str>,
    ) -> Result<InventoryItemView, AppError> {
        let mut tx = self.pool.begin().await?;

        let item = self
            .inventory_repo
            .find_item_for_update(&mut *tx, item_id)
            .await?
            .ok_or(AppError::ItemNotFound)?;

        let new_avg_cost = self.calculate_new_average_cost(
            item.quantity,
            item.unit_cost,
            quantity,
            unit_cost,
        );

        let updated = self
            .inventory_repo
            .apply_adjustment(&mut *tx, item_id, quantity, Some(new_avg_cost))
            .await?;

        self.inventory_repo
            .record_movement(
                &mut *tx,
                item_id,
                quantity,
                StockMovementReason::Purchase,
                Some(unit_cost),
                notes,
                Some(actor_id),
            )
            .await?;

        tx.commit().await?;
        Ok(updated.into())
    }

    // --- SAÍDA DE ESTOQUE (consumo, perda, correção) ---
    pub async fn consume_stock(
        &self,
        actor_id: Uuid,
        item_id: Uuid,
        quantity: Decimal,
        reason: StockMovementReason,
        notes: Option<&str>,
    ) -> Result<InventoryItemView, AppError> {
        let mut tx = self.pool.begin().await?;

        // Valida o saldo com a linha travada
        let item = self
            .inventory_repo
            .find_item_for_update(&mut *tx, item_id)
            .await?
            .ok_or(AppError::ItemNotFound)?;

        if item.quantity < quantity {
            return Err(AppError::InsufficientStock);
        }

        let updated = self
            .inventory_repo
            .apply_adjustment(&mut *tx, item_id, -quantity, None)
            .await?;

        self.inventory_repo
            .record_movement(&mut *tx, item_id, -quantity, reason, None, notes, Some(actor_id))
            .await?;

        tx.commit().await?;
        Ok(updated.into())
    }

    pub async fn list_items(&self) -> Result<Vec<InventoryItemView>, AppError> {
        let items = self.inventory_repo.list_items(&self.pool).await?;
        Ok(items.into_iter().map(Into::into).collect())
    }

    pub async fn list_low_stock(&self) -> Result<Vec<InventoryItemView>, AppError> {
        let items = self.inventory_repo.list_low_stock(&self.pool).await?;
        Ok(items.into_iter().map(Into::into).collect())
    }

    pub async fn list_movements(&self, item_id: Uuid) -> Result<Vec<StockMovement>, AppError> {
        self.inventory_repo
            .find_item(item_id)
            .await?
            .ok_or(AppError::ItemNotFound)?;
        self.inventory_repo.list_movements(&self.pool, item_id).await
    }
}
