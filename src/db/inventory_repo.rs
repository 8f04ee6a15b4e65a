// src/db/inventory_repo.rs

use rust_decimal::Decimal;
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::inventory::{InventoryItem, StockMovement, StockMovementReason},
};

#[derive(Clone)]
pub struct InventoryRepository {
    pool: PgPool,
}

impl InventoryRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // ---
    // Leituras
    // ---

    pub async fn list_items<'e, E>(&self, executor: E) -> Result<Vec<InventoryItem>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let items = sqlx::query_as::<_, InventoryItem>(
            "SELECT * FROM inventory_items ORDER BY name ASC",
        )
        .fetch_all(executor)
        .await?;
        Ok(items)
    }

    pub async fn find_item(&self, id: Uuid) -> Result<Option<InventoryItem>, AppError> {
        let item = sqlx::query_as::<_, InventoryItem>("SELECT * FROM inventory_items WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(item)
    }

    // Leitura com lock, para o ajuste de quantidade dentro da transação.
    pub async fn find_item_for_update<'e, E>(
        &self,
        executor: E,
        id: Uuid,
    ) -> Result<Option<InventoryItem>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let item = sqlx::query_as::<_, InventoryItem>(
            "SELECT * FROM inventory_items WHERE id = $1 FOR UPDATE",
        )
        .bind(id)
        .fetch_optional(executor)
        .await?;
        Ok(item)
    }

    // Itens no limite ou abaixo dele (inclui zerados).
    pub async fn list_low_stock<'e, E>(&self, executor: E) -> Result<Vec<InventoryItem>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let items = sqlx::query_as::<_, InventoryItem>(
            "SELECT * FROM inventory_items WHERE quantity <= low_stock_threshold ORDER BY name ASC",
        )
        .fetch_all(executor)
        .await?;
        Ok(items)
    }

    // ---
    // Escritas
    // ---

    pub async fn create_item<'e, E>(
        &self,
        executor: E,
        name: &str,
        category: &str,
        quantity: Decimal,
        low_stock_threshold: Decimal,
        unit: &str,
        unit_cost: Decimal,
    ) -> Result<InventoryItem, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let item = sqlx::query_as::<_, InventoryItem>(
            r#"
            INSERT INTO inventory_items (name, category, quantity, low_stock_threshold, unit, unit_cost)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(name)
        .bind(category)
        .bind(quantity)
        .bind(low_stock_threshold)
        .bind(unit)
        .bind(unit_cost)
        .fetch_one(executor)
        .await?;
        Ok(item)
    }

    pub async fn apply_adjustment<'e, E>(
        &self,
        executor: E,
        item_id: Uuid,
        quantity_delta: Decimal,
        new_unit_cost: Option<Decimal>,
    ) -> Result<InventoryItem, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let item = sqlx::query_as::<_, InventoryItem>(
            r#"
            UPDATE inventory_items
            SET quantity = quantity + $2,
                unit_cost = COALESCE($3, unit_cost),
                updated_at = now()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(item_id)
        .bind(quantity_delta)
        .bind(new_unit_cost)
        .fetch_optional(executor)
        .await?;
        item.ok_or(AppError::ItemNotFound)
    }

    pub async fn record_movement<'e, E>(
        &self,
        executor: E,
        item_id: Uuid,
        quantity_changed: Decimal,
        reason: StockMovementReason,
        unit_cost: Option<Decimal>,
        notes: Option<&str>,
        actor_id: Option<Uuid>,
    ) -> Result<StockMovement, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let movement = sqlx::query_as::<_, StockMovement>(
            r#"
            INSERT INTO inventory_movements (item_id, quantity_changed, reason, unit_cost, notes, actor_id)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(item_id)
        .bind(quantity_changed)
        .bind(reason)
        .bind(unit_cost)
        .bind(notes)
        .bind(actor_id)
        .fetch_one(executor)
        .await?;
        Ok(movement)
    }

    pub async fn list_movements<'e, E>(
        &self,
        executor: E,
        item_id: Uuid,
    ) -> Result<Vec<StockMovement>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let movements = sqlx::query_as::<_, StockMovement>(
            "SELECT * FROM inventory_movements WHERE item_id = $1 ORDER BY created_at DESC",
        )
        .bind(item_id)
        .fetch_all(executor)
        .await?;
        Ok(movements)
    }
}
