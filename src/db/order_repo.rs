// src/db/order_repo.rs

use rust_decimal::Decimal;
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::orders::{
        NewOrder, Order, OrderAddOn, OrderStatus, OrderStatusEvent, PaymentStatus,
    },
};

#[derive(Clone)]
pub struct OrderRepository {
    pool: PgPool,
}

impl OrderRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // ---
    // Escritas
    // ---

    pub async fn create<'e, E>(&self, executor: E, new: &NewOrder) -> Result<Order, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let order = sqlx::query_as::<_, Order>(
            r#"
            INSERT INTO orders (
                customer_id, service_id, status, source,
                estimated_weight_kg, pieces, instructions, photo_urls,
                pickup_address, pickup_lat, pickup_lng, pickup_date, pickup_window,
                delivery_address, delivery_date, delivery_window,
                distance_km, billed_km, delivery_fee,
                currency, service_price_per_kg, estimated_total
            )
            VALUES (
                $1, $2, $3, $4,
                $5, $6, $7, $8,
                $9, $10, $11, $12, $13,
                $14, $15, $16,
                $17, $18, $19,
                $20, $21, $22
            )
            RETURNING *
            "#,
        )
        .bind(new.customer_id)
        .bind(new.service_id)
        .bind(new.status)
        .bind(new.source)
        .bind(new.estimated_weight_kg)
        .bind(new.pieces)
        .bind(new.instructions.as_deref())
        .bind(&new.photo_urls)
        .bind(&new.pickup_address)
        .bind(new.pickup_lat)
        .bind(new.pickup_lng)
        .bind(new.pickup_date)
        .bind(&new.pickup_window)
        .bind(new.delivery_address.as_deref())
        .bind(new.delivery_date)
        .bind(new.delivery_window.as_deref())
        .bind(new.distance_km)
        .bind(new.billed_km)
        .bind(new.delivery_fee)
        .bind(&new.currency)
        .bind(new.service_price_per_kg)
        .bind(new.estimated_total)
        .fetch_one(executor)
        .await?;
        Ok(order)
    }

    pub async fn insert_add_on<'e, E>(
        &self,
        executor: E,
        order_id: Uuid,
        add_on_id: Uuid,
        name: &str,
        quantity: i32,
        unit_price: Decimal,
        line_total: Decimal,
    ) -> Result<OrderAddOn, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let row = sqlx::query_as::<_, OrderAddOn>(
            r#"
            INSERT INTO order_add_ons (order_id, add_on_id, name, quantity, unit_price, line_total)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(order_id)
        .bind(add_on_id)
        .bind(name)
        .bind(quantity)
        .bind(unit_price)
        .bind(line_total)
        .fetch_one(executor)
        .await?;
        Ok(row)
    }

    // Update condicional: só aplica se a versão observada ainda é a atual.
    // `None` = ninguém com aquela versão -> StaleVersion no service.
    pub async fn update_status<'e, E>(
        &self,
        executor: E,
        order_id: Uuid,
        new_status: OrderStatus,
        acting_staff: Option<Uuid>,
        expected_version: i32,
    ) -> Result<Option<Order>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let order = sqlx::query_as::<_, Order>(
            r#"
            UPDATE orders
            SET status = $2,
                assigned_staff_id = COALESCE(assigned_staff_id, $3),
                version = version + 1,
                updated_at = now()
            WHERE id = $1 AND version = $4
            RETURNING *
            "#,
        )
        .bind(order_id)
        .bind(new_status)
        .bind(acting_staff)
        .bind(expected_version)
        .fetch_optional(executor)
        .await?;
        Ok(order)
    }

    // Confirmação de peso: grava o peso real e o total final, liga o flag
    // ortogonal e NÃO mexe no status do ciclo de vida.
    pub async fn set_actual_weight<'e, E>(
        &self,
        executor: E,
        order_id: Uuid,
        actual_weight_kg: Decimal,
        final_total: Decimal,
        expected_version: i32,
    ) -> Result<Option<Order>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let order = sqlx::query_as::<_, Order>(
            r#"
            UPDATE orders
            SET actual_weight_kg = $2,
                final_total = $3,
                weight_confirmed = TRUE,
                version = version + 1,
                updated_at = now()
            WHERE id = $1 AND version = $4
            RETURNING *
            "#,
        )
        .bind(order_id)
        .bind(actual_weight_kg)
        .bind(final_total)
        .bind(expected_version)
        .fetch_optional(executor)
        .await?;
        Ok(order)
    }

    pub async fn update_payment_status<'e, E>(
        &self,
        executor: E,
        order_id: Uuid,
        payment_status: PaymentStatus,
    ) -> Result<Option<Order>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let order = sqlx::query_as::<_, Order>(
            r#"
            UPDATE orders
            SET payment_status = $2, version = version + 1, updated_at = now()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(order_id)
        .bind(payment_status)
        .fetch_optional(executor)
        .await?;
        Ok(order)
    }

    // Marca o pedido como visto pela equipe (cancela o ciclo de lembretes).
    pub async fn mark_viewed<'e, E>(
        &self,
        executor: E,
        order_id: Uuid,
    ) -> Result<Option<Order>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let order = sqlx::query_as::<_, Order>(
            r#"
            UPDATE orders
            SET viewed_by_staff_at = COALESCE(viewed_by_staff_at, now()), updated_at = now()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(order_id)
        .fetch_optional(executor)
        .await?;
        Ok(order)
    }

    pub async fn insert_event<'e, E>(
        &self,
        executor: E,
        order_id: Uuid,
        status: OrderStatus,
        actor_id: Option<Uuid>,
        forced: bool,
        reason: Option<&str>,
    ) -> Result<OrderStatusEvent, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let event = sqlx::query_as::<_, OrderStatusEvent>(
            r#"
            INSERT INTO order_status_events (order_id, status, actor_id, forced, reason)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(order_id)
        .bind(status)
        .bind(actor_id)
        .bind(forced)
        .bind(reason)
        .fetch_one(executor)
        .await?;
        Ok(event)
    }

    // ---
    // Leituras
    // ---

    pub async fn find_by_id<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<Order>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let order = sqlx::query_as::<_, Order>("SELECT * FROM orders WHERE id = $1")
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(order)
    }

    // Leitura com lock de linha, para as mutações que recalculam valores.
    pub async fn find_by_id_for_update<'e, E>(
        &self,
        executor: E,
        id: Uuid,
    ) -> Result<Option<Order>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let order = sqlx::query_as::<_, Order>("SELECT * FROM orders WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(order)
    }

    pub async fn list_by_customer<'e, E>(
        &self,
        executor: E,
        customer_id: Uuid,
    ) -> Result<Vec<Order>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let orders = sqlx::query_as::<_, Order>(
            "SELECT * FROM orders WHERE customer_id = $1 ORDER BY created_at DESC",
        )
        .bind(customer_id)
        .fetch_all(executor)
        .await?;
        Ok(orders)
    }

    // Fila da equipe: tudo que ainda não chegou a um estado terminal.
    pub async fn list_active<'e, E>(&self, executor: E) -> Result<Vec<Order>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let orders = sqlx::query_as::<_, Order>(
            r#"
            SELECT * FROM orders
            WHERE status NOT IN ('DELIVERED', 'CANCELLED')
            ORDER BY created_at ASC
            "#,
        )
        .fetch_all(executor)
        .await?;
        Ok(orders)
    }

    pub async fn list_add_ons<'e, E>(
        &self,
        executor: E,
        order_id: Uuid,
    ) -> Result<Vec<OrderAddOn>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let add_ons = sqlx::query_as::<_, OrderAddOn>(
            "SELECT * FROM order_add_ons WHERE order_id = $1 ORDER BY created_at ASC",
        )
        .bind(order_id)
        .fetch_all(executor)
        .await?;
        Ok(add_ons)
    }

    pub async fn list_events<'e, E>(
        &self,
        executor: E,
        order_id: Uuid,
    ) -> Result<Vec<OrderStatusEvent>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let events = sqlx::query_as::<_, OrderStatusEvent>(
            "SELECT * FROM order_status_events WHERE order_id = $1 ORDER BY created_at ASC",
        )
        .bind(order_id)
        .fetch_all(executor)
        .await?;
        Ok(events)
    }

    // Pedidos pendentes ainda não vistos pela equipe — usado na subida do
    // servidor para re-derivar os lembretes a partir do estado persistido.
    pub async fn list_pending_unviewed(&self) -> Result<Vec<Uuid>, AppError> {
        let ids = sqlx::query_scalar::<_, Uuid>(
            "SELECT id FROM orders WHERE status = 'PENDING' AND viewed_by_staff_at IS NULL",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(ids)
    }
}
