// src/db/catalog_repo.rs

use rust_decimal::Decimal;
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::catalog::{AddOn, AddOnPricingMode, PriceBookEntry, WashService},
};

#[derive(Clone)]
pub struct CatalogRepository {
    pool: PgPool,
}

impl CatalogRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // ---
    // Leituras
    // ---

    pub async fn list_services<'e, E>(
        &self,
        executor: E,
        only_active: bool,
    ) -> Result<Vec<WashService>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let services = sqlx::query_as::<_, WashService>(
            "SELECT * FROM catalog_services WHERE ($1 = FALSE OR is_active) ORDER BY position, name",
        )
        .bind(only_active)
        .fetch_all(executor)
        .await?;
        Ok(services)
    }

    pub async fn find_service(&self, id: Uuid) -> Result<Option<WashService>, AppError> {
        let service = sqlx::query_as::<_, WashService>("SELECT * FROM catalog_services WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(service)
    }

    pub async fn list_add_ons<'e, E>(
        &self,
        executor: E,
        only_active: bool,
    ) -> Result<Vec<AddOn>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let add_ons = sqlx::query_as::<_, AddOn>(
            "SELECT * FROM catalog_add_ons WHERE ($1 = FALSE OR is_active) ORDER BY name",
        )
        .bind(only_active)
        .fetch_all(executor)
        .await?;
        Ok(add_ons)
    }

    pub async fn find_add_on(&self, id: Uuid) -> Result<Option<AddOn>, AppError> {
        let add_on = sqlx::query_as::<_, AddOn>("SELECT * FROM catalog_add_ons WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(add_on)
    }

    // Preço de um serviço na tabela unificada, por moeda.
    pub async fn service_price<'e, E>(
        &self,
        executor: E,
        service_id: Uuid,
        currency: &str,
    ) -> Result<Option<Decimal>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let amount = sqlx::query_scalar::<_, Decimal>(
            "SELECT amount FROM price_book WHERE service_id = $1 AND currency = $2",
        )
        .bind(service_id)
        .bind(currency)
        .fetch_optional(executor)
        .await?;
        Ok(amount)
    }

    pub async fn add_on_price<'e, E>(
        &self,
        executor: E,
        add_on_id: Uuid,
        currency: &str,
    ) -> Result<Option<Decimal>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let amount = sqlx::query_scalar::<_, Decimal>(
            "SELECT amount FROM price_book WHERE add_on_id = $1 AND currency = $2",
        )
        .bind(add_on_id)
        .bind(currency)
        .fetch_optional(executor)
        .await?;
        Ok(amount)
    }

    // ---
    // Escritas (admin)
    // ---

    pub async fn create_service<'e, E>(
        &self,
        executor: E,
        name: &str,
        description: Option<&str>,
        position: i32,
    ) -> Result<WashService, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let service = sqlx::query_as::<_, WashService>(
            r#"
            INSERT INTO catalog_services (name, description, position)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(name)
        .bind(description)
        .bind(position)
        .fetch_one(executor)
        .await?;
        Ok(service)
    }

    pub async fn create_add_on<'e, E>(
        &self,
        executor: E,
        name: &str,
        description: Option<&str>,
        pricing_mode: AddOnPricingMode,
    ) -> Result<AddOn, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let add_on = sqlx::query_as::<_, AddOn>(
            r#"
            INSERT INTO catalog_add_ons (name, description, pricing_mode)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(name)
        .bind(description)
        .bind(pricing_mode)
        .fetch_one(executor)
        .await?;
        Ok(add_on)
    }

    // Upsert manual (UPDATE e, se não existir, INSERT): a tabela tem duas
    // chaves parciais — (service_id, currency) e (add_on_id, currency) —
    // então não dá para usar um ON CONFLICT único.
    pub async fn upsert_price<'e, E>(
        &self,
        executor: E,
        service_id: Option<Uuid>,
        add_on_id: Option<Uuid>,
        currency: &str,
        amount: Decimal,
    ) -> Result<PriceBookEntry, AppError>
    where
        E: Executor<'e, Database = Postgres> + sqlx::Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        let updated = sqlx::query_as::<_, PriceBookEntry>(
            r#"
            UPDATE price_book
            SET amount = $4, updated_at = now()
            WHERE currency = $3
              AND service_id IS NOT DISTINCT FROM $1
              AND add_on_id IS NOT DISTINCT FROM $2
            RETURNING *
            "#,
        )
        .bind(service_id)
        .bind(add_on_id)
        .bind(currency)
        .bind(amount)
        .fetch_optional(&mut *tx)
        .await?;

        let entry = match updated {
            Some(entry) => entry,
            None => {
                sqlx::query_as::<_, PriceBookEntry>(
                    r#"
                    INSERT INTO price_book (service_id, add_on_id, currency, amount)
                    VALUES ($1, $2, $3, $4)
                    RETURNING *
                    "#,
                )
                .bind(service_id)
                .bind(add_on_id)
                .bind(currency)
                .bind(amount)
                .fetch_one(&mut *tx)
                .await?
            }
        };

        tx.commit().await?;
        Ok(entry)
    }
}
