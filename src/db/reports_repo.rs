// src/db/reports_repo.rs

use sqlx::{Executor, PgPool, Postgres};

use crate::{
    common::error::AppError,
    models::reports::{ReportSummary, TopServiceEntry, VolumeChartEntry},
};

#[derive(Clone)]
pub struct ReportsRepository {
    pool: PgPool,
}

impl ReportsRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn summary<'e, E>(&self, executor: E) -> Result<ReportSummary, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        // Uma query só: contagens por status, receita dos entregues e
        // itens de estoque no limite.
        let summary = sqlx::query_as::<_, ReportSummary>(
            r#"
            SELECT
                (SELECT COUNT(*) FROM orders)                                            AS orders_total,
                (SELECT COUNT(*) FROM orders WHERE status = 'PENDING')                   AS orders_pending,
                (SELECT COUNT(*) FROM orders
                  WHERE status NOT IN ('PENDING', 'DELIVERED', 'CANCELLED'))             AS orders_in_progress,
                (SELECT COUNT(*) FROM orders WHERE status = 'DELIVERED')                 AS orders_delivered,
                (SELECT COUNT(*) FROM orders WHERE status = 'CANCELLED')                 AS orders_cancelled,
                (SELECT COALESCE(SUM(COALESCE(final_total, estimated_total)), 0)
                   FROM orders WHERE status = 'DELIVERED')                               AS revenue,
                (SELECT COUNT(*) FROM inventory_items
                  WHERE quantity <= low_stock_threshold)                                 AS low_stock_items
            "#,
        )
        .fetch_one(executor)
        .await?;
        Ok(summary)
    }

    pub async fn volume_last_30_days<'e, E>(
        &self,
        executor: E,
    ) -> Result<Vec<VolumeChartEntry>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let entries = sqlx::query_as::<_, VolumeChartEntry>(
            r#"
            SELECT created_at::date AS day,
                   COUNT(*) AS orders,
                   COALESCE(SUM(COALESCE(final_total, estimated_total)), 0) AS total
            FROM orders
            WHERE created_at >= now() - INTERVAL '30 days'
            GROUP BY created_at::date
            ORDER BY day ASC
            "#,
        )
        .fetch_all(executor)
        .await?;
        Ok(entries)
    }

    pub async fn top_services<'e, E>(&self, executor: E) -> Result<Vec<TopServiceEntry>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let entries = sqlx::query_as::<_, TopServiceEntry>(
            r#"
            SELECT s.name AS name,
                   COUNT(o.id) AS orders,
                   COALESCE(SUM(COALESCE(o.final_total, o.estimated_total)), 0) AS total
            FROM orders o
            JOIN catalog_services s ON s.id = o.service_id
            WHERE o.status <> 'CANCELLED'
            GROUP BY s.name
            ORDER BY orders DESC
            LIMIT 10
            "#,
        )
        .fetch_all(executor)
        .await?;
        Ok(entries)
    }
}
