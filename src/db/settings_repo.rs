// src/db/settings_repo.rs

use sqlx::{Executor, PgPool, Postgres};

use crate::{
    common::error::AppError,
    models::settings::{BusinessSettings, UpdateSettingsPayload},
};

// A tabela business_settings tem uma linha só, criada pela migração.
#[derive(Clone)]
pub struct SettingsRepository {
    pool: PgPool,
}

impl SettingsRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn get(&self) -> Result<BusinessSettings, AppError> {
        let settings = sqlx::query_as::<_, BusinessSettings>(
            "SELECT * FROM business_settings WHERE id = TRUE",
        )
        .fetch_one(&self.pool)
        .await?;
        Ok(settings)
    }

    pub async fn update<'e, E>(
        &self,
        executor: E,
        payload: &UpdateSettingsPayload,
    ) -> Result<BusinessSettings, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let settings = sqlx::query_as::<_, BusinessSettings>(
            r#"
            UPDATE business_settings
            SET business_name        = COALESCE($1, business_name),
                document_number      = COALESCE($2, document_number),
                address              = COALESCE($3, address),
                phone                = COALESCE($4, phone),
                email                = COALESCE($5, email),
                origin_lat           = COALESCE($6, origin_lat),
                origin_lng           = COALESCE($7, origin_lng),
                delivery_rate_per_km = COALESCE($8, delivery_rate_per_km),
                pix_key              = COALESCE($9, pix_key),
                updated_at           = now()
            WHERE id = TRUE
            RETURNING *
            "#,
        )
        .bind(payload.business_name.as_deref())
        .bind(payload.document_number.as_deref())
        .bind(payload.address.as_deref())
        .bind(payload.phone.as_deref())
        .bind(payload.email.as_deref())
        .bind(payload.origin_lat)
        .bind(payload.origin_lng)
        .bind(payload.delivery_rate_per_km)
        .bind(payload.pix_key.as_deref())
        .fetch_one(executor)
        .await?;
        Ok(settings)
    }
}
