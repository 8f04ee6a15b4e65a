// src/services/reports_service.rs

use sqlx::PgPool;

use crate::{
    common::error::AppError,
    db::ReportsRepository,
    models::reports::{ReportSummary, TopServiceEntry, VolumeChartEntry},
};

#[derive(Clone)]
pub struct ReportsService {
    repo: ReportsRepository,
    pool: PgPool,
}

impl ReportsService {
    pub fn new(repo: ReportsRepository, pool: PgPool) -> Self {
        Self { repo, pool }
    }

    pub async fn get_summary(&self) -> Result<ReportSummary, AppError> {
        self.repo.summary(&self.pool).await
    }

    pub async fn get_volume_chart(&self) -> Result<Vec<VolumeChartEntry>, AppError> {
        self.repo.volume_last_30_days(&self.pool).await
    }

    pub async fn get_top_services(&self) -> Result<Vec<TopServiceEntry>, AppError> {
        self.repo.top_services(&self.pool).await
    }
}
