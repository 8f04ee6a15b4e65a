// src/config.rs

use sqlx::{postgres::PgPoolOptions, PgPool};
use std::{env, time::Duration};

use crate::{
    db::{
        CatalogRepository, InventoryRepository, NotificationRepository, OrderRepository,
        ReportsRepository, SettingsRepository, UserRepository,
    },
    services::{
        auth::AuthService, inventory_service::InventoryService, invoice_service::InvoiceService,
        notification_service::NotificationService, order_service::OrderService,
        reports_service::ReportsService,
    },
};

// O estado compartilhado que será acessível em toda a aplicação
#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub default_currency: String,

    pub auth_service: AuthService,
    pub order_service: OrderService,
    pub notification_service: NotificationService,
    pub invoice_service: InvoiceService,
    pub inventory_service: InventoryService,
    pub reports_service: ReportsService,

    // Repositórios usados direto pelos handlers de catálogo/configuração
    pub catalog_repo: CatalogRepository,
    pub settings_repo: SettingsRepository,
}

impl AppState {
    // A assinatura retorna um Result: se a configuração falhar, a
    // aplicação não deve iniciar.
    pub async fn new() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let database_url = env::var("DATABASE_URL").expect("DATABASE_URL deve ser definida");
        let jwt_secret = env::var("JWT_SECRET").expect("JWT_SECRET deve ser definido");
        let default_currency = env::var("DEFAULT_CURRENCY").unwrap_or_else(|_| "BRL".to_string());

        // Conecta ao banco de dados, usando '?' para propagar erros
        let db_pool = PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&database_url)
            .await?;

        tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

        // --- Monta o gráfico de dependências ---
        let user_repo = UserRepository::new(db_pool.clone());
        let catalog_repo = CatalogRepository::new(db_pool.clone());
        let order_repo = OrderRepository::new(db_pool.clone());
        let notification_repo = NotificationRepository::new(db_pool.clone());
        let inventory_repo = InventoryRepository::new(db_pool.clone());
        let settings_repo = SettingsRepository::new(db_pool.clone());
        let reports_repo = ReportsRepository::new(db_pool.clone());

        let notification_service = NotificationService::new(
            notification_repo.clone(),
            order_repo.clone(),
            db_pool.clone(),
        );

        let auth_service = AuthService::new(
            user_repo.clone(),
            notification_repo.clone(),
            jwt_secret.clone(),
            db_pool.clone(),
        );

        let order_service = OrderService::new(
            order_repo.clone(),
            catalog_repo.clone(),
            user_repo.clone(),
            settings_repo.clone(),
            notification_service.clone(),
            db_pool.clone(),
            default_currency.clone(),
        );

        let invoice_service = InvoiceService::new(
            order_repo.clone(),
            user_repo.clone(),
            catalog_repo.clone(),
            settings_repo.clone(),
            db_pool.clone(),
        );

        let inventory_service = InventoryService::new(inventory_repo, db_pool.clone());
        let reports_service = ReportsService::new(reports_repo, db_pool.clone());

        Ok(Self {
            db_pool,
            default_currency,
            auth_service,
            order_service,
            notification_service,
            invoice_service,
            inventory_service,
            reports_service,
            catalog_repo,
            settings_repo,
        })
    }
}
