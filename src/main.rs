//src/main.rs

use axum::{
    middleware as axum_middleware,
    routing::{get, post, put},
    Router,
};
use tokio::net::TcpListener;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

// Declaração dos nossos módulos
mod common;
mod config;
mod db;
mod docs;
mod handlers;
mod middleware;
mod models;
mod services;

// Importações principais
use crate::config::AppState;
use crate::middleware::auth::auth_guard;

#[tokio::main]
async fn main() {
    // Inicializa o logger
    tracing_subscriber::fmt().with_target(false).compact().init();

    // .expect() é bom aqui: se a configuração falhar, a aplicação não deve iniciar.
    let app_state = AppState::new()
        .await
        .expect("Falha ao inicializar o estado da aplicação.");

    // Roda as migrações do SQLx na inicialização
    sqlx::migrate!()
        .run(&app_state.db_pool)
        .await
        .expect("Falha ao rodar as migrações do banco de dados.");

    tracing::info!("✅ Migrações do banco de dados executadas com sucesso!");

    // Primeiro admin, se configurado no ambiente.
    if let (Ok(email), Ok(password)) = (
        std::env::var("ADMIN_EMAIL"),
        std::env::var("ADMIN_PASSWORD"),
    ) {
        app_state
            .auth_service
            .bootstrap_admin(&email, &password)
            .await
            .expect("Falha ao criar o admin inicial.");
    }

    // Lembretes de pedido pendente são re-derivados do banco, não da
    // memória do processo anterior.
    app_state
        .notification_service
        .resume_pending_reminders()
        .await
        .expect("Falha ao retomar os lembretes pendentes.");

    // Define as rotas de autenticação (públicas)
    let auth_routes = Router::new()
        .route("/register", post(handlers::auth::register))
        .route("/login", post(handlers::auth::login))
        .route("/accept-invitation", post(handlers::auth::accept_invitation));

    // Catálogo público (telas de seleção de serviço)
    let catalog_routes = Router::new()
        .route("/services", get(handlers::catalog::list_services))
        .route("/add-ons", get(handlers::catalog::list_add_ons));

    // Define as rotas de usuário (protegidas pelo middleware)
    let user_routes = Router::new()
        .route("/me", get(handlers::auth::get_me))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    // Pedidos do cliente + fatura (a posse é validada no service)
    let order_routes = Router::new()
        .route("/"
               , post(handlers::orders::create_order)
               .get(handlers::orders::list_my_orders)
        )
        .route("/{id}", get(handlers::orders::get_order))
        .route("/{id}/invoice", get(handlers::invoices::get_invoice))
        .route("/{id}/invoice.pdf", get(handlers::invoices::get_invoice_pdf))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ))
        // Prévia de preço do checkout: fica fora do guard (adicionada
        // depois do .layer(), então não passa pelo auth).
        .route("/quote", post(handlers::orders::quote));

    // Fila e ações da equipe
    let staff_routes = Router::new()
        .route("/orders", get(handlers::orders::list_queue))
        .route("/orders/{id}/ack", post(handlers::orders::acknowledge_order))
        .route("/orders/{id}/status", post(handlers::orders::update_status))
        .route("/orders/{id}/weight", post(handlers::orders::confirm_weight))
        .route("/orders/{id}/paid", post(handlers::orders::mark_paid))
        .route("/walk-in", post(handlers::orders::register_walk_in))
        .route("/customers", post(handlers::users::register_customer))
        .route("/customers/{id}/active", post(handlers::users::staff_set_customer_active))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    // Notificações (qualquer papel autenticado)
    let notification_routes = Router::new()
        .route("/", get(handlers::notifications::list_notifications))
        .route("/unread-count", get(handlers::notifications::unread_count))
        .route("/{id}/read", post(handlers::notifications::mark_read))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    // Área administrativa
    let admin_routes = Router::new()
        .route("/staff"
               , post(handlers::users::create_member)
               .get(handlers::users::list_staff)
        )
        .route("/customers", get(handlers::users::list_customers))
        .route("/users/{id}/active", post(handlers::users::admin_set_active))
        .route("/users/{id}/role", post(handlers::users::update_role))
        .route("/orders/{id}/force-status", post(handlers::orders::force_status))
        .route("/orders/{id}/cancel", post(handlers::orders::cancel_order))
        .route("/catalog/services", post(handlers::catalog::create_service))
        .route("/catalog/add-ons", post(handlers::catalog::create_add_on))
        .route("/catalog/prices", put(handlers::catalog::upsert_price))
        .route("/inventory/items"
               , post(handlers::inventory::create_item)
               .get(handlers::inventory::get_all_items)
        )
        .route("/inventory/low-stock", get(handlers::inventory::get_low_stock))
        .route("/inventory/stock-entry", post(handlers::inventory::add_stock))
        .route("/inventory/stock-exit", post(handlers::inventory::consume_stock))
        .route("/inventory/items/{id}/movements", get(handlers::inventory::get_movements))
        .route("/notifications/broadcast", post(handlers::notifications::broadcast))
        .route("/notifications/individual", post(handlers::notifications::send_individual))
        .route("/reports/summary", get(handlers::reports::get_summary))
        .route("/reports/volume", get(handlers::reports::get_volume_chart))
        .route("/reports/top-services", get(handlers::reports::get_top_services))
        .route("/settings"
               , get(handlers::settings::get_settings)
               .put(handlers::settings::update_settings)
        )
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    // Combina tudo no router principal
    let app = Router::new()
        .route("/api/health", get(|| async { "OK" }))
        .nest("/api/auth", auth_routes)
        .nest("/api/catalog", catalog_routes)
        .nest("/api/users", user_routes)
        .nest("/api/orders", order_routes)
        .nest("/api/staff", staff_routes)
        .nest("/api/notifications", notification_routes)
        .nest("/api/admin", admin_routes)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", docs::ApiDoc::openapi()))
        .with_state(app_state);

    // Inicia o servidor
    let addr = "0.0.0.0:3000";
    let listener = TcpListener::bind(addr)
        .await
        .expect("Falha ao iniciar o listener TCP");
    tracing::info!("🚀 Servidor escutando em {}", listener.local_addr().unwrap());
    axum::serve(listener, app)
        .await
        .expect("Erro no servidor Axum");
}
