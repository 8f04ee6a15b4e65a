// src/docs.rs

use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use utoipa::OpenApi;

use crate::handlers;
use crate::models;
use crate::services;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Auth ---
        handlers::auth::register,
        handlers::auth::login,
        handlers::auth::accept_invitation,

        // --- Users ---
        handlers::auth::get_me,

        // --- Catalog ---
        handlers::catalog::list_services,
        handlers::catalog::list_add_ons,
        handlers::catalog::create_service,
        handlers::catalog::create_add_on,
        handlers::catalog::upsert_price,

        // --- Orders ---
        handlers::orders::quote,
        handlers::orders::create_order,
        handlers::orders::list_my_orders,
        handlers::orders::get_order,

        // --- Invoices ---
        handlers::invoices::get_invoice,
        handlers::invoices::get_invoice_pdf,

        // --- Staff ---
        handlers::orders::list_queue,
        handlers::orders::acknowledge_order,
        handlers::orders::update_status,
        handlers::orders::confirm_weight,
        handlers::orders::mark_paid,
        handlers::orders::register_walk_in,
        handlers::users::register_customer,
        handlers::users::staff_set_customer_active,

        // --- Admin ---
        handlers::orders::force_status,
        handlers::orders::cancel_order,
        handlers::users::create_member,
        handlers::users::list_staff,
        handlers::users::list_customers,
        handlers::users::admin_set_active,
        handlers::users::update_role,
        handlers::notifications::broadcast,
        handlers::notifications::send_individual,

        // --- Notifications ---
        handlers::notifications::list_notifications,
        handlers::notifications::unread_count,
        handlers::notifications::mark_read,

        // --- Inventory ---
        handlers::inventory::create_item,
        handlers::inventory::get_all_items,
        handlers::inventory::get_low_stock,
        handlers::inventory::add_stock,
        handlers::inventory::consume_stock,
        handlers::inventory::get_movements,

        // --- Reports ---
        handlers::reports::get_summary,
        handlers::reports::get_volume_chart,
        handlers::reports::get_top_services,

        // --- Settings ---
        handlers::settings::get_settings,
        handlers::settings::update_settings,
    ),
    components(
        schemas(
            // --- Auth ---
            models::auth::Role,
            models::auth::User,
            models::auth::RegisterUserPayload,
            models::auth::LoginUserPayload,
            models::auth::AcceptInvitationPayload,
            models::auth::AuthResponse,

            // --- Orders ---
            models::orders::OrderStatus,
            models::orders::PaymentStatus,
            models::orders::OrderSource,
            models::orders::Order,
            models::orders::OrderAddOn,
            models::orders::OrderStatusEvent,
            models::orders::OrderDetail,
            models::orders::QuoteBreakdown,
            services::geo::Coordinates,
            services::geo::DeliveryQuote,

            // --- Catalog ---
            models::catalog::WashService,
            models::catalog::AddOn,
            models::catalog::AddOnPricingMode,
            models::catalog::PriceBookEntry,
            models::catalog::PricedService,
            models::catalog::PricedAddOn,

            // --- Billing ---
            models::billing::Invoice,
            models::billing::InvoiceLine,
            models::billing::BusinessIdentity,
            models::billing::BillTo,

            // --- Notifications ---
            models::notifications::NotificationType,
            models::notifications::NotificationPriority,
            models::notifications::Notification,

            // --- Inventory ---
            models::inventory::StockStatus,
            models::inventory::InventoryItem,
            models::inventory::InventoryItemView,
            models::inventory::StockMovementReason,
            models::inventory::StockMovement,

            // --- Reports ---
            models::reports::ReportSummary,
            models::reports::VolumeChartEntry,
            models::reports::TopServiceEntry,

            // --- Settings ---
            models::settings::BusinessSettings,
            models::settings::UpdateSettingsPayload,

            // --- Payloads ---
            handlers::orders::QuotePayload,
            handlers::orders::AddOnSelectionPayload,
            handlers::orders::CreateOrderPayload,
            handlers::orders::UpdateStatusPayload,
            handlers::orders::ConfirmWeightPayload,
            handlers::orders::WalkInPayload,
            handlers::orders::WalkInResponse,
            handlers::orders::ForceStatusPayload,
            handlers::orders::CancelOrderPayload,
            handlers::catalog::CreateServicePayload,
            handlers::catalog::CreateAddOnPayload,
            handlers::catalog::UpsertPricePayload,
            handlers::users::CreateMemberPayload,
            handlers::users::SetActivePayload,
            handlers::users::UpdateRolePayload,
            handlers::users::RegisterCustomerPayload,
            handlers::users::RegisteredCustomerResponse,
            handlers::notifications::BroadcastPayload,
            handlers::notifications::IndividualMessagePayload,
            handlers::inventory::CreateItemPayload,
            handlers::inventory::AddStockPayload,
            handlers::inventory::ConsumeStockPayload,
        )
    ),
    tags(
        (name = "Auth", description = "Autenticação e Registro"),
        (name = "Users", description = "Dados do Usuário e Perfil"),
        (name = "Catalog", description = "Serviços, Adicionais e Preços"),
        (name = "Orders", description = "Pedidos do Cliente"),
        (name = "Invoices", description = "Faturas (JSON e PDF)"),
        (name = "Staff", description = "Fila e Ações da Equipe"),
        (name = "Admin", description = "Gestão de Contas, Pedidos e Catálogo"),
        (name = "Notifications", description = "Notificações e Lembretes"),
        (name = "Inventory", description = "Estoque de Insumos"),
        (name = "Reports", description = "Indicadores Gerenciais"),
        (name = "Settings", description = "Configurações do Negócio")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "api_jwt",
            SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
        );
    }
}
