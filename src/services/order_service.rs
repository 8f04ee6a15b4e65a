// src/services/order_service.rs

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{CatalogRepository, OrderRepository, SettingsRepository, UserRepository},
    models::{
        auth::{Role, User},
        orders::{
            NewOrder, Order, OrderDetail, OrderSource, OrderStatus, PaymentStatus, QuoteBreakdown,
        },
    },
    services::{
        geo::{self, Coordinates},
        lifecycle,
        notification_service::NotificationService,
        pricing::{self, AddOnSelection},
    },
};

// Entrada do checkout, já desempacotada do payload pelo handler.
#[derive(Debug, Clone)]
pub struct CreateOrderInput {
    pub service_id: Uuid,
    pub estimated_weight_kg: Option<Decimal>,
    pub pieces: Option<i32>,
    pub instructions: Option<String>,
    pub photo_urls: Vec<String>,
    pub pickup_address: String,
    pub pickup_coords: Option<Coordinates>,
    pub pickup_date: NaiveDate,
    pub pickup_window: String,
    pub delivery_address: Option<String>,
    pub delivery_date: Option<NaiveDate>,
    pub delivery_window: Option<String>,
    pub add_ons: Vec<(Uuid, i32)>,
    pub currency: Option<String>,
    pub source: OrderSource,
}

#[derive(Clone)]
pub struct OrderService {
    order_repo: OrderRepository,
    catalog_repo: CatalogRepository,
    user_repo: UserRepository,
    settings_repo: SettingsRepository,
    notification_service: NotificationService,
    pool: PgPool,
    default_currency: String,
}

impl OrderService {
    pub fn new(
        order_repo: OrderRepository,
        catalog_repo: CatalogRepository,
        user_repo: UserRepository,
        settings_repo: SettingsRepository,
        notification_service: NotificationService,
        pool: PgPool,
        default_currency: String,
    ) -> Self {
        Self {
            order_repo,
            catalog_repo,
            user_repo,
            settings_repo,
            notification_service,
            pool,
            default_currency,
        }
    }

    // Resolve cada adicional do payload na moeda do pedido. Adicional sem
    // preço cadastrado entra valendo zero (o motor de preços loga o aviso).
    async fn resolve_add_ons(
        &self,
        selections: &[(Uuid, i32)],
        currency: &str,
    ) -> Result<Vec<(Uuid, AddOnSelection)>, AppError> {
        let mut resolved = Vec::with_capacity(selections.len());
        for (add_on_id, quantity) in selections {
            let add_on = self
                .catalog_repo
                .find_add_on(*add_on_id)
                .await?
                .ok_or(AppError::AddOnNotFound)?;
            let unit_price = self
                .catalog_repo
                .add_on_price(&self.pool, add_on.id, currency)
                .await?;
            resolved.push((
                add_on.id,
                AddOnSelection {
                    name: add_on.name,
                    unit_price,
                    quantity: *quantity,
                },
            ));
        }
        Ok(resolved)
    }

    // Prévia do checkout: mesmos cálculos da criação, sem persistir nada.
    pub async fn quote(
        &self,
        service_id: Uuid,
        weight_kg: Option<Decimal>,
        add_ons: &[(Uuid, i32)],
        pickup: Option<Coordinates>,
        currency: Option<String>,
    ) -> Result<QuoteBreakdown, AppError> {
        let currency = currency.unwrap_or_else(|| self.default_currency.clone());
        let settings = self.settings_repo.get().await?;

        let service = self
            .catalog_repo
            .find_service(service_id)
            .await?
            .ok_or(AppError::ServiceNotFound)?;
        let price_per_kg = self
            .catalog_repo
            .service_price(&self.pool, service.id, &currency)
            .await?
            .ok_or_else(|| AppError::PriceNotFound(currency.clone()))?;

        let resolved = self.resolve_add_ons(add_ons, &currency).await?;
        let selections: Vec<AddOnSelection> =
            resolved.into_iter().map(|(_, sel)| sel).collect();

        let service_cost = pricing::service_cost(price_per_kg, weight_kg);
        let order_total = pricing::order_total(price_per_kg, weight_kg, &selections);
        let add_ons_total = order_total - service_cost;

        let origin = Coordinates {
            lat: settings.origin_lat,
            lng: settings.origin_lng,
        };
        let delivery = geo::delivery_quote(pickup, origin, settings.delivery_rate_per_km);

        Ok(QuoteBreakdown {
            service_cost,
            add_ons_total,
            order_total,
            distance_km: delivery.distance_km,
            billed_km: delivery.billed_km,
            delivery_fee: delivery.fee,
            grand_total: order_total + delivery.fee,
            currency,
        })
    }

    // Criação de pedido: os totais e o frete são sempre calculados aqui no
    // servidor, nunca aceitos do cliente.
    pub async fn create_order(
        &self,
        customer_id: Uuid,
        creator: &User,
        input: CreateOrderInput,
    ) -> Result<Order, AppError> {
        let currency = input
            .currency
            .clone()
            .unwrap_or_else(|| self.default_currency.clone());
        let settings = self.settings_repo.get().await?;

        let service = self
            .catalog_repo
            .find_service(input.service_id)
            .await?
            .ok_or(AppError::ServiceNotFound)?;
        let price_per_kg = self
            .catalog_repo
            .service_price(&self.pool, service.id, &currency)
            .await?
            .ok_or_else(|| AppError::PriceNotFound(currency.clone()))?;

        let resolved = self.resolve_add_ons(&input.add_ons, &currency).await?;
        let selections: Vec<AddOnSelection> =
            resolved.iter().map(|(_, sel)| sel.clone()).collect();

        let order_total =
            pricing::order_total(price_per_kg, input.estimated_weight_kg, &selections);

        let origin = Coordinates {
            lat: settings.origin_lat,
            lng: settings.origin_lng,
        };
        let delivery =
            geo::delivery_quote(input.pickup_coords, origin, settings.delivery_rate_per_km);

        let new_order = NewOrder {
            customer_id,
            service_id: service.id,
            status: OrderStatus::Pending,
            source: input.source,
            estimated_weight_kg: input.estimated_weight_kg,
            pieces: input.pieces,
            instructions: input.instructions.clone(),
            photo_urls: input.photo_urls.clone(),
            pickup_address: input.pickup_address.clone(),
            pickup_lat: input.pickup_coords.map(|c| c.lat),
            pickup_lng: input.pickup_coords.map(|c| c.lng),
            pickup_date: input.pickup_date,
            pickup_window: input.pickup_window.clone(),
            delivery_address: input.delivery_address.clone(),
            delivery_date: input.delivery_date,
            delivery_window: input.delivery_window.clone(),
            distance_km: delivery.distance_km,
            billed_km: delivery.billed_km as i32,
            delivery_fee: delivery.fee,
            currency,
            service_price_per_kg: price_per_kg,
            estimated_total: order_total + delivery.fee,
        };

        let mut tx = self.pool.begin().await?;

        let order = self.order_repo.create(&mut *tx, &new_order).await?;

        for (add_on_id, selection) in &resolved {
            let unit_price = selection.unit_price.unwrap_or(Decimal::ZERO);
            let line_total = pricing::add_on_cost(selection);
            self.order_repo
                .insert_add_on(
                    &mut *tx,
                    order.id,
                    *add_on_id,
                    &selection.name,
                    selection.quantity,
                    unit_price,
                    line_total,
                )
                .await?;
        }

        self.order_repo
            .insert_event(&mut *tx, order.id, OrderStatus::Pending, Some(creator.id), false, None)
            .await?;

        self.notification_service
            .notify_new_order(&mut *tx, &order)
            .await?;

        tx.commit().await?;

        // O ciclo de lembretes começa depois do commit: pedido persistido.
        self.notification_service.schedule_reminder(order.id).await;

        tracing::info!(
            "🧺 Pedido #{} criado ({} {})",
            order.display_id,
            order.estimated_total,
            order.currency
        );
        Ok(order)
    }

    // ---
    // Consultas
    // ---

    pub async fn list_for_customer(&self, customer_id: Uuid) -> Result<Vec<Order>, AppError> {
        self.order_repo.list_by_customer(&self.pool, customer_id).await
    }

    pub async fn list_active(&self) -> Result<Vec<Order>, AppError> {
        self.order_repo.list_active(&self.pool).await
    }

    pub async fn get_detail(
        &self,
        order_id: Uuid,
        viewer: &User,
        lang: &str,
    ) -> Result<OrderDetail, AppError> {
        let order = self
            .order_repo
            .find_by_id(&self.pool, order_id)
            .await?
            .ok_or(AppError::OrderNotFound)?;

        // Cliente só enxerga os próprios pedidos. Não vaza a existência
        // dos outros: responde como se não existisse.
        if viewer.role == Role::Customer && order.customer_id != viewer.id {
            return Err(AppError::OrderNotFound);
        }

        let add_ons = self.order_repo.list_add_ons(&self.pool, order_id).await?;
        let events = self.order_repo.list_events(&self.pool, order_id).await?;

        let service_name = self
            .catalog_repo
            .find_service(order.service_id)
            .await?
            .map(|s| s.name)
            .unwrap_or_default();
        let customer_name = self
            .user_repo
            .find_by_id(order.customer_id)
            .await?
            .map(|u| u.name)
            .unwrap_or_default();
        let status_label = order.status.label(lang).to_string();

        Ok(OrderDetail {
            header: order,
            service_name,
            customer_name,
            status_label,
            add_ons,
            events,
        })
    }

    // ---
    // Mutações do ciclo de vida
    // ---

    // Avanço normal da esteira (staff). Valida a tabela de transições e a
    // versão observada pelo chamador antes de aplicar.
    pub async fn transition(
        &self,
        order_id: Uuid,
        new_status: OrderStatus,
        actor: &User,
        expected_version: i32,
    ) -> Result<Order, AppError> {
        let mut tx = self.pool.begin().await?;

        let order = self
            .order_repo
            .find_by_id_for_update(&mut *tx, order_id)
            .await?
            .ok_or(AppError::OrderNotFound)?;

        if order.version != expected_version {
            return Err(AppError::StaleVersion);
        }

        if !lifecycle::can_transition(order.status, new_status) {
            return Err(AppError::InvalidTransition {
                from: order.status,
                to: new_status,
            });
        }

        let acting_staff = (actor.role != Role::Customer).then_some(actor.id);
        let updated = self
            .order_repo
            .update_status(&mut *tx, order_id, new_status, acting_staff, expected_version)
            .await?
            .ok_or(AppError::StaleVersion)?;

        self.order_repo
            .insert_event(&mut *tx, order_id, new_status, Some(actor.id), false, None)
            .await?;

        self.notification_service
            .notify_status_update(&mut *tx, &updated, new_status)
            .await?;

        tx.commit().await?;

        // Primeira transição encerra o ciclo de lembretes do pedido.
        self.notification_service.cancel_reminder(order_id).await;

        tracing::info!(
            "📦 Pedido #{}: {} -> {}",
            updated.display_id,
            order.status.as_str(),
            new_status.as_str()
        );
        Ok(updated)
    }

    // Correção administrativa fora da cadeia: auditada e com justificativa
    // obrigatória. Nunca disponível para o fluxo guiado do staff.
    pub async fn force_status(
        &self,
        order_id: Uuid,
        new_status: OrderStatus,
        admin: &User,
        reason: &str,
        expected_version: i32,
    ) -> Result<Order, AppError> {
        let mut tx = self.pool.begin().await?;

        let order = self
            .order_repo
            .find_by_id_for_update(&mut *tx, order_id)
            .await?
            .ok_or(AppError::OrderNotFound)?;

        if order.version != expected_version {
            return Err(AppError::StaleVersion);
        }

        let updated = self
            .order_repo
            .update_status(&mut *tx, order_id, new_status, Some(admin.id), expected_version)
            .await?
            .ok_or(AppError::StaleVersion)?;

        self.order_repo
            .insert_event(&mut *tx, order_id, new_status, Some(admin.id), true, Some(reason))
            .await?;

        self.notification_service
            .notify_status_update(&mut *tx, &updated, new_status)
            .await?;

        tx.commit().await?;
        self.notification_service.cancel_reminder(order_id).await;

        tracing::warn!(
            "⚠️ forceStatus no pedido #{}: {} -> {} por {} ({})",
            updated.display_id,
            order.status.as_str(),
            new_status.as_str(),
            admin.email,
            reason
        );
        Ok(updated)
    }

    // Cancelamento: alcançável de qualquer estado não-terminal, como
    // operação própria — nunca pela transição normal.
    pub async fn cancel(
        &self,
        order_id: Uuid,
        actor: &User,
        reason: Option<&str>,
        expected_version: i32,
    ) -> Result<Order, AppError> {
        let mut tx = self.pool.begin().await?;

        let order = self
            .order_repo
            .find_by_id_for_update(&mut *tx, order_id)
            .await?
            .ok_or(AppError::OrderNotFound)?;

        if order.version != expected_version {
            return Err(AppError::StaleVersion);
        }

        if !lifecycle::can_cancel(order.status) {
            return Err(AppError::InvalidTransition {
                from: order.status,
                to: OrderStatus::Cancelled,
            });
        }

        let updated = self
            .order_repo
            .update_status(
                &mut *tx,
                order_id,
                OrderStatus::Cancelled,
                (actor.role != Role::Customer).then_some(actor.id),
                expected_version,
            )
            .await?
            .ok_or(AppError::StaleVersion)?;

        self.order_repo
            .insert_event(
                &mut *tx,
                order_id,
                OrderStatus::Cancelled,
                Some(actor.id),
                false,
                reason,
            )
            .await?;

        self.notification_service
            .notify_status_update(&mut *tx, &updated, OrderStatus::Cancelled)
            .await?;

        tx.commit().await?;
        self.notification_service.cancel_reminder(order_id).await;
        Ok(updated)
    }

    // Confirmação do peso real na coleta. Recalcula o total final com o
    // preço/kg congelado no pedido; NÃO avança o status (flag ortogonal).
    pub async fn confirm_weight(
        &self,
        order_id: Uuid,
        actual_weight_kg: Decimal,
        expected_version: i32,
    ) -> Result<Order, AppError> {
        let mut tx = self.pool.begin().await?;

        let order = self
            .order_repo
            .find_by_id_for_update(&mut *tx, order_id)
            .await?
            .ok_or(AppError::OrderNotFound)?;

        if order.version != expected_version {
            return Err(AppError::StaleVersion);
        }

        if !lifecycle::weight_editable(order.status) {
            return Err(AppError::WeightNotEditable(order.status));
        }

        let add_ons = self.order_repo.list_add_ons(&mut *tx, order_id).await?;
        let add_ons_total: Decimal = add_ons.iter().map(|a| a.line_total).sum();

        let service_total =
            pricing::service_cost(order.service_price_per_kg, Some(actual_weight_kg));
        let final_total = service_total + add_ons_total + order.delivery_fee;

        let updated = self
            .order_repo
            .set_actual_weight(&mut *tx, order_id, actual_weight_kg, final_total, expected_version)
            .await?
            .ok_or(AppError::StaleVersion)?;

        tx.commit().await?;

        tracing::info!(
            "⚖️ Pedido #{}: peso confirmado em {} kg (total {})",
            updated.display_id,
            actual_weight_kg,
            final_total
        );
        Ok(updated)
    }

    // Baixa do pagamento na entrega (dinheiro/na porta).
    pub async fn mark_paid(&self, order_id: Uuid) -> Result<Order, AppError> {
        self.order_repo
            .update_payment_status(&self.pool, order_id, PaymentStatus::Paid)
            .await?
            .ok_or(AppError::OrderNotFound)
    }

    // A equipe abriu o pedido pela primeira vez.
    pub async fn acknowledge(&self, order_id: Uuid) -> Result<Order, AppError> {
        self.notification_service.mark_order_viewed(order_id).await
    }
}
