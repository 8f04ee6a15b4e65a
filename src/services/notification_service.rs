// src/services/notification_service.rs

use std::{collections::HashMap, sync::Arc, time::Duration};

use sqlx::{Executor, PgPool, Postgres};
use tokio::{sync::Mutex, task::JoinHandle};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{NotificationRepository, OrderRepository},
    models::{
        notifications::{Notification, NotificationPriority, NotificationType},
        orders::{Order, OrderStatus},
    },
};

// Intervalo entre lembretes de pedido pendente para a equipe.
const REMINDER_INTERVAL: Duration = Duration::from_secs(120);

// Serviço de notificações + registro explícito de lembretes agendados.
// O registro pertence a este objeto (vive no AppState), nunca a um global
// ambiente; na subida do servidor os lembretes pendentes são re-derivados
// do estado persistido (status PENDING sem visto da equipe).
#[derive(Clone)]
pub struct NotificationService {
    repo: NotificationRepository,
    order_repo: OrderRepository,
    pool: PgPool,
    reminders: Arc<Mutex<HashMap<Uuid, JoinHandle<()>>>>,
}

impl NotificationService {
    pub fn new(repo: NotificationRepository, order_repo: OrderRepository, pool: PgPool) -> Self {
        Self {
            repo,
            order_repo,
            pool,
            reminders: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    // ---
    // Consultas / flags
    // ---

    pub async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<Notification>, AppError> {
        self.repo.list_for_user(user_id).await
    }

    pub async fn unread_count(&self, user_id: Uuid) -> Result<i64, AppError> {
        self.repo.unread_count(user_id).await
    }

    pub async fn mark_read(&self, id: Uuid, user_id: Uuid) -> Result<Notification, AppError> {
        self.repo.mark_read(&self.pool, id, user_id).await
    }

    // ---
    // Gatilhos de negócio (rodam dentro da transação do chamador)
    // ---

    pub async fn notify_new_order<'e, E>(
        &self,
        executor: E,
        order: &Order,
    ) -> Result<Notification, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.repo
            .create(
                executor,
                NotificationType::NewOrder,
                "Novo pedido recebido",
                &format!("Pedido #{} aguardando coleta.", order.display_id),
                None, // broadcast para a equipe
                NotificationPriority::High,
                Some(order.id),
            )
            .await
    }

    pub async fn notify_status_update<'e, E>(
        &self,
        executor: E,
        order: &Order,
        new_status: OrderStatus,
    ) -> Result<Notification, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.repo
            .create(
                executor,
                NotificationType::OrderStatusUpdate,
                "Seu pedido andou!",
                &format!(
                    "Pedido #{}: {}.",
                    order.display_id,
                    new_status.label("pt")
                ),
                Some(order.customer_id),
                NotificationPriority::Normal,
                Some(order.id),
            )
            .await
    }

    // ---
    // Mensagens administrativas
    // ---

    pub async fn broadcast(
        &self,
        title: &str,
        message: &str,
        priority: NotificationPriority,
    ) -> Result<Notification, AppError> {
        self.repo
            .create(
                &self.pool,
                NotificationType::Broadcast,
                title,
                message,
                None,
                priority,
                None,
            )
            .await
    }

    pub async fn send_individual(
        &self,
        user_id: Uuid,
        title: &str,
        message: &str,
        priority: NotificationPriority,
    ) -> Result<Notification, AppError> {
        self.repo
            .create(
                &self.pool,
                NotificationType::Individual,
                title,
                message,
                Some(user_id),
                priority,
                None,
            )
            .await
    }

    // ---
    // Lembretes de pedido pendente
    // ---

    // Agenda o ciclo de lembretes de um pedido recém-criado. No máximo um
    // timer por pedido; o timer se encerra sozinho quando o pedido é visto
    // ou sai de PENDING.
    pub async fn schedule_reminder(&self, order_id: Uuid) {
        let mut reminders = self.reminders.lock().await;
        if reminders.contains_key(&order_id) {
            return;
        }

        let service = self.clone();
        let handle = tokio::spawn(async move {
            loop {
                tokio::time::sleep(REMINDER_INTERVAL).await;

                let order = match service.order_repo.find_by_id(&service.pool, order_id).await {
                    Ok(Some(order)) => order,
                    Ok(None) => break,
                    Err(e) => {
                        tracing::error!("Lembrete do pedido {}: {}", order_id, e);
                        break;
                    }
                };

                if order.viewed_by_staff_at.is_some() || order.status != OrderStatus::Pending {
                    break;
                }

                let result = service
                    .repo
                    .create(
                        &service.pool,
                        NotificationType::Reminder,
                        "Pedido aguardando a equipe",
                        &format!(
                            "O pedido #{} ainda não foi visto. Confirme a coleta.",
                            order.display_id
                        ),
                        None,
                        NotificationPriority::High,
                        Some(order.id),
                    )
                    .await;

                if let Err(e) = result {
                    tracing::error!("Falha ao gravar lembrete do pedido {}: {}", order_id, e);
                    break;
                }
            }

            service.reminders.lock().await.remove(&order_id);
        });

        reminders.insert(order_id, handle);
    }

    pub async fn cancel_reminder(&self, order_id: Uuid) {
        if let Some(handle) = self.reminders.lock().await.remove(&order_id) {
            handle.abort();
        }
    }

    // A equipe abriu o pedido: persiste o visto e encerra o ciclo.
    pub async fn mark_order_viewed(&self, order_id: Uuid) -> Result<Order, AppError> {
        let order = self
            .order_repo
            .mark_viewed(&self.pool, order_id)
            .await?
            .ok_or(AppError::OrderNotFound)?;

        self.cancel_reminder(order_id).await;
        Ok(order)
    }

    // Na subida do servidor: lembretes ainda devidos são recriados a partir
    // do banco, não da memória do processo anterior.
    pub async fn resume_pending_reminders(&self) -> Result<usize, AppError> {
        let pending = self.order_repo.list_pending_unviewed().await?;
        let count = pending.len();
        for order_id in pending {
            self.schedule_reminder(order_id).await;
        }
        if count > 0 {
            tracing::info!("⏰ {} lembrete(s) de pedido pendente retomado(s).", count);
        }
        Ok(count)
    }
}
