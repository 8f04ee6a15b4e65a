// src/models/notifications.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "notification_type", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "snake_case")]
pub enum NotificationType {
    NewOrder,
    OrderStatusUpdate,
    ClientRegistration,
    Broadcast,
    Individual,
    Reminder,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "notification_priority", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "snake_case")]
pub enum NotificationPriority {
    Low,
    Normal,
    High,
}

// Notificações nunca são apagadas; só os flags de leitura mudam.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: Uuid,
    pub kind: NotificationType,
    pub title: String,
    pub message: String,

    // NULL = broadcast
    pub user_id: Option<Uuid>,
    pub priority: NotificationPriority,

    pub order_id: Option<Uuid>,

    pub is_read: bool,
    pub read_at: Option<DateTime<Utc>>,
    pub is_viewed: bool,
    pub viewed_at: Option<DateTime<Utc>>,

    pub created_at: DateTime<Utc>,
}
