// src/models/orders.rs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

// --- Enums ---

// Posição do pedido na esteira de atendimento. A cadeia canônica é
// PENDING -> PICKED_UP -> PROCESSING -> READY -> OUT_FOR_DELIVERY -> DELIVERED.
// DRYING e PRESSING são etapas intermediárias opcionais (ver services::lifecycle).
// CANCELLED é terminal e alcançável de qualquer estado não-terminal via
// operação própria de cancelamento, nunca pela transição normal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "order_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Pending,
    PickedUp,
    Processing,
    Drying,
    Pressing,
    Ready,
    OutForDelivery,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::PickedUp => "picked_up",
            OrderStatus::Processing => "processing",
            OrderStatus::Drying => "drying",
            OrderStatus::Pressing => "pressing",
            OrderStatus::Ready => "ready",
            OrderStatus::OutForDelivery => "out_for_delivery",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Cancelled => "cancelled",
        }
    }

    // Rótulo amigável mostrado ao cliente, derivado do estado.
    pub fn label(&self, lang: &str) -> &'static str {
        if lang == "pt" {
            return match self {
                OrderStatus::Pending => "Aguardando coleta",
                OrderStatus::PickedUp => "Coletado",
                OrderStatus::Processing => "Em lavagem",
                OrderStatus::Drying => "Secando",
                OrderStatus::Pressing => "Passando",
                OrderStatus::Ready => "Pronto para entrega",
                OrderStatus::OutForDelivery => "Saiu para entrega",
                OrderStatus::Delivered => "Entregue",
                OrderStatus::Cancelled => "Cancelado",
            };
        }
        match self {
            OrderStatus::Pending => "Awaiting pickup",
            OrderStatus::PickedUp => "Picked up",
            OrderStatus::Processing => "Washing",
            OrderStatus::Drying => "Drying",
            OrderStatus::Pressing => "Pressing",
            OrderStatus::Ready => "Ready for delivery",
            OrderStatus::OutForDelivery => "Out for delivery",
            OrderStatus::Delivered => "Delivered",
            OrderStatus::Cancelled => "Cancelled",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Delivered | OrderStatus::Cancelled)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "payment_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Pending,
    Paid,
}

// Canal de criação: checkout no app ou cadastro presencial pelo atendente.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "order_source", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "snake_case")]
pub enum OrderSource {
    App,
    WalkIn,
}

// --- Structs ---

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: Uuid,
    #[schema(example = 1024)]
    pub display_id: i32,
    pub customer_id: Uuid,
    pub service_id: Uuid,

    pub status: OrderStatus,
    pub payment_status: PaymentStatus,
    pub source: OrderSource,

    // Peso estimado pelo cliente; o peso real é pesado na coleta.
    // Sem peso, o preço do serviço fica adiado (política do produto).
    #[schema(example = "3.5")]
    pub estimated_weight_kg: Option<Decimal>,
    pub actual_weight_kg: Option<Decimal>,
    // Flag ortogonal ao status do ciclo de vida: o peso foi confirmado,
    // mas o pedido continua onde estava na esteira.
    pub weight_confirmed: bool,
    pub pieces: Option<i32>,
    pub instructions: Option<String>,
    pub photo_urls: Vec<String>,

    pub pickup_address: String,
    pub pickup_lat: Option<f64>,
    pub pickup_lng: Option<f64>,
    pub pickup_date: NaiveDate,
    #[schema(example = "08:00-10:00")]
    pub pickup_window: String,

    pub delivery_address: Option<String>,
    pub delivery_date: Option<NaiveDate>,
    pub delivery_window: Option<String>,

    pub distance_km: f64,
    // Distância cobrada: ceil(distance_km). Sempre para cima.
    pub billed_km: i32,
    pub delivery_fee: Decimal,

    // Fixados na criação; nunca mudam.
    #[schema(example = "BRL")]
    pub currency: String,
    pub service_price_per_kg: Decimal,
    pub estimated_total: Decimal,
    pub final_total: Option<Decimal>,

    pub assigned_staff_id: Option<Uuid>,
    pub viewed_by_staff_at: Option<DateTime<Utc>>,

    // Concorrência otimista: updates condicionados à versão observada.
    pub version: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// Dados já calculados de um pedido novo, prontos para o INSERT.
// Montado pelo OrderService depois de resolver preços e frete.
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub customer_id: Uuid,
    pub service_id: Uuid,
    pub status: OrderStatus,
    pub source: OrderSource,
    pub estimated_weight_kg: Option<Decimal>,
    pub pieces: Option<i32>,
    pub instructions: Option<String>,
    pub photo_urls: Vec<String>,
    pub pickup_address: String,
    pub pickup_lat: Option<f64>,
    pub pickup_lng: Option<f64>,
    pub pickup_date: NaiveDate,
    pub pickup_window: String,
    pub delivery_address: Option<String>,
    pub delivery_date: Option<NaiveDate>,
    pub delivery_window: Option<String>,
    pub distance_km: f64,
    pub billed_km: i32,
    pub delivery_fee: Decimal,
    pub currency: String,
    pub service_price_per_kg: Decimal,
    pub estimated_total: Decimal,
}

// Snapshot de um adicional no momento da criação do pedido
// (nome e preço congelados junto com a moeda).
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderAddOn {
    pub id: Uuid,
    pub order_id: Uuid,
    pub add_on_id: Uuid,
    #[schema(example = "Lavagem de edredom")]
    pub name: String,
    pub quantity: i32,
    pub unit_price: Decimal,
    pub line_total: Decimal,
    pub created_at: DateTime<Utc>,
}

// Um registro por transição de status (a trilha "<status>At").
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderStatusEvent {
    pub id: Uuid,
    pub order_id: Uuid,
    pub status: OrderStatus,
    pub actor_id: Option<Uuid>,
    // Transição imposta pelo admin fora da cadeia normal (auditada).
    pub forced: bool,
    pub reason: Option<String>,
    pub created_at: DateTime<Utc>,
}

// Prévia de preço para o checkout, antes de criar o pedido.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct QuoteBreakdown {
    pub service_cost: Decimal,
    pub add_ons_total: Decimal,
    // Total sem o frete (é assim que o motor de preços enxerga).
    pub order_total: Decimal,
    pub distance_km: f64,
    pub billed_km: i64,
    pub delivery_fee: Decimal,
    pub grand_total: Decimal,
    pub currency: String,
}

// Visão completa de um pedido para as telas de detalhe.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderDetail {
    #[serde(flatten)]
    pub header: Order,
    pub service_name: String,
    pub customer_name: String,
    pub status_label: String,
    pub add_ons: Vec<OrderAddOn>,
    pub events: Vec<OrderStatusEvent>,
}
