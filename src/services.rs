pub mod auth;
pub mod geo;
pub mod inventory_service;
pub mod invoice_service;
pub mod lifecycle;
pub mod notification_service;
pub mod order_service;
pub mod pricing;
pub mod reports_service;
