//! Persistence seam: every record the API reads or writes goes through [`Store`].

use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value;
use thiserror::Error;
use uuid::Uuid;

use crate::{
    models::{
        Amount, Order, OrderStatus, Payment, PaymentMethod, PaymentStatus, Service, User,
        UserRole,
    },
    ordering::OrderDraft,
};

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    #[error("sql error: {0}")]
    Sql(#[from] sqlx::Error),

    #[error("corrupt record: {0}")]
    Corrupt(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub limit: u64,
    pub offset: u64,
}

impl PageRequest {
    pub fn all() -> Self {
        Self {
            limit: i64::MAX as u64,
            offset: 0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: u64,
}

#[derive(Debug, Clone, Default)]
pub struct OrderFilter {
    pub user_id: Option<Uuid>,
    pub status: Option<OrderStatus>,
    /// Case-insensitive match on order number or status.
    pub search: Option<String>,
    pub oldest_first: bool,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct PaymentFilter {
    pub user_id: Option<Uuid>,
    pub order_id: Option<Uuid>,
    pub status: Option<PaymentStatus>,
}

#[derive(Debug, Clone, Default)]
pub struct OrderPatch {
    pub status: Option<OrderStatus>,
    pub payment_status: Option<PaymentStatus>,
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub name: String,
    pub role: UserRole,
    pub password_hash: String,
}

#[derive(Debug, Clone, Default)]
pub struct ProfilePatch {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewService {
    pub name: String,
    pub description: Option<String>,
    pub base_price: Amount,
    pub price_per_page: Amount,
    pub active: bool,
}

#[derive(Debug, Clone, Default)]
pub struct ServicePatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub base_price: Option<Amount>,
    pub price_per_page: Option<Amount>,
    pub active: Option<bool>,
}

#[derive(Debug, Clone)]
pub struct NewPayment {
    pub order_id: Uuid,
    pub user_id: Uuid,
    pub reference_no: Option<String>,
    pub amount: Amount,
    pub payment_method: PaymentMethod,
    pub status: PaymentStatus,
    pub receipt_ref: Option<String>,
}

#[derive(Debug, Clone)]
pub struct AuditEntry {
    pub user_id: Option<Uuid>,
    pub action: String,
    pub resource: Option<String>,
    pub metadata: Option<Value>,
}

#[async_trait]
pub trait Store: Send + Sync {
    fn backend(&self) -> &'static str;

    async fn create_user(&self, user: NewUser) -> Result<User, StoreError>;
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;
    async fn get_user(&self, id: Uuid) -> Result<Option<User>, StoreError>;
    async fn update_profile(&self, id: Uuid, patch: ProfilePatch)
    -> Result<Option<User>, StoreError>;

    async fn list_services(&self, active_only: bool) -> Result<Vec<Service>, StoreError>;
    async fn get_service(&self, id: Uuid) -> Result<Option<Service>, StoreError>;
    async fn create_service(&self, service: NewService) -> Result<Service, StoreError>;
    async fn update_service(
        &self,
        id: Uuid,
        patch: ServicePatch,
    ) -> Result<Option<Service>, StoreError>;

    /// Persists a draft and returns the new order id. A draft whose user
    /// already stored its idempotency key yields that existing order id.
    async fn create_order(&self, draft: &OrderDraft) -> Result<Uuid, StoreError>;
    async fn get_order(&self, id: Uuid) -> Result<Option<Order>, StoreError>;
    async fn list_orders(
        &self,
        filter: &OrderFilter,
        page: PageRequest,
    ) -> Result<Page<Order>, StoreError>;
    async fn update_order(&self, id: Uuid, patch: OrderPatch)
    -> Result<Option<Order>, StoreError>;

    async fn create_payment(&self, payment: NewPayment) -> Result<Payment, StoreError>;
    async fn get_payment(&self, id: Uuid) -> Result<Option<Payment>, StoreError>;
    async fn list_payments(
        &self,
        filter: &PaymentFilter,
        page: PageRequest,
    ) -> Result<Page<Payment>, StoreError>;
    async fn update_payment_status(
        &self,
        id: Uuid,
        status: PaymentStatus,
    ) -> Result<Option<Payment>, StoreError>;

    async fn record_audit(&self, entry: AuditEntry) -> Result<(), StoreError>;
}

/// Human-facing order number, e.g. `ORD-20261019-1a2b3c4d`.
pub fn build_order_number(order_id: Uuid) -> String {
    let date = Utc::now().format("%Y%m%d");
    let suffix = order_id.simple().to_string();
    format!("ORD-{}-{}", date, &suffix[..8])
}
