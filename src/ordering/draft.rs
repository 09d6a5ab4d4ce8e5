use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

use crate::{
    identity::CurrentUser,
    models::{Amount, OrderStatus, PaymentStatus, Service},
};

use super::{form::DocumentRef, options::PrintOptions, pricing};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum OrderValidationError {
    #[error("Please select a service.")]
    MissingService,
    #[error("Please sign in to place an order.")]
    NotAuthenticated,
}

/// An order payload that has not been persisted yet.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderDraft {
    pub idempotency_key: Uuid,
    pub user_id: Uuid,
    pub service_id: Uuid,
    pub status: OrderStatus,
    pub payment_status: PaymentStatus,
    pub total_amount: Amount,
    pub print_options: PrintOptions,
    pub notes: Option<String>,
    pub pickup_at: Option<DateTime<Utc>>,
    pub documents: Vec<DocumentRef>,
}

/// Assembles the payload for a new order.
///
/// The total always comes from the pricing calculator; callers cannot
/// supply one.
pub fn build(
    current_user: Option<&CurrentUser>,
    service: Option<&Service>,
    options: &PrintOptions,
    notes: &str,
) -> Result<OrderDraft, OrderValidationError> {
    let service = service.ok_or(OrderValidationError::MissingService)?;
    let user = current_user.ok_or(OrderValidationError::NotAuthenticated)?;

    let notes = notes.trim();
    Ok(OrderDraft {
        idempotency_key: Uuid::new_v4(),
        user_id: user.id,
        service_id: service.id,
        status: OrderStatus::Pending,
        payment_status: PaymentStatus::Unpaid,
        total_amount: pricing::estimate(Some(service), options),
        print_options: *options,
        notes: (!notes.is_empty()).then(|| notes.to_string()),
        pickup_at: None,
        documents: Vec::new(),
    })
}

impl OrderDraft {
    pub fn with_idempotency_key(mut self, key: Uuid) -> Self {
        self.idempotency_key = key;
        self
    }

    pub fn with_pickup_at(mut self, pickup_at: Option<DateTime<Utc>>) -> Self {
        self.pickup_at = pickup_at;
        self
    }

    pub fn with_documents(mut self, documents: Vec<DocumentRef>) -> Self {
        self.documents = documents;
        self
    }
}
