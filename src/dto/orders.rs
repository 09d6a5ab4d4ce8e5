use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    models::{Amount, Order, OrderStatus, Severity},
    ordering::{DocumentRef, PrintOptions, pricing::PriceBreakdown, submission::FormMessage},
};

/// Body shared by the quote and submit endpoints.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct OrderRequest {
    pub service_id: Option<Uuid>,
    #[serde(default)]
    pub print_options: PrintOptions,
    #[serde(default)]
    pub notes: String,
    pub pickup_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub documents: Vec<DocumentRef>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct QuoteResponse {
    pub service_id: Option<Uuid>,
    pub breakdown: PriceBreakdown,
    pub total_amount: Amount,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderView {
    #[serde(flatten)]
    pub order: Order,
    pub status_severity: Severity,
    pub payment_status_severity: Severity,
}

impl From<Order> for OrderView {
    fn from(order: Order) -> Self {
        Self {
            status_severity: order.status.severity(),
            payment_status_severity: order.payment_status.severity(),
            order,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SubmitOrderResponse {
    pub order: OrderView,
    pub redirect_to: Option<String>,
    pub message: Option<FormMessage>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderList {
    pub items: Vec<OrderView>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateOrderStatusRequest {
    pub status: OrderStatus,
}
