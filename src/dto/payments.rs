use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::{Amount, Payment, PaymentMethod, PaymentStatus, Severity};

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreatePaymentRequest {
    pub payment_method: PaymentMethod,
    pub reference_no: Option<String>,
    /// Location of an uploaded receipt; needs a reference number.
    pub receipt_ref: Option<String>,
    /// Defaults to the order total.
    pub amount: Option<Amount>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct VerifyPaymentRequest {
    pub status: PaymentStatus,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PaymentView {
    #[serde(flatten)]
    pub payment: Payment,
    pub status_severity: Severity,
}

impl From<Payment> for PaymentView {
    fn from(payment: Payment) -> Self {
        Self {
            status_severity: payment.status.severity(),
            payment,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PaymentList {
    pub items: Vec<PaymentView>,
}
