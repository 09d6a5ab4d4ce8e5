use uuid::Uuid;

use crate::{
    audit::log_audit,
    dto::payments::{CreatePaymentRequest, PaymentList, PaymentView},
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::PaymentStatus,
    response::{ApiResponse, Meta},
    routes::params::{Pagination, PaymentListQuery},
    services::order_service::find_own_order,
    state::AppState,
    store::{NewPayment, OrderPatch, PaymentFilter},
};

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Records a customer payment for one of their orders and marks the order
/// as awaiting verification.
pub async fn create_payment(
    state: &AppState,
    user: &AuthUser,
    order_id: Uuid,
    payload: CreatePaymentRequest,
) -> AppResult<ApiResponse<PaymentView>> {
    let order = find_own_order(state, user, order_id).await?;
    if order.payment_status == PaymentStatus::Paid {
        return Err(AppError::BadRequest("Order already paid".into()));
    }

    let reference_no = non_blank(payload.reference_no);
    let receipt_ref = non_blank(payload.receipt_ref);
    if receipt_ref.is_some() && reference_no.is_none() {
        return Err(AppError::BadRequest(
            "A reference number is required with a receipt".into(),
        ));
    }

    let amount = payload.amount.unwrap_or(order.total_amount);
    if amount <= 0 {
        return Err(AppError::BadRequest("Amount must be positive".into()));
    }

    let payment = state
        .store
        .create_payment(NewPayment {
            order_id: order.id,
            user_id: user.user_id,
            reference_no,
            amount,
            payment_method: payload.payment_method,
            status: PaymentStatus::Pending,
            receipt_ref,
        })
        .await?;

    state
        .store
        .update_order(
            order.id,
            OrderPatch {
                payment_status: Some(PaymentStatus::Pending),
                ..Default::default()
            },
        )
        .await?;

    log_audit(
        state.store.as_ref(),
        Some(user.user_id),
        "payment_create",
        Some("payments"),
        Some(serde_json::json!({ "order_id": order.id, "payment_id": payment.id })),
    )
    .await;

    Ok(ApiResponse::success(
        "Payment recorded",
        payment.into(),
        Some(Meta::empty()),
    ))
}

pub async fn list_payments(
    state: &AppState,
    filter: PaymentFilter,
    pagination: Pagination,
) -> AppResult<ApiResponse<PaymentList>> {
    let (page, per_page, request) = pagination.request();
    let result = state.store.list_payments(&filter, request).await?;

    let meta = Meta::for_page(page, per_page, &result);
    let items = result.items.into_iter().map(PaymentView::from).collect();
    Ok(ApiResponse::success("Ok", PaymentList { items }, Some(meta)))
}

pub async fn payment_history(
    state: &AppState,
    user: &AuthUser,
    query: PaymentListQuery,
) -> AppResult<ApiResponse<PaymentList>> {
    let filter = PaymentFilter {
        user_id: Some(user.user_id),
        status: query.status,
        ..Default::default()
    };
    list_payments(state, filter, query.pagination()).await
}

pub async fn pending_payments(
    state: &AppState,
    user: &AuthUser,
    pagination: Pagination,
) -> AppResult<ApiResponse<PaymentList>> {
    let filter = PaymentFilter {
        user_id: Some(user.user_id),
        status: Some(PaymentStatus::Pending),
        ..Default::default()
    };
    list_payments(state, filter, pagination).await
}
