use uuid::Uuid;

use crate::{
    audit::log_audit,
    dto::{
        orders::{OrderList, OrderView, UpdateOrderStatusRequest},
        payments::{PaymentList, PaymentView, VerifyPaymentRequest},
        services::{CreateServiceRequest, ServiceList, UpdateServiceRequest},
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_admin},
    models::{PaymentStatus, Service},
    ordering::pricing::MAX_UNIT_PRICE,
    response::{ApiResponse, Meta},
    routes::params::{OrderListQuery, PaymentListQuery},
    services::{order_service::order_filter, payment_service},
    state::AppState,
    store::{NewService, OrderPatch, PaymentFilter, ServicePatch},
};

pub async fn list_all_orders(
    state: &AppState,
    user: &AuthUser,
    query: OrderListQuery,
) -> AppResult<ApiResponse<OrderList>> {
    ensure_admin(user)?;
    let (page, per_page, request) = query.pagination().request();
    let filter = order_filter(None, &query);
    let result = state.store.list_orders(&filter, request).await?;

    let meta = Meta::for_page(page, per_page, &result);
    let items = result.items.into_iter().map(OrderView::from).collect();
    Ok(ApiResponse::success("Orders", OrderList { items }, Some(meta)))
}

pub async fn get_order_admin(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<OrderView>> {
    ensure_admin(user)?;
    let order = state.store.get_order(id).await?.ok_or(AppError::NotFound)?;
    Ok(ApiResponse::success("OK", order.into(), Some(Meta::empty())))
}

pub async fn update_order_status(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateOrderStatusRequest,
) -> AppResult<ApiResponse<OrderView>> {
    ensure_admin(user)?;
    let order = state
        .store
        .update_order(
            id,
            OrderPatch {
                status: Some(payload.status),
                ..Default::default()
            },
        )
        .await?
        .ok_or(AppError::NotFound)?;

    log_audit(
        state.store.as_ref(),
        Some(user.user_id),
        "order_status_update",
        Some("orders"),
        Some(serde_json::json!({ "order_id": order.id, "status": order.status })),
    )
    .await;

    Ok(ApiResponse::success(
        "Order status updated",
        order.into(),
        Some(Meta::empty()),
    ))
}

pub async fn list_services(state: &AppState, user: &AuthUser) -> AppResult<ApiResponse<ServiceList>> {
    ensure_admin(user)?;
    let items = state.store.list_services(false).await?;
    let total = items.len() as i64;
    Ok(ApiResponse::success(
        "Services",
        ServiceList { items },
        Some(Meta::new(1, total, total)),
    ))
}

fn check_prices(base_price: Option<i64>, price_per_page: Option<i64>) -> AppResult<()> {
    if base_price.is_some_and(|p| p < 0) || price_per_page.is_some_and(|p| p < 0) {
        return Err(AppError::BadRequest("Prices cannot be negative".into()));
    }
    if base_price.is_some_and(|p| p > MAX_UNIT_PRICE)
        || price_per_page.is_some_and(|p| p > MAX_UNIT_PRICE)
    {
        return Err(AppError::BadRequest(
            "Prices cannot exceed 10,000,000.00".into(),
        ));
    }
    Ok(())
}

pub async fn create_service(
    state: &AppState,
    user: &AuthUser,
    payload: CreateServiceRequest,
) -> AppResult<ApiResponse<Service>> {
    ensure_admin(user)?;
    let name = payload.name.trim().to_string();
    if name.is_empty() {
        return Err(AppError::BadRequest("Service name is required".into()));
    }
    check_prices(Some(payload.base_price), Some(payload.price_per_page))?;

    let service = state
        .store
        .create_service(NewService {
            name,
            description: payload.description,
            base_price: payload.base_price,
            price_per_page: payload.price_per_page,
            active: payload.active,
        })
        .await?;

    log_audit(
        state.store.as_ref(),
        Some(user.user_id),
        "service_create",
        Some("services"),
        Some(serde_json::json!({ "service_id": service.id })),
    )
    .await;

    Ok(ApiResponse::success("Service created", service, Some(Meta::empty())))
}

pub async fn update_service(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateServiceRequest,
) -> AppResult<ApiResponse<Service>> {
    ensure_admin(user)?;
    check_prices(payload.base_price, payload.price_per_page)?;
    if payload.name.as_deref().is_some_and(|n| n.trim().is_empty()) {
        return Err(AppError::BadRequest("Service name is required".into()));
    }

    let patch = ServicePatch {
        name: payload.name.map(|n| n.trim().to_string()),
        description: payload.description,
        base_price: payload.base_price,
        price_per_page: payload.price_per_page,
        active: payload.active,
    };
    let service = state
        .store
        .update_service(id, patch)
        .await?
        .ok_or(AppError::NotFound)?;

    log_audit(
        state.store.as_ref(),
        Some(user.user_id),
        "service_update",
        Some("services"),
        Some(serde_json::json!({ "service_id": service.id })),
    )
    .await;

    Ok(ApiResponse::success("Service updated", service, Some(Meta::empty())))
}

pub async fn list_all_payments(
    state: &AppState,
    user: &AuthUser,
    query: PaymentListQuery,
) -> AppResult<ApiResponse<PaymentList>> {
    ensure_admin(user)?;
    let filter = PaymentFilter {
        status: query.status,
        ..Default::default()
    };
    payment_service::list_payments(state, filter, query.pagination()).await
}

/// Settles or rejects a payment and mirrors the outcome onto its order.
pub async fn verify_payment(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: VerifyPaymentRequest,
) -> AppResult<ApiResponse<PaymentView>> {
    ensure_admin(user)?;
    if payload.status == PaymentStatus::Pending {
        return Err(AppError::BadRequest(
            "Verification status must be paid or unpaid".into(),
        ));
    }

    let payment = state
        .store
        .update_payment_status(id, payload.status)
        .await?
        .ok_or(AppError::NotFound)?;

    state
        .store
        .update_order(
            payment.order_id,
            OrderPatch {
                payment_status: Some(payment.status),
                ..Default::default()
            },
        )
        .await?;

    log_audit(
        state.store.as_ref(),
        Some(user.user_id),
        "payment_verify",
        Some("payments"),
        Some(serde_json::json!({
            "payment_id": payment.id,
            "order_id": payment.order_id,
            "status": payment.status,
        })),
    )
    .await;

    Ok(ApiResponse::success(
        "Payment verified",
        payment.into(),
        Some(Meta::empty()),
    ))
}
