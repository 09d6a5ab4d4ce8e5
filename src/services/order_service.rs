use uuid::Uuid;

use crate::{
    audit::log_audit,
    dto::orders::{OrderList, OrderRequest, OrderView, QuoteResponse, SubmitOrderResponse},
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, session_for},
    models::{Order, Service},
    ordering::{
        OrderForm, RecordingNavigator, ServiceCatalog, SubmissionController, pricing,
    },
    response::{ApiResponse, Meta},
    routes::params::{OrderListQuery, SortOrder},
    state::AppState,
    store::OrderFilter,
};

/// Resolves a requested service against the active catalog.
fn resolve_service(catalog: &ServiceCatalog, id: Option<Uuid>) -> AppResult<Option<Service>> {
    match id {
        None => Ok(None),
        Some(id) => catalog
            .find(id)
            .cloned()
            .map(Some)
            .ok_or_else(|| AppError::BadRequest(format!("Unknown service {}", id))),
    }
}

fn build_form(catalog: &ServiceCatalog, payload: OrderRequest) -> AppResult<OrderForm> {
    let mut form = OrderForm::new();
    form.select_service(resolve_service(catalog, payload.service_id)?);
    form.set_options(payload.print_options);
    form.set_notes(payload.notes);
    form.set_pickup_at(payload.pickup_at);
    for document in payload.documents {
        let name = document.name.clone();
        if !form.attach_document(document) {
            return Err(AppError::BadRequest(format!(
                "Unsupported document {}; use PDF, DOC or DOCX",
                name
            )));
        }
    }
    Ok(form)
}

pub async fn quote(state: &AppState, payload: OrderRequest) -> AppResult<ApiResponse<QuoteResponse>> {
    let catalog = ServiceCatalog::load(state.store.as_ref()).await?;
    let service = resolve_service(&catalog, payload.service_id)?;
    let breakdown = pricing::breakdown(service.as_ref(), &payload.print_options);

    Ok(ApiResponse::success(
        "OK",
        QuoteResponse {
            service_id: service.map(|s| s.id),
            total_amount: breakdown.total(),
            breakdown,
        },
        Some(Meta::empty()),
    ))
}

/// Runs one submission for the caller. A key the caller already used returns
/// the order created by their first attempt. Keys never match across users.
pub async fn submit_order(
    state: &AppState,
    user: Option<&AuthUser>,
    idempotency_key: Option<Uuid>,
    payload: OrderRequest,
) -> AppResult<ApiResponse<SubmitOrderResponse>> {
    let catalog = ServiceCatalog::load(state.store.as_ref()).await?;
    let form = build_form(&catalog, payload)?;
    let session = session_for(state, user).await?;

    let mut controller =
        SubmissionController::new(state.store.clone(), session, RecordingNavigator::default())
            .with_confirmation_delay(state.config.submit_confirmation_delay);
    if let Some(key) = idempotency_key {
        controller = controller.with_idempotency_key(key);
    }

    let order_id = controller.submit(&form).await?;
    let order = state
        .store
        .get_order(order_id)
        .await?
        .filter(|order| user.is_some_and(|u| u.user_id == order.user_id))
        .ok_or(AppError::NotFound)?;

    log_audit(
        state.store.as_ref(),
        Some(order.user_id),
        "order_submit",
        Some("orders"),
        Some(serde_json::json!({
            "order_id": order.id,
            "idempotency_key": controller.idempotency_key(),
        })),
    )
    .await;

    let redirect_to = controller.navigator().last().map(|route| route.path());
    let message = controller.message();
    Ok(ApiResponse::success(
        "Order submitted",
        SubmitOrderResponse {
            order: order.into(),
            redirect_to,
            message,
        },
        Some(Meta::empty()),
    ))
}

pub fn order_filter(user_id: Option<Uuid>, query: &OrderListQuery) -> OrderFilter {
    OrderFilter {
        user_id,
        status: query.status,
        search: query
            .q
            .as_ref()
            .map(|q| q.trim().to_string())
            .filter(|q| !q.is_empty()),
        oldest_first: matches!(query.sort_order, Some(SortOrder::Asc)),
    }
}

pub async fn list_orders(
    state: &AppState,
    user: &AuthUser,
    query: OrderListQuery,
) -> AppResult<ApiResponse<OrderList>> {
    let (page, per_page, request) = query.pagination().request();
    let filter = order_filter(Some(user.user_id), &query);
    let result = state.store.list_orders(&filter, request).await?;

    let meta = Meta::for_page(page, per_page, &result);
    let items = result.items.into_iter().map(OrderView::from).collect();
    Ok(ApiResponse::success("Ok", OrderList { items }, Some(meta)))
}

/// Loads an order owned by `user`; other users' orders read as missing.
pub async fn find_own_order(state: &AppState, user: &AuthUser, id: Uuid) -> AppResult<Order> {
    match state.store.get_order(id).await? {
        Some(order) if order.user_id == user.user_id => Ok(order),
        _ => Err(AppError::NotFound),
    }
}

pub async fn get_order(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<OrderView>> {
    let order = find_own_order(state, user, id).await?;
    Ok(ApiResponse::success("OK", order.into(), Some(Meta::empty())))
}
