use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    routing::{get, post},
};
use uuid::Uuid;

use crate::{
    dto::{
        orders::{OrderList, OrderRequest, OrderView, QuoteResponse, SubmitOrderResponse},
        payments::{CreatePaymentRequest, PaymentView},
    },
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    response::ApiResponse,
    routes::params::OrderListQuery,
    services::{order_service, payment_service},
    state::AppState,
};

pub const IDEMPOTENCY_KEY_HEADER: &str = "idempotency-key";

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_orders).post(submit_order))
        .route("/quote", post(quote))
        .route("/{id}", get(get_order))
        .route("/{id}/payments", post(create_payment))
}

fn idempotency_key(headers: &HeaderMap) -> AppResult<Option<Uuid>> {
    let Some(value) = headers.get(IDEMPOTENCY_KEY_HEADER) else {
        return Ok(None);
    };
    value
        .to_str()
        .ok()
        .and_then(|v| Uuid::parse_str(v.trim()).ok())
        .map(Some)
        .ok_or_else(|| AppError::BadRequest("Idempotency-Key must be a UUID".into()))
}

#[utoipa::path(
    post,
    path = "/api/orders/quote",
    request_body = OrderRequest,
    responses(
        (status = 200, description = "Estimated total with its breakdown", body = ApiResponse<QuoteResponse>),
        (status = 400, description = "Unknown service")
    ),
    tag = "Orders"
)]
pub async fn quote(
    State(state): State<AppState>,
    Json(payload): Json<OrderRequest>,
) -> AppResult<Json<ApiResponse<QuoteResponse>>> {
    let resp = order_service::quote(&state, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/orders",
    request_body = OrderRequest,
    params(
        ("Idempotency-Key" = Option<String>, Header, description = "UUID reused when retrying the same submission")
    ),
    responses(
        (status = 201, description = "Order submitted", body = ApiResponse<SubmitOrderResponse>),
        (status = 400, description = "No service selected or unsupported document"),
        (status = 401, description = "Not signed in"),
        (status = 500, description = "Order could not be stored")
    ),
    security(("bearer_auth" = [])),
    tag = "Orders"
)]
pub async fn submit_order(
    State(state): State<AppState>,
    user: Option<AuthUser>,
    headers: HeaderMap,
    Json(payload): Json<OrderRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<SubmitOrderResponse>>)> {
    let key = idempotency_key(&headers)?;
    let resp = order_service::submit_order(&state, user.as_ref(), key, payload).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(
    get,
    path = "/api/orders",
    params(OrderListQuery),
    responses(
        (status = 200, description = "Caller's orders", body = ApiResponse<OrderList>),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "Orders"
)]
pub async fn list_orders(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<OrderListQuery>,
) -> AppResult<Json<ApiResponse<OrderList>>> {
    let resp = order_service::list_orders(&state, &user, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/orders/{id}",
    params(("id" = Uuid, Path, description = "Order id")),
    responses(
        (status = 200, description = "Order detail", body = ApiResponse<OrderView>),
        (status = 404, description = "Not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Orders"
)]
pub async fn get_order(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<OrderView>>> {
    let resp = order_service::get_order(&state, &user, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/orders/{id}/payments",
    params(("id" = Uuid, Path, description = "Order id")),
    request_body = CreatePaymentRequest,
    responses(
        (status = 201, description = "Payment recorded", body = ApiResponse<PaymentView>),
        (status = 400, description = "Invalid payment"),
        (status = 404, description = "Order not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Payments"
)]
pub async fn create_payment(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<CreatePaymentRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<PaymentView>>)> {
    let resp = payment_service::create_payment(&state, &user, id, payload).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}
