use axum::{Json, Router, extract::State, routing::get};

use crate::{
    dto::services::ServiceList, error::AppResult, response::ApiResponse,
    services::catalog_service, state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(list_services))
}

#[utoipa::path(
    get,
    path = "/api/services",
    responses(
        (status = 200, description = "Active print services", body = ApiResponse<ServiceList>)
    ),
    tag = "Services"
)]
pub async fn list_services(
    State(state): State<AppState>,
) -> AppResult<Json<ApiResponse<ServiceList>>> {
    let resp = catalog_service::list_active_services(&state).await?;
    Ok(Json(resp))
}
