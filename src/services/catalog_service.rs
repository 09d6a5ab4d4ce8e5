use crate::{
    dto::services::ServiceList,
    error::AppResult,
    ordering::ServiceCatalog,
    response::{ApiResponse, Meta},
    state::AppState,
};

pub async fn list_active_services(state: &AppState) -> AppResult<ApiResponse<ServiceList>> {
    let catalog = ServiceCatalog::load(state.store.as_ref()).await?;
    let items = catalog.services().to_vec();
    let total = items.len() as i64;
    Ok(ApiResponse::success(
        "Ok",
        ServiceList { items },
        Some(Meta::new(1, total, total)),
    ))
}
