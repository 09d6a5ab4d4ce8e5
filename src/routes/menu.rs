use axum::{Json, Router, extract::State, routing::get};

use crate::{
    dto::menu::MenuResponse,
    error::AppResult,
    identity::Identity,
    menu::{Role, menu_for},
    middleware::auth::{AuthUser, session_for},
    response::{ApiResponse, Meta},
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(get_menu))
}

#[utoipa::path(
    get,
    path = "/api/menu",
    responses(
        (status = 200, description = "Navigation menu for the caller's role", body = ApiResponse<MenuResponse>),
        (status = 401, description = "Invalid token")
    ),
    tag = "Menu"
)]
pub async fn get_menu(
    State(state): State<AppState>,
    user: Option<AuthUser>,
) -> AppResult<Json<ApiResponse<MenuResponse>>> {
    let session = session_for(&state, user.as_ref()).await?;
    let role = Role::of(session.current_user_value().as_ref());
    let data = MenuResponse {
        role,
        entries: menu_for(role),
    };
    Ok(Json(ApiResponse::success("OK", data, Some(Meta::empty()))))
}
