use crate::{
    audit::log_audit,
    dto::profile::UpdateProfileRequest,
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, session_for},
    models::User,
    response::{ApiResponse, Meta},
    state::AppState,
    store::ProfilePatch,
};

fn clean(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string())
}

pub async fn get_profile(state: &AppState, user: &AuthUser) -> AppResult<ApiResponse<User>> {
    let mut session = session_for(state, Some(user)).await?;
    let profile = session
        .load_profile(state.store.as_ref())
        .await?
        .cloned()
        .ok_or(AppError::NotFound)?;
    Ok(ApiResponse::success("OK", profile, Some(Meta::empty())))
}

pub async fn update_profile(
    state: &AppState,
    user: &AuthUser,
    payload: UpdateProfileRequest,
) -> AppResult<ApiResponse<User>> {
    let name = clean(payload.name);
    if name.as_deref() == Some("") {
        return Err(AppError::BadRequest("Name cannot be empty".into()));
    }
    let patch = ProfilePatch {
        name,
        phone: clean(payload.phone),
        address: clean(payload.address),
    };

    let mut session = session_for(state, Some(user)).await?;
    let updated = state
        .store
        .update_profile(user.user_id, patch)
        .await?
        .ok_or(AppError::NotFound)?;
    session.cache_profile(updated.clone());

    log_audit(
        state.store.as_ref(),
        Some(user.user_id),
        "profile_update",
        Some("users"),
        None,
    )
    .await;
    Ok(ApiResponse::success("Profile updated", updated, Some(Meta::empty())))
}
