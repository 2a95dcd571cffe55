use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    auth::{
        password::{hash_password, verify_password},
        services::validate_new_password,
    },
    error::{AppError, AppResult},
    profile::{dto::ProfileResponse, repo_types::ProfileUpdate},
    state::AppState,
};

pub async fn get_profile(st: &AppState, user_id: Uuid) -> AppResult<ProfileResponse> {
    let user = st
        .store
        .find_user(user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".into()))?;
    let watchlist = st.store.list_watchlist(user_id).await?;
    let history = st.store.watch_history(user_id).await?;
    Ok(ProfileResponse::new(user, watchlist, history))
}

/// Applies only the supplied fields.
pub async fn update_profile(
    st: &AppState,
    user_id: Uuid,
    update: ProfileUpdate,
) -> AppResult<ProfileResponse> {
    if matches!(update.name.as_deref(), Some("")) {
        return Err(AppError::validation("Name cannot be empty"));
    }
    if matches!(update.profile_color.as_deref(), Some("")) {
        return Err(AppError::validation("Profile color cannot be empty"));
    }

    if !update.is_empty() {
        st.store.update_profile(user_id, &update).await?;
        info!(user_id = %user_id, "profile updated");
    }
    get_profile(st, user_id).await
}

/// Requires the current password even though the caller is already
/// authenticated; a bearer token alone cannot replace the password.
pub async fn change_password(
    st: &AppState,
    user_id: Uuid,
    old_password: &str,
    new_password: &str,
) -> AppResult<()> {
    if old_password.is_empty() {
        return Err(AppError::validation("Old password is required"));
    }
    validate_new_password(new_password)?;

    let user = st
        .store
        .find_user(user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".into()))?;

    if !verify_password(old_password, &user.password_hash)? {
        warn!(user_id = %user_id, "change password: wrong old password");
        return Err(AppError::InvalidCredentials);
    }

    let new_hash = hash_password(new_password)?;
    let swapped = st
        .store
        .replace_password_hash(user_id, &user.password_hash, &new_hash)
        .await?;
    if !swapped {
        // Someone else changed the password between our read and write.
        warn!(user_id = %user_id, "change password: hash changed concurrently");
        return Err(AppError::InvalidCredentials);
    }

    info!(user_id = %user_id, "password updated");
    Ok(())
}
