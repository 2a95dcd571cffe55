use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use uuid::Uuid;

use super::services::authenticate;
use crate::{error::AppError, state::AppState};

/// Validates the bearer token and resolves it to an existing user ID.
/// Any handler taking this argument is unreachable without a valid token.
pub struct AuthUser(pub Uuid);

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        // Read Authorization header
        let header = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .map(|h| {
                h.to_str()
                    .map_err(|_| AppError::unauthenticated("Invalid Authorization header"))
            })
            .transpose()?;

        let user_id = authenticate(state, header).await?;
        Ok(AuthUser(user_id))
    }
}
