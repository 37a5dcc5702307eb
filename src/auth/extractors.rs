use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use tracing::{debug, warn};

use super::{
    basic,
    services::{authenticate, AuthError},
};
use crate::{error::ApiError, state::AppState, users::repo_types::User};

/// The user whose Basic credentials accompany the request.
pub struct AuthUser(pub User);

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let credentials = basic::from_headers(&parts.headers);

        match authenticate(state.users.as_ref(), credentials).await {
            Ok(user) => {
                debug!(user_id = user.id, "authenticated");
                Ok(AuthUser(user))
            }
            Err(AuthError::Store(e)) => Err(e.into()),
            Err(AuthError::Hash(e)) => Err(ApiError::Internal(e)),
            Err(reason) => {
                warn!(%reason, path = %parts.uri.path(), "access denied");
                Err(ApiError::Unauthenticated)
            }
        }
    }
}
