use axum::{
    extract::State,
    http::{header::LOCATION, StatusCode},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use tracing::{info, instrument};

use crate::{
    app::route_not_found,
    auth::{extractors::AuthUser, password::hash_password_async},
    error::ApiError,
    state::AppState,
    users::{
        dto::{CreateUserRequest, PublicUser},
        repo_types::NewUser,
    },
    validation::ValidJson,
};

pub fn user_routes() -> Router<AppState> {
    Router::new().route(
        "/users",
        get(get_user).post(create_user).fallback(route_not_found),
    )
}

#[instrument(skip_all)]
pub async fn get_user(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> Result<Json<PublicUser>, ApiError> {
    let current = state
        .users
        .find_by_id(user.id)
        .await?
        .ok_or(ApiError::Unauthenticated)?;
    Ok(Json(PublicUser::from(current)))
}

#[instrument(skip(state, payload))]
pub async fn create_user(
    State(state): State<AppState>,
    ValidJson(payload): ValidJson<CreateUserRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let password_hash = hash_password_async(payload.password.unwrap_or_default()).await?;

    let user = state
        .users
        .create(NewUser {
            first_name: payload.first_name.unwrap_or_default(),
            last_name: payload.last_name.unwrap_or_default(),
            email_address: payload.email_address.unwrap_or_default(),
            password_hash,
        })
        .await?;

    info!(user_id = user.id, email = %user.email_address, "user registered");
    Ok((StatusCode::CREATED, [(LOCATION, "/")]))
}
