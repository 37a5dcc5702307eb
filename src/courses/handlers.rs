use axum::{
    extract::{Path, State},
    http::{header::LOCATION, StatusCode},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use tracing::{info, instrument, warn};

use crate::{
    app::route_not_found,
    auth::extractors::AuthUser,
    courses::dto::{CourseDetails, CourseRequest},
    error::ApiError,
    state::AppState,
    validation::ValidJson,
};

pub fn course_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/courses",
            get(list_courses)
                .post(create_course)
                .fallback(route_not_found),
        )
        .route(
            "/courses/:id",
            get(get_course)
                .put(update_course)
                .delete(delete_course)
                .fallback(route_not_found),
        )
}

/// Ids that are not integers name no course.
fn course_id(raw: &str) -> Result<i64, ApiError> {
    raw.parse()
        .map_err(|_| ApiError::CourseNotFound(raw.to_string()))
}

#[instrument(skip(state))]
pub async fn list_courses(
    State(state): State<AppState>,
) -> Result<Json<Vec<CourseDetails>>, ApiError> {
    let rows = state.courses.list().await?;
    Ok(Json(rows.into_iter().map(CourseDetails::from).collect()))
}

#[instrument(skip(state))]
pub async fn get_course(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> Result<Json<CourseDetails>, ApiError> {
    let id = course_id(&raw_id)?;
    let row = state
        .courses
        .find_by_id(id)
        .await?
        .ok_or(ApiError::CourseNotFound(raw_id))?;
    Ok(Json(row.into()))
}

#[instrument(skip(state, user, payload))]
pub async fn create_course(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    ValidJson(payload): ValidJson<CourseRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let course = state.courses.create(user.id, payload.into()).await?;

    info!(course_id = course.id, user_id = user.id, "course created");
    Ok((
        StatusCode::CREATED,
        [(LOCATION, format!("/api/courses/{}", course.id))],
    ))
}

#[instrument(skip(state, user, payload))]
pub async fn update_course(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(raw_id): Path<String>,
    ValidJson(payload): ValidJson<CourseRequest>,
) -> Result<StatusCode, ApiError> {
    let id = course_id(&raw_id)?;
    let existing = state
        .courses
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::CourseNotFound(raw_id.clone()))?;

    if existing.course.user_id != user.id {
        warn!(course_id = id, user_id = user.id, owner_id = existing.course.user_id, "update by non-owner");
        return Err(ApiError::Forbidden);
    }

    if !state.courses.update(id, payload.into()).await? {
        return Err(ApiError::CourseNotFound(raw_id));
    }

    info!(course_id = id, user_id = user.id, "course updated");
    Ok(StatusCode::NO_CONTENT)
}

#[instrument(skip(state, user))]
pub async fn delete_course(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(raw_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id = course_id(&raw_id)?;
    let existing = state
        .courses
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::CourseNotFound(raw_id.clone()))?;

    if existing.course.user_id != user.id {
        warn!(course_id = id, user_id = user.id, owner_id = existing.course.user_id, "delete by non-owner");
        return Err(ApiError::Forbidden);
    }

    if !state.courses.delete(id).await? {
        return Err(ApiError::CourseNotFound(raw_id));
    }

    info!(course_id = id, user_id = user.id, "course deleted");
    Ok(StatusCode::NO_CONTENT)
}
