use std::sync::Arc;

use axum::{
    extract::Path,
    middleware,
    response::IntoResponse,
    routing::{delete, get, put},
    Extension, Json, Router,
};

use crate::{
    extractors::JsonBody,
    middleware::{auth, AuthenticatedUser},
    models::{
        profile::{EducationDto, ExperienceDto, ProfileDto},
        response::MessageResponse,
    },
    AppState, Result,
};

pub fn profile_handler() -> Router {
    Router::new()
        .route(
            "/",
            get(get_profiles).post(upsert_profile).delete(delete_profile),
        )
        .route("/me", get(get_my_profile))
        .route("/user/{user_id}", get(get_profile_by_user))
        .route("/experience", put(add_experience))
        .route("/experience/{exp_id}", delete(delete_experience))
        .route("/education", put(add_education))
        .route("/education/{edu_id}", delete(delete_education))
        .layer(middleware::from_fn(auth))
}

async fn get_my_profile(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(caller): Extension<AuthenticatedUser>,
) -> Result<impl IntoResponse> {
    let profile = app_state
        .profile_service
        .get_my_profile(caller.user_id)
        .await?;
    Ok(Json(profile))
}

async fn get_profiles(Extension(app_state): Extension<Arc<AppState>>) -> Result<impl IntoResponse> {
    let profiles = app_state.profile_service.get_profiles().await?;
    Ok(Json(profiles))
}

async fn get_profile_by_user(
    Extension(app_state): Extension<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> Result<impl IntoResponse> {
    let profile = app_state
        .profile_service
        .get_profile_by_user(&user_id)
        .await?;
    Ok(Json(profile))
}

async fn upsert_profile(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(caller): Extension<AuthenticatedUser>,
    JsonBody(fields): JsonBody<ProfileDto>,
) -> Result<impl IntoResponse> {
    let profile = app_state
        .profile_service
        .upsert_profile(caller.user_id, fields)
        .await?;
    Ok(Json(profile))
}

async fn delete_profile(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(caller): Extension<AuthenticatedUser>,
) -> Result<impl IntoResponse> {
    app_state
        .profile_service
        .delete_profile(caller.user_id)
        .await?;
    Ok(Json(MessageResponse::new("Profile deleted")))
}

async fn add_experience(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(caller): Extension<AuthenticatedUser>,
    JsonBody(entry): JsonBody<ExperienceDto>,
) -> Result<impl IntoResponse> {
    let profile = app_state
        .profile_service
        .add_experience(caller.user_id, entry)
        .await?;
    Ok(Json(profile))
}

async fn delete_experience(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(caller): Extension<AuthenticatedUser>,
    Path(exp_id): Path<String>,
) -> Result<impl IntoResponse> {
    let profile = app_state
        .profile_service
        .delete_experience(caller.user_id, &exp_id)
        .await?;
    Ok(Json(profile))
}

async fn add_education(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(caller): Extension<AuthenticatedUser>,
    JsonBody(entry): JsonBody<EducationDto>,
) -> Result<impl IntoResponse> {
    let profile = app_state
        .profile_service
        .add_education(caller.user_id, entry)
        .await?;
    Ok(Json(profile))
}

async fn delete_education(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(caller): Extension<AuthenticatedUser>,
    Path(edu_id): Path<String>,
) -> Result<impl IntoResponse> {
    let profile = app_state
        .profile_service
        .delete_education(caller.user_id, &edu_id)
        .await?;
    Ok(Json(profile))
}
