use std::sync::Arc;

use axum::{middleware, response::IntoResponse, routing::get, Extension, Json, Router};

use crate::{
    middleware::{auth, AuthenticatedUser},
    models::users::{FilterUserDto, UserData, UserResponseDto},
    AppState, Result,
};

pub fn users_handler() -> Router {
    Router::new()
        .route("/me", get(get_me))
        .layer(middleware::from_fn(auth))
}

async fn get_me(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(caller): Extension<AuthenticatedUser>,
) -> Result<impl IntoResponse> {
    let user = app_state.users_service.get_user(caller.user_id).await?;

    let response_data = UserResponseDto {
        status: "success".to_string(),
        data: UserData {
            user: FilterUserDto::filter_user(&user),
        },
    };

    Ok(Json(response_data))
}
