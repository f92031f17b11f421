use std::sync::Arc;

use axum::{
    http::{header, HeaderValue, Method, StatusCode},
    response::IntoResponse,
    routing::post,
    Extension, Json, Router,
};
use tower_cookies::Cookie;
use tower_http::cors::{Any, CorsLayer};

use crate::{
    config::Config,
    extractors::JsonBody,
    middleware::AUTH_TOKEN_HEADER,
    models::users::{LoginUserDto, RegisterUserDto, UserLoginResponseDto},
    AppState, Error, Result,
};

pub fn auth_handler() -> Router {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
}

pub fn configure_cors(config: &Config) -> Result<CorsLayer> {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([
            header::AUTHORIZATION,
            header::CONTENT_TYPE,
            header::HeaderName::from_static(AUTH_TOKEN_HEADER),
        ]);

    match &config.cors_origin {
        Some(origin) => {
            let origin = origin
                .parse::<HeaderValue>()
                .map_err(|_| Error::Config(format!("invalid CORS_ORIGIN {origin:?}")))?;
            Ok(layer.allow_origin(origin).allow_credentials(true))
        }
        None => Ok(layer.allow_origin(Any)),
    }
}

fn token_cookie(token: String, max_age_minutes: i64) -> Cookie<'static> {
    Cookie::build(("token", token))
        .path("/")
        .max_age(time::Duration::minutes(max_age_minutes))
        .http_only(true)
        .build()
}

pub async fn register(
    Extension(app_state): Extension<Arc<AppState>>,
    JsonBody(new_user): JsonBody<RegisterUserDto>,
) -> Result<impl IntoResponse> {
    let user = app_state.auth_service.register(new_user).await?;
    let token = app_state.auth_service.generate_token(user.id)?;

    Ok((
        StatusCode::CREATED,
        Json(UserLoginResponseDto {
            status: "success".to_string(),
            token,
        }),
    ))
}

pub async fn login(
    Extension(app_state): Extension<Arc<AppState>>,
    JsonBody(credentials): JsonBody<LoginUserDto>,
) -> Result<impl IntoResponse> {
    let token = app_state.auth_service.login(credentials).await?;

    let cookie = token_cookie(token.clone(), app_state.config.jwt_maxage);
    let cookie = HeaderValue::from_str(&cookie.to_string())
        .map_err(|_| Error::InternalServerError)?;

    let mut response = Json(UserLoginResponseDto {
        status: "success".to_string(),
        token,
    })
    .into_response();
    response.headers_mut().append(header::SET_COOKIE, cookie);

    Ok(response)
}
