use std::sync::Arc;

use axum::{extract::Request, http::header, middleware::Next, response::IntoResponse};
use axum_extra::extract::CookieJar;
use uuid::Uuid;

use crate::{AppState, Error, Result};

/// Legacy header used by the web client.
pub const AUTH_TOKEN_HEADER: &str = "x-auth-token";

/// Identity resolved from the request token. Only the id is verified; the
/// user record is looked up by the operations that need it.
#[derive(Debug, Clone, Copy)]
pub struct AuthenticatedUser {
    pub user_id: Uuid,
}

pub async fn auth(mut req: Request, next: Next) -> Result<impl IntoResponse> {
    let app_state = req
        .extensions()
        .get::<Arc<AppState>>()
        .cloned()
        .ok_or(Error::InternalServerError)?;

    let cookies = CookieJar::from_headers(req.headers());

    let token = cookies
        .get("token")
        .map(|c| c.value().to_string())
        .or_else(|| {
            req.headers()
                .get(header::AUTHORIZATION)
                .and_then(|auth_header| auth_header.to_str().ok())
                .and_then(|auth_value| {
                    auth_value
                        .strip_prefix("Bearer ")
                        .map(|stripped| stripped.to_string())
                })
        })
        .or_else(|| {
            req.headers()
                .get(AUTH_TOKEN_HEADER)
                .and_then(|value| value.to_str().ok())
                .map(|value| value.to_string())
        });

    let token = token.ok_or(Error::Unauthorized("No token, authorization denied"))?;

    let user_id = app_state.auth_service.decode_token(token).map_err(|err| {
        tracing::debug!("Rejected token: {:?}", err);
        Error::Unauthorized("Token is not valid")
    })?;

    req.extensions_mut().insert(AuthenticatedUser { user_id });

    Ok(next.run(req).await)
}
