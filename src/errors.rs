use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::error;
use validator::ValidationErrors;

pub type Result<T> = core::result::Result<T, Error>;

#[derive(Debug)]
pub enum Error {
    NotFound(&'static str),
    Unauthorized(&'static str),
    Forbidden(&'static str),
    Conflict(&'static str),
    BadRequest(String),
    Validation(ValidationErrors),
    InternalServerError,
    Config(String),
    DatabaseError(sqlx::Error),
    InvalidHashFormat(argon2::password_hash::Error),
}

impl Error {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            // Ownership failures have always been answered with 400 on this API.
            Self::Forbidden(_) | Self::Conflict(_) | Self::BadRequest(_) => {
                StatusCode::BAD_REQUEST
            }
            Self::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::InternalServerError
            | Self::Config(_)
            | Self::DatabaseError(_)
            | Self::InvalidHashFormat(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status();

        let body = match self {
            Self::NotFound(msg)
            | Self::Unauthorized(msg)
            | Self::Forbidden(msg)
            | Self::Conflict(msg) => json!({ "msg": msg }),
            Self::BadRequest(ref msg) => json!({ "msg": msg }),
            Self::Validation(ref errors) => json!({ "errors": validation_messages(errors) }),
            Self::InternalServerError
            | Self::Config(_)
            | Self::DatabaseError(_)
            | Self::InvalidHashFormat(_) => json!({ "msg": "Server Error" }),
        };

        (status, Json(body)).into_response()
    }
}

fn validation_messages(errors: &ValidationErrors) -> Vec<serde_json::Value> {
    let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
    fields.sort_by(|a, b| a.0.cmp(&b.0));

    fields
        .into_iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |e| {
                let msg = e
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| "Invalid value".to_string());
                json!({ "msg": msg, "param": field.to_string(), "location": "body" })
            })
        })
        .collect()
}

impl From<ValidationErrors> for Error {
    fn from(errors: ValidationErrors) -> Self {
        Self::Validation(errors)
    }
}

impl From<sqlx::Error> for Error {
    fn from(err: sqlx::Error) -> Self {
        error!("Database error: {:?}", err);
        Self::DatabaseError(err)
    }
}

impl From<sqlx::migrate::MigrateError> for Error {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        error!("Migration error: {:?}", err);
        Self::DatabaseError(err.into())
    }
}

impl From<argon2::password_hash::Error> for Error {
    fn from(err: argon2::password_hash::Error) -> Self {
        error!("Invalid hash format");
        Self::InvalidHashFormat(err)
    }
}

#[cfg(test)]
mod tests {
    use axum::body::to_bytes;
    use serde_json::Value;
    use validator::Validate;

    use super::*;

    #[derive(Validate)]
    struct Body {
        #[validate(length(min = 1, message = "Text is required"))]
        text: String,
    }

    async fn body_of(err: Error) -> (StatusCode, Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn validation_errors_are_unprocessable_with_field_list() {
        let errs = Body {
            text: String::new(),
        }
        .validate()
        .unwrap_err();

        let (status, body) = body_of(errs.into()).await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["errors"][0]["msg"], "Text is required");
        assert_eq!(body["errors"][0]["param"], "text");
        assert_eq!(body["errors"][0]["location"], "body");
    }

    #[tokio::test]
    async fn unexpected_errors_do_not_leak_details() {
        let (status, body) = body_of(Error::Config("JWT_SECRET missing".into())).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["msg"], "Server Error");
    }

    #[test]
    fn ownership_and_conflict_map_to_bad_request() {
        assert_eq!(Error::Forbidden("x").status(), StatusCode::BAD_REQUEST);
        assert_eq!(Error::Conflict("x").status(), StatusCode::BAD_REQUEST);
        assert_eq!(Error::NotFound("x").status(), StatusCode::NOT_FOUND);
    }
}
