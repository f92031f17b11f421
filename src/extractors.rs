use axum::{
    body::Bytes,
    extract::{FromRequest, Request},
};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use validator::{ValidationError, ValidationErrors};

use crate::{Error, Result};

/// JSON request body whose failures are reported like field validation.
///
/// An absent body reads as `{}` and `null` members read as absent, so a
/// missing required field reaches `validate()` instead of being rejected by
/// the deserializer. Bodies that still cannot be read come back as a 422
/// `errors` entry on `body`.
pub struct JsonBody<T>(pub T);

impl<S, T> FromRequest<S> for JsonBody<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = Error;

    async fn from_request(req: Request, state: &S) -> Result<Self> {
        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|rejection| Error::BadRequest(rejection.body_text()))?;

        let value = if bytes.iter().all(u8::is_ascii_whitespace) {
            Value::Object(Map::new())
        } else {
            serde_json::from_slice(&bytes)
                .map_err(|err| body_error(format!("Malformed JSON body: {err}")))?
        };

        let value = match value {
            Value::Null => Value::Object(Map::new()),
            Value::Object(fields) => {
                Value::Object(fields.into_iter().filter(|(_, v)| !v.is_null()).collect())
            }
            other => other,
        };

        serde_json::from_value(value)
            .map(JsonBody)
            .map_err(|err| body_error(err.to_string()))
    }
}

fn body_error(message: String) -> Error {
    let mut error = ValidationError::new("json");
    error.message = Some(message.into());

    let mut errors = ValidationErrors::new();
    errors.add("body", error);
    Error::Validation(errors)
}

#[cfg(test)]
mod tests {
    use axum::{body::Body, http::header};
    use serde::Deserialize;

    use super::*;

    #[derive(Debug, Default, Deserialize)]
    struct Payload {
        #[serde(default)]
        text: String,
    }

    async fn extract(content_type: Option<&str>, body: &'static str) -> Result<Payload> {
        let mut request = Request::builder().method("POST").uri("/");
        if let Some(content_type) = content_type {
            request = request.header(header::CONTENT_TYPE, content_type);
        }
        let request = request.body(Body::from(body)).unwrap();

        JsonBody::<Payload>::from_request(request, &())
            .await
            .map(|JsonBody(payload)| payload)
    }

    #[tokio::test]
    async fn absent_or_null_bodies_read_as_empty_object() {
        for (content_type, body) in [
            (None, ""),
            (Some("application/json"), ""),
            (Some("application/json"), "null"),
            (Some("application/json"), "{\"text\":null}"),
        ] {
            let payload = extract(content_type, body).await.unwrap();
            assert_eq!(payload.text, "", "body {body:?}");
        }
    }

    #[tokio::test]
    async fn wrongly_typed_member_is_a_body_validation_error() {
        let err = extract(Some("application/json"), "{\"text\":5}")
            .await
            .unwrap_err();

        let Error::Validation(errors) = err else {
            panic!("expected validation error");
        };
        assert!(errors.field_errors().contains_key("body"));
    }

    #[tokio::test]
    async fn malformed_json_is_a_body_validation_error() {
        let err = extract(Some("application/json"), "{\"text\":")
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Validation(_)));
    }
}
