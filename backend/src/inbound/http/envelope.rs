//! Response envelope shared by every API endpoint.
//!
//! Successful responses carry `{"success": true, "data": ...}`; failures carry
//! `{"success": false, "error": {...}}` (see [`super::error`]).

use actix_web::HttpResponse;
use actix_web::http::StatusCode;
use serde::{Deserialize, Serialize};

use crate::domain::Error;

/// JSON body wrapping either a payload or an error.
#[derive(Debug, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<Error>,
}

impl<T> Envelope<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn failure(error: Error) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error),
        }
    }
}

/// API payloads are per-user and must be revalidated before reuse.
const PRIVATE_NO_CACHE: (&str, &str) = ("Cache-Control", "private, no-cache, must-revalidate");

fn respond<T: Serialize>(status: StatusCode, data: T) -> HttpResponse {
    HttpResponse::build(status)
        .insert_header(PRIVATE_NO_CACHE)
        .json(Envelope::success(data))
}

/// `200 OK` with the payload in the envelope.
pub fn ok<T: Serialize>(data: T) -> HttpResponse {
    respond(StatusCode::OK, data)
}

/// `201 Created` with the new resource in the envelope.
pub fn created<T: Serialize>(data: T) -> HttpResponse {
    respond(StatusCode::CREATED, data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::body::to_bytes;
    use rstest::rstest;
    use serde_json::{Value, json};

    #[rstest]
    #[actix_web::test]
    async fn success_wraps_payload() {
        let response = created(json!({"id": 7}));
        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(
            response
                .headers()
                .get("Cache-Control")
                .and_then(|value| value.to_str().ok()),
            Some("private, no-cache, must-revalidate")
        );
        let bytes = to_bytes(response.into_body()).await.expect("body");
        let body: Value = serde_json::from_slice(&bytes).expect("json");
        assert_eq!(body, json!({"success": true, "data": {"id": 7}}));
    }

    #[rstest]
    fn failure_omits_data() {
        let body = serde_json::to_value(Envelope::<()>::failure(Error::not_found("gone")))
            .expect("serialise");
        assert_eq!(body["success"], false);
        assert_eq!(body["error"]["code"], "not_found");
        assert!(body.get("data").is_none());
    }
}
