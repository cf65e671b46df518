//! Extractor configuration and request-shape errors for inbound HTTP
//! adapters.
//!
//! Malformed bodies, paths and query strings are rejected before any handler
//! runs, using the same error envelope as domain failures.

use actix_web::web;
use serde_json::json;

use crate::domain::Error;

/// Largest accepted JSON body.
pub const JSON_LIMIT_BYTES: usize = 64 * 1024;

/// Request-shape failure categories reported in `details.code`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ShapeError {
    InvalidBody,
    InvalidPath,
    InvalidQuery,
}

impl ShapeError {
    fn as_str(self) -> &'static str {
        match self {
            Self::InvalidBody => "invalid_body",
            Self::InvalidPath => "invalid_path",
            Self::InvalidQuery => "invalid_query",
        }
    }

    fn error(self, message: String) -> Error {
        Error::invalid_request(message).with_details(json!({ "code": self.as_str() }))
    }
}

/// Field-scoped validation error raised by handlers before calling a service.
pub(crate) fn invalid_field(field: &str, code: &str, message: impl Into<String>) -> Error {
    Error::invalid_request(message).with_details(json!({ "field": field, "code": code }))
}

/// JSON body configuration for all API scopes.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(JSON_LIMIT_BYTES)
        .error_handler(|err, _req| {
            ShapeError::InvalidBody
                .error(format!("invalid JSON body: {err}"))
                .into()
        })
}

/// Path parameter configuration; malformed identifiers become `400`.
pub fn path_config() -> web::PathConfig {
    web::PathConfig::default().error_handler(|err, _req| {
        ShapeError::InvalidPath
            .error(format!("invalid path parameter: {err}"))
            .into()
    })
}

/// Query string configuration.
pub fn query_config() -> web::QueryConfig {
    web::QueryConfig::default().error_handler(|err, _req| {
        ShapeError::InvalidQuery
            .error(format!("invalid query string: {err}"))
            .into()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;
    use actix_web::{App, HttpResponse, test};
    use rstest::rstest;
    use serde::Deserialize;
    use serde_json::Value;
    use uuid::Uuid;

    #[derive(Deserialize)]
    struct Body {
        #[serde(rename = "amount")]
        _amount: i64,
    }

    #[derive(Deserialize)]
    struct Limit {
        #[serde(rename = "limit")]
        _limit: Option<usize>,
    }

    async fn call(req: test::TestRequest) -> (StatusCode, Value) {
        let app = test::init_service(
            App::new()
                .app_data(json_config())
                .app_data(path_config())
                .app_data(query_config())
                .route(
                    "/items/{id}",
                    web::post().to(|_id: web::Path<Uuid>, _body: web::Json<Body>| async {
                        HttpResponse::NoContent().finish()
                    }),
                )
                .route(
                    "/items",
                    web::get().to(|_query: web::Query<Limit>| async {
                        HttpResponse::NoContent().finish()
                    }),
                ),
        )
        .await;
        let res = test::call_service(&app, req.to_request()).await;
        let status = res.status();
        let body = test::read_body(res).await;
        (status, serde_json::from_slice(&body).unwrap_or(Value::Null))
    }

    #[rstest]
    #[case(
        test::TestRequest::post()
            .uri(&format!("/items/{}", Uuid::nil()))
            .set_json(serde_json::json!({"amount": "lots"})),
        "invalid_body"
    )]
    #[case(
        test::TestRequest::post()
            .uri("/items/not-a-uuid")
            .set_json(serde_json::json!({"amount": 1})),
        "invalid_path"
    )]
    #[case(test::TestRequest::get().uri("/items?limit=-3"), "invalid_query")]
    #[actix_web::test]
    async fn malformed_requests_use_error_envelope(
        #[case] req: test::TestRequest,
        #[case] code: &str,
    ) {
        let (status, body) = call(req).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
        assert_eq!(body["error"]["code"], "invalid_request");
        assert_eq!(body["error"]["details"]["code"], code);
    }
}
