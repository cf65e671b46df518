//! Tests for HTTP error mapping.

use super::*;
use actix_web::ResponseError;
use actix_web::body::to_bytes;
use rstest::{fixture, rstest};
use serde_json::{Value, json};

use crate::domain::RuleViolation;

const TRACE_ID: &str = "00000000-0000-0000-0000-000000000000";

#[fixture]
fn expected_trace_id() -> String {
    TRACE_ID.to_owned()
}

#[rstest]
#[case(Error::invalid_request("bad"), StatusCode::BAD_REQUEST)]
#[case(Error::unauthorized("no auth"), StatusCode::UNAUTHORIZED)]
#[case(Error::forbidden("denied"), StatusCode::FORBIDDEN)]
#[case(Error::not_found("missing"), StatusCode::NOT_FOUND)]
#[case(RuleViolation::DuplicateClaim.into(), StatusCode::CONFLICT)]
#[case(Error::too_many_requests("slow down"), StatusCode::TOO_MANY_REQUESTS)]
#[case(Error::service_unavailable("db down"), StatusCode::SERVICE_UNAVAILABLE)]
#[case(Error::internal("boom"), StatusCode::INTERNAL_SERVER_ERROR)]
fn status_code_matches_error_code(#[case] err: Error, #[case] status: StatusCode) {
    assert_eq!(ResponseError::status_code(&err), status);
}

struct Rendered {
    status: StatusCode,
    trace_header: Option<String>,
    body: Value,
}

async fn render(error: &Error) -> Rendered {
    let response = ResponseError::error_response(error);
    let status = response.status();
    let trace_header = response
        .headers()
        .get(TRACE_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned);
    let bytes = to_bytes(response.into_body())
        .await
        .expect("reading response body succeeds");
    Rendered {
        status,
        trace_header,
        body: serde_json::from_slice(&bytes).expect("envelope JSON"),
    }
}

#[rstest]
#[actix_web::test]
async fn internal_errors_are_redacted(expected_trace_id: String) {
    let error = Error::internal("db password is hunter2")
        .with_trace_id(expected_trace_id.clone())
        .with_details(json!({"secret": "x"}));
    let Rendered {
        status,
        trace_header,
        body,
    } = render(&error).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(trace_header.as_deref(), Some(expected_trace_id.as_str()));
    assert_eq!(body["success"], false);
    assert_eq!(body["error"]["code"], "internal_error");
    assert_eq!(body["error"]["message"], "Internal server error");
    assert_eq!(body["error"]["traceId"], expected_trace_id.as_str());
    assert!(body["error"].get("details").is_none());
    assert!(body.get("data").is_none());
}

#[rstest]
#[actix_web::test]
async fn rule_violations_keep_their_details() {
    let error: Error = RuleViolation::InsufficientPoints {
        available: 50,
        required: 100,
    }
    .into();
    let Rendered { status, body, .. } = render(&error).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["code"], "conflict");
    assert_eq!(body["error"]["details"]["rule"], "insufficient_points");
    assert_eq!(body["error"]["details"]["available"], 50);
    assert_eq!(body["error"]["details"]["required"], 100);
}

#[rstest]
#[actix_web::test]
async fn error_without_trace_id_omits_trace_header() {
    let rendered = render(&Error::invalid_request("bad")).await;
    assert_eq!(rendered.status, StatusCode::BAD_REQUEST);
    assert!(rendered.trace_header.is_none());
    assert_eq!(rendered.body["error"]["message"], "bad");
}

#[rstest]
fn from_actix_error_is_redacted_internal_error() {
    let err: Error = actix_web::error::ErrorBadRequest("boom").into();
    assert_eq!(err.code(), ErrorCode::InternalError);
    assert_eq!(err.message(), "Internal server error");
    assert_eq!(err.details(), None);
}
