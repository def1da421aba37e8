//! Response translation.
//!
//! The single place where handler outcomes and the error taxonomy are
//! converted into wire responses. Nothing outside this module decides a
//! status code or builds a response body.

use std::sync::Arc;

use bytes::Bytes;
use http::{header, StatusCode};
use serde_json::Value;

use terrace_core::{ApiError, ApiRequest, ApiResult, Codec};

use crate::outcome::{HttpResponse, Outcome};

/// Builds a plain text response outside the codec path.
///
/// Used where no codec can (406) or should (unknown API version) be
/// involved.
#[must_use]
pub fn plain_response(status: StatusCode, message: &str) -> HttpResponse {
    http::Response::builder()
        .status(status)
        .header(header::CONTENT_TYPE, "text/plain; charset=utf-8")
        .body(Bytes::from(message.to_string()))
        .unwrap_or_else(|_| http::Response::new(Bytes::new()))
}

/// Encodes a resource value into a response via the negotiated codec.
fn encoded(codec: &Arc<dyn Codec>, status: StatusCode, value: &Value) -> HttpResponse {
    match codec.encode(value) {
        Ok(bytes) => http::Response::builder()
            .status(status)
            .header(header::CONTENT_TYPE, codec.content_type())
            .body(bytes)
            .unwrap_or_else(|_| http::Response::new(Bytes::new())),
        Err(e) => {
            tracing::error!(error = %e, "failed to encode response body");
            plain_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "An unknown error has occurred, the developers have been notified.",
            )
        }
    }
}

/// Builds a bodyless response with only a status code.
fn bodyless(status: StatusCode) -> HttpResponse {
    http::Response::builder()
        .status(status)
        .body(Bytes::new())
        .unwrap_or_else(|_| http::Response::new(Bytes::new()))
}

/// Translates a dispatch result into the final response.
///
/// # Errors
///
/// The only `Err` path is the debug-mode special case: an unhandled internal
/// failure, when the response content type was silently assumed rather than
/// chosen by the client, propagates to the host so its diagnostics can
/// render. Every other result becomes an `Ok` response.
pub(crate) fn translate(
    result: ApiResult<Outcome>,
    request: &ApiRequest,
    response_codec: &Arc<dyn Codec>,
    debug: bool,
) -> Result<HttpResponse, ApiError> {
    let error = match result {
        Ok(Outcome::Response(response)) => return Ok(response),
        Ok(Outcome::Resource(value)) => {
            return Ok(encoded(response_codec, StatusCode::OK, &value));
        }
        Ok(Outcome::WithStatus(value, status)) => {
            return Ok(encoded(response_codec, status, &value));
        }
        Ok(Outcome::NoContent) => return Ok(bodyless(StatusCode::NO_CONTENT)),
        Err(error) => error,
    };

    if let ApiError::Internal { .. } = &error {
        if debug && request.response_type_is_default() {
            return Err(error);
        }
        tracing::error!(
            path = %request.path(),
            request_id = %request.context().request_id(),
            error = ?error,
            "Internal Server Error"
        );
    }

    let status = error.status_code();
    let body = error.to_error_body(debug);
    let value = serde_json::to_value(&body).unwrap_or(Value::Null);
    let mut response = encoded(response_codec, status, &value);

    match &error {
        ApiError::MethodNotAllowed { allowed } => {
            let allow = allowed
                .iter()
                .map(http::Method::as_str)
                .collect::<Vec<_>>()
                .join(",");
            if let Ok(value) = allow.parse() {
                response.headers_mut().insert(header::ALLOW, value);
            }
        }
        ApiError::Immediate { headers, .. } => {
            for (name, value) in headers {
                if let (Ok(name), Ok(value)) = (
                    header::HeaderName::from_bytes(name.as_bytes()),
                    value.parse(),
                ) {
                    response.headers_mut().insert(name, value);
                }
            }
        }
        _ => {}
    }

    Ok(response)
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::Method;
    use terrace_core::codes;
    use terrace_negotiate::JsonCodec;

    fn codec() -> Arc<dyn Codec> {
        Arc::new(JsonCodec)
    }

    fn request() -> ApiRequest {
        ApiRequest::builder().uri("/widgets/").build()
    }

    fn body_json(response: &HttpResponse) -> Value {
        serde_json::from_slice(response.body()).unwrap()
    }

    #[test]
    fn test_resource_outcome_is_200() {
        let outcome = Ok(Outcome::Resource(serde_json::json!({"id": 1})));
        let response = translate(outcome, &request(), &codec(), false).unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "application/json"
        );
        assert_eq!(body_json(&response)["id"], 1);
    }

    #[test]
    fn test_with_status_outcome() {
        let outcome = Ok(Outcome::WithStatus(
            serde_json::json!({"id": 1}),
            StatusCode::CREATED,
        ));
        let response = translate(outcome, &request(), &codec(), false).unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    #[test]
    fn test_no_content_has_no_body_and_no_content_type() {
        let response = translate(Ok(Outcome::NoContent), &request(), &codec(), false).unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        assert!(response.body().is_empty());
        assert!(response.headers().get(header::CONTENT_TYPE).is_none());
    }

    #[test]
    fn test_prebuilt_response_passes_through() {
        let prebuilt = plain_response(StatusCode::IM_A_TEAPOT, "tea");
        let response =
            translate(Ok(Outcome::Response(prebuilt)), &request(), &codec(), false).unwrap();
        assert_eq!(response.status(), StatusCode::IM_A_TEAPOT);
    }

    #[test]
    fn test_not_found_is_404() {
        let result = Err(ApiError::not_found("No widget with id 9."));
        let response = translate(result, &request(), &codec(), false).unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = body_json(&response);
        assert_eq!(body["code"], codes::NOT_FOUND);
        assert_eq!(body["message"], "No widget with id 9.");
    }

    #[test]
    fn test_method_not_allowed_sets_allow_header() {
        let result = Err(ApiError::method_not_allowed(vec![Method::GET, Method::POST]));
        let response = translate(result, &request(), &codec(), false).unwrap();
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(response.headers()[header::ALLOW], "GET,POST");
        assert_eq!(body_json(&response)["meta"]["allow"], "GET,POST");
    }

    #[test]
    fn test_immediate_headers_copied() {
        let result = Err(ApiError::immediate_with_headers(
            403,
            0,
            "Login required",
            vec![("WWW-Authenticate".to_string(), "Bearer".to_string())],
        ));
        let response = translate(result, &request(), &codec(), false).unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert_eq!(response.headers()["www-authenticate"], "Bearer");
    }

    #[test]
    fn test_internal_error_masked_outside_debug() {
        let result = Err(ApiError::internal("boom"));
        let response = translate(result, &request(), &codec(), false).unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_json(&response);
        assert!(body["message"].as_str().unwrap().contains("unknown error"));
        assert!(body.get("developer_message").is_none());
    }

    #[test]
    fn test_internal_error_propagates_in_debug_with_default_type() {
        let mut req = request();
        req.bind_codecs(codec(), codec(), true);
        let result = Err(ApiError::internal("boom"));
        assert!(translate(result, &req, &codec(), true).is_err());
    }

    #[test]
    fn test_internal_error_detailed_in_debug_with_explicit_type() {
        let mut req = request();
        req.bind_codecs(codec(), codec(), false);
        let result = Err(ApiError::internal("boom"));
        let response = translate(result, &req, &codec(), true).unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body_json(&response)["developer_message"], "boom");
    }

    #[test]
    fn test_validation_with_field_map() {
        let mut fields = terrace_core::FieldErrors::new();
        fields.add("name", "This field cannot be blank.");
        let result = Err(ApiError::validation_with_fields(fields));
        let response = translate(result, &request(), &codec(), false).unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(&response);
        assert_eq!(body["code"], codes::VALIDATION);
        assert_eq!(body["meta"]["name"][0], "This field cannot be blank.");
    }

    #[test]
    fn test_plain_response() {
        let response = plain_response(StatusCode::NOT_ACCEPTABLE, "no codec");
        assert_eq!(response.status(), StatusCode::NOT_ACCEPTABLE);
        assert_eq!(response.body(), "no codec");
    }
}
