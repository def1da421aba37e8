//! Request body decoding helpers.
//!
//! These helpers decode the request body via the negotiated request codec
//! into resource values. Each failure mode maps to a distinct immediate 400
//! with its own sub-status code, so clients can tell undecodable bytes apart
//! from a well-formed body that is the wrong shape.

use serde::de::DeserializeOwned;
use serde_json::Value;

use terrace_core::{codes, ApiError, ApiRequest, ApiResult, ErrorBody};
use http::StatusCode;

/// Builds the immediate 400 used by the body helpers.
fn bad_request(code: u32, message: &str, detail: String) -> ApiError {
    ApiError::Immediate {
        status: StatusCode::BAD_REQUEST,
        error: ErrorBody::new(400, code, message).with_developer_message(detail),
        headers: Vec::new(),
    }
}

/// Decodes the request body into a resource value via the negotiated codec.
///
/// # Errors
///
/// - an immediate 400 with code [`codes::DECODE_BYTES`] if the body is not
///   valid UTF-8
/// - an immediate 400 with code [`codes::DECODE_BODY`] if the codec cannot
///   decode the bytes
/// - an internal error if no request codec was bound (a dispatcher defect)
pub fn decode_body(request: &ApiRequest) -> ApiResult<Value> {
    let codec = request
        .request_codec()
        .ok_or_else(|| ApiError::internal("no request codec bound before body decode"))?;

    if std::str::from_utf8(request.body()).is_err() {
        return Err(bad_request(
            codes::DECODE_BYTES,
            "Unable to decode request body.",
            "request body is not valid UTF-8".to_string(),
        ));
    }

    codec.decode(request.body()).map_err(|e| {
        bad_request(codes::DECODE_BODY, "Unable to decode body.", e.to_string())
    })
}

/// Decodes the request body into a single typed resource.
///
/// # Errors
///
/// In addition to the [`decode_body`] failures:
///
/// - an immediate 400 with code [`codes::MULTIPLE_RESOURCES`] if the body
///   holds a list where a single resource was expected
/// - an immediate 400 with code [`codes::LOAD_RESOURCE`] if the decoded
///   value does not load as `T`
pub fn resource_from_body<T: DeserializeOwned>(request: &ApiRequest) -> ApiResult<T> {
    let value = decode_body(request)?;

    if value.is_array() {
        return Err(bad_request(
            codes::MULTIPLE_RESOURCES,
            "Expected a single resource not a list.",
            "request body is a list".to_string(),
        ));
    }

    serde_json::from_value(value).map_err(|e| {
        bad_request(codes::LOAD_RESOURCE, "Unable to load resource.", e.to_string())
    })
}

/// Decodes the request body into a list of typed resources.
///
/// A single object body is accepted and returned as a one-element list.
///
/// # Errors
///
/// As for [`resource_from_body`], except that list bodies are allowed.
pub fn resources_from_body<T: DeserializeOwned>(request: &ApiRequest) -> ApiResult<Vec<T>> {
    let value = decode_body(request)?;

    let items = match value {
        Value::Array(items) => items,
        single => vec![single],
    };

    items
        .into_iter()
        .map(|item| {
            serde_json::from_value(item).map_err(|e| {
                bad_request(codes::LOAD_RESOURCE, "Unable to load resource.", e.to_string())
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::Method;
    use std::sync::Arc;
    use terrace_negotiate::JsonCodec;

    #[derive(Debug, PartialEq, serde::Deserialize)]
    struct Widget {
        name: String,
    }

    fn post_request(body: &'static [u8]) -> ApiRequest {
        let mut request = ApiRequest::builder()
            .method(Method::POST)
            .uri("/widgets/")
            .body(body)
            .build();
        request.bind_codecs(Arc::new(JsonCodec), Arc::new(JsonCodec), false);
        request
    }

    fn sub_code(err: &ApiError) -> u32 {
        err.sub_code()
    }

    #[test]
    fn test_resource_from_body() {
        let request = post_request(br#"{"name":"spanner"}"#);
        let widget: Widget = resource_from_body(&request).unwrap();
        assert_eq!(widget.name, "spanner");
    }

    #[test]
    fn test_undecodable_body() {
        let request = post_request(b"{not json");
        let err = resource_from_body::<Widget>(&request).unwrap_err();
        assert_eq!(sub_code(&err), codes::DECODE_BODY);
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_non_utf8_body() {
        let request = post_request(&[0xff, 0xfe, 0x00]);
        let err = decode_body(&request).unwrap_err();
        assert_eq!(sub_code(&err), codes::DECODE_BYTES);
    }

    #[test]
    fn test_list_rejected_for_single_resource() {
        let request = post_request(br#"[{"name":"a"},{"name":"b"}]"#);
        let err = resource_from_body::<Widget>(&request).unwrap_err();
        assert_eq!(sub_code(&err), codes::MULTIPLE_RESOURCES);
    }

    #[test]
    fn test_wrong_shape_body() {
        let request = post_request(br#"{"label":"spanner"}"#);
        let err = resource_from_body::<Widget>(&request).unwrap_err();
        assert_eq!(sub_code(&err), codes::LOAD_RESOURCE);
    }

    #[test]
    fn test_resources_from_body_accepts_list() {
        let request = post_request(br#"[{"name":"a"},{"name":"b"}]"#);
        let widgets: Vec<Widget> = resources_from_body(&request).unwrap();
        assert_eq!(widgets.len(), 2);
    }

    #[test]
    fn test_resources_from_body_wraps_single() {
        let request = post_request(br#"{"name":"a"}"#);
        let widgets: Vec<Widget> = resources_from_body(&request).unwrap();
        assert_eq!(widgets.len(), 1);
    }

    #[test]
    fn test_missing_codec_is_internal_error() {
        let request = ApiRequest::builder().build();
        let err = decode_body(&request).unwrap_err();
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
