//! Error types for Terrace.
//!
//! This module provides the [`ApiError`] taxonomy. Every failure a handler or
//! the dispatcher can produce is one of these variants, and the response
//! translator in `terrace-dispatch` is the single place where variants are
//! converted into wire responses.
//!
//! The mapping from variant to HTTP status is fixed:
//!
//! | Variant | Status |
//! |---|---|
//! | `NotFound` | 404 |
//! | `MethodNotAllowed` | 405 |
//! | `UnsupportedContentType` | 406 |
//! | `Validation` | 400 |
//! | `PermissionDenied` | 403 |
//! | `NotImplementedRoute` | 501 |
//! | `Immediate` | carried status |
//! | `Internal` | 500 |

use http::{Method, StatusCode};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

use crate::resources::ErrorBody;

/// Result type alias using [`ApiError`].
pub type ApiResult<T> = Result<T, ApiError>;

/// Well-known sub-status codes carried in [`ErrorBody::code`].
///
/// Clients branch on these rather than on message text.
pub mod codes {
    /// Fields failed validation.
    pub const VALIDATION: u32 = 40000;
    /// The request body could not be decoded by the negotiated codec.
    pub const DECODE_BODY: u32 = 40096;
    /// A list of resources was supplied where a single resource was expected.
    pub const MULTIPLE_RESOURCES: u32 = 40097;
    /// The decoded body could not be loaded as the expected resource.
    pub const LOAD_RESOURCE: u32 = 40098;
    /// The request body was not valid UTF-8.
    pub const DECODE_BYTES: u32 = 40099;
    /// Permission denied.
    pub const PERMISSION_DENIED: u32 = 40300;
    /// Resource not found.
    pub const NOT_FOUND: u32 = 40400;
    /// HTTP method not allowed for this route.
    pub const METHOD_NOT_ALLOWED: u32 = 40500;
    /// Unhandled internal error.
    pub const INTERNAL: u32 = 50000;
    /// A declared route resolves to a handler that is not implemented.
    pub const NOT_IMPLEMENTED: u32 = 50100;
}

/// Message shown to clients when an unhandled error is masked.
const INTERNAL_MESSAGE: &str =
    "An unknown error has occurred, the developers have been notified.";

/// Standard error type for Terrace.
///
/// `ApiError` provides structured errors with a fixed HTTP status mapping and
/// a conversion into the canonical [`ErrorBody`] wire resource.
///
/// # Example
///
/// ```
/// use terrace_core::ApiError;
///
/// fn find_widget(id: u64) -> Result<(), ApiError> {
///     Err(ApiError::not_found(format!("No widget with id {id}.")))
/// }
/// ```
#[derive(Error, Debug)]
pub enum ApiError {
    /// The addressed resource does not exist.
    #[error("Not found: {message}")]
    NotFound {
        /// Human-readable error message.
        message: String,
    },

    /// The HTTP method is not registered for the matched route key.
    #[error("Method not allowed")]
    MethodNotAllowed {
        /// The methods that are registered for the route key.
        allowed: Vec<Method>,
    },

    /// Neither negotiator chain resolved to a registered codec.
    ///
    /// This is the one failure that cannot be encoded as a resource body,
    /// because no codec could be selected to encode it.
    #[error("Content cannot be returned in the format requested")]
    UnsupportedContentType {
        /// The content type that was requested, if any was identified.
        content_type: Option<String>,
    },

    /// Validation of a resource failed.
    #[error("Validation error: {message}")]
    Validation {
        /// Human-readable error message.
        message: String,
        /// Field-specific validation errors, when available.
        field_errors: Option<FieldErrors>,
    },

    /// The authorization hook rejected the request.
    #[error("Permission denied: {message}")]
    PermissionDenied {
        /// Human-readable error message.
        message: String,
    },

    /// A declared route resolves to a handler the API does not provide.
    ///
    /// Deliberately a server error (501) rather than 404 or 405, so an
    /// incomplete capability implementation is noticed by its developer.
    #[error("This method has not been implemented")]
    NotImplementedRoute,

    /// An explicit short-circuit response with full control over status,
    /// body and headers.
    #[error("Immediate response ({status})")]
    Immediate {
        /// Status code to respond with.
        status: StatusCode,
        /// Error resource to encode as the response body.
        error: ErrorBody,
        /// Headers copied verbatim onto the outgoing response.
        headers: Vec<(String, String)>,
    },

    /// Any other unhandled failure.
    #[error("Internal error: {message}")]
    Internal {
        /// Human-readable error message (not exposed to clients outside
        /// debug mode).
        message: String,
        /// The underlying error, if one was captured.
        #[source]
        source: Option<anyhow::Error>,
    },
}

impl ApiError {
    /// Creates a not found error.
    #[must_use]
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    /// Creates a method not allowed error carrying the allowed method set.
    #[must_use]
    pub fn method_not_allowed(allowed: Vec<Method>) -> Self {
        Self::MethodNotAllowed { allowed }
    }

    /// Creates an unsupported content type error.
    #[must_use]
    pub fn unsupported_content_type(content_type: Option<String>) -> Self {
        Self::UnsupportedContentType { content_type }
    }

    /// Creates a validation error with a flat message.
    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
            field_errors: None,
        }
    }

    /// Creates a validation error with field-specific errors.
    #[must_use]
    pub fn validation_with_fields(field_errors: FieldErrors) -> Self {
        Self::Validation {
            message: "Fields failed validation.".to_string(),
            field_errors: Some(field_errors),
        }
    }

    /// Creates a permission denied error.
    #[must_use]
    pub fn permission_denied(message: impl Into<String>) -> Self {
        Self::PermissionDenied {
            message: message.into(),
        }
    }

    /// Creates an immediate error response.
    ///
    /// # Example
    ///
    /// ```
    /// use terrace_core::ApiError;
    ///
    /// let err = ApiError::immediate(403, 0, "Login required");
    /// assert_eq!(err.status_code(), http::StatusCode::FORBIDDEN);
    /// ```
    #[must_use]
    pub fn immediate(status: u16, code: u32, message: impl Into<String>) -> Self {
        Self::Immediate {
            status: StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            error: ErrorBody::new(status, code, message),
            headers: Vec::new(),
        }
    }

    /// Creates an immediate error response with headers.
    #[must_use]
    pub fn immediate_with_headers(
        status: u16,
        code: u32,
        message: impl Into<String>,
        headers: Vec<(String, String)>,
    ) -> Self {
        Self::Immediate {
            status: StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            error: ErrorBody::new(status, code, message),
            headers,
        }
    }

    /// Creates an internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
            source: None,
        }
    }

    /// Creates an internal error wrapping a source error.
    pub fn internal_with_source(
        message: impl Into<String>,
        source: impl Into<anyhow::Error>,
    ) -> Self {
        Self::Internal {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::MethodNotAllowed { .. } => StatusCode::METHOD_NOT_ALLOWED,
            Self::UnsupportedContentType { .. } => StatusCode::NOT_ACCEPTABLE,
            Self::Validation { .. } => StatusCode::BAD_REQUEST,
            Self::PermissionDenied { .. } => StatusCode::FORBIDDEN,
            Self::NotImplementedRoute => StatusCode::NOT_IMPLEMENTED,
            Self::Immediate { status, .. } => *status,
            Self::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Returns the sub-status code carried in the error body.
    #[must_use]
    pub fn sub_code(&self) -> u32 {
        match self {
            Self::NotFound { .. } => codes::NOT_FOUND,
            Self::MethodNotAllowed { .. } => codes::METHOD_NOT_ALLOWED,
            Self::UnsupportedContentType { .. } | Self::Internal { .. } => codes::INTERNAL,
            Self::Validation { .. } => codes::VALIDATION,
            Self::PermissionDenied { .. } => codes::PERMISSION_DENIED,
            Self::NotImplementedRoute => codes::NOT_IMPLEMENTED,
            Self::Immediate { error, .. } => error.code,
        }
    }

    /// Converts this error into the canonical [`ErrorBody`] wire resource.
    ///
    /// `debug` controls whether internal errors carry a developer message and
    /// formatted cause chain; outside debug mode they are masked with a
    /// generic message.
    #[must_use]
    pub fn to_error_body(&self, debug: bool) -> ErrorBody {
        let status = self.status_code().as_u16();
        match self {
            Self::NotFound { message } => {
                ErrorBody::new(status, codes::NOT_FOUND, message.clone())
            }
            Self::MethodNotAllowed { allowed } => {
                let allow = allowed
                    .iter()
                    .map(Method::as_str)
                    .collect::<Vec<_>>()
                    .join(",");
                ErrorBody::new(status, codes::METHOD_NOT_ALLOWED, "Method not allowed")
                    .with_meta(serde_json::json!({ "allow": allow }))
            }
            Self::UnsupportedContentType { .. } => ErrorBody::new(
                status,
                codes::INTERNAL,
                "Content cannot be returned in the format requested.",
            ),
            Self::Validation {
                message,
                field_errors,
            } => match field_errors {
                Some(errors) => {
                    let meta = serde_json::to_value(errors).unwrap_or(serde_json::Value::Null);
                    ErrorBody::new(status, codes::VALIDATION, "Fields failed validation.")
                        .with_meta(meta)
                }
                None => ErrorBody::new(status, codes::VALIDATION, message.clone()),
            },
            Self::PermissionDenied { message } => {
                ErrorBody::new(status, codes::PERMISSION_DENIED, "Permission denied")
                    .with_developer_message(message.clone())
            }
            Self::NotImplementedRoute => ErrorBody::new(
                status,
                codes::NOT_IMPLEMENTED,
                "This method has not been implemented.",
            ),
            Self::Immediate { error, .. } => error.clone(),
            Self::Internal { message, source } => {
                let body = ErrorBody::new(status, codes::INTERNAL, INTERNAL_MESSAGE);
                if debug {
                    let body = body.with_developer_message(message.clone());
                    match source {
                        Some(cause) => body.with_meta(serde_json::Value::String(format!(
                            "{cause:?}"
                        ))),
                        None => body,
                    }
                } else {
                    body
                }
            }
        }
    }
}

/// Field-specific validation errors.
///
/// A mapping from field name to the list of messages describing why that
/// field failed validation. Serialized into [`ErrorBody::meta`] so clients
/// can surface per-field feedback.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldErrors {
    /// Map of field name to error messages.
    pub fields: HashMap<String, Vec<String>>,
}

impl FieldErrors {
    /// Creates a new empty `FieldErrors`.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an error message for a field.
    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.fields
            .entry(field.into())
            .or_default()
            .push(message.into());
    }

    /// Returns `true` if there are no field errors.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Returns the number of fields with errors.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found() {
        let error = ApiError::not_found("No widget with id 7.");
        assert_eq!(error.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(error.sub_code(), codes::NOT_FOUND);

        let body = error.to_error_body(false);
        assert_eq!(body.status, 404);
        assert_eq!(body.message, "No widget with id 7.");
    }

    #[test]
    fn test_method_not_allowed_meta() {
        let error = ApiError::method_not_allowed(vec![Method::GET, Method::POST]);
        assert_eq!(error.status_code(), StatusCode::METHOD_NOT_ALLOWED);

        let body = error.to_error_body(false);
        let meta = body.meta.expect("allow meta should be present");
        assert_eq!(meta["allow"], "GET,POST");
    }

    #[test]
    fn test_validation_with_fields() {
        let mut errors = FieldErrors::new();
        errors.add("name", "This field cannot be blank.");
        errors.add("name", "Too long.");
        errors.add("age", "Must be a whole number.");

        let error = ApiError::validation_with_fields(errors.clone());
        let body = error.to_error_body(false);
        assert_eq!(body.status, 400);
        assert_eq!(body.code, codes::VALIDATION);
        assert_eq!(body.message, "Fields failed validation.");

        let meta = body.meta.expect("field map should be present");
        assert_eq!(meta["name"][1], "Too long.");
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn test_validation_flat_message() {
        let error = ApiError::validation("Expected a single resource.");
        let body = error.to_error_body(false);
        assert_eq!(body.message, "Expected a single resource.");
        assert!(body.meta.is_none());
    }

    #[test]
    fn test_internal_masked_outside_debug() {
        let error = ApiError::internal_with_source(
            "db connection refused",
            std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused"),
        );
        let body = error.to_error_body(false);
        assert_eq!(body.message, INTERNAL_MESSAGE);
        assert!(body.developer_message.is_none());
        assert!(body.meta.is_none());
    }

    #[test]
    fn test_internal_detailed_in_debug() {
        let error = ApiError::internal_with_source(
            "db connection refused",
            std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused"),
        );
        let body = error.to_error_body(true);
        assert_eq!(body.developer_message.as_deref(), Some("db connection refused"));
        assert!(body.meta.is_some());
    }

    #[test]
    fn test_immediate_carries_status_and_headers() {
        let error = ApiError::immediate_with_headers(
            405,
            codes::METHOD_NOT_ALLOWED,
            "Method not allowed",
            vec![("Allow".to_string(), "GET".to_string())],
        );
        assert_eq!(error.status_code(), StatusCode::METHOD_NOT_ALLOWED);
        if let ApiError::Immediate { headers, .. } = &error {
            assert_eq!(headers[0].0, "Allow");
        } else {
            panic!("expected immediate variant");
        }
    }

    #[test]
    fn test_unsupported_content_type_is_406() {
        let error = ApiError::unsupported_content_type(Some("text/csv".to_string()));
        assert_eq!(error.status_code(), StatusCode::NOT_ACCEPTABLE);
    }

    #[test]
    fn test_not_implemented_is_501() {
        let error = ApiError::NotImplementedRoute;
        assert_eq!(error.status_code(), StatusCode::NOT_IMPLEMENTED);
        let body = error.to_error_body(false);
        assert_eq!(body.code, codes::NOT_IMPLEMENTED);
    }
}
