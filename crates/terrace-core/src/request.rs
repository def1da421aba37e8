//! The framework-neutral request model.
//!
//! [`ApiRequest`] aggregates everything the dispatcher and handlers need from
//! an incoming HTTP request: method, URI, headers, body, the per-request
//! [`RequestContext`], and the codecs selected by content negotiation.
//!
//! The negotiated-codec slots are the only per-request mutable state in the
//! framework. They are set once at the top of dispatch and read afterwards;
//! nothing on this type is shared across requests.

use bytes::Bytes;
use http::{HeaderMap, Method, Uri};
use std::sync::Arc;

use crate::codec::Codec;
use crate::context::RequestContext;

/// An incoming request as seen by the dispatch layer.
///
/// # Example
///
/// ```
/// use terrace_core::ApiRequest;
/// use http::Method;
///
/// let req = ApiRequest::builder()
///     .method(Method::GET)
///     .uri("/widgets/?offset=10&limit=5")
///     .header("accept", "application/json")
///     .build();
///
/// assert_eq!(req.path(), "/widgets/");
/// assert_eq!(req.query_param("offset"), Some("10"));
/// assert_eq!(req.header("accept"), Some("application/json"));
/// ```
#[derive(Clone)]
pub struct ApiRequest {
    /// HTTP method.
    method: Method,
    /// Request URI.
    uri: Uri,
    /// Request headers.
    headers: HeaderMap,
    /// Request body.
    body: Bytes,
    /// Per-request context.
    context: RequestContext,
    /// Codec selected for decoding the request body.
    request_codec: Option<Arc<dyn Codec>>,
    /// Codec selected for encoding the response body.
    response_codec: Option<Arc<dyn Codec>>,
    /// Whether the response content type was assumed via a default resolver
    /// rather than explicitly requested by the client.
    response_type_is_default: bool,
}

impl ApiRequest {
    /// Creates a new request builder.
    #[must_use]
    pub fn builder() -> ApiRequestBuilder {
        ApiRequestBuilder::default()
    }

    /// Returns the HTTP method.
    #[must_use]
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Returns the request URI.
    #[must_use]
    pub fn uri(&self) -> &Uri {
        &self.uri
    }

    /// Returns the path portion of the URI.
    #[must_use]
    pub fn path(&self) -> &str {
        self.uri.path()
    }

    /// Returns the query string, if present.
    #[must_use]
    pub fn query_string(&self) -> Option<&str> {
        self.uri.query()
    }

    /// Returns the first value of a query parameter.
    #[must_use]
    pub fn query_param(&self, name: &str) -> Option<&str> {
        self.query_pairs().find(|(n, _)| *n == name).map(|(_, v)| v)
    }

    /// Returns an iterator over raw query string pairs.
    pub fn query_pairs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.uri
            .query()
            .unwrap_or("")
            .split('&')
            .filter(|pair| !pair.is_empty())
            .map(|pair| pair.split_once('=').unwrap_or((pair, "")))
    }

    /// Returns the request headers.
    #[must_use]
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Returns a specific header value as a string.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Returns the request body.
    #[must_use]
    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// Returns the per-request context.
    #[must_use]
    pub fn context(&self) -> &RequestContext {
        &self.context
    }

    /// Binds the negotiated codecs onto the request.
    ///
    /// Called exactly once by the dispatcher after content negotiation.
    pub fn bind_codecs(
        &mut self,
        request_codec: Arc<dyn Codec>,
        response_codec: Arc<dyn Codec>,
        response_type_is_default: bool,
    ) {
        self.request_codec = Some(request_codec);
        self.response_codec = Some(response_codec);
        self.response_type_is_default = response_type_is_default;
    }

    /// Returns the codec negotiated for decoding the request body.
    #[must_use]
    pub fn request_codec(&self) -> Option<&Arc<dyn Codec>> {
        self.request_codec.as_ref()
    }

    /// Returns the codec negotiated for encoding the response body.
    #[must_use]
    pub fn response_codec(&self) -> Option<&Arc<dyn Codec>> {
        self.response_codec.as_ref()
    }

    /// Returns whether the response content type was silently assumed.
    #[must_use]
    pub fn response_type_is_default(&self) -> bool {
        self.response_type_is_default
    }
}

impl std::fmt::Debug for ApiRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiRequest")
            .field("method", &self.method)
            .field("uri", &self.uri)
            .field("request_id", &self.context.request_id())
            .field(
                "request_codec",
                &self.request_codec.as_ref().map(|c| c.content_type()),
            )
            .field(
                "response_codec",
                &self.response_codec.as_ref().map(|c| c.content_type()),
            )
            .finish_non_exhaustive()
    }
}

/// Builder for [`ApiRequest`].
///
/// Useful in tests for constructing requests with specific values.
#[derive(Debug, Default)]
pub struct ApiRequestBuilder {
    method: Option<Method>,
    uri: Option<Uri>,
    headers: HeaderMap,
    body: Bytes,
    context: Option<RequestContext>,
}

impl ApiRequestBuilder {
    /// Creates a new builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the HTTP method.
    #[must_use]
    pub fn method(mut self, method: Method) -> Self {
        self.method = Some(method);
        self
    }

    /// Sets the URI.
    ///
    /// # Panics
    ///
    /// Panics if the string is not a valid URI; intended for literals.
    #[must_use]
    pub fn uri(mut self, uri: &str) -> Self {
        self.uri = Some(uri.parse().expect("valid uri literal"));
        self
    }

    /// Sets the headers.
    #[must_use]
    pub fn headers(mut self, headers: HeaderMap) -> Self {
        self.headers = headers;
        self
    }

    /// Adds a single header.
    #[must_use]
    pub fn header(mut self, name: &'static str, value: &str) -> Self {
        if let Ok(value) = value.parse() {
            self.headers.insert(name, value);
        }
        self
    }

    /// Sets the body.
    #[must_use]
    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    /// Sets the request context.
    #[must_use]
    pub fn context(mut self, context: RequestContext) -> Self {
        self.context = Some(context);
        self
    }

    /// Builds the request.
    ///
    /// Method defaults to `GET` and URI to `/` when not set.
    #[must_use]
    pub fn build(self) -> ApiRequest {
        ApiRequest {
            method: self.method.unwrap_or(Method::GET),
            uri: self.uri.unwrap_or_else(|| Uri::from_static("/")),
            headers: self.headers,
            body: self.body,
            context: self.context.unwrap_or_default(),
            request_codec: None,
            response_codec: None,
            response_type_is_default: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults() {
        let req = ApiRequest::builder().build();
        assert_eq!(req.method(), &Method::GET);
        assert_eq!(req.path(), "/");
        assert!(req.body().is_empty());
        assert!(req.request_codec().is_none());
    }

    #[test]
    fn test_query_params() {
        let req = ApiRequest::builder()
            .uri("/widgets/?offset=10&limit=5&flag")
            .build();
        assert_eq!(req.query_param("offset"), Some("10"));
        assert_eq!(req.query_param("limit"), Some("5"));
        assert_eq!(req.query_param("flag"), Some(""));
        assert_eq!(req.query_param("missing"), None);
    }

    #[test]
    fn test_no_query_string() {
        let req = ApiRequest::builder().uri("/widgets/").build();
        assert_eq!(req.query_string(), None);
        assert_eq!(req.query_pairs().count(), 0);
    }

    #[test]
    fn test_header_access() {
        let req = ApiRequest::builder()
            .header("content-type", "application/json")
            .build();
        assert_eq!(req.header("content-type"), Some("application/json"));
        assert_eq!(req.header("accept"), None);
    }

    #[test]
    fn test_body() {
        let req = ApiRequest::builder()
            .method(Method::POST)
            .uri("/widgets/")
            .body(r#"{"name":"spanner"}"#)
            .build();
        assert!(!req.body().is_empty());
    }
}
