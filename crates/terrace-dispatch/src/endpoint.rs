//! The compiled endpoint and its dispatch protocol.
//!
//! An [`Endpoint`] is built once at startup from a [`ResourceApi`]: the
//! route set is compiled into an immutable [`RouteTable`], and the
//! negotiator chains and codec registry are fixed. After construction the
//! endpoint holds no mutable state, so it is safe to share across
//! concurrently dispatched requests.

use std::sync::Arc;

use bytes::Bytes;
use http::{header, Method, StatusCode};

use terrace_core::{ApiConfig, ApiError, ApiRequest, ApiResult};
use terrace_negotiate::{CodecRegistry, NegotiatorChain};
use terrace_routes::{PathParams, RouteEntry, RouteKey, RouteTable, OPTIONS_HANDLER};

use crate::api::ResourceApi;
use crate::outcome::{HttpResponse, Outcome};
use crate::response::{plain_response, translate};

/// A resource API compiled and bound, ready to dispatch requests.
///
/// # Example
///
/// ```rust,ignore
/// let endpoint = Endpoint::new(WidgetApi::default());
/// let response = endpoint.dispatch(request).await?;
/// ```
pub struct Endpoint {
    api: Arc<dyn ResourceApi>,
    table: RouteTable,
    codecs: CodecRegistry,
    request_chain: NegotiatorChain,
    response_chain: NegotiatorChain,
    config: ApiConfig,
}

impl Endpoint {
    /// Builds an endpoint with default configuration.
    #[must_use]
    pub fn new(api: impl ResourceApi) -> Self {
        Self::builder(api).build()
    }

    /// Creates an endpoint builder.
    #[must_use]
    pub fn builder(api: impl ResourceApi) -> EndpointBuilder {
        EndpointBuilder::new(Arc::new(api))
    }

    /// Returns the compiled route table.
    #[must_use]
    pub fn table(&self) -> &RouteTable {
        &self.table
    }

    /// Returns the endpoint configuration.
    #[must_use]
    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    /// Returns whether a path matches one of this endpoint's URL patterns.
    ///
    /// Used by collections to pick the endpoint responsible for a request
    /// before delegating.
    #[must_use]
    pub fn matches(&self, path: &str) -> bool {
        self.table.match_path(path).is_some()
    }

    /// Dispatches a request to the appropriate handler and translates the
    /// result into a response.
    ///
    /// # Errors
    ///
    /// The only `Err` is the debug-mode passthrough: an unhandled internal
    /// failure propagates raw when debug mode is on and the response content
    /// type was silently assumed. Hosts render their own diagnostics for it;
    /// every other failure is already translated into a response.
    pub async fn dispatch(&self, mut request: ApiRequest) -> Result<HttpResponse, ApiError> {
        // Resolve the content types used to decode the request and encode
        // the response.
        let request_type = self.request_chain.resolve(&request);
        let response_type = self.response_chain.resolve(&request);

        let request_codec = request_type
            .as_ref()
            .and_then(|n| self.codecs.get(n.content_type()));
        let response_codec = response_type
            .as_ref()
            .and_then(|n| self.codecs.get(n.content_type()));

        let (Some(request_codec), Some(response_codec)) = (request_codec, response_codec) else {
            // No codec, so no rich response is possible.
            tracing::debug!(
                path = %request.path(),
                request_type = ?request_type.as_ref().map(|n| n.content_type()),
                response_type = ?response_type.as_ref().map(|n| n.content_type()),
                "no registered codec for negotiated content type"
            );
            return Ok(plain_response(
                StatusCode::NOT_ACCEPTABLE,
                "Content cannot be returned in the format requested.",
            ));
        };

        let response_is_default = response_type.is_some_and(|n| n.is_default());
        request.bind_codecs(request_codec, response_codec.clone(), response_is_default);

        let result = match self.table.match_path(request.path()) {
            Some((key, entry, params)) => {
                tracing::debug!(
                    path = %request.path(),
                    method = %request.method(),
                    route_key = %key,
                    "dispatching request"
                );
                self.dispatch_to_view(key, entry, &request, params).await
            }
            None => Err(ApiError::not_found(format!(
                "No `{}` found that matches request.",
                self.api.api_name()
            ))),
        };

        translate(result, &request, &response_codec, self.config.debug())
    }

    /// Dispatches a matched route to its handler.
    ///
    /// Invariants, in order: method resolution (405 on absence, carrying the
    /// declared method set), authorization, the pre-dispatch parameter
    /// override, handler resolution (501 when the API cannot provide the
    /// named handler), and the post-dispatch outcome override.
    async fn dispatch_to_view(
        &self,
        _key: &RouteKey,
        entry: &RouteEntry,
        request: &ApiRequest,
        params: PathParams,
    ) -> ApiResult<Outcome> {
        let handler_name = entry.methods().lookup(request.method()).ok_or_else(|| {
            ApiError::method_not_allowed(entry.methods().allowed_methods_excluding(OPTIONS_HANDLER))
        })?;

        self.api.authorize(request)?;

        let params = self.api.pre_dispatch(request, &params).unwrap_or(params);

        if handler_name == OPTIONS_HANDLER {
            return Ok(Self::options_response(entry));
        }

        let invocation = self
            .api
            .invoke(handler_name, request, &params)
            .ok_or(ApiError::NotImplementedRoute)?;
        let outcome = invocation.await?;

        Ok(self.api.post_dispatch(request, outcome))
    }

    /// Builds the auto-generated OPTIONS response for a route key.
    ///
    /// Answers 204 with an `Allow` header listing the key's registered
    /// methods; the synthetic OPTIONS entry itself is excluded.
    fn options_response(entry: &RouteEntry) -> Outcome {
        let allow = entry
            .methods()
            .allowed_methods_excluding(OPTIONS_HANDLER)
            .iter()
            .map(Method::as_str)
            .collect::<Vec<_>>()
            .join(",");

        let response = http::Response::builder()
            .status(StatusCode::NO_CONTENT)
            .header(header::ALLOW, allow)
            .body(Bytes::new())
            .unwrap_or_else(|_| http::Response::new(Bytes::new()));

        Outcome::Response(response)
    }
}

impl std::fmt::Debug for Endpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Endpoint")
            .field("api_name", &self.api.api_name())
            .field("routes", &self.table.len())
            .finish()
    }
}

/// Builder for [`Endpoint`].
///
/// The route table is compiled at [`build`](EndpointBuilder::build) time and
/// never afterwards.
pub struct EndpointBuilder {
    api: Arc<dyn ResourceApi>,
    config: ApiConfig,
    codecs: Option<CodecRegistry>,
    request_chain: Option<NegotiatorChain>,
    response_chain: Option<NegotiatorChain>,
}

impl EndpointBuilder {
    /// Creates a builder for the given API.
    #[must_use]
    pub fn new(api: Arc<dyn ResourceApi>) -> Self {
        Self {
            api,
            config: ApiConfig::default(),
            codecs: None,
            request_chain: None,
            response_chain: None,
        }
    }

    /// Sets the endpoint configuration.
    #[must_use]
    pub fn config(mut self, config: ApiConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets the codec registry.
    ///
    /// Defaults to a registry with the JSON codec.
    #[must_use]
    pub fn codecs(mut self, codecs: CodecRegistry) -> Self {
        self.codecs = Some(codecs);
        self
    }

    /// Sets the request-body negotiator chain.
    ///
    /// Defaults to `Content-Type`, then `Accept`, then the configured
    /// default content type.
    #[must_use]
    pub fn request_chain(mut self, chain: NegotiatorChain) -> Self {
        self.request_chain = Some(chain);
        self
    }

    /// Sets the response-body negotiator chain.
    ///
    /// Defaults to `Accept`, then `Content-Type`, then the configured
    /// default content type.
    #[must_use]
    pub fn response_chain(mut self, chain: NegotiatorChain) -> Self {
        self.response_chain = Some(chain);
        self
    }

    /// Compiles the route table and builds the endpoint.
    #[must_use]
    pub fn build(self) -> Endpoint {
        let table = RouteTable::compile(
            &self.api.routes(),
            self.api.api_name(),
            self.config.url_prefix(),
            &self.api.id_pattern(),
            self.api.respond_to_options(),
        );

        let default_type = self.config.default_content_type().to_string();
        Endpoint {
            table,
            codecs: self.codecs.unwrap_or_else(CodecRegistry::with_json),
            request_chain: self
                .request_chain
                .unwrap_or_else(|| NegotiatorChain::request_default(&default_type)),
            response_chain: self
                .response_chain
                .unwrap_or_else(|| NegotiatorChain::response_default(&default_type)),
            config: self.config,
            api: self.api,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::HandlerFuture;
    use serde_json::json;
    use terrace_core::{codes, Listing};
    use terrace_routes::{Route, RouteSet};

    /// A widget API with listing, create and detail handlers, plus a route
    /// declared for a handler that is deliberately not provided.
    struct WidgetApi {
        authorized: bool,
    }

    impl Default for WidgetApi {
        fn default() -> Self {
            Self { authorized: true }
        }
    }

    impl ResourceApi for WidgetApi {
        fn api_name(&self) -> &str {
            "widgets"
        }

        fn routes(&self) -> RouteSet {
            RouteSet::new()
                .route(Route::listing("object_list"))
                .route(Route::create("object_create"))
                .route(Route::detail("object_detail"))
                .route(Route::collection_action(
                    "missing_handler",
                    "export",
                    &[Method::GET],
                ))
        }

        fn invoke<'a>(
            &'a self,
            handler: &str,
            request: &'a ApiRequest,
            params: &'a PathParams,
        ) -> Option<HandlerFuture<'a>> {
            match handler {
                "object_list" => Some(Box::pin(async move {
                    let limit = request
                        .query_param("limit")
                        .and_then(|v| v.parse().ok())
                        .unwrap_or(50);
                    let offset = request
                        .query_param("offset")
                        .and_then(|v| v.parse().ok())
                        .unwrap_or(0);
                    Outcome::resource(&Listing::new(vec![json!({"id": 1})], limit, offset))
                })),
                "object_create" => Some(Box::pin(async move {
                    let body = crate::body::decode_body(request)?;
                    Outcome::with_status(&body, StatusCode::CREATED)
                })),
                "object_detail" => Some(Box::pin(async move {
                    let id = params.get("resource_id").unwrap_or("0");
                    if id == "999" {
                        return Err(ApiError::not_found("No widget with id 999."));
                    }
                    Outcome::resource(&json!({"id": id}))
                })),
                _ => None,
            }
        }

        fn authorize(&self, _request: &ApiRequest) -> ApiResult<()> {
            if self.authorized {
                Ok(())
            } else {
                Err(ApiError::immediate(403, 0, "Login required"))
            }
        }
    }

    fn get(path: &str) -> ApiRequest {
        ApiRequest::builder().uri(path).build()
    }

    fn body_json(response: &HttpResponse) -> serde_json::Value {
        serde_json::from_slice(response.body()).unwrap()
    }

    #[tokio::test]
    async fn test_listing_dispatch() {
        let endpoint = Endpoint::new(WidgetApi::default());
        let response = endpoint.dispatch(get("/widgets/")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(&response);
        assert_eq!(body["limit"], 50);
        assert_eq!(body["offset"], 0);
        assert_eq!(body["results"][0]["id"], 1);
    }

    #[tokio::test]
    async fn test_detail_dispatch_extracts_id() {
        let endpoint = Endpoint::new(WidgetApi::default());
        let response = endpoint.dispatch(get("/widgets/42/")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(&response)["id"], "42");
    }

    #[tokio::test]
    async fn test_not_found_from_handler() {
        let endpoint = Endpoint::new(WidgetApi::default());
        let response = endpoint.dispatch(get("/widgets/999/")).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_json(&response)["code"], codes::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_unknown_path_is_404() {
        let endpoint = Endpoint::new(WidgetApi::default());
        let response = endpoint.dispatch(get("/gadgets/")).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_undeclared_method_is_405_with_allow() {
        let endpoint = Endpoint::new(WidgetApi::default());
        let request = ApiRequest::builder()
            .method(Method::DELETE)
            .uri("/widgets/5/")
            .build();
        let response = endpoint.dispatch(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(response.headers()[header::ALLOW], "GET");
    }

    #[tokio::test]
    async fn test_options_response() {
        let endpoint = Endpoint::new(WidgetApi::default());
        let request = ApiRequest::builder()
            .method(Method::OPTIONS)
            .uri("/widgets/")
            .build();
        let response = endpoint.dispatch(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        assert_eq!(response.headers()[header::ALLOW], "GET,POST");
        assert!(response.body().is_empty());
    }

    #[tokio::test]
    async fn test_missing_handler_is_501() {
        let endpoint = Endpoint::new(WidgetApi::default());
        let response = endpoint.dispatch(get("/widgets/export/")).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_IMPLEMENTED);
        assert_eq!(body_json(&response)["code"], codes::NOT_IMPLEMENTED);
    }

    #[tokio::test]
    async fn test_unauthorized_request_is_403() {
        let endpoint = Endpoint::new(WidgetApi { authorized: false });
        let response = endpoint.dispatch(get("/widgets/")).await.unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert_eq!(body_json(&response)["message"], "Login required");
    }

    #[tokio::test]
    async fn test_unsupported_content_type_is_plain_406() {
        let endpoint = Endpoint::new(WidgetApi::default());
        let request = ApiRequest::builder()
            .uri("/widgets/")
            .header("accept", "text/csv")
            .build();
        let response = endpoint.dispatch(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_ACCEPTABLE);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "text/plain; charset=utf-8"
        );
    }

    #[tokio::test]
    async fn test_create_round_trips_body() {
        let endpoint = Endpoint::new(WidgetApi::default());
        let request = ApiRequest::builder()
            .method(Method::POST)
            .uri("/widgets/")
            .body(r#"{"name":"spanner"}"#)
            .build();
        let response = endpoint.dispatch(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(body_json(&response)["name"], "spanner");
    }

    #[tokio::test]
    async fn test_url_prefix_configuration() {
        let endpoint = Endpoint::builder(WidgetApi::default())
            .config(ApiConfig::builder().url_prefix("api/v1/").build())
            .build();
        assert!(endpoint.matches("/api/v1/widgets/"));
        assert!(!endpoint.matches("/widgets/"));
    }

    /// An API that disables the OPTIONS pseudo-handler.
    struct NoOptionsApi;

    impl ResourceApi for NoOptionsApi {
        fn api_name(&self) -> &str {
            "widgets"
        }

        fn routes(&self) -> RouteSet {
            RouteSet::new().route(Route::listing("object_list"))
        }

        fn invoke<'a>(
            &'a self,
            handler: &str,
            _request: &'a ApiRequest,
            _params: &'a PathParams,
        ) -> Option<HandlerFuture<'a>> {
            match handler {
                "object_list" => Some(Box::pin(async { Ok(Outcome::NoContent) })),
                _ => None,
            }
        }

        fn respond_to_options(&self) -> bool {
            false
        }
    }

    #[tokio::test]
    async fn test_options_disabled_is_405() {
        let endpoint = Endpoint::new(NoOptionsApi);
        let request = ApiRequest::builder()
            .method(Method::OPTIONS)
            .uri("/widgets/")
            .build();
        let response = endpoint.dispatch(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(response.headers()[header::ALLOW], "GET");
    }

    #[tokio::test]
    async fn test_no_content_outcome() {
        let endpoint = Endpoint::new(NoOptionsApi);
        let response = endpoint.dispatch(get("/widgets/")).await.unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        assert!(response.body().is_empty());
    }
}
