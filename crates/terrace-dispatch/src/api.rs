//! The resource API trait.
//!
//! A [`ResourceApi`] is the unit an [`Endpoint`](crate::Endpoint) is built
//! around: it names the resource, declares its routes, and resolves handler
//! names to invocations. Capabilities compose explicitly; an API implements
//! or delegates to exactly the handlers it declares, and a declared handler
//! the API cannot resolve is answered with 501 so the gap is noticed.

use std::future::Future;
use std::pin::Pin;

use terrace_core::{ApiRequest, ApiResult};
use terrace_routes::{IdPattern, PathParams, RouteSet};

use crate::outcome::Outcome;

/// A type-erased handler invocation.
pub type HandlerFuture<'a> = Pin<Box<dyn Future<Output = ApiResult<Outcome>> + Send + 'a>>;

/// A resource API: a named resource, its routes, and its handlers.
///
/// # Example
///
/// ```rust,ignore
/// use terrace_dispatch::{HandlerFuture, Outcome, ResourceApi};
/// use terrace_core::{ApiRequest, Listing};
/// use terrace_routes::{PathParams, Route, RouteSet};
///
/// struct WidgetApi;
///
/// impl ResourceApi for WidgetApi {
///     fn api_name(&self) -> &str {
///         "widgets"
///     }
///
///     fn routes(&self) -> RouteSet {
///         RouteSet::new().route(Route::listing("object_list"))
///     }
///
///     fn invoke<'a>(
///         &'a self,
///         handler: &str,
///         request: &'a ApiRequest,
///         params: &'a PathParams,
///     ) -> Option<HandlerFuture<'a>> {
///         match handler {
///             "object_list" => Some(Box::pin(async move {
///                 Outcome::resource(&Listing::<u32>::new(vec![], 50, 0))
///             })),
///             _ => None,
///         }
///     }
/// }
/// ```
pub trait ResourceApi: Send + Sync + 'static {
    /// The resource name the API is exposed under (e.g. `"widgets"`).
    ///
    /// Lowercased into the URL.
    fn api_name(&self) -> &str;

    /// Declares the API's routes, in declaration order.
    ///
    /// Called once when the endpoint compiles its dispatch table. APIs
    /// layering on a base can merge the base's set with
    /// [`RouteSet::extend_inherited`].
    fn routes(&self) -> RouteSet;

    /// Resolves a handler name into an invocation.
    ///
    /// Returns `None` when the API does not provide the named handler; the
    /// dispatcher answers that with 501 rather than 404 or 405, because it
    /// indicates a declared-but-unimplemented route.
    fn invoke<'a>(
        &'a self,
        handler: &str,
        request: &'a ApiRequest,
        params: &'a PathParams,
    ) -> Option<HandlerFuture<'a>>;

    /// Evaluates whether a request is authorized.
    ///
    /// Runs before the handler. Return an error to short-circuit; an
    /// [`ApiError::immediate`](terrace_core::ApiError::immediate) with
    /// status 403 gives the conventional "login required" response.
    fn authorize(&self, _request: &ApiRequest) -> ApiResult<()> {
        Ok(())
    }

    /// Pre-dispatch hook.
    ///
    /// Returning `Some` replaces the path parameters passed to the handler;
    /// `None` means no override.
    fn pre_dispatch(&self, _request: &ApiRequest, _params: &PathParams) -> Option<PathParams> {
        None
    }

    /// Post-dispatch hook; the returned outcome replaces the handler's.
    fn post_dispatch(&self, _request: &ApiRequest, outcome: Outcome) -> Outcome {
        outcome
    }

    /// Whether an OPTIONS pseudo-handler is auto-registered on every route
    /// key.
    fn respond_to_options(&self) -> bool {
        true
    }

    /// The pattern a resource identifier segment must match.
    fn id_pattern(&self) -> IdPattern {
        IdPattern::digits()
    }
}
