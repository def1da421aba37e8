//! Declarative route registry and compiled dispatch tables for Terrace.
//!
//! Routes are declared once, in order, on a [`RouteSet`]; ancestors
//! contribute their already-declared sets; and the whole collection is
//! compiled exactly once into an immutable [`RouteTable`] mapping each
//! route key to a URL pattern and a method-to-handler map.
//!
//! # Example
//!
//! ```rust
//! use terrace_routes::{IdPattern, Route, RouteSet, RouteTable};
//! use http::Method;
//!
//! let routes = RouteSet::new()
//!     .route(Route::listing("object_list"))
//!     .route(Route::create("object_create"))
//!     .route(Route::detail("object_detail"));
//!
//! let table = RouteTable::compile(&routes, "widgets", "", &IdPattern::digits(), true);
//!
//! // Two route keys: the collection and the detail slot.
//! assert_eq!(table.len(), 2);
//!
//! let (key, entry, params) = table.match_path("/widgets/42/").unwrap();
//! assert_eq!(key.to_string(), "resource");
//! assert_eq!(entry.methods().lookup(&Method::GET), Some("object_detail"));
//! assert_eq!(params.get("resource_id"), Some("42"));
//! ```

mod method_map;
mod params;
mod route;
mod table;

pub use method_map::MethodMap;
pub use params::PathParams;
pub use route::{PathShape, Route, RouteKey};
pub use table::{IdPattern, RouteEntry, RouteSet, RouteTable, UrlSpec, OPTIONS_HANDLER};
