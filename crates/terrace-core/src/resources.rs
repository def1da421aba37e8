//! Canonical wire resources.
//!
//! Two resource shapes are produced by the framework itself rather than by
//! handlers: [`ErrorBody`] for every structured failure and [`Listing`] for
//! paged collection results. Both are plain serde types so the negotiated
//! codec can encode them like any handler-produced resource.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Response resource returned for errors.
///
/// The `status` field mirrors the HTTP status code; `code` is a sub-status
/// for programmatic branching (for example `40000` for field validation
/// failures). `meta` carries structured detail such as a field-to-messages
/// map or the allowed method list.
///
/// # Example
///
/// ```
/// use terrace_core::ErrorBody;
///
/// let body = ErrorBody::new(404, 40400, "No widget with id 9.");
/// let json = serde_json::to_string(&body).unwrap();
/// assert!(json.contains("\"status\":404"));
/// assert!(!json.contains("developer_message"));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorBody {
    /// HTTP status code mirrored into the body.
    pub status: u16,
    /// Sub-status code for programmatic branching.
    pub code: u32,
    /// Human-readable error message.
    pub message: String,
    /// Additional detail aimed at the calling developer.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub developer_message: Option<String>,
    /// Structured metadata, such as a field error map.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<Value>,
}

impl ErrorBody {
    /// Creates a new error body.
    #[must_use]
    pub fn new(status: u16, code: u32, message: impl Into<String>) -> Self {
        Self {
            status,
            code,
            message: message.into(),
            developer_message: None,
            meta: None,
        }
    }

    /// Attaches a developer message.
    #[must_use]
    pub fn with_developer_message(mut self, message: impl Into<String>) -> Self {
        self.developer_message = Some(message.into());
        self
    }

    /// Attaches structured metadata.
    #[must_use]
    pub fn with_meta(mut self, meta: Value) -> Self {
        self.meta = Some(meta);
        self
    }
}

/// Response resource wrapping a page of listing results.
///
/// `limit` and `offset` echo the paging parameters the page was produced
/// with; `total_count` is included only when the handler supplied one.
///
/// # Example
///
/// ```
/// use terrace_core::Listing;
///
/// let page = Listing::new(vec!["a", "b"], 50, 0).with_total_count(2);
/// assert_eq!(page.results.len(), 2);
/// assert_eq!(page.total_count, Some(2));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Listing<T> {
    /// The page of results.
    pub results: Vec<T>,
    /// The page size the results were limited to.
    pub limit: u32,
    /// Offset of the first result from the start of the collection.
    pub offset: u32,
    /// Total size of the collection, when known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_count: Option<u64>,
}

impl<T> Listing<T> {
    /// Creates a new listing page.
    #[must_use]
    pub fn new(results: Vec<T>, limit: u32, offset: u32) -> Self {
        Self {
            results,
            limit,
            offset,
            total_count: None,
        }
    }

    /// Attaches the total collection size.
    #[must_use]
    pub fn with_total_count(mut self, total_count: u64) -> Self {
        self.total_count = Some(total_count);
        self
    }
}
