//! Storage record contracts.
//!
//! These traits are the seam between the mapping layer and whatever storage
//! engine backs it. A record type describes its fields for introspection
//! ([`RecordType`]), an instance exposes value access by field name
//! ([`Record`]), and a [`RecordStore`] provides the query and persistence
//! operations the store-backed API delegates to. All storage calls are
//! treated as single opaque synchronous operations.

use serde_json::Value;
use thiserror::Error;

use terrace_core::ApiError;

use crate::fields::RecordField;

/// An error surfaced by a storage operation.
#[derive(Error, Debug)]
#[error("storage error: {message}")]
pub struct StoreError {
    /// Description of the failure.
    pub message: String,
}

impl StoreError {
    /// Creates a new storage error.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        ApiError::internal_with_source("storage operation failed", err)
    }
}

/// Static introspection over a record type's declared fields.
pub trait RecordType {
    /// The record type's name (e.g. `"widget"`).
    fn record_name() -> &'static str;

    /// The record's fields, in declaration order.
    fn record_fields() -> Vec<RecordField>;
}

/// Value access on a record instance, by field name.
pub trait Record: Send + Sync {
    /// Returns the value of a field, or `None` for an unknown field name.
    fn get_field(&self, name: &str) -> Option<Value>;

    /// Sets the value of a field.
    ///
    /// Returns `false` when the field name is unknown; the value is then
    /// dropped.
    fn set_field(&mut self, name: &str, value: Value) -> bool;
}

/// Query and persistence operations over one record type.
///
/// Records are addressed by an integer identifier.
pub trait RecordStore: Send + Sync + 'static {
    /// The record type this store manages.
    type Rec: Record + RecordType + Clone + Send + Sync + 'static;

    /// Creates a fresh, unsaved record with default field values.
    fn new_record(&self) -> Self::Rec;

    /// Fetches a record by identifier.
    fn get(&self, id: i64) -> Option<Self::Rec>;

    /// Returns all records in identifier order.
    fn all(&self) -> Vec<Self::Rec>;

    /// Returns the total number of records.
    fn count(&self) -> u64;

    /// Persists a record, assigning an identifier when it has none.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] when the write fails.
    fn save(&self, record: &mut Self::Rec) -> Result<i64, StoreError>;

    /// Deletes a record by identifier.
    ///
    /// Returns `false` when no record had the identifier.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] when the delete fails.
    fn delete(&self, id: i64) -> Result<bool, StoreError>;
}
