//! Record to resource mapping for Terrace.
//!
//! A persistent-storage record and the resource exposed over HTTP are
//! different shapes of the same data. This crate derives the resource shape
//! from a record type's field definitions and builds the conversion
//! functions between them:
//!
//! - [`RecordType`] and [`Record`] are the introspection and access
//!   contracts a storage record implements.
//! - [`SchemaBuilder`] walks the record's fields through a static
//!   first-match-wins rule table and produces a [`MappedSchema`]: an
//!   explicit [`ResourceSchema`] descriptor plus forward (record to
//!   resource) and reverse (resource to record) conversions, with
//!   diff-based lazy updates.
//! - [`MappedResource`] is the generic container carrying a schema
//!   descriptor and its field values, with `full_clean` validation.
//! - [`StoreApi`] composes the narrow capability traits ([`SupportsList`],
//!   [`SupportsCreate`], [`SupportsRetrieve`], [`SupportsUpdate`],
//!   [`SupportsDelete`]) over a [`RecordStore`] into a ready-made
//!   [`ResourceApi`](terrace_dispatch::ResourceApi).
//!
//! # Example
//!
//! ```rust,ignore
//! let mapping = SchemaBuilder::for_record::<Widget>()
//!     .exclude_field("internal_notes")
//!     .build();
//!
//! let resource = mapping.forward(&record);
//! let mut fresh = store.new_record();
//! mapping.reverse(&resource, &mut fresh);
//! ```

mod api;
mod factory;
mod fields;
mod memory;
mod record;
mod schema;

pub use api::{
    StoreApi, StoreApiBuilder, SupportsCreate, SupportsDelete, SupportsList, SupportsRetrieve,
    SupportsUpdate,
};
pub use factory::{field_rules, FieldRule, MappedSchema, MappingError, SchemaBuilder};
pub use fields::{FieldKind, FieldSpec, RecordField, ResourceFieldKind};
pub use memory::MemoryStore;
pub use record::{Record, RecordStore, RecordType, StoreError};
pub use schema::{MappedResource, ResourceSchema};
