//! The mapping factory.
//!
//! [`SchemaBuilder`] walks a record type's fields through the static
//! [`field_rules`] table (ordered, first match wins) and produces a
//! [`MappedSchema`]: the derived [`ResourceSchema`] plus the paired forward
//! and reverse conversions. Record field kinds with no matching rule are
//! silently skipped, and fields matched by the non-reversible predicate
//! table are carried forward but never written back.

use std::sync::Arc;

use serde_json::Value;
use thiserror::Error;

use terrace_core::{ApiError, ApiResult};

use crate::fields::{FieldKind, FieldSpec, RecordField, ResourceFieldKind};
use crate::record::{Record, RecordStore, RecordType};
use crate::schema::{MappedResource, ResourceSchema};

/// A mapping configuration error.
#[derive(Error, Debug)]
pub enum MappingError {
    /// A save or update was attempted against a store managing a different
    /// record type than the mapping was derived from.
    #[error("no mapping between resource `{resource}` and record `{record}`")]
    NoMapping {
        /// The resource schema's record name.
        resource: String,
        /// The store's record name.
        record: String,
    },
}

impl From<MappingError> for ApiError {
    fn from(err: MappingError) -> Self {
        ApiError::internal_with_source("resource mapping misconfigured", err)
    }
}

/// One entry of the field-type mapping table.
pub struct FieldRule {
    /// Whether this rule applies to a record field kind.
    pub matches: fn(&FieldKind) -> bool,
    /// Builds the resource field spec, transferring attributes.
    pub build: fn(&RecordField) -> FieldSpec,
}

/// Transfers the attributes shared by every rule.
///
/// The storage "no default" sentinel (`None`) maps to an absent resource
/// default rather than being copied as a value.
fn transfer_common(field: &RecordField, kind: ResourceFieldKind) -> FieldSpec {
    FieldSpec {
        name: field.name.clone(),
        kind,
        nullable: field.nullable,
        default: field.default.clone(),
        choices: field.choices.clone(),
    }
}

/// The static field-type mapping table, ordered, first match wins.
///
/// `AutoId` deliberately has no entry: record field kinds without a rule
/// have no resource equivalent and are skipped.
#[must_use]
pub fn field_rules() -> &'static [FieldRule] {
    static RULES: &[FieldRule] = &[
        FieldRule {
            matches: |kind| matches!(kind, FieldKind::Char { .. }),
            build: |field| {
                let max_length = match field.kind {
                    FieldKind::Char { max_length } => max_length,
                    _ => None,
                };
                transfer_common(field, ResourceFieldKind::String { max_length })
            },
        },
        FieldRule {
            matches: |kind| matches!(kind, FieldKind::Text),
            build: |field| transfer_common(field, ResourceFieldKind::String { max_length: None }),
        },
        FieldRule {
            matches: |kind| matches!(kind, FieldKind::Integer),
            build: |field| transfer_common(field, ResourceFieldKind::Integer),
        },
        FieldRule {
            matches: |kind| matches!(kind, FieldKind::Float),
            build: |field| transfer_common(field, ResourceFieldKind::Float),
        },
        FieldRule {
            matches: |kind| matches!(kind, FieldKind::Boolean),
            build: |field| transfer_common(field, ResourceFieldKind::Boolean),
        },
        FieldRule {
            matches: |kind| matches!(kind, FieldKind::Date),
            build: |field| transfer_common(field, ResourceFieldKind::Date),
        },
        FieldRule {
            matches: |kind| matches!(kind, FieldKind::Time),
            build: |field| transfer_common(field, ResourceFieldKind::Time),
        },
        FieldRule {
            matches: |kind| matches!(kind, FieldKind::DateTime),
            build: |field| transfer_common(field, ResourceFieldKind::DateTime),
        },
        FieldRule {
            matches: |kind| matches!(kind, FieldKind::Url),
            build: |field| transfer_common(field, ResourceFieldKind::Url),
        },
        FieldRule {
            matches: |kind| matches!(kind, FieldKind::Embedded),
            build: |field| transfer_common(field, ResourceFieldKind::Dict),
        },
        FieldRule {
            matches: |kind| matches!(kind, FieldKind::EmbeddedList),
            build: |field| transfer_common(field, ResourceFieldKind::List),
        },
    ];
    RULES
}

/// Looks up the first matching rule for a record field.
fn spec_for_field(field: &RecordField) -> Option<FieldSpec> {
    field_rules()
        .iter()
        .find(|rule| (rule.matches)(&field.kind))
        .map(|rule| (rule.build)(field))
}

/// Predicates marking record fields that must never be written back.
///
/// Kept separate from the mapping table: a field can have a resource
/// equivalent (it appears on the wire) while still being owned by the
/// storage layer.
fn is_reverse_excluded(field: &RecordField) -> bool {
    static PREDICATES: &[fn(&RecordField) -> bool] = &[|field| field.auto_populated];
    PREDICATES.iter().any(|predicate| predicate(field))
}

/// One mapped field: the record field plus its derived spec.
#[derive(Debug, Clone)]
struct FieldPair {
    field: RecordField,
    reverse_excluded: bool,
}

/// Builder deriving a resource schema and its mappings from a record type.
///
/// # Example
///
/// ```rust,ignore
/// let mapping = SchemaBuilder::for_record::<Widget>()
///     .exclude_field("internal_notes")
///     .with_extra_field(FieldSpec::new("kind", ResourceFieldKind::String { max_length: None })
///         .with_default(json!("widget")))
///     .build();
/// ```
#[derive(Debug, Clone)]
pub struct SchemaBuilder {
    record_name: &'static str,
    record_fields: Vec<RecordField>,
    exclude: Vec<String>,
    include: Option<Vec<String>>,
    extra: Vec<FieldSpec>,
    resource_name: Option<String>,
}

impl SchemaBuilder {
    /// Starts a builder over a record type's declared fields.
    #[must_use]
    pub fn for_record<R: RecordType>() -> Self {
        Self {
            record_name: R::record_name(),
            record_fields: R::record_fields(),
            exclude: Vec::new(),
            include: None,
            extra: Vec::new(),
            resource_name: None,
        }
    }

    /// Excludes a record field from the derived schema.
    #[must_use]
    pub fn exclude_field(mut self, name: impl Into<String>) -> Self {
        self.exclude.push(name.into());
        self
    }

    /// Restricts the derived schema to an explicit field list.
    #[must_use]
    pub fn include_fields<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.include = Some(names.into_iter().map(Into::into).collect());
        self
    }

    /// Merges an extra caller-supplied field into the schema.
    ///
    /// An extra field overrides an auto-derived field of the same name.
    #[must_use]
    pub fn with_extra_field(mut self, spec: FieldSpec) -> Self {
        self.extra.push(spec);
        self
    }

    /// Overrides the resource name (defaults to the record name).
    #[must_use]
    pub fn resource_name(mut self, name: impl Into<String>) -> Self {
        self.resource_name = Some(name.into());
        self
    }

    /// Derives the schema and mappings.
    #[must_use]
    pub fn build(self) -> MappedSchema {
        let mut specs: Vec<FieldSpec> = Vec::new();
        let mut pairs: Vec<FieldPair> = Vec::new();

        for field in &self.record_fields {
            if self.exclude.iter().any(|name| name == &field.name) {
                continue;
            }
            if let Some(include) = &self.include {
                if !include.iter().any(|name| name == &field.name) {
                    continue;
                }
            }

            // Fields with no matching rule have no resource equivalent.
            let Some(spec) = spec_for_field(field) else {
                continue;
            };

            specs.push(spec);
            pairs.push(FieldPair {
                field: field.clone(),
                reverse_excluded: is_reverse_excluded(field),
            });
        }

        // Extra fields override same-name derived fields.
        for extra in self.extra {
            match specs.iter_mut().find(|spec| spec.name == extra.name) {
                Some(existing) => *existing = extra,
                None => specs.push(extra),
            }
        }

        let name = self
            .resource_name
            .unwrap_or_else(|| self.record_name.to_string());

        MappedSchema {
            schema: Arc::new(ResourceSchema::new(name, specs)),
            record_name: self.record_name,
            pairs,
        }
    }
}

/// A derived resource schema together with its conversions.
///
/// Built once at startup and reused for the process lifetime.
#[derive(Debug, Clone)]
pub struct MappedSchema {
    schema: Arc<ResourceSchema>,
    record_name: &'static str,
    pairs: Vec<FieldPair>,
}

impl MappedSchema {
    /// Returns the derived schema descriptor.
    #[must_use]
    pub fn schema(&self) -> Arc<ResourceSchema> {
        Arc::clone(&self.schema)
    }

    /// Returns the record type name the schema was derived from.
    #[must_use]
    pub fn record_name(&self) -> &str {
        self.record_name
    }

    /// Returns the names of fields excluded from the reverse mapping.
    #[must_use]
    pub fn reverse_excluded(&self) -> Vec<&str> {
        self.pairs
            .iter()
            .filter(|pair| pair.reverse_excluded)
            .map(|pair| pair.field.name.as_str())
            .collect()
    }

    /// Forward conversion: record to resource.
    #[must_use]
    pub fn forward(&self, record: &dyn Record) -> MappedResource {
        let mut resource = MappedResource::new(self.schema());
        for pair in &self.pairs {
            if let Some(value) = record.get_field(&pair.field.name) {
                resource.set(&pair.field.name, value);
            }
        }
        resource
    }

    /// Reverse conversion: writes the resource's mapped fields onto a
    /// record.
    ///
    /// Reverse-excluded fields are never written. An absent resource value
    /// writes null when the field is nullable and leaves the record
    /// untouched otherwise.
    pub fn reverse(&self, resource: &MappedResource, record: &mut dyn Record) {
        for pair in &self.pairs {
            if pair.reverse_excluded {
                continue;
            }
            if let Some(value) = self.effective_value(resource, pair) {
                record.set_field(&pair.field.name, value);
            }
        }
    }

    /// Returns the value the reverse mapping would write for a pair.
    ///
    /// This is also the diff's equality rule: an absent resource value
    /// equals null for nullable fields, and is "not supplied" (no write, no
    /// difference) otherwise.
    fn effective_value(&self, resource: &MappedResource, pair: &FieldPair) -> Option<Value> {
        match resource.get(&pair.field.name) {
            Some(value) => Some(value.clone()),
            None if pair.field.nullable => Some(Value::Null),
            None => None,
        }
    }

    /// Computes the fields on which the resource and record disagree.
    ///
    /// Reverse-excluded fields never appear in the diff.
    #[must_use]
    pub fn diff(&self, resource: &MappedResource, record: &dyn Record) -> Vec<String> {
        self.pairs
            .iter()
            .filter(|pair| !pair.reverse_excluded)
            .filter_map(|pair| {
                let proposed = self.effective_value(resource, pair)?;
                let current = record
                    .get_field(&pair.field.name)
                    .unwrap_or(Value::Null);
                (proposed != current).then(|| pair.field.name.clone())
            })
            .collect()
    }

    /// Converts the resource into a new record via the reverse mapping,
    /// optionally persisting it.
    ///
    /// # Errors
    ///
    /// Fails immediately with a configuration error when the store manages
    /// a different record type, and propagates storage errors from the
    /// write.
    pub fn save<S: RecordStore>(
        &self,
        resource: &MappedResource,
        store: &S,
        commit: bool,
    ) -> ApiResult<S::Rec> {
        if S::Rec::record_name() != self.record_name {
            return Err(MappingError::NoMapping {
                resource: self.schema.name().to_string(),
                record: S::Rec::record_name().to_string(),
            }
            .into());
        }

        let mut record = store.new_record();
        self.reverse(resource, &mut record);
        if commit {
            store.save(&mut record)?;
        }
        Ok(record)
    }

    /// Updates an existing record from the resource.
    ///
    /// With `lazy` set, the record and resource are diffed first and no
    /// write occurs when they already agree on every mapped field. Returns
    /// whether a write was performed.
    ///
    /// # Panics
    ///
    /// Panics when the store manages a different record type than this
    /// mapping was derived from; that is a defect in wiring, not a runtime
    /// condition.
    ///
    /// # Errors
    ///
    /// Propagates storage errors from the write.
    pub fn update<S: RecordStore>(
        &self,
        resource: &MappedResource,
        record: &mut S::Rec,
        store: &S,
        lazy: bool,
        commit: bool,
    ) -> ApiResult<bool> {
        assert_eq!(
            S::Rec::record_name(),
            self.record_name,
            "update called with a record of the wrong type"
        );

        if lazy && self.diff(resource, record).is_empty() {
            return Ok(false);
        }

        self.reverse(resource, record);
        if commit {
            store.save(record)?;
        }
        Ok(true)
    }
}
