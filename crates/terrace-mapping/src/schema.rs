//! Resource schema descriptors and the generic resource container.
//!
//! Instead of synthesizing nominal types at runtime, the factory produces a
//! [`ResourceSchema`] value describing the derived resource shape, and
//! resources travel as [`MappedResource`]: the schema descriptor plus an
//! ordered map of field values.

use std::sync::Arc;

use indexmap::IndexMap;
use serde_json::Value;

use terrace_core::{ApiError, ApiResult, FieldErrors};

use crate::fields::FieldSpec;

/// An explicit descriptor of a derived resource shape.
///
/// Fields keep the declaration order of the record they were derived from.
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceSchema {
    name: String,
    fields: IndexMap<String, FieldSpec>,
}

impl ResourceSchema {
    /// Creates a schema from an ordered field list.
    #[must_use]
    pub fn new(name: impl Into<String>, fields: Vec<FieldSpec>) -> Self {
        Self {
            name: name.into(),
            fields: fields
                .into_iter()
                .map(|spec| (spec.name.clone(), spec))
                .collect(),
        }
    }

    /// Returns the resource name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the spec for a field.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.get(name)
    }

    /// Returns an iterator over the field specs in declaration order.
    pub fn fields(&self) -> impl Iterator<Item = &FieldSpec> {
        self.fields.values()
    }

    /// Returns the number of fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns true if the schema has no fields.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// A resource instance: a schema descriptor plus its field values.
///
/// # Example
///
/// ```rust,ignore
/// let mut resource = MappedResource::new(schema.clone());
/// resource.set("name", json!("spanner"));
/// resource.full_clean()?;
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct MappedResource {
    schema: Arc<ResourceSchema>,
    values: IndexMap<String, Value>,
}

impl MappedResource {
    /// Creates an empty resource over a schema.
    #[must_use]
    pub fn new(schema: Arc<ResourceSchema>) -> Self {
        Self {
            schema,
            values: IndexMap::new(),
        }
    }

    /// Builds a resource from a decoded body value.
    ///
    /// Unknown fields in the value are dropped; validation happens
    /// separately via [`full_clean`](Self::full_clean).
    ///
    /// # Errors
    ///
    /// Returns a validation error when the value is not a structured
    /// document.
    pub fn from_value(schema: Arc<ResourceSchema>, value: Value) -> ApiResult<Self> {
        let Value::Object(entries) = value else {
            return Err(ApiError::validation("Expected a structured document."));
        };

        let mut resource = Self::new(schema);
        for (name, value) in entries {
            resource.set(&name, value);
        }
        Ok(resource)
    }

    /// Returns the schema descriptor.
    #[must_use]
    pub fn schema(&self) -> &Arc<ResourceSchema> {
        &self.schema
    }

    /// Returns the value of a field, when present.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    /// Sets the value of a schema field.
    ///
    /// Returns `false` (dropping the value) when the schema has no such
    /// field.
    pub fn set(&mut self, name: &str, value: Value) -> bool {
        if self.schema.field(name).is_some() {
            self.values.insert(name.to_string(), value);
            true
        } else {
            false
        }
    }

    /// Applies schema defaults to absent fields, then validates every field.
    ///
    /// # Errors
    ///
    /// Returns a validation error carrying the field-to-messages map when
    /// any field fails.
    pub fn full_clean(&mut self) -> ApiResult<()> {
        // Apply defaults before validating, so a field with a default never
        // fails the null check.
        for spec in self.schema.fields() {
            if !self.values.contains_key(&spec.name) {
                if let Some(default) = &spec.default {
                    self.values.insert(spec.name.clone(), default.clone());
                }
            }
        }

        let mut errors = FieldErrors::new();
        for spec in self.schema.fields() {
            if let Err(messages) = spec.validate(self.values.get(&spec.name)) {
                for message in messages {
                    errors.add(spec.name.clone(), message);
                }
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ApiError::validation_with_fields(errors))
        }
    }

    /// Converts the resource into a wire value.
    ///
    /// Every schema field appears in the output; absent fields serialize as
    /// null so the wire shape is stable.
    #[must_use]
    pub fn to_value(&self) -> Value {
        let mut object = serde_json::Map::with_capacity(self.schema.len());
        for spec in self.schema.fields() {
            let value = self.values.get(&spec.name).cloned().unwrap_or(Value::Null);
            object.insert(spec.name.clone(), value);
        }
        Value::Object(object)
    }
}
