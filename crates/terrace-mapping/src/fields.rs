//! Field definitions on both sides of a mapping.
//!
//! [`RecordField`] describes one field of a storage record as surfaced by
//! introspection; [`FieldSpec`] describes one field of the derived resource
//! schema, including its validation rules.

use serde_json::Value;

/// The storage-side type of a record field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldKind {
    /// Auto-assigned integer primary key.
    ///
    /// Deliberately has no entry in the mapping rule table, so primary keys
    /// are skipped when deriving a resource schema.
    AutoId,
    /// Bounded character field.
    Char {
        /// Maximum length in characters, when bounded.
        max_length: Option<u32>,
    },
    /// Unbounded text field.
    Text,
    /// Integer field.
    Integer,
    /// Floating point field.
    Float,
    /// Boolean field.
    Boolean,
    /// Calendar date field.
    Date,
    /// Time of day field.
    Time,
    /// Date and time field.
    DateTime,
    /// URL field.
    Url,
    /// A nested structured document.
    Embedded,
    /// A list of nested structured documents.
    EmbeddedList,
}

/// One field of a storage record, as surfaced by introspection.
///
/// `default: None` is the storage-side "no default" sentinel; the mapping
/// rule table transforms it into the resource schema's equivalent (an
/// absent default) rather than copying it verbatim.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordField {
    /// Field name.
    pub name: String,
    /// Storage-side type.
    pub kind: FieldKind,
    /// Whether the field accepts null.
    pub nullable: bool,
    /// Default value, when the storage layer declares one.
    pub default: Option<Value>,
    /// Permitted values, when constrained.
    pub choices: Option<Vec<Value>>,
    /// Whether the storage layer populates this field itself (for example
    /// an auto-now timestamp). Such fields are never written back.
    pub auto_populated: bool,
}

impl RecordField {
    /// Creates a field with the given name and kind.
    #[must_use]
    pub fn new(name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            kind,
            nullable: false,
            default: None,
            choices: None,
            auto_populated: false,
        }
    }

    /// Marks the field as nullable.
    #[must_use]
    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    /// Sets the storage-side default value.
    #[must_use]
    pub fn with_default(mut self, default: Value) -> Self {
        self.default = Some(default);
        self
    }

    /// Constrains the field to a set of permitted values.
    #[must_use]
    pub fn with_choices(mut self, choices: Vec<Value>) -> Self {
        self.choices = Some(choices);
        self
    }

    /// Marks the field as populated by the storage layer.
    #[must_use]
    pub fn auto_populated(mut self) -> Self {
        self.auto_populated = true;
        self
    }
}

/// The resource-side type of a schema field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceFieldKind {
    /// String, optionally bounded.
    String {
        /// Maximum length in characters, when bounded.
        max_length: Option<u32>,
    },
    /// Integer.
    Integer,
    /// Floating point number.
    Float,
    /// Boolean.
    Boolean,
    /// Calendar date in `YYYY-MM-DD` form.
    Date,
    /// Time of day in `HH:MM:SS` form.
    Time,
    /// RFC 3339 date-time.
    DateTime,
    /// Absolute URL.
    Url,
    /// A structured document.
    Dict,
    /// A list of values.
    List,
}

/// One field of a derived resource schema.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldSpec {
    /// Field name.
    pub name: String,
    /// Resource-side type.
    pub kind: ResourceFieldKind,
    /// Whether null is a valid value.
    pub nullable: bool,
    /// Default applied when the field is absent.
    pub default: Option<Value>,
    /// Permitted values, when constrained.
    pub choices: Option<Vec<Value>>,
}

impl FieldSpec {
    /// Creates a field spec with the given name and kind.
    #[must_use]
    pub fn new(name: impl Into<String>, kind: ResourceFieldKind) -> Self {
        Self {
            name: name.into(),
            kind,
            nullable: false,
            default: None,
            choices: None,
        }
    }

    /// Marks the field as nullable.
    #[must_use]
    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    /// Sets the default applied when the field is absent.
    #[must_use]
    pub fn with_default(mut self, default: Value) -> Self {
        self.default = Some(default);
        self
    }

    /// Constrains the field to a set of permitted values.
    #[must_use]
    pub fn with_choices(mut self, choices: Vec<Value>) -> Self {
        self.choices = Some(choices);
        self
    }

    /// Validates a single value against this spec.
    ///
    /// `None` means the field is absent from the resource. Defaults are
    /// applied by the caller before validation, so an absent field here is
    /// genuinely missing.
    ///
    /// # Errors
    ///
    /// Returns the messages describing every rule the value violates.
    pub fn validate(&self, value: Option<&Value>) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        let value = match value {
            None | Some(Value::Null) => {
                if !self.nullable {
                    errors.push("This field cannot be null.".to_string());
                }
                return if errors.is_empty() {
                    Ok(())
                } else {
                    Err(errors)
                };
            }
            Some(value) => value,
        };

        match &self.kind {
            ResourceFieldKind::String { max_length } => match value.as_str() {
                Some(s) => {
                    if let Some(max) = max_length {
                        if s.chars().count() > *max as usize {
                            errors.push(format!(
                                "Ensure this value has at most {max} characters."
                            ));
                        }
                    }
                }
                None => errors.push("Expected a string.".to_string()),
            },
            ResourceFieldKind::Integer => {
                if !(value.is_i64() || value.is_u64()) {
                    errors.push("Expected a whole number.".to_string());
                }
            }
            ResourceFieldKind::Float => {
                if !value.is_number() {
                    errors.push("Expected a number.".to_string());
                }
            }
            ResourceFieldKind::Boolean => {
                if !value.is_boolean() {
                    errors.push("Expected a boolean.".to_string());
                }
            }
            ResourceFieldKind::Date => match value.as_str() {
                Some(s) if chrono::NaiveDate::parse_from_str(s, "%Y-%m-%d").is_ok() => {}
                _ => errors.push("Expected a date in YYYY-MM-DD format.".to_string()),
            },
            ResourceFieldKind::Time => match value.as_str() {
                Some(s) if chrono::NaiveTime::parse_from_str(s, "%H:%M:%S").is_ok() => {}
                _ => errors.push("Expected a time in HH:MM:SS format.".to_string()),
            },
            ResourceFieldKind::DateTime => match value.as_str() {
                Some(s) if chrono::DateTime::parse_from_rfc3339(s).is_ok() => {}
                _ => errors.push("Expected an RFC 3339 date-time.".to_string()),
            },
            ResourceFieldKind::Url => match value.as_str() {
                Some(s)
                    if s.parse::<http::Uri>()
                        .map(|uri| uri.scheme().is_some())
                        .unwrap_or(false) => {}
                _ => errors.push("Expected an absolute URL.".to_string()),
            },
            ResourceFieldKind::Dict => {
                if !value.is_object() {
                    errors.push("Expected a structured document.".to_string());
                }
            }
            ResourceFieldKind::List => {
                if !value.is_array() {
                    errors.push("Expected a list.".to_string());
                }
            }
        }

        if let Some(choices) = &self.choices {
            if !choices.contains(value) {
                errors.push("Value is not a valid choice.".to_string());
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}
