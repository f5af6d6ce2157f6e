//! Property metadata for entity types.

/// Default value for a property the caller leaves out.
#[derive(Debug, Clone, PartialEq)]
pub enum DefaultValue {
    /// Null value.
    Null,
    /// Boolean value.
    Bool(bool),
    /// Integer value.
    Int(i64),
    /// Floating point value.
    Float(f64),
    /// String value.
    String(String),
    /// Per-table increasing integer.
    AutoIncrement,
    /// Auto-generated UUID.
    AutoUuid,
    /// Current timestamp (evaluated at insert time).
    CurrentTimestamp,
}

impl DefaultValue {
    /// Check whether the value is produced by the store rather than fixed.
    pub fn is_generator(&self) -> bool {
        matches!(
            self,
            DefaultValue::AutoIncrement | DefaultValue::AutoUuid | DefaultValue::CurrentTimestamp
        )
    }
}

/// Metadata for one non-relation property.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyMetadata {
    /// Property name.
    pub name: String,
    /// Whether the store rejects records that leave this property out.
    pub required: bool,
    /// Default value or generator.
    pub default: Option<DefaultValue>,
    /// Whether this is the identity property.
    pub identity: bool,
}

impl PropertyMetadata {
    /// Create a new required property.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            required: true,
            default: None,
            identity: false,
        }
    }

    /// Create an optional property (required = false).
    pub fn optional(name: impl Into<String>) -> Self {
        Self {
            required: false,
            ..Self::new(name)
        }
    }

    /// Create an identity property filled by the given generator when absent.
    pub fn identity(name: impl Into<String>, generator: DefaultValue) -> Self {
        Self {
            identity: true,
            default: Some(generator),
            ..Self::new(name)
        }
    }

    /// Set the default value.
    pub fn with_default(mut self, default: DefaultValue) -> Self {
        self.default = Some(default);
        self
    }

    /// Check if this property has a default value or generator.
    pub fn has_default_or_generator(&self) -> bool {
        self.default.is_some()
    }
}
