//! Typed metadata for products and options.
//!
//! Metadata is a key-value map whose keys are declared by [`FieldDefinition`]s.
//! Values are checked against the declared type when they are written, so
//! readers can rely on the shape of what they get back.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::ConfiguratorError;
use crate::ids::FieldDefinitionId;

/// Declared type of a metadata field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FieldType {
    Text,
    Number,
    Boolean,
    /// One of a fixed set of text values.
    Select { choices: Vec<String> },
    /// An absolute URL.
    Url,
}

impl FieldType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldType::Text => "text",
            FieldType::Number => "number",
            FieldType::Boolean => "boolean",
            FieldType::Select { .. } => "select",
            FieldType::Url => "url",
        }
    }
}

/// Which rows a field definition applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum FieldScope {
    #[default]
    Product,
    Option,
}

/// A declared metadata field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDefinition {
    pub id: FieldDefinitionId,
    /// Key used in metadata maps.
    pub key: String,
    /// Human-readable label.
    pub label: String,
    pub field_type: FieldType,
    #[serde(default)]
    pub scope: FieldScope,
    /// Whether every row in scope must carry the field.
    #[serde(default)]
    pub required: bool,
}

/// A typed metadata value.
///
/// Select and URL fields are stored as text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum FieldValue {
    Text(String),
    Number(Decimal),
    Boolean(bool),
}

impl FieldValue {
    fn kind(&self) -> &'static str {
        match self {
            FieldValue::Text(_) => "text",
            FieldValue::Number(_) => "number",
            FieldValue::Boolean(_) => "boolean",
        }
    }
}

/// Metadata attached to a product or option.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MetadataMap(BTreeMap<String, FieldValue>);

impl MetadataMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: FieldValue) -> Option<FieldValue> {
        self.0.insert(key.into(), value)
    }

    pub fn get(&self, key: &str) -> Option<&FieldValue> {
        self.0.get(key)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &FieldValue)> {
        self.0.iter()
    }
}

/// Check `metadata` against the definitions in `scope`.
///
/// Rejects undeclared keys, values of the wrong type, select values outside
/// the declared choices, unparseable URLs and missing required fields.
pub fn validate_metadata(
    definitions: &[FieldDefinition],
    scope: FieldScope,
    metadata: &MetadataMap,
) -> Result<(), ConfiguratorError> {
    let in_scope: Vec<&FieldDefinition> =
        definitions.iter().filter(|d| d.scope == scope).collect();

    for (key, value) in metadata.iter() {
        let definition = in_scope
            .iter()
            .find(|d| &d.key == key)
            .ok_or_else(|| invalid(key, "no field definition"))?;
        check_value(definition, value)?;
    }

    if let Some(missing) = in_scope
        .iter()
        .find(|d| d.required && metadata.get(&d.key).is_none())
    {
        return Err(invalid(&missing.key, "required field is missing"));
    }

    Ok(())
}

fn check_value(definition: &FieldDefinition, value: &FieldValue) -> Result<(), ConfiguratorError> {
    match (&definition.field_type, value) {
        (FieldType::Text, FieldValue::Text(_))
        | (FieldType::Number, FieldValue::Number(_))
        | (FieldType::Boolean, FieldValue::Boolean(_)) => Ok(()),
        (FieldType::Select { choices }, FieldValue::Text(s)) => {
            if choices.iter().any(|c| c == s) {
                Ok(())
            } else {
                Err(invalid(
                    &definition.key,
                    &format!("'{}' is not one of: {}", s, choices.join(", ")),
                ))
            }
        }
        (FieldType::Url, FieldValue::Text(s)) => url::Url::parse(s)
            .map(|_| ())
            .map_err(|e| invalid(&definition.key, &format!("invalid url: {}", e))),
        (expected, got) => Err(invalid(
            &definition.key,
            &format!("expected {}, got {}", expected.as_str(), got.kind()),
        )),
    }
}

fn invalid(field: &str, reason: &str) -> ConfiguratorError {
    ConfiguratorError::InvalidMetadata {
        field: field.to_string(),
        reason: reason.to_string(),
    }
}
