//! Schema - Define type schemas for resources
//!
//! Providers define a schema for their own configuration and for each
//! resource type. Schemas validate attribute stores before any remote call
//! and decide which attributes the remote system owns (computed attributes).

use std::collections::HashMap;
use std::fmt;

use crate::resource::Value;

/// Attribute type
#[derive(Debug, Clone)]
pub enum AttributeType {
    /// String
    String,
    /// Integer
    Int,
    /// Floating point number (integers are accepted)
    Float,
    /// Boolean
    Bool,
    /// List
    List(Box<AttributeType>),
    /// Nested block, stored as a map of its fields
    Struct(Vec<AttributeSchema>),
}

impl AttributeType {
    /// Check if a value conforms to this type
    pub fn validate(&self, value: &Value) -> Result<(), TypeError> {
        match (self, value) {
            (AttributeType::String, Value::String(_)) => Ok(()),
            (AttributeType::Int, Value::Int(_)) => Ok(()),
            (AttributeType::Float, Value::Float(_) | Value::Int(_)) => Ok(()),
            (AttributeType::Bool, Value::Bool(_)) => Ok(()),

            (AttributeType::List(inner), Value::List(items)) => {
                for (i, item) in items.iter().enumerate() {
                    inner.validate(item).map_err(|e| TypeError::ListItemError {
                        index: i,
                        inner: Box::new(e),
                    })?;
                }
                Ok(())
            }

            (AttributeType::Struct(fields), Value::Map(map)) => {
                for field in fields {
                    match map.get(&field.name) {
                        Some(v) => field.attr_type.validate(v).map_err(|e| {
                            TypeError::FieldError {
                                field: field.name.clone(),
                                inner: Box::new(e),
                            }
                        })?,
                        None if field.required => {
                            return Err(TypeError::MissingRequired {
                                name: field.name.clone(),
                            });
                        }
                        None => {}
                    }
                }
                Ok(())
            }

            _ => Err(TypeError::TypeMismatch {
                expected: self.type_name(),
                got: value.type_name(),
            }),
        }
    }

    fn type_name(&self) -> String {
        match self {
            AttributeType::String => "String".to_string(),
            AttributeType::Int => "Int".to_string(),
            AttributeType::Float => "Float".to_string(),
            AttributeType::Bool => "Bool".to_string(),
            AttributeType::List(inner) => format!("List<{}>", inner.type_name()),
            AttributeType::Struct(fields) => {
                let names: Vec<&str> = fields.iter().map(|f| f.name.as_str()).collect();
                format!("{{{}}}", names.join(", "))
            }
        }
    }
}

impl fmt::Display for AttributeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.type_name())
    }
}

/// Type error
#[derive(Debug, Clone, thiserror::Error)]
pub enum TypeError {
    #[error("Type mismatch: expected {expected}, got {got}")]
    TypeMismatch { expected: String, got: String },

    #[error("Required attribute '{name}' is missing")]
    MissingRequired { name: String },

    #[error("Attribute '{name}' is computed and cannot be set")]
    ComputedAttribute { name: String },

    #[error("List item at index {index}: {inner}")]
    ListItemError { index: usize, inner: Box<TypeError> },

    #[error("Field '{field}': {inner}")]
    FieldError { field: String, inner: Box<TypeError> },
}

impl Value {
    fn type_name(&self) -> String {
        match self {
            Value::String(_) => "String".to_string(),
            Value::Int(_) => "Int".to_string(),
            Value::Float(_) => "Float".to_string(),
            Value::Bool(_) => "Bool".to_string(),
            Value::List(_) => "List".to_string(),
            Value::Map(_) => "Map".to_string(),
        }
    }
}

/// Attribute schema
#[derive(Debug, Clone)]
pub struct AttributeSchema {
    pub name: String,
    pub attr_type: AttributeType,
    pub required: bool,
    /// Set by the remote system; configuration may not supply it
    pub computed: bool,
    /// Redacted whenever attributes are displayed
    pub sensitive: bool,
    pub default: Option<Value>,
    /// Environment variable consulted when the attribute is not set
    pub env_default: Option<String>,
    pub description: Option<String>,
}

impl AttributeSchema {
    pub fn new(name: impl Into<String>, attr_type: AttributeType) -> Self {
        Self {
            name: name.into(),
            attr_type,
            required: false,
            computed: false,
            sensitive: false,
            default: None,
            env_default: None,
            description: None,
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn computed(mut self) -> Self {
        self.computed = true;
        self
    }

    pub fn sensitive(mut self) -> Self {
        self.sensitive = true;
        self
    }

    pub fn with_default(mut self, value: Value) -> Self {
        self.default = Some(value);
        self
    }

    pub fn with_env_default(mut self, var: impl Into<String>) -> Self {
        self.env_default = Some(var.into());
        self
    }

    pub fn with_description(mut self, desc: impl Into<String>) -> Self {
        self.description = Some(desc.into());
        self
    }

    /// "required", "optional" or "computed"
    pub fn mode(&self) -> &'static str {
        if self.computed {
            "computed"
        } else if self.required {
            "required"
        } else {
            "optional"
        }
    }
}

/// Resource schema
#[derive(Debug, Clone)]
pub struct ResourceSchema {
    pub resource_type: String,
    pub attributes: HashMap<String, AttributeSchema>,
    pub description: Option<String>,
}

impl ResourceSchema {
    pub fn new(resource_type: impl Into<String>) -> Self {
        Self {
            resource_type: resource_type.into(),
            attributes: HashMap::new(),
            description: None,
        }
    }

    pub fn attribute(mut self, schema: AttributeSchema) -> Self {
        self.attributes.insert(schema.name.clone(), schema);
        self
    }

    pub fn with_description(mut self, desc: impl Into<String>) -> Self {
        self.description = Some(desc.into());
        self
    }

    pub fn is_computed(&self, name: &str) -> bool {
        self.attributes.get(name).is_some_and(|a| a.computed)
    }

    pub fn is_sensitive(&self, name: &str) -> bool {
        self.attributes.get(name).is_some_and(|a| a.sensitive)
    }

    /// Attributes sorted by name
    pub fn sorted_attributes(&self) -> Vec<&AttributeSchema> {
        let mut attrs: Vec<&AttributeSchema> = self.attributes.values().collect();
        attrs.sort_by(|a, b| a.name.cmp(&b.name));
        attrs
    }

    /// Validate configured attributes
    pub fn validate(&self, attributes: &HashMap<String, Value>) -> Result<(), Vec<TypeError>> {
        let mut errors = Vec::new();

        // Check required attributes
        for (name, schema) in &self.attributes {
            if schema.required && !attributes.contains_key(name) && schema.default.is_none() {
                errors.push(TypeError::MissingRequired { name: name.clone() });
            }
        }

        // Type check each attribute
        for (name, value) in attributes {
            if let Some(schema) = self.attributes.get(name) {
                if schema.computed {
                    errors.push(TypeError::ComputedAttribute { name: name.clone() });
                } else if let Err(e) = schema.attr_type.validate(value) {
                    errors.push(TypeError::FieldError {
                        field: name.clone(),
                        inner: Box::new(e),
                    });
                }
            }
            // Unknown attributes are allowed (for flexibility)
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Fill unset attributes from their environment variable, then from their literal default
    pub fn resolve_defaults<F>(&self, attributes: &mut HashMap<String, Value>, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        for (name, schema) in &self.attributes {
            if attributes.contains_key(name) {
                continue;
            }
            if let Some(var) = &schema.env_default
                && let Some(value) = lookup(var)
            {
                attributes.insert(name.clone(), Value::String(value));
            } else if let Some(default) = &schema.default {
                attributes.insert(name.clone(), default.clone());
            }
        }
    }

    /// Attributes to send on update: configurable values come from `to`,
    /// computed values are carried over from `from`.
    pub fn merge_for_update(
        &self,
        from: &HashMap<String, Value>,
        to: &HashMap<String, Value>,
    ) -> HashMap<String, Value> {
        let mut merged: HashMap<String, Value> = to
            .iter()
            .filter(|(name, _)| !self.is_computed(name))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();

        for (name, schema) in &self.attributes {
            if schema.computed
                && let Some(value) = from.get(name)
            {
                merged.insert(name.clone(), value.clone());
            }
        }

        merged
    }
}
