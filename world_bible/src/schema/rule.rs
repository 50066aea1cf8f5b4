//! Compiled schema rules and the checks they run.

use chrono::NaiveDate;
use regex::Regex;
use serde::Serialize;
use serde_json::{Map, Value};
use url::Url;

use super::SchemaError;
use crate::entities::EntityType;

/// A single field-level violation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldViolation {
    /// Dotted path to the field, with `[index]` for list positions.
    pub path: String,
    /// The constraint that failed, in words.
    pub expected: String,
    /// The value found, or `None` when the field is missing.
    pub actual: Option<Value>,
}

impl std::fmt::Display for FieldViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.actual {
            Some(actual) => write!(f, "{}: expected {}, found {}", self.path, self.expected, actual),
            None => write!(f, "{}: expected {}, but it is missing", self.path, self.expected),
        }
    }
}

/// JSON value kinds a field may be declared as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    String,
    Number,
    Integer,
    Boolean,
    Array,
    Object,
    Null,
}

impl ValueKind {
    fn parse(name: &str) -> Option<Self> {
        Some(match name {
            "string" => ValueKind::String,
            "number" => ValueKind::Number,
            "integer" => ValueKind::Integer,
            "boolean" => ValueKind::Boolean,
            "array" => ValueKind::Array,
            "object" => ValueKind::Object,
            "null" => ValueKind::Null,
            _ => return None,
        })
    }

    fn as_str(&self) -> &'static str {
        match self {
            ValueKind::String => "string",
            ValueKind::Number => "number",
            ValueKind::Integer => "integer",
            ValueKind::Boolean => "boolean",
            ValueKind::Array => "array",
            ValueKind::Object => "object",
            ValueKind::Null => "null",
        }
    }

    fn accepts(&self, value: &Value) -> bool {
        match self {
            ValueKind::String => value.is_string(),
            ValueKind::Number => value.is_number(),
            ValueKind::Integer => value.is_i64() || value.is_u64(),
            ValueKind::Boolean => value.is_boolean(),
            ValueKind::Array => value.is_array(),
            ValueKind::Object => value.is_object(),
            ValueKind::Null => value.is_null(),
        }
    }
}

/// String formats understood by `format`. Unknown formats are not checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Format {
    Date,
    Uri,
}

impl Format {
    fn parse(name: &str) -> Option<Self> {
        match name {
            "date" => Some(Format::Date),
            "uri" => Some(Format::Uri),
            _ => None,
        }
    }

    fn accepts(&self, text: &str) -> bool {
        match self {
            Format::Date => NaiveDate::parse_from_str(text, "%Y-%m-%d").is_ok(),
            Format::Uri => Url::parse(text).is_ok(),
        }
    }

    fn as_str(&self) -> &'static str {
        match self {
            Format::Date => "date",
            Format::Uri => "uri",
        }
    }
}

/// Constraints on one field.
#[derive(Debug, Clone, Default)]
pub struct FieldRule {
    kinds: Vec<ValueKind>,
    pattern: Option<Regex>,
    format: Option<Format>,
    allowed: Option<Vec<Value>>,
    constant: Option<Value>,
    min_length: Option<usize>,
    max_length: Option<usize>,
    minimum: Option<f64>,
    maximum: Option<f64>,
    min_items: Option<usize>,
    items: Option<Box<FieldRule>>,
    object: Option<ObjectRule>,
}

/// Constraints on an object's members.
#[derive(Debug, Clone, Default)]
pub(crate) struct ObjectRule {
    required: Vec<String>,
    properties: Vec<(String, FieldRule)>,
    closed: bool,
}

impl ObjectRule {
    fn compile(schema: &Map<String, Value>, at: &str) -> Result<Self, SchemaError> {
        let required = match schema.get("required") {
            None => Vec::new(),
            Some(Value::Array(names)) => names
                .iter()
                .map(|name| {
                    name.as_str().map(str::to_string).ok_or_else(|| {
                        malformed(at, "`required` must list field names")
                    })
                })
                .collect::<Result<_, _>>()?,
            Some(_) => return Err(malformed(at, "`required` must be an array")),
        };

        let properties = match schema.get("properties") {
            None => Vec::new(),
            Some(Value::Object(fields)) => fields
                .iter()
                .map(|(name, rule)| {
                    let path = join(at, name);
                    FieldRule::compile(rule, &path).map(|rule| (name.clone(), rule))
                })
                .collect::<Result<_, _>>()?,
            Some(_) => return Err(malformed(at, "`properties` must be an object")),
        };

        let closed = matches!(schema.get("additionalProperties"), Some(Value::Bool(false)));

        Ok(Self {
            required,
            properties,
            closed,
        })
    }

    fn check(&self, fields: &Map<String, Value>, at: &str, out: &mut Vec<FieldViolation>) {
        for name in &self.required {
            if !fields.contains_key(name) {
                out.push(FieldViolation {
                    path: join(at, name),
                    expected: "a required field".to_string(),
                    actual: None,
                });
            }
        }

        for (name, rule) in &self.properties {
            if let Some(value) = fields.get(name) {
                rule.check(value, &join(at, name), out);
            }
        }

        if self.closed {
            for (name, value) in fields {
                if !self.properties.iter().any(|(declared, _)| declared == name) {
                    out.push(FieldViolation {
                        path: join(at, name),
                        expected: "no undeclared fields".to_string(),
                        actual: Some(value.clone()),
                    });
                }
            }
        }
    }
}

impl FieldRule {
    /// Compile a JSON Schema fragment.
    pub fn compile(schema: &Value, at: &str) -> Result<Self, SchemaError> {
        let Value::Object(schema) = schema else {
            return Err(malformed(at, "a field schema must be an object"));
        };

        let kinds = match schema.get("type") {
            None => Vec::new(),
            Some(Value::String(name)) => vec![kind(name, at)?],
            Some(Value::Array(names)) => names
                .iter()
                .map(|name| match name.as_str() {
                    Some(name) => kind(name, at),
                    None => Err(malformed(at, "`type` entries must be strings")),
                })
                .collect::<Result<_, _>>()?,
            Some(_) => return Err(malformed(at, "`type` must be a string or a list")),
        };

        let pattern = match schema.get("pattern") {
            None => None,
            Some(Value::String(pattern)) => {
                Some(Regex::new(pattern).map_err(|source| SchemaError::InvalidPattern {
                    field: at.to_string(),
                    source,
                })?)
            }
            Some(_) => return Err(malformed(at, "`pattern` must be a string")),
        };

        let allowed = match schema.get("enum") {
            None => None,
            Some(Value::Array(values)) => Some(values.clone()),
            Some(_) => return Err(malformed(at, "`enum` must be an array")),
        };

        let items = match schema.get("items") {
            None => None,
            Some(items) => Some(Box::new(FieldRule::compile(items, &format!("{}[]", at))?)),
        };

        let has_members = schema.contains_key("properties")
            || schema.contains_key("required")
            || schema.contains_key("additionalProperties");
        let object = if has_members {
            Some(ObjectRule::compile(schema, at)?)
        } else {
            None
        };

        Ok(Self {
            kinds,
            pattern,
            format: schema.get("format").and_then(Value::as_str).and_then(Format::parse),
            allowed,
            constant: schema.get("const").cloned(),
            min_length: usize_field(schema, "minLength", at)?,
            max_length: usize_field(schema, "maxLength", at)?,
            minimum: schema.get("minimum").and_then(Value::as_f64),
            maximum: schema.get("maximum").and_then(Value::as_f64),
            min_items: usize_field(schema, "minItems", at)?,
            items,
            object,
        })
    }

    fn check(&self, value: &Value, at: &str, out: &mut Vec<FieldViolation>) {
        let mut fail = |expected: String| {
            out.push(FieldViolation {
                path: at.to_string(),
                expected,
                actual: Some(value.clone()),
            })
        };

        if !self.kinds.is_empty() && !self.kinds.iter().any(|k| k.accepts(value)) {
            let names: Vec<_> = self.kinds.iter().map(ValueKind::as_str).collect();
            fail(format!("type {}", names.join(" or ")));
            // Further constraints assume the declared type.
            return;
        }

        if let Some(constant) = &self.constant {
            if value != constant {
                fail(format!("constant {}", constant));
            }
        }

        if let Some(allowed) = &self.allowed {
            if !allowed.contains(value) {
                let names: Vec<_> = allowed.iter().map(Value::to_string).collect();
                fail(format!("one of [{}]", names.join(", ")));
            }
        }

        if let Value::String(text) = value {
            let length = text.chars().count();
            if let Some(min) = self.min_length {
                if length < min {
                    fail(format!("at least {} characters", min));
                }
            }
            if let Some(max) = self.max_length {
                if length > max {
                    fail(format!("at most {} characters", max));
                }
            }
            if let Some(pattern) = &self.pattern {
                if !pattern.is_match(text) {
                    fail(format!("match for pattern {}", pattern.as_str()));
                }
            }
            if let Some(format) = self.format {
                if !format.accepts(text) {
                    fail(format!("{} format", format.as_str()));
                }
            }
        }

        if let Some(number) = value.as_f64() {
            if let Some(min) = self.minimum {
                if number < min {
                    fail(format!("a number >= {}", min));
                }
            }
            if let Some(max) = self.maximum {
                if number > max {
                    fail(format!("a number <= {}", max));
                }
            }
        }

        match value {
            Value::Array(items) => {
                if let Some(min) = self.min_items {
                    if items.len() < min {
                        fail(format!("at least {} items", min));
                    }
                }
                if let Some(rule) = &self.items {
                    for (index, item) in items.iter().enumerate() {
                        rule.check(item, &format!("{}[{}]", at, index), out);
                    }
                }
            }
            Value::Object(fields) => {
                if let Some(object) = &self.object {
                    object.check(fields, at, out);
                }
            }
            _ => {}
        }
    }
}

/// The compiled schema for one entity type.
#[derive(Debug, Clone)]
pub struct Schema {
    entity_type: EntityType,
    title: String,
    root: ObjectRule,
}

impl Schema {
    /// Compile a JSON Schema document for the given entity type.
    pub fn from_json(entity_type: EntityType, document: &Value) -> Result<Self, SchemaError> {
        let Value::Object(fields) = document else {
            return Err(malformed(entity_type.as_str(), "a schema must be an object"));
        };

        let title = fields
            .get("title")
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| entity_type.to_string());

        Ok(Self {
            root: ObjectRule::compile(fields, "")?,
            entity_type,
            title,
        })
    }

    pub fn entity_type(&self) -> &EntityType {
        &self.entity_type
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    /// Fields every record of this type must carry.
    pub fn required_fields(&self) -> &[String] {
        &self.root.required
    }

    /// Check a record, returning violations in a stable order: missing
    /// required fields first, then declared fields depth first.
    pub fn check(&self, record: &Map<String, Value>) -> Vec<FieldViolation> {
        let mut violations = Vec::new();
        self.root.check(record, "", &mut violations);
        violations
    }
}

fn kind(name: &str, at: &str) -> Result<ValueKind, SchemaError> {
    ValueKind::parse(name).ok_or_else(|| malformed(at, &format!("unknown type `{}`", name)))
}

fn usize_field(
    schema: &Map<String, Value>,
    key: &str,
    at: &str,
) -> Result<Option<usize>, SchemaError> {
    match schema.get(key) {
        None => Ok(None),
        Some(value) => value
            .as_u64()
            .map(|n| Some(n as usize))
            .ok_or_else(|| malformed(at, &format!("`{}` must be a non-negative integer", key))),
    }
}

fn malformed(at: &str, reason: &str) -> SchemaError {
    SchemaError::Malformed {
        field: if at.is_empty() { "<root>".to_string() } else { at.to_string() },
        reason: reason.to_string(),
    }
}

fn join(at: &str, name: &str) -> String {
    if at.is_empty() {
        name.to_string()
    } else {
        format!("{}.{}", at, name)
    }
}
