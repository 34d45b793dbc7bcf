//! Argument schemas.
//!
//! A tool declares its arguments once as an [`ArgumentSchema`]. The same value
//! renders the JSON Schema advertised to callers and validates incoming
//! arguments at runtime, so the two cannot drift apart.

use serde::de::DeserializeOwned;
use serde_json::{Map, Number, Value, json};

use crate::error::{ToolError, ToolResult, Violation};

const IDENTIFIER_PATTERN: &str = "^[A-Za-z0-9_-]+$";

/// JSON type accepted by a field.
#[derive(Clone, Debug, PartialEq)]
pub enum FieldKind {
    /// UTF-8 string.
    String,
    /// Whole number; floats with no fractional part are accepted and normalised.
    Integer,
    /// Any JSON number.
    Number,
    /// `true` / `false`.
    Boolean,
    /// Homogeneous array described by its item spec.
    Array(Box<FieldSpec>),
    /// JSON object, opaque unless a nested schema is attached.
    Object(Option<Box<ArgumentSchema>>),
}

impl FieldKind {
    const fn json_type(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Integer => "integer",
            Self::Number => "number",
            Self::Boolean => "boolean",
            Self::Array(_) => "array",
            Self::Object(_) => "object",
        }
    }
}

/// Declaration of one argument.
#[derive(Clone, Debug, PartialEq)]
pub struct FieldSpec {
    kind: FieldKind,
    description: &'static str,
    required: bool,
    default: Option<Value>,
    allowed: Vec<&'static str>,
    identifier: bool,
    minimum: Option<f64>,
    maximum: Option<f64>,
    min_items: Option<usize>,
    max_items: Option<usize>,
}

impl FieldSpec {
    fn new(kind: FieldKind, description: &'static str) -> Self {
        Self {
            kind,
            description,
            required: false,
            default: None,
            allowed: Vec::new(),
            identifier: false,
            minimum: None,
            maximum: None,
            min_items: None,
            max_items: None,
        }
    }

    /// A string field.
    #[must_use]
    pub fn string(description: &'static str) -> Self {
        Self::new(FieldKind::String, description)
    }

    /// An integer field.
    #[must_use]
    pub fn integer(description: &'static str) -> Self {
        Self::new(FieldKind::Integer, description)
    }

    /// A number field.
    #[must_use]
    pub fn number(description: &'static str) -> Self {
        Self::new(FieldKind::Number, description)
    }

    /// A boolean field.
    #[must_use]
    pub fn boolean(description: &'static str) -> Self {
        Self::new(FieldKind::Boolean, description)
    }

    /// An array whose elements follow `items`.
    #[must_use]
    pub fn array(description: &'static str, items: FieldSpec) -> Self {
        Self::new(FieldKind::Array(Box::new(items)), description)
    }

    /// An opaque object.
    #[must_use]
    pub fn object(description: &'static str) -> Self {
        Self::new(FieldKind::Object(None), description)
    }

    /// An object validated against a nested schema.
    #[must_use]
    pub fn object_with(description: &'static str, schema: ArgumentSchema) -> Self {
        Self::new(FieldKind::Object(Some(Box::new(schema))), description)
    }

    /// Marks the field as required.
    #[must_use]
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Value inserted when the caller omits the field.
    #[must_use]
    pub fn default(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    /// Restricts a string field to the listed values.
    #[must_use]
    pub fn one_of(mut self, allowed: &[&'static str]) -> Self {
        self.allowed = allowed.to_vec();
        self
    }

    /// Restricts a string field to ASCII letters, digits, `_` and `-`.
    #[must_use]
    pub fn identifier(mut self) -> Self {
        self.identifier = true;
        self
    }

    /// Inclusive numeric bounds.
    #[must_use]
    pub fn range(mut self, minimum: f64, maximum: f64) -> Self {
        self.minimum = Some(minimum);
        self.maximum = Some(maximum);
        self
    }

    /// Inclusive lower numeric bound.
    #[must_use]
    pub fn at_least(mut self, minimum: f64) -> Self {
        self.minimum = Some(minimum);
        self
    }

    /// Inclusive bounds on the number of array items.
    #[must_use]
    pub fn items_between(mut self, min: usize, max: usize) -> Self {
        self.min_items = Some(min);
        self.max_items = Some(max);
        self
    }

    /// Inclusive lower bound on the number of array items.
    #[must_use]
    pub fn min_items(mut self, min: usize) -> Self {
        self.min_items = Some(min);
        self
    }

    /// Returns the declared kind.
    #[must_use]
    pub fn kind(&self) -> &FieldKind {
        &self.kind
    }

    /// Returns whether the field must be supplied.
    #[must_use]
    pub const fn is_required(&self) -> bool {
        self.required
    }

    fn to_json_schema(&self) -> Value {
        let mut out = Map::new();
        out.insert("type".into(), Value::from(self.kind.json_type()));
        if !self.description.is_empty() {
            out.insert("description".into(), Value::from(self.description));
        }
        if !self.allowed.is_empty() {
            out.insert("enum".into(), Value::from(self.allowed.clone()));
        }
        if self.identifier {
            out.insert("pattern".into(), Value::from(IDENTIFIER_PATTERN));
        }
        if let Some(min) = self.minimum {
            out.insert("minimum".into(), bound(min));
        }
        if let Some(max) = self.maximum {
            out.insert("maximum".into(), bound(max));
        }
        if let Some(default) = &self.default {
            out.insert("default".into(), default.clone());
        }
        match &self.kind {
            FieldKind::Array(items) => {
                out.insert("items".into(), items.to_json_schema());
                if let Some(min) = self.min_items {
                    out.insert("minItems".into(), Value::from(min));
                }
                if let Some(max) = self.max_items {
                    out.insert("maxItems".into(), Value::from(max));
                }
            }
            FieldKind::Object(Some(schema)) => {
                let nested = schema.to_json_schema();
                if let Value::Object(nested) = nested {
                    for (key, value) in nested {
                        if key != "type" {
                            out.insert(key, value);
                        }
                    }
                }
            }
            _ => {}
        }
        Value::Object(out)
    }

    #[allow(clippy::cast_possible_truncation)]
    fn check(&self, path: &str, value: &Value, violations: &mut Vec<Violation>) -> Option<Value> {
        match &self.kind {
            FieldKind::String => {
                let Some(text) = value.as_str() else {
                    violations.push(type_violation(path, "a string"));
                    return None;
                };
                if !self.allowed.is_empty() && !self.allowed.contains(&text) {
                    violations.push(Violation::new(
                        path,
                        "enum",
                        format!("must be one of {}", self.allowed.join(", ")),
                    ));
                    return None;
                }
                if self.identifier && !is_identifier(text) {
                    violations.push(Violation::new(
                        path,
                        "pattern",
                        "may only contain letters, digits, '_' and '-'",
                    ));
                    return None;
                }
                Some(value.clone())
            }
            FieldKind::Integer => {
                let normalised = match value {
                    Value::Number(n) if n.is_i64() || n.is_u64() => Some(value.clone()),
                    Value::Number(n) => n
                        .as_f64()
                        .filter(|f| f.fract() == 0.0 && f.abs() < 9.0e15)
                        .map(|f| Value::Number(Number::from(f as i64))),
                    _ => None,
                };
                let Some(normalised) = normalised else {
                    violations.push(type_violation(path, "an integer"));
                    return None;
                };
                self.check_bounds(path, &normalised, violations)
                    .then_some(normalised)
            }
            FieldKind::Number => {
                if !value.is_number() {
                    violations.push(type_violation(path, "a number"));
                    return None;
                }
                self.check_bounds(path, value, violations)
                    .then(|| value.clone())
            }
            FieldKind::Boolean => {
                if value.is_boolean() {
                    Some(value.clone())
                } else {
                    violations.push(type_violation(path, "a boolean"));
                    None
                }
            }
            FieldKind::Array(items) => {
                let Some(elements) = value.as_array() else {
                    violations.push(type_violation(path, "an array"));
                    return None;
                };
                let before = violations.len();
                if let Some(min) = self.min_items.filter(|min| elements.len() < *min) {
                    violations.push(Violation::new(
                        path,
                        "min_items",
                        format!("must contain at least {min} item(s)"),
                    ));
                }
                if let Some(max) = self.max_items.filter(|max| elements.len() > *max) {
                    violations.push(Violation::new(
                        path,
                        "max_items",
                        format!("must contain at most {max} item(s)"),
                    ));
                }
                let normalised: Vec<Value> = elements
                    .iter()
                    .enumerate()
                    .filter_map(|(idx, element)| {
                        items.check(&format!("{path}[{idx}]"), element, violations)
                    })
                    .collect();
                (violations.len() == before).then_some(Value::Array(normalised))
            }
            FieldKind::Object(schema) => {
                let Some(object) = value.as_object() else {
                    violations.push(type_violation(path, "an object"));
                    return None;
                };
                match schema {
                    Some(schema) => {
                        let before = violations.len();
                        let normalised = schema.check_object(object, path, violations);
                        (violations.len() == before).then_some(Value::Object(normalised))
                    }
                    None => Some(value.clone()),
                }
            }
        }
    }

    fn check_bounds(&self, path: &str, value: &Value, violations: &mut Vec<Violation>) -> bool {
        let Some(number) = value.as_f64() else {
            return true;
        };
        if let Some(min) = self.minimum.filter(|min| number < *min) {
            violations.push(Violation::new(
                path,
                "minimum",
                format!("must be at least {}", bound(min)),
            ));
            return false;
        }
        if let Some(max) = self.maximum.filter(|max| number > *max) {
            violations.push(Violation::new(
                path,
                "maximum",
                format!("must be at most {}", bound(max)),
            ));
            return false;
        }
        true
    }
}

/// Ordered set of argument declarations for one tool.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ArgumentSchema {
    fields: Vec<(&'static str, FieldSpec)>,
    permissive: bool,
}

impl ArgumentSchema {
    /// Creates an empty, non-permissive schema.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares a field. Declaration order is kept in the rendered schema.
    #[must_use]
    pub fn field(mut self, name: &'static str, spec: FieldSpec) -> Self {
        self.fields.retain(|(existing, _)| *existing != name);
        self.fields.push((name, spec));
        self
    }

    /// Accepts and passes through fields that are not declared.
    #[must_use]
    pub fn permissive(mut self) -> Self {
        self.permissive = true;
        self
    }

    /// Returns whether undeclared fields are accepted.
    #[must_use]
    pub const fn is_permissive(&self) -> bool {
        self.permissive
    }

    /// Returns the declared fields in order.
    pub fn fields(&self) -> impl Iterator<Item = (&'static str, &FieldSpec)> {
        self.fields.iter().map(|(name, spec)| (*name, spec))
    }

    /// Renders the JSON Schema advertised to callers.
    #[must_use]
    pub fn to_json_schema(&self) -> Value {
        let properties: Map<String, Value> = self
            .fields
            .iter()
            .map(|(name, spec)| ((*name).to_owned(), spec.to_json_schema()))
            .collect();
        let required: Vec<&str> = self
            .fields
            .iter()
            .filter(|(_, spec)| spec.required)
            .map(|(name, _)| *name)
            .collect();

        let mut schema = json!({
            "type": "object",
            "properties": properties,
            "additionalProperties": self.permissive,
        });
        if !required.is_empty() {
            schema["required"] = Value::from(required);
        }
        schema
    }

    /// Validates raw arguments and returns the normalised record.
    ///
    /// `null` and other non-object input are treated as an empty object.
    /// Absent optional fields receive their declared default.
    ///
    /// # Errors
    ///
    /// Returns [`ToolError::SchemaViolation`] listing every violated constraint.
    pub fn validate(&self, input: &Value) -> ToolResult<Value> {
        let empty = Map::new();
        let object = input.as_object().unwrap_or(&empty);
        let mut violations = Vec::new();
        let normalised = self.check_object(object, "", &mut violations);
        if violations.is_empty() {
            Ok(Value::Object(normalised))
        } else {
            Err(ToolError::SchemaViolation { violations })
        }
    }

    /// Validates and then deserializes into the handler's argument type.
    ///
    /// # Errors
    ///
    /// Returns [`ToolError::SchemaViolation`] when validation or deserialization fails.
    pub fn parse<T: DeserializeOwned>(&self, input: &Value) -> ToolResult<T> {
        from_args(self.validate(input)?)
    }

    fn check_object(
        &self,
        object: &Map<String, Value>,
        prefix: &str,
        violations: &mut Vec<Violation>,
    ) -> Map<String, Value> {
        let mut out = Map::new();

        for (name, spec) in &self.fields {
            let path = join_path(prefix, name);
            match object.get(*name).filter(|value| !value.is_null()) {
                Some(value) => {
                    if let Some(normalised) = spec.check(&path, value, violations) {
                        out.insert((*name).to_owned(), normalised);
                    }
                }
                None if spec.required => {
                    violations.push(Violation::new(path, "required", "is required"));
                }
                None => {
                    if let Some(default) = &spec.default {
                        out.insert((*name).to_owned(), default.clone());
                    }
                }
            }
        }

        for (key, value) in object {
            if self.fields.iter().any(|(name, _)| name == key) {
                continue;
            }
            if self.permissive {
                out.insert(key.clone(), value.clone());
            } else {
                violations.push(Violation::new(
                    join_path(prefix, key),
                    "unexpected",
                    "is not a recognised argument",
                ));
            }
        }

        out
    }
}

/// Deserializes arguments the dispatcher has already validated.
///
/// # Errors
///
/// Returns [`ToolError::SchemaViolation`] when the record does not fit `T`.
pub fn from_args<T: DeserializeOwned>(args: Value) -> ToolResult<T> {
    serde_json::from_value(args).map_err(|err| ToolError::violation("", "type", err.to_string()))
}

fn join_path(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_owned()
    } else {
        format!("{prefix}.{name}")
    }
}

fn is_identifier(text: &str) -> bool {
    !text.is_empty()
        && text
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'-')
}

fn type_violation(path: &str, expected: &str) -> Violation {
    Violation::new(path, "type", format!("must be {expected}"))
}

#[allow(clippy::cast_possible_truncation)]
fn bound(value: f64) -> Value {
    if value.fract() == 0.0 && value.abs() < 9.0e15 {
        Value::from(value as i64)
    } else {
        Value::from(value)
    }
}
