//! Declarative JSON schemas handed to the model for constrained generation.
//!
//! Schemas are plain data: they render to the JSON-schema dialect understood by
//! function/tool calling, and validate generated values before those values are
//! deserialized into domain types.

use serde_json::{json, Map, Value};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
#[error("at `{path}`: {reason}")]
pub struct SchemaViolation {
    pub path: String,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Schema {
    Object(ObjectSchema),
    Array(Box<Schema>),
    String { allowed: Option<Vec<String>> },
    Integer,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ObjectSchema {
    pub description: Option<String>,
    /// Declared properties, in rendering order.
    pub properties: Vec<(String, Schema)>,
    pub required: Vec<String>,
}

impl Schema {
    pub fn string() -> Self {
        Schema::String { allowed: None }
    }

    pub fn enumeration<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Schema::String {
            allowed: Some(values.into_iter().map(Into::into).collect()),
        }
    }

    pub fn integer() -> Self {
        Schema::Integer
    }

    pub fn array(items: Schema) -> Self {
        Schema::Array(Box::new(items))
    }

    pub fn object<I, K>(properties: I, required: &[&str]) -> Self
    where
        I: IntoIterator<Item = (K, Schema)>,
        K: Into<String>,
    {
        Schema::Object(ObjectSchema {
            description: None,
            properties: properties.into_iter().map(|(k, s)| (k.into(), s)).collect(),
            required: required.iter().map(|r| r.to_string()).collect(),
        })
    }

    /// Attaches a description; only objects carry one.
    pub fn described(self, description: impl Into<String>) -> Self {
        match self {
            Schema::Object(object) => Schema::Object(ObjectSchema {
                description: Some(description.into()),
                ..object
            }),
            other => other,
        }
    }

    pub fn is_object(&self) -> bool {
        matches!(self, Schema::Object(_))
    }

    pub fn to_json(&self) -> Value {
        match self {
            Schema::Object(object) => {
                let properties: Map<String, Value> = object
                    .properties
                    .iter()
                    .map(|(name, schema)| (name.clone(), schema.to_json()))
                    .collect();
                let mut rendered = json!({
                    "type": "object",
                    "required": object.required,
                    "properties": properties,
                });
                if let (Some(description), Some(map)) =
                    (&object.description, rendered.as_object_mut())
                {
                    map.insert("description".to_string(), json!(description));
                }
                rendered
            }
            Schema::Array(items) => json!({ "type": "array", "items": items.to_json() }),
            Schema::String { allowed: None } => json!({ "type": "string" }),
            Schema::String {
                allowed: Some(values),
            } => json!({ "type": "string", "enum": values }),
            Schema::Integer => json!({ "type": "integer" }),
        }
    }

    /// Checks that every `required` key is also a declared property, recursively.
    pub fn check_consistency(&self) -> Result<(), SchemaViolation> {
        self.check_consistency_at("$")
    }

    fn check_consistency_at(&self, path: &str) -> Result<(), SchemaViolation> {
        match self {
            Schema::Object(object) => {
                if let Some(missing) = object
                    .required
                    .iter()
                    .find(|r| !object.properties.iter().any(|(name, _)| name == *r))
                {
                    return Err(SchemaViolation {
                        path: path.to_string(),
                        reason: format!("required key `{missing}` is not a declared property"),
                    });
                }
                for (name, schema) in &object.properties {
                    schema.check_consistency_at(&format!("{path}.{name}"))?;
                }
                Ok(())
            }
            Schema::Array(items) => items.check_consistency_at(&format!("{path}[]")),
            Schema::String { .. } | Schema::Integer => Ok(()),
        }
    }

    /// Validates a generated value. Undeclared object keys are tolerated, and
    /// an optional property may be `null`.
    pub fn validate(&self, value: &Value) -> Result<(), SchemaViolation> {
        self.validate_at(value, "$")
    }

    fn validate_at(&self, value: &Value, path: &str) -> Result<(), SchemaViolation> {
        let violation = |reason: String| SchemaViolation {
            path: path.to_string(),
            reason,
        };

        match self {
            Schema::Object(object) => {
                let map = value
                    .as_object()
                    .ok_or_else(|| violation(format!("expected object, found {}", kind(value))))?;
                for key in &object.required {
                    if !map.contains_key(key) {
                        return Err(violation(format!("missing required key `{key}`")));
                    }
                }
                for (name, schema) in &object.properties {
                    match map.get(name) {
                        None => {}
                        Some(Value::Null) if !object.required.contains(name) => {}
                        Some(child) => schema.validate_at(child, &format!("{path}.{name}"))?,
                    }
                }
                Ok(())
            }
            Schema::Array(items) => {
                let elements = value
                    .as_array()
                    .ok_or_else(|| violation(format!("expected array, found {}", kind(value))))?;
                for (i, element) in elements.iter().enumerate() {
                    items.validate_at(element, &format!("{path}[{i}]"))?;
                }
                Ok(())
            }
            Schema::String { allowed } => {
                let s = value
                    .as_str()
                    .ok_or_else(|| violation(format!("expected string, found {}", kind(value))))?;
                match allowed {
                    Some(values) if !values.iter().any(|v| v == s) => {
                        Err(violation(format!("`{s}` is not one of {values:?}")))
                    }
                    _ => Ok(()),
                }
            }
            Schema::Integer => {
                if value.is_i64() || value.is_u64() {
                    Ok(())
                } else {
                    Err(violation(format!("expected integer, found {}", kind(value))))
                }
            }
        }
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn person() -> Schema {
        Schema::object(
            [
                ("name", Schema::string()),
                ("age", Schema::integer()),
                ("tags", Schema::array(Schema::enumeration(["a", "b"]))),
            ],
            &["name"],
        )
        .described("A person")
    }

    #[test]
    fn test_to_json_renders_nested_schema() {
        let rendered = person().to_json();
        assert_eq!(rendered["type"], "object");
        assert_eq!(rendered["description"], "A person");
        assert_eq!(rendered["required"], json!(["name"]));
        assert_eq!(rendered["properties"]["age"]["type"], "integer");
        assert_eq!(rendered["properties"]["tags"]["items"]["enum"], json!(["a", "b"]));
    }

    #[test]
    fn test_validate_accepts_conforming_value() {
        let value = json!({"name": "Ada", "age": 36, "tags": ["a"], "extra": true});
        assert!(person().validate(&value).is_ok());
    }

    #[test]
    fn test_validate_reports_missing_required_key() {
        let err = person().validate(&json!({"age": 1})).unwrap_err();
        assert_eq!(err.path, "$");
        assert!(err.reason.contains("`name`"));
    }

    #[test]
    fn test_validate_reports_nested_path() {
        let err = person()
            .validate(&json!({"name": "Ada", "tags": ["a", "z"]}))
            .unwrap_err();
        assert_eq!(err.path, "$.tags[1]");
    }

    #[test]
    fn test_validate_rejects_fractional_integer() {
        let err = person()
            .validate(&json!({"name": "Ada", "age": 36.5}))
            .unwrap_err();
        assert_eq!(err.path, "$.age");
    }

    #[test]
    fn test_validate_accepts_null_for_optional_property() {
        assert!(person()
            .validate(&json!({"name": "Ada", "age": null, "tags": null}))
            .is_ok());

        let err = person().validate(&json!({"name": null})).unwrap_err();
        assert_eq!(err.path, "$.name");
        assert!(err.reason.contains("found null"));
    }

    #[test]
    fn test_consistency_flags_undeclared_required_key() {
        let schema = Schema::object([("a", Schema::string())], &["a", "b"]);
        let err = schema.check_consistency().unwrap_err();
        assert!(err.reason.contains("`b`"));
        assert!(person().check_consistency().is_ok());
    }
}
