//! Attribute-set validation.
//!
//! Validates a `serde_json::Value` attribute set against a [`Schema`] before a
//! reconciler turns it into API calls. Every problem is reported as a
//! [`Diagnostic`] pointing at the offending attribute.
//!
//! # Example
//!
//! ```
//! use minecraft_provider::schema::{Attribute, Schema};
//! use minecraft_provider::validation::validate;
//! use serde_json::json;
//!
//! let schema = Schema::v0()
//!     .with_attribute("x", Attribute::required_int64())
//!     .with_attribute("material", Attribute::required_string());
//!
//! let diagnostics = validate(&schema, &json!({"x": 10, "material": "minecraft:stone"}));
//! assert!(diagnostics.is_empty());
//!
//! let diagnostics = validate(&schema, &json!({"x": "ten", "material": "minecraft:stone"}));
//! assert_eq!(diagnostics.len(), 1);
//! assert_eq!(diagnostics[0].attribute, Some("x".to_string()));
//! ```

use crate::schema::{Attribute, AttributeType, Diagnostic, Schema};
use serde_json::Value;

/// Validate a JSON value against a schema.
///
/// Returns a list of diagnostics for any validation errors found.
/// An empty list means the value is valid.
///
/// # Validation Rules
///
/// - The value must be an object
/// - Required attributes must be present and non-null
/// - Optional attributes may be absent or null
/// - Computed-only attributes are skipped (the provider sets these)
/// - Attribute types must match the schema
pub fn validate(schema: &Schema, value: &Value) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();

    let obj = match value {
        Value::Object(map) => map,
        _ => {
            diagnostics.push(
                Diagnostic::error("Expected object")
                    .with_detail(format!("Got {}", value_type_name(value))),
            );
            return diagnostics;
        },
    };

    // Sorted so diagnostics come out in a stable order.
    let mut names: Vec<&String> = schema.attributes.keys().collect();
    names.sort_unstable();

    for name in names {
        let attr = &schema.attributes[name];
        validate_attribute(attr, obj.get(name), name, &mut diagnostics);
    }

    diagnostics
}

/// Validate a JSON value against a schema, returning Ok if valid or Err with diagnostics.
///
/// This is a convenience wrapper around [`validate`] that returns a Result.
pub fn validate_result(schema: &Schema, value: &Value) -> Result<(), Vec<Diagnostic>> {
    let diagnostics = validate(schema, value);
    if diagnostics.is_empty() {
        Ok(())
    } else {
        Err(diagnostics)
    }
}

/// Check if a JSON value is valid against a schema.
pub fn is_valid(schema: &Schema, value: &Value) -> bool {
    validate(schema, value).is_empty()
}

fn validate_attribute(
    attr: &Attribute,
    value: Option<&Value>,
    path: &str,
    diagnostics: &mut Vec<Diagnostic>,
) {
    if attr.flags.computed && !attr.flags.optional && !attr.flags.required {
        return;
    }

    match value {
        None | Some(Value::Null) => {
            if attr.flags.required {
                diagnostics.push(
                    Diagnostic::error(format!("Missing required attribute '{}'", path))
                        .with_detail("This attribute is required and must be provided")
                        .with_attribute(path),
                );
            }
        },
        Some(v) => {
            let matches = match attr.attr_type {
                AttributeType::String => v.is_string(),
                AttributeType::Int64 => is_int64(v),
                AttributeType::Bool => v.is_boolean(),
            };
            if !matches {
                diagnostics.push(type_error(path, type_name(attr.attr_type), v));
            }
        },
    }
}

fn type_name(attr_type: AttributeType) -> &'static str {
    match attr_type {
        AttributeType::String => "string",
        AttributeType::Int64 => "int64",
        AttributeType::Bool => "bool",
    }
}

fn value_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn is_int64(value: &Value) -> bool {
    match value {
        Value::Number(n) => {
            if n.is_i64() {
                true
            } else if let Some(f) = n.as_f64() {
                // HCL numbers can arrive as whole floats
                f.fract() == 0.0 && f >= i64::MIN as f64 && f <= i64::MAX as f64
            } else {
                false
            }
        },
        _ => false,
    }
}

fn type_error(path: &str, expected: &str, got: &Value) -> Diagnostic {
    Diagnostic::error(format!("Invalid type for attribute '{}'", path))
        .with_detail(format!("Expected {}, got {}", expected, value_type_name(got)))
        .with_attribute(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{Attribute, Schema};
    use serde_json::json;

    fn block_schema() -> Schema {
        Schema::v0()
            .with_attribute("x", Attribute::required_int64())
            .with_attribute("y", Attribute::required_int64())
            .with_attribute("z", Attribute::required_int64())
            .with_attribute("material", Attribute::required_string())
            .with_attribute("id", Attribute::computed_string())
    }

    #[test]
    fn test_validate_valid_block() {
        let diagnostics = validate(
            &block_schema(),
            &json!({"x": -1273, "y": 24, "z": 288, "material": "minecraft:stone"}),
        );
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn test_validate_missing_required() {
        let diagnostics = validate(&block_schema(), &json!({"x": 1, "y": 2, "z": 3}));
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].attribute, Some("material".to_string()));
        assert!(diagnostics[0].summary.contains("Missing required"));

        let diagnostics = validate(
            &block_schema(),
            &json!({"x": 1, "y": 2, "z": 3, "material": null}),
        );
        assert_eq!(diagnostics.len(), 1);
    }

    #[test]
    fn test_validate_wrong_type() {
        let diagnostics = validate(
            &block_schema(),
            &json!({"x": "one", "y": 2, "z": 3, "material": "minecraft:dirt"}),
        );
        assert_eq!(diagnostics.len(), 1);
        assert!(diagnostics[0].summary.contains("Invalid type"));
        assert_eq!(
            diagnostics[0].detail,
            Some("Expected int64, got string".to_string())
        );
    }

    #[test]
    fn test_validate_optional_attribute() {
        let schema = Schema::v0().with_attribute("rotation", Attribute::optional_int64());

        assert!(validate(&schema, &json!({"rotation": 270})).is_empty());
        assert!(validate(&schema, &json!({})).is_empty());
        assert!(validate(&schema, &json!({"rotation": null})).is_empty());
        assert_eq!(validate(&schema, &json!({"rotation": "270"})).len(), 1);
    }

    #[test]
    fn test_validate_computed_attribute_skipped() {
        let schema = Schema::v0().with_attribute("schema_hash", Attribute::computed_string());

        assert!(validate(&schema, &json!({})).is_empty());
        assert!(validate(&schema, &json!({"schema_hash": 123})).is_empty());
    }

    #[test]
    fn test_validate_int64_accepts_whole_floats() {
        let schema = Schema::v0().with_attribute("x", Attribute::required_int64());

        assert!(validate(&schema, &json!({"x": 288.0})).is_empty());
        assert_eq!(validate(&schema, &json!({"x": 288.5})).len(), 1);
    }

    #[test]
    fn test_validate_multiple_errors_sorted() {
        let diagnostics = validate(&block_schema(), &json!({"material": 7}));
        let attrs: Vec<_> = diagnostics
            .iter()
            .map(|d| d.attribute.clone().unwrap())
            .collect();
        assert_eq!(attrs, vec!["material", "x", "y", "z"]);
    }

    #[test]
    fn test_validate_root_not_object() {
        let diagnostics = validate(&block_schema(), &json!([1, 2, 3]));
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].summary, "Expected object");
    }

    #[test]
    fn test_helpers() {
        let schema = block_schema();
        let good = json!({"x": 1, "y": 2, "z": 3, "material": "minecraft:stone"});
        assert!(is_valid(&schema, &good));
        assert!(validate_result(&schema, &good).is_ok());
        assert_eq!(validate_result(&schema, &json!({})).unwrap_err().len(), 4);
    }
}
