//! Typed variation values.

use serde::{Deserialize, Serialize};

/// Declared type of a variation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VariationTypeLabel {
    Boolean,
    String,
    Number,
    /// Arbitrary structured JSON
    Json,
}

impl std::fmt::Display for VariationTypeLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VariationTypeLabel::Boolean => write!(f, "boolean"),
            VariationTypeLabel::String => write!(f, "string"),
            VariationTypeLabel::Number => write!(f, "number"),
            VariationTypeLabel::Json => write!(f, "json"),
        }
    }
}

/// The value a variation resolves to.
///
/// Serialized untagged, so on the wire it is the plain JSON value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum VariationValue {
    Boolean(bool),
    Number(f64),
    String(String),
    /// Arrays, objects and null
    Json(serde_json::Value),
}

impl VariationValue {
    /// Check whether this value is acceptable for the declared type.
    pub fn conforms_to(&self, label: VariationTypeLabel) -> bool {
        match label {
            VariationTypeLabel::Boolean => matches!(self, VariationValue::Boolean(_)),
            VariationTypeLabel::String => matches!(self, VariationValue::String(_)),
            VariationTypeLabel::Number => {
                matches!(self, VariationValue::Number(n) if n.is_finite())
            }
            VariationTypeLabel::Json => true,
        }
    }

    /// Name of the runtime type, for error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            VariationValue::Boolean(_) => "boolean",
            VariationValue::Number(_) => "number",
            VariationValue::String(_) => "string",
            VariationValue::Json(serde_json::Value::Null) => "null",
            VariationValue::Json(serde_json::Value::Array(_)) => "array",
            VariationValue::Json(_) => "object",
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            VariationValue::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            VariationValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            VariationValue::Number(n) => Some(*n),
            _ => None,
        }
    }
}

impl From<bool> for VariationValue {
    fn from(value: bool) -> Self {
        VariationValue::Boolean(value)
    }
}

impl From<f64> for VariationValue {
    fn from(value: f64) -> Self {
        VariationValue::Number(value)
    }
}

impl From<&str> for VariationValue {
    fn from(value: &str) -> Self {
        VariationValue::String(value.to_string())
    }
}

impl From<String> for VariationValue {
    fn from(value: String) -> Self {
        VariationValue::String(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn deserializes_plain_json_values() {
        let v: VariationValue = serde_json::from_value(json!(true)).unwrap();
        assert_eq!(v, VariationValue::Boolean(true));

        let v: VariationValue = serde_json::from_value(json!(3)).unwrap();
        assert_eq!(v, VariationValue::Number(3.0));

        let v: VariationValue = serde_json::from_value(json!("3")).unwrap();
        assert_eq!(v, VariationValue::String("3".into()));

        let v: VariationValue = serde_json::from_value(json!({"theme": "dark"})).unwrap();
        assert_eq!(v, VariationValue::Json(json!({"theme": "dark"})));
    }

    #[test]
    fn serializes_untagged() {
        let json = serde_json::to_string(&VariationValue::from("blue")).unwrap();
        assert_eq!(json, r#""blue""#);
        let json = serde_json::to_string(&VariationValue::from(false)).unwrap();
        assert_eq!(json, "false");
    }

    #[test]
    fn conformance() {
        assert!(VariationValue::from(1.5).conforms_to(VariationTypeLabel::Number));
        assert!(!VariationValue::from("3").conforms_to(VariationTypeLabel::Number));
        assert!(!VariationValue::from(f64::NAN).conforms_to(VariationTypeLabel::Number));
        assert!(!VariationValue::from(1.0).conforms_to(VariationTypeLabel::Boolean));
        assert!(VariationValue::from(true).conforms_to(VariationTypeLabel::Json));
        assert!(VariationValue::Json(json!([1, 2])).conforms_to(VariationTypeLabel::Json));
        assert!(!VariationValue::Json(json!([1, 2])).conforms_to(VariationTypeLabel::String));
    }

    #[test]
    fn type_label_display() {
        assert_eq!(VariationTypeLabel::Boolean.to_string(), "boolean");
        assert_eq!(VariationTypeLabel::Json.to_string(), "json");
        assert_eq!(VariationValue::Json(json!(null)).type_name(), "null");
    }
}
