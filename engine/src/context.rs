//! Evaluation context supplied by the caller at request time.

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

/// Attribute name that falls back to the context's own identifier.
pub const IDENTIFIER_ATTRIBUTE: &str = "identifierKey";

/// A primitive attribute value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    Bool(bool),
    Number(f64),
    String(String),
}

impl AttributeValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            AttributeValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            AttributeValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Strict equality against a JSON operand. Differing types never match.
    pub fn equals_json(&self, other: &serde_json::Value) -> bool {
        match (self, other) {
            (AttributeValue::Bool(a), serde_json::Value::Bool(b)) => a == b,
            (AttributeValue::String(a), serde_json::Value::String(b)) => a == b,
            (AttributeValue::Number(a), serde_json::Value::Number(b)) => {
                b.as_f64().is_some_and(|b| *a == b)
            }
            _ => false,
        }
    }
}

impl From<bool> for AttributeValue {
    fn from(value: bool) -> Self {
        AttributeValue::Bool(value)
    }
}

impl From<f64> for AttributeValue {
    fn from(value: f64) -> Self {
        AttributeValue::Number(value)
    }
}

impl From<i64> for AttributeValue {
    fn from(value: i64) -> Self {
        AttributeValue::Number(value as f64)
    }
}

impl From<&str> for AttributeValue {
    fn from(value: &str) -> Self {
        AttributeValue::String(value.to_string())
    }
}

impl From<String> for AttributeValue {
    fn from(value: String) -> Self {
        AttributeValue::String(value)
    }
}

/// Facts about the current subject that rules are matched against.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationContext {
    /// Stable subject used for bucketing (user id, device id, ...)
    #[serde(default, deserialize_with = "null_as_empty")]
    pub identifier_key: String,
    /// Attributes by name. A `null` value is the same as leaving it out.
    #[serde(default, deserialize_with = "skip_null_attributes")]
    pub attributes: BTreeMap<String, AttributeValue>,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

fn skip_null_attributes<'de, D>(
    deserializer: D,
) -> Result<BTreeMap<String, AttributeValue>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<BTreeMap<String, Option<AttributeValue>>>::deserialize(deserializer)?;
    Ok(raw
        .unwrap_or_default()
        .into_iter()
        .filter_map(|(name, value)| value.map(|value| (name, value)))
        .collect())
}

impl EvaluationContext {
    /// Create a context for an identifier with no attributes.
    pub fn new(identifier_key: impl Into<String>) -> Self {
        Self {
            identifier_key: identifier_key.into(),
            attributes: BTreeMap::new(),
        }
    }

    /// Builder-style method to add an attribute.
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<AttributeValue>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    /// Look up an attribute by name.
    ///
    /// `identifierKey` resolves to the context identifier unless the
    /// attributes carry their own value under that name.
    pub fn attribute(&self, name: &str) -> Option<AttributeValue> {
        match self.attributes.get(name) {
            Some(value) => Some(value.clone()),
            None if name == IDENTIFIER_ATTRIBUTE && !self.identifier_key.is_empty() => {
                Some(AttributeValue::String(self.identifier_key.clone()))
            }
            None => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn deserializes_camel_case() {
        let ctx: EvaluationContext = serde_json::from_value(json!({
            "identifierKey": "u1",
            "attributes": {"plan": "beta", "age": 31, "admin": false}
        }))
        .unwrap();

        assert_eq!(ctx.identifier_key, "u1");
        assert_eq!(ctx.attribute("plan"), Some(AttributeValue::from("beta")));
        assert_eq!(ctx.attribute("age"), Some(AttributeValue::Number(31.0)));
        assert_eq!(ctx.attribute("admin"), Some(AttributeValue::Bool(false)));
    }

    #[test]
    fn missing_fields_default() {
        let ctx: EvaluationContext = serde_json::from_value(json!({})).unwrap();
        assert!(ctx.identifier_key.is_empty());
        assert!(ctx.attributes.is_empty());
    }

    #[test]
    fn rejects_non_primitive_attributes() {
        let result: Result<EvaluationContext, _> = serde_json::from_value(json!({
            "identifierKey": "u1",
            "attributes": {"tags": ["a", "b"]}
        }));
        assert!(result.is_err());
    }

    #[test]
    fn null_attributes_are_absent() {
        let ctx: EvaluationContext = serde_json::from_value(json!({
            "identifierKey": "u1",
            "attributes": {"plan": "beta", "email": null}
        }))
        .unwrap();
        assert_eq!(ctx.attributes.len(), 1);
        assert_eq!(ctx.attribute("plan"), Some(AttributeValue::from("beta")));
        assert_eq!(ctx.attribute("email"), None);

        let ctx: EvaluationContext =
            serde_json::from_value(json!({"identifierKey": "u1", "attributes": null})).unwrap();
        assert!(ctx.attributes.is_empty());
    }

    #[test]
    fn null_identifier_is_empty() {
        let ctx: EvaluationContext =
            serde_json::from_value(json!({"identifierKey": null, "attributes": {}})).unwrap();
        assert!(ctx.identifier_key.is_empty());
        assert_eq!(ctx.attribute("identifierKey"), None);
    }

    #[test]
    fn identifier_attribute_fallback() {
        let ctx = EvaluationContext::new("u1");
        assert_eq!(ctx.attribute("identifierKey"), Some(AttributeValue::from("u1")));
        assert_eq!(ctx.attribute("plan"), None);

        let ctx = ctx.with_attribute("identifierKey", "override");
        assert_eq!(
            ctx.attribute("identifierKey"),
            Some(AttributeValue::from("override"))
        );
    }

    #[test]
    fn strict_equality() {
        assert!(AttributeValue::from("1").equals_json(&json!("1")));
        assert!(!AttributeValue::from("1").equals_json(&json!(1)));
        assert!(AttributeValue::from(1i64).equals_json(&json!(1.0)));
        assert!(!AttributeValue::from(true).equals_json(&json!("true")));
    }
}
