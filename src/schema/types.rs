//! Schema types shared by the extractor, the accumulator and the reports.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

// ─── Enum Members ──────────────────────────────────────────────────

/// Literal value of an enum member: `'ADMIN'` or `2`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EnumLiteral {
    Str(String),
    Num(f64),
}

impl EnumLiteral {
    /// Loose equality against a recorded argument value.
    ///
    /// Strings and numbers compare across kinds the way a dynamic `==`
    /// does: `2` matches `"2"`, booleans compare as `1`/`0`.
    /// `null`, arrays and objects never match.
    pub fn loosely_equals(&self, value: &Value) -> bool {
        match (self, value) {
            (EnumLiteral::Str(s), Value::String(v)) => s == v,
            (EnumLiteral::Num(n), Value::Number(v)) => v.as_f64() == Some(*n),
            (EnumLiteral::Str(s), Value::Number(v)) => {
                matches!((string_to_number(s), v.as_f64()), (Some(a), Some(b)) if a == b)
            }
            (EnumLiteral::Num(n), Value::String(v)) => string_to_number(v) == Some(*n),
            (literal, Value::Bool(b)) => {
                let as_num = if *b { 1.0 } else { 0.0 };
                match literal {
                    EnumLiteral::Num(n) => *n == as_num,
                    EnumLiteral::Str(s) => string_to_number(s) == Some(as_num),
                }
            }
            _ => false,
        }
    }
}

fn string_to_number(s: &str) -> Option<f64> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return Some(0.0);
    }
    trimmed.parse::<f64>().ok().filter(|n| n.is_finite())
}

impl fmt::Display for EnumLiteral {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EnumLiteral::Str(s) => f.write_str(s),
            EnumLiteral::Num(n) => write!(f, "{}", n),
        }
    }
}

impl From<&str> for EnumLiteral {
    fn from(s: &str) -> Self {
        EnumLiteral::Str(s.to_string())
    }
}

impl From<f64> for EnumLiteral {
    fn from(n: f64) -> Self {
        EnumLiteral::Num(n)
    }
}

/// One member of an enum type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnumValue {
    pub key: String,
    pub value: EnumLiteral,
    pub called: u64,
}

impl EnumValue {
    pub fn new(key: impl Into<String>, value: impl Into<EnumLiteral>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
            called: 0,
        }
    }
}

// ─── Parameters ────────────────────────────────────────────────────

/// One input argument of an operation, or a field nested inside one.
///
/// At most one of `sub_params` and `enum_values` is set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedParameter {
    pub key: String,
    #[serde(rename = "type")]
    pub type_name: String,
    pub called: u64,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub sub_params: Option<Vec<ParsedParameter>>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub enum_values: Option<Vec<EnumValue>>,
}

impl ParsedParameter {
    /// A parameter of a primitive type (`string`, `number`, `ID`...).
    pub fn primitive(key: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            type_name: type_name.into(),
            called: 0,
            sub_params: None,
            enum_values: None,
        }
    }

    /// A parameter whose type is an object with its own fields.
    pub fn structured(
        key: impl Into<String>,
        type_name: impl Into<String>,
        sub_params: Vec<ParsedParameter>,
    ) -> Self {
        Self {
            sub_params: Some(sub_params),
            ..Self::primitive(key, type_name)
        }
    }

    /// A parameter whose type is an enumeration.
    pub fn enumeration(
        key: impl Into<String>,
        type_name: impl Into<String>,
        enum_values: Vec<EnumValue>,
    ) -> Self {
        Self {
            enum_values: Some(enum_values),
            ..Self::primitive(key, type_name)
        }
    }

    /// Find a direct sub-parameter by key.
    pub fn sub_param_mut(&mut self, key: &str) -> Option<&mut ParsedParameter> {
        self.sub_params
            .as_mut()
            .and_then(|subs| subs.iter_mut().find(|p| p.key == key))
    }

    /// Zero this parameter's counter and every counter below it.
    pub fn reset_counters(&mut self) {
        self.called = 0;
        if let Some(subs) = self.sub_params.as_mut() {
            subs.iter_mut().for_each(ParsedParameter::reset_counters);
        }
        if let Some(values) = self.enum_values.as_mut() {
            values.iter_mut().for_each(|v| v.called = 0);
        }
    }
}

// ─── Operations ────────────────────────────────────────────────────

/// One exposed GraphQL operation of the SDK.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationSchema {
    pub name: String,
    pub input_params: Vec<ParsedParameter>,
}

impl OperationSchema {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            input_params: Vec::new(),
        }
    }

    /// Find a root-level parameter by key.
    pub fn param_mut(&mut self, key: &str) -> Option<&mut ParsedParameter> {
        self.input_params.iter_mut().find(|p| p.key == key)
    }

    pub fn reset_counters(&mut self) {
        self.input_params
            .iter_mut()
            .for_each(ParsedParameter::reset_counters);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_loose_equality_same_kind() {
        assert!(EnumLiteral::from("ADMIN").loosely_equals(&json!("ADMIN")));
        assert!(!EnumLiteral::from("ADMIN").loosely_equals(&json!("USER")));
        assert!(EnumLiteral::from(2.0).loosely_equals(&json!(2)));
    }

    #[test]
    fn test_loose_equality_across_kinds() {
        assert!(EnumLiteral::from(2.0).loosely_equals(&json!("2")));
        assert!(EnumLiteral::from("3").loosely_equals(&json!(3)));
        assert!(EnumLiteral::from(1.0).loosely_equals(&json!(true)));
        assert!(!EnumLiteral::from("ADMIN").loosely_equals(&json!(0)));
    }

    #[test]
    fn test_loose_equality_never_matches_null_or_containers() {
        assert!(!EnumLiteral::from("null").loosely_equals(&Value::Null));
        assert!(!EnumLiteral::from("A").loosely_equals(&json!(["A"])));
        assert!(!EnumLiteral::from("A").loosely_equals(&json!({ "A": 1 })));
    }

    #[test]
    fn test_serialized_shape() {
        let param = ParsedParameter::enumeration(
            "role",
            "Role",
            vec![EnumValue::new("ADMIN", "ADMIN"), EnumValue::new("LEVEL", 2.0)],
        );
        let value = serde_json::to_value(&param).unwrap();
        assert_eq!(value["type"], "Role");
        assert_eq!(value["enumValues"][0]["value"], "ADMIN");
        assert_eq!(value["enumValues"][1]["value"], 2.0);
        assert!(value.get("subParams").is_none());
    }

    #[test]
    fn test_reset_counters_walks_the_tree() {
        let mut op = OperationSchema {
            name: "user".to_string(),
            input_params: vec![ParsedParameter::structured(
                "filter",
                "UserFilter",
                vec![ParsedParameter::enumeration(
                    "role",
                    "Role",
                    vec![EnumValue::new("ADMIN", "ADMIN")],
                )],
            )],
        };
        op.input_params[0].called = 3;
        let role = op.input_params[0].sub_param_mut("role").unwrap();
        role.called = 2;
        role.enum_values.as_mut().unwrap()[0].called = 2;

        op.reset_counters();

        let filter = &op.input_params[0];
        assert_eq!(filter.called, 0);
        let role = &filter.sub_params.as_ref().unwrap()[0];
        assert_eq!(role.called, 0);
        assert_eq!(role.enum_values.as_ref().unwrap()[0].called, 0);
    }

    #[test]
    fn test_enum_literal_display() {
        assert_eq!(EnumLiteral::from(2.0).to_string(), "2");
        assert_eq!(EnumLiteral::from(2.5).to_string(), "2.5");
        assert_eq!(EnumLiteral::from("GUEST").to_string(), "GUEST");
    }
}
