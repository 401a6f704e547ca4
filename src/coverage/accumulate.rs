//! Merge recorded call arguments into the schema's counters.
//!
//! Argument payloads are walked structurally against the known parameter
//! tree. Keys the schema does not know are ignored, so an SDK regenerated
//! after the tests were written still produces a report.

use serde_json::Value;
use tracing::debug;

use crate::schema::{EnumValue, OperationSchema, ParsedParameter};
use crate::storage::OperationCalls;

/// Apply every recorded call to the matching operation schema.
///
/// Calls without arguments leave the counters alone; they still make the
/// operation count as covered, which the caller decides from `recorded`.
pub fn accumulate(schemas: &mut [OperationSchema], recorded: &[OperationCalls]) {
    for operation in recorded {
        let Some(schema) = schemas.iter_mut().find(|s| s.name == operation.name) else {
            debug!(operation = %operation.name, "recorded operation not in schema");
            continue;
        };
        for call in &operation.calls {
            if !call.input_params.is_empty() {
                increment_counters(schema, &call.input_params);
            }
        }
    }
}

/// Merge the arguments of one call into an operation schema.
///
/// Only the first positional argument carries GraphQL variables.
pub fn increment_counters(schema: &mut OperationSchema, input_params: &[Value]) {
    let Some(Value::Object(variables)) = input_params.first() else {
        return;
    };
    for (key, value) in variables {
        if let Some(param) = schema.param_mut(key) {
            increment_param(param, value);
        }
    }
}

fn increment_param(param: &mut ParsedParameter, value: &Value) {
    param.called += 1;

    if let Some(subs) = param.sub_params.as_mut() {
        merge_nested(subs, value);
    } else if let Some(values) = param.enum_values.as_mut() {
        mark_enum_value(values, value);
    }
}

fn merge_nested(subs: &mut [ParsedParameter], value: &Value) {
    match value {
        Value::Object(fields) => {
            for (key, nested) in fields {
                if let Some(sub) = subs.iter_mut().find(|p| &p.key == key) {
                    increment_param(sub, nested);
                }
            }
        }
        // Lists of input objects: every element contributes.
        Value::Array(items) => items.iter().for_each(|item| merge_nested(subs, item)),
        _ => {}
    }
}

fn mark_enum_value(values: &mut [EnumValue], value: &Value) {
    match value {
        Value::Array(items) => items.iter().for_each(|item| mark_enum_value(values, item)),
        _ => {
            if let Some(member) = values.iter_mut().find(|v| v.value.loosely_equals(value)) {
                member.called += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::CallRecord;
    use serde_json::json;

    fn user_schema() -> OperationSchema {
        OperationSchema {
            name: "user".to_string(),
            input_params: vec![
                ParsedParameter::primitive("id", "string"),
                ParsedParameter::enumeration(
                    "role",
                    "Role",
                    vec![
                        EnumValue::new("ADMIN", "ADMIN"),
                        EnumValue::new("USER", "USER"),
                        EnumValue::new("GUEST", "GUEST"),
                    ],
                ),
                ParsedParameter::structured(
                    "filter",
                    "UserFilter",
                    vec![
                        ParsedParameter::primitive("name", "string"),
                        ParsedParameter::enumeration(
                            "level",
                            "Level",
                            vec![EnumValue::new("LOW", 1.0), EnumValue::new("HIGH", 2.0)],
                        ),
                    ],
                ),
            ],
        }
    }

    fn enum_counts(param: &ParsedParameter) -> Vec<u64> {
        param
            .enum_values
            .as_ref()
            .unwrap()
            .iter()
            .map(|v| v.called)
            .collect()
    }

    #[test]
    fn test_single_key_increments_only_that_param() {
        let mut schema = user_schema();
        increment_counters(&mut schema, &[json!({ "id": "x" })]);

        assert_eq!(schema.input_params[0].called, 1);
        assert_eq!(schema.input_params[1].called, 0);
        assert_eq!(schema.input_params[2].called, 0);
        assert_eq!(enum_counts(&schema.input_params[1]), vec![0, 0, 0]);
    }

    #[test]
    fn test_enum_member_matching() {
        let mut schema = user_schema();
        increment_counters(&mut schema, &[json!({ "role": "ADMIN" })]);

        assert_eq!(schema.input_params[1].called, 1);
        assert_eq!(enum_counts(&schema.input_params[1]), vec![1, 0, 0]);
    }

    #[test]
    fn test_nested_enum_loose_match() {
        let mut schema = user_schema();
        increment_counters(&mut schema, &[json!({ "filter": { "level": "2" } })]);

        let filter = &schema.input_params[2];
        assert_eq!(filter.called, 1);
        let subs = filter.sub_params.as_ref().unwrap();
        assert_eq!(subs[0].called, 0);
        assert_eq!(subs[1].called, 1);
        assert_eq!(enum_counts(&subs[1]), vec![0, 1]);
    }

    #[test]
    fn test_unknown_keys_are_ignored() {
        let mut schema = user_schema();
        let before = schema.clone();
        increment_counters(&mut schema, &[json!({ "legacyField": 1, "filter": { "gone": true } })]);

        assert_eq!(schema.input_params[0], before.input_params[0]);
        assert_eq!(schema.input_params[2].called, 1);
        let subs = schema.input_params[2].sub_params.as_ref().unwrap();
        assert!(subs.iter().all(|p| p.called == 0));
    }

    #[test]
    fn test_null_counts_param_but_no_enum_member() {
        let mut schema = user_schema();
        increment_counters(&mut schema, &[json!({ "role": null })]);

        assert_eq!(schema.input_params[1].called, 1);
        assert_eq!(enum_counts(&schema.input_params[1]), vec![0, 0, 0]);
    }

    #[test]
    fn test_arrays_of_inputs_and_enums() {
        let mut schema = user_schema();
        increment_counters(
            &mut schema,
            &[json!({
                "role": ["USER", "GUEST"],
                "filter": [{ "name": "a" }, { "level": 1 }]
            })],
        );

        assert_eq!(enum_counts(&schema.input_params[1]), vec![0, 1, 1]);
        let subs = schema.input_params[2].sub_params.as_ref().unwrap();
        assert_eq!(subs[0].called, 1);
        assert_eq!(enum_counts(&subs[1]), vec![1, 0]);
    }

    #[test]
    fn test_only_first_argument_is_merged() {
        let mut schema = user_schema();
        increment_counters(&mut schema, &[json!("not-an-object"), json!({ "id": "x" })]);
        assert_eq!(schema.input_params[0].called, 0);
    }

    #[test]
    fn test_accumulate_matches_operations_by_name() {
        let mut schemas = vec![user_schema(), OperationSchema::new("users")];
        let recorded = vec![
            OperationCalls {
                name: "user".to_string(),
                calls: vec![
                    CallRecord {
                        name: "user".to_string(),
                        input_params: vec![json!({ "id": "1" })],
                    },
                    CallRecord {
                        name: "user".to_string(),
                        input_params: vec![json!({ "id": "2" })],
                    },
                    CallRecord {
                        name: "user".to_string(),
                        input_params: vec![],
                    },
                ],
            },
            OperationCalls {
                name: "removedOperation".to_string(),
                calls: vec![],
            },
        ];

        accumulate(&mut schemas, &recorded);

        assert_eq!(schemas[0].input_params[0].called, 2);
        assert!(schemas[1].input_params.is_empty());
    }
}
