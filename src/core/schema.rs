//! Response schema sent alongside every translation request

use serde_json::{json, Map, Value};
use std::sync::OnceLock;

use crate::core::language::Language;

const KEY_DESCRIPTION: &str = "A unique, meaningful key for the translation item in snake_case format \
(e.g., 'hello_world', 'confirm_button'). Derived from the English meaning.";

/// Build the array-of-records schema for the given languages.
///
/// Every property is a required string: `key` first, then one per language
/// in the order given.
pub fn build_schema(languages: &[Language]) -> Value {
    let mut properties = Map::new();
    properties.insert(
        "key".to_string(),
        json!({ "type": "STRING", "description": KEY_DESCRIPTION }),
    );

    let mut required = vec![Value::from("key")];
    for lang in languages {
        properties.insert(
            lang.field_name().to_string(),
            json!({
                "type": "STRING",
                "description": format!("The translation of the input text into {}.", lang.display_name()),
            }),
        );
        required.push(Value::from(lang.field_name()));
    }

    json!({
        "type": "ARRAY",
        "items": {
            "type": "OBJECT",
            "properties": properties,
            "required": required,
        }
    })
}

/// Schema for the canonical language table, built on first use
pub fn record_schema() -> &'static Value {
    static SCHEMA: OnceLock<Value> = OnceLock::new();
    SCHEMA.get_or_init(|| build_schema(&Language::ALL))
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_json_diff::assert_json_include;

    #[test]
    fn test_schema_shape() {
        let schema = record_schema();
        assert_json_include!(
            actual: schema,
            expected: json!({
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "key": { "type": "STRING" },
                        "Korean": { "type": "STRING" },
                        "Chinese_Simplified": {
                            "type": "STRING",
                            "description": "The translation of the input text into Chinese Simplified."
                        }
                    }
                }
            })
        );
    }

    #[test]
    fn test_every_field_required_in_canonical_order() {
        let required: Vec<&str> = record_schema()["items"]["required"]
            .as_array()
            .unwrap()
            .iter()
            .map(|v| v.as_str().unwrap())
            .collect();

        let mut expected = vec!["key"];
        expected.extend(Language::ALL.iter().map(|l| l.field_name()));
        assert_eq!(required, expected);
        assert_eq!(record_schema()["items"]["properties"].as_object().unwrap().len(), 22);
    }

    #[test]
    fn test_build_schema_for_subset() {
        let schema = build_schema(&[Language::English, Language::Korean]);
        assert_eq!(schema["items"]["required"], json!(["key", "English", "Korean"]));
    }

    #[test]
    fn test_record_schema_is_built_once() {
        assert!(std::ptr::eq(record_schema(), record_schema()));
    }
}
