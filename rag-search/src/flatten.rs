//! Flattens nested JSON into a single searchable text blob.
//!
//! Nested object keys are joined with `_`; list items get a `_{index}`
//! suffix. Nulls are dropped. Key order follows the document.

use serde_json::Value;

/// Flattens `value` into ordered `(key, value)` pairs.
pub fn flatten_json_content(value: &Value) -> Vec<(String, String)> {
    let mut out = Vec::new();
    walk(value, "", &mut out);
    out
}

/// Renders the flattened pairs as one `key: value` blob separated by spaces.
pub fn flatten_to_text(value: &Value) -> String {
    flatten_json_content(value)
        .into_iter()
        .map(|(k, v)| format!("{k}: {v}"))
        .collect::<Vec<_>>()
        .join(" ")
}

fn walk(value: &Value, parent_key: &str, out: &mut Vec<(String, String)>) {
    match value {
        Value::Object(map) => {
            for (k, v) in map {
                let new_key = if parent_key.is_empty() {
                    k.clone()
                } else {
                    format!("{parent_key}_{k}")
                };
                walk(v, &new_key, out);
            }
        }
        Value::Array(items) => {
            for (i, v) in items.iter().enumerate() {
                walk(v, &format!("{parent_key}_{i}"), out);
            }
        }
        Value::String(s) => out.push((parent_key.to_string(), s.clone())),
        Value::Number(n) => out.push((parent_key.to_string(), n.to_string())),
        Value::Bool(b) => out.push((parent_key.to_string(), b.to_string())),
        Value::Null => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use serde_json::json;

    #[test]
    fn nested_keys_join_with_underscore() {
        let v = json!({"overview": {"summary": "grow", "steps": {"first": "learn"}}});
        let pairs = flatten_json_content(&v);
        assert_eq!(
            pairs,
            vec![
                ("overview_summary".to_string(), "grow".to_string()),
                ("overview_steps_first".to_string(), "learn".to_string()),
            ]
        );
    }

    #[test]
    fn list_items_get_index_suffix() {
        let v = json!({"skills": ["rust", "sql"]});
        let pairs = flatten_json_content(&v);
        assert_eq!(
            pairs,
            vec![
                ("skills_0".to_string(), "rust".to_string()),
                ("skills_1".to_string(), "sql".to_string()),
            ]
        );
    }

    #[test]
    fn nested_objects_inside_lists_recurse() {
        let v = json!({"levels": [{"name": "junior"}, {"name": "senior"}]});
        let text = flatten_to_text(&v);
        assert_eq!(text, "levels_0_name: junior levels_1_name: senior");
    }

    #[test]
    fn primitives_and_nulls() {
        let v = json!({"years": 3, "remote": true, "notes": null});
        let text = flatten_to_text(&v);
        assert_eq!(text, "years: 3 remote: true");
    }
}
