//! `application/x-www-form-urlencoded` encoding of request bodies.
//!
//! Nested values are flattened into bracketed keys (`filter[name]`,
//! `tags[0]`) the way PHP-style backends expect them. `true`/`false` become
//! `1`/`0` and `null` fields are dropped.

use serde_json::{Map, Value};

/// Flatten `body` into ordered `(key, value)` pairs.
pub fn flatten(body: &Map<String, Value>) -> Vec<(String, String)> {
    let mut pairs = Vec::new();
    for (key, value) in body {
        push_value(&mut pairs, key.clone(), value);
    }
    pairs
}

fn push_value(pairs: &mut Vec<(String, String)>, key: String, value: &Value) {
    match value {
        Value::Null => {}
        Value::Bool(flag) => pairs.push((key, if *flag { "1" } else { "0" }.to_string())),
        Value::Number(number) => pairs.push((key, number.to_string())),
        Value::String(text) => pairs.push((key, text.clone())),
        Value::Array(items) => {
            for (index, item) in items.iter().enumerate() {
                push_value(pairs, format!("{key}[{index}]"), item);
            }
        }
        Value::Object(fields) => {
            for (sub_key, item) in fields {
                push_value(pairs, format!("{key}[{sub_key}]"), item);
            }
        }
    }
}

/// Percent-encode already flattened pairs. Spaces become `+`.
pub fn encode_pairs(pairs: &[(String, String)]) -> String {
    url::form_urlencoded::Serializer::new(String::new())
        .extend_pairs(pairs)
        .finish()
}

pub fn encode(body: &Map<String, Value>) -> String {
    encode_pairs(&flatten(body))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn map(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            other => panic!("expected object, got {other}"),
        }
    }

    #[test]
    fn flat_fields_keep_insertion_order() {
        let body = map(json!({"b": "2", "a": "1"}));
        assert_eq!(encode(&body), "b=2&a=1");
    }

    #[test]
    fn scalars_are_stringified() {
        let body = map(json!({"n": 3, "f": 1.5, "yes": true, "no": false, "skip": null}));
        assert_eq!(encode(&body), "n=3&f=1.5&yes=1&no=0");
    }

    #[test]
    fn nested_values_use_bracketed_keys() {
        let body = map(json!({"filter": {"name": "x"}, "tags": ["a", "b"]}));
        let pairs = flatten(&body);
        assert_eq!(
            pairs,
            vec![
                ("filter[name]".to_string(), "x".to_string()),
                ("tags[0]".to_string(), "a".to_string()),
                ("tags[1]".to_string(), "b".to_string()),
            ]
        );
        assert_eq!(encode(&body), "filter%5Bname%5D=x&tags%5B0%5D=a&tags%5B1%5D=b");
    }

    #[test]
    fn reserved_characters_are_escaped() {
        let body = map(json!({"q": "a b&c=d"}));
        assert_eq!(encode(&body), "q=a+b%26c%3Dd");
    }

    #[test]
    fn empty_body_encodes_to_empty_string() {
        assert_eq!(encode(&Map::new()), "");
    }
}
