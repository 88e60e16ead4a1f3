//! Structural validation of JSON documents before typed decoding.
//!
//! A [`Schema`] is a small declarative tree checked against a
//! [`serde_json::Value`]. Validation is a pure predicate: it never mutates or
//! decodes the document, so the rules can be tested on their own.

use serde_json::Value;
use std::fmt;

/// First rule a document broke, with a JSON-pointer style location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaViolation {
    pub path: String,
    pub message: String,
}

impl fmt::Display for SchemaViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let path = if self.path.is_empty() { "/" } else { &self.path };
        write!(f, "{} at {}", self.message, path)
    }
}

/// Rule applied to every key of a [`Schema::Map`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyRule {
    Any,
    /// `<namespace>:<identifier>`, identifier drawn from `[a-z0-9_.-/]`.
    Namespaced(&'static str),
}

impl KeyRule {
    fn accepts(&self, key: &str) -> bool {
        match self {
            KeyRule::Any => true,
            KeyRule::Namespaced(namespace) => key
                .strip_prefix(namespace)
                .and_then(|rest| rest.strip_prefix(':'))
                .is_some_and(is_identifier),
        }
    }
}

fn is_identifier(s: &str) -> bool {
    !s.is_empty()
        && s.chars().all(|c| {
            c.is_ascii_lowercase() || c.is_ascii_digit() || matches!(c, '_' | '.' | '-' | '/')
        })
}

#[derive(Debug, Clone, PartialEq)]
pub enum Schema {
    Integer {
        minimum: Option<i64>,
    },
    String,
    Array {
        items: Box<Schema>,
        min_items: usize,
        max_items: Option<usize>,
    },
    /// Listed properties are required; others are ignored.
    Object {
        required: Vec<(&'static str, Schema)>,
    },
    Map {
        keys: KeyRule,
        values: Box<Schema>,
    },
}

impl Schema {
    pub fn integer() -> Self {
        Schema::Integer { minimum: None }
    }

    pub fn integer_at_least(minimum: i64) -> Self {
        Schema::Integer {
            minimum: Some(minimum),
        }
    }

    pub fn array(items: Schema) -> Self {
        Schema::Array {
            items: Box::new(items),
            min_items: 0,
            max_items: None,
        }
    }

    pub fn object(required: Vec<(&'static str, Schema)>) -> Self {
        Schema::Object { required }
    }

    pub fn map(keys: KeyRule, values: Schema) -> Self {
        Schema::Map {
            keys,
            values: Box::new(values),
        }
    }

    /// Only meaningful on arrays; other kinds are returned unchanged.
    pub fn min_items(mut self, n: usize) -> Self {
        if let Schema::Array { min_items, .. } = &mut self {
            *min_items = n;
        }
        self
    }

    pub fn max_items(mut self, n: usize) -> Self {
        if let Schema::Array { max_items, .. } = &mut self {
            *max_items = Some(n);
        }
        self
    }

    pub fn exact_items(self, n: usize) -> Self {
        self.min_items(n).max_items(n)
    }

    pub fn is_valid(&self, value: &Value) -> bool {
        self.validate(value).is_ok()
    }

    pub fn validate(&self, value: &Value) -> Result<(), SchemaViolation> {
        let mut path = String::new();
        self.check(value, &mut path)
    }

    fn check(&self, value: &Value, path: &mut String) -> Result<(), SchemaViolation> {
        match self {
            Schema::Integer { minimum } => {
                let n = match value.as_i64() {
                    Some(n) => n,
                    None if value.is_u64() => i64::MAX,
                    None => return Err(violation(path, "expected an integer")),
                };
                if let Some(min) = minimum {
                    if n < *min {
                        return Err(violation(path, &format!("expected an integer >= {}", min)));
                    }
                }
                Ok(())
            }
            Schema::String => {
                if value.is_string() {
                    Ok(())
                } else {
                    Err(violation(path, "expected a string"))
                }
            }
            Schema::Array {
                items,
                min_items,
                max_items,
            } => {
                let arr = value
                    .as_array()
                    .ok_or_else(|| violation(path, "expected an array"))?;
                if arr.len() < *min_items {
                    return Err(violation(
                        path,
                        &format!("expected at least {} items, found {}", min_items, arr.len()),
                    ));
                }
                if let Some(max) = max_items {
                    if arr.len() > *max {
                        return Err(violation(
                            path,
                            &format!("expected at most {} items, found {}", max, arr.len()),
                        ));
                    }
                }
                for (i, item) in arr.iter().enumerate() {
                    with_segment(path, &i.to_string(), |path| items.check(item, path))?;
                }
                Ok(())
            }
            Schema::Object { required } => {
                let obj = value
                    .as_object()
                    .ok_or_else(|| violation(path, "expected an object"))?;
                for (name, schema) in required {
                    match obj.get(*name) {
                        Some(field) => with_segment(path, name, |path| schema.check(field, path))?,
                        None => {
                            return Err(violation(
                                path,
                                &format!("missing required property '{}'", name),
                            ))
                        }
                    }
                }
                Ok(())
            }
            Schema::Map { keys, values } => {
                let obj = value
                    .as_object()
                    .ok_or_else(|| violation(path, "expected an object"))?;
                for (key, field) in obj {
                    if !keys.accepts(key) {
                        return Err(violation(path, &format!("invalid key '{}'", key)));
                    }
                    with_segment(path, key, |path| values.check(field, path))?;
                }
                Ok(())
            }
        }
    }
}

fn violation(path: &str, message: &str) -> SchemaViolation {
    SchemaViolation {
        path: path.to_string(),
        message: message.to_string(),
    }
}

fn with_segment<T>(path: &mut String, segment: &str, f: impl FnOnce(&mut String) -> T) -> T {
    let len = path.len();
    path.push('/');
    path.push_str(segment);
    let out = f(path);
    path.truncate(len);
    out
}

/// A 3-level nested array of integers. Emptiness and raggedness are semantic
/// checks left to the decoder.
pub fn dense_volume_schema() -> Schema {
    Schema::array(Schema::array(Schema::array(Schema::integer())))
}

pub fn structure_schema() -> Schema {
    let palette_entry = Schema::object(vec![("name", Schema::String)]);
    Schema::object(vec![
        ("size", Schema::array(Schema::integer_at_least(1)).exact_items(3)),
        (
            "structure",
            Schema::object(vec![
                (
                    "block_indices",
                    Schema::array(Schema::array(Schema::integer()).min_items(1)).min_items(1),
                ),
                (
                    "palette",
                    Schema::object(vec![(
                        "default",
                        Schema::object(vec![(
                            "block_palette",
                            Schema::array(palette_entry).min_items(1),
                        )]),
                    )]),
                ),
            ]),
        ),
    ])
}

pub fn block_dictionary_schema() -> Schema {
    Schema::map(KeyRule::Namespaced("minecraft"), Schema::integer())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_dense_schema_accepts_nested_integers() {
        let schema = dense_volume_schema();
        assert!(schema.is_valid(&json!([[[1, 2], [3, 4]], [[5, 6], [7, 8]]])));
        // Raggedness is not a schema concern.
        assert!(schema.is_valid(&json!([[[1], [2, 3]]])));
        assert!(schema.is_valid(&json!([])));
    }

    #[test]
    fn test_dense_schema_rejects_wrong_depth_or_type() {
        let schema = dense_volume_schema();
        assert!(!schema.is_valid(&json!([[1, 2]])));
        assert!(!schema.is_valid(&json!([[[1.5]]])));
        assert!(!schema.is_valid(&json!([[["stone"]]])));
        assert!(!schema.is_valid(&json!({"blocks": []})));

        let err = schema.validate(&json!([[[1], [2, "x"]]])).unwrap_err();
        assert_eq!(err.path, "/0/1/1");
        assert_eq!(err.message, "expected an integer");
    }

    fn structure_doc() -> Value {
        json!({
            "size": [2, 2, 2],
            "structure": {
                "block_indices": [[0, 1, 0, 1, 0, 1, 0, 1], [-1, -1]],
                "palette": {"default": {"block_palette": [
                    {"name": "minecraft:stone"},
                    {"name": "minecraft:dirt", "states": {}}
                ]}}
            }
        })
    }

    #[test]
    fn test_structure_schema_accepts_valid_document() {
        assert!(structure_schema().is_valid(&structure_doc()));
    }

    #[test]
    fn test_structure_schema_requires_three_positive_sizes() {
        let schema = structure_schema();
        let mut doc = structure_doc();
        doc["size"] = json!([2, 2]);
        assert!(!schema.is_valid(&doc));
        doc["size"] = json!([2, 2, 2, 2]);
        assert!(!schema.is_valid(&doc));
        doc["size"] = json!([2, 0, 2]);
        let err = schema.validate(&doc).unwrap_err();
        assert_eq!(err.path, "/size/1");
    }

    #[test]
    fn test_structure_schema_requires_non_empty_indices_and_palette() {
        let schema = structure_schema();

        let mut doc = structure_doc();
        doc["structure"]["block_indices"] = json!([]);
        assert!(!schema.is_valid(&doc));

        let mut doc = structure_doc();
        doc["structure"]["block_indices"] = json!([[]]);
        assert!(!schema.is_valid(&doc));

        let mut doc = structure_doc();
        doc["structure"]["palette"]["default"]["block_palette"] = json!([]);
        assert!(!schema.is_valid(&doc));

        let mut doc = structure_doc();
        doc["structure"]["palette"]["default"]["block_palette"] = json!([{"id": 3}]);
        let err = schema.validate(&doc).unwrap_err();
        assert_eq!(err.path, "/structure/palette/default/block_palette/0");
        assert_eq!(err.message, "missing required property 'name'");
    }

    #[test]
    fn test_structure_schema_missing_section() {
        let err = structure_schema()
            .validate(&json!({"size": [1, 1, 1]}))
            .unwrap_err();
        assert_eq!(err.path, "");
        assert_eq!(err.to_string(), "missing required property 'structure' at /");
    }

    #[test]
    fn test_block_dictionary_schema() {
        let schema = block_dictionary_schema();
        assert!(schema.is_valid(&json!({"minecraft:stone": 1, "minecraft:oak_log": 17})));
        assert!(schema.is_valid(&json!({})));
        assert!(!schema.is_valid(&json!({"stone": 1})));
        assert!(!schema.is_valid(&json!({"minecraft:": 1})));
        assert!(!schema.is_valid(&json!({"minecraft:Stone": 1})));
        assert!(!schema.is_valid(&json!({"minecraft:stone": "1"})));
        assert!(!schema.is_valid(&json!([["minecraft:stone", 1]])));
    }

    #[test]
    fn test_key_rule() {
        let rule = KeyRule::Namespaced("minecraft");
        assert!(rule.accepts("minecraft:redstone_wire"));
        assert!(rule.accepts("minecraft:block/stone"));
        assert!(!rule.accepts("minecraftstone"));
        assert!(!rule.accepts("other:stone"));
        assert!(KeyRule::Any.accepts(""));
    }
}
