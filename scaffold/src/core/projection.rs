//! Declared-field merge policy shared by settings, prompt defaults and plans.
//!
//! Every entity that takes part in configuration layering lists its fields
//! explicitly and knows how to assign a single field from a JSON value. The
//! merge itself never introspects the target: keys that the entity does not
//! declare are ignored, so malformed input cannot grow the schema.

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tracing::warn;

/// One candidate source for a projection (a JSON object).
pub type Source = Map<String, Value>;

/// An entity with a fixed, enumerable set of mergeable fields.
pub trait Settingable {
    /// Field names as they appear in sources (camelCase).
    const FIELDS: &'static [&'static str];

    /// Assign `key` from `value`. Returns `false` when `key` is not declared
    /// or the value does not fit the field type; the target is unchanged then.
    fn assign(&mut self, key: &str, value: &Value) -> bool;
}

/// Merge `sources` (descending priority) into `target`.
///
/// For each declared field the first source that defines it wins. A field is
/// defined when present and not `null`. Fields no source defines are left
/// untouched. Returns the number of fields assigned.
pub fn project<T: Settingable>(target: &mut T, sources: &[&Source]) -> usize {
    let mut assigned = 0;
    for &field in T::FIELDS {
        let Some(value) = sources.iter().find_map(|source| defined(source, field)) else {
            continue;
        };
        if target.assign(field, value) {
            assigned += 1;
        }
    }
    assigned
}

fn defined<'a>(source: &'a Source, field: &str) -> Option<&'a Value> {
    source.get(field).filter(|value| !value.is_null())
}

/// Deserialize `value` into an owned `T` and store it in `slot`.
///
/// Helper for `Settingable::assign` implementations. The value is cloned
/// before deserializing, so the target never shares state with the source.
pub fn assign_field<T: DeserializeOwned>(slot: &mut T, field: &str, value: &Value) -> bool {
    match serde_json::from_value::<T>(value.clone()) {
        Ok(parsed) => {
            *slot = parsed;
            true
        }
        Err(err) => {
            warn!(field, err = %err, "ignoring value with unexpected shape");
            false
        }
    }
}

/// Convert a serializable value into a projection source.
///
/// Non-object values yield an empty source.
pub fn to_source<T: serde::Serialize>(value: &T) -> Source {
    match serde_json::to_value(value) {
        Ok(Value::Object(map)) => map,
        _ => Source::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};
    use serde_json::json;

    #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
    struct Inner {
        tags: Vec<String>,
    }

    #[derive(Debug, Clone, Default, PartialEq)]
    struct Target {
        name: String,
        count: u32,
        inner: Inner,
    }

    impl Settingable for Target {
        const FIELDS: &'static [&'static str] = &["name", "count", "inner"];

        fn assign(&mut self, key: &str, value: &Value) -> bool {
            match key {
                "name" => assign_field(&mut self.name, key, value),
                "count" => assign_field(&mut self.count, key, value),
                "inner" => assign_field(&mut self.inner, key, value),
                _ => false,
            }
        }
    }

    fn source(value: Value) -> Source {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn higher_priority_source_wins_for_overlapping_fields() {
        let mut target = Target::default();
        let a = source(json!({ "name": "from-a" }));
        let b = source(json!({ "name": "from-b", "count": 7 }));

        let assigned = project(&mut target, &[&a, &b]);

        assert_eq!(assigned, 2);
        assert_eq!(target.name, "from-a");
        assert_eq!(target.count, 7);
        assert_eq!(target.inner, Inner::default());
    }

    #[test]
    fn fields_no_source_defines_are_untouched() {
        let mut target = Target {
            name: "keep".to_string(),
            count: 3,
            inner: Inner::default(),
        };
        let empty = Source::new();
        let nulls = source(json!({ "name": null, "count": null }));

        assert_eq!(project(&mut target, &[&empty, &nulls]), 0);
        assert_eq!(target.name, "keep");
        assert_eq!(target.count, 3);
    }

    #[test]
    fn null_in_higher_priority_falls_through_to_lower() {
        let mut target = Target::default();
        let a = source(json!({ "name": null }));
        let b = source(json!({ "name": "from-b" }));

        project(&mut target, &[&a, &b]);
        assert_eq!(target.name, "from-b");
    }

    #[test]
    fn undeclared_keys_are_ignored() {
        let mut target = Target::default();
        let src = source(json!({ "Name": "wrong case", "extra": true, "count": 1 }));

        assert_eq!(project(&mut target, &[&src]), 1);
        assert_eq!(target.name, "");
        assert_eq!(target.count, 1);
    }

    #[test]
    fn mistyped_value_is_skipped_without_error() {
        let mut target = Target::default();
        let a = source(json!({ "count": "seven" }));
        let b = source(json!({ "count": 2 }));

        assert_eq!(project(&mut target, &[&a, &b]), 0);
        assert_eq!(target.count, 0);
    }

    #[test]
    fn nested_values_are_deep_copied() {
        let mut target = Target::default();
        let mut src = source(json!({ "inner": { "tags": ["a", "b"] } }));

        project(&mut target, &[&src]);

        if let Some(Value::Object(inner)) = src.get_mut("inner") {
            inner.insert("tags".to_string(), json!(["mutated"]));
        }
        assert_eq!(target.inner.tags, vec!["a", "b"]);

        target.inner.tags.push("c".to_string());
        assert_eq!(src["inner"]["tags"], json!(["mutated"]));
    }
}
