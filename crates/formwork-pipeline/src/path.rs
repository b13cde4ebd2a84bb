//! Nested-path accessor over JSON objects.
//!
//! Paths use dot or bracket segments interchangeably:
//! `user[address][city]` ≡ `user.address.city`. Reads are tolerant (a missing
//! or null step resolves to the empty string rather than an error); writes
//! create intermediate objects as needed.

use serde_json::Value;

/// Convert bracket segments to dots and split into segments.
///
/// Pure and total: any input string produces a segment list.
pub fn normalize(path: &str) -> Vec<String> {
    let mut dotted = String::with_capacity(path.len());
    let mut rest = path;
    while let Some(open) = rest.find('[') {
        dotted.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        match after.find(']') {
            Some(close) => {
                dotted.push('.');
                dotted.push_str(&after[..close]);
                rest = &after[close + 1..];
            }
            None => {
                // Unterminated bracket: keep the remainder verbatim.
                dotted.push_str(&rest[open..]);
                rest = "";
            }
        }
    }
    dotted.push_str(rest);
    dotted.split('.').map(str::to_string).collect()
}

fn step<'a>(container: &'a Value, segment: &str) -> Option<&'a Value> {
    match container {
        Value::Object(map) => map.get(segment),
        Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => None,
    }
}

/// Walk `path` through `obj`, substituting the empty string at any
/// missing or null step. Never fails.
pub fn get(path: &str, obj: &Value) -> Value {
    let mut current = obj;
    for segment in normalize(path) {
        current = match step(current, &segment) {
            Some(next) if !next.is_null() => next,
            _ => return Value::String(String::new()),
        };
    }
    current.clone()
}

/// Assign `value` at `path` inside `obj`, creating an empty object at any
/// intermediate segment whose current value is not itself an object.
/// Mutates `obj` in place.
pub fn set(path: &str, obj: &mut Value, value: Value) {
    let mut segments = normalize(path);
    let Some(last) = segments.pop() else {
        return;
    };

    let mut current = obj;
    for segment in segments {
        if !current.is_object() {
            *current = Value::Object(serde_json::Map::new());
        }
        if let Value::Object(map) = current {
            let entry = map.entry(segment).or_insert(Value::Null);
            if !entry.is_object() {
                *entry = Value::Object(serde_json::Map::new());
            }
            current = entry;
        }
    }

    if !current.is_object() {
        *current = Value::Object(serde_json::Map::new());
    }
    if let Value::Object(map) = current {
        map.insert(last, value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn normalize_dots_pass_through() {
        assert_eq!(normalize("a.b.c"), vec!["a", "b", "c"]);
        assert_eq!(normalize("field"), vec!["field"]);
    }

    #[test]
    fn normalize_brackets_become_dots() {
        assert_eq!(normalize("user[address][city]"), vec!["user", "address", "city"]);
        assert_eq!(normalize("tags[0]"), vec!["tags", "0"]);
    }

    #[test]
    fn normalize_mixed_notation() {
        assert_eq!(normalize("a[b].c"), vec!["a", "b", "c"]);
    }

    #[test]
    fn normalize_is_total_over_odd_input() {
        // Unterminated bracket and empty string still produce segments.
        assert_eq!(normalize("a[b"), vec!["a[b"]);
        assert_eq!(normalize(""), vec![""]);
    }

    #[test]
    fn get_resolves_nested_value() {
        let obj = json!({ "user": { "address": { "city": "Oslo" } } });
        assert_eq!(get("user.address.city", &obj), json!("Oslo"));
        assert_eq!(get("user[address][city]", &obj), json!("Oslo"));
    }

    #[test]
    fn get_indexes_into_arrays() {
        let obj = json!({ "tags": ["a", "b"] });
        assert_eq!(get("tags[1]", &obj), json!("b"));
        assert_eq!(get("tags[9]", &obj), json!(""));
    }

    #[test]
    fn get_missing_step_yields_empty_string() {
        let obj = json!({ "user": { "name": "kim" } });
        assert_eq!(get("user.address.city", &obj), json!(""));
        assert_eq!(get("nothing", &obj), json!(""));
    }

    #[test]
    fn get_null_step_yields_empty_string() {
        let obj = json!({ "user": null });
        assert_eq!(get("user.name", &obj), json!(""));
        assert_eq!(get("user", &obj), json!(""));
    }

    #[test]
    fn get_through_non_object_yields_empty_string() {
        let obj = json!({ "user": "flat" });
        assert_eq!(get("user.name", &obj), json!(""));
    }

    #[test]
    fn set_creates_intermediate_objects() {
        let mut obj = json!({});
        set("user.address.city", &mut obj, json!("Oslo"));
        assert_eq!(obj, json!({ "user": { "address": { "city": "Oslo" } } }));
    }

    #[test]
    fn set_overwrites_non_object_intermediates() {
        let mut obj = json!({ "user": "flat" });
        set("user.name", &mut obj, json!("kim"));
        assert_eq!(obj, json!({ "user": { "name": "kim" } }));
    }

    #[test]
    fn set_preserves_sibling_keys() {
        let mut obj = json!({ "user": { "name": "kim" } });
        set("user.city", &mut obj, json!("Oslo"));
        assert_eq!(obj, json!({ "user": { "name": "kim", "city": "Oslo" } }));
    }

    #[test]
    fn set_then_get_round_trips() {
        for path in ["a", "a.b", "a[b][c]", "x.y.z.w"] {
            let mut obj = json!({});
            set(path, &mut obj, json!(42));
            assert_eq!(get(path, &obj), json!(42), "path {path}");
        }
    }
}
