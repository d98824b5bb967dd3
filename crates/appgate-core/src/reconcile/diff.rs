// Field-level comparison of attribute snapshots.

use std::collections::BTreeSet;

use serde_json::Value;

use crate::model::Attributes;

/// Managed fields whose value differs between `desired` and `actual`.
///
/// A missing field equals `null`. For `set_fields`, array order is ignored
/// and a missing field also equals the empty array.
pub fn changed_fields(
    desired: &Attributes,
    actual: &Attributes,
    managed: &BTreeSet<String>,
    set_fields: &[&str],
) -> Vec<String> {
    managed
        .iter()
        .filter(|field| {
            let is_set = set_fields.contains(&field.as_str());
            !field_eq(desired.get(*field), actual.get(*field), is_set)
        })
        .cloned()
        .collect()
}

fn field_eq(a: Option<&Value>, b: Option<&Value>, is_set: bool) -> bool {
    const NULL: &Value = &Value::Null;
    let a = a.unwrap_or(NULL);
    let b = b.unwrap_or(NULL);
    if !is_set {
        return a == b;
    }
    match (as_set(a), as_set(b)) {
        (Some(x), Some(y)) => x == y,
        _ => a == b,
    }
}

/// Elements of an array (or nothing for null) in canonical order.
fn as_set(value: &Value) -> Option<Vec<String>> {
    match value {
        Value::Null => Some(Vec::new()),
        Value::Array(items) => {
            let mut keys: Vec<String> = items.iter().map(Value::to_string).collect();
            keys.sort();
            Some(keys)
        }
        _ => None,
    }
}
