// ── Declared and observed attribute snapshots ──
//
// Both sides of a reconciliation are flat-or-nested JSON object maps with
// snake_case keys. The controller speaks camelCase; `to_wire`/`from_wire`
// translate at the adapter boundary.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Attribute map keyed by snake_case field name.
pub type Attributes = Map<String, Value>;

/// What the operator wants the object to look like.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeclaredState(Attributes);

/// What the controller last reported for the object.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObservedState(Attributes);

macro_rules! attribute_snapshot {
    ($ty:ident) => {
        impl $ty {
            pub fn new(attributes: Attributes) -> Self {
                Self(attributes)
            }

            pub fn get(&self, field: &str) -> Option<&Value> {
                self.0.get(field)
            }

            pub fn attributes(&self) -> &Attributes {
                &self.0
            }

            pub fn into_attributes(self) -> Attributes {
                self.0
            }

            pub fn is_empty(&self) -> bool {
                self.0.is_empty()
            }

            /// Only the given fields, skipping any that are absent.
            pub fn project<'a>(&self, fields: impl IntoIterator<Item = &'a String>) -> Attributes {
                fields
                    .into_iter()
                    .filter_map(|f| self.0.get(f).map(|v| (f.clone(), v.clone())))
                    .collect()
            }
        }

        impl From<Attributes> for $ty {
            fn from(attributes: Attributes) -> Self {
                Self(attributes)
            }
        }

        impl TryFrom<Value> for $ty {
            type Error = Value;

            fn try_from(value: Value) -> Result<Self, Self::Error> {
                match value {
                    Value::Object(map) => Ok(Self(map)),
                    other => Err(other),
                }
            }
        }
    };
}

attribute_snapshot!(DeclaredState);
attribute_snapshot!(ObservedState);

impl ObservedState {
    /// Merge a fresh read into the prior snapshot.
    ///
    /// Managed fields take the fresh value (or disappear if the controller
    /// no longer reports them). Every other field keeps its prior value when
    /// there was one, so attributes owned by someone else are not clobbered
    /// by this pass.
    pub fn refresh(
        prior: Option<&ObservedState>,
        fresh: ObservedState,
        managed: &BTreeSet<String>,
    ) -> ObservedState {
        let Some(prior) = prior else {
            return fresh;
        };
        let mut merged = fresh.0;
        for (field, value) in &prior.0 {
            if !managed.contains(field) {
                merged.insert(field.clone(), value.clone());
            }
        }
        ObservedState(merged)
    }

    /// Put `prior`'s value back for each of `fields`.
    ///
    /// Used when remote drift is reported but not accepted: the baseline
    /// must keep the last converged values or the next pass would mistake
    /// the drifted values for its own.
    pub fn restore(&mut self, prior: &ObservedState, fields: &[String]) {
        for field in fields {
            match prior.0.get(field) {
                Some(value) => {
                    self.0.insert(field.clone(), value.clone());
                }
                None => {
                    self.0.remove(field);
                }
            }
        }
    }
}

// ── Key translation ──────────────────────────────────────────────────

/// `repeat_schedules` → `repeatSchedules`
pub fn snake_to_camel(key: &str) -> String {
    let mut out = String::with_capacity(key.len());
    let mut upper = false;
    for c in key.chars() {
        if c == '_' {
            upper = !out.is_empty();
        } else if upper {
            out.extend(c.to_uppercase());
            upper = false;
        } else {
            out.push(c);
        }
    }
    out
}

/// `userDistinguishedName` → `user_distinguished_name`
pub fn camel_to_snake(key: &str) -> String {
    let mut out = String::with_capacity(key.len() + 4);
    for c in key.chars() {
        if c.is_uppercase() {
            if !out.is_empty() {
                out.push('_');
            }
            out.extend(c.to_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

fn rename_keys(value: &Value, rename: fn(&str) -> String) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(k, v)| (rename(k), rename_keys(v, rename)))
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.iter().map(|v| rename_keys(v, rename)).collect()),
        other => other.clone(),
    }
}

/// Snake-case attributes to a camelCase request body.
pub fn to_wire(attributes: &Attributes) -> Map<String, Value> {
    attributes
        .iter()
        .map(|(k, v)| (snake_to_camel(k), rename_keys(v, snake_to_camel)))
        .collect()
}

/// A camelCase controller object to snake-case attributes.
pub fn from_wire(object: &Map<String, Value>) -> Attributes {
    object
        .iter()
        .map(|(k, v)| (camel_to_snake(k), rename_keys(v, camel_to_snake)))
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    fn attrs(value: Value) -> Attributes {
        match value {
            Value::Object(map) => map,
            _ => panic!("not an object"),
        }
    }

    #[test]
    fn key_case_conversion() {
        assert_eq!(snake_to_camel("repeat_schedules"), "repeatSchedules");
        assert_eq!(snake_to_camel("name"), "name");
        assert_eq!(camel_to_snake("userDistinguishedName"), "user_distinguished_name");
        assert_eq!(camel_to_snake("remedyMethods"), "remedy_methods");
    }

    #[test]
    fn wire_translation_recurses_into_nested_objects() {
        let declared = attrs(json!({
            "remedy_methods": [{ "claim_suffix": "x", "type": "DisplayMessage" }],
            "admin_protocol": { "ssh_port": 22 }
        }));
        let wire = to_wire(&declared);
        assert_eq!(
            Value::Object(wire.clone()),
            json!({
                "remedyMethods": [{ "claimSuffix": "x", "type": "DisplayMessage" }],
                "adminProtocol": { "sshPort": 22 }
            })
        );
        assert_eq!(from_wire(&wire), declared);
    }

    #[test]
    fn refresh_keeps_unmanaged_prior_fields() {
        let prior = ObservedState::new(attrs(json!({
            "name": "old",
            "notes": "set by hand",
            "tags": ["a"]
        })));
        let fresh = ObservedState::new(attrs(json!({
            "name": "new",
            "notes": "changed remotely",
            "tags": ["a", "b"]
        })));
        let managed = BTreeSet::from(["name".to_owned(), "tags".to_owned()]);

        let merged = ObservedState::refresh(Some(&prior), fresh, &managed);

        assert_eq!(merged.get("name"), Some(&json!("new")));
        assert_eq!(merged.get("tags"), Some(&json!(["a", "b"])));
        assert_eq!(merged.get("notes"), Some(&json!("set by hand")));
    }

    #[test]
    fn refresh_without_prior_takes_everything() {
        let fresh = ObservedState::new(attrs(json!({ "name": "x", "id": "1" })));
        let merged = ObservedState::refresh(None, fresh.clone(), &BTreeSet::new());
        assert_eq!(merged, fresh);
    }

    #[test]
    fn restore_puts_back_prior_values_only_for_named_fields() {
        let prior = ObservedState::new(attrs(json!({ "name": "hq", "notes": "mine" })));
        let mut fresh = ObservedState::new(attrs(json!({
            "name": "hq2",
            "notes": "theirs",
            "tags": ["x"]
        })));

        fresh.restore(&prior, &["notes".to_owned(), "tags".to_owned()]);

        assert_eq!(fresh.get("notes"), Some(&json!("mine")));
        assert_eq!(fresh.get("name"), Some(&json!("hq2")));
        assert_eq!(fresh.get("tags"), None);
    }

    #[test]
    fn project_skips_absent_fields() {
        let declared = DeclaredState::new(attrs(json!({ "name": "x", "tags": [] })));
        let fields = ["name".to_owned(), "missing".to_owned()];
        let projected = declared.project(&fields);
        assert_eq!(Value::Object(projected), json!({ "name": "x" }));
    }
}
