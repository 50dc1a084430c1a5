//! Capabilities: a resource, an action on it, and optional caveats.
//!
//! On the wire a capability is a single JSON object. `with` names the
//! resource, `can` the action, and every other key is a caveat:
//!
//! ```json
//! { "with": "storage://example.com/photos", "can": "storage/read", "max_size": 1024 }
//! ```

use serde::{
    Deserialize, Deserializer, Serialize,
    de::{self, MapAccess, Visitor},
    ser::SerializeMap,
};
use serde_json::Value;
use std::fmt;

/// Key of the resource field.
const RESOURCE_KEY: &str = "with";

/// Key of the action field.
const ACTION_KEY: &str = "can";

/// Action granting every other action.
pub const WILDCARD_ACTION: &str = "*";

/// Error building a [`Capability`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CapabilityError {
    /// `with` and `can` cannot be used as caveat keys.
    #[error("Caveat key {0:?} is reserved")]
    ReservedKey(String),

    /// Caveat keys are unique within a capability.
    #[error("Caveat {0:?} is already set")]
    DuplicateKey(String),
}

/// A single constraint attached to a capability.
///
/// Values are opaque JSON; see [`Caveat::is_implied_by`] for how a child
/// caveat is compared against a parent's.
#[derive(Debug, Clone, PartialEq)]
pub struct Caveat {
    key: String,
    value: Value,
}

impl Caveat {
    /// Caveat key.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Caveat value.
    #[must_use]
    pub const fn value(&self) -> &Value {
        &self.value
    }

    /// Whether `child` restricts at least as much as this caveat.
    ///
    /// Equal values always imply each other. Objects imply when every entry
    /// of the parent object is implied by the child's entry of the same key.
    /// Arrays are allow-lists: the child implies the parent when it lists a
    /// subset of the parent's elements.
    #[must_use]
    pub fn is_implied_by(&self, child: &Value) -> bool {
        implies(child, &self.value)
    }
}

fn implies(child: &Value, parent: &Value) -> bool {
    match (child, parent) {
        (child, parent) if child == parent => true,
        (Value::Object(child), Value::Object(parent)) => parent.iter().all(|(key, expected)| {
            child
                .get(key)
                .is_some_and(|actual| implies(actual, expected))
        }),
        (Value::Array(child), Value::Array(parent)) => {
            child.iter().all(|element| parent.contains(element))
        }
        _ => false,
    }
}

/// A permitted action on a resource, optionally narrowed by caveats.
///
/// Immutable once constructed; caveat insertion order is preserved.
#[derive(Debug, Clone, PartialEq)]
pub struct Capability {
    resource: String,
    action: String,
    caveats: Vec<Caveat>,
}

impl Capability {
    /// A capability with no caveats.
    #[must_use]
    pub fn new(resource: impl Into<String>, action: impl Into<String>) -> Self {
        Self {
            resource: resource.into(),
            action: action.into(),
            caveats: Vec::new(),
        }
    }

    /// Returns this capability with an additional caveat.
    ///
    /// # Errors
    ///
    /// Fails if `key` is `with`, `can`, or already present.
    pub fn caveat(
        mut self,
        key: impl Into<String>,
        value: impl Into<Value>,
    ) -> Result<Self, CapabilityError> {
        let key = key.into();
        if key == RESOURCE_KEY || key == ACTION_KEY {
            return Err(CapabilityError::ReservedKey(key));
        }
        if self.caveat_value(&key).is_some() {
            return Err(CapabilityError::DuplicateKey(key));
        }
        self.caveats.push(Caveat {
            key,
            value: value.into(),
        });
        Ok(self)
    }

    /// The `with` field.
    #[must_use]
    pub fn resource(&self) -> &str {
        &self.resource
    }

    /// The `can` field.
    #[must_use]
    pub fn action(&self) -> &str {
        &self.action
    }

    /// Caveats in insertion order.
    #[must_use]
    pub fn caveats(&self) -> &[Caveat] {
        &self.caveats
    }

    /// Value of the caveat named `key`.
    #[must_use]
    pub fn caveat_value(&self, key: &str) -> Option<&Value> {
        self.caveats
            .iter()
            .find(|caveat| caveat.key == key)
            .map(Caveat::value)
    }

    /// Whether granting this action also grants `action`.
    ///
    /// `*` grants everything, `ns/*` grants `ns/*` and anything under
    /// `ns/`, any other action grants only itself.
    #[must_use]
    pub fn permits_action(&self, action: &str) -> bool {
        if self.action == action || self.action == WILDCARD_ACTION {
            return true;
        }
        match self.action.strip_suffix(WILDCARD_ACTION) {
            Some(namespace) if namespace.ends_with('/') => action.starts_with(namespace),
            _ => false,
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} on {}", self.action, self.resource)
    }
}

impl Serialize for Capability {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut map = serializer.serialize_map(Some(2 + self.caveats.len()))?;
        map.serialize_entry(RESOURCE_KEY, &self.resource)?;
        map.serialize_entry(ACTION_KEY, &self.action)?;
        for caveat in &self.caveats {
            map.serialize_entry(&caveat.key, &caveat.value)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Capability {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct CapabilityVisitor;

        impl<'de> Visitor<'de> for CapabilityVisitor {
            type Value = Capability;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map with string keys \"with\" and \"can\"")
            }

            fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut resource: Option<String> = None;
                let mut action: Option<String> = None;
                let mut caveats: Vec<Caveat> = Vec::new();

                while let Some(key) = map.next_key::<String>()? {
                    match key.as_str() {
                        RESOURCE_KEY => {
                            if resource.is_some() {
                                return Err(de::Error::duplicate_field(RESOURCE_KEY));
                            }
                            resource = Some(map.next_value()?);
                        }
                        ACTION_KEY => {
                            if action.is_some() {
                                return Err(de::Error::duplicate_field(ACTION_KEY));
                            }
                            action = Some(map.next_value()?);
                        }
                        _ => {
                            if caveats.iter().any(|caveat| caveat.key == key) {
                                return Err(de::Error::custom(format!(
                                    "duplicate caveat `{key}`"
                                )));
                            }
                            let value: Value = map.next_value()?;
                            caveats.push(Caveat { key, value });
                        }
                    }
                }

                Ok(Capability {
                    resource: resource.ok_or_else(|| de::Error::missing_field(RESOURCE_KEY))?,
                    action: action.ok_or_else(|| de::Error::missing_field(ACTION_KEY))?,
                    caveats,
                })
            }
        }

        deserializer.deserialize_map(CapabilityVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use testresult::TestResult;

    #[test]
    fn caveats_serialize_after_with_and_can_in_insertion_order() -> TestResult {
        let capability = Capability::new("storage://example.com/data", "storage/write")
            .caveat("zeta", 1)?
            .caveat("alpha", json!({"nested": true}))?;

        let json = serde_json::to_string(&capability)?;
        assert_eq!(
            json,
            r#"{"with":"storage://example.com/data","can":"storage/write","zeta":1,"alpha":{"nested":true}}"#
        );

        let decoded: Capability = serde_json::from_str(&json)?;
        assert_eq!(decoded, capability);
        assert_eq!(decoded.caveats()[0].key(), "zeta");
        Ok(())
    }

    #[test]
    fn reserved_and_duplicate_caveat_keys_are_rejected() -> TestResult {
        let capability = Capability::new("storage://example.com", "read");
        assert_eq!(
            capability.clone().caveat("with", 1),
            Err(CapabilityError::ReservedKey("with".into()))
        );
        assert_eq!(
            capability.caveat("limit", 1)?.caveat("limit", 2),
            Err(CapabilityError::DuplicateKey("limit".into()))
        );
        Ok(())
    }

    #[test]
    fn missing_or_mistyped_fields_do_not_decode() {
        assert!(serde_json::from_str::<Capability>(r#"{"with":"a://b"}"#).is_err());
        assert!(serde_json::from_str::<Capability>(r#"{"can":"read"}"#).is_err());
        assert!(serde_json::from_str::<Capability>(r#"{"with":1,"can":"read"}"#).is_err());
        assert!(serde_json::from_str::<Capability>(r#"["a://b","read"]"#).is_err());
        assert!(
            serde_json::from_str::<Capability>(r#"{"with":"a://b","can":"r","can":"w"}"#).is_err()
        );
        assert!(
            serde_json::from_str::<Capability>(r#"{"with":"a://b","can":"r","x":1,"x":2}"#)
                .is_err()
        );
    }

    #[test]
    fn action_hierarchy() {
        let any = Capability::new("storage://example.com", "*");
        assert!(any.permits_action("storage/read"));
        assert!(any.permits_action("*"));

        let storage = Capability::new("storage://example.com", "storage/*");
        assert!(storage.permits_action("storage/read"));
        assert!(storage.permits_action("storage/blob/put"));
        assert!(storage.permits_action("storage/*"));
        assert!(!storage.permits_action("storagex/read"));
        assert!(!storage.permits_action("*"));

        let read = Capability::new("storage://example.com", "storage/read");
        assert!(read.permits_action("storage/read"));
        assert!(!read.permits_action("storage/write"));
        assert!(!read.permits_action("storage/*"));
    }

    #[test]
    fn caveat_implication() {
        let parent = Caveat {
            key: "limits".into(),
            value: json!({"size": 10, "types": ["jpg", "png"]}),
        };
        assert!(parent.is_implied_by(&json!({"size": 10, "types": ["jpg", "png"]})));
        assert!(parent.is_implied_by(&json!({"size": 10, "types": ["png"], "extra": true})));
        assert!(!parent.is_implied_by(&json!({"size": 11, "types": ["png"]})));
        assert!(!parent.is_implied_by(&json!({"types": ["png"]})));
        assert!(!parent.is_implied_by(&json!({"size": 10, "types": ["png", "gif"]})));
        assert!(!parent.is_implied_by(&json!("anything")));
    }
}
