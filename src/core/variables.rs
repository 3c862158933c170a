//! Ordered build-variable mappings handed to the generator.

use std::fmt;

use serde::de::{self, MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A single generator variable value.
///
/// Booleans are accepted on input and stored as `0` or `1`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Variable {
    Int(i64),
    Str(String),
}

impl Variable {
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Variable::Int(v) => Some(*v),
            Variable::Str(_) => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Variable::Str(s) => Some(s),
            Variable::Int(_) => None,
        }
    }
}

impl fmt::Display for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Variable::Int(v) => write!(f, "{}", v),
            Variable::Str(s) => write!(f, "{}", s),
        }
    }
}

impl From<i64> for Variable {
    fn from(v: i64) -> Self {
        Variable::Int(v)
    }
}

impl From<bool> for Variable {
    fn from(v: bool) -> Self {
        Variable::Int(i64::from(v))
    }
}

impl From<&str> for Variable {
    fn from(s: &str) -> Self {
        Variable::Str(s.to_string())
    }
}

impl From<String> for Variable {
    fn from(s: String) -> Self {
        Variable::Str(s)
    }
}

impl<'de> Deserialize<'de> for Variable {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct VariableVisitor;

        impl<'de> Visitor<'de> for VariableVisitor {
            type Value = Variable;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("an integer, boolean or string")
            }

            fn visit_bool<E: de::Error>(self, v: bool) -> Result<Self::Value, E> {
                Ok(Variable::from(v))
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
                Ok(Variable::Int(v))
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
                i64::try_from(v)
                    .map(Variable::Int)
                    .map_err(|_| E::invalid_value(de::Unexpected::Unsigned(v), &self))
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
                Ok(Variable::from(v))
            }

            fn visit_string<E: de::Error>(self, v: String) -> Result<Self::Value, E> {
                Ok(Variable::Str(v))
            }
        }

        deserializer.deserialize_any(VariableVisitor)
    }
}

/// Insertion-ordered key/value mapping of generator variables.
///
/// Re-inserting an existing key overwrites its value in place, so the
/// position of a key is decided by its first insertion.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VariableMapping {
    entries: Vec<(String, Variable)>,
}

impl VariableMapping {
    pub fn new() -> Self {
        VariableMapping {
            entries: Vec::new(),
        }
    }

    /// Insert or overwrite a variable.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Variable>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    /// Builder-style insert.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Variable>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&Variable> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// Integer value of `key`, if present and an integer.
    pub fn get_int(&self, key: &str) -> Option<i64> {
        self.get(key).and_then(Variable::as_int)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Layer `overrides` on top of this mapping; the override wins per key.
    pub fn merge(&mut self, overrides: &VariableMapping) {
        for (key, value) in &overrides.entries {
            self.insert(key.clone(), value.clone());
        }
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Variable)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for VariableMapping {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (k, v) in &self.entries {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for VariableMapping {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct MappingVisitor;

        impl<'de> Visitor<'de> for MappingVisitor {
            type Value = VariableMapping;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a table of integer or string variables")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut mapping = VariableMapping::new();
                while let Some((key, value)) = access.next_entry::<String, Variable>()? {
                    mapping.insert(key, value);
                }
                Ok(mapping)
            }
        }

        deserializer.deserialize_map(MappingVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_overwrites_in_place() {
        let mut vars = VariableMapping::new().with("a", 1).with("b", "x");
        vars.insert("a", 2);
        assert_eq!(vars.keys().collect::<Vec<_>>(), vec!["a", "b"]);
        assert_eq!(vars.get_int("a"), Some(2));
    }

    #[test]
    fn test_merge_overrides_and_appends() {
        let mut base = VariableMapping::new().with("clang", 1).with("use_asan", 0);
        let overrides = VariableMapping::new().with("use_asan", 1).with("extra", "on");
        base.merge(&overrides);

        assert_eq!(
            base.keys().collect::<Vec<_>>(),
            vec!["clang", "use_asan", "extra"]
        );
        assert_eq!(base.get_int("use_asan"), Some(1));
        assert_eq!(base.get("extra").and_then(Variable::as_str), Some("on"));
    }

    #[test]
    fn test_serialize_preserves_order() {
        let vars = VariableMapping::new().with("z", 1).with("a", "two");
        let json = serde_json::to_string(&vars).unwrap();
        assert_eq!(json, r#"{"z":1,"a":"two"}"#);
    }

    #[test]
    fn test_deserialize_from_toml() {
        let vars: VariableMapping = toml::from_str("use_asan = 1\nname = \"cobalt\"\n").unwrap();
        assert_eq!(vars.get_int("use_asan"), Some(1));
        assert_eq!(vars.get("name"), Some(&Variable::from("cobalt")));
    }

    #[test]
    fn test_deserialize_booleans_as_integers() {
        let vars: VariableMapping = toml::from_str("use_asan = true
enable_vr = false
").unwrap();
        assert_eq!(vars.get_int("use_asan"), Some(1));
        assert_eq!(vars.get_int("enable_vr"), Some(0));

        let json = serde_json::to_string(&vars).unwrap();
        assert_eq!(json, r#"{"use_asan":1,"enable_vr":0}"#);
    }

    #[test]
    fn test_deserialize_rejects_other_values() {
        assert!(toml::from_str::<VariableMapping>("ratio = 0.5
").is_err());
        assert!(toml::from_str::<VariableMapping>("list = [1, 2]
").is_err());
        assert!(serde_json::from_str::<VariableMapping>(r#"{"big":18446744073709551615}"#).is_err());
    }
}
