//! The persisted preset document.
//!
//! A document maps preset names to ordered lists of calendar identifiers,
//! plus two reserved keys carried on the wire: `__v` (schema version) and
//! `__last_saved` (rolling autosave history). The persistence service
//! stores documents verbatim as JSON; the typed view here is produced by
//! a lenient repair step on the client side and never fails to parse.

use std::collections::BTreeMap;

use serde::de::{Deserialize, Deserializer};
use serde::ser::{Serialize, Serializer};
use serde_json::{Map, Value, json};

/// Reserved wire key for the schema version.
pub const VERSION_KEY: &str = "__v";
/// Reserved wire key for the autosave history.
pub const LAST_SAVED_KEY: &str = "__last_saved";
/// Name prefix for autosave entries.
pub const AUTOSAVE_PREFIX: &str = "saved_";
/// How many autosave entries survive a store.
pub const AUTOSAVE_LIMIT: usize = 3;

/// Current schema version. Version 1 stores calendar identifiers;
/// documents without a version predate versioning and store calendar
/// names instead.
pub const SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq)]
pub struct GroupDocument {
    /// Schema version; `None` on legacy documents.
    pub version: Option<u32>,
    /// Autosave history, oldest first.
    pub last_saved: Vec<String>,
    /// Preset name → ordered calendar identifiers (calendar names on
    /// legacy documents).
    pub groups: BTreeMap<String, Vec<String>>,
}

impl Default for GroupDocument {
    fn default() -> Self {
        GroupDocument {
            version: Some(SCHEMA_VERSION),
            last_saved: Vec::new(),
            groups: BTreeMap::new(),
        }
    }
}

/// The empty shape installed when nothing has been stored yet:
/// `{ "__last_saved": [], "__v": 1 }`.
pub fn default_shape() -> Value {
    GroupDocument::default().to_value()
}

impl GroupDocument {
    /// Lenient parse: anything that is not an object becomes the empty
    /// document, a missing or malformed `__last_saved` becomes an empty
    /// history, and group entries that are not string sequences are
    /// dropped. A missing `__v` stays `None` so callers can tell legacy
    /// documents apart.
    pub fn from_value(value: &Value) -> GroupDocument {
        let Some(map) = value.as_object() else {
            return GroupDocument::default();
        };

        let version = map
            .get(VERSION_KEY)
            .and_then(Value::as_u64)
            .map(|v| v as u32);

        let last_saved = match map.get(LAST_SAVED_KEY).and_then(Value::as_array) {
            Some(entries) => entries
                .iter()
                .filter_map(Value::as_str)
                .map(String::from)
                .collect(),
            None => Vec::new(),
        };

        let groups = map
            .iter()
            .filter(|(key, _)| !is_reserved(key))
            .filter_map(|(key, value)| {
                value.as_array().map(|calendars| {
                    let calendars = calendars
                        .iter()
                        .filter_map(Value::as_str)
                        .map(String::from)
                        .collect();
                    (key.clone(), calendars)
                })
            })
            .collect();

        GroupDocument {
            version,
            last_saved,
            groups,
        }
    }

    /// Wire shape: group entries plus the reserved keys. `__v` is omitted
    /// for legacy documents so the version marker round-trips.
    pub fn to_value(&self) -> Value {
        let mut map = Map::new();
        for (name, calendars) in &self.groups {
            map.insert(name.clone(), json!(calendars));
        }
        map.insert(LAST_SAVED_KEY.to_string(), json!(self.last_saved));
        if let Some(version) = self.version {
            map.insert(VERSION_KEY.to_string(), json!(version));
        }
        Value::Object(map)
    }

    /// Preset names, reserved keys excluded.
    pub fn preset_names(&self) -> Vec<String> {
        self.groups.keys().cloned().collect()
    }

    /// Names of autosave entries, in lexicographic (= chronological for
    /// timestamped names) order.
    pub fn autosave_names(&self) -> Vec<String> {
        self.groups
            .keys()
            .filter(|name| name.starts_with(AUTOSAVE_PREFIX))
            .cloned()
            .collect()
    }
}

fn is_reserved(key: &str) -> bool {
    key == VERSION_KEY || key == LAST_SAVED_KEY
}

impl Serialize for GroupDocument {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_value().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for GroupDocument {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Value::deserialize(deserializer).map(|value| GroupDocument::from_value(&value))
    }
}
