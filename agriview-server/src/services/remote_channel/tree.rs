use agriview_api::models::FarmData;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

const DEVICES: &str = "devices";
const SENSOR_DATA: &str = "sensorData";
const SYSTEM: &str = "system";

/// Mirror of the remote key tree of a single farm.
#[derive(Debug, Clone, Default)]
pub struct FarmTree {
    root: Map<String, Value>,
}

impl FarmTree {
    pub fn new() -> Self {
        Self { root: Map::new() }
    }

    /// Stores `value` at `path`, `null` removes the key.
    pub fn set(&mut self, path: &[&str], value: Value) {
        if path.is_empty() {
            match value {
                Value::Object(root) => self.root = root,
                other => tracing::warn!("ignoring non-object farm root: {}", other),
            }
            return;
        }

        Self::insert(&mut self.root, path, value);
    }

    fn insert(object: &mut Map<String, Value>, path: &[&str], value: Value) {
        match path {
            [] => {}
            [last] if value.is_null() => {
                object.remove(*last);
            }
            [last] => {
                object.insert(last.to_string(), value);
            }
            [first, rest @ ..] => {
                let child = object
                    .entry(first.to_string())
                    .or_insert_with(|| Value::Object(Map::new()));

                // a leaf gets replaced by the branch written below it
                if !child.is_object() {
                    *child = Value::Object(Map::new());
                }
                if let Value::Object(child) = child {
                    Self::insert(child, rest, value);
                }
            }
        }
    }

    pub fn get(&self, path: &[&str]) -> Option<&Value> {
        let (first, rest) = path.split_first()?;
        rest.iter().try_fold(self.root.get(*first)?, |node, segment| node.get(*segment))
    }

    pub fn decode(&self) -> FarmData {
        FarmData {
            devices: self.section(DEVICES),
            sensor_data: self.section(SENSOR_DATA),
            system: self.section(SYSTEM),
        }
    }

    fn section<T: DeserializeOwned>(&self, name: &str) -> Option<T> {
        let value = self.root.get(name)?;

        match serde_json::from_value(value.clone()) {
            Ok(section) => Some(section),
            Err(e) => {
                tracing::warn!("undecodable {} section: {}", name, e);
                None
            }
        }
    }
}
