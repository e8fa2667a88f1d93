// This is the models module containing shared data structures
use serde::{Deserialize, Serialize};

/// Options for decoding one Geobuf buffer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GeobufInput {
    /// Layer index stamped on every feature
    pub layer: i32,
    pub layer_name: String,
    // EPSG code or OGC URN of the source coordinates, EPSG:4326 when absent
    pub projection: Option<String>,
}

impl GeobufInput {
    pub fn new(layer: i32, layer_name: impl Into<String>) -> Self {
        Self {
            layer,
            layer_name: layer_name.into(),
            projection: None,
        }
    }
}
