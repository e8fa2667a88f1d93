use serde::Serialize;

use crate::error::{DecodeError, Result};
use crate::geobuf::{DecodeSession, DocumentContext};
use crate::geometry::{read_geometry, DecodedGeometry};
use crate::pbf_reader::PbfReader;
use crate::value::{read_value, Value};

/// A fully assembled feature, ready for the tiling pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SerialFeature {
    pub layer: i32,
    pub layer_name: String,
    // Always 0: decoding runs on a single thread
    pub segment: u32,
    pub seq: u64,
    pub id: Option<i64>,
    pub geometry: DecodedGeometry,
    pub properties: Vec<(String, Value)>,
}

impl SerialFeature {
    /// Properties as a JSON object. Later duplicates of a key win.
    pub fn properties_json(&self) -> serde_json::Map<String, serde_json::Value> {
        self.properties
            .iter()
            .map(|(key, value)| (key.clone(), value.to_json()))
            .collect()
    }
}

/// Receives decoded features. The sink owns the per-layer sequence counter
/// and advances it for every feature it accepts.
pub trait FeatureSink {
    fn layer_seq(&self) -> u64;
    fn serialize_feature(&mut self, feature: SerialFeature);
}

/// Sink that keeps every feature in memory.
#[derive(Debug, Default)]
pub struct CollectingSink {
    pub features: Vec<SerialFeature>,
    seq: u64,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn into_features(self) -> Vec<SerialFeature> {
        self.features
    }
}

impl FeatureSink for CollectingSink {
    fn layer_seq(&self) -> u64 {
        self.seq
    }

    fn serialize_feature(&mut self, feature: SerialFeature) {
        self.features.push(feature);
        self.seq += 1;
    }
}

/// Resolve `(key, value)` index pairs against the key dictionary and the
/// feature's own value table. A trailing unpaired index is ignored.
pub fn resolve_properties(pairs: &[u32], keys: &[String], values: &[Value]) -> Result<Vec<(String, Value)>> {
    pairs
        .chunks_exact(2)
        .map(|chunk| {
            let (key_index, value_index) = (chunk[0] as usize, chunk[1] as usize);
            let key = keys.get(key_index).ok_or(DecodeError::KeyOutOfBounds {
                index: key_index,
                len: keys.len(),
            })?;
            let value = values.get(value_index).ok_or(DecodeError::ValueOutOfBounds {
                index: value_index,
                len: values.len(),
            })?;
            Ok((key.clone(), value.clone()))
        })
        .collect()
}

/// Decode one feature message and hand it to the session's sink.
pub fn read_feature(pbf: &mut PbfReader, doc: &DocumentContext, session: &mut DecodeSession) -> Result<()> {
    let mut geometry = DecodedGeometry::default();
    let mut id = None;
    let mut values = Vec::new();
    let mut properties = Vec::new();

    while pbf.next_field()? {
        match pbf.tag() {
            1 => {
                let mut geometry_reader = pbf.get_message()?;
                geometry = read_geometry(&mut geometry_reader, &doc.space(session.projection()))?;
            }
            11 => {
                session.warn_string_id();
                pbf.skip()?;
            }
            // zig-zag, as declared by geobuf.proto, not plain int64
            12 => id = Some(pbf.get_sint64()?),
            13 => {
                let mut value_reader = pbf.get_message()?;
                values.push(read_value(&mut value_reader)?);
            }
            14 => pbf.get_packed_uint32(&mut properties)?,
            _ => pbf.skip()?,
        }
    }

    let properties = resolve_properties(&properties, &doc.keys, &values)?;
    session.emit(id, geometry, properties);
    Ok(())
}
