// Geobuf schema as prost messages, used to build test documents.
//
// See <https://github.com/mapbox/geobuf/blob/master/geobuf.proto>.

use std::cell::RefCell;

use prost::{Message, Oneof};

use crate::projection::Projection;

#[derive(Clone, PartialEq, Message)]
pub struct Data {
    #[prost(string, repeated, tag = "1")]
    pub keys: Vec<String>,
    #[prost(uint32, optional, tag = "2")]
    pub dimensions: Option<u32>,
    #[prost(uint32, optional, tag = "3")]
    pub precision: Option<u32>,
    #[prost(oneof = "DataType", tags = "4, 5, 6")]
    pub data_type: Option<DataType>,
}

#[derive(Clone, PartialEq, Oneof)]
pub enum DataType {
    #[prost(message, tag = "4")]
    FeatureCollection(FeatureCollection),
    #[prost(message, tag = "5")]
    Feature(Feature),
    #[prost(message, tag = "6")]
    Geometry(Geometry),
}

#[derive(Clone, PartialEq, Message)]
pub struct FeatureCollection {
    #[prost(message, repeated, tag = "1")]
    pub features: Vec<Feature>,
}

#[derive(Clone, PartialEq, Message)]
pub struct Feature {
    #[prost(message, optional, tag = "1")]
    pub geometry: Option<Geometry>,
    #[prost(oneof = "IdType", tags = "11, 12")]
    pub id_type: Option<IdType>,
    #[prost(message, repeated, tag = "13")]
    pub values: Vec<Value>,
    #[prost(uint32, repeated, tag = "14")]
    pub properties: Vec<u32>,
    #[prost(uint32, repeated, tag = "15")]
    pub custom_properties: Vec<u32>,
}

#[derive(Clone, PartialEq, Oneof)]
pub enum IdType {
    #[prost(string, tag = "11")]
    Id(String),
    #[prost(sint64, tag = "12")]
    IntId(i64),
}

#[derive(Clone, PartialEq, Message)]
pub struct Geometry {
    #[prost(int32, optional, tag = "1")]
    pub r#type: Option<i32>,
    #[prost(uint32, repeated, tag = "2")]
    pub lengths: Vec<u32>,
    #[prost(sint64, repeated, tag = "3")]
    pub coords: Vec<i64>,
    #[prost(message, repeated, tag = "4")]
    pub geometries: Vec<Geometry>,
}

#[derive(Clone, PartialEq, Message)]
pub struct Value {
    #[prost(oneof = "ValueType", tags = "1, 2, 3, 4, 5, 6")]
    pub value_type: Option<ValueType>,
}

#[derive(Clone, PartialEq, Oneof)]
pub enum ValueType {
    #[prost(string, tag = "1")]
    StringValue(String),
    #[prost(double, tag = "2")]
    DoubleValue(f64),
    #[prost(uint64, tag = "3")]
    PosIntValue(u64),
    #[prost(uint64, tag = "4")]
    NegIntValue(u64),
    #[prost(bool, tag = "5")]
    BoolValue(bool),
    #[prost(string, tag = "6")]
    JsonValue(String),
}

pub fn geometry(r#type: i32, lengths: Vec<u32>, coords: Vec<i64>) -> Geometry {
    Geometry {
        r#type: Some(r#type),
        lengths,
        coords,
        geometries: Vec::new(),
    }
}

pub fn value(value_type: ValueType) -> Value {
    Value {
        value_type: Some(value_type),
    }
}

pub fn feature(geometry: Geometry) -> Feature {
    Feature {
        geometry: Some(geometry),
        id_type: None,
        values: Vec::new(),
        properties: Vec::new(),
        custom_properties: Vec::new(),
    }
}

pub fn document(keys: &[&str], data_type: DataType) -> Data {
    Data {
        keys: keys.iter().map(|k| k.to_string()).collect(),
        dimensions: None,
        precision: None,
        data_type: Some(data_type),
    }
}

pub fn encode<M: Message>(message: &M) -> Vec<u8> {
    message.encode_to_vec()
}

/// Passes coordinates through truncated and records what it was asked to project.
#[derive(Default)]
pub struct Identity {
    pub seen: RefCell<Vec<(f64, f64)>>,
}

impl Projection for Identity {
    fn project(&self, x: f64, y: f64, _zoom: u32) -> (i64, i64) {
        self.seen.borrow_mut().push((x, y));
        (x as i64, y as i64)
    }
}
