use std::io::Read;

use flate2::read::GzDecoder;

use crate::error::{DecodeError, Result};
use crate::feature::{read_feature, CollectingSink, FeatureSink, SerialFeature};
use crate::geometry::{read_geometry, CoordinateSpace, DecodedGeometry};
use crate::models::GeobufInput;
use crate::pbf_reader::PbfReader;
use crate::projection::{Projection, ProjectionKind};
use crate::value::Value;
use crate::{console_log, console_warn};

/// Header state of one document. Dimension and precision apply to every
/// geometry decoded after they are read.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentContext {
    pub keys: Vec<String>,
    pub dimension: usize,
    /// 10^precision exponent; encoded integers are divided by this.
    pub precision: f64,
}

impl Default for DocumentContext {
    fn default() -> Self {
        Self {
            keys: Vec::new(),
            dimension: 2,
            precision: 1e6,
        }
    }
}

impl DocumentContext {
    pub fn space<'a>(&self, projection: &'a dyn Projection) -> CoordinateSpace<'a> {
        CoordinateSpace {
            dimension: self.dimension,
            scale: self.precision,
            projection,
        }
    }
}

/// Per-call decoding state: where features go and what has been warned about.
pub struct DecodeSession<'a> {
    layer: i32,
    layer_name: &'a str,
    projection: &'a dyn Projection,
    sink: &'a mut dyn FeatureSink,
    warned_string_id: bool,
}

impl<'a> DecodeSession<'a> {
    pub fn new(
        layer: i32,
        layer_name: &'a str,
        projection: &'a dyn Projection,
        sink: &'a mut dyn FeatureSink,
    ) -> Self {
        Self {
            layer,
            layer_name,
            projection,
            sink,
            warned_string_id: false,
        }
    }

    pub fn projection(&self) -> &'a dyn Projection {
        self.projection
    }

    /// Warn about a non-numeric feature id, once per session.
    pub fn warn_string_id(&mut self) {
        if !self.warned_string_id {
            console_warn!("Non-numeric feature IDs not supported");
            self.warned_string_id = true;
        }
    }

    pub fn emit(&mut self, id: Option<i64>, geometry: DecodedGeometry, properties: Vec<(String, Value)>) {
        let feature = SerialFeature {
            layer: self.layer,
            layer_name: self.layer_name.to_string(),
            segment: 0,
            seq: self.sink.layer_seq(),
            id,
            geometry,
            properties,
        };
        self.sink.serialize_feature(feature);
    }
}

fn read_feature_collection(pbf: &mut PbfReader, doc: &DocumentContext, session: &mut DecodeSession) -> Result<()> {
    while pbf.next_field()? {
        match pbf.tag() {
            1 => {
                let mut feature_reader = pbf.get_message()?;
                read_feature(&mut feature_reader, doc, session)?;
            }
            _ => pbf.skip()?,
        }
    }
    Ok(())
}

/// Decode one Geobuf document, forwarding every feature to `sink`.
///
/// Top-level fields are handled in arrival order. A bare geometry payload
/// is decoded for validation only; without a feature there is nothing to
/// forward.
pub fn parse_geobuf(
    data: &[u8],
    layer: i32,
    layer_name: &str,
    projection: &dyn Projection,
    sink: &mut dyn FeatureSink,
) -> Result<()> {
    let mut session = DecodeSession::new(layer, layer_name, projection, sink);
    let mut doc = DocumentContext::default();
    let mut pbf = PbfReader::new(data);

    while pbf.next_field()? {
        match pbf.tag() {
            1 => doc.keys.push(pbf.get_string()?),
            2 => {
                let dimension = pbf.get_int64()?;
                if dimension < 2 {
                    return Err(DecodeError::DimensionTooSmall(dimension));
                }
                doc.dimension =
                    usize::try_from(dimension).map_err(|_| DecodeError::DimensionTooLarge(dimension))?;
            }
            3 => {
                let exponent = pbf.get_int64()?;
                doc.precision = 10f64.powf(exponent as f64);
            }
            4 => {
                let mut collection_reader = pbf.get_message()?;
                read_feature_collection(&mut collection_reader, &doc, &mut session)?;
            }
            5 => {
                let mut feature_reader = pbf.get_message()?;
                read_feature(&mut feature_reader, &doc, &mut session)?;
            }
            6 => {
                let mut geometry_reader = pbf.get_message()?;
                read_geometry(&mut geometry_reader, &doc.space(projection))?;
            }
            _ => pbf.skip()?,
        }
    }

    Ok(())
}

// Function to detect if data is gzipped (checking for gzip magic number)
fn is_gzipped(data: &[u8]) -> bool {
    data.len() >= 2 && data[0] == 0x1F && data[1] == 0x8B
}

/// Inflate gzipped input; anything else is returned as is.
pub fn decompress_gzip(data: &[u8]) -> Result<Vec<u8>> {
    if !is_gzipped(data) {
        return Ok(data.to_vec());
    }

    let mut decoder = GzDecoder::new(data);
    let mut decompressed_data = Vec::new();
    decoder.read_to_end(&mut decompressed_data)?;

    Ok(decompressed_data)
}

/// Decode a (possibly gzipped) document into memory.
///
/// Either every feature is returned or none: on error the partially
/// collected features are dropped.
pub fn decode_geobuf(data: &[u8], input: &GeobufInput) -> Result<Vec<SerialFeature>> {
    let projection = match input.projection.as_deref() {
        Some(name) => ProjectionKind::from_name(name)?,
        None => ProjectionKind::default(),
    };

    let data = decompress_gzip(data)?;
    let mut sink = CollectingSink::new();
    parse_geobuf(&data, input.layer, &input.layer_name, &projection, &mut sink)?;

    console_log!(
        "Decoded {} features into layer {} ({})",
        sink.features.len(),
        input.layer,
        input.layer_name
    );
    Ok(sink.into_features())
}
