use serde::Serialize;
use serde_wasm_bindgen::{from_value, Serializer};
use wasm_bindgen::prelude::*;

// Create a console module for logging
pub mod console;
// Errors that abort a decode
pub mod error;
// Field-by-field protobuf reader
pub mod pbf_reader;
// Source coordinates to world tile grid
pub mod projection;
// Property values
pub mod value;
// Geometry reconstruction
pub mod geometry;
// Feature assembly and the sink interface
pub mod feature;
// Document walker
pub mod geobuf;
// Import our models
pub mod models;
// GeoJSON rendering of decoded features
pub mod geojson_features;

#[cfg(test)]
mod fixtures;

pub use error::DecodeError;
pub use feature::{CollectingSink, FeatureSink, SerialFeature};
pub use geobuf::{decode_geobuf, parse_geobuf, DocumentContext};
pub use geometry::{DecodedGeometry, Draw, GeometryClass, GeometryType};
pub use models::GeobufInput;
pub use projection::{LonLat, Projection, ProjectionKind, WebMercator};
pub use value::Value;

// Enable better panic messages in console during development
#[cfg(feature = "console_error_panic_hook")]
pub use console_error_panic_hook::set_once as set_panic_hook;

// Use the macro from our console module
#[macro_export]
macro_rules! console_log {
    ($($t:tt)*) => ($crate::console::log(&format!($($t)*)))
}

#[macro_export]
macro_rules! console_warn {
    ($($t:tt)*) => ($crate::console::warn(&format!($($t)*)))
}

use std::sync::Once;
static INIT: Once = Once::new();

// This sets up the wasm_bindgen start functionality
#[wasm_bindgen(start)]
pub fn start() {
    INIT.call_once(|| {
        // Set the panic hook for better error messages
        #[cfg(feature = "console_error_panic_hook")]
        console_error_panic_hook::set_once();

        console_log!("Geobuf WASM module initialized successfully");
    });
}

// Missing options mean layer 0, no name, EPSG:4326
fn input_from_js(options: JsValue) -> Result<GeobufInput, JsValue> {
    if options.is_undefined() || options.is_null() {
        return Ok(GeobufInput::default());
    }
    from_value(options).map_err(|e| JsValue::from_str(&format!("Invalid geobuf options: {}", e)))
}

/// Decode a Geobuf buffer into an array of features
#[wasm_bindgen(js_name = parseGeobufData)]
pub fn parse_geobuf_data(data: &[u8], options: JsValue) -> Result<JsValue, JsValue> {
    let input = input_from_js(options)?;

    let features = decode_geobuf(data, &input)
        .map_err(|e| JsValue::from_str(&format!("Failed to decode geobuf: {}", e)))?;

    // Ids and grid coordinates are 64-bit; BigInt keeps them exact
    let serializer = Serializer::new().serialize_large_number_types_as_bigints(true);
    Ok(features.serialize(&serializer)?)
}

/// Decode a Geobuf buffer and render it as a GeoJSON FeatureCollection string
#[wasm_bindgen(js_name = geobufToGeoJson)]
pub fn geobuf_to_geojson(data: &[u8], options: JsValue) -> Result<String, JsValue> {
    let input = input_from_js(options)?;

    let features = decode_geobuf(data, &input)
        .map_err(|e| JsValue::from_str(&format!("Failed to decode geobuf: {}", e)))?;

    Ok(geojson_features::features_to_geojson(&features).to_string())
}
