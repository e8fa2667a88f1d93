use geo_types::{Coord, Geometry, LineString, Polygon};
use serde_json::{json, Value};

use crate::feature::SerialFeature;

// Coordinates stay in world tile units at the maximum zoom
fn coord(c: &Coord<f64>) -> Value {
    json!([c.x, c.y])
}

fn line(line: &LineString<f64>) -> Value {
    Value::Array(line.coords().map(coord).collect())
}

fn polygon(polygon: &Polygon<f64>) -> Value {
    let mut rings = vec![line(polygon.exterior())];
    rings.extend(polygon.interiors().iter().map(line));
    Value::Array(rings)
}

/// GeoJSON geometry object for a geo-types geometry.
pub fn geometry_to_geojson(geometry: &Geometry<f64>) -> Value {
    let (kind, coordinates) = match geometry {
        Geometry::Point(point) => ("Point", coord(&point.0)),
        Geometry::MultiPoint(points) => (
            "MultiPoint",
            Value::Array(points.iter().map(|p| coord(&p.0)).collect()),
        ),
        Geometry::LineString(l) => ("LineString", line(l)),
        Geometry::MultiLineString(lines) => ("MultiLineString", Value::Array(lines.iter().map(line).collect())),
        Geometry::Polygon(p) => ("Polygon", polygon(p)),
        Geometry::MultiPolygon(polygons) => (
            "MultiPolygon",
            Value::Array(polygons.iter().map(polygon).collect()),
        ),
        // The decoder never produces other geometry kinds
        _ => return Value::Null,
    };

    json!({ "type": kind, "coordinates": coordinates })
}

/// GeoJSON feature object for a decoded feature.
pub fn feature_to_geojson(feature: &SerialFeature) -> Value {
    let geometry = feature
        .geometry
        .to_geo()
        .map(|g| geometry_to_geojson(&g))
        .unwrap_or(Value::Null);

    let mut object = json!({
        "type": "Feature",
        "geometry": geometry,
        "properties": Value::Object(feature.properties_json()),
    });
    if let (Some(id), Some(map)) = (feature.id, object.as_object_mut()) {
        map.insert("id".to_string(), json!(id));
    }
    object
}

pub fn features_to_geojson(features: &[SerialFeature]) -> Value {
    json!({
        "type": "FeatureCollection",
        "features": features.iter().map(feature_to_geojson).collect::<Vec<_>>(),
    })
}
