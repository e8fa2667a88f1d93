use std::f64::consts::PI;

use crate::error::{DecodeError, Result};

/// Internal precision level every geometry is projected at.
pub const MAX_ZOOM: u32 = 32;

const EARTH_RADIUS: f64 = 6378137.0;

/// Maps source coordinates onto the integer world tile grid.
pub trait Projection {
    fn project(&self, x: f64, y: f64, zoom: u32) -> (i64, i64);
}

/// Longitude/latitude in degrees (EPSG:4326).
#[derive(Debug, Clone, Copy, Default)]
pub struct LonLat;

impl Projection for LonLat {
    fn project(&self, lon: f64, lat: f64, zoom: u32) -> (i64, i64) {
        // Limit latitude so tan/sec stay finite near the poles
        let lat = lat.clamp(-89.9, 89.9);
        let lon = lon.clamp(-360.0, 360.0);

        let lat_rad = lat.to_radians();
        let n = (1u64 << zoom) as f64;

        let x = n * ((lon + 180.0) / 360.0);
        let y = n * (1.0 - ((lat_rad.tan() + 1.0 / lat_rad.cos()).ln() / PI)) / 2.0;
        (x as i64, y as i64)
    }
}

/// Spherical mercator metres (EPSG:3857).
#[derive(Debug, Clone, Copy, Default)]
pub struct WebMercator;

impl Projection for WebMercator {
    fn project(&self, ix: f64, iy: f64, zoom: u32) -> (i64, i64) {
        let half = (1i64 << 31) as f64;
        let mut x = (ix * half / EARTH_RADIUS / PI + half) as i64;
        let mut y = (((1i64 << 32) - 1) as f64 - (iy * half / EARTH_RADIUS / PI + half)) as i64;

        if zoom != 0 && zoom < MAX_ZOOM {
            x >>= MAX_ZOOM - zoom;
            y >>= MAX_ZOOM - zoom;
        }
        (x, y)
    }
}

/// Source reference systems the decoder understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProjectionKind {
    #[default]
    LonLat,
    WebMercator,
}

impl ProjectionKind {
    /// Look a projection up by its EPSG code or OGC URN alias.
    pub fn from_name(name: &str) -> Result<Self> {
        match name {
            "EPSG:4326" | "urn:ogc:def:crs:OGC:1.3:CRS84" => Ok(ProjectionKind::LonLat),
            "EPSG:3857" | "urn:ogc:def:crs:EPSG::3857" => Ok(ProjectionKind::WebMercator),
            other => Err(DecodeError::UnknownProjection(other.to_string())),
        }
    }
}

impl Projection for ProjectionKind {
    fn project(&self, x: f64, y: f64, zoom: u32) -> (i64, i64) {
        match self {
            ProjectionKind::LonLat => LonLat.project(x, y, zoom),
            ProjectionKind::WebMercator => WebMercator.project(x, y, zoom),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lonlat_origin_lands_mid_world() {
        let (x, y) = LonLat.project(0.0, 0.0, MAX_ZOOM);
        assert_eq!(x, 1i64 << 31);
        assert_eq!(y, 1i64 << 31);
    }

    #[test]
    fn lonlat_matches_tile_indices_at_low_zoom() {
        // Berlin sits in tile 8/137/83 (z/x/y)
        let (x, y) = LonLat.project(13.4, 52.52, 8);
        assert_eq!((x, y), (137, 83));
    }

    #[test]
    fn lonlat_clamps_the_poles() {
        let (_, north) = LonLat.project(0.0, 95.0, MAX_ZOOM);
        let (_, clamped) = LonLat.project(0.0, 89.9, MAX_ZOOM);
        assert_eq!(north, clamped);
    }

    #[test]
    fn web_mercator_origin_lands_mid_world() {
        let (x, y) = WebMercator.project(0.0, 0.0, MAX_ZOOM);
        assert_eq!(x, 1i64 << 31);
        assert_eq!(y, (1i64 << 31) - 1);
    }

    #[test]
    fn web_mercator_truncates_after_flipping_y() {
        // 1m north of the origin is 107.17 grid units above the equator
        let (_, y) = WebMercator.project(0.0, 1.0, MAX_ZOOM);
        assert_eq!(y, 2147483539);
    }

    #[test]
    fn web_mercator_shifts_down_to_lower_zooms() {
        let (x, _) = WebMercator.project(0.0, 0.0, 1);
        assert_eq!(x, 1);
    }

    #[test]
    fn projection_names_resolve() {
        assert_eq!(ProjectionKind::from_name("EPSG:4326").unwrap(), ProjectionKind::LonLat);
        assert_eq!(
            ProjectionKind::from_name("urn:ogc:def:crs:EPSG::3857").unwrap(),
            ProjectionKind::WebMercator
        );
        assert!(matches!(
            ProjectionKind::from_name("EPSG:27700"),
            Err(DecodeError::UnknownProjection(name)) if name == "EPSG:27700"
        ));
    }
}
