use geo_types::{Coord, LineString, MultiLineString, MultiPoint, MultiPolygon, Point, Polygon};
use serde::Serialize;

use crate::error::{DecodeError, Result};
use crate::pbf_reader::PbfReader;
use crate::projection::{Projection, MAX_ZOOM};

/// Deepest geometry-collection nesting accepted.
pub const MAX_GEOMETRY_DEPTH: usize = 100;

/// One drawing command in world tile coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Draw {
    MoveTo(i64, i64),
    LineTo(i64, i64),
    /// Marks that the next ring, if any, starts a new outer boundary.
    ClosePath,
}

// Wire-level geometry types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeometryType {
    Point = 0,
    MultiPoint = 1,
    LineString = 2,
    MultiLineString = 3,
    Polygon = 4,
    MultiPolygon = 5,
    GeometryCollection = 6,
}

impl TryFrom<i32> for GeometryType {
    type Error = DecodeError;

    fn try_from(code: i32) -> Result<Self> {
        match code {
            0 => Ok(GeometryType::Point),
            1 => Ok(GeometryType::MultiPoint),
            2 => Ok(GeometryType::LineString),
            3 => Ok(GeometryType::MultiLineString),
            4 => Ok(GeometryType::Polygon),
            5 => Ok(GeometryType::MultiPolygon),
            6 => Ok(GeometryType::GeometryCollection),
            other => Err(DecodeError::UnknownGeometryType(other)),
        }
    }
}

impl GeometryType {
    /// Collapse to the downstream three-class model. Single/multi is lost here.
    pub fn class(self) -> Option<GeometryClass> {
        match self {
            GeometryType::Point | GeometryType::MultiPoint => Some(GeometryClass::Point),
            GeometryType::LineString | GeometryType::MultiLineString => Some(GeometryClass::Line),
            GeometryType::Polygon | GeometryType::MultiPolygon => Some(GeometryClass::Polygon),
            GeometryType::GeometryCollection => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum GeometryClass {
    Point = 1,
    Line = 2,
    Polygon = 3,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DecodedGeometry {
    pub class: Option<GeometryClass>,
    pub commands: Vec<Draw>,
}

/// Everything needed to turn encoded integers into tile coordinates.
#[derive(Clone, Copy)]
pub struct CoordinateSpace<'a> {
    pub dimension: usize,
    pub scale: f64,
    pub projection: &'a dyn Projection,
}

/// Reconstruct one run of coordinates from `coords[start..end]`.
///
/// Deltas accumulate from zero for every run. Only the first two
/// dimensions are projected; the rest just keep the stream aligned.
pub fn read_line_part(
    coords: &[i64],
    space: &CoordinateSpace,
    start: usize,
    end: usize,
    closed: bool,
) -> Result<Vec<Draw>> {
    let dim = space.dimension;
    let mut commands = Vec::new();
    let mut prev: Vec<i64> = Vec::new();

    let mut i = start;
    while let Some(next) = i.checked_add(dim).filter(|next| *next <= end) {
        if next > coords.len() {
            return Err(DecodeError::LineSegmentOutOfRange {
                index: next - 1,
                len: coords.len(),
            });
        }
        if prev.is_empty() {
            prev.resize(dim, 0);
        }

        for (sum, delta) in prev.iter_mut().zip(&coords[i..next]) {
            *sum = sum.wrapping_add(*delta);
        }

        let (x, y) = space.projection.project(
            prev[0] as f64 / space.scale,
            prev[1] as f64 / space.scale,
            MAX_ZOOM,
        );

        if i == start {
            commands.push(Draw::MoveTo(x, y));
        } else {
            commands.push(Draw::LineTo(x, y));
        }
        i = next;
    }

    if closed {
        if let Some(Draw::MoveTo(x, y)) = commands.first().copied() {
            commands.push(Draw::LineTo(x, y));
        }
    }

    Ok(commands)
}

// End of a run of `count` tuples starting at scalar offset `here`
fn run_end(here: usize, count: u32, dim: usize, len: usize) -> Result<usize> {
    (count as usize)
        .checked_mul(dim)
        .and_then(|extent| here.checked_add(extent))
        .ok_or(DecodeError::LineSegmentOutOfRange { index: usize::MAX, len })
}

fn read_point(coords: &[i64], space: &CoordinateSpace) -> Result<Vec<Draw>> {
    if coords.len() < 2 {
        return Err(DecodeError::LineSegmentOutOfRange {
            index: 1,
            len: coords.len(),
        });
    }
    let (x, y) = space.projection.project(
        coords[0] as f64 / space.scale,
        coords[1] as f64 / space.scale,
        MAX_ZOOM,
    );
    Ok(vec![Draw::MoveTo(x, y)])
}

fn read_line(coords: &[i64], space: &CoordinateSpace, closed: bool) -> Result<Vec<Draw>> {
    read_line_part(coords, space, 0, coords.len(), closed)
}

fn read_multi_line(coords: &[i64], lengths: &[u32], space: &CoordinateSpace, closed: bool) -> Result<Vec<Draw>> {
    if lengths.is_empty() {
        return read_line(coords, space, closed);
    }

    let mut commands = Vec::new();
    let mut here = 0;
    for &count in lengths {
        let end = run_end(here, count, space.dimension, coords.len())?;
        commands.extend(read_line_part(coords, space, here, end, closed)?);
        here = end;
    }

    Ok(commands)
}

fn read_multi_polygon(coords: &[i64], lengths: &[u32], space: &CoordinateSpace) -> Result<Vec<Draw>> {
    if lengths.is_empty() {
        return read_line(coords, space, true);
    }

    let length_at = |n: usize| {
        lengths.get(n).copied().ok_or(DecodeError::LengthsOutOfRange {
            index: n,
            len: lengths.len(),
        })
    };

    let polygons = lengths[0];
    let mut n = 1;
    let mut here = 0;
    let mut commands = Vec::new();

    for _ in 0..polygons {
        let rings = length_at(n)?;
        n += 1;

        for _ in 0..rings {
            let end = run_end(here, length_at(n)?, space.dimension, coords.len())?;
            n += 1;
            commands.extend(read_line_part(coords, space, here, end, true)?);
            here = end;
        }

        commands.push(Draw::ClosePath);
    }

    Ok(commands)
}

/// Turn the flat coordinate stream into drawing commands for `geometry_type`.
pub fn assemble(
    geometry_type: GeometryType,
    lengths: &[u32],
    coords: &[i64],
    space: &CoordinateSpace,
) -> Result<Vec<Draw>> {
    match geometry_type {
        GeometryType::Point => read_point(coords, space),
        // Multipoints are closed like a ring; downstream relies on the extra point
        GeometryType::MultiPoint => read_line(coords, space, true),
        GeometryType::LineString => read_line(coords, space, false),
        GeometryType::MultiLineString => read_multi_line(coords, lengths, space, false),
        GeometryType::Polygon => read_multi_line(coords, lengths, space, true),
        GeometryType::MultiPolygon => read_multi_polygon(coords, lengths, space),
        GeometryType::GeometryCollection => Ok(Vec::new()),
    }
}

/// Decode one geometry message.
///
/// Members of a geometry collection are decoded so malformed input still
/// fails, but their commands are not merged into the parent.
pub fn read_geometry(pbf: &mut PbfReader, space: &CoordinateSpace) -> Result<DecodedGeometry> {
    read_geometry_at(pbf, space, 0)
}

fn read_geometry_at(pbf: &mut PbfReader, space: &CoordinateSpace, depth: usize) -> Result<DecodedGeometry> {
    if depth > MAX_GEOMETRY_DEPTH {
        return Err(DecodeError::NestingTooDeep(MAX_GEOMETRY_DEPTH));
    }

    let mut type_code = 0;
    let mut lengths = Vec::new();
    let mut coords = Vec::new();

    while pbf.next_field()? {
        match pbf.tag() {
            1 => type_code = pbf.get_enum()?,
            2 => pbf.get_packed_uint32(&mut lengths)?,
            3 => pbf.get_packed_sint64(&mut coords)?,
            4 => {
                let mut member = pbf.get_message()?;
                read_geometry_at(&mut member, space, depth + 1)?;
            }
            _ => pbf.skip()?,
        }
    }

    let geometry_type = GeometryType::try_from(type_code)?;
    let commands = assemble(geometry_type, &lengths, &coords, space)?;

    Ok(DecodedGeometry {
        class: geometry_type.class(),
        commands,
    })
}

impl DecodedGeometry {
    /// The drawing sequence as a geo-types geometry in tile space.
    ///
    /// Polygons split at each `ClosePath`; the first ring of a polygon is
    /// its exterior.
    pub fn to_geo(&self) -> Option<geo_types::Geometry<f64>> {
        let runs = self.runs();
        if runs.iter().all(|group| group.is_empty()) {
            return None;
        }

        match self.class? {
            GeometryClass::Point => {
                let mut points: Vec<Point<f64>> = runs
                    .into_iter()
                    .flatten()
                    .flatten()
                    .map(Point::from)
                    .collect();
                if points.len() == 1 {
                    points.pop().map(geo_types::Geometry::Point)
                } else {
                    Some(geo_types::Geometry::MultiPoint(MultiPoint::new(points)))
                }
            }
            GeometryClass::Line => {
                let mut lines: Vec<LineString<f64>> =
                    runs.into_iter().flatten().map(LineString::new).collect();
                if lines.len() == 1 {
                    lines.pop().map(geo_types::Geometry::LineString)
                } else {
                    Some(geo_types::Geometry::MultiLineString(MultiLineString::new(lines)))
                }
            }
            GeometryClass::Polygon => {
                let polygons = runs
                    .into_iter()
                    .filter(|rings| !rings.is_empty())
                    .map(|rings| {
                        let mut rings = rings.into_iter().map(LineString::new);
                        let exterior = rings.next().unwrap_or_else(|| LineString::new(Vec::new()));
                        Polygon::new(exterior, rings.collect())
                    })
                    .collect();
                Some(geo_types::Geometry::MultiPolygon(MultiPolygon::new(polygons)))
            }
        }
    }

    // Groups (split at ClosePath) of runs (split at MoveTo) of coordinates
    fn runs(&self) -> Vec<Vec<Vec<Coord<f64>>>> {
        let mut groups = vec![Vec::new()];
        for command in &self.commands {
            match *command {
                Draw::MoveTo(x, y) => {
                    if let Some(group) = groups.last_mut() {
                        group.push(vec![Coord { x: x as f64, y: y as f64 }]);
                    }
                }
                Draw::LineTo(x, y) => {
                    if let Some(run) = groups.last_mut().and_then(|group| group.last_mut()) {
                        run.push(Coord { x: x as f64, y: y as f64 });
                    }
                }
                Draw::ClosePath => groups.push(Vec::new()),
            }
        }
        groups
    }
}
