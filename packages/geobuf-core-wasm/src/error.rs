// Errors that abort decoding of a Geobuf document.
//
// Every variant is unrecoverable for the document in progress: no partial
// feature is forwarded once one of these is returned.

/// Reasons a Geobuf document cannot be decoded.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    /// The header declared fewer than two coordinate dimensions.
    #[error("geometry has fewer than 2 dimensions: {0}")]
    DimensionTooSmall(i64),

    /// The header declared more dimensions than a `usize` can index.
    #[error("geometry dimension {0} does not fit this platform")]
    DimensionTooLarge(i64),

    /// A coordinate tuple reaches past the end of the coordinate buffer.
    #[error("line segment {index} out of range of {len} coordinates")]
    LineSegmentOutOfRange {
        /// Last scalar index the tuple needs.
        index: usize,
        /// Scalars available.
        len: usize,
    },

    /// The lengths array ended before the multipolygon structure did.
    #[error("lengths index {index} out of range of {len} lengths")]
    LengthsOutOfRange {
        /// Lengths slot that was requested.
        index: usize,
        /// Lengths available.
        len: usize,
    },

    /// A property pair names a key outside the document key table.
    #[error("out of bounds key: {index} in {len}")]
    KeyOutOfBounds {
        /// Offending key index.
        index: usize,
        /// Size of the key table.
        len: usize,
    },

    /// A property pair names a value outside the feature value table.
    #[error("out of bounds value: {index} in {len}")]
    ValueOutOfBounds {
        /// Offending value index.
        index: usize,
        /// Size of the value table.
        len: usize,
    },

    /// Geometry collections recurse past the nesting limit.
    #[error("geometry collections nested deeper than {0} levels")]
    NestingTooDeep(usize),

    /// The geometry type code is outside 0..=6.
    #[error("unknown geometry type: {0}")]
    UnknownGeometryType(i32),

    /// No projection is registered under the requested name.
    #[error("unknown projection: {0}")]
    UnknownProjection(String),

    /// A nested message claims more bytes than its parent holds.
    #[error("truncated message: need {needed} bytes, got {available}")]
    Truncated { needed: usize, available: usize },

    /// The protobuf framing itself is broken.
    #[error("malformed protobuf: {0}")]
    Wire(#[from] prost::DecodeError),

    /// Gzip input could not be inflated.
    #[error("failed to decompress gzipped geobuf: {0}")]
    Decompress(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, DecodeError>;
