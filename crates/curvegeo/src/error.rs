//! Error types for geometry construction, flattening and overlay.
//!
//! Every constructor validates its input completely before returning, so an
//! error always names the invariant that was violated and no partially built
//! geometry is ever handed out.

use crate::geometry::GeometryKind;
use crate::overlay::OverlayOp;
use thiserror::Error;

/// A structural invariant violated while constructing a geometry.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// Arc strings need zero points, or an odd number of at least three.
    #[error("arc string needs 0 or an odd number (>= 3) of control points, got {count}")]
    InvalidControlPointCount { count: usize },

    #[error("compound curve segment {index} is empty")]
    EmptySegment { index: usize },

    /// Only straight line strings and arc strings may be chained.
    #[error("compound curve segment {index} must be a line string or arc string, got {kind}")]
    InvalidSegmentType { index: usize, kind: GeometryKind },

    /// The end of segment `index` does not meet the start of segment `index + 1`.
    #[error("compound curve segments {index} and {} are not contiguous (gap {gap:e})", .index + 1)]
    Discontinuous { index: usize, gap: f64 },

    #[error("curve is not closed")]
    NotClosed,

    #[error("exterior {kind} is not a closed ring")]
    ExteriorNotRing { kind: GeometryKind },

    #[error("interior {index} ({kind}) is not a closed ring")]
    InteriorNotRing { index: usize, kind: GeometryKind },

    #[error("interior ring {index} is not contained by the exterior envelope")]
    InteriorNotContained { index: usize },

    #[error("interior ring {index} is non-empty but the exterior ring is empty")]
    EmptyExteriorWithInteriors { index: usize },

    #[error("circle radius must be positive and finite, got {radius}")]
    InvalidRadius { radius: f64 },
}

/// Errors produced by the builder, the collector and the flattener.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GeometryError {
    #[error("invalid geometry: {0}")]
    Validation(#[from] ValidationError),

    /// The collector found no multi-geometry container for a homogeneous
    /// sequence. This means the capability table is incomplete, not that the
    /// caller passed bad input.
    #[error("no multi-geometry container for homogeneous {0} elements")]
    UnsupportedType(GeometryKind),

    /// A numeric parameter was negative, zero where forbidden, or not finite.
    #[error("{parameter} is out of range: {value}")]
    Range { parameter: &'static str, value: f64 },
}

/// Result type alias for geometry operations.
pub type GeometryResult<T> = Result<T, GeometryError>;

/// Errors produced by overlay engines and the curved overlay adapter.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum OverlayError {
    /// Flattening an operand or shaping the result failed.
    #[error(transparent)]
    Geometry(#[from] GeometryError),

    /// The engine only handles areal, linear geometries.
    #[error("{operation} does not support {kind} operands")]
    UnsupportedOperand {
        operation: OverlayOp,
        kind: GeometryKind,
    },

    #[error("unknown overlay operation code {0}")]
    UnknownOperation(i32),
}
