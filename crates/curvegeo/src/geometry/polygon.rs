use super::arc::{ArcString, Tessellation};
use super::compound::CompoundCurve;
use super::{coord_distance, rect_contains, Geometry, GeometryKind, CONTINUITY_TOLERANCE};
use crate::error::{GeometryResult, ValidationError};
use geo::{BoundingRect, LineString, Polygon, Rect};

/// A boundary of a curve polygon.
#[derive(Debug, Clone, PartialEq)]
pub enum Ring {
    Linear(LineString),
    Circular(ArcString),
    Compound(CompoundCurve),
}

impl Default for Ring {
    fn default() -> Self {
        Ring::Linear(LineString::new(Vec::new()))
    }
}

impl Ring {
    /// Accept any curve-capable geometry; anything else yields its kind back.
    fn from_geometry(geometry: Geometry) -> Result<Self, GeometryKind> {
        match geometry {
            Geometry::LineString(line) => Ok(Ring::Linear(line)),
            Geometry::ArcString(arc) => Ok(Ring::Circular(arc)),
            Geometry::CompoundCurve(curve) => Ok(Ring::Compound(curve)),
            other => Err(other.kind()),
        }
    }

    /// Kind of the curve forming this ring.
    pub fn kind(&self) -> GeometryKind {
        match self {
            Ring::Linear(_) => GeometryKind::LineString,
            Ring::Circular(_) => GeometryKind::ArcString,
            Ring::Compound(_) => GeometryKind::CompoundCurve,
        }
    }

    /// True when the ring has no coordinates.
    pub fn is_empty(&self) -> bool {
        match self {
            Ring::Linear(line) => line.0.is_empty(),
            Ring::Circular(arc) => arc.is_empty(),
            Ring::Compound(curve) => curve.is_empty(),
        }
    }

    /// Empty, or closed. A linear ring also needs at least four points.
    pub fn is_ring(&self) -> bool {
        match self {
            Ring::Linear(line) => match (line.0.first(), line.0.last()) {
                (Some(&first), Some(&last)) => {
                    line.0.len() >= 4 && coord_distance(first, last) <= CONTINUITY_TOLERANCE
                }
                _ => true,
            },
            Ring::Circular(arc) => arc.is_ring(),
            Ring::Compound(curve) => curve.is_ring(),
        }
    }

    /// Envelope of the ring, including arc extremes.
    pub fn bounding_rect(&self) -> Option<Rect> {
        match self {
            Ring::Linear(line) => line.bounding_rect(),
            Ring::Circular(arc) => arc.bounding_rect(),
            Ring::Compound(curve) => curve.bounding_rect(),
        }
    }

    /// Straight-segment approximation of the ring.
    pub fn linearize(&self, tessellation: &Tessellation) -> LineString {
        match self {
            Ring::Linear(line) => line.clone(),
            Ring::Circular(arc) => arc.linearize(tessellation),
            Ring::Compound(curve) => curve.linearize(tessellation),
        }
    }

    fn is_curved(&self) -> bool {
        match self {
            Ring::Linear(_) => false,
            Ring::Circular(_) => true,
            Ring::Compound(curve) => curve.has_arcs(),
        }
    }
}

/// A surface bounded by one exterior ring and any number of holes, where each
/// ring may contain arcs.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CurvePolygon {
    exterior: Ring,
    interiors: Vec<Ring>,
}

impl CurvePolygon {
    /// Validate the rings: all closed, holes inside the exterior envelope, and
    /// no non-empty hole without an exterior. `None` means an empty exterior.
    pub fn try_new<I>(exterior: Option<Geometry>, interiors: I) -> GeometryResult<Self>
    where
        I: IntoIterator,
        I::Item: Into<Geometry>,
    {
        let exterior = match exterior {
            Some(geometry) => Ring::from_geometry(geometry)
                .map_err(|kind| ValidationError::ExteriorNotRing { kind })?,
            None => Ring::default(),
        };
        if !exterior.is_ring() {
            return Err(ValidationError::ExteriorNotRing {
                kind: exterior.kind(),
            }
            .into());
        }

        let envelope = exterior.bounding_rect();
        let mut rings = Vec::new();
        for (index, geometry) in interiors.into_iter().enumerate() {
            let ring = Ring::from_geometry(geometry.into())
                .map_err(|kind| ValidationError::InteriorNotRing { index, kind })?;
            if !ring.is_ring() {
                return Err(ValidationError::InteriorNotRing {
                    index,
                    kind: ring.kind(),
                }
                .into());
            }
            if let Some(inner) = ring.bounding_rect() {
                let Some(outer) = envelope else {
                    return Err(ValidationError::EmptyExteriorWithInteriors { index }.into());
                };
                if !rect_contains(&outer, &inner) {
                    return Err(ValidationError::InteriorNotContained { index }.into());
                }
            }
            rings.push(ring);
        }

        Ok(Self {
            exterior,
            interiors: rings,
        })
    }

    /// The exterior ring; empty for an empty polygon.
    pub fn exterior(&self) -> &Ring {
        &self.exterior
    }

    /// The interior rings in order, empty ones included.
    pub fn interiors(&self) -> &[Ring] {
        &self.interiors
    }

    /// Number of interior rings, empty ones included.
    pub fn num_interior_rings(&self) -> usize {
        self.interiors.len()
    }

    /// True when the exterior ring is empty.
    pub fn is_empty(&self) -> bool {
        self.exterior.is_empty()
    }

    /// True if any ring contains an arc.
    pub fn has_arcs(&self) -> bool {
        self.exterior.is_curved() || self.interiors.iter().any(Ring::is_curved)
    }

    /// Envelope of the exterior ring.
    pub fn bounding_rect(&self) -> Option<Rect> {
        self.exterior.bounding_rect()
    }

    /// Linear polygon approximation. Empty holes are dropped.
    pub fn linearize(&self, tessellation: &Tessellation) -> Polygon {
        let interiors = self
            .interiors
            .iter()
            .filter(|ring| !ring.is_empty())
            .map(|ring| ring.linearize(tessellation))
            .collect();
        Polygon::new(self.exterior.linearize(tessellation), interiors)
    }
}
