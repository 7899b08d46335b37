use super::arc::{ArcString, Tessellation};
use super::{coord_distance, merge_rects, Geometry, GeometryKind, CONTINUITY_TOLERANCE};
use crate::error::{GeometryResult, ValidationError};
use geo::{BoundingRect, Coord, LineString, Rect};

/// One piece of a compound curve.
#[derive(Debug, Clone, PartialEq)]
pub enum CurveSegment {
    /// A straight polyline.
    Line(LineString),
    /// One or more circular arcs.
    Arc(ArcString),
}

impl CurveSegment {
    fn from_geometry(index: usize, geometry: Geometry) -> GeometryResult<Self> {
        if geometry.is_empty() {
            return Err(ValidationError::EmptySegment { index }.into());
        }
        match geometry {
            Geometry::LineString(line) => Ok(CurveSegment::Line(line)),
            Geometry::ArcString(arc) => Ok(CurveSegment::Arc(arc)),
            other => Err(ValidationError::InvalidSegmentType {
                index,
                kind: other.kind(),
            }
            .into()),
        }
    }

    /// `LineString` or `ArcString`.
    pub fn kind(&self) -> GeometryKind {
        match self {
            CurveSegment::Line(_) => GeometryKind::LineString,
            CurveSegment::Arc(_) => GeometryKind::ArcString,
        }
    }

    /// First coordinate of the segment.
    pub fn start_point(&self) -> Option<Coord> {
        match self {
            CurveSegment::Line(line) => line.0.first().copied(),
            CurveSegment::Arc(arc) => arc.start_point(),
        }
    }

    /// Last coordinate of the segment.
    pub fn end_point(&self) -> Option<Coord> {
        match self {
            CurveSegment::Line(line) => line.0.last().copied(),
            CurveSegment::Arc(arc) => arc.end_point(),
        }
    }

    /// Envelope of the segment, including arc extremes.
    pub fn bounding_rect(&self) -> Option<Rect> {
        match self {
            CurveSegment::Line(line) => line.bounding_rect(),
            CurveSegment::Arc(arc) => arc.bounding_rect(),
        }
    }

    fn extend_linearized(&self, tessellation: &Tessellation, coords: &mut Vec<Coord>) {
        match self {
            CurveSegment::Line(line) => {
                let skip = usize::from(!coords.is_empty());
                coords.extend(line.0.iter().skip(skip).copied());
            }
            CurveSegment::Arc(arc) => arc.extend_linearized(tessellation, coords),
        }
    }
}

/// A chain of line strings and arc strings where each segment starts where
/// the previous one ends.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CompoundCurve {
    segments: Vec<CurveSegment>,
}

impl CompoundCurve {
    /// Validate segment types and continuity before building the curve.
    pub fn try_new<I>(segments: I) -> GeometryResult<Self>
    where
        I: IntoIterator,
        I::Item: Into<Geometry>,
    {
        let segments = segments
            .into_iter()
            .enumerate()
            .map(|(index, geometry)| CurveSegment::from_geometry(index, geometry.into()))
            .collect::<GeometryResult<Vec<_>>>()?;

        for (index, pair) in segments.windows(2).enumerate() {
            if let (Some(end), Some(start)) = (pair[0].end_point(), pair[1].start_point()) {
                let gap = coord_distance(end, start);
                if gap > CONTINUITY_TOLERANCE {
                    return Err(ValidationError::Discontinuous { index, gap }.into());
                }
            }
        }

        Ok(Self { segments })
    }

    /// The segments in order.
    pub fn segments(&self) -> &[CurveSegment] {
        &self.segments
    }

    /// Number of segments.
    pub fn num_segments(&self) -> usize {
        self.segments.len()
    }

    /// True when there are no segments.
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Start of the first segment.
    pub fn start_point(&self) -> Option<Coord> {
        self.segments.first().and_then(CurveSegment::start_point)
    }

    /// End of the last segment.
    pub fn end_point(&self) -> Option<Coord> {
        self.segments.last().and_then(CurveSegment::end_point)
    }

    /// True if any segment is an arc string.
    pub fn has_arcs(&self) -> bool {
        self.segments
            .iter()
            .any(|s| matches!(s, CurveSegment::Arc(_)))
    }

    /// Start and end coincide within the continuity tolerance.
    pub fn is_closed(&self) -> bool {
        match (self.start_point(), self.end_point()) {
            (Some(start), Some(end)) => coord_distance(start, end) <= CONTINUITY_TOLERANCE,
            _ => false,
        }
    }

    /// Empty, or closed.
    pub fn is_ring(&self) -> bool {
        self.is_empty() || self.is_closed()
    }

    /// Union of the segment envelopes.
    pub fn bounding_rect(&self) -> Option<Rect> {
        self.segments
            .iter()
            .fold(None, |acc, s| merge_rects(acc, s.bounding_rect()))
    }

    /// Concatenate the segment approximations. Shared join points appear once.
    pub fn linearize(&self, tessellation: &Tessellation) -> LineString {
        let mut coords = Vec::new();
        for segment in &self.segments {
            segment.extend_linearized(tessellation, &mut coords);
        }
        LineString::new(coords)
    }
}
