//! Running boolean overlays on curved geometries through a linear engine.
//!
//! Curved operands are flattened before they reach the engine and results are
//! returned as the engine produced them: curvature is not restored.

use crate::builder::GeometryBuilder;
use crate::collect::build_geometry;
use crate::error::{GeometryResult, OverlayError};
use crate::flatten::CurveFlattener;
use crate::geometry::{coord_distance, Geometry, GeometryRef, CONTINUITY_TOLERANCE};
use geo::algorithm::line_intersection::{line_intersection, LineIntersection};
use geo::{BooleanOps, Intersects, LineString, MultiLineString, MultiPolygon, Point, Polygon};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Boolean overlay operations, numbered by their conventional codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OverlayOp {
    Intersection = 1,
    Union = 2,
    Difference = 3,
    SymDifference = 4,
}

impl OverlayOp {
    /// The numeric code of this operation.
    pub fn code(self) -> i32 {
        self as i32
    }

    /// The operation for `code`, or an unknown-operation error.
    pub fn from_code(code: i32) -> Result<Self, OverlayError> {
        match code {
            1 => Ok(OverlayOp::Intersection),
            2 => Ok(OverlayOp::Union),
            3 => Ok(OverlayOp::Difference),
            4 => Ok(OverlayOp::SymDifference),
            other => Err(OverlayError::UnknownOperation(other)),
        }
    }
}

impl fmt::Display for OverlayOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OverlayOp::Intersection => "intersection",
            OverlayOp::Union => "union",
            OverlayOp::Difference => "difference",
            OverlayOp::SymDifference => "symmetric difference",
        };
        f.write_str(name)
    }
}

/// A robust overlay implementation over linear geometries.
pub trait OverlayEngine {
    fn overlay(
        &self,
        a: &GeometryRef,
        b: &GeometryRef,
        op: OverlayOp,
    ) -> Result<GeometryRef, OverlayError>;

    fn union(&self, a: &GeometryRef) -> Result<GeometryRef, OverlayError>;
}

/// Wraps an [`OverlayEngine`] so that curved operands are flattened first.
///
/// Implements [`OverlayEngine`] itself and can stand in for the wrapped
/// engine anywhere one is expected.
#[derive(Debug, Clone)]
pub struct CurvedOverlay<E> {
    engine: E,
    flattener: CurveFlattener,
}

impl<E: OverlayEngine> CurvedOverlay<E> {
    /// Flatten operands at the builder's default resolution.
    pub fn new(engine: E, builder: &GeometryBuilder) -> GeometryResult<Self> {
        Ok(Self::with_flattener(
            engine,
            CurveFlattener::new(builder.tessellation())?,
        ))
    }

    /// Wrap `engine` with an explicitly configured flattener.
    pub fn with_flattener(engine: E, flattener: CurveFlattener) -> Self {
        Self { engine, flattener }
    }

    /// The wrapped engine.
    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Flatten both operands, then run `op` on the engine.
    pub fn binary_overlay(
        &self,
        op: OverlayOp,
        a: &GeometryRef,
        b: &GeometryRef,
    ) -> Result<GeometryRef, OverlayError> {
        let a = self.flattener.flatten(a)?;
        let b = self.flattener.flatten(b)?;
        self.engine.overlay(&a, &b, op)
    }

    /// Flatten `a`, then union it on the engine.
    pub fn unary_union(&self, a: &GeometryRef) -> Result<GeometryRef, OverlayError> {
        let a = self.flattener.flatten(a)?;
        self.engine.union(&a)
    }
}

impl<E: OverlayEngine> OverlayEngine for CurvedOverlay<E> {
    fn overlay(
        &self,
        a: &GeometryRef,
        b: &GeometryRef,
        op: OverlayOp,
    ) -> Result<GeometryRef, OverlayError> {
        self.binary_overlay(op, a, b)
    }

    fn union(&self, a: &GeometryRef) -> Result<GeometryRef, OverlayError> {
        self.unary_union(a)
    }
}

/// Linear overlay engine built on [`geo::BooleanOps`].
///
/// Operands may hold points, line strings and polygons in any mix, nested in
/// collections. Areas are overlaid exactly by `geo`. Linework is clipped
/// against the other operand's areas, and crossings between linework of the
/// two operands are reported as points or shared segments for intersections.
/// Linework is not noded against other linework for union and difference.
/// Empty parts are ignored; curved operands are rejected and must be
/// flattened first (see [`CurvedOverlay`]).
#[derive(Debug, Clone, Copy, Default)]
pub struct GeoOverlay;

/// An operand split by dimension.
#[derive(Debug, Default)]
struct Parts {
    polygons: Vec<Polygon>,
    lines: Vec<LineString>,
    points: Vec<Point>,
}

impl Parts {
    fn of(geometry: &Geometry, op: OverlayOp) -> Result<Self, OverlayError> {
        let mut parts = Parts::default();
        for leaf in geometry.leaves() {
            match leaf {
                Geometry::Point(point) => parts.points.push(*point),
                Geometry::MultiPoint(points) => parts.points.extend(points.iter().copied()),
                Geometry::LineString(line) => parts.push_line(line),
                Geometry::MultiLineString(lines) => lines.iter().for_each(|l| parts.push_line(l)),
                Geometry::Polygon(polygon) => parts.push_polygon(polygon),
                Geometry::MultiPolygon(polygons) => {
                    polygons.iter().for_each(|p| parts.push_polygon(p))
                }
                other => {
                    return Err(OverlayError::UnsupportedOperand {
                        operation: op,
                        kind: other.kind(),
                    })
                }
            }
        }
        Ok(parts)
    }

    fn push_line(&mut self, line: &LineString) {
        if line.0.len() >= 2 {
            self.lines.push(line.clone());
        }
    }

    fn push_polygon(&mut self, polygon: &Polygon) {
        if !polygon.exterior().0.is_empty() {
            self.polygons.push(polygon.clone());
        }
    }

    fn areas(&self) -> MultiPolygon {
        MultiPolygon::new(self.polygons.clone())
    }

    /// True if `point` lies on or inside any part.
    fn touches(&self, point: &Point) -> bool {
        self.polygons.iter().any(|p| p.intersects(point))
            || self.lines.iter().any(|l| l.intersects(point))
            || self.points.iter().any(|p| p == point)
    }

    /// Points of `self` that do not touch `other`.
    fn points_outside(&self, other: &Parts) -> Vec<Point> {
        self.points
            .iter()
            .filter(|p| !other.touches(p))
            .copied()
            .collect()
    }

    /// Drop points covered by this result's own areas or linework, and
    /// repeated points.
    fn without_covered_points(mut self) -> Self {
        let points = std::mem::take(&mut self.points);
        for point in points {
            if !self.touches(&point) {
                self.points.push(point);
            }
        }
        self
    }

    fn into_geometry(self) -> Result<GeometryRef, OverlayError> {
        let polygons = self.polygons.into_iter().map(Geometry::from);
        let lines = self.lines.into_iter().map(Geometry::from);
        let points = self.points.into_iter().map(Geometry::from);
        let members = polygons.chain(lines).chain(points).map(|g| Some(Arc::new(g)));
        Ok(build_geometry(members)?)
    }
}

/// Overlay of two areas, leaving `geo` out when either side is empty.
fn overlay_areas(op: OverlayOp, lhs: MultiPolygon, rhs: MultiPolygon) -> MultiPolygon {
    if lhs.0.is_empty() || rhs.0.is_empty() {
        return match op {
            OverlayOp::Intersection => MultiPolygon::new(Vec::new()),
            OverlayOp::Difference => lhs,
            OverlayOp::Union | OverlayOp::SymDifference if lhs.0.is_empty() => rhs,
            OverlayOp::Union | OverlayOp::SymDifference => lhs,
        };
    }
    match op {
        OverlayOp::Intersection => lhs.intersection(&rhs),
        OverlayOp::Union => lhs.union(&rhs),
        OverlayOp::Difference => lhs.difference(&rhs),
        OverlayOp::SymDifference => lhs.xor(&rhs),
    }
}

/// Union of possibly overlapping polygons.
fn merge_areas(polygons: Vec<Polygon>) -> MultiPolygon {
    let mut parts = polygons.into_iter();
    let Some(first) = parts.next() else {
        return MultiPolygon::new(Vec::new());
    };
    parts.fold(MultiPolygon::new(vec![first]), |acc, polygon| {
        acc.union(&MultiPolygon::new(vec![polygon]))
    })
}

/// The parts of `lines` inside `areas`, or outside them when `outside` is set.
fn clip_lines(areas: &MultiPolygon, lines: Vec<LineString>, outside: bool) -> Vec<LineString> {
    if lines.is_empty() || areas.0.is_empty() {
        return if outside { lines } else { Vec::new() };
    }
    areas
        .clip(&MultiLineString::new(lines), outside)
        .0
        .into_iter()
        .filter(|l| l.0.len() >= 2)
        .collect()
}

/// Crossing points and shared segments between two sets of linework.
fn line_crossings(lhs: &[LineString], rhs: &[LineString]) -> (Vec<Point>, Vec<LineString>) {
    let mut points: Vec<Point> = Vec::new();
    let mut segments = Vec::new();
    for a in lhs.iter().flat_map(|l| l.lines()) {
        for b in rhs.iter().flat_map(|l| l.lines()) {
            match line_intersection(a, b) {
                Some(LineIntersection::SinglePoint { intersection, .. }) => {
                    let seen = points
                        .iter()
                        .any(|p| coord_distance(p.0, intersection) <= CONTINUITY_TOLERANCE);
                    if !seen {
                        points.push(intersection.into());
                    }
                }
                Some(LineIntersection::Collinear { intersection }) => {
                    segments.push(LineString::new(vec![intersection.start, intersection.end]));
                }
                None => {}
            }
        }
    }
    (points, segments)
}

impl GeoOverlay {
    fn combine(op: OverlayOp, a: Parts, b: Parts) -> Parts {
        let (areas_a, areas_b) = (a.areas(), b.areas());
        match op {
            OverlayOp::Intersection => {
                let polygons = overlay_areas(op, areas_a.clone(), areas_b.clone()).0;
                let (crossings, shared) = line_crossings(&a.lines, &b.lines);
                let mut lines = clip_lines(&areas_b, a.lines.clone(), false);
                lines.extend(clip_lines(&areas_a, b.lines.clone(), false));
                lines.extend(shared);
                let mut points = crossings;
                points.extend(a.points.iter().filter(|p| b.touches(p)).copied());
                points.extend(b.points.iter().filter(|p| a.touches(p)).copied());
                Parts {
                    polygons,
                    lines,
                    points,
                }
            }
            OverlayOp::Union => {
                let points_a = a.points_outside(&b);
                let points_b = b.points_outside(&a);
                let merged = merge_areas(a.polygons.into_iter().chain(b.polygons).collect());
                let linework = a.lines.into_iter().chain(b.lines).collect();
                let lines = clip_lines(&merged, linework, true);
                let mut points = points_a;
                points.extend(points_b);
                Parts {
                    polygons: merged.0,
                    lines,
                    points,
                }
            }
            OverlayOp::Difference => Parts {
                points: a.points_outside(&b),
                polygons: overlay_areas(op, areas_a, areas_b.clone()).0,
                lines: clip_lines(&areas_b, a.lines, true),
            },
            OverlayOp::SymDifference => {
                let points_a = a.points_outside(&b);
                let points_b = b.points_outside(&a);
                let mut lines = clip_lines(&areas_b, a.lines, true);
                lines.extend(clip_lines(&areas_a, b.lines, true));
                let mut points = points_a;
                points.extend(points_b);
                Parts {
                    polygons: overlay_areas(op, areas_a, areas_b).0,
                    lines,
                    points,
                }
            }
        }
    }
}

impl OverlayEngine for GeoOverlay {
    fn overlay(
        &self,
        a: &GeometryRef,
        b: &GeometryRef,
        op: OverlayOp,
    ) -> Result<GeometryRef, OverlayError> {
        let result =
            Self::combine(op, Parts::of(a, op)?, Parts::of(b, op)?).without_covered_points();
        log::debug!(
            "{op} produced {} polygon(s), {} line(s), {} point(s)",
            result.polygons.len(),
            result.lines.len(),
            result.points.len()
        );
        result.into_geometry()
    }

    fn union(&self, a: &GeometryRef) -> Result<GeometryRef, OverlayError> {
        let parts = Parts::of(a, OverlayOp::Union)?;
        Self::combine(OverlayOp::Union, parts, Parts::default())
            .without_covered_points()
            .into_geometry()
    }
}
