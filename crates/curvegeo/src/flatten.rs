//! Turning trees that may contain arcs into purely linear trees.
//!
//! Both the curvature scan and the rebuild walk the tree with explicit stacks,
//! so deeply nested collections cannot exhaust the call stack.

use crate::collect::build_geometry;
use crate::error::GeometryResult;
use crate::geometry::{Geometry, GeometryRef, Tessellation};
use std::sync::Arc;

/// True if any arc string, compound curve or curve polygon appears anywhere
/// in the tree. Stops at the first one found.
pub fn has_curvature(geometry: &Geometry) -> bool {
    geometry.leaves().any(|leaf| leaf.kind().is_curved())
}

/// A container being rebuilt: its original members and the replacements
/// produced so far.
struct Frame<'a> {
    source: &'a GeometryRef,
    members: Vec<Option<&'a GeometryRef>>,
    rebuilt: Vec<Option<GeometryRef>>,
    changed: bool,
}

impl<'a> Frame<'a> {
    fn new(source: &'a GeometryRef) -> Self {
        let members = source.members();
        let rebuilt = Vec::with_capacity(members.len());
        Self {
            source,
            members,
            rebuilt,
            changed: false,
        }
    }

    fn push(&mut self, member: Option<GeometryRef>, changed: bool) {
        self.changed |= changed;
        self.rebuilt.push(member);
    }

    /// The reassembled container, or the original one if no member changed.
    fn finish(self) -> GeometryResult<(GeometryRef, bool)> {
        if self.changed {
            Ok((build_geometry(self.rebuilt)?, true))
        } else {
            Ok((Arc::clone(self.source), false))
        }
    }
}

/// Produces linear equivalents of curved geometry trees at a fixed tessellation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CurveFlattener {
    tessellation: Tessellation,
}

impl CurveFlattener {
    /// Fails with a range error if `tessellation` does not validate.
    pub fn new(tessellation: Tessellation) -> GeometryResult<Self> {
        tessellation.validate()?;
        Ok(Self { tessellation })
    }

    /// The tessellation every flattened arc uses.
    pub fn tessellation(&self) -> &Tessellation {
        &self.tessellation
    }

    /// Linear equivalent of `geometry`.
    ///
    /// Returns the same [`GeometryRef`] when nothing in the tree is curved.
    /// Otherwise curved elements are replaced by their approximations,
    /// untouched subtrees are shared with the input, and every rebuilt
    /// container is reshaped with [`build_geometry`]. Each node is visited
    /// once.
    pub fn flatten(&self, geometry: &GeometryRef) -> GeometryResult<GeometryRef> {
        if !geometry.kind().holds_members() {
            return Ok(self.linearize_member(geometry));
        }

        let mut stack = vec![Frame::new(geometry)];
        let mut finished = None;
        while let Some(frame) = stack.last_mut() {
            let index = frame.rebuilt.len();
            match frame.members.get(index).copied() {
                Some(Some(member)) if member.kind().holds_members() => {
                    stack.push(Frame::new(member));
                }
                Some(Some(member)) => {
                    let replacement = self.linearize_member(member);
                    let changed = !Arc::ptr_eq(&replacement, member);
                    frame.push(Some(replacement), changed);
                }
                Some(None) => frame.push(None, false),
                None => {
                    let Some(done) = stack.pop() else { break };
                    let (assembled, changed) = done.finish()?;
                    match stack.last_mut() {
                        Some(parent) => parent.push(Some(assembled), changed),
                        None => finished = Some(assembled),
                    }
                }
            }
        }

        let flattened = finished.unwrap_or_else(|| Arc::clone(geometry));
        if !Arc::ptr_eq(&flattened, geometry) {
            log::debug!("flattened {} into {}", geometry.kind(), flattened.kind());
        }
        Ok(flattened)
    }

    /// Approximation of a single curved element; anything else is shared.
    fn linearize_member(&self, member: &GeometryRef) -> GeometryRef {
        let linear: Geometry = match &**member {
            Geometry::ArcString(arc) => arc.linearize(&self.tessellation).into(),
            Geometry::CompoundCurve(curve) => curve.linearize(&self.tessellation).into(),
            Geometry::CurvePolygon(polygon) => polygon.linearize(&self.tessellation).into(),
            _ => return Arc::clone(member),
        };
        log::trace!("linearized {} into {}", member.kind(), linear.kind());
        Arc::new(linear)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{ArcString, GeometryCollection, GeometryKind, MultiCurve};
    use geo::{Coord, LineString, Point};

    fn arc() -> GeometryRef {
        let coords = vec![
            Coord { x: 0.0, y: 0.0 },
            Coord { x: 1.0, y: 1.0 },
            Coord { x: 2.0, y: 0.0 },
        ];
        Arc::new(ArcString::try_new(coords).unwrap().into())
    }

    fn nest(member: GeometryRef, depth: usize) -> GeometryRef {
        (0..depth).fold(member, |inner, _| {
            Arc::new(GeometryCollection::new(vec![Some(inner), None]).into())
        })
    }

    #[test]
    fn test_has_curvature_finds_nested_arcs() {
        assert!(has_curvature(&arc()));
        let point: GeometryRef = Arc::new(Point::new(0.0, 0.0).into());
        assert!(!has_curvature(&nest(point, 5)));
        assert!(has_curvature(&nest(arc(), 5)));
    }

    #[test]
    fn test_rejects_negative_resolution() {
        assert!(CurveFlattener::new(Tessellation::with_resolution(-0.5)).is_err());
    }

    #[test]
    fn test_deep_nesting_is_rebuilt_without_recursion() {
        let flattener = CurveFlattener::new(Tessellation::default()).unwrap();
        let deep = nest(arc(), 1_000);
        let flat = flattener.flatten(&deep).unwrap();
        assert!(!has_curvature(&flat));
        assert_eq!(flat.kind(), GeometryKind::GeometryCollection);
    }

    #[test]
    fn test_linear_branches_are_shared() {
        let flattener = CurveFlattener::new(Tessellation::default()).unwrap();
        let point: GeometryRef = Arc::new(Point::new(0.0, 0.0).into());
        let linear = nest(point, 3);
        let curved = nest(arc(), 3);
        let tree: GeometryRef =
            Arc::new(GeometryCollection::new(vec![Some(linear.clone()), Some(curved)]).into());

        let flat = flattener.flatten(&tree).unwrap();
        assert!(!has_curvature(&flat));
        assert!(Arc::ptr_eq(&flat.geometry_n(0).flatten().unwrap(), &linear));

        let untouched = flattener.flatten(&linear).unwrap();
        assert!(Arc::ptr_eq(&untouched, &linear));
    }

    #[test]
    fn test_multi_curve_becomes_multi_line_string() {
        let flattener = CurveFlattener::new(Tessellation::default()).unwrap();
        let line: GeometryRef = Arc::new(LineString::from(vec![(5.0, 5.0), (6.0, 6.0)]).into());
        let multi: GeometryRef = Arc::new(MultiCurve::new(vec![arc(), line]).into());
        let flat = flattener.flatten(&multi).unwrap();
        assert_eq!(flat.kind(), GeometryKind::MultiLineString);
    }
}
