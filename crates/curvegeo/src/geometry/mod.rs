use geo::{
    BoundingRect, Coord, LineString, MultiLineString, MultiPoint, MultiPolygon, Point, Polygon,
    Rect,
};
use kurbo::Point as KPoint;
use std::fmt;
use std::sync::Arc;

pub mod arc;
pub mod compound;
pub mod multi;
pub mod polygon;

pub use arc::{
    ArcString, CircularArc, Tessellation, DEFAULT_SEGMENTS_PER_QUADRANT, MAX_SEGMENTS_PER_QUADRANT,
};
pub use compound::{CompoundCurve, CurveSegment};
pub use multi::{GeometryCollection, MultiCurve, MultiSurface};
pub use polygon::{CurvePolygon, Ring};

/// Maximum distance between coordinates that are considered coincident when
/// checking segment continuity and ring closure.
pub const CONTINUITY_TOLERANCE: f64 = 5e-7;

/// Shared, immutable handle to a geometry. Pass-through operations hand back
/// the same allocation, so identity can be checked with [`Arc::ptr_eq`].
pub type GeometryRef = Arc<Geometry>;

/// Every geometry variant this crate builds or consumes.
#[derive(Debug, Clone, PartialEq)]
pub enum Geometry {
    Point(Point),
    LineString(LineString),
    Polygon(Polygon),
    ArcString(ArcString),
    CompoundCurve(CompoundCurve),
    CurvePolygon(CurvePolygon),
    MultiPoint(MultiPoint),
    MultiLineString(MultiLineString),
    MultiPolygon(MultiPolygon),
    MultiCurve(MultiCurve),
    MultiSurface(MultiSurface),
    GeometryCollection(GeometryCollection),
}

/// Field-less tag of a [`Geometry`] variant, carrying its capabilities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GeometryKind {
    Point,
    LineString,
    Polygon,
    ArcString,
    CompoundCurve,
    CurvePolygon,
    MultiPoint,
    MultiLineString,
    MultiPolygon,
    MultiCurve,
    MultiSurface,
    GeometryCollection,
}

impl GeometryKind {
    /// Single curves: can be a ring and can be flattened to a line string.
    pub fn is_curve(self) -> bool {
        matches!(
            self,
            GeometryKind::LineString | GeometryKind::ArcString | GeometryKind::CompoundCurve
        )
    }

    /// Single surfaces.
    pub fn is_surface(self) -> bool {
        matches!(self, GeometryKind::Polygon | GeometryKind::CurvePolygon)
    }

    /// Kinds whose values may contain arcs and need linearizing.
    pub fn is_curved(self) -> bool {
        matches!(
            self,
            GeometryKind::ArcString | GeometryKind::CompoundCurve | GeometryKind::CurvePolygon
        )
    }

    /// Containers that hold their members as shared [`GeometryRef`]s.
    pub(crate) fn holds_members(self) -> bool {
        matches!(
            self,
            GeometryKind::MultiCurve | GeometryKind::MultiSurface | GeometryKind::GeometryCollection
        )
    }

    /// Multi geometries and the generic collection.
    pub fn is_collection(self) -> bool {
        matches!(
            self,
            GeometryKind::MultiPoint
                | GeometryKind::MultiLineString
                | GeometryKind::MultiPolygon
                | GeometryKind::MultiCurve
                | GeometryKind::MultiSurface
                | GeometryKind::GeometryCollection
        )
    }
}

impl fmt::Display for GeometryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?}")
    }
}

impl Geometry {
    /// The variant tag of this geometry.
    pub fn kind(&self) -> GeometryKind {
        match self {
            Geometry::Point(_) => GeometryKind::Point,
            Geometry::LineString(_) => GeometryKind::LineString,
            Geometry::Polygon(_) => GeometryKind::Polygon,
            Geometry::ArcString(_) => GeometryKind::ArcString,
            Geometry::CompoundCurve(_) => GeometryKind::CompoundCurve,
            Geometry::CurvePolygon(_) => GeometryKind::CurvePolygon,
            Geometry::MultiPoint(_) => GeometryKind::MultiPoint,
            Geometry::MultiLineString(_) => GeometryKind::MultiLineString,
            Geometry::MultiPolygon(_) => GeometryKind::MultiPolygon,
            Geometry::MultiCurve(_) => GeometryKind::MultiCurve,
            Geometry::MultiSurface(_) => GeometryKind::MultiSurface,
            Geometry::GeometryCollection(_) => GeometryKind::GeometryCollection,
        }
    }

    /// True when nothing in the tree has any coordinates.
    pub fn is_empty(&self) -> bool {
        self.leaves().all(Geometry::leaf_is_empty)
    }

    /// Axis-aligned envelope; `None` for empty geometries.
    pub fn bounding_rect(&self) -> Option<Rect> {
        self.leaves()
            .fold(None, |acc, leaf| merge_rects(acc, leaf.leaf_bounding_rect()))
    }

    /// Topological dimension: 0 for points, 1 for curves, 2 for surfaces, the
    /// maximum over members for collections (0 when there are none).
    pub fn dimension(&self) -> usize {
        match self {
            Geometry::MultiCurve(_) => 1,
            Geometry::MultiSurface(_) => 2,
            _ => self.leaves().map(Geometry::leaf_dimension).max().unwrap_or(0),
        }
    }

    /// Number of direct members for collections, 1 otherwise.
    pub fn num_geometries(&self) -> usize {
        match self {
            Geometry::MultiPoint(points) => points.0.len(),
            Geometry::MultiLineString(lines) => lines.0.len(),
            Geometry::MultiPolygon(polygons) => polygons.0.len(),
            Geometry::MultiCurve(curves) => curves.len(),
            Geometry::MultiSurface(surfaces) => surfaces.len(),
            Geometry::GeometryCollection(collection) => collection.len(),
            _ => 1,
        }
    }

    /// Member `index`, for every `index < num_geometries()`.
    ///
    /// The outer `None` means out of range; the inner one is a missing
    /// collection member. Members held by reference are shared; members of
    /// the linear multi geometries, and a non-collection's only member
    /// (itself), are returned as fresh copies.
    pub fn geometry_n(&self, index: usize) -> Option<Option<GeometryRef>> {
        let copy = |geometry: Geometry| Some(Some(Arc::new(geometry)));
        match self {
            Geometry::MultiPoint(points) => points.0.get(index).and_then(|p| copy((*p).into())),
            Geometry::MultiLineString(lines) => {
                lines.0.get(index).and_then(|l| copy(l.clone().into()))
            }
            Geometry::MultiPolygon(polygons) => {
                polygons.0.get(index).and_then(|p| copy(p.clone().into()))
            }
            Geometry::MultiCurve(_)
            | Geometry::MultiSurface(_)
            | Geometry::GeometryCollection(_) => {
                self.members().get(index).copied().map(|m| m.cloned())
            }
            _ if index == 0 => copy(self.clone()),
            _ => None,
        }
    }

    /// Members held by reference. Linear multi geometries store plain `geo`
    /// values and report no members here.
    pub(crate) fn members(&self) -> Vec<Option<&GeometryRef>> {
        match self {
            Geometry::MultiCurve(curves) => curves.curves().iter().map(Some).collect(),
            Geometry::MultiSurface(surfaces) => surfaces.surfaces().iter().map(Some).collect(),
            Geometry::GeometryCollection(collection) => {
                collection.members().iter().map(Option::as_ref).collect()
            }
            _ => Vec::new(),
        }
    }

    /// Every geometry in the tree that does not hold members by reference,
    /// depth first and in member order. Walks an explicit stack.
    pub(crate) fn leaves(&self) -> Leaves<'_> {
        Leaves {
            pending: vec![self],
        }
    }

    fn leaf_is_empty(&self) -> bool {
        match self {
            Geometry::Point(_) => false,
            Geometry::LineString(line) => line.0.is_empty(),
            Geometry::Polygon(polygon) => polygon.exterior().0.is_empty(),
            Geometry::ArcString(arc) => arc.is_empty(),
            Geometry::CompoundCurve(curve) => curve.is_empty(),
            Geometry::CurvePolygon(polygon) => polygon.is_empty(),
            Geometry::MultiPoint(points) => points.0.is_empty(),
            Geometry::MultiLineString(lines) => lines.0.iter().all(|l| l.0.is_empty()),
            Geometry::MultiPolygon(polygons) => {
                polygons.0.iter().all(|p| p.exterior().0.is_empty())
            }
            Geometry::MultiCurve(_)
            | Geometry::MultiSurface(_)
            | Geometry::GeometryCollection(_) => true,
        }
    }

    fn leaf_bounding_rect(&self) -> Option<Rect> {
        match self {
            Geometry::Point(point) => Some(Rect::new(point.0, point.0)),
            Geometry::LineString(line) => line.bounding_rect(),
            Geometry::Polygon(polygon) => polygon.bounding_rect(),
            Geometry::ArcString(arc) => arc.bounding_rect(),
            Geometry::CompoundCurve(curve) => curve.bounding_rect(),
            Geometry::CurvePolygon(polygon) => polygon.bounding_rect(),
            Geometry::MultiPoint(points) => points.bounding_rect(),
            Geometry::MultiLineString(lines) => lines.bounding_rect(),
            Geometry::MultiPolygon(polygons) => polygons.bounding_rect(),
            Geometry::MultiCurve(_)
            | Geometry::MultiSurface(_)
            | Geometry::GeometryCollection(_) => None,
        }
    }

    fn leaf_dimension(&self) -> usize {
        match self {
            Geometry::LineString(_)
            | Geometry::ArcString(_)
            | Geometry::CompoundCurve(_)
            | Geometry::MultiLineString(_)
            | Geometry::MultiCurve(_) => 1,
            Geometry::Polygon(_)
            | Geometry::CurvePolygon(_)
            | Geometry::MultiPolygon(_)
            | Geometry::MultiSurface(_) => 2,
            _ => 0,
        }
    }
}

/// Iterator returned by [`Geometry::leaves`].
pub(crate) struct Leaves<'a> {
    pending: Vec<&'a Geometry>,
}

impl<'a> Iterator for Leaves<'a> {
    type Item = &'a Geometry;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(next) = self.pending.pop() {
            if !next.kind().holds_members() {
                return Some(next);
            }
            // reversed so that members pop in order
            let members = next.members().into_iter().flatten().rev();
            self.pending.extend(members.map(|m| &**m));
        }
        None
    }
}

macro_rules! impl_from_variant {
    ($($variant:ident => $ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for Geometry {
                fn from(value: $ty) -> Self {
                    Geometry::$variant(value)
                }
            }
        )*
    };
}

impl_from_variant! {
    Point => Point,
    LineString => LineString,
    Polygon => Polygon,
    ArcString => ArcString,
    CompoundCurve => CompoundCurve,
    CurvePolygon => CurvePolygon,
    MultiPoint => MultiPoint,
    MultiLineString => MultiLineString,
    MultiPolygon => MultiPolygon,
    MultiCurve => MultiCurve,
    MultiSurface => MultiSurface,
    GeometryCollection => GeometryCollection,
}

pub(crate) fn coord_distance(a: Coord, b: Coord) -> f64 {
    KPoint::new(a.x, a.y).distance(KPoint::new(b.x, b.y))
}

pub(crate) fn rect_including(rect: Rect, coord: Coord) -> Rect {
    Rect::new(
        Coord {
            x: rect.min().x.min(coord.x),
            y: rect.min().y.min(coord.y),
        },
        Coord {
            x: rect.max().x.max(coord.x),
            y: rect.max().y.max(coord.y),
        },
    )
}

pub(crate) fn merge_rects(a: Option<Rect>, b: Option<Rect>) -> Option<Rect> {
    match (a, b) {
        (Some(a), Some(b)) => Some(rect_including(rect_including(a, b.min()), b.max())),
        (a, None) => a,
        (None, b) => b,
    }
}

/// Inclusive envelope containment.
pub(crate) fn rect_contains(outer: &Rect, inner: &Rect) -> bool {
    inner.min().x >= outer.min().x
        && inner.min().y >= outer.min().y
        && inner.max().x <= outer.max().x
        && inner.max().y <= outer.max().y
}
