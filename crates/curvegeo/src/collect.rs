//! Shaping an arbitrary geometry sequence into the smallest well-typed
//! aggregate: a single value, a homogeneous multi geometry, or a generic
//! collection.

use crate::error::{GeometryError, GeometryResult};
use crate::geometry::{
    Geometry, GeometryCollection, GeometryKind, GeometryRef, MultiCurve, MultiSurface,
};
use geo::{MultiLineString, MultiPoint, MultiPolygon};
use std::sync::Arc;

/// What a pass over the input learned about it.
#[derive(Debug, Default)]
struct Census {
    representative: Option<GeometryKind>,
    heterogeneous: bool,
    has_collection: bool,
    has_missing: bool,
    non_null: usize,
    curves: usize,
    surfaces: usize,
}

impl Census {
    fn of(geometries: &[Option<GeometryRef>]) -> Self {
        let mut census = Census::default();
        for geometry in geometries {
            let Some(geometry) = geometry else {
                census.has_missing = true;
                continue;
            };
            let kind = geometry.kind();
            census.non_null += 1;
            match census.representative {
                None => census.representative = Some(kind),
                Some(first) if first != kind => census.heterogeneous = true,
                Some(_) => {}
            }
            census.has_collection |= kind.is_collection();
            census.curves += usize::from(kind.is_curve());
            census.surfaces += usize::from(kind.is_surface());
        }

        // mixed curve kinds (or mixed surface kinds) still aggregate
        if census.heterogeneous
            && (census.curves == census.non_null || census.surfaces == census.non_null)
        {
            census.heterogeneous = false;
        }
        census
    }
}

/// Build the minimal aggregate for `geometries`.
///
/// - nothing but missing entries: an empty [`GeometryCollection`];
/// - mixed kinds, nested collections or missing entries: a collection holding
///   the input verbatim;
/// - a single geometry: that same [`GeometryRef`];
/// - otherwise the matching multi geometry.
pub fn build_geometry<I>(geometries: I) -> GeometryResult<GeometryRef>
where
    I: IntoIterator<Item = Option<GeometryRef>>,
{
    let geometries: Vec<Option<GeometryRef>> = geometries.into_iter().collect();
    let census = Census::of(&geometries);

    let Some(kind) = census.representative else {
        log::debug!("no geometries to aggregate, returning an empty collection");
        return Ok(Arc::new(GeometryCollection::default().into()));
    };

    if census.heterogeneous || census.has_collection || census.has_missing {
        log::debug!(
            "wrapping {} geometries in a collection (heterogeneous: {}, nested: {}, missing: {})",
            geometries.len(),
            census.heterogeneous,
            census.has_collection,
            census.has_missing
        );
        return Ok(Arc::new(GeometryCollection::new(geometries).into()));
    }

    let elements: Vec<GeometryRef> = geometries.into_iter().flatten().collect();
    if let [single] = elements.as_slice() {
        return Ok(Arc::clone(single));
    }

    let multi = multi_container(kind, elements)?;
    log::debug!("aggregated {kind} elements into {}", multi.kind());
    Ok(Arc::new(multi))
}

/// Pick the multi geometry for a homogeneous sequence represented by `kind`.
fn multi_container(kind: GeometryKind, elements: Vec<GeometryRef>) -> GeometryResult<Geometry> {
    if kind == GeometryKind::Polygon {
        if let Some(polygons) = extract(&elements, |g| match g {
            Geometry::Polygon(p) => Some(p.clone()),
            _ => None,
        }) {
            return Ok(MultiPolygon::new(polygons).into());
        }
    }
    if kind.is_surface() {
        return Ok(MultiSurface::new(elements).into());
    }
    if kind == GeometryKind::LineString {
        if let Some(lines) = extract(&elements, |g| match g {
            Geometry::LineString(l) => Some(l.clone()),
            _ => None,
        }) {
            return Ok(MultiLineString::new(lines).into());
        }
    }
    if kind.is_curve() {
        return Ok(MultiCurve::new(elements).into());
    }
    if kind == GeometryKind::Point {
        if let Some(points) = extract(&elements, |g| match g {
            Geometry::Point(p) => Some(*p),
            _ => None,
        }) {
            return Ok(MultiPoint::new(points).into());
        }
    }
    Err(GeometryError::UnsupportedType(kind))
}

/// Unwrap every element as one concrete variant, or `None` if any differs.
fn extract<T>(elements: &[GeometryRef], pick: impl Fn(&Geometry) -> Option<T>) -> Option<Vec<T>> {
    elements.iter().map(|g| pick(&**g)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::ArcString;
    use geo::{Coord, LineString, Point, Polygon};

    fn point(x: f64, y: f64) -> GeometryRef {
        Arc::new(Point::new(x, y).into())
    }

    fn arc() -> GeometryRef {
        let coords = vec![
            Coord { x: 0.0, y: 0.0 },
            Coord { x: 1.0, y: 1.0 },
            Coord { x: 2.0, y: 0.0 },
        ];
        Arc::new(ArcString::try_new(coords).unwrap().into())
    }

    fn line() -> GeometryRef {
        Arc::new(LineString::from(vec![(0.0, 0.0), (1.0, 0.0)]).into())
    }

    #[test]
    fn test_census_relaxes_mixed_curves() {
        let census = Census::of(&[Some(line()), Some(arc())]);
        assert!(!census.heterogeneous);
        assert_eq!(census.curves, 2);

        let census = Census::of(&[Some(line()), Some(point(0.0, 0.0))]);
        assert!(census.heterogeneous);
    }

    #[test]
    fn test_unsupported_container() {
        let multi: GeometryRef = Arc::new(MultiPoint::new(vec![Point::new(0.0, 0.0)]).into());
        let err = multi_container(GeometryKind::MultiPoint, vec![multi.clone(), multi]);
        assert_eq!(err, Err(GeometryError::UnsupportedType(GeometryKind::MultiPoint)));
    }

    #[test]
    fn test_mixed_polygon_kinds_become_multi_surface() {
        let polygon: GeometryRef = Arc::new(
            Polygon::new(
                LineString::from(vec![(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 0.0)]),
                vec![],
            )
            .into(),
        );
        let curved: GeometryRef = Arc::new(crate::geometry::CurvePolygon::default().into());
        let result = build_geometry([Some(polygon), Some(curved)]).unwrap();
        assert_eq!(result.kind(), GeometryKind::MultiSurface);
    }

    #[test]
    fn test_missing_entries_force_collection() {
        let p = point(1.0, 1.0);
        let result = build_geometry([Some(p.clone()), None]).unwrap();
        match &*result {
            Geometry::GeometryCollection(collection) => {
                assert_eq!(collection.len(), 2);
                assert!(collection.members()[1].is_none());
            }
            other => panic!("expected a collection, got {:?}", other.kind()),
        }
    }
}
