use curvegeo::*;
use geo::{LineString, Point, Polygon};
use std::sync::Arc;

fn point(x: f64, y: f64) -> GeometryRef {
    Arc::new(Point::new(x, y).into())
}

fn polygon() -> GeometryRef {
    let ring =
        LineString::from(vec![(0.0, 0.0), (2.0, 0.0), (2.0, 2.0), (0.0, 2.0), (0.0, 0.0)]);
    Arc::new(Polygon::new(ring, vec![]).into())
}

fn line(y: f64) -> GeometryRef {
    Arc::new(LineString::from(vec![(0.0, y), (1.0, y)]).into())
}

fn arc() -> GeometryRef {
    let arc = GeometryBuilder::default()
        .create_arc_string([(0.0, 0.0), (1.0, 1.0), (2.0, 0.0)])
        .unwrap();
    Arc::new(arc.into())
}

#[test]
fn test_empty_input_is_empty_collection() {
    let result = build_geometry(Vec::new()).unwrap();
    assert_eq!(result.kind(), GeometryKind::GeometryCollection);
    assert!(result.is_empty());
    assert_eq!(result.num_geometries(), 0);

    let only_missing = build_geometry([None, None]).unwrap();
    assert_eq!(only_missing.kind(), GeometryKind::GeometryCollection);
    assert_eq!(only_missing.num_geometries(), 0);
}

#[test]
fn test_single_element_is_passed_through() {
    let p = point(1.0, 2.0);
    let result = build_geometry([Some(p.clone())]).unwrap();
    assert!(Arc::ptr_eq(&result, &p));
}

#[test]
fn test_points_become_multi_point_in_order() {
    let result = build_geometry([Some(point(1.0, 1.0)), Some(point(2.0, 2.0))]).unwrap();
    match &*result {
        Geometry::MultiPoint(points) => {
            assert_eq!(points.0, vec![Point::new(1.0, 1.0), Point::new(2.0, 2.0)]);
        }
        other => panic!("expected a multi point, got {}", other.kind()),
    }
}

#[test]
fn test_mixed_kinds_become_collection_in_order() {
    let poly = polygon();
    let p = point(5.0, 5.0);
    let result = build_geometry([Some(poly.clone()), Some(p.clone())]).unwrap();
    assert_eq!(result.kind(), GeometryKind::GeometryCollection);
    assert_eq!(result.num_geometries(), 2);
    assert!(Arc::ptr_eq(&result.geometry_n(0).flatten().unwrap(), &poly));
    assert!(Arc::ptr_eq(&result.geometry_n(1).flatten().unwrap(), &p));
    assert_eq!(result.dimension(), 2);
}

#[test]
fn test_homogeneous_dispatch() {
    let result = build_geometry([Some(polygon()), Some(polygon())]).unwrap();
    assert_eq!(result.kind(), GeometryKind::MultiPolygon);

    let result = build_geometry([Some(line(0.0)), Some(line(1.0))]).unwrap();
    assert_eq!(result.kind(), GeometryKind::MultiLineString);

    let result = build_geometry([Some(line(0.0)), Some(arc())]).unwrap();
    assert_eq!(result.kind(), GeometryKind::MultiCurve);
    assert_eq!(result.num_geometries(), 2);

    let curved: GeometryRef = Arc::new(CurvePolygon::default().into());
    let result = build_geometry([Some(curved), Some(polygon())]).unwrap();
    assert_eq!(result.kind(), GeometryKind::MultiSurface);
}

#[test]
fn test_nested_collections_are_not_unwrapped() {
    let inner = build_geometry([Some(point(0.0, 0.0)), Some(point(1.0, 1.0))]).unwrap();
    let result = build_geometry([Some(inner.clone())]).unwrap();
    assert_eq!(result.kind(), GeometryKind::GeometryCollection);
    assert!(Arc::ptr_eq(&result.geometry_n(0).flatten().unwrap(), &inner));
}

#[test]
fn test_missing_entries_are_kept() {
    let result = build_geometry([Some(point(0.0, 0.0)), None, Some(point(1.0, 1.0))]).unwrap();
    assert_eq!(result.kind(), GeometryKind::GeometryCollection);
    assert_eq!(result.num_geometries(), 3);
    assert_eq!(result.geometry_n(1), Some(None));
}
