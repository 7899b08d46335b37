use crate::collect::build_geometry;
use crate::config::CurveConfig;
use crate::error::{GeometryResult, ValidationError};
use crate::flatten::CurveFlattener;
use crate::geometry::{
    ArcString, CompoundCurve, CurvePolygon, Geometry, GeometryRef, MultiCurve, MultiSurface,
    Tessellation,
};
use geo::Coord;

/// Validated factory for curved geometries.
///
/// Every `create_*` call checks all invariants before returning, so callers
/// either get a complete geometry or the first violation found.
#[derive(Debug, Clone, Default)]
pub struct GeometryBuilder {
    config: CurveConfig,
}

impl GeometryBuilder {
    /// Fails with a range error if the config's resolution or segment counts
    /// are out of range.
    pub fn new(config: CurveConfig) -> GeometryResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// The configuration this builder was created with.
    pub fn config(&self) -> &CurveConfig {
        &self.config
    }

    /// Tessellation at the configured default resolution.
    pub fn tessellation(&self) -> Tessellation {
        self.config.tessellation()
    }

    /// An arc string from 0, or an odd number (>= 3) of control points.
    pub fn create_arc_string<I>(&self, points: I) -> GeometryResult<ArcString>
    where
        I: IntoIterator,
        I::Item: Into<Coord>,
    {
        ArcString::try_new(points.into_iter().map(Into::into).collect())
    }

    /// An arc string that must also be closed (or empty).
    pub fn create_circular_ring<I>(&self, points: I) -> GeometryResult<ArcString>
    where
        I: IntoIterator,
        I::Item: Into<Coord>,
    {
        let ring = self.create_arc_string(points)?;
        if !ring.is_ring() {
            return Err(ValidationError::NotClosed.into());
        }
        Ok(ring)
    }

    /// A full circle as a closed two-arc ring, counter-clockwise from the
    /// positive x axis.
    pub fn create_circle(&self, center: Coord, radius: f64) -> GeometryResult<ArcString> {
        if !radius.is_finite() || radius <= 0.0 {
            return Err(ValidationError::InvalidRadius { radius }.into());
        }
        let Coord { x, y } = center;
        self.create_circular_ring([
            (x + radius, y),
            (x, y + radius),
            (x - radius, y),
            (x, y - radius),
            (x + radius, y),
        ])
    }

    /// Chain line strings and arc strings. An empty input yields an empty curve.
    pub fn create_compound_curve<I>(&self, segments: I) -> GeometryResult<CompoundCurve>
    where
        I: IntoIterator,
        I::Item: Into<Geometry>,
    {
        CompoundCurve::try_new(segments)
    }

    /// A compound curve that must also be closed (or empty).
    pub fn create_compound_ring<I>(&self, segments: I) -> GeometryResult<CompoundCurve>
    where
        I: IntoIterator,
        I::Item: Into<Geometry>,
    {
        let ring = self.create_compound_curve(segments)?;
        if !ring.is_ring() {
            return Err(ValidationError::NotClosed.into());
        }
        Ok(ring)
    }

    /// A polygon whose rings may contain arcs. `None` gives an empty exterior.
    pub fn create_curve_polygon<I>(
        &self,
        exterior: Option<Geometry>,
        interiors: I,
    ) -> GeometryResult<CurvePolygon>
    where
        I: IntoIterator,
        I::Item: Into<Geometry>,
    {
        CurvePolygon::try_new(exterior, interiors)
    }

    /// Wrap curves without checking them again.
    pub fn create_multi_curve<I>(&self, curves: I) -> MultiCurve
    where
        I: IntoIterator,
        I::Item: Into<GeometryRef>,
    {
        let curves: Vec<GeometryRef> = curves.into_iter().map(Into::into).collect();
        for (index, curve) in curves.iter().enumerate() {
            if !curve.kind().is_curve() {
                log::warn!("multi curve member {index} is a {}", curve.kind());
            }
        }
        MultiCurve::new(curves)
    }

    /// Wrap surfaces without checking them again.
    pub fn create_multi_surface<I>(&self, surfaces: I) -> MultiSurface
    where
        I: IntoIterator,
        I::Item: Into<GeometryRef>,
    {
        let surfaces: Vec<GeometryRef> = surfaces.into_iter().map(Into::into).collect();
        for (index, surface) in surfaces.iter().enumerate() {
            if !surface.kind().is_surface() {
                log::warn!("multi surface member {index} is a {}", surface.kind());
            }
        }
        MultiSurface::new(surfaces)
    }

    /// See [`build_geometry`].
    pub fn build_geometry<I>(&self, geometries: I) -> GeometryResult<GeometryRef>
    where
        I: IntoIterator<Item = Option<GeometryRef>>,
    {
        build_geometry(geometries)
    }

    /// A flattener using this builder's segment counts and `resolution`.
    pub fn flattener(&self, resolution: f64) -> GeometryResult<CurveFlattener> {
        CurveFlattener::new(self.config.tessellation_at(resolution))
    }

    /// Flatten `geometry` at the default resolution.
    pub fn linearize(&self, geometry: &GeometryRef) -> GeometryResult<GeometryRef> {
        CurveFlattener::new(self.tessellation())?.flatten(geometry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GeometryError;
    use geo::Point;

    #[test]
    fn test_negative_default_resolution() {
        let err = GeometryBuilder::new(CurveConfig::new().with_default_resolution(-0.1));
        assert!(matches!(err, Err(GeometryError::Range { .. })));
    }

    #[test]
    fn test_circle() {
        let builder = GeometryBuilder::default();
        let circle = builder.create_circle(Coord { x: 2.0, y: 3.0 }, 1.5).unwrap();
        assert!(circle.is_ring());
        assert_eq!(circle.num_arcs(), 2);
        let rect = circle.bounding_rect().unwrap();
        assert!((rect.min().x - 0.5).abs() < 1e-9);
        assert!((rect.max().y - 4.5).abs() < 1e-9);

        assert_eq!(
            builder.create_circle(Coord { x: 0.0, y: 0.0 }, 0.0),
            Err(ValidationError::InvalidRadius { radius: 0.0 }.into())
        );
    }

    #[test]
    fn test_circular_ring_must_close() {
        let builder = GeometryBuilder::default();
        let err = builder.create_circular_ring([(0.0, 0.0), (1.0, 1.0), (2.0, 0.0)]);
        assert_eq!(err, Err(ValidationError::NotClosed.into()));
    }

    #[test]
    fn test_multi_curve_keeps_foreign_members() {
        let builder = GeometryBuilder::default();
        let point: GeometryRef = std::sync::Arc::new(Point::new(0.0, 0.0).into());
        let multi = builder.create_multi_curve([point]);
        assert_eq!(multi.len(), 1);
    }
}
