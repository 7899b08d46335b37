use super::{coord_distance, merge_rects, rect_including, CONTINUITY_TOLERANCE};
use crate::error::{GeometryError, GeometryResult, ValidationError};
use geo::{Coord, LineString, Rect};
use kurbo::{Circle, Point, Vec2};
use std::f64::consts::{FRAC_PI_2, TAU};

/// Segments per quarter circle used when no resolution is requested.
pub const DEFAULT_SEGMENTS_PER_QUADRANT: u32 = 12;

/// Upper bound on segments per quarter circle, whatever the resolution.
pub const MAX_SEGMENTS_PER_QUADRANT: u32 = 1024;

/// Control points closer to a straight line than this (relative to the
/// chord lengths) describe a degenerate arc.
const COLLINEAR_EPSILON: f64 = 1e-12;

/// How arcs are approximated by straight segments.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tessellation {
    /// Maximum distance between an arc and its chords. Zero selects
    /// `segments_per_quadrant`.
    pub resolution: f64,
    pub segments_per_quadrant: u32,
    pub max_segments_per_quadrant: u32,
}

impl Default for Tessellation {
    fn default() -> Self {
        Self {
            resolution: 0.0,
            segments_per_quadrant: DEFAULT_SEGMENTS_PER_QUADRANT,
            max_segments_per_quadrant: MAX_SEGMENTS_PER_QUADRANT,
        }
    }
}

impl Tessellation {
    /// Default segment counts with the given chord resolution.
    pub fn with_resolution(resolution: f64) -> Self {
        Self {
            resolution,
            ..Self::default()
        }
    }

    /// Reject negative or non-finite resolutions and zero segment counts.
    pub fn validate(&self) -> GeometryResult<()> {
        if !self.resolution.is_finite() || self.resolution < 0.0 {
            return Err(GeometryError::Range {
                parameter: "tessellation resolution",
                value: self.resolution,
            });
        }
        if self.segments_per_quadrant == 0 {
            return Err(GeometryError::Range {
                parameter: "segments per quadrant",
                value: 0.0,
            });
        }
        if self.max_segments_per_quadrant < self.segments_per_quadrant {
            return Err(GeometryError::Range {
                parameter: "max segments per quadrant",
                value: self.max_segments_per_quadrant as f64,
            });
        }
        Ok(())
    }

    /// Angular step between consecutive output points on a circle of `radius`.
    pub fn step_angle(&self, radius: f64) -> f64 {
        let finest = FRAC_PI_2 / self.max_segments_per_quadrant.max(1) as f64;
        if self.resolution <= 0.0 {
            return (FRAC_PI_2 / self.segments_per_quadrant.max(1) as f64).max(finest);
        }
        if self.resolution >= radius {
            return FRAC_PI_2;
        }
        // sagitta of a chord spanning `step`: r * (1 - cos(step / 2))
        let step = 2.0 * (1.0 - self.resolution / radius).acos();
        step.clamp(finest, FRAC_PI_2)
    }
}

/// A single circular arc through three control points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CircularArc {
    pub start: Coord,
    pub mid: Coord,
    pub end: Coord,
}

/// Centre, radius and signed sweep of a non-degenerate arc.
#[derive(Debug, Clone, Copy)]
struct ArcFrame {
    center: Point,
    radius: f64,
    start_angle: f64,
    /// Positive for counter-clockwise arcs.
    sweep: f64,
}

impl ArcFrame {
    fn point_at(&self, angle: f64) -> Coord {
        let p = self.center + Vec2::from_angle(angle) * self.radius;
        Coord { x: p.x, y: p.y }
    }

    fn sweeps_over(&self, angle: f64) -> bool {
        let offset = if self.sweep > 0.0 {
            (angle - self.start_angle).rem_euclid(TAU)
        } else {
            (self.start_angle - angle).rem_euclid(TAU)
        };
        offset < self.sweep.abs()
    }
}

fn to_point(c: Coord) -> Point {
    Point::new(c.x, c.y)
}

impl CircularArc {
    /// An arc from `start` through `mid` to `end`.
    pub fn new(start: Coord, mid: Coord, end: Coord) -> Self {
        Self { start, mid, end }
    }

    fn frame(&self) -> Option<ArcFrame> {
        let (p0, p1, p2) = (to_point(self.start), to_point(self.mid), to_point(self.end));

        if self.is_full_circle() {
            // the middle control point is diametrically opposite the start
            let center = p0.midpoint(p1);
            let radius = p0.distance(p1) / 2.0;
            if radius == 0.0 {
                return None;
            }
            return Some(ArcFrame {
                center,
                radius,
                start_angle: (p0 - center).atan2(),
                sweep: TAU,
            });
        }

        let a = p1 - p0;
        let b = p2 - p0;
        let cross = a.cross(b);
        if cross.abs() <= COLLINEAR_EPSILON * a.hypot() * b.hypot() {
            return None;
        }

        let d = 2.0 * cross;
        let offset = Vec2::new(
            (b.y * a.hypot2() - a.y * b.hypot2()) / d,
            (a.x * b.hypot2() - b.x * a.hypot2()) / d,
        );
        let center = p0 + offset;
        let start_angle = (p0 - center).atan2();
        let end_angle = (p2 - center).atan2();
        let sweep = if cross > 0.0 {
            (end_angle - start_angle).rem_euclid(TAU)
        } else {
            -(start_angle - end_angle).rem_euclid(TAU)
        };

        Some(ArcFrame {
            center,
            radius: offset.hypot(),
            start_angle,
            sweep,
        })
    }

    /// Start and end coincide within the continuity tolerance, so the arc
    /// sweeps a whole circle.
    pub fn is_full_circle(&self) -> bool {
        coord_distance(self.start, self.end) <= CONTINUITY_TOLERANCE
    }

    /// True when the control points are collinear (the arc is a straight path).
    pub fn is_collinear(&self) -> bool {
        self.frame().is_none()
    }

    /// The supporting circle, if the arc is not degenerate.
    pub fn circle(&self) -> Option<Circle> {
        self.frame().map(|f| Circle::new(f.center, f.radius))
    }

    /// Centre of the supporting circle, if the arc is not degenerate.
    pub fn center(&self) -> Option<Coord> {
        self.frame().map(|f| Coord {
            x: f.center.x,
            y: f.center.y,
        })
    }

    /// Radius of the supporting circle, if the arc is not degenerate.
    pub fn radius(&self) -> Option<f64> {
        self.frame().map(|f| f.radius)
    }

    /// Signed sweep angle in radians, positive counter-clockwise.
    pub fn sweep_angle(&self) -> Option<f64> {
        self.frame().map(|f| f.sweep)
    }

    /// Bounding box of the arc itself, not just its control points.
    pub fn bounding_rect(&self) -> Rect {
        let mut rect = rect_including(Rect::new(self.start, self.end), self.mid);

        if let Some(frame) = self.frame() {
            for quadrant in 0..4 {
                let angle = quadrant as f64 * FRAC_PI_2;
                if frame.sweeps_over(angle) {
                    rect = rect_including(rect, frame.point_at(angle));
                }
            }
        }
        rect
    }

    /// Append the approximation of this arc to `coords`, excluding the start
    /// point. The last pushed coordinate is exactly `self.end`.
    pub fn extend_linearized(&self, tessellation: &Tessellation, coords: &mut Vec<Coord>) {
        let Some(frame) = self.frame() else {
            if self.mid != self.start && self.mid != self.end {
                coords.push(self.mid);
            }
            coords.push(self.end);
            return;
        };

        let step = tessellation.step_angle(frame.radius);
        // absorb rounding so an exact multiple of `step` does not gain a segment
        let count = (frame.sweep.abs() / step - 1e-9).ceil().max(1.0) as usize;
        for i in 1..count {
            let angle = frame.start_angle + frame.sweep * i as f64 / count as f64;
            coords.push(frame.point_at(angle));
        }
        coords.push(self.end);
    }
}

/// A sequence of circular arcs sharing endpoints: points `2i`, `2i + 1` and
/// `2i + 2` define arc `i`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ArcString {
    points: Vec<Coord>,
}

impl ArcString {
    /// Validate the control point count: zero, or odd and at least three.
    pub fn try_new(points: Vec<Coord>) -> GeometryResult<Self> {
        let count = points.len();
        if count != 0 && (count < 3 || (count - 1) % 2 != 0) {
            return Err(ValidationError::InvalidControlPointCount { count }.into());
        }
        Ok(Self { points })
    }

    /// An arc string with no control points.
    pub fn empty() -> Self {
        Self::default()
    }

    /// The control points in order.
    pub fn points(&self) -> &[Coord] {
        &self.points
    }

    /// Number of control points.
    pub fn num_points(&self) -> usize {
        self.points.len()
    }

    /// True when there are no control points.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// First control point.
    pub fn start_point(&self) -> Option<Coord> {
        self.points.first().copied()
    }

    /// Last control point.
    pub fn end_point(&self) -> Option<Coord> {
        self.points.last().copied()
    }

    /// Number of arcs described by the control points.
    pub fn num_arcs(&self) -> usize {
        self.points.len().saturating_sub(1) / 2
    }

    /// The arcs in order.
    pub fn arcs(&self) -> impl Iterator<Item = CircularArc> + '_ {
        self.points
            .windows(3)
            .step_by(2)
            .map(|w| CircularArc::new(w[0], w[1], w[2]))
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

    /// Envelope of the arcs themselves, including their extremes.
    pub fn bounding_rect(&self) -> Option<Rect> {
        self.arcs()
            .fold(None, |acc, arc| merge_rects(acc, Some(arc.bounding_rect())))
    }

    /// Straight-segment approximation; endpoints are kept exactly.
    pub fn linearize(&self, tessellation: &Tessellation) -> LineString {
        let mut coords = Vec::new();
        self.extend_linearized(tessellation, &mut coords);
        LineString::new(coords)
    }

    /// Append the approximation to `coords`, skipping the start point when
    /// `coords` already ends where this arc string starts.
    pub(crate) fn extend_linearized(&self, tessellation: &Tessellation, coords: &mut Vec<Coord>) {
        let Some(start) = self.start_point() else {
            return;
        };
        if coords.is_empty() {
            coords.push(start);
        }
        for arc in self.arcs() {
            arc.extend_linearized(tessellation, coords);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::PI;

    fn c(x: f64, y: f64) -> Coord {
        Coord { x, y }
    }

    #[test]
    fn test_control_point_counts() {
        for n in [0usize, 3, 5, 7] {
            let points = (0..n).map(|i| c(i as f64, (i % 2) as f64)).collect();
            assert!(ArcString::try_new(points).is_ok(), "{n} points should be accepted");
        }
        for n in [1usize, 2, 4, 6] {
            let points = (0..n).map(|i| c(i as f64, (i % 2) as f64)).collect();
            assert_eq!(
                ArcString::try_new(points),
                Err(ValidationError::InvalidControlPointCount { count: n }.into())
            );
        }
    }

    #[test]
    fn test_semicircle_frame() {
        let arc = CircularArc::new(c(1.0, 0.0), c(0.0, 1.0), c(-1.0, 0.0));
        let center = arc.center().unwrap();
        assert_relative_eq!(center.x, 0.0, epsilon = 1e-12);
        assert_relative_eq!(center.y, 0.0, epsilon = 1e-12);
        assert_relative_eq!(arc.radius().unwrap(), 1.0, epsilon = 1e-12);
        assert_relative_eq!(arc.sweep_angle().unwrap(), PI, epsilon = 1e-12);
    }

    #[test]
    fn test_clockwise_sweep_is_negative() {
        let arc = CircularArc::new(c(-1.0, 0.0), c(0.0, 1.0), c(1.0, 0.0));
        assert_relative_eq!(arc.sweep_angle().unwrap(), -PI, epsilon = 1e-12);
    }

    #[test]
    fn test_collinear_arc() {
        let arc = CircularArc::new(c(0.0, 0.0), c(1.0, 1.0), c(2.0, 2.0));
        assert!(arc.is_collinear());
        let mut coords = vec![arc.start];
        arc.extend_linearized(&Tessellation::default(), &mut coords);
        assert_eq!(coords, vec![c(0.0, 0.0), c(1.0, 1.0), c(2.0, 2.0)]);
    }

    #[test]
    fn test_near_closed_three_point_circle() {
        let tessellation = Tessellation::default();
        let exact = CircularArc::new(c(1.0, 0.0), c(-1.0, 0.0), c(1.0, 0.0));
        let exact_line = ArcString::try_new(vec![exact.start, exact.mid, exact.end])
            .unwrap()
            .linearize(&tessellation);

        for end in [c(1.0 + 1e-7, 1e-7), c(1.0 + 1e-7, 0.0), c(1.0, -2e-7)] {
            let arc = CircularArc::new(c(1.0, 0.0), c(-1.0, 0.0), end);
            assert!(arc.is_full_circle());
            assert_relative_eq!(arc.radius().unwrap(), 1.0, epsilon = 1e-12);
            assert_relative_eq!(arc.sweep_angle().unwrap(), TAU, epsilon = 1e-12);

            let rect = arc.bounding_rect();
            assert_relative_eq!(rect.min().x, -1.0, epsilon = 1e-6);
            assert_relative_eq!(rect.min().y, -1.0, epsilon = 1e-6);
            assert_relative_eq!(rect.max().x, 1.0, epsilon = 1e-6);
            assert_relative_eq!(rect.max().y, 1.0, epsilon = 1e-6);

            let ring = ArcString::try_new(vec![arc.start, arc.mid, arc.end]).unwrap();
            assert!(ring.is_ring());
            let line = ring.linearize(&tessellation);
            assert_eq!(line.0.len(), exact_line.0.len());
            assert_eq!(line.0.last(), Some(&end));
        }
    }

    #[test]
    fn test_arc_bounding_rect_includes_extremes() {
        let arc = CircularArc::new(c(1.0, 0.0), c(0.0, 1.0), c(-1.0, 0.0));
        let rect = arc.bounding_rect();
        assert_relative_eq!(rect.min().x, -1.0, epsilon = 1e-9);
        assert_relative_eq!(rect.max().x, 1.0, epsilon = 1e-9);
        assert_relative_eq!(rect.min().y, 0.0, epsilon = 1e-9);
        assert_relative_eq!(rect.max().y, 1.0, epsilon = 1e-9);

        // quarter arc whose mid control point is not the apex
        let s = (0.5f64).sqrt();
        let mid = c((PI / 8.0).cos(), (PI / 8.0).sin());
        let arc = CircularArc::new(c(s, -s), mid, c(s, s));
        assert_relative_eq!(arc.bounding_rect().max().x, 1.0, epsilon = 1e-9);
    }

    #[test]
    fn test_linearize_keeps_endpoints() {
        let arc = ArcString::try_new(vec![c(0.0, 0.0), c(1.0, 1.0), c(2.0, 0.0)]).unwrap();
        let line = arc.linearize(&Tessellation::default());
        assert_eq!(line.0.first(), Some(&c(0.0, 0.0)));
        assert_eq!(line.0.last(), Some(&c(2.0, 0.0)));
        assert!(line.0.len() > 3);

        let center = c(1.0, 0.0);
        for p in &line.0 {
            assert_relative_eq!(coord_distance(*p, center), 1.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_default_segments_per_quadrant() {
        let arc = ArcString::try_new(vec![c(1.0, 0.0), c(0.0, 1.0), c(-1.0, 0.0)]).unwrap();
        let line = arc.linearize(&Tessellation::default());
        // half circle = 2 quadrants of 12 segments
        assert_eq!(line.0.len(), 2 * DEFAULT_SEGMENTS_PER_QUADRANT as usize + 1);
    }

    #[test]
    fn test_resolution_bounds_chord_error() {
        let tessellation = Tessellation::with_resolution(0.01);
        let step = tessellation.step_angle(10.0);
        let sagitta = 10.0 * (1.0 - (step / 2.0).cos());
        assert!(sagitta <= 0.01 + 1e-12);

        let coarse = Tessellation::with_resolution(100.0);
        assert_relative_eq!(coarse.step_angle(1.0), FRAC_PI_2);
    }

    #[test]
    fn test_tessellation_validation() {
        assert!(Tessellation::with_resolution(-1.0).validate().is_err());
        assert!(Tessellation::with_resolution(f64::NAN).validate().is_err());
        assert!(Tessellation::with_resolution(0.0).validate().is_ok());
    }

    #[test]
    fn test_closed_arc_string_is_ring() {
        let circle = ArcString::try_new(vec![
            c(1.0, 0.0),
            c(0.0, 1.0),
            c(-1.0, 0.0),
            c(0.0, -1.0),
            c(1.0, 0.0),
        ])
        .unwrap();
        assert!(circle.is_ring());
        assert_eq!(circle.num_arcs(), 2);

        let open = ArcString::try_new(vec![c(0.0, 0.0), c(1.0, 1.0), c(2.0, 0.0)]).unwrap();
        assert!(!open.is_ring());
        assert!(ArcString::empty().is_ring());
    }
}
