mod builder;
mod collect;
mod config;
mod error;
mod flatten;
mod geometry;
mod overlay;

pub use builder::GeometryBuilder;
pub use collect::build_geometry;
pub use config::CurveConfig;
pub use error::*;
pub use flatten::{has_curvature, CurveFlattener};
pub use geometry::*;
pub use overlay::{CurvedOverlay, GeoOverlay, OverlayEngine, OverlayOp};
