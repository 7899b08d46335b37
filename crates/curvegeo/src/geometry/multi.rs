use super::GeometryRef;

/// An ordered set of curve-capable geometries. Members are not revalidated.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MultiCurve {
    curves: Vec<GeometryRef>,
}

impl MultiCurve {
    /// Wrap `curves` as given.
    pub fn new(curves: Vec<GeometryRef>) -> Self {
        Self { curves }
    }

    /// The member curves in order.
    pub fn curves(&self) -> &[GeometryRef] {
        &self.curves
    }

    /// Number of members.
    pub fn len(&self) -> usize {
        self.curves.len()
    }

    /// True when every member is empty.
    pub fn is_empty(&self) -> bool {
        self.curves.iter().all(|c| c.is_empty())
    }
}

/// An ordered set of surface-capable geometries. Members are not revalidated.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MultiSurface {
    surfaces: Vec<GeometryRef>,
}

impl MultiSurface {
    /// Wrap `surfaces` as given.
    pub fn new(surfaces: Vec<GeometryRef>) -> Self {
        Self { surfaces }
    }

    /// The member surfaces in order.
    pub fn surfaces(&self) -> &[GeometryRef] {
        &self.surfaces
    }

    /// Number of members.
    pub fn len(&self) -> usize {
        self.surfaces.len()
    }

    /// True when every member is empty.
    pub fn is_empty(&self) -> bool {
        self.surfaces.iter().all(|s| s.is_empty())
    }
}

/// Fallback container for arbitrary, possibly missing, members.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct GeometryCollection {
    members: Vec<Option<GeometryRef>>,
}

impl GeometryCollection {
    /// Wrap `members` as given, missing entries included.
    pub fn new(members: Vec<Option<GeometryRef>>) -> Self {
        Self { members }
    }

    /// The members in order; `None` marks a missing member.
    pub fn members(&self) -> &[Option<GeometryRef>] {
        &self.members
    }

    /// Number of members, missing ones included.
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// True when every member is missing or empty.
    pub fn is_empty(&self) -> bool {
        self.members.iter().flatten().all(|m| m.is_empty())
    }
}
