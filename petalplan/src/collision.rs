//! Collision-geometry boundary.
//!
//! The planner never owns neighbor geometry; it consumes a read-only
//! snapshot through [`CollisionGeometry`]. Implementations must stay
//! immutable for the duration of one planning cycle so concurrent planner
//! workers all see the same world.

use crate::error::{Error, Result};
use petalkin::FlatPoint;

/// Ordered vertex list describing a positioner body or arm outline.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Polygon {
    /// Outline vertices, in order. Not required to repeat the first vertex.
    pub vertices: Vec<FlatPoint>,
}

impl Polygon {
    /// Build from a vertex list.
    pub fn new(vertices: Vec<FlatPoint>) -> Self {
        Self { vertices }
    }

    /// Whether any vertex lies within `tolerance` of a point predicate.
    pub fn any_vertex<F: Fn(FlatPoint) -> bool>(&self, hit: F) -> bool {
        self.vertices.iter().copied().any(hit)
    }
}

/// Read-only neighbor-occupancy snapshot consumed by the pathfinder.
///
/// `Send + Sync` so one snapshot can back a whole pool cycle behind an
/// `Arc`.
pub trait CollisionGeometry: Send + Sync {
    /// Whether `point` lies within `tolerance` (mm) of any neighbor's
    /// occupied point set.
    fn point_in_neighbor_sweep(&self, point: FlatPoint, tolerance: f64) -> bool;

    /// Ids of the neighbors represented in this snapshot.
    fn neighbor_ids(&self) -> &[u32];

    /// Outline of this positioner's central body at a theta angle.
    fn body_polygon_at(&self, theta_deg: f64) -> Polygon;

    /// Outline of this positioner's eccentric arm at a joint configuration.
    fn arm_polygon_at(&self, theta_deg: f64, phi_deg: f64) -> Polygon;
}

/// [`CollisionGeometry`] backed by a static neighbor point cloud.
///
/// Body and arm outlines are generated from the owning positioner's arm
/// lengths: the body as a small square around the theta axis carrying the
/// central arm tip, the arm as a segment-shaped quad from elbow to fiber
/// tip.
#[derive(Clone, Debug)]
pub struct NeighborPointField {
    neighbor_ids: Vec<u32>,
    points: Vec<FlatPoint>,
    center: FlatPoint,
    r1: f64,
    r2: f64,
    half_width: f64,
}

impl NeighborPointField {
    /// Build a field for one positioner.
    ///
    /// `center` is the theta axis location in flat XY; `points` are the
    /// neighbors' occupied points; `half_width` is the arm half-width used
    /// when generating outlines.
    pub fn new(
        neighbor_ids: Vec<u32>,
        points: Vec<FlatPoint>,
        center: FlatPoint,
        r1: f64,
        r2: f64,
        half_width: f64,
    ) -> Result<Self> {
        if r1 <= 0.0 || r2 <= 0.0 || half_width <= 0.0 {
            return Err(Error::InvalidParameter(format!(
                "arm geometry must be positive (r1={r1}, r2={r2}, half_width={half_width})"
            )));
        }
        Ok(Self {
            neighbor_ids,
            points,
            center,
            r1,
            r2,
            half_width,
        })
    }

    /// A field with no neighbors at all (open floor around one positioner).
    pub fn empty(center: FlatPoint, r1: f64, r2: f64, half_width: f64) -> Result<Self> {
        Self::new(Vec::new(), Vec::new(), center, r1, r2, half_width)
    }

    fn elbow_at(&self, theta_deg: f64) -> FlatPoint {
        let t = theta_deg.to_radians();
        FlatPoint::new(
            self.center.x + self.r1 * t.cos(),
            self.center.y + self.r1 * t.sin(),
        )
    }
}

impl CollisionGeometry for NeighborPointField {
    fn point_in_neighbor_sweep(&self, point: FlatPoint, tolerance: f64) -> bool {
        self.points
            .iter()
            .any(|p| p.distance_to(&point) <= tolerance)
    }

    fn neighbor_ids(&self) -> &[u32] {
        &self.neighbor_ids
    }

    fn body_polygon_at(&self, theta_deg: f64) -> Polygon {
        // Quad along the central arm, from the theta axis to the elbow.
        let elbow = self.elbow_at(theta_deg);
        quad_between(self.center, elbow, self.half_width)
    }

    fn arm_polygon_at(&self, theta_deg: f64, phi_deg: f64) -> Polygon {
        let elbow = self.elbow_at(theta_deg);
        let a = (theta_deg + phi_deg).to_radians();
        let tip = FlatPoint::new(
            elbow.x + self.r2 * a.cos(),
            elbow.y + self.r2 * a.sin(),
        );
        quad_between(elbow, tip, self.half_width)
    }
}

/// Rectangle of half-width `w` along the segment from `a` to `b`.
fn quad_between(a: FlatPoint, b: FlatPoint, w: f64) -> Polygon {
    let d = b - a;
    let len = d.hypot();
    let (nx, ny) = if len > 0.0 {
        (-d.y / len * w, d.x / len * w)
    } else {
        (0.0, w)
    };
    Polygon::new(vec![
        FlatPoint::new(a.x + nx, a.y + ny),
        FlatPoint::new(b.x + nx, b.y + ny),
        FlatPoint::new(b.x - nx, b.y - ny),
        FlatPoint::new(a.x - nx, a.y - ny),
    ])
}
