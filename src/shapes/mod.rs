use crate::aabb::Aabb;
use crate::color::Color;
use crate::direction::Direction;
use crate::point::Point;
use crate::ray::Ray;
use crate::vector::Vector2f;

pub mod cone;
pub mod cylinder;
pub mod disc;
pub mod mesh;
pub mod polygon;
pub mod rectangle;
pub mod sphere;
pub mod triangle;

pub use self::cone::{CappedCone, Cone};
pub use self::cylinder::{CappedCylinder, Cylinder};
pub use self::disc::Disc;
pub use self::mesh::PolyMesh;
pub use self::polygon::Polygon;
pub use self::rectangle::Rectangle;
pub use self::sphere::Sphere;
pub use self::triangle::Triangle;

/// Self-intersection guard: the nearest-hit policy (§4.C) requires t strictly
/// positive, with a small epsilon so a reflection/shadow ray cast from a
/// surface doesn't immediately re-hit the surface it was cast from.
pub const T_EPSILON: f64 = 1e-6;

/// One object-space hit produced by a single shape's `intersect`. `material_index`
/// selects into the owning `Object`'s material list — index 0 is the shape's
/// primary material; capped cylinders/cones and per-face meshes use higher
/// indices for cap/face overrides (§4.C).
#[derive(Debug, Clone, Copy)]
pub struct ShapeHit {
    pub t: f64,
    pub point: Point,
    pub normal: Direction,
    pub uv: Vector2f,
    pub material_index: usize,
    /// Per-vertex interpolated colour (Triangle only, §4.C), used in place of
    /// the owning material's diffuse field when present.
    pub vertex_color: Option<Color>,
}

impl ShapeHit {
    pub fn new(t: f64, point: Point, normal: Direction, uv: Vector2f) -> ShapeHit {
        ShapeHit { t, point, normal, uv, material_index: 0, vertex_color: None }
    }

    pub fn with_material(mut self, material_index: usize) -> ShapeHit {
        self.material_index = material_index;
        self
    }

    pub fn with_vertex_color(mut self, color: Color) -> ShapeHit {
        self.vertex_color = Some(color);
        self
    }
}

/// Sum type over the primitives in §4.C. Each shape's `intersect` operates on
/// an **object-space** ray — the `Object` that owns the shape is responsible
/// for transforming the world ray first (§4.C).
pub trait Shape: Send + Sync {
    /// Every positive-t hit, ascending by t. The nearest-hit policy and the
    /// "other hits" bookkeeping used by transparency traversal both live one
    /// level up, in `Scene::test_intersect`, since transparency traversal
    /// walks across *different* shapes along one ray, not just one shape's
    /// own multiple intersections (e.g. a sphere's near/far hits).
    fn intersect(&self, ray: &Ray) -> Vec<ShapeHit>;

    fn is_inside(&self, p: Point) -> bool;

    /// `None` when the shape has no finite bound (not used by any primitive in
    /// this crate, but kept per §3's "shapes without a computable AABB are
    /// pinned to the enclosing octree node" invariant).
    fn object_aabb(&self) -> Option<Aabb>;
}

/// Sort a shape's raw intersections by t and drop everything at or below the
/// epsilon guard. Shared by every primitive's `intersect` so the policy in
/// §4.C ("return the record for the nearest positive t... others sorted by t")
/// is enforced in exactly one place.
pub fn sorted_positive_hits(mut hits: Vec<ShapeHit>) -> Vec<ShapeHit> {
    hits.retain(|h| h.t > T_EPSILON);
    hits.sort_by(|a, b| a.t.partial_cmp(&b.t).unwrap());
    hits
}
