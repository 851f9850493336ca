use crate::color::Color;
use crate::direction::{Direction, Dot};
use crate::point::Point;
use crate::ray::Ray;
use crate::transform::Transform;
use crate::vector::Vector2f;

/// A hit further along the same ray than the primary one, kept around so the
/// shading model's transparency traversal (§4.G step 6) can walk through it
/// without re-querying the scene. Carries only the object-space fields needed
/// to reconstruct a full `IntersectionResult` lazily, via `next_along_ray`.
#[derive(Debug, Clone, Copy)]
pub struct OtherHit {
    pub t: f64,
    pub object_point: Point,
    pub object_normal: Direction,
    pub object_index: usize,
    /// Selects into the hit object's material list (cap/face overrides, §4.C).
    pub material_index: usize,
    /// Per-vertex interpolated colour (Triangle/PolyMesh only, §4.C).
    pub vertex_color: Option<Color>,
    /// Surface parameterization, used to sample the material's textures.
    pub uv: Vector2f,
}

/// The record the whole rendering pipeline is built around (§3). Created by
/// `Scene::test_intersect`, which gathers every positive-t hit along a ray
/// across every candidate shape, keeps the nearest as the primary record and
/// the rest — ascending by t — as `other_hits`. `point`/`normal`/`shifted_point`
/// /`reflect_count` start unset and are filled in by the lighting model as it
/// resolves the hit into world space (§4.G steps 1-2).
#[derive(Debug, Clone)]
pub struct IntersectionResult {
    pub t: f64,
    pub object_point: Point,
    pub object_normal: Direction,
    pub ray: Ray,
    pub object_index: usize,
    pub material_index: usize,
    pub vertex_color: Option<Color>,
    pub uv: Vector2f,
    pub other_hits: Vec<OtherHit>,

    pub point: Option<Point>,
    pub normal: Option<Direction>,
    pub shifted_point: Option<Point>,
    pub reflect_count: u32,
}

impl IntersectionResult {
    pub fn new(
        t: f64,
        object_point: Point,
        object_normal: Direction,
        ray: Ray,
        object_index: usize,
        other_hits: Vec<OtherHit>,
    ) -> IntersectionResult {
        IntersectionResult::with_material(t, object_point, object_normal, ray, object_index, 0, None, Vector2f(0.0, 0.0), other_hits)
    }

    #[allow(clippy::too_many_arguments)]
    pub fn with_material(
        t: f64,
        object_point: Point,
        object_normal: Direction,
        ray: Ray,
        object_index: usize,
        material_index: usize,
        vertex_color: Option<Color>,
        uv: Vector2f,
        other_hits: Vec<OtherHit>,
    ) -> IntersectionResult {
        IntersectionResult {
            t,
            object_point,
            object_normal,
            ray,
            object_index,
            material_index,
            vertex_color,
            uv,
            other_hits,
            point: None,
            normal: None,
            shifted_point: None,
            reflect_count: 0,
        }
    }

    /// Reverse-transform the hit into world space (§4.G step 1): world point
    /// from the ray parametric form, world normal via the owning shape's
    /// inverse-transpose. Idempotent; safe to call more than once.
    pub fn resolve_world(&mut self, tx: &Transform) {
        if self.point.is_none() {
            self.point = Some(self.ray.point_at(self.t));
        }
        if self.normal.is_none() {
            self.normal = Some(tx.normal_to_world(self.object_normal).normalize());
        }
    }

    pub fn world_point(&self) -> Point {
        self.point.unwrap_or_else(|| self.ray.point_at(self.t))
    }

    /// The point shadow/reflection rays are cast from (§4.G step 2); falls
    /// back to the unshifted world point if `shift_point` hasn't run yet.
    pub fn world_shifted_point(&self) -> Point {
        self.shifted_point.unwrap_or_else(|| self.world_point())
    }

    /// Bias the hit point off the surface along the normal to prevent
    /// self-intersection acne on the next cast (§4.G step 2):
    /// `shift = epsilon . sign(dot(ray.dir, normal))`.
    pub fn shift_point(&mut self, epsilon: f64) {
        let n = self.world_normal();
        let sign = if self.ray.direction.dot(n) >= 0.0 { 1.0 } else { -1.0 };
        self.shifted_point = Some(self.world_point() + n * (epsilon * sign));
    }

    pub fn world_normal(&self) -> Direction {
        self.normal.expect("resolve_world must be called before world_normal")
    }

    /// Pop the next hit along the same ray (by ascending t), if any, as a fresh
    /// `IntersectionResult` carrying the remaining tail as its own `other_hits`.
    pub fn next_along_ray(&self) -> Option<IntersectionResult> {
        self.other_hits.first().map(|h| {
            IntersectionResult::with_material(
                h.t,
                h.object_point,
                h.object_normal,
                self.ray,
                h.object_index,
                h.material_index,
                h.vertex_color,
                h.uv,
                self.other_hits[1..].to_vec(),
            )
        })
    }

    pub fn has_further_hits(&self) -> bool {
        !self.other_hits.is_empty()
    }
}
