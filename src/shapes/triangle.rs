use crate::aabb::Aabb;
use crate::color::Color;
use crate::direction::{Direction, Dot};
use crate::point::Point;
use crate::ray::Ray;
use crate::shapes::{sorted_positive_hits, Shape, ShapeHit};
use crate::vector::Vector2f;

/// Möller-Trumbore triangle with optional per-vertex diffuse colour (§4.C).
/// When `vertex_colors` is set, the hit's diffuse colour is the barycentric
/// blend of the three vertex colours rather than the owning material's.
pub struct Triangle {
    vertices: [Point; 3],
    normal: Direction,
    vertex_colors: Option<[Color; 3]>,
}

impl Triangle {
    pub fn new(v0: Point, v1: Point, v2: Point) -> Triangle {
        let normal = (v1 - v0).cross(v2 - v0).normalize();
        Triangle { vertices: [v0, v1, v2], normal, vertex_colors: None }
    }

    pub fn with_vertex_colors(mut self, colors: [Color; 3]) -> Triangle {
        self.vertex_colors = Some(colors);
        self
    }

    /// Barycentric weights of `p` (assumed coplanar) via the sub-triangle-area
    /// ratio, each sub-area computed by Heron's formula from its three side
    /// lengths. Equivalent to the Möller-Trumbore u/v but derived
    /// independently from the world point rather than reused, so it stays
    /// correct if a caller only has the hit point on hand.
    fn barycentric_weights(&self, p: Point) -> (f64, f64, f64) {
        let [v0, v1, v2] = self.vertices;
        let area = |a: Point, b: Point, c: Point| -> f64 {
            let (ab, bc, ca) = ((b - a).length(), (c - b).length(), (a - c).length());
            let s = (ab + bc + ca) * 0.5;
            (s * (s - ab) * (s - bc) * (s - ca)).max(0.0).sqrt()
        };
        let total = area(v0, v1, v2).max(f64::EPSILON);
        let b0 = area(p, v1, v2) / total;
        let b1 = area(v0, p, v2) / total;
        let b2 = area(v0, v1, p) / total;
        (b0, b1, b2)
    }
}

impl Shape for Triangle {
    fn intersect(&self, ray: &Ray) -> Vec<ShapeHit> {
        let [v0, v1, v2] = self.vertices;
        let v0v1 = v1 - v0;
        let v0v2 = v2 - v0;
        let p = ray.direction.cross(v0v2);
        let det = v0v1.dot(p);
        if det.abs() < f64::EPSILON {
            return Vec::new();
        }
        let inv_det = 1.0 / det;

        let tvec = ray.origin - v0;
        let u = tvec.dot(p) * inv_det;
        if !(0.0..=1.0).contains(&u) {
            return Vec::new();
        }

        let qvec = tvec.cross(v0v1);
        let v = ray.direction.dot(qvec) * inv_det;
        if v < 0.0 || u + v > 1.0 {
            return Vec::new();
        }

        let t = v0v2.dot(qvec) * inv_det;
        let hit_point = ray.point_at(t);
        let mut hit = ShapeHit::new(t, hit_point, self.normal, Vector2f(u, v));
        if let Some(colors) = self.vertex_colors {
            let (b0, b1, b2) = self.barycentric_weights(hit_point);
            hit = hit.with_vertex_color(colors[0] * b0 + colors[1] * b1 + colors[2] * b2);
        }
        sorted_positive_hits(vec![hit])
    }

    fn is_inside(&self, _p: Point) -> bool {
        false
    }

    fn object_aabb(&self) -> Option<Aabb> {
        let [v0, v1, v2] = self.vertices;
        let min = Point::new(v0.x.min(v1.x).min(v2.x), v0.y.min(v1.y).min(v2.y), v0.z.min(v1.z).min(v2.z));
        let max = Point::new(v0.x.max(v1.x).max(v2.x), v0.y.max(v1.y).max(v2.y), v0.z.max(v1.z).max(v2.z));
        Some(Aabb::new(min, max))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::*;

    #[test]
    fn hits_within_triangle() {
        let tri = Triangle::new(
            Point::new(-1.0, -1.0, 0.0),
            Point::new(1.0, -1.0, 0.0),
            Point::new(0.0, 1.0, 0.0),
        );
        let r = Ray::primary(Point::new(0.0, 0.0, -5.0), Direction::new(0.0, 0.0, 1.0));
        let hits = tri.intersect(&r);
        assert_eq!(hits.len(), 1);
        assert_approx_eq!(hits[0].t, 5.0);
    }

    #[test]
    fn misses_outside_edges() {
        let tri = Triangle::new(
            Point::new(-1.0, -1.0, 0.0),
            Point::new(1.0, -1.0, 0.0),
            Point::new(0.0, 1.0, 0.0),
        );
        let r = Ray::primary(Point::new(5.0, 5.0, -5.0), Direction::new(0.0, 0.0, 1.0));
        assert!(tri.intersect(&r).is_empty());
    }

    #[test]
    fn vertex_colours_blend_to_centroid() {
        let tri = Triangle::new(
            Point::new(-1.0, -1.0, 0.0),
            Point::new(1.0, -1.0, 0.0),
            Point::new(0.0, 1.0, 0.0),
        )
        .with_vertex_colors([Color::red(), Color::green(), Color::blue()]);
        let r = Ray::primary(Point::new(0.0, -1.0 / 3.0, -5.0), Direction::new(0.0, 0.0, 1.0));
        let hits = tri.intersect(&r);
        let c = hits[0].vertex_color.expect("expected a vertex colour");
        assert_approx_eq!(c.r, 1.0 / 3.0);
        assert_approx_eq!(c.g, 1.0 / 3.0);
        assert_approx_eq!(c.b, 1.0 / 3.0);
    }
}
