use std::f64;

use crate::aabb::Aabb;
use crate::direction::Direction;
use crate::point::Point;
use crate::ray::Ray;
use crate::shapes::cylinder::cylindrical_u;
use crate::shapes::sphere::solve_quadratic;
use crate::shapes::{sorted_positive_hits, Shape, ShapeHit, T_EPSILON};
use crate::vector::Vector2f;

/// Cone with apex at the object-space origin, axis Y, opening strip
/// y ∈ [y_top, y_bottom] (§4.C). Defaults to (0, 1); construction rejects
/// `y_top >= y_bottom` since the source is inconsistent about the default and
/// an inverted strip has no sensible interpretation.
pub struct Cone {
    y_top: f64,
    y_bottom: f64,
}

impl Cone {
    pub fn new(y_top: f64, y_bottom: f64) -> Cone {
        assert!(y_top < y_bottom, "cone y_top must be strictly less than y_bottom");
        Cone { y_top, y_bottom }
    }

    fn body_hits(&self, ray: &Ray) -> Vec<ShapeHit> {
        let o = ray.origin;
        let d = ray.direction;
        let a = d.x * d.x + d.z * d.z - d.y * d.y;
        let b = 2.0 * (o.x * d.x + o.z * d.z - o.y * d.y);
        let c = o.x * o.x + o.z * o.z - o.y * o.y;

        match solve_quadratic(a, b, c) {
            Some((t0, t1)) => [t0, t1]
                .iter()
                .filter_map(|&t| self.body_hit_at(ray, t))
                .collect(),
            None => Vec::new(),
        }
    }

    fn body_hit_at(&self, ray: &Ray, t: f64) -> Option<ShapeHit> {
        let p = ray.point_at(t);
        if p.y < self.y_top || p.y > self.y_bottom {
            return None;
        }
        let n = Direction::new(p.x, 0.0, p.z).normalize();
        let u = cylindrical_u(p.x, p.z);
        let v = (p.y - self.y_top) / (self.y_bottom - self.y_top);
        Some(ShapeHit::new(t, p, n, Vector2f(u, v)))
    }

    fn cap_hit(&self, ray: &Ray, y: f64, material_index: usize) -> Option<ShapeHit> {
        if ray.direction.y.abs() < f64::EPSILON {
            return None;
        }
        let t = (y - ray.origin.y) / ray.direction.y;
        if t <= T_EPSILON {
            return None;
        }
        let p = ray.point_at(t);
        let radius = y.abs();
        if p.x * p.x + p.z * p.z > radius * radius {
            return None;
        }
        let n = Direction::new(0.0, y.signum(), 0.0);
        let uv = Vector2f((p.x / radius.max(f64::EPSILON) + 1.0) * 0.5, (p.z / radius.max(f64::EPSILON) + 1.0) * 0.5);
        Some(ShapeHit::new(t, p, n, uv).with_material(material_index))
    }
}

impl Shape for Cone {
    fn intersect(&self, ray: &Ray) -> Vec<ShapeHit> {
        sorted_positive_hits(self.body_hits(ray))
    }

    fn is_inside(&self, p: Point) -> bool {
        p.x * p.x + p.z * p.z < p.y * p.y && p.y > self.y_top && p.y < self.y_bottom
    }

    fn object_aabb(&self) -> Option<Aabb> {
        let r = self.y_top.abs().max(self.y_bottom.abs());
        Some(Aabb::new(
            Point::new(-r, self.y_top, -r),
            Point::new(r, self.y_bottom, r),
        ))
    }
}

/// Cone body plus up to two disc caps: bottom always present (material 2), top
/// omitted when `y_top <= 0` since the apex degenerates to a point there.
pub struct CappedCone {
    body: Cone,
}

impl CappedCone {
    pub fn new(y_top: f64, y_bottom: f64) -> CappedCone {
        CappedCone { body: Cone::new(y_top, y_bottom) }
    }
}

impl Shape for CappedCone {
    fn intersect(&self, ray: &Ray) -> Vec<ShapeHit> {
        let mut hits = self.body.body_hits(ray);
        if self.body.y_top > 0.0 {
            hits.extend(self.body.cap_hit(ray, self.body.y_top, 1));
        }
        hits.extend(self.body.cap_hit(ray, self.body.y_bottom, 2));
        sorted_positive_hits(hits)
    }

    fn is_inside(&self, p: Point) -> bool {
        self.body.is_inside(p)
    }

    fn object_aabb(&self) -> Option<Aabb> {
        self.body.object_aabb()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::*;

    #[test]
    fn rejects_inverted_strip() {
        let result = std::panic::catch_unwind(|| Cone::new(1.0, 0.0));
        assert!(result.is_err());
    }

    #[test]
    fn default_strip_hits_body() {
        let c = Cone::new(0.0, 1.0);
        let r = Ray::primary(Point::new(0.0, 0.5, -5.0), Direction::new(0.0, 0.0, 1.0));
        let hits = c.intersect(&r);
        assert_eq!(hits.len(), 2);
        assert_approx_eq!(hits[0].t, 4.5);
    }

    #[test]
    fn capped_cone_omits_top_cap_at_apex() {
        let c = CappedCone::new(0.0, 1.0);
        let r = Ray::primary(Point::new(0.0, 2.0, 0.0), Direction::new(0.0, -1.0, 0.0));
        let hits = c.intersect(&r);
        // Only the bottom cap (material 2) and the two body hits (apex + far side) are expected.
        assert!(hits.iter().any(|h| h.material_index == 2));
        assert!(!hits.iter().any(|h| h.material_index == 1));
    }
}
