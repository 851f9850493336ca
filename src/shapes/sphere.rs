use std::f64;

use crate::aabb::Aabb;
use crate::direction::Dot;
use crate::point::Point;
use crate::ray::Ray;
use crate::shapes::{sorted_positive_hits, Shape, ShapeHit};
use crate::vector::Vector2f;

/// Unit sphere at the object-space origin (§4.C); world-space size and position
/// come entirely from the owning object's `Transform`.
pub struct Sphere;

impl Sphere {
    pub fn new() -> Sphere {
        Sphere
    }

    fn hit_for_t(&self, ray: &Ray, t: f64) -> ShapeHit {
        let p = ray.point_at(t);
        let n = p.to_dir().normalize();
        let u = (1.0 - n.x.atan2(n.z) / (2.0 * f64::consts::PI)) + 0.5;
        let u = u.rem_euclid(1.0);
        let v = n.y.max(-1.0).min(1.0).asin() / f64::consts::PI + 0.5;
        ShapeHit::new(t, p, n, Vector2f(u, v))
    }
}

impl Default for Sphere {
    fn default() -> Sphere {
        Sphere::new()
    }
}

/// Numerically stable quadratic solver (avoids cancellation when `b` and the
/// discriminant's root are close in magnitude).
pub fn solve_quadratic(a: f64, b: f64, c: f64) -> Option<(f64, f64)> {
    let discr = b * b - 4.0 * a * c;
    if discr < 0.0 {
        return None;
    }
    if discr == 0.0 {
        let x = -0.5 * b / a;
        return Some((x, x));
    }
    let q = if b > 0.0 {
        -0.5 * (b + discr.sqrt())
    } else {
        -0.5 * (b - discr.sqrt())
    };
    let (t0, t1) = (q / a, c / q);
    if t0 <= t1 {
        Some((t0, t1))
    } else {
        Some((t1, t0))
    }
}

impl Shape for Sphere {
    fn intersect(&self, ray: &Ray) -> Vec<ShapeHit> {
        let o = ray.origin.to_dir();
        let a = ray.direction.dot(ray.direction);
        let b = 2.0 * ray.direction.dot(o);
        let c = o.dot(o) - 1.0;

        let hits = match solve_quadratic(a, b, c) {
            Some((t0, t1)) => vec![self.hit_for_t(ray, t0), self.hit_for_t(ray, t1)],
            None => Vec::new(),
        };
        sorted_positive_hits(hits)
    }

    fn is_inside(&self, p: Point) -> bool {
        p.to_dir().length_squared() < 1.0
    }

    fn object_aabb(&self) -> Option<Aabb> {
        Some(Aabb::unit_cube())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::direction::Direction;
    use crate::test_utils::*;

    #[test]
    fn outside_intersection() {
        let s = Sphere::new();
        let r = Ray::primary(Point::new(0.0, 0.0, -5.0), Direction::new(0.0, 0.0, 1.0));
        let hits = s.intersect(&r);
        assert_eq!(hits.len(), 2);
        assert_approx_eq!(hits[0].t, 4.0);
        assert_approx_eq!(hits[0].point, Point::new(0.0, 0.0, -1.0));
        assert_approx_eq!(hits[0].normal, Direction::new(0.0, 0.0, -1.0));
        assert_approx_eq!(hits[1].t, 6.0);
    }

    #[test]
    fn tangent_ray_grazes() {
        let s = Sphere::new();
        let r = Ray::primary(Point::new(1.0, 0.0, -5.0), Direction::new(0.0, 0.0, 1.0));
        let hits = s.intersect(&r);
        assert_eq!(hits.len(), 2);
        assert_approx_eq!(hits[0].t, hits[1].t);
    }

    #[test]
    fn ray_originating_inside_returns_one_forward_hit() {
        let s = Sphere::new();
        let r = Ray::primary(Point::new(0.0, 0.0, 0.9), Direction::new(0.0, 0.0, -1.0));
        let hits = s.intersect(&r);
        assert_eq!(hits.len(), 1);
        assert_approx_eq!(hits[0].t, 1.9);
    }

    #[test]
    fn miss_returns_empty() {
        let s = Sphere::new();
        let r = Ray::primary(Point::new(5.0, 5.0, -5.0), Direction::new(0.0, 0.0, 1.0));
        assert!(s.intersect(&r).is_empty());
    }

    #[test]
    fn is_inside_matches_radius() {
        let s = Sphere::new();
        assert!(s.is_inside(Point::new(0.0, 0.0, 0.0)));
        assert!(!s.is_inside(Point::new(2.0, 0.0, 0.0)));
    }
}
