use crate::aabb::Aabb;
use crate::direction::Direction;
use crate::point::Point;
use crate::ray::Ray;
use crate::shapes::{sorted_positive_hits, Shape, ShapeHit, T_EPSILON};
use crate::vector::Vector2f;

/// Plane z=0 bounded by x²+y² ≤ 1 ("cookie" UV, §4.C/§4.D).
pub struct Disc;

impl Disc {
    pub fn new() -> Disc {
        Disc
    }
}

impl Default for Disc {
    fn default() -> Disc {
        Disc::new()
    }
}

impl Shape for Disc {
    fn intersect(&self, ray: &Ray) -> Vec<ShapeHit> {
        if ray.direction.z.abs() < f64::EPSILON {
            return Vec::new();
        }
        let t = -ray.origin.z / ray.direction.z;
        let p = ray.point_at(t);
        if p.x * p.x + p.y * p.y > 1.0 {
            return sorted_positive_hits(Vec::new());
        }
        let n = if ray.direction.z > 0.0 {
            Direction::new(0.0, 0.0, -1.0)
        } else {
            Direction::new(0.0, 0.0, 1.0)
        };
        let uv = Vector2f((p.x + 1.0) * 0.5, (p.y + 1.0) * 0.5);
        sorted_positive_hits(vec![ShapeHit::new(t, p, n, uv)])
    }

    fn is_inside(&self, _p: Point) -> bool {
        false
    }

    fn object_aabb(&self) -> Option<Aabb> {
        Some(Aabb::new(Point::new(-1.0, -1.0, -T_EPSILON), Point::new(1.0, 1.0, T_EPSILON)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::*;

    #[test]
    fn hits_within_radius() {
        let d = Disc::new();
        let r = Ray::primary(Point::new(0.0, 0.0, -5.0), Direction::new(0.0, 0.0, 1.0));
        let hits = d.intersect(&r);
        assert_eq!(hits.len(), 1);
        assert_approx_eq!(hits[0].t, 5.0);
        assert_approx_eq!(hits[0].normal, Direction::new(0.0, 0.0, -1.0));
    }

    #[test]
    fn misses_outside_radius() {
        let d = Disc::new();
        let r = Ray::primary(Point::new(2.0, 0.0, -5.0), Direction::new(0.0, 0.0, 1.0));
        assert!(d.intersect(&r).is_empty());
    }

    #[test]
    fn parallel_ray_misses() {
        let d = Disc::new();
        let r = Ray::primary(Point::new(0.0, 0.0, 1.0), Direction::new(0.0, 1.0, 0.0));
        assert!(d.intersect(&r).is_empty());
    }
}
