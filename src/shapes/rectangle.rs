use crate::aabb::Aabb;
use crate::direction::Direction;
use crate::point::Point;
use crate::ray::Ray;
use crate::shapes::{sorted_positive_hits, Shape, ShapeHit, T_EPSILON};
use crate::vector::Vector2f;

/// Plane z=0, axis-aligned bounds normalized so `left < right`, `top < bottom`
/// (§4.C). UV is linear across the bounds rather than the disc's radial map.
pub struct Rectangle {
    left: f64,
    right: f64,
    top: f64,
    bottom: f64,
}

impl Rectangle {
    pub fn new(left: f64, right: f64, top: f64, bottom: f64) -> Rectangle {
        Rectangle {
            left: left.min(right),
            right: left.max(right),
            top: top.min(bottom),
            bottom: top.max(bottom),
        }
    }

    fn out_of_bounds(&self, p: Point) -> bool {
        p.x < self.left || p.x > self.right || p.y < self.top || p.y > self.bottom
    }
}

impl Shape for Rectangle {
    fn intersect(&self, ray: &Ray) -> Vec<ShapeHit> {
        if ray.direction.z.abs() < f64::EPSILON {
            return Vec::new();
        }
        let t = -ray.origin.z / ray.direction.z;
        let p = ray.point_at(t);
        if self.out_of_bounds(p) {
            return sorted_positive_hits(Vec::new());
        }
        let n = if ray.direction.z > 0.0 {
            Direction::new(0.0, 0.0, -1.0)
        } else {
            Direction::new(0.0, 0.0, 1.0)
        };
        let uv = Vector2f(
            (p.x - self.left) / (self.right - self.left),
            (p.y - self.top) / (self.bottom - self.top),
        );
        sorted_positive_hits(vec![ShapeHit::new(t, p, n, uv)])
    }

    fn is_inside(&self, _p: Point) -> bool {
        false
    }

    fn object_aabb(&self) -> Option<Aabb> {
        Some(Aabb::new(
            Point::new(self.left, self.top, -T_EPSILON),
            Point::new(self.right, self.bottom, T_EPSILON),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::*;

    #[test]
    fn normalizes_inverted_bounds() {
        let rect = Rectangle::new(1.0, -1.0, 1.0, -1.0);
        assert_approx_eq!(rect.left, -1.0);
        assert_approx_eq!(rect.bottom, 1.0);
    }

    #[test]
    fn hits_within_bounds() {
        let rect = Rectangle::new(-1.0, 1.0, -1.0, 1.0);
        let r = Ray::primary(Point::new(0.0, 0.0, -5.0), Direction::new(0.0, 0.0, 1.0));
        let hits = rect.intersect(&r);
        assert_eq!(hits.len(), 1);
        assert_approx_eq!(hits[0].uv, Vector2f(0.5, 0.5));
    }

    #[test]
    fn misses_outside_bounds() {
        let rect = Rectangle::new(-1.0, 1.0, -1.0, 1.0);
        let r = Ray::primary(Point::new(5.0, 0.0, -5.0), Direction::new(0.0, 0.0, 1.0));
        assert!(rect.intersect(&r).is_empty());
    }
}
