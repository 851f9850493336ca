use std::f64;

use crate::aabb::Aabb;
use crate::point::Point;
use crate::ray::Ray;
use crate::shapes::sphere::solve_quadratic;
use crate::shapes::{sorted_positive_hits, Shape, ShapeHit, T_EPSILON};
use crate::vector::Vector2f;

const HALF_HEIGHT: f64 = 0.5;

/// Finite cylinder, unit radius, axis Y, body only (no caps). Object-space:
/// x² + z² = 1, y ∈ [-½, ½] (§4.C).
pub struct Cylinder;

impl Cylinder {
    pub fn new() -> Cylinder {
        Cylinder
    }

    fn body_hits(ray: &Ray) -> Vec<ShapeHit> {
        let o = ray.origin;
        let d = ray.direction;
        let a = d.x * d.x + d.z * d.z;
        if a.abs() < f64::EPSILON {
            return Vec::new();
        }
        let b = 2.0 * (o.x * d.x + o.z * d.z);
        let c = o.x * o.x + o.z * o.z - 1.0;

        match solve_quadratic(a, b, c) {
            Some((t0, t1)) => [t0, t1]
                .iter()
                .filter_map(|&t| body_hit_at(ray, t))
                .collect(),
            None => Vec::new(),
        }
    }
}

impl Default for Cylinder {
    fn default() -> Cylinder {
        Cylinder::new()
    }
}

fn body_hit_at(ray: &Ray, t: f64) -> Option<ShapeHit> {
    let p = ray.point_at(t);
    if p.y < -HALF_HEIGHT || p.y > HALF_HEIGHT {
        return None;
    }
    let n = crate::direction::Direction::new(p.x, 0.0, p.z).normalize();
    let u = cylindrical_u(n.x, n.z);
    let v = p.y + 0.5;
    Some(ShapeHit::new(t, p, n, Vector2f(u, v)))
}

/// Shared by Cylinder and Cone: angular coordinate around the Y axis.
pub fn cylindrical_u(x: f64, z: f64) -> f64 {
    let u = 1.0 - x.atan2(z) / (2.0 * f64::consts::PI) + 0.5;
    u.rem_euclid(1.0)
}

impl Shape for Cylinder {
    fn intersect(&self, ray: &Ray) -> Vec<ShapeHit> {
        sorted_positive_hits(Cylinder::body_hits(ray))
    }

    fn is_inside(&self, p: Point) -> bool {
        p.x * p.x + p.z * p.z < 1.0 && p.y > -HALF_HEIGHT && p.y < HALF_HEIGHT
    }

    fn object_aabb(&self) -> Option<Aabb> {
        Some(Aabb::new(
            Point::new(-1.0, -HALF_HEIGHT, -1.0),
            Point::new(1.0, HALF_HEIGHT, 1.0),
        ))
    }
}

fn cap_hit(ray: &Ray, y: f64, material_index: usize) -> Option<ShapeHit> {
    if ray.direction.y.abs() < f64::EPSILON {
        return None;
    }
    let t = (y - ray.origin.y) / ray.direction.y;
    if t <= T_EPSILON {
        return None;
    }
    let p = ray.point_at(t);
    if p.x * p.x + p.z * p.z > 1.0 {
        return None;
    }
    let n = crate::direction::Direction::new(0.0, y.signum(), 0.0);
    let uv = Vector2f((p.x + 1.0) * 0.5, (p.z + 1.0) * 0.5);
    Some(ShapeHit::new(t, p, n, uv).with_material(material_index))
}

/// Cylinder body plus top (y=½, material 1) and bottom (y=-½, material 2) caps.
pub struct CappedCylinder {
    body: Cylinder,
}

impl CappedCylinder {
    pub fn new() -> CappedCylinder {
        CappedCylinder { body: Cylinder::new() }
    }
}

impl Default for CappedCylinder {
    fn default() -> CappedCylinder {
        CappedCylinder::new()
    }
}

impl Shape for CappedCylinder {
    fn intersect(&self, ray: &Ray) -> Vec<ShapeHit> {
        let mut hits = Cylinder::body_hits(ray);
        hits.extend(cap_hit(ray, HALF_HEIGHT, 1));
        hits.extend(cap_hit(ray, -HALF_HEIGHT, 2));
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
    use crate::direction::Direction;
    use crate::test_utils::*;

    #[test]
    fn side_hit() {
        let c = Cylinder::new();
        let r = Ray::primary(Point::new(0.0, 0.0, -5.0), Direction::new(0.0, 0.0, 1.0));
        let hits = c.intersect(&r);
        assert_eq!(hits.len(), 2);
        assert_approx_eq!(hits[0].t, 4.0);
        assert_approx_eq!(hits[0].normal, Direction::new(0.0, 0.0, -1.0));
    }

    #[test]
    fn above_height_misses_body() {
        let c = Cylinder::new();
        let r = Ray::primary(Point::new(0.0, 2.0, -5.0), Direction::new(0.0, 0.0, 1.0));
        assert!(c.intersect(&r).is_empty());
    }

    #[test]
    fn capped_cylinder_hits_top_cap() {
        let c = CappedCylinder::new();
        let r = Ray::primary(Point::new(0.0, 5.0, 0.0), Direction::new(0.0, -1.0, 0.0));
        let hits = c.intersect(&r);
        assert_eq!(hits.len(), 2);
        assert_approx_eq!(hits[0].t, 4.5);
        assert_eq!(hits[0].material_index, 1);
        assert_approx_eq!(hits[1].t, 5.5);
        assert_eq!(hits[1].material_index, 2);
    }
}
