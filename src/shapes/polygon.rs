use crate::aabb::Aabb;
use crate::direction::{Direction, Dot};
use crate::point::Point;
use crate::ray::Ray;
use crate::shapes::{sorted_positive_hits, Shape, ShapeHit, T_EPSILON};
use crate::vector::Vector2f;

/// Largest-|component| axis to drop so a planar polygon can be tested in 2D
/// (§4.C). 0=x, 1=y, 2=z.
fn dominant_axis(n: Direction) -> usize {
    let (ax, ay, az) = (n.x.abs(), n.y.abs(), n.z.abs());
    if ax >= ay && ax >= az {
        0
    } else if ay >= az {
        1
    } else {
        2
    }
}

fn project(p: Point, axis: usize) -> (f64, f64) {
    match axis {
        0 => (p.y, p.z),
        1 => (p.x, p.z),
        _ => (p.x, p.y),
    }
}

/// A planar polygon of at least four vertices (§4.C). Plane normal comes from
/// the first three vertices; inclusion is tested by the even-odd rule against
/// the 2D projection obtained by dropping the dominant axis of the normal.
pub struct Polygon {
    vertices: Vec<Point>,
    normal: Direction,
}

impl Polygon {
    pub fn new(vertices: Vec<Point>) -> Polygon {
        assert!(vertices.len() >= 4, "a polygon needs at least four vertices");
        let normal = (vertices[1] - vertices[0]).cross(vertices[2] - vertices[0]).normalize();
        Polygon { vertices, normal }
    }

    fn contains(&self, p: Point) -> bool {
        let axis = dominant_axis(self.normal);
        let (px, py) = project(p, axis);
        let mut inside = false;
        let n = self.vertices.len();
        for i in 0..n {
            let a = project(self.vertices[i], axis);
            let b = project(self.vertices[(i + 1) % n], axis);
            let crosses = (a.1 > py) != (b.1 > py);
            if crosses {
                let x_at_py = a.0 + (py - a.1) * (b.0 - a.0) / (b.1 - a.1);
                if px < x_at_py {
                    inside = !inside;
                }
            }
        }
        inside
    }
}

impl Shape for Polygon {
    fn intersect(&self, ray: &Ray) -> Vec<ShapeHit> {
        let denom = ray.direction.dot(self.normal);
        if denom.abs() < f64::EPSILON {
            return Vec::new();
        }
        let w = self.vertices[0] - ray.origin;
        let t = w.dot(self.normal) / denom;
        if t <= T_EPSILON {
            return Vec::new();
        }
        let p = ray.point_at(t);
        if !self.contains(p) {
            return Vec::new();
        }
        let axis = dominant_axis(self.normal);
        let (u, v) = project(p, axis);
        sorted_positive_hits(vec![ShapeHit::new(t, p, self.normal, Vector2f(u, v))])
    }

    fn is_inside(&self, _p: Point) -> bool {
        false
    }

    fn object_aabb(&self) -> Option<Aabb> {
        let mut min = self.vertices[0];
        let mut max = self.vertices[0];
        for &v in &self.vertices[1..] {
            min.x = min.x.min(v.x);
            min.y = min.y.min(v.y);
            min.z = min.z.min(v.z);
            max.x = max.x.max(v.x);
            max.y = max.y.max(v.y);
            max.z = max.z.max(v.z);
        }
        Some(Aabb::new(min, max))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::*;

    fn unit_square() -> Polygon {
        Polygon::new(vec![
            Point::new(-1.0, -1.0, 0.0),
            Point::new(1.0, -1.0, 0.0),
            Point::new(1.0, 1.0, 0.0),
            Point::new(-1.0, 1.0, 0.0),
        ])
    }

    #[test]
    fn hits_interior_point() {
        let poly = unit_square();
        let r = Ray::primary(Point::new(0.0, 0.0, -5.0), Direction::new(0.0, 0.0, 1.0));
        let hits = poly.intersect(&r);
        assert_eq!(hits.len(), 1);
        assert_approx_eq!(hits[0].t, 5.0);
    }

    #[test]
    fn misses_outside_point() {
        let poly = unit_square();
        let r = Ray::primary(Point::new(5.0, 5.0, -5.0), Direction::new(0.0, 0.0, 1.0));
        assert!(poly.intersect(&r).is_empty());
    }

    #[test]
    fn misses_parallel_ray() {
        let poly = unit_square();
        let r = Ray::primary(Point::new(0.0, 0.0, 1.0), Direction::new(0.0, 1.0, 0.0));
        assert!(poly.intersect(&r).is_empty());
    }
}
