use crate::point::Point;
use crate::ray::Ray;
use crate::transform::Transform;

/// Axis-aligned bounding box: six scalars (min/max per axis), with a cached
/// midpoint and the eight corner points. Grounded on the slab test in
/// `shapes/bounding_box.rs` from the earlier revision of this tree, extended
/// with the ops the octree and world-space caching need (corners, overlap,
/// point-inside, transform-by-matrix).
#[derive(Debug, Clone, Copy)]
pub struct Aabb {
    pub min: Point,
    pub max: Point,
}

impl Aabb {
    pub fn new(min: Point, max: Point) -> Aabb {
        Aabb { min, max }
    }

    pub fn unit_cube() -> Aabb {
        Aabb::new(Point::new(-1.0, -1.0, -1.0), Point::new(1.0, 1.0, 1.0))
    }

    pub fn midpoint(&self) -> Point {
        Point::new(
            (self.min.x + self.max.x) * 0.5,
            (self.min.y + self.max.y) * 0.5,
            (self.min.z + self.max.z) * 0.5,
        )
    }

    pub fn corners(&self) -> [Point; 8] {
        [
            Point::new(self.min.x, self.min.y, self.min.z),
            Point::new(self.max.x, self.min.y, self.min.z),
            Point::new(self.min.x, self.max.y, self.min.z),
            Point::new(self.max.x, self.max.y, self.min.z),
            Point::new(self.min.x, self.min.y, self.max.z),
            Point::new(self.max.x, self.min.y, self.max.z),
            Point::new(self.min.x, self.max.y, self.max.z),
            Point::new(self.max.x, self.max.y, self.max.z),
        ]
    }

    pub fn contains_point(&self, p: Point) -> bool {
        p.x >= self.min.x && p.x <= self.max.x
            && p.y >= self.min.y && p.y <= self.max.y
            && p.z >= self.min.z && p.z <= self.max.z
    }

    pub fn overlaps(&self, other: &Aabb) -> bool {
        self.min.x <= other.max.x && self.max.x >= other.min.x
            && self.min.y <= other.max.y && self.max.y >= other.min.y
            && self.min.z <= other.max.z && self.max.z >= other.min.z
    }

    pub fn union(&self, other: &Aabb) -> Aabb {
        Aabb::new(
            Point::new(self.min.x.min(other.min.x), self.min.y.min(other.min.y), self.min.z.min(other.min.z)),
            Point::new(self.max.x.max(other.max.x), self.max.y.max(other.max.y), self.max.z.max(other.max.z)),
        )
    }

    /// Transform-by-matrix: transform the eight object-space corners into world
    /// space via `tx` and refit a new axis-aligned box around them. A rotated
    /// box is therefore generally larger than the true rotated volume — that
    /// slack is the cost of keeping the index axis-aligned.
    pub fn transform(&self, tx: &Transform) -> Aabb {
        if tx.is_identity() {
            return *self;
        }
        let corners = self.corners();
        let mut min = tx.point_to_world(corners[0]);
        let mut max = min;
        for &c in &corners[1..] {
            let w = tx.point_to_world(c);
            min.x = min.x.min(w.x);
            min.y = min.y.min(w.y);
            min.z = min.z.min(w.z);
            max.x = max.x.max(w.x);
            max.y = max.y.max(w.y);
            max.z = max.z.max(w.z);
        }
        Aabb::new(min, max)
    }

    fn bound(&self, i: usize) -> Point {
        if i == 0 {
            self.min
        } else {
            self.max
        }
    }

    /// Slab test; true if the ray's infinite line intersects the box at any
    /// non-negative t. Used for the mesh-internal octree and any other
    /// all-or-nothing membership check.
    pub fn intersects(&self, ray: &Ray) -> bool {
        self.intersect_range(ray).is_some()
    }

    /// Entry/exit t values of the ray against this box, or `None` if it misses
    /// entirely (including boxes that are only touched behind the ray origin).
    pub fn intersect_range(&self, ray: &Ray) -> Option<(f64, f64)> {
        let mut tmin = (self.bound(ray.sign[0]).x - ray.origin.x) * ray.inverse_direction.x;
        let mut tmax = (self.bound(1 - ray.sign[0]).x - ray.origin.x) * ray.inverse_direction.x;
        let tymin = (self.bound(ray.sign[1]).y - ray.origin.y) * ray.inverse_direction.y;
        let tymax = (self.bound(1 - ray.sign[1]).y - ray.origin.y) * ray.inverse_direction.y;

        if tmin > tymax || tymin > tmax {
            return None;
        }
        if tymin > tmin {
            tmin = tymin;
        }
        if tymax < tmax {
            tmax = tymax;
        }

        let tzmin = (self.bound(ray.sign[2]).z - ray.origin.z) * ray.inverse_direction.z;
        let tzmax = (self.bound(1 - ray.sign[2]).z - ray.origin.z) * ray.inverse_direction.z;

        if tmin > tzmax || tzmin > tmax {
            return None;
        }
        if tzmin > tmin {
            tmin = tzmin;
        }
        if tzmax < tmax {
            tmax = tzmax;
        }

        if tmax < 0.0 {
            return None;
        }

        Some((tmin, tmax))
    }

    pub fn center_distance_squared(&self, p: Point) -> f64 {
        (self.midpoint() - p).length_squared()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::direction::Direction;
    use crate::test_utils::*;

    #[test]
    fn point_inside() {
        let b = Aabb::unit_cube();
        assert!(b.contains_point(Point::zero()));
        assert!(!b.contains_point(Point::new(2.0, 0.0, 0.0)));
    }

    #[test]
    fn overlap() {
        let a = Aabb::new(Point::new(0.0, 0.0, 0.0), Point::new(1.0, 1.0, 1.0));
        let b = Aabb::new(Point::new(0.5, 0.5, 0.5), Point::new(1.5, 1.5, 1.5));
        let c = Aabb::new(Point::new(2.0, 2.0, 2.0), Point::new(3.0, 3.0, 3.0));
        assert!(a.overlaps(&b));
        assert!(!a.overlaps(&c));
    }

    #[test]
    fn ray_hits_box() {
        let b = Aabb::unit_cube();
        let r = Ray::primary(Point::new(0.0, 0.0, -5.0), Direction::new(0.0, 0.0, 1.0));
        assert!(b.intersects(&r));
        let (tmin, tmax) = b.intersect_range(&r).unwrap();
        assert_approx_eq!(tmin, 4.0);
        assert_approx_eq!(tmax, 6.0);
    }

    #[test]
    fn ray_misses_box() {
        let b = Aabb::unit_cube();
        let r = Ray::primary(Point::new(5.0, 5.0, -5.0), Direction::new(0.0, 0.0, 1.0));
        assert!(!b.intersects(&r));
    }

    #[test]
    fn midpoint() {
        let b = Aabb::new(Point::new(0.0, 0.0, 0.0), Point::new(2.0, 4.0, 6.0));
        assert_approx_eq!(b.midpoint(), Point::new(1.0, 2.0, 3.0));
    }
}
