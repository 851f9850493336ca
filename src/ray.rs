use crate::direction::Direction;
use crate::point::Point;
use crate::transform::Transform;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RayKind {
    Primary,
    Shadow,
}

/// Origin + unit direction, plus the precomputed reciprocal direction and its
/// sign used by `Aabb::intersects` (the classic slab-test optimization).
#[derive(Debug, Clone, Copy)]
pub struct Ray {
    pub kind: RayKind,
    pub origin: Point,
    pub direction: Direction,
    pub inverse_direction: Direction,
    pub sign: [usize; 3],
}

impl Ray {
    pub fn primary(origin: Point, direction: Direction) -> Ray {
        Ray::new(RayKind::Primary, origin, direction)
    }

    pub fn shadow(origin: Point, direction: Direction) -> Ray {
        Ray::new(RayKind::Shadow, origin, direction)
    }

    fn new(kind: RayKind, origin: Point, direction: Direction) -> Ray {
        let inverse_direction = 1.0 / direction;
        Ray {
            kind,
            origin,
            direction,
            inverse_direction,
            sign: inverse_direction.sign(),
        }
    }

    pub fn is_shadow(&self) -> bool {
        self.kind == RayKind::Shadow
    }

    pub fn point_at(&self, t: f64) -> Point {
        self.origin + self.direction * t
    }

    /// World ray -> object-space ray for the shape currently being tested.
    /// Direction is *not* renormalized: §4.I notes the primary-ray direction is
    /// left unnormalized by construction, and per-shape quadratics are scale
    /// tolerant, so renormalizing here would only cost precision for no benefit.
    pub fn to_object(&self, tx: &Transform) -> Ray {
        if tx.is_identity() {
            return *self;
        }
        let origin = tx.point_to_object(self.origin);
        let direction = tx.direction_to_object(self.direction);
        Ray::new(self.kind, origin, direction)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::*;
    use crate::transform::TransformOptions;

    #[test]
    fn point_at() {
        let r = Ray::primary(Point::new(0.0, 0.0, -5.0), Direction::new(0.0, 0.0, 1.0));
        assert_approx_eq!(r.point_at(4.0), Point::new(0.0, 0.0, -1.0));
    }

    #[test]
    fn to_object_with_scale() {
        let tx = crate::transform::Transform::new(TransformOptions::new().scale(Direction::new(2.0, 2.0, 2.0)));
        let r = Ray::primary(Point::new(0.0, 0.0, -5.0), Direction::new(0.0, 0.0, 1.0));
        let object_ray = r.to_object(&tx);
        assert_approx_eq!(object_ray.origin, Point::new(0.0, 0.0, -2.5));
    }
}
