use crate::direction::Direction;
use crate::matrix::Matrix44f;
use crate::point::Point;

/// Options table accepted by every shape/view constructor. Composition order is
/// fixed: scale first (in the object's local frame), then rotate, then
/// translate, matching the row-vector convention `p_world = p_object * S * R * T`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TransformOptions {
    pub translate: Option<Direction>,
    pub scale: Option<Direction>,
    pub rotate: Option<(Direction, f64)>,
}

impl TransformOptions {
    pub fn new() -> TransformOptions {
        TransformOptions::default()
    }

    pub fn translate(mut self, d: Direction) -> Self {
        self.translate = Some(d);
        self
    }

    pub fn scale(mut self, d: Direction) -> Self {
        self.scale = Some(d);
        self
    }

    pub fn rotate(mut self, axis: Direction, degrees: f64) -> Self {
        self.rotate = Some((axis, degrees));
        self
    }
}

/// Composition of scale/rotate/translate with a pre-built forward and inverse
/// matrix. A `Transform` with no options set is the identity and short-circuits
/// both `to_object` and `to_world` to avoid the matrix multiply entirely.
#[derive(Debug, Clone, Copy)]
pub struct Transform {
    object_to_world: Matrix44f,
    world_to_object: Matrix44f,
    normal_to_world: Matrix44f,
    identity: bool,
}

impl Transform {
    pub fn identity() -> Transform {
        Transform {
            object_to_world: Matrix44f::identity(),
            world_to_object: Matrix44f::identity(),
            normal_to_world: Matrix44f::identity(),
            identity: true,
        }
    }

    pub fn new(opts: TransformOptions) -> Transform {
        if opts.translate.is_none() && opts.scale.is_none() && opts.rotate.is_none() {
            return Transform::identity();
        }

        let mut m = Matrix44f::identity();
        if let Some(s) = opts.scale {
            m = m * Matrix44f::scaling(s);
        }
        if let Some((axis, degrees)) = opts.rotate {
            m = m * Matrix44f::rotation_about_axis(axis, degrees);
        }
        if let Some(t) = opts.translate {
            m = m * Matrix44f::translation(t);
        }

        let world_to_object = m.inverse();

        Transform {
            object_to_world: m,
            world_to_object,
            normal_to_world: world_to_object.transposed(),
            identity: false,
        }
    }

    /// Build a `Transform` from an already-composed forward matrix, for
    /// callers that need more than one rotation in the chain (e.g. the
    /// look-at camera's align-to-axis rotation plus an independent roll,
    /// §4.I) and so can't express the composition through `TransformOptions`.
    pub fn from_forward_matrix(m: Matrix44f) -> Transform {
        let world_to_object = m.inverse();
        Transform {
            object_to_world: m,
            world_to_object,
            normal_to_world: world_to_object.transposed(),
            identity: false,
        }
    }

    pub fn is_identity(&self) -> bool {
        self.identity
    }

    pub fn object_to_world_matrix(&self) -> Matrix44f {
        self.object_to_world
    }

    pub fn world_to_object_matrix(&self) -> Matrix44f {
        self.world_to_object
    }

    pub fn point_to_object(&self, p: Point) -> Point {
        if self.identity {
            p
        } else {
            p * self.world_to_object
        }
    }

    pub fn point_to_world(&self, p: Point) -> Point {
        if self.identity {
            p
        } else {
            p * self.object_to_world
        }
    }

    pub fn direction_to_object(&self, d: Direction) -> Direction {
        if self.identity {
            d
        } else {
            d * self.world_to_object
        }
    }

    pub fn direction_to_world(&self, d: Direction) -> Direction {
        if self.identity {
            d
        } else {
            d * self.object_to_world
        }
    }

    /// Transform an object-space normal into world space: `normalize(M^-1 . n)`,
    /// where `M^-1` here is the inverse-transpose of object_to_world, cached at
    /// construction as `normal_to_world`. Translation never applies to normals.
    pub fn normal_to_world(&self, n: Direction) -> Direction {
        if self.identity {
            n
        } else {
            (n * self.normal_to_world).normalize()
        }
    }
}

impl Default for Transform {
    fn default() -> Transform {
        Transform::identity()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::*;

    #[test]
    fn identity_short_circuits() {
        let tx = Transform::new(TransformOptions::new());
        assert!(tx.is_identity());
        let p = Point::new(1.0, 2.0, 3.0);
        assert_approx_eq!(tx.point_to_world(p), p);
        assert_approx_eq!(tx.point_to_object(p), p);
    }

    #[test]
    fn translate_round_trip() {
        let tx = Transform::new(TransformOptions::new().translate(Direction::new(1.0, 2.0, 3.0)));
        let p = Point::new(0.0, 0.0, 0.0);
        let world = tx.point_to_world(p);
        assert_approx_eq!(world, Point::new(1.0, 2.0, 3.0));
        assert_approx_eq!(tx.point_to_object(world), p);
    }

    #[test]
    fn scale_then_rotate_then_translate_order() {
        // scale x2 along x, rotate 90deg about y (x -> -z... depends on convention),
        // then translate. Verify round-trip identity holds regardless of order.
        let tx = Transform::new(
            TransformOptions::new()
                .scale(Direction::new(2.0, 1.0, 1.0))
                .rotate(Direction::unit_y(), 90.0)
                .translate(Direction::new(5.0, 0.0, 0.0)),
        );
        let p = Point::new(1.0, 0.0, 0.0);
        let world = tx.point_to_world(p);
        let back = tx.point_to_object(world);
        assert_approx_eq!(back, p);
    }

    #[test]
    fn normal_unaffected_by_translation() {
        let tx = Transform::new(TransformOptions::new().translate(Direction::new(10.0, 20.0, 30.0)));
        let n = Direction::new(0.0, 1.0, 0.0);
        assert_approx_eq!(tx.normal_to_world(n), n);
    }

    #[test]
    fn normal_transforms_with_scale() {
        // Non-uniform scale requires the inverse-transpose, not the forward matrix.
        let tx = Transform::new(TransformOptions::new().scale(Direction::new(2.0, 1.0, 1.0)));
        let n = Direction::new(1.0, 0.0, 0.0).normalize();
        let world_n = tx.normal_to_world(n);
        // scaling x by 2 while keeping the surface normal pointing along x means
        // the transformed normal (after inverse-transpose + renormalize) still
        // points along x.
        assert_approx_eq!(world_n, Direction::new(1.0, 0.0, 0.0));
    }
}
