use crate::direction::{Direction, Dot};
use crate::matrix::Matrix44f;
use crate::point::Point;
use crate::transform::{Transform, TransformOptions};

/// Maps the primary rays a `View` generates against a canonical camera at the
/// origin looking down +z into world space (§4.I). `centered` is the simple
/// identity-up-to-translation form the legacy demo scene hardcoded; `look_at`
/// composes scale, an independent roll about the resulting view axis, and the
/// rotation that aligns +z with the look direction — more rotations than
/// `TransformOptions` can express in one call, so the forward matrix is built
/// directly and wrapped with `Transform::from_forward_matrix`.
pub struct Camera {
    pub transform: Transform,
}

impl Camera {
    /// Eye on the -z axis at `eye_z`, looking toward the origin.
    pub fn centered(eye_z: f64) -> Camera {
        Camera {
            transform: Transform::new(TransformOptions::new().translate(Direction::new(0.0, 0.0, -eye_z))),
        }
    }

    /// Eye at `eye`, looking toward `look_at`, with an optional roll about the
    /// resulting view axis and an optional non-uniform pre-scale of the
    /// canonical camera's local axes.
    pub fn look_at(eye: Point, look_at: Point, z_rotation: Option<f64>, scale: Option<Direction>) -> Camera {
        let forward = (look_at - eye).normalize();
        let align = align_rotation(Direction::new(0.0, 0.0, 1.0), forward);
        let roll = z_rotation.map(Matrix44f::rotation_z).unwrap_or_else(Matrix44f::identity);
        let scale_m = scale.map(Matrix44f::scaling).unwrap_or_else(Matrix44f::identity);

        let m = scale_m * roll * align * Matrix44f::translation(eye.to_dir());
        Camera { transform: Transform::from_forward_matrix(m) }
    }
}

/// Shortest rotation taking unit vector `from` onto unit vector `to`, as a
/// matrix. Degenerate near-parallel and near-antiparallel cases are handled
/// explicitly since `from.cross(to)` vanishes in both.
fn align_rotation(from: Direction, to: Direction) -> Matrix44f {
    let dot = from.dot(to).clamp(-1.0, 1.0);
    if dot > 1.0 - 1e-9 {
        return Matrix44f::identity();
    }
    if dot < -1.0 + 1e-9 {
        let arbitrary = if from.x.abs() < 0.9 { Direction::new(1.0, 0.0, 0.0) } else { Direction::new(0.0, 1.0, 0.0) };
        let axis = from.cross(arbitrary).normalize();
        return Matrix44f::rotation_about_axis(axis, 180.0);
    }
    let axis = from.cross(to).normalize();
    Matrix44f::rotation_about_axis(axis, dot.acos().to_degrees())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::*;

    #[test]
    fn centered_places_eye_on_negative_z() {
        let camera = Camera::centered(5.0);
        let world_origin = camera.transform.point_to_world(Point::zero());
        assert_approx_eq!(world_origin, Point::new(0.0, 0.0, -5.0));
    }

    #[test]
    fn look_at_maps_canonical_forward_to_target_direction() {
        let eye = Point::new(0.0, 0.0, -5.0);
        let target = Point::new(10.0, 0.0, -5.0);
        let camera = Camera::look_at(eye, target, None, None);
        // the canonical camera's local +z axis should map to world +x, the
        // direction from eye to target.
        let world_forward = camera.transform.direction_to_world(Direction::new(0.0, 0.0, 1.0)).normalize();
        assert_approx_eq!(world_forward, Direction::new(1.0, 0.0, 0.0));
    }

    #[test]
    fn look_at_places_local_origin_at_eye() {
        let eye = Point::new(1.0, 2.0, 3.0);
        let target = Point::new(1.0, 2.0, 10.0);
        let camera = Camera::look_at(eye, target, None, None);
        assert_approx_eq!(camera.transform.point_to_world(Point::zero()), eye);
    }

    #[test]
    fn look_at_handles_reversed_axis() {
        let eye = Point::new(0.0, 0.0, 5.0);
        let target = Point::new(0.0, 0.0, -5.0);
        let camera = Camera::look_at(eye, target, None, None);
        let world_forward = camera.transform.direction_to_world(Direction::new(0.0, 0.0, 1.0)).normalize();
        assert_approx_eq!(world_forward, Direction::new(0.0, 0.0, -1.0));
    }
}
