use crate::color::Color;
use crate::intersection::IntersectionResult;
use crate::lights::{Light, LightInfo};
use crate::point::Point;
use crate::transform::Transform;

/// Hard-edged cone of light: no soft falloff, a single shadow ray aimed at
/// the apex (§4.H) — the simple sibling of `Spotlight`'s soft, sampled cone.
pub struct Conical {
    pub color: Color,
    pub intensity: f64,
    pub transform: Transform,
    pub half_angle_degrees: f64,
    /// `None` for an infinite cone; `Some(l)` bounds illumination to `y <= l`
    /// in the light's local frame.
    pub length: Option<f64>,
}

impl Conical {
    pub fn new(color: Color, intensity: f64, transform: Transform, half_angle_degrees: f64, length: Option<f64>) -> Conical {
        Conical { color, intensity, transform, half_angle_degrees, length }
    }

    fn apex_world(&self) -> Point {
        self.transform.point_to_world(Point::zero())
    }
}

impl Light for Conical {
    fn calc_info(&self, hit: &IntersectionResult) -> LightInfo {
        let local = self.transform.point_to_object(hit.world_point());
        if local.y < 0.0 {
            return LightInfo::outside();
        }
        if let Some(length) = self.length {
            if local.y > length {
                return LightInfo::outside();
            }
        }
        let cutoff_cos = self.half_angle_degrees.to_radians().cos();
        let cos_test = local.to_dir().normalize().y;
        if cos_test < cutoff_cos {
            return LightInfo::outside();
        }

        LightInfo {
            is_inside: true,
            shadow_vectors: vec![self.apex_world() - hit.world_shifted_point()],
            light_direction: self.apex_world() - hit.world_point(),
            intensity: 1.0,
        }
    }

    fn color(&self) -> Color {
        self.color * self.intensity
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::direction::Direction;
    use crate::ray::Ray;

    fn hit_at(p: Point) -> IntersectionResult {
        let ray = Ray::primary(Point::new(0.0, 0.0, -5.0), Direction::new(0.0, 0.0, 1.0));
        let mut hit = IntersectionResult::new(5.0, p, Direction::new(0.0, 0.0, -1.0), ray, 0, Vec::new());
        hit.resolve_world(&Transform::identity());
        hit.shift_point(1e-4);
        hit
    }

    #[test]
    fn within_cone_is_inside_with_single_shadow_vector() {
        let light = Conical::new(Color::white(), 1.0, Transform::identity(), 30.0, None);
        let info = light.calc_info(&hit_at(Point::new(0.0, 5.0, 0.0)));
        assert!(info.is_inside);
        assert_eq!(info.shadow_vectors.len(), 1);
        assert_eq!(info.intensity, 1.0);
    }

    #[test]
    fn beyond_length_is_outside() {
        let light = Conical::new(Color::white(), 1.0, Transform::identity(), 80.0, Some(3.0));
        let info = light.calc_info(&hit_at(Point::new(0.0, 5.0, 0.0)));
        assert!(!info.is_inside);
    }

    #[test]
    fn outside_half_angle_is_outside() {
        let light = Conical::new(Color::white(), 1.0, Transform::identity(), 10.0, None);
        let info = light.calc_info(&hit_at(Point::new(5.0, 1.0, 0.0)));
        assert!(!info.is_inside);
    }
}
