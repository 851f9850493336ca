use crate::color::Color;
use crate::intersection::IntersectionResult;
use crate::lights::{Light, LightInfo};
use crate::point::Point;

/// Omnidirectional point light (§4.H). Grounded on the teacher's
/// `lights/omni.rs::Omni` for the `color * intensity` radiance convention,
/// dropping the inverse-square falloff term the spec's Point contract doesn't
/// call for: `calc_info`'s `intensity` is always 1, so any attenuation is
/// folded into the configured `color`/`intensity` pair up front.
pub struct PointLight {
    pub color: Color,
    pub intensity: f64,
    pub position: Point,
}

impl PointLight {
    pub fn new(color: Color, intensity: f64, position: Point) -> PointLight {
        PointLight { color, intensity, position }
    }
}

impl Light for PointLight {
    fn calc_info(&self, hit: &IntersectionResult) -> LightInfo {
        let shadow_vector = self.position - hit.world_shifted_point();
        let light_direction = self.position - hit.world_point();
        LightInfo {
            is_inside: true,
            shadow_vectors: vec![shadow_vector],
            light_direction,
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
    use crate::test_utils::*;

    #[test]
    fn shadow_vector_points_toward_light() {
        let light = PointLight::new(Color::white(), 1.0, Point::new(0.0, 0.0, -10.0));
        let ray = Ray::primary(Point::new(0.0, 0.0, -5.0), Direction::new(0.0, 0.0, 1.0));
        let mut hit = IntersectionResult::new(4.0, Point::new(0.0, 0.0, -1.0), Direction::new(0.0, 0.0, -1.0), ray, 0, Vec::new());
        hit.resolve_world(&crate::transform::Transform::identity());
        hit.shift_point(1e-4);
        let info = light.calc_info(&hit);
        assert!(info.is_inside);
        assert_approx_eq!(info.intensity, 1.0);
        assert_approx_eq!(info.shadow_vectors[0].normalize(), Direction::new(0.0, 0.0, -1.0));
    }
}
