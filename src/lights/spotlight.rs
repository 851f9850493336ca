use rand::Rng;

use crate::color::Color;
use crate::direction::Direction;
use crate::intersection::IntersectionResult;
use crate::lights::{Light, LightInfo};
use crate::point::Point;
use crate::transform::Transform;

/// `cos(26.57 deg)`, the outer-cone cutoff angle from the light's Y axis
/// (§4.H). `tan(26.57 deg) ~= 0.5`, matching the unit-radius/unit-height
/// cylinder the light's local frame is built around.
const CUTOFF_COS: f64 = 0.894_427_190_999_916;

/// Soft-shadow spotlight: a cone of light falling off from `CUTOFF_COS` (full
/// intensity, axis-aligned) to grazing (zero), with a cubic ramp in between
/// (§4.H). Shadow rays are jittered across `samples` points on the unit disc
/// at the light's base — grounded on `Direction::uniform_disc_sample`, which
/// the math kernel already provides for exactly this purpose — then mapped
/// back to world space through the light's own `Transform`.
pub struct Spotlight {
    pub color: Color,
    pub intensity: f64,
    pub transform: Transform,
    pub samples: usize,
}

impl Spotlight {
    pub fn new(color: Color, intensity: f64, transform: Transform, samples: usize) -> Spotlight {
        Spotlight { color, intensity, transform, samples: samples.max(1) }
    }

    fn apex_world(&self) -> Point {
        self.transform.point_to_world(Point::zero())
    }
}

impl Light for Spotlight {
    fn calc_info(&self, hit: &IntersectionResult) -> LightInfo {
        let local = self.transform.point_to_object(hit.world_point());
        if local.y < 0.0 {
            return LightInfo::outside();
        }
        let local_dir = local.to_dir().normalize();
        let cos_test = local_dir.y;
        if cos_test < CUTOFF_COS {
            return LightInfo::outside();
        }

        let ramp = ((cos_test - CUTOFF_COS) / (1.0 - CUTOFF_COS)).max(0.0).min(1.0);
        let intensity = ramp.powi(3);

        let mut rng = rand::thread_rng();
        let shadow_vectors = (0..self.samples)
            .map(|_| {
                let sample_local = Direction::uniform_disc_sample(&mut rng);
                let sample_world = self.transform.point_to_world(Point::new(sample_local.x, 0.0, sample_local.z));
                sample_world - hit.world_shifted_point()
            })
            .collect();

        LightInfo {
            is_inside: true,
            shadow_vectors,
            light_direction: self.apex_world() - hit.world_point(),
            intensity,
        }
    }

    fn color(&self) -> Color {
        self.color * self.intensity
    }
}
