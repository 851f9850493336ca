use crate::color::Color;
use crate::direction::Dot;
use crate::intersection::IntersectionResult;
use crate::ray::Ray;
use crate::scene::Scene;
use crate::texture::ColorSource;

/// Bias applied along the surface normal before casting a shadow or
/// reflection ray (§4.G step 2), unless a `LightingModel` is built with its
/// own `normal_offset`.
pub const DEFAULT_NORMAL_OFFSET: f64 = 1e-4;

/// Toggles that drop terms out of `LightingModel::shade` for debugging and
/// comparison renders (§4.G, final paragraph).
#[derive(Debug, Clone, Copy, Default)]
pub struct LightingModelOptions {
    pub no_shadows: bool,
    pub no_diffuse: bool,
    pub no_reflections: bool,
    pub normal_offset: Option<f64>,
}

/// The "basic" Whitted lighting model (§4.G): a static ambient term, Lambert
/// diffuse per light gated by shadow rays, recursive mirror reflection capped
/// by `Scene::get_max_reflections`, and transparency traversal through
/// `IntersectionResult::other_hits`. Grounded on the legacy `Shader` enum's
/// `DiffuseSpecular`/`Reflection`/`Transparency` variants (this file and
/// `src/shaders/*`, previously), collapsed into one fixed pipeline since the
/// spec doesn't call for a pluggable shader tree.
pub struct LightingModel {
    ambient: Color,
    options: LightingModelOptions,
}

impl LightingModel {
    pub fn new(ambient: Color, options: LightingModelOptions) -> LightingModel {
        LightingModel { ambient, options }
    }

    /// Colour returned for a ray that hits nothing, and the base case a
    /// bottomed-out reflection chain falls back to.
    pub fn background(&self) -> Color {
        self.ambient
    }

    fn epsilon(&self) -> f64 {
        self.options.normal_offset.unwrap_or(DEFAULT_NORMAL_OFFSET)
    }

    /// Shades one resolved intersection, recursing into reflection and
    /// transparency as needed (§4.G steps 1-6).
    pub fn shade(&self, scene: &Scene, mut hit: IntersectionResult) -> Color {
        let object = scene.shape(hit.object_index);
        hit.resolve_world(&object.transform);
        hit.shift_point(self.epsilon());

        let material = object.material(hit.material_index);
        let normal = hit.world_normal();
        let mut end_colour = self.ambient;

        let specular = material.specular.color_at_uv(hit.uv);
        if !self.options.no_reflections && !specular.is_black() && hit.reflect_count < scene.get_max_reflections() {
            let reflected_dir = hit.ray.direction.reflect(normal).normalize();
            let reflected_ray = Ray::primary(hit.world_shifted_point(), reflected_dir);
            end_colour += specular
                * match scene.test_intersect(&reflected_ray, &[]) {
                    Some(mut next) => {
                        next.reflect_count = hit.reflect_count + 1;
                        self.shade(scene, next)
                    }
                    None => self.background(),
                };
        }

        let diffuse_source = hit.vertex_color.unwrap_or_else(|| material.diffuse.color_at_uv(hit.uv));
        let mut diffuse_total = if self.options.no_diffuse {
            diffuse_source * 0.5
        } else {
            self.accumulate_diffuse(scene, &hit, diffuse_source, normal)
        };

        if let Some(transparency) = material.transparency.as_ref().map(|t| t.color_at_uv(hit.uv)) {
            if !transparency.is_black() {
                if let Some(behind) = hit.next_along_ray() {
                    end_colour += transparency * self.shade(scene, behind);
                    diffuse_total = diffuse_total * complement(transparency);
                }
            }
        }

        end_colour += diffuse_total;
        end_colour.clamped_non_negative()
    }

    fn accumulate_diffuse(&self, scene: &Scene, hit: &IntersectionResult, diffuse_source: Color, normal: crate::direction::Direction) -> Color {
        let mut total = Color::black();
        for light in scene.lights() {
            let info = light.calc_info(hit);
            if !info.is_inside {
                continue;
            }
            let costh = info.light_direction.normalize().dot(normal).max(0.0);
            if costh <= 0.0 {
                continue;
            }
            let shadow_factor = self.shadow_factor(scene, hit, &info);
            if shadow_factor.is_black() {
                continue;
            }
            total += diffuse_source * light.color() * (costh * info.intensity) * shadow_factor;
        }
        total
    }

    /// Casts one shadow ray per `LightInfo::shadow_vectors` entry, walks each
    /// ray's occluder chain multiplying by transparency colour (stopping once
    /// fully opaque), and averages the per-sample factors — how a spotlight's
    /// soft-shadow disc blurs an occluder's edge (§4.H).
    fn shadow_factor(&self, scene: &Scene, hit: &IntersectionResult, info: &crate::lights::LightInfo) -> Color {
        if self.options.no_shadows || info.shadow_vectors.is_empty() {
            return Color::white();
        }
        let mut total = Color::black();
        for &shadow_vector in &info.shadow_vectors {
            let shadow_ray = Ray::shadow(hit.world_shifted_point(), shadow_vector);
            total += match scene.test_intersect(&shadow_ray, &[]) {
                Some(first) => self.occlusion_along_chain(scene, first),
                None => Color::white(),
            };
        }
        (total / info.shadow_vectors.len() as f64).clamped_non_negative()
    }

    fn occlusion_along_chain(&self, scene: &Scene, first: IntersectionResult) -> Color {
        let mut factor = Color::white();
        let mut current = Some(first);
        while let Some(h) = current {
            let object = scene.shape(h.object_index);
            let material = object.material(h.material_index);
            let tint = material.transparency.as_ref().map(|t| t.color_at_uv(h.uv)).unwrap_or_else(Color::black);
            factor = factor * tint;
            if factor.is_black() {
                break;
            }
            current = h.next_along_ray();
        }
        factor
    }
}

fn complement(c: Color) -> Color {
    Color::new((1.0 - c.r).max(0.0), (1.0 - c.g).max(0.0), (1.0 - c.b).max(0.0))
}
