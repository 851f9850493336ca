use std::collections::HashMap;
use std::sync::OnceLock;

use log::debug;

use crate::aabb::Aabb;
use crate::error::{Result, RtError};
use crate::intersection::{IntersectionResult, OtherHit};
use crate::lights::Light;
use crate::object::Object;
use crate::octree::Octree;
use crate::point::Point;
use crate::ray::Ray;
use crate::view::View;

pub const DEFAULT_SPLIT_THRESHOLD: usize = 20;
pub const DEFAULT_MAX_REFLECTIONS: u32 = 5;

/// Owns every shape, light, and view in a render (§3, §4.F). Auto-naming
/// ("Shape%d"/"Light%d"/"View%d") and collision-bumping mirror the legacy
/// `Scene`'s single hardcoded `setup_scene`, generalized into a builder API
/// that can construct arbitrary scenes rather than one fixed demo.
pub struct Scene {
    shapes: Vec<Object>,
    shape_names: HashMap<String, usize>,
    shape_counter: u32,
    lights: Vec<Box<dyn Light>>,
    light_names: HashMap<String, usize>,
    light_counter: u32,
    views: Vec<View>,
    view_names: HashMap<String, usize>,
    view_counter: u32,
    use_octree: bool,
    split_threshold: usize,
    max_reflections: u32,
    octree: OnceLock<Option<Octree>>,
}

impl Scene {
    pub fn new(use_octree: bool, split_threshold: usize) -> Scene {
        Scene {
            shapes: Vec::new(),
            shape_names: HashMap::new(),
            shape_counter: 0,
            lights: Vec::new(),
            light_names: HashMap::new(),
            light_counter: 0,
            views: Vec::new(),
            view_names: HashMap::new(),
            view_counter: 0,
            use_octree,
            split_threshold,
            max_reflections: DEFAULT_MAX_REFLECTIONS,
            octree: OnceLock::new(),
        }
    }

    pub fn with_max_reflections(mut self, max_reflections: u32) -> Scene {
        self.max_reflections = max_reflections;
        self
    }

    pub fn get_max_reflections(&self) -> u32 {
        self.max_reflections
    }

    fn unique_name(counter: &mut u32, prefix: &str, requested: Option<&str>, taken: &HashMap<String, usize>) -> String {
        if let Some(n) = requested {
            if !taken.contains_key(n) {
                return n.to_string();
            }
        }
        loop {
            *counter += 1;
            let candidate = format!("{}{}", prefix, counter);
            if !taken.contains_key(&candidate) {
                return candidate;
            }
        }
    }

    pub fn add_shape(&mut self, shape: Object, name: Option<&str>) -> String {
        let name = Scene::unique_name(&mut self.shape_counter, "Shape", name, &self.shape_names);
        let index = self.shapes.len();
        self.shapes.push(shape);
        self.shape_names.insert(name.clone(), index);
        name
    }

    pub fn add_light(&mut self, light: Box<dyn Light>, name: Option<&str>) -> String {
        let name = Scene::unique_name(&mut self.light_counter, "Light", name, &self.light_names);
        let index = self.lights.len();
        self.lights.push(light);
        self.light_names.insert(name.clone(), index);
        name
    }

    pub fn add_view(&mut self, view: View, name: Option<&str>) -> String {
        let name = Scene::unique_name(&mut self.view_counter, "View", name, &self.view_names);
        let index = self.views.len();
        self.views.push(view);
        self.view_names.insert(name.clone(), index);
        name
    }

    pub fn lights(&self) -> &[Box<dyn Light>] {
        &self.lights
    }

    pub fn shape(&self, index: usize) -> &Object {
        &self.shapes[index]
    }

    pub fn view(&self, name: &str) -> Option<&View> {
        self.view_names.get(name).map(|&idx| &self.views[idx])
    }

    /// Builds the octree the first time it's needed and caches it for the
    /// rest of the render (§4.F step 1, §5: "octree is built once and never
    /// mutated during the frame"). Shapes without a computable world AABB
    /// (none in this crate's primitive set, but allowed by §3) are pinned to
    /// the root and always tested.
    fn octree(&self) -> Option<&Octree> {
        if !self.use_octree || self.shapes.len() < self.split_threshold {
            return None;
        }
        self.octree
            .get_or_init(|| {
                let mut bounds = Vec::with_capacity(self.shapes.len());
                let mut unbounded = Vec::new();
                for (i, shape) in self.shapes.iter().enumerate() {
                    match shape.world_aabb() {
                        Some(b) => bounds.push(b),
                        None => {
                            bounds.push(Aabb::new(Point::zero(), Point::zero()));
                            unbounded.push(i);
                        }
                    }
                }
                debug!(
                    "building octree over {} shapes ({} unbounded), threshold {}",
                    self.shapes.len(),
                    unbounded.len(),
                    self.split_threshold
                );
                Some(Octree::build(bounds, unbounded, self.split_threshold))
            })
            .as_ref()
    }

    fn candidate_indices(&self, ray: &Ray) -> Vec<usize> {
        match self.octree() {
            Some(tree) if ray.is_shadow() => tree.candidates_sorted_by_distance(ray, ray.origin),
            Some(tree) => tree.candidates(ray),
            None => (0..self.shapes.len()).collect(),
        }
    }

    /// Nearest positive-t hit across every candidate shape not in `exclude`,
    /// with every further hit along the ray attached as `other_hits` in
    /// ascending-t order for the shading model's transparency traversal
    /// (§4.F, §4.G step 6). Shadow rays only consider hits with `t <= 1`: a
    /// shadow vector's own length is the distance to the light, so anything
    /// beyond that can't be an occluder.
    pub fn test_intersect(&self, ray: &Ray, exclude: &[usize]) -> Option<IntersectionResult> {
        let mut hits: Vec<OtherHit> = Vec::new();
        for idx in self.candidate_indices(ray) {
            if exclude.contains(&idx) {
                continue;
            }
            let object = &self.shapes[idx];
            let object_ray = object.object_ray(ray);
            for hit in object.shape.intersect(&object_ray) {
                if ray.is_shadow() && hit.t > 1.0 {
                    continue;
                }
                hits.push(OtherHit {
                    t: hit.t,
                    object_point: hit.point,
                    object_normal: hit.normal,
                    object_index: idx,
                    material_index: hit.material_index,
                    vertex_color: hit.vertex_color,
                    uv: hit.uv,
                });
            }
        }
        if hits.is_empty() {
            return None;
        }
        hits.sort_by(|a, b| a.t.partial_cmp(&b.t).unwrap());
        let primary = hits.remove(0);
        Some(IntersectionResult::with_material(
            primary.t,
            primary.object_point,
            primary.object_normal,
            *ray,
            primary.object_index,
            primary.material_index,
            primary.vertex_color,
            primary.uv,
            hits,
        ))
    }

    /// Builds the octree if needed, then dispatches to the named view's
    /// render routine and returns its finished raster (§4.F).
    pub fn render(&self, view_name: &str) -> Result<image::RgbImage> {
        self.octree();
        let idx = *self
            .view_names
            .get(view_name)
            .ok_or_else(|| RtError::Construction(format!("no such view: {}", view_name)))?;
        debug!(
            "render start: {} shapes, {} lights, {} views",
            self.shapes.len(),
            self.lights.len(),
            self.views.len()
        );
        crate::view::render(self, &self.views[idx])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Color;
    use crate::direction::Direction;
    use crate::lights::PointLight;
    use crate::object::Material;
    use crate::point::Point;
    use crate::shapes::Sphere;
    use crate::texture::Texture;

    fn sphere_at(x: f64) -> Object {
        Object::new(
            Box::new(Sphere::new()),
            crate::transform::Transform::new(crate::transform::TransformOptions::new().translate(Direction::new(x, 0.0, 0.0))),
            vec![Material::new(Texture::Solid(Color::white()), Texture::Solid(Color::black()))],
        )
        .unwrap()
    }

    #[test]
    fn auto_names_bump_on_collision() {
        let mut scene = Scene::new(false, DEFAULT_SPLIT_THRESHOLD);
        let a = scene.add_shape(sphere_at(0.0), None);
        let b = scene.add_shape(sphere_at(5.0), None);
        assert_ne!(a, b);
        assert_eq!(a, "Shape1");
        assert_eq!(b, "Shape2");
    }

    #[test]
    fn explicit_name_collision_falls_back_to_auto() {
        let mut scene = Scene::new(false, DEFAULT_SPLIT_THRESHOLD);
        let a = scene.add_shape(sphere_at(0.0), Some("dup"));
        let b = scene.add_shape(sphere_at(5.0), Some("dup"));
        assert_eq!(a, "dup");
        assert_ne!(b, "dup");
    }

    #[test]
    fn test_intersect_finds_nearest_across_shapes() {
        let mut scene = Scene::new(false, DEFAULT_SPLIT_THRESHOLD);
        scene.add_shape(sphere_at(0.0), None);
        scene.add_shape(sphere_at(10.0), None);
        let ray = Ray::primary(Point::new(0.0, 0.0, -5.0), Direction::new(0.0, 0.0, 1.0));
        let hit = scene.test_intersect(&ray, &[]).expect("expected a hit");
        assert_approx_eq(hit.t, 4.0);
        assert!(hit.has_further_hits());
    }

    #[test]
    fn shadow_ray_ignores_hits_beyond_t_one() {
        let mut scene = Scene::new(false, DEFAULT_SPLIT_THRESHOLD);
        scene.add_shape(sphere_at(0.0), None);
        // Shadow vector only spans to length 1 from the shifted point; this
        // ray's direction puts the sphere hit at t ~ 40, well beyond that.
        let ray = Ray::shadow(Point::new(0.0, 0.0, -50.0), Direction::new(0.0, 0.0, 1.0));
        assert!(scene.test_intersect(&ray, &[]).is_none());
    }

    #[test]
    fn add_light_returns_auto_name() {
        let mut scene = Scene::new(false, DEFAULT_SPLIT_THRESHOLD);
        let name = scene.add_light(Box::new(PointLight::new(Color::white(), 1.0, Point::zero())), None);
        assert_eq!(name, "Light1");
        assert_eq!(scene.lights().len(), 1);
    }

    fn assert_approx_eq(a: f64, b: f64) {
        assert!((a - b).abs() < 1e-6, "{} !~= {}", a, b);
    }
}
