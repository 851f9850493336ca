use std::sync::OnceLock;

use crate::aabb::Aabb;
use crate::error::{Result, RtError};
use crate::ray::Ray;
use crate::shapes::Shape;
use crate::texture::Texture;
use crate::transform::Transform;

/// One entry in a shape's material list. Index 0 is the shape's primary
/// surface; capped cylinder/cone caps and per-face `PolyMesh` faces select a
/// higher index via `ShapeHit::material_index` (§3, §4.C).
#[derive(Debug, Clone)]
pub struct Material {
    pub diffuse: Texture,
    pub specular: Texture,
    pub transparency: Option<Texture>,
}

impl Material {
    pub fn new(diffuse: Texture, specular: Texture) -> Material {
        Material { diffuse, specular, transparency: None }
    }

    pub fn with_transparency(mut self, transparency: Texture) -> Material {
        self.transparency = Some(transparency);
        self
    }
}

/// A shape placed in the scene with a Transform and material list, plus the
/// cached object- and world-space AABBs the octree routes by (§3). Objects
/// are immutable once constructed, so the world AABB only ever needs a single
/// lazy fill, never invalidation.
pub struct Object {
    pub shape: Box<dyn Shape>,
    pub transform: Transform,
    materials: Vec<Material>,
    object_aabb: Option<Aabb>,
    world_aabb: OnceLock<Option<Aabb>>,
}

impl Object {
    pub fn new(shape: Box<dyn Shape>, transform: Transform, materials: Vec<Material>) -> Result<Object> {
        if materials.is_empty() {
            return Err(RtError::Construction("object requires at least one material".to_string()));
        }
        let object_aabb = shape.object_aabb();
        Ok(Object { shape, transform, materials, object_aabb, world_aabb: OnceLock::new() })
    }

    /// Falls back to the primary (index 0) material for an out-of-range
    /// index rather than panicking — a malformed mesh face index is a
    /// degeneracy, not a construction error (§7).
    pub fn material(&self, index: usize) -> &Material {
        self.materials.get(index).unwrap_or(&self.materials[0])
    }

    pub fn world_aabb(&self) -> Option<Aabb> {
        *self.world_aabb.get_or_init(|| self.object_aabb.map(|b| b.transform(&self.transform)))
    }

    pub fn object_ray(&self, ray: &Ray) -> Ray {
        ray.to_object(&self.transform)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Color;
    use crate::direction::Direction;
    use crate::shapes::Sphere;
    use crate::transform::TransformOptions;

    #[test]
    fn rejects_empty_material_list() {
        let result = Object::new(Box::new(Sphere::new()), Transform::identity(), Vec::new());
        assert!(result.is_err());
    }

    #[test]
    fn world_aabb_reflects_transform() {
        let tx = Transform::new(TransformOptions::new().translate(Direction::new(5.0, 0.0, 0.0)));
        let object = Object::new(
            Box::new(Sphere::new()),
            tx,
            vec![Material::new(Texture::Solid(Color::white()), Texture::Solid(Color::black()))],
        )
        .unwrap();
        let aabb = object.world_aabb().expect("sphere has a finite aabb");
        assert!(aabb.contains_point(crate::point::Point::new(5.0, 0.0, 0.0)));
        assert!(!aabb.contains_point(crate::point::Point::zero()));
    }

    #[test]
    fn out_of_range_material_index_falls_back_to_primary() {
        let object = Object::new(
            Box::new(Sphere::new()),
            Transform::identity(),
            vec![Material::new(Texture::Solid(Color::red()), Texture::Solid(Color::black()))],
        )
        .unwrap();
        if let Texture::Solid(c) = object.material(7).diffuse {
            assert_eq!(c, Color::red());
        } else {
            panic!("expected a solid texture");
        }
    }
}
