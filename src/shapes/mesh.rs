use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::sync::OnceLock;

use wavefront_obj::obj;

use crate::aabb::Aabb;
use crate::color::Color;
use crate::direction::{Direction, Dot};
use crate::error::{Result, RtError};
use crate::octree::Octree;
use crate::point::Point;
use crate::ray::Ray;
use crate::shapes::{sorted_positive_hits, Shape, ShapeHit, T_EPSILON};
use crate::vector::Vector2f;

/// One triangular face, indexing into the mesh's shared vertex/normal pools.
/// `material_index` lets a mesh carry per-face material overrides (§3),
/// mirroring the cap-override convention in `cylinder.rs`/`cone.rs`.
pub struct MeshFace {
    pub vertex_indices: [usize; 3],
    pub normal_indices: Option<[usize; 3]>,
    pub vertex_colors: Option<[Color; 3]>,
    pub material_index: usize,
}

impl MeshFace {
    pub fn new(vertex_indices: [usize; 3]) -> MeshFace {
        MeshFace { vertex_indices, normal_indices: None, vertex_colors: None, material_index: 0 }
    }

    pub fn with_normals(mut self, normal_indices: [usize; 3]) -> MeshFace {
        self.normal_indices = Some(normal_indices);
        self
    }

    pub fn with_material(mut self, material_index: usize) -> MeshFace {
        self.material_index = material_index;
        self
    }
}

/// Above this many faces, an internal octree over each face's object-space
/// AABB is built lazily rather than testing every face linearly (§4.C:
/// "built lazily when the mesh's triangle count exceeds threshold"). Matches
/// the scene-level default split threshold (§4.E).
pub const MESH_OCTREE_THRESHOLD: usize = 20;

/// Collection of triangular faces sharing a vertex/normal pool, with smooth
/// (Phong) or flat shading and an internal spatial index over its own faces
/// (§4.C). Grounded on the teacher's `shapes/mesh.rs::Mesh`, whose own
/// `intersection_intervals` left a `// TODO: find all triangle intersections`
/// marker; `PolyMesh::intersect` below is exactly that gap filled in, now
/// returning every positive-t hit (not just the first) as transparency
/// traversal requires.
pub struct PolyMesh {
    vertices: Vec<Point>,
    normals: Vec<Direction>,
    faces: Vec<MeshFace>,
    smooth_shading: bool,
    object_aabb: Aabb,
    octree: OnceLock<Octree>,
}

impl PolyMesh {
    pub fn new(vertices: Vec<Point>, normals: Vec<Direction>, faces: Vec<MeshFace>, smooth_shading: bool) -> PolyMesh {
        let object_aabb = faces
            .iter()
            .flat_map(|f| f.vertex_indices.iter().map(|&i| vertices[i]))
            .fold(None::<Aabb>, |acc, v| {
                let point_box = Aabb::new(v, v);
                Some(match acc {
                    Some(b) => b.union(&point_box),
                    None => point_box,
                })
            })
            .unwrap_or_else(|| Aabb::new(Point::zero(), Point::zero()));

        PolyMesh { vertices, normals, faces, smooth_shading, object_aabb, octree: OnceLock::new() }
    }

    /// Load a Wavefront OBJ file's first object as a single mesh with smooth
    /// (vertex-normal-interpolated) shading. Grounded on the legacy
    /// `scene.rs::convert_objs` loader, generalized to the new `Shape`
    /// trait's object-space convention.
    pub fn load_wavefront<P: AsRef<Path>>(path: P) -> Result<PolyMesh> {
        let mut text = String::new();
        File::open(path)?.read_to_string(&mut text)?;
        let obj_set = obj::parse(text).map_err(|e| RtError::MeshParse(format!("{:?}", e)))?;
        let object = obj_set
            .objects
            .first()
            .ok_or_else(|| RtError::MeshParse("obj file contains no objects".to_string()))?;

        let vertices: Vec<Point> = object.vertices.iter().map(|v| Point::new(v.x, v.y, v.z)).collect();
        let normals: Vec<Direction> = object.normals.iter().map(|n| Direction::new(n.x, n.y, n.z)).collect();

        let mut faces = Vec::new();
        for geometry in &object.geometry {
            for shape in &geometry.shapes {
                if let obj::Primitive::Triangle(v0, v1, v2) = shape.primitive {
                    let mut face = MeshFace::new([v0.0, v1.0, v2.0]);
                    if let (Some(n0), Some(n1), Some(n2)) = (v0.2, v1.2, v2.2) {
                        face = face.with_normals([n0, n1, n2]);
                    }
                    faces.push(face);
                }
            }
        }

        if faces.is_empty() {
            return Err(RtError::MeshParse("obj file contains no triangles".to_string()));
        }

        Ok(PolyMesh::new(vertices, normals, faces, true))
    }

    fn octree(&self) -> Option<&Octree> {
        if self.faces.len() <= MESH_OCTREE_THRESHOLD {
            return None;
        }
        Some(self.octree.get_or_init(|| {
            let bounds: Vec<Aabb> = self
                .faces
                .iter()
                .map(|f| {
                    let [a, b, c] = f.vertex_indices.map(|i| self.vertices[i]);
                    Aabb::new(a, a).union(&Aabb::new(b, b)).union(&Aabb::new(c, c))
                })
                .collect();
            Octree::build(bounds, Vec::new(), MESH_OCTREE_THRESHOLD)
        }))
    }

    fn candidate_faces(&self, ray: &Ray) -> Vec<usize> {
        match self.octree() {
            Some(tree) => tree.candidates(ray),
            None => (0..self.faces.len()).collect(),
        }
    }

    fn intersect_face(&self, ray: &Ray, face: &MeshFace) -> Option<ShapeHit> {
        let [v0, v1, v2] = face.vertex_indices.map(|i| self.vertices[i]);

        let v0v1 = v1 - v0;
        let v0v2 = v2 - v0;
        let pvec = ray.direction.cross(v0v2);
        let det = v0v1.dot(pvec);
        if det.abs() < f64::EPSILON {
            return None;
        }
        let inv_det = 1.0 / det;

        let tvec = ray.origin - v0;
        let u = tvec.dot(pvec) * inv_det;
        if !(0.0..=1.0).contains(&u) {
            return None;
        }

        let qvec = tvec.cross(v0v1);
        let v = ray.direction.dot(qvec) * inv_det;
        if v < 0.0 || u + v > 1.0 {
            return None;
        }

        let t = v0v2.dot(qvec) * inv_det;
        if t <= T_EPSILON {
            return None;
        }

        let point = ray.point_at(t);
        let normal = match face.normal_indices {
            Some([n0, n1, n2]) if self.smooth_shading => {
                let [n0, n1, n2] = [n0, n1, n2].map(|i| self.normals[i]);
                ((1.0 - u - v) * n0 + u * n1 + v * n2).normalize()
            }
            Some([n0, n1, n2]) => (self.normals[n0] + self.normals[n1] + self.normals[n2]).normalize(),
            None => v0v1.cross(v0v2).normalize(),
        };

        let mut hit = ShapeHit::new(t, point, normal, Vector2f(u, v)).with_material(face.material_index);
        if let Some(colors) = face.vertex_colors {
            hit = hit.with_vertex_color(colors[0] * (1.0 - u - v) + colors[1] * u + colors[2] * v);
        }
        Some(hit)
    }
}

impl Shape for PolyMesh {
    fn intersect(&self, ray: &Ray) -> Vec<ShapeHit> {
        if !self.object_aabb.intersects(ray) {
            return Vec::new();
        }
        let hits = self
            .candidate_faces(ray)
            .into_iter()
            .filter_map(|i| self.intersect_face(ray, &self.faces[i]))
            .collect();
        sorted_positive_hits(hits)
    }

    fn is_inside(&self, _p: Point) -> bool {
        false
    }

    fn object_aabb(&self) -> Option<Aabb> {
        Some(self.object_aabb)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::direction::Direction;
    use crate::test_utils::*;

    fn single_triangle_mesh() -> PolyMesh {
        let vertices = vec![
            Point::new(-1.0, -1.0, 0.0),
            Point::new(1.0, -1.0, 0.0),
            Point::new(0.0, 1.0, 0.0),
        ];
        PolyMesh::new(vertices, Vec::new(), vec![MeshFace::new([0, 1, 2])], false)
    }

    #[test]
    fn hits_single_face() {
        let mesh = single_triangle_mesh();
        let r = Ray::primary(Point::new(0.0, 0.0, -5.0), Direction::new(0.0, 0.0, 1.0));
        let hits = mesh.intersect(&r);
        assert_eq!(hits.len(), 1);
        assert_approx_eq!(hits[0].t, 5.0);
    }

    #[test]
    fn misses_outside_bounding_box() {
        let mesh = single_triangle_mesh();
        let r = Ray::primary(Point::new(50.0, 50.0, -5.0), Direction::new(0.0, 0.0, 1.0));
        assert!(mesh.intersect(&r).is_empty());
    }

    #[test]
    fn smooth_shading_interpolates_vertex_normals() {
        let vertices = vec![
            Point::new(-1.0, -1.0, 0.0),
            Point::new(1.0, -1.0, 0.0),
            Point::new(0.0, 1.0, 0.0),
        ];
        let normals = vec![
            Direction::new(-1.0, 0.0, -1.0).normalize(),
            Direction::new(1.0, 0.0, -1.0).normalize(),
            Direction::new(0.0, 1.0, -1.0).normalize(),
        ];
        let faces = vec![MeshFace::new([0, 1, 2]).with_normals([0, 1, 2])];
        let mesh = PolyMesh::new(vertices, normals, faces, true);
        let r = Ray::primary(Point::new(0.0, -1.0 / 3.0, -5.0), Direction::new(0.0, 0.0, 1.0));
        let hits = mesh.intersect(&r);
        assert_eq!(hits.len(), 1);
        // Interpolated normal should still point mostly toward -z, but not be
        // exactly any single vertex normal.
        assert!(hits[0].normal.z < 0.0);
    }

    #[test]
    fn builds_internal_octree_past_threshold() {
        let mut vertices = Vec::new();
        let mut faces = Vec::new();
        for i in 0..(MESH_OCTREE_THRESHOLD + 5) {
            let x = i as f64 * 3.0;
            let base = vertices.len();
            vertices.push(Point::new(x - 1.0, -1.0, 0.0));
            vertices.push(Point::new(x + 1.0, -1.0, 0.0));
            vertices.push(Point::new(x, 1.0, 0.0));
            faces.push(MeshFace::new([base, base + 1, base + 2]));
        }
        let mesh = PolyMesh::new(vertices, Vec::new(), faces, false);
        let r = Ray::primary(Point::new(30.0, 0.0, -5.0), Direction::new(0.0, 0.0, 1.0));
        let hits = mesh.intersect(&r);
        assert_eq!(hits.len(), 1);
        assert!(mesh.octree().is_some());
    }
}
