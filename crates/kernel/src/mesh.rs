use serde::{Deserialize, Serialize};

use orrery_types::{Material, TextureRef};

use crate::geometry::{Point3, Vec3};

/// Errors from mesh structural validation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MeshError {
    #[error("vertex count {0} is not a multiple of 3")]
    NotTriangleList(usize),

    #[error("{attribute} count {got} does not match vertex count {expected}")]
    AttributeMismatch {
        attribute: &'static str,
        got: usize,
        expected: usize,
    },
}

/// A triangle list with optional per-vertex normals and texture coordinates.
///
/// Vertices are grouped implicitly in triples; winding is counter-clockwise
/// viewed from the intended outside face and must be preserved for back-face
/// culling downstream. Normals and UVs are parallel arrays: either empty
/// (attribute absent for the whole mesh) or one entry per vertex.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Mesh {
    pub positions: Vec<Point3>,
    pub normals: Vec<Vec3>,
    pub uvs: Vec<[f32; 2]>,
    /// Opaque handle into the external texture subsystem, if textured.
    pub texture: Option<TextureRef>,
    pub material: Material,
}

impl Mesh {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(vertices: usize) -> Self {
        Self {
            positions: Vec::with_capacity(vertices),
            normals: Vec::with_capacity(vertices),
            uvs: Vec::with_capacity(vertices),
            texture: None,
            material: Material::default(),
        }
    }

    /// Append one fully-attributed vertex.
    pub fn push_vertex(&mut self, position: Point3, normal: Vec3, uv: [f32; 2]) {
        self.positions.push(position);
        self.normals.push(normal);
        self.uvs.push(uv);
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.positions.len() / 3
    }

    pub fn has_normals(&self) -> bool {
        !self.normals.is_empty()
    }

    pub fn has_uvs(&self) -> bool {
        !self.uvs.is_empty()
    }

    /// Check the structural invariants: triangle-list length and parallel
    /// attribute arrays.
    pub fn validate(&self) -> Result<(), MeshError> {
        let n = self.positions.len();
        if n % 3 != 0 {
            return Err(MeshError::NotTriangleList(n));
        }
        if !self.normals.is_empty() && self.normals.len() != n {
            return Err(MeshError::AttributeMismatch {
                attribute: "normal",
                got: self.normals.len(),
                expected: n,
            });
        }
        if !self.uvs.is_empty() && self.uvs.len() != n {
            return Err(MeshError::AttributeMismatch {
                attribute: "uv",
                got: self.uvs.len(),
                expected: n,
            });
        }
        Ok(())
    }

    /// Axis-aligned bounds of all vertices, or `None` for an empty mesh.
    pub fn bounding_box(&self) -> Option<BoundingBox> {
        if self.positions.is_empty() {
            return None;
        }
        let mut bb = BoundingBox::empty();
        for p in &self.positions {
            bb.expand_to_include(p);
        }
        Some(bb)
    }
}

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min: Point3,
    pub max: Point3,
}

impl BoundingBox {
    pub fn empty() -> Self {
        Self {
            min: Point3::new(f32::INFINITY, f32::INFINITY, f32::INFINITY),
            max: Point3::new(f32::NEG_INFINITY, f32::NEG_INFINITY, f32::NEG_INFINITY),
        }
    }

    pub fn expand_to_include(&mut self, p: &Point3) {
        self.min.x = self.min.x.min(p.x);
        self.min.y = self.min.y.min(p.y);
        self.min.z = self.min.z.min(p.z);
        self.max.x = self.max.x.max(p.x);
        self.max.y = self.max.y.max(p.y);
        self.max.z = self.max.z.max(p.z);
    }

    pub fn center(&self) -> Point3 {
        self.min.midpoint(&self.max)
    }

    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triangle() -> Mesh {
        let mut mesh = Mesh::new();
        mesh.push_vertex(Point3::ORIGIN, Vec3::Y, [0.0, 0.0]);
        mesh.push_vertex(Point3::new(1.0, 0.0, 0.0), Vec3::Y, [1.0, 0.0]);
        mesh.push_vertex(Point3::new(0.0, 0.0, 1.0), Vec3::Y, [0.0, 1.0]);
        mesh
    }

    #[test]
    fn test_validate_accepts_triangle() {
        assert!(triangle().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_partial_triangle() {
        let mut mesh = triangle();
        mesh.positions.pop();
        mesh.normals.pop();
        mesh.uvs.pop();
        assert_eq!(mesh.validate(), Err(MeshError::NotTriangleList(2)));
    }

    #[test]
    fn test_validate_rejects_attribute_mismatch() {
        let mut mesh = triangle();
        mesh.normals.pop();
        assert!(matches!(
            mesh.validate(),
            Err(MeshError::AttributeMismatch {
                attribute: "normal",
                ..
            })
        ));
    }

    #[test]
    fn test_bounding_box() {
        let bb = triangle().bounding_box().unwrap();
        assert!((bb.min.x).abs() < 1e-6);
        assert!((bb.max.x - 1.0).abs() < 1e-6);
        assert!((bb.max.z - 1.0).abs() < 1e-6);
        assert!(bb.size().y.abs() < 1e-6);
    }

    #[test]
    fn test_empty_mesh_has_no_bounds() {
        assert!(Mesh::new().bounding_box().is_none());
    }
}
