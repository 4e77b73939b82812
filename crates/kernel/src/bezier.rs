//! Bicubic Bézier patch evaluation and tessellation.
//!
//! Positions blend the 16 control points through the degree-3 Bernstein
//! basis in each parametric direction; normals come from the analytic
//! partial derivatives.

use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::geometry::{Point3, Vec3};
use crate::mesh::Mesh;
use crate::primitives::GenerateError;

/// Cubic Bernstein basis evaluated at `t`: `[B0, B1, B2, B3]`.
fn bernstein(t: f32) -> [f32; 4] {
    let s = 1.0 - t;
    [s * s * s, 3.0 * t * s * s, 3.0 * t * t * s, t * t * t]
}

/// Derivative of the cubic Bernstein basis at `t`.
fn bernstein_deriv(t: f32) -> [f32; 4] {
    let s = 1.0 - t;
    [
        -3.0 * s * s,
        3.0 * s * s - 6.0 * t * s,
        6.0 * t * s - 3.0 * t * t,
        3.0 * t * t,
    ]
}

/// A bicubic Bézier patch: a 4x4 grid of control points.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BezierPatch {
    /// `control[i][j]` weights `Bi(u) * Bj(v)`.
    pub control: [[Point3; 4]; 4],
}

impl BezierPatch {
    /// Arrange 16 control points (row-major) into the 4x4 grid.
    pub fn from_points(points: [Point3; 16]) -> Self {
        let mut control = [[Point3::ORIGIN; 4]; 4];
        for (k, p) in points.into_iter().enumerate() {
            control[k / 4][k % 4] = p;
        }
        Self { control }
    }

    /// Separable blend of the control grid against the given row and column
    /// weights.
    fn blend(&self, wu: [f32; 4], wv: [f32; 4]) -> Vec3 {
        let mut acc = Vec3::ZERO;
        for i in 0..4 {
            for j in 0..4 {
                acc = acc + self.control[i][j].to_vec3() * (wu[i] * wv[j]);
            }
        }
        acc
    }

    /// Surface position at `(u, v)` in [0,1]^2.
    pub fn point(&self, u: f32, v: f32) -> Point3 {
        let p = self.blend(bernstein(u), bernstein(v));
        Point3::new(p.x, p.y, p.z)
    }

    /// Partial derivative with respect to `u`.
    pub fn derivative_u(&self, u: f32, v: f32) -> Vec3 {
        self.blend(bernstein_deriv(u), bernstein(v))
    }

    /// Partial derivative with respect to `v`.
    pub fn derivative_v(&self, u: f32, v: f32) -> Vec3 {
        self.blend(bernstein(u), bernstein_deriv(v))
    }

    /// Surface normal at `(u, v)`: normalized cross product of the partials.
    /// When both partials vanish the normal is left as the zero vector;
    /// consumers must tolerate it.
    pub fn normal(&self, u: f32, v: f32) -> Vec3 {
        self.derivative_u(u, v)
            .cross(&self.derivative_v(u, v))
            .normalized()
            .unwrap_or(Vec3::ZERO)
    }
}

/// Tessellate a set of patches over a uniform `(level+1)`x`(level+1)` grid,
/// two triangles per cell, texture coordinates equal to `(u, v)`.
#[instrument(skip(patches))]
pub fn tessellate(patches: &[BezierPatch], level: u32) -> Result<Mesh, GenerateError> {
    if level < 1 {
        return Err(GenerateError::InvalidParameter(format!(
            "tessellation level must be at least 1, got {level}"
        )));
    }
    info!(patches = patches.len(), level, "tessellating bezier patches");

    let n = level as usize;
    let step = 1.0 / level as f32;
    let mut mesh = Mesh::with_capacity(patches.len() * n * n * 6);

    for patch in patches {
        // Evaluate the full grid once, then stitch cells from it.
        let mut grid = Vec::with_capacity((n + 1) * (n + 1));
        for i in 0..=n {
            let u = i as f32 * step;
            for j in 0..=n {
                let v = j as f32 * step;
                grid.push((patch.point(u, v), patch.normal(u, v), [u, v]));
            }
        }
        let at = |i: usize, j: usize| grid[i * (n + 1) + j];

        for i in 0..n {
            for j in 0..n {
                let p1 = at(i, j);
                let p2 = at(i + 1, j);
                let p3 = at(i + 1, j + 1);
                let p4 = at(i, j + 1);

                for (p, nrm, uv) in [p1, p2, p4, p2, p3, p4] {
                    mesh.push_vertex(p, nrm, uv);
                }
            }
        }
    }
    Ok(mesh)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A flat patch spanning [0,3]x[0,3] in XZ at the given height.
    fn flat_patch(height: f32) -> BezierPatch {
        let mut points = [Point3::ORIGIN; 16];
        for (k, p) in points.iter_mut().enumerate() {
            *p = Point3::new((k / 4) as f32, height, (k % 4) as f32);
        }
        BezierPatch::from_points(points)
    }

    /// All 16 control points coincident: both partials vanish everywhere.
    fn collapsed_patch() -> BezierPatch {
        BezierPatch::from_points([Point3::new(1.0, 2.0, 3.0); 16])
    }

    #[test]
    fn test_bernstein_partition_of_unity() {
        for k in 0..=10 {
            let t = k as f32 / 10.0;
            let sum: f32 = bernstein(t).iter().sum();
            assert!((sum - 1.0).abs() < 1e-5);
            let dsum: f32 = bernstein_deriv(t).iter().sum();
            assert!(dsum.abs() < 1e-5);
        }
    }

    #[test]
    fn test_patch_interpolates_corners() {
        let patch = flat_patch(0.0);
        let c00 = patch.point(0.0, 0.0);
        let c11 = patch.point(1.0, 1.0);
        assert!(c00.distance_to(&Point3::new(0.0, 0.0, 0.0)) < 1e-5);
        assert!(c11.distance_to(&Point3::new(3.0, 0.0, 3.0)) < 1e-5);
    }

    #[test]
    fn test_flat_patch_tessellation_is_flat() {
        let height = 2.5;
        let mesh = tessellate(&[flat_patch(height)], 4).unwrap();
        assert_eq!(mesh.vertex_count(), 4 * 4 * 6);
        for p in &mesh.positions {
            assert!((p.y - height).abs() < 1e-4);
        }
        for n in &mesh.normals {
            assert!(n.x.abs() < 1e-4);
            assert!((n.y.abs() - 1.0).abs() < 1e-4);
            assert!(n.z.abs() < 1e-4);
        }
    }

    #[test]
    fn test_uvs_equal_grid_parameters() {
        let mesh = tessellate(&[flat_patch(0.0)], 2).unwrap();
        for uv in &mesh.uvs {
            assert!((0.0..=1.0).contains(&uv[0]));
            assert!((0.0..=1.0).contains(&uv[1]));
        }
        // The first vertex of the first cell sits at the grid origin.
        assert!(mesh.uvs[0][0].abs() < 1e-6);
        assert!(mesh.uvs[0][1].abs() < 1e-6);
    }

    #[test]
    fn test_degenerate_partials_yield_zero_normal() {
        let mesh = tessellate(&[collapsed_patch()], 2).unwrap();
        // Every position collapses to the shared control point; the normal
        // is undefined and must come back as zero without panicking.
        for p in &mesh.positions {
            assert!(p.distance_to(&Point3::new(1.0, 2.0, 3.0)) < 1e-5);
        }
        for n in &mesh.normals {
            assert!(n.length() < 1e-6);
        }
    }

    #[test]
    fn test_tessellate_rejects_zero_level() {
        assert!(matches!(
            tessellate(&[flat_patch(0.0)], 0),
            Err(GenerateError::InvalidParameter(_))
        ));
    }
}
