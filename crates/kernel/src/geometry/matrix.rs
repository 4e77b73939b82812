use serde::{Deserialize, Serialize};

use super::point::Point3;
use super::vector::Vec3;

/// A 4x4 homogeneous transformation matrix stored row-major.
///
/// Composition follows the standard matrix-chain convention: in
/// `a.then(&b)` the product is `a * b`, so `b` is applied to a point first.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Mat4 {
    /// Row-major entries: `m[row][col]`.
    pub m: [[f32; 4]; 4],
}

impl Mat4 {
    pub fn identity() -> Self {
        #[rustfmt::skip]
        let m = [
            [1.0, 0.0, 0.0, 0.0],
            [0.0, 1.0, 0.0, 0.0],
            [0.0, 0.0, 1.0, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ];
        Self { m }
    }

    pub fn translation(dx: f32, dy: f32, dz: f32) -> Self {
        let mut t = Self::identity();
        t.m[0][3] = dx;
        t.m[1][3] = dy;
        t.m[2][3] = dz;
        t
    }

    pub fn from_translation_vec(v: Vec3) -> Self {
        Self::translation(v.x, v.y, v.z)
    }

    pub fn scaling(sx: f32, sy: f32, sz: f32) -> Self {
        let mut s = Self::identity();
        s.m[0][0] = sx;
        s.m[1][1] = sy;
        s.m[2][2] = sz;
        s
    }

    /// Rotation around the X axis by `angle` radians.
    pub fn rotation_x(angle: f32) -> Self {
        let c = angle.cos();
        let s = angle.sin();
        let mut r = Self::identity();
        r.m[1][1] = c;
        r.m[1][2] = -s;
        r.m[2][1] = s;
        r.m[2][2] = c;
        r
    }

    /// Rotation around the Y axis by `angle` radians.
    pub fn rotation_y(angle: f32) -> Self {
        let c = angle.cos();
        let s = angle.sin();
        let mut r = Self::identity();
        r.m[0][0] = c;
        r.m[0][2] = s;
        r.m[2][0] = -s;
        r.m[2][2] = c;
        r
    }

    /// Rotation around the Z axis by `angle` radians.
    pub fn rotation_z(angle: f32) -> Self {
        let c = angle.cos();
        let s = angle.sin();
        let mut r = Self::identity();
        r.m[0][0] = c;
        r.m[0][1] = -s;
        r.m[1][0] = s;
        r.m[1][1] = c;
        r
    }

    /// Rotation around an arbitrary axis by `angle` radians (Rodrigues'
    /// formula). A degenerate axis yields the identity.
    pub fn rotation_axis_angle(axis: Vec3, angle: f32) -> Self {
        let Some(axis) = axis.normalized() else {
            return Self::identity();
        };
        let c = angle.cos();
        let s = angle.sin();
        let t = 1.0 - c;
        let (x, y, z) = (axis.x, axis.y, axis.z);

        #[rustfmt::skip]
        let m = [
            [t * x * x + c,     t * x * y - s * z, t * x * z + s * y, 0.0],
            [t * x * y + s * z, t * y * y + c,     t * y * z - s * x, 0.0],
            [t * x * z - s * y, t * y * z + s * x, t * z * z + c,     0.0],
            [0.0,               0.0,               0.0,               1.0],
        ];
        Self { m }
    }

    /// Rotation whose columns are the given local axes: the local X axis is
    /// carried onto `x`, Y onto `y`, Z onto `z`. The caller supplies an
    /// orthonormal frame (curve alignment builds one from the tangent).
    pub fn from_axes(x: Vec3, y: Vec3, z: Vec3) -> Self {
        #[rustfmt::skip]
        let m = [
            [x.x, y.x, z.x, 0.0],
            [x.y, y.y, z.y, 0.0],
            [x.z, y.z, z.z, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ];
        Self { m }
    }

    /// Compose two transforms: `self * other` (other applied first).
    pub fn then(&self, other: &Mat4) -> Mat4 {
        let mut result = [[0.0f32; 4]; 4];
        for (row, out_row) in result.iter_mut().enumerate() {
            for (col, out) in out_row.iter_mut().enumerate() {
                let mut sum = 0.0;
                for k in 0..4 {
                    sum += self.m[row][k] * other.m[k][col];
                }
                *out = sum;
            }
        }
        Mat4 { m: result }
    }

    /// Transform a point with the full homogeneous pipeline. The perspective
    /// divide is applied only when w is neither 0 nor 1, matching the
    /// fixed-function convention for affine transforms.
    pub fn transform_point(&self, p: &Point3) -> Point3 {
        let x = self.m[0][0] * p.x + self.m[0][1] * p.y + self.m[0][2] * p.z + self.m[0][3];
        let y = self.m[1][0] * p.x + self.m[1][1] * p.y + self.m[1][2] * p.z + self.m[1][3];
        let z = self.m[2][0] * p.x + self.m[2][1] * p.y + self.m[2][2] * p.z + self.m[2][3];
        let w = self.m[3][0] * p.x + self.m[3][1] * p.y + self.m[3][2] * p.z + self.m[3][3];

        if w != 0.0 && w != 1.0 {
            Point3::new(x / w, y / w, z / w)
        } else {
            Point3::new(x, y, z)
        }
    }

    /// Transform a direction vector (no translation).
    pub fn transform_vector(&self, v: &Vec3) -> Vec3 {
        let x = self.m[0][0] * v.x + self.m[0][1] * v.y + self.m[0][2] * v.z;
        let y = self.m[1][0] * v.x + self.m[1][1] * v.y + self.m[1][2] * v.z;
        let z = self.m[2][0] * v.x + self.m[2][1] * v.y + self.m[2][2] * v.z;
        Vec3::new(x, y, z)
    }
}

impl Default for Mat4 {
    fn default() -> Self {
        Self::identity()
    }
}
