//! Closed uniform Catmull-Rom curve evaluation.

use serde::{Deserialize, Serialize};

use crate::geometry::{Point3, Vec3};

/// Minimum number of control points for a Catmull-Rom segment.
pub const MIN_CONTROL_POINTS: usize = 4;

/// Canonical Catmull-Rom basis matrix.
#[rustfmt::skip]
const BASIS: [[f32; 4]; 4] = [
    [-0.5,  1.5, -1.5,  0.5],
    [ 1.0, -2.5,  2.0, -0.5],
    [-0.5,  0.0,  0.5,  0.0],
    [ 0.0,  1.0,  0.0,  0.0],
];

/// Errors from spline evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SplineError {
    #[error("catmull-rom needs at least {MIN_CONTROL_POINTS} control points, got {got}")]
    InsufficientControlPoints { got: usize },
}

/// A closed, uniformly parametrized Catmull-Rom curve through its control
/// points.
///
/// The evaluator is stateless and side-effect-free; it validates the control
/// point count on every call, so a curve materialized from external data
/// still fails loudly instead of degrading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatmullRom {
    pub points: Vec<Point3>,
}

impl CatmullRom {
    pub fn new(points: Vec<Point3>) -> Self {
        Self { points }
    }

    fn check(&self) -> Result<(), SplineError> {
        if self.points.len() < MIN_CONTROL_POINTS {
            return Err(SplineError::InsufficientControlPoints {
                got: self.points.len(),
            });
        }
        Ok(())
    }

    /// Position and first derivative at global parameter `gt` in [0, 1).
    ///
    /// The curve is cyclic: each segment interpolates between two of the K
    /// control points using one neighbour on each side, and `gt` outside
    /// [0, 1) wraps around.
    pub fn evaluate(&self, gt: f32) -> Result<(Point3, Vec3), SplineError> {
        self.check()?;
        let k = self.points.len();

        let t = gt * k as f32;
        let idx = t.floor();
        let u = t - idx;
        let idx = idx as i64;

        let wrap = |offset: i64| {
            let i = (idx + offset).rem_euclid(k as i64) as usize;
            self.points[i]
        };
        let segment = [wrap(-1), wrap(0), wrap(1), wrap(2)];
        Ok(Self::segment_point(u, &segment))
    }

    /// Evaluate one segment at local parameter `u` against the basis matrix.
    fn segment_point(u: f32, p: &[Point3; 4]) -> (Point3, Vec3) {
        let tv = [u * u * u, u * u, u, 1.0];
        let dtv = [3.0 * u * u, 2.0 * u, 1.0, 0.0];

        // a = BASIS * P, per coordinate axis.
        let mut a = [Vec3::ZERO; 4];
        for (row, acc) in a.iter_mut().enumerate() {
            for (col, point) in p.iter().enumerate() {
                *acc = *acc + point.to_vec3() * BASIS[row][col];
            }
        }

        let mut pos = Vec3::ZERO;
        let mut deriv = Vec3::ZERO;
        for row in 0..4 {
            pos = pos + a[row] * tv[row];
            deriv = deriv + a[row] * dtv[row];
        }
        (Point3::new(pos.x, pos.y, pos.z), deriv)
    }

    /// Sample the closed loop into a polyline for trajectory visualization.
    pub fn sample_polyline(&self, samples: usize) -> Result<Vec<Point3>, SplineError> {
        self.check()?;
        let mut out = Vec::with_capacity(samples);
        for i in 0..samples {
            let gt = i as f32 / samples as f32;
            let (pos, _) = self.evaluate(gt)?;
            out.push(pos);
        }
        Ok(out)
    }
}
