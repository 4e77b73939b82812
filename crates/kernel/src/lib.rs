pub mod bezier;
pub mod geometry;
pub mod mesh;
pub mod primitives;
pub mod spline;

pub use bezier::BezierPatch;
pub use geometry::{Mat4, Point3, Vec3};
pub use mesh::{Mesh, MeshError};
pub use primitives::GenerateError;
pub use spline::{CatmullRom, SplineError};

/// Vectors shorter than this are treated as degenerate and are never
/// normalized (avoids division by zero on collapsed geometry).
pub const DEGENERATE_LENGTH: f32 = 1e-5;
