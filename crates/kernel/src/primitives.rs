//! Closed-form triangulation of the canonical primitives.
//!
//! Every generator validates its parameters before emitting a single vertex
//! and produces a full (position, normal, UV) mesh; dropping attributes for
//! the legacy position-only persistence path is the writer's decision.

use std::f32::consts::{FRAC_PI_2, PI, TAU};

use tracing::{info, instrument};

use crate::geometry::{Mat4, Point3, Vec3};
use crate::mesh::Mesh;

/// Errors raised by the primitive generators.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GenerateError {
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
}

fn ensure_positive(name: &'static str, value: f32) -> Result<(), GenerateError> {
    if value > 0.0 {
        Ok(())
    } else {
        Err(GenerateError::InvalidParameter(format!(
            "{name} must be positive, got {value}"
        )))
    }
}

fn ensure_subdivisions(name: &'static str, min: u32, value: u32) -> Result<(), GenerateError> {
    if value >= min {
        Ok(())
    } else {
        Err(GenerateError::InvalidParameter(format!(
            "{name} must be at least {min}, got {value}"
        )))
    }
}

/// Emit a `slices`x`slices` grid covering the unit square in the local XZ
/// plane (normal +Y, CCW from above), carried through `to_face`.
///
/// `to_face` must be rigid (rotation + translation) so the source winding
/// stays counter-clockwise on the target face and normals transform without
/// a normal matrix.
fn emit_face_grid(mesh: &mut Mesh, unit: f32, slices: u32, to_face: &Mat4) {
    let offset = unit / 2.0;
    let normal = to_face.transform_vector(&Vec3::Y);

    // Coordinates come from the grid fraction so the outer rows land on
    // exactly +-unit/2.
    let coord = |k: u32| unit * (k as f32 / slices as f32) - offset;

    for i in 0..slices {
        for j in 0..slices {
            let x1 = coord(i);
            let z1 = coord(j);
            let x2 = coord(i + 1);
            let z2 = coord(j + 1);
            let u1 = i as f32 / slices as f32;
            let u2 = (i + 1) as f32 / slices as f32;
            let v1 = j as f32 / slices as f32;
            let v2 = (j + 1) as f32 / slices as f32;

            let p11 = to_face.transform_point(&Point3::new(x1, 0.0, z1));
            let p12 = to_face.transform_point(&Point3::new(x1, 0.0, z2));
            let p21 = to_face.transform_point(&Point3::new(x2, 0.0, z1));
            let p22 = to_face.transform_point(&Point3::new(x2, 0.0, z2));

            mesh.push_vertex(p11, normal, [u1, v1]);
            mesh.push_vertex(p22, normal, [u2, v2]);
            mesh.push_vertex(p21, normal, [u2, v1]);

            mesh.push_vertex(p11, normal, [u1, v1]);
            mesh.push_vertex(p12, normal, [u1, v2]);
            mesh.push_vertex(p22, normal, [u2, v2]);
        }
    }
}

/// Unit square in the XZ plane centred at the origin, subdivided into
/// `slices`^2 cells of two triangles each, facing +Y.
#[instrument]
pub fn plane(unit: f32, slices: u32) -> Result<Mesh, GenerateError> {
    ensure_positive("unit", unit)?;
    ensure_subdivisions("slices", 1, slices)?;
    info!(unit, slices, "generating plane");

    let mut mesh = Mesh::with_capacity(6 * (slices * slices) as usize);
    emit_face_grid(&mut mesh, unit, slices, &Mat4::identity());
    Ok(mesh)
}

/// Axis-aligned cube of side `unit` centred at the origin.
///
/// Each face is the plane grid carried to its position by a per-face rigid
/// transform, so outward orientation follows from one rule rather than six
/// hand-adjusted winding cases.
#[instrument]
pub fn cuboid(unit: f32, slices: u32) -> Result<Mesh, GenerateError> {
    ensure_positive("unit", unit)?;
    ensure_subdivisions("slices", 1, slices)?;
    info!(unit, slices, "generating cuboid");

    let half = unit / 2.0;
    let faces = [
        // +Y / -Y
        Mat4::translation(0.0, half, 0.0),
        Mat4::translation(0.0, -half, 0.0).then(&Mat4::rotation_x(PI)),
        // +Z / -Z
        Mat4::translation(0.0, 0.0, half).then(&Mat4::rotation_x(FRAC_PI_2)),
        Mat4::translation(0.0, 0.0, -half).then(&Mat4::rotation_x(-FRAC_PI_2)),
        // +X / -X
        Mat4::translation(half, 0.0, 0.0).then(&Mat4::rotation_z(-FRAC_PI_2)),
        Mat4::translation(-half, 0.0, 0.0).then(&Mat4::rotation_z(FRAC_PI_2)),
    ];

    let mut mesh = Mesh::with_capacity(36 * (slices * slices) as usize);
    for face in &faces {
        emit_face_grid(&mut mesh, unit, slices, face);
    }
    Ok(mesh)
}

/// Cone with its base circle in the XZ plane and apex at (0, height, 0).
///
/// The lateral normal reflects the constant half-angle:
/// `(sin a, sin(atan(radius/height)), cos a)` normalized. The ring touching
/// the apex emits a single triangle per cell.
#[instrument]
pub fn cone(radius: f32, height: f32, slices: u32, stacks: u32) -> Result<Mesh, GenerateError> {
    ensure_positive("radius", radius)?;
    ensure_positive("height", height)?;
    ensure_subdivisions("slices", 3, slices)?;
    ensure_subdivisions("stacks", 1, stacks)?;
    info!(radius, height, slices, stacks, "generating cone");

    let slice_angle = TAU / slices as f32;
    let mut mesh = Mesh::with_capacity((6 * slices * stacks) as usize);

    // Base fan, facing -Y, with polar texture coordinates.
    let down = -Vec3::Y;
    let centre = Point3::ORIGIN;
    for i in 0..slices {
        let a1 = i as f32 * slice_angle;
        let a2 = (i + 1) as f32 * slice_angle;
        let p1 = Point3::new(radius * a1.sin(), 0.0, radius * a1.cos());
        let p2 = Point3::new(radius * a2.sin(), 0.0, radius * a2.cos());

        mesh.push_vertex(p1, down, [0.5 + 0.5 * a1.sin(), 0.5 + 0.5 * a1.cos()]);
        mesh.push_vertex(centre, down, [0.5, 0.5]);
        mesh.push_vertex(p2, down, [0.5 + 0.5 * a2.sin(), 0.5 + 0.5 * a2.cos()]);
    }

    // Lateral surface: radius shrinks linearly to zero at the apex.
    let slant_y = (radius / height).atan().sin();
    let stack_height = height / stacks as f32;
    for i in 0..stacks {
        let y1 = i as f32 * stack_height;
        let y2 = (i + 1) as f32 * stack_height;
        let r1 = radius * (1.0 - i as f32 / stacks as f32);
        let r2 = radius * (1.0 - (i + 1) as f32 / stacks as f32);

        for j in 0..slices {
            let a1 = j as f32 * slice_angle;
            let a2 = (j + 1) as f32 * slice_angle;
            let n1 = Vec3::new(a1.sin(), slant_y, a1.cos())
                .normalized()
                .unwrap_or(Vec3::Y);
            let n2 = Vec3::new(a2.sin(), slant_y, a2.cos())
                .normalized()
                .unwrap_or(Vec3::Y);

            let uv = |s: u32, t: u32| [s as f32 / slices as f32, t as f32 / stacks as f32];

            let p1 = Point3::new(r1 * a1.sin(), y1, r1 * a1.cos());
            let p2 = Point3::new(r1 * a2.sin(), y1, r1 * a2.cos());
            let p3 = Point3::new(r2 * a2.sin(), y2, r2 * a2.cos());
            let p4 = Point3::new(r2 * a1.sin(), y2, r2 * a1.cos());

            mesh.push_vertex(p1, n1, uv(j, i));
            mesh.push_vertex(p2, n2, uv(j + 1, i));
            mesh.push_vertex(p4, n1, uv(j, i + 1));

            // Upper triangle collapses on the apex ring.
            if i != stacks - 1 {
                mesh.push_vertex(p4, n1, uv(j, i + 1));
                mesh.push_vertex(p2, n2, uv(j + 1, i));
                mesh.push_vertex(p3, n2, uv(j + 1, i + 1));
            }
        }
    }
    Ok(mesh)
}

/// Sphere centred at the origin from a latitude/longitude grid.
///
/// The normal at each vertex is its unit position. The quad rows touching a
/// pole contribute only their non-degenerate triangle, so every emitted
/// triangle is well-defined.
#[instrument]
pub fn sphere(radius: f32, slices: u32, stacks: u32) -> Result<Mesh, GenerateError> {
    ensure_positive("radius", radius)?;
    ensure_subdivisions("slices", 3, slices)?;
    ensure_subdivisions("stacks", 1, stacks)?;
    info!(radius, slices, stacks, "generating sphere");

    let slice_angle = TAU / slices as f32;
    let stack_angle = PI / stacks as f32;

    // Latitude measured from the equator: +PI/2 at the north pole.
    let dir = |lat: f32, lon: f32| Vec3::new(lat.cos() * lon.sin(), lat.sin(), lat.cos() * lon.cos());

    let mut mesh = Mesh::with_capacity((6 * slices * stacks.saturating_sub(1)) as usize);
    for i in 0..slices {
        for j in 0..stacks {
            let lat1 = FRAC_PI_2 - stack_angle * j as f32;
            let lat2 = FRAC_PI_2 - stack_angle * (j + 1) as f32;
            let lon1 = slice_angle * i as f32;
            let lon2 = slice_angle * (i + 1) as f32;

            let d1 = dir(lat1, lon1);
            let d2 = dir(lat2, lon1);
            let d3 = dir(lat2, lon2);
            let d4 = dir(lat1, lon2);

            let at = |d: Vec3| Point3::new(radius * d.x, radius * d.y, radius * d.z);
            let uv = |s: u32, t: u32| {
                [
                    s as f32 / slices as f32,
                    1.0 - t as f32 / stacks as f32,
                ]
            };

            if j != stacks - 1 {
                mesh.push_vertex(at(d1), d1, uv(i, j));
                mesh.push_vertex(at(d2), d2, uv(i, j + 1));
                mesh.push_vertex(at(d3), d3, uv(i + 1, j + 1));
            }
            if j != 0 {
                mesh.push_vertex(at(d1), d1, uv(i, j));
                mesh.push_vertex(at(d3), d3, uv(i + 1, j + 1));
                mesh.push_vertex(at(d4), d4, uv(i + 1, j));
            }
        }
    }
    Ok(mesh)
}

/// Torus around the Y axis: `major_radius` is the radius of the tube-centre
/// circle in the XZ plane, `minor_radius` the tube cross-section. `slices`
/// subdivide the main ring, `stacks` the tube. The normal at each vertex is
/// the unit vector from the tube-circle centre to the vertex.
#[instrument]
pub fn torus(
    major_radius: f32,
    minor_radius: f32,
    slices: u32,
    stacks: u32,
) -> Result<Mesh, GenerateError> {
    ensure_positive("major_radius", major_radius)?;
    ensure_positive("minor_radius", minor_radius)?;
    ensure_subdivisions("slices", 3, slices)?;
    ensure_subdivisions("stacks", 3, stacks)?;
    info!(major_radius, minor_radius, slices, stacks, "generating torus");

    let ring_angle = TAU / slices as f32;
    let tube_angle = TAU / stacks as f32;

    let vertex = |tube: f32, ring: f32| {
        Point3::new(
            (major_radius + minor_radius * tube.cos()) * ring.cos(),
            minor_radius * tube.sin(),
            (major_radius + minor_radius * tube.cos()) * ring.sin(),
        )
    };
    let normal = |tube: f32, ring: f32| {
        Vec3::new(tube.cos() * ring.cos(), tube.sin(), tube.cos() * ring.sin())
            .normalized()
            .unwrap_or(Vec3::Y)
    };

    let mut mesh = Mesh::with_capacity((6 * slices * stacks) as usize);
    for i in 0..stacks {
        for j in 0..slices {
            let t1 = tube_angle * i as f32;
            let t2 = tube_angle * (i + 1) as f32;
            let r1 = ring_angle * j as f32;
            let r2 = ring_angle * (j + 1) as f32;

            let uv = |s: u32, t: u32| [s as f32 / stacks as f32, t as f32 / slices as f32];

            let p1 = (vertex(t1, r1), normal(t1, r1), uv(i, j));
            let p2 = (vertex(t2, r1), normal(t2, r1), uv(i + 1, j));
            let p3 = (vertex(t2, r2), normal(t2, r2), uv(i + 1, j + 1));
            let p4 = (vertex(t1, r2), normal(t1, r2), uv(i, j + 1));

            for &(p, n, t) in &[p1, p2, p4, p2, p3, p4] {
                mesh.push_vertex(p, n, t);
            }
        }
    }
    Ok(mesh)
}
