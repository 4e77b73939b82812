//! Plain-text mesh persistence, one vertex per line.
//!
//! The format evolved across generator versions: position-only `x y z`
//! lines versus full `x y z nx ny nz u v` lines, with or without a leading
//! vertex count. Reader and writer therefore take an explicit format tag;
//! nothing is ever inferred from content shape.

use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use scene_kernel::geometry::{Point3, Vec3};
use scene_kernel::Mesh;

use crate::errors::MeshIoError;

/// Per-vertex field layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MeshEncoding {
    /// `x y z`
    PositionOnly,
    /// `x y z nx ny nz u v`
    Full,
}

/// Whether the first line carries the vertex count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MeshHeader {
    None,
    VertexCount,
}

/// The complete, explicit description of a mesh file's shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeshFileFormat {
    pub encoding: MeshEncoding,
    pub header: MeshHeader,
}

impl MeshFileFormat {
    /// The early generator output: positions only, no header.
    pub const LEGACY: Self = Self {
        encoding: MeshEncoding::PositionOnly,
        header: MeshHeader::None,
    };

    /// The final generator output: full vertices, no header.
    pub const FULL: Self = Self {
        encoding: MeshEncoding::Full,
        header: MeshHeader::None,
    };
}

/// Render a mesh to its text form.
///
/// Fails with `MissingAttributes` if the full encoding is requested for a
/// mesh without normals or texture coordinates; the position-only encoding
/// accepts any mesh and simply drops the extra attributes.
pub fn format_mesh(mesh: &Mesh, format: MeshFileFormat) -> Result<String, MeshIoError> {
    mesh.validate()?;
    if format.encoding == MeshEncoding::Full && !(mesh.has_normals() && mesh.has_uvs()) {
        return Err(MeshIoError::MissingAttributes);
    }

    let mut out = String::new();
    if format.header == MeshHeader::VertexCount {
        let _ = writeln!(out, "{}", mesh.vertex_count());
    }
    for (i, p) in mesh.positions.iter().enumerate() {
        match format.encoding {
            MeshEncoding::PositionOnly => {
                let _ = writeln!(out, "{} {} {}", p.x, p.y, p.z);
            }
            MeshEncoding::Full => {
                let n = mesh.normals[i];
                let uv = mesh.uvs[i];
                let _ = writeln!(
                    out,
                    "{} {} {} {} {} {} {} {}",
                    p.x, p.y, p.z, n.x, n.y, n.z, uv[0], uv[1]
                );
            }
        }
    }
    Ok(out)
}

/// Parse the text form of a mesh written with the given format.
pub fn parse_mesh(text: &str, format: MeshFileFormat) -> Result<Mesh, MeshIoError> {
    let mut lines = text
        .lines()
        .enumerate()
        .map(|(i, l)| (i + 1, l.trim()))
        .filter(|(_, l)| !l.is_empty());

    let declared = match format.header {
        MeshHeader::None => None,
        MeshHeader::VertexCount => {
            let (line_no, line) = lines.next().ok_or(MeshIoError::MalformedLine {
                line: 1,
                reason: "missing vertex count header".into(),
            })?;
            Some(parse_usize(line, line_no)?)
        }
    };

    let mut mesh = Mesh::new();
    for (line_no, line) in lines {
        let fields: Vec<f32> = line
            .split_whitespace()
            .map(|tok| parse_f32(tok, line_no))
            .collect::<Result<_, _>>()?;

        let expected = match format.encoding {
            MeshEncoding::PositionOnly => 3,
            MeshEncoding::Full => 8,
        };
        if fields.len() != expected {
            return Err(MeshIoError::MalformedLine {
                line: line_no,
                reason: format!("expected {expected} fields, found {}", fields.len()),
            });
        }

        mesh.positions
            .push(Point3::new(fields[0], fields[1], fields[2]));
        if format.encoding == MeshEncoding::Full {
            mesh.normals
                .push(Vec3::new(fields[3], fields[4], fields[5]));
            mesh.uvs.push([fields[6], fields[7]]);
        }
    }

    if let Some(declared) = declared {
        if declared != mesh.vertex_count() {
            return Err(MeshIoError::CountMismatch {
                declared,
                actual: mesh.vertex_count(),
            });
        }
    }
    mesh.validate()?;
    Ok(mesh)
}

/// Write a mesh file. Nothing is written if formatting fails.
#[instrument(skip(mesh))]
pub fn write_mesh(
    path: &Path,
    mesh: &Mesh,
    format: MeshFileFormat,
) -> Result<(), MeshIoError> {
    let text = format_mesh(mesh, format)?;
    fs::write(path, text)?;
    info!(?path, vertices = mesh.vertex_count(), "wrote mesh file");
    Ok(())
}

/// Read a mesh file written with the given format.
#[instrument]
pub fn read_mesh(path: &Path, format: MeshFileFormat) -> Result<Mesh, MeshIoError> {
    let text = fs::read_to_string(path)?;
    let mesh = parse_mesh(&text, format)?;
    info!(?path, vertices = mesh.vertex_count(), "read mesh file");
    Ok(mesh)
}

fn parse_f32(token: &str, line: usize) -> Result<f32, MeshIoError> {
    token.parse().map_err(|_| MeshIoError::MalformedLine {
        line,
        reason: format!("not a number: {token:?}"),
    })
}

fn parse_usize(token: &str, line: usize) -> Result<usize, MeshIoError> {
    token.parse().map_err(|_| MeshIoError::MalformedLine {
        line,
        reason: format!("not a vertex count: {token:?}"),
    })
}
