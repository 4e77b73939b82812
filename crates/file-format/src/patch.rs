//! Bézier patch file parsing.
//!
//! Layout: line 1 is the patch count; the next N lines each hold 16 comma-
//! or whitespace-separated indices into the control point pool; then a line
//! with the control point count; then one `x,y,z` (or `x y z`) point per
//! line. Parsing is all-or-nothing: any defect fails the whole invocation.

use std::fs;
use std::path::Path;

use tracing::{info, instrument};

use scene_kernel::bezier::BezierPatch;
use scene_kernel::geometry::Point3;

use crate::errors::PatchError;

/// Indices per patch: a bicubic patch references a 4x4 control grid.
const PATCH_INDICES: usize = 16;

/// Parse the text of a patch file into ready-to-tessellate patches.
pub fn parse_patches(text: &str) -> Result<Vec<BezierPatch>, PatchError> {
    let mut lines = text
        .lines()
        .enumerate()
        .map(|(i, l)| (i + 1, l.trim()))
        .filter(|(_, l)| !l.is_empty());

    let patch_count = next_count(&mut lines, "patch count")?;
    let mut index_sets: Vec<(usize, Vec<usize>)> = Vec::with_capacity(patch_count);
    for _ in 0..patch_count {
        let (line_no, line) = next_line(&mut lines, "patch index row")?;
        let indices = split_fields(line)
            .map(|tok| parse_usize(tok, line_no))
            .collect::<Result<Vec<_>, _>>()?;
        if indices.len() != PATCH_INDICES {
            return Err(PatchError::MalformedPatchFile {
                line: line_no,
                reason: format!(
                    "a patch needs exactly {PATCH_INDICES} control point indices, found {}",
                    indices.len()
                ),
            });
        }
        index_sets.push((line_no, indices));
    }

    let point_count = next_count(&mut lines, "control point count")?;
    let mut pool = Vec::with_capacity(point_count);
    for _ in 0..point_count {
        let (line_no, line) = next_line(&mut lines, "control point")?;
        let coords = split_fields(line)
            .map(|tok| parse_f32(tok, line_no))
            .collect::<Result<Vec<_>, _>>()?;
        if coords.len() != 3 {
            return Err(PatchError::MalformedPatchFile {
                line: line_no,
                reason: format!("a control point needs 3 coordinates, found {}", coords.len()),
            });
        }
        pool.push(Point3::new(coords[0], coords[1], coords[2]));
    }

    let mut patches = Vec::with_capacity(index_sets.len());
    for (_, indices) in index_sets {
        let mut points = [Point3::ORIGIN; PATCH_INDICES];
        for (slot, &index) in points.iter_mut().zip(&indices) {
            *slot = *pool.get(index).ok_or(PatchError::IndexOutOfRange {
                index,
                len: pool.len(),
            })?;
        }
        patches.push(BezierPatch::from_points(points));
    }
    Ok(patches)
}

/// Load and parse a patch file from disk.
#[instrument]
pub fn load_patches(path: &Path) -> Result<Vec<BezierPatch>, PatchError> {
    let text = fs::read_to_string(path)?;
    let patches = parse_patches(&text)?;
    info!(?path, patches = patches.len(), "loaded bezier patch file");
    Ok(patches)
}

/// Fields may be separated by commas, whitespace, or both.
fn split_fields(line: &str) -> impl Iterator<Item = &str> {
    line.split(|c: char| c == ',' || c.is_whitespace())
        .filter(|tok| !tok.is_empty())
}

type NumberedLine<'a> = (usize, &'a str);

fn next_line<'a>(
    lines: &mut impl Iterator<Item = NumberedLine<'a>>,
    what: &str,
) -> Result<NumberedLine<'a>, PatchError> {
    lines.next().ok_or_else(|| PatchError::MalformedPatchFile {
        line: 0,
        reason: format!("file ended while expecting {what}"),
    })
}

fn next_count<'a>(
    lines: &mut impl Iterator<Item = NumberedLine<'a>>,
    what: &str,
) -> Result<usize, PatchError> {
    let (line_no, line) = next_line(lines, what)?;
    parse_usize(line, line_no)
}

fn parse_usize(token: &str, line: usize) -> Result<usize, PatchError> {
    token.parse().map_err(|_| PatchError::MalformedPatchFile {
        line,
        reason: format!("not an integer: {token:?}"),
    })
}

fn parse_f32(token: &str, line: usize) -> Result<f32, PatchError> {
    token.parse().map_err(|_| PatchError::MalformedPatchFile {
        line,
        reason: format!("not a number: {token:?}"),
    })
}
