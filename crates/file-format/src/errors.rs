use scene_kernel::MeshError;

/// Errors while reading or writing mesh files.
#[derive(Debug, thiserror::Error)]
pub enum MeshIoError {
    #[error("i/o failure: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed line {line}: {reason}")]
    MalformedLine { line: usize, reason: String },

    #[error("header declares {declared} vertices but file contains {actual}")]
    CountMismatch { declared: usize, actual: usize },

    #[error("full encoding requires normals and texture coordinates")]
    MissingAttributes,

    #[error("file does not describe a valid mesh: {0}")]
    InvalidMesh(#[from] MeshError),
}

/// Errors while parsing a Bézier patch file.
#[derive(Debug, thiserror::Error)]
pub enum PatchError {
    #[error("i/o failure: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed patch file at line {line}: {reason}")]
    MalformedPatchFile { line: usize, reason: String },

    #[error("control point index {index} out of range (pool has {len})")]
    IndexOutOfRange { index: usize, len: usize },
}
