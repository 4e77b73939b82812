pub mod errors;
pub mod mesh_io;
pub mod patch;

pub use errors::{MeshIoError, PatchError};
pub use mesh_io::{
    format_mesh, parse_mesh, read_mesh, write_mesh, MeshEncoding, MeshFileFormat, MeshHeader,
};
pub use patch::{load_patches, parse_patches};
