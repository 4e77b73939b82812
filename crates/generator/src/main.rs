//! Offline mesh generator: writes primitive and Bézier surface meshes to
//! the text format the engine loads at scene-construction time.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing::error;
use tracing_subscriber::EnvFilter;

use file_format::{
    load_patches, write_mesh, MeshEncoding, MeshFileFormat, MeshHeader, MeshIoError, PatchError,
};
use scene_kernel::bezier;
use scene_kernel::primitives::{self, GenerateError};

#[derive(Parser, Debug)]
#[command(name = "generator")]
#[command(about = "Generate primitive and Bezier surface meshes", long_about = None)]
struct Cli {
    /// Write the legacy position-only variant instead of full vertices.
    #[arg(long)]
    legacy: bool,

    /// Prefix the file with a vertex count line.
    #[arg(long)]
    count_header: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Unit square in the XZ plane.
    Plane {
        unit: f32,
        slices: u32,
        output: PathBuf,
    },
    /// Axis-aligned cube.
    #[command(name = "box")]
    Cuboid {
        unit: f32,
        slices: u32,
        output: PathBuf,
    },
    /// Cone with base on the XZ plane.
    Cone {
        radius: f32,
        height: f32,
        slices: u32,
        stacks: u32,
        output: PathBuf,
    },
    /// Sphere centred at the origin.
    Sphere {
        radius: f32,
        slices: u32,
        stacks: u32,
        output: PathBuf,
    },
    /// Torus around the Y axis.
    Torus {
        major_radius: f32,
        minor_radius: f32,
        slices: u32,
        stacks: u32,
        output: PathBuf,
    },
    /// Tessellate a Bezier patch file.
    Bezier {
        patch_file: PathBuf,
        level: u32,
        output: PathBuf,
    },
}

#[derive(Debug, thiserror::Error)]
enum GeneratorError {
    #[error(transparent)]
    Generate(#[from] GenerateError),

    #[error(transparent)]
    Patch(#[from] PatchError),

    #[error(transparent)]
    MeshIo(#[from] MeshIoError),
}

fn run(cli: Cli) -> Result<(), GeneratorError> {
    let format = MeshFileFormat {
        encoding: if cli.legacy {
            MeshEncoding::PositionOnly
        } else {
            MeshEncoding::Full
        },
        header: if cli.count_header {
            MeshHeader::VertexCount
        } else {
            MeshHeader::None
        },
    };

    let (mesh, output) = match cli.command {
        Command::Plane {
            unit,
            slices,
            output,
        } => (primitives::plane(unit, slices)?, output),
        Command::Cuboid {
            unit,
            slices,
            output,
        } => (primitives::cuboid(unit, slices)?, output),
        Command::Cone {
            radius,
            height,
            slices,
            stacks,
            output,
        } => (primitives::cone(radius, height, slices, stacks)?, output),
        Command::Sphere {
            radius,
            slices,
            stacks,
            output,
        } => (primitives::sphere(radius, slices, stacks)?, output),
        Command::Torus {
            major_radius,
            minor_radius,
            slices,
            stacks,
            output,
        } => (
            primitives::torus(major_radius, minor_radius, slices, stacks)?,
            output,
        ),
        Command::Bezier {
            patch_file,
            level,
            output,
        } => {
            let patches = load_patches(&patch_file)?;
            (bezier::tessellate(&patches, level)?, output)
        }
    };

    write_mesh(&output, &mesh, format)?;
    Ok(())
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}
