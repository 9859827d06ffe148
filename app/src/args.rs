//! Command line arguments.
//!
//! Every shape option is optional on the command line; unset options fall
//! back to `primstage.toml` and then to built-in defaults.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// primstage command line.
#[derive(Parser, Debug)]
#[command(
    name = "primstage",
    about = "Generate parametric primitives and inspect primstage layers",
    long_about = "Generate parametric primitive meshes into primstage scene layers,\n\
        inspect saved layers, and export them as USD ASCII.\n\
        \n\
        EXAMPLES:\n\
          # Capped cone with 32 segments\n\
          primstage cone --resolution 32 --base-cap\n\
        \n\
          # Binary icosphere\n\
          primstage icosphere --subdivision 3 --binary\n\
        \n\
          # Report every layer in the output directory\n\
          primstage inspect",
    version
)]
pub struct Cli {
    /// Configuration file. Defaults to ./primstage.toml when present.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Generate a cone.
    Cone(ConeArgs),
    /// Generate a latitude/longitude sphere.
    Sphere(SphereArgs),
    /// Generate a subdivided icosahedron.
    Icosphere(IcosphereArgs),
    /// Print hierarchy, mesh sizes, file info and metadata of layers.
    ///
    /// Without files, every layer in the configured output directory is
    /// inspected.
    Inspect {
        files: Vec<PathBuf>,
    },
    /// Write a layer out as USD ASCII.
    ExportUsda {
        input: PathBuf,
        output: PathBuf,
    },
}

/// Where and how a generated layer is written.
#[derive(Args, Debug, Default)]
pub struct OutputArgs {
    /// Destination file. Defaults to `<output dir>/<shape>.pstage`.
    #[arg(long, short)]
    pub output: Option<PathBuf>,

    /// Write a binary layer instead of text.
    #[arg(long)]
    pub binary: bool,
}

#[derive(Args, Debug, Default)]
pub struct ConeArgs {
    /// Number of base ring points (at least 3).
    #[arg(long)]
    pub resolution: Option<u32>,
    /// Apex height.
    #[arg(long)]
    pub height: Option<f32>,
    /// Base radius.
    #[arg(long)]
    pub radius: Option<f32>,
    /// Close the bottom with an N-gon.
    #[arg(long)]
    pub base_cap: bool,
    #[command(flatten)]
    pub output: OutputArgs,
}

#[derive(Args, Debug, Default)]
pub struct SphereArgs {
    /// Number of rings and segments (at least 3).
    #[arg(long)]
    pub resolution: Option<u32>,
    #[arg(long)]
    pub radius: Option<f32>,
    #[command(flatten)]
    pub output: OutputArgs,
}

#[derive(Args, Debug, Default)]
pub struct IcosphereArgs {
    #[arg(long)]
    pub radius: Option<f32>,
    /// Midpoint subdivision rounds (0 to 6).
    #[arg(long)]
    pub subdivision: Option<u32>,
    #[command(flatten)]
    pub output: OutputArgs,
}
