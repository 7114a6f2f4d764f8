//! terrain-export - procedural terrain generation tool
//!
//! Generates height-field terrains described in a terrain.toml manifest and
//! writes them as OBJ meshes (and optional 16-bit PNG height previews).

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use terrain_export::{build, manifest::TerrainManifest};

#[derive(Parser)]
#[command(name = "terrain-export")]
#[command(about = "Procedural terrain generation tool")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate every terrain in a manifest
    Build {
        /// Path to terrain.toml manifest
        #[arg(default_value = "terrain.toml")]
        manifest: PathBuf,

        /// Output directory (overrides manifest)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Random seed (overrides manifest)
        #[arg(long)]
        seed: Option<u64>,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Validate manifest without generating
    Check {
        /// Path to terrain.toml manifest
        #[arg(default_value = "terrain.toml")]
        manifest: PathBuf,
    },

    /// Generate one terrain type with default settings
    Sample {
        /// flat, stairs, ramp, noise, combined, patches, confined or confined_boxes
        kind: String,

        /// Output .obj file
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Samples along x and y
        #[arg(long, num_args = 2, value_names = ["X", "Y"], default_values_t = [100, 100])]
        resolution: Vec<usize>,

        /// Random seed
        #[arg(long)]
        seed: Option<u64>,
    },
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Build {
            manifest,
            output,
            seed,
            verbose,
        } => {
            if verbose {
                tracing::info!("Building terrains from {:?}", manifest);
            }
            let config = TerrainManifest::load(&manifest)?;
            let written = build::build_all(&config, output.as_deref(), seed)?;
            tracing::info!("Build complete! {} files written", written.len());
        }

        Commands::Check { manifest } => {
            tracing::info!("Checking manifest {:?}", manifest);
            let config = TerrainManifest::load(&manifest)?;
            let planned = build::validate(&config)?;
            tracing::info!("Manifest is valid! {} terrains", planned.len());
        }

        Commands::Sample {
            kind,
            output,
            resolution,
            seed,
        } => {
            let output = output.unwrap_or_else(|| PathBuf::from(format!("{}.obj", kind)));
            let [x, y] = resolution[..] else {
                anyhow::bail!("--resolution takes exactly two values");
            };
            tracing::info!("Sampling {} -> {:?}", kind, output);
            build::sample(&kind, &output, [x, y], seed)?;
            tracing::info!("Done!");
        }
    }

    Ok(())
}
