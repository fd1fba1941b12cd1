//! geobrep CLI - BRep reconstruction of geoscience models
//!
//! Reads a JSON input description, reconstructs and orients the model, and
//! writes a reloadable JSON snapshot (and optionally a GOCAD Model3d).

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use geobrep_export::{save_model3d, ModelSnapshot};
use geobrep_reconstruct::{
    reconstruct_from_surfaces, reconstruct_from_volume, Reconstruction, SurfaceModelInput,
    VolumeModelInput,
};
use geobrep_topo::{BRepModel, CollectionKind, Incidence, Region};
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;

mod config;

use config::Config;

#[derive(Parser)]
#[command(name = "geobrep")]
#[command(about = "Boundary-representation reconstruction for geoscience meshes", long_about = None)]
struct Cli {
    /// Log debug details
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Reconstruct a model from a JSON input description
    Reconstruct {
        /// Input description (.json)
        input: PathBuf,
        /// Output snapshot (.json)
        #[arg(short, long)]
        output: PathBuf,
        /// Kind of input (default: detected from its fields)
        #[arg(short, long, value_enum)]
        kind: Option<InputKind>,
        /// TOML file with reconstruction parameters
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Also write a GOCAD Model3d file
        #[arg(long)]
        model3d: Option<PathBuf>,
    },
    /// Display information about a model snapshot
    Info {
        /// Path to the snapshot
        file: PathBuf,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum InputKind {
    /// Independent surface patches and block descriptions
    Surfaces,
    /// Tetrahedral mesh with surfaces on its facets
    Volume,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Reconstruct {
            input,
            output,
            kind,
            config,
            model3d,
        } => {
            let config = Config::load(config.as_deref())?;
            reconstruct(&input, &output, kind, &config, model3d.as_deref())?;
        }
        Commands::Info { file } => {
            show_info(&file)?;
        }
    }

    Ok(())
}

/// `RUST_LOG` wins over the verbosity flag.
fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Volume inputs are the ones carrying tetrahedra.
fn detect_kind(json: &serde_json::Value) -> InputKind {
    if json.get("tetrahedra").is_some() {
        InputKind::Volume
    } else {
        InputKind::Surfaces
    }
}

fn reconstruct(
    input: &Path,
    output: &Path,
    kind: Option<InputKind>,
    config: &Config,
    model3d: Option<&Path>,
) -> Result<()> {
    let text = std::fs::read_to_string(input)
        .with_context(|| format!("Failed to read {}", input.display()))?;
    let json: serde_json::Value =
        serde_json::from_str(&text).with_context(|| format!("Invalid JSON in {}", input.display()))?;
    let kind = kind.unwrap_or_else(|| detect_kind(&json));
    let params = &config.reconstruction;
    info!(input = %input.display(), ?kind, "Reconstructing");

    let mut reconstruction: Reconstruction = match kind {
        InputKind::Surfaces => {
            let description: SurfaceModelInput =
                serde_json::from_value(json).context("Invalid surface model description")?;
            reconstruct_from_surfaces(&description, params)?
        }
        InputKind::Volume => {
            let description: VolumeModelInput =
                serde_json::from_value(json).context("Invalid volume model description")?;
            reconstruct_from_volume(&description, params)?
        }
    };
    let sides = reconstruction.orient(params)?;
    let model = &reconstruction.model;

    ModelSnapshot::save(model, output)
        .with_context(|| format!("Failed to write {}", output.display()))?;
    println!("Wrote snapshot to {}", output.display());
    if let Some(path) = model3d {
        save_model3d(model, &sides, path)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        println!("Wrote Model3d to {}", path.display());
    }

    print_summary(model);
    let entries = model.inspection().entries();
    if !entries.is_empty() {
        println!("\nNeeds inspection ({} entries):", entries.len());
        for entry in entries {
            println!("  {}", entry.describe(model));
        }
    }
    Ok(())
}

fn print_summary(model: &BRepModel) {
    println!("\nModel: {}", model.name);
    println!("  Corners: {}", model.corners.len());
    println!("  Lines: {}", model.lines.len());
    println!("  Surfaces: {}", model.surfaces.len());
    println!("  Blocks: {}", model.blocks.len());
    println!(
        "  Collections: {} boundary, {} horizon, {} fault",
        model.nb_collections_of_kind(CollectionKind::ModelBoundary),
        model.nb_collections_of_kind(CollectionKind::Horizon),
        model.nb_collections_of_kind(CollectionKind::Fault)
    );
    println!(
        "  Surface-block relations: {} boundary, {} internal",
        model.nb_surface_block_relations(Incidence::Boundary),
        model.nb_surface_block_relations(Incidence::Internal)
    );
    println!(
        "  Universe boundary: {} surfaces",
        model.region_boundaries(Region::Universe).len()
    );
}

fn show_info(file: &Path) -> Result<()> {
    let json = std::fs::read_to_string(file)
        .with_context(|| format!("Failed to read {}", file.display()))?;
    let snapshot = ModelSnapshot::from_json(&json)?;
    let inspection = snapshot.inspection.clone();
    let model = snapshot.into_model()?;

    println!("geobrep snapshot: {}", file.display());
    print_summary(&model);
    println!("  Unique vertices: {}", model.vertices().nb_unique_vertices());

    if !model.blocks.is_empty() {
        println!("\nBlocks:");
        for (block, data) in &model.blocks {
            println!(
                "  {}: {} boundaries, {} internal, {} tetrahedra",
                data.name,
                model.block_boundaries(block).len(),
                model.block_internals(block).len(),
                data.polyhedra.len()
            );
        }
    }
    if !inspection.is_empty() {
        println!("\nNeeds inspection ({} entries):", inspection.len());
        for entry in &inspection {
            println!("  {entry}");
        }
    }
    Ok(())
}
