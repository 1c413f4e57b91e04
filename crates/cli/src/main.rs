//! U-Arrange command-line arranger

use std::fs;
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use u_arrange_cli::{run, RunOptions, SceneFile};
use u_arrange_plater::JobOutcome;

#[derive(Parser)]
#[command(name = "arrange")]
#[command(about = "Arrange the objects of a plater scene onto virtual beds")]
#[command(version)]
struct Cli {
    /// Scene file (JSON)
    scene: PathBuf,

    /// Arrange only the selected instances
    #[arg(long)]
    selected: bool,

    /// Allow rotations
    #[arg(long)]
    rotate: bool,

    /// Minimum distance between objects in mm (overrides the scene setting)
    #[arg(long, value_name = "MM")]
    distance: Option<f64>,

    /// Output file (defaults to stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();
    let cli = Cli::parse();

    let json = fs::read_to_string(&cli.scene)
        .with_context(|| format!("Failed to read {}", cli.scene.display()))?;
    let scene = SceneFile::from_json(&json)
        .with_context(|| format!("Failed to parse {}", cli.scene.display()))?;

    let options = RunOptions {
        selected: cli.selected,
        rotate: cli.rotate,
        distance: cli.distance,
    };
    let (scene, outcome) = run(scene, &options)?;

    match outcome {
        JobOutcome::Finished => {}
        JobOutcome::Cancelled => anyhow::bail!("Arrange was cancelled"),
        JobOutcome::Failed(err) => anyhow::bail!("Arrange failed: {}", err),
    }

    let out = scene.to_json()?;
    match cli.output {
        Some(path) => {
            fs::write(&path, out).with_context(|| format!("Failed to write {}", path.display()))?;
            log::info!("Scene saved to: {}", path.display());
        }
        None => println!("{}", out),
    }

    Ok(())
}
