//! Main entry point for the holoforge display

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;

use holoforge::{Command, HoloConfig, HoloScene, ShapeKind};

#[derive(Parser)]
#[command(name = "holoforge")]
#[command(about = "Rotating holographic wireframes with a flowing particle aura", long_about = None)]
#[command(version)]
struct Cli {
    /// JSON config file; missing fields take their defaults
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Write the effective config to this file and exit
    #[arg(long, value_name = "PATH")]
    write_config: Option<PathBuf>,

    /// Shape to start with (1-7, see --list-shapes)
    #[arg(short, long, default_value_t = 1)]
    shape: usize,

    /// Override the number of particles
    #[arg(short, long)]
    particles: Option<u32>,

    /// Start with rotation and the shape cycle stopped
    #[arg(long)]
    frozen: bool,

    /// Print the shape catalogue and exit
    #[arg(long)]
    list_shapes: bool,

    /// Verbosity level (can be repeated for more detail)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long)]
    quiet: bool,
}

impl Cli {
    fn log_filter(&self) -> &'static str {
        if self.quiet {
            return "error";
        }
        match self.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(cli.log_filter()))
        .init();

    if cli.list_shapes {
        for (i, kind) in ShapeKind::ALL.iter().enumerate() {
            println!("{}  {}", i + 1, kind);
        }
        return Ok(());
    }

    let mut config = match &cli.config {
        Some(path) => HoloConfig::load(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => HoloConfig::default(),
    };
    if let Some(count) = cli.particles {
        config.particles.count = count;
    }

    if let Some(path) = &cli.write_config {
        config
            .save(path)
            .with_context(|| format!("Failed to write config to {}", path.display()))?;
        log::info!("Wrote config to {}", path.display());
        return Ok(());
    }

    if cli.shape == 0 || cli.shape > ShapeKind::ALL.len() {
        bail!(
            "Shape must be between 1 and {}, got {}",
            ShapeKind::ALL.len(),
            cli.shape
        );
    }

    let mut scene = HoloScene::new(&config, cli.shape - 1);
    if cli.frozen {
        scene.apply(Command::ToggleFreeze);
    }

    holoforge::window::run(config, scene).context("Display stopped with an error")
}
