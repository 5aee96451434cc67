//! Application entry point for the 3D DLA viewer.
//!
//! This binary loads a [`Config`] (YAML file plus command-line overrides),
//! then either runs the simulation headless for a fixed number of ticks or
//! hands it to [`Viewer`] from the `viewer` module.

mod camera;
mod viewer;

use anyhow::{Context, Result, anyhow};
use clap::{Parser, ValueEnum};
use dla_core::{Config, NeighborPolicy, Simulator};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::PathBuf;
use tracing::info;
use viewer::Viewer;

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum PolicyArg {
    /// Search only particles attached before the step began.
    Snapshot,
    /// Let particles attached earlier in a pass act as targets immediately.
    Live,
}

impl From<PolicyArg> for NeighborPolicy {
    fn from(arg: PolicyArg) -> Self {
        match arg {
            PolicyArg::Snapshot => NeighborPolicy::StepSnapshot,
            PolicyArg::Live => NeighborPolicy::LiveScan,
        }
    }
}

#[derive(Parser, Debug)]
#[command(about = "Diffusion-limited aggregation in a 3D box")]
struct Args {
    /// YAML file with simulation parameters; missing keys take defaults.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// RNG seed for a reproducible run.
    #[arg(long)]
    seed: Option<u64>,

    /// Number of free particles.
    #[arg(short = 'n', long)]
    particles: Option<usize>,

    /// How the neighbor search treats attachments made mid-step.
    #[arg(long, value_enum)]
    policy: Option<PolicyArg>,

    /// Run this many ticks without a window and print a summary.
    #[arg(long, value_name = "TICKS")]
    headless: Option<u64>,
}

fn config_from_yaml(reader: impl Read) -> Result<Config> {
    let cfg: Config = serde_yaml::from_reader(reader)?;
    Ok(cfg)
}

/// Builds the configuration from the optional file and the overrides.
fn load_config(args: &Args) -> Result<Config> {
    let mut cfg = match &args.config {
        Some(path) => {
            let file = File::open(path)
                .with_context(|| format!("failed to open config {}", path.display()))?;
            config_from_yaml(BufReader::new(file))
                .with_context(|| format!("failed to parse config {}", path.display()))?
        }
        None => Config::default(),
    };

    if let Some(seed) = args.seed {
        cfg.seed = Some(seed);
    }
    if let Some(n) = args.particles {
        cfg.particle_count = n;
    }
    if let Some(policy) = args.policy {
        cfg.neighbor_policy = policy.into();
    }
    Ok(cfg)
}

/// Runs `ticks` steps with no window, logging cluster growth along the way.
fn run_headless(cfg: Config, ticks: u64) -> Result<Simulator> {
    let mut sim = Simulator::new(cfg)?;
    let report_every = (ticks / 10).max(1);

    for _ in 0..ticks {
        sim.step();
        if sim.tick() % report_every == 0 {
            info!(
                tick = sim.tick(),
                attached = sim.attached_count(),
                free = sim.free_count(),
                "progress"
            );
        }
    }
    Ok(sim)
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}

fn main() -> Result<()> {
    init_tracing();
    let args = Args::parse();
    let cfg = load_config(&args)?;

    if let Some(ticks) = args.headless {
        let sim = run_headless(cfg, ticks)?;
        println!(
            "seed {} | tick {} | attached {} | free {}",
            sim.seed(),
            sim.tick(),
            sim.attached_count(),
            sim.free_count()
        );
        return Ok(());
    }

    let viewer = Viewer::new(cfg)?;
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default().with_inner_size([800.0, 600.0]),
        ..Default::default()
    };

    info!("opening viewer");
    eframe::run_native(
        "3D DLA Aggregation",
        options,
        Box::new(move |_cc| Ok(Box::new(viewer))),
    )
    .map_err(|err| anyhow!("viewer exited with an error: {err}"))
}
