use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use accidents::{config::Config, pipeline, render::ChartFormat};

#[derive(Parser, Debug)]
#[command(author, version, about = "Accident dataset charts and hotspot map", long_about = None)]
struct Cli {
    /// YAML config; flags below override it
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Accident records CSV
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Where charts and the heat map are written
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Chart file format (png | svg)
    #[arg(short, long)]
    format: Option<ChartFormat>,

    /// Points drawn on the heat map
    #[arg(long)]
    sample_size: Option<usize>,

    /// Seed for reproducible point sampling
    #[arg(long)]
    seed: Option<u64>,

    /// Skip the shape/info/describe printout
    #[arg(long)]
    no_summary: bool,
}

impl Cli {
    fn into_config(self) -> Result<Config> {
        let mut cfg = match &self.config {
            Some(path) => Config::from_yaml_file(path)?,
            None => Config::default(),
        };
        if let Some(input) = self.input {
            cfg.input = input;
        }
        if let Some(dir) = self.output_dir {
            cfg.output_dir = dir;
        }
        if let Some(format) = self.format {
            cfg.format = format;
        }
        if let Some(n) = self.sample_size {
            cfg.map.sample_size = n;
        }
        if self.seed.is_some() {
            cfg.map.seed = self.seed;
        }
        if self.no_summary {
            cfg.print_summary = false;
        }
        Ok(cfg)
    }
}

fn main() -> Result<()> {
    // ─── 1) init logging ─────────────────────────────────────────────
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_writer(std::io::stderr)
        .init();

    // ─── 2) layer config: defaults < YAML < flags ────────────────────
    let config = Cli::parse().into_config()?;
    info!(input = %config.input.display(), output = %config.output_dir.display(), "startup");

    // ─── 3) load → prune → features → charts → heat map ──────────────
    let report = pipeline::run(&config)?;

    for path in &report.charts {
        println!("Chart saved to {}", path.display());
    }
    println!("Heatmap saved to {}", report.heatmap.display());
    Ok(())
}
