use std::path::PathBuf;

use calcium_dff::config::PipelineConfig;
use calcium_dff::logging::init_logging;
use calcium_dff::run_pipeline;
use clap::Parser;

#[derive(Debug, Parser)]
#[command(author, version, about = "Synthetic calcium trace ΔF/F pipeline demo")]
struct Cli {
    /// Directory for the CSV, plot and summary outputs
    #[arg(long, default_value = ".")]
    output: PathBuf,

    /// TOML file overriding the built-in demo parameters
    #[arg(long)]
    config: Option<PathBuf>,

    /// Random seed
    #[arg(long)]
    seed: Option<u64>,

    /// Number of simulated frames; spikes past the end are dropped
    #[arg(long)]
    frames: Option<usize>,

    /// Threshold multiplier k in mean + k * std
    #[arg(long)]
    threshold_k: Option<f64>,
}

fn main() -> anyhow::Result<()> {
    init_logging()?;
    let cli = Cli::parse();

    let mut cfg = match &cli.config {
        Some(path) => PipelineConfig::from_toml_file(path)?,
        None => PipelineConfig::default(),
    };
    if let Some(v) = cli.seed {
        cfg.seed = v;
    }
    if let Some(v) = cli.frames {
        cfg.set_frames(v);
    }
    if let Some(v) = cli.threshold_k {
        cfg.threshold_k = v;
    }

    let summary = run_pipeline(&cfg, &cli.output)?;

    println!("Done.");
    println!("F0 = {:.3}", summary.f0);
    println!("Threshold (ΔF/F) = {:.4}", summary.threshold);
    println!(
        "Detected frames (1-based): {:?} ... (total {})",
        summary.first_event_frames, summary.event_count
    );
    println!(
        "Generated files: {}, {}, {}",
        summary.outputs.trace_csv_path.display(),
        summary.outputs.events_csv_path.display(),
        summary.outputs.plot_path.display()
    );
    println!("Summary: {}", summary.outputs.summary_path.display());

    Ok(())
}
