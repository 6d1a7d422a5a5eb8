//! Synthetic fluorescence trace generation
//!
//! Draws a seeded Gaussian noise floor and adds the configured transients on top.

use anyhow::{ensure, Context};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, Normal};
use tracing::debug;

use crate::config::{PipelineConfig, Spike};

/// Draw `cfg.frames` samples from `Normal(baseline_value, noise_sigma)`.
pub fn generate_raw_trace(cfg: &PipelineConfig) -> anyhow::Result<Vec<f64>> {
    let mut rng = ChaCha8Rng::seed_from_u64(cfg.seed);
    let noise = Normal::new(cfg.baseline_value, cfg.noise_sigma)
        .context("failed to create fluorescence noise distribution")?;

    Ok((0..cfg.frames).map(|_| noise.sample(&mut rng)).collect())
}

/// Add each spike amplitude to its (0-based) frame.
pub fn inject_spikes(trace: &mut [f64], spikes: &[Spike]) -> anyhow::Result<()> {
    for spike in spikes {
        ensure!(
            spike.frame < trace.len(),
            "spike frame {} out of range for trace of {} frames",
            spike.frame,
            trace.len()
        );
        trace[spike.frame] += spike.amplitude;
        debug!(frame = spike.frame, amplitude = spike.amplitude, "injected spike");
    }
    Ok(())
}

/// Noise floor plus injected spikes.
pub fn simulate_trace(cfg: &PipelineConfig) -> anyhow::Result<Vec<f64>> {
    let mut trace = generate_raw_trace(cfg)?;
    inject_spikes(&mut trace, &cfg.spikes)?;
    Ok(trace)
}
