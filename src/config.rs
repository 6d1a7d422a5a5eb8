use std::fs;
use std::path::Path;

use anyhow::{ensure, Context};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// A single artificial transient added on top of the noise floor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Spike {
    /// 0-based frame index
    pub frame: usize,
    /// Added fluorescence [a.u.]
    pub amplitude: f64,
}

impl Spike {
    pub fn new(frame: usize, amplitude: f64) -> Self {
        Self { frame, amplitude }
    }
}

/// Runtime configuration for the synthetic ΔF/F pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Number of simulated frames
    pub frames: usize,
    /// Mean fluorescence of the noise floor [a.u.]
    pub baseline_value: f64,
    /// Standard deviation of the noise floor [a.u.]
    pub noise_sigma: f64,
    /// RNG seed for reproducibility
    pub seed: u64,
    /// Leading frames averaged into F0
    pub baseline_frames: usize,
    /// Threshold = mean + k * std of the ΔF/F trace
    pub threshold_k: f64,
    /// Injected transients
    pub spikes: Vec<Spike>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            frames: 1000,
            baseline_value: 50.0,
            noise_sigma: 2.0,
            seed: 0,
            baseline_frames: 100,
            threshold_k: 1.5,
            spikes: vec![
                Spike::new(100, 52.0),
                Spike::new(250, 58.0),
                Spike::new(500, 51.0),
                Spike::new(750, 42.0),
                Spike::new(900, 47.0),
            ],
        }
    }
}

impl PipelineConfig {
    pub fn from_toml_file(path: &Path) -> anyhow::Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;
        let cfg: PipelineConfig = toml::from_str(&raw)
            .with_context(|| format!("failed to parse TOML config: {}", path.display()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Change the trace length, dropping spikes past the new end and
    /// shortening the baseline window if it no longer fits.
    pub fn set_frames(&mut self, frames: usize) {
        self.frames = frames;
        self.spikes.retain(|spike| {
            let keep = spike.frame < frames;
            if !keep {
                warn!(frame = spike.frame, frames, "dropping spike outside trace");
            }
            keep
        });
        if frames > 0 && self.baseline_frames > frames {
            warn!(
                baseline_frames = self.baseline_frames,
                frames, "shortening baseline window to trace length"
            );
            self.baseline_frames = frames;
        }
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        ensure!(self.frames > 0, "frames must be > 0");
        ensure!(
            self.baseline_value.is_finite(),
            "baseline_value must be finite"
        );
        ensure!(
            self.noise_sigma.is_finite() && self.noise_sigma >= 0.0,
            "noise_sigma must be finite and >= 0"
        );
        ensure!(self.baseline_frames > 0, "baseline_frames must be > 0");
        ensure!(
            self.baseline_frames <= self.frames,
            "baseline_frames ({}) must not exceed frames ({})",
            self.baseline_frames,
            self.frames
        );
        ensure!(self.threshold_k.is_finite(), "threshold_k must be finite");
        for spike in &self.spikes {
            ensure!(
                spike.frame < self.frames,
                "spike frame {} out of range for {} frames",
                spike.frame,
                self.frames
            );
            ensure!(
                spike.amplitude.is_finite(),
                "spike amplitude at frame {} must be finite",
                spike.frame
            );
        }
        Ok(())
    }
}
