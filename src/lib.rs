//! calcium-dff - synthetic ΔF/F pipeline
//!
//! Simulates a calcium-like fluorescence trace, normalizes it against a
//! leading-window baseline, flags frames above a mean + k·std threshold and
//! exports the trace, the events and a QC plot.

pub mod config;
pub mod detect;
pub mod dff;
pub mod logging;
pub mod output;
pub mod sim;

use std::path::Path;

use tracing::{debug, info};

pub use config::{PipelineConfig, Spike};
pub use detect::Event;
pub use output::{OutputFiles, Summary};

use crate::detect::{detect_events, event_threshold};
use crate::dff::{baseline_f0, delta_f_over_f};
use crate::output::{
    plot_trace_qc, trace_records, write_events_csv, write_summary, write_trace_csv,
    REPORTED_FRAMES,
};
use crate::sim::simulate_trace;

/// In-memory result of one pipeline pass.
#[derive(Debug, Clone)]
pub struct Analysis {
    pub raw: Vec<f64>,
    pub dff: Vec<f64>,
    pub f0: f64,
    pub threshold: f64,
    pub events: Vec<Event>,
}

/// Simulate, normalize and detect without touching the filesystem.
pub fn analyze(cfg: &PipelineConfig) -> anyhow::Result<Analysis> {
    cfg.validate()?;

    let raw = simulate_trace(cfg)?;
    let f0 = baseline_f0(&raw, cfg.baseline_frames)?;
    let dff = delta_f_over_f(&raw, f0);
    debug!(f0, frames = raw.len(), "normalized trace");

    let threshold = event_threshold(&dff, cfg.threshold_k);
    let events = detect_events(&dff, threshold);
    debug!(threshold, events = events.len(), "thresholded trace");

    Ok(Analysis {
        raw,
        dff,
        f0,
        threshold,
        events,
    })
}

/// Full pass: analyze, then write CSVs, QC plot and JSON summary into `output_dir`.
pub fn run_pipeline(cfg: &PipelineConfig, output_dir: &Path) -> anyhow::Result<Summary> {
    info!(frames = cfg.frames, seed = cfg.seed, "simulating trace");
    let analysis = analyze(cfg)?;

    let files = OutputFiles::in_dir(output_dir);
    let records = trace_records(&analysis.raw, &analysis.dff);

    write_trace_csv(&files.trace_csv_path, &records)?;
    write_events_csv(&files.events_csv_path, &analysis.events)?;
    plot_trace_qc(&files.plot_path, &analysis.dff, &analysis.events)?;

    let summary = Summary {
        config: cfg.clone(),
        frames: analysis.raw.len(),
        f0: analysis.f0,
        threshold: analysis.threshold,
        event_count: analysis.events.len(),
        first_event_frames: analysis
            .events
            .iter()
            .take(REPORTED_FRAMES)
            .map(|e| e.frame)
            .collect(),
        outputs: files.clone(),
    };
    write_summary(&files.summary_path, &summary)?;
    info!(dir = %files.output_dir.display(), "outputs written");

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn default_run_has_thousand_frames() {
        let a = analyze(&PipelineConfig::default()).unwrap();
        assert_eq!(a.raw.len(), 1000);
        assert_eq!(a.dff.len(), a.raw.len());
    }

    #[test]
    fn f0_is_mean_of_first_hundred_frames() {
        let a = analyze(&PipelineConfig::default()).unwrap();
        let expected = a.raw[..100].iter().sum::<f64>() / 100.0;
        assert_relative_eq!(a.f0, expected);
    }

    #[test]
    fn injected_spikes_are_detected() {
        let a = analyze(&PipelineConfig::default()).unwrap();
        let frames: Vec<usize> = a.events.iter().map(|e| e.frame).collect();
        for expected in [101, 251, 501, 751, 901] {
            assert!(
                frames.contains(&expected),
                "spike frame {expected} missing from {frames:?}"
            );
        }
    }

    #[test]
    fn spikes_are_detected_for_other_seeds() {
        for seed in [1, 17, 42, 2026] {
            let cfg = PipelineConfig {
                seed,
                ..PipelineConfig::default()
            };
            let a = analyze(&cfg).unwrap();
            for spike in &cfg.spikes {
                assert!(a.events.iter().any(|e| e.frame == spike.frame + 1));
            }
        }
    }

    #[test]
    fn events_exceed_threshold() {
        let a = analyze(&PipelineConfig::default()).unwrap();
        assert!(a.events.iter().all(|e| e.value > a.threshold));
        assert!(a
            .events
            .iter()
            .all(|e| a.dff[e.frame - 1] == e.value));
    }

    #[test]
    fn analysis_is_deterministic() {
        let a = analyze(&PipelineConfig::default()).unwrap();
        let b = analyze(&PipelineConfig::default()).unwrap();
        assert_eq!(a.raw, b.raw);
        assert_eq!(a.events, b.events);
        assert_eq!(a.threshold, b.threshold);
    }

    #[test]
    fn full_run_writes_every_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("nested");
        let cfg = PipelineConfig::default();

        let summary = run_pipeline(&cfg, &out).unwrap();
        let a = analyze(&cfg).unwrap();

        for path in [
            &summary.outputs.trace_csv_path,
            &summary.outputs.events_csv_path,
            &summary.outputs.plot_path,
            &summary.outputs.summary_path,
        ] {
            assert!(path.starts_with(&out));
            let len = std::fs::metadata(path).unwrap().len();
            assert!(len > 0, "{} is empty", path.display());
        }

        let json: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&summary.outputs.summary_path).unwrap())
                .unwrap();
        assert_eq!(json["frames"], 1000);
        assert_eq!(json["event_count"], a.events.len());
        let first: Vec<usize> = a.events.iter().take(10).map(|e| e.frame).collect();
        assert_eq!(json["first_event_frames"], serde_json::json!(first));

        let events = std::fs::read_to_string(&summary.outputs.events_csv_path).unwrap();
        assert!(events.starts_with("Frame,Value"));
        for frame in [101, 251, 501, 751, 901] {
            let prefix = format!("{frame},");
            assert!(
                events.lines().any(|l| l.starts_with(&prefix)),
                "events.csv missing frame {frame}"
            );
        }

        let trace = std::fs::read_to_string(&summary.outputs.trace_csv_path).unwrap();
        assert_eq!(trace.lines().count(), 1001);
    }

    #[test]
    fn invalid_config_is_rejected() {
        let cfg = PipelineConfig {
            frames: 0,
            ..PipelineConfig::default()
        };
        assert!(analyze(&cfg).is_err());
    }
}
