use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use csv::WriterBuilder;
use plotters::prelude::*;
use plotters::series::DashedLineSeries;
use serde::Serialize;

use crate::config::PipelineConfig;
use crate::detect::Event;

pub const TRACE_CSV: &str = "raw_trace_dfF.csv";
pub const EVENTS_CSV: &str = "events.csv";
pub const QC_PLOT: &str = "trace_qc.png";
pub const SUMMARY_JSON: &str = "run_summary.json";

/// Frames listed in the console report before eliding the rest.
pub const REPORTED_FRAMES: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TraceRecord {
    /// 1-based frame number
    pub frame: usize,
    pub raw: f64,
    pub dff: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct OutputFiles {
    pub output_dir: PathBuf,
    pub trace_csv_path: PathBuf,
    pub events_csv_path: PathBuf,
    pub plot_path: PathBuf,
    pub summary_path: PathBuf,
}

impl OutputFiles {
    pub fn in_dir(output_dir: &Path) -> Self {
        Self {
            output_dir: output_dir.to_path_buf(),
            trace_csv_path: output_dir.join(TRACE_CSV),
            events_csv_path: output_dir.join(EVENTS_CSV),
            plot_path: output_dir.join(QC_PLOT),
            summary_path: output_dir.join(SUMMARY_JSON),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Summary {
    pub config: PipelineConfig,
    pub frames: usize,
    pub f0: f64,
    pub threshold: f64,
    pub event_count: usize,
    /// First detected frames, 1-based
    pub first_event_frames: Vec<usize>,
    pub outputs: OutputFiles,
}

pub fn trace_records(raw: &[f64], dff: &[f64]) -> Vec<TraceRecord> {
    raw.iter()
        .zip(dff)
        .enumerate()
        .map(|(i, (&raw, &dff))| TraceRecord {
            frame: i + 1,
            raw,
            dff,
        })
        .collect()
}

fn ensure_parent(path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create output directory: {}", parent.display()))?;
    }
    Ok(())
}

pub fn write_trace_csv(path: &Path, records: &[TraceRecord]) -> anyhow::Result<()> {
    ensure_parent(path)?;
    let mut wtr = WriterBuilder::new()
        .has_headers(false)
        .from_path(path)
        .with_context(|| format!("failed to open {TRACE_CSV} for writing: {}", path.display()))?;

    wtr.write_record(["Frame", "Raw", "DeltaF/F"])?;
    for r in records {
        wtr.write_record([
            r.frame.to_string(),
            format!("{:.2}", r.raw),
            format!("{:.3}", r.dff),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}

pub fn write_events_csv(path: &Path, events: &[Event]) -> anyhow::Result<()> {
    ensure_parent(path)?;
    let mut wtr = WriterBuilder::new()
        .has_headers(false)
        .from_path(path)
        .with_context(|| format!("failed to open {EVENTS_CSV} for writing: {}", path.display()))?;

    wtr.write_record(["Frame", "Value"])?;
    for e in events {
        wtr.write_record([e.frame.to_string(), format!("{:.3}", e.value)])?;
    }

    wtr.flush()?;
    Ok(())
}

pub fn write_summary(path: &Path, summary: &Summary) -> anyhow::Result<()> {
    ensure_parent(path)?;
    let data = serde_json::to_string_pretty(summary).context("failed to serialize run summary")?;
    fs::write(path, data)
        .with_context(|| format!("failed to write run summary: {}", path.display()))?;
    Ok(())
}

/// ΔF/F trace with detected events overlaid and a dashed zero line.
pub fn plot_trace_qc(path: &Path, dff: &[f64], events: &[Event]) -> anyhow::Result<()> {
    ensure_parent(path)?;

    let root = BitMapBackend::new(path, (2000, 800)).into_drawing_area();
    root.fill(&WHITE)?;

    let max_frame = dff.len().max(1) as f64;
    let (lo, hi) = dff
        .iter()
        .fold((0.0_f64, 0.0_f64), |(lo, hi), &v| (lo.min(v), hi.max(v)));
    let pad = ((hi - lo) * 0.05).max(0.01);

    let mut chart = ChartBuilder::on(&root)
        .caption(
            "Simulated Ca²⁺ Trace with Detected Peaks (Toy Demo)",
            ("sans-serif", 40).into_font(),
        )
        .margin(24)
        .x_label_area_size(60)
        .y_label_area_size(90)
        .build_cartesian_2d(0.0..max_frame, (lo - pad)..(hi + pad))?;

    chart
        .configure_mesh()
        .disable_mesh()
        .x_desc("Frame")
        .y_desc("ΔF/F")
        .label_style(("sans-serif", 22))
        .draw()?;

    chart
        .draw_series(LineSeries::new(
            dff.iter().enumerate().map(|(i, &v)| ((i + 1) as f64, v)),
            BLUE.stroke_width(2),
        ))?
        .label("ΔF/F")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 25, y)], BLUE.stroke_width(3)));

    chart
        .draw_series(
            events
                .iter()
                .map(|e| Circle::new((e.frame as f64, e.value), 6, RED.filled())),
        )?
        .label("Detected events")
        .legend(|(x, y)| Circle::new((x + 12, y), 6, RED.filled()));

    chart.draw_series(DashedLineSeries::new(
        vec![(0.0, 0.0), (max_frame, 0.0)],
        12,
        8,
        BLACK.stroke_width(1),
    ))?;

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperRight)
        .label_font(("sans-serif", 22))
        .border_style(BLACK)
        .background_style(WHITE.mix(0.7))
        .draw()?;

    root.present()
        .with_context(|| format!("failed to write plot: {}", path.display()))?;
    Ok(())
}
