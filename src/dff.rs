use anyhow::ensure;

/// Baseline fluorescence F0: mean of the first `window` samples.
pub fn baseline_f0(trace: &[f64], window: usize) -> anyhow::Result<f64> {
    ensure!(window > 0, "baseline window must be > 0");
    ensure!(
        window <= trace.len(),
        "baseline window ({window}) longer than trace ({})",
        trace.len()
    );

    let f0 = trace[..window].iter().sum::<f64>() / window as f64;
    ensure!(
        f0.is_finite() && f0 != 0.0,
        "baseline F0 must be finite and non-zero, got {f0}"
    );
    Ok(f0)
}

/// ΔF/F = (F - F0) / F0 per frame.
pub fn delta_f_over_f(trace: &[f64], f0: f64) -> Vec<f64> {
    trace.iter().map(|&f| (f - f0) / f0).collect()
}
