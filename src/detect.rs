use serde::Serialize;

/// A frame whose ΔF/F exceeds the detection threshold.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Event {
    /// 1-based frame number
    pub frame: usize,
    /// ΔF/F at that frame
    pub value: f64,
}

pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Population standard deviation (divides by N).
pub fn std_dev(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let m = mean(values);
    let var = values.iter().map(|&v| (v - m) * (v - m)).sum::<f64>() / values.len() as f64;
    var.sqrt()
}

/// mean(dff) + k * std(dff)
pub fn event_threshold(dff: &[f64], k: f64) -> f64 {
    mean(dff) + k * std_dev(dff)
}

/// Every frame strictly above `threshold`, in frame order. Adjacent frames are
/// not merged.
pub fn detect_events(dff: &[f64], threshold: f64) -> Vec<Event> {
    dff.iter()
        .enumerate()
        .filter(|(_, &v)| v > threshold)
        .map(|(i, &value)| Event {
            frame: i + 1,
            value,
        })
        .collect()
}
