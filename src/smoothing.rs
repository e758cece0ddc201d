//! Centered moving-average smoothing of GPS speed series
//!
//! Edges where a full window does not fit are filled explicitly: leading
//! positions take the first full-window value, trailing positions the last.

use crate::error::CalculationError;

/// Default number of samples averaged per output sample
pub const DEFAULT_SMOOTHING_WINDOW: usize = 5;

/// Smooth `speeds` with a centered moving average of `window` samples.
///
/// The window for position `i` spans `i - window/2 .. i - window/2 + window`,
/// so even windows lean one sample to the left. Output length always equals
/// input length. Inputs shorter than the window come back as their mean.
pub fn smooth(speeds: &[f64], window: usize) -> Result<Vec<f64>, CalculationError> {
    if window == 0 {
        return Err(CalculationError::InvalidParameter {
            calculation: "speed smoothing".to_string(),
            parameter: "window".to_string(),
            value: window.to_string(),
        });
    }

    let n = speeds.len();
    if n == 0 {
        return Ok(Vec::new());
    }
    if n < window {
        let mean = speeds.iter().sum::<f64>() / n as f64;
        return Ok(vec![mean; n]);
    }

    let half = window / 2;
    // first and last positions with a full window
    let first_full = half;
    let last_full = n - window + half;

    let mut prefix = Vec::with_capacity(n + 1);
    prefix.push(0.0);
    for &speed in speeds {
        let last = prefix[prefix.len() - 1];
        prefix.push(last + speed);
    }

    let mut smoothed = vec![0.0; n];
    for i in first_full..=last_full {
        let start = i - half;
        smoothed[i] = (prefix[start + window] - prefix[start]) / window as f64;
    }

    let leading = smoothed[first_full];
    smoothed[..first_full].fill(leading);
    let trailing = smoothed[last_full];
    smoothed[last_full + 1..].fill(trailing);

    Ok(smoothed)
}

/// Scale speeds onto [0, 1] by the series' min and max.
///
/// A flat or empty series maps to all zeros.
pub fn normalize_speeds(speeds: &[f64]) -> Vec<f64> {
    let min = speeds.iter().copied().fold(f64::INFINITY, f64::min);
    let max = speeds.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let range = max - min;

    if !range.is_finite() || range <= 0.0 {
        return vec![0.0; speeds.len()];
    }

    speeds.iter().map(|s| (s - min) / range).collect()
}
