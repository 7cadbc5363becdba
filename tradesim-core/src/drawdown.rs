//! Running-peak drawdown trace.

use serde::{Deserialize, Serialize};

/// A decline from the running peak, as a positive fraction of the peak and in currency.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Drawdown {
    pub fraction: f64,
    pub absolute: f64,
}

/// Point-by-point running peak and drawdown for one curve.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawdownTrace {
    pub peaks: Vec<f64>,
    pub fractional: Vec<f64>,
    pub absolute: Vec<f64>,
}

impl DrawdownTrace {
    pub fn from_points(points: &[f64]) -> Self {
        let n = points.len();
        let mut peaks = Vec::with_capacity(n);
        let mut fractional = Vec::with_capacity(n);
        let mut absolute = Vec::with_capacity(n);

        let mut peak = f64::NEG_INFINITY;
        for &eq in points {
            if eq > peak {
                peak = eq;
            }
            let abs = peak - eq;
            // Peak is bounded below by the starting equity, which config validation keeps > 0.
            let frac = if peak > 0.0 { abs / peak } else { 0.0 };
            peaks.push(peak);
            fractional.push(frac);
            absolute.push(abs);
        }

        Self {
            peaks,
            fractional,
            absolute,
        }
    }

    /// Deepest drawdown. The absolute value is taken at the same index; first index wins ties.
    pub fn max(&self) -> Drawdown {
        let mut worst = Drawdown::default();
        for (&fraction, &absolute) in self.fractional.iter().zip(&self.absolute) {
            if fraction > worst.fraction {
                worst = Drawdown { fraction, absolute };
            }
        }
        worst
    }
}

/// Maximum drawdown of a curve. Zero for empty or never-declining curves.
pub fn max_drawdown(points: &[f64]) -> Drawdown {
    DrawdownTrace::from_points(points).max()
}
