//! Cross-run mean and median equity at each trade index.

use serde::{Deserialize, Serialize};

use crate::curve::EquityCurve;
use crate::error::SimError;
use crate::stats::{mean, median};

/// Per-index summary paths across all runs, for overlaying on the individual curves.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EquityBands {
    pub mean: Vec<f64>,
    pub median: Vec<f64>,
}

/// Compute mean and median equity at every trade index.
///
/// All curves must share one length.
pub fn compute_bands(curves: &[EquityCurve]) -> Result<EquityBands, SimError> {
    let first = curves
        .first()
        .ok_or_else(|| SimError::DegenerateInput("no curves to band".into()))?;
    let len = first.len();
    if let Some(bad) = curves.iter().position(|c| c.len() != len) {
        return Err(SimError::DegenerateInput(format!(
            "curve {bad} has {} points, expected {len}",
            curves[bad].len()
        )));
    }

    let mut column = Vec::with_capacity(curves.len());
    let mut mean_path = Vec::with_capacity(len);
    let mut median_path = Vec::with_capacity(len);
    for i in 0..len {
        column.clear();
        column.extend(curves.iter().map(|c| c.points()[i]));
        mean_path.push(mean(&column));
        median_path.push(median(&column));
    }

    Ok(EquityBands {
        mean: mean_path,
        median: median_path,
    })
}
