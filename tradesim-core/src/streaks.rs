//! Consecutive win/loss streaks recovered from a curve.

use crate::curve::{EquityCurve, TradeOutcome};

/// Longest run of consecutive wins.
pub fn longest_win_streak(curve: &EquityCurve) -> usize {
    longest_streak(curve.outcomes(), TradeOutcome::Win)
}

/// Longest run of consecutive losses.
pub fn longest_loss_streak(curve: &EquityCurve) -> usize {
    longest_streak(curve.outcomes(), TradeOutcome::Loss)
}

/// Longest run of `target` in an outcome sequence.
pub fn longest_streak<I>(outcomes: I, target: TradeOutcome) -> usize
where
    I: IntoIterator<Item = TradeOutcome>,
{
    let mut max_streak = 0;
    let mut current = 0;

    for outcome in outcomes {
        if outcome == target {
            current += 1;
            if current > max_streak {
                max_streak = current;
            }
        } else {
            current = 0;
        }
    }
    max_streak
}
