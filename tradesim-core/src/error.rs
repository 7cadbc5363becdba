//! Typed failures for the simulation core.

use thiserror::Error;

/// Errors raised by the generator and the statistics aggregator.
///
/// Nothing here is retried or clamped; the caller decides how to surface it.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimError {
    /// Malformed simulation parameters. No simulation is attempted.
    #[error("invalid config: {field} {reason}")]
    InvalidConfig { field: &'static str, reason: String },

    /// A derived quantity is mathematically undefined for the given input.
    #[error("degenerate input: {0}")]
    DegenerateInput(String),

    /// A ratio metric has a zero denominator.
    #[error("{metric} is undefined (zero denominator)")]
    UndefinedRatio { metric: &'static str },
}

impl SimError {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            field,
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_names_the_field() {
        let err = SimError::invalid("trade_count", "must be > 0");
        assert_eq!(err.to_string(), "invalid config: trade_count must be > 0");
    }

    #[test]
    fn undefined_ratio_display() {
        let err = SimError::UndefinedRatio {
            metric: "returnOnMaxDrawdown",
        };
        assert!(err.to_string().contains("returnOnMaxDrawdown"));
    }
}
