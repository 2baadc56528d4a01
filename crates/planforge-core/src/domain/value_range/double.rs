//! Continuous `f64` interval.

use rand::{Rng, RngCore};

use super::ValueRange;
use crate::error::{PlanForgeError, Result};

/// The half-open interval `[from, to)` of `f64` values.
///
/// The range is uncountable: it cannot be enumerated, only sampled, so any
/// selector over it is never-ending.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DoubleValueRange {
    from: f64,
    to: f64,
}

impl DoubleValueRange {
    pub fn new(from: f64, to: f64) -> Result<Self> {
        if !from.is_finite() || !to.is_finite() {
            return Err(PlanForgeError::InvalidRange(format!(
                "DoubleValueRange: bounds must be finite, got {} and {}",
                from, to
            )));
        }
        if to < from {
            return Err(PlanForgeError::InvalidRange(format!(
                "DoubleValueRange: from ({}) must be at most to ({})",
                from, to
            )));
        }
        Ok(DoubleValueRange { from, to })
    }

    pub fn from(&self) -> f64 {
        self.from
    }

    pub fn to(&self) -> f64 {
        self.to
    }
}

impl ValueRange<f64> for DoubleValueRange {
    fn is_countable(&self) -> bool {
        false
    }

    fn is_empty(&self) -> bool {
        self.from == self.to
    }

    fn contains(&self, value: &f64) -> bool {
        *value >= self.from && *value < self.to
    }

    fn sample(&self, rng: &mut dyn RngCore) -> Option<f64> {
        if self.is_empty() {
            return None;
        }
        Some(rng.random_range(self.from..self.to))
    }
}
