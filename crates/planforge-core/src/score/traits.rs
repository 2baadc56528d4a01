//! Core Score trait definition

use std::cmp::Ordering;
use std::fmt::{Debug, Display};
use std::hash::Hash;
use std::ops::{Add, Neg, Sub};

use super::ScoreLevel;

/// Core trait for all score types in PlanForge.
///
/// A score is a fixed number of `i64` levels, highest priority first, plus an
/// init score: the negated number of genuine variables that are still
/// unassigned. Comparison looks at the init score first, so any score of a
/// partially initialized solution is worse than any score of a fully
/// initialized one, whatever the level values.
///
/// All score implementations must be:
/// - Immutable (operations return new instances)
/// - Thread-safe (Send + Sync)
/// - Comparable (total ordering)
pub trait Score:
    Copy
    + Debug
    + Display
    + Default
    + Send
    + Sync
    + PartialEq
    + Eq
    + Hash
    + PartialOrd
    + Ord
    + Add<Output = Self>
    + Sub<Output = Self>
    + Neg<Output = Self>
    + 'static
{
    /// Returns the init score, zero or negative.
    fn init_score(&self) -> i32;

    /// Returns a copy of this score with a different init score.
    fn with_init_score(&self, init_score: i32) -> Self;

    /// Returns the zero score (identity element for addition).
    fn zero() -> Self;

    /// Returns the number of score levels.
    fn levels_count() -> usize;

    /// Returns how many leading levels must be non-negative for feasibility.
    ///
    /// For example 1 for `HardSoftScore` (the hard level only).
    fn feasible_levels_count() -> usize;

    /// Returns the level values, highest priority first.
    fn to_level_numbers(&self) -> Vec<i64>;

    /// Creates a score from an init score and level numbers.
    ///
    /// # Panics
    /// Panics if the number of levels doesn't match `levels_count()`.
    fn from_level_numbers(init_score: i32, levels: &[i64]) -> Self;

    /// Multiplies this score by a scalar.
    fn multiply(&self, multiplicand: f64) -> Self;

    /// Divides this score by a scalar.
    fn divide(&self, divisor: f64) -> Self;

    /// Returns the absolute value of this score.
    fn abs(&self) -> Self;

    /// Returns the semantic label for the score level at the given index.
    ///
    /// # Panics
    /// Panics if `index >= levels_count()`.
    fn level_label(index: usize) -> ScoreLevel;

    /// Returns true if no genuine variable is left uninitialized.
    fn is_solution_initialized(&self) -> bool {
        self.init_score() == 0
    }

    /// Returns true if this score represents a feasible solution.
    ///
    /// Feasible means initialized and every level below
    /// `feasible_levels_count()` is non-negative.
    fn is_feasible(&self) -> bool {
        self.is_solution_initialized()
            && self
                .to_level_numbers()
                .iter()
                .take(Self::feasible_levels_count())
                .all(|level| *level >= 0)
    }

    /// Compares two scores, returning the ordering.
    fn compare(&self, other: &Self) -> Ordering {
        self.cmp(other)
    }

    /// Returns true if this score is better than the other score.
    fn is_better_than(&self, other: &Self) -> bool {
        self > other
    }

    /// Returns true if this score is worse than the other score.
    fn is_worse_than(&self, other: &Self) -> bool {
        self < other
    }

    /// Returns true if this score is equal to the other score.
    fn is_equal_to(&self, other: &Self) -> bool {
        self == other
    }
}

/// Marker trait for scores that can be parsed from a string.
pub trait ParseableScore: Score {
    /// Parses a score from a string representation.
    ///
    /// # Format
    /// - SimpleScore: "42" or "-2init/42"
    /// - HardSoftScore: "0hard/-100soft" or "-1init/-1hard/0soft"
    /// - HardMediumSoftScore: "0hard/0medium/-100soft"
    fn parse(s: &str) -> Result<Self, ScoreParseError>;

    /// Returns the string representation of this score.
    fn to_string_repr(&self) -> String;
}

/// Error when parsing a score from string
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreParseError {
    pub message: String,
}

impl std::fmt::Display for ScoreParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Score parse error: {}", self.message)
    }
}

impl std::error::Error for ScoreParseError {}

/// Splits an optional `"<n>init/"` prefix off a score string.
pub(crate) fn split_init_prefix<'a>(
    s: &'a str,
    type_name: &str,
) -> Result<(i32, &'a str), ScoreParseError> {
    let Some((head, rest)) = s.split_once('/') else {
        return Ok((0, s));
    };
    let Some(num) = head.trim().strip_suffix("init") else {
        return Ok((0, s));
    };
    let init_score = num.parse::<i32>().map_err(|e| ScoreParseError {
        message: format!("Invalid {} init score '{}': {}", type_name, num, e),
    })?;
    Ok((init_score, rest))
}

/// Writes the `"<n>init/"` prefix for uninitialized scores.
pub(crate) fn fmt_init_prefix(f: &mut std::fmt::Formatter<'_>, init_score: i32) -> std::fmt::Result {
    if init_score != 0 {
        write!(f, "{}init/", init_score)?;
    }
    Ok(())
}
