//! HardSoftDecimalScore - Two-level score with fixed-point decimal levels
//!
//! Levels are stored as `i64` scaled by 100000 (five decimal places), so the
//! score stays `Copy` and shares the integer level machinery. Conversion to
//! and from text goes through `rust_decimal` to avoid float rounding.

use std::fmt;
use std::str::FromStr;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use super::traits::{fmt_init_prefix, split_init_prefix, ParseableScore, Score, ScoreParseError};
use super::ScoreLevel;

/// Scale factor for five decimal places.
const SCALE: i64 = 100_000;
const SCALE_DIGITS: u32 = 5;

/// A hard/soft score whose levels carry up to five decimal places.
///
/// # Examples
///
/// ```
/// use planforge_core::score::{HardSoftDecimalScore, Score};
///
/// let score = HardSoftDecimalScore::of_scaled(-150_000, -250_000);
/// assert_eq!(score.to_string(), "-1.5hard/-2.5soft");
/// assert!(!score.is_feasible());
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HardSoftDecimalScore {
    init_score: i32,
    hard: i64,
    soft: i64,
}

impl HardSoftDecimalScore {
    pub const ZERO: HardSoftDecimalScore = HardSoftDecimalScore::of_scaled(0, 0);
    pub const ONE_HARD: HardSoftDecimalScore = HardSoftDecimalScore::of_scaled(SCALE, 0);
    pub const ONE_SOFT: HardSoftDecimalScore = HardSoftDecimalScore::of_scaled(0, SCALE);

    /// Creates a score from whole (unscaled) level values.
    #[inline]
    pub const fn of(hard: i64, soft: i64) -> Self {
        HardSoftDecimalScore::of_scaled(hard * SCALE, soft * SCALE)
    }

    /// Creates a score from pre-scaled level values.
    #[inline]
    pub const fn of_scaled(hard: i64, soft: i64) -> Self {
        HardSoftDecimalScore {
            init_score: 0,
            hard,
            soft,
        }
    }

    /// Creates a score from pre-scaled level values with an init score.
    #[inline]
    pub const fn of_uninitialized(init_score: i32, hard: i64, soft: i64) -> Self {
        HardSoftDecimalScore {
            init_score,
            hard,
            soft,
        }
    }

    /// Creates a score from decimal level values, rounding past five places.
    pub fn of_decimal(hard: Decimal, soft: Decimal) -> Option<Self> {
        Some(HardSoftDecimalScore::of_scaled(
            scale_decimal(hard)?,
            scale_decimal(soft)?,
        ))
    }

    #[inline]
    pub const fn hard_scaled(&self) -> i64 {
        self.hard
    }

    #[inline]
    pub const fn soft_scaled(&self) -> i64 {
        self.soft
    }

    pub fn hard_decimal(&self) -> Decimal {
        Decimal::new(self.hard, SCALE_DIGITS).normalize()
    }

    pub fn soft_decimal(&self) -> Decimal {
        Decimal::new(self.soft, SCALE_DIGITS).normalize()
    }
}

fn scale_decimal(value: Decimal) -> Option<i64> {
    (value * Decimal::from(SCALE)).round().to_i64()
}

impl Score for HardSoftDecimalScore {
    #[inline]
    fn init_score(&self) -> i32 {
        self.init_score
    }

    #[inline]
    fn with_init_score(&self, init_score: i32) -> Self {
        HardSoftDecimalScore::of_uninitialized(init_score, self.hard, self.soft)
    }

    #[inline]
    fn zero() -> Self {
        HardSoftDecimalScore::ZERO
    }

    #[inline]
    fn levels_count() -> usize {
        2
    }

    #[inline]
    fn feasible_levels_count() -> usize {
        1
    }

    fn to_level_numbers(&self) -> Vec<i64> {
        vec![self.hard, self.soft]
    }

    fn from_level_numbers(init_score: i32, levels: &[i64]) -> Self {
        assert_eq!(
            levels.len(),
            2,
            "HardSoftDecimalScore requires exactly 2 levels"
        );
        HardSoftDecimalScore::of_uninitialized(init_score, levels[0], levels[1])
    }

    impl_score_scale!(HardSoftDecimalScore { hard, soft } => of_uninitialized);

    fn level_label(index: usize) -> ScoreLevel {
        match index {
            0 => ScoreLevel::Hard,
            1 => ScoreLevel::Soft,
            _ => panic!("HardSoftDecimalScore has 2 levels, got index {}", index),
        }
    }
}

impl_score_ops!(HardSoftDecimalScore { hard, soft } => of_uninitialized);

impl fmt::Debug for HardSoftDecimalScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "HardSoftDecimalScore({}, {}, {})",
            self.init_score,
            self.hard_decimal(),
            self.soft_decimal()
        )
    }
}

impl fmt::Display for HardSoftDecimalScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt_init_prefix(f, self.init_score)?;
        write!(f, "{}hard/{}soft", self.hard_decimal(), self.soft_decimal())
    }
}

fn parse_level(part: &str, suffix: &str) -> Result<i64, ScoreParseError> {
    let part = part.trim();
    let number = part.strip_suffix(suffix).ok_or_else(|| ScoreParseError {
        message: format!("Score part '{}' must end with '{}'", part, suffix),
    })?;
    let value = Decimal::from_str(number).map_err(|e| ScoreParseError {
        message: format!("Invalid {} score '{}': {}", suffix, number, e),
    })?;
    scale_decimal(value).ok_or_else(|| ScoreParseError {
        message: format!("{} score '{}' is out of range", suffix, number),
    })
}

impl ParseableScore for HardSoftDecimalScore {
    fn parse(s: &str) -> Result<Self, ScoreParseError> {
        let s = s.trim();
        let (init_score, body) = split_init_prefix(s, "HardSoftDecimalScore")?;
        let (hard, soft) = body.split_once('/').ok_or_else(|| ScoreParseError {
            message: format!(
                "Invalid HardSoftDecimalScore format '{}': expected 'Xhard/Ysoft'",
                s
            ),
        })?;
        Ok(HardSoftDecimalScore::of_uninitialized(
            init_score,
            parse_level(hard, "hard")?,
            parse_level(soft, "soft")?,
        ))
    }

    fn to_string_repr(&self) -> String {
        self.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scaling() {
        let score = HardSoftDecimalScore::of(-2, -100);
        assert_eq!(score.hard_scaled(), -200_000);
        assert_eq!(score.soft_scaled(), -10_000_000);
    }

    #[test]
    fn test_parse_decimal_places() {
        let score = HardSoftDecimalScore::parse("-30.5hard/-2.08250soft").unwrap();
        assert_eq!(score, HardSoftDecimalScore::of_scaled(-3_050_000, -208_250));
        assert_eq!(score.to_string(), "-30.5hard/-2.0825soft");
    }

    #[test]
    fn test_parse_uninitialized() {
        let score = HardSoftDecimalScore::parse("-1init/0hard/-1soft").unwrap();
        assert_eq!(score, HardSoftDecimalScore::of_uninitialized(-1, 0, -SCALE));
        assert!(score < HardSoftDecimalScore::of(-100, 0));
    }

    #[test]
    fn test_of_decimal() {
        let score =
            HardSoftDecimalScore::of_decimal(Decimal::new(-15, 1), Decimal::new(25, 1)).unwrap();
        assert_eq!(score, HardSoftDecimalScore::of_scaled(-150_000, 250_000));
    }
}
