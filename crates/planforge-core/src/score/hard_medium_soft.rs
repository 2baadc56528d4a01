//! HardMediumSoftScore - Three-level score

use std::fmt;

use super::traits::{fmt_init_prefix, Score};
use super::ScoreLevel;

/// A score with hard, medium, and soft constraint levels.
///
/// Typical use: hard for feasibility, medium for assigning as much as
/// possible, soft for the remaining preferences.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HardMediumSoftScore {
    init_score: i32,
    hard: i64,
    medium: i64,
    soft: i64,
}

impl HardMediumSoftScore {
    /// The zero score.
    pub const ZERO: HardMediumSoftScore = HardMediumSoftScore::of(0, 0, 0);

    /// One hard constraint penalty.
    pub const ONE_HARD: HardMediumSoftScore = HardMediumSoftScore::of(1, 0, 0);

    /// One medium constraint penalty.
    pub const ONE_MEDIUM: HardMediumSoftScore = HardMediumSoftScore::of(0, 1, 0);

    /// One soft constraint penalty.
    pub const ONE_SOFT: HardMediumSoftScore = HardMediumSoftScore::of(0, 0, 1);

    /// Creates a new initialized HardMediumSoftScore.
    #[inline]
    pub const fn of(hard: i64, medium: i64, soft: i64) -> Self {
        HardMediumSoftScore {
            init_score: 0,
            hard,
            medium,
            soft,
        }
    }

    /// Creates a HardMediumSoftScore with an init score.
    #[inline]
    pub const fn of_uninitialized(init_score: i32, hard: i64, medium: i64, soft: i64) -> Self {
        HardMediumSoftScore {
            init_score,
            hard,
            medium,
            soft,
        }
    }

    #[inline]
    pub const fn hard(&self) -> i64 {
        self.hard
    }

    #[inline]
    pub const fn medium(&self) -> i64 {
        self.medium
    }

    #[inline]
    pub const fn soft(&self) -> i64 {
        self.soft
    }
}

impl Score for HardMediumSoftScore {
    #[inline]
    fn init_score(&self) -> i32 {
        self.init_score
    }

    #[inline]
    fn with_init_score(&self, init_score: i32) -> Self {
        HardMediumSoftScore::of_uninitialized(init_score, self.hard, self.medium, self.soft)
    }

    #[inline]
    fn zero() -> Self {
        HardMediumSoftScore::ZERO
    }

    #[inline]
    fn levels_count() -> usize {
        3
    }

    #[inline]
    fn feasible_levels_count() -> usize {
        1
    }

    #[inline]
    fn is_feasible(&self) -> bool {
        self.init_score == 0 && self.hard >= 0
    }

    fn to_level_numbers(&self) -> Vec<i64> {
        vec![self.hard, self.medium, self.soft]
    }

    fn from_level_numbers(init_score: i32, levels: &[i64]) -> Self {
        assert_eq!(
            levels.len(),
            3,
            "HardMediumSoftScore requires exactly 3 levels"
        );
        HardMediumSoftScore::of_uninitialized(init_score, levels[0], levels[1], levels[2])
    }

    impl_score_scale!(HardMediumSoftScore { hard, medium, soft } => of_uninitialized);

    fn level_label(index: usize) -> ScoreLevel {
        match index {
            0 => ScoreLevel::Hard,
            1 => ScoreLevel::Medium,
            2 => ScoreLevel::Soft,
            _ => panic!("HardMediumSoftScore has 3 levels, got index {}", index),
        }
    }
}

impl_score_ops!(HardMediumSoftScore { hard, medium, soft } => of_uninitialized);

impl fmt::Debug for HardMediumSoftScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "HardMediumSoftScore({}, {}, {}, {})",
            self.init_score, self.hard, self.medium, self.soft
        )
    }
}

impl fmt::Display for HardMediumSoftScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt_init_prefix(f, self.init_score)?;
        write!(f, "{}hard/{}medium/{}soft", self.hard, self.medium, self.soft)
    }
}

impl_score_parse!(HardMediumSoftScore {
    hard => "hard",
    medium => "medium",
    soft => "soft"
} => of_uninitialized);
