//! SimpleScore - Single-level score implementation

use std::fmt;

use super::traits::{fmt_init_prefix, Score};
use super::ScoreLevel;

/// A simple score with a single integer value.
///
/// This is the simplest score type, useful when there's only one
/// type of constraint to optimize.
///
/// # Examples
///
/// ```
/// use planforge_core::{Score, SimpleScore};
///
/// let score1 = SimpleScore::of(-5);
/// let score2 = SimpleScore::of(-3);
///
/// assert!(score2 > score1);
/// // An uninitialized score is worse whatever its level value.
/// assert!(SimpleScore::of_uninitialized(-1, 100) < score1);
/// assert!(!score1.is_feasible());
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SimpleScore {
    init_score: i32,
    score: i64,
}

impl SimpleScore {
    /// The zero score.
    pub const ZERO: SimpleScore = SimpleScore {
        init_score: 0,
        score: 0,
    };

    /// A score of 1 (useful for incrementing).
    pub const ONE: SimpleScore = SimpleScore {
        init_score: 0,
        score: 1,
    };

    /// Creates a new initialized SimpleScore.
    #[inline]
    pub const fn of(score: i64) -> Self {
        SimpleScore {
            init_score: 0,
            score,
        }
    }

    /// Creates a SimpleScore with an init score.
    #[inline]
    pub const fn of_uninitialized(init_score: i32, score: i64) -> Self {
        SimpleScore { init_score, score }
    }

    /// Returns the score value.
    #[inline]
    pub const fn score(&self) -> i64 {
        self.score
    }
}

impl Score for SimpleScore {
    #[inline]
    fn init_score(&self) -> i32 {
        self.init_score
    }

    #[inline]
    fn with_init_score(&self, init_score: i32) -> Self {
        SimpleScore::of_uninitialized(init_score, self.score)
    }

    #[inline]
    fn zero() -> Self {
        SimpleScore::ZERO
    }

    #[inline]
    fn levels_count() -> usize {
        1
    }

    #[inline]
    fn feasible_levels_count() -> usize {
        1
    }

    #[inline]
    fn is_feasible(&self) -> bool {
        self.init_score == 0 && self.score >= 0
    }

    fn to_level_numbers(&self) -> Vec<i64> {
        vec![self.score]
    }

    fn from_level_numbers(init_score: i32, levels: &[i64]) -> Self {
        assert_eq!(levels.len(), 1, "SimpleScore requires exactly 1 level");
        SimpleScore::of_uninitialized(init_score, levels[0])
    }

    impl_score_scale!(SimpleScore { score } => of_uninitialized);

    fn level_label(index: usize) -> ScoreLevel {
        match index {
            0 => ScoreLevel::Soft,
            _ => panic!("SimpleScore has 1 level, got index {}", index),
        }
    }
}

impl_score_ops!(SimpleScore { score } => of_uninitialized);

impl fmt::Debug for SimpleScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SimpleScore({}, {})", self.init_score, self.score)
    }
}

impl fmt::Display for SimpleScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt_init_prefix(f, self.init_score)?;
        write!(f, "{}", self.score)
    }
}

impl_score_parse!(SimpleScore { score => "" } => of_uninitialized);
