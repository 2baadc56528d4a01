//! BendableScore - Multi-level score with a compile-time level layout

use std::cmp::Ordering;
use std::fmt;
use std::ops::{Add, Neg, Sub};

use super::traits::{fmt_init_prefix, split_init_prefix, ParseableScore, Score, ScoreParseError};
use super::ScoreLevel;

/// A score with `H` hard levels and `S` soft levels.
///
/// The level counts are const generics so the score stays `Copy` and two
/// scores of incompatible layouts cannot be compared by construction.
///
/// # Examples
///
/// ```
/// use planforge_core::score::{BendableScore, Score};
///
/// let score = BendableScore::<2, 3>::of([-1, -2], [-10, -20, -30]);
///
/// assert_eq!(BendableScore::<2, 3>::levels_count(), 5);
/// assert!(!score.is_feasible());
/// assert_eq!(score.to_string(), "[-1/-2]hard/[-10/-20/-30]soft");
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct BendableScore<const H: usize, const S: usize> {
    init_score: i32,
    hard_scores: [i64; H],
    soft_scores: [i64; S],
}

impl<const H: usize, const S: usize> BendableScore<H, S> {
    /// Creates a new initialized BendableScore.
    pub const fn of(hard_scores: [i64; H], soft_scores: [i64; S]) -> Self {
        BendableScore {
            init_score: 0,
            hard_scores,
            soft_scores,
        }
    }

    /// Creates a BendableScore with an init score.
    pub const fn of_uninitialized(
        init_score: i32,
        hard_scores: [i64; H],
        soft_scores: [i64; S],
    ) -> Self {
        BendableScore {
            init_score,
            hard_scores,
            soft_scores,
        }
    }

    /// Creates a score with a single hard level set to `amount`.
    pub fn of_hard(level: usize, amount: i64) -> Self {
        let mut hard_scores = [0; H];
        hard_scores[level] = amount;
        BendableScore::of(hard_scores, [0; S])
    }

    /// Creates a score with a single soft level set to `amount`.
    pub fn of_soft(level: usize, amount: i64) -> Self {
        let mut soft_scores = [0; S];
        soft_scores[level] = amount;
        BendableScore::of([0; H], soft_scores)
    }

    pub const fn hard_levels_count() -> usize {
        H
    }

    pub const fn soft_levels_count() -> usize {
        S
    }

    pub fn hard_score(&self, level: usize) -> i64 {
        self.hard_scores[level]
    }

    pub fn soft_score(&self, level: usize) -> i64 {
        self.soft_scores[level]
    }

    pub fn hard_scores(&self) -> &[i64; H] {
        &self.hard_scores
    }

    pub fn soft_scores(&self) -> &[i64; S] {
        &self.soft_scores
    }

    fn map(&self, init: impl Fn(i32) -> i32, level: impl Fn(i64) -> i64) -> Self {
        BendableScore {
            init_score: init(self.init_score),
            hard_scores: self.hard_scores.map(&level),
            soft_scores: self.soft_scores.map(&level),
        }
    }

    fn zip(&self, other: &Self, level: impl Fn(i64, i64) -> i64) -> [i64; H] {
        let mut out = [0; H];
        for (i, slot) in out.iter_mut().enumerate() {
            *slot = level(self.hard_scores[i], other.hard_scores[i]);
        }
        out
    }

    fn zip_soft(&self, other: &Self, level: impl Fn(i64, i64) -> i64) -> [i64; S] {
        let mut out = [0; S];
        for (i, slot) in out.iter_mut().enumerate() {
            *slot = level(self.soft_scores[i], other.soft_scores[i]);
        }
        out
    }
}

impl<const H: usize, const S: usize> Default for BendableScore<H, S> {
    fn default() -> Self {
        BendableScore::of([0; H], [0; S])
    }
}

impl<const H: usize, const S: usize> Score for BendableScore<H, S> {
    fn init_score(&self) -> i32 {
        self.init_score
    }

    fn with_init_score(&self, init_score: i32) -> Self {
        BendableScore {
            init_score,
            ..*self
        }
    }

    fn zero() -> Self {
        Self::default()
    }

    fn levels_count() -> usize {
        H + S
    }

    fn feasible_levels_count() -> usize {
        H
    }

    fn is_feasible(&self) -> bool {
        self.init_score == 0 && self.hard_scores.iter().all(|&s| s >= 0)
    }

    fn to_level_numbers(&self) -> Vec<i64> {
        let mut levels = Vec::with_capacity(H + S);
        levels.extend_from_slice(&self.hard_scores);
        levels.extend_from_slice(&self.soft_scores);
        levels
    }

    fn from_level_numbers(init_score: i32, levels: &[i64]) -> Self {
        assert_eq!(
            levels.len(),
            H + S,
            "BendableScore requires exactly {} levels",
            H + S
        );
        let mut hard_scores = [0; H];
        hard_scores.copy_from_slice(&levels[..H]);
        let mut soft_scores = [0; S];
        soft_scores.copy_from_slice(&levels[H..]);
        BendableScore::of_uninitialized(init_score, hard_scores, soft_scores)
    }

    fn multiply(&self, multiplicand: f64) -> Self {
        self.map(
            |init| (init as f64 * multiplicand).floor() as i32,
            |s| (s as f64 * multiplicand).round() as i64,
        )
    }

    fn divide(&self, divisor: f64) -> Self {
        self.map(
            |init| (init as f64 / divisor).floor() as i32,
            |s| (s as f64 / divisor).round() as i64,
        )
    }

    fn abs(&self) -> Self {
        self.map(i32::abs, i64::abs)
    }

    fn level_label(index: usize) -> ScoreLevel {
        if index < H {
            ScoreLevel::Hard
        } else if index < H + S {
            ScoreLevel::Soft
        } else {
            panic!("BendableScore has {} levels, got index {}", H + S, index)
        }
    }
}

impl<const H: usize, const S: usize> Ord for BendableScore<H, S> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.init_score
            .cmp(&other.init_score)
            .then_with(|| self.hard_scores.cmp(&other.hard_scores))
            .then_with(|| self.soft_scores.cmp(&other.soft_scores))
    }
}

impl<const H: usize, const S: usize> PartialOrd for BendableScore<H, S> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<const H: usize, const S: usize> Add for BendableScore<H, S> {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        BendableScore::of_uninitialized(
            self.init_score + other.init_score,
            self.zip(&other, |a, b| a + b),
            self.zip_soft(&other, |a, b| a + b),
        )
    }
}

impl<const H: usize, const S: usize> Sub for BendableScore<H, S> {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        BendableScore::of_uninitialized(
            self.init_score - other.init_score,
            self.zip(&other, |a, b| a - b),
            self.zip_soft(&other, |a, b| a - b),
        )
    }
}

impl<const H: usize, const S: usize> Neg for BendableScore<H, S> {
    type Output = Self;

    fn neg(self) -> Self {
        self.map(|init| -init, |s| -s)
    }
}

fn join_levels(levels: &[i64]) -> String {
    levels
        .iter()
        .map(|l| l.to_string())
        .collect::<Vec<_>>()
        .join("/")
}

impl<const H: usize, const S: usize> fmt::Debug for BendableScore<H, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "BendableScore({}, {:?}, {:?})",
            self.init_score, self.hard_scores, self.soft_scores
        )
    }
}

impl<const H: usize, const S: usize> fmt::Display for BendableScore<H, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt_init_prefix(f, self.init_score)?;
        write!(
            f,
            "[{}]hard/[{}]soft",
            join_levels(&self.hard_scores),
            join_levels(&self.soft_scores)
        )
    }
}

fn parse_bracketed<const N: usize>(part: &str, suffix: &str) -> Result<[i64; N], ScoreParseError> {
    let inner = part
        .strip_suffix(suffix)
        .and_then(|p| p.strip_prefix('['))
        .and_then(|p| p.strip_suffix(']'))
        .ok_or_else(|| ScoreParseError {
            message: format!("BendableScore part '{}' must look like '[..]{}'", part, suffix),
        })?;
    let values: Vec<&str> = if inner.is_empty() {
        Vec::new()
    } else {
        inner.split('/').collect()
    };
    if values.len() != N {
        return Err(ScoreParseError {
            message: format!(
                "BendableScore {} part '{}' has {} levels, expected {}",
                suffix,
                part,
                values.len(),
                N
            ),
        });
    }
    let mut out = [0; N];
    for (slot, value) in out.iter_mut().zip(values) {
        *slot = value.trim().parse::<i64>().map_err(|e| ScoreParseError {
            message: format!("Invalid {} level '{}': {}", suffix, value, e),
        })?;
    }
    Ok(out)
}

impl<const H: usize, const S: usize> ParseableScore for BendableScore<H, S> {
    fn parse(s: &str) -> Result<Self, ScoreParseError> {
        let s = s.trim();
        let (init_score, body) = split_init_prefix(s, "BendableScore")?;
        let split_at = body.find("hard/").ok_or_else(|| ScoreParseError {
            message: format!("BendableScore '{}' lacks a hard part", s),
        })?;
        let (hard_part, soft_part) = body.split_at(split_at + "hard".len());
        let soft_part = &soft_part[1..];
        Ok(BendableScore::of_uninitialized(
            init_score,
            parse_bracketed::<H>(hard_part, "hard")?,
            parse_bracketed::<S>(soft_part, "soft")?,
        ))
    }

    fn to_string_repr(&self) -> String {
        self.to_string()
    }
}
