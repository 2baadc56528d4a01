//! Score bounder for exhaustive search pruning.
//!
//! Bounders calculate optimistic and pessimistic score bounds that enable
//! branch-and-bound pruning.

use std::fmt::Debug;

use planforge_core::{PlanningSolution, Score};
use planforge_scoring::ScoreDirector;

/// How one score level moves while more entities get initialized.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum InitializingScoreTrendLevel {
    /// No known direction.
    #[default]
    Any,
    /// Initializing an entity never lowers the level.
    OnlyUp,
    /// Initializing an entity never raises the level.
    OnlyDown,
}

/// The per-level trend of a score during initialization.
///
/// Levels beyond the configured ones count as [`Any`](InitializingScoreTrendLevel::Any).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InitializingScoreTrend {
    levels: Vec<InitializingScoreTrendLevel>,
}

impl InitializingScoreTrend {
    pub fn new(levels: Vec<InitializingScoreTrendLevel>) -> Self {
        Self { levels }
    }

    /// The same trend on `levels_count` levels.
    pub fn uniform(level: InitializingScoreTrendLevel, levels_count: usize) -> Self {
        Self {
            levels: vec![level; levels_count],
        }
    }

    pub fn level(&self, index: usize) -> InitializingScoreTrendLevel {
        self.levels.get(index).copied().unwrap_or_default()
    }

    /// Returns true if every level only goes down.
    pub fn is_only_down(&self) -> bool {
        !self.levels.is_empty()
            && self
                .levels
                .iter()
                .all(|level| *level == InitializingScoreTrendLevel::OnlyDown)
    }
}

/// Calculates score bounds for exhaustive search pruning.
///
/// Given the score of a partial solution, the optimistic bound is at least
/// as good as any score a completion of it can reach, and the pessimistic
/// bound is at most as good as the worst one.
///
/// The pessimistic bound of a node prunes other nodes only when it is
/// strictly below the node's own optimistic bound; a node whose bounds meet
/// is expanded until a leaf reaches that score.
pub trait ScoreBounder<S: PlanningSolution>: Send + Debug {
    fn calculate_optimistic_bound(
        &self,
        score_director: &dyn ScoreDirector<S>,
        score: S::Score,
    ) -> S::Score;

    fn calculate_pessimistic_bound(
        &self,
        score_director: &dyn ScoreDirector<S>,
        score: S::Score,
    ) -> S::Score;
}

/// Derives bounds from the initializing score trend.
///
/// A level that only goes down cannot get better than it is now, so the
/// optimistic bound keeps it; any other level is unbounded upwards. The
/// pessimistic bound mirrors this with levels that only go up.
#[derive(Debug, Clone)]
pub struct TrendBasedScoreBounder {
    trend: InitializingScoreTrend,
}

impl TrendBasedScoreBounder {
    pub fn new(trend: InitializingScoreTrend) -> Self {
        Self { trend }
    }

    pub fn trend(&self) -> &InitializingScoreTrend {
        &self.trend
    }

    fn bound<Sc: Score>(
        &self,
        score: Sc,
        kept: InitializingScoreTrendLevel,
        unbounded: i64,
    ) -> Sc {
        let levels: Vec<i64> = score
            .to_level_numbers()
            .into_iter()
            .enumerate()
            .map(|(index, value)| {
                if self.trend.level(index) == kept {
                    value
                } else {
                    unbounded
                }
            })
            .collect();
        Sc::from_level_numbers(0, &levels)
    }
}

impl<S: PlanningSolution> ScoreBounder<S> for TrendBasedScoreBounder {
    fn calculate_optimistic_bound(
        &self,
        _score_director: &dyn ScoreDirector<S>,
        score: S::Score,
    ) -> S::Score {
        self.bound(score, InitializingScoreTrendLevel::OnlyDown, i64::MAX)
    }

    fn calculate_pessimistic_bound(
        &self,
        _score_director: &dyn ScoreDirector<S>,
        score: S::Score,
    ) -> S::Score {
        self.bound(score, InitializingScoreTrendLevel::OnlyUp, i64::MIN)
    }
}
