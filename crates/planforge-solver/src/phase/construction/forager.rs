//! Forager for construction heuristic move selection.
//!
//! The forager sees the scored candidates of one placement in order and
//! decides which one the step applies.

use planforge_config::ConstructionPickEarlyType;
use planforge_core::Score;

/// Picks the move of a construction step.
///
/// Keeps the first candidate reaching the maximal score. After each
/// candidate the pick-early policy may stop the evaluation with that
/// candidate.
///
/// # Example
///
/// ```
/// use planforge_config::ConstructionPickEarlyType;
/// use planforge_core::SimpleScore;
/// use planforge_solver::phase::construction::ConstructionHeuristicForager;
///
/// let mut forager = ConstructionHeuristicForager::new(
///     ConstructionPickEarlyType::FirstNonDeterioratingScore,
/// );
/// forager.step_started(SimpleScore::of(-100));
///
/// forager.add_move(0, SimpleScore::of(-110));
/// assert!(!forager.is_quit_early());
/// forager.add_move(1, SimpleScore::of(-100));
/// assert!(forager.is_quit_early());
/// assert_eq!(forager.pick_move(), Some((1, SimpleScore::of(-100))));
/// ```
#[derive(Debug, Clone)]
pub struct ConstructionHeuristicForager<Sc: Score> {
    pick_early_type: ConstructionPickEarlyType,
    last_step_score: Option<Sc>,
    max_score: Option<(usize, Sc)>,
    early_pick: Option<(usize, Sc)>,
    selected_move_count: u64,
}

impl<Sc: Score> ConstructionHeuristicForager<Sc> {
    pub fn new(pick_early_type: ConstructionPickEarlyType) -> Self {
        Self {
            pick_early_type,
            last_step_score: None,
            max_score: None,
            early_pick: None,
            selected_move_count: 0,
        }
    }

    pub fn pick_early_type(&self) -> ConstructionPickEarlyType {
        self.pick_early_type
    }

    /// Resets the forager for a step that starts from `last_step_score`.
    pub fn step_started(&mut self, last_step_score: Sc) {
        self.last_step_score = Some(last_step_score);
        self.max_score = None;
        self.early_pick = None;
        self.selected_move_count = 0;
    }

    /// Offers the candidate at `index`, scored `score`.
    pub fn add_move(&mut self, index: usize, score: Sc) {
        self.selected_move_count += 1;
        if self.max_score.map_or(true, |(_, max)| score > max) {
            self.max_score = Some((index, score));
        }
        if self.early_pick.is_none() && self.picks_early(score) {
            self.early_pick = Some((index, score));
        }
    }

    fn picks_early(&self, score: Sc) -> bool {
        let Some(last) = self.last_step_score else {
            return false;
        };
        let score = score.with_init_score(0);
        let last = last.with_init_score(0);
        match self.pick_early_type {
            ConstructionPickEarlyType::Never => false,
            ConstructionPickEarlyType::FirstNonDeterioratingScore => score >= last,
            ConstructionPickEarlyType::FirstFeasibleScore => score.is_feasible(),
            ConstructionPickEarlyType::FirstFeasibleScoreOrNonDeterioratingHard => {
                score.is_feasible() || hard_levels_not_deteriorated(&score, &last)
            }
        }
    }

    /// Returns true once a candidate was picked early; the remaining
    /// candidates need no evaluation.
    pub fn is_quit_early(&self) -> bool {
        self.early_pick.is_some()
    }

    /// The early pick, else the first candidate with the maximal score.
    pub fn pick_move(&self) -> Option<(usize, Sc)> {
        self.early_pick.or(self.max_score)
    }

    pub fn selected_move_count(&self) -> u64 {
        self.selected_move_count
    }
}

/// Compares the levels that decide feasibility: every level but the last
/// of a multi-level score.
fn hard_levels_not_deteriorated<Sc: Score>(score: &Sc, last: &Sc) -> bool {
    let hard_count = Sc::feasible_levels_count().min(Sc::levels_count().saturating_sub(1));
    let score_levels = score.to_level_numbers();
    let last_levels = last.to_level_numbers();
    score_levels[..hard_count] >= last_levels[..hard_count]
}

#[cfg(test)]
mod tests {
    use planforge_core::{HardSoftScore, SimpleScore};

    use super::*;

    #[test]
    fn test_never_evaluates_everything_and_keeps_first_max() {
        let mut forager = ConstructionHeuristicForager::new(ConstructionPickEarlyType::Never);
        forager.step_started(SimpleScore::of(-10));

        forager.add_move(0, SimpleScore::of(-5));
        forager.add_move(1, SimpleScore::of(-3));
        forager.add_move(2, SimpleScore::of(-3));
        forager.add_move(3, SimpleScore::of(-8));

        assert!(!forager.is_quit_early());
        assert_eq!(forager.pick_move(), Some((1, SimpleScore::of(-3))));
        assert_eq!(forager.selected_move_count(), 4);
    }

    #[test]
    fn test_empty_step_picks_nothing() {
        let mut forager =
            ConstructionHeuristicForager::<SimpleScore>::new(ConstructionPickEarlyType::Never);
        forager.step_started(SimpleScore::of(0));
        assert_eq!(forager.pick_move(), None);
    }

    #[test]
    fn test_first_non_deteriorating_ignores_init_score() {
        let mut forager =
            ConstructionHeuristicForager::new(ConstructionPickEarlyType::FirstNonDeterioratingScore);
        forager.step_started(SimpleScore::of_uninitialized(-3, -100));

        forager.add_move(0, SimpleScore::of_uninitialized(-2, -110));
        assert!(!forager.is_quit_early());
        forager.add_move(1, SimpleScore::of_uninitialized(-2, -100));
        assert!(forager.is_quit_early());
        forager.add_move(2, SimpleScore::of_uninitialized(-2, -50));
        assert_eq!(forager.pick_move(), Some((1, SimpleScore::of_uninitialized(-2, -100))));
    }

    #[test]
    fn test_first_feasible_score() {
        let mut forager =
            ConstructionHeuristicForager::new(ConstructionPickEarlyType::FirstFeasibleScore);
        forager.step_started(HardSoftScore::of_uninitialized(-2, 0, 0));

        forager.add_move(0, HardSoftScore::of_uninitialized(-1, -1, 0));
        assert!(!forager.is_quit_early());
        forager.add_move(1, HardSoftScore::of_uninitialized(-1, 0, -30));
        assert!(forager.is_quit_early());
        assert_eq!(forager.pick_move().map(|(i, _)| i), Some(1));
    }

    #[test]
    fn test_first_feasible_or_non_deteriorating_hard() {
        let mut forager = ConstructionHeuristicForager::new(
            ConstructionPickEarlyType::FirstFeasibleScoreOrNonDeterioratingHard,
        );
        forager.step_started(HardSoftScore::of(-5, -10));

        forager.add_move(0, HardSoftScore::of(-6, 0));
        assert!(!forager.is_quit_early());
        forager.add_move(1, HardSoftScore::of(-5, -40));
        assert!(forager.is_quit_early());
        assert_eq!(forager.pick_move(), Some((1, HardSoftScore::of(-5, -40))));
    }
}
