//! Foragers for local search move selection
//!
//! Foragers collect the evaluated moves of a step and select the one to
//! apply.

use std::fmt::{self, Debug};

use rand::{Rng, RngCore};

use planforge_config::{FinalistPodiumType, LocalSearchPickEarlyType};
use planforge_core::Score;

use super::podium::{podium_for, Finalist, FinalistPodium};

/// Trait for collecting and selecting moves in local search.
///
/// Foragers are responsible for:
/// - Collecting evaluated moves, accepted or not
/// - Deciding when to quit evaluating early
/// - Selecting the move to apply
///
/// Moves are identified by their index among the step's evaluated moves.
pub trait LocalSearchForager<Sc: Score>: Send + Debug {
    fn phase_started(&mut self) {}

    /// Called at the start of each step to reset state.
    fn step_started(&mut self, last_step_score: Sc, best_score: Sc);

    fn add_move(&mut self, index: usize, score: Sc, accepted: bool);

    /// Returns true if the forager does not need to see more moves.
    fn is_quit_early(&self) -> bool;

    /// Returns true if a step can end on a never-ending move selector, that
    /// is the forager quits after finitely many accepted moves or picks
    /// early.
    fn supports_never_ending(&self) -> bool;

    /// Picks the move to apply, or `None` if no move was added.
    fn pick_move(&mut self, rng: &mut dyn RngCore) -> Option<Finalist<Sc>>;

    fn selected_move_count(&self) -> u64;

    fn accepted_move_count(&self) -> u64;

    fn phase_ended(&mut self) {}
}

impl<Sc: Score> LocalSearchForager<Sc> for Box<dyn LocalSearchForager<Sc>> {
    fn phase_started(&mut self) {
        (**self).phase_started()
    }

    fn step_started(&mut self, last_step_score: Sc, best_score: Sc) {
        (**self).step_started(last_step_score, best_score)
    }

    fn add_move(&mut self, index: usize, score: Sc, accepted: bool) {
        (**self).add_move(index, score, accepted)
    }

    fn is_quit_early(&self) -> bool {
        (**self).is_quit_early()
    }

    fn supports_never_ending(&self) -> bool {
        (**self).supports_never_ending()
    }

    fn pick_move(&mut self, rng: &mut dyn RngCore) -> Option<Finalist<Sc>> {
        (**self).pick_move(rng)
    }

    fn selected_move_count(&self) -> u64 {
        (**self).selected_move_count()
    }

    fn accepted_move_count(&self) -> u64 {
        (**self).accepted_move_count()
    }

    fn phase_ended(&mut self) {
        (**self).phase_ended()
    }
}

/// A forager that keeps the best moves on a finalist podium.
///
/// Evaluation of a step stops once `accepted_count_limit` accepted moves
/// have been seen, or as soon as a move qualifies for the pick-early
/// rule.
///
/// # Example
///
/// ```
/// use planforge_core::SimpleScore;
/// use planforge_solver::phase::localsearch::{AcceptedForager, LocalSearchForager};
/// use rand::rngs::StdRng;
/// use rand::SeedableRng;
///
/// let mut forager = AcceptedForager::<SimpleScore>::new(2);
/// forager.step_started(SimpleScore::of(-10), SimpleScore::of(-10));
///
/// forager.add_move(0, SimpleScore::of(-8), true);
/// assert!(!forager.is_quit_early());
/// forager.add_move(1, SimpleScore::of(-9), true);
/// assert!(forager.is_quit_early());
///
/// let mut rng = StdRng::seed_from_u64(0);
/// assert_eq!(forager.pick_move(&mut rng).map(|m| m.index), Some(0));
/// ```
pub struct AcceptedForager<Sc: Score> {
    accepted_count_limit: u64,
    pick_early_type: LocalSearchPickEarlyType,
    break_tie_randomly: bool,
    podium: Box<dyn FinalistPodium<Sc>>,
    last_step_score: Option<Sc>,
    best_score: Option<Sc>,
    early_pick: Option<Finalist<Sc>>,
    selected_move_count: u64,
    accepted_move_count: u64,
}

impl<Sc: Score> AcceptedForager<Sc> {
    /// Creates a forager with a highest score podium that picks the first
    /// finalist.
    pub fn new(accepted_count_limit: usize) -> Self {
        Self {
            accepted_count_limit: accepted_count_limit.max(1) as u64,
            pick_early_type: LocalSearchPickEarlyType::Never,
            break_tie_randomly: false,
            podium: podium_for(FinalistPodiumType::HighestScore),
            last_step_score: None,
            best_score: None,
            early_pick: None,
            selected_move_count: 0,
            accepted_move_count: 0,
        }
    }

    pub fn with_pick_early_type(mut self, pick_early_type: LocalSearchPickEarlyType) -> Self {
        self.pick_early_type = pick_early_type;
        self
    }

    pub fn with_podium(mut self, podium_type: FinalistPodiumType) -> Self {
        self.podium = podium_for(podium_type);
        self
    }

    pub fn with_break_tie_randomly(mut self, break_tie_randomly: bool) -> Self {
        self.break_tie_randomly = break_tie_randomly;
        self
    }

    fn check_pick_early(&mut self, index: usize, score: Sc) {
        let reference = match self.pick_early_type {
            LocalSearchPickEarlyType::Never => return,
            LocalSearchPickEarlyType::FirstBestScoreImproving => self.best_score,
            LocalSearchPickEarlyType::FirstLastStepScoreImproving => self.last_step_score,
        };
        if reference.is_some_and(|reference| score > reference) {
            self.early_pick = Some(Finalist {
                index,
                score,
                accepted: true,
            });
        }
    }
}

impl<Sc: Score> Debug for AcceptedForager<Sc> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AcceptedForager")
            .field("accepted_count_limit", &self.accepted_count_limit)
            .field("pick_early_type", &self.pick_early_type)
            .field("break_tie_randomly", &self.break_tie_randomly)
            .field("podium", &self.podium)
            .finish()
    }
}

impl<Sc: Score> LocalSearchForager<Sc> for AcceptedForager<Sc> {
    fn step_started(&mut self, last_step_score: Sc, best_score: Sc) {
        self.last_step_score = Some(last_step_score);
        self.best_score = Some(best_score);
        self.early_pick = None;
        self.selected_move_count = 0;
        self.accepted_move_count = 0;
        self.podium.step_started(last_step_score, best_score);
    }

    fn add_move(&mut self, index: usize, score: Sc, accepted: bool) {
        self.selected_move_count += 1;
        if accepted {
            self.accepted_move_count += 1;
            self.check_pick_early(index, score);
        }
        self.podium.add_move(index, score, accepted);
    }

    fn is_quit_early(&self) -> bool {
        self.early_pick.is_some() || self.accepted_move_count >= self.accepted_count_limit
    }

    fn supports_never_ending(&self) -> bool {
        self.accepted_count_limit < usize::MAX as u64
            || self.pick_early_type != LocalSearchPickEarlyType::Never
    }

    fn pick_move(&mut self, rng: &mut dyn RngCore) -> Option<Finalist<Sc>> {
        if let Some(early) = self.early_pick.take() {
            return Some(early);
        }
        let finalists = self.podium.finalists();
        match finalists.len() {
            0 => None,
            1 => Some(finalists[0]),
            n if self.break_tie_randomly => Some(finalists[rng.random_range(0..n)]),
            _ => Some(finalists[0]),
        }
    }

    fn selected_move_count(&self) -> u64 {
        self.selected_move_count
    }

    fn accepted_move_count(&self) -> u64 {
        self.accepted_move_count
    }

    fn phase_ended(&mut self) {
        self.last_step_score = None;
        self.best_score = None;
        self.early_pick = None;
    }
}
