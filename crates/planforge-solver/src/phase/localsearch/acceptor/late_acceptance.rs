//! Late acceptance acceptor.

use std::fmt::{self, Debug};

use rand::RngCore;

use planforge_core::Score;

use super::{Acceptor, MoveCandidate, StepOutcome};

/// Late acceptance acceptor - accepts moves that are no worse than the
/// step score of `late_acceptance_size` steps ago.
///
/// Maintains a ring buffer of recent step scores, seeded with the phase's
/// starting best score.
///
/// # Example
///
/// ```
/// use planforge_core::SimpleScore;
/// use planforge_solver::phase::localsearch::LateAcceptanceAcceptor;
///
/// let acceptor = LateAcceptanceAcceptor::<SimpleScore>::new(400);
/// assert_eq!(acceptor.late_acceptance_size(), 400);
/// ```
#[derive(Clone)]
pub struct LateAcceptanceAcceptor<Sc> {
    late_acceptance_size: usize,
    hill_climbing_enabled: bool,
    previous_scores: Vec<Sc>,
    late_index: usize,
}

impl<Sc: Score> LateAcceptanceAcceptor<Sc> {
    /// Creates a late acceptance acceptor that also accepts moves which
    /// do not worsen the last step score.
    pub fn new(late_acceptance_size: usize) -> Self {
        Self {
            late_acceptance_size: late_acceptance_size.max(1),
            hill_climbing_enabled: true,
            previous_scores: Vec::new(),
            late_index: 0,
        }
    }

    pub fn with_hill_climbing(mut self, enabled: bool) -> Self {
        self.hill_climbing_enabled = enabled;
        self
    }

    pub fn late_acceptance_size(&self) -> usize {
        self.late_acceptance_size
    }

    fn late_score(&self) -> Option<Sc> {
        self.previous_scores.get(self.late_index).copied()
    }
}

impl<Sc: Score> Default for LateAcceptanceAcceptor<Sc> {
    fn default() -> Self {
        Self::new(400)
    }
}

impl<Sc> Debug for LateAcceptanceAcceptor<Sc> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LateAcceptanceAcceptor")
            .field("late_acceptance_size", &self.late_acceptance_size)
            .field("hill_climbing_enabled", &self.hill_climbing_enabled)
            .field("late_index", &self.late_index)
            .finish()
    }
}

impl<Sc: Score> Acceptor<Sc> for LateAcceptanceAcceptor<Sc> {
    fn phase_started(&mut self, best_score: Sc) {
        self.previous_scores = vec![best_score; self.late_acceptance_size];
        self.late_index = 0;
    }

    fn is_accepted(&mut self, candidate: &MoveCandidate<'_, Sc>, _rng: &mut dyn RngCore) -> bool {
        if self.late_score().is_some_and(|late| candidate.score >= late) {
            return true;
        }
        self.hill_climbing_enabled && candidate.score >= candidate.last_step_score
    }

    fn step_ended(&mut self, outcome: &StepOutcome<'_, Sc>) {
        if self.previous_scores.is_empty() {
            return;
        }
        self.previous_scores[self.late_index] = outcome.step_score;
        self.late_index = (self.late_index + 1) % self.late_acceptance_size;
    }

    fn phase_ended(&mut self) {
        self.previous_scores.clear();
        self.late_index = 0;
    }
}
