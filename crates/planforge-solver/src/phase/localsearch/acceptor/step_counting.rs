//! Step counting hill climbing acceptor.

use rand::RngCore;

use planforge_config::StepCountingType;
use planforge_core::Score;

use super::{Acceptor, MoveCandidate, StepOutcome};

/// Step counting hill climbing acceptor.
///
/// Accepts a move that does not worsen the last step score, or that is no
/// worse than a threshold score. The threshold is reset to the step score
/// every `step_counting_limit` counted units, where the unit is chosen by
/// the [`StepCountingType`].
///
/// # Example
///
/// ```
/// use planforge_config::StepCountingType;
/// use planforge_core::SimpleScore;
/// use planforge_solver::phase::localsearch::StepCountingHillClimbingAcceptor;
///
/// let acceptor =
///     StepCountingHillClimbingAcceptor::<SimpleScore>::new(400, StepCountingType::Step);
/// assert_eq!(acceptor.threshold_score(), None);
/// ```
#[derive(Debug, Clone)]
pub struct StepCountingHillClimbingAcceptor<Sc> {
    step_counting_limit: u64,
    step_counting_type: StepCountingType,
    threshold_score: Option<Sc>,
    count: u64,
}

impl<Sc: Score> StepCountingHillClimbingAcceptor<Sc> {
    pub fn new(step_counting_limit: usize, step_counting_type: StepCountingType) -> Self {
        Self {
            step_counting_limit: step_counting_limit.max(1) as u64,
            step_counting_type,
            threshold_score: None,
            count: 0,
        }
    }

    pub fn threshold_score(&self) -> Option<Sc> {
        self.threshold_score
    }

    fn count_increment(&self, outcome: &StepOutcome<'_, Sc>) -> u64 {
        match self.step_counting_type {
            StepCountingType::SelectedMove => outcome.selected_move_count,
            StepCountingType::AcceptedMove => outcome.accepted_move_count,
            StepCountingType::Step => 1,
            StepCountingType::EqualOrImprovingStep => {
                u64::from(outcome.step_score >= outcome.last_step_score)
            }
            StepCountingType::ImprovingStep => {
                u64::from(outcome.step_score > outcome.last_step_score)
            }
        }
    }
}

impl<Sc: Score> Acceptor<Sc> for StepCountingHillClimbingAcceptor<Sc> {
    fn phase_started(&mut self, best_score: Sc) {
        self.threshold_score = Some(best_score);
        self.count = 0;
    }

    fn is_accepted(&mut self, candidate: &MoveCandidate<'_, Sc>, _rng: &mut dyn RngCore) -> bool {
        if candidate.score >= candidate.last_step_score {
            return true;
        }
        self.threshold_score
            .is_some_and(|threshold| candidate.score >= threshold)
    }

    fn step_ended(&mut self, outcome: &StepOutcome<'_, Sc>) {
        self.count += self.count_increment(outcome);
        if self.count >= self.step_counting_limit {
            self.threshold_score = Some(outcome.step_score);
            self.count = 0;
        }
    }

    fn phase_ended(&mut self) {
        self.threshold_score = None;
        self.count = 0;
    }
}
