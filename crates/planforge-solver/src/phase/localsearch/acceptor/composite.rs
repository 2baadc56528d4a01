//! Composite acceptor.

use rand::RngCore;

use planforge_core::Score;

use super::{Acceptor, MoveCandidate, StepContext, StepOutcome};

/// Accepts a move only if every child acceptor accepts it.
///
/// Every child receives every lifecycle hook. Children after the first
/// rejecting one are not asked about the move.
#[derive(Debug)]
pub struct CompositeAcceptor<Sc: Score> {
    acceptors: Vec<Box<dyn Acceptor<Sc>>>,
}

impl<Sc: Score> CompositeAcceptor<Sc> {
    pub fn new(acceptors: Vec<Box<dyn Acceptor<Sc>>>) -> Self {
        Self { acceptors }
    }

    pub fn len(&self) -> usize {
        self.acceptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.acceptors.is_empty()
    }
}

impl<Sc: Score> Acceptor<Sc> for CompositeAcceptor<Sc> {
    fn phase_started(&mut self, best_score: Sc) {
        for acceptor in &mut self.acceptors {
            acceptor.phase_started(best_score);
        }
    }

    fn step_started(&mut self, context: &StepContext<Sc>) {
        for acceptor in &mut self.acceptors {
            acceptor.step_started(context);
        }
    }

    fn is_accepted(&mut self, candidate: &MoveCandidate<'_, Sc>, rng: &mut dyn RngCore) -> bool {
        self.acceptors
            .iter_mut()
            .all(|acceptor| acceptor.is_accepted(candidate, rng))
    }

    fn step_ended(&mut self, outcome: &StepOutcome<'_, Sc>) {
        for acceptor in &mut self.acceptors {
            acceptor.step_ended(outcome);
        }
    }

    fn phase_ended(&mut self) {
        for acceptor in &mut self.acceptors {
            acceptor.phase_ended();
        }
    }

    fn needs_tabu_attributes(&self) -> bool {
        self.acceptors.iter().any(|a| a.needs_tabu_attributes())
    }
}
