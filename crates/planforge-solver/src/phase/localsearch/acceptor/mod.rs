//! Acceptors for local search move acceptance.
//!
//! Acceptors determine whether a move should be accepted based on
//! comparing the resulting score with the last step score, the best score
//! or a history of earlier step scores.

mod composite;
mod hill_climbing;
mod late_acceptance;
mod simulated_annealing;
mod step_counting;
mod tabu;


use std::fmt::Debug;

use rand::RngCore;
use smallvec::SmallVec;

use planforge_core::{PlanningSolution, Score};
use planforge_scoring::ScoreDirector;

use crate::heuristic::r#move::Move;
use crate::heuristic::selector::EntityReference;

pub use composite::CompositeAcceptor;
pub use hill_climbing::HillClimbingAcceptor;
pub use late_acceptance::LateAcceptanceAcceptor;
pub use simulated_annealing::SimulatedAnnealingAcceptor;
pub use step_counting::StepCountingHillClimbingAcceptor;
pub use tabu::{EntityTabuAcceptor, MoveTabuAcceptor, ValueTabuAcceptor};

/// What tabu acceptors know about a move.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TabuAttributes {
    pub entities: SmallVec<[EntityReference; 2]>,
    pub values: SmallVec<[u64; 2]>,
    pub move_hash: u64,
    /// Hash of the move that reverts this one; only known for picked moves.
    pub undo_move_hash: Option<u64>,
}

impl TabuAttributes {
    /// Reads the attributes of `m` against the current working solution.
    pub fn of<S, M>(m: &M, score_director: &dyn ScoreDirector<S>) -> Self
    where
        S: PlanningSolution,
        M: Move<S>,
    {
        Self {
            entities: m.planning_entities(),
            values: m.planning_values(score_director),
            move_hash: m.tabu_hash(),
            undo_move_hash: None,
        }
    }

    /// Like [`of`](Self::of), and also records the undo move's hash.
    ///
    /// Must be called before the move is done.
    pub fn of_step<S, M>(m: &M, score_director: &dyn ScoreDirector<S>) -> Self
    where
        S: PlanningSolution,
        M: Move<S>,
    {
        let mut attributes = Self::of(m, score_director);
        attributes.undo_move_hash = Some(m.undo_move(score_director).tabu_hash());
        attributes
    }
}

/// State shared by every move of a step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepContext<Sc> {
    pub step_index: u64,
    pub last_step_score: Sc,
    pub best_score: Sc,
    /// Fraction of the time budget spent, in `[0, 1]`.
    pub time_gradient: f64,
}

/// A scored move awaiting the acceptor's verdict.
#[derive(Debug, Clone, Copy)]
pub struct MoveCandidate<'a, Sc> {
    pub score: Sc,
    pub last_step_score: Sc,
    pub best_score: Sc,
    pub step_index: u64,
    pub tabu: &'a TabuAttributes,
}

/// The step that was just taken.
#[derive(Debug, Clone, Copy)]
pub struct StepOutcome<'a, Sc> {
    pub step_index: u64,
    pub step_score: Sc,
    /// Score of the step before this one.
    pub last_step_score: Sc,
    pub best_score: Sc,
    pub selected_move_count: u64,
    pub accepted_move_count: u64,
    pub tabu: &'a TabuAttributes,
}

/// Trait for accepting or rejecting moves in local search.
///
/// Acceptors implement different strategies for escaping local optima,
/// such as hill climbing, simulated annealing, or tabu search.
pub trait Acceptor<Sc: Score>: Send + Debug {
    /// Called when a phase starts, with the phase's starting best score.
    fn phase_started(&mut self, _best_score: Sc) {}

    fn step_started(&mut self, _context: &StepContext<Sc>) {}

    /// Returns true if the candidate move may be taken.
    fn is_accepted(&mut self, candidate: &MoveCandidate<'_, Sc>, rng: &mut dyn RngCore) -> bool;

    /// Called after the picked move has been applied.
    fn step_ended(&mut self, _outcome: &StepOutcome<'_, Sc>) {}

    fn phase_ended(&mut self) {}

    /// Returns true if candidates must carry their tabu attributes.
    fn needs_tabu_attributes(&self) -> bool {
        false
    }
}

impl<Sc: Score> Acceptor<Sc> for Box<dyn Acceptor<Sc>> {
    fn phase_started(&mut self, best_score: Sc) {
        (**self).phase_started(best_score)
    }

    fn step_started(&mut self, context: &StepContext<Sc>) {
        (**self).step_started(context)
    }

    fn is_accepted(&mut self, candidate: &MoveCandidate<'_, Sc>, rng: &mut dyn RngCore) -> bool {
        (**self).is_accepted(candidate, rng)
    }

    fn step_ended(&mut self, outcome: &StepOutcome<'_, Sc>) {
        (**self).step_ended(outcome)
    }

    fn phase_ended(&mut self) {
        (**self).phase_ended()
    }

    fn needs_tabu_attributes(&self) -> bool {
        (**self).needs_tabu_attributes()
    }
}
