//! Local search phase
//!
//! Improves an existing solution step by step: every step scores
//! candidate moves, filters them through an acceptor and lets a forager
//! pick the one to apply.

mod acceptor;
mod forager;
mod parallel;
mod phase;
mod podium;

#[cfg(test)]
mod tests;

pub use acceptor::{
    Acceptor, CompositeAcceptor, EntityTabuAcceptor, HillClimbingAcceptor, LateAcceptanceAcceptor,
    MoveCandidate, MoveTabuAcceptor, SimulatedAnnealingAcceptor, StepContext,
    StepCountingHillClimbingAcceptor, StepOutcome, TabuAttributes, ValueTabuAcceptor,
};
pub use forager::{AcceptedForager, LocalSearchForager};
pub use parallel::ParallelMoveEvaluator;
pub use phase::LocalSearchPhase;
pub use podium::{
    podium_for, Finalist, FinalistPodium, HighestScoreFinalistPodium,
    StrategicOscillationFinalistPodium,
};
