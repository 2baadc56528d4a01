//! Hill climbing acceptor.

use rand::RngCore;

use planforge_core::Score;

use super::{Acceptor, MoveCandidate};

/// Hill climbing acceptor - accepts moves that do not worsen the score.
///
/// Accepting equal moves lets the search drift across plateaus. Combined
/// with a forager that picks the best accepted move this is steepest
/// ascent; it stops at the first local optimum.
///
/// # Example
///
/// ```
/// use planforge_solver::phase::localsearch::HillClimbingAcceptor;
///
/// let acceptor = HillClimbingAcceptor::new();
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct HillClimbingAcceptor;

impl HillClimbingAcceptor {
    pub fn new() -> Self {
        Self
    }
}

impl<Sc: Score> Acceptor<Sc> for HillClimbingAcceptor {
    fn is_accepted(&mut self, candidate: &MoveCandidate<'_, Sc>, _rng: &mut dyn RngCore) -> bool {
        candidate.score >= candidate.last_step_score
    }
}
