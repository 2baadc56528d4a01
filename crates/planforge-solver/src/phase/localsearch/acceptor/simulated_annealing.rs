//! Simulated annealing acceptor.

use rand::{Rng, RngCore};

use planforge_core::Score;

use super::{Acceptor, MoveCandidate, StepContext};

const TEMPERATURE_MINIMUM: f64 = 1.0e-100;

/// Simulated annealing acceptor - accepts worsening moves with a
/// probability that shrinks as the temperature cools.
///
/// The temperature has one value per score level. It starts at
/// `starting_temperature` and falls linearly with the time gradient, so a
/// time or step based termination is needed for it to cool down.
///
/// A move that does not worsen the last step score is always accepted.
/// Otherwise every deteriorated level contributes a factor
/// `exp(-delta / temperature)` to the accept chance.
///
/// # Example
///
/// ```
/// use planforge_core::HardSoftScore;
/// use planforge_solver::phase::localsearch::SimulatedAnnealingAcceptor;
///
/// let acceptor = SimulatedAnnealingAcceptor::new(HardSoftScore::of(0, 100));
/// assert_eq!(acceptor.temperatures(), &[0.0, 100.0]);
/// ```
#[derive(Debug, Clone)]
pub struct SimulatedAnnealingAcceptor<Sc> {
    starting_temperature: Sc,
    starting_levels: Vec<f64>,
    temperatures: Vec<f64>,
}

impl<Sc: Score> SimulatedAnnealingAcceptor<Sc> {
    pub fn new(starting_temperature: Sc) -> Self {
        let starting_levels: Vec<f64> = starting_temperature
            .to_level_numbers()
            .into_iter()
            .map(|level| level as f64)
            .collect();
        Self {
            starting_temperature,
            temperatures: starting_levels.clone(),
            starting_levels,
        }
    }

    pub fn starting_temperature(&self) -> Sc {
        self.starting_temperature
    }

    /// The current temperature of each score level.
    pub fn temperatures(&self) -> &[f64] {
        &self.temperatures
    }

    fn accept_chance(&self, last_step_score: &Sc, move_score: &Sc) -> f64 {
        let last = last_step_score.to_level_numbers();
        let moved = move_score.to_level_numbers();
        last.iter()
            .zip(&moved)
            .zip(&self.temperatures)
            .filter(|((last, moved), _)| moved < last)
            .map(|((last, moved), temperature)| {
                let delta = (*last - *moved) as f64;
                (-delta / temperature).exp()
            })
            .product()
    }
}

impl<Sc: Score> Acceptor<Sc> for SimulatedAnnealingAcceptor<Sc> {
    fn phase_started(&mut self, _best_score: Sc) {
        self.temperatures = self.starting_levels.clone();
    }

    fn step_started(&mut self, context: &StepContext<Sc>) {
        let remaining = 1.0 - context.time_gradient.clamp(0.0, 1.0);
        self.temperatures = self
            .starting_levels
            .iter()
            .map(|start| (start * remaining).max(TEMPERATURE_MINIMUM))
            .collect();
    }

    fn is_accepted(&mut self, candidate: &MoveCandidate<'_, Sc>, rng: &mut dyn RngCore) -> bool {
        if candidate.score >= candidate.last_step_score {
            return true;
        }
        let chance = self.accept_chance(&candidate.last_step_score, &candidate.score);
        rng.random::<f64>() < chance
    }
}
