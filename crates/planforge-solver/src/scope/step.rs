//! Step-level scope.

use planforge_core::PlanningSolution;
use planforge_scoring::ScoreDirector;

use super::PhaseScope;

/// Scope for a single step within a phase.
pub struct StepScope<'a, 'b, S: PlanningSolution, D: ScoreDirector<S>> {
    phase_scope: &'a mut PhaseScope<'b, S, D>,
    step_index: u64,
    step_score: Option<S::Score>,
    selected_move_count: u64,
    accepted_move_count: u64,
}

impl<'a, 'b, S: PlanningSolution, D: ScoreDirector<S>> StepScope<'a, 'b, S, D> {
    pub fn new(phase_scope: &'a mut PhaseScope<'b, S, D>) -> Self {
        let step_index = phase_scope.step_count();
        phase_scope
            .solver_scope()
            .event_support()
            .fire_step_started(step_index);
        Self {
            phase_scope,
            step_index,
            step_score: None,
            selected_move_count: 0,
            accepted_move_count: 0,
        }
    }

    /// Index of this step within its phase.
    pub fn step_index(&self) -> u64 {
        self.step_index
    }

    pub fn step_score(&self) -> Option<&S::Score> {
        self.step_score.as_ref()
    }

    pub fn set_step_score(&mut self, score: S::Score) {
        self.step_score = Some(score);
    }

    pub fn set_move_counts(&mut self, selected: u64, accepted: u64) {
        self.selected_move_count = selected;
        self.accepted_move_count = accepted;
    }

    /// Completes the step.
    ///
    /// Counts it, and when a step score was set, records it as the last
    /// completed step score and offers the working solution as the new
    /// best. Returns true if the best solution improved.
    pub fn complete(self) -> bool {
        let phase_scope = self.phase_scope;
        phase_scope.increment_step_count();

        let improved = match self.step_score {
            Some(score) => {
                phase_scope.set_last_completed_step_score(score);
                phase_scope.update_best_solution(score)
            }
            None => false,
        };

        tracing::debug!(
            event = "step",
            phase = phase_scope.phase_type(),
            step = self.step_index,
            score = %self.step_score.map(|s| s.to_string()).unwrap_or_default(),
            best_score = %phase_scope.best_score().map(|s| s.to_string()).unwrap_or_default(),
            selected = self.selected_move_count,
            accepted = self.accepted_move_count,
        );
        if let Some(score) = &self.step_score {
            phase_scope
                .solver_scope()
                .event_support()
                .fire_step_ended(self.step_index, score);
        }
        improved
    }

    pub fn phase_scope(&self) -> &PhaseScope<'b, S, D> {
        self.phase_scope
    }

    pub fn phase_scope_mut(&mut self) -> &mut PhaseScope<'b, S, D> {
        self.phase_scope
    }

    pub fn score_director(&self) -> &D {
        self.phase_scope.score_director()
    }

    pub fn score_director_mut(&mut self) -> &mut D {
        self.phase_scope.score_director_mut()
    }

    pub fn calculate_score(&mut self) -> S::Score {
        self.phase_scope.calculate_score()
    }
}
