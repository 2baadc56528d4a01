//! Construction heuristic phase implementation.

use std::fmt::{self, Debug};
use std::marker::PhantomData;

use planforge_config::ConstructionPickEarlyType;
use planforge_core::{PlanningSolution, Result};
use planforge_scoring::ScoreDirector;

use super::{ConstructionHeuristicForager, EntityPlacer};
use crate::heuristic::r#move::Move;
use crate::heuristic::selector::EntityReference;
use crate::phase::{evaluate_move, Phase};
use crate::scope::{PhaseScope, SolverScope, StepScope};
use crate::termination::Termination;

/// Construction heuristic phase that builds an initial solution.
///
/// Takes the placer's queue of uninitialized entities and initializes one
/// entity per step: every doable candidate of its placement is scored
/// speculatively and the forager's pick is applied for good. The queue is
/// taken again after problem changes.
///
/// # Type Parameters
/// * `S` - The planning solution type
/// * `D` - The score director type
/// * `M` - The move type
/// * `P` - The entity placer type
pub struct ConstructionHeuristicPhase<S, D, M, P>
where
    S: PlanningSolution,
    D: ScoreDirector<S>,
{
    placer: P,
    forager: ConstructionHeuristicForager<S::Score>,
    termination: Option<Box<dyn Termination<S, D>>>,
    _phantom: PhantomData<fn() -> M>,
}

impl<S, D, M, P> ConstructionHeuristicPhase<S, D, M, P>
where
    S: PlanningSolution,
    D: ScoreDirector<S>,
    M: Move<S>,
    P: EntityPlacer<S, M>,
{
    pub fn new(placer: P, pick_early_type: ConstructionPickEarlyType) -> Self {
        Self {
            placer,
            forager: ConstructionHeuristicForager::new(pick_early_type),
            termination: None,
            _phantom: PhantomData,
        }
    }

    /// Sets a termination that ends this phase only.
    pub fn with_termination(mut self, termination: Box<dyn Termination<S, D>>) -> Self {
        self.termination = Some(termination);
        self
    }

    fn place(
        &mut self,
        phase_scope: &mut PhaseScope<'_, S, D>,
        entity: EntityReference,
    ) -> Result<()> {
        let Some(mut placement) = self.placer.placement(phase_scope.score_director(), entity)
        else {
            return Ok(());
        };

        let last_step_score = phase_scope.last_completed_step_score();
        let fully_asserted = phase_scope
            .solver_scope()
            .environment_mode()
            .is_fully_asserted();
        let mut step_scope = StepScope::new(phase_scope);
        self.forager.step_started(last_step_score);

        for (index, m) in placement.moves.iter().enumerate() {
            if !placement.is_unassigned_candidate(index)
                && !m.is_doable(step_scope.score_director())
            {
                continue;
            }
            let score = evaluate_move(
                step_scope.score_director_mut(),
                m,
                fully_asserted.then_some(last_step_score),
            )?;
            step_scope
                .phase_scope_mut()
                .solver_scope_mut()
                .statistics_mut()
                .record_move(true);
            self.forager.add_move(index, score);
            if self.forager.is_quit_early() {
                break;
            }
        }

        let selected = self.forager.selected_move_count();
        if let Some((index, _)) = self.forager.pick_move() {
            let picked = placement.take_move(index);
            picked.do_move(step_scope.score_director_mut());
            let step_score = step_scope.calculate_score();
            step_scope
                .phase_scope_mut()
                .assert_step_score(step_score, "construction heuristic step")?;
            step_scope.set_step_score(step_score);
        }
        step_scope.set_move_counts(selected, u64::from(selected > 0));
        step_scope.complete();
        Ok(())
    }
}

impl<S, D, M, P> Debug for ConstructionHeuristicPhase<S, D, M, P>
where
    S: PlanningSolution,
    D: ScoreDirector<S>,
    P: Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConstructionHeuristicPhase")
            .field("placer", &self.placer)
            .field("forager", &self.forager)
            .field("termination", &self.termination)
            .finish()
    }
}

impl<S, D, M, P> Phase<S, D> for ConstructionHeuristicPhase<S, D, M, P>
where
    S: PlanningSolution,
    D: ScoreDirector<S>,
    M: Move<S>,
    P: EntityPlacer<S, M>,
{
    fn solving_started(&mut self, solver_scope: &mut SolverScope<S, D>) -> Result<()> {
        let (score_director, rng) = solver_scope.director_and_rng();
        self.placer.solving_started(score_director, rng)
    }

    fn solve(&mut self, solver_scope: &mut SolverScope<S, D>) -> Result<()> {
        let mut phase_scope = PhaseScope::new(solver_scope, self.phase_type_name());
        {
            let (score_director, rng) = phase_scope.director_and_rng();
            self.placer.phase_started(score_director, rng)?;
        }

        let mut queue = self
            .placer
            .entity_queue(phase_scope.score_director())
            .into_iter();
        loop {
            if phase_scope.is_terminated(self.termination.as_deref()) {
                break;
            }
            // Entity indices may have moved; queue what is still uninitialized.
            if phase_scope.process_problem_changes()? {
                queue = self
                    .placer
                    .entity_queue(phase_scope.score_director())
                    .into_iter();
            }
            let Some(entity) = queue.next() else {
                break;
            };
            {
                let (score_director, rng) = phase_scope.director_and_rng();
                self.placer.step_started(score_director, rng)?;
            }
            self.place(&mut phase_scope, entity)?;
            self.placer.step_ended(phase_scope.score_director_mut())?;
        }

        self.placer.phase_ended(phase_scope.score_director_mut())?;
        phase_scope.phase_ended();
        Ok(())
    }

    fn solving_ended(&mut self, solver_scope: &mut SolverScope<S, D>) -> Result<()> {
        self.placer.solving_ended(solver_scope.score_director_mut())
    }

    fn phase_type_name(&self) -> &'static str {
        "ConstructionHeuristic"
    }
}
