//! Local search phase implementation.

use std::fmt::{self, Debug};

use planforge_core::{PlanForgeError, PlanningSolution, Result};
use planforge_scoring::ScoreDirector;

use super::acceptor::{Acceptor, MoveCandidate, StepContext, StepOutcome, TabuAttributes};
use super::forager::LocalSearchForager;
use super::parallel::ParallelMoveEvaluator;
use crate::heuristic::r#move::Move;
use crate::heuristic::selector::MoveSelector;
use crate::phase::{evaluate_move, Phase};
use crate::scope::{PhaseScope, SolverScope, StepScope};
use crate::termination::Termination;

/// Consecutive samples without a doable move before a step gives up.
const MAX_EMPTY_SAMPLES: u32 = 100;

/// Local search phase that improves an existing solution.
///
/// Each step:
/// 1. Generates candidate moves: every move of a finite selector, or
///    random samples from a never-ending one until the forager quits
/// 2. Scores each doable move speculatively
/// 3. Asks the acceptor whether the move may be taken
/// 4. Hands the scored move to the forager
/// 5. Applies the forager's pick for good
///
/// The phase ends when its termination fires, or when a step picks no
/// accepted move.
///
/// # Type Parameters
/// * `S` - The planning solution type
/// * `D` - The score director type
/// * `M` - The move type
/// * `MS` - The move selector type
/// * `A` - The acceptor type
/// * `Fo` - The forager type
pub struct LocalSearchPhase<S, D, M, MS, A, Fo>
where
    S: PlanningSolution,
    D: ScoreDirector<S>,
{
    move_selector: MS,
    acceptor: A,
    forager: Fo,
    termination: Option<Box<dyn Termination<S, D>>>,
    parallel: Option<ParallelMoveEvaluator<S, D>>,
    moves: Vec<M>,
}

impl<S, D, M, MS, A, Fo> LocalSearchPhase<S, D, M, MS, A, Fo>
where
    S: PlanningSolution,
    D: ScoreDirector<S>,
    M: Move<S>,
    MS: MoveSelector<S, M>,
    A: Acceptor<S::Score>,
    Fo: LocalSearchForager<S::Score>,
{
    /// Creates a new local search phase.
    pub fn new(move_selector: MS, acceptor: A, forager: Fo) -> Self {
        Self {
            move_selector,
            acceptor,
            forager,
            termination: None,
            parallel: None,
            moves: Vec::new(),
        }
    }

    /// Sets a termination that ends this phase only.
    pub fn with_termination(mut self, termination: Box<dyn Termination<S, D>>) -> Self {
        self.termination = Some(termination);
        self
    }

    /// Scores the moves of finite selectors on `thread_count` threads.
    ///
    /// A count of one keeps evaluation on the solving thread.
    pub fn with_move_thread_count(mut self, thread_count: usize) -> Self
    where
        D: Clone,
    {
        self.parallel = (thread_count > 1).then(|| ParallelMoveEvaluator::new(thread_count));
        self
    }

    /// Runs one step. Returns false if the step found no move to take.
    fn step(
        &mut self,
        phase_scope: &mut PhaseScope<'_, S, D>,
        context: &StepContext<S::Score>,
        needs_tabu: bool,
        assert_undo: Option<S::Score>,
    ) -> Result<bool> {
        let mut step_scope = StepScope::new(phase_scope);
        self.moves.clear();
        if self.move_selector.is_never_ending() {
            self.sample_moves(&mut step_scope, context, needs_tabu, assert_undo)?;
        } else {
            self.evaluate_all_moves(&mut step_scope, context, needs_tabu, assert_undo)?;
        }

        let selected = self.forager.selected_move_count();
        let accepted = self.forager.accepted_move_count();
        step_scope.set_move_counts(selected, accepted);
        let picked = self
            .forager
            .pick_move(step_scope.phase_scope_mut().rng())
            .filter(|picked| picked.accepted);
        let Some(picked) = picked else {
            if !step_scope
                .phase_scope()
                .is_terminated(self.termination.as_deref())
            {
                tracing::warn!(
                    event = "no_move",
                    step = context.step_index,
                    selected,
                    accepted,
                    "local search found no accepted move, ending phase"
                );
            }
            return Ok(false);
        };

        let step_move = self.moves.swap_remove(picked.index);
        let tabu = if needs_tabu {
            TabuAttributes::of_step(&step_move, step_scope.score_director())
        } else {
            TabuAttributes::default()
        };
        step_move.do_move(step_scope.score_director_mut());
        let step_score = step_scope.calculate_score();
        step_scope
            .phase_scope_mut()
            .assert_step_score(step_score, "local search step")?;
        if let Some(parallel) = &mut self.parallel {
            parallel.step_ended(&step_move);
        }
        step_scope.set_step_score(step_score);
        step_scope.complete();

        let best_score = phase_scope.best_score().unwrap_or(step_score);
        self.acceptor.step_ended(&StepOutcome {
            step_index: context.step_index,
            step_score,
            last_step_score: context.last_step_score,
            best_score,
            selected_move_count: selected,
            accepted_move_count: accepted,
            tabu: &tabu,
        });
        Ok(true)
    }

    fn evaluate_all_moves(
        &mut self,
        step_scope: &mut StepScope<'_, '_, S, D>,
        context: &StepContext<S::Score>,
        needs_tabu: bool,
        assert_undo: Option<S::Score>,
    ) -> Result<()> {
        self.moves
            .extend(self.move_selector.iter_moves(step_scope.score_director()));

        let parallel_scores = match &mut self.parallel {
            Some(parallel) if self.moves.len() > 1 => {
                Some(parallel.evaluate(&self.moves, assert_undo)?)
            }
            _ => None,
        };

        for index in 0..self.moves.len() {
            let score = match &parallel_scores {
                Some(scores) => scores[index],
                None => {
                    let m = &self.moves[index];
                    if m.is_doable(step_scope.score_director()) {
                        Some(evaluate_move(step_scope.score_director_mut(), m, assert_undo)?)
                    } else {
                        None
                    }
                }
            };
            let Some(score) = score else {
                continue;
            };
            self.judge(step_scope, context, index, score, needs_tabu);
            if self.forager.is_quit_early() {
                break;
            }
        }
        Ok(())
    }

    fn sample_moves(
        &mut self,
        step_scope: &mut StepScope<'_, '_, S, D>,
        context: &StepContext<S::Score>,
        needs_tabu: bool,
        assert_undo: Option<S::Score>,
    ) -> Result<()> {
        let mut empty_samples = 0;
        loop {
            if step_scope
                .phase_scope()
                .is_terminated(self.termination.as_deref())
            {
                break;
            }
            let sampled = {
                let (score_director, rng) = step_scope.phase_scope_mut().director_and_rng();
                self.move_selector.sample_move(&*score_director, rng)
            };
            let Some(m) = sampled.filter(|m| m.is_doable(step_scope.score_director())) else {
                empty_samples += 1;
                if empty_samples >= MAX_EMPTY_SAMPLES {
                    break;
                }
                continue;
            };
            empty_samples = 0;

            let score = evaluate_move(step_scope.score_director_mut(), &m, assert_undo)?;
            let index = self.moves.len();
            self.moves.push(m);
            self.judge(step_scope, context, index, score, needs_tabu);
            if self.forager.is_quit_early() {
                break;
            }
        }
        Ok(())
    }

    fn judge(
        &mut self,
        step_scope: &mut StepScope<'_, '_, S, D>,
        context: &StepContext<S::Score>,
        index: usize,
        score: S::Score,
        needs_tabu: bool,
    ) {
        let tabu = if needs_tabu {
            TabuAttributes::of(&self.moves[index], step_scope.score_director())
        } else {
            TabuAttributes::default()
        };
        let candidate = MoveCandidate {
            score,
            last_step_score: context.last_step_score,
            best_score: context.best_score,
            step_index: context.step_index,
            tabu: &tabu,
        };
        let accepted = self
            .acceptor
            .is_accepted(&candidate, step_scope.phase_scope_mut().rng());
        step_scope
            .phase_scope_mut()
            .solver_scope_mut()
            .statistics_mut()
            .record_move(accepted);
        self.forager.add_move(index, score, accepted);
    }

    fn sync_parallel(&mut self, phase_scope: &PhaseScope<'_, S, D>) {
        if let Some(parallel) = &mut self.parallel {
            let problem_change_count = phase_scope.solver_scope().problem_change_count();
            parallel.sync(phase_scope.score_director(), problem_change_count);
        }
    }
}

impl<S, D, M, MS, A, Fo> Debug for LocalSearchPhase<S, D, M, MS, A, Fo>
where
    S: PlanningSolution,
    D: ScoreDirector<S>,
    MS: Debug,
    A: Debug,
    Fo: Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocalSearchPhase")
            .field("move_selector", &self.move_selector)
            .field("acceptor", &self.acceptor)
            .field("forager", &self.forager)
            .field("termination", &self.termination)
            .field("parallel", &self.parallel)
            .finish()
    }
}

impl<S, D, M, MS, A, Fo> Phase<S, D> for LocalSearchPhase<S, D, M, MS, A, Fo>
where
    S: PlanningSolution,
    D: ScoreDirector<S>,
    M: Move<S>,
    MS: MoveSelector<S, M>,
    A: Acceptor<S::Score>,
    Fo: LocalSearchForager<S::Score>,
{
    fn solving_started(&mut self, solver_scope: &mut SolverScope<S, D>) -> Result<()> {
        let (score_director, rng) = solver_scope.director_and_rng();
        self.move_selector.solving_started(score_director, rng)
    }

    fn solve(&mut self, solver_scope: &mut SolverScope<S, D>) -> Result<()> {
        if self.move_selector.is_never_ending() {
            if !self.forager.supports_never_ending() {
                return Err(PlanForgeError::Config(
                    "local search with a never-ending move selector needs an accepted count \
                     limit or a pick early type"
                        .to_string(),
                ));
            }
            if self.termination.is_none() && !solver_scope.has_termination() {
                return Err(PlanForgeError::Config(
                    "local search with a never-ending move selector needs a termination"
                        .to_string(),
                ));
            }
        }

        let mut phase_scope = PhaseScope::new(solver_scope, self.phase_type_name());
        {
            let (score_director, rng) = phase_scope.director_and_rng();
            self.move_selector.phase_started(score_director, rng)?;
        }
        let starting_best = phase_scope
            .best_score()
            .unwrap_or_else(|| phase_scope.last_completed_step_score());
        self.acceptor.phase_started(starting_best);
        self.forager.phase_started();
        if let Some(parallel) = &mut self.parallel {
            let problem_change_count = phase_scope.solver_scope().problem_change_count();
            parallel.phase_started(phase_scope.score_director(), problem_change_count)?;
        }

        let needs_tabu = self.acceptor.needs_tabu_attributes();
        let fully_asserted = phase_scope
            .solver_scope()
            .environment_mode()
            .is_fully_asserted();

        loop {
            if phase_scope.is_terminated(self.termination.as_deref()) {
                break;
            }
            if phase_scope.process_problem_changes()? {
                let best = phase_scope
                    .best_score()
                    .unwrap_or_else(|| phase_scope.last_completed_step_score());
                self.acceptor.phase_started(best);
            }
            self.sync_parallel(&phase_scope);
            {
                let (score_director, rng) = phase_scope.director_and_rng();
                self.move_selector.step_started(score_director, rng)?;
            }

            let last_step_score = phase_scope.last_completed_step_score();
            let context = StepContext {
                step_index: phase_scope.step_count(),
                last_step_score,
                best_score: phase_scope.best_score().unwrap_or(last_step_score),
                time_gradient: phase_scope.time_gradient(self.termination.as_deref()),
            };
            self.acceptor.step_started(&context);
            self.forager
                .step_started(context.last_step_score, context.best_score);

            let assert_undo = fully_asserted.then_some(last_step_score);
            let stepped = self.step(&mut phase_scope, &context, needs_tabu, assert_undo)?;
            self.move_selector
                .step_ended(phase_scope.score_director_mut())?;
            if !stepped {
                break;
            }
        }

        self.moves.clear();
        self.move_selector
            .phase_ended(phase_scope.score_director_mut())?;
        self.acceptor.phase_ended();
        self.forager.phase_ended();
        if let Some(parallel) = &mut self.parallel {
            parallel.phase_ended();
        }
        phase_scope.phase_ended();
        Ok(())
    }

    fn solving_ended(&mut self, solver_scope: &mut SolverScope<S, D>) -> Result<()> {
        self.move_selector
            .solving_ended(solver_scope.score_director_mut())
    }

    fn phase_type_name(&self) -> &'static str {
        "LocalSearch"
    }
}
