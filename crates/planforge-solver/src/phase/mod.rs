//! Solver phases for different solving strategies
//!
//! Phases are the main building blocks of solving:
//! - ConstructionHeuristicPhase: Builds an initial solution
//! - LocalSearchPhase: Improves an existing solution
//! - ExhaustiveSearchPhase: Explores the solution space with branch and bound

pub mod construction;
pub mod exhaustive;
pub mod localsearch;

use std::fmt::Debug;

use planforge_core::{PlanForgeError, PlanningSolution, Result};
use planforge_scoring::{RecordingScoreDirector, ScoreDirector};

use crate::heuristic::r#move::Move;
use crate::scope::SolverScope;

/// A phase of the solving process.
///
/// Phases are executed in sequence by the solver. Each phase has its own
/// strategy for exploring or constructing solutions.
///
/// # Type Parameters
/// * `S` - The planning solution type
/// * `D` - The score director type
pub trait Phase<S: PlanningSolution, D: ScoreDirector<S>>: Send + Debug {
    /// Called once before the first phase runs.
    fn solving_started(&mut self, _solver_scope: &mut SolverScope<S, D>) -> Result<()> {
        Ok(())
    }

    /// Executes this phase.
    ///
    /// The phase modifies the working solution in the solver scope and
    /// offers every completed step to the best solution recaller.
    fn solve(&mut self, solver_scope: &mut SolverScope<S, D>) -> Result<()>;

    /// Called once after the last phase ran.
    fn solving_ended(&mut self, _solver_scope: &mut SolverScope<S, D>) -> Result<()> {
        Ok(())
    }

    /// Returns the name of this phase type.
    fn phase_type_name(&self) -> &'static str;
}

impl<S: PlanningSolution, D: ScoreDirector<S>> Phase<S, D> for Box<dyn Phase<S, D>> {
    fn solving_started(&mut self, solver_scope: &mut SolverScope<S, D>) -> Result<()> {
        (**self).solving_started(solver_scope)
    }

    fn solve(&mut self, solver_scope: &mut SolverScope<S, D>) -> Result<()> {
        (**self).solve(solver_scope)
    }

    fn solving_ended(&mut self, solver_scope: &mut SolverScope<S, D>) -> Result<()> {
        (**self).solving_ended(solver_scope)
    }

    fn phase_type_name(&self) -> &'static str {
        (**self).phase_type_name()
    }
}

/// Scores a move speculatively: does it through a recording director,
/// calculates the score and undoes it.
///
/// With `assert_undo` the restored solution is rescored from scratch and
/// compared with `before`, the score the working solution had before the
/// move.
pub(crate) fn evaluate_move<S, M>(
    score_director: &mut dyn ScoreDirector<S>,
    m: &M,
    assert_undo: Option<S::Score>,
) -> Result<S::Score>
where
    S: PlanningSolution,
    M: Move<S>,
{
    let score = {
        let mut recording = RecordingScoreDirector::new(score_director);
        m.do_move(&mut recording);
        let score = recording.calculate_score();
        recording.undo_changes();
        score
    };
    tracing::trace!(event = "move", mv = ?m, score = %score);

    if let Some(before) = assert_undo {
        let restored = score_director.calculate_score_from_scratch();
        if restored != before {
            return Err(PlanForgeError::ScoreCorruption {
                expected: before.to_string(),
                actual: restored.to_string(),
                context: format!("undo of {:?}", m),
            });
        }
    }
    Ok(score)
}
