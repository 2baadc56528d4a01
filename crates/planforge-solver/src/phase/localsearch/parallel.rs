//! Parallel move evaluation.
//!
//! Each worker thread owns a clone of the score director. A step's moves
//! are split into one chunk per worker and scored there; the results come
//! back in move order. Workers only score: acceptance and picking stay on
//! the solving thread, so they draw no random numbers.

use std::fmt::{self, Debug};

use rayon::prelude::*;

use planforge_core::{PlanForgeError, PlanningSolution, Result};
use planforge_scoring::ScoreDirector;

use crate::heuristic::r#move::Move;
use crate::phase::evaluate_move;

/// Scores moves on cloned score directors with rayon.
///
/// The clones are kept in sync with the working solution by replaying
/// every step's move, and rebuilt after problem changes.
pub struct ParallelMoveEvaluator<S: PlanningSolution, D: ScoreDirector<S>> {
    thread_count: usize,
    pool: Option<rayon::ThreadPool>,
    workers: Vec<D>,
    clone_director: fn(&D) -> D,
    synced_problem_change_count: u64,
    _phantom: std::marker::PhantomData<fn() -> S>,
}

impl<S: PlanningSolution, D: ScoreDirector<S>> ParallelMoveEvaluator<S, D> {
    pub fn new(thread_count: usize) -> Self
    where
        D: Clone,
    {
        Self {
            thread_count: thread_count.max(1),
            pool: None,
            workers: Vec::new(),
            clone_director: D::clone,
            synced_problem_change_count: 0,
            _phantom: std::marker::PhantomData,
        }
    }

    pub fn thread_count(&self) -> usize {
        self.thread_count
    }

    /// Clones the working director once per worker.
    pub fn phase_started(&mut self, score_director: &D, problem_change_count: u64) -> Result<()> {
        if self.pool.is_none() {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(self.thread_count)
                .thread_name(|index| format!("planforge-move-{index}"))
                .build()
                .map_err(|e| {
                    PlanForgeError::Internal(format!("failed to create move thread pool: {e}"))
                })?;
            self.pool = Some(pool);
        }
        self.reclone(score_director, problem_change_count);
        tracing::debug!(
            event = "parallel_evaluation",
            threads = self.thread_count,
        );
        Ok(())
    }

    /// Rebuilds the workers if problem changes were applied since they
    /// were cloned.
    pub fn sync(&mut self, score_director: &D, problem_change_count: u64) {
        if problem_change_count != self.synced_problem_change_count {
            self.reclone(score_director, problem_change_count);
        }
    }

    fn reclone(&mut self, score_director: &D, problem_change_count: u64) {
        let clone_director = self.clone_director;
        self.workers = (0..self.thread_count)
            .map(|_| clone_director(score_director))
            .collect();
        self.synced_problem_change_count = problem_change_count;
    }

    /// Scores every move; `None` for moves that are not doable.
    pub fn evaluate<M: Move<S>>(
        &mut self,
        moves: &[M],
        assert_undo: Option<S::Score>,
    ) -> Result<Vec<Option<S::Score>>> {
        if moves.is_empty() {
            return Ok(Vec::new());
        }
        let Some(pool) = &self.pool else {
            return Err(PlanForgeError::InvalidState(
                "parallel move evaluation used before the phase started".to_string(),
            ));
        };
        let chunk_size = moves.len().div_ceil(self.workers.len().max(1));
        let workers = &mut self.workers;

        let chunks: Vec<Result<Vec<Option<S::Score>>>> = pool.install(|| {
            workers
                .par_iter_mut()
                .zip(moves.par_chunks(chunk_size))
                .map(|(worker, chunk)| {
                    chunk
                        .iter()
                        .map(|m| {
                            if !m.is_doable(&*worker) {
                                return Ok(None);
                            }
                            evaluate_move(&mut *worker, m, assert_undo).map(Some)
                        })
                        .collect::<Result<Vec<_>>>()
                })
                .collect()
        });

        let mut scores = Vec::with_capacity(moves.len());
        for chunk in chunks {
            scores.extend(chunk?);
        }
        Ok(scores)
    }

    /// Applies the step's move on every worker.
    pub fn step_ended<M: Move<S>>(&mut self, step_move: &M) {
        let workers = &mut self.workers;
        let apply = |worker: &mut D| {
            step_move.do_move(&mut *worker);
            worker.calculate_score();
        };
        match &self.pool {
            Some(pool) => pool.install(|| workers.par_iter_mut().for_each(apply)),
            None => workers.iter_mut().for_each(apply),
        }
    }

    pub fn phase_ended(&mut self) {
        self.workers.clear();
    }
}

impl<S: PlanningSolution, D: ScoreDirector<S>> Debug for ParallelMoveEvaluator<S, D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParallelMoveEvaluator")
            .field("thread_count", &self.thread_count)
            .field("workers", &self.workers.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use planforge_core::SimpleScore;
    use planforge_scoring::SimpleScoreDirector;
    use planforge_test::nqueens::{get_queen_row, nqueens_director, set_queen_row, NQueensScoreFn};
    use planforge_test::NQueensSolution;

    use super::*;
    use crate::heuristic::r#move::ChangeMove;

    type Director = SimpleScoreDirector<NQueensSolution, NQueensScoreFn>;

    fn row_move(queen: usize, row: i64) -> ChangeMove<NQueensSolution, i64> {
        ChangeMove::new(0, queen, Some(row), get_queen_row, set_queen_row, "row")
    }

    #[test]
    fn test_scores_match_sequential_evaluation() {
        let mut director = nqueens_director(&[0, 1, 2, 3]);
        director.calculate_score();
        let moves: Vec<_> = (0..4)
            .flat_map(|queen| (0..4).map(move |row| row_move(queen, row)))
            .collect();

        let mut evaluator = ParallelMoveEvaluator::<NQueensSolution, Director>::new(3);
        evaluator.phase_started(&director, 0).unwrap();
        let parallel = evaluator.evaluate(&moves, None).unwrap();

        let sequential: Vec<Option<SimpleScore>> = moves
            .iter()
            .map(|m| {
                m.is_doable(&director)
                    .then(|| evaluate_move(&mut director, m, None).unwrap())
            })
            .collect();
        assert_eq!(parallel, sequential);
        // Moves to the queen's own row are not doable.
        assert_eq!(parallel[0], None);
        assert_eq!(parallel.len(), 16);
    }

    #[test]
    fn test_workers_follow_steps() {
        let mut director = nqueens_director(&[0, 1, 2, 3]);
        let mut evaluator = ParallelMoveEvaluator::<NQueensSolution, Director>::new(2);
        evaluator.phase_started(&director, 0).unwrap();

        let step = row_move(1, 3);
        step.do_move(&mut director);
        director.calculate_score();
        evaluator.step_ended(&step);

        let candidates = vec![row_move(2, 0), row_move(0, 2)];
        let parallel = evaluator.evaluate(&candidates, None).unwrap();
        for (m, score) in candidates.iter().zip(parallel) {
            assert_eq!(score, Some(evaluate_move(&mut director, m, None).unwrap()));
        }
    }

    #[test]
    fn test_evaluate_before_phase_start_fails() {
        let mut evaluator = ParallelMoveEvaluator::<NQueensSolution, Director>::new(2);
        let result = evaluator.evaluate(&[row_move(0, 1)], None);
        assert!(matches!(result, Err(PlanForgeError::InvalidState(_))));
    }
}
