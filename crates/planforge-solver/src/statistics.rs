//! Solver statistics collection and reporting.
//!
//! The solver scope owns a [`SolverStatistics`] and updates it from the
//! solving thread: steps, evaluated and accepted moves, score calculations
//! and the history of best score improvements. Phase totals are logged at
//! phase end.

use std::time::Duration;

use serde::Serialize;

use planforge_core::Score;

/// Statistics for a single solver phase.
#[derive(Debug, Clone, Serialize)]
pub struct PhaseStatistics<Sc: Score> {
    /// Index of this phase (0-based).
    pub phase_index: usize,
    /// Type name of the phase (e.g., "ConstructionHeuristic", "LocalSearch").
    pub phase_type: String,
    pub duration: Duration,
    pub step_count: u64,
    pub moves_evaluated: u64,
    pub moves_accepted: u64,
    pub score_calculation_count: u64,
    pub starting_score: Option<Sc>,
    pub ending_score: Option<Sc>,
}

impl<Sc: Score> PhaseStatistics<Sc> {
    pub fn new(phase_index: usize, phase_type: impl Into<String>) -> Self {
        Self {
            phase_index,
            phase_type: phase_type.into(),
            duration: Duration::ZERO,
            step_count: 0,
            moves_evaluated: 0,
            moves_accepted: 0,
            score_calculation_count: 0,
            starting_score: None,
            ending_score: None,
        }
    }

    /// Returns the acceptance rate (accepted / evaluated).
    pub fn acceptance_rate(&self) -> f64 {
        if self.moves_evaluated == 0 {
            0.0
        } else {
            self.moves_accepted as f64 / self.moves_evaluated as f64
        }
    }
}

/// Record of a best score improvement.
#[derive(Debug, Clone, Serialize)]
pub struct ScoreImprovement<Sc: Score> {
    /// Time since solving started.
    pub time_offset: Duration,
    /// Total step count when the improvement occurred.
    pub step_count: u64,
    pub score: Sc,
}

/// Complete statistics for a solver run.
#[derive(Debug, Clone, Serialize)]
pub struct SolverStatistics<Sc: Score> {
    pub total_duration: Duration,
    pub total_step_count: u64,
    pub total_moves_evaluated: u64,
    pub total_moves_accepted: u64,
    pub score_calculation_count: u64,
    pub phase_statistics: Vec<PhaseStatistics<Sc>>,
    pub score_history: Vec<ScoreImprovement<Sc>>,
}

impl<Sc: Score> SolverStatistics<Sc> {
    pub fn new() -> Self {
        Self {
            total_duration: Duration::ZERO,
            total_step_count: 0,
            total_moves_evaluated: 0,
            total_moves_accepted: 0,
            score_calculation_count: 0,
            phase_statistics: Vec::new(),
            score_history: Vec::new(),
        }
    }

    /// Records one evaluated move, and its acceptance, in the run and
    /// current phase counters.
    pub fn record_move(&mut self, accepted: bool) {
        self.total_moves_evaluated += 1;
        if accepted {
            self.total_moves_accepted += 1;
        }
        if let Some(phase) = self.phase_statistics.last_mut() {
            phase.moves_evaluated += 1;
            if accepted {
                phase.moves_accepted += 1;
            }
        }
    }

    pub fn record_step(&mut self) {
        self.total_step_count += 1;
        if let Some(phase) = self.phase_statistics.last_mut() {
            phase.step_count += 1;
        }
    }

    pub fn record_improvement(&mut self, time_offset: Duration, score: Sc) {
        self.score_history.push(ScoreImprovement {
            time_offset,
            step_count: self.total_step_count,
            score,
        });
    }

    /// Opens the statistics of a new phase.
    pub fn start_phase(
        &mut self,
        phase_index: usize,
        phase_type: &str,
        starting_score: Option<Sc>,
    ) {
        let mut phase = PhaseStatistics::new(phase_index, phase_type);
        phase.starting_score = starting_score;
        self.phase_statistics.push(phase);
    }

    /// Closes the current phase.
    pub fn end_phase(
        &mut self,
        duration: Duration,
        ending_score: Option<Sc>,
        score_calculation_count: u64,
    ) -> Option<&PhaseStatistics<Sc>> {
        let phase = self.phase_statistics.last_mut()?;
        phase.duration = duration;
        phase.ending_score = ending_score;
        phase.score_calculation_count = score_calculation_count;
        Some(phase)
    }

    pub fn acceptance_rate(&self) -> f64 {
        if self.total_moves_evaluated == 0 {
            0.0
        } else {
            self.total_moves_accepted as f64 / self.total_moves_evaluated as f64
        }
    }

    pub fn phase_count(&self) -> usize {
        self.phase_statistics.len()
    }

    /// Returns the best score achieved (last in history, or None).
    pub fn best_score(&self) -> Option<&Sc> {
        self.score_history.last().map(|s| &s.score)
    }

    pub fn improvement_count(&self) -> usize {
        self.score_history.len()
    }
}

impl<Sc: Score> Default for SolverStatistics<Sc> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use planforge_core::SimpleScore;

    #[test]
    fn test_moves_count_in_run_and_phase() {
        let mut stats = SolverStatistics::<SimpleScore>::new();
        stats.start_phase(0, "LocalSearch", Some(SimpleScore::of(-5)));
        stats.record_move(true);
        stats.record_move(false);
        stats.record_move(false);
        stats.record_step();

        assert_eq!(stats.total_moves_evaluated, 3);
        assert_eq!(stats.total_moves_accepted, 1);
        let phase = &stats.phase_statistics[0];
        assert_eq!(phase.moves_evaluated, 3);
        assert_eq!(phase.step_count, 1);
        assert!((phase.acceptance_rate() - 1.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_improvements_keep_order() {
        let mut stats = SolverStatistics::<SimpleScore>::new();
        stats.record_improvement(Duration::from_millis(1), SimpleScore::of(-3));
        stats.record_step();
        stats.record_improvement(Duration::from_millis(2), SimpleScore::of(-1));

        assert_eq!(stats.improvement_count(), 2);
        assert_eq!(stats.best_score(), Some(&SimpleScore::of(-1)));
        assert_eq!(stats.score_history[1].step_count, 1);
    }

    #[test]
    fn test_end_phase_without_start() {
        let mut stats = SolverStatistics::<SimpleScore>::new();
        assert!(stats.end_phase(Duration::ZERO, None, 0).is_none());
    }
}
