//! PlanForge - A Metaheuristic Planning Engine in Rust
//!
//! Describe the planning problem with descriptors and a score function, then
//! solve it with [`run_solver`] or assemble the phases yourself with the
//! [`Solver`] and the builders.
//!
//! # Example
//!
//! ```rust
//! use planforge::prelude::*;
//!
//! // Score types are re-exported
//! let score = HardSoftScore::of(0, -100);
//! assert_eq!(score.hard(), 0);
//! assert_eq!(score.soft(), -100);
//! assert!(score.is_feasible());
//! ```

// Score types
pub use planforge_core::score::{
    BendableScore, HardMediumSoftScore, HardSoftDecimalScore, HardSoftScore, ParseableScore,
    Score, SimpleScore,
};

// Domain model
pub use planforge_core::domain;
pub use planforge_core::{PlanForgeError, PlanningEntity, PlanningId, PlanningSolution, Result};

// Score directors
pub use planforge_scoring::{
    IncrementalScoreCalculator, IncrementalScoreDirector, ScoreDirector, SimpleScoreDirector,
};

// Configuration
pub use planforge_config as config;
pub use planforge_config::SolverConfig;

// Solver engine
pub use planforge_solver as engine;
pub use planforge_solver::{
    BestSolutionChangedEvent, ClosureProblemChange, ProblemChange, Solver, SolverEventListener,
    SolverHandle, SolverStatistics,
};

#[cfg(feature = "console")]
pub use planforge_console as console;

mod solver;
pub use solver::{build_solver, default_phases, run_solver, BasicVariable};

/// Receives every new best solution of a solve.
pub type BestSolutionReceiver<S> =
    tokio::sync::mpsc::UnboundedReceiver<BestSolutionChangedEvent<S>>;

pub mod prelude {
    pub use super::{
        BendableScore, HardMediumSoftScore, HardSoftDecimalScore, HardSoftScore, Score, SimpleScore,
    };
    pub use super::{BasicVariable, PlanningSolution, ScoreDirector, Solver, SolverConfig};
    pub use super::{build_solver, run_solver};
}
