//! PlanForge Solver Engine
//!
//! This crate provides the main solver implementation including:
//! - Solver and its handle for problem changes and early termination
//! - Phases (construction heuristic, local search, exhaustive search)
//! - Move and selector system
//! - Termination conditions
//! - Best solution recaller and event system for monitoring
//! - Configuration wiring (builder module)

pub mod builder;
pub mod event;
pub mod heuristic;
pub mod phase;
pub mod realtime;
pub mod recaller;
pub mod scope;
pub mod solver;
pub mod statistics;
pub mod termination;

pub use builder::{
    AcceptorBuilder, ConfiguredLocalSearchPhase, ForagerBuilder, PhaseBuilder, SolverBuilder,
    TerminationBuilder,
};
pub use event::{
    BestSolutionChangedEvent, CountingEventListener, PhaseLifecycleListener, SolverEventListener,
    SolverEventSupport, StepLifecycleListener,
};
pub use heuristic::{
    CachedEntitySelector, CachedMoveSelector, CachedValueSelector, ChainedChangeMove,
    ChainedChangeMoveSelector, ChangeMove, ChangeMoveSelector, CompositeMove, EitherMove,
    EntityReference, EntitySelector, FilteringMoveSelector, FromEntityValueSelector,
    FromSolutionEntitySelector, FromSolutionValueSelector, Move, MoveSelector,
    SelectionCacheType, SelectionOrder, SelectorLifecycle, SwapMove, SwapMoveSelector,
    UnionMoveSelector, ValueSelector,
};
pub use phase::{
    construction::{
        ConstructionHeuristicForager, ConstructionHeuristicPhase, EntityPlacer, Placement,
        QueuedEntityPlacer,
    },
    exhaustive::{
        ExhaustiveSearchNode, ExhaustiveSearchPhase, InitializingScoreTrend,
        InitializingScoreTrendLevel, NodeComparator, ScoreBounder, TrendBasedScoreBounder,
    },
    localsearch::{
        AcceptedForager, Acceptor, CompositeAcceptor, EntityTabuAcceptor, HillClimbingAcceptor,
        LateAcceptanceAcceptor, LocalSearchForager, LocalSearchPhase, MoveTabuAcceptor,
        SimulatedAnnealingAcceptor, StepCountingHillClimbingAcceptor, ValueTabuAcceptor,
    },
    Phase,
};
pub use realtime::{ClosureProblemChange, ProblemChange, SolverHandle};
pub use recaller::BestSolutionRecaller;
pub use scope::{PhaseScope, SolverScope, StepScope};
pub use solver::Solver;
pub use statistics::{PhaseStatistics, ScoreImprovement, SolverStatistics};
pub use termination::{
    AndTermination, BestScoreFeasibleTermination, BestScoreTermination, OrTermination,
    ScoreCalculationCountTermination, StepCountTermination, Termination, TimeTermination,
    UnimprovedStepCountTermination, UnimprovedTimeTermination,
};

pub use planforge_core::{PlanForgeError, Result};
