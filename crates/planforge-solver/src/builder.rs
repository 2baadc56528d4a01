//! Builder module for constructing solver components from configuration
//!
//! This module provides the wiring between configuration types and
//! the actual solver implementation. Selectors and placers stay typed
//! and are supplied by the caller; everything the configuration decides
//! (acceptors, foragers, terminations, environment mode, seeding) is
//! built here.

use planforge_config::{
    AcceptorConfig, ConstructionHeuristicConfig, ConstructionHeuristicType, EntitySorterManner,
    ExhaustiveSearchConfig, ExhaustiveSearchType, ForagerConfig, LocalSearchConfig,
    MoveSelectorConfig, SolverConfig, TerminationCompositionStyle, TerminationConfig,
};
use planforge_core::{ParseableScore, PlanForgeError, PlanningSolution, Result, Score};
use planforge_scoring::ScoreDirector;

use crate::heuristic::r#move::Move;
use crate::heuristic::selector::{CachedMoveSelector, MoveSelector};
use crate::phase::construction::{ConstructionHeuristicPhase, EntityPlacer};
use crate::phase::exhaustive::{
    ExhaustiveSearchPhase, InitializingScoreTrend, ScoreBounder, TrendBasedScoreBounder,
};
use crate::phase::localsearch::{
    AcceptedForager, Acceptor, CompositeAcceptor, EntityTabuAcceptor, HillClimbingAcceptor,
    LateAcceptanceAcceptor, LocalSearchPhase, MoveTabuAcceptor, SimulatedAnnealingAcceptor,
    StepCountingHillClimbingAcceptor, ValueTabuAcceptor,
};
use crate::scope::SolverScope;
use crate::solver::Solver;
use crate::termination::{
    AndTermination, BestScoreFeasibleTermination, BestScoreTermination, OrTermination,
    ScoreCalculationCountTermination, StepCountTermination, Termination, TimeTermination,
    UnimprovedStepCountTermination, UnimprovedTimeTermination,
};

/// Late acceptance list size when none is configured.
pub const DEFAULT_LATE_ACCEPTANCE_SIZE: usize = 400;

/// Accepted count limit of foragers paired with a tabu acceptor.
pub const DEFAULT_TABU_ACCEPTED_COUNT_LIMIT: usize = 1000;

/// A local search phase whose acceptor and forager come from configuration.
pub type ConfiguredLocalSearchPhase<S, D, M, MS> = LocalSearchPhase<
    S,
    D,
    M,
    MS,
    Box<dyn Acceptor<<S as PlanningSolution>::Score>>,
    AcceptedForager<<S as PlanningSolution>::Score>,
>;

fn config_error(error: planforge_config::ConfigError) -> PlanForgeError {
    PlanForgeError::Config(error.to_string())
}

/// Builder for constructing acceptors from configuration.
pub struct AcceptorBuilder;

impl AcceptorBuilder {
    /// Builds an acceptor from configuration.
    ///
    /// Fails if a simulated annealing starting temperature does not parse
    /// as a score of type `Sc`.
    pub fn build<Sc: ParseableScore>(config: &AcceptorConfig) -> Result<Box<dyn Acceptor<Sc>>> {
        let acceptor: Box<dyn Acceptor<Sc>> = match config {
            AcceptorConfig::HillClimbing => Box::new(HillClimbingAcceptor::new()),

            AcceptorConfig::EntityTabu(tabu) => Box::new(
                EntityTabuAcceptor::new(tabu.entity_tabu_size)
                    .with_aspiration(tabu.aspiration_enabled),
            ),

            AcceptorConfig::ValueTabu(tabu) => Box::new(
                ValueTabuAcceptor::new(tabu.value_tabu_size)
                    .with_aspiration(tabu.aspiration_enabled),
            ),

            AcceptorConfig::MoveTabu(tabu) => Box::new(
                MoveTabuAcceptor::new(tabu.move_tabu_size)
                    .with_undo_move_tabu(tabu.undo_move_tabu)
                    .with_aspiration(tabu.aspiration_enabled),
            ),

            AcceptorConfig::SimulatedAnnealing(sa) => {
                let temperature = Sc::parse(&sa.starting_temperature).map_err(|e| {
                    PlanForgeError::Config(format!(
                        "invalid starting_temperature {:?}: {}",
                        sa.starting_temperature, e
                    ))
                })?;
                Box::new(SimulatedAnnealingAcceptor::new(temperature))
            }

            AcceptorConfig::LateAcceptance(la) => Box::new(
                LateAcceptanceAcceptor::new(
                    la.late_acceptance_size
                        .unwrap_or(DEFAULT_LATE_ACCEPTANCE_SIZE),
                )
                .with_hill_climbing(la.hill_climbing_enabled),
            ),

            AcceptorConfig::StepCountingHillClimbing(sc) => Box::new(
                StepCountingHillClimbingAcceptor::new(
                    sc.step_counting_limit,
                    sc.step_counting_type,
                ),
            ),
        };
        Ok(acceptor)
    }

    /// Builds the acceptor of a local search phase.
    ///
    /// No acceptors means hill climbing; several are combined so that a
    /// move must pass all of them.
    pub fn build_all<Sc: ParseableScore>(
        configs: &[AcceptorConfig],
    ) -> Result<Box<dyn Acceptor<Sc>>> {
        match configs {
            [] => Ok(Box::new(HillClimbingAcceptor::new())),
            [single] => Self::build(single),
            many => {
                let acceptors = many
                    .iter()
                    .map(Self::build)
                    .collect::<Result<Vec<_>>>()?;
                Ok(Box::new(CompositeAcceptor::new(acceptors)))
            }
        }
    }
}

/// Builder for the local search forager.
pub struct ForagerBuilder;

impl ForagerBuilder {
    pub fn build<Sc: Score>(
        config: Option<&ForagerConfig>,
        acceptors: &[AcceptorConfig],
    ) -> AcceptedForager<Sc> {
        let mut forager = AcceptedForager::new(Self::accepted_count_limit(config, acceptors));
        if let Some(config) = config {
            if let Some(pick_early_type) = config.pick_early_type {
                forager = forager.with_pick_early_type(pick_early_type);
            }
            if let Some(podium_type) = config.finalist_podium_type {
                forager = forager.with_podium(podium_type);
            }
            forager = forager.with_break_tie_randomly(config.break_tie_randomly.unwrap_or(false));
        }
        forager
    }

    /// The configured accepted count limit, or the default for the
    /// acceptors in use. Without a tabu or annealing style acceptor every
    /// move is evaluated.
    pub fn accepted_count_limit(
        config: Option<&ForagerConfig>,
        acceptors: &[AcceptorConfig],
    ) -> usize {
        if let Some(limit) = config.and_then(|c| c.accepted_count_limit) {
            return limit;
        }
        let any_tabu = acceptors.iter().any(|a| {
            matches!(
                a,
                AcceptorConfig::EntityTabu(_)
                    | AcceptorConfig::ValueTabu(_)
                    | AcceptorConfig::MoveTabu(_)
            )
        });
        let any_first_accepted = acceptors.iter().any(|a| {
            matches!(
                a,
                AcceptorConfig::SimulatedAnnealing(_)
                    | AcceptorConfig::LateAcceptance(_)
                    | AcceptorConfig::StepCountingHillClimbing(_)
            )
        });
        if any_tabu {
            DEFAULT_TABU_ACCEPTED_COUNT_LIMIT
        } else if any_first_accepted {
            1
        } else {
            usize::MAX
        }
    }
}

/// Builder for terminations.
pub struct TerminationBuilder;

impl TerminationBuilder {
    /// Builds the termination a config describes.
    ///
    /// Returns `None` if the config sets no criterion. Several criteria are
    /// combined with the configured composition style.
    pub fn build<S, D>(config: &TerminationConfig) -> Result<Option<Box<dyn Termination<S, D>>>>
    where
        S: PlanningSolution,
        S::Score: ParseableScore,
        D: ScoreDirector<S> + 'static,
    {
        let mut terminations: Vec<Box<dyn Termination<S, D>>> = Vec::new();

        if let Some(limit) = config.time_limit() {
            terminations.push(Box::new(TimeTermination::new(limit)));
        }
        if let Some(limit) = config.unimproved_time_limit() {
            terminations.push(Box::new(UnimprovedTimeTermination::new(limit)));
        }
        if let Some(limit) = config.step_count_limit {
            terminations.push(Box::new(StepCountTermination::new(limit)));
        }
        if let Some(limit) = config.unimproved_step_count_limit {
            terminations.push(Box::new(UnimprovedStepCountTermination::new(limit)));
        }
        if let Some(limit) = &config.best_score_limit {
            let target = S::Score::parse(limit).map_err(|e| {
                PlanForgeError::Config(format!("invalid best_score_limit {:?}: {}", limit, e))
            })?;
            terminations.push(Box::new(BestScoreTermination::new(target)));
        }
        if config.best_score_feasible == Some(true) {
            terminations.push(Box::new(BestScoreFeasibleTermination::new()));
        }
        if let Some(limit) = config.score_calculation_count_limit {
            terminations.push(Box::new(ScoreCalculationCountTermination::new(limit)));
        }

        if terminations.len() <= 1 {
            return Ok(terminations.pop());
        }
        let composite: Box<dyn Termination<S, D>> = match config.termination_composition_style {
            TerminationCompositionStyle::Or => Box::new(OrTermination::new(terminations)),
            TerminationCompositionStyle::And => Box::new(AndTermination::new(terminations)),
        };
        Ok(Some(composite))
    }

    fn build_optional<S, D>(
        config: Option<&TerminationConfig>,
    ) -> Result<Option<Box<dyn Termination<S, D>>>>
    where
        S: PlanningSolution,
        S::Score: ParseableScore,
        D: ScoreDirector<S> + 'static,
    {
        match config {
            Some(config) => Self::build(config),
            None => Ok(None),
        }
    }
}

/// Builder for phases around caller-supplied selectors and placers.
pub struct PhaseBuilder;

impl PhaseBuilder {
    /// Builds a construction heuristic phase.
    ///
    /// The placer decides the entity order; see
    /// [`entity_sorter_manner`](Self::entity_sorter_manner) for the order the
    /// config asks for.
    pub fn construction_heuristic<S, D, M, P>(
        config: &ConstructionHeuristicConfig,
        placer: P,
    ) -> Result<ConstructionHeuristicPhase<S, D, M, P>>
    where
        S: PlanningSolution,
        S::Score: ParseableScore,
        D: ScoreDirector<S> + 'static,
        M: Move<S>,
        P: EntityPlacer<S, M>,
    {
        let mut phase =
            ConstructionHeuristicPhase::new(placer, config.pick_early_type.unwrap_or_default());
        if let Some(termination) = TerminationBuilder::build_optional(config.termination.as_ref())?
        {
            phase = phase.with_termination(termination);
        }
        Ok(phase)
    }

    /// The entity order a construction heuristic config asks for.
    pub fn entity_sorter_manner(config: &ConstructionHeuristicConfig) -> EntitySorterManner {
        config
            .entity_sorter_manner
            .unwrap_or(match config.construction_heuristic_type {
                ConstructionHeuristicType::FirstFitDecreasing => {
                    EntitySorterManner::DecreasingDifficulty
                }
                ConstructionHeuristicType::FirstFit
                | ConstructionHeuristicType::AllocateEntityFromQueue => EntitySorterManner::None,
            })
    }

    /// Builds a local search phase on the solving thread.
    pub fn local_search<S, D, M, MS>(
        config: &LocalSearchConfig,
        move_selector: MS,
    ) -> Result<ConfiguredLocalSearchPhase<S, D, M, MS>>
    where
        S: PlanningSolution,
        S::Score: ParseableScore,
        D: ScoreDirector<S> + 'static,
        M: Move<S>,
        MS: MoveSelector<S, M>,
    {
        let acceptor = AcceptorBuilder::build_all(&config.acceptors)?;
        let forager = ForagerBuilder::build(config.forager.as_ref(), &config.acceptors);
        let mut phase = LocalSearchPhase::new(move_selector, acceptor, forager);
        if let Some(termination) = TerminationBuilder::build_optional(config.termination.as_ref())?
        {
            phase = phase.with_termination(termination);
        }
        Ok(phase)
    }

    /// Builds a local search phase that scores moves on
    /// `move_thread_count` threads.
    pub fn parallel_local_search<S, D, M, MS>(
        config: &LocalSearchConfig,
        move_selector: MS,
        move_thread_count: usize,
    ) -> Result<ConfiguredLocalSearchPhase<S, D, M, MS>>
    where
        S: PlanningSolution,
        S::Score: ParseableScore,
        D: ScoreDirector<S> + Clone + 'static,
        M: Move<S>,
        MS: MoveSelector<S, M>,
    {
        Ok(Self::local_search(config, move_selector)?.with_move_thread_count(move_thread_count))
    }

    /// Wraps a move selector in the caching and selection order of a
    /// config.
    pub fn cached_move_selector<S, M, MS>(
        config: &MoveSelectorConfig,
        child: MS,
    ) -> Result<CachedMoveSelector<S, M, MS>>
    where
        S: PlanningSolution,
        M: Move<S>,
        MS: MoveSelector<S, M>,
    {
        CachedMoveSelector::new(
            child,
            config.cache_type.unwrap_or_default().into(),
            config.selection_order.unwrap_or_default().into(),
        )
    }

    /// Builds an exhaustive search phase.
    ///
    /// Branch and bound without a `bounder` prunes nothing; brute force
    /// ignores the bounder.
    pub fn exhaustive_search<S, D, M, P>(
        config: &ExhaustiveSearchConfig,
        placer: P,
        bounder: Option<Box<dyn ScoreBounder<S>>>,
    ) -> Result<ExhaustiveSearchPhase<S, D, M, P>>
    where
        S: PlanningSolution,
        S::Score: ParseableScore,
        D: ScoreDirector<S> + 'static,
        M: Move<S>,
        P: EntityPlacer<S, M>,
    {
        let mut phase = match config.exhaustive_search_type {
            ExhaustiveSearchType::BranchAndBound => {
                let bounder = bounder.unwrap_or_else(|| {
                    Box::new(TrendBasedScoreBounder::new(InitializingScoreTrend::default()))
                });
                ExhaustiveSearchPhase::branch_and_bound(placer, bounder)
            }
            ExhaustiveSearchType::BruteForce => ExhaustiveSearchPhase::brute_force(placer),
        };
        if let Some(exploration) = config.node_explorer_type {
            phase = phase.with_exploration(exploration);
        }
        if let Some(node_limit) = config.node_limit {
            phase = phase.with_node_limit(node_limit);
        }
        if let Some(termination) = TerminationBuilder::build_optional(config.termination.as_ref())?
        {
            phase = phase.with_termination(termination);
        }
        Ok(phase)
    }
}

/// Builder for the solver and its scope.
pub struct SolverBuilder;

impl SolverBuilder {
    /// Builds a solver with the settings of `config` and no phases.
    ///
    /// Phases are added with [`Solver::with_phase`], typically built with
    /// [`PhaseBuilder`] from `config.phases`.
    pub fn build<S, D>(config: &SolverConfig) -> Result<Solver<S, D>>
    where
        S: PlanningSolution,
        S::Score: ParseableScore,
        D: ScoreDirector<S> + 'static,
    {
        config.validate().map_err(config_error)?;
        let mut solver = Solver::new()
            .with_environment_mode(config.environment_mode)
            .with_move_thread_count(config.move_thread_count.resolve())
            .with_config(config.clone());
        if let Some(seed) = config.random_seed {
            solver = solver.with_random_seed(seed);
        }
        if let Some(termination) = TerminationBuilder::build_optional(config.termination.as_ref())?
        {
            solver = solver.with_termination(termination);
        }
        Ok(solver)
    }

    /// Builds a solver scope seeded and configured from `config`, for
    /// driving phases directly.
    pub fn build_scope<S, D>(config: &SolverConfig, score_director: D) -> Result<SolverScope<S, D>>
    where
        S: PlanningSolution,
        S::Score: ParseableScore,
        D: ScoreDirector<S> + 'static,
    {
        config.validate().map_err(config_error)?;
        let scope = match config.random_seed {
            Some(seed) => SolverScope::with_seed(score_director, seed),
            None => SolverScope::new(score_director),
        };
        let mut scope = scope
            .with_environment_mode(config.environment_mode)
            .with_move_thread_count(config.move_thread_count.resolve());
        if let Some(termination) = TerminationBuilder::build_optional(config.termination.as_ref())?
        {
            scope = scope.with_termination(termination);
        }
        Ok(scope)
    }
}

#[cfg(test)]
#[path = "builder_tests.rs"]
mod tests;
