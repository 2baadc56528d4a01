//! Solver entry point that hides the phase wiring for a single basic
//! planning variable.

use std::fmt::Debug;
use std::hash::Hash;

use planforge_config::{
    AcceptorConfig, ConstructionHeuristicConfig, LateAcceptanceConfig, LocalSearchConfig,
    PhaseConfig, SelectionOrder, SolverConfig,
};
use planforge_core::domain::CountableValueRange;
use planforge_core::{ParseableScore, PlanningSolution, Result};
use planforge_scoring::ScoreDirector;
use planforge_solver::{
    CachedMoveSelector, ChangeMove, ChangeMoveSelector, ConfiguredLocalSearchPhase,
    ConstructionHeuristicPhase, ExhaustiveSearchPhase, FromSolutionEntitySelector,
    FromSolutionValueSelector, Phase, PhaseBuilder, QueuedEntityPlacer, Solver, SolverBuilder,
};

type Placer<S, V> = QueuedEntityPlacer<
    S,
    V,
    FromSolutionEntitySelector,
    FromSolutionValueSelector<S, V>,
    ChangeMove<S, V>,
>;
type Selector<S, V> =
    ChangeMoveSelector<S, V, FromSolutionEntitySelector, FromSolutionValueSelector<S, V>>;

/// A basic planning variable: how to read and write it, and where its
/// values come from.
pub struct BasicVariable<S, V> {
    descriptor_index: usize,
    variable_name: &'static str,
    getter: fn(&S, usize) -> Option<V>,
    setter: fn(&mut S, usize, Option<V>),
    values: FromSolutionValueSelector<S, V>,
}

impl<S: 'static, V: 'static> BasicVariable<S, V> {
    pub fn new<R, F>(
        descriptor_index: usize,
        variable_name: &'static str,
        getter: fn(&S, usize) -> Option<V>,
        setter: fn(&mut S, usize, Option<V>),
        value_range: F,
    ) -> Self
    where
        R: CountableValueRange<V> + 'static,
        F: Fn(&S) -> R + Send + Sync + 'static,
    {
        Self {
            descriptor_index,
            variable_name,
            getter,
            setter,
            values: FromSolutionValueSelector::countable(value_range),
        }
    }

    pub fn variable_name(&self) -> &'static str {
        self.variable_name
    }

    fn placer(&self) -> Placer<S, V> {
        QueuedEntityPlacer::new(
            FromSolutionEntitySelector::new(self.descriptor_index),
            self.values.clone(),
            self.getter,
            self.setter,
            self.descriptor_index,
            self.variable_name,
        )
    }

    fn selector(&self) -> Selector<S, V> {
        ChangeMoveSelector::new(
            FromSolutionEntitySelector::new(self.descriptor_index),
            self.values.clone(),
            self.getter,
            self.setter,
            self.descriptor_index,
            self.variable_name,
        )
    }
}

impl<S, V> Debug for BasicVariable<S, V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BasicVariable")
            .field("descriptor_index", &self.descriptor_index)
            .field("variable_name", &self.variable_name)
            .finish()
    }
}

/// Phases used when a config lists none: a first fit construction
/// heuristic followed by a random late acceptance search.
pub fn default_phases() -> Vec<PhaseConfig> {
    vec![
        PhaseConfig::ConstructionHeuristic(ConstructionHeuristicConfig::default()),
        PhaseConfig::LocalSearch(LocalSearchConfig {
            acceptors: vec![AcceptorConfig::LateAcceptance(LateAcceptanceConfig {
                late_acceptance_size: None,
                hill_climbing_enabled: true,
            })],
            ..LocalSearchConfig::default()
        }),
    ]
}

/// Builds a solver for `variable` with the phases and terminations of
/// `config`.
///
/// A local search draws its moves at random unless its move selector config
/// asks for another order, so it needs a termination.
pub fn build_solver<S, D, V>(
    config: &SolverConfig,
    variable: &BasicVariable<S, V>,
) -> Result<Solver<S, D>>
where
    S: PlanningSolution,
    S::Score: ParseableScore,
    D: ScoreDirector<S> + 'static,
    V: Clone + PartialEq + Hash + Send + Sync + Debug + 'static,
{
    let mut solver = SolverBuilder::build(config)?;
    let defaults;
    let phases = if config.phases.is_empty() {
        defaults = default_phases();
        &defaults
    } else {
        &config.phases
    };
    for phase_config in phases {
        solver = solver.with_phase(build_phase(phase_config, variable)?);
    }
    Ok(solver)
}

fn build_phase<S, D, V>(
    config: &PhaseConfig,
    variable: &BasicVariable<S, V>,
) -> Result<Box<dyn Phase<S, D>>>
where
    S: PlanningSolution,
    S::Score: ParseableScore,
    D: ScoreDirector<S> + 'static,
    V: Clone + PartialEq + Hash + Send + Sync + Debug + 'static,
{
    let phase: Box<dyn Phase<S, D>> = match config {
        PhaseConfig::ConstructionHeuristic(ch) => {
            let built: ConstructionHeuristicPhase<S, D, ChangeMove<S, V>, Placer<S, V>> =
                PhaseBuilder::construction_heuristic(ch, variable.placer())?;
            Box::new(built)
        }
        PhaseConfig::LocalSearch(ls) => match ls
            .move_selector
            .as_ref()
            .filter(|c| {
                !matches!(
                    c.selection_order,
                    None | Some(SelectionOrder::Inherit) | Some(SelectionOrder::Random)
                )
            })
        {
            None => {
                let built: ConfiguredLocalSearchPhase<S, D, ChangeMove<S, V>, Selector<S, V>> =
                    PhaseBuilder::local_search(ls, variable.selector().with_random(true))?;
                Box::new(built)
            }
            Some(selector_config) => {
                let selector: CachedMoveSelector<S, ChangeMove<S, V>, Selector<S, V>> =
                    PhaseBuilder::cached_move_selector(selector_config, variable.selector())?;
                let built: ConfiguredLocalSearchPhase<S, D, ChangeMove<S, V>, _> =
                    PhaseBuilder::local_search(ls, selector)?;
                Box::new(built)
            }
        },
        PhaseConfig::ExhaustiveSearch(es) => {
            let built: ExhaustiveSearchPhase<S, D, ChangeMove<S, V>, Placer<S, V>> =
                PhaseBuilder::exhaustive_search(es, variable.placer(), None)?;
            Box::new(built)
        }
    };
    Ok(phase)
}

/// Solves the solution held by `score_director`.
///
/// With the `console` feature the colored console output is installed on
/// first use.
pub fn run_solver<S, D, V>(
    score_director: D,
    variable: &BasicVariable<S, V>,
    config: &SolverConfig,
) -> Result<S>
where
    S: PlanningSolution,
    S::Score: ParseableScore,
    D: ScoreDirector<S> + 'static,
    V: Clone + PartialEq + Hash + Send + Sync + Debug + 'static,
{
    #[cfg(feature = "console")]
    planforge_console::init();

    let mut solver = build_solver(config, variable)?;
    solver.solve(score_director)
}
