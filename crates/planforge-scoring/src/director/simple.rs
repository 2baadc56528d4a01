//! Simple score director with full recalculation.

use std::fmt;
use std::sync::Arc;

use planforge_core::domain::{
    LookUpKey, LookUpStrategyType, NoShadowObserver, SolutionDescriptor, SupplyManager,
    VariableListener, VariableListenerSupport,
};
use planforge_core::{PlanningSolution, Result, Score};

use super::state::DirectorCore;
use super::traits::ScoreDirector;

/// A score director that recalculates the full score on every change.
///
/// The calculator is a plain function of the solution. It returns the
/// constraint levels only; the director applies the init score from the
/// tracked uninitialized variable count.
pub struct SimpleScoreDirector<S: PlanningSolution, C> {
    core: DirectorCore<S>,
    score_calculator: C,
    score_dirty: bool,
    cached_score: Option<S::Score>,
}

impl<S, C> SimpleScoreDirector<S, C>
where
    S: PlanningSolution,
    C: Fn(&S) -> S::Score + Send + Sync,
{
    pub fn new(solution: S, descriptor: SolutionDescriptor<S>, score_calculator: C) -> Self {
        Self::with_shared_descriptor(solution, Arc::new(descriptor), score_calculator)
    }

    pub fn with_shared_descriptor(
        solution: S,
        descriptor: Arc<SolutionDescriptor<S>>,
        score_calculator: C,
    ) -> Self {
        SimpleScoreDirector {
            core: DirectorCore::new(solution, descriptor),
            score_calculator,
            score_dirty: true,
            cached_score: None,
        }
    }

    pub fn with_lookup_strategy(mut self, strategy: LookUpStrategyType) -> Self {
        self.core = self.core.with_lookup_strategy(strategy);
        self
    }

    /// Registers a variable listener and brings its shadow variables up to date.
    pub fn with_listener(
        mut self,
        descriptor_index: usize,
        sources: &[&'static str],
        listener: impl VariableListener<S>,
    ) -> Self {
        self.core.register_listener(descriptor_index, sources, listener);
        let solution = self.core.solution().clone();
        self.core.install(solution, &mut NoShadowObserver);
        self.mark_dirty();
        self
    }

    /// Replaces all variable listeners, e.g. with a factory's prototype set.
    pub fn with_listener_support(mut self, listeners: VariableListenerSupport<S>) -> Self {
        self.core.set_listener_support(listeners);
        let solution = self.core.solution().clone();
        self.core.install(solution, &mut NoShadowObserver);
        self.mark_dirty();
        self
    }

    pub fn into_working_solution(self) -> S {
        self.core.into_solution()
    }

    fn mark_dirty(&mut self) {
        self.score_dirty = true;
    }
}

impl<S, C> ScoreDirector<S> for SimpleScoreDirector<S, C>
where
    S: PlanningSolution,
    C: Fn(&S) -> S::Score + Send + Sync,
{
    fn working_solution(&self) -> &S {
        self.core.solution()
    }

    fn working_solution_mut(&mut self) -> &mut S {
        self.mark_dirty();
        self.core.solution_mut()
    }

    fn set_working_solution(&mut self, solution: S) {
        self.core.install(solution, &mut NoShadowObserver);
        self.mark_dirty();
    }

    fn solution_descriptor(&self) -> &SolutionDescriptor<S> {
        self.core.descriptor()
    }

    fn before_variable_changed(
        &mut self,
        descriptor_index: usize,
        entity_index: usize,
        variable_name: &'static str,
    ) {
        self.mark_dirty();
        self.core
            .before_variable_changed(descriptor_index, entity_index, variable_name);
    }

    fn after_variable_changed(
        &mut self,
        descriptor_index: usize,
        entity_index: usize,
        variable_name: &'static str,
    ) {
        self.core
            .after_variable_changed(descriptor_index, entity_index, variable_name);
    }

    fn after_entity_added(&mut self, descriptor_index: usize, entity_index: usize) {
        self.mark_dirty();
        self.core.after_entity_added(descriptor_index, entity_index);
    }

    fn before_entity_removed(&mut self, descriptor_index: usize, entity_index: usize) {
        self.core.before_entity_removed(descriptor_index, entity_index);
    }

    fn after_entity_removed(&mut self, descriptor_index: usize, entity_index: usize) {
        self.mark_dirty();
        self.core.after_entity_removed(descriptor_index, entity_index);
    }

    fn after_problem_property_changed(&mut self) {
        self.mark_dirty();
        self.core.after_problem_property_changed();
    }

    fn trigger_variable_listeners(&mut self) {
        self.core.trigger(&mut NoShadowObserver);
    }

    fn calculate_score(&mut self) -> S::Score {
        self.trigger_variable_listeners();
        if !self.score_dirty {
            if let Some(score) = self.cached_score {
                return score;
            }
        }

        let score = self
            .core
            .with_init_score((self.score_calculator)(self.core.solution()));
        self.core.increment_calculation_count();
        self.core.store_score(score);
        self.cached_score = Some(score);
        self.score_dirty = false;
        score
    }

    fn calculate_score_from_scratch(&mut self) -> S::Score {
        self.trigger_variable_listeners();
        let levels = (self.score_calculator)(self.core.solution());
        let init = self.core.count_uninitialized();
        levels.with_init_score(-(i32::try_from(init).unwrap_or(i32::MAX)))
    }

    fn calculation_count(&self) -> u64 {
        self.core.calculation_count()
    }

    fn uninitialized_variable_count(&self) -> usize {
        self.core.uninitialized_variable_count()
    }

    fn lookup_strategy(&self) -> LookUpStrategyType {
        self.core.lookup_strategy()
    }

    fn look_up_working_entity_or_none(
        &self,
        descriptor_index: usize,
        key: &LookUpKey,
    ) -> Result<Option<usize>> {
        self.core.look_up(descriptor_index, key)
    }

    fn supply_manager(&self) -> &SupplyManager<S> {
        self.core.supplies()
    }

    fn supply_manager_mut(&mut self) -> (&mut SupplyManager<S>, &S) {
        self.core.supplies_with_solution()
    }
}

impl<S, C> Clone for SimpleScoreDirector<S, C>
where
    S: PlanningSolution,
    C: Clone,
{
    fn clone(&self) -> Self {
        SimpleScoreDirector {
            core: self.core.clone(),
            score_calculator: self.score_calculator.clone(),
            score_dirty: self.score_dirty,
            cached_score: self.cached_score,
        }
    }
}

impl<S: PlanningSolution, C> fmt::Debug for SimpleScoreDirector<S, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SimpleScoreDirector")
            .field("core", &self.core)
            .field("score_dirty", &self.score_dirty)
            .field("cached_score", &self.cached_score)
            .finish()
    }
}
