//! Incremental score director.
//!
//! The calculator keeps its own running totals and adjusts them from the
//! before/after notifications, so a move costs work proportional to what it
//! touches instead of a full recalculation.

use std::fmt;
use std::sync::Arc;

use planforge_core::domain::{
    LookUpKey, LookUpStrategyType, ShadowVariableObserver, SolutionDescriptor, SupplyManager,
    VariableListener, VariableListenerSupport,
};
use planforge_core::{PlanningSolution, Result, Score};

use super::state::DirectorCore;
use super::traits::ScoreDirector;

/// A score calculator that updates its score from change notifications.
///
/// `before_*` hooks see the solution with the old value in place so the
/// calculator can retract a contribution; `after_*` hooks see the new value
/// and insert it again. Shadow variable changes made by variable listeners
/// arrive through the same variable hooks.
pub trait IncrementalScoreCalculator<S: PlanningSolution>: Send {
    /// Rebuilds all running totals from the solution.
    fn reset_working_solution(&mut self, solution: &S);

    fn before_variable_changed(
        &mut self,
        solution: &S,
        descriptor_index: usize,
        entity_index: usize,
        variable_name: &'static str,
    );

    fn after_variable_changed(
        &mut self,
        solution: &S,
        descriptor_index: usize,
        entity_index: usize,
        variable_name: &'static str,
    );

    fn before_entity_added(&mut self, _solution: &S, _descriptor_index: usize, _entity_index: usize) {
    }

    /// Entity indices may shift, so the default rebuilds everything.
    fn after_entity_added(&mut self, solution: &S, _descriptor_index: usize, _entity_index: usize) {
        self.reset_working_solution(solution);
    }

    fn before_entity_removed(
        &mut self,
        _solution: &S,
        _descriptor_index: usize,
        _entity_index: usize,
    ) {
    }

    fn after_entity_removed(
        &mut self,
        solution: &S,
        _descriptor_index: usize,
        _entity_index: usize,
    ) {
        self.reset_working_solution(solution);
    }

    /// Returns the constraint levels of the current running totals.
    ///
    /// The init score is applied by the director.
    fn calculate_score(&mut self) -> S::Score;
}

/// Forwards shadow variable changes to the calculator.
struct CalculatorObserver<'a, C> {
    calculator: &'a mut C,
}

impl<S, C> ShadowVariableObserver<S> for CalculatorObserver<'_, C>
where
    S: PlanningSolution,
    C: IncrementalScoreCalculator<S>,
{
    fn before_shadow_changed(
        &mut self,
        solution: &S,
        descriptor_index: usize,
        entity_index: usize,
        variable_name: &'static str,
    ) {
        self.calculator
            .before_variable_changed(solution, descriptor_index, entity_index, variable_name);
    }

    fn after_shadow_changed(
        &mut self,
        solution: &S,
        descriptor_index: usize,
        entity_index: usize,
        variable_name: &'static str,
    ) {
        self.calculator
            .after_variable_changed(solution, descriptor_index, entity_index, variable_name);
    }
}

/// A score director driving an [`IncrementalScoreCalculator`].
pub struct IncrementalScoreDirector<S: PlanningSolution, C> {
    core: DirectorCore<S>,
    calculator: C,
}

impl<S, C> IncrementalScoreDirector<S, C>
where
    S: PlanningSolution,
    C: IncrementalScoreCalculator<S>,
{
    pub fn new(solution: S, descriptor: SolutionDescriptor<S>, calculator: C) -> Self {
        Self::with_shared_descriptor(solution, Arc::new(descriptor), calculator)
    }

    pub fn with_shared_descriptor(
        solution: S,
        descriptor: Arc<SolutionDescriptor<S>>,
        mut calculator: C,
    ) -> Self {
        let core = DirectorCore::new(solution, descriptor);
        calculator.reset_working_solution(core.solution());
        IncrementalScoreDirector { core, calculator }
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
        self.set_working_solution(solution);
        self
    }

    /// Replaces all variable listeners, e.g. with a factory's prototype set.
    pub fn with_listener_support(mut self, listeners: VariableListenerSupport<S>) -> Self {
        self.core.set_listener_support(listeners);
        let solution = self.core.solution().clone();
        self.set_working_solution(solution);
        self
    }

    pub fn calculator(&self) -> &C {
        &self.calculator
    }

    pub fn into_working_solution(self) -> S {
        self.core.into_solution()
    }
}

impl<S, C> ScoreDirector<S> for IncrementalScoreDirector<S, C>
where
    S: PlanningSolution,
    C: IncrementalScoreCalculator<S>,
{
    fn working_solution(&self) -> &S {
        self.core.solution()
    }

    fn working_solution_mut(&mut self) -> &mut S {
        self.core.solution_mut()
    }

    fn set_working_solution(&mut self, solution: S) {
        let mut observer = CalculatorObserver {
            calculator: &mut self.calculator,
        };
        self.core.install(solution, &mut observer);
        self.calculator.reset_working_solution(self.core.solution());
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
        self.calculator.before_variable_changed(
            self.core.solution(),
            descriptor_index,
            entity_index,
            variable_name,
        );
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
        self.calculator.after_variable_changed(
            self.core.solution(),
            descriptor_index,
            entity_index,
            variable_name,
        );
    }

    fn before_entity_added(&mut self, descriptor_index: usize, entity_index: usize) {
        self.calculator
            .before_entity_added(self.core.solution(), descriptor_index, entity_index);
    }

    fn after_entity_added(&mut self, descriptor_index: usize, entity_index: usize) {
        self.core.after_entity_added(descriptor_index, entity_index);
        self.calculator
            .after_entity_added(self.core.solution(), descriptor_index, entity_index);
    }

    fn before_entity_removed(&mut self, descriptor_index: usize, entity_index: usize) {
        self.calculator
            .before_entity_removed(self.core.solution(), descriptor_index, entity_index);
        self.core.before_entity_removed(descriptor_index, entity_index);
    }

    fn after_entity_removed(&mut self, descriptor_index: usize, entity_index: usize) {
        self.core.after_entity_removed(descriptor_index, entity_index);
        self.calculator
            .after_entity_removed(self.core.solution(), descriptor_index, entity_index);
    }

    fn after_problem_property_changed(&mut self) {
        self.core.after_problem_property_changed();
        self.calculator.reset_working_solution(self.core.solution());
    }

    fn trigger_variable_listeners(&mut self) {
        let mut observer = CalculatorObserver {
            calculator: &mut self.calculator,
        };
        self.core.trigger(&mut observer);
    }

    fn calculate_score(&mut self) -> S::Score {
        self.trigger_variable_listeners();
        let score = self.core.with_init_score(self.calculator.calculate_score());
        self.core.increment_calculation_count();
        self.core.store_score(score);
        score
    }

    fn calculate_score_from_scratch(&mut self) -> S::Score {
        self.trigger_variable_listeners();
        self.calculator.reset_working_solution(self.core.solution());
        let levels = self.calculator.calculate_score();
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

    fn is_incremental(&self) -> bool {
        true
    }
}

impl<S, C> Clone for IncrementalScoreDirector<S, C>
where
    S: PlanningSolution,
    C: Clone,
{
    fn clone(&self) -> Self {
        IncrementalScoreDirector {
            core: self.core.clone(),
            calculator: self.calculator.clone(),
        }
    }
}

impl<S: PlanningSolution, C> fmt::Debug for IncrementalScoreDirector<S, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IncrementalScoreDirector")
            .field("core", &self.core)
            .finish_non_exhaustive()
    }
}
