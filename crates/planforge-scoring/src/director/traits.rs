// Score director trait definition.

use planforge_core::domain::{
    Demand, DemandKey, LookUpKey, LookUpStrategyType, PlanningId, SolutionDescriptor, Supply,
    SupplyManager,
};
use planforge_core::{PlanForgeError, PlanningSolution, Result};

/// An undo action registered by a move while it runs.
pub type UndoAction<S> = Box<dyn FnOnce(&mut S) + Send>;

/// The score director owns the working solution and keeps its score current.
///
/// It is responsible for:
/// - Maintaining the working solution
/// - Calculating scores (incrementally when the calculator supports it)
/// - Forwarding variable change notifications to supplies, variable
///   listeners and the score calculator
/// - Resolving external objects to working entities by planning id
///
/// Every change to a planning variable must be wrapped in
/// `before_variable_changed` / `after_variable_changed` with the same
/// arguments. The contract is not checked at runtime; the assertion
/// environment modes catch violations through score corruption.
pub trait ScoreDirector<S: PlanningSolution>: Send {
    /// Returns a reference to the working solution.
    fn working_solution(&self) -> &S;

    /// Returns a mutable reference to the working solution.
    ///
    /// Marks the score dirty. Variable changes still require notifications.
    fn working_solution_mut(&mut self) -> &mut S;

    /// Installs a new working solution, rebuilding every derived structure.
    fn set_working_solution(&mut self, solution: S);

    fn solution_descriptor(&self) -> &SolutionDescriptor<S>;

    /// Deep copy of the working solution.
    fn clone_working_solution(&self) -> S {
        self.working_solution().clone()
    }

    fn before_variable_changed(
        &mut self,
        descriptor_index: usize,
        entity_index: usize,
        variable_name: &'static str,
    );

    fn after_variable_changed(
        &mut self,
        descriptor_index: usize,
        entity_index: usize,
        variable_name: &'static str,
    );

    fn before_entity_added(&mut self, _descriptor_index: usize, _entity_index: usize) {}

    fn after_entity_added(&mut self, descriptor_index: usize, entity_index: usize);

    fn before_entity_removed(&mut self, descriptor_index: usize, entity_index: usize);

    fn after_entity_removed(&mut self, descriptor_index: usize, entity_index: usize);

    fn before_problem_property_changed(&mut self) {}

    /// Called after a problem fact changed; incremental state is rebuilt.
    fn after_problem_property_changed(&mut self);

    /// Runs the queued variable listeners until no shadow change is pending.
    fn trigger_variable_listeners(&mut self);

    /// Calculates the score of the working solution and stores it on it.
    ///
    /// Triggers pending variable listeners first.
    fn calculate_score(&mut self) -> S::Score;

    /// Recalculates the score without relying on incremental state.
    fn calculate_score_from_scratch(&mut self) -> S::Score;

    /// Number of score calculations since the director was created.
    fn calculation_count(&self) -> u64;

    /// Number of genuine variables that are still uninitialized.
    fn uninitialized_variable_count(&self) -> usize;

    fn lookup_strategy(&self) -> LookUpStrategyType;

    /// Resolves a planning id to the index of the working entity.
    ///
    /// Fails if no entity has the id.
    fn look_up_working_entity(&self, descriptor_index: usize, key: &LookUpKey) -> Result<usize> {
        self.look_up_working_entity_or_none(descriptor_index, key)?
            .ok_or_else(|| {
                PlanForgeError::Lookup(format!(
                    "No working entity of type {} has planning id {}",
                    self.entity_type_name(descriptor_index),
                    key
                ))
            })
    }

    /// Resolves a planning id, yielding `None` if no entity has it.
    fn look_up_working_entity_or_none(
        &self,
        descriptor_index: usize,
        key: &LookUpKey,
    ) -> Result<Option<usize>>;

    fn supply_manager(&self) -> &SupplyManager<S>;

    /// The supply manager together with the solution supplies are built from.
    fn supply_manager_mut(&mut self) -> (&mut SupplyManager<S>, &S);

    /// Records an undo action for the move being evaluated.
    ///
    /// Plain directors ignore it; the recording director collects them.
    fn register_undo(&mut self, _undo: UndoAction<S>) {}

    /// Compares the working score against a from-scratch calculation.
    fn assert_working_score_from_scratch(
        &mut self,
        expected: S::Score,
        context: &str,
    ) -> Result<()> {
        let actual = self.calculate_score_from_scratch();
        if actual != expected {
            return Err(PlanForgeError::ScoreCorruption {
                expected: expected.to_string(),
                actual: actual.to_string(),
                context: context.to_string(),
            });
        }
        Ok(())
    }

    fn entity_count(&self, descriptor_index: usize) -> usize {
        self.solution_descriptor()
            .entity_count(self.working_solution(), descriptor_index)
    }

    fn total_entity_count(&self) -> usize {
        self.solution_descriptor()
            .total_entity_count(self.working_solution())
    }

    fn entity_type_name(&self, descriptor_index: usize) -> &'static str {
        self.solution_descriptor()
            .entity_descriptor(descriptor_index)
            .map_or("<unknown>", |d| d.type_name())
    }

    /// Returns true if this director updates the score incrementally.
    fn is_incremental(&self) -> bool {
        false
    }
}

/// Generic helpers available on every score director, including `dyn`.
pub trait ScoreDirectorExt<S: PlanningSolution> {
    /// Registers a supply demand against the working solution.
    fn demand<D: Demand<S>>(&mut self, demand: &D) -> DemandKey;

    fn cancel_demand(&mut self, key: &DemandKey) -> Result<bool>;

    fn supply<T: Supply<S>>(&self, key: &DemandKey) -> Option<&T>;

    /// Resolves an external object to its working entity.
    fn look_up_working_object<E: PlanningId>(
        &self,
        descriptor_index: usize,
        object: &E,
    ) -> Result<usize>;

    fn look_up_working_object_or_none<E: PlanningId>(
        &self,
        descriptor_index: usize,
        object: &E,
    ) -> Result<Option<usize>>;
}

impl<S, T> ScoreDirectorExt<S> for T
where
    S: PlanningSolution,
    T: ScoreDirector<S> + ?Sized,
{
    fn demand<D: Demand<S>>(&mut self, demand: &D) -> DemandKey {
        let (supplies, solution) = self.supply_manager_mut();
        supplies.demand(demand, solution)
    }

    fn cancel_demand(&mut self, key: &DemandKey) -> Result<bool> {
        self.supply_manager_mut().0.cancel(key)
    }

    fn supply<U: Supply<S>>(&self, key: &DemandKey) -> Option<&U> {
        self.supply_manager().get::<U>(key)
    }

    fn look_up_working_object<E: PlanningId>(
        &self,
        descriptor_index: usize,
        object: &E,
    ) -> Result<usize> {
        self.look_up_working_entity(descriptor_index, &object.planning_id().into())
    }

    fn look_up_working_object_or_none<E: PlanningId>(
        &self,
        descriptor_index: usize,
        object: &E,
    ) -> Result<Option<usize>> {
        self.look_up_working_entity_or_none(descriptor_index, &object.planning_id().into())
    }
}
