//! State shared by every concrete score director.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use planforge_core::domain::{
    LookUpKey, LookUpStrategyType, ShadowVariableObserver, SolutionDescriptor, SupplyManager,
    VariableListener, VariableListenerSupport,
};
use planforge_core::{PlanForgeError, PlanningSolution, Result, Score};
use tracing::trace;

/// The working solution plus everything derived from it.
///
/// Directors differ only in how they calculate the score; notification
/// bookkeeping for supplies, variable listeners, the lookup index and the
/// uninitialized variable count lives here.
pub struct DirectorCore<S: PlanningSolution> {
    working_solution: S,
    descriptor: Arc<SolutionDescriptor<S>>,
    supplies: SupplyManager<S>,
    listeners: VariableListenerSupport<S>,
    lookup_strategy: LookUpStrategyType,
    lookup_index: Vec<HashMap<LookUpKey, usize>>,
    uninitialized: usize,
    calculation_count: u64,
}

impl<S: PlanningSolution> DirectorCore<S> {
    pub fn new(solution: S, descriptor: Arc<SolutionDescriptor<S>>) -> Self {
        let mut core = DirectorCore {
            working_solution: solution,
            descriptor,
            supplies: SupplyManager::new(),
            listeners: VariableListenerSupport::new(),
            lookup_strategy: LookUpStrategyType::default(),
            lookup_index: Vec::new(),
            uninitialized: 0,
            calculation_count: 0,
        };
        core.rebuild_lookup_index();
        core.uninitialized = core.count_uninitialized();
        core
    }

    pub fn with_lookup_strategy(mut self, strategy: LookUpStrategyType) -> Self {
        self.lookup_strategy = strategy;
        self
    }

    pub fn register_listener(
        &mut self,
        descriptor_index: usize,
        sources: &[&'static str],
        listener: impl VariableListener<S>,
    ) {
        self.listeners.register(descriptor_index, sources, listener);
    }

    /// Replaces the registered variable listeners.
    ///
    /// Call [`install`](Self::install) afterwards to bring shadows up to date.
    pub fn set_listener_support(&mut self, listeners: VariableListenerSupport<S>) {
        self.listeners = listeners;
    }

    pub fn solution(&self) -> &S {
        &self.working_solution
    }

    pub fn into_solution(self) -> S {
        self.working_solution
    }

    pub fn solution_mut(&mut self) -> &mut S {
        &mut self.working_solution
    }

    pub fn descriptor(&self) -> &SolutionDescriptor<S> {
        &self.descriptor
    }

    pub fn shared_descriptor(&self) -> Arc<SolutionDescriptor<S>> {
        Arc::clone(&self.descriptor)
    }

    pub fn supplies(&self) -> &SupplyManager<S> {
        &self.supplies
    }

    pub fn supplies_with_solution(&mut self) -> (&mut SupplyManager<S>, &S) {
        (&mut self.supplies, &self.working_solution)
    }

    pub fn lookup_strategy(&self) -> LookUpStrategyType {
        self.lookup_strategy
    }

    pub fn uninitialized_variable_count(&self) -> usize {
        self.uninitialized
    }

    pub fn calculation_count(&self) -> u64 {
        self.calculation_count
    }

    pub fn increment_calculation_count(&mut self) {
        self.calculation_count += 1;
    }

    /// Applies the init score matching the uninitialized variable count.
    pub fn with_init_score(&self, score: S::Score) -> S::Score {
        let init = i32::try_from(self.uninitialized).unwrap_or(i32::MAX);
        score.with_init_score(-init)
    }

    /// Stores a freshly calculated score on the working solution.
    pub fn store_score(&mut self, score: S::Score) {
        self.working_solution.set_score(Some(score));
    }

    /// Replaces the working solution and rebuilds every derived structure.
    ///
    /// Listeners are forced for every entity so shadow variables match the
    /// genuine ones; the observer sees those shadow changes.
    pub fn install(&mut self, solution: S, observer: &mut dyn ShadowVariableObserver<S>) {
        self.working_solution = solution;
        self.listeners.clear_pending();
        let descriptor = Arc::clone(&self.descriptor);
        let working = &self.working_solution;
        self.listeners
            .force_all(|d| descriptor.entity_count(working, d));
        self.supplies.reset_working_solution(&self.working_solution);
        self.trigger(observer);
        self.rebuild_lookup_index();
        self.uninitialized = self.count_uninitialized();
    }

    pub fn before_variable_changed(
        &mut self,
        descriptor_index: usize,
        entity_index: usize,
        variable_name: &'static str,
    ) {
        if !self.is_initialized(descriptor_index, entity_index, variable_name) {
            self.uninitialized = self.uninitialized.saturating_sub(1);
        }
        self.supplies.before_variable_changed(
            &self.working_solution,
            descriptor_index,
            entity_index,
            variable_name,
        );
        self.listeners.before_variable_changed(
            &self.working_solution,
            descriptor_index,
            entity_index,
            variable_name,
        );
    }

    pub fn after_variable_changed(
        &mut self,
        descriptor_index: usize,
        entity_index: usize,
        variable_name: &'static str,
    ) {
        if !self.is_initialized(descriptor_index, entity_index, variable_name) {
            self.uninitialized += 1;
        }
        self.supplies.after_variable_changed(
            &self.working_solution,
            descriptor_index,
            entity_index,
            variable_name,
        );
        self.listeners
            .after_variable_changed(descriptor_index, entity_index, variable_name);
    }

    pub fn after_entity_added(&mut self, descriptor_index: usize, entity_index: usize) {
        self.supplies
            .after_entity_added(&self.working_solution, descriptor_index, entity_index);
        self.listeners.after_entity_added(descriptor_index, entity_index);
        self.rebuild_lookup_index();
        self.uninitialized = self.count_uninitialized();
    }

    pub fn before_entity_removed(&mut self, descriptor_index: usize, entity_index: usize) {
        self.listeners
            .before_entity_removed(&self.working_solution, descriptor_index, entity_index);
    }

    pub fn after_entity_removed(&mut self, descriptor_index: usize, entity_index: usize) {
        // Queued notifications may point at shifted indices.
        self.listeners.clear_pending();
        self.supplies
            .after_entity_removed(&self.working_solution, descriptor_index, entity_index);
        self.rebuild_lookup_index();
        self.uninitialized = self.count_uninitialized();
    }

    pub fn after_problem_property_changed(&mut self) {
        self.supplies.reset_working_solution(&self.working_solution);
    }

    /// Runs pending variable listeners.
    ///
    /// Shadow changes are applied to supplies and then passed on to the
    /// downstream observer (the score calculator).
    pub fn trigger(&mut self, downstream: &mut dyn ShadowVariableObserver<S>) {
        if !self.listeners.has_pending() {
            return;
        }
        let mut observer = CoreObserver {
            supplies: &mut self.supplies,
            downstream,
        };
        let invocations = self
            .listeners
            .trigger(&mut self.working_solution, &mut observer);
        trace!(invocations, "Variable listeners triggered");
    }

    pub fn has_pending_listeners(&self) -> bool {
        self.listeners.has_pending()
    }

    pub fn look_up(&self, descriptor_index: usize, key: &LookUpKey) -> Result<Option<usize>> {
        let entity = self
            .descriptor
            .entity_descriptor(descriptor_index)
            .ok_or_else(|| {
                PlanForgeError::Lookup(format!("Unknown entity descriptor {}", descriptor_index))
            })?;
        match self.lookup_strategy {
            LookUpStrategyType::None => Err(PlanForgeError::Lookup(format!(
                "Lookup of {} {} is disabled by the lookup strategy",
                entity.type_name(),
                key
            ))),
            LookUpStrategyType::PlanningIdOrFailFast if !entity.has_planning_id() => {
                Err(PlanForgeError::Lookup(format!(
                    "Entity type {} declares no planning id, cannot look up {}",
                    entity.type_name(),
                    key
                )))
            }
            LookUpStrategyType::PlanningIdOrNone if !entity.has_planning_id() => Ok(None),
            _ => Ok(self
                .lookup_index
                .get(descriptor_index)
                .and_then(|index| index.get(key))
                .copied()),
        }
    }

    /// Recounts uninitialized variables, overwriting the tracked count.
    pub fn count_uninitialized(&self) -> usize {
        self.descriptor
            .count_uninitialized_variables(&self.working_solution)
    }

    fn is_initialized(
        &self,
        descriptor_index: usize,
        entity_index: usize,
        variable_name: &str,
    ) -> bool {
        self.descriptor
            .find_variable(descriptor_index, variable_name)
            .map_or(true, |v| v.is_initialized(&self.working_solution, entity_index))
    }

    fn rebuild_lookup_index(&mut self) {
        let solution = &self.working_solution;
        self.lookup_index = self
            .descriptor
            .entity_descriptors()
            .iter()
            .map(|entity| {
                if !entity.has_planning_id() {
                    return HashMap::new();
                }
                (0..entity.entity_count(solution))
                    .filter_map(|i| entity.planning_id(solution, i).map(|key| (key, i)))
                    .collect()
            })
            .collect();
    }
}

impl<S: PlanningSolution> Clone for DirectorCore<S> {
    fn clone(&self) -> Self {
        DirectorCore {
            working_solution: self.working_solution.clone(),
            descriptor: Arc::clone(&self.descriptor),
            supplies: self.supplies.clone(),
            listeners: self.listeners.clone(),
            lookup_strategy: self.lookup_strategy,
            lookup_index: self.lookup_index.clone(),
            uninitialized: self.uninitialized,
            calculation_count: self.calculation_count,
        }
    }
}

impl<S: PlanningSolution> fmt::Debug for DirectorCore<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DirectorCore")
            .field("descriptor", &self.descriptor.type_name())
            .field("supplies", &self.supplies)
            .field("listeners", &self.listeners)
            .field("uninitialized", &self.uninitialized)
            .field("calculation_count", &self.calculation_count)
            .finish()
    }
}

/// Keeps supplies current while listeners change shadow variables.
struct CoreObserver<'a, S> {
    supplies: &'a mut SupplyManager<S>,
    downstream: &'a mut dyn ShadowVariableObserver<S>,
}

impl<S: 'static> ShadowVariableObserver<S> for CoreObserver<'_, S> {
    fn before_shadow_changed(
        &mut self,
        solution: &S,
        descriptor_index: usize,
        entity_index: usize,
        variable_name: &'static str,
    ) {
        self.supplies
            .before_variable_changed(solution, descriptor_index, entity_index, variable_name);
        self.downstream
            .before_shadow_changed(solution, descriptor_index, entity_index, variable_name);
    }

    fn after_shadow_changed(
        &mut self,
        solution: &S,
        descriptor_index: usize,
        entity_index: usize,
        variable_name: &'static str,
    ) {
        self.supplies
            .after_variable_changed(solution, descriptor_index, entity_index, variable_name);
        self.downstream
            .after_shadow_changed(solution, descriptor_index, entity_index, variable_name);
    }
}
