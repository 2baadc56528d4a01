// Recording score director for automatic undo tracking.
//
// The `RecordingScoreDirector` wraps an existing score director and stores
// the undo closures registered by moves, together with every variable the
// move touched:
//
// ```text
// let mut recording = RecordingScoreDirector::new(&mut inner);
// mv.do_move(&mut recording);   // move registers its undo closure
// let score = recording.calculate_score();
// recording.undo_changes();     // restores the solution, notifying again
// ```

use planforge_core::domain::{LookUpKey, LookUpStrategyType, SolutionDescriptor, SupplyManager};
use planforge_core::{PlanningSolution, Result};

use super::traits::{ScoreDirector, UndoAction};

/// A score director wrapper that stores undo closures.
///
/// # Example
///
/// ```
/// use planforge_core::domain::{EntityDescriptor, SolutionDescriptor, VariableDescriptor};
/// use planforge_core::score::SimpleScore;
/// use planforge_core::PlanningSolution;
/// use planforge_scoring::director::{RecordingScoreDirector, ScoreDirector, SimpleScoreDirector};
///
/// #[derive(Clone)]
/// struct Counter { values: Vec<i64>, score: Option<SimpleScore> }
///
/// impl PlanningSolution for Counter {
///     type Score = SimpleScore;
///     fn score(&self) -> Option<Self::Score> { self.score }
///     fn set_score(&mut self, score: Option<Self::Score>) { self.score = score; }
/// }
///
/// let descriptor = SolutionDescriptor::new("Counter").with_entity(
///     EntityDescriptor::new("Cell", |s: &Counter| s.values.len())
///         .with_variable(VariableDescriptor::genuine("value", |_, _| true)),
/// );
/// let mut director = SimpleScoreDirector::new(
///     Counter { values: vec![10], score: None },
///     descriptor,
///     |s: &Counter| SimpleScore::of(s.values.iter().sum()),
/// );
///
/// let mut recording = RecordingScoreDirector::new(&mut director);
/// let old = recording.working_solution().values[0];
/// recording.before_variable_changed(0, 0, "value");
/// recording.working_solution_mut().values[0] = 20;
/// recording.after_variable_changed(0, 0, "value");
/// recording.register_undo(Box::new(move |s: &mut Counter| s.values[0] = old));
/// assert_eq!(recording.calculate_score(), SimpleScore::of(20));
///
/// recording.undo_changes();
/// assert_eq!(recording.calculate_score(), SimpleScore::of(10));
/// ```
pub struct RecordingScoreDirector<'a, S: PlanningSolution> {
    inner: &'a mut dyn ScoreDirector<S>,
    undo_stack: Vec<UndoAction<S>>,
    // (descriptor_index, entity_index, variable_name), deduplicated.
    modified_variables: Vec<(usize, usize, &'static str)>,
}

impl<'a, S: PlanningSolution> RecordingScoreDirector<'a, S> {
    pub fn new(inner: &'a mut dyn ScoreDirector<S>) -> Self {
        Self {
            inner,
            undo_stack: Vec::with_capacity(16),
            modified_variables: Vec::with_capacity(8),
        }
    }

    /// Undoes all recorded changes in reverse order.
    ///
    /// Every modified variable is announced with `before_variable_changed`
    /// in its post-move state, the closures restore the old values, and
    /// `after_variable_changed` announces the restored state. Variable
    /// listeners run at the end so shadow variables match again.
    pub fn undo_changes(&mut self) {
        for &(descriptor_index, entity_index, variable_name) in &self.modified_variables {
            self.inner
                .before_variable_changed(descriptor_index, entity_index, variable_name);
        }

        while let Some(undo) = self.undo_stack.pop() {
            undo(self.inner.working_solution_mut());
        }

        for (descriptor_index, entity_index, variable_name) in self.modified_variables.drain(..) {
            self.inner
                .after_variable_changed(descriptor_index, entity_index, variable_name);
        }
        self.inner.trigger_variable_listeners();
    }

    /// Forgets recorded changes without undoing them.
    pub fn reset(&mut self) {
        self.undo_stack.clear();
        self.modified_variables.clear();
    }

    pub fn change_count(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn is_empty(&self) -> bool {
        self.undo_stack.is_empty()
    }

    fn record(&mut self, descriptor_index: usize, entity_index: usize, variable_name: &'static str) {
        let key = (descriptor_index, entity_index, variable_name);
        if !self.modified_variables.contains(&key) {
            self.modified_variables.push(key);
        }
    }
}

impl<S: PlanningSolution> ScoreDirector<S> for RecordingScoreDirector<'_, S> {
    fn working_solution(&self) -> &S {
        self.inner.working_solution()
    }

    fn working_solution_mut(&mut self) -> &mut S {
        self.inner.working_solution_mut()
    }

    fn set_working_solution(&mut self, solution: S) {
        self.reset();
        self.inner.set_working_solution(solution);
    }

    fn solution_descriptor(&self) -> &SolutionDescriptor<S> {
        self.inner.solution_descriptor()
    }

    fn clone_working_solution(&self) -> S {
        self.inner.clone_working_solution()
    }

    fn before_variable_changed(
        &mut self,
        descriptor_index: usize,
        entity_index: usize,
        variable_name: &'static str,
    ) {
        self.inner
            .before_variable_changed(descriptor_index, entity_index, variable_name);
    }

    fn after_variable_changed(
        &mut self,
        descriptor_index: usize,
        entity_index: usize,
        variable_name: &'static str,
    ) {
        self.record(descriptor_index, entity_index, variable_name);
        self.inner
            .after_variable_changed(descriptor_index, entity_index, variable_name);
    }

    fn before_entity_added(&mut self, descriptor_index: usize, entity_index: usize) {
        self.inner.before_entity_added(descriptor_index, entity_index);
    }

    fn after_entity_added(&mut self, descriptor_index: usize, entity_index: usize) {
        self.inner.after_entity_added(descriptor_index, entity_index);
    }

    fn before_entity_removed(&mut self, descriptor_index: usize, entity_index: usize) {
        self.inner.before_entity_removed(descriptor_index, entity_index);
    }

    fn after_entity_removed(&mut self, descriptor_index: usize, entity_index: usize) {
        self.inner.after_entity_removed(descriptor_index, entity_index);
    }

    fn before_problem_property_changed(&mut self) {
        self.inner.before_problem_property_changed();
    }

    fn after_problem_property_changed(&mut self) {
        self.inner.after_problem_property_changed();
    }

    fn trigger_variable_listeners(&mut self) {
        self.inner.trigger_variable_listeners();
    }

    fn calculate_score(&mut self) -> S::Score {
        self.inner.calculate_score()
    }

    fn calculate_score_from_scratch(&mut self) -> S::Score {
        self.inner.calculate_score_from_scratch()
    }

    fn calculation_count(&self) -> u64 {
        self.inner.calculation_count()
    }

    fn uninitialized_variable_count(&self) -> usize {
        self.inner.uninitialized_variable_count()
    }

    fn lookup_strategy(&self) -> LookUpStrategyType {
        self.inner.lookup_strategy()
    }

    fn look_up_working_entity_or_none(
        &self,
        descriptor_index: usize,
        key: &LookUpKey,
    ) -> Result<Option<usize>> {
        self.inner.look_up_working_entity_or_none(descriptor_index, key)
    }

    fn supply_manager(&self) -> &SupplyManager<S> {
        self.inner.supply_manager()
    }

    fn supply_manager_mut(&mut self) -> (&mut SupplyManager<S>, &S) {
        self.inner.supply_manager_mut()
    }

    fn register_undo(&mut self, undo: UndoAction<S>) {
        self.undo_stack.push(undo);
    }

    fn is_incremental(&self) -> bool {
        self.inner.is_incremental()
    }
}
