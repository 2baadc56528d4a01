//! Variable listener infrastructure for shadow variable updates.
//!
//! Variable listeners are notified when a source variable changes and keep
//! the shadow variables derived from it current.
//!
//! # Architecture
//!
//! - [`VariableListener`]: User code recomputing shadow variables
//! - [`VariableListenerSupport`]: Registry that queues and deduplicates
//!   after-notifications until the score director triggers them
//! - [`ShadowVariableContext`]: What a listener gets to mutate the solution;
//!   every shadow change made through it is reported to a
//!   [`ShadowVariableObserver`] (the score director) and cascades to
//!   listeners sourced on that shadow variable

mod support;

#[cfg(test)]
mod tests;

pub use support::VariableListenerSupport;

/// Receives the before/after notifications of shadow variable changes.
pub trait ShadowVariableObserver<S> {
    fn before_shadow_changed(
        &mut self,
        solution: &S,
        descriptor_index: usize,
        entity_index: usize,
        variable_name: &'static str,
    );

    fn after_shadow_changed(
        &mut self,
        solution: &S,
        descriptor_index: usize,
        entity_index: usize,
        variable_name: &'static str,
    );
}

/// An observer that ignores every notification.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoShadowObserver;

impl<S> ShadowVariableObserver<S> for NoShadowObserver {
    fn before_shadow_changed(&mut self, _: &S, _: usize, _: usize, _: &'static str) {}

    fn after_shadow_changed(&mut self, _: &S, _: usize, _: usize, _: &'static str) {}
}

/// Mutable access to the working solution for a variable listener.
pub struct ShadowVariableContext<'a, S> {
    solution: &'a mut S,
    observer: &'a mut dyn ShadowVariableObserver<S>,
}

impl<'a, S> ShadowVariableContext<'a, S> {
    pub fn new(solution: &'a mut S, observer: &'a mut dyn ShadowVariableObserver<S>) -> Self {
        ShadowVariableContext { solution, observer }
    }

    pub fn solution(&self) -> &S {
        self.solution
    }

    /// Changes one shadow variable, wrapped in before/after notifications.
    pub fn change_shadow<R>(
        &mut self,
        descriptor_index: usize,
        entity_index: usize,
        variable_name: &'static str,
        update: impl FnOnce(&mut S) -> R,
    ) -> R {
        self.observer
            .before_shadow_changed(self.solution, descriptor_index, entity_index, variable_name);
        let result = update(self.solution);
        self.observer
            .after_shadow_changed(self.solution, descriptor_index, entity_index, variable_name);
        result
    }
}

/// A listener that is notified when a source planning variable changes.
///
/// `before_*` hooks run immediately, while the old value is still in place.
/// `after_*` hooks are queued and deduplicated per (listener, entity) until
/// the score director triggers them, so a move touching a variable several
/// times produces one recomputation.
///
/// Listeners only modify shadow variables, always through
/// [`ShadowVariableContext::change_shadow`].
pub trait VariableListener<S>: ListenerObject<S> + Send + Sync + 'static {
    fn before_variable_changed(&mut self, _solution: &S, _entity_index: usize) {}

    fn after_variable_changed(&mut self, ctx: &mut ShadowVariableContext<'_, S>, entity_index: usize);

    fn after_entity_added(&mut self, ctx: &mut ShadowVariableContext<'_, S>, entity_index: usize) {
        self.after_variable_changed(ctx, entity_index);
    }

    fn before_entity_removed(&mut self, _solution: &S, _entity_index: usize) {}
}

/// Object-safety helpers implemented for every `Clone` listener.
pub trait ListenerObject<S> {
    fn clone_box(&self) -> Box<dyn VariableListener<S>>;
}

impl<S: 'static, T> ListenerObject<S> for T
where
    T: VariableListener<S> + Clone,
{
    fn clone_box(&self) -> Box<dyn VariableListener<S>> {
        Box::new(self.clone())
    }
}
