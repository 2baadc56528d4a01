//! Listener registry with queued, deduplicated after-notifications.

use std::collections::HashSet;
use std::fmt;

use super::{ShadowVariableContext, ShadowVariableObserver, VariableListener};

/// Which variables of which entity type a listener watches.
#[derive(Debug, Clone)]
struct ListenerSource {
    descriptor_index: usize,
    variables: Vec<&'static str>,
}

impl ListenerSource {
    fn matches(&self, descriptor_index: usize, variable_name: &str) -> bool {
        self.descriptor_index == descriptor_index && self.variables.iter().any(|v| *v == variable_name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum NotificationKind {
    VariableChanged,
    EntityAdded,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct Notification {
    listener: usize,
    entity_index: usize,
    kind: NotificationKind,
}

#[derive(Default)]
struct NotificationQueue {
    pending: Vec<Notification>,
    queued: HashSet<Notification>,
}

impl NotificationQueue {
    fn push(&mut self, notification: Notification) {
        if self.queued.insert(notification) {
            self.pending.push(notification);
        }
    }

    fn take(&mut self) -> Vec<Notification> {
        self.queued.clear();
        std::mem::take(&mut self.pending)
    }
}

/// Forwards shadow changes to the outer observer and queues listeners
/// sourced on the changed shadow variable.
struct CascadeObserver<'a, S> {
    inner: &'a mut dyn ShadowVariableObserver<S>,
    sources: &'a [ListenerSource],
    queue: &'a mut NotificationQueue,
}

impl<S> ShadowVariableObserver<S> for CascadeObserver<'_, S> {
    fn before_shadow_changed(
        &mut self,
        solution: &S,
        descriptor_index: usize,
        entity_index: usize,
        variable_name: &'static str,
    ) {
        self.inner
            .before_shadow_changed(solution, descriptor_index, entity_index, variable_name);
    }

    fn after_shadow_changed(
        &mut self,
        solution: &S,
        descriptor_index: usize,
        entity_index: usize,
        variable_name: &'static str,
    ) {
        self.inner
            .after_shadow_changed(solution, descriptor_index, entity_index, variable_name);
        for (listener, source) in self.sources.iter().enumerate() {
            if source.matches(descriptor_index, variable_name) {
                self.queue.push(Notification {
                    listener,
                    entity_index,
                    kind: NotificationKind::VariableChanged,
                });
            }
        }
    }
}

/// Registry of variable listeners for one score director.
pub struct VariableListenerSupport<S> {
    listeners: Vec<Box<dyn VariableListener<S>>>,
    sources: Vec<ListenerSource>,
    queue: NotificationQueue,
}

impl<S: 'static> VariableListenerSupport<S> {
    pub fn new() -> Self {
        VariableListenerSupport {
            listeners: Vec::new(),
            sources: Vec::new(),
            queue: NotificationQueue::default(),
        }
    }

    /// Registers a listener watching the given variables of an entity type.
    pub fn register(
        &mut self,
        descriptor_index: usize,
        source_variables: &[&'static str],
        listener: impl VariableListener<S>,
    ) {
        self.listeners.push(Box::new(listener));
        self.sources.push(ListenerSource {
            descriptor_index,
            variables: source_variables.to_vec(),
        });
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    /// Returns true if notifications are waiting to be triggered.
    pub fn has_pending(&self) -> bool {
        !self.queue.pending.is_empty()
    }

    /// Returns true if some listener watches the variable.
    pub fn is_source(&self, descriptor_index: usize, variable_name: &str) -> bool {
        self.sources
            .iter()
            .any(|s| s.matches(descriptor_index, variable_name))
    }

    pub fn before_variable_changed(
        &mut self,
        solution: &S,
        descriptor_index: usize,
        entity_index: usize,
        variable_name: &'static str,
    ) {
        for (listener, source) in self.listeners.iter_mut().zip(&self.sources) {
            if source.matches(descriptor_index, variable_name) {
                listener.before_variable_changed(solution, entity_index);
            }
        }
    }

    pub fn after_variable_changed(
        &mut self,
        descriptor_index: usize,
        entity_index: usize,
        variable_name: &'static str,
    ) {
        for (listener, source) in self.sources.iter().enumerate() {
            if source.matches(descriptor_index, variable_name) {
                self.queue.push(Notification {
                    listener,
                    entity_index,
                    kind: NotificationKind::VariableChanged,
                });
            }
        }
    }

    pub fn after_entity_added(&mut self, descriptor_index: usize, entity_index: usize) {
        for (listener, source) in self.sources.iter().enumerate() {
            if source.descriptor_index == descriptor_index {
                self.queue.push(Notification {
                    listener,
                    entity_index,
                    kind: NotificationKind::EntityAdded,
                });
            }
        }
    }

    pub fn before_entity_removed(&mut self, solution: &S, descriptor_index: usize, entity_index: usize) {
        for (listener, source) in self.listeners.iter_mut().zip(&self.sources) {
            if source.descriptor_index == descriptor_index {
                listener.before_entity_removed(solution, entity_index);
            }
        }
    }

    /// Queues every entity of every source entity type, so the next
    /// trigger recomputes all shadow variables.
    pub fn force_all(&mut self, entity_count: impl Fn(usize) -> usize) {
        for (listener, source) in self.sources.iter().enumerate() {
            for entity_index in 0..entity_count(source.descriptor_index) {
                self.queue.push(Notification {
                    listener,
                    entity_index,
                    kind: NotificationKind::EntityAdded,
                });
            }
        }
    }

    /// Drops queued notifications without running them.
    pub fn clear_pending(&mut self) {
        self.queue.take();
    }

    /// Runs queued notifications until no listener is pending.
    ///
    /// Shadow changes made by a listener are reported to `observer` and
    /// queue the listeners sourced on that shadow variable. Returns the
    /// number of listener invocations.
    pub fn trigger(&mut self, solution: &mut S, observer: &mut dyn ShadowVariableObserver<S>) -> usize {
        let mut invocations = 0;
        loop {
            let batch = self.queue.take();
            if batch.is_empty() {
                return invocations;
            }
            for notification in batch {
                let mut cascade = CascadeObserver {
                    inner: &mut *observer,
                    sources: &self.sources,
                    queue: &mut self.queue,
                };
                let mut ctx = ShadowVariableContext::new(solution, &mut cascade);
                let listener = &mut self.listeners[notification.listener];
                match notification.kind {
                    NotificationKind::VariableChanged => {
                        listener.after_variable_changed(&mut ctx, notification.entity_index)
                    }
                    NotificationKind::EntityAdded => {
                        listener.after_entity_added(&mut ctx, notification.entity_index)
                    }
                }
                invocations += 1;
            }
        }
    }
}

impl<S: 'static> Default for VariableListenerSupport<S> {
    fn default() -> Self {
        VariableListenerSupport::new()
    }
}

impl<S: 'static> Clone for VariableListenerSupport<S> {
    fn clone(&self) -> Self {
        VariableListenerSupport {
            listeners: self.listeners.iter().map(|l| l.clone_box()).collect(),
            sources: self.sources.clone(),
            queue: NotificationQueue {
                pending: self.queue.pending.clone(),
                queued: self.queue.queued.clone(),
            },
        }
    }
}

impl<S> fmt::Debug for VariableListenerSupport<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VariableListenerSupport")
            .field("listener_count", &self.listeners.len())
            .field("sources", &self.sources)
            .field("pending", &self.queue.pending.len())
            .finish()
    }
}
