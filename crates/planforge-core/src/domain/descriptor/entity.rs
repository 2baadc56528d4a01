//! Entity descriptor.

use std::fmt;

use super::VariableDescriptor;
use crate::domain::lookup::LookUpKey;

/// Describes a planning entity type at runtime.
///
/// Entities are addressed by index; the descriptor holds the accessors
/// needed to count them, test pinning and read their planning id.
pub struct EntityDescriptor<S> {
    type_name: &'static str,
    entity_count: fn(&S) -> usize,
    is_pinned: Option<fn(&S, usize) -> bool>,
    planning_id: Option<fn(&S, usize) -> LookUpKey>,
    variable_descriptors: Vec<VariableDescriptor<S>>,
}

impl<S> EntityDescriptor<S> {
    /// Creates a new EntityDescriptor.
    pub fn new(type_name: &'static str, entity_count: fn(&S) -> usize) -> Self {
        EntityDescriptor {
            type_name,
            entity_count,
            is_pinned: None,
            planning_id: None,
            variable_descriptors: Vec::new(),
        }
    }

    /// Adds a variable descriptor.
    pub fn with_variable(mut self, descriptor: VariableDescriptor<S>) -> Self {
        self.variable_descriptors.push(descriptor);
        self
    }

    /// Sets the pinning check.
    pub fn with_pinning(mut self, is_pinned: fn(&S, usize) -> bool) -> Self {
        self.is_pinned = Some(is_pinned);
        self
    }

    /// Sets the planning id accessor used by working-object lookups.
    pub fn with_planning_id(mut self, planning_id: fn(&S, usize) -> LookUpKey) -> Self {
        self.planning_id = Some(planning_id);
        self
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Returns the number of entities of this type in the solution.
    pub fn entity_count(&self, solution: &S) -> usize {
        (self.entity_count)(solution)
    }

    /// Returns true if the entity is pinned.
    pub fn is_pinned(&self, solution: &S, entity_index: usize) -> bool {
        self.is_pinned
            .is_some_and(|check| check(solution, entity_index))
    }

    pub fn has_planning_id(&self) -> bool {
        self.planning_id.is_some()
    }

    /// Returns the planning id of the entity, if the type declares one.
    pub fn planning_id(&self, solution: &S, entity_index: usize) -> Option<LookUpKey> {
        self.planning_id.map(|id| id(solution, entity_index))
    }

    pub fn variable_descriptors(&self) -> &[VariableDescriptor<S>] {
        &self.variable_descriptors
    }

    /// Returns genuine (non-shadow) variable descriptors.
    pub fn genuine_variable_descriptors(&self) -> impl Iterator<Item = &VariableDescriptor<S>> {
        self.variable_descriptors.iter().filter(|v| v.is_genuine())
    }

    /// Returns shadow variable descriptors.
    pub fn shadow_variable_descriptors(&self) -> impl Iterator<Item = &VariableDescriptor<S>> {
        self.variable_descriptors.iter().filter(|v| v.is_shadow())
    }

    /// Finds a variable descriptor by name.
    pub fn find_variable(&self, name: &str) -> Option<&VariableDescriptor<S>> {
        self.variable_descriptors.iter().find(|v| v.name() == name)
    }

    /// Returns true if every genuine variable of the entity is initialized.
    pub fn is_initialized(&self, solution: &S, entity_index: usize) -> bool {
        self.genuine_variable_descriptors()
            .all(|v| v.is_initialized(solution, entity_index))
    }

    /// Counts genuine variables of this type that are uninitialized.
    pub fn count_uninitialized_variables(&self, solution: &S) -> usize {
        let count = self.entity_count(solution);
        self.genuine_variable_descriptors()
            .map(|v| {
                (0..count)
                    .filter(|&i| !v.is_initialized(solution, i))
                    .count()
            })
            .sum()
    }

    /// Counts entities with at least one uninitialized genuine variable.
    pub fn count_uninitialized_entities(&self, solution: &S) -> usize {
        (0..self.entity_count(solution))
            .filter(|&i| !self.is_initialized(solution, i))
            .count()
    }
}

impl<S> Clone for EntityDescriptor<S> {
    fn clone(&self) -> Self {
        EntityDescriptor {
            type_name: self.type_name,
            entity_count: self.entity_count,
            is_pinned: self.is_pinned,
            planning_id: self.planning_id,
            variable_descriptors: self.variable_descriptors.clone(),
        }
    }
}

impl<S> fmt::Debug for EntityDescriptor<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntityDescriptor")
            .field("type_name", &self.type_name)
            .field("has_pinning", &self.is_pinned.is_some())
            .field("has_planning_id", &self.planning_id.is_some())
            .field("variables", &self.variable_descriptors)
            .finish()
    }
}
