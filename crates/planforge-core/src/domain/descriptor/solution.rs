//! Solution descriptor.

use std::fmt;

use super::{EntityDescriptor, VariableDescriptor};

/// Describes a planning solution type: its entity types and their variables.
///
/// Entity descriptors are addressed by their position in the order they
/// were added; that position is the `descriptor_index` used throughout the
/// score director and the move framework.
pub struct SolutionDescriptor<S> {
    type_name: &'static str,
    entity_descriptors: Vec<EntityDescriptor<S>>,
}

impl<S> SolutionDescriptor<S> {
    /// Creates a new SolutionDescriptor.
    pub fn new(type_name: &'static str) -> Self {
        SolutionDescriptor {
            type_name,
            entity_descriptors: Vec::new(),
        }
    }

    /// Adds an entity descriptor.
    pub fn with_entity(mut self, descriptor: EntityDescriptor<S>) -> Self {
        self.entity_descriptors.push(descriptor);
        self
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub fn entity_descriptors(&self) -> &[EntityDescriptor<S>] {
        &self.entity_descriptors
    }

    pub fn entity_descriptor(&self, descriptor_index: usize) -> Option<&EntityDescriptor<S>> {
        self.entity_descriptors.get(descriptor_index)
    }

    /// Finds an entity descriptor index by type name.
    pub fn find_entity_descriptor(&self, type_name: &str) -> Option<usize> {
        self.entity_descriptors
            .iter()
            .position(|d| d.type_name() == type_name)
    }

    /// Finds a variable descriptor.
    pub fn find_variable(
        &self,
        descriptor_index: usize,
        variable_name: &str,
    ) -> Option<&VariableDescriptor<S>> {
        self.entity_descriptor(descriptor_index)?
            .find_variable(variable_name)
    }

    /// Returns the number of entities of a descriptor, or 0 for an unknown index.
    pub fn entity_count(&self, solution: &S, descriptor_index: usize) -> usize {
        self.entity_descriptor(descriptor_index)
            .map_or(0, |d| d.entity_count(solution))
    }

    /// Returns the number of entities across every entity type.
    pub fn total_entity_count(&self, solution: &S) -> usize {
        self.entity_descriptors
            .iter()
            .map(|d| d.entity_count(solution))
            .sum()
    }

    /// Returns the number of genuine variables across every entity.
    pub fn genuine_variable_count(&self, solution: &S) -> usize {
        self.entity_descriptors
            .iter()
            .map(|d| d.entity_count(solution) * d.genuine_variable_descriptors().count())
            .sum()
    }

    /// Counts genuine variables that are unassigned and do not allow it.
    ///
    /// The negation of this count is the init score of the solution.
    pub fn count_uninitialized_variables(&self, solution: &S) -> usize {
        self.entity_descriptors
            .iter()
            .map(|d| d.count_uninitialized_variables(solution))
            .sum()
    }

    /// Returns true if no genuine variable is left uninitialized.
    pub fn is_initialized(&self, solution: &S) -> bool {
        self.count_uninitialized_variables(solution) == 0
    }
}

impl<S> Clone for SolutionDescriptor<S> {
    fn clone(&self) -> Self {
        SolutionDescriptor {
            type_name: self.type_name,
            entity_descriptors: self.entity_descriptors.clone(),
        }
    }
}

impl<S> fmt::Debug for SolutionDescriptor<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SolutionDescriptor")
            .field("type_name", &self.type_name)
            .field("entity_descriptors", &self.entity_descriptors)
            .finish()
    }
}
