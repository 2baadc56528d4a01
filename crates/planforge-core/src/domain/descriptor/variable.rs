//! Variable descriptor.

use std::fmt;

/// The kind of a planning variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VariableType {
    /// A basic genuine variable, changed by moves.
    Genuine,
    /// A genuine variable whose value is an anchor or another entity of the
    /// same type, forming chains rooted at anchors.
    Chained,
    /// A derived variable kept current by a variable listener.
    Shadow,
}

impl VariableType {
    pub fn is_genuine(&self) -> bool {
        matches!(self, VariableType::Genuine | VariableType::Chained)
    }

    pub fn is_chained(&self) -> bool {
        matches!(self, VariableType::Chained)
    }

    pub fn is_shadow(&self) -> bool {
        matches!(self, VariableType::Shadow)
    }
}

/// Describes one planning variable of an entity type.
///
/// The `is_assigned` check reads the variable on the entity at the given
/// index. Shadow variables have no check: they are never counted as
/// uninitialized.
pub struct VariableDescriptor<S> {
    name: &'static str,
    variable_type: VariableType,
    allows_unassigned: bool,
    is_assigned: Option<fn(&S, usize) -> bool>,
    value_range_provider: Option<&'static str>,
    sources: Vec<&'static str>,
}

impl<S> VariableDescriptor<S> {
    /// Creates a basic genuine variable descriptor.
    pub fn genuine(name: &'static str, is_assigned: fn(&S, usize) -> bool) -> Self {
        VariableDescriptor {
            name,
            variable_type: VariableType::Genuine,
            allows_unassigned: false,
            is_assigned: Some(is_assigned),
            value_range_provider: None,
            sources: Vec::new(),
        }
    }

    /// Creates a chained variable descriptor.
    ///
    /// For example in vehicle routing: Vehicle <- Customer1 <- Customer2.
    pub fn chained(name: &'static str, is_assigned: fn(&S, usize) -> bool) -> Self {
        VariableDescriptor {
            variable_type: VariableType::Chained,
            ..VariableDescriptor::genuine(name, is_assigned)
        }
    }

    /// Creates a shadow variable descriptor watching the given source variables.
    pub fn shadow(name: &'static str, sources: &[&'static str]) -> Self {
        VariableDescriptor {
            name,
            variable_type: VariableType::Shadow,
            allows_unassigned: true,
            is_assigned: None,
            value_range_provider: None,
            sources: sources.to_vec(),
        }
    }

    /// Lets the variable stay unassigned in a complete solution.
    pub fn with_allows_unassigned(mut self, allows_unassigned: bool) -> Self {
        self.allows_unassigned = allows_unassigned;
        self
    }

    /// Names the value range provider feeding this variable.
    pub fn with_value_range_provider(mut self, provider: &'static str) -> Self {
        self.value_range_provider = Some(provider);
        self
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn variable_type(&self) -> VariableType {
        self.variable_type
    }

    pub fn is_genuine(&self) -> bool {
        self.variable_type.is_genuine()
    }

    pub fn is_chained(&self) -> bool {
        self.variable_type.is_chained()
    }

    pub fn is_shadow(&self) -> bool {
        self.variable_type.is_shadow()
    }

    pub fn allows_unassigned(&self) -> bool {
        self.allows_unassigned
    }

    pub fn value_range_provider(&self) -> Option<&'static str> {
        self.value_range_provider
    }

    /// Source variables a shadow variable is derived from.
    pub fn sources(&self) -> &[&'static str] {
        &self.sources
    }

    /// Returns true if the variable currently holds a value on the entity.
    pub fn is_assigned(&self, solution: &S, entity_index: usize) -> bool {
        self.is_assigned
            .map_or(true, |check| check(solution, entity_index))
    }

    /// Returns true if the variable counts as initialized on the entity.
    ///
    /// A variable that allows unassigned values is always initialized.
    pub fn is_initialized(&self, solution: &S, entity_index: usize) -> bool {
        !self.is_genuine() || self.allows_unassigned || self.is_assigned(solution, entity_index)
    }
}

impl<S> Clone for VariableDescriptor<S> {
    fn clone(&self) -> Self {
        VariableDescriptor {
            name: self.name,
            variable_type: self.variable_type,
            allows_unassigned: self.allows_unassigned,
            is_assigned: self.is_assigned,
            value_range_provider: self.value_range_provider,
            sources: self.sources.clone(),
        }
    }
}

impl<S> fmt::Debug for VariableDescriptor<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VariableDescriptor")
            .field("name", &self.name)
            .field("variable_type", &self.variable_type)
            .field("allows_unassigned", &self.allows_unassigned)
            .field("sources", &self.sources)
            .finish()
    }
}
