//! Singleton inverse supply: value -> the entity whose variable points at it.

use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;

use super::{Demand, DemandKey, Supply};

/// Maps each value to the single entity whose variable currently holds it.
///
/// Chained variables are the typical use: every anchor or entity has at
/// most one successor, so the inverse of `previous` is the successor.
pub struct SingletonInverseSupply<S, V> {
    descriptor_index: usize,
    variable_name: &'static str,
    entity_count: fn(&S) -> usize,
    value_of: fn(&S, usize) -> Option<V>,
    inverse: HashMap<V, usize>,
}

impl<S, V> SingletonInverseSupply<S, V>
where
    V: Clone + Eq + Hash,
{
    /// Returns the entity pointing at `value`.
    pub fn inverse_entity(&self, value: &V) -> Option<usize> {
        self.inverse.get(value).copied()
    }

    pub fn len(&self) -> usize {
        self.inverse.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inverse.is_empty()
    }

    fn tracks(&self, descriptor_index: usize, variable_name: &str) -> bool {
        self.descriptor_index == descriptor_index && self.variable_name == variable_name
    }
}

impl<S, V> Clone for SingletonInverseSupply<S, V>
where
    V: Clone,
{
    fn clone(&self) -> Self {
        SingletonInverseSupply {
            descriptor_index: self.descriptor_index,
            variable_name: self.variable_name,
            entity_count: self.entity_count,
            value_of: self.value_of,
            inverse: self.inverse.clone(),
        }
    }
}

impl<S, V: fmt::Debug> fmt::Debug for SingletonInverseSupply<S, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SingletonInverseSupply")
            .field("variable_name", &self.variable_name)
            .field("inverse", &self.inverse)
            .finish()
    }
}

impl<S, V> Supply<S> for SingletonInverseSupply<S, V>
where
    S: Send + Sync + 'static,
    V: Clone + Eq + Hash + Send + Sync + 'static,
{
    fn reset_working_solution(&mut self, solution: &S) {
        self.inverse.clear();
        for entity_index in 0..(self.entity_count)(solution) {
            if let Some(value) = (self.value_of)(solution, entity_index) {
                self.inverse.insert(value, entity_index);
            }
        }
    }

    fn before_variable_changed(
        &mut self,
        solution: &S,
        descriptor_index: usize,
        entity_index: usize,
        variable_name: &'static str,
    ) {
        if !self.tracks(descriptor_index, variable_name) {
            return;
        }
        if let Some(old) = (self.value_of)(solution, entity_index) {
            // Another entity may already have taken the value mid-move.
            if self.inverse.get(&old) == Some(&entity_index) {
                self.inverse.remove(&old);
            }
        }
    }

    fn after_variable_changed(
        &mut self,
        solution: &S,
        descriptor_index: usize,
        entity_index: usize,
        variable_name: &'static str,
    ) {
        if !self.tracks(descriptor_index, variable_name) {
            return;
        }
        if let Some(new) = (self.value_of)(solution, entity_index) {
            self.inverse.insert(new, entity_index);
        }
    }
}

/// Demand for a [`SingletonInverseSupply`].
pub struct SingletonInverseDemand<S, V> {
    descriptor_index: usize,
    variable_name: &'static str,
    entity_count: fn(&S) -> usize,
    value_of: fn(&S, usize) -> Option<V>,
}

impl<S, V> SingletonInverseDemand<S, V> {
    pub fn new(
        descriptor_index: usize,
        variable_name: &'static str,
        entity_count: fn(&S) -> usize,
        value_of: fn(&S, usize) -> Option<V>,
    ) -> Self {
        SingletonInverseDemand {
            descriptor_index,
            variable_name,
            entity_count,
            value_of,
        }
    }
}

impl<S, V> Demand<S> for SingletonInverseDemand<S, V>
where
    S: Send + Sync + 'static,
    V: Clone + Eq + Hash + Send + Sync + 'static,
{
    type Output = SingletonInverseSupply<S, V>;

    fn demand_key(&self) -> DemandKey {
        DemandKey::new::<SingletonInverseSupply<S, V>>(self.descriptor_index, self.variable_name)
    }

    fn create_supply(&self, solution: &S) -> Self::Output {
        let mut supply = SingletonInverseSupply {
            descriptor_index: self.descriptor_index,
            variable_name: self.variable_name,
            entity_count: self.entity_count,
            value_of: self.value_of,
            inverse: HashMap::new(),
        };
        supply.reset_working_solution(solution);
        supply
    }
}
