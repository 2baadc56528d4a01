//! Supply infrastructure for variable relationship tracking.
//!
//! Supplies are derived views of the working solution, such as inverse
//! relationships (who points to whom) or chain tails, kept current through
//! the same before/after notifications the score director receives.
//!
//! # Architecture
//!
//! - [`Supply`]: A derived view that observes variable changes
//! - [`Demand`]: A request for a supply; equal demand keys share one instance
//! - [`SupplyManager`]: Reference-counted registry owned by one score director

mod anchor;
mod inverse;

#[cfg(test)]
mod tests;

pub use anchor::{AnchorTailDemand, AnchorTailSupply, ChainLink};
pub use inverse::{SingletonInverseDemand, SingletonInverseSupply};

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;

use crate::error::{PlanForgeError, Result};

/// A derived view of the working solution.
///
/// Every hook receives the solution in the state matching the notification:
/// before hooks see the old value, after hooks the new one. Entity additions
/// and removals shift indices, so by default they rebuild the view.
pub trait Supply<S>: SupplyObject<S> + Send + Sync + 'static {
    /// Rebuilds the view from scratch.
    fn reset_working_solution(&mut self, solution: &S);

    fn before_variable_changed(
        &mut self,
        _solution: &S,
        _descriptor_index: usize,
        _entity_index: usize,
        _variable_name: &'static str,
    ) {
    }

    fn after_variable_changed(
        &mut self,
        _solution: &S,
        _descriptor_index: usize,
        _entity_index: usize,
        _variable_name: &'static str,
    ) {
    }

    fn after_entity_added(&mut self, solution: &S, _descriptor_index: usize, _entity_index: usize) {
        self.reset_working_solution(solution);
    }

    fn after_entity_removed(
        &mut self,
        solution: &S,
        _descriptor_index: usize,
        _entity_index: usize,
    ) {
        self.reset_working_solution(solution);
    }
}

/// Object-safety helpers implemented for every `Clone` supply.
pub trait SupplyObject<S> {
    fn clone_box(&self) -> Box<dyn Supply<S>>;
    fn as_any(&self) -> &dyn Any;
}

impl<S: 'static, T> SupplyObject<S> for T
where
    T: Supply<S> + Clone,
{
    fn clone_box(&self) -> Box<dyn Supply<S>> {
        Box::new(self.clone())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// A request for a specific supply.
///
/// The manager uses the demand key to share supplies: two demands with
/// equal keys get the same instance.
pub trait Demand<S> {
    /// The type of supply this demand requests.
    type Output: Supply<S>;

    /// Returns the key identifying this demand.
    fn demand_key(&self) -> DemandKey;

    /// Creates the supply, already built from the solution.
    fn create_supply(&self, solution: &S) -> Self::Output;
}

/// A unique key identifying a supply demand.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DemandKey {
    /// The type of supply being requested.
    pub supply_type: TypeId,
    /// The entity descriptor owning the tracked variable.
    pub descriptor_index: usize,
    /// The tracked variable.
    pub variable_name: &'static str,
    /// Optional discriminator for several supplies of one type and variable.
    pub discriminator: Option<&'static str>,
}

impl DemandKey {
    pub fn new<T: 'static>(descriptor_index: usize, variable_name: &'static str) -> Self {
        DemandKey {
            supply_type: TypeId::of::<T>(),
            descriptor_index,
            variable_name,
            discriminator: None,
        }
    }

    pub fn with_discriminator(mut self, discriminator: &'static str) -> Self {
        self.discriminator = Some(discriminator);
        self
    }
}

struct SupplyEntry<S> {
    supply: Box<dyn Supply<S>>,
    active_count: usize,
}

/// Registry of active supplies for one score director.
///
/// Each demand increments a reference count; the supply is evicted when
/// the last demand is cancelled.
pub struct SupplyManager<S> {
    supplies: HashMap<DemandKey, SupplyEntry<S>>,
}

impl<S: 'static> SupplyManager<S> {
    pub fn new() -> Self {
        SupplyManager {
            supplies: HashMap::new(),
        }
    }

    /// Registers a demand, creating the supply on first use.
    ///
    /// Returns the key to pass to [`get`](Self::get) and [`cancel`](Self::cancel).
    pub fn demand<D: Demand<S>>(&mut self, demand: &D, solution: &S) -> DemandKey {
        let key = demand.demand_key();
        self.supplies
            .entry(key.clone())
            .and_modify(|entry| entry.active_count += 1)
            .or_insert_with(|| SupplyEntry {
                supply: Box::new(demand.create_supply(solution)),
                active_count: 1,
            });
        key
    }

    /// Cancels one demand; returns true if the supply was evicted.
    pub fn cancel(&mut self, key: &DemandKey) -> Result<bool> {
        let entry = self.supplies.get_mut(key).ok_or_else(|| {
            PlanForgeError::InvalidState(format!(
                "Cancelled demand on variable '{}' has no active supply",
                key.variable_name
            ))
        })?;
        entry.active_count -= 1;
        if entry.active_count == 0 {
            self.supplies.remove(key);
            return Ok(true);
        }
        Ok(false)
    }

    /// Gets an active supply by key.
    ///
    /// Returns `None` if no demand is active or the type does not match.
    pub fn get<T: Supply<S>>(&self, key: &DemandKey) -> Option<&T> {
        self.supplies
            .get(key)
            .and_then(|entry| entry.supply.as_any().downcast_ref::<T>())
    }

    /// Returns how many demands share the supply.
    pub fn active_count(&self, key: &DemandKey) -> usize {
        self.supplies.get(key).map_or(0, |entry| entry.active_count)
    }

    /// Rebuilds every supply against a new working solution.
    pub fn reset_working_solution(&mut self, solution: &S) {
        for entry in self.supplies.values_mut() {
            entry.supply.reset_working_solution(solution);
        }
    }

    pub fn before_variable_changed(
        &mut self,
        solution: &S,
        descriptor_index: usize,
        entity_index: usize,
        variable_name: &'static str,
    ) {
        for entry in self.supplies.values_mut() {
            entry.supply.before_variable_changed(
                solution,
                descriptor_index,
                entity_index,
                variable_name,
            );
        }
    }

    pub fn after_variable_changed(
        &mut self,
        solution: &S,
        descriptor_index: usize,
        entity_index: usize,
        variable_name: &'static str,
    ) {
        for entry in self.supplies.values_mut() {
            entry.supply.after_variable_changed(
                solution,
                descriptor_index,
                entity_index,
                variable_name,
            );
        }
    }

    pub fn after_entity_added(&mut self, solution: &S, descriptor_index: usize, entity_index: usize) {
        for entry in self.supplies.values_mut() {
            entry
                .supply
                .after_entity_added(solution, descriptor_index, entity_index);
        }
    }

    pub fn after_entity_removed(
        &mut self,
        solution: &S,
        descriptor_index: usize,
        entity_index: usize,
    ) {
        for entry in self.supplies.values_mut() {
            entry
                .supply
                .after_entity_removed(solution, descriptor_index, entity_index);
        }
    }

    /// Clears all supplies from the manager.
    pub fn clear(&mut self) {
        self.supplies.clear();
    }

    /// Returns the number of active supplies.
    pub fn len(&self) -> usize {
        self.supplies.len()
    }

    /// Returns true if no supplies are active.
    pub fn is_empty(&self) -> bool {
        self.supplies.is_empty()
    }
}

impl<S: 'static> Default for SupplyManager<S> {
    fn default() -> Self {
        SupplyManager::new()
    }
}

impl<S: 'static> Clone for SupplyManager<S> {
    fn clone(&self) -> Self {
        SupplyManager {
            supplies: self
                .supplies
                .iter()
                .map(|(key, entry)| {
                    let entry = SupplyEntry {
                        supply: entry.supply.clone_box(),
                        active_count: entry.active_count,
                    };
                    (key.clone(), entry)
                })
                .collect(),
        }
    }
}

impl<S> fmt::Debug for SupplyManager<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SupplyManager")
            .field("supply_count", &self.supplies.len())
            .finish()
    }
}
