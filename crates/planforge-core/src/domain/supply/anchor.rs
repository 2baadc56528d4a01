//! Anchor/tail supply for chained variables.
//!
//! A chained variable points either at an anchor (the chain root, e.g. a
//! vehicle) or at another entity of the same type. The supply keeps an
//! explicit successor table and the tail entity of each anchor's chain, so
//! moves can find "what follows this link" and "where does this chain end"
//! without scanning every entity.

use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;

use super::{Demand, DemandKey, Supply};

/// The value of a chained variable: an anchor or an entity index.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ChainLink<A> {
    Anchor(A),
    Entity(usize),
}

/// Successor table and chain tails for one chained variable.
pub struct AnchorTailSupply<S, A> {
    descriptor_index: usize,
    variable_name: &'static str,
    entity_count: fn(&S) -> usize,
    previous: fn(&S, usize) -> Option<ChainLink<A>>,
    successors: HashMap<ChainLink<A>, usize>,
    tails: HashMap<A, usize>,
    dirty: Vec<A>,
}

impl<S, A> AnchorTailSupply<S, A>
where
    A: Clone + Eq + Hash,
{
    /// Returns the entity whose chained variable points at `link`.
    pub fn successor_of(&self, link: &ChainLink<A>) -> Option<usize> {
        self.successors.get(link).copied()
    }

    /// Returns the last entity of the anchor's chain, or `None` if the
    /// chain is empty.
    pub fn tail_of(&self, anchor: &A) -> Option<usize> {
        self.tails.get(anchor).copied()
    }

    /// Returns the anchor at the root of the entity's chain.
    ///
    /// Walks the `previous` links in the solution; returns `None` for an
    /// unassigned entity or a broken chain.
    pub fn anchor_of(&self, solution: &S, entity_index: usize) -> Option<A> {
        let limit = (self.entity_count)(solution);
        let mut current = entity_index;
        for _ in 0..=limit {
            match (self.previous)(solution, current)? {
                ChainLink::Anchor(anchor) => return Some(anchor),
                ChainLink::Entity(previous) => current = previous,
            }
        }
        None
    }

    /// Returns the entities of the anchor's chain, from the anchor outward.
    pub fn chain_of(&self, anchor: &A) -> Vec<usize> {
        let mut chain = Vec::new();
        let mut link = ChainLink::Anchor(anchor.clone());
        while let Some(next) = self.successor_of(&link) {
            if chain.len() > self.successors.len() {
                break;
            }
            chain.push(next);
            link = ChainLink::Entity(next);
        }
        chain
    }

    fn tracks(&self, descriptor_index: usize, variable_name: &str) -> bool {
        self.descriptor_index == descriptor_index && self.variable_name == variable_name
    }

    fn refresh_dirty_tails(&mut self) {
        let mut dirty = std::mem::take(&mut self.dirty);
        dirty.dedup();
        for anchor in dirty.drain(..) {
            match self.chain_of(&anchor).last() {
                Some(&tail) => {
                    self.tails.insert(anchor, tail);
                }
                None => {
                    self.tails.remove(&anchor);
                }
            }
        }
        self.dirty = dirty;
    }
}

impl<S, A: Clone> Clone for AnchorTailSupply<S, A> {
    fn clone(&self) -> Self {
        AnchorTailSupply {
            descriptor_index: self.descriptor_index,
            variable_name: self.variable_name,
            entity_count: self.entity_count,
            previous: self.previous,
            successors: self.successors.clone(),
            tails: self.tails.clone(),
            dirty: Vec::new(),
        }
    }
}

impl<S, A: fmt::Debug> fmt::Debug for AnchorTailSupply<S, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnchorTailSupply")
            .field("variable_name", &self.variable_name)
            .field("successors", &self.successors)
            .field("tails", &self.tails)
            .finish()
    }
}

impl<S, A> Supply<S> for AnchorTailSupply<S, A>
where
    S: Send + Sync + 'static,
    A: Clone + Eq + Hash + Send + Sync + 'static,
{
    fn reset_working_solution(&mut self, solution: &S) {
        self.successors.clear();
        self.tails.clear();
        let mut anchors = Vec::new();
        for entity_index in 0..(self.entity_count)(solution) {
            if let Some(link) = (self.previous)(solution, entity_index) {
                if let ChainLink::Anchor(anchor) = &link {
                    anchors.push(anchor.clone());
                }
                self.successors.insert(link, entity_index);
            }
        }
        self.dirty = anchors;
        self.refresh_dirty_tails();
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
        if let Some(old) = (self.previous)(solution, entity_index) {
            // Mid-move another entity may already have taken this link.
            if self.successors.get(&old) == Some(&entity_index) {
                self.successors.remove(&old);
            }
        }
        if let Some(anchor) = self.anchor_of(solution, entity_index) {
            self.dirty.push(anchor);
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
        if let Some(new) = (self.previous)(solution, entity_index) {
            self.successors.insert(new, entity_index);
        }
        if let Some(anchor) = self.anchor_of(solution, entity_index) {
            self.dirty.push(anchor);
        }
        self.refresh_dirty_tails();
    }
}

/// Demand for an [`AnchorTailSupply`].
pub struct AnchorTailDemand<S, A> {
    descriptor_index: usize,
    variable_name: &'static str,
    entity_count: fn(&S) -> usize,
    previous: fn(&S, usize) -> Option<ChainLink<A>>,
}

impl<S, A> AnchorTailDemand<S, A> {
    pub fn new(
        descriptor_index: usize,
        variable_name: &'static str,
        entity_count: fn(&S) -> usize,
        previous: fn(&S, usize) -> Option<ChainLink<A>>,
    ) -> Self {
        AnchorTailDemand {
            descriptor_index,
            variable_name,
            entity_count,
            previous,
        }
    }
}

impl<S, A> Demand<S> for AnchorTailDemand<S, A>
where
    S: Send + Sync + 'static,
    A: Clone + Eq + Hash + Send + Sync + 'static,
{
    type Output = AnchorTailSupply<S, A>;

    fn demand_key(&self) -> DemandKey {
        DemandKey::new::<AnchorTailSupply<S, A>>(self.descriptor_index, self.variable_name)
    }

    fn create_supply(&self, solution: &S) -> Self::Output {
        let mut supply = AnchorTailSupply {
            descriptor_index: self.descriptor_index,
            variable_name: self.variable_name,
            entity_count: self.entity_count,
            previous: self.previous,
            successors: HashMap::new(),
            tails: HashMap::new(),
            dirty: Vec::new(),
        };
        supply.reset_working_solution(solution);
        supply
    }
}
