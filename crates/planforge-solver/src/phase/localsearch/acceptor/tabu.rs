//! Tabu acceptors.
//!
//! Each acceptor keeps a tabu list of the attributes of recent steps: the
//! entities they changed, the values they assigned, or the moves
//! themselves. An attribute stays tabu for the `tabu_size` steps after the
//! step that introduced it. A tabu move
//! is rejected unless aspiration is enabled and the move beats the best
//! score.

use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;

use rand::RngCore;

use planforge_core::Score;

use super::{Acceptor, MoveCandidate, StepOutcome};
use crate::heuristic::selector::EntityReference;

/// Attribute keys with the step index that made them tabu.
#[derive(Debug, Clone)]
struct TabuList<K> {
    tabu_size: u64,
    entries: HashMap<K, u64>,
}

impl<K: Hash + Eq + Copy> TabuList<K> {
    fn new(tabu_size: usize) -> Self {
        Self {
            tabu_size: tabu_size.max(1) as u64,
            entries: HashMap::new(),
        }
    }

    fn is_tabu(&self, key: &K, step_index: u64) -> bool {
        self.entries
            .get(key)
            .is_some_and(|&added| step_index.saturating_sub(added) <= self.tabu_size)
    }

    fn any_tabu<'a>(&self, keys: impl IntoIterator<Item = &'a K>, step_index: u64) -> bool
    where
        K: 'a,
    {
        keys.into_iter().any(|key| self.is_tabu(key, step_index))
    }

    fn add(&mut self, key: K, step_index: u64) {
        self.entries.insert(key, step_index);
    }

    /// Drops the entries that are no longer tabu at `next_step_index`.
    fn expire(&mut self, next_step_index: u64) {
        let tabu_size = self.tabu_size;
        self.entries
            .retain(|_, added| next_step_index.saturating_sub(*added) <= tabu_size);
    }

    fn len(&self) -> usize {
        self.entries.len()
    }

    fn clear(&mut self) {
        self.entries.clear();
    }
}

fn accept_tabu<Sc: Score>(tabu: bool, aspiration_enabled: bool, candidate: &MoveCandidate<'_, Sc>) -> bool {
    if !tabu {
        return true;
    }
    aspiration_enabled && candidate.score > candidate.best_score
}

/// Makes the entities changed by each step tabu.
///
/// # Example
///
/// ```
/// use planforge_solver::phase::localsearch::EntityTabuAcceptor;
///
/// let acceptor = EntityTabuAcceptor::new(7);
/// assert_eq!(acceptor.tabu_count(), 0);
/// ```
#[derive(Debug, Clone)]
pub struct EntityTabuAcceptor {
    tabu_list: TabuList<EntityReference>,
    aspiration_enabled: bool,
}

impl EntityTabuAcceptor {
    pub fn new(entity_tabu_size: usize) -> Self {
        Self {
            tabu_list: TabuList::new(entity_tabu_size),
            aspiration_enabled: true,
        }
    }

    pub fn with_aspiration(mut self, enabled: bool) -> Self {
        self.aspiration_enabled = enabled;
        self
    }

    /// Number of entities currently on the tabu list.
    pub fn tabu_count(&self) -> usize {
        self.tabu_list.len()
    }
}

impl<Sc: Score> Acceptor<Sc> for EntityTabuAcceptor {
    fn phase_started(&mut self, _best_score: Sc) {
        self.tabu_list.clear();
    }

    fn is_accepted(&mut self, candidate: &MoveCandidate<'_, Sc>, _rng: &mut dyn RngCore) -> bool {
        let tabu = self
            .tabu_list
            .any_tabu(&candidate.tabu.entities, candidate.step_index);
        accept_tabu(tabu, self.aspiration_enabled, candidate)
    }

    fn step_ended(&mut self, outcome: &StepOutcome<'_, Sc>) {
        for entity in &outcome.tabu.entities {
            self.tabu_list.add(*entity, outcome.step_index);
        }
        self.tabu_list.expire(outcome.step_index + 1);
    }

    fn phase_ended(&mut self) {
        self.tabu_list.clear();
    }

    fn needs_tabu_attributes(&self) -> bool {
        true
    }
}

/// Makes the values assigned by each step tabu.
#[derive(Debug, Clone)]
pub struct ValueTabuAcceptor {
    tabu_list: TabuList<u64>,
    aspiration_enabled: bool,
}

impl ValueTabuAcceptor {
    pub fn new(value_tabu_size: usize) -> Self {
        Self {
            tabu_list: TabuList::new(value_tabu_size),
            aspiration_enabled: true,
        }
    }

    pub fn with_aspiration(mut self, enabled: bool) -> Self {
        self.aspiration_enabled = enabled;
        self
    }

    pub fn tabu_count(&self) -> usize {
        self.tabu_list.len()
    }
}

impl<Sc: Score> Acceptor<Sc> for ValueTabuAcceptor {
    fn phase_started(&mut self, _best_score: Sc) {
        self.tabu_list.clear();
    }

    fn is_accepted(&mut self, candidate: &MoveCandidate<'_, Sc>, _rng: &mut dyn RngCore) -> bool {
        let tabu = self
            .tabu_list
            .any_tabu(&candidate.tabu.values, candidate.step_index);
        accept_tabu(tabu, self.aspiration_enabled, candidate)
    }

    fn step_ended(&mut self, outcome: &StepOutcome<'_, Sc>) {
        for value in &outcome.tabu.values {
            self.tabu_list.add(*value, outcome.step_index);
        }
        self.tabu_list.expire(outcome.step_index + 1);
    }

    fn phase_ended(&mut self) {
        self.tabu_list.clear();
    }

    fn needs_tabu_attributes(&self) -> bool {
        true
    }
}

/// Makes each step's move tabu, and optionally its undo move.
///
/// With `undo_move_tabu` the search cannot immediately revert a step.
#[derive(Debug, Clone)]
pub struct MoveTabuAcceptor {
    tabu_list: TabuList<u64>,
    undo_move_tabu: bool,
    aspiration_enabled: bool,
}

impl MoveTabuAcceptor {
    pub fn new(move_tabu_size: usize) -> Self {
        Self {
            tabu_list: TabuList::new(move_tabu_size),
            undo_move_tabu: false,
            aspiration_enabled: true,
        }
    }

    pub fn with_undo_move_tabu(mut self, enabled: bool) -> Self {
        self.undo_move_tabu = enabled;
        self
    }

    pub fn with_aspiration(mut self, enabled: bool) -> Self {
        self.aspiration_enabled = enabled;
        self
    }

    pub fn tabu_count(&self) -> usize {
        self.tabu_list.len()
    }
}

impl<Sc: Score> Acceptor<Sc> for MoveTabuAcceptor {
    fn phase_started(&mut self, _best_score: Sc) {
        self.tabu_list.clear();
    }

    fn is_accepted(&mut self, candidate: &MoveCandidate<'_, Sc>, _rng: &mut dyn RngCore) -> bool {
        let tabu = self
            .tabu_list
            .is_tabu(&candidate.tabu.move_hash, candidate.step_index);
        accept_tabu(tabu, self.aspiration_enabled, candidate)
    }

    fn step_ended(&mut self, outcome: &StepOutcome<'_, Sc>) {
        self.tabu_list.add(outcome.tabu.move_hash, outcome.step_index);
        if self.undo_move_tabu {
            if let Some(undo_hash) = outcome.tabu.undo_move_hash {
                self.tabu_list.add(undo_hash, outcome.step_index);
            }
        }
        self.tabu_list.expire(outcome.step_index + 1);
    }

    fn phase_ended(&mut self) {
        self.tabu_list.clear();
    }

    fn needs_tabu_attributes(&self) -> bool {
        true
    }
}
