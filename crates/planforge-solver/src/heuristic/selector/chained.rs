//! Move selector for chained planning variables.

use std::fmt::Debug;
use std::hash::Hash;

use rand::RngCore;

use planforge_core::domain::{AnchorTailDemand, ChainLink, DemandKey};
use planforge_core::{PlanningSolution, Result};
use planforge_scoring::{ScoreDirector, ScoreDirectorExt};

use crate::heuristic::r#move::ChainedChangeMove;

use super::entity::EntitySelector;
use super::move_selector::MoveSelector;
use super::value::ValueSelector;
use super::SelectorLifecycle;

/// Generates [`ChainedChangeMove`]s: each entity placed behind each
/// candidate anchor or entity.
///
/// While a phase runs, the selector keeps an anchor/tail supply demanded on
/// the score director so moves can find successors without scanning.
pub struct ChainedChangeMoveSelector<S, A, ES, VS> {
    entity_selector: ES,
    value_selector: VS,
    entity_count: fn(&S) -> usize,
    getter: fn(&S, usize) -> Option<ChainLink<A>>,
    setter: fn(&mut S, usize, Option<ChainLink<A>>),
    descriptor_index: usize,
    variable_name: &'static str,
    random: bool,
    demand_key: Option<DemandKey>,
}

impl<S, A, ES: Debug, VS: Debug> Debug for ChainedChangeMoveSelector<S, A, ES, VS> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChainedChangeMoveSelector")
            .field("entity_selector", &self.entity_selector)
            .field("value_selector", &self.value_selector)
            .field("descriptor_index", &self.descriptor_index)
            .field("variable_name", &self.variable_name)
            .field("random", &self.random)
            .finish()
    }
}

impl<S, A, ES, VS> ChainedChangeMoveSelector<S, A, ES, VS> {
    pub fn new(
        entity_selector: ES,
        value_selector: VS,
        entity_count: fn(&S) -> usize,
        getter: fn(&S, usize) -> Option<ChainLink<A>>,
        setter: fn(&mut S, usize, Option<ChainLink<A>>),
        descriptor_index: usize,
        variable_name: &'static str,
    ) -> Self {
        Self {
            entity_selector,
            value_selector,
            entity_count,
            getter,
            setter,
            descriptor_index,
            variable_name,
            random: false,
            demand_key: None,
        }
    }

    pub fn with_random(mut self, random: bool) -> Self {
        self.random = random;
        self
    }

    fn chained_move(&self, entity_index: usize, to: ChainLink<A>) -> ChainedChangeMove<S, A> {
        ChainedChangeMove::new(
            self.descriptor_index,
            entity_index,
            Some(to),
            self.getter,
            self.setter,
            self.variable_name,
        )
    }
}

impl<S, A, ES, VS> SelectorLifecycle<S> for ChainedChangeMoveSelector<S, A, ES, VS>
where
    S: PlanningSolution,
    A: Clone + Eq + Hash + Send + Sync + 'static,
    ES: EntitySelector<S>,
    VS: ValueSelector<S, ChainLink<A>>,
{
    fn solving_started(
        &mut self,
        score_director: &mut dyn ScoreDirector<S>,
        rng: &mut dyn RngCore,
    ) -> Result<()> {
        self.entity_selector.solving_started(score_director, rng)?;
        self.value_selector.solving_started(score_director, rng)
    }

    fn phase_started(
        &mut self,
        score_director: &mut dyn ScoreDirector<S>,
        rng: &mut dyn RngCore,
    ) -> Result<()> {
        let demand = AnchorTailDemand::new(
            self.descriptor_index,
            self.variable_name,
            self.entity_count,
            self.getter,
        );
        self.demand_key = Some(score_director.demand(&demand));
        self.entity_selector.phase_started(score_director, rng)?;
        self.value_selector.phase_started(score_director, rng)
    }

    fn step_started(
        &mut self,
        score_director: &mut dyn ScoreDirector<S>,
        rng: &mut dyn RngCore,
    ) -> Result<()> {
        self.entity_selector.step_started(score_director, rng)?;
        self.value_selector.step_started(score_director, rng)
    }

    fn step_ended(&mut self, score_director: &mut dyn ScoreDirector<S>) -> Result<()> {
        self.entity_selector.step_ended(score_director)?;
        self.value_selector.step_ended(score_director)
    }

    fn phase_ended(&mut self, score_director: &mut dyn ScoreDirector<S>) -> Result<()> {
        self.entity_selector.phase_ended(score_director)?;
        self.value_selector.phase_ended(score_director)?;
        if let Some(key) = self.demand_key.take() {
            score_director.cancel_demand(&key)?;
        }
        Ok(())
    }

    fn solving_ended(&mut self, score_director: &mut dyn ScoreDirector<S>) -> Result<()> {
        self.entity_selector.solving_ended(score_director)?;
        self.value_selector.solving_ended(score_director)
    }
}

impl<S, A, ES, VS> MoveSelector<S, ChainedChangeMove<S, A>>
    for ChainedChangeMoveSelector<S, A, ES, VS>
where
    S: PlanningSolution,
    A: Clone + Eq + Hash + Send + Sync + Debug + 'static,
    ES: EntitySelector<S>,
    VS: ValueSelector<S, ChainLink<A>>,
{
    fn iter_moves<'a>(
        &'a self,
        score_director: &'a dyn ScoreDirector<S>,
    ) -> Box<dyn Iterator<Item = ChainedChangeMove<S, A>> + 'a> {
        Box::new(
            self.entity_selector
                .iter(score_director)
                .flat_map(move |entity| {
                    self.value_selector
                        .iter(score_director, entity)
                        .filter(move |to| *to != ChainLink::Entity(entity.entity_index))
                        .map(move |to| self.chained_move(entity.entity_index, to))
                }),
        )
    }

    fn sample_move(
        &self,
        score_director: &dyn ScoreDirector<S>,
        rng: &mut dyn RngCore,
    ) -> Option<ChainedChangeMove<S, A>> {
        let entity = self.entity_selector.sample(score_director, rng)?;
        let to = self.value_selector.sample(score_director, entity, rng)?;
        if to == ChainLink::Entity(entity.entity_index) {
            return None;
        }
        Some(self.chained_move(entity.entity_index, to))
    }

    fn size(&self, score_director: &dyn ScoreDirector<S>) -> usize {
        self.entity_selector
            .iter(score_director)
            .map(|entity| self.value_selector.size(score_director, entity))
            .sum()
    }

    fn is_never_ending(&self) -> bool {
        self.random
            || self.entity_selector.is_never_ending()
            || self.value_selector.is_never_ending()
    }
}
