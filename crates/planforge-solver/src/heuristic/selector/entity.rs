//! Entity selectors for iterating over planning entities

use std::fmt::Debug;

use rand::{Rng, RngCore};

use planforge_core::PlanningSolution;
use planforge_scoring::ScoreDirector;

use super::{SelectionCacheType, SelectorLifecycle};

/// A reference to an entity within a solution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityReference {
    /// Index of the entity descriptor.
    pub descriptor_index: usize,
    /// Index of the entity within its collection.
    pub entity_index: usize,
}

impl EntityReference {
    pub fn new(descriptor_index: usize, entity_index: usize) -> Self {
        Self {
            descriptor_index,
            entity_index,
        }
    }
}

/// Trait for selecting entities from a planning solution.
pub trait EntitySelector<S: PlanningSolution>: SelectorLifecycle<S> + Send + Debug {
    /// Index of the entity descriptor the selector draws from.
    fn descriptor_index(&self) -> usize;

    /// Returns an iterator over entity references.
    ///
    /// A never-ending selector yields each underlying entity once here;
    /// draw from it with [`sample`](EntitySelector::sample).
    fn iter<'a>(
        &'a self,
        score_director: &'a dyn ScoreDirector<S>,
    ) -> Box<dyn Iterator<Item = EntityReference> + 'a>;

    /// Draws one entity, or `None` if there is nothing to select.
    fn sample(
        &self,
        score_director: &dyn ScoreDirector<S>,
        rng: &mut dyn RngCore,
    ) -> Option<EntityReference>;

    /// Returns the number of selectable entities.
    fn size(&self, score_director: &dyn ScoreDirector<S>) -> usize;

    fn is_never_ending(&self) -> bool {
        false
    }

    fn cache_type(&self) -> SelectionCacheType {
        SelectionCacheType::JustInTime
    }
}

/// Selects the entities of one descriptor in original order, skipping
/// pinned entities.
#[derive(Debug, Clone)]
pub struct FromSolutionEntitySelector {
    descriptor_index: usize,
    skip_pinned: bool,
}

impl FromSolutionEntitySelector {
    pub fn new(descriptor_index: usize) -> Self {
        Self {
            descriptor_index,
            skip_pinned: true,
        }
    }

    /// Includes pinned entities when `skip` is false.
    pub fn with_skip_pinned(mut self, skip: bool) -> Self {
        self.skip_pinned = skip;
        self
    }

    fn is_selectable<S: PlanningSolution>(
        &self,
        score_director: &dyn ScoreDirector<S>,
        entity_index: usize,
    ) -> bool {
        if !self.skip_pinned {
            return true;
        }
        score_director
            .solution_descriptor()
            .entity_descriptor(self.descriptor_index)
            .map_or(true, |d| {
                !d.is_pinned(score_director.working_solution(), entity_index)
            })
    }
}

impl<S: PlanningSolution> SelectorLifecycle<S> for FromSolutionEntitySelector {}

impl<S: PlanningSolution> EntitySelector<S> for FromSolutionEntitySelector {
    fn descriptor_index(&self) -> usize {
        self.descriptor_index
    }

    fn iter<'a>(
        &'a self,
        score_director: &'a dyn ScoreDirector<S>,
    ) -> Box<dyn Iterator<Item = EntityReference> + 'a> {
        let count = score_director.entity_count(self.descriptor_index);
        let descriptor_index = self.descriptor_index;
        Box::new(
            (0..count)
                .filter(move |&i| self.is_selectable(score_director, i))
                .map(move |i| EntityReference::new(descriptor_index, i)),
        )
    }

    fn sample(
        &self,
        score_director: &dyn ScoreDirector<S>,
        rng: &mut dyn RngCore,
    ) -> Option<EntityReference> {
        let count = score_director.entity_count(self.descriptor_index);
        if count == 0 {
            return None;
        }
        // Rejection sampling first; mostly pinned solutions fall through to
        // a draw over the selectable entities.
        for _ in 0..10 {
            let i = rng.random_range(0..count);
            if self.is_selectable(score_director, i) {
                return Some(EntityReference::new(self.descriptor_index, i));
            }
        }
        let selectable: Vec<usize> = (0..count)
            .filter(|&i| self.is_selectable(score_director, i))
            .collect();
        if selectable.is_empty() {
            return None;
        }
        let i = selectable[rng.random_range(0..selectable.len())];
        Some(EntityReference::new(self.descriptor_index, i))
    }

    fn size(&self, score_director: &dyn ScoreDirector<S>) -> usize {
        let count = score_director.entity_count(self.descriptor_index);
        (0..count)
            .filter(|&i| self.is_selectable(score_director, i))
            .count()
    }
}

impl<S: PlanningSolution> SelectorLifecycle<S> for Box<dyn EntitySelector<S>> {
    super::forward_lifecycle!(@boxed);
}

impl<S: PlanningSolution> EntitySelector<S> for Box<dyn EntitySelector<S>> {
    fn descriptor_index(&self) -> usize {
        (**self).descriptor_index()
    }

    fn iter<'a>(
        &'a self,
        score_director: &'a dyn ScoreDirector<S>,
    ) -> Box<dyn Iterator<Item = EntityReference> + 'a> {
        (**self).iter(score_director)
    }

    fn sample(
        &self,
        score_director: &dyn ScoreDirector<S>,
        rng: &mut dyn RngCore,
    ) -> Option<EntityReference> {
        (**self).sample(score_director, rng)
    }

    fn size(&self, score_director: &dyn ScoreDirector<S>) -> usize {
        (**self).size(score_director)
    }

    fn is_never_ending(&self) -> bool {
        (**self).is_never_ending()
    }

    fn cache_type(&self) -> SelectionCacheType {
        (**self).cache_type()
    }
}
