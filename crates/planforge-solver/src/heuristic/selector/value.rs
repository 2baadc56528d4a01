//! Value selectors for planning variables.
//!
//! A value selector yields the candidate values of one variable for a given
//! entity. Solution-level selectors draw from a range that is the same for
//! every entity; entity-dependent selectors compute the range per entity.

use std::fmt::{self, Debug};
use std::sync::Arc;

use rand::{Rng, RngCore};

use planforge_core::domain::{CountableValueRange, ValueRange};
use planforge_core::PlanningSolution;
use planforge_scoring::ScoreDirector;

use super::{EntityReference, SelectionCacheType, SelectorLifecycle};

/// Trait for selecting values of a planning variable.
pub trait ValueSelector<S: PlanningSolution, V>: SelectorLifecycle<S> + Send + Debug {
    /// Returns the values for the given entity.
    ///
    /// A never-ending selector over an uncountable range yields nothing
    /// here; draw from it with [`sample`](ValueSelector::sample).
    fn iter<'a>(
        &'a self,
        score_director: &'a dyn ScoreDirector<S>,
        entity: EntityReference,
    ) -> Box<dyn Iterator<Item = V> + 'a>;

    fn sample(
        &self,
        score_director: &dyn ScoreDirector<S>,
        entity: EntityReference,
        rng: &mut dyn RngCore,
    ) -> Option<V>;

    fn size(&self, score_director: &dyn ScoreDirector<S>, entity: EntityReference) -> usize;

    fn is_never_ending(&self) -> bool {
        false
    }

    /// Returns true if the values do not depend on the entity.
    fn is_entity_independent(&self) -> bool {
        true
    }

    fn cache_type(&self) -> SelectionCacheType {
        SelectionCacheType::JustInTime
    }
}

type CountableProvider<S, V> =
    Arc<dyn Fn(&S) -> Box<dyn CountableValueRange<V>> + Send + Sync>;
type UncountableProvider<S, V> = Arc<dyn Fn(&S) -> Box<dyn ValueRange<V>> + Send + Sync>;

enum RangeProvider<S, V> {
    Countable(CountableProvider<S, V>),
    Uncountable(UncountableProvider<S, V>),
}

impl<S, V> Clone for RangeProvider<S, V> {
    fn clone(&self) -> Self {
        match self {
            RangeProvider::Countable(p) => RangeProvider::Countable(Arc::clone(p)),
            RangeProvider::Uncountable(p) => RangeProvider::Uncountable(Arc::clone(p)),
        }
    }
}

/// Iterates an owned countable range in original order.
struct OwnedRangeIter<V> {
    range: Box<dyn CountableValueRange<V>>,
    index: u64,
    size: u64,
}

impl<V> Iterator for OwnedRangeIter<V> {
    type Item = V;

    fn next(&mut self) -> Option<V> {
        if self.index >= self.size {
            return None;
        }
        let value = self.range.get(self.index);
        self.index += 1;
        value
    }
}

/// Selects values from a solution-level value range provider.
///
/// # Example
///
/// ```
/// use planforge_core::domain::ListValueRange;
/// use planforge_solver::heuristic::selector::FromSolutionValueSelector;
///
/// struct Board { n: usize }
///
/// let selector = FromSolutionValueSelector::countable(|b: &Board| {
///     (0..b.n as i64).collect::<ListValueRange<i64>>()
/// });
/// assert!(!selector.is_random());
/// ```
pub struct FromSolutionValueSelector<S, V> {
    provider: RangeProvider<S, V>,
    random: bool,
}

impl<S: 'static, V: 'static> FromSolutionValueSelector<S, V> {
    /// Selects from a countable range computed from the solution.
    pub fn countable<R, F>(provider: F) -> Self
    where
        R: CountableValueRange<V> + 'static,
        F: Fn(&S) -> R + Send + Sync + 'static,
    {
        Self {
            provider: RangeProvider::Countable(Arc::new(move |s: &S| {
                Box::new(provider(s)) as Box<dyn CountableValueRange<V>>
            })),
            random: false,
        }
    }

    /// Selects from an uncountable range; the selector is never ending.
    pub fn uncountable<R, F>(provider: F) -> Self
    where
        R: ValueRange<V> + 'static,
        F: Fn(&S) -> R + Send + Sync + 'static,
    {
        Self {
            provider: RangeProvider::Uncountable(Arc::new(move |s: &S| {
                Box::new(provider(s)) as Box<dyn ValueRange<V>>
            })),
            random: true,
        }
    }

    /// Draws values at random; the selector becomes never ending.
    pub fn with_random(mut self, random: bool) -> Self {
        self.random = random || matches!(self.provider, RangeProvider::Uncountable(_));
        self
    }

    pub fn is_random(&self) -> bool {
        self.random
    }
}

impl<S, V> Clone for FromSolutionValueSelector<S, V> {
    fn clone(&self) -> Self {
        Self {
            provider: self.provider.clone(),
            random: self.random,
        }
    }
}

impl<S, V> Debug for FromSolutionValueSelector<S, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self.provider {
            RangeProvider::Countable(_) => "countable",
            RangeProvider::Uncountable(_) => "uncountable",
        };
        f.debug_struct("FromSolutionValueSelector")
            .field("range", &kind)
            .field("random", &self.random)
            .finish()
    }
}

impl<S: PlanningSolution, V> SelectorLifecycle<S> for FromSolutionValueSelector<S, V> {}

impl<S, V> ValueSelector<S, V> for FromSolutionValueSelector<S, V>
where
    S: PlanningSolution,
    V: Send + 'static,
{
    fn iter<'a>(
        &'a self,
        score_director: &'a dyn ScoreDirector<S>,
        _entity: EntityReference,
    ) -> Box<dyn Iterator<Item = V> + 'a> {
        match &self.provider {
            RangeProvider::Countable(provider) => {
                let range = provider(score_director.working_solution());
                let size = range.size();
                Box::new(OwnedRangeIter {
                    range,
                    index: 0,
                    size,
                })
            }
            RangeProvider::Uncountable(_) => Box::new(std::iter::empty()),
        }
    }

    fn sample(
        &self,
        score_director: &dyn ScoreDirector<S>,
        _entity: EntityReference,
        rng: &mut dyn RngCore,
    ) -> Option<V> {
        match &self.provider {
            RangeProvider::Countable(provider) => {
                provider(score_director.working_solution()).sample(rng)
            }
            RangeProvider::Uncountable(provider) => {
                provider(score_director.working_solution()).sample(rng)
            }
        }
    }

    fn size(&self, score_director: &dyn ScoreDirector<S>, _entity: EntityReference) -> usize {
        match &self.provider {
            RangeProvider::Countable(provider) => {
                let size = provider(score_director.working_solution()).size();
                usize::try_from(size).unwrap_or(usize::MAX)
            }
            RangeProvider::Uncountable(_) => 0,
        }
    }

    fn is_never_ending(&self) -> bool {
        self.random
    }
}

type EntityValueProvider<S, V> = Arc<dyn Fn(&S, usize) -> Vec<V> + Send + Sync>;

/// Selects values from a range that depends on the entity.
///
/// Chained variables use it: the candidates of an entity's `previous`
/// exclude the entity itself.
pub struct FromEntityValueSelector<S, V> {
    provider: EntityValueProvider<S, V>,
    random: bool,
}

impl<S, V> FromEntityValueSelector<S, V> {
    pub fn new<F>(provider: F) -> Self
    where
        F: Fn(&S, usize) -> Vec<V> + Send + Sync + 'static,
    {
        Self {
            provider: Arc::new(provider),
            random: false,
        }
    }

    pub fn with_random(mut self, random: bool) -> Self {
        self.random = random;
        self
    }
}

impl<S, V> Clone for FromEntityValueSelector<S, V> {
    fn clone(&self) -> Self {
        Self {
            provider: Arc::clone(&self.provider),
            random: self.random,
        }
    }
}

impl<S, V> Debug for FromEntityValueSelector<S, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FromEntityValueSelector")
            .field("random", &self.random)
            .finish()
    }
}

impl<S: PlanningSolution, V> SelectorLifecycle<S> for FromEntityValueSelector<S, V> {}

impl<S, V> ValueSelector<S, V> for FromEntityValueSelector<S, V>
where
    S: PlanningSolution,
    V: Send + 'static,
{
    fn iter<'a>(
        &'a self,
        score_director: &'a dyn ScoreDirector<S>,
        entity: EntityReference,
    ) -> Box<dyn Iterator<Item = V> + 'a> {
        let values = (self.provider)(score_director.working_solution(), entity.entity_index);
        Box::new(values.into_iter())
    }

    fn sample(
        &self,
        score_director: &dyn ScoreDirector<S>,
        entity: EntityReference,
        rng: &mut dyn RngCore,
    ) -> Option<V> {
        let mut values = (self.provider)(score_director.working_solution(), entity.entity_index);
        if values.is_empty() {
            return None;
        }
        let index = rng.random_range(0..values.len());
        Some(values.swap_remove(index))
    }

    fn size(&self, score_director: &dyn ScoreDirector<S>, entity: EntityReference) -> usize {
        (self.provider)(score_director.working_solution(), entity.entity_index).len()
    }

    fn is_never_ending(&self) -> bool {
        self.random
    }

    fn is_entity_independent(&self) -> bool {
        false
    }
}

impl<S: PlanningSolution, V> SelectorLifecycle<S> for Box<dyn ValueSelector<S, V>> {
    super::forward_lifecycle!(@boxed);
}

impl<S: PlanningSolution, V> ValueSelector<S, V> for Box<dyn ValueSelector<S, V>> {
    fn iter<'a>(
        &'a self,
        score_director: &'a dyn ScoreDirector<S>,
        entity: EntityReference,
    ) -> Box<dyn Iterator<Item = V> + 'a> {
        (**self).iter(score_director, entity)
    }

    fn sample(
        &self,
        score_director: &dyn ScoreDirector<S>,
        entity: EntityReference,
        rng: &mut dyn RngCore,
    ) -> Option<V> {
        (**self).sample(score_director, entity, rng)
    }

    fn size(&self, score_director: &dyn ScoreDirector<S>, entity: EntityReference) -> usize {
        (**self).size(score_director, entity)
    }

    fn is_never_ending(&self) -> bool {
        (**self).is_never_ending()
    }

    fn is_entity_independent(&self) -> bool {
        (**self).is_entity_independent()
    }

    fn cache_type(&self) -> SelectionCacheType {
        (**self).cache_type()
    }
}
