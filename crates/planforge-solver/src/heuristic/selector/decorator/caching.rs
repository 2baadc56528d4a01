//! Caching decorators for entity, value, and move selectors.
//!
//! A cached selector materializes its child's elements at the start of its
//! cache scope (step, phase or solver) and serves them in the configured
//! [`SelectionOrder`] until the scope ends. Sorted, shuffled and
//! probabilistic orders are only available through these decorators.

use std::cmp::Ordering;
use std::fmt::{self, Debug};
use std::marker::PhantomData;
use std::sync::Arc;

use rand::RngCore;

use planforge_core::{PlanForgeError, PlanningSolution, Result};
use planforge_scoring::ScoreDirector;

use super::cache::SelectionCache;
use crate::heuristic::r#move::Move;
use crate::heuristic::selector::{
    EntityReference, EntitySelector, MoveSelector, SelectionCacheType, SelectionOrder,
    SelectorLifecycle, ValueSelector,
};

fn validate_child(parent: SelectionCacheType, child: SelectionCacheType) -> Result<()> {
    if child.is_cached() {
        SelectionCacheType::validate_nested(parent, child)?;
    }
    Ok(())
}

/// Implements the lifecycle of a caching decorator: forward to the child,
/// then fill or drop the cache when the scope matches.
macro_rules! cached_lifecycle {
    () => {
        fn solving_started(
            &mut self,
            score_director: &mut dyn ScoreDirector<S>,
            rng: &mut dyn RngCore,
        ) -> Result<()> {
            self.child.solving_started(score_director, rng)?;
            self.refill(SelectionCacheType::Solver, score_director, rng)
        }

        fn phase_started(
            &mut self,
            score_director: &mut dyn ScoreDirector<S>,
            rng: &mut dyn RngCore,
        ) -> Result<()> {
            self.child.phase_started(score_director, rng)?;
            self.refill(SelectionCacheType::Phase, score_director, rng)
        }

        fn step_started(
            &mut self,
            score_director: &mut dyn ScoreDirector<S>,
            rng: &mut dyn RngCore,
        ) -> Result<()> {
            self.child.step_started(score_director, rng)?;
            self.refill(SelectionCacheType::Step, score_director, rng)
        }

        fn step_ended(&mut self, score_director: &mut dyn ScoreDirector<S>) -> Result<()> {
            self.cache.scope_ended(SelectionCacheType::Step);
            self.child.step_ended(score_director)
        }

        fn phase_ended(&mut self, score_director: &mut dyn ScoreDirector<S>) -> Result<()> {
            self.cache.scope_ended(SelectionCacheType::Phase);
            self.child.phase_ended(score_director)
        }

        fn solving_ended(&mut self, score_director: &mut dyn ScoreDirector<S>) -> Result<()> {
            self.cache.scope_ended(SelectionCacheType::Solver);
            self.child.solving_ended(score_director)
        }
    };
}

/// Caches the entities of a child entity selector.
///
/// # Example
///
/// ```
/// use planforge_solver::heuristic::selector::{
///     CachedEntitySelector, FromSolutionEntitySelector, SelectionCacheType, SelectionOrder,
/// };
/// use planforge_test::TaskAssignment;
///
/// let selector = CachedEntitySelector::<TaskAssignment, _>::new(
///     FromSolutionEntitySelector::new(0),
///     SelectionCacheType::Phase,
///     SelectionOrder::Shuffled,
/// )
/// .unwrap();
/// assert_eq!(selector.order(), SelectionOrder::Shuffled);
/// ```
pub struct CachedEntitySelector<S, ES> {
    child: ES,
    cache: SelectionCache<S, EntityReference>,
}

impl<S, ES: Debug> Debug for CachedEntitySelector<S, ES> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CachedEntitySelector")
            .field("child", &self.child)
            .field("cache", &self.cache)
            .finish()
    }
}

impl<S, ES> CachedEntitySelector<S, ES>
where
    S: PlanningSolution,
    ES: EntitySelector<S>,
{
    pub fn new(child: ES, cache_type: SelectionCacheType, order: SelectionOrder) -> Result<Self> {
        validate_child(cache_type, child.cache_type())?;
        Ok(Self {
            child,
            cache: SelectionCache::new(cache_type, order)?,
        })
    }

    /// Entities sorted by descending difficulty, cached per phase.
    ///
    /// Construction heuristics place the hardest entities first.
    pub fn decreasing_difficulty<K, F>(child: ES, difficulty: F) -> Result<Self>
    where
        K: Ord,
        F: Fn(&S, usize) -> K + Send + Sync + 'static,
    {
        Self::new(child, SelectionCacheType::Phase, SelectionOrder::Sorted).map(|s| {
            s.with_sorter(move |solution, a, b| {
                difficulty(solution, b.entity_index).cmp(&difficulty(solution, a.entity_index))
            })
        })
    }

    pub fn with_sorter<F>(mut self, sorter: F) -> Self
    where
        F: Fn(&S, &EntityReference, &EntityReference) -> Ordering + Send + Sync + 'static,
    {
        self.cache.set_sorter(Arc::new(sorter));
        self
    }

    pub fn with_probability_weight<F>(mut self, weight: F) -> Self
    where
        F: Fn(&S, &EntityReference) -> f64 + Send + Sync + 'static,
    {
        self.cache.set_weigher(Arc::new(weight));
        self
    }

    fn refill(
        &mut self,
        scope: SelectionCacheType,
        score_director: &mut dyn ScoreDirector<S>,
        rng: &mut dyn RngCore,
    ) -> Result<()> {
        let score_director: &dyn ScoreDirector<S> = score_director;
        let child = &self.child;
        self.cache.scope_started(scope, score_director.working_solution(), rng, || {
            child.iter(score_director).collect()
        })
    }
}

impl<S, ES> CachedEntitySelector<S, ES> {
    pub fn order(&self) -> SelectionOrder {
        self.cache.order()
    }
}

impl<S, ES> SelectorLifecycle<S> for CachedEntitySelector<S, ES>
where
    S: PlanningSolution,
    ES: EntitySelector<S>,
{
    cached_lifecycle!();
}

impl<S, ES> EntitySelector<S> for CachedEntitySelector<S, ES>
where
    S: PlanningSolution,
    ES: EntitySelector<S>,
{
    fn descriptor_index(&self) -> usize {
        self.child.descriptor_index()
    }

    fn iter<'a>(
        &'a self,
        score_director: &'a dyn ScoreDirector<S>,
    ) -> Box<dyn Iterator<Item = EntityReference> + 'a> {
        if self.cache.is_filled() {
            Box::new(self.cache.items().iter().copied())
        } else {
            self.child.iter(score_director)
        }
    }

    fn sample(
        &self,
        score_director: &dyn ScoreDirector<S>,
        rng: &mut dyn RngCore,
    ) -> Option<EntityReference> {
        if self.cache.is_filled() {
            self.cache.sample(rng).copied()
        } else {
            self.child.sample(score_director, rng)
        }
    }

    fn size(&self, score_director: &dyn ScoreDirector<S>) -> usize {
        if self.cache.is_filled() {
            self.cache.len()
        } else {
            self.child.size(score_director)
        }
    }

    fn is_never_ending(&self) -> bool {
        self.cache.order().is_never_ending()
    }

    fn cache_type(&self) -> SelectionCacheType {
        self.cache.cache_type()
    }
}

/// Caches the values of an entity-independent child value selector.
pub struct CachedValueSelector<S, V, VS> {
    child: VS,
    cache: SelectionCache<S, V>,
}

impl<S, V, VS: Debug> Debug for CachedValueSelector<S, V, VS> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CachedValueSelector")
            .field("child", &self.child)
            .field("cache", &self.cache)
            .finish()
    }
}

impl<S, V, VS> CachedValueSelector<S, V, VS>
where
    S: PlanningSolution,
    V: Clone + Send + 'static,
    VS: ValueSelector<S, V>,
{
    /// Fails when the child's values depend on the entity, since one cache
    /// cannot serve every entity.
    pub fn new(child: VS, cache_type: SelectionCacheType, order: SelectionOrder) -> Result<Self> {
        if cache_type.is_cached() && !child.is_entity_independent() {
            return Err(PlanForgeError::Config(format!(
                "An entity-dependent value selector cannot be cached with cache type {:?}",
                cache_type
            )));
        }
        validate_child(cache_type, child.cache_type())?;
        Ok(Self {
            child,
            cache: SelectionCache::new(cache_type, order)?,
        })
    }

    pub fn with_sorter<F>(mut self, sorter: F) -> Self
    where
        F: Fn(&S, &V, &V) -> Ordering + Send + Sync + 'static,
    {
        self.cache.set_sorter(Arc::new(sorter));
        self
    }

    pub fn with_probability_weight<F>(mut self, weight: F) -> Self
    where
        F: Fn(&S, &V) -> f64 + Send + Sync + 'static,
    {
        self.cache.set_weigher(Arc::new(weight));
        self
    }

    fn refill(
        &mut self,
        scope: SelectionCacheType,
        score_director: &mut dyn ScoreDirector<S>,
        rng: &mut dyn RngCore,
    ) -> Result<()> {
        let score_director: &dyn ScoreDirector<S> = score_director;
        let child = &self.child;
        // Entity-independent children ignore the entity.
        let any_entity = EntityReference::new(0, 0);
        self.cache.scope_started(scope, score_director.working_solution(), rng, || {
            child.iter(score_director, any_entity).collect()
        })
    }
}

impl<S, V, VS> SelectorLifecycle<S> for CachedValueSelector<S, V, VS>
where
    S: PlanningSolution,
    V: Clone + Send + 'static,
    VS: ValueSelector<S, V>,
{
    cached_lifecycle!();
}

impl<S, V, VS> ValueSelector<S, V> for CachedValueSelector<S, V, VS>
where
    S: PlanningSolution,
    V: Clone + Send + 'static,
    VS: ValueSelector<S, V>,
{
    fn iter<'a>(
        &'a self,
        score_director: &'a dyn ScoreDirector<S>,
        entity: EntityReference,
    ) -> Box<dyn Iterator<Item = V> + 'a> {
        if self.cache.is_filled() {
            Box::new(self.cache.items().iter().cloned())
        } else {
            self.child.iter(score_director, entity)
        }
    }

    fn sample(
        &self,
        score_director: &dyn ScoreDirector<S>,
        entity: EntityReference,
        rng: &mut dyn RngCore,
    ) -> Option<V> {
        if self.cache.is_filled() {
            self.cache.sample(rng).cloned()
        } else {
            self.child.sample(score_director, entity, rng)
        }
    }

    fn size(&self, score_director: &dyn ScoreDirector<S>, entity: EntityReference) -> usize {
        if self.cache.is_filled() {
            self.cache.len()
        } else {
            self.child.size(score_director, entity)
        }
    }

    fn is_never_ending(&self) -> bool {
        self.cache.order().is_never_ending()
    }

    fn is_entity_independent(&self) -> bool {
        self.child.is_entity_independent()
    }

    fn cache_type(&self) -> SelectionCacheType {
        self.cache.cache_type()
    }
}

/// Caches the moves of a child move selector.
///
/// A step-cached move selector generates each neighborhood once per step,
/// which pays off when the selector is shuffled or sampled many times.
pub struct CachedMoveSelector<S, M, MS> {
    child: MS,
    cache: SelectionCache<S, M>,
    _phantom: PhantomData<fn() -> M>,
}

impl<S, M, MS: Debug> Debug for CachedMoveSelector<S, M, MS> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CachedMoveSelector")
            .field("child", &self.child)
            .field("cache", &self.cache)
            .finish()
    }
}

impl<S, M, MS> CachedMoveSelector<S, M, MS>
where
    S: PlanningSolution,
    M: Move<S>,
    MS: MoveSelector<S, M>,
{
    pub fn new(child: MS, cache_type: SelectionCacheType, order: SelectionOrder) -> Result<Self> {
        if cache_type.is_cached() && child.is_never_ending() {
            return Err(PlanForgeError::Config(
                "A never-ending move selector cannot be cached".to_string(),
            ));
        }
        Ok(Self {
            child,
            cache: SelectionCache::new(cache_type, order)?,
            _phantom: PhantomData,
        })
    }

    pub fn with_sorter<F>(mut self, sorter: F) -> Self
    where
        F: Fn(&S, &M, &M) -> Ordering + Send + Sync + 'static,
    {
        self.cache.set_sorter(Arc::new(sorter));
        self
    }

    pub fn with_probability_weight<F>(mut self, weight: F) -> Self
    where
        F: Fn(&S, &M) -> f64 + Send + Sync + 'static,
    {
        self.cache.set_weigher(Arc::new(weight));
        self
    }

    fn refill(
        &mut self,
        scope: SelectionCacheType,
        score_director: &mut dyn ScoreDirector<S>,
        rng: &mut dyn RngCore,
    ) -> Result<()> {
        let score_director: &dyn ScoreDirector<S> = score_director;
        let child = &self.child;
        self.cache.scope_started(scope, score_director.working_solution(), rng, || {
            child.iter_moves(score_director).collect()
        })
    }
}

impl<S, M, MS> SelectorLifecycle<S> for CachedMoveSelector<S, M, MS>
where
    S: PlanningSolution,
    M: Move<S>,
    MS: MoveSelector<S, M>,
{
    cached_lifecycle!();
}

impl<S, M, MS> MoveSelector<S, M> for CachedMoveSelector<S, M, MS>
where
    S: PlanningSolution,
    M: Move<S>,
    MS: MoveSelector<S, M>,
{
    fn iter_moves<'a>(
        &'a self,
        score_director: &'a dyn ScoreDirector<S>,
    ) -> Box<dyn Iterator<Item = M> + 'a> {
        if self.cache.is_filled() {
            Box::new(self.cache.items().iter().cloned())
        } else {
            self.child.iter_moves(score_director)
        }
    }

    fn sample_move(
        &self,
        score_director: &dyn ScoreDirector<S>,
        rng: &mut dyn RngCore,
    ) -> Option<M> {
        if self.cache.is_filled() {
            self.cache.sample(rng).cloned()
        } else {
            self.child.sample_move(score_director, rng)
        }
    }

    fn size(&self, score_director: &dyn ScoreDirector<S>) -> usize {
        if self.cache.is_filled() {
            self.cache.len()
        } else {
            self.child.size(score_director)
        }
    }

    fn is_never_ending(&self) -> bool {
        self.cache.order().is_never_ending()
    }
}
