//! Materialized selection shared by the caching decorators.

use std::cmp::Ordering;
use std::sync::Arc;

use rand::seq::SliceRandom;
use rand::{Rng, RngCore};

use planforge_core::{PlanForgeError, Result};

use crate::heuristic::selector::{SelectionCacheType, SelectionOrder};

/// Orders two selected elements against the working solution.
pub type SelectionSorter<S, T> = Arc<dyn Fn(&S, &T, &T) -> Ordering + Send + Sync>;

/// Relative weight of a selected element for probabilistic selection.
pub type SelectionProbabilityWeight<S, T> = Arc<dyn Fn(&S, &T) -> f64 + Send + Sync>;

/// Elements of a child selector, materialized for one cache scope.
pub(crate) struct SelectionCache<S, T> {
    cache_type: SelectionCacheType,
    order: SelectionOrder,
    sorter: Option<SelectionSorter<S, T>>,
    weigher: Option<SelectionProbabilityWeight<S, T>>,
    items: Vec<T>,
    cumulative_weights: Vec<f64>,
    filled: bool,
}

impl<S, T> SelectionCache<S, T> {
    /// `Inherit` resolves to `Original`.
    pub(crate) fn new(cache_type: SelectionCacheType, order: SelectionOrder) -> Result<Self> {
        let order = order.resolve(SelectionOrder::Original);
        order.validate_cache_type(cache_type)?;
        Ok(Self {
            cache_type,
            order,
            sorter: None,
            weigher: None,
            items: Vec::new(),
            cumulative_weights: Vec::new(),
            filled: false,
        })
    }

    pub(crate) fn set_sorter(&mut self, sorter: SelectionSorter<S, T>) {
        self.sorter = Some(sorter);
    }

    pub(crate) fn set_weigher(&mut self, weigher: SelectionProbabilityWeight<S, T>) {
        self.weigher = Some(weigher);
    }

    pub(crate) fn cache_type(&self) -> SelectionCacheType {
        self.cache_type
    }

    pub(crate) fn order(&self) -> SelectionOrder {
        self.order
    }

    pub(crate) fn is_filled(&self) -> bool {
        self.filled
    }

    pub(crate) fn len(&self) -> usize {
        self.items.len()
    }

    pub(crate) fn items(&self) -> &[T] {
        &self.items
    }

    /// Handles the start of a lifecycle scope.
    ///
    /// Fills from `produce` when the scope matches the cache type. A
    /// shuffled cache that outlives steps gets a fresh permutation at every
    /// step start.
    pub(crate) fn scope_started<F>(
        &mut self,
        scope: SelectionCacheType,
        solution: &S,
        rng: &mut dyn RngCore,
        produce: F,
    ) -> Result<()>
    where
        F: FnOnce() -> Vec<T>,
    {
        if self.cache_type == scope {
            self.fill(solution, produce(), rng)?;
        } else if scope == SelectionCacheType::Step
            && self.filled
            && self.order == SelectionOrder::Shuffled
        {
            self.items.shuffle(rng);
        }
        Ok(())
    }

    /// Drops the elements when the scope of the cache ends.
    pub(crate) fn scope_ended(&mut self, scope: SelectionCacheType) {
        if self.cache_type == scope {
            self.clear();
        }
    }

    fn fill(&mut self, solution: &S, mut items: Vec<T>, rng: &mut dyn RngCore) -> Result<()> {
        match self.order {
            SelectionOrder::Sorted => {
                let sorter = self.sorter.as_ref().ok_or_else(|| {
                    PlanForgeError::Config("Sorted selection requires a sorter".to_string())
                })?;
                items.sort_by(|a, b| sorter(solution, a, b));
            }
            SelectionOrder::Shuffled => items.shuffle(rng),
            SelectionOrder::Probabilistic => {
                let weigher = self.weigher.as_ref().ok_or_else(|| {
                    PlanForgeError::Config(
                        "Probabilistic selection requires a probability weight".to_string(),
                    )
                })?;
                let mut total = 0.0;
                self.cumulative_weights = items
                    .iter()
                    .map(|item| {
                        total += weigher(solution, item).max(0.0);
                        total
                    })
                    .collect();
            }
            _ => {}
        }
        self.items = items;
        self.filled = true;
        Ok(())
    }

    fn clear(&mut self) {
        self.items.clear();
        self.cumulative_weights.clear();
        self.filled = false;
    }

    /// Draws one element: weighted for probabilistic order, uniform
    /// otherwise.
    pub(crate) fn sample(&self, rng: &mut dyn RngCore) -> Option<&T> {
        if self.items.is_empty() {
            return None;
        }
        if self.order == SelectionOrder::Probabilistic {
            let total = self.cumulative_weights.last().copied().unwrap_or(0.0);
            if total > 0.0 {
                let r = rng.random_range(0.0..total);
                let index = self.cumulative_weights.partition_point(|&c| c <= r);
                return self.items.get(index.min(self.items.len() - 1));
            }
        }
        self.items.get(rng.random_range(0..self.items.len()))
    }
}

impl<S, T> std::fmt::Debug for SelectionCache<S, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SelectionCache")
            .field("cache_type", &self.cache_type)
            .field("order", &self.order)
            .field("size", &self.items.len())
            .field("filled", &self.filled)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_sorted_requires_caching() {
        let result = SelectionCache::<(), i32>::new(
            SelectionCacheType::JustInTime,
            SelectionOrder::Sorted,
        );
        assert!(matches!(result, Err(PlanForgeError::Config(_))));
    }

    #[test]
    fn test_sorted_without_sorter_fails_on_fill() {
        let mut cache =
            SelectionCache::<(), i32>::new(SelectionCacheType::Phase, SelectionOrder::Sorted)
                .unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let result = cache.scope_started(SelectionCacheType::Phase, &(), &mut rng, || {
            vec![3, 1, 2]
        });
        assert!(result.is_err());
    }

    #[test]
    fn test_fill_and_clear_follow_scope() {
        let mut cache =
            SelectionCache::<(), i32>::new(SelectionCacheType::Phase, SelectionOrder::Sorted)
                .unwrap();
        cache.set_sorter(Arc::new(|_: &(), a: &i32, b: &i32| b.cmp(a)));
        let mut rng = ChaCha8Rng::seed_from_u64(7);

        cache
            .scope_started(SelectionCacheType::Step, &(), &mut rng, || vec![9])
            .unwrap();
        assert!(!cache.is_filled());

        cache
            .scope_started(SelectionCacheType::Phase, &(), &mut rng, || vec![1, 3, 2])
            .unwrap();
        assert_eq!(cache.items(), &[3, 2, 1]);

        cache.scope_ended(SelectionCacheType::Step);
        assert!(cache.is_filled());
        cache.scope_ended(SelectionCacheType::Phase);
        assert!(!cache.is_filled());
    }

    #[test]
    fn test_probabilistic_never_draws_zero_weight() {
        let mut cache = SelectionCache::<(), i32>::new(
            SelectionCacheType::Phase,
            SelectionOrder::Probabilistic,
        )
        .unwrap();
        cache.set_weigher(Arc::new(|_: &(), v: &i32| if *v == 2 { 0.0 } else { 1.0 }));
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        cache
            .scope_started(SelectionCacheType::Phase, &(), &mut rng, || vec![1, 2, 3])
            .unwrap();

        for _ in 0..200 {
            let drawn = *cache.sample(&mut rng).unwrap();
            assert_ne!(drawn, 2);
        }
    }

    #[test]
    fn test_shuffled_keeps_every_element() {
        let mut cache =
            SelectionCache::<(), i32>::new(SelectionCacheType::Phase, SelectionOrder::Shuffled)
                .unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        cache
            .scope_started(SelectionCacheType::Phase, &(), &mut rng, || (0..10).collect())
            .unwrap();
        cache
            .scope_started(SelectionCacheType::Step, &(), &mut rng, Vec::new)
            .unwrap();

        let mut items = cache.items().to_vec();
        items.sort();
        assert_eq!(items, (0..10).collect::<Vec<_>>());
    }
}
