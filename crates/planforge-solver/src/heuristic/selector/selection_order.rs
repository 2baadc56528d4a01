//! Selection order and cache type of selectors.

use planforge_core::{PlanForgeError, Result};

/// Defines the order in which elements are selected from a selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SelectionOrder {
    /// Inherit the selection order from the parent selector.
    ///
    /// Without a parent order, resolves to `Random`.
    #[default]
    Inherit,

    /// Elements in the order of the underlying collection.
    Original,

    /// Elements sorted by a comparator. Requires caching.
    Sorted,

    /// Uniform random draws with replacement; never ending.
    Random,

    /// Every element exactly once, in a fresh permutation per step.
    /// Requires caching.
    Shuffled,

    /// Weighted random draws with replacement; never ending.
    /// Requires caching.
    Probabilistic,
}

impl SelectionOrder {
    /// Resolves `Inherit` against the parent's order.
    pub fn resolve(self, inherited: SelectionOrder) -> SelectionOrder {
        match self {
            SelectionOrder::Inherit => {
                if inherited == SelectionOrder::Inherit {
                    SelectionOrder::Random
                } else {
                    inherited
                }
            }
            other => other,
        }
    }

    pub fn from_random_selection(random: bool) -> Self {
        if random {
            SelectionOrder::Random
        } else {
            SelectionOrder::Original
        }
    }

    /// Returns true if this order involves randomness.
    pub fn is_random(&self) -> bool {
        matches!(
            self,
            SelectionOrder::Random | SelectionOrder::Shuffled | SelectionOrder::Probabilistic
        )
    }

    /// Returns true if a selector with this order never runs out of elements.
    pub fn is_never_ending(&self) -> bool {
        matches!(self, SelectionOrder::Random | SelectionOrder::Probabilistic)
    }

    /// Returns true if the elements must be materialized before selection.
    pub fn requires_caching(&self) -> bool {
        matches!(
            self,
            SelectionOrder::Shuffled | SelectionOrder::Sorted | SelectionOrder::Probabilistic
        )
    }

    /// Checks that the order can be served with the given cache type.
    pub fn validate_cache_type(&self, cache_type: SelectionCacheType) -> Result<()> {
        if self.requires_caching() && !cache_type.is_cached() {
            return Err(PlanForgeError::Config(format!(
                "Selection order {:?} requires a cache type of at least Step, got {:?}",
                self, cache_type
            )));
        }
        Ok(())
    }
}

impl From<planforge_config::SelectionOrder> for SelectionOrder {
    fn from(order: planforge_config::SelectionOrder) -> Self {
        use planforge_config::SelectionOrder as Config;
        match order {
            Config::Inherit => SelectionOrder::Inherit,
            Config::Original => SelectionOrder::Original,
            Config::Sorted => SelectionOrder::Sorted,
            Config::Random => SelectionOrder::Random,
            Config::Shuffled => SelectionOrder::Shuffled,
            Config::Probabilistic => SelectionOrder::Probabilistic,
        }
    }
}

/// How long a selector keeps its materialized elements.
///
/// Variants are ordered by lifetime: `JustInTime < Step < Phase < Solver`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum SelectionCacheType {
    /// Nothing is cached; elements are produced on demand.
    #[default]
    JustInTime,

    /// Materialized at every step start.
    Step,

    /// Materialized at every phase start.
    Phase,

    /// Materialized once when solving starts.
    Solver,
}

impl SelectionCacheType {
    pub fn is_cached(&self) -> bool {
        !matches!(self, SelectionCacheType::JustInTime)
    }

    pub fn max(a: SelectionCacheType, b: SelectionCacheType) -> SelectionCacheType {
        std::cmp::max(a, b)
    }

    /// Checks a child's cache type against a cached parent.
    ///
    /// A cached parent materializes its child once per cache scope, so the
    /// child must live at least that long.
    pub fn validate_nested(parent: SelectionCacheType, child: SelectionCacheType) -> Result<()> {
        if parent.is_cached() && child < parent {
            return Err(PlanForgeError::Config(format!(
                "A child selector with cache type {:?} cannot be nested in a parent with cache type {:?}",
                child, parent
            )));
        }
        Ok(())
    }
}

impl From<planforge_config::SelectionCacheType> for SelectionCacheType {
    fn from(cache_type: planforge_config::SelectionCacheType) -> Self {
        use planforge_config::SelectionCacheType as Config;
        match cache_type {
            Config::JustInTime => SelectionCacheType::JustInTime,
            Config::Step => SelectionCacheType::Step,
            Config::Phase => SelectionCacheType::Phase,
            Config::Solver => SelectionCacheType::Solver,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_inherit() {
        assert_eq!(
            SelectionOrder::Inherit.resolve(SelectionOrder::Original),
            SelectionOrder::Original
        );
        assert_eq!(
            SelectionOrder::Inherit.resolve(SelectionOrder::Inherit),
            SelectionOrder::Random
        );
        assert_eq!(
            SelectionOrder::Sorted.resolve(SelectionOrder::Random),
            SelectionOrder::Sorted
        );
    }

    #[test]
    fn test_random_and_never_ending() {
        assert!(SelectionOrder::Shuffled.is_random());
        assert!(!SelectionOrder::Shuffled.is_never_ending());
        assert!(SelectionOrder::Random.is_never_ending());
        assert!(SelectionOrder::Probabilistic.is_never_ending());
        assert!(!SelectionOrder::Original.is_random());
        assert_eq!(
            SelectionOrder::from_random_selection(true),
            SelectionOrder::Random
        );
    }

    #[test]
    fn test_requires_caching() {
        assert!(SelectionOrder::Sorted.requires_caching());
        assert!(SelectionOrder::Shuffled.requires_caching());
        assert!(SelectionOrder::Probabilistic.requires_caching());
        assert!(!SelectionOrder::Random.requires_caching());

        assert!(SelectionOrder::Sorted
            .validate_cache_type(SelectionCacheType::JustInTime)
            .is_err());
        assert!(SelectionOrder::Sorted
            .validate_cache_type(SelectionCacheType::Step)
            .is_ok());
        assert!(SelectionOrder::Random
            .validate_cache_type(SelectionCacheType::JustInTime)
            .is_ok());
    }

    #[test]
    fn test_cache_type_ordering() {
        assert!(SelectionCacheType::JustInTime < SelectionCacheType::Step);
        assert!(SelectionCacheType::Step < SelectionCacheType::Phase);
        assert!(SelectionCacheType::Phase < SelectionCacheType::Solver);
        assert_eq!(
            SelectionCacheType::max(SelectionCacheType::Phase, SelectionCacheType::Step),
            SelectionCacheType::Phase
        );
        assert!(!SelectionCacheType::JustInTime.is_cached());
        assert!(SelectionCacheType::Step.is_cached());
    }

    #[test]
    fn test_validate_nested() {
        use SelectionCacheType::*;
        assert!(SelectionCacheType::validate_nested(Phase, Step).is_err());
        assert!(SelectionCacheType::validate_nested(Phase, Solver).is_ok());
        assert!(SelectionCacheType::validate_nested(Step, Step).is_ok());
        assert!(SelectionCacheType::validate_nested(JustInTime, JustInTime).is_ok());
    }

    #[test]
    fn test_from_config() {
        assert_eq!(
            SelectionOrder::from(planforge_config::SelectionOrder::Shuffled),
            SelectionOrder::Shuffled
        );
        assert_eq!(
            SelectionCacheType::from(planforge_config::SelectionCacheType::Phase),
            SelectionCacheType::Phase
        );
    }
}
