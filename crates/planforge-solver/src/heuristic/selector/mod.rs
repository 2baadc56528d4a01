//! Selectors for entities, values, and moves.
//!
//! Selectors enumerate the elements the solver considers when exploring
//! the solution space. Entity and value selectors feed move selectors;
//! decorators cache, sort, shuffle, filter and combine them.
//!
//! Finite selectors are walked with `iter`; selectors whose order is random
//! or probabilistic, or whose value range is uncountable, are never ending
//! and are drawn from with `sample`.

pub mod decorator;
mod chained;
mod entity;
mod move_selector;
mod selection_order;
mod value;

#[cfg(test)]
mod tests;

use rand::RngCore;

use planforge_core::{PlanningSolution, Result};
use planforge_scoring::ScoreDirector;

pub use chained::ChainedChangeMoveSelector;
pub use decorator::{
    CachedEntitySelector, CachedMoveSelector, CachedValueSelector, FilteringMoveSelector,
    MoveFilter, SelectionProbabilityWeight, SelectionSorter, UnionMoveSelector,
};
pub use entity::{EntityReference, EntitySelector, FromSolutionEntitySelector};
pub use move_selector::{ChangeMoveSelector, MoveSelector, SwapMoveSelector};
pub use selection_order::{SelectionCacheType, SelectionOrder};
pub use value::{FromEntityValueSelector, FromSolutionValueSelector, ValueSelector};

/// Lifecycle hooks every selector receives.
///
/// Phases call the hooks on their top-level selectors, which forward them
/// to their children. Caching decorators fill at the start of their cache
/// scope and drop the cache at its end.
pub trait SelectorLifecycle<S: PlanningSolution> {
    fn solving_started(
        &mut self,
        _score_director: &mut dyn ScoreDirector<S>,
        _rng: &mut dyn RngCore,
    ) -> Result<()> {
        Ok(())
    }

    fn phase_started(
        &mut self,
        _score_director: &mut dyn ScoreDirector<S>,
        _rng: &mut dyn RngCore,
    ) -> Result<()> {
        Ok(())
    }

    fn step_started(
        &mut self,
        _score_director: &mut dyn ScoreDirector<S>,
        _rng: &mut dyn RngCore,
    ) -> Result<()> {
        Ok(())
    }

    fn step_ended(&mut self, _score_director: &mut dyn ScoreDirector<S>) -> Result<()> {
        Ok(())
    }

    fn phase_ended(&mut self, _score_director: &mut dyn ScoreDirector<S>) -> Result<()> {
        Ok(())
    }

    fn solving_ended(&mut self, _score_director: &mut dyn ScoreDirector<S>) -> Result<()> {
        Ok(())
    }
}

/// Implements [`SelectorLifecycle`] by forwarding every hook to the named
/// child selector fields, in order.
///
/// `forward_lifecycle!(@boxed)` forwards to the boxed selector instead.
macro_rules! forward_lifecycle {
    (@boxed) => {
        fn solving_started(
            &mut self,
            score_director: &mut dyn planforge_scoring::ScoreDirector<S>,
            rng: &mut dyn rand::RngCore,
        ) -> planforge_core::Result<()> {
            (**self).solving_started(score_director, rng)
        }

        fn phase_started(
            &mut self,
            score_director: &mut dyn planforge_scoring::ScoreDirector<S>,
            rng: &mut dyn rand::RngCore,
        ) -> planforge_core::Result<()> {
            (**self).phase_started(score_director, rng)
        }

        fn step_started(
            &mut self,
            score_director: &mut dyn planforge_scoring::ScoreDirector<S>,
            rng: &mut dyn rand::RngCore,
        ) -> planforge_core::Result<()> {
            (**self).step_started(score_director, rng)
        }

        fn step_ended(
            &mut self,
            score_director: &mut dyn planforge_scoring::ScoreDirector<S>,
        ) -> planforge_core::Result<()> {
            (**self).step_ended(score_director)
        }

        fn phase_ended(
            &mut self,
            score_director: &mut dyn planforge_scoring::ScoreDirector<S>,
        ) -> planforge_core::Result<()> {
            (**self).phase_ended(score_director)
        }

        fn solving_ended(
            &mut self,
            score_director: &mut dyn planforge_scoring::ScoreDirector<S>,
        ) -> planforge_core::Result<()> {
            (**self).solving_ended(score_director)
        }
    };
    ($($child:ident),+ $(,)?) => {
        fn solving_started(
            &mut self,
            score_director: &mut dyn planforge_scoring::ScoreDirector<S>,
            rng: &mut dyn rand::RngCore,
        ) -> planforge_core::Result<()> {
            $(self.$child.solving_started(score_director, rng)?;)+
            Ok(())
        }

        fn phase_started(
            &mut self,
            score_director: &mut dyn planforge_scoring::ScoreDirector<S>,
            rng: &mut dyn rand::RngCore,
        ) -> planforge_core::Result<()> {
            $(self.$child.phase_started(score_director, rng)?;)+
            Ok(())
        }

        fn step_started(
            &mut self,
            score_director: &mut dyn planforge_scoring::ScoreDirector<S>,
            rng: &mut dyn rand::RngCore,
        ) -> planforge_core::Result<()> {
            $(self.$child.step_started(score_director, rng)?;)+
            Ok(())
        }

        fn step_ended(
            &mut self,
            score_director: &mut dyn planforge_scoring::ScoreDirector<S>,
        ) -> planforge_core::Result<()> {
            $(self.$child.step_ended(score_director)?;)+
            Ok(())
        }

        fn phase_ended(
            &mut self,
            score_director: &mut dyn planforge_scoring::ScoreDirector<S>,
        ) -> planforge_core::Result<()> {
            $(self.$child.phase_ended(score_director)?;)+
            Ok(())
        }

        fn solving_ended(
            &mut self,
            score_director: &mut dyn planforge_scoring::ScoreDirector<S>,
        ) -> planforge_core::Result<()> {
            $(self.$child.solving_ended(score_director)?;)+
            Ok(())
        }
    };
}

pub(crate) use forward_lifecycle;
