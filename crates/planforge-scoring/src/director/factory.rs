//! Score director factories.
//!
//! A solver builds one director per solve and clones it for parallel move
//! evaluation, so factories hand out fresh, fully wired directors.

use std::fmt;
use std::sync::Arc;

use planforge_core::domain::{
    LookUpStrategyType, SolutionDescriptor, VariableListener, VariableListenerSupport,
};
use planforge_core::PlanningSolution;

use super::incremental::{IncrementalScoreCalculator, IncrementalScoreDirector};
use super::simple::SimpleScoreDirector;
use super::traits::ScoreDirector;

/// Creates score directors for working solutions.
pub trait ScoreDirectorFactory<S: PlanningSolution>: Send + Sync {
    type Director: ScoreDirector<S> + Clone + 'static;

    fn build_score_director(&self, solution: S) -> Self::Director;

    fn solution_descriptor(&self) -> &SolutionDescriptor<S>;
}

/// Wiring shared by both factories.
struct FactorySettings<S> {
    descriptor: Arc<SolutionDescriptor<S>>,
    listeners: VariableListenerSupport<S>,
    lookup_strategy: LookUpStrategyType,
}

impl<S: 'static> Clone for FactorySettings<S> {
    fn clone(&self) -> Self {
        FactorySettings {
            descriptor: Arc::clone(&self.descriptor),
            listeners: self.listeners.clone(),
            lookup_strategy: self.lookup_strategy,
        }
    }
}

impl<S: 'static> FactorySettings<S> {
    fn new(descriptor: SolutionDescriptor<S>) -> Self {
        FactorySettings {
            descriptor: Arc::new(descriptor),
            listeners: VariableListenerSupport::new(),
            lookup_strategy: LookUpStrategyType::default(),
        }
    }
}

/// Builds [`SimpleScoreDirector`]s around a cloneable score function.
pub struct SimpleScoreDirectorFactory<S: PlanningSolution, C> {
    settings: FactorySettings<S>,
    score_calculator: C,
}

impl<S, C> SimpleScoreDirectorFactory<S, C>
where
    S: PlanningSolution,
    C: Fn(&S) -> S::Score + Send + Sync + Clone + 'static,
{
    pub fn new(descriptor: SolutionDescriptor<S>, score_calculator: C) -> Self {
        SimpleScoreDirectorFactory {
            settings: FactorySettings::new(descriptor),
            score_calculator,
        }
    }

    pub fn with_listener(
        mut self,
        descriptor_index: usize,
        sources: &[&'static str],
        listener: impl VariableListener<S>,
    ) -> Self {
        self.settings
            .listeners
            .register(descriptor_index, sources, listener);
        self
    }

    pub fn with_lookup_strategy(mut self, strategy: LookUpStrategyType) -> Self {
        self.settings.lookup_strategy = strategy;
        self
    }
}

impl<S, C> ScoreDirectorFactory<S> for SimpleScoreDirectorFactory<S, C>
where
    S: PlanningSolution,
    C: Fn(&S) -> S::Score + Send + Sync + Clone + 'static,
{
    type Director = SimpleScoreDirector<S, C>;

    fn build_score_director(&self, solution: S) -> Self::Director {
        SimpleScoreDirector::with_shared_descriptor(
            solution,
            Arc::clone(&self.settings.descriptor),
            self.score_calculator.clone(),
        )
        .with_lookup_strategy(self.settings.lookup_strategy)
        .with_listener_support(self.settings.listeners.clone())
    }

    fn solution_descriptor(&self) -> &SolutionDescriptor<S> {
        &self.settings.descriptor
    }
}

impl<S: PlanningSolution, C: Clone> Clone for SimpleScoreDirectorFactory<S, C> {
    fn clone(&self) -> Self {
        SimpleScoreDirectorFactory {
            settings: self.settings.clone(),
            score_calculator: self.score_calculator.clone(),
        }
    }
}

impl<S: PlanningSolution, C> fmt::Debug for SimpleScoreDirectorFactory<S, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SimpleScoreDirectorFactory")
            .field("descriptor", &self.settings.descriptor.type_name())
            .field("listeners", &self.settings.listeners.len())
            .finish()
    }
}

/// Builds [`IncrementalScoreDirector`]s, each with a clone of a prototype
/// calculator.
pub struct IncrementalScoreDirectorFactory<S: PlanningSolution, C> {
    settings: FactorySettings<S>,
    calculator: C,
}

impl<S, C> IncrementalScoreDirectorFactory<S, C>
where
    S: PlanningSolution,
    C: IncrementalScoreCalculator<S> + Clone + Sync + 'static,
{
    pub fn new(descriptor: SolutionDescriptor<S>, calculator: C) -> Self {
        IncrementalScoreDirectorFactory {
            settings: FactorySettings::new(descriptor),
            calculator,
        }
    }

    pub fn with_listener(
        mut self,
        descriptor_index: usize,
        sources: &[&'static str],
        listener: impl VariableListener<S>,
    ) -> Self {
        self.settings
            .listeners
            .register(descriptor_index, sources, listener);
        self
    }

    pub fn with_lookup_strategy(mut self, strategy: LookUpStrategyType) -> Self {
        self.settings.lookup_strategy = strategy;
        self
    }
}

impl<S, C> ScoreDirectorFactory<S> for IncrementalScoreDirectorFactory<S, C>
where
    S: PlanningSolution,
    C: IncrementalScoreCalculator<S> + Clone + Sync + 'static,
{
    type Director = IncrementalScoreDirector<S, C>;

    fn build_score_director(&self, solution: S) -> Self::Director {
        IncrementalScoreDirector::with_shared_descriptor(
            solution,
            Arc::clone(&self.settings.descriptor),
            self.calculator.clone(),
        )
        .with_lookup_strategy(self.settings.lookup_strategy)
        .with_listener_support(self.settings.listeners.clone())
    }

    fn solution_descriptor(&self) -> &SolutionDescriptor<S> {
        &self.settings.descriptor
    }
}

impl<S: PlanningSolution, C: Clone> Clone for IncrementalScoreDirectorFactory<S, C> {
    fn clone(&self) -> Self {
        IncrementalScoreDirectorFactory {
            settings: self.settings.clone(),
            calculator: self.calculator.clone(),
        }
    }
}

impl<S: PlanningSolution, C> fmt::Debug for IncrementalScoreDirectorFactory<S, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IncrementalScoreDirectorFactory")
            .field("descriptor", &self.settings.descriptor.type_name())
            .field("listeners", &self.settings.listeners.len())
            .finish()
    }
}
