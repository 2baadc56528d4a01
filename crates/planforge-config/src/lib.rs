//! Configuration system for PlanForge.
//!
//! Load solver configuration from TOML or YAML to control termination,
//! phases, acceptors and foragers without code changes.
//!
//! # Examples
//!
//! Load configuration from a TOML string:
//!
//! ```
//! use planforge_config::{PhaseConfig, SolverConfig};
//! use std::time::Duration;
//!
//! let config = SolverConfig::from_toml_str(r#"
//!     random_seed = 7
//!
//!     [termination]
//!     seconds_spent_limit = 30
//!     unimproved_seconds_spent_limit = 5
//!
//!     [[phases]]
//!     type = "construction_heuristic"
//!     construction_heuristic_type = "first_fit_decreasing"
//!
//!     [[phases]]
//!     type = "local_search"
//!     [[phases.acceptors]]
//!     type = "late_acceptance"
//!     late_acceptance_size = 400
//! "#).unwrap();
//!
//! assert_eq!(config.time_limit(), Some(Duration::from_secs(30)));
//! assert_eq!(config.phases.len(), 2);
//! assert!(matches!(config.phases[1], PhaseConfig::LocalSearch(_)));
//! ```
//!
//! Use the default config when the file is missing:
//!
//! ```
//! use planforge_config::SolverConfig;
//!
//! let config = SolverConfig::load("solver.toml").unwrap_or_default();
//! assert!(config.phases.is_empty());
//! ```

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[cfg(test)]
mod tests;

/// Configuration error
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Main solver configuration.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct SolverConfig {
    /// Environment mode affecting reproducibility and assertions.
    #[serde(default)]
    pub environment_mode: EnvironmentMode,

    /// Random seed for reproducible results.
    #[serde(default)]
    pub random_seed: Option<u64>,

    /// Number of threads for parallel move evaluation.
    #[serde(default)]
    pub move_thread_count: MoveThreadCount,

    /// Solver-level termination.
    #[serde(default)]
    pub termination: Option<TerminationConfig>,

    /// Phases, run in order.
    #[serde(default)]
    pub phases: Vec<PhaseConfig>,
}

impl SolverConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a file, picking the format by extension.
    ///
    /// `.yaml` and `.yml` files are read as YAML, everything else as TOML.
    ///
    /// # Errors
    ///
    /// Returns error if the file doesn't exist or fails to parse.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        match path.extension().and_then(|e| e.to_str()) {
            Some("yaml" | "yml") => Self::from_yaml_file(path),
            _ => Self::from_toml_file(path),
        }
    }

    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: SolverConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&contents)
    }

    pub fn from_yaml_str(s: &str) -> Result<Self, ConfigError> {
        let config: SolverConfig = serde_yaml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Sets the termination time limit.
    pub fn with_termination_seconds(mut self, seconds: u64) -> Self {
        self.termination = Some(TerminationConfig {
            seconds_spent_limit: Some(seconds),
            ..self.termination.unwrap_or_default()
        });
        self
    }

    pub fn with_termination(mut self, termination: TerminationConfig) -> Self {
        self.termination = Some(termination);
        self
    }

    pub fn with_random_seed(mut self, seed: u64) -> Self {
        self.random_seed = Some(seed);
        self
    }

    pub fn with_environment_mode(mut self, mode: EnvironmentMode) -> Self {
        self.environment_mode = mode;
        self
    }

    pub fn with_move_thread_count(mut self, count: MoveThreadCount) -> Self {
        self.move_thread_count = count;
        self
    }

    pub fn with_phase(mut self, phase: PhaseConfig) -> Self {
        self.phases.push(phase);
        self
    }

    /// Returns the solver termination time limit, if configured.
    ///
    /// # Examples
    ///
    /// ```
    /// use planforge_config::SolverConfig;
    /// use std::time::Duration;
    ///
    /// let config = SolverConfig::from_toml_str(r#"
    ///     [termination]
    ///     minutes_spent_limit = 1
    ///     seconds_spent_limit = 30
    /// "#).unwrap();
    ///
    /// assert_eq!(config.time_limit(), Some(Duration::from_secs(90)));
    /// ```
    pub fn time_limit(&self) -> Option<Duration> {
        self.termination.as_ref().and_then(|t| t.time_limit())
    }

    /// Rejects values no solver could run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.move_thread_count == MoveThreadCount::Count(0) {
            return Err(invalid("move_thread_count must be at least 1"));
        }
        if let Some(termination) = &self.termination {
            termination.validate()?;
        }
        for phase in &self.phases {
            phase.validate()?;
        }
        Ok(())
    }
}

fn invalid(message: impl Into<String>) -> ConfigError {
    ConfigError::Invalid(message.into())
}

fn require_positive(value: Option<usize>, name: &str) -> Result<(), ConfigError> {
    match value {
        Some(0) => Err(invalid(format!("{} must be at least 1", name))),
        _ => Ok(()),
    }
}

/// Environment mode affecting solver behavior.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EnvironmentMode {
    /// Seeded from OS entropy unless a seed is configured.
    NonReproducible,

    /// Deterministic: the same seed and input give the same run.
    #[default]
    Reproducible,

    /// Reproducible, and the step score is checked against a from-scratch
    /// calculation after every step.
    FastAssert,

    /// Like `FastAssert`, and every evaluated move score is checked too.
    FullAssert,
}

impl EnvironmentMode {
    pub fn is_reproducible(&self) -> bool {
        !matches!(self, EnvironmentMode::NonReproducible)
    }

    /// Returns true if step scores are checked from scratch.
    pub fn is_asserted(&self) -> bool {
        matches!(self, EnvironmentMode::FastAssert | EnvironmentMode::FullAssert)
    }

    /// Returns true if every evaluated move score is checked from scratch.
    pub fn is_fully_asserted(&self) -> bool {
        matches!(self, EnvironmentMode::FullAssert)
    }
}

/// Move thread count configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MoveThreadCount {
    /// No parallel move evaluation.
    #[default]
    None,

    /// One thread per available core.
    Auto,

    /// Specific number of threads.
    Count(usize),
}

impl MoveThreadCount {
    /// Resolves to a concrete number of evaluation threads.
    pub fn resolve(&self) -> usize {
        match self {
            MoveThreadCount::None => 1,
            MoveThreadCount::Auto => std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1),
            MoveThreadCount::Count(n) => (*n).max(1),
        }
    }
}

/// How the configured termination criteria combine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TerminationCompositionStyle {
    /// Terminate when any criterion fires.
    #[default]
    Or,

    /// Terminate when every criterion fires.
    And,
}

/// Termination configuration.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct TerminationConfig {
    pub seconds_spent_limit: Option<u64>,

    pub minutes_spent_limit: Option<u64>,

    /// Maximum seconds without a best score improvement.
    pub unimproved_seconds_spent_limit: Option<u64>,

    pub step_count_limit: Option<u64>,

    /// Maximum steps without a best score improvement.
    pub unimproved_step_count_limit: Option<u64>,

    /// Target best score, in the score type's text form (e.g. "0hard/-10soft").
    pub best_score_limit: Option<String>,

    /// Terminate once the best score is feasible.
    pub best_score_feasible: Option<bool>,

    pub score_calculation_count_limit: Option<u64>,

    #[serde(default)]
    pub termination_composition_style: TerminationCompositionStyle,
}

impl TerminationConfig {
    /// Returns the time limit as a Duration, if any.
    pub fn time_limit(&self) -> Option<Duration> {
        let seconds =
            self.seconds_spent_limit.unwrap_or(0) + self.minutes_spent_limit.unwrap_or(0) * 60;
        if seconds > 0 {
            Some(Duration::from_secs(seconds))
        } else {
            None
        }
    }

    pub fn unimproved_time_limit(&self) -> Option<Duration> {
        self.unimproved_seconds_spent_limit.map(Duration::from_secs)
    }

    /// Returns true if no criterion is configured.
    pub fn is_empty(&self) -> bool {
        self.time_limit().is_none()
            && self.unimproved_seconds_spent_limit.is_none()
            && self.step_count_limit.is_none()
            && self.unimproved_step_count_limit.is_none()
            && self.best_score_limit.is_none()
            && self.best_score_feasible != Some(true)
            && self.score_calculation_count_limit.is_none()
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if let Some(limit) = &self.best_score_limit {
            if limit.trim().is_empty() {
                return Err(invalid("best_score_limit must not be empty"));
            }
        }
        Ok(())
    }
}

/// Phase configuration.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PhaseConfig {
    ConstructionHeuristic(ConstructionHeuristicConfig),

    LocalSearch(LocalSearchConfig),

    ExhaustiveSearch(ExhaustiveSearchConfig),
}

impl PhaseConfig {
    pub fn termination(&self) -> Option<&TerminationConfig> {
        match self {
            PhaseConfig::ConstructionHeuristic(c) => c.termination.as_ref(),
            PhaseConfig::LocalSearch(c) => c.termination.as_ref(),
            PhaseConfig::ExhaustiveSearch(c) => c.termination.as_ref(),
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if let Some(termination) = self.termination() {
            termination.validate()?;
        }
        match self {
            PhaseConfig::ConstructionHeuristic(_) => Ok(()),
            PhaseConfig::LocalSearch(c) => c.validate(),
            PhaseConfig::ExhaustiveSearch(c) => require_positive(c.node_limit, "node_limit"),
        }
    }
}

/// Construction heuristic configuration.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct ConstructionHeuristicConfig {
    #[serde(default)]
    pub construction_heuristic_type: ConstructionHeuristicType,

    pub pick_early_type: Option<ConstructionPickEarlyType>,

    /// Overrides the entity order implied by the heuristic type.
    pub entity_sorter_manner: Option<EntitySorterManner>,

    pub termination: Option<TerminationConfig>,
}

/// Construction heuristic types.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConstructionHeuristicType {
    /// Entities in original order, best value for each.
    #[default]
    FirstFit,

    /// Entities by decreasing difficulty, best value for each.
    FirstFitDecreasing,

    /// Entities taken from a queue in entity-selector order.
    AllocateEntityFromQueue,
}

/// When the construction forager stops evaluating a placement early.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConstructionPickEarlyType {
    #[default]
    Never,

    FirstNonDeterioratingScore,

    FirstFeasibleScore,

    FirstFeasibleScoreOrNonDeterioratingHard,
}

/// Order in which placers visit entities.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EntitySorterManner {
    #[default]
    None,

    DecreasingDifficulty,
}

/// Local search configuration.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct LocalSearchConfig {
    /// Acceptors; a move must pass all of them. Empty means hill climbing.
    #[serde(default)]
    pub acceptors: Vec<AcceptorConfig>,

    pub forager: Option<ForagerConfig>,

    pub move_selector: Option<MoveSelectorConfig>,

    pub termination: Option<TerminationConfig>,
}

impl LocalSearchConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        for acceptor in &self.acceptors {
            acceptor.validate()?;
        }
        if let Some(forager) = &self.forager {
            require_positive(forager.accepted_count_limit, "accepted_count_limit")?;
        }
        Ok(())
    }
}

/// Acceptor configuration.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AcceptorConfig {
    /// Accept moves that do not worsen the last step score.
    HillClimbing,

    EntityTabu(EntityTabuConfig),

    ValueTabu(ValueTabuConfig),

    MoveTabu(MoveTabuConfig),

    SimulatedAnnealing(SimulatedAnnealingConfig),

    LateAcceptance(LateAcceptanceConfig),

    StepCountingHillClimbing(StepCountingHillClimbingConfig),
}

impl AcceptorConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        match self {
            AcceptorConfig::HillClimbing => Ok(()),
            AcceptorConfig::EntityTabu(c) => require_positive(Some(c.entity_tabu_size), "entity_tabu_size"),
            AcceptorConfig::ValueTabu(c) => require_positive(Some(c.value_tabu_size), "value_tabu_size"),
            AcceptorConfig::MoveTabu(c) => require_positive(Some(c.move_tabu_size), "move_tabu_size"),
            AcceptorConfig::SimulatedAnnealing(c) => {
                if c.starting_temperature.trim().is_empty() {
                    return Err(invalid("starting_temperature must not be empty"));
                }
                Ok(())
            }
            AcceptorConfig::LateAcceptance(c) => {
                require_positive(c.late_acceptance_size, "late_acceptance_size")
            }
            AcceptorConfig::StepCountingHillClimbing(c) => {
                require_positive(Some(c.step_counting_limit), "step_counting_limit")
            }
        }
    }
}

fn default_aspiration() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct EntityTabuConfig {
    /// Steps an entity stays tabu.
    pub entity_tabu_size: usize,

    #[serde(default = "default_aspiration")]
    pub aspiration_enabled: bool,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct ValueTabuConfig {
    /// Steps a value stays tabu.
    pub value_tabu_size: usize,

    #[serde(default = "default_aspiration")]
    pub aspiration_enabled: bool,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct MoveTabuConfig {
    /// Steps a move stays tabu.
    pub move_tabu_size: usize,

    /// Also make the undo move of each step tabu.
    #[serde(default)]
    pub undo_move_tabu: bool,

    #[serde(default = "default_aspiration")]
    pub aspiration_enabled: bool,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct SimulatedAnnealingConfig {
    /// Starting temperature per score level, in the score type's text form
    /// (e.g. "2hard/100soft").
    pub starting_temperature: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct LateAcceptanceConfig {
    /// Length of the late score ring buffer. Defaults to 400.
    pub late_acceptance_size: Option<usize>,

    /// Also accept moves that do not worsen the last step score.
    #[serde(default = "default_aspiration")]
    pub hill_climbing_enabled: bool,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct StepCountingHillClimbingConfig {
    pub step_counting_limit: usize,

    #[serde(default)]
    pub step_counting_type: StepCountingType,
}

/// What the step counting hill climbing acceptor counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StepCountingType {
    SelectedMove,

    AcceptedMove,

    #[default]
    Step,

    EqualOrImprovingStep,

    ImprovingStep,
}

/// Forager configuration.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct ForagerConfig {
    /// Stop evaluating a step after this many accepted moves.
    pub accepted_count_limit: Option<usize>,

    pub pick_early_type: Option<LocalSearchPickEarlyType>,

    pub finalist_podium_type: Option<FinalistPodiumType>,

    /// Pick a random finalist instead of the first one.
    pub break_tie_randomly: Option<bool>,
}

/// When the local search forager stops evaluating a step early.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LocalSearchPickEarlyType {
    #[default]
    Never,

    FirstBestScoreImproving,

    FirstLastStepScoreImproving,
}

/// How the local search forager keeps its finalists.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FinalistPodiumType {
    #[default]
    HighestScore,

    StrategicOscillation,

    StrategicOscillationByLevel,

    StrategicOscillationByLevelOnBestScore,
}

/// Selection and caching of the move selector.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct MoveSelectorConfig {
    pub selection_order: Option<SelectionOrder>,

    pub cache_type: Option<SelectionCacheType>,
}

/// Order in which a selector yields its elements.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionOrder {
    #[default]
    Inherit,

    Original,

    Sorted,

    Random,

    Shuffled,

    Probabilistic,
}

/// How long a selector keeps its materialized elements.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionCacheType {
    #[default]
    JustInTime,

    Step,

    Phase,

    Solver,
}

/// Exhaustive search configuration.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct ExhaustiveSearchConfig {
    #[serde(default)]
    pub exhaustive_search_type: ExhaustiveSearchType,

    /// Overrides the node order implied by the search type.
    pub node_explorer_type: Option<NodeExplorationType>,

    pub entity_sorter_manner: Option<EntitySorterManner>,

    /// Maximum number of nodes created before the phase gives up.
    pub node_limit: Option<usize>,

    pub termination: Option<TerminationConfig>,
}

/// Exhaustive search types.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExhaustiveSearchType {
    /// Prune with score bounds, explore depth first.
    #[default]
    BranchAndBound,

    /// Visit every node, breadth first.
    BruteForce,
}

/// Which expandable node the exhaustive search visits next.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeExplorationType {
    DepthFirst,

    BreadthFirst,

    ScoreFirst,

    OptimisticBoundFirst,
}
