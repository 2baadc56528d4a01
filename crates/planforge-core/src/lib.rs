//! PlanForge Core - Core types and traits for metaheuristic planning
//!
//! This crate provides the fundamental abstractions for PlanForge:
//! - Score types (with init score) for representing solution quality
//! - Domain traits for defining planning problems
//! - Descriptor types built in code at startup
//! - Value ranges with original-order and random-order iteration
//! - Supply/demand registry and shadow variable listeners

pub mod domain;
pub mod error;
pub mod score;

pub use domain::{LookUpKey, LookUpStrategyType, PlanningEntity, PlanningId, PlanningSolution};
pub use error::{PlanForgeError, Result};
pub use score::{
    BendableScore, HardMediumSoftScore, HardSoftDecimalScore, HardSoftScore, ParseableScore,
    Score, ScoreLevel, ScoreParseError, SimpleScore,
};
