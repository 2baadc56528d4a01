//! Score calculation for PlanForge.
//!
//! This crate owns the working solution during solving:
//! - Score directors that keep the score current after every change
//! - Full recalculation and incremental calculators
//! - Undo recording for evaluating moves in place
//! - Planning-id lookups of working entities
//!
//! Every change to a planning variable goes through the director's
//! before/after notifications, which also keep supplies and shadow
//! variables current.

pub mod director;

pub use director::{
    IncrementalScoreCalculator, IncrementalScoreDirector, IncrementalScoreDirectorFactory,
    RecordingScoreDirector, ScoreDirector, ScoreDirectorExt, ScoreDirectorFactory,
    SimpleScoreDirector, SimpleScoreDirectorFactory, UndoAction,
};
